//! Error type for registry operations.

use std::fmt;

use crate::store::StoreError;

/// Error type for registry operations.
#[derive(Debug)]
pub enum RegistryError {
    /// A snapshot lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// The document store failed during a load or refresh cycle.
    Store(StoreError),
    /// The search name did not compile as a pattern.
    InvalidPattern(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::LockPoisoned(operation) => {
                write!(f, "snapshot lock poisoned during {}", operation)
            }
            RegistryError::Store(err) => write!(f, "document store error: {}", err),
            RegistryError::InvalidPattern(msg) => {
                write!(f, "invalid search name pattern: {}", msg)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        RegistryError::Store(err)
    }
}
