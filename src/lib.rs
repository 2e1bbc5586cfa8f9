mod clan;
mod config;
mod error;
mod registry;
mod store;

pub use clan::{ClanRecord, ClanType, ClanValidationError, RawClanDocument};
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use registry::{ClanRegistry, SearchCriteria};
pub use store::{ClanStore, InMemoryDocumentStore, StoreError};

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};
