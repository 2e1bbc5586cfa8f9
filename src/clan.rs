//! Clan record types and mutation payload validation.
//!
//! `ClanRecord` is the value type held in the registry snapshot; it is
//! immutable once constructed. `RawClanDocument` is the shape bulk reads
//! return from the document store, carrying the raw member id list that
//! collapses into a count during the load/refresh transform.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Visibility of a clan to prospective members.
///
/// Wire strings are `"Open"`, `"Closed"`, and `"Invite Only"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClanType {
    Open,
    Closed,
    #[serde(rename = "Invite Only")]
    InviteOnly,
}

impl fmt::Display for ClanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClanType::Open => "Open",
            ClanType::Closed => "Closed",
            ClanType::InviteOnly => "Invite Only",
        };
        f.write_str(name)
    }
}

impl FromStr for ClanType {
    type Err = ClanValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(ClanType::Open),
            "Closed" => Ok(ClanType::Closed),
            "Invite Only" => Ok(ClanType::InviteOnly),
            other => Err(ClanValidationError::InvalidClanType(other.to_string())),
        }
    }
}

/// A clan as held in the registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClanRecord {
    pub clan_id: String,
    pub clan_name: String,
    pub clan_level: u32,
    pub clan_trophy: u32,
    pub clan_logo: i64,
    pub clan_type: ClanType,
    pub required_trophy: u32,
    pub members: u32,
}

/// A clan document as returned by a bulk read: the scalar projection plus
/// the raw member id list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClanDocument {
    pub clan_id: String,
    pub clan_name: String,
    pub clan_level: u32,
    pub clan_trophy: u32,
    pub clan_logo: i64,
    pub clan_type: ClanType,
    pub required_trophy: u32,
    #[serde(default)]
    pub members: Vec<String>,
}

impl RawClanDocument {
    /// Collapse the member list into a count.
    ///
    /// Returns `None` for memberless documents: those never enter the
    /// snapshot.
    pub fn into_record(self) -> Option<ClanRecord> {
        if self.members.is_empty() {
            return None;
        }
        Some(ClanRecord {
            clan_id: self.clan_id,
            clan_name: self.clan_name,
            clan_level: self.clan_level,
            clan_trophy: self.clan_trophy,
            clan_logo: self.clan_logo,
            clan_type: self.clan_type,
            required_trophy: self.required_trophy,
            members: self.members.len() as u32,
        })
    }
}

/// Rejection reason for an addClan payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClanValidationError {
    /// A required field is absent from the payload.
    MissingField(&'static str),
    /// A field is present but empty or of the wrong type.
    InvalidField(&'static str),
    /// `clanType` is not one of the three enumerated values.
    InvalidClanType(String),
}

impl fmt::Display for ClanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClanValidationError::MissingField(field) => {
                write!(f, "Field {} is missing or invalid.", field)
            }
            ClanValidationError::InvalidField(field) => write!(f, "Invalid {}.", field),
            ClanValidationError::InvalidClanType(_) => {
                write!(f, "Invalid clanType. Must be one of Open, Closed, Invite Only.")
            }
        }
    }
}

impl std::error::Error for ClanValidationError {}

impl ClanRecord {
    /// Validate an addClan payload field by field.
    ///
    /// Checks presence of the required fields first, then each field's type
    /// and range, then the `clanType` enumeration. The first failure wins
    /// and its message is what the caller reports.
    pub fn from_payload(payload: &Value) -> Result<ClanRecord, ClanValidationError> {
        const REQUIRED: [&str; 7] = [
            "clanId",
            "clanName",
            "clanLevel",
            "clanTrophy",
            "clanType",
            "requiredTrophy",
            "members",
        ];
        for field in REQUIRED {
            if payload.get(field).is_none() {
                return Err(ClanValidationError::MissingField(field));
            }
        }

        let clan_id = non_empty_string(payload, "clanId")?;
        let clan_name = non_empty_string(payload, "clanName")?;
        let clan_logo = payload
            .get("clanLogo")
            .and_then(Value::as_i64)
            .ok_or(ClanValidationError::InvalidField("clanLogo"))?;
        let clan_level = non_negative_int(payload, "clanLevel")?;
        let clan_trophy = non_negative_int(payload, "clanTrophy")?;
        let required_trophy = non_negative_int(payload, "requiredTrophy")?;
        let members = non_negative_int(payload, "members")?;

        let clan_type = match payload.get("clanType") {
            Some(Value::String(s)) => s.parse::<ClanType>()?,
            Some(other) => {
                return Err(ClanValidationError::InvalidClanType(other.to_string()))
            }
            None => return Err(ClanValidationError::MissingField("clanType")),
        };

        Ok(ClanRecord {
            clan_id,
            clan_name,
            clan_level,
            clan_trophy,
            clan_logo,
            clan_type,
            required_trophy,
            members,
        })
    }
}

fn non_empty_string(payload: &Value, field: &'static str) -> Result<String, ClanValidationError> {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(ClanValidationError::InvalidField(field)),
    }
}

fn non_negative_int(payload: &Value, field: &'static str) -> Result<u32, ClanValidationError> {
    payload
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(ClanValidationError::InvalidField(field))
}
