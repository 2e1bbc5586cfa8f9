//! Shared fixtures: a seeded in-memory document store and sample clans.

#![allow(dead_code)]

use clan_registry::{ClanRecord, ClanType, InMemoryDocumentStore, RawClanDocument, RegistryConfig};

pub fn raw_clan(
    id: &str,
    name: &str,
    level: u32,
    trophy: u32,
    clan_type: ClanType,
    member_count: usize,
) -> RawClanDocument {
    RawClanDocument {
        clan_id: id.to_string(),
        clan_name: name.to_string(),
        clan_level: level,
        clan_trophy: trophy,
        clan_logo: 1,
        clan_type,
        required_trophy: 0,
        members: (0..member_count).map(|n| format!("{}-member-{}", id, n)).collect(),
    }
}

pub fn clan_record(
    id: &str,
    name: &str,
    level: u32,
    trophy: u32,
    clan_type: ClanType,
    members: u32,
) -> ClanRecord {
    ClanRecord {
        clan_id: id.to_string(),
        clan_name: name.to_string(),
        clan_level: level,
        clan_trophy: trophy,
        clan_logo: 1,
        clan_type,
        required_trophy: 0,
        members,
    }
}

/// Three clans: one Open, one with no members (excluded at load time), one
/// Closed. The loaded snapshot is `[Alpha, Crew]`.
pub fn seeded_store() -> InMemoryDocumentStore {
    let store = InMemoryDocumentStore::new();
    store.insert("Clans", raw_clan("clan-a", "Alpha", 5, 100, ClanType::Open, 10));
    store.insert("Clans", raw_clan("clan-b", "Bravo", 2, 50, ClanType::Open, 0));
    store.insert("Clans", raw_clan("clan-c", "Crew", 8, 200, ClanType::Closed, 3));
    store
}

/// Default config with a short inter-batch pause so refresh tests run fast.
pub fn test_config() -> RegistryConfig {
    RegistryConfig {
        batch_pause_ms: 5,
        ..RegistryConfig::default()
    }
}
