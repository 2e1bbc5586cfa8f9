//! Registry integration tests: load, refresh, mutations, and the refresh
//! concurrency contract, driven through the in-memory document store.

mod support;

use std::time::Duration;

use clan_registry::{
    ClanRegistry, ClanType, InMemoryDocumentStore, RegistryConfig, SearchCriteria,
};
use support::{clan_record, raw_clan, seeded_store, test_config};

fn ids(registry: &ClanRegistry<InMemoryDocumentStore>) -> Vec<String> {
    registry
        .snapshot()
        .unwrap()
        .into_iter()
        .map(|clan| clan.clan_id)
        .collect()
}

fn criteria(max_result: usize) -> SearchCriteria {
    SearchCriteria {
        search_name: None,
        clan_type: None,
        min_clan_level: 0,
        min_clan_trophy: 0,
        min_member: 0,
        max_result,
    }
}

#[tokio::test]
async fn load_excludes_zero_member_clans() {
    let registry = ClanRegistry::new(seeded_store(), test_config());
    let count = registry.load().await.unwrap();
    registry.stop_refresher();

    assert_eq!(count, 2);
    assert_eq!(ids(&registry), ["clan-a", "clan-c"]);
}

#[tokio::test]
async fn load_failure_is_fatal_and_leaves_the_registry_empty() {
    let store = seeded_store();
    store.fail_reads(true);
    let registry = ClanRegistry::new(store, test_config());

    assert!(registry.load().await.is_err());
    assert!(registry.is_empty().unwrap());
}

#[tokio::test]
async fn load_batches_the_id_set() {
    let store = seeded_store();
    let config = RegistryConfig {
        batch_size: 1,
        ..test_config()
    };
    let registry = ClanRegistry::new(store, config);
    let count = registry.load().await.unwrap();
    registry.stop_refresher();

    // Same outcome as a single-batch load, in batch order.
    assert_eq!(count, 2);
    assert_eq!(ids(&registry), ["clan-a", "clan-c"]);
}

#[tokio::test]
async fn refresh_replaces_the_snapshot_wholesale() {
    let store = seeded_store();
    let registry = ClanRegistry::new(store.clone(), test_config());
    registry.load().await.unwrap();
    registry.stop_refresher();

    store.insert("Clans", raw_clan("clan-d", "Delta", 1, 10, ClanType::Open, 4));
    let count = registry.refresh().await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(ids(&registry), ["clan-a", "clan-c", "clan-d"]);
}

#[tokio::test]
async fn refresh_failure_keeps_the_previous_snapshot() {
    let store = seeded_store();
    let registry = ClanRegistry::new(store.clone(), test_config());
    registry.load().await.unwrap();
    registry.stop_refresher();

    store.fail_reads(true);
    assert!(registry.refresh().await.is_err());
    assert_eq!(ids(&registry), ["clan-a", "clan-c"]);
}

#[tokio::test]
async fn interim_mutations_are_lost_at_swap() {
    // Documented limitation: the swap replaces whatever snapshot is live,
    // including records added after the refresh started.
    let registry = ClanRegistry::new(seeded_store(), test_config());
    registry.load().await.unwrap();
    registry.stop_refresher();

    registry
        .add(clan_record("clan-x", "Interim", 1, 1, ClanType::Open, 1))
        .unwrap();
    assert_eq!(registry.len().unwrap(), 3);

    registry.refresh().await.unwrap();
    assert_eq!(ids(&registry), ["clan-a", "clan-c"]);
}

#[tokio::test]
async fn readers_never_observe_a_partial_refresh() {
    let store = seeded_store();
    for n in 0..8 {
        let id = format!("seed-{n}");
        store.insert("Clans", raw_clan(&id, "Seed", 1, 1, ClanType::Open, 1));
    }
    let config = RegistryConfig {
        batch_size: 2,
        batch_pause_ms: 20,
        ..RegistryConfig::default()
    };
    let registry = ClanRegistry::new(store.clone(), config);
    registry.load().await.unwrap();
    registry.stop_refresher();
    let old_len = registry.len().unwrap();

    // Grow the authoritative set so old and new lengths differ.
    for n in 0..5 {
        let id = format!("grown-{n}");
        store.insert("Clans", raw_clan(&id, "Grown", 1, 1, ClanType::Open, 1));
    }
    let new_len = old_len + 5;

    let refresher = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.refresh().await })
    };
    let observer = {
        let registry = registry.clone();
        tokio::spawn(async move {
            let mut observed = Vec::new();
            for _ in 0..40 {
                observed.push(registry.len().unwrap());
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            observed
        })
    };

    refresher.await.unwrap().unwrap();
    let observed = observer.await.unwrap();
    assert!(
        observed.iter().all(|len| *len == old_len || *len == new_len),
        "partial snapshot observed: {observed:?}"
    );
}

#[tokio::test]
async fn scheduled_refresher_picks_up_store_changes() {
    let store = seeded_store();
    let config = RegistryConfig {
        refresh_interval_ms: 50,
        batch_pause_ms: 1,
        ..RegistryConfig::default()
    };
    let registry = ClanRegistry::new(store.clone(), config);
    registry.load().await.unwrap();

    store.insert("Clans", raw_clan("clan-d", "Delta", 1, 10, ClanType::Open, 4));
    tokio::time::sleep(Duration::from_millis(400)).await;
    registry.stop_refresher();

    assert_eq!(registry.len().unwrap(), 3);
}

#[tokio::test]
async fn stopped_refresher_no_longer_ticks() {
    let store = seeded_store();
    let config = RegistryConfig {
        refresh_interval_ms: 50,
        batch_pause_ms: 1,
        ..RegistryConfig::default()
    };
    let registry = ClanRegistry::new(store.clone(), config);
    registry.load().await.unwrap();
    registry.stop_refresher();

    store.insert("Clans", raw_clan("clan-d", "Delta", 1, 10, ClanType::Open, 4));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(registry.len().unwrap(), 2);
}

#[tokio::test]
async fn a_failed_tick_does_not_stop_the_schedule() {
    let store = seeded_store();
    let config = RegistryConfig {
        refresh_interval_ms: 50,
        batch_pause_ms: 1,
        ..RegistryConfig::default()
    };
    let registry = ClanRegistry::new(store.clone(), config);
    registry.load().await.unwrap();

    // First ticks fail; the snapshot stays as loaded.
    store.fail_reads(true);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(registry.len().unwrap(), 2);

    // Once the store recovers, a later tick refreshes.
    store.insert("Clans", raw_clan("clan-d", "Delta", 1, 10, ClanType::Open, 4));
    store.fail_reads(false);
    tokio::time::sleep(Duration::from_millis(400)).await;
    registry.stop_refresher();

    assert_eq!(registry.len().unwrap(), 3);
}

#[tokio::test]
async fn rearming_the_refresher_replaces_the_previous_ticker() {
    // Arming twice must not leave an orphaned ticker behind: one stop call
    // silences the registry for good.
    let store = seeded_store();
    let config = RegistryConfig {
        refresh_interval_ms: 50,
        batch_pause_ms: 1,
        ..RegistryConfig::default()
    };
    let registry = ClanRegistry::new(store.clone(), config);
    registry.load().await.unwrap();
    registry.start_refresher();
    registry.stop_refresher();

    store.insert("Clans", raw_clan("clan-d", "Delta", 1, 10, ClanType::Open, 4));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(registry.len().unwrap(), 2);
}

#[tokio::test]
async fn delete_missing_leaves_the_snapshot_unchanged() {
    let registry = ClanRegistry::new(seeded_store(), test_config());
    registry.load().await.unwrap();
    registry.stop_refresher();
    let before = registry.snapshot().unwrap();

    assert!(!registry.delete("ghost").unwrap());
    assert_eq!(registry.snapshot().unwrap(), before);
}

#[tokio::test]
async fn add_then_delete_restores_the_previous_length() {
    let registry = ClanRegistry::new(seeded_store(), test_config());
    registry.load().await.unwrap();
    registry.stop_refresher();
    let before = registry.len().unwrap();

    registry
        .add(clan_record("clan-x", "Transient", 1, 1, ClanType::Open, 1))
        .unwrap();
    assert!(registry.delete("clan-x").unwrap());
    assert_eq!(registry.len().unwrap(), before);
}

#[tokio::test]
async fn delete_removes_only_the_first_duplicate() {
    // Uniqueness is a soft invariant: add never checks, delete takes the
    // first match.
    let registry = ClanRegistry::new(InMemoryDocumentStore::new(), test_config());
    registry
        .add(clan_record("dup", "First", 1, 1, ClanType::Open, 1))
        .unwrap();
    registry
        .add(clan_record("dup", "Second", 2, 2, ClanType::Open, 2))
        .unwrap();

    assert!(registry.delete("dup").unwrap());
    let snapshot = registry.snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].clan_name, "Second");
}

#[tokio::test]
async fn sampling_search_with_type_filter_returns_only_the_open_clan() {
    let registry = ClanRegistry::new(seeded_store(), test_config());
    registry.load().await.unwrap();
    registry.stop_refresher();

    let mut wanted = criteria(5);
    wanted.min_clan_level = 1;
    wanted.min_clan_trophy = 1;
    wanted.min_member = 1;
    wanted.clan_type = Some(ClanType::Open);

    let results = registry.search(&wanted).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].clan_id, "clan-a");
}

#[tokio::test]
async fn name_search_is_case_insensitive() {
    let registry = ClanRegistry::new(seeded_store(), test_config());
    registry.load().await.unwrap();
    registry.stop_refresher();

    let mut wanted = criteria(10);
    wanted.search_name = Some("a".to_string());

    let results = registry.search(&wanted).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].clan_name, "Alpha");
}
