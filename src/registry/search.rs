//! Query engine: random-sampling and name-scan search over the snapshot.

use std::collections::HashSet;

use rand::Rng;
use regex::RegexBuilder;

use crate::clan::{ClanRecord, ClanType};
use crate::error::RegistryError;

/// Search input.
///
/// `search_name` selects the algorithm: absent means random sampling over
/// the snapshot, present means an ordered scan with a case-insensitive
/// pattern match on the clan name. The numeric bounds are inclusive lower
/// bounds; `clan_type` is an optional exact match.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub search_name: Option<String>,
    pub clan_type: Option<ClanType>,
    pub min_clan_level: u32,
    pub min_clan_trophy: u32,
    pub min_member: u32,
    pub max_result: usize,
}

impl SearchCriteria {
    fn accepts(&self, clan: &ClanRecord) -> bool {
        if clan.clan_level < self.min_clan_level {
            return false;
        }
        if clan.clan_trophy < self.min_clan_trophy {
            return false;
        }
        if clan.members < self.min_member {
            return false;
        }
        if let Some(clan_type) = self.clan_type {
            if clan.clan_type != clan_type {
                return false;
            }
        }
        true
    }
}

pub(super) fn run(
    clans: &[ClanRecord],
    criteria: &SearchCriteria,
    attempt_budget: u32,
) -> Result<Vec<ClanRecord>, RegistryError> {
    match criteria.search_name.as_deref() {
        Some(pattern) => scan(clans, criteria, pattern),
        None => Ok(sample(clans, criteria, attempt_budget)),
    }
}

/// Rejection sampling: draw uniformly random positions and keep the ones
/// that pass the filters, without materializing the filtered subset first.
///
/// The target count is `max_result` when that bounds the snapshot, and one
/// less than the snapshot length otherwise. Every draw consumes one attempt,
/// accepted or not; undershooting the target on an exhausted budget is a
/// normal outcome, not an error. Results come back in acceptance order.
fn sample(clans: &[ClanRecord], criteria: &SearchCriteria, attempt_budget: u32) -> Vec<ClanRecord> {
    let target = if criteria.max_result < clans.len() {
        criteria.max_result
    } else {
        clans.len().saturating_sub(1)
    };

    let mut rng = rand::thread_rng();
    let mut accepted = Vec::with_capacity(target);
    let mut seen = HashSet::with_capacity(target);
    let mut attempts = 0u32;

    while accepted.len() < target && attempts < attempt_budget {
        attempts += 1;
        let index = rng.gen_range(0..clans.len());
        if !criteria.accepts(&clans[index]) {
            continue;
        }
        if seen.insert(index) {
            accepted.push(index);
        }
    }

    accepted.into_iter().map(|index| clans[index].clone()).collect()
}

/// Ordered scan: the result is a prefix of all matches in snapshot order,
/// truncated at `max_result`. Deterministic for a fixed snapshot.
fn scan(
    clans: &[ClanRecord],
    criteria: &SearchCriteria,
    pattern: &str,
) -> Result<Vec<ClanRecord>, RegistryError> {
    let name_pattern = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| RegistryError::InvalidPattern(err.to_string()))?;

    let mut matches = Vec::new();
    for clan in clans {
        if matches.len() >= criteria.max_result {
            break;
        }
        if !criteria.accepts(clan) {
            continue;
        }
        if !name_pattern.is_match(&clan.clan_name) {
            continue;
        }
        matches.push(clan.clone());
    }
    Ok(matches)
}
