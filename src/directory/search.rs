use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::directory::{StopDirectory, StopRecord};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Canonical stop codes accepted by the live-data endpoint are always this
/// long; shorter codes are secondary timing-point identifiers.
const CANONICAL_CODE_LEN: usize = 8;

/// Up to this many route labels are surfaced per group.
const ROUTE_SUMMARY_CAP: usize = 5;

/// Same-named stops (opposite-direction platforms of one logical location)
/// merged into a single search hit.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchGroup {
    pub name: String,
    /// Canonical-length codes first, then lexicographic.
    pub stop_codes: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub routes: Vec<String>,
    /// Number of underlying stop records merged into this group.
    pub direction_count: usize,
}

/// Case-insensitive substring search over stop ids and display names.
/// Results come back in scan order of the first matching record per group;
/// callers wanting alphabetical order sort downstream.
pub fn search(directory: &StopDirectory, query: &str, limit: usize) -> Vec<SearchGroup> {
    let needle = query.trim().to_lowercase();
    let mut groups: Vec<(String, Vec<&StopRecord>)> = Vec::new();

    for record in directory.stops() {
        if !matches(record, &needle) {
            continue;
        }
        let name = record.name.to_string();
        match groups.iter_mut().find(|(group_name, _)| *group_name == name) {
            Some((_, members)) => members.push(record),
            None => groups.push((name, vec![record])),
        }
    }

    groups
        .into_iter()
        .take(limit)
        .map(|(name, members)| build_group(name, members))
        .collect()
}

/// Ungrouped variant: one result per matching record, scan stopped as soon
/// as the limit is reached.
pub fn search_flat<'a>(
    directory: &'a StopDirectory,
    query: &str,
    limit: usize,
) -> Vec<&'a StopRecord> {
    let needle = query.trim().to_lowercase();
    let mut results = Vec::new();
    for record in directory.stops() {
        if matches(record, &needle) {
            results.push(record);
            if results.len() >= limit {
                break;
            }
        }
    }
    results
}

fn matches(record: &StopRecord, needle: &str) -> bool {
    record.id.to_lowercase().contains(needle) || record.normalized_name.contains(needle)
}

fn build_group(name: String, members: Vec<&StopRecord>) -> SearchGroup {
    let mut stop_codes: Vec<String> = members
        .iter()
        .map(|record| record.code.to_string())
        .collect();
    stop_codes.sort_by(|a, b| {
        (a.len() != CANONICAL_CODE_LEN, a).cmp(&(b.len() != CANONICAL_CODE_LEN, b))
    });

    let routes: BTreeSet<&str> = members
        .iter()
        .flat_map(|record| record.routes.iter().map(String::as_str))
        .collect();
    let routes = routes
        .into_iter()
        .take(ROUTE_SUMMARY_CAP)
        .map(str::to_string)
        .collect();

    let first = members[0];
    SearchGroup {
        name,
        stop_codes,
        latitude: first.latitude,
        longitude: first.longitude,
        routes,
        direction_count: members.len(),
    }
}
