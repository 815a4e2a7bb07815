//! Interval extraction
//!
//! Pairs toggle-on/toggle-off records into executions. Pairing runs
//! independently for every (device, event) group; records without a device
//! all belong to the implicit device, so single- and multi-device inputs go
//! through the same code path.

use crate::types::{Execution, ToggleRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of one pairing group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    /// None for the implicit device
    pub device_id: Option<String>,
    pub event_name: String,
}

impl GroupKey {
    fn of(record: &ToggleRecord) -> Self {
        Self {
            device_id: record.device_id.clone(),
            event_name: record.event_name.clone(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.device_id {
            Some(device) => write!(f, "{}/{}", device, self.event_name),
            None => write!(f, "{}", self.event_name),
        }
    }
}

/// Pair the records of one group into executions
///
/// The records do not need to be sorted; they are stably sorted by timestamp
/// so records with equal timestamps keep their input order.
///
/// At most one start is pending per correlation id (records without an id
/// share the absent key):
/// - a start edge opens an execution only when none is pending for its key
/// - an end edge closes the execution pending for its own key; when nothing
///   is pending for that key it is ignored, and starts pending under other
///   keys stay open
/// - a start still pending at the end is dropped
///
/// This differs from a single pending slot only when starts with different
/// keys overlap. An uncorrelated start and a correlated start, for example,
/// stay pending side by side, and each closes only on an end edge with its
/// own key.
///
/// Executions are returned in the order they complete. Durations are
/// computed without validation and saturate at the `i64` range.
pub fn extract_intervals<'a, I>(records: I) -> Vec<Execution>
where
    I: IntoIterator<Item = &'a ToggleRecord>,
{
    let mut ordered: Vec<&ToggleRecord> = records.into_iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let mut executions = Vec::new();
    let mut pending: BTreeMap<Option<&str>, &ToggleRecord> = BTreeMap::new();

    for record in ordered {
        let key = record.correlation_id.as_deref();

        if record.toggled {
            if pending.contains_key(&key) {
                log::trace!("Ignoring start edge at {} (signal already high)", record.timestamp);
            } else {
                pending.insert(key, record);
            }
        } else if let Some(start) = pending.remove(&key) {
            executions.push(Execution {
                duration: record.timestamp.saturating_sub(start.timestamp),
                start_time: start.timestamp,
                end_time: record.timestamp,
                correlation_id: start.correlation_id.clone(),
            });
        } else if pending.is_empty() {
            log::trace!("Ignoring orphan end edge at {}", record.timestamp);
        } else {
            log::trace!(
                "End edge at {} has correlation id {:?}, no matching start pending",
                record.timestamp,
                key
            );
        }
    }

    for start in pending.values() {
        log::debug!(
            "Dropping unterminated start edge for '{}' at {}",
            start.event_name,
            start.timestamp
        );
    }

    executions
}

/// Split records into (device, event) groups in a single pass
pub fn group_records(records: &[ToggleRecord]) -> BTreeMap<GroupKey, Vec<&ToggleRecord>> {
    let mut groups: BTreeMap<GroupKey, Vec<&ToggleRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(GroupKey::of(record)).or_default().push(record);
    }
    groups
}

/// Extract executions for every (device, event) group
///
/// Groups that produce no executions are omitted.
pub fn extract_grouped(records: &[ToggleRecord]) -> BTreeMap<GroupKey, Vec<Execution>> {
    let groups = group_records(records);
    log::debug!("Extracting intervals from {} groups", groups.len());

    groups
        .into_iter()
        .filter_map(|(key, group)| {
            let executions = extract_intervals(group);
            if executions.is_empty() {
                log::debug!("Group {} produced no executions", key);
                None
            } else {
                Some((key, executions))
            }
        })
        .collect()
}
