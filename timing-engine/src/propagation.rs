//! Message propagation analysis
//!
//! Follows a tagged message from the device that sent it to every device
//! down the chain that received it. Hop distance is the difference in chain
//! position between sender and receiver.

use crate::config::AnalysisConfig;
use crate::types::{MessagePropagation, Nanos, PropagationRecord, ToggleRecord, DEFAULT_DEVICE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Edges collected for one correlation id
#[derive(Default)]
struct MessageEdges<'a> {
    /// Earliest start edge of the send event
    send: Option<&'a ToggleRecord>,
    /// Earliest start edge of the receive event, per device id
    receives: BTreeMap<Option<&'a str>, &'a ToggleRecord>,
}

fn keep_earliest<'a>(slot: &mut Option<&'a ToggleRecord>, record: &'a ToggleRecord) {
    match slot {
        Some(current) if current.timestamp <= record.timestamp => {}
        _ => *slot = Some(record),
    }
}

/// Compute hop records for every tagged, non-sync message
///
/// For each correlation id the earliest send start edge fixes the sender.
/// Every other device contributes its earliest receive start edge. Messages
/// without a positioned send edge, or without any positioned receiver, are
/// left out. Results are ordered by correlation id; hops within a message by
/// propagation time, then device.
pub fn analyze_propagation(
    records: &[ToggleRecord],
    config: &AnalysisConfig,
) -> Vec<MessagePropagation> {
    let mut messages: BTreeMap<&str, MessageEdges<'_>> = BTreeMap::new();

    for record in records.iter().filter(|r| r.toggled) {
        let Some(id) = record.correlation_id.as_deref() else {
            continue;
        };
        if config.is_sync_id(id) {
            continue;
        }

        if record.event_name == config.send_event {
            keep_earliest(&mut messages.entry(id).or_default().send, record);
        } else if record.event_name == config.receive_event {
            let edges = messages.entry(id).or_default();
            let device = record.device_id.as_deref();
            let mut slot = edges.receives.get(&device).copied();
            keep_earliest(&mut slot, record);
            if let Some(earliest) = slot {
                edges.receives.insert(device, earliest);
            }
        }
    }

    let results: Vec<MessagePropagation> = messages
        .into_iter()
        .filter_map(|(id, edges)| trace_message(id, edges))
        .collect();

    log::info!("Propagation: {} messages traced", results.len());
    results
}

fn trace_message(id: &str, edges: MessageEdges<'_>) -> Option<MessagePropagation> {
    let Some(send) = edges.send else {
        log::debug!("Message {} has no send edge", id);
        return None;
    };
    let Some(send_position) = send.position else {
        log::warn!("Send edge of message {} has no chain position", id);
        return None;
    };
    let send_device = send.device_id.as_deref();

    let mut hops: Vec<PropagationRecord> = edges
        .receives
        .into_iter()
        .filter(|(device, _)| *device != send_device)
        .map(|(device, receive)| (device.unwrap_or(DEFAULT_DEVICE), receive))
        .filter_map(|(device, receive)| {
            let Some(to_position) = receive.position else {
                log::warn!("Receive edge of {} on {} has no chain position", id, device);
                return None;
            };
            Some(hop(send, send_position, device, to_position, receive.timestamp))
        })
        .collect();

    if hops.is_empty() {
        log::debug!("Message {} was not received by any other device", id);
        return None;
    }
    hops.sort_by_key(|h| h.propagation_time);

    Some(MessagePropagation {
        correlation_id: id.to_string(),
        send_device: send.device_label().to_string(),
        send_position,
        send_time: send.timestamp,
        hops,
    })
}

fn hop(
    send: &ToggleRecord,
    from_position: i64,
    to_device: &str,
    to_position: i64,
    receive_time: Nanos,
) -> PropagationRecord {
    let hop_count = to_position.abs_diff(from_position);
    let propagation_time = receive_time.saturating_sub(send.timestamp);
    let time_per_hop = if hop_count == 0 {
        0.0
    } else {
        propagation_time as f64 / hop_count as f64
    };

    PropagationRecord {
        from_device: send.device_label().to_string(),
        to_device: to_device.to_string(),
        from_position,
        to_position,
        hop_count,
        propagation_time,
        time_per_hop,
    }
}

/// Aggregate latency across all traced messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationSummary {
    pub message_count: usize,
    pub hop_records: usize,
    pub mean_propagation_time: f64,
    /// Mean over hops that crossed at least one position
    pub mean_time_per_hop: f64,
    pub max_hop_count: u64,
}

/// Summarize traced messages, `None` if there are none
pub fn summarize_propagation(messages: &[MessagePropagation]) -> Option<PropagationSummary> {
    let hops: Vec<&PropagationRecord> = messages.iter().flat_map(|m| m.hops.iter()).collect();
    let max_hop_count = hops.iter().map(|h| h.hop_count).max()?;

    let mean_propagation_time =
        hops.iter().map(|h| h.propagation_time as f64).sum::<f64>() / hops.len() as f64;

    let per_hop: Vec<f64> = hops
        .iter()
        .filter(|h| h.hop_count > 0)
        .map(|h| h.time_per_hop)
        .collect();
    let mean_time_per_hop = if per_hop.is_empty() {
        0.0
    } else {
        per_hop.iter().sum::<f64>() / per_hop.len() as f64
    };

    Some(PropagationSummary {
        message_count: messages.len(),
        hop_records: hops.len(),
        mean_propagation_time,
        mean_time_per_hop,
        max_hop_count,
    })
}
