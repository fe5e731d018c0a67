//! Pure evidence-ledger operations (spec §4.J, invariant §3.6: append-only).
//! Persistence of `EvidenceEntry` rows lives in `engine-storage`; this module
//! only knows how to append, query, and assemble chains over a slice the
//! caller already loaded.

use crate::shared::models::{ConfidenceValue, EvidenceEntry, EvidenceKind, Provenance};
use chrono::{DateTime, Utc};

/// Builds the next entry in sequence. The caller is responsible for
/// persisting it; this never mutates `existing`.
#[allow(clippy::too_many_arguments)]
pub fn append_entry(
    existing: &[EvidenceEntry],
    kind: EvidenceKind,
    payload: serde_json::Value,
    provenance: Provenance,
    confidence: ConfidenceValue,
    related_entries: Vec<u64>,
    now: DateTime<Utc>,
) -> EvidenceEntry {
    let next_id = existing.iter().map(|e| e.id).max().unwrap_or(0) + 1;
    EvidenceEntry {
        id: next_id,
        kind,
        payload,
        provenance,
        timestamp: now,
        related_entries,
        confidence,
    }
}

/// Filters `entries` by `kinds` (empty means "any") and an optional
/// `[from, to]` time range, newest-first, capped at `limit`.
pub fn query_entries<'a>(
    entries: &'a [EvidenceEntry],
    kinds: &[EvidenceKind],
    time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    limit: usize,
) -> Vec<&'a EvidenceEntry> {
    let mut matches: Vec<&EvidenceEntry> = entries
        .iter()
        .filter(|e| kinds.is_empty() || kinds.contains(&e.kind))
        .filter(|e| match time_range {
            Some((from, to)) => e.timestamp >= from && e.timestamp <= to,
            None => true,
        })
        .collect();

    matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matches.truncate(limit);
    matches
}

/// All evidence directly bearing on `claim_id`: the claim entry itself, plus
/// entries that name it in `related_entries`, split into supporting
/// (non-contradiction/defeater kinds) and defeating.
pub struct EvidenceChain<'a> {
    pub claim: Option<&'a EvidenceEntry>,
    pub supporting: Vec<&'a EvidenceEntry>,
    pub defeating: Vec<&'a EvidenceEntry>,
}

pub fn get_chain(entries: &[EvidenceEntry], claim_id: u64) -> EvidenceChain<'_> {
    let claim = entries.iter().find(|e| e.id == claim_id);
    let mut supporting = Vec::new();
    let mut defeating = Vec::new();

    for entry in entries {
        if entry.id == claim_id || !entry.related_entries.contains(&claim_id) {
            continue;
        }
        match entry.kind {
            EvidenceKind::Contradiction | EvidenceKind::Defeater => defeating.push(entry),
            _ => supporting.push(entry),
        }
    }

    EvidenceChain { claim, supporting, defeating }
}
