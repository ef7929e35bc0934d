use felt_types::{Chip, SettlementRecord};
use std::collections::BTreeMap;
use std::fmt::Write;

pub fn clamp_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

pub fn format_chip_list(chips: &[Chip]) -> String {
    let mut out = String::with_capacity(chips.len().saturating_mul(4));
    for (idx, chip) in chips.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}", chip.value());
    }
    out
}

pub fn push_resolved_entry(out: &mut String, label: &str, pnl: i64) {
    if !out.is_empty() {
        out.push(',');
    }
    let _ = write!(out, r#"{{"label":"{}","pnl":{}}}"#, label, pnl);
}

/// Per-outcome net results of a settlement, as a JSON array body.
pub fn format_resolved(records: &[SettlementRecord]) -> String {
    let mut by_outcome: BTreeMap<&str, i128> = BTreeMap::new();
    for record in records {
        *by_outcome.entry(record.outcome.as_str()).or_insert(0) += record.net();
    }
    let mut out = String::new();
    for (label, pnl) in by_outcome {
        push_resolved_entry(&mut out, label, clamp_i64(pnl));
    }
    out
}
