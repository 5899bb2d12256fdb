use std::cmp::Ordering;
use serde_json::Value;
use crate::price_infra::normalizer::normalize_row;
use crate::types::row::{PriceRow, RawRow};

/// Ordinal rank of a confidence label. Unknown or missing labels rank 0.
pub fn confidence_rank(label: Option<&str>) -> u8 {
    match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("high") => 3,
        Some("medium") => 2,
        Some("low") => 1,
        _ => 0,
    }
}

struct Candidate<'a> {
    row: &'a PriceRow,
    chaos: f64,
    confidence_rank: u8,
    count_norm: i64,
}

/// Selects the single best row among `rows`.
///
/// Rows without a finite `chaos_value` are dropped. Survivors are ordered by
/// confidence (desc), listing count (desc), distance to the median chaos
/// value (asc), position of their source in `priority` (unlisted last), and
/// source name. Remaining ties fall back to the other row fields so the
/// result never depends on input order.
pub fn arbitrate(rows: &[PriceRow], priority: &[String]) -> Option<PriceRow> {
    let candidates: Vec<Candidate<'_>> = rows
        .iter()
        .filter_map(|row| {
            let chaos = row.chaos_value.filter(|v| v.is_finite())?;
            Some(Candidate {
                row,
                chaos,
                confidence_rank: confidence_rank(row.confidence.as_deref()),
                count_norm: row.listing_count.unwrap_or(0),
            })
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let chaos_values: Vec<f64> = candidates.iter().map(|c| c.chaos).collect();
    let median = calculate_median(&chaos_values);

    let winner = candidates
        .iter()
        .min_by(|a, b| compare_candidates(a, b, median, priority))?;

    Some(winner.row.clone())
}

/// Normalizes raw rows first, then arbitrates.
pub fn arbitrate_raw(rows: &[RawRow], priority: &[String]) -> Option<PriceRow> {
    let normalized: Vec<PriceRow> = rows.iter().map(normalize_row).collect();
    arbitrate(&normalized, priority)
}

fn compare_candidates(
    a: &Candidate<'_>,
    b: &Candidate<'_>,
    median: f64,
    priority: &[String],
) -> Ordering {
    b.confidence_rank
        .cmp(&a.confidence_rank)
        .then_with(|| b.count_norm.cmp(&a.count_norm))
        .then_with(|| (a.chaos - median).abs().total_cmp(&(b.chaos - median).abs()))
        .then_with(|| priority_index(&a.row.source, priority).cmp(&priority_index(&b.row.source, priority)))
        .then_with(|| a.row.source.cmp(&b.row.source))
        .then_with(|| a.chaos.total_cmp(&b.chaos))
        .then_with(|| a.row.item_name.cmp(&b.row.item_name))
        .then_with(|| a.row.variant.cmp(&b.row.variant))
        .then_with(|| {
            let a_divine = a.row.divine_value.unwrap_or(f64::INFINITY);
            let b_divine = b.row.divine_value.unwrap_or(f64::INFINITY);
            a_divine.total_cmp(&b_divine)
        })
        .then_with(|| a.row.confidence.cmp(&b.row.confidence))
        .then_with(|| a.row.listing_count.cmp(&b.row.listing_count))
        .then_with(|| value_key(&a.row.links).cmp(&value_key(&b.row.links)))
        .then_with(|| value_key(&a.row.explanation).cmp(&value_key(&b.row.explanation)))
        .then_with(|| a.row.is_arbitrated.cmp(&b.row.is_arbitrated))
}

fn value_key(value: &Option<Value>) -> String {
    value.as_ref().map(Value::to_string).unwrap_or_default()
}

fn priority_index(source: &str, priority: &[String]) -> usize {
    priority
        .iter()
        .position(|p| p == source)
        .unwrap_or(priority.len())
}

pub fn calculate_median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
