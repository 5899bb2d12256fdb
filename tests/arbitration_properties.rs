//! Property tests for the arbitrator: the winner never depends on the order
//! rows arrive in.

use price_arbiter::price_infra::arbitrator::arbitrate_raw;
use price_arbiter::{arbitrate, normalize_row, PriceRow, RawRow};
use proptest::prelude::*;
use serde_json::{json, Value};

const SOURCES: [&str; 4] = ["ninja", "trade", "wiki", "undercut"];
const CONFIDENCE: [&str; 6] = ["high", "Medium", "low", "none", "unknown", ""];

fn arb_row() -> impl Strategy<Value = PriceRow> {
    (
        0usize..SOURCES.len(),
        prop::option::of(0.0f64..500.0),
        prop::option::of(0i64..50),
        0usize..CONFIDENCE.len(),
        0usize..3,
    )
        .prop_map(|(source, chaos, count, confidence, variant)| {
            let mut row = PriceRow::new(SOURCES[source], "Mageblood");
            // coarse values so ties are common
            row.chaos_value = chaos.map(|c| (c / 25.0).round() * 25.0);
            row.listing_count = count.map(|c| c / 10);
            row.confidence = Some(CONFIDENCE[confidence].to_string());
            row.variant = format!("v{}", variant);
            row
        })
}

fn arb_raw_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(|f| serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)),
        ".{0,12}".prop_map(Value::String),
        Just(json!([1, "two", null])),
        Just(json!({"nested": {"deep": 1}})),
    ]
}

fn arb_raw_row() -> impl Strategy<Value = RawRow> {
    prop::collection::vec(
        (
            prop::sample::select(vec![
                "source", "item_name", "variant", "links", "chaos_value",
                "divine_value", "listing_count", "confidence", "explanation", "other",
            ]),
            arb_raw_value(),
        ),
        0..10,
    )
    .prop_map(|pairs| {
        let mut row = RawRow::new();
        for (key, value) in pairs {
            row.insert(key, value);
        }
        row
    })
}

proptest! {
    #[test]
    fn arbitration_winner_is_order_independent(
        (rows, shuffled) in prop::collection::vec(arb_row(), 0..12)
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle())),
    ) {
        let priority: Vec<String> = vec!["trade".into(), "ninja".into()];
        let expected = arbitrate(&rows, &priority);

        prop_assert_eq!(arbitrate(&shuffled, &priority), expected.clone());

        let mut reversed = rows.clone();
        reversed.reverse();
        prop_assert_eq!(arbitrate(&reversed, &priority), expected);
    }

    #[test]
    fn arbitration_winner_is_one_of_the_priced_inputs(
        rows in prop::collection::vec(arb_row(), 0..12),
    ) {
        match arbitrate(&rows, &[]) {
            Some(winner) => {
                prop_assert!(winner.chaos_value.is_some());
                prop_assert!(rows.contains(&winner));
            }
            None => prop_assert!(rows.iter().all(|r| r.chaos_value.is_none())),
        }
    }

    #[test]
    fn normalization_is_total_and_idempotent(raw in arb_raw_row()) {
        let once = normalize_row(&raw);
        let twice = normalize_row(&RawRow::from(&once));

        prop_assert_eq!(&once, &twice);
        prop_assert!(once.chaos_value.map_or(true, f64::is_finite));
        prop_assert_eq!(once.confidence.is_some(), raw.contains_key("confidence"));
    }

    #[test]
    fn raw_arbitration_never_panics(rows in prop::collection::vec(arb_raw_row(), 0..8)) {
        let _ = arbitrate_raw(&rows, &[]);
    }
}
