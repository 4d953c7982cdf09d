#![allow(dead_code)]

use mdfpack::table::Table;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::json;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Text without any bracket characters.
pub fn arb_plain_text(max_len: usize) -> BoxedStrategy<String> {
    proptest::collection::vec(
        any::<char>().prop_filter("no brackets", |c| !"()[]".contains(*c)),
        0..=max_len,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

/// A column name with an optional `(unit)` or `[unit]` suffix.
pub fn arb_column_name() -> BoxedStrategy<String> {
    (arb_plain_text(12), prop::option::of((any::<bool>(), arb_plain_text(6))))
        .prop_map(|(name, units)| match units {
            None => name,
            Some((true, units)) => format!("{name} ({units})"),
            Some((false, units)) => format!("{name} [{units}]"),
        })
        .boxed()
}

/// A table with 1 to `max_columns` distinct, non-empty column names and one row.
pub fn arb_table(max_columns: usize) -> BoxedStrategy<Table> {
    proptest::collection::vec(arb_column_name(), 1..=max_columns)
        .prop_map(|names| {
            let mut columns: Vec<String> = Vec::new();
            for name in names {
                if !name.is_empty() && !columns.contains(&name) {
                    columns.push(name);
                }
            }
            if columns.is_empty() {
                columns.push("x".to_string());
            }
            let row = (0..columns.len()).map(|i| json!(i)).collect();
            let mut table = Table::new(columns);
            table.push_row(row).expect("row width matches header");
            table
        })
        .boxed()
}
