//! Tests for top-N cause trends

use super::*;
use crate::aggregation::trend::{TrendEntity, top_n_trend};

#[test]
fn test_top_causes_chosen_from_observed_week_with_full_history() {
    let rows = vec![
        stop("M1", "TOOL CHANGE", 600, WEEK_10),
        stop("M1", "POWER CUT", 6000, WEEK_10),
        stop("M1", "TOOL CHANGE", 1200, WEEK_11),
        stop("M1", "POWER CUT", 60, WEEK_11),
        stop("M1", "CLEANING", 900, WEEK_11),
    ];

    let trend = top_n_trend(&rows, WEEK_11, TrendEntity::Machine, 2, &trend_buckets());

    let flattened: Vec<(WeekStamp, &str, i64)> = trend
        .iter()
        .map(|row| (row.week, row.cause.as_str(), row.seconds))
        .collect();
    assert_eq!(
        flattened,
        vec![
            (WEEK_11, "TOOL CHANGE", 1200),
            (WEEK_11, "CLEANING", 900),
            (WEEK_10, "TOOL CHANGE", 600),
        ]
    );
    assert!(trend.iter().all(|row| row.entity == "M1"));
    assert_eq!(trend[0].minutes, 20);
}

#[test]
fn test_trend_merges_meals_but_not_setup() {
    let rows = vec![
        stop("M1", "MEAL BREAK - SHIFT1", 600, WEEK_10),
        stop("M1", "MEAL BREAK - SHIFT2", 600, WEEK_10),
        stop("M1", "SMED KALIP", 300, WEEK_10),
        stop("M1", "SETUP", 200, WEEK_10),
    ];

    let trend = top_n_trend(&rows, WEEK_10, TrendEntity::Machine, 10, &trend_buckets());
    let causes: Vec<&str> = trend.iter().map(|row| row.cause.as_str()).collect();
    assert_eq!(causes, vec!["MEAL BREAK", "SMED KALIP", "SETUP"]);
}

#[test]
fn test_group_trend_is_limited_per_group_and_skips_unassigned() {
    let rows = vec![
        stop("M1", "TOOL CHANGE", 600, WEEK_10),
        stop("M2", "POWER CUT", 300, WEEK_10),
        stop("M3", "CLEANING", 100, WEEK_10),
        stop("M4", "CLEANING", 50, WEEK_10),
        stop("X9", "TOOL CHANGE", 9000, WEEK_10),
    ];

    let trend = top_n_trend(&rows, WEEK_10, TrendEntity::Group, 1, &trend_buckets());
    let flattened: Vec<(&str, &str)> = trend
        .iter()
        .map(|row| (row.entity.as_str(), row.cause.as_str()))
        .collect();
    assert_eq!(
        flattened,
        vec![("LINE A", "TOOL CHANGE"), ("LINE B", "CLEANING")]
    );
}

#[test]
fn test_ties_keep_key_order() {
    let rows = vec![
        stop("M1", "B CAUSE", 600, WEEK_10),
        stop("M1", "A CAUSE", 600, WEEK_10),
        stop("M1", "C CAUSE", 600, WEEK_10),
    ];

    let trend = top_n_trend(&rows, WEEK_10, TrendEntity::Machine, 2, &trend_buckets());
    let causes: Vec<&str> = trend.iter().map(|row| row.cause.as_str()).collect();
    assert_eq!(causes, vec!["A CAUSE", "B CAUSE"]);
}

#[test]
fn test_entity_absent_from_observed_week_has_no_trend() {
    let rows = vec![
        stop("M1", "TOOL CHANGE", 600, WEEK_10),
        stop("M2", "TOOL CHANGE", 600, WEEK_11),
    ];

    let trend = top_n_trend(&rows, WEEK_11, TrendEntity::Machine, 10, &trend_buckets());
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0].entity, "M2");
}
