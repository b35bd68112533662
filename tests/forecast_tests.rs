use capacity_planner::{CapacityPlan, forecast};
use chrono::NaiveDate;

fn plan(month: u32, year: i32, utilization_rate: f64) -> CapacityPlan {
    CapacityPlan {
        resource_id: "r1".into(),
        project_id: "p1".into(),
        month,
        year,
        planned_capacity: 10.0,
        utilization_rate,
        efficiency_score: 0.6,
        strategy: None,
    }
}

#[test]
fn averages_same_month_of_earlier_years() {
    let history = vec![
        plan(4, 2023, 0.5),
        plan(4, 2024, 0.7),
        plan(5, 2024, 0.9),
        plan(4, 2026, 0.1),
    ];
    let reference = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
    let result = forecast(2, reference, &history);

    let april = &result["2025-04"];
    assert!((april.predicted_utilization - 0.6).abs() < 1e-9);
    assert_eq!(april.confidence_level, 0.6);
    assert_eq!(april.sample_size, 2);
    assert_eq!(result["2025-05"].predicted_utilization, 0.9);
}

#[test]
fn months_without_history_are_omitted() {
    let history = vec![plan(1, 2024, 0.8)];
    let reference = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    let result = forecast(3, reference, &history);
    assert!(result.is_empty());
    assert!(forecast(0, reference, &history).is_empty());
}

#[test]
fn confidence_rises_above_five_samples() {
    let five: Vec<CapacityPlan> = (0..5).map(|i| plan(7, 2020 + i, 0.5)).collect();
    let reference = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    assert_eq!(forecast(1, reference, &five)["2025-07"].confidence_level, 0.6);

    let six: Vec<CapacityPlan> = (0..6).map(|i| plan(7, 2018 + i, 0.5)).collect();
    assert_eq!(forecast(1, reference, &six)["2025-07"].confidence_level, 0.8);
}

#[test]
fn keys_are_chronological() {
    let history: Vec<CapacityPlan> = (1..=12).map(|m| plan(m, 2020, 0.5)).collect();
    let reference = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
    let keys: Vec<String> = forecast(4, reference, &history).into_keys().collect();
    assert_eq!(keys, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
}
