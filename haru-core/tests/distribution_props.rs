//! Property tests for the workload distribution engine.

use chrono::{Duration, NaiveDate};
use haru_core::{Planner, SubjectAllocation};
use proptest::prelude::*;

fn weights_strategy() -> impl Strategy<Value = Vec<SubjectAllocation>> {
    prop::collection::vec(0.1f64..100.0, 1..8).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, w)| SubjectAllocation::weight(format!("과목{i}"), w))
            .collect()
    })
}

proptest! {
    #[test]
    fn weighted_days_sum_to_budget(
        allocations in weights_strategy(),
        budget in 0.5f64..12.0,
        days_ahead in 2i64..30,
    ) {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let exam = today + Duration::days(days_ahead);

        let blocks = Planner::default()
            .allocate(exam, today, &allocations, Some(budget))
            .unwrap();
        prop_assert_eq!(blocks.len(), allocations.len() * (days_ahead as usize - 1));

        for day in blocks.chunks(allocations.len()) {
            let total: f64 = day.iter().map(|b| b.hours).sum();
            prop_assert!((total - budget).abs() < 1e-9);
            prop_assert!(day.iter().all(|b| b.date == day[0].date));
        }
    }

    #[test]
    fn absolute_hours_are_fully_spent(
        hours in 1.0f64..200.0,
        days_ahead in 2i64..60,
    ) {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let exam = today + Duration::days(days_ahead);

        let blocks = Planner::default()
            .allocate(exam, today, &[SubjectAllocation::hours("수학", hours)], None)
            .unwrap();
        let total: f64 = blocks.iter().map(|b| b.hours).sum();
        prop_assert!((total - hours).abs() < 1e-6);
        prop_assert!(blocks.iter().all(|b| b.date > today && b.date < exam));
    }
}
