#![cfg(feature = "sqlite")]

use chrono::NaiveTime;
use staffing_tool::{DayPlan, IntervalRow, PlanStore, SqlitePlanStore, StaffingPolicy};
use tempfile::NamedTempFile;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn build_sample_plan() -> DayPlan {
    let policy = StaffingPolicy {
        shrinkage: 0.30,
        ..StaffingPolicy::default()
    };
    let mut plan = DayPlan::with_policy(policy).unwrap();
    plan.push_interval(IntervalRow::with_time(t(9, 0), 60.0))
        .unwrap();
    plan.push_interval(IntervalRow::new(90.0)).unwrap();
    plan.refresh().unwrap();
    plan
}

#[test]
fn save_and_load_round_trip() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlanStore::new(file.path()).unwrap();

    let plan = build_sample_plan();
    store.save_plan(&plan).unwrap();

    let loaded = store.load_plan().unwrap().expect("plan should exist");
    assert_eq!(loaded.policy(), plan.policy());
    assert_eq!(loaded.intervals().unwrap(), plan.intervals().unwrap());
}

#[test]
fn fresh_store_has_no_plan() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlanStore::new(file.path()).unwrap();
    assert!(store.load_plan().unwrap().is_none());
}

#[test]
fn save_overwrites_previous_plan() {
    let file = NamedTempFile::new().unwrap();
    let store = SqlitePlanStore::new(file.path()).unwrap();

    store.save_plan(&build_sample_plan()).unwrap();

    let mut replacement = DayPlan::new();
    replacement
        .push_interval(IntervalRow::new(12.0))
        .unwrap();
    store.save_plan(&replacement).unwrap();

    let loaded = store.load_plan().unwrap().expect("plan should exist");
    assert_eq!(loaded.interval_count(), 1);
    assert_eq!(loaded.interval(0).unwrap().unwrap().calls, 12.0);
    assert_eq!(loaded.policy(), &StaffingPolicy::default());
}
