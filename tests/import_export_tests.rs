use chrono::NaiveTime;
use staffing_tool::{
    DayPlan, IntervalRow, PersistenceError, StaffingPolicy, load_plan_from_csv,
    load_plan_from_json, save_plan_to_csv, save_plan_to_json,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn build_sample_plan() -> DayPlan {
    let policy = StaffingPolicy {
        service_level_target: 0.90,
        shrinkage: 0.25,
        ..StaffingPolicy::default()
    };
    let mut plan = DayPlan::with_policy(policy).unwrap();
    plan.push_interval(IntervalRow::with_time(t(8, 0), 42.0))
        .unwrap();
    plan.push_interval(IntervalRow::with_time(t(8, 30), 133.0))
        .unwrap();
    plan.refresh().unwrap();
    plan
}

#[test]
fn json_round_trip_preserves_plan() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_plan_to_json(&plan, file.path()).unwrap();
    let loaded = load_plan_from_json(file.path()).unwrap();

    assert_eq!(loaded.policy(), plan.policy());
    assert_eq!(loaded.intervals().unwrap(), plan.intervals().unwrap());
}

#[test]
fn csv_round_trip_preserves_plan_and_policy() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_plan_to_csv(&plan, file.path()).unwrap();
    let loaded = load_plan_from_csv(file.path()).unwrap();

    assert_eq!(loaded.policy(), plan.policy());
    assert_eq!(loaded.intervals().unwrap(), plan.intervals().unwrap());
}

#[test]
fn plain_forecast_csv_loads_with_default_policy() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Time,Calls").unwrap();
    writeln!(file, "09:00,100").unwrap();
    writeln!(file, "09:30,80.5").unwrap();
    file.flush().unwrap();

    let plan = load_plan_from_csv(file.path()).unwrap();
    assert_eq!(plan.policy(), &StaffingPolicy::default());

    let intervals = plan.intervals().unwrap();
    assert_eq!(intervals.len(), 2);
    assert_eq!(intervals[0].time, Some(t(9, 0)));
    assert_eq!(intervals[0].calls, 100.0);
    assert_eq!(intervals[1].calls, 80.5);
    // Nothing computed until a refresh happens
    assert!(intervals[0].required_agents.is_none());
}

#[test]
fn calls_only_csv_is_enough() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Calls").unwrap();
    writeln!(file, "50").unwrap();
    file.flush().unwrap();

    let plan = load_plan_from_csv(file.path()).unwrap();
    let intervals = plan.intervals().unwrap();
    assert_eq!(intervals.len(), 1);
    assert!(intervals[0].time.is_none());
    assert_eq!(intervals[0].calls, 50.0);
}

#[test]
fn csv_without_intervals_is_invalid() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Time,Calls").unwrap();
    file.flush().unwrap();

    match load_plan_from_csv(file.path()) {
        Err(PersistenceError::InvalidData(message)) => {
            assert!(message.contains("no intervals"), "got: {message}")
        }
        other => panic!("expected InvalidData, got {other:?}"),
    }
}

#[test]
fn csv_with_unparseable_calls_is_invalid() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Calls").unwrap();
    writeln!(file, "lots").unwrap();
    file.flush().unwrap();

    assert!(matches!(
        load_plan_from_csv(file.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn loaded_plan_recomputes_cleanly() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    save_plan_to_csv(&plan, file.path()).unwrap();

    let mut loaded = load_plan_from_csv(file.path()).unwrap();
    let summary = loaded.refresh().unwrap();
    assert_eq!(summary.interval_count, 2);
    assert_eq!(summary.peak_interval.as_deref(), Some("08:30"));
}
