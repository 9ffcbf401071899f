use chrono::NaiveTime;
use staffing_tool::{DayPlan, IntervalRow, StaffingPolicy};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn build_sample_plan() -> DayPlan {
    let mut plan = DayPlan::new();
    plan.push_interval(IntervalRow::with_time(t(9, 0), 100.0))
        .unwrap();
    plan.push_interval(IntervalRow::with_time(t(9, 30), 250.0))
        .unwrap();
    plan.push_interval(IntervalRow::with_time(t(10, 0), 0.0))
        .unwrap();
    plan
}

#[test]
fn refresh_fills_derived_columns_for_every_interval() {
    let mut plan = build_sample_plan();
    let summary = plan.refresh().unwrap();

    assert_eq!(summary.interval_count, 3);
    assert_eq!(summary.total_calls, 350.0);

    let intervals = plan.intervals().unwrap();
    for interval in &intervals {
        assert!(interval.required_agents.is_some());
        assert!(interval.intensity.is_some());
        assert!(interval.service_level.is_some());
        assert!(interval.occupancy.is_some());
    }

    // Busy interval needs more agents than the quiet one
    assert!(intervals[1].required_agents > intervals[0].required_agents);
    // No traffic, no agents
    assert_eq!(intervals[2].required_agents, Some(0));
    assert_eq!(intervals[2].intensity, Some(0.0));
}

#[test]
fn summary_reports_peak_interval() {
    let mut plan = build_sample_plan();
    let summary = plan.refresh().unwrap();

    assert_eq!(summary.peak_interval.as_deref(), Some("09:30"));
    let peak = plan.interval(1).unwrap().unwrap();
    assert_eq!(Some(summary.peak_required_agents), peak.required_agents);

    let rendered = summary.to_cli_summary();
    assert!(rendered.contains("intervals=3"), "got: {rendered}");
    assert!(rendered.contains("peak_at=09:30"), "got: {rendered}");
}

#[test]
fn empty_plan_refreshes_to_an_empty_summary() {
    let mut plan = DayPlan::new();
    let summary = plan.refresh().unwrap();
    assert_eq!(summary.interval_count, 0);
    assert_eq!(summary.peak_required_agents, 0);
    assert!(summary.peak_interval.is_none());
}

#[test]
fn invalid_policy_is_rejected_and_previous_policy_kept() {
    let mut plan = DayPlan::new();
    let rejected = StaffingPolicy {
        service_level_target: 1.5,
        ..StaffingPolicy::default()
    };
    assert!(plan.set_policy(rejected).is_err());
    assert_eq!(plan.policy().service_level_target, 0.80);
}

#[test]
fn policy_change_shows_up_in_next_refresh() {
    let mut plan = build_sample_plan();
    let before = plan.refresh().unwrap().peak_required_agents;

    // Dropping shrinkage to zero reduces the inflated requirement.
    let relaxed = StaffingPolicy {
        shrinkage: 0.0,
        ..plan.policy().clone()
    };
    plan.set_policy(relaxed).unwrap();
    let after = plan.refresh().unwrap().peak_required_agents;
    assert!(after < before, "expected {after} < {before}");
}

#[test]
fn delete_interval_shrinks_the_plan() {
    let mut plan = build_sample_plan();
    assert!(plan.delete_interval(1).unwrap());
    assert_eq!(plan.interval_count(), 2);
    // Remaining rows keep their order
    let intervals = plan.intervals().unwrap();
    assert_eq!(intervals[0].calls, 100.0);
    assert_eq!(intervals[1].calls, 0.0);

    assert!(!plan.delete_interval(10).unwrap());
}

#[test]
fn interval_lookup_out_of_bounds_is_none() {
    let plan = build_sample_plan();
    assert!(plan.interval(3).unwrap().is_none());
    assert!(plan.interval(0).unwrap().is_some());
}
