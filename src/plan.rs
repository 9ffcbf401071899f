use crate::calculations::staffing::{self, MODEL_VALIDITY_LIMIT, StaffingRequirement};
use crate::policy::{StaffingError, StaffingPolicy};
use chrono::NaiveTime;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%H:%M";

/// One reporting interval of the day. `calls` is the forecast input;
/// the remaining fields are derived on refresh and stay `None` until
/// then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRow {
    #[serde(default)]
    pub time: Option<NaiveTime>,
    pub calls: f64,
    #[serde(default)]
    pub intensity: Option<f64>,
    #[serde(default)]
    pub required_agents: Option<u32>,
    #[serde(default)]
    pub service_level: Option<f64>,
    #[serde(default)]
    pub occupancy: Option<f64>,
}

impl IntervalRow {
    pub fn new(calls: f64) -> Self {
        Self {
            time: None,
            calls,
            intensity: None,
            required_agents: None,
            service_level: None,
            occupancy: None,
        }
    }

    pub fn with_time(time: NaiveTime, calls: f64) -> Self {
        Self {
            time: Some(time),
            ..Self::new(calls)
        }
    }

    pub(crate) fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(6);

        let time_string = self.time.map(|t| t.format(TIME_FORMAT).to_string());
        let time_data: [Option<&str>; 1] = [time_string.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("time"), time_data).into_column());

        let calls_data: [f64; 1] = [self.calls];
        columns.push(Series::new(PlSmallStr::from_static("calls"), calls_data).into_column());

        let intensity_data: [Option<f64>; 1] = [self.intensity];
        columns
            .push(Series::new(PlSmallStr::from_static("intensity"), intensity_data).into_column());

        let required_data: [Option<i64>; 1] = [self.required_agents.map(i64::from)];
        columns.push(
            Series::new(PlSmallStr::from_static("required_agents"), required_data).into_column(),
        );

        let level_data: [Option<f64>; 1] = [self.service_level];
        columns
            .push(Series::new(PlSmallStr::from_static("service_level"), level_data).into_column());

        let occupancy_data: [Option<f64>; 1] = [self.occupancy];
        columns
            .push(Series::new(PlSmallStr::from_static("occupancy"), occupancy_data).into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let time = match df.column("time")?.str()?.get(row_idx) {
            Some(text) if !text.trim().is_empty() => Some(
                NaiveTime::parse_from_str(text.trim(), TIME_FORMAT).map_err(|err| {
                    PolarsError::ComputeError(format!("invalid time '{text}': {err}").into())
                })?,
            ),
            _ => None,
        };

        let calls = df.column("calls")?.f64()?.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError("interval row missing call volume".into())
        })?;

        Ok(Self {
            time,
            calls,
            intensity: df.column("intensity")?.f64()?.get(row_idx),
            required_agents: df
                .column("required_agents")?
                .i64()?
                .get(row_idx)
                .map(|v| v as u32),
            service_level: df.column("service_level")?.f64()?.get(row_idx),
            occupancy: df.column("occupancy")?.f64()?.get(row_idx),
        })
    }

    pub fn time_label(&self) -> Option<String> {
        self.time.map(|t| t.format(TIME_FORMAT).to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub interval_count: usize,
    pub total_calls: f64,
    pub peak_required_agents: u32,
    pub peak_interval: Option<String>,
    pub advisory_interval_count: usize,
}

impl PlanSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("intervals={}", self.interval_count));
        parts.push(format!("calls={}", self.total_calls));
        parts.push(format!("peak_agents={}", self.peak_required_agents));
        if let Some(label) = &self.peak_interval {
            parts.push(format!("peak_at={label}"));
        }
        if self.advisory_interval_count > 0 {
            parts.push(format!("advisories={}", self.advisory_interval_count));
        }
        parts.join(", ")
    }
}

/// A day's worth of forecast intervals plus the policy applied to each
/// of them. The DataFrame is the single source of truth for the rows.
#[derive(Debug)]
pub struct DayPlan {
    df: DataFrame,
    policy: StaffingPolicy,
}

impl DayPlan {
    pub fn new() -> Self {
        Self::from_parts(StaffingPolicy::default())
    }

    pub fn with_policy(policy: StaffingPolicy) -> Result<Self, StaffingError> {
        policy.validate()?;
        Ok(Self::from_parts(policy))
    }

    pub(crate) fn from_parts(policy: StaffingPolicy) -> Self {
        let schema = Self::default_schema();
        Self {
            df: DataFrame::empty_with_schema(&schema),
            policy,
        }
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("time".into(), DataType::String),
            Field::new("calls".into(), DataType::Float64),
            Field::new("intensity".into(), DataType::Float64),
            Field::new("required_agents".into(), DataType::Int64),
            Field::new("service_level".into(), DataType::Float64),
            Field::new("occupancy".into(), DataType::Float64),
        ])
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn policy(&self) -> &StaffingPolicy {
        &self.policy
    }

    /// Replace the policy. Rejected policies leave the current one in
    /// place; derived columns go stale until the next refresh.
    pub fn set_policy(&mut self, policy: StaffingPolicy) -> Result<(), StaffingError> {
        policy.validate()?;
        self.policy = policy;
        Ok(())
    }

    pub fn interval_count(&self) -> usize {
        self.df.height()
    }

    pub fn intervals(&self) -> Result<Vec<IntervalRow>, PolarsError> {
        let mut rows = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            rows.push(IntervalRow::from_dataframe_row(&self.df, idx)?);
        }
        Ok(rows)
    }

    pub fn interval(&self, idx: usize) -> Result<Option<IntervalRow>, PolarsError> {
        if idx >= self.df.height() {
            return Ok(None);
        }
        IntervalRow::from_dataframe_row(&self.df, idx).map(Some)
    }

    pub fn push_interval(&mut self, row: IntervalRow) -> Result<(), PolarsError> {
        let new_row = row.to_dataframe_row()?;
        self.df = self.df.vstack(&new_row)?;
        Ok(())
    }

    /// Replace the interval at `idx`. Returns false when the index is
    /// out of bounds.
    pub fn replace_interval(&mut self, idx: usize, row: IntervalRow) -> Result<bool, PolarsError> {
        if idx >= self.df.height() {
            return Ok(false);
        }
        let mut rows = self.intervals()?;
        rows[idx] = row;
        self.rebuild_from_rows(rows)?;
        Ok(true)
    }

    /// Remove the interval at `idx`. Returns false when the index is
    /// out of bounds.
    pub fn delete_interval(&mut self, idx: usize) -> Result<bool, PolarsError> {
        if idx >= self.df.height() {
            return Ok(false);
        }
        let mut rows = self.intervals()?;
        rows.remove(idx);
        self.rebuild_from_rows(rows)?;
        Ok(true)
    }

    fn rebuild_from_rows(&mut self, rows: Vec<IntervalRow>) -> Result<(), PolarsError> {
        self.df = DataFrame::empty_with_schema(&Self::default_schema());
        for row in rows {
            self.push_interval(row)?;
        }
        Ok(())
    }

    /// Recompute the derived columns for every interval.
    ///
    /// Rows are independent, so the per-row solve runs in parallel.
    /// A solver failure (an out-of-range policy snuck in through
    /// deserialization, or an unbounded search) aborts the whole
    /// refresh; no partial column updates are left behind.
    pub fn refresh(&mut self) -> Result<PlanSummary, PolarsError> {
        let calls: Vec<f64> = self
            .df
            .column("calls")?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        let results: Result<Vec<StaffingRequirement>, StaffingError> = calls
            .par_iter()
            .map(|&value| staffing::solve(value, &self.policy))
            .collect();
        let results =
            results.map_err(|err| PolarsError::ComputeError(err.to_string().into()))?;

        let intensity: Vec<f64> = results.iter().map(|r| r.intensity).collect();
        let required: Vec<i64> = results.iter().map(|r| i64::from(r.required_agents)).collect();
        let level: Vec<f64> = results.iter().map(|r| r.service_level).collect();
        let occupancy: Vec<f64> = results.iter().map(|r| r.occupancy).collect();

        self.df.replace(
            "intensity",
            Series::new(PlSmallStr::from_static("intensity"), intensity),
        )?;
        self.df.replace(
            "required_agents",
            Series::new(PlSmallStr::from_static("required_agents"), required),
        )?;
        self.df.replace(
            "service_level",
            Series::new(PlSmallStr::from_static("service_level"), level),
        )?;
        self.df.replace(
            "occupancy",
            Series::new(PlSmallStr::from_static("occupancy"), occupancy),
        )?;

        let summary = self.summarize(&results)?;
        log::debug!("plan refresh: {}", summary.to_cli_summary());
        Ok(summary)
    }

    fn summarize(&self, results: &[StaffingRequirement]) -> Result<PlanSummary, PolarsError> {
        let total_calls = results.iter().map(|r| r.calls).sum();
        let advisory_interval_count = results
            .iter()
            .filter(|r| r.required_agents > MODEL_VALIDITY_LIMIT)
            .count();

        let peak = results
            .iter()
            .enumerate()
            .max_by_key(|(_, r)| r.required_agents);
        let (peak_required_agents, peak_interval) = match peak {
            Some((idx, requirement)) => {
                let label = IntervalRow::from_dataframe_row(&self.df, idx)?.time_label();
                (requirement.required_agents, label)
            }
            None => (0, None),
        };

        Ok(PlanSummary {
            interval_count: results.len(),
            total_calls,
            peak_required_agents,
            peak_interval,
            advisory_interval_count,
        })
    }
}

impl Default for DayPlan {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_contains_expected_columns() {
        let schema = DayPlan::default_schema();
        let expected = vec![
            "time",
            "calls",
            "intensity",
            "required_agents",
            "service_level",
            "occupancy",
        ];
        for name in expected {
            assert!(schema.contains(name.into()), "missing column {name}");
        }
    }

    #[test]
    fn push_and_replace_intervals() {
        let mut plan = DayPlan::new();
        plan.push_interval(IntervalRow::new(50.0)).unwrap();
        plan.push_interval(IntervalRow::new(75.0)).unwrap();
        assert_eq!(plan.interval_count(), 2);

        let replaced = plan
            .replace_interval(1, IntervalRow::new(120.0))
            .unwrap();
        assert!(replaced);
        assert_eq!(plan.interval(1).unwrap().unwrap().calls, 120.0);

        assert!(!plan.replace_interval(5, IntervalRow::new(1.0)).unwrap());
    }
}
