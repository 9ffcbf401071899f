use super::{PersistenceError, PersistenceResult};
use crate::plan::{DayPlan, IntervalRow};
use crate::policy::StaffingPolicy;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    policy: StaffingPolicy,
    intervals: Vec<IntervalRow>,
}

impl PlanSnapshot {
    fn from_plan(plan: &DayPlan) -> PersistenceResult<Self> {
        super::validate_policy(plan.policy())?;
        Ok(Self {
            policy: plan.policy().clone(),
            intervals: plan.intervals()?,
        })
    }

    fn into_plan(self) -> PersistenceResult<DayPlan> {
        let mut plan = DayPlan::with_policy(self.policy)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        for interval in self.intervals {
            plan.push_interval(interval)?;
        }
        Ok(plan)
    }
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &DayPlan, path: P) -> PersistenceResult<()> {
    let snapshot = PlanSnapshot::from_plan(plan)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<DayPlan> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    snapshot.into_plan()
}

/// CSV row shape. Everything is a string so the same record type can
/// carry the policy metadata row, partially-filled user uploads (a
/// bare "Calls" column is enough), and fully computed exports. The
/// aliases accept the capitalized headings spreadsheet exports use.
#[derive(Default, Serialize, Deserialize)]
struct IntervalCsvRecord {
    #[serde(default, alias = "Time")]
    time: String,
    #[serde(default, alias = "Calls")]
    calls: String,
    #[serde(default)]
    intensity: String,
    #[serde(default, alias = "Required Agents")]
    required_agents: String,
    #[serde(default)]
    service_level: String,
    #[serde(default)]
    occupancy: String,
    #[serde(default)]
    policy_json: String,
}

impl From<&IntervalRow> for IntervalCsvRecord {
    fn from(interval: &IntervalRow) -> Self {
        let mut record = IntervalCsvRecord::default();
        record.time = interval.time_label().unwrap_or_default();
        record.calls = interval.calls.to_string();
        record.intensity = format_option_f64(interval.intensity);
        record.required_agents = interval
            .required_agents
            .map(|v| v.to_string())
            .unwrap_or_default();
        record.service_level = format_option_f64(interval.service_level);
        record.occupancy = format_option_f64(interval.occupancy);
        record
    }
}

impl IntervalCsvRecord {
    fn metadata_row(plan: &DayPlan) -> PersistenceResult<Self> {
        let policy_json = serde_json::to_string(plan.policy())?;
        let mut record = IntervalCsvRecord::default();
        record.policy_json = policy_json;
        record.time = "__policy__".to_string();
        Ok(record)
    }

    fn is_metadata_row(&self) -> bool {
        !self.policy_json.trim().is_empty()
    }

    fn into_interval(self) -> PersistenceResult<IntervalRow> {
        if self.is_metadata_row() {
            return Err(PersistenceError::InvalidData(
                "policy row cannot be converted to an interval".into(),
            ));
        }
        let calls = self.calls.trim().parse::<f64>().map_err(|e| {
            PersistenceError::InvalidData(format!("invalid call volume '{}': {e}", self.calls))
        })?;
        Ok(IntervalRow {
            time: parse_time(&self.time)?,
            calls,
            intensity: parse_f64(&self.intensity)?,
            required_agents: parse_u32(&self.required_agents)?,
            service_level: parse_f64(&self.service_level)?,
            occupancy: parse_f64(&self.occupancy)?,
        })
    }
}

pub fn save_plan_to_csv<P: AsRef<Path>>(plan: &DayPlan, path: P) -> PersistenceResult<()> {
    super::validate_policy(plan.policy())?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(IntervalCsvRecord::metadata_row(plan)?)?;
    for interval in plan.intervals()? {
        writer.serialize(IntervalCsvRecord::from(&interval))?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a plan from CSV. Accepts both this tool's own exports (which
/// carry a policy row) and plain forecast uploads with just a Calls
/// column; in the latter case the default policy applies.
pub fn load_plan_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<DayPlan> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut intervals = Vec::new();
    let mut policy: Option<StaffingPolicy> = None;
    for record in reader.deserialize::<IntervalCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if policy.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple policy rows".into(),
                ));
            }
            policy = Some(serde_json::from_str(&record.policy_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid policy json: {err}"))
            })?);
            continue;
        }
        intervals.push(record.into_interval()?);
    }

    if intervals.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no intervals".into(),
        ));
    }

    let mut plan = DayPlan::with_policy(policy.unwrap_or_default())
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    for interval in intervals {
        plan.push_interval(interval)?;
    }
    Ok(plan)
}

fn parse_time(input: &str) -> PersistenceResult<Option<NaiveTime>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid time '{input}': {e}")))
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid float '{input}': {e}")))
}

fn parse_u32(input: &str) -> PersistenceResult<Option<u32>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<u32>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid integer '{input}': {e}")))
}
