use super::{PersistenceResult, PlanStore};
use crate::plan::{DayPlan, IntervalRow};
use crate::policy::StaffingPolicy;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plan_policy (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                policy_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS plan_intervals (
                idx INTEGER PRIMARY KEY,
                interval_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_policy(
        &self,
        tx: &rusqlite::Transaction,
        policy: &StaffingPolicy,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(policy)?;
        tx.execute("DELETE FROM plan_policy", [])?;
        tx.execute(
            "INSERT INTO plan_policy (id, policy_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_intervals(&self, tx: &rusqlite::Transaction, plan: &DayPlan) -> PersistenceResult<()> {
        tx.execute("DELETE FROM plan_intervals", [])?;
        let mut stmt = tx.prepare("INSERT INTO plan_intervals (idx, interval_json) VALUES (?1, ?2)")?;
        for (idx, interval) in plan.intervals()?.iter().enumerate() {
            let json = serde_json::to_string(interval)?;
            stmt.execute(params![idx as i64, json])?;
        }
        Ok(())
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &DayPlan) -> PersistenceResult<()> {
        super::validate_policy(plan.policy())?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_policy(&tx, plan.policy())?;
        self.save_intervals(&tx, plan)?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<DayPlan>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT policy_json FROM plan_policy WHERE id = 1")?;
        let policy_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(policy_json) = policy_json_opt else {
            return Ok(None);
        };

        let policy: StaffingPolicy = serde_json::from_str(&policy_json)?;

        let mut stmt =
            conn.prepare("SELECT interval_json FROM plan_intervals ORDER BY idx ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut plan = DayPlan::with_policy(policy)
            .map_err(|err| super::PersistenceError::InvalidData(err.to_string()))?;
        for json in rows {
            let json = json?;
            let interval: IntervalRow = serde_json::from_str(&json)?;
            plan.push_interval(interval)?;
        }

        Ok(Some(plan))
    }
}
