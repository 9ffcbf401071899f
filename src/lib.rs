pub mod calculations;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod plan;
pub mod policy;

pub use calculations::erlang_c::{occupancy, offered_load, service_level, wait_probability};
pub use calculations::staffing::{
    AGENT_SEARCH_CEILING, MODEL_VALIDITY_LIMIT, StaffingRequirement, agents_required, solve,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, load_plan_from_csv, load_plan_from_json, save_plan_to_csv,
    save_plan_to_json,
};
pub use plan::{DayPlan, IntervalRow, PlanSummary};
pub use policy::{StaffingError, StaffingPolicy};
