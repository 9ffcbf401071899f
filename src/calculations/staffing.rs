//! Minimum-staffing search on top of the Erlang-C formulas.

use crate::calculations::erlang_c::{occupancy, offered_load, service_level};
use crate::policy::{StaffingError, StaffingPolicy};
use serde::{Deserialize, Serialize};

/// Upper bound on the incremental search. Service level rises and
/// occupancy falls with the agent count, so both phases terminate for
/// sane inputs; the ceiling catches floating-point edge cases at the
/// extremes of the parameter ranges.
pub const AGENT_SEARCH_CEILING: u32 = 100_000;

/// Above this headcount the single-queue Erlang-C assumptions stop
/// being credible. Advisory only, never blocks a result.
pub const MODEL_VALIDITY_LIMIT: u32 = 600;

/// Outcome of one staffing evaluation.
///
/// `base_agents` is the pre-shrinkage minimum found by the search;
/// `service_level` and `occupancy` are the values achieved at that
/// count, so callers can confirm both targets are actually met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingRequirement {
    pub calls: f64,
    pub intensity: f64,
    pub base_agents: u32,
    pub required_agents: u32,
    pub service_level: f64,
    pub occupancy: f64,
}

/// Find the minimum staffing for one interval under `policy`.
///
/// Validates the policy first (out-of-range parameters are reported,
/// never corrected), short-circuits zero traffic to zero agents, then
/// runs the two-phase search: raise agents until the service-level
/// target holds, then keep raising until occupancy drops under the
/// cap. Shrinkage inflation is applied last with a ceiling round.
pub fn solve(calls: f64, policy: &StaffingPolicy) -> Result<StaffingRequirement, StaffingError> {
    policy.validate()?;

    if calls == 0.0 {
        return Ok(StaffingRequirement {
            calls,
            intensity: 0.0,
            base_agents: 0,
            required_agents: 0,
            service_level: 1.0,
            occupancy: 0.0,
        });
    }

    let intensity = offered_load(
        calls,
        policy.interval_minutes,
        policy.handling_time_seconds,
    );

    let floor = intensity.floor().max(1.0);
    if !floor.is_finite() || floor > AGENT_SEARCH_CEILING as f64 {
        return Err(StaffingError::Unbounded {
            ceiling: AGENT_SEARCH_CEILING,
        });
    }
    let mut agents = floor as u32;

    // Phase A: satisfy the service-level target.
    while service_level(
        calls,
        policy.interval_minutes,
        policy.handling_time_seconds,
        policy.service_level_time_seconds,
        agents,
    ) < policy.service_level_target
    {
        agents += 1;
        if agents > AGENT_SEARCH_CEILING {
            return Err(StaffingError::Unbounded {
                ceiling: AGENT_SEARCH_CEILING,
            });
        }
    }

    // Phase B: bring occupancy under the cap. Only ever adds agents on
    // top of the Phase A result.
    while occupancy(
        calls,
        policy.interval_minutes,
        policy.handling_time_seconds,
        agents,
    ) > policy.max_occupancy_target
    {
        agents += 1;
        if agents > AGENT_SEARCH_CEILING {
            return Err(StaffingError::Unbounded {
                ceiling: AGENT_SEARCH_CEILING,
            });
        }
    }

    // Validation admits shrinkage up to 0.9998 but the inflation step
    // clamps at 0.99, so the (0.99, 0.9998] band divides by 0.01.
    let shrinkage = policy.shrinkage.clamp(0.0, 0.99);
    let required = (agents as f64 / (1.0 - shrinkage)).ceil() as u32;

    if required > MODEL_VALIDITY_LIMIT {
        log::warn!(
            "required agents {required} exceeds the Erlang-C validity range (> {MODEL_VALIDITY_LIMIT}); treat the figure as indicative"
        );
    }

    Ok(StaffingRequirement {
        calls,
        intensity,
        base_agents: agents,
        required_agents: required,
        service_level: service_level(
            calls,
            policy.interval_minutes,
            policy.handling_time_seconds,
            policy.service_level_time_seconds,
            agents,
        ),
        occupancy: occupancy(
            calls,
            policy.interval_minutes,
            policy.handling_time_seconds,
            agents,
        ),
    })
}

/// Flat-argument form of [`solve`] returning only the shrinkage-inflated
/// headcount, for callers that don't carry a policy struct around.
pub fn agents_required(
    calls: f64,
    interval_minutes: f64,
    handling_time_seconds: f64,
    service_level_target: f64,
    service_level_time_seconds: f64,
    max_occupancy_target: f64,
    shrinkage: f64,
) -> Result<u32, StaffingError> {
    let policy = StaffingPolicy {
        interval_minutes,
        handling_time_seconds,
        service_level_target,
        service_level_time_seconds,
        max_occupancy_target,
        shrinkage,
    };
    solve(calls, &policy).map(|requirement| requirement.required_agents)
}
