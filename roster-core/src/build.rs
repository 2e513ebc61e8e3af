//! Top-level orchestration: calendar -> classifier -> validator -> model -> solver ->
//! result validator -> response. Mirrors the linear pipeline shape of spec.md §2.

use crate::calendar::{self, HolidayOracle, NoHolidays};
use crate::classifier;
use crate::duty::Duty;
use crate::error::RosterResult;
use crate::model;
use crate::request::RosterRequest;
use crate::response::{NurseWalletOut, RosterResponse, Schedule, SolverStats};
use crate::result_validator;
use crate::solver::{self, SolverConfig};
use indexmap::IndexMap;

/// Builds a roster for `request` using the default (no-holiday) oracle and solver
/// configuration. This is the entry point the CLI binary calls.
pub fn build_roster(request: &RosterRequest) -> RosterResult<RosterResponse> {
    build_roster_with(request, &NoHolidays, &SolverConfig::default())
}

/// Full pipeline with caller-supplied collaborators, kept separate from
/// `build_roster` so tests and alternative front-ends can inject a real holiday
/// oracle or a deterministic solver seed.
pub fn build_roster_with<H: HolidayOracle>(
    request: &RosterRequest,
    holiday_oracle: &H,
    solver_config: &SolverConfig,
) -> RosterResult<RosterResponse> {
    let calendar = calendar::build_calendar(
        request.year,
        request.month,
        &request.daily_wallet_config,
        holiday_oracle,
    )?;

    crate::validator::validate(request, &calendar)?;

    let classified = classifier::classify(request, &calendar)?;

    let built_model = model::build_model(request, &calendar, &classified)?;

    let outcome = solver::solve(built_model, &calendar, &classified, solver_config)?;

    let validation = result_validator::validate_result(&outcome, &calendar, &classified);

    let schedule = build_schedule(&classified, &calendar, &outcome);
    let nurse_wallets: IndexMap<String, NurseWalletOut> = classified
        .nurses
        .iter()
        .map(|nurse| {
            let wallet = classified.wallets[&nurse.name];
            (
                nurse.name.clone(),
                NurseWalletOut {
                    n: wallet.target_n,
                    x: wallet.target_x,
                },
            )
        })
        .collect();

    let solver_stats = SolverStats {
        objective_value: outcome.objective_value,
        wall_time_seconds: outcome.wall_time_seconds,
        num_branches: 0,
    };

    Ok(RosterResponse::success(schedule, nurse_wallets, validation, solver_stats))
}

fn build_schedule(
    classified: &classifier::ClassifiedRoster,
    calendar: &calendar::CalendarResult,
    outcome: &solver::SolveOutcome,
) -> Schedule {
    let mut schedule = Schedule::new();
    for (idx, nurse) in classified.nurses.iter().enumerate() {
        let mut days: IndexMap<String, Duty> = IndexMap::new();
        for (slot, past_duty) in [-3i64, -2, -1].into_iter().zip(nurse.past_3days) {
            days.insert(slot.to_string(), past_duty);
        }
        for day in 1..=calendar.num_days {
            if let Some(&duty) = outcome.assignment.get(&(idx, day)) {
                days.insert(day.to_string(), duty);
            }
        }
        schedule.insert(nurse.name.clone(), days);
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duty::{DePreference, KeepType};
    use crate::request::{DailyWalletConfig, DutyCounts, NurseInput, NurseWalletMin};

    fn e1_request() -> RosterRequest {
        RosterRequest {
            year: 2025,
            month: 2,
            daily_wallet_config: DailyWalletConfig {
                weekday: DutyCounts { d: 2, e: 2, n: 2, x: 2 },
                weekend: DutyCounts { d: 1, e: 1, n: 1, x: 5 },
            },
            nurse_wallet_min: NurseWalletMin { n: 6 },
            max_consecutive_work: 6,
            nurses: (0..8)
                .map(|i| NurseInput {
                    name: format!("nurse_{}", i),
                    keep_type: KeepType::All,
                    past_3days: [Duty::X, Duty::X, Duty::X],
                    is_low_grade: false,
                    de_preference: DePreference::Neutral,
                    special_days: 0,
                })
                .collect(),
            new: vec![],
            quit: vec![],
            preferences: vec![],
        }
    }

    #[test]
    fn e4_forbidden_past_pattern_is_rejected_before_solving() {
        let mut request = e1_request();
        request.nurses[0].past_3days = [Duty::N, Duty::D, Duty::N];
        let result = build_roster(&request);
        assert!(result.is_err());
    }
}
