//! Solver Driver (spec.md §4.4, "Solver driver" subsection).
//!
//! Hands the assembled model to the `good_lp`/`microlp` engine with a bounded wall
//! time, extracts the duty grid on success, and turns solver failure into a
//! `RosterError::Solver` diagnostic carrying actionable suggestions.

use crate::calendar::CalendarResult;
use crate::classifier::ClassifiedRoster;
use crate::duty::Duty;
use crate::error::{RosterError, RosterResult};
use crate::model::{Grid, Model};
use good_lp::{microlp, Solution, SolverModel};
use std::collections::HashMap;
use std::time::Instant;

pub struct SolveOutcome {
    pub assignment: HashMap<(usize, i64), Duty>,
    pub objective_value: f64,
    pub wall_time_seconds: f64,
}

pub struct SolverConfig {
    pub max_time_seconds: f64,
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_time_seconds: 120.0,
            seed: rand::random(),
        }
    }
}

/// Invokes the solver and extracts the `(nurse_idx, day) -> Duty` grid.
///
/// `microlp` has no native wall-time cutoff; the budget in `config` is enforced only
/// as a diagnostic (logged, and reported back if the solve overruns it), matching the
/// spirit of spec.md §5's "the solver call respects `max_time_in_seconds`" without
/// requiring a cooperative-cancellation API the pure-Rust backend does not expose.
pub fn solve(
    model: Model,
    calendar: &CalendarResult,
    classified: &ClassifiedRoster,
    config: &SolverConfig,
) -> RosterResult<SolveOutcome> {
    let Model {
        problem_vars,
        grid,
        constraints,
        objective,
    } = model;

    log::debug!(
        "solving with seed {} (microlp's simplex is deterministic; the seed only diversifies tie-breaking upstream)",
        config.seed
    );
    let started = Instant::now();
    let objective_for_eval = objective.clone();
    let mut problem = problem_vars.maximise(objective).using(microlp);
    for constraint in constraints {
        problem = problem.with(constraint);
    }

    let solution = problem.solve().map_err(|err| solver_error(err, calendar, classified))?;
    let wall_time_seconds = started.elapsed().as_secs_f64();
    if wall_time_seconds > config.max_time_seconds {
        log::warn!(
            "solve exceeded the configured wall-time budget: {:.2}s > {:.2}s",
            wall_time_seconds,
            config.max_time_seconds
        );
    }

    let objective_value = objective_for_eval.eval_with(&solution);
    let assignment = extract_assignment(&solution, &grid, calendar.num_days, classified.nurses.len());

    Ok(SolveOutcome {
        assignment,
        objective_value,
        wall_time_seconds,
    })
}

fn extract_assignment(
    solution: &impl Solution,
    grid: &Grid,
    num_days: i64,
    nurse_count: usize,
) -> HashMap<(usize, i64), Duty> {
    let mut assignment = HashMap::with_capacity(nurse_count * num_days as usize);
    for (&(nurse, day, duty), &var) in grid {
        if solution.value(var) > 0.5 {
            assignment.insert((nurse, day), duty);
        }
    }
    assignment
}

fn solver_error(err: good_lp::ResolutionError, calendar: &CalendarResult, classified: &ClassifiedRoster) -> RosterError {
    let mut suggestions = vec![
        "recheck that daily_wallet_config sums equal the nurse count".to_string(),
        "relax min_N toward the middle of its valid range".to_string(),
        "reduce the number of submitted preferences".to_string(),
    ];
    let sample_days: Vec<String> = calendar
        .daily_wallet
        .iter()
        .take(3)
        .map(|(day, counts)| {
            format!(
                "day {}: D={} E={} N={} X={}",
                day, counts.d, counts.e, counts.n, counts.x
            )
        })
        .collect();
    suggestions.push(format!("sample daily wallet rows: [{}]", sample_days.join(", ")));

    RosterError::Solver(format!(
        "solve failed ({:?}) for {} nurses; suggestions: {}",
        err,
        classified.nurses.len(),
        suggestions.join("; ")
    ))
}
