//! Constraint Model Builder (spec.md §4.4).
//!
//! Declares the boolean assignment grid `x[nurse, day, duty]` and attaches every
//! constraint C1-C10. The grid and constraint list are handed to `solver.rs`, which
//! owns the actual `good_lp` solve call.

use crate::calendar::CalendarResult;
use crate::classifier::ClassifiedRoster;
use crate::duty::{allowed_next_duties, is_allowed_pattern, pattern_index, Duty, KeepType, ALL_DUTIES};
use crate::error::{RosterError, RosterResult};
use crate::nurse::Nurse;
use crate::request::RosterRequest;
use good_lp::{variable, Constraint, Expression, ProblemVariables, Variable};
use std::collections::HashMap;

pub type Grid = HashMap<(usize, i64, Duty), Variable>;

pub struct Model {
    pub problem_vars: ProblemVariables,
    pub grid: Grid,
    pub constraints: Vec<Constraint>,
    pub objective: Expression,
}

fn zero() -> Expression {
    Expression::from(0.0)
}

fn sum_expr(terms: impl IntoIterator<Item = Expression>) -> Expression {
    terms.into_iter().fold(zero(), |acc, term| acc + term)
}

/// Builds the full constraint model for one request.
pub fn build_model(
    request: &RosterRequest,
    calendar: &CalendarResult,
    classified: &ClassifiedRoster,
) -> RosterResult<Model> {
    check_low_grade_capacity(request, calendar)?;

    let num_days = calendar.num_days;
    let nurses = &classified.nurses;

    let mut problem_vars = ProblemVariables::new();
    let mut grid: Grid = HashMap::new();
    for (i, _nurse) in nurses.iter().enumerate() {
        for day in 1..=num_days {
            for duty in ALL_DUTIES {
                let var = problem_vars.add(variable().binary());
                grid.insert((i, day, duty), var);
            }
        }
    }

    let mut constraints = Vec::new();

    add_unique_duty_constraints(nurses, num_days, &grid, &mut constraints);
    add_daily_demand_constraints(calendar, nurses, &grid, &mut constraints);
    add_wallet_constraints(classified, calendar, &grid, &mut constraints);
    add_preference_constraints(request, nurses, num_days, &grid, &mut constraints);
    add_forced_transience_constraints(nurses, num_days, &grid, &mut constraints);
    add_keep_type_constraints(nurses, num_days, &grid, &mut constraints);
    add_transition_constraints(nurses, num_days, &grid, &mut constraints);
    add_low_grade_constraints(nurses, calendar, &grid, &mut constraints);
    add_consecutive_work_constraints(request, nurses, num_days, &grid, &mut constraints);

    let objective = build_objective(nurses, num_days, &grid);

    Ok(Model {
        problem_vars,
        grid,
        constraints,
        objective,
    })
}

fn var_expr(grid: &Grid, nurse: usize, day: i64, duty: Duty) -> Expression {
    Expression::from(grid[&(nurse, day, duty)])
}

/// The indicator expression for `nurse` being assigned `duty` on virtual day `day`,
/// where `day <= 0` refers to `past_3days` (fixed) and `day >= 1` is a decision variable.
fn term(nurse: &Nurse, grid: &Grid, idx: usize, day: i64, duty: Duty, num_days: i64) -> Expression {
    if day < 1 {
        let past_idx = (day + 2) as usize; // day -2 -> 0, -1 -> 1, 0 -> 2
        let matches = nurse.past_3days[past_idx] == duty;
        Expression::from(if matches { 1.0 } else { 0.0 })
    } else if day <= num_days {
        var_expr(grid, idx, day, duty)
    } else {
        // Past the end of the month: the day-4 slot of the final transition window.
        // There's no decision variable for it, so it can never contribute to a
        // forbidden pattern or a banned next-day duty.
        Expression::from(0.0)
    }
}

fn check_low_grade_capacity(request: &RosterRequest, calendar: &CalendarResult) -> RosterResult<()> {
    let _ = calendar;
    let count = request.nurses.iter().filter(|n| n.is_low_grade).count();
    let weekday = &request.daily_wallet_config.weekday;
    let weekend = &request.daily_wallet_config.weekend;
    let tightest = [weekday.d, weekday.e, weekday.n, weekend.d, weekend.e, weekend.n]
        .into_iter()
        .min()
        .unwrap_or(0);
    if count as i64 > tightest {
        return Err(RosterError::LowGradeOverflow { count, tightest });
    }
    Ok(())
}

fn add_unique_duty_constraints(nurses: &[Nurse], num_days: i64, grid: &Grid, constraints: &mut Vec<Constraint>) {
    for i in 0..nurses.len() {
        for day in 1..=num_days {
            let expr = sum_expr(ALL_DUTIES.iter().map(|&d| var_expr(grid, i, day, d)));
            constraints.push(expr.eq(1.0));
        }
    }
}

fn add_daily_demand_constraints(
    calendar: &CalendarResult,
    nurses: &[Nurse],
    grid: &Grid,
    constraints: &mut Vec<Constraint>,
) {
    for (&day, counts) in &calendar.daily_wallet {
        for duty in ALL_DUTIES {
            let expr = sum_expr((0..nurses.len()).map(|i| var_expr(grid, i, day, duty)));
            constraints.push(expr.eq(counts.get(duty) as f64));
        }
    }
}

fn actual_expr(grid: &Grid, idx: usize, duty: Duty, start: i64, end: i64) -> Expression {
    sum_expr((start..=end).map(|day| var_expr(grid, idx, day, duty)))
}

fn add_wallet_constraints(
    classified: &ClassifiedRoster,
    calendar: &CalendarResult,
    grid: &Grid,
    constraints: &mut Vec<Constraint>,
) {
    let num_days = calendar.num_days;
    let weekends = crate::calendar::weekends_in_month(&calendar.weekend_like);
    let weekdays = num_days - weekends;

    for (idx, nurse) in classified.nurses.iter().enumerate() {
        let (start, end) = nurse.active_window(num_days);
        let wallet = classified.wallets[&nurse.name];
        let actual_n = actual_expr(grid, idx, Duty::N, start, end);
        let actual_x = actual_expr(grid, idx, Duty::X, start, end);

        if nurse.is_transient() {
            constraints.push(actual_n.clone().leq(wallet.target_n as f64 + 1.0));
            constraints.push(actual_n.geq(wallet.target_n as f64 - 1.0));
            constraints.push(actual_x.clone().leq(wallet.target_x as f64 + 1.0));
        } else {
            match nurse.keep_type {
                KeepType::NightFixed => {
                    constraints.push(actual_n.eq(15.0));
                    constraints.push(actual_expr(grid, idx, Duty::D, start, end).eq(0.0));
                    constraints.push(actual_expr(grid, idx, Duty::E, start, end).eq(0.0));
                    constraints.push(actual_x.clone().leq(wallet.target_x as f64 + 1.0));
                }
                KeepType::DayFixed => {
                    constraints.push(actual_n.eq(0.0));
                    constraints.push(actual_expr(grid, idx, Duty::E, start, end).eq(0.0));
                    constraints.push(actual_x.clone().leq(wallet.target_x as f64 + 1.0));
                    let actual_d = actual_expr(grid, idx, Duty::D, start, end);
                    constraints.push(actual_d.clone().leq(weekdays as f64 + 1.0));
                    constraints.push(actual_d.geq(weekdays as f64 - 1.0));
                }
                KeepType::All => {
                    constraints.push(actual_n.clone().geq(classified.min_n as f64));
                    constraints.push(actual_n.leq(wallet.target_n as f64 + 1.0));
                    constraints.push(actual_x.clone().leq(wallet.target_x as f64 + 1.0));
                }
            }
        }

        if nurse.special_days > 0 {
            constraints.push(actual_x.geq(wallet.target_x as f64 - 1.0));
        }
    }
}

fn add_preference_constraints(
    request: &RosterRequest,
    nurses: &[Nurse],
    num_days: i64,
    grid: &Grid,
    constraints: &mut Vec<Constraint>,
) {
    let by_name: HashMap<&str, (usize, &Nurse)> = nurses
        .iter()
        .enumerate()
        .map(|(i, n)| (n.name.as_str(), (i, n)))
        .collect();

    for pref in &request.preferences {
        let (idx, nurse) = match by_name.get(pref.name.as_str()) {
            Some(v) => *v,
            None => continue,
        };
        let (start, end) = nurse.active_window(num_days);
        for (day, duty) in pref.days() {
            if day < start || day > end {
                continue; // overridden by the forced-X region; spec.md §4.2/§9.
            }
            constraints.push(var_expr(grid, idx, day, duty).eq(1.0));
        }
    }
}

fn add_forced_transience_constraints(
    nurses: &[Nurse],
    num_days: i64,
    grid: &Grid,
    constraints: &mut Vec<Constraint>,
) {
    for (idx, nurse) in nurses.iter().enumerate() {
        let (start, end) = nurse.active_window(num_days);
        for day in 1..start {
            constraints.push(var_expr(grid, idx, day, Duty::X).eq(1.0));
        }
        for day in (end + 1)..=num_days {
            constraints.push(var_expr(grid, idx, day, Duty::X).eq(1.0));
        }
    }
}

fn add_keep_type_constraints(nurses: &[Nurse], num_days: i64, grid: &Grid, constraints: &mut Vec<Constraint>) {
    for (idx, nurse) in nurses.iter().enumerate() {
        let forbidden: &[Duty] = match nurse.keep_type {
            KeepType::DayFixed => &[Duty::E, Duty::N],
            KeepType::NightFixed => &[Duty::D, Duty::E],
            KeepType::All => &[],
        };
        for day in 1..=num_days {
            for &duty in forbidden {
                constraints.push(var_expr(grid, idx, day, duty).eq(0.0));
            }
        }
    }
}

/// C8: the 3-day transition rule, encoded without reification variables by
/// short-circuiting fixed `past_3days` slots directly into the linear expression.
fn add_transition_constraints(nurses: &[Nurse], num_days: i64, grid: &Grid, constraints: &mut Vec<Constraint>) {
    for (idx, nurse) in nurses.iter().enumerate() {
        let (start, end) = nurse.active_window(num_days);
        for window_start in -2..=(num_days - 2) {
            let days = [window_start, window_start + 1, window_start + 2, window_start + 3];
            // Skip windows touching any real calendar day outside the active window
            // (already forced X there). `days[3]` may be `num_days + 1`, which isn't a
            // real day and never forces a skip; `term` folds it to the constant 0.0 so
            // only the forbidden-pattern half of the window still applies.
            if days.iter().any(|&d| d >= 1 && d <= num_days && (d < start || d > end)) {
                continue;
            }
            for w0 in ALL_DUTIES {
                for w1 in ALL_DUTIES {
                    for w2 in ALL_DUTIES {
                        let idx3 = pattern_index(w0, w1, w2);
                        let triple = sum_expr([
                            term(nurse, grid, idx, days[0], w0, num_days),
                            term(nurse, grid, idx, days[1], w1, num_days),
                            term(nurse, grid, idx, days[2], w2, num_days),
                        ]);
                        if !is_allowed_pattern(idx3) {
                            constraints.push(triple.leq(2.0));
                            continue;
                        }
                        let allowed_mask = allowed_next_duties(idx3).unwrap();
                        for bad_duty in ALL_DUTIES {
                            if allowed_mask & bad_duty.bit() != 0 {
                                continue;
                            }
                            let quad = triple.clone() + term(nurse, grid, idx, days[3], bad_duty, num_days);
                            constraints.push(quad.leq(3.0));
                        }
                    }
                }
            }
        }
    }
}

fn add_low_grade_constraints(nurses: &[Nurse], calendar: &CalendarResult, grid: &Grid, constraints: &mut Vec<Constraint>) {
    let low_grade: Vec<usize> = nurses
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_low_grade)
        .map(|(i, _)| i)
        .collect();
    if low_grade.is_empty() {
        return;
    }
    for &day in calendar.daily_wallet.keys() {
        for duty in [Duty::D, Duty::E, Duty::N] {
            let expr = sum_expr(low_grade.iter().map(|&i| var_expr(grid, i, day, duty)));
            constraints.push(expr.leq(1.0));
        }
    }
}

fn add_consecutive_work_constraints(
    request: &RosterRequest,
    nurses: &[Nurse],
    num_days: i64,
    grid: &Grid,
    constraints: &mut Vec<Constraint>,
) {
    let window_len = request.max_consecutive_work + 1;
    for (idx, nurse) in nurses.iter().enumerate() {
        let (start, end) = nurse.active_window(num_days);
        let mut s = start;
        while s + window_len - 1 <= end {
            let expr = sum_expr((s..(s + window_len)).map(|day| var_expr(grid, idx, day, Duty::X)));
            constraints.push(expr.geq(1.0));
            s += 1;
        }

        let has_past_x = nurse.past_3days.iter().any(|&d| d == Duty::X);
        if !has_past_x {
            let boundary_end = (window_len - 3).min(end);
            if boundary_end >= start {
                let expr = sum_expr((start..=boundary_end).map(|day| var_expr(grid, idx, day, Duty::X)));
                constraints.push(expr.geq(1.0));
            }
        }
    }
}

fn build_objective(nurses: &[Nurse], num_days: i64, grid: &Grid) -> Expression {
    use crate::duty::DePreference;
    let mut objective = zero();
    for (idx, nurse) in nurses.iter().enumerate() {
        if nurse.keep_type != KeepType::All {
            continue;
        }
        let (start, end) = nurse.active_window(num_days);
        match nurse.de_preference {
            DePreference::D => {
                objective = objective + actual_expr(grid, idx, Duty::D, start, end)
                    - actual_expr(grid, idx, Duty::E, start, end);
            }
            DePreference::E => {
                objective = objective + actual_expr(grid, idx, Duty::E, start, end)
                    - actual_expr(grid, idx, Duty::D, start, end);
            }
            DePreference::Neutral => {}
        }
    }
    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar;
    use crate::duty::DePreference;
    use crate::request::{DailyWalletConfig, DutyCounts, NurseInput, NurseWalletMin};

    fn request_with_low_grade(low_grade_count: usize, nurse_count: usize) -> RosterRequest {
        RosterRequest {
            year: 2025,
            month: 2,
            daily_wallet_config: DailyWalletConfig {
                weekday: DutyCounts { d: 3, e: 3, n: 3, x: 1 },
                weekend: DutyCounts { d: 3, e: 3, n: 3, x: 1 },
            },
            nurse_wallet_min: NurseWalletMin { n: 6 },
            max_consecutive_work: 6,
            nurses: (0..nurse_count)
                .map(|i| NurseInput {
                    name: format!("nurse_{}", i),
                    keep_type: KeepType::All,
                    past_3days: [Duty::X, Duty::X, Duty::X],
                    is_low_grade: i < low_grade_count,
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
    fn low_grade_overflow_is_rejected_before_building_variables() {
        let request = request_with_low_grade(5, 10);
        let calendar = calendar::build_calendar(2025, 2, &request.daily_wallet_config, &calendar::NoHolidays).unwrap();
        let err = check_low_grade_capacity(&request, &calendar).unwrap_err();
        match err {
            RosterError::LowGradeOverflow { count, tightest } => {
                assert_eq!(count, 5);
                assert_eq!(tightest, 3);
            }
            other => panic!("expected LowGradeOverflow, got {:?}", other),
        }
    }

    #[test]
    fn low_grade_within_capacity_is_accepted() {
        let request = request_with_low_grade(2, 10);
        let calendar = calendar::build_calendar(2025, 2, &request.daily_wallet_config, &calendar::NoHolidays).unwrap();
        assert!(check_low_grade_capacity(&request, &calendar).is_ok());
    }
}
