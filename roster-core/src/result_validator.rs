//! Result Validator (spec.md §4.5).
//!
//! Recomputes daily and per-nurse counts from the solved grid and compares them
//! against the same targets the model was built from, independent of whether the
//! solver's own constraints were encoded correctly.

use crate::calendar::CalendarResult;
use crate::classifier::ClassifiedRoster;
use crate::duty::{ALL_DUTIES, Duty};
use crate::response::ValidationReport;
use crate::solver::SolveOutcome;
use std::collections::HashMap;

pub fn validate_result(
    outcome: &SolveOutcome,
    calendar: &CalendarResult,
    classified: &ClassifiedRoster,
) -> ValidationReport {
    let mut daily_wallet_violations = Vec::new();
    let mut nurse_wallet_violations = Vec::new();
    let mut low_grade_violations = Vec::new();
    let mut n_shortfall_nurses = Vec::new();

    // Daily wallet: exact equality per (day, duty).
    for (&day, counts) in &calendar.daily_wallet {
        for duty in ALL_DUTIES {
            let actual = (0..classified.nurses.len())
                .filter(|&i| outcome.assignment.get(&(i, day)) == Some(&duty))
                .count() as i64;
            let expected = counts.get(duty);
            if actual != expected {
                daily_wallet_violations.push(format!(
                    "day {} duty {}: expected {}, got {}",
                    day,
                    duty.as_str(),
                    expected,
                    actual
                ));
            }
        }
    }

    // Nurse wallet: ±1 tolerance on N and X.
    for (idx, nurse) in classified.nurses.iter().enumerate() {
        let (start, end) = nurse.active_window(calendar.num_days);
        let wallet = classified.wallets[&nurse.name];
        let actual_n = count_duty(outcome, idx, start, end, Duty::N);
        let actual_x = count_duty(outcome, idx, start, end, Duty::X);

        if (actual_n - wallet.target_n).abs() > 1 {
            nurse_wallet_violations.push(format!(
                "nurse {}: actual_N={} target_N={} exceeds tolerance",
                nurse.name, actual_n, wallet.target_n
            ));
        }
        if actual_x > wallet.target_x + 1 {
            nurse_wallet_violations.push(format!(
                "nurse {}: actual_X={} exceeds target_X+1={}",
                nurse.name,
                actual_x,
                wallet.target_x + 1
            ));
        }
        if nurse.special_days > 0 && actual_x < wallet.target_x - 1 {
            nurse_wallet_violations.push(format!(
                "nurse {}: actual_X={} is below target_X-1={} despite special_days={}",
                nurse.name,
                actual_x,
                wallet.target_x - 1,
                nurse.special_days
            ));
        }

        let shortfall = wallet.target_n - actual_n;
        if shortfall >= 2 {
            n_shortfall_nurses.push(nurse.name.clone());
        }
    }

    // Low-Grade co-assignment on the realized grid.
    let low_grade_names: HashMap<usize, &str> = classified
        .nurses
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_low_grade)
        .map(|(i, n)| (i, n.name.as_str()))
        .collect();
    if !low_grade_names.is_empty() {
        for &day in calendar.daily_wallet.keys() {
            for duty in [Duty::D, Duty::E, Duty::N] {
                let assigned: Vec<&str> = low_grade_names
                    .iter()
                    .filter(|(&i, _)| outcome.assignment.get(&(i, day)) == Some(&duty))
                    .map(|(_, &name)| name)
                    .collect();
                if assigned.len() > 1 {
                    low_grade_violations.push(format!(
                        "day {} duty {}: {} low-grade nurses co-assigned ({})",
                        day,
                        duty.as_str(),
                        assigned.len(),
                        assigned.join(", ")
                    ));
                }
            }
        }
    }

    ValidationReport {
        daily_wallet_satisfied: daily_wallet_violations.is_empty(),
        nurse_wallet_satisfied: nurse_wallet_violations.is_empty(),
        low_grade_satisfied: low_grade_violations.is_empty(),
        daily_wallet_violations,
        nurse_wallet_violations,
        low_grade_violations,
        n_shortfall_nurses,
    }
}

fn count_duty(outcome: &SolveOutcome, idx: usize, start: i64, end: i64, duty: Duty) -> i64 {
    (start..=end)
        .filter(|day| outcome.assignment.get(&(idx, *day)) == Some(&duty))
        .count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar;
    use crate::classifier;
    use crate::duty::{DePreference, KeepType};
    use crate::request::{DailyWalletConfig, DutyCounts, NurseInput, NurseWalletMin, RosterRequest};

    fn tiny_request() -> RosterRequest {
        RosterRequest {
            year: 2025,
            month: 2,
            daily_wallet_config: DailyWalletConfig {
                weekday: DutyCounts { d: 1, e: 0, n: 0, x: 0 },
                weekend: DutyCounts { d: 1, e: 0, n: 0, x: 0 },
            },
            nurse_wallet_min: NurseWalletMin { n: 0 },
            max_consecutive_work: 6,
            nurses: vec![NurseInput {
                name: "alice".into(),
                keep_type: KeepType::DayFixed,
                past_3days: [Duty::X, Duty::X, Duty::X],
                is_low_grade: false,
                de_preference: DePreference::Neutral,
                special_days: 0,
            }],
            new: vec![],
            quit: vec![],
            preferences: vec![],
        }
    }

    #[test]
    fn flags_daily_wallet_mismatch() {
        let request = tiny_request();
        let calendar = calendar::build_calendar(2025, 2, &request.daily_wallet_config, &calendar::NoHolidays).unwrap();
        let classified = classifier::classify(&request, &calendar).unwrap();
        let mut assignment = HashMap::new();
        // Wrong: assigns X on day 1 instead of the demanded D.
        assignment.insert((0usize, 1i64), Duty::X);
        let outcome = SolveOutcome {
            assignment,
            objective_value: 0.0,
            wall_time_seconds: 0.0,
        };
        let report = validate_result(&outcome, &calendar, &classified);
        assert!(!report.daily_wallet_satisfied);
    }
}
