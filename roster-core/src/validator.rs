//! Input Validator (spec.md §4.3).
//!
//! Runs structural and arithmetic sanity checks on a request before the constraint
//! model is built, collecting every violation instead of failing on the first one.

use crate::calendar::CalendarResult;
use crate::duty::{is_allowed_pattern, pattern_index, Duty};
use crate::error::{RosterError, RosterResult};
use crate::request::RosterRequest;
use std::collections::{HashMap, HashSet};

/// Validates `request` against `calendar`, returning every violation found.
///
/// Returns `Ok(())` when the request is sound, or `Err(RosterError::Validation(_))`
/// carrying the full list of violation messages.
pub fn validate(request: &RosterRequest, calendar: &CalendarResult) -> RosterResult<()> {
    let mut violations = Vec::new();

    check_past_3days(request, &mut violations);
    check_daily_wallet_matches_nurse_count(request, calendar, &mut violations);
    check_transient_day_ranges(request, calendar, &mut violations);
    check_preferences(request, calendar, &mut violations);
    check_unique_names(request, &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(RosterError::Validation(violations))
    }
}

fn check_past_3days(request: &RosterRequest, violations: &mut Vec<String>) {
    for nurse in &request.nurses {
        let idx = pattern_index(nurse.past_3days[0], nurse.past_3days[1], nurse.past_3days[2]);
        if !is_allowed_pattern(idx) {
            violations.push(format!(
                "nurse {}: past_3days {:?} is not a legal 3-day transition pattern",
                nurse.name, nurse.past_3days
            ));
        }
    }
}

fn check_daily_wallet_matches_nurse_count(
    request: &RosterRequest,
    calendar: &CalendarResult,
    violations: &mut Vec<String>,
) {
    let nurse_count = request.nurses.len() as i64;
    for (day, counts) in &calendar.daily_wallet {
        if counts.total() != nurse_count {
            violations.push(format!(
                "day {}: daily wallet totals {} but there are {} nurses",
                day,
                counts.total(),
                nurse_count
            ));
        }
    }
}

fn check_transient_day_ranges(request: &RosterRequest, calendar: &CalendarResult, violations: &mut Vec<String>) {
    for joiner in &request.new {
        if joiner.start_day < 1 || joiner.start_day > calendar.num_days {
            violations.push(format!(
                "joiner {}: start_day {} is out of range [1, {}]",
                joiner.name, joiner.start_day, calendar.num_days
            ));
        }
        if joiner.n_count < 0 {
            violations.push(format!("joiner {}: n_count must be non-negative", joiner.name));
        }
    }
    for leaver in &request.quit {
        if leaver.last_day < 1 || leaver.last_day > calendar.num_days {
            violations.push(format!(
                "leaver {}: last_day {} is out of range [1, {}]",
                leaver.name, leaver.last_day, calendar.num_days
            ));
        }
        if leaver.n_count < 0 {
            violations.push(format!("leaver {}: n_count must be non-negative", leaver.name));
        }
    }
}

fn check_preferences(request: &RosterRequest, calendar: &CalendarResult, violations: &mut Vec<String>) {
    let known_names: HashSet<&str> = request.nurses.iter().map(|n| n.name.as_str()).collect();
    let mut tally: HashMap<(i64, Duty), i64> = HashMap::new();

    for preference in &request.preferences {
        if !known_names.contains(preference.name.as_str()) {
            violations.push(format!("preference references unknown nurse {}", preference.name));
            continue;
        }
        for (day, duty) in preference.days() {
            if day < 1 || day > calendar.num_days {
                violations.push(format!(
                    "nurse {}: preference day {} is out of range [1, {}]",
                    preference.name, day, calendar.num_days
                ));
                continue;
            }
            *tally.entry((day, duty)).or_insert(0) += 1;
        }
    }

    for ((day, duty), count) in tally {
        let capacity = calendar.daily_wallet.get(&day).map(|counts| counts.get(duty)).unwrap_or(0);
        if count > capacity {
            violations.push(format!(
                "day {} duty {}: {} nurses prefer it but the daily wallet only has room for {}",
                day,
                duty.as_str(),
                count,
                capacity
            ));
        }
    }
}

fn check_unique_names(request: &RosterRequest, violations: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for nurse in &request.nurses {
        if !seen.insert(nurse.name.as_str()) {
            violations.push(format!("duplicate nurse name {}", nurse.name));
        }
    }
}
