//! Nurse Classifier & Wallet Allocator (spec.md §4.2) — the arithmetic heart of the system.
//!
//! Partitions nurses into categories, derives the residual N/X supply available to
//! rotating (`All`-type, existing) nurses, allocates it with a solver-friendly +1
//! buffer, fills in fixed-category wallets, adds `special_days`, and finally deducts
//! submitted preferences.

use crate::calendar::{self, CalendarResult};
use crate::duty::{Duty, KeepType};
use crate::error::{RosterError, RosterResult};
use crate::nurse::{Nurse, NurseWallet, Transience};
use crate::request::RosterRequest;
use log::{debug, info};
use std::collections::HashMap;

/// The legal night-shift cap for `NightFixed` nurses, fixed by policy.
pub const NIGHT_FIXED_CAP: i64 = 15;

#[derive(Debug)]
pub struct ClassifiedRoster {
    pub nurses: Vec<Nurse>,
    pub wallets: HashMap<String, NurseWallet>,
    pub min_n: i64,
}

/// Builds the `Nurse` domain list from the wire request, overlaying joiner/leaver
/// transience onto the base `nurses` registry.
fn build_nurses(request: &RosterRequest) -> RosterResult<Vec<Nurse>> {
    let joiners: HashMap<&str, &crate::request::JoinerInput> =
        request.new.iter().map(|j| (j.name.as_str(), j)).collect();
    let leavers: HashMap<&str, &crate::request::LeaverInput> =
        request.quit.iter().map(|l| (l.name.as_str(), l)).collect();

    let mut nurses = Vec::with_capacity(request.nurses.len());
    for input in &request.nurses {
        let joiner = joiners.get(input.name.as_str());
        let leaver = leavers.get(input.name.as_str());
        let transience = match (joiner, leaver) {
            (Some(j), None) => Transience::Joiner {
                start_day: j.start_day,
                n_count: j.n_count,
            },
            (None, Some(l)) => Transience::Leaver {
                last_day: l.last_day,
                n_count: l.n_count,
            },
            (None, None) => Transience::Existing,
            (Some(_), Some(_)) => {
                return Err(RosterError::Internal(format!(
                    "nurse {} appears in both `new` and `quit`",
                    input.name
                )))
            }
        };
        nurses.push(Nurse {
            name: input.name.clone(),
            keep_type: input.keep_type,
            past_3days: input.past_3days,
            is_low_grade: input.is_low_grade,
            de_preference: input.de_preference,
            special_days: input.special_days,
            transience,
        });
    }
    Ok(nurses)
}

/// `floor(weekends_in_month * work_days / num_days)`.
fn auto_x(weekends_in_month: i64, work_days: i64, num_days: i64) -> i64 {
    (weekends_in_month * work_days) / num_days
}

/// The N/X consumed by one nurse outside the `All`-existing residual pool, per the
/// category table of spec.md §4.2 step 3, and that same nurse's filled-in wallet.
fn category_wallet(nurse: &Nurse, calendar: &CalendarResult) -> (i64, i64) {
    let num_days = calendar.num_days;
    let weekends = calendar::weekends_in_month(&calendar.weekend_like);

    match (nurse.keep_type, nurse.transience) {
        (KeepType::NightFixed, Transience::Existing) => (NIGHT_FIXED_CAP, num_days - NIGHT_FIXED_CAP),
        (KeepType::DayFixed, Transience::Existing) => (0, weekends),
        (KeepType::NightFixed, Transience::Joiner { n_count, .. }) => (n_count, num_days - n_count),
        (KeepType::NightFixed, Transience::Leaver { n_count, .. }) => (n_count, num_days - n_count),
        (KeepType::DayFixed, Transience::Joiner { start_day, .. }) => {
            let x = (start_day - 1) + calendar::weekends_within(&calendar.weekend_like, start_day, num_days);
            (0, x)
        }
        (KeepType::DayFixed, Transience::Leaver { last_day, .. }) => {
            let x = calendar::weekends_within(&calendar.weekend_like, 1, last_day) + (num_days - last_day);
            (0, x)
        }
        (KeepType::All, Transience::Joiner { start_day, n_count }) => {
            let work_days = num_days - start_day + 1;
            let x = (start_day - 1) + auto_x(weekends, work_days, num_days);
            (n_count, x)
        }
        (KeepType::All, Transience::Leaver { last_day, n_count }) => {
            let work_days = last_day;
            let x = auto_x(weekends, work_days, num_days) + (num_days - last_day);
            (n_count, x)
        }
        (KeepType::All, Transience::Existing) => unreachable!("All-existing wallets are allocated separately"),
    }
}

/// Runs the full 8-step classification and wallet allocation pipeline.
pub fn classify(request: &RosterRequest, calendar: &CalendarResult) -> RosterResult<ClassifiedRoster> {
    // Step 1 — partition.
    let nurses = build_nurses(request)?;

    let all_existing: Vec<usize> = nurses
        .iter()
        .enumerate()
        .filter(|(_, n)| n.keep_type == KeepType::All && matches!(n.transience, Transience::Existing))
        .map(|(i, _)| i)
        .collect();

    // Step 2 — monthly totals.
    let total_n = calendar::monthly_total(&calendar.daily_wallet, Duty::N);
    let total_x = calendar::monthly_total(&calendar.daily_wallet, Duty::X);
    info!("monthly totals: total_N={} total_X={}", total_n, total_x);

    // Step 3 — adjust totals for fixed categories, transients and special_days.
    let mut wallets: HashMap<String, NurseWallet> = HashMap::new();
    let mut residual_n = total_n;
    let mut residual_x = total_x;

    for (idx, nurse) in nurses.iter().enumerate() {
        if all_existing.contains(&idx) {
            continue;
        }
        let (n, x) = category_wallet(nurse, calendar);
        residual_n -= n;
        residual_x -= x;
        wallets.insert(nurse.name.clone(), NurseWallet { target_n: n, target_x: x });
    }
    let total_special_days: i64 = nurses.iter().map(|n| n.special_days).sum();
    residual_x -= total_special_days;

    debug!(
        "residual after fixed/transient categories and special_days: residual_N={} residual_X={}",
        residual_n, residual_x
    );

    // Step 4 — allocate N among All-existing.
    let k = all_existing.len() as i64;
    if k > 0 {
        let lower_bound = div_ceil(residual_n, k) - 1;
        let upper_bound = residual_n.div_euclid(k);
        let min_n = request.nurse_wallet_min.n;
        if min_n < lower_bound {
            return Err(RosterError::MinNTooLow {
                provided: min_n,
                lower_bound,
                upper_bound,
            });
        }
        if min_n > upper_bound {
            return Err(RosterError::MinNTooHigh {
                provided: min_n,
                lower_bound,
                upper_bound,
            });
        }
        for &idx in &all_existing {
            wallets.insert(
                nurses[idx].name.clone(),
                NurseWallet {
                    target_n: min_n + 1,
                    target_x: 0,
                },
            );
        }

        // Step 5 — allocate X among All-existing.
        let base = residual_x.div_euclid(k);
        let remainder = residual_x.rem_euclid(k);
        for (order, &idx) in all_existing.iter().enumerate() {
            let extra = if (order as i64) < remainder { 1 } else { 0 };
            let wallet = wallets.get_mut(&nurses[idx].name).unwrap();
            wallet.target_x = base + extra + 1; // +1 solver buffer
        }
    }

    // Step 6 is folded into step 3/4/5 above (fixed-category wallets already filled).

    // Step 7 — add special_days to every nurse's X target.
    for nurse in &nurses {
        if nurse.special_days > 0 {
            let wallet = wallets.get_mut(&nurse.name).unwrap();
            wallet.target_x += nurse.special_days;
        }
    }

    // Step 8 — deduct preferences.
    deduct_preferences(request, &nurses, calendar.num_days, &mut wallets)?;

    Ok(ClassifiedRoster {
        nurses,
        wallets,
        min_n: request.nurse_wallet_min.n,
    })
}

fn div_ceil(a: i64, b: i64) -> i64 {
    (a + b - 1).div_euclid(b)
}

fn deduct_preferences(
    request: &RosterRequest,
    nurses: &[Nurse],
    num_days: i64,
    wallets: &mut HashMap<String, NurseWallet>,
) -> RosterResult<()> {
    let by_name: HashMap<&str, &Nurse> = nurses.iter().map(|n| (n.name.as_str(), n)).collect();
    let mut free_x_remaining: HashMap<&str, i64> =
        nurses.iter().map(|n| (n.name.as_str(), n.special_days)).collect();

    for pref_input in &request.preferences {
        let nurse = match by_name.get(pref_input.name.as_str()) {
            Some(n) => *n,
            None => continue, // unknown nurse name; the input validator reports this.
        };
        let (start, end) = nurse.active_window(num_days);
        let mut days = pref_input.days();
        days.sort_by_key(|(day, _)| *day);
        for (day, duty) in days {
            if day < start || day > end {
                continue; // forced-X period; skipped silently (spec.md §4.2 step 8).
            }
            match duty {
                Duty::N => {
                    if let Some(wallet) = wallets.get_mut(&nurse.name) {
                        wallet.target_n -= 1;
                    }
                }
                Duty::X => {
                    let free = free_x_remaining.entry(nurse.name.as_str()).or_insert(0);
                    if *free > 0 {
                        *free -= 1;
                    } else if let Some(wallet) = wallets.get_mut(&nurse.name) {
                        wallet.target_x -= 1;
                    }
                }
                Duty::D | Duty::E => {} // consumed by the daily wallet only, not the nurse wallet.
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duty::DePreference;
    use crate::request::{DailyWalletConfig, DutyCounts, NurseInput, NurseWalletMin};

    fn nurse_input(name: &str) -> NurseInput {
        NurseInput {
            name: name.to_string(),
            keep_type: KeepType::All,
            past_3days: [Duty::X, Duty::X, Duty::X],
            is_low_grade: false,
            de_preference: DePreference::Neutral,
            special_days: 0,
        }
    }

    fn base_request(n: usize) -> RosterRequest {
        RosterRequest {
            year: 2025,
            month: 2,
            daily_wallet_config: DailyWalletConfig {
                weekday: DutyCounts { d: 2, e: 2, n: 2, x: 2 },
                weekend: DutyCounts { d: 1, e: 1, n: 1, x: 5 },
            },
            nurse_wallet_min: NurseWalletMin { n: 6 },
            max_consecutive_work: 6,
            nurses: (0..n).map(|i| nurse_input(&format!("nurse_{}", i))).collect(),
            new: vec![],
            quit: vec![],
            preferences: vec![],
        }
    }

    #[test]
    fn e1_eight_nurses_allocates_seven_n_each() {
        let request = base_request(8);
        let calendar = calendar::build_calendar(2025, 2, &request.daily_wallet_config, &calendar::NoHolidays).unwrap();
        let classified = classify(&request, &calendar).unwrap();
        for wallet in classified.wallets.values() {
            assert_eq!(wallet.target_n, 7); // min_N(6) + 1
        }
    }

    #[test]
    fn e5_min_n_too_low_reports_both_bounds() {
        // 8 all-existing nurses, min_N provided below ceil(Nr/8)-1.
        let mut request = base_request(8);
        request.nurse_wallet_min.n = 4;
        let calendar = calendar::build_calendar(2025, 2, &request.daily_wallet_config, &calendar::NoHolidays).unwrap();
        let err = classify(&request, &calendar).unwrap_err();
        match err {
            RosterError::MinNTooLow { provided, lower_bound, .. } => {
                assert_eq!(provided, 4);
                assert_eq!(lower_bound, 5);
            }
            other => panic!("expected MinNTooLow, got {:?}", other),
        }
    }

    #[test]
    fn preprocessing_is_deterministic_across_runs() {
        let request = base_request(8);
        let calendar = calendar::build_calendar(2025, 2, &request.daily_wallet_config, &calendar::NoHolidays).unwrap();
        let first = classify(&request, &calendar).unwrap();
        let second = classify(&request, &calendar).unwrap();
        for (name, wallet) in &first.wallets {
            let other = second.wallets[name];
            assert_eq!(wallet.target_n, other.target_n);
            assert_eq!(wallet.target_x, other.target_x);
        }
    }
}
