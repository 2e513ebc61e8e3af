//! End-to-end roster-build scenarios (spec.md §8, E1-E7).

use roster_core::duty::{DePreference, Duty, KeepType};
use roster_core::request::{
    DailyWalletConfig, DutyCounts, JoinerInput, LeaverInput, NurseInput, NurseWalletMin, PreferenceInput, RosterRequest,
};
use roster_core::response::RosterResponse;
use roster_core::{build_roster, RosterError};
use std::collections::BTreeMap;

/// Safe to call from every test in this binary; `try_init` is a no-op past the first call.
fn setup_for_tests() {
    env_logger::Builder::new()
        .is_test(true)
        .filter(None, log::LevelFilter::Debug)
        .try_init()
        .ok();
}

fn nurse(name: &str, keep_type: KeepType, past_3days: [Duty; 3]) -> NurseInput {
    NurseInput {
        name: name.to_string(),
        keep_type,
        past_3days,
        is_low_grade: false,
        de_preference: DePreference::Neutral,
        special_days: 0,
    }
}

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
            .map(|i| nurse(&format!("nurse_{}", i), KeepType::All, [Duty::X, Duty::X, Duty::X]))
            .collect(),
        new: vec![],
        quit: vec![],
        preferences: vec![],
    }
}

#[test]
fn e1_basic_month_succeeds_with_balanced_wallets() {
    setup_for_tests();
    let request = e1_request();
    let response = build_roster(&request).expect("E1 should succeed");
    match response {
        RosterResponse::Success(success) => {
            assert!(success.validation.daily_wallet_satisfied);
            for wallet in success.nurse_wallets.values() {
                assert!((wallet.n - 7).abs() <= 1);
            }
        }
        RosterResponse::Error(err) => panic!("E1 unexpectedly failed: {}", err.message),
    }
}

#[test]
fn e2_nnn_history_forces_x_on_day_one() {
    setup_for_tests();
    let mut request = e1_request();
    request.nurses[0].past_3days = [Duty::N, Duty::N, Duty::N];
    let response = build_roster(&request).expect("E2 should succeed");
    match response {
        RosterResponse::Success(success) => {
            let day_one = success.schedule["nurse_0"]["1"];
            assert_eq!(day_one, Duty::X);
        }
        RosterResponse::Error(err) => panic!("E2 unexpectedly failed: {}", err.message),
    }
}

#[test]
fn e3_preference_is_honored_in_the_schedule() {
    setup_for_tests();
    let mut request = e1_request();
    let mut schedule = BTreeMap::new();
    schedule.insert("5".to_string(), Duty::D);
    request.preferences.push(PreferenceInput {
        name: "nurse_0".to_string(),
        schedule,
        is_submitted: Some(true),
    });
    let response = build_roster(&request).expect("E3 should succeed");
    match response {
        RosterResponse::Success(success) => {
            assert_eq!(success.schedule["nurse_0"]["5"], Duty::D);
        }
        RosterResponse::Error(err) => panic!("E3 unexpectedly failed: {}", err.message),
    }
}

#[test]
fn e4_forbidden_past_3days_pattern_is_rejected() {
    setup_for_tests();
    let mut request = e1_request();
    request.nurses[0].past_3days = [Duty::N, Duty::D, Duty::N];
    let err = build_roster(&request).unwrap_err();
    assert!(matches!(err, RosterError::Validation(_)));
}

#[test]
fn e5_min_n_below_lower_bound_is_rejected() {
    setup_for_tests();
    let mut request = e1_request();
    // total_N for this calendar is 48 with 8 all-existing nurses:
    // ceil(48/8)-1 = 5, floor(48/8) = 6.
    request.nurse_wallet_min.n = 4;
    let err = build_roster(&request).unwrap_err();
    match err {
        RosterError::MinNTooLow { provided, lower_bound, upper_bound } => {
            assert_eq!(provided, 4);
            assert_eq!(lower_bound, 5);
            assert_eq!(upper_bound, 6);
        }
        other => panic!("expected MinNTooLow, got {:?}", other),
    }
}

#[test]
fn e6_too_many_low_grade_nurses_is_rejected() {
    setup_for_tests();
    let mut request = e1_request();
    request.daily_wallet_config.weekday = DutyCounts { d: 3, e: 3, n: 3, x: 1 };
    request.daily_wallet_config.weekend = DutyCounts { d: 3, e: 3, n: 3, x: 1 };
    // 10 all-existing nurses, total_N=84 for this calendar: ceil(84/10)-1=8, floor(84/10)=8.
    request.nurse_wallet_min.n = 8;
    request.nurses = (0..10)
        .map(|i| {
            let mut n = nurse(&format!("nurse_{}", i), KeepType::All, [Duty::X, Duty::X, Duty::X]);
            n.is_low_grade = i < 5;
            n
        })
        .collect();
    let err = build_roster(&request).unwrap_err();
    match err {
        RosterError::LowGradeOverflow { count, tightest } => {
            assert_eq!(count, 5);
            assert_eq!(tightest, 3);
        }
        other => panic!("expected LowGradeOverflow, got {:?}", other),
    }
}

#[test]
fn e7_leaver_is_forced_off_after_last_day() {
    setup_for_tests();
    let mut request = RosterRequest {
        year: 2025,
        month: 1, // 31-day month
        daily_wallet_config: DailyWalletConfig {
            weekday: DutyCounts { d: 2, e: 2, n: 2, x: 4 },
            weekend: DutyCounts { d: 1, e: 1, n: 1, x: 7 },
        },
        // 9 all-existing nurses after the one leaver: residual_N=50, ceil(50/9)-1=5, floor(50/9)=5.
        nurse_wallet_min: NurseWalletMin { n: 5 },
        max_consecutive_work: 6,
        nurses: (0..10)
            .map(|i| nurse(&format!("nurse_{}", i), KeepType::All, [Duty::X, Duty::X, Duty::X]))
            .collect(),
        new: vec![],
        quit: vec![LeaverInput {
            name: "nurse_0".to_string(),
            last_day: 10,
            n_count: 4,
            x_count: None,
        }],
        preferences: vec![],
    };
    request.nurses[0] = nurse("nurse_0", KeepType::All, [Duty::X, Duty::X, Duty::X]);

    let response = build_roster(&request).expect("E7 should succeed");
    match response {
        RosterResponse::Success(success) => {
            for day in 11..=31 {
                assert_eq!(success.schedule["nurse_0"][&day.to_string()], Duty::X);
            }
            let wallet = &success.nurse_wallets["nurse_0"];
            assert!((wallet.n - 4).abs() <= 1);
        }
        RosterResponse::Error(err) => panic!("E7 unexpectedly failed: {}", err.message),
    }
}

#[test]
fn joiner_working_a_single_day_is_accepted() {
    setup_for_tests();
    let mut request = e1_request();
    // Bump X demand by one to account for the extra nurse so totals still match nurse_count.
    request.daily_wallet_config.weekday.x += 1;
    request.daily_wallet_config.weekend.x += 1;
    request.new.push(JoinerInput {
        name: "late_joiner".to_string(),
        start_day: 28,
        n_count: 0,
        x_count: None,
    });
    request
        .nurses
        .push(nurse("late_joiner", KeepType::All, [Duty::X, Duty::X, Duty::X]));
    let response = build_roster(&request).expect("single-day joiner should succeed");
    assert!(matches!(response, RosterResponse::Success(_)));
}
