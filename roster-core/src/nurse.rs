//! Domain model for a nurse and its active window, built from the wire request.

use crate::duty::{DePreference, Duty, KeepType};

/// How a nurse relates to the month being scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transience {
    /// Present for the whole month.
    Existing,
    /// Starts working on `start_day` (inclusive); forced off before that.
    Joiner { start_day: i64, n_count: i64 },
    /// Stops working after `last_day` (inclusive); forced off afterwards.
    Leaver { last_day: i64, n_count: i64 },
}

#[derive(Debug, Clone)]
pub struct Nurse {
    pub name: String,
    pub keep_type: KeepType,
    pub past_3days: [Duty; 3],
    pub is_low_grade: bool,
    pub de_preference: DePreference,
    pub special_days: i64,
    pub transience: Transience,
}

impl Nurse {
    /// The inclusive `[start, end]` day range during which this nurse actually works.
    /// Joiners are off before `start_day`; leavers are off after `last_day`.
    pub fn active_window(&self, num_days: i64) -> (i64, i64) {
        match self.transience {
            Transience::Existing => (1, num_days),
            Transience::Joiner { start_day, .. } => (start_day, num_days),
            Transience::Leaver { last_day, .. } => (1, last_day),
        }
    }

    pub fn is_joiner(&self) -> bool {
        matches!(self.transience, Transience::Joiner { .. })
    }

    pub fn is_leaver(&self) -> bool {
        matches!(self.transience, Transience::Leaver { .. })
    }

    pub fn is_transient(&self) -> bool {
        self.is_joiner() || self.is_leaver()
    }

    pub fn declared_n_count(&self) -> Option<i64> {
        match self.transience {
            Transience::Existing => None,
            Transience::Joiner { n_count, .. } | Transience::Leaver { n_count, .. } => Some(n_count),
        }
    }

    /// Length, in days, of this nurse's active working window within the month.
    pub fn work_days(&self, num_days: i64) -> i64 {
        let (start, end) = self.active_window(num_days);
        (end - start + 1).max(0)
    }
}

/// The monthly `{N, X}` budget derived for one nurse by the classifier (spec.md §4.2).
#[derive(Debug, Clone, Copy, Default)]
pub struct NurseWallet {
    pub target_n: i64,
    pub target_x: i64,
}

/// Day-of-month preference, restricted to N/X deductions plus D/E passthrough to the
/// solver's `C4` constraint (the nurse wallet only tracks N and X).
#[derive(Debug, Clone)]
pub struct Preference {
    pub nurse_name: String,
    pub day: i64,
    pub duty: Duty,
}
