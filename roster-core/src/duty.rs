//! Duty enum, keep-type restrictions and the 3-day transition legality table.

use serde::{Deserialize, Serialize};

/// One of the four duties a nurse can be assigned on a given day.
///
/// Ordinal weights are fixed (`D=0, E=1, N=2, X=3`) because `Z_RULES` indexing
/// depends on them: `index = 16*w[0] + 4*w[1] + w[2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Duty {
    D = 0,
    E = 1,
    N = 2,
    X = 3,
}

pub const ALL_DUTIES: [Duty; 4] = [Duty::D, Duty::E, Duty::N, Duty::X];

impl Duty {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ord: u8) -> Option<Duty> {
        match ord {
            0 => Some(Duty::D),
            1 => Some(Duty::E),
            2 => Some(Duty::N),
            3 => Some(Duty::X),
            _ => None,
        }
    }

    pub fn bit(self) -> u8 {
        1 << self.ordinal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Duty::D => "D",
            Duty::E => "E",
            Duty::N => "N",
            Duty::X => "X",
        }
    }
}

/// Contractual duty restriction of a nurse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepType {
    All,
    DayFixed,
    NightFixed,
}

/// The soft D-vs-E bias for `All` nurses. `=` (neutral) disables the preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DePreference {
    D,
    E,
    #[serde(rename = "=")]
    #[default]
    Neutral,
}

/// `pattern_index = 16*w[0] + 4*w[1] + w[2]` for a 3-day duty window, as used to key `Z_RULES`.
pub fn pattern_index(w0: Duty, w1: Duty, w2: Duty) -> usize {
    16 * w0.ordinal() as usize + 4 * w1.ordinal() as usize + w2.ordinal() as usize
}

fn bitmask(duties: &[Duty]) -> u8 {
    duties.iter().fold(0u8, |acc, d| acc | d.bit())
}

lazy_static::lazy_static! {
    /// Fixed mapping from 3-day pattern index (0..=63) to the bitmask of duties allowed on the
    /// 4th day. Indices absent from this table are forbidden patterns: those three consecutive
    /// days may never occur together, regardless of what follows.
    pub static ref Z_RULES: [Option<u8>; 64] = {
        use Duty::*;
        let mut table: [Option<u8>; 64] = [None; 64];
        let entries: &[(usize, &[Duty])] = &[
            (0, &[D, E, N, X]), (1, &[E, N, X]), (2, &[N]), (3, &[D, E, N, X]),
            (5, &[E, N, X]), (6, &[N]), (7, &[D, E, N, X]), (10, &[N, X]),
            (12, &[D, E, N, X]), (13, &[E, N, X]), (14, &[N]), (15, &[D, E, N, X]),
            (21, &[E, N, X]), (22, &[N]), (23, &[D, E, N, X]), (26, &[N, X]),
            (28, &[D, E, N, X]), (29, &[E, N, X]), (30, &[N]), (31, &[D, E, N, X]),
            (42, &[X]), (43, &[X]), (45, &[E, X]), (47, &[D, E, N, X]),
            (48, &[D, E, N, X]), (49, &[E, N, X]), (50, &[N]), (51, &[D, E, N, X]),
            (53, &[E, N, X]), (54, &[N]), (55, &[D, E, N, X]), (58, &[N, X]),
            (60, &[D, E, N, X]), (61, &[E, N, X]), (62, &[N]), (63, &[D, E, N, X]),
        ];
        for (idx, duties) in entries {
            table[*idx] = Some(bitmask(duties));
        }
        table
    };
}

/// Whether `pattern_index` is a key of `Z_RULES` (an allowed 3-day pattern).
pub fn is_allowed_pattern(idx: usize) -> bool {
    Z_RULES[idx].is_some()
}

/// The bitmask of duties permitted on the day after `pattern_index`, or `None` if forbidden.
pub fn allowed_next_duties(idx: usize) -> Option<u8> {
    Z_RULES[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_index_matches_spec_formula() {
        assert_eq!(pattern_index(Duty::D, Duty::D, Duty::D), 0);
        assert_eq!(pattern_index(Duty::X, Duty::X, Duty::X), 63);
        assert_eq!(pattern_index(Duty::N, Duty::N, Duty::N), 42);
    }

    #[test]
    fn nnn_pattern_forces_x_next_day() {
        let idx = pattern_index(Duty::N, Duty::N, Duty::N);
        assert_eq!(allowed_next_duties(idx), Some(Duty::X.bit()));
    }

    #[test]
    fn n_d_n_pattern_is_forbidden() {
        let idx = pattern_index(Duty::N, Duty::D, Duty::N);
        assert_eq!(idx, 32);
        assert!(!is_allowed_pattern(idx));
    }

    #[test]
    fn exactly_36_patterns_are_allowed() {
        assert_eq!(Z_RULES.iter().filter(|e| e.is_some()).count(), 36);
    }
}
