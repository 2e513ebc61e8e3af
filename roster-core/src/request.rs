//! Wire format for the roster-build request (spec.md §6).

use crate::duty::{DePreference, Duty, KeepType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRequest {
    pub year: i32,
    pub month: u32,
    pub daily_wallet_config: DailyWalletConfig,
    pub nurse_wallet_min: NurseWalletMin,
    pub max_consecutive_work: i64,
    pub nurses: Vec<NurseInput>,
    #[serde(default)]
    pub new: Vec<JoinerInput>,
    #[serde(default)]
    pub quit: Vec<LeaverInput>,
    #[serde(default)]
    pub preferences: Vec<PreferenceInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyWalletConfig {
    pub weekday: DutyCounts,
    pub weekend: DutyCounts,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DutyCounts {
    #[serde(rename = "D")]
    pub d: i64,
    #[serde(rename = "E")]
    pub e: i64,
    #[serde(rename = "N")]
    pub n: i64,
    #[serde(rename = "X")]
    pub x: i64,
}

impl DutyCounts {
    pub fn total(&self) -> i64 {
        self.d + self.e + self.n + self.x
    }

    pub fn get(&self, duty: Duty) -> i64 {
        match duty {
            Duty::D => self.d,
            Duty::E => self.e,
            Duty::N => self.n,
            Duty::X => self.x,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NurseWalletMin {
    #[serde(rename = "N")]
    pub n: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NurseInput {
    pub name: String,
    pub keep_type: KeepType,
    pub past_3days: [Duty; 3],
    #[serde(default)]
    pub is_low_grade: bool,
    #[serde(default)]
    pub de_preference: DePreference,
    #[serde(default)]
    pub special_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinerInput {
    pub name: String,
    pub start_day: i64,
    pub n_count: i64,
    /// Declared by the caller but not authoritative; see `DESIGN.md` for the
    /// open-question resolution (the `auto_x` formula is used instead).
    #[serde(default)]
    pub x_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaverInput {
    pub name: String,
    pub last_day: i64,
    pub n_count: i64,
    #[serde(default)]
    pub x_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceInput {
    pub name: String,
    pub schedule: BTreeMap<String, Duty>,
    #[serde(default)]
    pub is_submitted: Option<bool>,
}

impl PreferenceInput {
    /// Parses the string-keyed `schedule` map into `day -> Duty`, skipping (rather than
    /// failing on) malformed day keys; the input validator is responsible for rejecting
    /// out-of-range days.
    pub fn days(&self) -> Vec<(i64, Duty)> {
        self.schedule
            .iter()
            .filter_map(|(day, duty)| day.parse::<i64>().ok().map(|d| (d, *duty)))
            .collect()
    }
}
