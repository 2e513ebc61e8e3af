//! Wire format for the roster-build response (spec.md §6).

use crate::duty::Duty;
use crate::error::RosterError;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct NurseWalletOut {
    #[serde(rename = "N")]
    pub n: i64,
    #[serde(rename = "X")]
    pub x: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub daily_wallet_satisfied: bool,
    pub nurse_wallet_satisfied: bool,
    pub low_grade_satisfied: bool,
    pub daily_wallet_violations: Vec<String>,
    pub nurse_wallet_violations: Vec<String>,
    pub low_grade_violations: Vec<String>,
    pub n_shortfall_nurses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolverStats {
    pub objective_value: f64,
    pub wall_time_seconds: f64,
    pub num_branches: u64,
}

/// `schedule[nurse][day]`, where `day` ranges over `"-3","-2","-1","1",..,"<num_days>"`.
pub type Schedule = IndexMap<String, IndexMap<String, Duty>>;

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub status: &'static str,
    pub schedule: Schedule,
    pub nurse_wallets: IndexMap<String, NurseWalletOut>,
    pub validation: ValidationReport,
    pub solver_stats: SolverStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RosterResponse {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl RosterResponse {
    pub fn success(
        schedule: Schedule,
        nurse_wallets: IndexMap<String, NurseWalletOut>,
        validation: ValidationReport,
        solver_stats: SolverStats,
    ) -> Self {
        RosterResponse::Success(SuccessResponse {
            status: "success",
            schedule,
            nurse_wallets,
            validation,
            solver_stats,
        })
    }

    /// Exit code to use when this response is printed by a subprocess wrapper (spec.md §6).
    pub fn exit_code(&self) -> i32 {
        match self {
            RosterResponse::Success(_) => 0,
            RosterResponse::Error(_) => 1,
        }
    }
}

impl From<RosterError> for RosterResponse {
    fn from(err: RosterError) -> Self {
        RosterResponse::Error(ErrorResponse {
            status: err.status(),
            message: err.to_string(),
            traceback: None,
        })
    }
}
