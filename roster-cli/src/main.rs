use clap::Parser;
use log::LevelFilter;
use roster_core::{build_roster_with, RosterRequest, RosterResponse, SolverConfig};
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

/// Builds a monthly nurse duty roster from a JSON request.
#[derive(Parser, Debug)]
#[command(name = "roster-cli")]
struct Args {
    /// Path to the request JSON file. Reads from stdin when omitted.
    #[arg(short, long)]
    input: Option<String>,

    /// Random seed forwarded to the solver driver for reproducible reruns.
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-time budget for the solver, in seconds.
    #[arg(long, default_value_t = 120.0)]
    max_time_seconds: f64,
}

fn main() -> ExitCode {
    env_logger::Builder::new().filter(None, LevelFilter::Info).init();

    let args = Args::parse();

    let body = match read_input(args.input.as_deref()) {
        Ok(body) => body,
        Err(err) => {
            print_error(&format!("failed to read input: {}", err));
            return ExitCode::FAILURE;
        }
    };

    let request: RosterRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(err) => {
            print_error(&format!("malformed request JSON: {}", err));
            return ExitCode::FAILURE;
        }
    };

    let solver_config = SolverConfig {
        max_time_seconds: args.max_time_seconds,
        seed: args.seed.unwrap_or_else(rand::random),
    };

    let response = match build_roster_with(&request, &roster_core::calendar::NoHolidays, &solver_config) {
        Ok(response) => response,
        Err(err) => RosterResponse::from(err),
    };

    let exit_code = response.exit_code();
    println!("{}", serde_json::to_string_pretty(&response).unwrap());
    if exit_code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn print_error(message: &str) {
    let body = serde_json::json!({ "status": "error", "message": message });
    println!("{}", body);
}
