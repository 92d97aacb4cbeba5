//! coalesce-core CLI entry point.
//!
//! ## Subcommands
//!
//! - `coalesce-core-cli config show|defaults|validate` - Inspect configuration
//! - `coalesce-core-cli simulate` - Run an engine against a synthetic loader
//! - `coalesce-core-cli version` - Print version

use std::path::Path;
use std::process::ExitCode;

use coalesce_core::cli::{config_cmd, flag_value, simulate};
use coalesce_core::config;
use coalesce_core::telemetry::{init_logging, LogFormat};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("coalesce-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            let file = flag_value(&args, "--file").map(Path::new);
            match subcommand {
                "show" => exit_code(config_cmd::run_show(file)),
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => exit_code(config_cmd::run_validate(file)),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "simulate" => {
            // Logs go to stderr so the JSON report on stdout stays clean.
            let mut log = config::load().log;
            if args.iter().any(|arg| arg == "--verbose" || arg == "-v") {
                log.format = LogFormat::Pretty;
                log.level = "coalesce_core=debug".to_string();
            }
            if let Err(e) = init_logging(&log) {
                eprintln!("Failed to initialize logging: {}", e);
            }
            exit_code(simulate::run_simulate(&args).await)
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "coalesce-core - request coalescing and batch scheduling v{}

USAGE:
    coalesce-core-cli [COMMAND] [OPTIONS]

COMMANDS:
    config       Inspect configuration (show, defaults, validate)
    simulate     Drive an engine against a synthetic loader, print JSON stats
    version      Show version information
    help         Show this help message

OPTIONS:
    -h, --help     Show help for command
    -V, --version  Show version information

EXAMPLES:
    coalesce-core-cli config show                       # Effective configuration
    coalesce-core-cli config validate --file app.toml   # Check a config file
    coalesce-core-cli simulate --keys 5000 --batch-size 50

ENVIRONMENT:
    COALESCE_*           Engine and façade settings (see `config defaults`)
    COALESCE_LOG_LEVEL   Log filter (default: info)
    COALESCE_LOG_FORMAT  json or pretty (default: json)
    RUST_LOG             Overrides COALESCE_LOG_LEVEL when set

EXIT CODES:
    0  Success
    1  Failure / warnings found
    2  Configuration error",
        version
    );
}

fn print_command_help(command: &str) {
    match command {
        "config" => eprintln!(
            "coalesce-core-cli config <show|defaults|validate> [--file PATH]

    show      Print effective configuration as KEY=VALUE lines
    defaults  Print built-in defaults, ignoring the environment
    validate  Report settings that load but behave badly

    --file PATH  Layer a TOML file over the environment"
        ),
        "simulate" => eprintln!(
            "coalesce-core-cli simulate [--keys N] [--batch-size N] [--verbose]

    --keys N        Distinct keys to submit, each twice (default: 1000)
    --batch-size N  Max keys per loader call (default: 100)
    --verbose       Pretty debug logs on stderr"
        ),
        _ => {
            eprintln!("No help available for '{}'", command);
            print_usage();
        }
    }
}
