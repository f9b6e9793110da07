//! Standalone benchmark runner that prints the formatted report.
//!
//! Configuration comes from `EAV_BENCH_*` environment variables (a `.env`
//! file in the working directory is loaded first) and may be overridden on
//! the command line.
//!
//! Usage:
//!   cargo run --release
//!   cargo run --release -- insert-read --rows 2000 --assert
//!   EAV_BENCH_DB="Data Source=/tmp/wo.db" cargo run --release -- select

use anyhow::{anyhow, Result};
use eav_bench::config::BenchConfig;
use eav_bench::report::print_report;
use eav_bench::scenario::{self, Scenario};
use eav_bench::schema::InsertMode;
use log::LevelFilter;
use std::env;
use std::process;

fn usage() -> &'static str {
    "Usage:\n  eav-bench [insert-read|select|all] [options]\n\nOptions:\n  --rows <n>          Logical work orders per path (default 10000)\n  --db <conn string>  Connection string, e.g. \"Data Source=bench.db;Pooling=false\"\n  --no-cache-clear    Skip cache clearing before each timed path\n  --batched           Wrap each path's inserts in one transaction\n  --assert            Fail unless the normalized path is faster (insert-read)\n  --help              Print this help\n\nEnvironment:\n  EAV_BENCH_DB, EAV_BENCH_ROWS, EAV_BENCH_TRANS_DATE, EAV_BENCH_CLEAR_CACHE,\n  EAV_BENCH_BATCHED, EAV_BENCH_ASSERT, EAV_BENCH_LOG_LEVEL, EAV_BENCH_LOG_FILE"
}

fn resolve_log_level() -> LevelFilter {
    env::var("EAV_BENCH_LOG_LEVEL")
        .ok()
        .as_deref()
        .and_then(eav_core::parse_log_level)
        .unwrap_or(LevelFilter::Info)
}

fn resolve_log_file() -> Option<String> {
    match env::var("EAV_BENCH_LOG_FILE") {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}

/// What the command line asked for.
#[derive(Debug)]
enum Command {
    Help,
    Run(Vec<Scenario>, BenchConfig),
}

/// Apply command-line arguments on top of the environment config, then
/// validate the result once.
fn parse_args<I>(mut config: BenchConfig, args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut scenarios: Option<Vec<Scenario>> = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--rows" => {
                let Some(value) = args.next() else {
                    return Err(anyhow!("missing value for --rows"));
                };
                config.rows = value
                    .parse()
                    .map_err(|_| anyhow!("invalid value for --rows: {value:?}"))?;
            }
            "--db" => {
                let Some(value) = args.next() else {
                    return Err(anyhow!("missing value for --db"));
                };
                config.target = value.parse()?;
            }
            "--no-cache-clear" => config.clear_cache = false,
            "--batched" => config.insert_mode = InsertMode::Transaction,
            "--assert" => config.assert_ordering = true,
            "all" => scenarios = Some(Scenario::ALL.to_vec()),
            other if !other.starts_with('-') => {
                scenarios
                    .get_or_insert_with(Vec::new)
                    .push(Scenario::from_name(other)?);
            }
            other => return Err(anyhow!("unknown argument: {other:?}")),
        }
    }

    config.validate()?;
    Ok(Command::Run(
        scenarios.unwrap_or_else(|| Scenario::ALL.to_vec()),
        config,
    ))
}

fn run() -> Result<()> {
    let config = BenchConfig::from_env()?;
    let (scenarios, config) = match parse_args(config, env::args().skip(1))? {
        Command::Help => {
            println!("{}", usage());
            return Ok(());
        }
        Command::Run(scenarios, config) => (scenarios, config),
    };

    println!("Running normalized vs EAV work order benchmark...");
    println!("  Database:     {}", config.target.describe());
    println!("  Rows:         {}", config.rows);
    println!("  TransDate:    {}", config.trans_date);
    println!("  Cache clear:  {}", config.clear_cache);
    println!("  Insert mode:  {:?}", config.insert_mode);

    let mut comparisons = Vec::new();
    for s in scenarios {
        comparisons.push(scenario::run(&config, s)?);
    }

    print_report(&comparisons);

    if config.assert_ordering {
        for cmp in comparisons
            .iter()
            .filter(|c| c.scenario == Scenario::InsertAndRead.label())
        {
            cmp.assert_normalized_faster()?;
        }
    }
    Ok(())
}

fn main() {
    let _ = dotenvy::dotenv();

    let log_file = resolve_log_file();
    eav_core::initialize_logger(resolve_log_level(), log_file.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Exiting.", e);
        process::exit(1);
    });

    if let Err(e) = run() {
        log::error!("{e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_config(pairs: &[(&str, &str)]) -> BenchConfig {
        BenchConfig::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    fn expect_run(command: Command) -> (Vec<Scenario>, BenchConfig) {
        match command {
            Command::Run(scenarios, config) => (scenarios, config),
            Command::Help => panic!("expected a run command"),
        }
    }

    #[test]
    fn test_flags_override_invalid_env_rows() {
        let config = env_config(&[("EAV_BENCH_ROWS", "0")]);
        let (scenarios, config) = expect_run(
            parse_args(
                config,
                args(&["insert-read", "--rows", "5", "--db", "Data Source=/tmp/cli.db"]),
            )
            .unwrap(),
        );
        assert_eq!(scenarios, [Scenario::InsertAndRead]);
        assert_eq!(config.rows, 5);
        assert_eq!(config.target.data_source, "/tmp/cli.db");
    }

    #[test]
    fn test_invalid_env_rows_fail_without_override() {
        let config = env_config(&[("EAV_BENCH_ROWS", "0")]);
        assert!(parse_args(config, args(&["select"])).is_err());
    }

    #[test]
    fn test_flags_override_env_toggles() {
        let config = env_config(&[("EAV_BENCH_CLEAR_CACHE", "true"), ("EAV_BENCH_ROWS", "40")]);
        let cli = args(&["--no-cache-clear", "--batched", "--assert"]);
        let (scenarios, config) = expect_run(parse_args(config, cli).unwrap());
        assert_eq!(scenarios, Scenario::ALL);
        assert_eq!(config.rows, 40);
        assert!(!config.clear_cache);
        assert_eq!(config.insert_mode, InsertMode::Transaction);
        assert!(config.assert_ordering);
    }

    #[test]
    fn test_help_short_circuits() {
        let config = env_config(&[]);
        assert!(matches!(
            parse_args(config, args(&["--rows", "3", "--help"])).unwrap(),
            Command::Help
        ));
    }

    #[test]
    fn test_unknown_arguments_are_rejected() {
        assert!(parse_args(env_config(&[]), args(&["--verbose"])).is_err());
        assert!(parse_args(env_config(&[]), args(&["update"])).is_err());
        assert!(parse_args(env_config(&[]), args(&["--rows"])).is_err());
        assert!(parse_args(env_config(&[]), args(&["--rows", "many"])).is_err());
        assert!(parse_args(env_config(&[]), args(&["--db", "Color=blue"])).is_err());
    }
}
