//! Benchmark fixtures: each one prepares the schema, clears caches, then
//! times the normalized path and the EAV path one after the other.
//!
//! | Fixture       | Setup (untimed)              | Timed per path                      |
//! |---------------|------------------------------|-------------------------------------|
//! | `insert-read` | recreate tables              | open, N inserts (x4 for EAV), full read |
//! | `select`      | recreate tables, seed N rows | open, filtered read                 |
//!
//! The timer starts right before the connection is opened and stops right
//! after the last result row is consumed, identically for both paths.

use crate::cache::clear_caches;
use crate::config::{BenchConfig, ConnectionTarget};
use crate::populate::{generate_work_orders, seed_both};
use crate::report::{Comparison, PathResult};
use crate::schema::eav::EavSchema;
use crate::schema::normalized::NormalizedSchema;
use crate::schema::{self, BenchSchema};
use anyhow::{bail, Context, Result};
use eav_core::types::WorkOrder;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Insert N logical rows, then read the whole table back.
    InsertAndRead,
    /// Filtered read (date range + line) over pre-seeded tables.
    Select,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::InsertAndRead, Scenario::Select];

    pub fn label(self) -> &'static str {
        match self {
            Scenario::InsertAndRead => "insert-read",
            Scenario::Select => "select",
        }
    }

    pub fn from_name(name: &str) -> Result<Scenario> {
        match name.to_lowercase().as_str() {
            "insert-read" | "insert_read" | "insert" => Ok(Scenario::InsertAndRead),
            "select" | "read" => Ok(Scenario::Select),
            _ => bail!("unknown scenario: {name:?}"),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Drop and recreate both tables on a short-lived connection.
pub fn initialize_schema(target: &ConnectionTarget) -> Result<()> {
    let conn = target.open()?;
    schema::initialize(&conn)
}

fn clear_if_enabled(config: &BenchConfig) -> Result<()> {
    if config.clear_cache {
        clear_caches(&config.target)?;
    }
    Ok(())
}

/// Time one path of the insert-and-read fixture.
pub fn time_insert_and_read(
    config: &BenchConfig,
    schema: &dyn BenchSchema,
    orders: &[WorkOrder],
) -> Result<PathResult> {
    let mut result = PathResult::new(schema.name(), Scenario::InsertAndRead.label());

    let start = Instant::now();
    let conn = config.target.open()?;
    result.rows_written = schema
        .insert_work_orders(&conn, orders, config.insert_mode)
        .with_context(|| format!("{} insert failed", schema.name()))?;
    result.rows_read = schema
        .read_all(&conn)
        .with_context(|| format!("{} read failed", schema.name()))?;
    result.elapsed = start.elapsed();
    drop(conn);

    log::debug!(
        "{}: wrote {} rows, read {} rows in {:.3} ms",
        schema.name(),
        result.rows_written,
        result.rows_read,
        result.elapsed_ms()
    );
    Ok(result)
}

/// Time one path of the select fixture.
pub fn time_select(config: &BenchConfig, schema: &dyn BenchSchema) -> Result<PathResult> {
    let mut result = PathResult::new(schema.name(), Scenario::Select.label());

    let start = Instant::now();
    let conn = config.target.open()?;
    result.rows_read = schema
        .read_filtered(&conn, &config.filter)
        .with_context(|| format!("{} filtered read failed", schema.name()))?;
    result.elapsed = start.elapsed();
    drop(conn);

    log::debug!(
        "{}: read {} rows in {:.3} ms",
        schema.name(),
        result.rows_read,
        result.elapsed_ms()
    );
    Ok(result)
}

/// Recreate the tables, then time inserting and reading `config.rows` work
/// orders through each schema.
pub fn run_insert_and_read(config: &BenchConfig) -> Result<Comparison> {
    let _anchor = config.target.keep_alive()?;
    initialize_schema(&config.target)?;

    let orders = generate_work_orders(config.rows, config.trans_date);
    let normalized_schema = NormalizedSchema::new();
    let eav_schema = EavSchema::new();

    clear_if_enabled(config)?;
    let normalized = time_insert_and_read(config, &normalized_schema, &orders)?;
    clear_if_enabled(config)?;
    let eav = time_insert_and_read(config, &eav_schema, &orders)?;

    let cmp = Comparison {
        scenario: Scenario::InsertAndRead.label().to_string(),
        normalized,
        eav,
    };
    cmp.log();
    Ok(cmp)
}

/// Recreate and seed the tables (untimed), then time the filtered read
/// through each schema.
pub fn run_select(config: &BenchConfig) -> Result<Comparison> {
    let _anchor = config.target.keep_alive()?;
    {
        let conn = config.target.open()?;
        schema::initialize(&conn)?;
        let orders = generate_work_orders(config.rows, config.trans_date);
        let (normalized, eav) = seed_both(&conn, &orders)?;
        log::debug!("seeded {normalized} normalized rows and {eav} EAV rows");
    }

    clear_if_enabled(config)?;
    let normalized = time_select(config, &NormalizedSchema::new())?;
    clear_if_enabled(config)?;
    let eav = time_select(config, &EavSchema::new())?;

    let cmp = Comparison {
        scenario: Scenario::Select.label().to_string(),
        normalized,
        eav,
    };
    cmp.log();
    Ok(cmp)
}

pub fn run(config: &BenchConfig, scenario: Scenario) -> Result<Comparison> {
    log::info!(
        "running {} with {} rows against {}",
        scenario,
        config.rows,
        config.target.describe()
    );
    match scenario {
        Scenario::InsertAndRead => run_insert_and_read(config),
        Scenario::Select => run_select(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names_round_trip() {
        for s in Scenario::ALL {
            assert_eq!(Scenario::from_name(s.label()).unwrap(), s);
        }
        assert_eq!(
            Scenario::from_name("INSERT").unwrap(),
            Scenario::InsertAndRead
        );
        assert!(Scenario::from_name("update").is_err());
    }
}
