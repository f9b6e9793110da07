//! Schema definitions and the common `BenchSchema` trait.
//!
//! Two implementations are provided:
//! - [`normalized::NormalizedSchema`]: one typed column per attribute
//! - [`eav::EavSchema`]: one `(Id, FieldName, Value)` row per attribute

pub mod eav;
pub mod normalized;

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use eav_core::constants::DEFAULT_LINE;
use eav_core::types::WorkOrder;
use rusqlite::{params, Connection};

/// How a path issues its inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// One autocommit statement per physical row.
    Autocommit,
    /// All of a path's inserts inside a single transaction.
    Transaction,
}

/// Parameters of the filtered read: `TransDate` in `[from, to)` and an
/// exact `Line` match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub line: String,
}

impl WorkOrderFilter {
    /// The calendar month containing `date`, restricted to `line`.
    pub fn month_of(date: NaiveDate, line: &str) -> Self {
        let from = date.with_day(1).unwrap_or(date);
        let to = from
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self {
            from,
            to,
            line: line.to_string(),
        }
    }

    pub fn for_default_line(date: NaiveDate) -> Self {
        Self::month_of(date, DEFAULT_LINE)
    }
}

/// Trait implemented by each schema variant (normalized vs EAV).
///
/// Reads consume every result row before returning, so a timer stopped
/// after the call covers the full result transfer.
pub trait BenchSchema {
    /// Human-readable name for reports.
    fn name(&self) -> &'static str;

    /// Drop the schema's table (if present) and create it fresh, with indexes.
    fn create_tables(&self, conn: &Connection) -> Result<()>;

    /// Insert logical work orders. Returns the number of physical rows written.
    fn insert_work_orders(
        &self,
        conn: &Connection,
        orders: &[WorkOrder],
        mode: InsertMode,
    ) -> Result<usize>;

    /// Unfiltered read of every logical row. Returns the logical row count.
    fn read_all(&self, conn: &Connection) -> Result<usize>;

    /// Filtered read by date range and line. Returns the logical row count.
    fn read_filtered(&self, conn: &Connection, filter: &WorkOrderFilter) -> Result<usize>;
}

/// Drop and recreate both benchmark tables. Any data in them is lost.
pub fn initialize(conn: &Connection) -> Result<()> {
    normalized::NormalizedSchema::new()
        .create_tables(conn)
        .context("failed to create normalized table")?;
    eav::EavSchema::new()
        .create_tables(conn)
        .context("failed to create EAV table")?;
    log::debug!("benchmark tables recreated");
    Ok(())
}

/// Run `insert` directly or inside one transaction, depending on `mode`.
pub(crate) fn with_insert_mode<F>(conn: &Connection, mode: InsertMode, insert: F) -> Result<usize>
where
    F: FnOnce(&Connection) -> Result<usize>,
{
    match mode {
        InsertMode::Autocommit => insert(conn),
        InsertMode::Transaction => {
            let tx = conn.unchecked_transaction()?;
            let written = insert(&tx)?;
            tx.commit()?;
            Ok(written)
        }
    }
}

/// Column names of `table`, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
    let mut columns = Vec::new();
    for r in rows {
        columns.push(r?);
    }
    Ok(columns)
}

/// Index names defined on `table`.
pub fn table_indexes(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
    let mut indexes = Vec::new();
    for r in rows {
        indexes.push(r?);
    }
    Ok(indexes)
}

pub fn row_count(conn: &Connection, table: &str) -> Result<usize> {
    // Table names come from constants, never from input.
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
    Ok(count as usize)
}

/// Configure a connection for benchmark runs.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = OFF;
         PRAGMA cache_size = -131072;
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(())
}
