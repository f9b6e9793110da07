//! Work-order generation and untimed seeding.
//!
//! Values are literal or derived from the loop index; the same inputs always
//! produce the same rows.

use crate::schema::eav::EavSchema;
use crate::schema::normalized::NormalizedSchema;
use crate::schema::{BenchSchema, InsertMode};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use eav_core::constants::{DEFAULT_CUSTOMER_NAME, DEFAULT_LINE, WORK_NO_PREFIX};
use eav_core::types::WorkOrder;
use rusqlite::Connection;

/// `WO0000`, `WO0001`, ... Indices past 9999 simply grow wider.
pub fn work_no(index: usize) -> String {
    format!("{WORK_NO_PREFIX}{index:04}")
}

/// `count` work orders on line `LineA` for customer `PT Maju Jaya`, all
/// dated `trans_date`, numbered from `WO0000`.
pub fn generate_work_orders(count: usize, trans_date: NaiveDate) -> Vec<WorkOrder> {
    (0..count)
        .map(|i| WorkOrder {
            line: DEFAULT_LINE.to_string(),
            trans_date,
            work_no: work_no(i),
            customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
        })
        .collect()
}

/// Load the same work orders into both tables in one transaction each.
/// Used to prepare data for read-only scenarios; not timed.
pub fn seed_both(conn: &Connection, orders: &[WorkOrder]) -> Result<(usize, usize)> {
    let normalized = NormalizedSchema::new()
        .insert_work_orders(conn, orders, InsertMode::Transaction)
        .context("failed to seed normalized table")?;
    let eav = EavSchema::new()
        .insert_work_orders(conn, orders, InsertMode::Transaction)
        .context("failed to seed EAV table")?;
    Ok((normalized, eav))
}
