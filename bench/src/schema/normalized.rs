//! Normalized schema: one row per work order, one typed column per attribute.

use super::{with_insert_mode, BenchSchema, InsertMode, WorkOrderFilter};
use anyhow::Result;
use eav_core::types::{WorkOrder, WorkOrderRow};
use rusqlite::{params, Connection, Row};

const INSERT_SQL: &str = "
    INSERT INTO WorkOrders (Line, TransDate, WorkNo, CustomerName)
    VALUES (?1, ?2, ?3, ?4)";

const SELECT_ALL_SQL: &str = "
    SELECT Id, Line, TransDate, WorkNo, CustomerName
    FROM WorkOrders";

const SELECT_FILTERED_SQL: &str = "
    SELECT Id, Line, TransDate, WorkNo, CustomerName
    FROM WorkOrders
    WHERE TransDate >= ?1 AND TransDate < ?2
      AND Line = ?3";

pub struct NormalizedSchema;

impl NormalizedSchema {
    pub fn new() -> Self {
        Self
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<WorkOrderRow> {
        Ok(WorkOrderRow {
            id: row.get(0)?,
            line: row.get(1)?,
            trans_date: row.get(2)?,
            work_no: row.get(3)?,
            customer_name: row.get(4)?,
        })
    }

    /// Every row of the table, decoded.
    pub fn fetch_all(&self, conn: &Connection) -> Result<Vec<WorkOrderRow>> {
        let mut stmt = conn.prepare_cached(SELECT_ALL_SQL)?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }

    pub fn fetch_filtered(
        &self,
        conn: &Connection,
        filter: &WorkOrderFilter,
    ) -> Result<Vec<WorkOrderRow>> {
        let mut stmt = conn.prepare_cached(SELECT_FILTERED_SQL)?;
        let rows = stmt.query_map(params![filter.from, filter.to, filter.line], Self::map_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }
}

impl Default for NormalizedSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchSchema for NormalizedSchema {
    fn name(&self) -> &'static str {
        "normalized"
    }

    fn create_tables(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            DROP TABLE IF EXISTS WorkOrders;
            CREATE TABLE WorkOrders (
                Id           INTEGER PRIMARY KEY AUTOINCREMENT,
                Line         VARCHAR(50),
                TransDate    DATE,
                WorkNo       VARCHAR(50),
                CustomerName VARCHAR(100)
            );
            ",
        )?;
        Ok(())
    }

    fn insert_work_orders(
        &self,
        conn: &Connection,
        orders: &[WorkOrder],
        mode: InsertMode,
    ) -> Result<usize> {
        with_insert_mode(conn, mode, |conn| {
            let mut stmt = conn.prepare_cached(INSERT_SQL)?;
            for wo in orders {
                stmt.execute(params![wo.line, wo.trans_date, wo.work_no, wo.customer_name])?;
            }
            Ok(orders.len())
        })
    }

    fn read_all(&self, conn: &Connection) -> Result<usize> {
        Ok(self.fetch_all(conn)?.len())
    }

    fn read_filtered(&self, conn: &Connection, filter: &WorkOrderFilter) -> Result<usize> {
        Ok(self.fetch_filtered(conn, filter)?.len())
    }
}
