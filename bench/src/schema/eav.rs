//! Entity-Attribute-Value schema: each work order becomes one
//! `(Id, FieldName, Value)` row per attribute, and reads rebuild logical
//! rows with a conditional-aggregation pivot grouped by `Id`.

use super::{with_insert_mode, BenchSchema, InsertMode, WorkOrderFilter};
use anyhow::Result;
use eav_core::constants::ISO_DATE_FORMAT;
use eav_core::types::{PivotRow, WorkOrder};
use rusqlite::{params, Connection, Row};

const INSERT_SQL: &str = "
    INSERT INTO WorkOrders_EAV (Id, FieldName, Value)
    VALUES (?1, ?2, ?3)";

const PIVOT_ALL_SQL: &str = "
    SELECT Id,
        MAX(CASE WHEN FieldName = 'Line' THEN Value END) AS Line,
        MAX(CASE WHEN FieldName = 'TransDate' THEN Value END) AS TransDate,
        MAX(CASE WHEN FieldName = 'WorkNo' THEN Value END) AS WorkNo,
        MAX(CASE WHEN FieldName = 'CustomerName' THEN Value END) AS CustomerName
    FROM WorkOrders_EAV
    GROUP BY Id";

// Dates are compared as ISO strings, which sort chronologically.
const PIVOT_FILTERED_SQL: &str = "
    SELECT Id,
        MAX(CASE WHEN FieldName = 'Line' THEN Value END) AS Line,
        MAX(CASE WHEN FieldName = 'TransDate' THEN Value END) AS TransDate,
        MAX(CASE WHEN FieldName = 'WorkNo' THEN Value END) AS WorkNo,
        MAX(CASE WHEN FieldName = 'CustomerName' THEN Value END) AS CustomerName
    FROM WorkOrders_EAV
    WHERE Id IN (
        SELECT Id
        FROM WorkOrders_EAV
        WHERE FieldName = 'TransDate' AND Value >= ?1 AND Value < ?2
    )
    AND Id IN (
        SELECT Id
        FROM WorkOrders_EAV
        WHERE FieldName = 'Line' AND Value = ?3
    )
    GROUP BY Id";

pub struct EavSchema;

impl EavSchema {
    pub fn new() -> Self {
        Self
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PivotRow> {
        Ok(PivotRow {
            id: row.get(0)?,
            line: row.get(1)?,
            trans_date: row.get(2)?,
            work_no: row.get(3)?,
            customer_name: row.get(4)?,
        })
    }

    /// Every logical row, rebuilt from attribute rows.
    pub fn fetch_pivot(&self, conn: &Connection) -> Result<Vec<PivotRow>> {
        let mut stmt = conn.prepare_cached(PIVOT_ALL_SQL)?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }

    pub fn fetch_pivot_filtered(
        &self,
        conn: &Connection,
        filter: &WorkOrderFilter,
    ) -> Result<Vec<PivotRow>> {
        let from = filter.from.format(ISO_DATE_FORMAT).to_string();
        let to = filter.to.format(ISO_DATE_FORMAT).to_string();

        let mut stmt = conn.prepare_cached(PIVOT_FILTERED_SQL)?;
        let rows = stmt.query_map(params![from, to, filter.line], Self::map_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }
}

impl Default for EavSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchSchema for EavSchema {
    fn name(&self) -> &'static str {
        "eav"
    }

    fn create_tables(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            DROP TABLE IF EXISTS WorkOrders_EAV;
            CREATE TABLE WorkOrders_EAV (
                Id        INTEGER,
                FieldName VARCHAR(50),
                Value     NVARCHAR(200)
            );
            CREATE INDEX IX_WorkOrdersEAV_FieldName ON WorkOrders_EAV(FieldName, Value);
            ",
        )?;
        Ok(())
    }

    /// Logical ids are assigned by position, starting at 1, so they line up
    /// with the identity values of a freshly created normalized table.
    fn insert_work_orders(
        &self,
        conn: &Connection,
        orders: &[WorkOrder],
        mode: InsertMode,
    ) -> Result<usize> {
        with_insert_mode(conn, mode, |conn| {
            let mut stmt = conn.prepare_cached(INSERT_SQL)?;
            let mut written = 0;
            for (i, wo) in orders.iter().enumerate() {
                for attr in wo.attributes(i as i64 + 1) {
                    stmt.execute(params![attr.id, attr.field.as_str(), attr.value])?;
                    written += 1;
                }
            }
            Ok(written)
        })
    }

    fn read_all(&self, conn: &Connection) -> Result<usize> {
        Ok(self.fetch_pivot(conn)?.len())
    }

    fn read_filtered(&self, conn: &Connection, filter: &WorkOrderFilter) -> Result<usize> {
        Ok(self.fetch_pivot_filtered(conn, filter)?.len())
    }
}
