//! Table, index and attribute names shared by both schemas, plus the
//! fixed values used when generating work orders.

/// Normalized table: one typed column per attribute.
pub const NORMALIZED_TABLE: &str = "WorkOrders";

/// Entity-Attribute-Value table: one row per (Id, FieldName).
pub const EAV_TABLE: &str = "WorkOrders_EAV";

/// Secondary index over `WorkOrders_EAV(FieldName, Value)`.
pub const EAV_INDEX: &str = "IX_WorkOrdersEAV_FieldName";

/// Default number of logical work orders per run.
pub const DEFAULT_ROW_COUNT: usize = 10_000;

pub const DEFAULT_LINE: &str = "LineA";
pub const DEFAULT_CUSTOMER_NAME: &str = "PT Maju Jaya";
pub const WORK_NO_PREFIX: &str = "WO";

/// ISO date format used for `TransDate` values stored as EAV text.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
