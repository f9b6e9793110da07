//! Work-order record shapes for the normalized and EAV layouts.

mod work_order;

pub use work_order::{Attribute, Field, PivotRow, WorkOrder, WorkOrderRow};
