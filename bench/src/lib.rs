//! Normalized vs EAV Work Order Benchmark
//!
//! Measures how long SQLite takes to insert and read back "work order"
//! records stored two ways:
//! - **Normalized schema**: one row per work order, one typed column per field
//! - **EAV schema**: one `(Id, FieldName, Value)` row per field, rebuilt on
//!   read with a conditional-aggregation pivot
//!
//! Each fixture recreates the tables, optionally clears caches, times both
//! paths with a monotonic clock and reports elapsed milliseconds.
//!
//! Run the comparison: `cargo run --release -- all --assert`
//! Run tests: `cargo test`

pub mod cache;
pub mod config;
pub mod populate;
pub mod report;
pub mod scenario;
pub mod schema;
