//! Cache clearing between timed paths.
//!
//! SQLite keeps compiled statements per connection and pages in a
//! per-connection (or shared) page cache. Every timed path opens a fresh
//! connection, which already starts without either. This step checkpoints
//! the WAL into the main file and asks SQLite to release every freeable page
//! on a dedicated connection, so a path does not inherit a warm shared cache
//! or a long WAL from the previous one.

use crate::config::ConnectionTarget;
use anyhow::{Context, Result};

/// Run the cache-clearing commands on a dedicated connection. Must be called
/// before a timed path, never while one is running.
pub fn clear_caches(target: &ConnectionTarget) -> Result<()> {
    let conn = target.open()?;
    conn.execute_batch(
        "PRAGMA wal_checkpoint(TRUNCATE);
         PRAGMA shrink_memory;",
    )
    .with_context(|| format!("failed to clear caches on {}", target.describe()))?;
    log::debug!("checkpointed WAL and released page cache on {}", target.describe());
    Ok(())
}
