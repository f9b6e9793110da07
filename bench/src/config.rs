//! Benchmark configuration: the database connection target and run
//! parameters, resolved from `EAV_BENCH_*` environment variables (a `.env`
//! file is honored by the binary) and passed explicitly to every fixture.

use crate::schema::{configure_connection, InsertMode, WorkOrderFilter};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use eav_core::constants::{DEFAULT_ROW_COUNT, ISO_DATE_FORMAT};
use rusqlite::{Connection, OpenFlags};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONNECTION_STRING: &str = "Data Source=eav_bench.db;Pooling=false";
const DEFAULT_MEMORY_NAME: &str = "eav_bench";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Where the database lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Open a file, creating it when missing.
    ReadWriteCreate,
    /// Open an existing file.
    ReadWrite,
    /// Named shared-cache in-memory database. It lives as long as at least
    /// one connection to it is open; see [`ConnectionTarget::keep_alive`].
    Memory,
}

/// Parsed connection string, e.g. `Data Source=bench.db;Pooling=false`.
///
/// Keys are case-insensitive and ignore spaces and underscores. `Server`,
/// `Trusted_Connection`, `TrustServerCertificate` and `Integrated Security`
/// are accepted for compatibility and have no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub data_source: String,
    pub mode: StorageMode,
    pub pooling: bool,
    pub busy_timeout: Duration,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => bail!("invalid boolean for {key}: {value:?}"),
    }
}

impl FromStr for ConnectionTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut data_source: Option<String> = None;
        let mut mode = StorageMode::ReadWriteCreate;
        let mut pooling = false;
        let mut busy_timeout = Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS);

        for part in s.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((raw_key, value)) = part.split_once('=') else {
                bail!("malformed connection string segment: {part:?}");
            };
            let key: String = raw_key
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '_')
                .collect::<String>()
                .to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "datasource" | "database" | "filename" => {
                    data_source = Some(value.to_string());
                }
                "mode" => {
                    mode = match value.to_lowercase().as_str() {
                        "readwritecreate" | "rwc" => StorageMode::ReadWriteCreate,
                        "readwrite" | "rw" => StorageMode::ReadWrite,
                        "memory" => StorageMode::Memory,
                        _ => bail!("unknown Mode: {value:?}"),
                    };
                }
                "pooling" => pooling = parse_bool(raw_key.trim(), value)?,
                "busytimeout" => {
                    let ms: u64 = value
                        .parse()
                        .with_context(|| format!("invalid Busy Timeout: {value:?}"))?;
                    busy_timeout = Duration::from_millis(ms);
                }
                "server" | "trustedconnection" | "trustservercertificate"
                | "integratedsecurity" => {
                    log::debug!("ignoring connection string key {}", raw_key.trim());
                }
                _ => bail!("unknown connection string key: {:?}", raw_key.trim()),
            }
        }

        let data_source = match (mode, data_source) {
            (StorageMode::Memory, None) => DEFAULT_MEMORY_NAME.to_string(),
            (StorageMode::Memory, Some(name)) if name.is_empty() || name == ":memory:" => {
                DEFAULT_MEMORY_NAME.to_string()
            }
            (_, None) => bail!("connection string needs a Data Source or Database"),
            (_, Some(path)) if path.is_empty() => {
                bail!("connection string has an empty Data Source")
            }
            (_, Some(path)) if path == ":memory:" => bail!(
                "a private :memory: database is not visible across connections; use Mode=Memory"
            ),
            (_, Some(path)) => path,
        };

        Ok(Self {
            data_source,
            mode,
            pooling,
            busy_timeout,
        })
    }
}

impl ConnectionTarget {
    fn memory_uri(&self) -> String {
        format!("file:{}?mode=memory&cache=shared", self.data_source)
    }

    /// Open a fresh, configured connection. Released when dropped.
    pub fn open(&self) -> Result<Connection> {
        let conn = match self.mode {
            StorageMode::ReadWriteCreate => Connection::open(&self.data_source),
            StorageMode::ReadWrite => Connection::open_with_flags(
                &self.data_source,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            ),
            StorageMode::Memory => Connection::open_with_flags(
                self.memory_uri(),
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_SHARED_CACHE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            ),
        }
        .with_context(|| format!("failed to open database {}", self.describe()))?;

        conn.busy_timeout(self.busy_timeout)?;
        configure_connection(&conn)?;
        Ok(conn)
    }

    /// For in-memory targets, an extra connection that keeps the database
    /// alive between the per-path connections. `None` for file targets.
    pub fn keep_alive(&self) -> Result<Option<Connection>> {
        match self.mode {
            StorageMode::Memory => self.open().map(Some),
            _ => Ok(None),
        }
    }

    pub fn describe(&self) -> String {
        match self.mode {
            StorageMode::Memory => format!("memory:{}", self.data_source),
            _ => self.data_source.clone(),
        }
    }
}

/// Everything a fixture needs to run. Built once and passed by reference.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub target: ConnectionTarget,
    /// Logical work orders per path.
    pub rows: usize,
    pub trans_date: NaiveDate,
    pub clear_cache: bool,
    pub insert_mode: InsertMode,
    pub filter: WorkOrderFilter,
    /// Fail the insert-and-read fixture unless normalized < EAV.
    pub assert_ordering: bool,
}

impl BenchConfig {
    /// Defaults for `target`: 10,000 rows dated today, cache clearing on,
    /// autocommit inserts, no assertion.
    pub fn new(target: ConnectionTarget) -> Self {
        let trans_date = Local::now().date_naive();
        Self {
            target,
            rows: DEFAULT_ROW_COUNT,
            trans_date,
            clear_cache: true,
            insert_mode: InsertMode::Autocommit,
            filter: WorkOrderFilter::for_default_line(trans_date),
            assert_ordering: false,
        }
    }

    pub fn with_trans_date(mut self, date: NaiveDate) -> Self {
        self.trans_date = date;
        self.filter = WorkOrderFilter::month_of(date, &self.filter.line);
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration through `lookup`; blank values count as unset.
    /// Range checks are left to [`BenchConfig::validate`], which callers run
    /// once every override has been applied.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let target: ConnectionTarget = get("EAV_BENCH_DB")
            .as_deref()
            .unwrap_or(DEFAULT_CONNECTION_STRING)
            .parse()
            .context("invalid EAV_BENCH_DB")?;
        let mut config = Self::new(target);

        if let Some(rows) = get("EAV_BENCH_ROWS") {
            config.rows = rows
                .parse()
                .map_err(|_| anyhow!("invalid EAV_BENCH_ROWS: {rows:?}"))?;
        }
        if let Some(date) = get("EAV_BENCH_TRANS_DATE") {
            let date = NaiveDate::parse_from_str(&date, ISO_DATE_FORMAT)
                .with_context(|| format!("invalid EAV_BENCH_TRANS_DATE: {date:?}"))?;
            config = config.with_trans_date(date);
        }
        if let Some(v) = get("EAV_BENCH_CLEAR_CACHE") {
            config.clear_cache = parse_bool("EAV_BENCH_CLEAR_CACHE", &v)?;
        }
        if let Some(v) = get("EAV_BENCH_BATCHED") {
            if parse_bool("EAV_BENCH_BATCHED", &v)? {
                config.insert_mode = InsertMode::Transaction;
            }
        }
        if let Some(v) = get("EAV_BENCH_ASSERT") {
            config.assert_ordering = parse_bool("EAV_BENCH_ASSERT", &v)?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            bail!("row count must be greater than zero");
        }
        if self.filter.from >= self.filter.to {
            bail!(
                "filter range is empty: {} .. {}",
                self.filter.from,
                self.filter.to
            );
        }
        if self.target.pooling {
            log::warn!("Pooling=true has no effect: every timed path opens its own connection");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_parse_default_connection_string() {
        let target: ConnectionTarget = DEFAULT_CONNECTION_STRING.parse().unwrap();
        assert_eq!(target.data_source, "eav_bench.db");
        assert_eq!(target.mode, StorageMode::ReadWriteCreate);
        assert!(!target.pooling);
        assert_eq!(target.busy_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn test_parse_sql_server_style_string() {
        let target: ConnectionTarget =
            "Server=.;Database=TestDb;Trusted_Connection=True;TrustServerCertificate=True;Pooling=false"
                .parse()
                .unwrap();
        assert_eq!(target.data_source, "TestDb");
        assert!(!target.pooling);
    }

    #[test]
    fn test_parse_memory_mode_and_timeout() {
        let target: ConnectionTarget = "mode=Memory; data source=wo; busy timeout=250"
            .parse()
            .unwrap();
        assert_eq!(target.mode, StorageMode::Memory);
        assert_eq!(target.data_source, "wo");
        assert_eq!(target.busy_timeout, Duration::from_millis(250));
        assert_eq!(target.describe(), "memory:wo");

        let unnamed: ConnectionTarget = "Mode=Memory".parse().unwrap();
        assert_eq!(unnamed.data_source, "eav_bench");
    }

    #[test]
    fn test_parse_rejects_bad_strings() {
        assert!("Data Source=:memory:".parse::<ConnectionTarget>().is_err());
        assert!("Pooling=false".parse::<ConnectionTarget>().is_err());
        assert!("Data Source=x.db;Color=blue".parse::<ConnectionTarget>().is_err());
        assert!("Data Source=x.db;Pooling=maybe".parse::<ConnectionTarget>().is_err());
        assert!("Data Source=x.db;Pooling=SSPI".parse::<ConnectionTarget>().is_err());
        assert!("Data Source".parse::<ConnectionTarget>().is_err());
        assert!("Data Source=x.db;Mode=tape".parse::<ConnectionTarget>().is_err());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = BenchConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.rows, DEFAULT_ROW_COUNT);
        assert_eq!(config.target.data_source, "eav_bench.db");
        assert!(config.clear_cache);
        assert_eq!(config.insert_mode, InsertMode::Autocommit);
        assert!(!config.assert_ordering);
        assert_eq!(config.filter.line, "LineA");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = BenchConfig::from_lookup(lookup_from(&[
            ("EAV_BENCH_DB", "Data Source=/tmp/wo.db"),
            ("EAV_BENCH_ROWS", "250"),
            ("EAV_BENCH_TRANS_DATE", "2025-08-14"),
            ("EAV_BENCH_CLEAR_CACHE", "no"),
            ("EAV_BENCH_BATCHED", "true"),
            ("EAV_BENCH_ASSERT", "1"),
        ]))
        .unwrap();
        assert_eq!(config.target.data_source, "/tmp/wo.db");
        assert_eq!(config.rows, 250);
        assert_eq!(config.trans_date, NaiveDate::from_ymd_opt(2025, 8, 14).unwrap());
        assert_eq!(config.filter.from, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert_eq!(config.filter.to, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert!(!config.clear_cache);
        assert_eq!(config.insert_mode, InsertMode::Transaction);
        assert!(config.assert_ordering);
    }

    #[test]
    fn test_from_lookup_rejects_invalid_values() {
        let zero_rows = BenchConfig::from_lookup(lookup_from(&[("EAV_BENCH_ROWS", "0")])).unwrap();
        assert_eq!(zero_rows.rows, 0);
        assert!(zero_rows.validate().is_err());
        assert!(BenchConfig::from_lookup(lookup_from(&[("EAV_BENCH_ROWS", "many")])).is_err());
        assert!(
            BenchConfig::from_lookup(lookup_from(&[("EAV_BENCH_TRANS_DATE", "14/08/2025")]))
                .is_err()
        );
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = BenchConfig::from_lookup(lookup_from(&[("EAV_BENCH_ROWS", "  ")])).unwrap();
        assert_eq!(config.rows, DEFAULT_ROW_COUNT);
    }
}
