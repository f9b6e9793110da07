//! Report module: prints human-readable timings and the ordering verdict.

use anyhow::{bail, Result};
use std::time::Duration;

/// One timed path (one schema, one scenario).
#[derive(Debug, Clone)]
pub struct PathResult {
    pub schema_name: String,
    pub scenario: String,
    pub elapsed: Duration,
    /// Physical rows inserted inside the timed region.
    pub rows_written: usize,
    /// Logical rows consumed by the read.
    pub rows_read: usize,
}

impl PathResult {
    pub fn new(schema_name: &str, scenario: &str) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            scenario: scenario.to_string(),
            elapsed: Duration::ZERO,
            rows_written: 0,
            rows_read: 0,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Normalized and EAV timings for the same scenario.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub scenario: String,
    pub normalized: PathResult,
    pub eav: PathResult,
}

impl Comparison {
    pub fn normalized_is_faster(&self) -> bool {
        self.normalized.elapsed < self.eav.elapsed
    }

    /// How many times longer the EAV path took. 0.0 when the normalized
    /// path measured no time at all.
    pub fn speedup(&self) -> f64 {
        let normalized = self.normalized.elapsed.as_secs_f64();
        if normalized <= 0.0 {
            return 0.0;
        }
        self.eav.elapsed.as_secs_f64() / normalized
    }

    /// Fails unless the normalized path was strictly faster. The message
    /// carries both timings.
    pub fn assert_normalized_faster(&self) -> Result<()> {
        if self.normalized_is_faster() {
            return Ok(());
        }
        bail!(
            "{}: normalized table should be faster than EAV (normalized {:.3} ms, EAV {:.3} ms)",
            self.scenario,
            self.normalized.elapsed_ms(),
            self.eav.elapsed_ms()
        )
    }

    /// Log both timings at `info`.
    pub fn log(&self) {
        log::info!(
            "[{}] Normal Table Time: {:.3} ms",
            self.scenario,
            self.normalized.elapsed_ms()
        );
        log::info!(
            "[{}] EAV Table Time: {:.3} ms",
            self.scenario,
            self.eav.elapsed_ms()
        );
    }
}

/// Print a formatted report of every comparison.
pub fn print_report(comparisons: &[Comparison]) {
    println!("\n{}", "=".repeat(72));
    println!("  Normalized vs EAV Work Order Benchmark");
    println!("{}", "=".repeat(72));

    for cmp in comparisons {
        println!("\n  Scenario: {}", cmp.scenario);
        println!("  {}", "-".repeat(60));
        println!(
            "  {:12} {:>14} {:>14} {:>14}",
            "Schema", "Elapsed (ms)", "Rows written", "Rows read"
        );
        for r in [&cmp.normalized, &cmp.eav] {
            println!(
                "  {:12} {:>14.3} {:>14} {:>14}",
                r.schema_name,
                r.elapsed_ms(),
                r.rows_written,
                r.rows_read
            );
        }
        let verdict = if cmp.normalized_is_faster() {
            "normalized faster"
        } else {
            "EAV faster or equal"
        };
        println!("\n  EAV / normalized: {:>8.2}x", cmp.speedup());
        println!("  Verdict:          {}", verdict);
    }

    println!("\n{}\n", "=".repeat(72));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(normalized_ms: u64, eav_ms: u64) -> Comparison {
        let mut normalized = PathResult::new("normalized", "insert-read");
        normalized.elapsed = Duration::from_millis(normalized_ms);
        let mut eav = PathResult::new("eav", "insert-read");
        eav.elapsed = Duration::from_millis(eav_ms);
        Comparison {
            scenario: "insert-read".to_string(),
            normalized,
            eav,
        }
    }

    #[test]
    fn test_speedup_ratio() {
        let cmp = comparison(100, 250);
        assert!((cmp.speedup() - 2.5).abs() < 1e-9);
        assert!(cmp.normalized_is_faster());
        assert!(cmp.assert_normalized_faster().is_ok());
    }

    #[test]
    fn test_zero_normalized_time_has_no_ratio() {
        assert_eq!(comparison(0, 10).speedup(), 0.0);
    }

    #[test]
    fn test_assertion_requires_strict_ordering() {
        let tie = comparison(120, 120);
        assert!(!tie.normalized_is_faster());
        assert!(tie.assert_normalized_faster().is_err());
    }

    #[test]
    fn test_assertion_message_reports_both_timings() {
        let err = comparison(300, 200).assert_normalized_faster().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("300.000 ms"), "{msg}");
        assert!(msg.contains("200.000 ms"), "{msg}");
    }
}
