use std::time::Duration;

use serde::Serialize;

use qrandom_core::{PoolConfig, PoolStats};

use crate::error::CliError;

#[derive(Serialize)]
struct StatusReport {
    version: &'static str,
    api_url: String,
    store_size: usize,
    min_threshold: usize,
    stats: PoolStats,
}

pub fn run(wait: u64, json: bool) -> Result<(), CliError> {
    let config = PoolConfig::from_env()?;
    let pool = qrandom_core::get_instance()?;
    if wait > 0 {
        std::thread::sleep(Duration::from_secs(wait));
    }
    let report = StatusReport {
        version: qrandom_core::VERSION,
        api_url: config.api_url,
        store_size: pool.store_size(),
        min_threshold: pool.min_threshold(),
        stats: pool.stats(),
    };
    qrandom_core::shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let s = &report.stats;
    println!("qrandom v{}", report.version);
    println!("  Service:        {}", report.api_url);
    println!("  Batch size:     {} bytes", report.store_size);
    println!("  Min threshold:  {} bytes", report.min_threshold);
    println!();
    println!("  Queued:         {} bytes", s.queued);
    println!("  Refills:        {} ({} failed)", s.refills, s.failed_refills);
    println!("  Skipped checks: {}", s.skipped_ticks);
    println!("  Fetched:        {} bytes", s.bytes_fetched);
    println!("  Served:         {} bytes", s.bytes_served);
    Ok(())
}
