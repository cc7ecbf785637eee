//! File logging example
//!
//! Demonstrates per-domain log files next to a combined file and the console.
//!
//! Run with: cargo run --example file_logging

use rust_domain_logger::prelude::*;
use rust_domain_logger::{log_debug, log_error, log_warning};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Domain Logger - File Logging Example ===\n");

    let registry = DomainRegistry::global();
    registry.add_path_prefix("demos");
    registry.set_filename_prefix("application")?;

    // .storage and every subdomain get their own file plus the console
    let storage = registry.domain(".storage")?;
    storage.add_sink(Arc::new(FileSink::new(".storage")));
    storage.set_prints_time(true);
    storage.set_prints_level(true);

    // everything below .jobs goes into one file
    let jobs = registry.domain(".jobs")?;
    jobs.set_sinks(vec![Arc::new(CombinedFileSink::new(".jobs")) as Arc<dyn Sink>]);
    jobs.set_prints_name(true);

    println!("1. Logging to console and per-domain files:");
    log_debug!(domain: ".storage", "Opening database");
    log_debug!(domain: ".storage.cache", "Cache warmed with ", 1024, " entries");
    log_warning!(domain: ".storage.cache", "Eviction rate above threshold");

    println!("\n2. Logging jobs into a combined file:");
    for i in 1..=5 {
        log_debug!(domain: ".jobs.import", "Processing item ", i, "/5");
        if i == 3 {
            log_error!(domain: ".jobs.export", "Item ", i, " took longer than expected");
        }
    }

    registry.flush_all();

    println!("\n=== Example completed successfully! ===");
    println!("Check application.storage.log, application.storage.cache.log and application.jobs.log");

    Ok(())
}
