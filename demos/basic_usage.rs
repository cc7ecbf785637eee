//! Basic logger usage example
//!
//! Demonstrates domains, prefix flags and level thresholds on the console.
//!
//! Run with: cargo run --example basic_usage

use rust_domain_logger::prelude::*;
use rust_domain_logger::{log_debug, log_error, log_message, log_user, log_warning};

fn main() -> Result<()> {
    println!("=== Rust Domain Logger - Basic Usage Example ===\n");

    let registry = DomainRegistry::global();
    // file!() yields "demos/basic_usage.rs" for this program
    registry.add_path_prefix("demos");

    let root = registry.root();
    root.set_prints_name(true);
    root.set_prints_level(true);

    println!("1. Logging at different levels:");
    log_user!("A user message carries no prefix");
    log_error!("Something failed: ", std::io::Error::other("disk full"));
    log_warning!("Retry attempt ", 3, " of ", 5);
    log_debug!("Values: ", true, ", ", 2.5, ", ", None::<&str>);
    log_message!(LogLevel::DebugVerbose1, "Hidden at the default maximum level");

    println!("\n2. Named domains:");
    let network = registry.domain(".network")?;
    network.set_prints_location(true);
    log_debug!(domain: ".network", "Listening on port ", 8080);
    log_debug!(domain: ".network.tcp", "Inherits the location flag");

    println!("\n3. Level thresholds cascade to subdomains:");
    network.set_max_level(LogLevel::Warning);
    log_debug!(domain: ".network.tcp", "Debug message (hidden)");
    log_warning!(domain: ".network.tcp", "Warning message (visible)");

    println!("\n4. Multi-line messages are aligned:");
    log_debug!("first line\nsecond line\nthird line");

    println!("\n5. Domain tree:");
    registry.print_domain_tree(&mut std::io::stdout())?;

    DomainRegistry::shutdown();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
