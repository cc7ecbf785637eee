//! Configuration file example
//!
//! Loads domain settings and sinks from a JSON document.
//!
//! Run with: cargo run --example config_file [path/to/logging.json]

use rust_domain_logger::prelude::*;
use rust_domain_logger::{log_debug, log_warning};

const DEFAULT_CONFIG: &str = r#"{
    "tag": "logging",
    "attributes": { "pad_prefix_columns": true },
    "children": [
        {
            "tag": "domain",
            "attributes": { "name": ".", "prints_name": true, "prints_level": true },
            "children": []
        },
        {
            "tag": "domain",
            "attributes": { "name": ".app", "max_level": "debug_verbose_1", "prints_location": true },
            "children": [
                { "tag": "sink", "children": [ { "tag": "stream", "attributes": { "id": "stderr" } } ] },
                { "tag": "domain", "attributes": { "name": "quiet", "max_level": "error" } }
            ]
        }
    ]
}"#;

fn main() -> Result<()> {
    println!("=== Rust Domain Logger - Configuration File Example ===\n");

    let registry = DomainRegistry::global();
    registry.add_path_prefix("demos");

    match std::env::args().nth(1) {
        Some(path) => registry.configure_from_file(path)?,
        None => {
            let document: ConfigNode = serde_json::from_str(DEFAULT_CONFIG)?;
            registry.configure_from_element(&document)?;
        }
    }

    println!("1. Domains after configuration:");
    registry.print_domain_tree(&mut std::io::stdout())?;

    println!("\n2. Logging through the configured domains:");
    log_debug!(domain: ".app", "Written to stderr with location");
    log_message_verbose();
    log_warning!(domain: ".app.quiet", "Suppressed, .app.quiet only shows errors");
    log_debug!("Root domain, console output");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}

fn log_message_verbose() {
    rust_domain_logger::log_message!(
        domain: ".app",
        LogLevel::DebugVerbose1,
        "Verbose output is enabled for .app"
    );
}
