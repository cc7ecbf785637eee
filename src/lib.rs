//! # Rust Domain Logger
//!
//! Hierarchical, domain-scoped logging. Every message belongs to a *domain*,
//! a node in a dotted-name tree (`.net.tcp`) derived from the source file of
//! the logging call and an optional name. Domains inherit their settings from
//! their parent; changing a setting cascades down the subtree.
//!
//! ## Features
//!
//! - **Domain tree**: per-domain prefix flags, maximum level and sinks
//! - **Multiple sinks**: console streams, per-domain and combined log files,
//!   speech synthesis, in-memory capture
//! - **Aligned output**: padded prefix columns, continuation lines indented
//!   under the payload, ANSI colors on terminals
//! - **Thread safe**: messages from concurrent threads never interleave
//! - **Configuration documents**: JSON files describing domains and sinks
//!
//! ## Example
//!
//! ```
//! use rust_domain_logger::prelude::*;
//! use rust_domain_logger::{log_debug, log_error};
//!
//! let registry = DomainRegistry::global();
//! registry.domain(".db").unwrap().set_max_level(LogLevel::Warning);
//!
//! log_debug!(domain: ".db", "not shown");
//! log_error!(domain: ".db", "connection lost after ", 3, " retries");
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        emit, CallSite, ConfigElement, ConfigNode, Domain, DomainFlag, DomainFlags,
        DomainRegistry, DomainRegistryBuilder, Formattable, LogLevel, LogValue, LoggerError,
        MessageStream, Result, Scope, Sink, SinkKind,
    };
    pub use crate::sinks::{
        create_sink, CombinedFileSink, FileSink, MemorySink, SpeechSink, StreamSink,
    };
}

pub use crate::core::{
    emit, CallSite, ConfigElement, ConfigNode, Domain, DomainFlag, DomainFlags, DomainRegistry,
    DomainRegistryBuilder, Formattable, LogLevel, LogValue, LoggerError, MessageStream, Result,
    Scope, Sink, SinkKind,
};
pub use crate::sinks::{CombinedFileSink, FileSink, MemorySink, SpeechSink, StreamSink};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
}
