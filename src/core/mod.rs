//! Core logger types and traits

pub mod config_file;
pub mod configuration;
pub mod emitter;
pub mod error;
pub mod fan_out;
pub mod formatting_buffer;
pub mod log_level;
pub mod registry;
pub mod sink;
pub mod value;

pub use config_file::{ConfigElement, ConfigNode};
pub use configuration::{
    ConfigurationNode, ConfigurationTree, DomainFlag, DomainFlags, NodeId, Scope,
    SharedFanOutBuffer,
};
pub use emitter::{emit, CallSite, MessageStream};
pub use error::{LoggerError, Result};
pub use fan_out::FanOutBuffer;
pub use formatting_buffer::FormattingBuffer;
pub use log_level::{LogLevel, TextEffect};
pub use registry::{
    Domain, DomainRegistry, DomainRegistryBuilder, DEFAULT_PATH_PREFIX, PATH_PREFIXES_ENV,
};
pub use sink::{
    SharedFormattingBuffer, SharedWriter, Sink, SinkContext, SinkKind, SinkTarget,
};
pub use value::{Formattable, LogValue, NULL_TOKEN};
