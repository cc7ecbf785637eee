//! Domain registry
//!
//! The registry owns the configuration tree and the global settings (path
//! prefixes, filename prefix, padding). It maps a call site, given as source
//! file path plus optional domain name, to a [`Domain`].
//!
//! [`DomainRegistry::global`] hands out a process-wide instance that is leaked
//! on purpose so it stays usable for messages emitted during teardown.

use super::config_file::{self, ConfigElement};
use super::configuration::{
    ConfigurationTree, DomainFlag, DomainFlags, NodeId, Scope, SharedFanOutBuffer,
};
use super::emitter::output_lock;
use super::error::{LoggerError, Result};
use super::fan_out::FanOutBuffer;
use super::log_level::LogLevel;
use super::sink::{Sink, SinkContext};
use crate::sinks::StreamSink;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Environment variable holding colon-separated source path prefixes
pub const PATH_PREFIXES_ENV: &str = "LOG_DOMAIN_PATH_PREFIXES";

/// Path prefix used when the environment does not provide any
pub const DEFAULT_PATH_PREFIX: &str = "src";

static GLOBAL: Lazy<&'static DomainRegistry> =
    Lazy::new(|| Box::leak(Box::new(DomainRegistry::from_env())));

static LATE_FALLBACK: Lazy<&'static DomainRegistry> = Lazy::new(|| {
    eprintln!(
        "[DOMAIN LOGGER WARNING] Logging used after shutdown; \
         continuing with default configuration."
    );
    Box::leak(Box::new(DomainRegistry::new()))
});

static SHUT_DOWN: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
struct RegistrySettings {
    path_prefixes: Vec<String>,
    filename_prefix: Option<String>,
    pad_prefix_columns: bool,
    pad_multi_line_messages: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            path_prefixes: vec![DEFAULT_PATH_PREFIX.to_string()],
            filename_prefix: None,
            pad_prefix_columns: true,
            pad_multi_line_messages: true,
        }
    }
}

/// Longest first, duplicates removed
fn normalize_prefixes(prefixes: Vec<String>) -> Vec<String> {
    let mut prefixes: Vec<String> = prefixes
        .into_iter()
        .map(|prefix| {
            if prefix.len() > 1 {
                prefix.trim_end_matches('/').to_string()
            } else {
                prefix
            }
        })
        .collect();
    prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    prefixes.dedup();
    prefixes
}

/// Prefix list for a colon-separated value; the default list when absent
fn path_prefixes_from(value: Option<&str>) -> Vec<String> {
    match value {
        Some(value) => normalize_prefixes(value.split(':').map(str::to_string).collect()),
        None => vec![DEFAULT_PATH_PREFIX.to_string()],
    }
}

pub struct DomainRegistry {
    tree: RwLock<ConfigurationTree>,
    settings: RwLock<RegistrySettings>,
}

impl DomainRegistry {
    /// Registry with default settings and a stdout sink on the root domain
    #[must_use]
    pub fn new() -> Self {
        let mut tree = ConfigurationTree::new();
        tree.set_sinks(NodeId::ROOT, vec![StreamSink::stdout()]);
        Self {
            tree: RwLock::new(tree),
            settings: RwLock::new(RegistrySettings::default()),
        }
    }

    /// Default registry with path prefixes taken from [`PATH_PREFIXES_ENV`]
    #[must_use]
    pub fn from_env() -> Self {
        let registry = Self::new();
        let value = std::env::var(PATH_PREFIXES_ENV).ok();
        registry.settings.write().path_prefixes = path_prefixes_from(value.as_deref());
        registry
    }

    #[must_use]
    pub fn builder() -> DomainRegistryBuilder {
        DomainRegistryBuilder::new()
    }

    /// The process-wide registry
    pub fn global() -> &'static DomainRegistry {
        if Self::is_shut_down() {
            *LATE_FALLBACK
        } else {
            *GLOBAL
        }
    }

    /// Whether [`DomainRegistry::shutdown`] has run
    pub fn is_shut_down() -> bool {
        SHUT_DOWN.load(Ordering::Acquire)
    }

    /// Flush the process-wide registry and mark it as shut down.
    ///
    /// Messages emitted afterwards go through a fallback registry with
    /// default settings, including those from call sites resolved earlier.
    pub fn shutdown() {
        if !SHUT_DOWN.swap(true, Ordering::AcqRel) {
            GLOBAL.flush_all();
        }
    }

    pub fn root(&self) -> Domain<'_> {
        Domain::new(self, NodeId::ROOT)
    }

    /// Domain by absolute dotted name; a leading `.` is optional
    pub fn domain(&self, name: &str) -> Result<Domain<'_>> {
        let relative = name.strip_prefix('.').unwrap_or(name);
        let id = self.tree.write().resolve_by_dotted_name(NodeId::ROOT, relative)?;
        Ok(Domain::new(self, id))
    }

    /// Resolve the domain for a source file and an optional domain name.
    ///
    /// A name starting with `.` is absolute. Otherwise the directory part of
    /// `file_path`, with the configured prefix removed, selects a namespace
    /// domain and `domain_name` is resolved below it.
    pub fn configuration_for(
        &self,
        file_path: &str,
        domain_name: Option<&str>,
    ) -> Result<Domain<'_>> {
        if let Some(name) = domain_name {
            if name.starts_with('.') {
                return self.domain(name);
            }
        }

        let remaining = self.strip_path_prefix(file_path)?;
        let directory = match remaining.rfind('/') {
            Some(position) => &remaining[..position],
            None => "",
        };

        let mut tree = self.tree.write();
        let namespace = tree.resolve_by_path_segments(NodeId::ROOT, directory, '/')?;
        let id = match domain_name {
            Some(name) => tree.resolve_by_dotted_name(namespace, name)?,
            None => namespace,
        };
        Ok(Domain::new(self, id))
    }

    /// Like [`DomainRegistry::configuration_for`] but never fails; errors are
    /// reported on stderr and the root domain is used instead.
    pub fn domain_for_call_site(&self, file_path: &str, domain_name: Option<&str>) -> Domain<'_> {
        match self.configuration_for(file_path, domain_name) {
            Ok(domain) => domain,
            Err(e) => {
                eprintln!("[DOMAIN LOGGER ERROR] {}; using root domain", e);
                self.root()
            }
        }
    }

    /// Remove the longest matching configured prefix from `file_path`.
    ///
    /// A prefix matches only at a directory boundary. The empty prefix matches
    /// every path.
    pub fn strip_path_prefix(&self, file_path: &str) -> Result<String> {
        let path = file_path.replace('\\', "/");
        let settings = self.settings.read();
        for prefix in &settings.path_prefixes {
            if prefix.is_empty() {
                return Ok(path.trim_start_matches('/').to_string());
            }
            if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                // only "/" keeps its trailing separator
                let rest = if prefix.ends_with('/') {
                    Some(rest)
                } else {
                    rest.strip_prefix('/')
                };
                if let Some(rest) = rest {
                    return Ok(rest.to_string());
                }
            }
        }
        Err(LoggerError::path_not_configured(file_path))
    }

    pub fn path_prefixes(&self) -> Vec<String> {
        self.settings.read().path_prefixes.clone()
    }

    pub fn set_path_prefixes<I, S>(&self, prefixes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.write().path_prefixes =
            normalize_prefixes(prefixes.into_iter().map(Into::into).collect());
    }

    pub fn add_path_prefix(&self, prefix: impl Into<String>) {
        let mut settings = self.settings.write();
        let mut prefixes = std::mem::take(&mut settings.path_prefixes);
        prefixes.push(prefix.into());
        settings.path_prefixes = normalize_prefixes(prefixes);
    }

    /// Set the prefix of per-domain log file names
    pub fn set_filename_prefix(&self, prefix: impl Into<String>) -> Result<()> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(LoggerError::config("filename prefix", "must not be empty"));
        }
        self.settings.write().filename_prefix = Some(prefix);
        self.tree.write().invalidate_streams();
        Ok(())
    }

    pub fn filename_prefix(&self) -> Option<String> {
        self.settings.read().filename_prefix.clone()
    }

    pub fn max_name_length(&self) -> usize {
        self.tree.read().max_name_length()
    }

    pub fn update_max_name_length(&self, length: usize) {
        self.tree.write().update_max_name_length(length);
    }

    pub fn pad_prefix_columns(&self) -> bool {
        self.settings.read().pad_prefix_columns
    }

    pub fn set_pad_prefix_columns(&self, value: bool) {
        self.settings.write().pad_prefix_columns = value;
    }

    pub fn pad_multi_line_messages(&self) -> bool {
        self.settings.read().pad_multi_line_messages
    }

    pub fn set_pad_multi_line_messages(&self, value: bool) {
        self.settings.write().pad_multi_line_messages = value;
    }

    pub fn set_domain_flag(&self, name: &str, flag: DomainFlag, value: bool, scope: Scope) -> Result<()> {
        let domain = self.domain(name)?;
        self.tree.write().set_flag_scoped(domain.id, flag, value, scope);
        Ok(())
    }

    pub fn set_domain_max_level(&self, name: &str, level: LogLevel, scope: Scope) -> Result<()> {
        let domain = self.domain(name)?;
        self.tree.write().set_max_level_scoped(domain.id, level, scope);
        Ok(())
    }

    /// Number of domains including the root
    pub fn domain_count(&self) -> usize {
        self.tree.read().len()
    }

    /// Print every domain with its node id, children indented below parents
    pub fn print_domain_tree(&self, out: &mut dyn Write) -> io::Result<()> {
        let tree = self.tree.read();
        let mut pending = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, depth)) = pending.pop() {
            let node = tree.node(id);
            writeln!(out, "{:indent$}{} ({})", "", node.full_name(), id, indent = depth * 2)?;
            pending.extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
        }
        Ok(())
    }

    /// Apply a parsed configuration document
    pub fn configure_from_element<E: ConfigElement>(&self, root: &E) -> Result<()> {
        config_file::apply(self, root)
    }

    /// Load and apply a JSON configuration document
    pub fn configure_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        config_file::load(self, path.as_ref())
    }

    /// Flush every composite stream built so far
    pub fn flush_all(&self) {
        let streams: Vec<SharedFanOutBuffer> = {
            let tree = self.tree.read();
            tree.ids()
                .filter_map(|id| tree.node(id).cached_stream().cloned())
                .collect()
        };
        let _guard = output_lock();
        for stream in streams {
            stream.lock().flush();
        }
    }

    fn sink_context(&self) -> SinkContext {
        SinkContext {
            filename_prefix: self.filename_prefix(),
        }
    }

    /// Composite stream of `id`, built from its sinks on first use.
    ///
    /// Sinks that cannot provide a target are reported and left out.
    pub(crate) fn stream_for(&self, id: NodeId) -> SharedFanOutBuffer {
        if let Some(stream) = self.tree.read().node(id).cached_stream() {
            return Arc::clone(stream);
        }

        let context = self.sink_context();
        let mut tree = self.tree.write();
        if let Some(stream) = tree.node(id).cached_stream() {
            return Arc::clone(stream);
        }

        let node = tree.node(id);
        let mut targets = Vec::with_capacity(node.sinks().len());
        for sink in node.sinks() {
            match sink.target(&context) {
                Ok(target) => targets.push(target),
                Err(e) => eprintln!(
                    "[DOMAIN LOGGER ERROR] Sink '{}' of domain '{}' disabled: {}",
                    sink.kind(),
                    node.full_name(),
                    e
                ),
            }
        }

        let stream = Arc::new(Mutex::new(FanOutBuffer::new(targets)));
        tree.set_cached_stream(id, Arc::clone(&stream));
        stream
    }

    pub(crate) fn with_tree<R>(&self, f: impl FnOnce(&ConfigurationTree) -> R) -> R {
        f(&self.tree.read())
    }

    pub(crate) fn with_tree_mut<R>(&self, f: impl FnOnce(&mut ConfigurationTree) -> R) -> R {
        f(&mut self.tree.write())
    }
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("settings", &*self.settings.read())
            .field("domains", &self.domain_count())
            .finish()
    }
}

/// Builder for constructing a [`DomainRegistry`] with a fluent API
///
/// # Example
/// ```
/// use rust_domain_logger::prelude::*;
///
/// let registry = DomainRegistry::builder()
///     .path_prefix("/home/me/project/src")
///     .pad_multi_line_messages(false)
///     .build();
/// assert!(!registry.pad_multi_line_messages());
/// ```
pub struct DomainRegistryBuilder {
    settings: RegistrySettings,
    explicit_prefixes: Option<Vec<String>>,
    sinks: Option<Vec<Arc<dyn Sink>>>,
}

impl DomainRegistryBuilder {
    pub fn new() -> Self {
        Self {
            settings: RegistrySettings::default(),
            explicit_prefixes: None,
            sinks: None,
        }
    }

    /// Replace the path prefix list
    #[must_use = "builder methods return a new value"]
    pub fn path_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit_prefixes = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Add one path prefix; the first call replaces the default list
    #[must_use = "builder methods return a new value"]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.explicit_prefixes
            .get_or_insert_with(Vec::new)
            .push(prefix.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.filename_prefix = Some(prefix.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pad_prefix_columns(mut self, value: bool) -> Self {
        self.settings.pad_prefix_columns = value;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pad_multi_line_messages(mut self, value: bool) -> Self {
        self.settings.pad_multi_line_messages = value;
        self
    }

    /// Sinks of the root domain instead of stdout
    #[must_use = "builder methods return a new value"]
    pub fn root_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.get_or_insert_with(Vec::new).push(sink);
        self
    }

    /// Build the registry, rejecting an empty filename prefix
    pub fn try_build(self) -> Result<DomainRegistry> {
        if self.settings.filename_prefix.as_deref() == Some("") {
            return Err(LoggerError::config("filename prefix", "must not be empty"));
        }
        Ok(self.build())
    }

    /// Build the registry; an empty filename prefix is reported and ignored
    pub fn build(self) -> DomainRegistry {
        let registry = DomainRegistry::new();
        let mut settings = self.settings;
        if settings.filename_prefix.as_deref() == Some("") {
            eprintln!("[DOMAIN LOGGER WARNING] Empty filename prefix ignored; file sinks stay disabled.");
            settings.filename_prefix = None;
        }
        if let Some(prefixes) = self.explicit_prefixes {
            settings.path_prefixes = normalize_prefixes(prefixes);
        }
        *registry.settings.write() = settings;
        if let Some(sinks) = self.sinks {
            registry.tree.write().set_sinks(NodeId::ROOT, sinks);
        }
        registry
    }
}

impl Default for DomainRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one domain of a registry
#[derive(Clone, Copy)]
pub struct Domain<'r> {
    registry: &'r DomainRegistry,
    id: NodeId,
}

impl<'r> Domain<'r> {
    fn new(registry: &'r DomainRegistry, id: NodeId) -> Self {
        Self { registry, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn registry(&self) -> &'r DomainRegistry {
        self.registry
    }

    pub fn full_name(&self) -> String {
        self.registry
            .with_tree(|tree| tree.node(self.id).full_name().to_string())
    }

    pub fn parent(&self) -> Option<Domain<'r>> {
        self.registry
            .with_tree(|tree| tree.node(self.id).parent())
            .map(|id| Domain::new(self.registry, id))
    }

    /// Child domain by relative dotted name, created if missing
    pub fn child(&self, name: &str) -> Result<Domain<'r>> {
        let id = self
            .registry
            .with_tree_mut(|tree| tree.resolve_by_dotted_name(self.id, name))?;
        Ok(Domain::new(self.registry, id))
    }

    pub fn flags(&self) -> DomainFlags {
        self.registry.with_tree(|tree| tree.node(self.id).flags())
    }

    pub fn max_level(&self) -> LogLevel {
        self.registry.with_tree(|tree| tree.node(self.id).max_level())
    }

    /// Cheap check to run before formatting any message arguments
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level <= self.max_level()
    }

    /// Set a flag here and on all existing subdomains
    pub fn set_flag(&self, flag: DomainFlag, value: bool) {
        self.registry
            .with_tree_mut(|tree| tree.set_flag(self.id, flag, value));
    }

    pub fn set_prints_name(&self, value: bool) {
        self.set_flag(DomainFlag::PrintsName, value);
    }

    pub fn set_prints_time(&self, value: bool) {
        self.set_flag(DomainFlag::PrintsTime, value);
    }

    pub fn set_prints_level(&self, value: bool) {
        self.set_flag(DomainFlag::PrintsLevel, value);
    }

    pub fn set_prints_location(&self, value: bool) {
        self.set_flag(DomainFlag::PrintsLocation, value);
    }

    /// Set the maximum level here and on all existing subdomains
    pub fn set_max_level(&self, level: LogLevel) {
        self.registry
            .with_tree_mut(|tree| tree.set_max_level(self.id, level));
    }

    pub fn sink_count(&self) -> usize {
        self.registry.with_tree(|tree| tree.node(self.id).sinks().len())
    }

    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.registry.with_tree_mut(|tree| tree.add_sink(self.id, sink));
    }

    pub fn set_sinks(&self, sinks: Vec<Arc<dyn Sink>>) {
        self.registry.with_tree_mut(|tree| tree.set_sinks(self.id, sinks));
    }

    pub fn clear_sinks(&self) {
        self.registry.with_tree_mut(|tree| tree.clear_sinks(self.id));
    }

    pub(crate) fn stream(&self) -> SharedFanOutBuffer {
        self.registry.stream_for(self.id)
    }
}

impl PartialEq for Domain<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.id == other.id
    }
}

impl Eq for Domain<'_> {}

impl fmt::Debug for Domain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("id", &self.id)
            .field("name", &self.full_name())
            .finish()
    }
}
