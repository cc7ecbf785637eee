//! Logging macros.
//!
//! Each macro resolves its domain once per call site, from the source file it
//! appears in and an optional domain name, and caches it in a static. The
//! values of a message are only evaluated when the domain's maximum level lets
//! the message through.
//!
//! # Examples
//!
//! ```
//! use rust_domain_logger::{log_debug, log_user, log_warning};
//!
//! let port = 8080;
//! log_user!("Server listening on port ", port);
//! log_debug!(domain: "network", "accepted connection #", 1);
//! log_warning!(domain: ".storage.cache", "cache is ", 93.5, "% full");
//! ```

/// Name of the enclosing function, without its module path.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::macros::short_function_name(type_name_of(__f))
    }};
}

#[doc(hidden)]
pub fn short_function_name(type_name: &'static str) -> &'static str {
    let mut name = type_name.strip_suffix("::__f").unwrap_or(type_name);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name.rsplit("::").next().unwrap_or(name)
}

/// Log a message made of any number of [`Formattable`](crate::core::Formattable)
/// values at the given level.
///
/// With `domain: "name"` the message goes to that domain; a name starting
/// with `.` is absolute, anything else is relative to the namespace of the
/// calling source file. The name is resolved on the first call only, and once
/// more on the first call after [`DomainRegistry::shutdown`](crate::core::DomainRegistry::shutdown).
///
/// ```
/// use rust_domain_logger::log_message;
/// use rust_domain_logger::LogLevel;
///
/// log_message!(LogLevel::DebugVerbose1, "state: ", "idle");
/// log_message!(domain: ".audio", LogLevel::Error, "buffer underrun");
/// ```
#[macro_export]
macro_rules! log_message {
    (domain: $name:expr, $level:expr $(, $value:expr)* $(,)?) => {
        $crate::__log_message!(::core::option::Option::Some($name), $level $(, $value)*)
    };
    ($level:expr $(, $value:expr)* $(,)?) => {
        $crate::__log_message!(::core::option::Option::None, $level $(, $value)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_message {
    ($name:expr, $level:expr $(, $value:expr)*) => {{
        static DOMAIN: $crate::__private::OnceCell<$crate::core::Domain<'static>> =
            $crate::__private::OnceCell::new();
        static LATE_DOMAIN: $crate::__private::OnceCell<$crate::core::Domain<'static>> =
            $crate::__private::OnceCell::new();
        let cell = if $crate::core::DomainRegistry::is_shut_down() {
            &LATE_DOMAIN
        } else {
            &DOMAIN
        };
        let domain = *cell.get_or_init(|| {
            $crate::core::DomainRegistry::global().domain_for_call_site(::core::file!(), $name)
        });
        let level: $crate::core::LogLevel = $level;
        if domain.is_enabled(level) {
            $crate::core::emit(
                domain,
                &$crate::core::CallSite::new(
                    ::core::module_path!(),
                    $crate::function_name!(),
                    ::core::file!(),
                    ::core::line!(),
                ),
                level,
                &[$($crate::core::Formattable::log_value(&$value)),*],
            );
        }
    }};
}

/// Log a message without any prefix decoration.
#[macro_export]
macro_rules! log_user {
    (domain: $name:expr $(, $value:expr)* $(,)?) => {
        $crate::log_message!(domain: $name, $crate::core::LogLevel::User $(, $value)*)
    };
    ($($value:expr),* $(,)?) => {
        $crate::log_message!($crate::core::LogLevel::User $(, $value)*)
    };
}

/// Log an error; the payload starts with `ERROR: `.
#[macro_export]
macro_rules! log_error {
    (domain: $name:expr $(, $value:expr)* $(,)?) => {
        $crate::log_message!(domain: $name, $crate::core::LogLevel::Error $(, $value)*)
    };
    ($($value:expr),* $(,)?) => {
        $crate::log_message!($crate::core::LogLevel::Error $(, $value)*)
    };
}

/// Log a warning; the payload starts with `WARNING: `.
#[macro_export]
macro_rules! log_warning {
    (domain: $name:expr $(, $value:expr)* $(,)?) => {
        $crate::log_message!(domain: $name, $crate::core::LogLevel::Warning $(, $value)*)
    };
    ($($value:expr),* $(,)?) => {
        $crate::log_message!($crate::core::LogLevel::Warning $(, $value)*)
    };
}

#[macro_export]
macro_rules! log_debug_warning {
    (domain: $name:expr $(, $value:expr)* $(,)?) => {
        $crate::log_message!(domain: $name, $crate::core::LogLevel::DebugWarning $(, $value)*)
    };
    ($($value:expr),* $(,)?) => {
        $crate::log_message!($crate::core::LogLevel::DebugWarning $(, $value)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    (domain: $name:expr $(, $value:expr)* $(,)?) => {
        $crate::log_message!(domain: $name, $crate::core::LogLevel::Debug $(, $value)*)
    };
    ($($value:expr),* $(,)?) => {
        $crate::log_message!($crate::core::LogLevel::Debug $(, $value)*)
    };
}

#[cfg(test)]
mod tests {
    use super::short_function_name;
    use crate::core::{DomainRegistry, LogLevel, Sink};
    use crate::sinks::MemorySink;
    use std::cell::Cell;
    use std::sync::Arc;

    fn capture(name: &str) -> Arc<MemorySink> {
        let sink = Arc::new(MemorySink::new());
        let domain = DomainRegistry::global().domain(name).unwrap();
        domain.set_sinks(vec![sink.clone() as Arc<dyn Sink>]);
        domain.set_prints_name(true);
        domain.set_prints_level(true);
        sink
    }

    fn enclosing() -> &'static str {
        function_name!()
    }

    #[test]
    fn test_function_name() {
        assert_eq!(enclosing(), "enclosing");
        let in_closure = || function_name!();
        assert_eq!(in_closure(), "test_function_name");
    }

    #[test]
    fn test_short_function_name() {
        assert_eq!(short_function_name("app::net::connect::__f"), "connect");
        assert_eq!(
            short_function_name("app::run::{{closure}}::{{closure}}::__f"),
            "run"
        );
        assert_eq!(short_function_name("main"), "main");
    }

    #[test]
    fn test_absolute_domain() {
        let sink = capture(".macro_tests.absolute");
        log_warning!(domain: ".macro_tests.absolute", "value ", 7);

        let out = sink.contents();
        assert!(out.contains(".macro_tests.absolute"));
        assert!(out.contains("[warning]"));
        assert!(out.contains("test_absolute_domain"));
        assert!(out.ends_with(">> WARNING: value 7\n"));
    }

    #[test]
    fn test_relative_domain_uses_file_namespace() {
        // src/macros.rs lies directly below the "src" prefix: root namespace
        let sink = capture(".macro_relative");
        log_debug!(domain: "macro_relative", "hello");
        assert!(sink.contents().ends_with(">> hello\n"));
    }

    #[test]
    fn test_user_level_is_undecorated() {
        let sink = capture(".macro_tests.user");
        log_user!(domain: ".macro_tests.user", "plain ", true);
        assert_eq!(sink.contents(), "plain true\n");
    }

    #[test]
    fn test_suppressed_values_are_not_evaluated() {
        let sink = capture(".macro_tests.suppressed");
        DomainRegistry::global()
            .domain(".macro_tests.suppressed")
            .unwrap()
            .set_max_level(LogLevel::Warning);

        let evaluated = Cell::new(0);
        let next = || {
            evaluated.set(evaluated.get() + 1);
            evaluated.get()
        };
        log_debug!(domain: ".macro_tests.suppressed", next());
        log_error!(domain: ".macro_tests.suppressed", next());

        assert_eq!(evaluated.get(), 1);
        assert!(sink.contents().ends_with(">> ERROR: 1\n"));
    }

    #[test]
    fn test_message_without_values() {
        let sink = capture(".macro_tests.empty");
        log_message!(domain: ".macro_tests.empty", LogLevel::DebugVerbose2);
        // above the default maximum level
        assert_eq!(sink.contents(), "");

        log_debug_warning!(domain: ".macro_tests.empty");
        assert!(sink.contents().ends_with(">> \n"));
    }
}
