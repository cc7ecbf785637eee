//! Payload values and their text rendering
//!
//! A message payload is a sequence of values written in order. Each value is
//! converted into a [`LogValue`] through [`Formattable`], and every variant has
//! exactly one rendering rule.

use chrono::{DateTime, Local, TimeZone};
use std::borrow::Cow;
use std::fmt;
use std::time::SystemTime;

/// Token printed for absent values and for the NUL character
pub const NULL_TOKEN: &str = "<null>";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One payload value
pub enum LogValue<'a> {
    Text(Cow<'a, str>),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    Char(char),
    Null,
    Timestamp(DateTime<Local>),
    Error {
        type_name: &'static str,
        message: String,
    },
    Display(&'a dyn fmt::Display),
}

impl<'a> LogValue<'a> {
    /// Render an error as `<type>: <message>`
    pub fn error<E: std::error::Error>(error: &E) -> Self {
        LogValue::Error {
            type_name: short_type_name(std::any::type_name::<E>()),
            message: error.to_string(),
        }
    }

    /// Wrap any displayable value
    pub fn display(value: &'a dyn fmt::Display) -> Self {
        LogValue::Display(value)
    }
}

impl fmt::Display for LogValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Text(text) => f.write_str(text),
            LogValue::Integer(value) => write!(f, "{}", value),
            LogValue::Unsigned(value) => write!(f, "{}", value),
            LogValue::Float(value) => write!(f, "{}", value),
            LogValue::Boolean(value) => f.write_str(if *value { "true" } else { "false" }),
            LogValue::Char('\0') => f.write_str(NULL_TOKEN),
            LogValue::Char(c) => write!(f, "{}", c),
            LogValue::Null => f.write_str(NULL_TOKEN),
            LogValue::Timestamp(time) => write!(f, "{}", time.format(TIMESTAMP_FORMAT)),
            LogValue::Error { type_name, message } => write!(f, "{}: {}", type_name, message),
            LogValue::Display(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Debug for LogValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogValue({})", self)
    }
}

fn short_type_name(name: &'static str) -> &'static str {
    // Generic arguments may contain `::` themselves
    let base = name.split('<').next().unwrap_or(name);
    match base.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

/// Conversion of a payload argument into a [`LogValue`]
pub trait Formattable {
    fn log_value(&self) -> LogValue<'_>;
}

impl<T: Formattable + ?Sized> Formattable for &T {
    fn log_value(&self) -> LogValue<'_> {
        (**self).log_value()
    }
}

impl Formattable for str {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Text(Cow::Borrowed(self))
    }
}

impl Formattable for String {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Text(Cow::Borrowed(self.as_str()))
    }
}

impl Formattable for Cow<'_, str> {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Text(Cow::Borrowed(self.as_ref()))
    }
}

macro_rules! formattable_signed {
    ($($ty:ty),*) => {
        $(impl Formattable for $ty {
            fn log_value(&self) -> LogValue<'_> {
                LogValue::Integer(*self as i64)
            }
        })*
    };
}

macro_rules! formattable_unsigned {
    ($($ty:ty),*) => {
        $(impl Formattable for $ty {
            fn log_value(&self) -> LogValue<'_> {
                LogValue::Unsigned(*self as u64)
            }
        })*
    };
}

formattable_signed!(i8, i16, i32, i64, isize);
formattable_unsigned!(u8, u16, u32, u64, usize);

impl Formattable for f32 {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Float(f64::from(*self))
    }
}

impl Formattable for f64 {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Float(*self)
    }
}

impl Formattable for bool {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Boolean(*self)
    }
}

impl Formattable for char {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Char(*self)
    }
}

impl<T: Formattable> Formattable for Option<T> {
    fn log_value(&self) -> LogValue<'_> {
        match self {
            Some(value) => value.log_value(),
            None => LogValue::Null,
        }
    }
}

impl Formattable for SystemTime {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Timestamp(DateTime::<Local>::from(*self))
    }
}

impl<Tz: TimeZone> Formattable for DateTime<Tz> {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::Timestamp(self.with_timezone(&Local))
    }
}

impl Formattable for std::io::Error {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::error(self)
    }
}

impl Formattable for crate::core::error::LoggerError {
    fn log_value(&self) -> LogValue<'_> {
        LogValue::error(self)
    }
}

impl Formattable for LogValue<'_> {
    fn log_value(&self) -> LogValue<'_> {
        match self {
            LogValue::Text(text) => LogValue::Text(Cow::Borrowed(text.as_ref())),
            LogValue::Integer(value) => LogValue::Integer(*value),
            LogValue::Unsigned(value) => LogValue::Unsigned(*value),
            LogValue::Float(value) => LogValue::Float(*value),
            LogValue::Boolean(value) => LogValue::Boolean(*value),
            LogValue::Char(c) => LogValue::Char(*c),
            LogValue::Null => LogValue::Null,
            LogValue::Timestamp(time) => LogValue::Timestamp(*time),
            LogValue::Error { type_name, message } => LogValue::Error {
                type_name: *type_name,
                message: message.clone(),
            },
            LogValue::Display(value) => LogValue::Display(*value),
        }
    }
}
