//! Error instances, construction configs, and cause links.
//!
//! [`HttpError`] is the value every variant constructor produces. It keeps a
//! handle to its variant metadata (name, code, title, status), the fields set
//! at construction, and a diagnostic trace captured at the construction site.
//!
//! Construction input arrives as an [`ErrorConfig`]. The flexible input
//! shapes accepted by variant constructors are plain conversions:
//!
//! - `()` — empty config,
//! - `&str` / `String` — `message`,
//! - an [`HttpError`] (or [`Cause`]) — `cause`,
//! - a full [`ErrorConfig`] — used as-is.
//!
//! Causes are shared links ([`Cause`] wraps an `Arc`): an error never owns
//! the lifetime of the error that caused it, it only points at it. Foreign
//! `std::error::Error` values can be linked too and keep their short type
//! name for serialization.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::variant::Variant;

/// A structured HTTP error instance produced by a variant constructor.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub(crate) variant: Variant,
    pub(crate) message: Option<String>,
    pub(crate) cause: Option<Cause>,
    pub(crate) details: Option<Value>,
    /// Declared status-specific fields, in declaration order.
    pub(crate) fields: Vec<(String, Value)>,
    pub(crate) trace: Vec<String>,
}

impl HttpError {
    /// The variant this instance belongs to.
    #[must_use]
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// PascalCase type name (e.g. `NotFound`). Fixed per variant.
    #[must_use]
    pub fn name(&self) -> &str {
        self.variant.name()
    }

    /// UPPER_SNAKE machine code (e.g. `NOT_FOUND`). Fixed per variant.
    #[must_use]
    pub fn code(&self) -> &str {
        self.variant.code()
    }

    /// Original human title, verbatim (e.g. `Not Found`).
    #[must_use]
    pub fn title(&self) -> &str {
        self.variant.title()
    }

    /// Numeric HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.variant.status()
    }

    /// Human description supplied at construction, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The linked causing error, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Opaque structured payload supplied at construction, if any.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// A declared status-specific field by key (e.g. `retryAfter`).
    ///
    /// Only keys the variant declares are ever populated; anything else in
    /// the construction config is dropped.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// All populated status-specific fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Diagnostic trace captured at construction, cause trace included.
    #[must_use]
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// `true` for 4xx variants.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.variant.is_client_error()
    }

    /// `true` for 5xx variants.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.variant.is_server_error()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status(), self.title())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(Cause::as_error)
    }
}

/// Construction config for a variant instance.
///
/// The same config populates base fields (`message`, `cause`, `details`)
/// first and the variant's declared status-specific fields second, so one
/// construction call always yields a consistent instance.
#[derive(Debug, Clone, Default)]
pub struct ErrorConfig {
    pub message: Option<String>,
    pub cause: Option<Cause>,
    pub details: Option<Value>,
    /// Candidate status-specific fields; only keys the variant declares are
    /// copied onto the instance.
    pub fields: Map<String, Value>,
}

impl ErrorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl From<()> for ErrorConfig {
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<&str> for ErrorConfig {
    fn from(message: &str) -> Self {
        Self::default().message(message)
    }
}

impl From<String> for ErrorConfig {
    fn from(message: String) -> Self {
        Self::default().message(message)
    }
}

impl From<Cause> for ErrorConfig {
    fn from(cause: Cause) -> Self {
        Self::default().cause(cause)
    }
}

impl From<HttpError> for ErrorConfig {
    fn from(cause: HttpError) -> Self {
        Self::default().cause(cause)
    }
}

impl From<Arc<HttpError>> for ErrorConfig {
    fn from(cause: Arc<HttpError>) -> Self {
        Self::default().cause(cause)
    }
}

/// A shared link to the error that caused this one.
///
/// Either another [`HttpError`] (structured, trace-bearing) or any foreign
/// `std::error::Error` value.
#[derive(Debug, Clone)]
pub struct Cause(CauseKind);

#[derive(Debug, Clone)]
enum CauseKind {
    Http(Arc<HttpError>),
    Foreign {
        type_name: &'static str,
        error: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl Cause {
    /// Link a foreign error, keeping its short type name for serialization.
    pub fn foreign<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(CauseKind::Foreign {
            type_name: short_type_name(std::any::type_name::<E>()),
            error: Arc::new(error),
        })
    }

    /// The structured error behind this link, if it is one of ours.
    #[must_use]
    pub fn as_http(&self) -> Option<&HttpError> {
        match &self.0 {
            CauseKind::Http(inner) => Some(inner),
            CauseKind::Foreign { .. } => None,
        }
    }

    /// The cause as a plain `std::error::Error`.
    #[must_use]
    pub fn as_error(&self) -> &(dyn std::error::Error + 'static) {
        match &self.0 {
            CauseKind::Http(inner) => inner.as_ref(),
            CauseKind::Foreign { error, .. } => error.as_ref(),
        }
    }

    /// Shared-pointer identity, used by the serializer's cycle guard.
    pub(crate) fn identity(&self) -> *const () {
        match &self.0 {
            CauseKind::Http(inner) => Arc::as_ptr(inner).cast(),
            CauseKind::Foreign { error, .. } => Arc::as_ptr(error).cast::<u8>().cast(),
        }
    }

    /// Name recorded for this cause in serialized output.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.0 {
            CauseKind::Http(inner) => inner.name(),
            CauseKind::Foreign { type_name, .. } => type_name,
        }
    }

    /// The cause's trace, when it carries one.
    #[must_use]
    pub fn trace(&self) -> Option<&[String]> {
        match &self.0 {
            CauseKind::Http(inner) => Some(inner.trace()),
            CauseKind::Foreign { .. } => None,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            CauseKind::Http(inner) => write!(f, "{inner}"),
            CauseKind::Foreign { error, .. } => write!(f, "{error}"),
        }
    }
}

impl From<HttpError> for Cause {
    fn from(error: HttpError) -> Self {
        Self(CauseKind::Http(Arc::new(error)))
    }
}

impl From<Arc<HttpError>> for Cause {
    fn from(error: Arc<HttpError>) -> Self {
        Self(CauseKind::Http(error))
    }
}

fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Build the diagnostic trace for a new instance: a headline, the frames at
/// the construction site, then the cause's trace nested one level deeper.
pub(crate) fn synthesize_trace(
    name: &str,
    message: Option<&str>,
    cause: Option<&Cause>,
) -> Vec<String> {
    let mut trace = Vec::new();
    trace.push(match message {
        Some(message) => format!("{name}: {message}"),
        None => name.to_string(),
    });
    trace.extend(capture_frames());
    if let Some(cause) = cause {
        match cause.trace() {
            Some(lines) if !lines.is_empty() => {
                trace.push("Caused by:".to_string());
                for line in lines {
                    trace.push(format!("    {line}"));
                }
            }
            _ => trace.push(format!("Caused by: {cause}")),
        }
    }
    trace
}

/// Frames whose symbols match these prefixes belong to the construction
/// machinery, not user code, and are dropped from the trace.
const ELIDED_FRAME_MARKERS: &[&str] = &[
    "std::backtrace",
    "statuserr::error::capture_frames",
    "statuserr::error::synthesize_trace",
    "statuserr::variant::Variant::build",
];

fn capture_frames() -> Vec<String> {
    let backtrace = Backtrace::force_capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    let rendered = backtrace.to_string();
    let mut frames = Vec::new();
    let mut eliding = true;
    for line in rendered.lines() {
        let trimmed = line.trim_start();
        // Frame headers look like "12: path::to::symbol"; location lines
        // ("at src/file.rs:40") inherit the preceding header's fate.
        let is_frame_header = trimmed
            .split_once(':')
            .is_some_and(|(index, _)| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()));
        if is_frame_header {
            eliding = ELIDED_FRAME_MARKERS
                .iter()
                .any(|marker| trimmed.contains(marker));
        }
        if !eliding {
            frames.push(line.trim_end().to_string());
        }
    }
    frames
}
