//! Error variant metadata and the generic constructor.
//!
//! A [`Variant`] is one catalog entry expanded into fixed metadata: the
//! verbatim title, the derived name/alias/code identifiers, the status code,
//! and the declared status-specific field keys. Variant metadata is built
//! once (normally by the registry) and shared; the handle is cheap to clone.
//!
//! [`Variant::build`] is the single constructor for instances. It accepts
//! the flexible input shapes via `Into<ErrorConfig>`:
//!
//! ```ignore
//! use statuserr::registry;
//!
//! let too_many = registry().get_status(429).unwrap();
//! let err = too_many.build("rate limit hit");           // message
//! let err = too_many.build(());                          // empty
//! let err = too_many.build(upstream_err);                // cause
//! let err = too_many.build(
//!     statuserr::ErrorConfig::new()
//!         .message("rate limit hit")
//!         .field("retryAfter", 120),
//! );
//! ```
//!
//! Construction never fails: whatever the config carries, the result is an
//! instance with whichever fields were recognized.

use std::fmt;
use std::sync::Arc;

use crate::catalog::CatalogEntry;
use crate::error::{synthesize_trace, ErrorConfig, HttpError};
use crate::naming::normalize;

/// Fixed, type-level metadata for one error variant.
///
/// Identical across all instances of the variant; nothing here changes after
/// the variant is defined.
#[derive(Debug)]
pub struct VariantSpec {
    title: String,
    name: String,
    alias: String,
    code: String,
    status: u16,
    fields: Vec<String>,
}

/// A constructible error variant. Cheap to clone; all clones share the same
/// [`VariantSpec`].
#[derive(Debug, Clone)]
pub struct Variant(Arc<VariantSpec>);

impl Variant {
    /// Define a variant from a status code, a human title, and the keys of
    /// any status-specific fields it accepts. Identifiers are derived from
    /// the title.
    #[must_use]
    pub fn define(status: u16, title: impl Into<String>, fields: &[&str]) -> Self {
        let title = title.into();
        let ids = normalize(&title);
        Self(Arc::new(VariantSpec {
            title,
            name: ids.type_name,
            alias: ids.alias,
            code: ids.code,
            status,
            fields: fields.iter().map(|key| (*key).to_string()).collect(),
        }))
    }

    pub(crate) fn from_entry(entry: &CatalogEntry) -> Self {
        Self::define(entry.status, entry.title, entry.fields)
    }

    /// Original human title, verbatim.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.0.title
    }

    /// PascalCase type name derived from the title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// lowerCamelCase alias derived from the title.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.0.alias
    }

    /// UPPER_SNAKE machine code derived from the title.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0.code
    }

    /// Numeric HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.0.status
    }

    /// Keys of the status-specific fields this variant accepts.
    #[must_use]
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.0.fields.iter().map(String::as_str)
    }

    /// `true` for 4xx variants.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0.status)
    }

    /// `true` for 5xx variants.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0.status)
    }

    /// Construct an instance of this variant.
    ///
    /// Base fields (`message`, `cause`, `details`) are populated first, then
    /// the declared status-specific fields are copied from the same config;
    /// undeclared config fields are dropped. Finally a diagnostic trace is
    /// captured at the construction site, with the cause's trace appended
    /// when one is present.
    #[must_use]
    pub fn build(&self, config: impl Into<ErrorConfig>) -> HttpError {
        let config = config.into();
        let mut fields = Vec::with_capacity(self.0.fields.len());
        for key in &self.0.fields {
            if let Some(value) = config.fields.get(key) {
                fields.push((key.clone(), value.clone()));
            }
        }
        let trace = synthesize_trace(
            &self.0.name,
            config.message.as_deref(),
            config.cause.as_ref(),
        );
        HttpError {
            variant: self.clone(),
            message: config.message,
            cause: config.cause,
            details: config.details,
            fields,
            trace,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.status, self.0.title)
    }
}
