//! Catalog-driven structured HTTP error values.
//!
//! A static catalog of (status code, title, field list) entries is expanded
//! once into a process-wide registry of error variants. Every variant
//! carries a stable identity derived from its title — a PascalCase name, a
//! lowerCamelCase alias, and an UPPER_SNAKE machine code — plus the verbatim
//! title and the numeric status. Instances are built from a message, a
//! causing error, or a structured config, and serialize (cause chain
//! included) into flat JSON-safe records for logging or wire transmission.
//!
//! # Lookup keys
//!
//! | Key kind   | Example     | Accessor                 |
//! |------------|-------------|--------------------------|
//! | Type name  | `NotFound`  | `registry().get(..)`     |
//! | Alias      | `notFound`  | `registry().get(..)`     |
//! | Status     | `404`       | `registry().get_status(..)` |
//!
//! When a status code carries two catalog titles (424, 451), the first
//! registration wins the status key; every title stays reachable by name.
//!
//! # Example
//!
//! ```ignore
//! use statuserr::{registry, ErrorConfig};
//!
//! let not_found = registry().get("NotFound").unwrap();
//! let err = not_found.build("user 42 does not exist");
//! assert_eq!(err.status(), 404);
//! assert_eq!(err.code(), "NOT_FOUND");
//!
//! let unavailable = registry().get_status(503).unwrap();
//! let err = unavailable.build(
//!     ErrorConfig::new()
//!         .message("shedding load")
//!         .cause(err)
//!         .field("retryAfter", 30),
//! );
//! tracing::error!(error = ?err.to_object(&[]), "request failed");
//! ```
//!
//! Construction never fails and never touches shared state; the registry is
//! built once and read-only afterwards, so everything here is safe to use
//! from concurrent tasks without locking.

pub mod catalog;
pub mod error;
pub mod naming;
pub mod registry;
pub mod serialize;
pub mod variant;

pub use catalog::{CATALOG, CatalogEntry};
pub use error::{Cause, ErrorConfig, HttpError};
pub use naming::{Identifiers, normalize};
pub use registry::{LookupError, Registry, registry};
pub use serialize::Exclude;
pub use variant::Variant;
