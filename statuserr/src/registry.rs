//! The process-wide variant registry.
//!
//! [`Registry::build`] runs once over a catalog table and binds every
//! variant under three kinds of keys: PascalCase type name, lowerCamelCase
//! alias, and numeric status code. All three key spaces are
//! first-write-wins: when a later entry would reuse a key (424 and 451 each
//! carry two titles), the earlier binding is kept, the skip is logged at
//! warn level, and the later entry stays reachable through its other keys.
//!
//! [`registry()`] exposes the built-in catalog behind a lazily-initialized
//! singleton: built on first access, read-only for the rest of the process
//! lifetime, safe for concurrent readers.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::LazyLock;

use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{CATALOG, CatalogEntry};
use crate::variant::Variant;

/// Lookup failure for [`Registry::try_get`] / [`Registry::try_status`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no error variant registered under name `{0}`")]
    UnknownName(String),
    #[error("no error variant registered for status code {0}")]
    UnknownStatus(u16),
}

/// Immutable multi-key index over a set of error variants.
#[derive(Debug)]
pub struct Registry {
    by_name: HashMap<String, Variant>,
    by_alias: HashMap<String, Variant>,
    by_status: HashMap<u16, Variant>,
    all: Vec<Variant>,
}

impl Registry {
    /// Build a registry from catalog entries, in table order.
    #[must_use]
    pub fn build(entries: &[CatalogEntry]) -> Self {
        let mut registry = Self {
            by_name: HashMap::new(),
            by_alias: HashMap::new(),
            by_status: HashMap::new(),
            all: Vec::with_capacity(entries.len()),
        };
        for entry in entries {
            registry.register(Variant::from_entry(entry));
        }
        registry
    }

    fn register(&mut self, variant: Variant) {
        debug!(
            name = variant.name(),
            status = variant.status(),
            "registered error variant"
        );
        match self.by_name.entry(variant.name().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(variant.clone());
            }
            Entry::Occupied(existing) => warn!(
                name = variant.name(),
                kept = existing.get().title(),
                skipped = variant.title(),
                "name already bound; keeping first registration"
            ),
        }
        match self.by_alias.entry(variant.alias().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(variant.clone());
            }
            Entry::Occupied(existing) => warn!(
                alias = variant.alias(),
                kept = existing.get().title(),
                skipped = variant.title(),
                "alias already bound; keeping first registration"
            ),
        }
        match self.by_status.entry(variant.status()) {
            Entry::Vacant(slot) => {
                slot.insert(variant.clone());
            }
            Entry::Occupied(existing) => warn!(
                status = variant.status(),
                kept = existing.get().title(),
                skipped = variant.title(),
                "status already bound; keeping first registration"
            ),
        }
        self.all.push(variant);
    }

    /// Look up a variant by type name or alias.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.by_name.get(key).or_else(|| self.by_alias.get(key))
    }

    /// Look up the default variant for a status code.
    #[must_use]
    pub fn get_status(&self, status: u16) -> Option<&Variant> {
        self.by_status.get(&status)
    }

    /// Like [`Registry::get`], with a typed error for unknown keys.
    pub fn try_get(&self, key: &str) -> Result<&Variant, LookupError> {
        self.get(key)
            .ok_or_else(|| LookupError::UnknownName(key.to_string()))
    }

    /// Like [`Registry::get_status`], with a typed error for unknown codes.
    pub fn try_status(&self, status: u16) -> Result<&Variant, LookupError> {
        self.get_status(status)
            .ok_or(LookupError::UnknownStatus(status))
    }

    /// All registered variants, in registration order. Shadowed entries are
    /// included; they simply lost their shared keys.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.all.iter()
    }

    /// Number of registered variants (shadowed entries included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| Registry::build(CATALOG));

/// The registry for the built-in catalog. Built on first access, immutable
/// afterwards.
#[must_use]
pub fn registry() -> &'static Registry {
    &REGISTRY
}
