//! Strongly-typed identifiers used across the workspace.
//!
//! Catalog identifiers are opaque strings. The platform hands out two shapes
//! for the same record: a legacy numeric id (webhook payloads) and a global
//! id (`gid://shopify/<Resource>/<n>`, GraphQL). Numeric ids are expanded into
//! the global form on construction so equality works across both sources.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

const GID_PREFIX: &str = "gid://shopify/";

/// Identifier of an inventory record (one per product variant).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(String);

/// Identifier of a stock location (warehouse, store, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

macro_rules! impl_gid_newtype {
    ($t:ty, $resource:literal) => {
        impl $t {
            /// Platform resource name used in global ids.
            pub const RESOURCE: &'static str = $resource;

            /// Expand a legacy numeric id into its global-id form.
            pub fn from_legacy(id: u64) -> Self {
                Self(format!("{}{}/{}", GID_PREFIX, $resource, id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Numeric tail of a global id, if this is one.
            pub fn legacy_id(&self) -> Option<u64> {
                self.0
                    .strip_prefix(GID_PREFIX)?
                    .strip_prefix($resource)?
                    .strip_prefix('/')?
                    .parse()
                    .ok()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self::from_legacy(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(DomainError::invalid_id(concat!($resource, ": empty")));
                }
                if s.bytes().all(|b| b.is_ascii_digit()) {
                    let n: u64 = s.parse().map_err(|e| {
                        DomainError::invalid_id(format!("{}: {}", $resource, e))
                    })?;
                    return Ok(Self::from_legacy(n));
                }
                if s
                    .strip_prefix('-')
                    .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                {
                    return Err(DomainError::invalid_id(format!(
                        "{}: negative id {s}",
                        $resource
                    )));
                }
                if let Some(rest) = s.strip_prefix(GID_PREFIX) {
                    let matches_kind = rest
                        .strip_prefix($resource)
                        .is_some_and(|tail| tail.starts_with('/') && tail.len() > 1);
                    if !matches_kind {
                        return Err(DomainError::invalid_id(format!(
                            "{}: unexpected global id {s}",
                            $resource
                        )));
                    }
                }
                Ok(Self(s.to_string()))
            }
        }
    };
}

impl_gid_newtype!(InventoryItemId, "InventoryItem");
impl_gid_newtype!(LocationId, "Location");

/// Normalized shop host (e.g. `acme.myshopify.com`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopDomain(String);

impl ShopDomain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShopDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let host = s.trim();
        let host = host
            .strip_prefix("https://")
            .or_else(|| host.strip_prefix("http://"))
            .unwrap_or(host)
            .trim_end_matches('/')
            .to_ascii_lowercase();

        if host.is_empty() || host.contains(|c: char| c.is_whitespace() || c == '/') {
            return Err(DomainError::invalid_id(format!("ShopDomain: {s:?}")));
        }
        Ok(Self(host))
    }
}

/// Correlation id of a single reconciliation run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new run id.
    ///
    /// Uses UUIDv7 (time-ordered) so log lines sort by run start.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
