//! Best-effort account identity lookup.
//!
//! Names are resolved to the canonical dashed UUID form. A failed or empty
//! lookup resolves to an empty identifier instead of an error.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::fetch::Fetcher;

/// Reformat a raw identifier (32 hex chars, no separators) as `8-4-4-4-12`.
///
/// Returns `None` if `raw` is not a UUID in any accepted notation.
pub fn format_identifier(raw: &str) -> Option<String> {
  Uuid::try_parse(raw.trim()).ok().map(|id| id.hyphenated().to_string())
}

/// Resolves account names, remembering answers for the lifetime of the resolver.
pub struct IdentityResolver<'a> {
  fetcher: &'a dyn Fetcher,
  cache: HashMap<String, String>,
}

impl<'a> IdentityResolver<'a> {
  pub fn new(fetcher: &'a dyn Fetcher) -> Self {
    Self {
      fetcher,
      cache: HashMap::new(),
    }
  }

  /// Identifier for `name`, or an empty string if it cannot be determined.
  pub async fn resolve(&mut self, name: &str) -> String {
    if let Some(id) = self.cache.get(name) {
      return id.clone();
    }

    let id = match self.fetcher.fetch_identity(name).await {
      Ok(Some(raw)) => match format_identifier(&raw) {
        Some(id) => {
          debug!(name = %name, id = %id, "resolved account identifier");
          id
        }
        None => {
          warn!(name = %name, raw = %raw, "lookup returned an unrecognised identifier");
          String::new()
        }
      },
      Ok(None) => {
        warn!(name = %name, "account not found, recording empty identifier");
        String::new()
      }
      Err(e) => {
        warn!(name = %name, error = %e, "account lookup failed, recording empty identifier");
        String::new()
      }
    };

    self.cache.insert(name.to_string(), id.clone());
    id
  }
}
