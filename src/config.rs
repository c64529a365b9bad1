//! Filter configuration.
//!
//! Hosts typically embed [`FilterConfig`] in their own settings and insert it
//! as a request extension so extractors can tell internal requests apart:
//!
//! ```rust,ignore
//! let config: FilterConfig = serde_json::from_value(settings["filters"].clone())?;
//! let app = Router::new()
//!     .nest("/int/v1", internal_routes)
//!     .layer(Extension(config));
//! ```

use crate::range::RangeVocabulary;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Prefix every API route is mounted under
    pub route_prefix: String,
    /// First path segment (after `route_prefix`) of console routes
    pub internal_prefix: String,
    /// Preposition pairs used for range synthesis, highest priority first
    pub range_pairs: RangeVocabulary,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            route_prefix: "/".to_string(),
            internal_prefix: "int".to_string(),
            range_pairs: RangeVocabulary::default(),
        }
    }
}

impl FilterConfig {
    /// Whether a request path targets the internal console API.
    ///
    /// With the defaults, `/int/v1/users` is internal and `/v1/users` is not.
    #[must_use]
    pub fn is_internal_path(&self, path: &str) -> bool {
        let prefix = self.route_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');

        let rest = if prefix.is_empty() {
            path
        } else {
            match path.strip_prefix(prefix) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => return false,
            }
        };

        let internal = self.internal_prefix.trim_matches('/');
        !internal.is_empty()
            && rest
                .split('/')
                .find(|segment| !segment.is_empty())
                .is_some_and(|segment| segment == internal)
    }
}
