//! Axum extractors for filter input.
//!
//! [`ParameterSet`] extracts the request's query string; [`FilterRequest`]
//! additionally decides whether the request is internal, using the
//! [`FilterConfig`] request extension (or the defaults when none is set).

use crate::config::FilterConfig;
use crate::params::ParameterSet;
use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use serde_json::Value;
use std::convert::Infallible;

impl<S> FromRequestParts<S> for ParameterSet
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query(parts.uri.query().unwrap_or_default()))
    }
}

/// Everything a [`Filter`](crate::Filter) needs from an inbound request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub parameters: ParameterSet,
    /// Request came through the internal (console) API
    pub internal: bool,
}

impl FilterRequest {
    #[must_use]
    pub const fn new(parameters: ParameterSet, internal: bool) -> Self {
        Self {
            parameters,
            internal,
        }
    }

    /// Merge a JSON body into the parameters (body wins on name clashes).
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.parameters.merge_body(body);
        self
    }
}

impl<S> FromRequestParts<S> for FilterRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `parts.uri`.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);

        let internal = parts
            .extensions
            .get::<FilterConfig>()
            .map_or_else(
                || FilterConfig::default().is_internal_path(uri.path()),
                |config| config.is_internal_path(uri.path()),
            );
        let parameters = ParameterSet::from_query(uri.query().unwrap_or_default());

        tracing::trace!(
            path = %uri.path(),
            internal,
            parameters = parameters.len(),
            "extracted filter request"
        );

        Ok(Self::new(parameters, internal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;

    async fn extract(request: Request<()>) -> FilterRequest {
        let (mut parts, ()) = request.into_parts();
        FilterRequest::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_query_and_internal_flag() {
        let request = Request::builder()
            .uri("/int/v1/users?status=active&created_at_after=2024-01-01")
            .body(())
            .unwrap();
        let extracted = extract(request).await;

        assert!(extracted.internal);
        assert_eq!(
            extracted.parameters.names().collect::<Vec<_>>(),
            ["status", "created_at_after"]
        );
    }

    #[tokio::test]
    async fn test_public_path_is_not_internal() {
        let request = Request::builder().uri("/v1/users").body(()).unwrap();
        let extracted = extract(request).await;

        assert!(!extracted.internal);
        assert!(extracted.parameters.is_empty());
    }

    #[tokio::test]
    async fn test_config_extension_is_used() {
        let mut request = Request::builder()
            .uri("/console/v1/users?q=x")
            .body(())
            .unwrap();
        request.extensions_mut().insert(FilterConfig {
            internal_prefix: "console".to_string(),
            ..FilterConfig::default()
        });

        assert!(extract(request).await.internal);
    }

    #[tokio::test]
    async fn test_original_uri_wins_over_nested_uri() {
        let mut request = Request::builder().uri("/users?status=a").body(()).unwrap();
        request
            .extensions_mut()
            .insert(OriginalUri("/int/v1/users?status=a".parse().unwrap()));

        let extracted = extract(request).await;
        assert!(extracted.internal);
        assert_eq!(extracted.parameters.get("status"), Some(&json!("a")));
    }

    #[test]
    fn test_with_body() {
        let request = FilterRequest::new(ParameterSet::from_query("status=a"), false)
            .with_body(json!({"status": "b", "name": "x"}));
        assert_eq!(request.parameters.get("status"), Some(&json!("b")));
        assert_eq!(request.parameters.len(), 2);
    }
}
