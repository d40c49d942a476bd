//! Call descriptor handed to the pipeline by endpoint wrappers.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// `{ path, method, query?, body? }`. The path is rooted (`/api/...`) and is
/// joined to the configured base URL by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns the serializer error when `body` cannot be represented as JSON.
    pub fn with_json<T: Serialize>(self, body: &T) -> Result<Self, serde_json::Error> {
        Ok(self.with_body(serde_json::to_value(body)?))
    }
}
