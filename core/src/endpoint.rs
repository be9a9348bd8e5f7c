//! Per-call request descriptors.

use serde_json::Value;

use crate::http::HttpMethod;

/// What to call: method, path relative to the versioned API root, query
/// pairs and an optional JSON body.
///
/// Paths are appended verbatim to `{base}/api/{version}/`, so they must not
/// start with a slash.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builders_set_method_and_path() {
        let endpoint = Endpoint::patch("work_packages/3")
            .query("notify", "false")
            .json(json!({"subject": "x"}));
        assert_eq!(endpoint.method, HttpMethod::Patch);
        assert_eq!(endpoint.path, "work_packages/3");
        assert_eq!(endpoint.query, vec![("notify".to_string(), "false".to_string())]);
        assert_eq!(endpoint.body, Some(json!({"subject": "x"})));
    }

    #[test]
    fn get_has_no_body() {
        let endpoint = Endpoint::get("statuses");
        assert!(endpoint.body.is_none());
        assert!(endpoint.query.is_empty());
    }
}
