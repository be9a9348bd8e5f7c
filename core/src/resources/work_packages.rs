use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::{ApiError, Result};
use crate::fields::{build_payload, Fields, WORK_PACKAGE_FIELDS};
use crate::normalize::Outcome;
use crate::types::{project_filter, ProjectId};

const ENDPOINT: &str = "work_packages";

/// `work_packages` collection.
#[derive(Debug, Clone, Copy)]
pub struct WorkPackages<'a> {
    client: &'a Client,
}

impl<'a> WorkPackages<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// All work packages, or only those of `project`.
    pub fn list(&self, project: Option<ProjectId>) -> Result<Outcome> {
        let mut endpoint = Endpoint::get(ENDPOINT);
        if let Some(project) = project {
            let filters = serde_json::to_string(&project_filter(project))
                .map_err(|e| ApiError::SerializationError(e.to_string()))?;
            endpoint = endpoint.query("filters", filters);
        }
        self.client.send(endpoint)
    }

    pub fn view(&self, id: u64) -> Result<Outcome> {
        self.client.send(Endpoint::get(format!("{ENDPOINT}/{id}")))
    }

    pub fn create(&self, fields: impl Into<Fields>) -> Result<Outcome> {
        let payload = build_payload(&WORK_PACKAGE_FIELDS, &fields.into());
        self.client.send(Endpoint::post(ENDPOINT).json(payload))
    }

    /// The server rejects updates without the current `lock_version`.
    pub fn update(&self, id: u64, fields: impl Into<Fields>) -> Result<Outcome> {
        let payload = build_payload(&WORK_PACKAGE_FIELDS, &fields.into());
        self.client
            .send(Endpoint::patch(format!("{ENDPOINT}/{id}")).json(payload))
    }

    pub fn delete(&self, id: u64) -> Result<Outcome> {
        self.client.send(Endpoint::delete(format!("{ENDPOINT}/{id}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use url::Url;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpMethod;
    use crate::test_support::RecordingTransport;
    use crate::types::{Links, WorkPackageFields};

    fn setup(transport: &RecordingTransport) -> Client {
        Client::with_transport(ClientConfig::new("http://localhost:3000", "secret"), transport.clone())
            .unwrap()
    }

    #[test]
    fn list_without_filter_has_no_query() {
        let transport = RecordingTransport::ok(json!({"_type": "Collection"}));
        setup(&transport).work_packages().list(None).unwrap();

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.full_url(), "http://localhost:3000/api/v3/work_packages");
    }

    #[test]
    fn list_with_project_encodes_filters() {
        let transport = RecordingTransport::ok(json!({"_type": "Collection"}));
        setup(&transport).work_packages().list(Some(7u64.into())).unwrap();

        let req = transport.last_request();
        let url = Url::parse(&req.full_url()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "filters");
        let filters: Value = serde_json::from_str(&pairs[0].1).unwrap();
        assert_eq!(filters, json!([{"project": {"operator": "=", "values": 7}}]));
    }

    #[test]
    fn list_with_identifier_keeps_it_textual() {
        let transport = RecordingTransport::ok(json!({"_type": "Collection"}));
        setup(&transport).work_packages().list(Some("apollo".into())).unwrap();

        let filters: Value = serde_json::from_str(&transport.last_request().query[0].1).unwrap();
        assert_eq!(filters[0]["project"]["values"], "apollo");
    }

    #[test]
    fn create_posts_mapped_payload() {
        let transport = RecordingTransport::ok(json!({"id": 1}));
        let fields = Fields::new()
            .with("subject", "Test")
            .with("percentage_done", 50)
            .with("bogus_field", "x");
        setup(&transport).work_packages().create(fields).unwrap();

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/v3/work_packages");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"subject": "Test", "percentageDone": 50}));
    }

    #[test]
    fn create_from_record_sends_links() {
        let transport = RecordingTransport::ok(json!({"id": 1}));
        let record = WorkPackageFields {
            subject: Some("Linked".to_string()),
            links: Some(Links::new().project(3u64).work_package_type(1)),
            ..Default::default()
        };
        setup(&transport).work_packages().create(record).unwrap();

        let body: Value = serde_json::from_str(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "_links": {
                    "project": {"href": "/api/v3/projects/3"},
                    "type": {"href": "/api/v3/types/1"},
                },
                "subject": "Linked",
            })
        );
    }

    #[test]
    fn update_patches_single_resource() {
        let transport = RecordingTransport::ok(json!({"id": 4}));
        let record = WorkPackageFields {
            percentage_done: Some(80),
            lock_version: Some(2),
            ..Default::default()
        };
        setup(&transport).work_packages().update(4, record).unwrap();

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:3000/api/v3/work_packages/4");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"percentageDone": 80, "lockVersion": 2}));
    }

    #[test]
    fn delete_returns_empty() {
        let transport = RecordingTransport::no_content();
        let outcome = setup(&transport).work_packages().delete(9).unwrap();
        assert!(outcome.is_empty());

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/api/v3/work_packages/9");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }
}
