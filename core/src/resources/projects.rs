use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::fields::{build_payload, Fields, PROJECT_FIELDS};
use crate::normalize::Outcome;
use crate::types::ProjectId;

const ENDPOINT: &str = "projects";

/// `projects` collection. Ids may be numeric or the project identifier.
#[derive(Debug, Clone, Copy)]
pub struct Projects<'a> {
    client: &'a Client,
}

impl<'a> Projects<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Outcome> {
        self.client.send(Endpoint::get(ENDPOINT))
    }

    pub fn view(&self, id: impl Into<ProjectId>) -> Result<Outcome> {
        self.client
            .send(Endpoint::get(format!("{ENDPOINT}/{}", id.into())))
    }

    pub fn create(&self, fields: impl Into<Fields>) -> Result<Outcome> {
        let payload = build_payload(&PROJECT_FIELDS, &fields.into());
        self.client.send(Endpoint::post(ENDPOINT).json(payload))
    }

    pub fn update(&self, id: impl Into<ProjectId>, fields: impl Into<Fields>) -> Result<Outcome> {
        let payload = build_payload(&PROJECT_FIELDS, &fields.into());
        self.client
            .send(Endpoint::patch(format!("{ENDPOINT}/{}", id.into())).json(payload))
    }

    pub fn delete(&self, id: impl Into<ProjectId>) -> Result<Outcome> {
        self.client
            .send(Endpoint::delete(format!("{ENDPOINT}/{}", id.into())))
    }

    /// Work package types enabled in the project.
    pub fn list_types(&self, id: impl Into<ProjectId>) -> Result<Outcome> {
        self.client
            .send(Endpoint::get(format!("{ENDPOINT}/{}/types", id.into())))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpMethod;
    use crate::test_support::RecordingTransport;
    use crate::types::{Formattable, ProjectFields};

    fn setup(transport: &RecordingTransport) -> Client {
        Client::with_transport(ClientConfig::new("http://localhost:3000", "secret"), transport.clone())
            .unwrap()
    }

    #[test]
    fn list_and_view_paths() {
        let transport = RecordingTransport::ok(json!({}));
        let client = setup(&transport);
        client.projects().list().unwrap();
        client.projects().view(12u64).unwrap();
        client.projects().view("apollo").unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:3000/api/v3/projects",
                "http://localhost:3000/api/v3/projects/12",
                "http://localhost:3000/api/v3/projects/apollo",
            ]
        );
    }

    #[test]
    fn identifier_is_encoded_into_a_single_segment() {
        let transport = RecordingTransport::ok(json!({}));
        let client = setup(&transport);
        client.projects().view("team a/b?").unwrap();
        client.projects().list_types("team a/b?").unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://localhost:3000/api/v3/projects/team%20a%2Fb%3F");
        assert_eq!(
            requests[1].url,
            "http://localhost:3000/api/v3/projects/team%20a%2Fb%3F/types"
        );
        assert!(requests[0].query.is_empty());
    }

    #[test]
    fn list_types_uses_nested_path() {
        let transport = RecordingTransport::ok(json!({"_type": "Collection"}));
        setup(&transport).projects().list_types(5u64).unwrap();

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/v3/projects/5/types");
    }

    #[test]
    fn create_maps_status_explanation() {
        let transport = RecordingTransport::ok(json!({"id": 1}));
        let record = ProjectFields {
            name: Some("Apollo".to_string()),
            identifier: Some("apollo".to_string()),
            status_explanation: Some(Formattable::markdown("On track")),
            ..Default::default()
        };
        setup(&transport).projects().create(record).unwrap();

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Apollo",
                "identifier": "apollo",
                "statusExplanation": {"format": "markdown", "raw": "On track"},
            })
        );
    }

    #[test]
    fn update_drops_work_package_fields() {
        let transport = RecordingTransport::ok(json!({"id": 1}));
        let fields = Fields::new().with("name", "Renamed").with("subject", "not a project field");
        setup(&transport).projects().update(1u64, fields).unwrap();

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:3000/api/v3/projects/1");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Renamed"}));
    }

    #[test]
    fn delete_returns_empty() {
        let transport = RecordingTransport::no_content();
        let outcome = setup(&transport).projects().delete("apollo").unwrap();
        assert!(outcome.is_empty());
        assert_eq!(transport.last_request().method, HttpMethod::Delete);
    }
}
