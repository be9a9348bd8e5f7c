//! In-memory stand-in for the parts of the OpenProject API v3 the client
//! talks to.
//!
//! Responses use `application/hal+json`, collections are wrapped in
//! `{"_type":"Collection","_embedded":{"elements":[...]}}`, and every route
//! under `/api/v3` requires Basic authentication as `apikey:<token>`.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use base64::prelude::*;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_API_KEY: &str = "mock-api-key";

const HAL_JSON: &str = "application/hal+json; charset=utf-8";
const ERROR_URN: &str = "urn:openproject-org:api:v3:errors";

#[derive(Default)]
pub struct Store {
    work_packages: BTreeMap<u64, Value>,
    projects: BTreeMap<u64, Value>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_project(&self, key: &str) -> Option<&Value> {
        self.projects.values().find(|p| {
            p["identifier"].as_str() == Some(key)
                || p["id"].as_u64().is_some_and(|id| id.to_string() == key)
        })
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Arc::new(RwLock::new(Store::default())),
    };
    let api = Router::new()
        .route("/work_packages", get(list_work_packages).post(create_work_package))
        .route(
            "/work_packages/{id}",
            get(get_work_package).patch(update_work_package).delete(delete_work_package),
        )
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/projects/{id}/types", get(list_project_types))
        .route("/statuses", get(list_statuses))
        .route("/statuses/{id}", get(get_status))
        .route("/types", get(list_types))
        .route("/types/{id}", get(get_type))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));
    Router::new().nest("/api/v3", api).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_key(listener, DEFAULT_API_KEY).await
}

pub async fn run_with_key(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn hal(status: StatusCode, body: Value) -> Response {
    (status, [(header::CONTENT_TYPE, HAL_JSON)], body.to_string()).into_response()
}

fn error(status: StatusCode, identifier: &str, message: &str) -> Response {
    hal(
        status,
        json!({
            "_type": "Error",
            "errorIdentifier": format!("{ERROR_URN}:{identifier}"),
            "message": message,
        }),
    )
}

fn not_found() -> Response {
    error(
        StatusCode::NOT_FOUND,
        "NotFound",
        "The requested resource could not be found.",
    )
}

fn collection(elements: Vec<Value>) -> Value {
    json!({
        "_type": "Collection",
        "total": elements.len(),
        "count": elements.len(),
        "_embedded": { "elements": elements },
    })
}

fn invalid(message: &str, attribute: &str) -> Response {
    hal(
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({
            "_type": "Error",
            "errorIdentifier": format!("{ERROR_URN}:PropertyConstraintViolation"),
            "message": message,
            "errors": [{ "attribute": attribute }],
        }),
    )
}

fn parse_body(body: &str) -> Result<Map<String, Value>, Response> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(error(
            StatusCode::BAD_REQUEST,
            "InvalidRequestBody",
            "The request body was not a single JSON object.",
        )),
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Basic {}", BASE64_STANDARD.encode(format!("apikey:{}", state.api_key)));
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if provided != Some(expected.as_str()) {
        tracing::debug!(path = %request.uri().path(), "rejecting unauthenticated request");
        return error(
            StatusCode::UNAUTHORIZED,
            "Unauthenticated",
            "You did not provide the correct credentials.",
        );
    }
    next.run(request).await
}

fn require_json(headers: &HeaderMap) -> Result<(), Response> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        Ok(())
    } else {
        Err(error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "TypeNotSupported",
            "Expected CONTENT-TYPE to be (expected value) but got (actual value).",
        ))
    }
}

// ---------------------------------------------------------------------------
// Work packages
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ListQuery {
    filters: Option<String>,
}

/// Project ids selected by a `filters` parameter, or `None` when unfiltered.
fn project_filter(filters: &str, store: &Store) -> Result<Option<Vec<u64>>, Response> {
    let invalid_query = || {
        error(
            StatusCode::BAD_REQUEST,
            "InvalidQuery",
            "Filters is not a valid JSON array of filter objects.",
        )
    };
    let parsed: Vec<Value> = serde_json::from_str(filters).map_err(|_| invalid_query())?;
    let mut selected = None;
    for filter in parsed {
        let Some(project) = filter.get("project") else {
            continue;
        };
        if project["operator"] != "=" {
            return Err(invalid_query());
        }
        let values = match &project["values"] {
            Value::Array(values) => values.clone(),
            Value::Null => return Err(invalid_query()),
            single => vec![single.clone()],
        };
        let ids = values
            .iter()
            .filter_map(|value| {
                let key = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                store.find_project(&key).and_then(|p| p["id"].as_u64())
            })
            .collect();
        selected = Some(ids);
    }
    Ok(selected)
}

fn work_package_project(work_package: &Value) -> Option<u64> {
    work_package["_links"]["project"]["href"]
        .as_str()
        .and_then(|href| href.rsplit('/').next())
        .and_then(|id| id.parse().ok())
}

async fn list_work_packages(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let store = state.db.read().await;
    let projects = match query.filters.as_deref().map(|f| project_filter(f, &store)) {
        Some(Err(response)) => return response,
        Some(Ok(projects)) => projects,
        None => None,
    };
    let elements = store
        .work_packages
        .values()
        .filter(|wp| match &projects {
            Some(ids) => work_package_project(wp).is_some_and(|id| ids.contains(&id)),
            None => true,
        })
        .cloned()
        .collect();
    hal(StatusCode::OK, collection(elements))
}

async fn create_work_package(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    if let Err(response) = require_json(&headers) {
        return response;
    }
    let input = match parse_body(&body) {
        Ok(input) => input,
        Err(response) => return response,
    };
    if input.get("subject").and_then(Value::as_str).map_or(true, str::is_empty) {
        return invalid("Subject can't be blank.", "subject");
    }
    let mut store = state.db.write().await;
    let project_href = input
        .get("_links")
        .and_then(|links| links["project"]["href"].as_str())
        .map(str::to_string);
    let Some(project_href) = project_href else {
        return invalid("Project can't be blank.", "project");
    };
    let project_key = project_href.rsplit('/').next().unwrap_or_default();
    let Some(project_id) = store.find_project(project_key).and_then(|p| p["id"].as_u64()) else {
        return invalid("Project can't be blank.", "project");
    };

    let id = store.next_id();
    let mut work_package = json!({
        "_type": "WorkPackage",
        "id": id,
        "lockVersion": 0,
        "percentageDone": 0,
    });
    merge(&mut work_package, input);
    work_package["_links"]["self"] = json!({ "href": format!("/api/v3/work_packages/{id}") });
    work_package["_links"]["project"] = json!({ "href": format!("/api/v3/projects/{project_id}") });
    store.work_packages.insert(id, work_package.clone());
    hal(StatusCode::CREATED, work_package)
}

async fn get_work_package(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.db.read().await;
    match store.work_packages.get(&id) {
        Some(work_package) => hal(StatusCode::OK, work_package.clone()),
        None => not_found(),
    }
}

async fn update_work_package(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Err(response) = require_json(&headers) {
        return response;
    }
    let input = match parse_body(&body) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let mut store = state.db.write().await;
    let Some(work_package) = store.work_packages.get_mut(&id) else {
        return not_found();
    };
    let current = work_package["lockVersion"].as_u64().unwrap_or_default();
    if input.get("lockVersion").and_then(Value::as_u64) != Some(current) {
        return error(
            StatusCode::CONFLICT,
            "UpdateConflict",
            "Your changes could not be saved, because the work package was changed by someone else in the meantime.",
        );
    }
    if input.get("subject").is_some_and(|s| s.as_str().map_or(true, str::is_empty)) {
        return invalid("Subject can't be blank.", "subject");
    }
    merge(work_package, input);
    work_package["lockVersion"] = json!(current + 1);
    hal(StatusCode::OK, work_package.clone())
}

async fn delete_work_package(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut store = state.db.write().await;
    match store.work_packages.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

/// Copy `input` onto `target`; `_links` relations are merged one by one.
fn merge(target: &mut Value, input: Map<String, Value>) {
    for (key, value) in input {
        match (key.as_str(), value) {
            ("lockVersion" | "id" | "_type", _) => {}
            ("_links", Value::Object(links)) => {
                for (relation, link) in links {
                    target["_links"][relation.as_str()] = link;
                }
            }
            (_, value) => target[key.as_str()] = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

async fn list_projects(State(state): State<AppState>) -> Response {
    let store = state.db.read().await;
    hal(StatusCode::OK, collection(store.projects.values().cloned().collect()))
}

async fn create_project(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    if let Err(response) = require_json(&headers) {
        return response;
    }
    let input = match parse_body(&body) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let Some(name) = input.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) else {
        return invalid("Name can't be blank.", "name");
    };
    let identifier = input
        .get("identifier")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| name.to_lowercase().replace(' ', "-"));

    let mut store = state.db.write().await;
    if store.find_project(&identifier).is_some() {
        return invalid("Identifier has already been taken.", "identifier");
    }
    let id = store.next_id();
    let mut project = json!({
        "_type": "Project",
        "id": id,
        "identifier": identifier,
        "active": true,
        "public": false,
    });
    merge(&mut project, input);
    project["_links"]["self"] = json!({ "href": format!("/api/v3/projects/{id}") });
    store.projects.insert(id, project.clone());
    hal(StatusCode::CREATED, project)
}

async fn get_project(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let store = state.db.read().await;
    match store.find_project(&key) {
        Some(project) => hal(StatusCode::OK, project.clone()),
        None => not_found(),
    }
}

async fn update_project(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Err(response) = require_json(&headers) {
        return response;
    }
    let input = match parse_body(&body) {
        Ok(input) => input,
        Err(response) => return response,
    };
    let mut store = state.db.write().await;
    let Some(id) = store.find_project(&key).and_then(|p| p["id"].as_u64()) else {
        return not_found();
    };
    let Some(project) = store.projects.get_mut(&id) else {
        return not_found();
    };
    merge(project, input);
    hal(StatusCode::OK, project.clone())
}

async fn delete_project(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let mut store = state.db.write().await;
    let Some(id) = store.find_project(&key).and_then(|p| p["id"].as_u64()) else {
        return not_found();
    };
    store.projects.remove(&id);
    store
        .work_packages
        .retain(|_, wp| work_package_project(wp) != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_project_types(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let store = state.db.read().await;
    if store.find_project(&key).is_none() {
        return not_found();
    }
    hal(StatusCode::OK, collection(types()))
}

// ---------------------------------------------------------------------------
// Statuses and types (fixed reference data)
// ---------------------------------------------------------------------------

fn statuses() -> Vec<Value> {
    [(1, "New", false), (7, "In progress", false), (12, "Closed", true)]
        .into_iter()
        .map(|(id, name, closed)| {
            json!({
                "_type": "Status",
                "id": id,
                "name": name,
                "isClosed": closed,
                "_links": { "self": { "href": format!("/api/v3/statuses/{id}"), "title": name } },
            })
        })
        .collect()
}

fn types() -> Vec<Value> {
    [(1, "Task", false), (2, "Milestone", true), (3, "Bug", false)]
        .into_iter()
        .map(|(id, name, milestone)| {
            json!({
                "_type": "Type",
                "id": id,
                "name": name,
                "isMilestone": milestone,
                "_links": { "self": { "href": format!("/api/v3/types/{id}"), "title": name } },
            })
        })
        .collect()
}

async fn list_statuses() -> Response {
    hal(StatusCode::OK, collection(statuses()))
}

async fn get_status(Path(id): Path<u64>) -> Response {
    match statuses().into_iter().find(|s| s["id"] == id) {
        Some(status) => hal(StatusCode::OK, status),
        None => not_found(),
    }
}

async fn list_types() -> Response {
    hal(StatusCode::OK, collection(types()))
}

async fn get_type(Path(id): Path<u64>) -> Response {
    match types().into_iter().find(|t| t["id"] == id) {
        Some(work_package_type) => hal(StatusCode::OK, work_package_type),
        None => not_found(),
    }
}
