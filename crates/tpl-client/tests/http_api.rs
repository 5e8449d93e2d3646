//! HTTP binding against an in-process server

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::json;
use tpl_client::{ApiError, ClientConfig, HttpTemplateApi, TemplateApi, SESSION_TOKEN_HEADER};
use tpl_sdk::{Template, TemplateVersion, WorkspaceResource};

const TOKEN: &str = "secret-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        == Some(TOKEN)
}

async fn template(Path((org, name)): Path<(String, String)>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized." })),
        )
            .into_response();
    }
    if name == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("No template found with name {name:?}.") })),
        )
            .into_response();
    }
    Json(Template {
        id: "t1".to_string(),
        organization_id: org,
        name,
        active_version_id: "v1".to_string(),
        workspace_owner_count: 2,
        ..Template::default()
    })
    .into_response()
}

async fn version(Path(id): Path<String>) -> Json<TemplateVersion> {
    Json(TemplateVersion {
        id,
        template_id: Some("t1".to_string()),
        name: "elegant_turing".to_string(),
        ..TemplateVersion::default()
    })
}

async fn resources(Path(id): Path<String>) -> Json<Vec<WorkspaceResource>> {
    Json(vec![WorkspaceResource {
        id: "r1".to_string(),
        job_id: format!("job-{id}"),
        resource_type: "docker_container".to_string(),
        name: "workspace".to_string(),
        ..WorkspaceResource::default()
    }])
}

async fn versions(Path(id): Path<String>) -> Response {
    if id == "garbled" {
        return "not json".into_response();
    }
    Json(vec![
        TemplateVersion {
            id: "v1".to_string(),
            template_id: Some(id.clone()),
            ..TemplateVersion::default()
        },
        TemplateVersion {
            id: "v0".to_string(),
            template_id: Some(id),
            ..TemplateVersion::default()
        },
    ])
    .into_response()
}

async fn daus() -> Json<serde_json::Value> {
    Json(json!({
        "entries": [
            { "date": "2022-08-01T00:00:00Z", "amount": 3 },
            { "date": "2022-08-02T00:00:00Z", "amount": 7 }
        ]
    }))
}

async fn remove(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "busy" => (
            StatusCode::PRECONDITION_FAILED,
            Json(json!({
                "message": "All workspaces must be deleted before a template can be removed.",
                "detail": "1 workspace uses this template"
            })),
        )
            .into_response(),
        "plain" => (StatusCode::INTERNAL_SERVER_ERROR, "").into_response(),
        _ => Json(json!({ "message": "Template has been deleted!" })).into_response(),
    }
}

async fn serve() -> String {
    let router = Router::new()
        .route("/api/v2/organizations/{org}/templates/{name}", get(template))
        .route("/api/v2/templateversions/{id}", get(version))
        .route("/api/v2/templateversions/{id}/resources", get(resources))
        .route("/api/v2/templates/{id}/versions", get(versions))
        .route("/api/v2/templates/{id}/daus", get(daus))
        .route("/api/v2/templates/{id}", delete(remove));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn client() -> HttpTemplateApi {
    let url = serve().await;
    HttpTemplateApi::new(ClientConfig::new(url).with_session_token(TOKEN)).unwrap()
}

fn loaded(id: &str) -> Template {
    Template {
        id: id.to_string(),
        active_version_id: "v1".to_string(),
        ..Template::default()
    }
}

#[tokio::test]
async fn fetches_template_by_org_and_name() {
    let api = client().await;

    let template = api.fetch_template("org1", "docker").await.unwrap();

    assert_eq!(template.id, "t1");
    assert_eq!(template.organization_id, "org1");
    assert_eq!(template.name, "docker");
    assert_eq!(template.workspace_owner_count, 2);
}

#[tokio::test]
async fn escapes_path_segments() {
    let api = client().await;

    let template = api.fetch_template("org 1", "my template").await.unwrap();

    assert_eq!(template.organization_id, "org 1");
    assert_eq!(template.name, "my template");
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let api = HttpTemplateApi::new(ClientConfig::new(serve().await)).unwrap();

    let err = api.fetch_template("org1", "docker").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Unauthorized.");
}

#[tokio::test]
async fn not_found_carries_message() {
    let api = client().await;

    let err = api.fetch_template("org1", "missing").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No template found with name \"missing\".");
}

#[tokio::test]
async fn fetches_every_detail() {
    let api = client().await;
    let template = loaded("t1");

    let active = api.fetch_active_version(&template).await.unwrap();
    assert_eq!(active.id, "v1");
    assert_eq!(active.name, "elegant_turing");

    let resources = api.fetch_template_resources(&template).await.unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].job_id, "job-v1");
    assert_eq!(resources[0].resource_type, "docker_container");

    let versions = api.fetch_template_versions(&template).await.unwrap();
    assert_eq!(
        versions.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
        vec!["v1", "v0"]
    );

    let daus = api.fetch_template_daus(&template).await.unwrap();
    assert_eq!(daus.entries.len(), 2);
    assert_eq!(daus.peak().map(|e| e.amount), Some(7));
}

#[tokio::test]
async fn undecodable_body_is_decode_error() {
    let api = client().await;

    let err = api.fetch_template_versions(&loaded("garbled")).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn delete_echoes_template() {
    let api = client().await;
    let template = loaded("t1");

    let deleted = api.delete_template(&template).await.unwrap();

    assert_eq!(deleted, template);
}

#[tokio::test]
async fn delete_rejection_keeps_message_and_detail() {
    let api = client().await;

    let err = api.delete_template(&loaded("busy")).await.unwrap_err();

    assert_eq!(err.status(), Some(412));
    assert_eq!(
        err.to_string(),
        "All workspaces must be deleted before a template can be removed."
    );
    assert_eq!(err.detail(), Some("1 workspace uses this template"));
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status() {
    let api = client().await;

    let err = api.delete_template(&loaded("plain")).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "500 Internal Server Error");
}
