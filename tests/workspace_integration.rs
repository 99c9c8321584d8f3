//! Workspace controller driven through the HTTP learning API.

mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use learnmap::config::AuthFailurePolicy;
use learnmap::workspace::{
    LOGIN_REQUIRED_MESSAGE, MISSING_MATERIALS_MESSAGE, MISSING_TITLE_MESSAGE,
};
use learnmap::{HttpLearningApi, LearningApi, Workspace, WorkspaceView};

use common::{memory_gateway, pair};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn workspace_for(server: &MockServer, policy: AuthFailurePolicy) -> Workspace {
    let (gateway, _) = memory_gateway(&server.uri(), Some(pair("tok", Some("ref"))));
    let api: Arc<dyn LearningApi> = Arc::new(HttpLearningApi::new(gateway));
    Workspace::new(api, policy)
}

async fn mount_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/materials/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "filename": "algebra.pdf", "status": "READY"},
            {"id": 2, "filename": "calculus.pdf", "status": "READY"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/learning/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "title": "Existing", "material_count": 1, "prerequisite_count": 3}
        ])))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Initial load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_initial_load_unauthorized_materials_shows_login_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/materials/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"detail":"Not authenticated"}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/learning/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut ws = workspace_for(&server, AuthFailurePolicy::InitialLoadOnly);
    ws.initial_load().await;

    assert_eq!(ws.view(), WorkspaceView::AuthError);
    assert_eq!(ws.auth_error(), Some(LOGIN_REQUIRED_MESSAGE));
    assert!(ws.materials().is_empty());
}

#[tokio::test]
async fn test_initial_load_populates_lists() {
    let server = MockServer::start().await;
    mount_lists(&server).await;

    let mut ws = workspace_for(&server, AuthFailurePolicy::Everywhere);
    ws.initial_load().await;

    assert_eq!(ws.view(), WorkspaceView::Ready);
    assert_eq!(ws.materials().len(), 2);
    assert_eq!(ws.sessions()[0].prerequisite_count, 3);
}

// ---------------------------------------------------------------------------
// Session creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_session_validation_sends_no_request() {
    let server = MockServer::start().await;
    mount_lists(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/learning/sessions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut ws = workspace_for(&server, AuthFailurePolicy::Everywhere);
    ws.initial_load().await;

    ws.set_title("   ");
    ws.toggle_material(1);
    ws.create_session().await;
    assert_eq!(ws.form_error(), Some(MISSING_TITLE_MESSAGE));

    ws.set_title("Calculus");
    ws.toggle_material(1);
    ws.create_session().await;
    assert_eq!(ws.form_error(), Some(MISSING_MATERIALS_MESSAGE));
}

#[tokio::test]
async fn test_create_session_activates_and_resets_form() {
    let server = MockServer::start().await;
    mount_lists(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/learning/sessions"))
        .and(body_json(json!({
            "title": "Calculus",
            "objective": "Pass the exam",
            "material_ids": [1, 2]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "title": "Calculus",
            "objective": "Pass the exam",
            "materials": [
                {"id": 1, "filename": "algebra.pdf", "status": "READY"},
                {"id": 2, "filename": "calculus.pdf", "status": "READY"}
            ],
            "prerequisites": [
                {"id": 100, "name": "Functions", "parent_id": null},
                {"id": 101, "name": "Limits", "parent_id": 100},
                {"id": 102, "name": "Derivatives", "parent_id": 101}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut ws = workspace_for(&server, AuthFailurePolicy::Everywhere);
    ws.initial_load().await;

    ws.set_title("Calculus");
    ws.set_objective("Pass the exam");
    ws.toggle_material(2);
    ws.toggle_material(1);
    ws.create_session().await;

    assert!(ws.form_error().is_none());
    assert_eq!(ws.active_session().map(|s| s.id), Some(9));
    assert_eq!(ws.forest().len(), 1);
    assert_eq!(
        ws.forest()[0].children[0].children[0].node.name,
        "Derivatives"
    );
    assert!(ws.form().title.is_empty());
    assert!(ws.selected_material_ids().is_empty());
}

#[tokio::test]
async fn test_create_session_server_error_keeps_form() {
    let server = MockServer::start().await;
    mount_lists(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/learning/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Material 2 is not ready"))
        .mount(&server)
        .await;

    let mut ws = workspace_for(&server, AuthFailurePolicy::Everywhere);
    ws.initial_load().await;

    ws.set_title("Calculus");
    ws.toggle_material(2);
    ws.create_session().await;

    assert_eq!(ws.form_error(), Some("Material 2 is not ready"));
    assert_eq!(ws.form().title, "Calculus");
    assert!(ws.is_selected(2));
    assert_eq!(ws.view(), WorkspaceView::Ready);
}

// ---------------------------------------------------------------------------
// Auth failure policy after the initial load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_select_unauthorized_with_initial_load_only_stays_ready() {
    let server = MockServer::start().await;
    mount_lists(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/learning/sessions/5"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let mut ws = workspace_for(&server, AuthFailurePolicy::InitialLoadOnly);
    ws.initial_load().await;
    ws.select_session(5).await;

    assert_eq!(ws.view(), WorkspaceView::Ready);
    assert_eq!(ws.form_error(), Some("expired"));
}

#[tokio::test]
async fn test_select_unauthorized_everywhere_redirects() {
    let server = MockServer::start().await;
    mount_lists(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/learning/sessions/5"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let mut ws = workspace_for(&server, AuthFailurePolicy::Everywhere);
    ws.initial_load().await;
    ws.select_session(5).await;

    assert_eq!(ws.view(), WorkspaceView::AuthError);
}
