//! Session workspace controller
//!
//! [`Workspace`] owns everything the learning workspace shows: the material
//! list, the session list, the material selection for a new session, the
//! active session and its prerequisite forest, and the error banners.
//!
//! # Lifecycle
//!
//! ```text
//! Unauthenticated --initial_load--> Loading --+--> Ready <--+ refresh / select / create
//!                                             |      |______|
//!                                             +--> AuthError (terminal)
//! ```
//!
//! Every operation catches its own failure and records it in the state:
//! authentication failures move the workspace to [`WorkspaceView::AuthError`]
//! (subject to [`AuthFailurePolicy`]), anything else lands in
//! [`Workspace::form_error`] and leaves the previous data in place.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::LearningApi;
use crate::auth::{AuthService, LogoutOutcome};
use crate::config::AuthFailurePolicy;
use crate::error::{self, LearnmapError, Result};
use crate::models::{Material, NewSessionRequest, SessionDetail, SessionSummary};
use crate::tree::{build_forest, TreeNode};

/// Message shown in place of the workspace once authentication fails.
pub const LOGIN_REQUIRED_MESSAGE: &str = "You need to login to view your learning workspace.";
pub const MISSING_TITLE_MESSAGE: &str = "Give your session a name.";
pub const MISSING_MATERIALS_MESSAGE: &str = "Select at least one material.";

/// Which screen the workspace is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceView {
    Unauthenticated,
    /// Set only inside [`Workspace::initial_load`]. Operations take
    /// `&mut self`, so callers never see this between calls.
    Loading,
    Ready,
    AuthError,
}

/// Fields of the "create session" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionForm {
    pub title: String,
    pub objective: String,
}

impl SessionForm {
    /// Validate the form against a material selection and build the request.
    ///
    /// An objective that is blank after trimming is sent as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`LearnmapError::Validation`] with [`MISSING_TITLE_MESSAGE`]
    /// or [`MISSING_MATERIALS_MESSAGE`].
    pub fn to_request(&self, material_ids: &BTreeSet<i64>) -> Result<NewSessionRequest> {
        if self.title.trim().is_empty() {
            return Err(LearnmapError::Validation(MISSING_TITLE_MESSAGE.to_string()).into());
        }
        if material_ids.is_empty() {
            return Err(LearnmapError::Validation(MISSING_MATERIALS_MESSAGE.to_string()).into());
        }

        let objective = if self.objective.trim().is_empty() {
            None
        } else {
            Some(self.objective.clone())
        };

        Ok(NewSessionRequest {
            title: self.title.clone(),
            objective,
            material_ids: material_ids.iter().copied().collect(),
        })
    }
}

/// Workspace state and the operations that change it.
pub struct Workspace {
    api: Arc<dyn LearningApi>,
    auth_policy: AuthFailurePolicy,
    view: WorkspaceView,
    materials: Vec<Material>,
    sessions: Vec<SessionSummary>,
    selected_material_ids: BTreeSet<i64>,
    active_session: Option<SessionDetail>,
    forest: Vec<TreeNode>,
    form: SessionForm,
    auth_error: Option<String>,
    form_error: Option<String>,
    loading: bool,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("view", &self.view)
            .field("materials", &self.materials.len())
            .field("sessions", &self.sessions.len())
            .field("selected_material_ids", &self.selected_material_ids)
            .field("active_session", &self.active_session.as_ref().map(|s| s.id))
            .field("form_error", &self.form_error)
            .finish()
    }
}

impl Workspace {
    /// New, unloaded workspace.
    pub fn new(api: Arc<dyn LearningApi>, auth_policy: AuthFailurePolicy) -> Self {
        Self {
            api,
            auth_policy,
            view: WorkspaceView::Unauthenticated,
            materials: Vec::new(),
            sessions: Vec::new(),
            selected_material_ids: BTreeSet::new(),
            active_session: None,
            forest: Vec::new(),
            form: SessionForm::default(),
            auth_error: None,
            form_error: None,
            loading: false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn view(&self) -> WorkspaceView {
        self.view
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn active_session(&self) -> Option<&SessionDetail> {
        self.active_session.as_ref()
    }

    /// Prerequisite forest of the active session; empty when none is active.
    pub fn forest(&self) -> &[TreeNode] {
        &self.forest
    }

    pub fn form(&self) -> &SessionForm {
        &self.form
    }

    pub fn auth_error(&self) -> Option<&str> {
        self.auth_error.as_deref()
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// `true` only while [`Workspace::create_session`] awaits the server.
    ///
    /// Operations take `&mut self`, so between calls this is always `false`.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_selected(&self, material_id: i64) -> bool {
        self.selected_material_ids.contains(&material_id)
    }

    /// Selected material ids in ascending order.
    pub fn selected_material_ids(&self) -> Vec<i64> {
        self.selected_material_ids.iter().copied().collect()
    }

    // -----------------------------------------------------------------------
    // Form editing
    // -----------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    pub fn set_objective(&mut self, objective: impl Into<String>) {
        self.form.objective = objective.into();
    }

    /// Add `material_id` to the selection, or remove it if already selected.
    ///
    /// Returns whether the material is selected afterwards.
    pub fn toggle_material(&mut self, material_id: i64) -> bool {
        if !self.selected_material_ids.remove(&material_id) {
            self.selected_material_ids.insert(material_id);
            return true;
        }
        false
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Populate materials and sessions, fetched concurrently.
    ///
    /// Both lists are replaced only if both fetches succeed.
    pub async fn initial_load(&mut self) {
        if self.view == WorkspaceView::AuthError {
            return;
        }
        self.form_error = None;
        self.view = WorkspaceView::Loading;

        let api = Arc::clone(&self.api);
        let result = futures::try_join!(api.list_materials(), api.list_sessions());

        // Loading only ends in AuthError or Ready.
        match result {
            Ok((materials, sessions)) => {
                tracing::info!(
                    "Loaded {} material(s) and {} session(s)",
                    materials.len(),
                    sessions.len()
                );
                self.materials = materials;
                self.sessions = sessions;
                self.view = WorkspaceView::Ready;
            }
            Err(e) => {
                self.view = WorkspaceView::Ready;
                self.record_failure(e, true);
            }
        }
    }

    /// Make session `id` the active session and rebuild its forest.
    ///
    /// On failure the previously active session stays in place.
    pub async fn select_session(&mut self, id: i64) {
        if !self.accepts_operations() {
            return;
        }
        self.form_error = None;

        match self.api.get_session(id).await {
            Ok(detail) => self.activate(detail),
            Err(e) => self.record_failure(e, false),
        }
    }

    /// Validate the form and create a session from the current selection.
    ///
    /// Validation runs before any request. On success the new session
    /// becomes active, the form and selection are cleared and the session
    /// list is refreshed. On failure the form is left untouched.
    pub async fn create_session(&mut self) {
        if !self.accepts_operations() {
            return;
        }
        self.form_error = None;

        let request = match self.new_session_request() {
            Ok(request) => request,
            Err(e) => {
                self.form_error = Some(e.to_string());
                return;
            }
        };

        self.loading = true;
        let created = self.api.create_session(&request).await;
        self.loading = false;

        match created {
            Ok(detail) => {
                tracing::info!("Created session {} ({})", detail.id, detail.title);
                self.activate(detail);
                self.form = SessionForm::default();
                self.selected_material_ids.clear();
                self.refresh_sessions().await;
            }
            Err(e) => self.record_failure(e, false),
        }
    }

    /// Re-fetch both lists and, if a session is active, its detail.
    pub async fn refresh(&mut self) {
        if !self.accepts_operations() {
            return;
        }
        self.form_error = None;

        let api = Arc::clone(&self.api);
        match futures::try_join!(api.list_materials(), api.list_sessions()) {
            Ok((materials, sessions)) => {
                self.materials = materials;
                self.sessions = sessions;
            }
            Err(e) => {
                self.record_failure(e, false);
                return;
            }
        }

        if let Some(id) = self.active_session.as_ref().map(|s| s.id) {
            match self.api.get_session(id).await {
                Ok(detail) => self.activate(detail),
                Err(e) => self.record_failure(e, false),
            }
        }
    }

    /// Log out through `auth` and drop all workspace data.
    ///
    /// The local credential is cleared even when the server-side
    /// invalidation fails; only a local storage failure is returned.
    pub async fn logout(&mut self, auth: &AuthService) -> Result<LogoutOutcome> {
        let outcome = auth.logout().await;
        let api = Arc::clone(&self.api);
        *self = Self::new(api, self.auth_policy);
        outcome
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn accepts_operations(&self) -> bool {
        match self.view {
            WorkspaceView::Ready => true,
            other => {
                tracing::debug!("Ignoring workspace operation in {:?} view", other);
                false
            }
        }
    }

    fn new_session_request(&self) -> Result<NewSessionRequest> {
        self.form.to_request(&self.selected_material_ids)
    }

    async fn refresh_sessions(&mut self) {
        match self.api.list_sessions().await {
            Ok(sessions) => self.sessions = sessions,
            Err(e) => self.record_failure(e, false),
        }
    }

    fn activate(&mut self, detail: SessionDetail) {
        self.forest = build_forest(&detail.prerequisites);
        tracing::debug!(
            "Session {} active with {} root node(s)",
            detail.id,
            self.forest.len()
        );
        self.active_session = Some(detail);
    }

    fn record_failure(&mut self, err: anyhow::Error, initial_load: bool) {
        let redirect = error::is_auth_failure(&err)
            && (initial_load || self.auth_policy == AuthFailurePolicy::Everywhere);

        if redirect {
            tracing::warn!("Authentication failed: {}", err);
            self.view = WorkspaceView::AuthError;
            self.auth_error = Some(LOGIN_REQUIRED_MESSAGE.to_string());
            return;
        }

        tracing::warn!("Workspace request failed: {:#}", err);
        self.form_error = Some(failure_message(&err));
    }
}

/// Text shown inline for a failed request: the server's body when it sent
/// one, otherwise the error itself.
fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LearnmapError>() {
        Some(LearnmapError::Request { body, .. }) if !body.trim().is_empty() => body.clone(),
        Some(LearnmapError::Request { status, .. }) => format!("Request failed with HTTP {}", status),
        _ => format!("{:#}", err),
    }
}
