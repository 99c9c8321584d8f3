//! Test utilities for Learnmap
//!
//! Fixture builders for the wire types and [`FakeLearningApi`], an
//! in-process [`LearningApi`] that records what the workspace asked for.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::LearningApi;
use crate::error::{LearnmapError, Result};
use crate::models::{
    Material, MaterialStatus, NewSessionRequest, PrerequisiteNode, SessionDetail, SessionSummary,
};

/// A ready material.
pub fn material(id: i64, filename: &str) -> Material {
    Material {
        id,
        filename: filename.to_string(),
        status: MaterialStatus::Ready,
    }
}

/// A session summary with one material and no nodes.
pub fn summary(id: i64, title: &str) -> SessionSummary {
    SessionSummary {
        id,
        title: title.to_string(),
        objective: None,
        material_count: 1,
        prerequisite_count: 0,
    }
}

/// A prerequisite node with only the structural fields set.
pub fn node(id: i64, name: &str, parent_id: Option<i64>) -> PrerequisiteNode {
    PrerequisiteNode {
        id,
        name: name.to_string(),
        description: None,
        parent_id,
        wikipedia_summary: None,
        wikipedia_url: None,
    }
}

/// A session detail with the given nodes and one material.
pub fn detail(id: i64, title: &str, prerequisites: Vec<PrerequisiteNode>) -> SessionDetail {
    SessionDetail {
        id,
        title: title.to_string(),
        objective: None,
        materials: vec![material(1, "notes.pdf")],
        prerequisites,
    }
}

fn failure(status: u16) -> anyhow::Error {
    let body = match status {
        401 => r#"{"detail":"Not authenticated"}"#,
        404 => "Learning session not found",
        _ => "server exploded",
    };
    LearnmapError::Request {
        status,
        body: body.to_string(),
    }
    .into()
}

/// In-process [`LearningApi`] with canned responses.
#[derive(Debug, Default)]
pub struct FakeLearningApi {
    materials: Vec<Material>,
    sessions: Vec<SessionSummary>,
    details: Mutex<HashMap<i64, SessionDetail>>,
    created: Option<SessionDetail>,
    materials_failure: Option<u16>,
    sessions_failure: Mutex<Option<u16>>,
    detail_failure: Option<u16>,
    create_failure: Option<u16>,
    create_requests: Mutex<Vec<NewSessionRequest>>,
    detail_calls: AtomicUsize,
    session_list_calls: AtomicUsize,
}

impl FakeLearningApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_materials(mut self, materials: Vec<Material>) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_sessions(mut self, sessions: Vec<SessionSummary>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_detail(self, detail: SessionDetail) -> Self {
        self.set_detail(detail);
        self
    }

    /// Response for `create_session`; defaults to an empty session echoing the title.
    pub fn with_created(mut self, detail: SessionDetail) -> Self {
        self.created = Some(detail);
        self
    }

    pub fn fail_materials(mut self, status: u16) -> Self {
        self.materials_failure = Some(status);
        self
    }

    pub fn fail_sessions(self, status: u16) -> Self {
        self.set_sessions_failure(Some(status));
        self
    }

    /// Change how `list_sessions` answers from now on.
    pub fn set_sessions_failure(&self, status: Option<u16>) {
        *self.sessions_failure.lock().expect("sessions failure lock") = status;
    }

    pub fn fail_detail(mut self, status: u16) -> Self {
        self.detail_failure = Some(status);
        self
    }

    pub fn fail_create(mut self, status: u16) -> Self {
        self.create_failure = Some(status);
        self
    }

    /// Replace the detail served for `detail.id`.
    pub fn set_detail(&self, detail: SessionDetail) {
        self.details
            .lock()
            .expect("details lock")
            .insert(detail.id, detail);
    }

    pub fn create_requests(&self) -> Vec<NewSessionRequest> {
        self.create_requests.lock().expect("requests lock").clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn session_list_calls(&self) -> usize {
        self.session_list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LearningApi for FakeLearningApi {
    async fn list_materials(&self) -> Result<Vec<Material>> {
        match self.materials_failure {
            Some(status) => Err(failure(status)),
            None => Ok(self.materials.clone()),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        self.session_list_calls.fetch_add(1, Ordering::SeqCst);
        let failure_status = *self.sessions_failure.lock().expect("sessions failure lock");
        match failure_status {
            Some(status) => Err(failure(status)),
            None => Ok(self.sessions.clone()),
        }
    }

    async fn get_session(&self, id: i64) -> Result<SessionDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.detail_failure {
            return Err(failure(status));
        }
        self.details
            .lock()
            .expect("details lock")
            .get(&id)
            .cloned()
            .ok_or_else(|| failure(404))
    }

    async fn create_session(&self, request: &NewSessionRequest) -> Result<SessionDetail> {
        self.create_requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        if let Some(status) = self.create_failure {
            return Err(failure(status));
        }
        Ok(self
            .created
            .clone()
            .unwrap_or_else(|| detail(100, &request.title, Vec::new())))
    }
}
