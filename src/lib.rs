//! Learnmap - terminal client for a learning workspace
//!
//! This library provides the client side of a learning service: logging in,
//! keeping the issued credential, calling the learning API with it, and
//! turning a session's flat prerequisite list into a tree.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `tree`: Prerequisite forest construction
//! - `credentials`: Credential storage backends (keyring, file, memory)
//! - `gateway`: Authenticated HTTP gateway to the learning service
//! - `api`: Typed learning API on top of the gateway
//! - `auth`: Login, signup and logout
//! - `workspace`: Workspace controller (materials, sessions, form, views)
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```
//! use learnmap::models::PrerequisiteNode;
//! use learnmap::tree::build_forest;
//!
//! let nodes = vec![
//!     PrerequisiteNode {
//!         id: 1,
//!         name: "Algebra".to_string(),
//!         description: None,
//!         parent_id: None,
//!         wikipedia_summary: None,
//!         wikipedia_url: None,
//!     },
//!     PrerequisiteNode {
//!         id: 2,
//!         name: "Calculus".to_string(),
//!         description: None,
//!         parent_id: Some(1),
//!         wikipedia_summary: None,
//!         wikipedia_url: None,
//!     },
//! ];
//!
//! let forest = build_forest(&nodes);
//! assert_eq!(forest.len(), 1);
//! assert_eq!(forest[0].children[0].node.name, "Calculus");
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod models;
pub mod render;
pub mod tree;
pub mod workspace;

// Re-export commonly used types
pub use api::{HttpLearningApi, LearningApi};
pub use auth::{AuthService, LogoutOutcome};
pub use config::Config;
pub use credentials::CredentialStore;
pub use error::{LearnmapError, Result};
pub use gateway::Gateway;
pub use tree::{build_forest, TreeNode};
pub use workspace::{Workspace, WorkspaceView};

#[cfg(test)]
pub mod test_utils;
