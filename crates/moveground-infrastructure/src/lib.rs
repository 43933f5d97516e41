//! Infrastructure adapters for Moveground: HTTP clients for the playground
//! and gist services, durable key/value storage, paths and configuration.

pub mod config_service;
pub mod github_gist_client;
pub mod paths;
pub mod playground_api;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::github_gist_client::GithubGistClient;
pub use crate::paths::MovegroundPaths;
pub use crate::playground_api::HttpPlaygroundApi;
pub use crate::storage::{FileKeyValueStore, InMemoryKeyValueStore};
