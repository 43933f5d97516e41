//! Code payload domain module.
//!
//! # Module Structure
//!
//! - `model`: Request payload and response types for the remote service
//! - `module_name`: Module-name extraction from Move source
//! - `api`: The `PlaygroundApi` trait consumed by the request cache

mod api;
mod model;
mod module_name;

pub use api::PlaygroundApi;
pub use model::{
    BuildOutput, BuildType, CodeRequest, FormatOutput, OperationKind, ShareLink, ShareLinks,
};
pub use module_name::{DEFAULT_MODULE_NAME, ModuleDeclaration, find_module_declaration, module_name};
