//! Module-name extraction from Move source text.
//!
//! Grammar: the `module` keyword at a word boundary, whitespace, then
//! `<address>::<name>` where both parts are ASCII identifiers
//! (`[A-Za-z_][A-Za-z0-9_]*`). The first match wins.
//!
//! The returned value is the address component. The build service creates a
//! package whose name and named address are both the extracted value, so a
//! source declaring `module counter_pkg::counter` must be submitted as
//! `counter_pkg`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback used when the buffer declares no module.
pub const DEFAULT_MODULE_NAME: &str = "temp";

static MODULE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bmodule\s+([A-Za-z_][A-Za-z0-9_]*)::([A-Za-z_][A-Za-z0-9_]*)")
        .expect("module declaration pattern is valid")
});

/// A parsed `module <address>::<name>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDeclaration {
    pub address: String,
    pub name: String,
}

/// Finds the first module declaration in `source`, if any.
pub fn find_module_declaration(source: &str) -> Option<ModuleDeclaration> {
    let captures = MODULE_DECLARATION.captures(source)?;
    Some(ModuleDeclaration {
        address: captures[1].to_string(),
        name: captures[2].to_string(),
    })
}

/// Derives the package name to submit `source` under.
///
/// Never fails: a buffer without a declaration maps to [`DEFAULT_MODULE_NAME`]
/// and the server applies its own validation.
pub fn module_name(source: &str) -> String {
    find_module_declaration(source)
        .map(|decl| decl.address)
        .unwrap_or_else(|| DEFAULT_MODULE_NAME.to_string())
}
