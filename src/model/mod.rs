pub mod dependency;
pub mod import_path;

use thiserror::Error;

pub use dependency::Dependency;
pub use import_path::{import_path_ancestors, package_source};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Dependency root must not be empty")]
    EmptyRoot,
    #[error("Import path `{0}` is not valid: {1}")]
    InvalidImportPath(String, String),
}
