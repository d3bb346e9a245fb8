//! Error taxonomy for the form build pass.
//!
//! Every error here is raised synchronously while the form is being built
//! from configuration and is fatal to startup — there is no retry or
//! partial-degradation path.  Once a [`BuiltForm`](crate::core::layout::BuiltForm)
//! exists, no further build errors can occur.

use std::path::PathBuf;

use thiserror::Error;

/// A descriptor or layout shape the configuration schema does not allow.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown component type `{ty}` for component `{id}`")]
    UnknownType { id: String, ty: String },

    #[error("duplicate component id `{0}`")]
    DuplicateId(String),

    #[error("component id must not be empty")]
    EmptyId,

    #[error("`two_column` is only valid at the root of a layout tree")]
    NestedTwoColumn,

    #[error("form config defines components but no [layout]")]
    MissingLayout,

    #[error("form config defines neither components + layout nor legacy [[fields]]")]
    EmptyForm,

    #[error("failed to read form config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse form config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A layout tree that names components the component list does not define.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("layout references undefined component `{0}`")]
    Undefined(String),

    #[error("component `{0}` is placed more than once in the layout")]
    DuplicatePlacement(String),
}

/// Anything that can go wrong during the single build pass.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}
