// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the tablature codec.

use thiserror::Error;

/// Errors that can occur when reading or writing Guitar Pro files.
#[derive(Error, Debug)]
pub enum GpError {
    #[error("unexpected end of input: needed {needed} bytes, only {available} available")]
    TruncatedInput { needed: usize, available: usize },

    #[error("unsupported version: {0:?}")]
    UnsupportedVersion(String),

    #[error("malformed structure: {0}")]
    MalformedStructure(String),

    #[error("{action} {location}, got {kind}: {source}")]
    LocalizedDecode {
        action: &'static str,
        location: String,
        kind: &'static str,
        #[source]
        source: Box<GpError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GpError {
    /// Build a [`GpError::MalformedStructure`] from anything printable
    pub fn malformed(message: impl Into<String>) -> Self {
        GpError::MalformedStructure(message.into())
    }

    /// Short name of the error kind, used in localized messages
    pub fn kind(&self) -> &'static str {
        match self {
            GpError::TruncatedInput { .. } => "TruncatedInput",
            GpError::UnsupportedVersion(_) => "UnsupportedVersion",
            GpError::MalformedStructure(_) => "MalformedStructure",
            GpError::LocalizedDecode { .. } => "LocalizedDecode",
            GpError::Io(_) => "Io",
        }
    }

    /// Whether this is a short read
    pub fn is_truncated(&self) -> bool {
        matches!(self, GpError::TruncatedInput { .. })
    }

    /// The innermost error, looking through localization wrappers
    pub fn root(&self) -> &GpError {
        match self {
            GpError::LocalizedDecode { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, GpError>;

/// Checked narrowing for fields whose width differs between format versions.
pub(crate) fn fit<T, V>(value: V, field: &str) -> Result<T>
where
    V: Copy + std::fmt::Display + TryInto<T>,
{
    value
        .try_into()
        .map_err(|_| GpError::malformed(format!("{field} value {value} does not fit its field")))
}
