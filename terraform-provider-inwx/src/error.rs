//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use inwx_domrobot::ApiError;

/// Provider layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ProviderError {
    /// RPC failure, with the summary chosen by the failing operation
    #[error("{summary}: {source}")]
    Api { summary: String, source: ApiError },

    /// Malformed resource ID or import specifier
    #[error("unexpected format of ID ({id}), expected {expected}")]
    InvalidId { id: String, expected: String },

    /// Attribute value rejected before any RPC is made
    #[error("{summary}: {detail}")]
    Validation {
        attribute: String,
        summary: String,
        detail: String,
    },

    /// Change the registrar cannot apply in place
    #[error("{summary}: {detail}")]
    Unsupported { summary: String, detail: String },

    /// Provider configuration error
    #[error("Could not configure provider: {0}")]
    Configuration(String),

    /// Plan/state JSON did not match the resource model
    #[error("Could not decode {type_name} value: {detail}")]
    Model { type_name: String, detail: String },

    /// Unknown resource or data source type
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// The remote object vanished where it must exist (e.g. right after create)
    #[error("{summary}: remote object {id} not found")]
    NotFound { summary: String, id: String },
}

impl ProviderError {
    /// Whether it is expected behavior (user input, malformed IDs, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidId { .. }
                | Self::Validation { .. }
                | Self::Unsupported { .. }
                | Self::Configuration(_)
                | Self::NotFound { .. }
        )
    }

    pub(crate) fn validation(
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

/// Provider layer Result type alias
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Attach the operation summary (`"Could not create domain"`) to an RPC result.
pub(crate) trait ApiResultExt<T> {
    fn context(self, summary: &str) -> ProviderResult<T>;
}

impl<T> ApiResultExt<T> for inwx_domrobot::Result<T> {
    fn context(self, summary: &str) -> ProviderResult<T> {
        self.map_err(|source| ProviderError::Api {
            summary: summary.to_string(),
            source,
        })
    }
}
