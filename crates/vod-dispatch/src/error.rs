//! Dispatch error types.

use thiserror::Error;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur when launching a worker task.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to configure dispatcher: {0}")]
    ConfigError(String),

    /// Bad task definition, cluster reference, or launch parameters.
    #[error("Invalid launch parameter: {0}")]
    InvalidParameter(String),

    /// Insufficient permission to launch tasks.
    #[error("Launch not authorized: {0}")]
    AccessDenied(String),

    /// Unreachable or failing control plane.
    #[error("Control plane error: {0}")]
    Infra(String),
}

impl DispatchError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn infra(msg: impl Into<String>) -> Self {
        Self::Infra(msg.into())
    }
}

/// Classify a control-plane error code into the dispatch taxonomy.
pub(crate) fn classify_error(code: Option<&str>, message: &str) -> DispatchError {
    match code {
        Some("InvalidParameterException")
        | Some("ClusterNotFoundException")
        | Some("ClientException") => DispatchError::InvalidParameter(message.to_string()),
        Some("AccessDeniedException") | Some("AccessDenied") | Some("UnrecognizedClientException") => {
            DispatchError::AccessDenied(message.to_string())
        }
        _ => DispatchError::Infra(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_invalid_parameter() {
        assert!(matches!(
            classify_error(Some("InvalidParameterException"), "bad task definition"),
            DispatchError::InvalidParameter(_)
        ));
        assert!(matches!(
            classify_error(Some("ClusterNotFoundException"), "no such cluster"),
            DispatchError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_classify_access_denied() {
        assert!(matches!(
            classify_error(Some("AccessDeniedException"), "missing ecs:RunTask"),
            DispatchError::AccessDenied(_)
        ));
    }

    #[test]
    fn test_classify_unknown_as_infra() {
        assert!(matches!(
            classify_error(Some("ThrottlingException"), "slow down"),
            DispatchError::Infra(_)
        ));
        assert!(matches!(
            classify_error(None, "connection reset"),
            DispatchError::Infra(_)
        ));
    }
}
