use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum JenkinsError {
    #[error("failed to connect to Jenkins: {0}")]
    Connection(String),

    #[error("Jenkins rejected credentials: {0}")]
    Auth(String),

    #[error("job '{0}' not found")]
    JobNotFound(String),

    #[error("invalid Jenkins URL: {0}")]
    InvalidUrl(String),
}

impl From<JenkinsError> for ApiError {
    fn from(err: JenkinsError) -> Self {
        match err {
            JenkinsError::JobNotFound(name) => Self::NotFound(format!("job '{name}'")),
            JenkinsError::Connection(_) | JenkinsError::Auth(_) => {
                tracing::warn!(error = %err, "jenkins unavailable");
                Self::ServiceUnavailable(err.to_string())
            }
            JenkinsError::InvalidUrl(_) => Self::Internal(err.into()),
        }
    }
}
