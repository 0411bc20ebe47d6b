use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RegistryError {
    /// Map a non-success HTTP response to an error.
    pub(crate) fn from_status(response: &reqwest::Response, subject: &str) -> Self {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return RegistryError::NotFound(subject.to_string());
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return RegistryError::RateLimited {
                retry_after_secs: retry_after,
            };
        }

        RegistryError::InvalidResponse(format!("Unexpected status: {}", status))
    }
}
