mod secret;

pub use secret::Secret;

use reqwest::RequestBuilder;

use crate::error::{BuildStatsError, Result};

/// Caller-supplied credentials, applied identically to every request of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: Secret },
    Bearer(Secret),
}

impl Credentials {
    /// Parses `user:password` into HTTP basic credentials.
    ///
    /// Only the first colon separates the two halves, so passwords may contain
    /// colons themselves.
    pub fn parse_basic(value: &str) -> Result<Self> {
        let (username, password) = value.split_once(':').ok_or_else(|| {
            BuildStatsError::Config("Basic credentials must be given as USER:PASSWORD".to_string())
        })?;

        if username.is_empty() {
            return Err(BuildStatsError::Config(
                "Basic credentials are missing a username".to_string(),
            ));
        }

        Ok(Self::Basic {
            username: username.to_string(),
            password: Secret::from(password),
        })
    }

    pub fn bearer(token: &str) -> Self {
        Self::Bearer(Secret::from(token))
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose()))
            }
            Self::Bearer(token) => request.bearer_auth(token.expose()),
        }
    }
}
