use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Credentials;
use crate::error::{BuildStatsError, Result};

/// HTTP client shared by every request of a single run.
pub struct ApiClient {
    client: Client,
    credentials: Option<Credentials>,
}

impl ApiClient {
    pub fn new(credentials: Option<Credentials>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("buildstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BuildStatsError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Helper to build authenticated requests
    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(credentials) = &self.credentials {
            credentials.apply(request)
        } else {
            request
        }
    }

    /// GET `url` and decode the JSON body.
    ///
    /// Transport errors and non-2xx statuses are `UpstreamUnavailable`; a body
    /// that does not decode into `T` is `MalformedUpstreamResponse`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");

        let unavailable = |e: reqwest::Error| BuildStatsError::UpstreamUnavailable {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let request = self.auth_request(self.client.get(url.clone()));
        let response = request
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        let body = response.text().await.map_err(unavailable)?;

        serde_json::from_str(&body).map_err(|e| BuildStatsError::MalformedUpstreamResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Parses a base URL and makes sure it ends in `/` so relative joins append
/// to it instead of replacing its last segment.
pub fn base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| BuildStatsError::Config(format!("Invalid base URL {raw:?}: {e}")))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Probes must report any unusable answer as the upstream being unavailable.
pub fn probe_failure(error: BuildStatsError) -> BuildStatsError {
    match error {
        BuildStatsError::MalformedUpstreamResponse { url, reason } => {
            BuildStatsError::UpstreamUnavailable {
                url,
                reason: format!("unexpected response shape: {reason}"),
            }
        }
        other => other,
    }
}

pub fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| BuildStatsError::Config(format!("Invalid URL {base}{path}: {e}")))
}
