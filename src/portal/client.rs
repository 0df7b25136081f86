//! Video portal HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::json;

use crate::config::{collection_path, Config};
use crate::error::{Error, Result};
use crate::media::CollectionMetadata;
use crate::portal::session::SessionState;
use crate::portal::types::{GraphqlResponse, RealmData};
use crate::portal::Catalog;

/// Timeout of the startup reachability check.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Realm query used when the settings carry no override.
pub const DEFAULT_METADATA_QUERY: &str = r#"query CollectionEntries($path: String!) {
  realm: realmByPath(path: $path) {
    blocks {
      __typename
      ... on SeriesBlock {
        series {
          ... on AuthorizedSeries { title entries { ...entry } }
        }
      }
      ... on PlaylistBlock {
        playlist {
          ... on AuthorizedPlaylist { title entries { ...entry } }
        }
      }
      ... on VideoBlock {
        event { ...entry }
      }
    }
  }
}

fragment entry on Event {
  __typename
  ... on AuthorizedEvent { id title created series { title } }
  ... on NotAllowed { dummy }
}"#;

/// Portal client: metadata queries and plain page checks.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
    metadata_query: String,
}

impl PortalClient {
    /// Create a client for the configured portal.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.portal.user_agent)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.base_url().to_string(),
            metadata_query: config
                .portal
                .metadata_query
                .clone()
                .unwrap_or_else(|| DEFAULT_METADATA_QUERY.to_string()),
        }
    }

    /// The underlying HTTP client, shared with transfers.
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fatal-on-failure reachability check, run before any other work.
    pub async fn check_connectivity(&self) -> Result<()> {
        let url = format!("{}/", self.base_url);
        let connectivity = |message: String| Error::Connectivity {
            url: url.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .timeout(CONNECTIVITY_TIMEOUT)
            .send()
            .await
            .map_err(|e| connectivity(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(connectivity(format!("HTTP {}", response.status())));
        }

        tracing::debug!("{} is reachable", url);
        Ok(())
    }

    /// Whether a page answers with 200 OK (used to vet quick-add URLs).
    pub async fn page_exists(&self, url: &str) -> Result<bool> {
        let response = self.client.get(url).send().await?;
        tracing::debug!("{} answered {}", url, response.status());
        Ok(response.status() == reqwest::StatusCode::OK)
    }
}

/// First `max` characters of a response body, for error messages.
fn snippet(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[async_trait]
impl Catalog for PortalClient {
    async fn fetch_collection(
        &self,
        url: &str,
        session: &SessionState,
    ) -> Result<CollectionMetadata> {
        let path = collection_path(url, &self.base_url)?;
        let endpoint = format!("{}/graphql", self.base_url);
        let body = json!({
            "query": self.metadata_query,
            "variables": { "path": path },
        });

        tracing::debug!("POST {} (path {})", endpoint, path);

        let mut request = self.client.post(&endpoint).json(&body);
        if let Some(cookies) = session.cookie_header().await {
            request = request.header(header::COOKIE, cookies);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Metadata(format!(
                "HTTP {} for {}: {}",
                status,
                path,
                snippet(&text, 200)
            )));
        }

        let parsed: GraphqlResponse<RealmData> = serde_json::from_str(&text).map_err(|e| {
            Error::Metadata(format!(
                "Failed to parse metadata for {}: {} - Response: {}",
                path,
                e,
                snippet(&text, 500)
            ))
        })?;

        let fallback = path.rsplit('/').next().unwrap_or(&path).to_string();
        parsed.into_metadata(&fallback)
    }
}
