use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use strata_protocol::{endpoints, ApiResponse, FetchOutcome};
use strata_types::{Entity, EntityBundle, EntityId, Etag, OrgId, SiteManifest, TypeId};

use crate::error::{ClientError, ClientResult};

/// Transport seam for snapshot fetches.
///
/// Implementations pass the cached ETag as `If-None-Match` and surface
/// the server's 304 as [`FetchOutcome::NotModified`].
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn fetch_manifest(&self, cached: Option<&Etag>)
        -> ClientResult<FetchOutcome<SiteManifest>>;

    async fn fetch_bundle(
        &self,
        type_id: &TypeId,
        cached: Option<&Etag>,
    ) -> ClientResult<FetchOutcome<EntityBundle>>;

    /// Fetch one entity's latest version. Unconditional: single-entity
    /// reads have no ETag, revalidation is snapshot-level.
    async fn fetch_entity(&self, org: &OrgId, id: &EntityId) -> ClientResult<Entity>;
}

/// HTTP transport against a Strata server.
///
/// The caller's identity headers are attached to every request; the
/// server resolves the tier from them, so this transport always syncs
/// the tier its identity maps to.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
    identity: HeaderMap,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
            identity: HeaderMap::new(),
        }
    }

    /// Attach a gateway identity header to every request.
    pub fn with_header(mut self, name: &'static str, value: &str) -> ClientResult<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Transport(format!("bad header value: {e}")))?;
        self.identity.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    async fn conditional_get<T: DeserializeOwned>(
        &self,
        path: &str,
        cached: Option<&Etag>,
    ) -> ClientResult<FetchOutcome<T>> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.get(&url).headers(self.identity.clone());
        if let Some(etag) = cached {
            request = request.header(IF_NONE_MATCH, etag.quoted());
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_MODIFIED => Ok(FetchOutcome::NotModified),
            StatusCode::OK => {
                let etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| Etag::parse_header(v).ok())
                    .ok_or_else(|| ClientError::MissingEtag {
                        path: path.to_string(),
                    })?;
                // Ignored beyond debug logging; revalidation is ETag-driven.
                if let Some(cc) = response.headers().get(CACHE_CONTROL) {
                    tracing::trace!(path, cache_control = ?cc, "snapshot response");
                }
                let body: ApiResponse<T> = response.json().await?;
                Ok(FetchOutcome::Fresh {
                    etag,
                    value: body.data,
                })
            }
            status => Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                path: path.to_string(),
            }),
        }
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn fetch_manifest(
        &self,
        cached: Option<&Etag>,
    ) -> ClientResult<FetchOutcome<SiteManifest>> {
        self.conditional_get(endpoints::SITE_MANIFEST, cached).await
    }

    async fn fetch_bundle(
        &self,
        type_id: &TypeId,
        cached: Option<&Etag>,
    ) -> ClientResult<FetchOutcome<EntityBundle>> {
        self.conditional_get(&endpoints::bundle(type_id), cached)
            .await
    }

    async fn fetch_entity(&self, org: &OrgId, id: &EntityId) -> ClientResult<Entity> {
        let path = endpoints::org_entity(org, id);
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.identity.clone())
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => {
                let body: ApiResponse<Entity> = response.json().await?;
                Ok(body.data)
            }
            status => Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                path,
            }),
        }
    }
}
