//! HTTP client wrapper for the Pinecone control and data planes.
//!
//! Index administration (describe/create/delete) goes through the control
//! plane; vector traffic (upsert/query/delete) goes through the per-index
//! data-plane host discovered during [`PineconeService::ensure_index`]. Hosts
//! of ready indexes are cached so repeat calls skip the describe round-trip.

use crate::config::Config;
use crate::pinecone::types::{
    DescribeIndexResponse, IndexStats, PineconeError, QueryMatch, QueryResponse, UpsertResponse,
    VectorRecord,
};
use reqwest::{Client, Method, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Interval between readiness probes while an index is being created.
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum number of readiness probes before giving up (~60s total).
const READY_MAX_ATTEMPTS: u32 = 30;

/// Per-request timeout applied to every Pinecone call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Similarity metric used for all indexes managed by this service.
const METRIC: &str = "cosine";

/// Lightweight HTTP client for Pinecone operations.
pub struct PineconeService {
    pub(crate) client: Client,
    pub(crate) control_url: String,
    pub(crate) api_key: String,
    pub(crate) dimension: usize,
    pub(crate) cloud: String,
    pub(crate) region: String,
    /// Hosts of indexes already verified ready; read-mostly, safe to recompute.
    pub(crate) ready_hosts: RwLock<HashMap<String, String>>,
}

impl PineconeService {
    /// Construct a new client from the supplied configuration.
    pub fn new(config: &Config) -> Result<Self, PineconeError> {
        let client = Client::builder()
            .user_agent("loreforge/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let control_url = normalize_base_url(&config.pinecone_api_base)?;
        tracing::debug!(url = %control_url, "Initialized Pinecone HTTP client");

        Ok(Self {
            client,
            control_url,
            api_key: config.pinecone_api_key.clone(),
            dimension: config.embedding_dimension,
            cloud: config.pinecone_cloud.clone(),
            region: config.pinecone_region.clone(),
            ready_hosts: RwLock::new(HashMap::new()),
        })
    }

    /// Guarantee the named index exists, matches the configured dimensionality
    /// and metric, and is ready for traffic.
    ///
    /// Absent indexes are created and polled until ready. A present,
    /// compatible index is a no-op (served from the readiness cache on repeat
    /// calls). A present but incompatible index fails with
    /// [`PineconeError::Conflict`]; deletion is always an explicit caller
    /// decision.
    pub async fn ensure_index(&self, name: &str) -> Result<(), PineconeError> {
        if self.cached_host(name).is_some() {
            return Ok(());
        }

        match self.describe_index(name).await? {
            Some(description) => {
                self.check_compatible(name, &description)?;
                if description.status.ready {
                    self.cache_host(name, &description.host);
                    return Ok(());
                }
                tracing::info!(index = name, "Index exists but is not ready; polling");
            }
            None => {
                tracing::info!(index = name, dimension = self.dimension, "Creating index");
                self.create_index(name).await?;
            }
        }

        let host = self.poll_until_ready(name).await?;
        self.cache_host(name, &host);
        Ok(())
    }

    /// Upload vector records into one namespace of an index. The index must
    /// already be ready (see [`PineconeService::ensure_index`]).
    ///
    /// Returns the number of vectors the request wrote. Re-upserting the same
    /// ids overwrites content rather than duplicating it.
    pub async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, PineconeError> {
        if records.is_empty() {
            return Ok(0);
        }

        let host = self.resolve_host(index).await?;
        let record_count = records.len();
        let response = self
            .data_request(Method::POST, &host, "vectors/upsert")
            .json(&json!({ "vectors": records, "namespace": namespace }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(index, namespace, error = %error, "Upsert failed");
            return Err(error);
        }

        let payload: UpsertResponse = response.json().await?;
        let upserted = if payload.upserted_count > 0 {
            payload.upserted_count
        } else {
            record_count
        };
        tracing::debug!(index, namespace, vectors = upserted, "Vectors upserted");
        Ok(upserted)
    }

    /// Query one namespace for the `top_k` nearest vectors by cosine
    /// similarity. Matches come back in the index's descending-score order,
    /// which is preserved as-is (ties keep their native ordering).
    pub async fn query(
        &self,
        index: &str,
        namespace: &str,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, PineconeError> {
        let host = self.resolve_host(index).await?;
        let response = self
            .data_request(Method::POST, &host, "query")
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "namespace": namespace,
                "includeMetadata": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(index, namespace, error = %error, "Query failed");
            return Err(error);
        }

        let payload: QueryResponse = response.json().await?;
        let matches = payload
            .matches
            .into_iter()
            .map(|entry| QueryMatch {
                id: entry.id,
                score: entry.score,
                metadata: entry.metadata,
            })
            .collect();
        Ok(matches)
    }

    /// Remove every vector in one namespace. Other namespaces in the same
    /// index are untouched.
    pub async fn delete_namespace(&self, index: &str, namespace: &str) -> Result<(), PineconeError> {
        let host = self.resolve_host(index).await?;
        let response = self
            .data_request(Method::POST, &host, "vectors/delete")
            .json(&json!({ "deleteAll": true, "namespace": namespace }))
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::info!(index, namespace, "Namespace deleted");
        })
        .await
    }

    /// Delete an entire index. Irreversible; only ever invoked by an explicit
    /// caller request.
    pub async fn delete_index(&self, name: &str) -> Result<(), PineconeError> {
        let response = self
            .control_request(Method::DELETE, &format!("indexes/{name}"))
            .send()
            .await?;

        let result = self
            .ensure_success(response, || {
                tracing::info!(index = name, "Index deleted");
            })
            .await;
        if result.is_ok()
            && let Ok(mut hosts) = self.ready_hosts.write()
        {
            hosts.remove(name);
        }
        result
    }

    /// Fetch per-namespace vector counts for an index.
    pub async fn describe_index_stats(&self, index: &str) -> Result<IndexStats, PineconeError> {
        let host = self.resolve_host(index).await?;
        let response = self
            .data_request(Method::POST, &host, "describe_index_stats")
            .json(&json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PineconeError::UnexpectedStatus { status, body });
        }

        Ok(response.json().await?)
    }

    async fn describe_index(
        &self,
        name: &str,
    ) -> Result<Option<DescribeIndexResponse>, PineconeError> {
        let response = self
            .control_request(Method::GET, &format!("indexes/{name}"))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = PineconeError::UnexpectedStatus { status, body };
                tracing::error!(index = name, error = %error, "Describe index failed");
                Err(error)
            }
        }
    }

    async fn create_index(&self, name: &str) -> Result<(), PineconeError> {
        let body = json!({
            "name": name,
            "dimension": self.dimension,
            "metric": METRIC,
            "spec": {
                "serverless": {
                    "cloud": self.cloud,
                    "region": self.region,
                }
            },
            "deletion_protection": "disabled",
        });

        let response = self
            .control_request(Method::POST, "indexes")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        // 409 means another caller created the index first; readiness
        // polling and the compatibility check still apply.
        if status.is_success() || status == StatusCode::CONFLICT {
            tracing::debug!(index = name, "Index creation accepted");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(index = name, error = %error, "Index creation failed");
            Err(error)
        }
    }

    async fn poll_until_ready(&self, name: &str) -> Result<String, PineconeError> {
        for attempt in 1..=READY_MAX_ATTEMPTS {
            if let Some(description) = self.describe_index(name).await? {
                self.check_compatible(name, &description)?;
                if description.status.ready {
                    tracing::info!(index = name, attempt, "Index ready");
                    return Ok(description.host);
                }
            }
            tracing::debug!(index = name, attempt, "Index not ready yet");
            if attempt < READY_MAX_ATTEMPTS {
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
        }

        Err(PineconeError::NotReady {
            index: name.to_string(),
            waited_secs: READY_POLL_INTERVAL.as_secs() * u64::from(READY_MAX_ATTEMPTS),
        })
    }

    fn check_compatible(
        &self,
        name: &str,
        description: &DescribeIndexResponse,
    ) -> Result<(), PineconeError> {
        if description.dimension != self.dimension || description.metric != METRIC {
            return Err(PineconeError::Conflict {
                index: name.to_string(),
                expected_dimension: self.dimension,
                actual_dimension: description.dimension,
                expected_metric: METRIC.to_string(),
                actual_metric: description.metric.clone(),
            });
        }
        Ok(())
    }

    /// Resolve the data-plane host for an index, consulting the readiness
    /// cache first and falling back to a describe call.
    async fn resolve_host(&self, index: &str) -> Result<String, PineconeError> {
        if let Some(host) = self.cached_host(index) {
            return Ok(host);
        }

        match self.describe_index(index).await? {
            Some(description) => {
                let host = normalize_host(&description.host);
                self.cache_host(index, &description.host);
                Ok(host)
            }
            None => Err(PineconeError::IndexNotFound(index.to_string())),
        }
    }

    fn cached_host(&self, index: &str) -> Option<String> {
        self.ready_hosts
            .read()
            .ok()
            .and_then(|hosts| hosts.get(index).cloned())
    }

    fn cache_host(&self, index: &str, host: &str) {
        if let Ok(mut hosts) = self.ready_hosts.write() {
            hosts.insert(index.to_string(), normalize_host(host));
        }
    }

    fn control_request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.control_url, path);
        self.client.request(method, url).header("Api-Key", &self.api_key)
    }

    fn data_request(&self, method: Method, host: &str, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(host, path);
        self.client.request(method, url).header("Api-Key", &self.api_key)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), PineconeError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PineconeError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Pinecone request failed");
            Err(error)
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, PineconeError> {
    let mut parsed =
        reqwest::Url::parse(url).map_err(|err| PineconeError::InvalidUrl(err.to_string()))?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

/// Pinecone describe responses return bare hosts; tests hand back full URLs.
fn normalize_host(host: &str) -> String {
    if host.contains("://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
