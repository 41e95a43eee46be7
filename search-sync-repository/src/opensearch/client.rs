//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of
//! [`SearchIndexProvider`] using the OpenSearch Rust client. Zero-downtime
//! rebuilds rely on alias management: the live index is always addressed
//! through the configured alias, and a rebuild promotes its shadow index by
//! moving the alias in one atomic action set.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsAliasParts, IndicesGetAliasParts},
    BulkParts, DeleteParts, IndexParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SearchIndexConfig;
use crate::errors::IndexClientError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::index_settings;
use crate::types::IndexHandle;
use search_sync_shared::PackageDocument;

/// OpenSearch implementation of the search index provider.
pub struct OpenSearchClient {
    client: OpenSearch,
    alias: String,
    request_timeout: Duration,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client from validated configuration.
    pub fn new(config: &SearchIndexConfig) -> Result<Self, IndexClientError> {
        config.validate()?;

        let parsed_url = Url::parse(&config.endpoint)
            .map_err(|e| IndexClientError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }
        let transport = builder
            .build()
            .map_err(|e| IndexClientError::connection(e.to_string()))?;

        info!(
            endpoint = %config.endpoint,
            alias = %config.alias,
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            alias: config.alias.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Run a client call under the configured timeout.
    ///
    /// An elapsed timeout and a transport error are both transient.
    async fn with_timeout<T, F>(&self, fut: F) -> Result<T, IndexClientError>
    where
        F: Future<Output = Result<T, opensearch::Error>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(IndexClientError::connection(e.to_string())),
            Err(_) => Err(IndexClientError::Timeout(
                self.request_timeout.as_millis() as u64
            )),
        }
    }

    /// Resolve the physical index currently behind the alias, if any.
    async fn current_live_physical(&self) -> Result<Option<String>, IndexClientError> {
        let response = self
            .with_timeout(
                self.client
                    .indices()
                    .get_alias(IndicesGetAliasParts::Name(&[self.alias.as_str()]))
                    .send(),
            )
            .await?;

        if response.status_code().as_u16() == 404 {
            return Ok(None);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexClientError::connection(e.to_string()))?;

        // Response keys are the physical index names carrying the alias.
        Ok(body
            .as_object()
            .and_then(|indices| indices.keys().next().cloned()))
    }
}

/// Interpret a bulk response body, distinguishing transient item failures
/// (429/5xx) from permanent rejections (4xx).
///
/// With `tolerate_missing`, item-level 404s (deletes of absent documents) are
/// counted as successes.
fn parse_bulk_response(body: &Value, tolerate_missing: bool) -> Result<(), IndexClientError> {
    if !body["errors"].as_bool().unwrap_or(false) {
        return Ok(());
    }

    let mut rejected = Vec::new();
    if let Some(items) = body["items"].as_array() {
        for item in items {
            // Each item is keyed by its operation ("index" or "delete").
            let Some(op) = item.as_object().and_then(|o| o.values().next()) else {
                continue;
            };
            let status = op["status"].as_u64().unwrap_or(0) as u16;
            if (200..300).contains(&status) {
                continue;
            }
            if status == 404 && tolerate_missing {
                continue;
            }
            if status == 429 || status >= 500 {
                return Err(IndexClientError::from_status(status, op["error"].to_string()));
            }
            rejected.push(format!(
                "id {} status {}: {}",
                op["_id"], status, op["error"]
            ));
        }
    }

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(IndexClientError::Rejected {
            status: 400,
            message: rejected.join("; "),
        })
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    fn live_index(&self) -> IndexHandle {
        IndexHandle::live(&self.alias)
    }

    async fn put_document(&self, document: &PackageDocument) -> Result<(), IndexClientError> {
        let body = serde_json::to_value(document)
            .map_err(|e| IndexClientError::serialization(e.to_string()))?;

        let response = self
            .with_timeout(
                self.client
                    .index(IndexParts::IndexId(&self.alias, &document.id.to_string()))
                    .body(body)
                    .send(),
            )
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        debug!(id = document.id, "Document written");
        Ok(())
    }

    async fn delete_document(&self, id: i64) -> Result<(), IndexClientError> {
        let response = self
            .with_timeout(
                self.client
                    .delete(DeleteParts::IndexId(&self.alias, &id.to_string()))
                    .send(),
            )
            .await?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        debug!(id = id, "Document deleted");
        Ok(())
    }

    async fn bulk_put_documents(
        &self,
        target: &IndexHandle,
        documents: &[PackageDocument],
    ) -> Result<(), IndexClientError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            body.push(json!({ "index": { "_id": document.id.to_string() } }).into());
            body.push(
                serde_json::to_value(document)
                    .map_err(|e| IndexClientError::serialization(e.to_string()))?
                    .into(),
            );
        }

        let response = self
            .with_timeout(
                self.client
                    .bulk(BulkParts::Index(&target.physical_name))
                    .body(body)
                    .send(),
            )
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| IndexClientError::connection(e.to_string()))?;
        parse_bulk_response(&response_body, false)?;

        debug!(
            index = %target.physical_name,
            count = documents.len(),
            "Bulk put completed"
        );
        Ok(())
    }

    async fn bulk_delete_documents(&self, ids: &[i64]) -> Result<(), IndexClientError> {
        let body: Vec<JsonBody<Value>> = ids
            .iter()
            .map(|id| json!({ "delete": { "_id": id.to_string() } }).into())
            .collect();

        let response = self
            .with_timeout(
                self.client
                    .bulk(BulkParts::Index(&self.alias))
                    .body(body)
                    .send(),
            )
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| IndexClientError::connection(e.to_string()))?;
        parse_bulk_response(&response_body, true)?;

        debug!(count = ids.len(), "Bulk delete completed");
        Ok(())
    }

    async fn create_index(&self) -> Result<IndexHandle, IndexClientError> {
        let handle = IndexHandle::shadow(&self.alias);

        let response = self
            .with_timeout(
                self.client
                    .indices()
                    .create(IndicesCreateParts::Index(&handle.physical_name))
                    .body(index_settings())
                    .send(),
            )
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        info!(index = %handle.physical_name, "Created shadow index");
        Ok(handle)
    }

    async fn swap_index(&self, shadow: &IndexHandle) -> Result<(), IndexClientError> {
        let previous = self.current_live_physical().await?;

        let mut actions = Vec::new();
        if let Some(ref old) = previous {
            actions.push(json!({ "remove": { "index": old, "alias": self.alias } }));
        }
        actions.push(json!({ "add": { "index": shadow.physical_name, "alias": self.alias } }));

        let response = self
            .with_timeout(
                self.client
                    .indices()
                    .update_aliases()
                    .body(json!({ "actions": actions }))
                    .send(),
            )
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        info!(
            index = %shadow.physical_name,
            alias = %self.alias,
            "Shadow index promoted to live"
        );

        // Retire the previous physical index. The swap already succeeded, so
        // a failure here only leaks an unused index.
        if let Some(old) = previous {
            if let Err(e) = self.drop_index(&IndexHandle { physical_name: old.clone() }).await {
                warn!(index = %old, error = %e, "Failed to retire previous live index");
            }
        }

        Ok(())
    }

    async fn drop_index(&self, handle: &IndexHandle) -> Result<(), IndexClientError> {
        let response = self
            .with_timeout(
                self.client
                    .indices()
                    .delete(IndicesDeleteParts::Index(&[handle.physical_name.as_str()]))
                    .send(),
            )
            .await?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        debug!(index = %handle.physical_name, "Index dropped");
        Ok(())
    }

    async fn ensure_live_index(&self) -> Result<(), IndexClientError> {
        let response = self
            .with_timeout(
                self.client
                    .indices()
                    .exists_alias(IndicesExistsAliasParts::Name(&[self.alias.as_str()]))
                    .send(),
            )
            .await?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(());
        }
        if status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(IndexClientError::from_status(status.as_u16(), error_body));
        }

        let initial = self.create_index().await?;
        self.swap_index(&initial).await?;

        info!(alias = %self.alias, index = %initial.physical_name, "Bootstrapped live index");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, IndexClientError> {
        let response = self
            .with_timeout(self.client.cluster().health(ClusterHealthParts::None).send())
            .await?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexClientError::connection(e.to_string()))?;

        let status = body["status"].as_str().unwrap_or("red");
        Ok(status == "green" || status == "yellow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bulk_response_no_errors() {
        let body = json!({ "errors": false, "items": [] });
        assert!(parse_bulk_response(&body, false).is_ok());
    }

    #[test]
    fn test_parse_bulk_response_transient_item() {
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201 } },
                { "index": { "_id": "2", "status": 503, "error": { "reason": "unavailable" } } }
            ]
        });

        let err = parse_bulk_response(&body, false).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_parse_bulk_response_permanent_item() {
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 400, "error": { "reason": "mapper_parsing_exception" } } }
            ]
        });

        let err = parse_bulk_response(&body, false).unwrap_err();
        assert!(!err.is_transient());
        assert!(matches!(err, IndexClientError::Rejected { status: 400, .. }));
    }

    #[test]
    fn test_parse_bulk_response_tolerates_missing_deletes() {
        let body = json!({
            "errors": true,
            "items": [
                { "delete": { "_id": "7", "status": 404 } },
                { "delete": { "_id": "8", "status": 200 } }
            ]
        });

        assert!(parse_bulk_response(&body, true).is_ok());
        assert!(parse_bulk_response(&body, false).is_err());
    }
}
