//! Firestore REST v1 client implementation.
//!
//! Uses `reqwest` against the documents data plane: point upsert via `PATCH`,
//! atomic counter adjustment via `documents:commit` field transforms, point
//! delete, and paginated collection scans.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use ladle_core::{CartId, CartLine, RecipeId};

use crate::config::RemoteConfig;

use super::documents::{
    cart_line_fields, cart_line_from_document, CommitRequest, Document, ListDocumentsResponse,
    Value,
};
use super::{RemoteCollection, RemoteError};

/// Client for the Firestore REST v1 API.
///
/// Cheaply cloneable; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// Endpoint base, no trailing slash (e.g. `https://firestore.googleapis.com/v1`).
    base_url: String,
    /// `projects/{project}/databases/{database}/documents`
    documents_root: String,
    token: Option<SecretString>,
}

impl FirestoreClient {
    /// Create a new client from remote configuration.
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        let base_url = config.base_url.as_str().trim_end_matches('/').to_owned();
        let documents_root = format!(
            "projects/{}/databases/{}/documents",
            config.project, config.database
        );

        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                base_url,
                documents_root,
                token: config.token.clone(),
            }),
        }
    }

    /// Full resource name for a document path relative to the database root.
    fn resource_name(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.documents_root)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(500)
            .collect::<String>();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Upsert a document at `path` (relative to the database root), creating
    /// it if absent.
    pub async fn patch_document(
        &self,
        path: &str,
        fields: BTreeMap<String, Value>,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/{}", self.inner.base_url, self.resource_name(path));
        let body = Document { name: None, fields };

        let response = self
            .request(reqwest::Method::PATCH, url)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Atomically add `delta` to an integer field of the document at `path`.
    pub async fn increment_field(
        &self,
        path: &str,
        field_path: &str,
        delta: i64,
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/{}:commit",
            self.inner.base_url, self.inner.documents_root
        );
        let body = CommitRequest::increment(self.resource_name(path), field_path, delta);

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Delete the document at `path`; deleting an absent document succeeds.
    pub async fn delete_document(&self, path: &str) -> Result<(), RemoteError> {
        let url = format!("{}/{}", self.inner.base_url, self.resource_name(path));

        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Fetch the document at `path`, or `None` if it does not exist.
    pub async fn get_document(&self, path: &str) -> Result<Option<Document>, RemoteError> {
        let url = format!("{}/{}", self.inner.base_url, self.resource_name(path));

        let response = self.request(reqwest::Method::GET, url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;

        let document = response
            .json::<Document>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(Some(document))
    }

    /// List every document under a collection path, following pagination.
    pub async fn list_documents(
        &self,
        collection_path: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        let url = format!(
            "{}/{}/{collection_path}",
            self.inner.base_url, self.inner.documents_root
        );

        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.request(reqwest::Method::GET, url.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = Self::check_status(request.send().await?).await?;
            let page = response
                .json::<ListDocumentsResponse>()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string()))?;

            documents.extend(page.documents);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(collection = collection_path, count = documents.len(), "listed documents");
        Ok(documents)
    }
}

/// The remote cart: one cart document's `items` subcollection.
#[derive(Clone)]
pub struct FirestoreCartItems {
    client: FirestoreClient,
    /// `carts/{cart_id}/items`
    items_path: String,
}

impl FirestoreCartItems {
    /// Bind a client to the items subcollection of one cart document.
    #[must_use]
    pub fn new(client: FirestoreClient, cart_id: &CartId) -> Self {
        Self {
            client,
            items_path: format!("carts/{cart_id}/items"),
        }
    }

    fn item_path(&self, id: &RecipeId) -> String {
        format!("{}/{id}", self.items_path)
    }
}

#[async_trait]
impl RemoteCollection for FirestoreCartItems {
    async fn create_or_set_line(&self, line: &CartLine) -> Result<(), RemoteError> {
        self.client
            .patch_document(&self.item_path(&line.id), cart_line_fields(line))
            .await
    }

    async fn adjust_quantity(&self, id: &RecipeId, delta: i64) -> Result<(), RemoteError> {
        self.client
            .increment_field(&self.item_path(id), "quantity", delta)
            .await
    }

    async fn delete_line(&self, id: &RecipeId) -> Result<(), RemoteError> {
        self.client.delete_document(&self.item_path(id)).await
    }

    async fn fetch_all_lines(&self) -> Result<Vec<CartLine>, RemoteError> {
        let documents = self.client.list_documents(&self.items_path).await?;

        // A single malformed record must not poison the whole cart.
        let mut lines = Vec::with_capacity(documents.len());
        for document in &documents {
            match cart_line_from_document(document) {
                Ok(line) => lines.push(line),
                Err(e) => {
                    warn!(name = ?document.name, error = %e, "skipping malformed cart record");
                }
            }
        }
        Ok(lines)
    }
}
