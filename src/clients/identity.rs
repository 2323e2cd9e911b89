//! Client for the name-resolver service

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{
    IdKind, ResolveIdsRequest, ResolveIdsResponse, ResolveNamesRequest, ResolveNamesResponse,
    TypedId,
};

use super::{expect_success, NameResolver};

/// Reqwest-backed [`NameResolver`] talking to the name-resolver HTTP API.
#[derive(Clone)]
pub struct HttpNameResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNameResolver {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl NameResolver for HttpNameResolver {
    async fn resolve_name_to_id(&self, name: &str) -> AppResult<Option<TypedId>> {
        let request = ResolveNamesRequest {
            name_list: vec![name.to_string()],
        };

        let response = self
            .client
            .post(format!("{}/api/names-id/resolve", self.base_url))
            .json(&request)
            .send()
            .await?;
        let mut resolved: ResolveNamesResponse = expect_success(response).await?.json().await?;

        Ok(resolved.ids.remove(name))
    }

    async fn resolve_ids_to_names(
        &self,
        ids: &[i64],
        kind: IdKind,
    ) -> AppResult<HashMap<String, String>> {
        // Zero filter terms would produce a malformed query downstream.
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let request = ResolveIdsRequest {
            id_list: ids.to_vec(),
            kind,
        };

        let response = self
            .client
            .post(format!("{}/api/id-names/resolve", self.base_url))
            .json(&request)
            .send()
            .await?;
        let resolved: ResolveIdsResponse = expect_success(response).await?.json().await?;

        Ok(resolved.names)
    }

    async fn ids_for_name(&self, name: &str) -> AppResult<Vec<TypedId>> {
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(format!("{}/api/name-to-ids/{}", self.base_url, name))
            .send()
            .await?;
        let ids: Vec<TypedId> = expect_success(response).await?.json().await?;

        Ok(ids)
    }
}
