//! Client for the drop-repo service

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{
    DropExistence, DropExistenceRequest, DropExistenceResponse, DropRecord, TypedId,
};

use super::{expect_success, DropService};

/// Reqwest-backed [`DropService`] talking to the drop-repo HTTP API.
#[derive(Clone)]
pub struct HttpDropService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDropService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DropService for HttpDropService {
    async fn search_drops(&self, typed_id: TypedId) -> AppResult<Vec<DropRecord>> {
        let response = self
            .client
            .get(format!("{}/api/search_drops", self.base_url))
            .query(&[
                ("query", typed_id.id.to_string()),
                ("query_type", typed_id.kind.as_str().to_string()),
            ])
            .send()
            .await?;
        let drops: Vec<DropRecord> = expect_success(response).await?.json().await?;

        Ok(drops)
    }

    async fn check_drops_exist(&self, items: &[TypedId]) -> AppResult<Vec<DropExistence>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let request = DropExistenceRequest {
            items: items.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/drops/exist", self.base_url))
            .json(&request)
            .send()
            .await?;
        let body: DropExistenceResponse = expect_success(response).await?.json().await?;

        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdKind;

    fn service(server: &mockito::ServerGuard) -> HttpDropService {
        HttpDropService::new(reqwest::Client::new(), server.url())
    }

    #[tokio::test]
    async fn search_drops_sends_id_and_kind_as_query_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/search_drops")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("query".into(), "100100".into()),
                mockito::Matcher::UrlEncoded("query_type".into(), "mob".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id": 1, "dropperid": 100100, "itemid": 2000001,
                     "minimum_quantity": 1, "maximum_quantity": 1,
                     "questid": 0, "chance": 100000}]"#,
            )
            .create_async()
            .await;

        let drops = service(&server)
            .search_drops(TypedId::mob(100100))
            .await
            .unwrap();

        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].dropper_id, 100100);
        assert_eq!(drops[0].item_id, 2000001);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn check_drops_exist_short_circuits_on_empty_input() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/drops/exist")
            .expect(0)
            .create_async()
            .await;

        let results = service(&server).check_drops_exist(&[]).await.unwrap();

        assert!(results.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn check_drops_exist_parses_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/drops/exist")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "items": [{"type": "mob", "id": 999999}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": [{"type": "mob", "id": 999999, "drop_exist": false}]}"#)
            .create_async()
            .await;

        let results = service(&server)
            .check_drops_exist(&[TypedId::mob(999999)])
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![DropExistence {
                typed_id: TypedId::new(IdKind::Mob, 999999),
                exists: false,
            }]
        );
    }
}
