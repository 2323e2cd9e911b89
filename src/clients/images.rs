//! Client for the image-retriever service

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{ImageExistence, ImageExistenceRequest, ImageExistenceResponse, TypedId};

use super::{expect_success, ImageService};

/// Reqwest-backed [`ImageService`] talking to the image-retriever HTTP API.
#[derive(Clone)]
pub struct HttpImageService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpImageService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ImageService for HttpImageService {
    async fn check_images_exist(&self, items: &[TypedId]) -> AppResult<Vec<ImageExistence>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let request = ImageExistenceRequest {
            images: items.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/images/exist", self.base_url))
            .json(&request)
            .send()
            .await?;
        let body: ImageExistenceResponse = expect_success(response).await?.json().await?;

        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn check_images_exist_short_circuits_on_empty_input() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/images/exist")
            .expect(0)
            .create_async()
            .await;

        let service = HttpImageService::new(reqwest::Client::new(), server.url());
        let results = service.check_images_exist(&[]).await.unwrap();

        assert!(results.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn check_images_exist_parses_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/images/exist")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "images": [{"type": "mob", "id": 100100}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": [{"type": "mob", "id": 100100, "image_exist": true}]}"#)
            .create_async()
            .await;

        let service = HttpImageService::new(reqwest::Client::new(), server.url());
        let results = service
            .check_images_exist(&[TypedId::mob(100100)])
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].exists);
    }
}
