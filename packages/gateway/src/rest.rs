//! JSON-over-HTTP farm store client.
//!
//! | Operation | Request |
//! |---|---|
//! | create | `POST {base}/farms` with a [`NewFarm`] body |
//! | update | `PATCH {base}/farms/{id}` with a [`FarmUpdate`] body |
//! | delete | `DELETE {base}/farms/{id}` |
//! | list | `GET {base}/farms?ownerId={owner}` |
//! | get | `GET {base}/farms/{id}` |
//!
//! Responses are bare [`FarmRecord`] JSON (an array for list). A 404 on a
//! by-ID call becomes [`GatewayError::NotFound`]. Requests are sent once;
//! there is no retry.

use async_trait::async_trait;
use farm_map_boundary_models::{FarmRecord, FarmUpdate, NewFarm};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{GatewayConfig, GatewayError, PersistenceGateway};

/// Maximum length of a response body kept in [`GatewayError::Status`].
const BODY_PREVIEW_LEN: usize = 500;

/// Farm store client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: reqwest::Client,
    farms_url: Url,
    auth_token: Option<String>,
}

impl RestGateway {
    /// Builds a client for the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the base URL cannot be
    /// parsed, or [`GatewayError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let farms_url = Url::parse(&format!(
            "{}/farms",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| GatewayError::InvalidConfig {
            message: format!("invalid base_url {:?}: {e}", config.base_url),
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            farms_url,
            auth_token: config.auth_token.clone(),
        })
    }

    /// URL of a single farm, with the ID percent-encoded as one segment.
    fn farm_url(&self, id: &str) -> Result<Url, GatewayError> {
        let mut url = self.farms_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidConfig {
                message: format!("{} cannot be a base URL", self.farms_url),
            })?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and returns the body of a successful response.
    async fn execute(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> Result<String, GatewayError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status, &body, id))
        }
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> Result<T, GatewayError> {
        let body = self.execute(request, id).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Maps a non-success response to a [`GatewayError`].
fn status_error(status: StatusCode, body: &str, id: Option<&str>) -> GatewayError {
    if status == StatusCode::NOT_FOUND
        && let Some(id) = id
    {
        return GatewayError::NotFound { id: id.to_string() };
    }

    let body = if body.len() > BODY_PREVIEW_LEN {
        let mut end = BODY_PREVIEW_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    };

    GatewayError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl PersistenceGateway for RestGateway {
    async fn create(&self, farm: &NewFarm) -> Result<FarmRecord, GatewayError> {
        log::debug!("Creating farm {:?} for owner {}", farm.name, farm.owner_id);
        let record: FarmRecord = self
            .execute_json(self.client.post(self.farms_url.clone()).json(farm), None)
            .await?;
        log::info!("Created farm {} ({:?})", record.id, record.name);
        Ok(record)
    }

    async fn update(&self, id: &str, update: &FarmUpdate) -> Result<FarmRecord, GatewayError> {
        log::debug!("Updating farm {id}");
        let url = self.farm_url(id)?;
        self.execute_json(self.client.patch(url).json(update), Some(id))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        log::debug!("Deleting farm {id}");
        let url = self.farm_url(id)?;
        self.execute(self.client.delete(url), Some(id)).await?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FarmRecord>, GatewayError> {
        let request = self
            .client
            .get(self.farms_url.clone())
            .query(&[("ownerId", owner_id)]);
        let records: Vec<FarmRecord> = self.execute_json(request, None).await?;
        log::debug!("Listed {} farms for owner {owner_id}", records.len());
        Ok(records)
    }

    async fn get_by_id(&self, id: &str) -> Result<FarmRecord, GatewayError> {
        let url = self.farm_url(id)?;
        self.execute_json(self.client.get(url), Some(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base_url: &str) -> RestGateway {
        RestGateway::new(&GatewayConfig {
            base_url: base_url.to_string(),
            auth_token: None,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn farm_urls_are_built_under_base() {
        let gateway = gateway("https://farms.example.com/api/");
        assert_eq!(
            gateway.farms_url.as_str(),
            "https://farms.example.com/api/farms"
        );
        assert_eq!(
            gateway.farm_url("abc-123").unwrap().as_str(),
            "https://farms.example.com/api/farms/abc-123"
        );
    }

    #[test]
    fn farm_ids_are_percent_encoded() {
        let gateway = gateway("https://farms.example.com/api");
        assert_eq!(
            gateway.farm_url("a/b c").unwrap().as_str(),
            "https://farms.example.com/api/farms/a%2Fb%20c"
        );
    }

    #[test]
    fn not_found_with_id_maps_to_not_found() {
        let err = status_error(StatusCode::NOT_FOUND, "", Some("farm-9"));
        assert!(matches!(err, GatewayError::NotFound { id } if id == "farm-9"));

        let err = status_error(StatusCode::NOT_FOUND, "no route", None);
        assert!(matches!(err, GatewayError::Status { status: 404, .. }));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "é".repeat(400);
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, &body, None);
        let GatewayError::Status { status, body } = err else {
            panic!("expected Status error");
        };
        assert_eq!(status, 500);
        assert!(body.ends_with("..."));
        assert!(body.len() <= BODY_PREVIEW_LEN + 3);
    }
}
