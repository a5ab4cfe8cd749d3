//! # Remote API Client
//!
//! The seam between the sync core and the rental service. The sync engine
//! only knows the [`RemoteApi`] trait; [`HttpRemoteApi`] is the JSON-over-HTTP
//! implementation used by the application, and tests inject their own.
//!
//! Endpoints used by [`HttpRemoteApi`]:
//!
//! | operation | request |
//! |-----------|---------|
//! | create    | `POST   {base}/api/{collection}` |
//! | update    | `PUT    {base}/api/{collection}/{id}` |
//! | delete    | `DELETE {base}/api/{collection}/{id}` |
//!
//! with collections `properties`, `rooms`, `tenants` and `payments`.

use crate::shared::change::{ChangeOperation, PendingChange};
use crate::shared::config::SyncConfig;
use crate::shared::entities::{Entity, EntityType, PaymentRecord, Property, Room, Tenant};
use crate::shared::error::RemoteError;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;

/// Result type for remote calls
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Per-entity create/update/delete operations of the rental service
///
/// Implementations are expected to bound every call with their own timeout.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn create_property(&self, property: &Property) -> RemoteResult<Property>;
    async fn update_property(&self, id: &str, property: &Property) -> RemoteResult<Property>;
    async fn delete_property(&self, id: &str) -> RemoteResult<()>;

    async fn create_room(&self, room: &Room) -> RemoteResult<Room>;
    async fn update_room(&self, id: &str, room: &Room) -> RemoteResult<Room>;
    async fn delete_room(&self, id: &str) -> RemoteResult<()>;

    async fn create_tenant(&self, tenant: &Tenant) -> RemoteResult<Tenant>;
    async fn update_tenant(&self, id: &str, tenant: &Tenant) -> RemoteResult<Tenant>;
    async fn delete_tenant(&self, id: &str) -> RemoteResult<()>;

    async fn create_payment_record(&self, payment: &PaymentRecord) -> RemoteResult<PaymentRecord>;
    async fn update_payment_record(&self, id: &str, payment: &PaymentRecord) -> RemoteResult<PaymentRecord>;
    async fn delete_payment_record(&self, id: &str) -> RemoteResult<()>;
}

/// Replay one pending change against the remote service
///
/// Dispatches on `(entity_type, operation)`. The server's answer is dropped;
/// only success or failure matters here.
pub async fn replay(remote: &dyn RemoteApi, change: &PendingChange) -> RemoteResult<()> {
    let id = change.entity_id.as_str();
    match (change.entity_type, change.operation) {
        (EntityType::Property, ChangeOperation::Create) => {
            remote.create_property(&decode(&change.data)?).await?;
        }
        (EntityType::Property, ChangeOperation::Update) => {
            remote.update_property(id, &decode(&change.data)?).await?;
        }
        (EntityType::Property, ChangeOperation::Delete) => remote.delete_property(id).await?,

        (EntityType::Room, ChangeOperation::Create) => {
            remote.create_room(&decode(&change.data)?).await?;
        }
        (EntityType::Room, ChangeOperation::Update) => {
            remote.update_room(id, &decode(&change.data)?).await?;
        }
        (EntityType::Room, ChangeOperation::Delete) => remote.delete_room(id).await?,

        (EntityType::Tenant, ChangeOperation::Create) => {
            remote.create_tenant(&decode(&change.data)?).await?;
        }
        (EntityType::Tenant, ChangeOperation::Update) => {
            remote.update_tenant(id, &decode(&change.data)?).await?;
        }
        (EntityType::Tenant, ChangeOperation::Delete) => remote.delete_tenant(id).await?,

        (EntityType::PaymentRecord, ChangeOperation::Create) => {
            remote.create_payment_record(&decode(&change.data)?).await?;
        }
        (EntityType::PaymentRecord, ChangeOperation::Update) => {
            remote.update_payment_record(id, &decode(&change.data)?).await?;
        }
        (EntityType::PaymentRecord, ChangeOperation::Delete) => {
            remote.delete_payment_record(id).await?
        }
    }
    Ok(())
}

fn decode<E: Entity>(data: &Value) -> RemoteResult<E> {
    Ok(serde_json::from_value(data.clone())?)
}

/// Path segment of an entity collection
pub fn collection(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Property => "properties",
        EntityType::Room => "rooms",
        EntityType::Tenant => "tenants",
        EntityType::PaymentRecord => "payments",
    }
}

/// JSON-over-HTTP client for the rental service
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRemoteApi {
    /// Build a client with the configured base URL, token and timeout
    pub fn new(config: &SyncConfig) -> RemoteResult<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", config.api_base_url, e)))?;
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, entity_type: EntityType, id: Option<&str>) -> RemoteResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("api").push(collection(entity_type));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// The server's copy of an accepted entity
    ///
    /// Once the status is 2xx the change is applied, so an empty, unreadable
    /// or differently shaped body yields the entity that was sent.
    async fn accepted<E: Entity>(response: Response, sent: &E) -> RemoteResult<E> {
        let response = Self::check(response).await?;
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Unreadable {} response body: {}", E::ENTITY_TYPE, e);
                return Ok(sent.clone());
            }
        };

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(sent.clone());
        }
        match serde_json::from_slice(&body) {
            Ok(entity) => Ok(entity),
            Err(e) => {
                tracing::debug!("Ignoring unrecognized {} response body: {}", E::ENTITY_TYPE, e);
                Ok(sent.clone())
            }
        }
    }

    async fn create<E: Entity>(&self, entity: &E) -> RemoteResult<E> {
        let url = self.endpoint(E::ENTITY_TYPE, None)?;
        let response = self.request(Method::POST, url).json(entity).send().await?;
        Self::accepted(response, entity).await
    }

    async fn update<E: Entity>(&self, id: &str, entity: &E) -> RemoteResult<E> {
        let url = self.endpoint(E::ENTITY_TYPE, Some(id))?;
        let response = self.request(Method::PUT, url).json(entity).send().await?;
        Self::accepted(response, entity).await
    }

    async fn delete(&self, entity_type: EntityType, id: &str) -> RemoteResult<()> {
        let url = self.endpoint(entity_type, Some(id))?;
        let response = self.request(Method::DELETE, url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn create_property(&self, property: &Property) -> RemoteResult<Property> {
        self.create(property).await
    }

    async fn update_property(&self, id: &str, property: &Property) -> RemoteResult<Property> {
        self.update(id, property).await
    }

    async fn delete_property(&self, id: &str) -> RemoteResult<()> {
        self.delete(EntityType::Property, id).await
    }

    async fn create_room(&self, room: &Room) -> RemoteResult<Room> {
        self.create(room).await
    }

    async fn update_room(&self, id: &str, room: &Room) -> RemoteResult<Room> {
        self.update(id, room).await
    }

    async fn delete_room(&self, id: &str) -> RemoteResult<()> {
        self.delete(EntityType::Room, id).await
    }

    async fn create_tenant(&self, tenant: &Tenant) -> RemoteResult<Tenant> {
        self.create(tenant).await
    }

    async fn update_tenant(&self, id: &str, tenant: &Tenant) -> RemoteResult<Tenant> {
        self.update(id, tenant).await
    }

    async fn delete_tenant(&self, id: &str) -> RemoteResult<()> {
        self.delete(EntityType::Tenant, id).await
    }

    async fn create_payment_record(&self, payment: &PaymentRecord) -> RemoteResult<PaymentRecord> {
        self.create(payment).await
    }

    async fn update_payment_record(&self, id: &str, payment: &PaymentRecord) -> RemoteResult<PaymentRecord> {
        self.update(id, payment).await
    }

    async fn delete_payment_record(&self, id: &str) -> RemoteResult<()> {
        self.delete(EntityType::PaymentRecord, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpRemoteApi {
        let config = SyncConfig::builder().api_base_url(base).build().unwrap();
        HttpRemoteApi::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let api = client("https://rent.example.com");
        assert_eq!(
            api.endpoint(EntityType::Room, None).unwrap().as_str(),
            "https://rent.example.com/api/rooms"
        );
        assert_eq!(
            api.endpoint(EntityType::PaymentRecord, Some("p 1")).unwrap().as_str(),
            "https://rent.example.com/api/payments/p%201"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://rent.example.com/v2/");
        assert_eq!(
            api.endpoint(EntityType::Tenant, Some("t1")).unwrap().as_str(),
            "https://rent.example.com/v2/api/tenants/t1"
        );
    }
}
