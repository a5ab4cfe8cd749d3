//! Recording mock of the remote API
//!
//! Every call is logged with the payload the engine sent. Calls can be made
//! to fail by entity id or by method name, or to wait on a semaphore.

use async_trait::async_trait;
use rentsync::shared::{PaymentRecord, Property, RemoteError, Room, Tenant};
use rentsync::sync::remote::RemoteResult;
use rentsync::sync::RemoteApi;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// One recorded remote call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub id: String,
    pub payload: Value,
}

#[derive(Debug, Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<RecordedCall>>,
    failing: Mutex<HashSet<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits for one permit of `gate`
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }

    /// Fail every call for this entity id or method name
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    /// Stop failing calls for `key`
    pub fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    fn record<T: Serialize>(&self, method: &str, id: &str, payload: &T) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            id: id.to_string(),
            payload: serde_json::to_value(payload).unwrap(),
        });

        let failing = self.failing.lock().unwrap();
        if failing.contains(id) || failing.contains(method) {
            return Err(RemoteError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for RecordingRemote {
    async fn create_property(&self, property: &Property) -> RemoteResult<Property> {
        self.pass_gate().await;
        self.record("create_property", &property.id, property)?;
        Ok(property.clone())
    }

    async fn update_property(&self, id: &str, property: &Property) -> RemoteResult<Property> {
        self.pass_gate().await;
        self.record("update_property", id, property)?;
        Ok(property.clone())
    }

    async fn delete_property(&self, id: &str) -> RemoteResult<()> {
        self.pass_gate().await;
        self.record("delete_property", id, &json!({ "id": id }))
    }

    async fn create_room(&self, room: &Room) -> RemoteResult<Room> {
        self.pass_gate().await;
        self.record("create_room", &room.id, room)?;
        Ok(room.clone())
    }

    async fn update_room(&self, id: &str, room: &Room) -> RemoteResult<Room> {
        self.pass_gate().await;
        self.record("update_room", id, room)?;
        Ok(room.clone())
    }

    async fn delete_room(&self, id: &str) -> RemoteResult<()> {
        self.pass_gate().await;
        self.record("delete_room", id, &json!({ "id": id }))
    }

    async fn create_tenant(&self, tenant: &Tenant) -> RemoteResult<Tenant> {
        self.pass_gate().await;
        self.record("create_tenant", &tenant.id, tenant)?;
        Ok(tenant.clone())
    }

    async fn update_tenant(&self, id: &str, tenant: &Tenant) -> RemoteResult<Tenant> {
        self.pass_gate().await;
        self.record("update_tenant", id, tenant)?;
        Ok(tenant.clone())
    }

    async fn delete_tenant(&self, id: &str) -> RemoteResult<()> {
        self.pass_gate().await;
        self.record("delete_tenant", id, &json!({ "id": id }))
    }

    async fn create_payment_record(&self, payment: &PaymentRecord) -> RemoteResult<PaymentRecord> {
        self.pass_gate().await;
        self.record("create_payment_record", &payment.id, payment)?;
        Ok(payment.clone())
    }

    async fn update_payment_record(&self, id: &str, payment: &PaymentRecord) -> RemoteResult<PaymentRecord> {
        self.pass_gate().await;
        self.record("update_payment_record", id, payment)?;
        Ok(payment.clone())
    }

    async fn delete_payment_record(&self, id: &str) -> RemoteResult<()> {
        self.pass_gate().await;
        self.record("delete_payment_record", id, &json!({ "id": id }))
    }
}
