//! In-process farm store.
//!
//! Keeps records in a map behind a `tokio` mutex. Useful for hosts running
//! without a backend and for exercising the capture flow end to end. Can
//! be told to fail the next N creates to simulate an outage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use farm_map_boundary_models::{FarmRecord, FarmUpdate, NewFarm};
use tokio::sync::Mutex;

use crate::{GatewayError, PersistenceGateway};

#[derive(Debug, Default)]
struct Store {
    records: BTreeMap<String, FarmRecord>,
    failing_creates: u32,
}

/// [`PersistenceGateway`] holding records in memory.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    store: Mutex<Store>,
}

impl InMemoryGateway {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls to `create` fail with
    /// [`GatewayError::Unavailable`].
    pub async fn fail_next_creates(&self, count: u32) {
        self.store.lock().await.failing_creates = count;
    }

    /// Number of stored records across all owners.
    pub async fn len(&self) -> usize {
        self.store.lock().await.records.len()
    }

    /// Whether no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.records.is_empty()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn create(&self, farm: &NewFarm) -> Result<FarmRecord, GatewayError> {
        let mut store = self.store.lock().await;
        if store.failing_creates > 0 {
            store.failing_creates -= 1;
            return Err(GatewayError::Unavailable {
                message: "simulated outage".to_string(),
            });
        }

        let record = FarmRecord {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: farm.owner_id.clone(),
            name: farm.name.clone(),
            area_value: farm.area_value,
            unit: farm.unit,
            boundary: farm.boundary.clone(),
        };
        store.records.insert(record.id.clone(), record.clone());
        log::debug!("Stored farm {} in memory", record.id);
        Ok(record)
    }

    async fn update(&self, id: &str, update: &FarmUpdate) -> Result<FarmRecord, GatewayError> {
        let mut store = self.store.lock().await;
        let record = store
            .records
            .get_mut(id)
            .ok_or_else(|| GatewayError::NotFound { id: id.to_string() })?;
        record.apply(update);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        self.store
            .lock()
            .await
            .records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound { id: id.to_string() })
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FarmRecord>, GatewayError> {
        let store = self.store.lock().await;
        let mut records: Vec<FarmRecord> = store
            .records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn get_by_id(&self, id: &str) -> Result<FarmRecord, GatewayError> {
        self.store
            .lock()
            .await
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_map_boundary_models::{AreaUnit, GeoPoint};
    use farm_map_geometry::payload::{RingClosure, polygon_feature};

    fn new_farm(owner_id: &str, name: &str) -> NewFarm {
        let points = [
            GeoPoint::new(0.0, 0.0).unwrap(),
            GeoPoint::new(0.0, 0.001).unwrap(),
            GeoPoint::new(0.001, 0.001).unwrap(),
        ];
        NewFarm {
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            area_value: 1.5,
            unit: AreaUnit::Acre,
            boundary: polygon_feature(&points, RingClosure::Open),
        }
    }

    #[tokio::test]
    async fn create_then_get_and_list() {
        let gateway = InMemoryGateway::new();
        let created = gateway.create(&new_farm("owner-1", "West")).await.unwrap();
        gateway.create(&new_farm("owner-1", "East")).await.unwrap();
        gateway.create(&new_farm("owner-2", "Other")).await.unwrap();

        let fetched = gateway.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);

        let names: Vec<String> = gateway
            .list_by_owner("owner-1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["East", "West"]);
        assert_eq!(gateway.len().await, 3);
    }

    #[tokio::test]
    async fn update_changes_metadata_only() {
        let gateway = InMemoryGateway::new();
        let created = gateway.create(&new_farm("owner-1", "West")).await.unwrap();

        let updated = gateway
            .update(
                &created.id,
                &FarmUpdate::default()
                    .with_area(0.607_029)
                    .with_unit(AreaUnit::Hectare),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "West");
        assert_eq!(updated.unit, AreaUnit::Hectare);
        assert!((updated.area_value - 0.61).abs() < 1e-12);
        assert_eq!(updated.boundary, created.boundary);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let gateway = InMemoryGateway::new();
        assert!(matches!(
            gateway.get_by_id("nope").await,
            Err(GatewayError::NotFound { .. })
        ));
        assert!(matches!(
            gateway.delete("nope").await,
            Err(GatewayError::NotFound { .. })
        ));
        assert!(matches!(
            gateway.update("nope", &FarmUpdate::default()).await,
            Err(GatewayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let gateway = InMemoryGateway::new();
        let created = gateway.create(&new_farm("owner-1", "West")).await.unwrap();
        gateway.delete(&created.id).await.unwrap();
        assert!(gateway.is_empty().await);
    }

    #[tokio::test]
    async fn simulated_outage_fails_then_recovers() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next_creates(1).await;

        assert!(matches!(
            gateway.create(&new_farm("owner-1", "West")).await,
            Err(GatewayError::Unavailable { .. })
        ));
        assert!(gateway.create(&new_farm("owner-1", "West")).await.is_ok());
    }
}
