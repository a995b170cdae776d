//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::deliveries::Delivery;
use crate::deliveries::DeliveryView;
use crate::deliveries::Transition;
use crate::deliveries::TransitionOutcome;

use super::AuditEntry;
use super::CreateDeliveryValues;
use super::Result;
use super::Storage;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All deliveries in storage
    deliveries: Arc<Mutex<HashMap<Uuid, Delivery>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for Memory {
    async fn create_delivery(&self, values: &CreateDeliveryValues<'_>) -> Result<Delivery> {
        let delivery = Delivery::new(
            Uuid::new_v4(),
            values.sender_id,
            values.sender_name,
            values.new_delivery,
            Utc::now(),
        );

        self.deliveries
            .lock()
            .await
            .insert(delivery.id, delivery.clone());

        Ok(delivery)
    }

    async fn find_single_delivery_by_id(&self, id: &Uuid) -> Result<Option<Delivery>> {
        Ok(self.deliveries.lock().await.get(id).cloned())
    }

    async fn find_deliveries(&self, view: &DeliveryView) -> Result<Vec<Delivery>> {
        Ok(view.select(self.deliveries.lock().await.values()))
    }

    async fn transition_delivery(
        &self,
        id: &Uuid,
        transition: &Transition,
    ) -> Result<TransitionOutcome> {
        // guard check and write under the same lock
        let mut deliveries = self.deliveries.lock().await;

        Ok(deliveries
            .get_mut(id)
            .map_or(TransitionOutcome::NotFound, |delivery| {
                transition.run(delivery, Utc::now())
            }))
    }

    async fn register_audit_trail(
        &self,
        actor_id: &str,
        entry: &AuditEntry<'_>,
        ip_address: Option<&IpAddr>,
    ) -> Result<()> {
        tracing::debug!(
            delivery_id = %entry.delivery().id,
            actor_id,
            ip_address = ?ip_address,
            "Audit trail: {}",
            entry.action()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::deliveries::DeliveryDraft;
    use crate::deliveries::Role;
    use crate::deliveries::Status;

    use super::*;

    async fn create(storage: &Memory, zip: &str) -> Delivery {
        let new_delivery = DeliveryDraft {
            items: Some("Groceries".to_string()),
            pickup_address: Some("1 Main St".to_string()),
            dropoff_address: Some("2 Main St".to_string()),
            pickup_zip: Some(zip.to_string()),
            dropoff_zip: Some(zip.to_string()),
            weight: Some(1.0),
            weight_unit: Some("kg".to_string()),
            offer: Some(20.0),
            ..DeliveryDraft::default()
        }
        .validate()
        .unwrap();

        let values = CreateDeliveryValues {
            sender_id: "sender",
            sender_name: Some("Sender"),
            new_delivery: &new_delivery,
        };

        storage.create_delivery(&values).await.unwrap()
    }

    #[tokio::test]
    async fn test_transition_unknown_delivery() {
        let storage = Memory::new();

        let outcome = storage
            .transition_delivery(&Uuid::new_v4(), &Transition::Acknowledge)
            .await
            .unwrap();

        assert_eq!(outcome, TransitionOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_transition_is_persisted() {
        let storage = Memory::new();
        let delivery = create(&storage, "60661").await;

        let outcome = storage
            .transition_delivery(&delivery.id, &Transition::Acknowledge)
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Applied(_)));

        let stored = storage
            .find_single_delivery_by_id(&delivery.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, Status::AwaitingDriver);
        assert_eq!(stored.created_at, delivery.created_at);

        let view = DeliveryView::for_role(Role::Driver, "driverA", Some("60661".to_string()));
        let listed = storage.find_deliveries(&view).await.unwrap();
        assert_eq!(listed, vec![stored]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_drivers_single_winner() {
        let storage = Memory::new();
        let delivery = create(&storage, "60661").await;

        storage
            .transition_delivery(&delivery.id, &Transition::Acknowledge)
            .await
            .unwrap();

        let handles = (0..8)
            .map(|driver| {
                let storage = storage.clone();
                let id = delivery.id;

                tokio::spawn(async move {
                    let transition = Transition::Accept {
                        driver_id: format!("driver-{driver}"),
                    };

                    storage.transition_delivery(&id, &transition).await.unwrap()
                })
            })
            .collect::<Vec<_>>();

        let mut applied = Vec::new();
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                TransitionOutcome::Applied(delivery) => applied.push(delivery),
                TransitionOutcome::Conflict(_) => conflicts += 1,
                outcome => panic!("Unexpected outcome: {outcome:?}"),
            }
        }

        assert_eq!(applied.len(), 1);
        assert_eq!(conflicts, 7);

        let stored = storage
            .find_single_delivery_by_id(&delivery.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.assigned_driver_id, applied[0].assigned_driver_id);
    }
}
