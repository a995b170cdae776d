//! Postgres storage

use std::net::IpAddr;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::ipnetwork::IpNetwork;
use uuid::Uuid;

use crate::deliveries::Delivery;
use crate::deliveries::DeliveryView;
use crate::deliveries::Evaluation;
use crate::deliveries::Status;
use crate::deliveries::Transition;
use crate::deliveries::TransitionOutcome;

use super::AuditEntry;
use super::CreateDeliveryValues;
use super::Error;
use super::Result;
use super::Storage;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres type for delivery status
#[derive(Clone, Copy, PartialEq, Debug, sqlx::Type)]
#[sqlx(type_name = "delivery_status_type")]
#[sqlx(rename_all = "snake_case")]
enum DeliveryStatusType {
    /// Waiting on the receiver
    AwaitingReceiver,

    /// Waiting on a driver
    AwaitingDriver,

    /// Driver assigned
    Assigned,

    /// Waiting on the receiver to confirm
    DeliveredPendingReceiver,

    /// Done
    Completed,
}

impl DeliveryStatusType {
    /// Create delivery status type from status
    fn from_status(status: Status) -> Self {
        match status {
            Status::AwaitingReceiver => Self::AwaitingReceiver,
            Status::AwaitingDriver => Self::AwaitingDriver,
            Status::Assigned => Self::Assigned,
            Status::DeliveredPendingReceiver => Self::DeliveredPendingReceiver,
            Status::Completed => Self::Completed,
        }
    }

    /// Create status from delivery status type
    fn to_status(self) -> Status {
        match self {
            Self::AwaitingReceiver => Status::AwaitingReceiver,
            Self::AwaitingDriver => Status::AwaitingDriver,
            Self::Assigned => Status::Assigned,
            Self::DeliveredPendingReceiver => Status::DeliveredPendingReceiver,
            Self::Completed => Status::Completed,
        }
    }
}

/// Postgres type for audit trail entry type
#[derive(PartialEq, Debug, sqlx::Type)]
#[sqlx(type_name = "audit_trail_entry_type")]
#[sqlx(rename_all = "kebab-case")]
enum AuditEntryType {
    /// Delivery is created
    CreateDelivery,

    /// Receiver acknowledged
    AcknowledgeDelivery,

    /// Driver accepted
    AcceptDelivery,

    /// Driver delivered
    DeliverDelivery,

    /// Receiver confirmed
    ConfirmDelivery,
}

impl AuditEntryType {
    /// Create audit entry type from audit entry
    fn from_audit_entry(entry: &AuditEntry) -> Self {
        match entry {
            AuditEntry::CreateDelivery(_) => Self::CreateDelivery,
            AuditEntry::TransitionDelivery(_, transition) => match transition {
                Transition::Acknowledge => Self::AcknowledgeDelivery,
                Transition::Accept { .. } => Self::AcceptDelivery,
                Transition::Deliver { .. } => Self::DeliverDelivery,
                Transition::Confirm => Self::ConfirmDelivery,
            },
        }
    }
}

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Migrations will be run
    pub async fn connect(database_connection_string: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Migration(err.to_string()))?;

        Ok(Self { connection_pool })
    }
}

/// Postgres version of delivery
#[derive(sqlx::FromRow)]
struct PostgresDelivery {
    id: Uuid,
    title: String,
    items: String,
    pickup_address: String,
    dropoff_address: String,
    pickup_zip: Option<String>,
    dropoff_zip: Option<String>,
    package_type: Option<String>,
    weight: Option<f64>,
    weight_unit: Option<String>,
    item_value: Option<f64>,
    instructions: Option<String>,
    offer: f64,
    sender_id: String,
    sender_name: Option<String>,
    receiver_name: Option<String>,
    receiver_contact: Option<String>,
    community_id: Option<String>,
    status: DeliveryStatusType,
    assigned_driver_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Delivery {
    /// Create delivery from postgres version
    fn from_postgres_delivery(delivery: PostgresDelivery) -> Self {
        Self {
            id: delivery.id,
            title: delivery.title,
            items: delivery.items,
            pickup_address: delivery.pickup_address,
            dropoff_address: delivery.dropoff_address,
            pickup_zip: delivery.pickup_zip,
            dropoff_zip: delivery.dropoff_zip,
            package_type: delivery.package_type,
            weight: delivery.weight,
            weight_unit: delivery.weight_unit,
            item_value: delivery.item_value,
            instructions: delivery.instructions,
            offer: delivery.offer,
            sender_id: delivery.sender_id,
            sender_name: delivery.sender_name,
            receiver_name: delivery.receiver_name,
            receiver_contact: delivery.receiver_contact,
            community_id: delivery.community_id,
            status: delivery.status.to_status(),
            assigned_driver_id: delivery.assigned_driver_id,
            created_at: delivery.created_at,
            updated_at: delivery.updated_at,
        }
    }

    /// Maybe create delivery from postgres version
    fn from_postgres_delivery_optional(delivery: Option<PostgresDelivery>) -> Option<Self> {
        delivery.map(Self::from_postgres_delivery)
    }

    /// Create multiple deliveries from postgres version
    fn from_postgres_delivery_multiple(mut deliveries: Vec<PostgresDelivery>) -> Vec<Self> {
        deliveries
            .drain(..)
            .map(Self::from_postgres_delivery)
            .collect::<Vec<Self>>()
    }
}

impl Storage for Postgres {
    async fn create_delivery(&self, values: &CreateDeliveryValues<'_>) -> Result<Delivery> {
        let new_delivery = values.new_delivery;

        let delivery = sqlx::query_as::<_, PostgresDelivery>(
            r"
            INSERT INTO deliveries (
                id,
                title,
                items,
                pickup_address,
                dropoff_address,
                pickup_zip,
                dropoff_zip,
                package_type,
                weight,
                weight_unit,
                item_value,
                instructions,
                offer,
                sender_id,
                sender_name,
                receiver_name,
                receiver_contact,
                community_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(&new_delivery.title)
        .bind(&new_delivery.items)
        .bind(&new_delivery.pickup_address)
        .bind(&new_delivery.dropoff_address)
        .bind(&new_delivery.pickup_zip)
        .bind(&new_delivery.dropoff_zip)
        .bind(&new_delivery.package_type)
        .bind(new_delivery.weight)
        .bind(&new_delivery.weight_unit)
        .bind(new_delivery.item_value)
        .bind(&new_delivery.instructions)
        .bind(new_delivery.offer)
        .bind(values.sender_id)
        .bind(values.sender_name)
        .bind(&new_delivery.receiver_name)
        .bind(&new_delivery.receiver_contact)
        .bind(&new_delivery.community_id)
        .fetch_one(&self.connection_pool)
        .await
        .map(Delivery::from_postgres_delivery)
        .map_err(connection_error)?;

        Ok(delivery)
    }

    async fn find_single_delivery_by_id(&self, id: &Uuid) -> Result<Option<Delivery>> {
        let delivery = sqlx::query_as::<_, PostgresDelivery>(
            r"
            SELECT *
            FROM deliveries
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Delivery::from_postgres_delivery_optional)
        .map_err(connection_error)?;

        Ok(delivery)
    }

    async fn find_deliveries(&self, view: &DeliveryView) -> Result<Vec<Delivery>> {
        let statuses = view
            .statuses()
            .iter()
            .map(|status| status.as_str().to_string())
            .collect::<Vec<String>>();

        let deliveries = sqlx::query_as::<_, PostgresDelivery>(
            r"
            SELECT *
            FROM deliveries
            WHERE status::text = ANY($1)
                AND ($2::text IS NULL OR sender_id = $2)
                AND ($3::text IS NULL OR community_id = $3)
                AND (status <> 'assigned' OR NOT $4 OR assigned_driver_id = $5)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(statuses)
        .bind(view.sender_id())
        .bind(view.community_id())
        .bind(view.restricts_assigned())
        .bind(view.driver_id())
        .fetch_all(&self.connection_pool)
        .await
        .map(Delivery::from_postgres_delivery_multiple)
        .map_err(connection_error)?;

        Ok(deliveries)
    }

    async fn transition_delivery(
        &self,
        id: &Uuid,
        transition: &Transition,
    ) -> Result<TransitionOutcome> {
        let driver_guard = transition.driver_guard();

        // single conditional update, the guard is part of the `WHERE`
        let updated = sqlx::query_as::<_, PostgresDelivery>(
            r"
            UPDATE deliveries
            SET
                status = $3,
                assigned_driver_id = COALESCE($4, assigned_driver_id),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
                AND status = $2
                AND (NOT $5 OR assigned_driver_id IS NULL OR assigned_driver_id = $6)
            RETURNING *
            ",
        )
        .bind(id)
        .bind(DeliveryStatusType::from_status(transition.from_status()))
        .bind(DeliveryStatusType::from_status(transition.to_status()))
        .bind(transition.assigned_driver())
        .bind(driver_guard.is_some())
        .bind(driver_guard.flatten())
        .fetch_optional(&self.connection_pool)
        .await
        .map(Delivery::from_postgres_delivery_optional)
        .map_err(connection_error)?;

        if let Some(delivery) = updated {
            return Ok(TransitionOutcome::Applied(delivery));
        }

        let outcome = match self.find_single_delivery_by_id(id).await? {
            None => TransitionOutcome::NotFound,
            Some(delivery) => match transition.evaluate(&delivery) {
                Evaluation::Unchanged => TransitionOutcome::Unchanged(delivery),
                // a guard that holds now was changed under us, statuses only move forward
                Evaluation::Apply | Evaluation::Conflict => TransitionOutcome::Conflict(delivery),
            },
        };

        Ok(outcome)
    }

    async fn register_audit_trail(
        &self,
        actor_id: &str,
        entry: &AuditEntry<'_>,
        ip_address: Option<&IpAddr>,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO audit_trail (id, type, created_by, delivery_id, ip_address)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(Uuid::new_v4())
        .bind(AuditEntryType::from_audit_entry(entry))
        .bind(actor_id)
        .bind(entry.delivery().id)
        .bind(ip_address.map(|ip_address| IpNetwork::from(*ip_address)))
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }
}

/// Transform any error into a connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
