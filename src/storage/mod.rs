//! All things related to the storage of deliveries

use core::fmt;
use std::future::Future;
use std::net::IpAddr;

use sqlx::PgPool;
use uuid::Uuid;

pub use memory::Memory;
pub use postgres::Postgres;

use crate::deliveries::Delivery;
use crate::deliveries::DeliveryView;
use crate::deliveries::NewDelivery;
use crate::deliveries::Transition;
use crate::deliveries::TransitionOutcome;

mod memory;
mod postgres;

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),

    /// The storage could not be brought up to date
    Migration(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
            Error::Migration(error) => write!(f, "Migration error: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Storage configuration
pub enum Config {
    /// Use Postgres when `DATABASE_URL` is set, memory otherwise
    DetectConfig,

    /// Always use the memory storage
    #[allow(dead_code)] // used by tests
    Memory,

    /// Use an existing Postgres connection
    #[allow(dead_code)] // used by tests
    ExistingConnection(PgPool),
}

/// Values to create a Delivery
pub struct CreateDeliveryValues<'a> {
    /// The actor sending the parcel
    pub sender_id: &'a str,

    /// Display name of the sender
    pub sender_name: Option<&'a str>,

    /// The validated delivery request
    pub new_delivery: &'a NewDelivery,
}

/// Possible audit trail entry types
pub enum AuditEntry<'a> {
    /// Delivery is created
    CreateDelivery(&'a Delivery),

    /// Delivery moved to its next status
    TransitionDelivery(&'a Delivery, &'a Transition),
}

impl AuditEntry<'_> {
    /// The delivery the entry is about
    pub fn delivery(&self) -> &Delivery {
        match self {
            AuditEntry::CreateDelivery(delivery) | AuditEntry::TransitionDelivery(delivery, _) => {
                delivery
            }
        }
    }

    /// Short name of the action
    pub fn action(&self) -> &'static str {
        match self {
            AuditEntry::CreateDelivery(_) => "create",
            AuditEntry::TransitionDelivery(_, transition) => transition.name(),
        }
    }
}

/// Storage with all supported operations
///
/// Transitions are atomic: the status guard is checked and the new status is written as one
/// operation, concurrent transitions on the same delivery can not both apply.
pub trait Storage: Clone + Send + Sync + 'static {
    /// Create a delivery, it starts in `awaiting_receiver`
    fn create_delivery(
        &self,
        values: &CreateDeliveryValues<'_>,
    ) -> impl Future<Output = Result<Delivery>> + Send;

    /// Find a single delivery by ID
    fn find_single_delivery_by_id(
        &self,
        id: &Uuid,
    ) -> impl Future<Output = Result<Option<Delivery>>> + Send;

    /// Find all deliveries in a view, newest first
    fn find_deliveries(
        &self,
        view: &DeliveryView,
    ) -> impl Future<Output = Result<Vec<Delivery>>> + Send;

    /// Attempt a transition on a single delivery
    fn transition_delivery(
        &self,
        id: &Uuid,
        transition: &Transition,
    ) -> impl Future<Output = Result<TransitionOutcome>> + Send;

    /// Register an action on the audit trail
    fn register_audit_trail(
        &self,
        actor_id: &str,
        entry: &AuditEntry<'_>,
        ip_address: Option<&IpAddr>,
    ) -> impl Future<Output = Result<()>> + Send;
}
