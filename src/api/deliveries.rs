//! Deliveries API endpoints
//!
//! Everything related to the delivery lifecycle: senders create deliveries, receivers
//! acknowledge and confirm them, drivers accept and deliver them

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::deliveries::Delivery;
use crate::deliveries::DeliveryDraft;
use crate::deliveries::DeliveryView;
use crate::deliveries::Role;
use crate::deliveries::Status;
use crate::deliveries::Transition;
use crate::deliveries::TransitionOutcome;
use crate::deliveries::non_blank;
use crate::storage::AuditEntry;
use crate::storage::CreateDeliveryValues;
use crate::storage::Storage;

use super::AuditTrail;
use super::CurrentActor;
use super::Error;
use super::Form;
use super::PathParameters;
use super::QueryParameters;
use super::Success;

/// Delivery response going to the actor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub id: Uuid,
    pub title: String,
    pub items: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_zip: Option<String>,
    pub dropoff_zip: Option<String>,
    pub package_type: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub item_value: Option<f64>,
    pub instructions: Option<String>,
    pub offer: f64,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_contact: Option<String>,
    pub community_id: Option<String>,
    pub status: Status,
    pub assigned_driver_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryResponse {
    /// Create a response from a [`Delivery`](Delivery)
    fn from_delivery(delivery: Delivery) -> Self {
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
            status: delivery.status,
            assigned_driver_id: delivery.assigned_driver_id,
            created_at: delivery.created_at,
            updated_at: delivery.updated_at,
        }
    }

    /// Create a response from multiple [`Delivery`](Delivery)s
    fn from_delivery_multiple(mut deliveries: Vec<Delivery>) -> Vec<Self> {
        deliveries
            .drain(..)
            .map(Self::from_delivery)
            .collect::<Vec<Self>>()
    }
}

/// List query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Perspective to list from: `sender`, `driver` or `receiver`
    role: Role,

    /// Community to scope drivers and receivers to, defaults to the community of the actor
    community_id: Option<String>,
}

/// List deliveries for a role
///
/// Senders see everything they sent, drivers see what waits for a driver plus their own
/// assignments, receivers see everything not completed yet
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/api/deliveries?role=driver&communityId=60661'
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "id": "<uuid>", "status": "awaiting_driver" ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_actor: CurrentActor,
    QueryParameters(query): QueryParameters<ListQuery>,
) -> Result<Success<Vec<DeliveryResponse>>, Error> {
    // stored communities are trimmed pickup zips
    let community_id =
        non_blank(query.community_id).or_else(|| non_blank(current_actor.community.clone()));

    let view = DeliveryView::for_role(query.role, &current_actor.id, community_id);

    let deliveries = storage
        .find_deliveries(&view)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(DeliveryResponse::from_delivery_multiple(
        deliveries,
    )))
}

/// Get a single delivery
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/deliveries/<uuid>
/// ```
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    _current_actor: CurrentActor,
    PathParameters(delivery_id): PathParameters<Uuid>,
) -> Result<Success<DeliveryResponse>, Error> {
    storage
        .find_single_delivery_by_id(&delivery_id)
        .await
        .map_err(Error::internal_server_error)?
        .map_or_else(
            || Err(Error::not_found("Delivery not found")),
            |delivery| Ok(Success::ok(DeliveryResponse::from_delivery(delivery))),
        )
}

/// Create delivery form
///
/// Required fields are optional here, so a missing one gets a proper validation message
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryForm {
    title: Option<String>,
    items: Option<String>,
    pickup_address: Option<String>,
    dropoff_address: Option<String>,
    pickup_zip: Option<String>,
    dropoff_zip: Option<String>,
    package_type: Option<String>,
    weight: Option<f64>,
    weight_unit: Option<String>,
    item_value: Option<f64>,
    instructions: Option<String>,
    offer: Option<f64>,
    receiver_name: Option<String>,
    receiver_contact: Option<String>,
}

impl CreateDeliveryForm {
    /// Turn the form into a draft for validation
    fn into_draft(self) -> DeliveryDraft {
        DeliveryDraft {
            title: self.title,
            items: self.items,
            pickup_address: self.pickup_address,
            dropoff_address: self.dropoff_address,
            pickup_zip: self.pickup_zip,
            dropoff_zip: self.dropoff_zip,
            package_type: self.package_type,
            weight: self.weight,
            weight_unit: self.weight_unit,
            item_value: self.item_value,
            instructions: self.instructions,
            offer: self.offer,
            receiver_name: self.receiver_name,
            receiver_contact: self.receiver_contact,
        }
    }
}

/// Create a delivery based on the [`CreateDeliveryForm`](CreateDeliveryForm) form
///
/// The actor is the sender, the community is derived from the pickup zip
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "items": "Books", "pickupAddress": "500 W Madison St", "pickupZip": "60661", ... }' \
///     http://localhost:6000/api/deliveries
/// ```
///
/// Response
/// ```json
/// { "data": { "id": "<uuid>", "status": "awaiting_receiver" ... } }
/// ```
pub async fn create<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_actor: CurrentActor,
    Form(form): Form<CreateDeliveryForm>,
) -> Result<Success<DeliveryResponse>, Error> {
    let new_delivery = form
        .into_draft()
        .validate()
        .map_err(Error::bad_request)?;

    let values = CreateDeliveryValues {
        sender_id: &current_actor.id,
        sender_name: current_actor.name.as_deref(),
        new_delivery: &new_delivery,
    };

    let delivery = storage
        .create_delivery(&values)
        .await
        .map_err(Error::internal_server_error)?;

    tracing::info!(
        delivery_id = %delivery.id,
        sender_id = %delivery.sender_id,
        "Delivery created"
    );

    audit_trail
        .register(AuditEntry::CreateDelivery(&delivery))
        .await;

    Ok(Success::created(DeliveryResponse::from_delivery(delivery)))
}

/// Driver form, used to accept and deliver
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverForm {
    /// Driver acting, defaults to the current actor
    driver_id: Option<String>,
}

impl DriverForm {
    /// The driver to act as, only the actor can act as themselves
    fn driver_id(self, current_actor: &CurrentActor) -> Result<String, Error> {
        match self.driver_id {
            Some(driver_id) if driver_id != current_actor.id => {
                Err(Error::forbidden("Not allowed to act for another driver"))
            }
            _ => Ok(current_actor.id.clone()),
        }
    }
}

/// Receiver acknowledges a delivery, drivers can see it afterwards
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/deliveries/<uuid>/acknowledge
/// ```
pub async fn acknowledge<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    _current_actor: CurrentActor,
    PathParameters(delivery_id): PathParameters<Uuid>,
) -> Result<Success<DeliveryResponse>, Error> {
    run_transition(&storage, &audit_trail, &delivery_id, Transition::Acknowledge).await
}

/// Driver accepts a delivery
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "driverId": "driver-a" }' \
///     http://localhost:6000/api/deliveries/<uuid>/accept
/// ```
pub async fn accept<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_actor: CurrentActor,
    PathParameters(delivery_id): PathParameters<Uuid>,
    form: Option<Form<DriverForm>>,
) -> Result<Success<DeliveryResponse>, Error> {
    let Form(form) = form.unwrap_or_else(|| Form(DriverForm::default()));

    let transition = Transition::Accept {
        driver_id: form.driver_id(&current_actor)?,
    };

    run_transition(&storage, &audit_trail, &delivery_id, transition).await
}

/// Driver marks a delivery as delivered, the receiver has to confirm afterwards
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/deliveries/<uuid>/deliver
/// ```
pub async fn deliver<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    current_actor: CurrentActor,
    PathParameters(delivery_id): PathParameters<Uuid>,
    form: Option<Form<DriverForm>>,
) -> Result<Success<DeliveryResponse>, Error> {
    let Form(form) = form.unwrap_or_else(|| Form(DriverForm::default()));

    let transition = Transition::Deliver {
        driver_id: Some(form.driver_id(&current_actor)?),
    };

    run_transition(&storage, &audit_trail, &delivery_id, transition).await
}

/// Receiver confirms the parcel arrived, completing the delivery
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/deliveries/<uuid>/confirm
/// ```
pub async fn confirm<S: Storage>(
    audit_trail: AuditTrail<S>,
    Extension(storage): Extension<S>,
    _current_actor: CurrentActor,
    PathParameters(delivery_id): PathParameters<Uuid>,
) -> Result<Success<DeliveryResponse>, Error> {
    run_transition(&storage, &audit_trail, &delivery_id, Transition::Confirm).await
}

/// Attempt a transition and translate the outcome
///
/// A retried transition returns the delivery as is, a transition out of turn is a conflict
/// carrying the current status
async fn run_transition<S: Storage>(
    storage: &S,
    audit_trail: &AuditTrail<S>,
    delivery_id: &Uuid,
    transition: Transition,
) -> Result<Success<DeliveryResponse>, Error> {
    let outcome = storage
        .transition_delivery(delivery_id, &transition)
        .await
        .map_err(Error::internal_server_error)?;

    match outcome {
        TransitionOutcome::Applied(delivery) => {
            tracing::info!(
                %delivery_id,
                status = %delivery.status,
                "Delivery transition applied: {}",
                transition.name()
            );

            audit_trail
                .register(AuditEntry::TransitionDelivery(&delivery, &transition))
                .await;

            Ok(Success::ok(DeliveryResponse::from_delivery(delivery)))
        }
        TransitionOutcome::Unchanged(delivery) => {
            tracing::debug!(
                %delivery_id,
                "Delivery transition already applied: {}",
                transition.name()
            );

            Ok(Success::ok(DeliveryResponse::from_delivery(delivery)))
        }
        TransitionOutcome::Conflict(delivery) => {
            tracing::debug!(
                %delivery_id,
                status = %delivery.status,
                "Delivery transition rejected: {}",
                transition.name()
            );

            Err(Error::conflict(conflict_message(&transition, &delivery))
                .with_description(delivery.status))
        }
        TransitionOutcome::NotFound => Err(Error::not_found("Delivery not found")),
    }
}

/// Explain why a transition does not fit the delivery
fn conflict_message(transition: &Transition, delivery: &Delivery) -> &'static str {
    match transition {
        Transition::Acknowledge => "Delivery is not awaiting the receiver",
        Transition::Accept { .. } => "Delivery is not awaiting a driver",
        Transition::Deliver { .. } if delivery.status == Status::Assigned => {
            "Delivery is assigned to another driver"
        }
        Transition::Deliver { .. } => "Delivery is not assigned",
        Transition::Confirm => "Delivery is not awaiting confirmation",
    }
}
