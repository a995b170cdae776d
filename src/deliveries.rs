//! Delivery requests and their lifecycle
//!
//! A delivery is created by a sender, acknowledged by the receiver, accepted and delivered by a
//! driver, and finally confirmed by the receiver:
//!
//! ```text
//! awaiting_receiver -> awaiting_driver -> assigned -> delivered_pending_receiver -> completed
//! ```
//!
//! Statuses only move forward, a driver is assigned once and never replaced.

use std::cmp::Reverse;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Position of a delivery in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Created by the sender, the receiver has not acknowledged it yet
    AwaitingReceiver,

    /// Acknowledged by the receiver, visible to drivers
    AwaitingDriver,

    /// Accepted by a driver
    Assigned,

    /// Dropped off by the driver, the receiver has to confirm
    DeliveredPendingReceiver,

    /// Confirmed by the receiver
    Completed,
}

impl Status {
    /// All statuses, in lifecycle order
    pub const ALL: [Status; 5] = [
        Status::AwaitingReceiver,
        Status::AwaitingDriver,
        Status::Assigned,
        Status::DeliveredPendingReceiver,
        Status::Completed,
    ];

    /// Wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            Status::AwaitingReceiver => "awaiting_receiver",
            Status::AwaitingDriver => "awaiting_driver",
            Status::Assigned => "assigned",
            Status::DeliveredPendingReceiver => "delivered_pending_receiver",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivery request
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
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

/// Raw input to create a delivery with, as received from a sender
#[derive(Clone, Debug, Default)]
pub struct DeliveryDraft {
    pub title: Option<String>,
    pub items: Option<String>,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub pickup_zip: Option<String>,
    pub dropoff_zip: Option<String>,
    pub package_type: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub item_value: Option<f64>,
    pub instructions: Option<String>,
    pub offer: Option<f64>,
    pub receiver_name: Option<String>,
    pub receiver_contact: Option<String>,
}

/// Validated input to create a delivery with
#[derive(Clone, Debug, PartialEq)]
pub struct NewDelivery {
    pub title: String,
    pub items: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup_zip: String,
    pub dropoff_zip: String,
    pub package_type: Option<String>,
    pub weight: f64,
    pub weight_unit: String,
    pub item_value: Option<f64>,
    pub instructions: Option<String>,
    pub offer: f64,
    pub receiver_name: Option<String>,
    pub receiver_contact: Option<String>,

    /// Locality key, derived from the pickup zip
    pub community_id: String,
}

/// Reasons a draft can not become a delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingItems,
    MissingPickupAddress,
    MissingDropoffAddress,
    MissingPickupZip,
    MissingDropoffZip,
    MissingWeight,
    MissingWeightUnit,
    NegativeItemValue,
    MissingOffer,
}

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let message = match self {
            ValidationError::MissingItems => "Items are required",
            ValidationError::MissingPickupAddress => "Pickup address is required",
            ValidationError::MissingDropoffAddress => "Dropoff address is required",
            ValidationError::MissingPickupZip => "Pickup zip is required",
            ValidationError::MissingDropoffZip => "Dropoff zip is required",
            ValidationError::MissingWeight => "Weight must be greater than zero",
            ValidationError::MissingWeightUnit => "Weight unit is required",
            ValidationError::NegativeItemValue => "Item value can not be negative",
            ValidationError::MissingOffer => "Offer must be greater than zero",
        };

        f.write_str(message)
    }
}

/// Trimmed, non-empty text
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Strictly positive, finite number
fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value > 0.0)
}

impl DeliveryDraft {
    /// Validate the draft
    ///
    /// Free-form text is trimmed, blank optional text is dropped. The title defaults to the items
    /// and the receiver contact to the receiver name.
    pub fn validate(self) -> Result<NewDelivery, ValidationError> {
        let items = non_blank(self.items).ok_or(ValidationError::MissingItems)?;
        let pickup_address =
            non_blank(self.pickup_address).ok_or(ValidationError::MissingPickupAddress)?;
        let dropoff_address =
            non_blank(self.dropoff_address).ok_or(ValidationError::MissingDropoffAddress)?;
        let pickup_zip = non_blank(self.pickup_zip).ok_or(ValidationError::MissingPickupZip)?;
        let dropoff_zip = non_blank(self.dropoff_zip).ok_or(ValidationError::MissingDropoffZip)?;
        let weight = positive(self.weight).ok_or(ValidationError::MissingWeight)?;
        let weight_unit = non_blank(self.weight_unit).ok_or(ValidationError::MissingWeightUnit)?;

        let item_value = match self.item_value {
            Some(value) if !value.is_finite() || value < 0.0 => {
                return Err(ValidationError::NegativeItemValue);
            }
            item_value => item_value,
        };

        let offer = positive(self.offer).ok_or(ValidationError::MissingOffer)?;

        let title = non_blank(self.title).unwrap_or_else(|| items.clone());
        let receiver_name = non_blank(self.receiver_name);
        let receiver_contact = non_blank(self.receiver_contact).or_else(|| receiver_name.clone());

        Ok(NewDelivery {
            title,
            items,
            pickup_address,
            dropoff_address,
            community_id: pickup_zip.clone(),
            pickup_zip,
            dropoff_zip,
            package_type: non_blank(self.package_type),
            weight,
            weight_unit,
            item_value,
            instructions: non_blank(self.instructions),
            offer,
            receiver_name,
            receiver_contact,
        })
    }
}

impl Delivery {
    /// Build a fresh delivery in `awaiting_receiver`
    pub fn new(
        id: Uuid,
        sender_id: &str,
        sender_name: Option<&str>,
        new_delivery: &NewDelivery,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: new_delivery.title.clone(),
            items: new_delivery.items.clone(),
            pickup_address: new_delivery.pickup_address.clone(),
            dropoff_address: new_delivery.dropoff_address.clone(),
            pickup_zip: Some(new_delivery.pickup_zip.clone()),
            dropoff_zip: Some(new_delivery.dropoff_zip.clone()),
            package_type: new_delivery.package_type.clone(),
            weight: Some(new_delivery.weight),
            weight_unit: Some(new_delivery.weight_unit.clone()),
            item_value: new_delivery.item_value,
            instructions: new_delivery.instructions.clone(),
            offer: new_delivery.offer,
            sender_id: sender_id.to_string(),
            sender_name: sender_name.map(ToString::to_string),
            receiver_name: new_delivery.receiver_name.clone(),
            receiver_contact: new_delivery.receiver_contact.clone(),
            community_id: Some(new_delivery.community_id.clone()),
            status: Status::AwaitingReceiver,
            assigned_driver_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A step through the lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The receiver acknowledges the delivery, drivers can now see it
    Acknowledge,

    /// A driver takes the delivery
    Accept {
        /// The driver to assign
        driver_id: String,
    },

    /// The driver dropped the parcel off
    Deliver {
        /// The driver claiming the drop-off, has to match the assigned driver if there is one
        ///
        /// The API always passes the current actor, `None` skips the driver check
        driver_id: Option<String>,
    },

    /// The receiver confirms the parcel arrived
    Confirm,
}

/// What a transition would do to a specific delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// The guard holds, the transition can be applied
    Apply,

    /// The delivery already is where this transition would bring it
    Unchanged,

    /// The guard does not hold
    Conflict,
}

/// Result of attempting a transition on a stored delivery
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionOutcome {
    /// The transition was applied, contains the updated delivery
    Applied(Delivery),

    /// The transition was already applied earlier, nothing changed
    Unchanged(Delivery),

    /// The delivery is not in a state that allows the transition, nothing changed
    Conflict(Delivery),

    /// No delivery with the given ID
    NotFound,
}

impl Transition {
    /// Status the delivery has to be in
    pub fn from_status(&self) -> Status {
        match self {
            Transition::Acknowledge => Status::AwaitingReceiver,
            Transition::Accept { .. } => Status::AwaitingDriver,
            Transition::Deliver { .. } => Status::Assigned,
            Transition::Confirm => Status::DeliveredPendingReceiver,
        }
    }

    /// Status the delivery ends up in
    pub fn to_status(&self) -> Status {
        match self {
            Transition::Acknowledge => Status::AwaitingDriver,
            Transition::Accept { .. } => Status::Assigned,
            Transition::Deliver { .. } => Status::DeliveredPendingReceiver,
            Transition::Confirm => Status::Completed,
        }
    }

    /// Driver this transition assigns
    pub fn assigned_driver(&self) -> Option<&str> {
        match self {
            Transition::Accept { driver_id } => Some(driver_id.as_str()),
            _ => None,
        }
    }

    /// Driver identity the delivery has to carry, when this transition checks one
    ///
    /// The outer `Option` tells whether the driver is checked at all
    #[allow(clippy::option_option)]
    pub fn driver_guard(&self) -> Option<Option<&str>> {
        match self {
            Transition::Deliver { driver_id } => Some(driver_id.as_deref()),
            _ => None,
        }
    }

    /// Does the driver on the delivery allow this transition
    fn driver_matches(&self, delivery: &Delivery) -> bool {
        match self.driver_guard() {
            Some(driver_id) => match delivery.assigned_driver_id.as_deref() {
                None => true,
                Some(assigned) => Some(assigned) == driver_id,
            },
            None => true,
        }
    }

    /// Would this transition, once applied, have left the delivery like this
    fn already_applied(&self, delivery: &Delivery) -> bool {
        if delivery.status != self.to_status() {
            return false;
        }

        match self {
            Transition::Accept { driver_id } => {
                delivery.assigned_driver_id.as_deref() == Some(driver_id.as_str())
            }
            _ => self.driver_matches(delivery),
        }
    }

    /// Check the transition against the current delivery
    pub fn evaluate(&self, delivery: &Delivery) -> Evaluation {
        if delivery.status == self.from_status() && self.driver_matches(delivery) {
            Evaluation::Apply
        } else if self.already_applied(delivery) {
            Evaluation::Unchanged
        } else {
            Evaluation::Conflict
        }
    }

    /// Apply the transition, only call after [`evaluate`](Self::evaluate) returned `Apply`
    pub fn apply(&self, delivery: &mut Delivery, now: DateTime<Utc>) {
        delivery.status = self.to_status();

        if let Some(driver_id) = self.assigned_driver() {
            delivery.assigned_driver_id = Some(driver_id.to_string());
        }

        delivery.updated_at = now;
    }

    /// Evaluate and, when allowed, apply the transition in one go
    pub fn run(&self, delivery: &mut Delivery, now: DateTime<Utc>) -> TransitionOutcome {
        match self.evaluate(delivery) {
            Evaluation::Apply => {
                self.apply(delivery, now);
                TransitionOutcome::Applied(delivery.clone())
            }
            Evaluation::Unchanged => TransitionOutcome::Unchanged(delivery.clone()),
            Evaluation::Conflict => TransitionOutcome::Conflict(delivery.clone()),
        }
    }

    /// Short name, used in logs and the audit trail
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Acknowledge => "acknowledge",
            Transition::Accept { .. } => "accept",
            Transition::Deliver { .. } => "deliver",
            Transition::Confirm => "confirm",
        }
    }
}

/// Perspective a list of deliveries is requested from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sender,
    Driver,
    Receiver,
}

/// Everything needed to build a role-scoped list of deliveries
///
/// Both storage backends list through this one description
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryView {
    /// Everything a sender created, in any status
    Sender { sender_id: String },

    /// Deliveries waiting for a driver, plus the ones assigned to this driver
    Driver {
        driver_id: Option<String>,
        community_id: Option<String>,
    },

    /// Deliveries that still need something from a receiver
    Receiver { community_id: Option<String> },
}

impl DeliveryView {
    /// Build the view for a role
    ///
    /// The actor is the sender or the driver, depending on the role
    pub fn for_role(role: Role, actor_id: &str, community_id: Option<String>) -> Self {
        match role {
            Role::Sender => Self::Sender {
                sender_id: actor_id.to_string(),
            },
            Role::Driver => Self::Driver {
                driver_id: Some(actor_id.to_string()),
                community_id,
            },
            Role::Receiver => Self::Receiver { community_id },
        }
    }

    /// Statuses visible in this view
    pub fn statuses(&self) -> &'static [Status] {
        match self {
            Self::Sender { .. } => &Status::ALL,
            Self::Driver { .. } => &[Status::AwaitingDriver, Status::Assigned],
            Self::Receiver { .. } => &[
                Status::AwaitingReceiver,
                Status::AwaitingDriver,
                Status::Assigned,
                Status::DeliveredPendingReceiver,
            ],
        }
    }

    /// Only deliveries of this sender
    pub fn sender_id(&self) -> Option<&str> {
        match self {
            Self::Sender { sender_id } => Some(sender_id),
            _ => None,
        }
    }

    /// Only deliveries in this community
    pub fn community_id(&self) -> Option<&str> {
        match self {
            Self::Sender { .. } => None,
            Self::Driver { community_id, .. } | Self::Receiver { community_id } => {
                community_id.as_deref()
            }
        }
    }

    /// Assigned deliveries are only visible to their driver
    pub fn restricts_assigned(&self) -> bool {
        matches!(self, Self::Driver { .. })
    }

    /// Driver who sees their assigned deliveries
    pub fn driver_id(&self) -> Option<&str> {
        match self {
            Self::Driver { driver_id, .. } => driver_id.as_deref(),
            _ => None,
        }
    }

    /// Is the delivery part of this view
    pub fn includes(&self, delivery: &Delivery) -> bool {
        if !self.statuses().contains(&delivery.status) {
            return false;
        }

        if let Some(sender_id) = self.sender_id() {
            if delivery.sender_id != sender_id {
                return false;
            }
        }

        if let Some(community_id) = self.community_id() {
            if delivery.community_id.as_deref() != Some(community_id) {
                return false;
            }
        }

        if self.restricts_assigned() && delivery.status == Status::Assigned {
            return match (self.driver_id(), delivery.assigned_driver_id.as_deref()) {
                (Some(driver_id), Some(assigned)) => driver_id == assigned,
                _ => false,
            };
        }

        true
    }

    /// Filter and order deliveries, newest first
    pub fn select<'a, I>(&self, deliveries: I) -> Vec<Delivery>
    where
        I: IntoIterator<Item = &'a Delivery>,
    {
        let mut selected = deliveries
            .into_iter()
            .filter(|delivery| self.includes(delivery))
            .cloned()
            .collect::<Vec<Delivery>>();

        selected.sort_by_key(|delivery| Reverse((delivery.created_at, delivery.id)));

        selected
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn draft() -> DeliveryDraft {
        DeliveryDraft {
            items: Some("Two boxes of books".to_string()),
            pickup_address: Some("500 W Madison St".to_string()),
            dropoff_address: Some("233 S Wacker Dr".to_string()),
            pickup_zip: Some("60661".to_string()),
            dropoff_zip: Some("60606".to_string()),
            weight: Some(2.5),
            weight_unit: Some("kg".to_string()),
            offer: Some(20.0),
            receiver_name: Some("Sam".to_string()),
            ..DeliveryDraft::default()
        }
    }

    fn delivery(sender_id: &str, zip: &str) -> Delivery {
        let mut draft = draft();
        draft.pickup_zip = Some(zip.to_string());
        let new_delivery = draft.validate().unwrap();

        Delivery::new(Uuid::new_v4(), sender_id, None, &new_delivery, Utc::now())
    }

    #[test]
    fn test_validate_defaults() {
        let new_delivery = draft().validate().unwrap();

        assert_eq!(new_delivery.title, "Two boxes of books");
        assert_eq!(new_delivery.community_id, "60661");
        assert_eq!(new_delivery.receiver_contact, Some("Sam".to_string()));
    }

    #[test]
    fn test_validate_rejects() {
        let mut zero_offer = draft();
        zero_offer.offer = Some(0.0);
        assert_eq!(zero_offer.validate(), Err(ValidationError::MissingOffer));

        let mut missing_weight = draft();
        missing_weight.weight = None;
        assert_eq!(missing_weight.validate(), Err(ValidationError::MissingWeight));

        let mut blank_items = draft();
        blank_items.items = Some("   ".to_string());
        assert_eq!(blank_items.validate(), Err(ValidationError::MissingItems));

        let mut missing_zip = draft();
        missing_zip.dropoff_zip = None;
        assert_eq!(missing_zip.validate(), Err(ValidationError::MissingDropoffZip));

        let mut negative_value = draft();
        negative_value.item_value = Some(-1.0);
        assert_eq!(
            negative_value.validate(),
            Err(ValidationError::NegativeItemValue)
        );
    }

    #[test]
    fn test_full_lifecycle_is_monotonic() {
        let mut delivery = delivery("sender", "60661");
        let mut seen = vec![delivery.status];

        let transitions = [
            Transition::Acknowledge,
            Transition::Accept {
                driver_id: "driverA".to_string(),
            },
            Transition::Deliver {
                driver_id: Some("driverA".to_string()),
            },
            Transition::Confirm,
        ];

        for transition in &transitions {
            let outcome = transition.run(&mut delivery, Utc::now());
            assert!(matches!(outcome, TransitionOutcome::Applied(_)));
            seen.push(delivery.status);
        }

        assert_eq!(seen, Status::ALL.to_vec());
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_accept_out_of_turn_changes_nothing() {
        let mut delivery = delivery("sender", "60661");
        let before = delivery.clone();

        let accept = Transition::Accept {
            driver_id: "driverA".to_string(),
        };
        assert_eq!(
            accept.run(&mut delivery, Utc::now()),
            TransitionOutcome::Conflict(before.clone())
        );
        assert_eq!(delivery, before);
    }

    #[test]
    fn test_single_assignment() {
        let mut delivery = delivery("sender", "60661");
        Transition::Acknowledge.run(&mut delivery, Utc::now());

        let accept_a = Transition::Accept {
            driver_id: "driverA".to_string(),
        };
        let accept_b = Transition::Accept {
            driver_id: "driverB".to_string(),
        };

        assert!(matches!(
            accept_a.run(&mut delivery, Utc::now()),
            TransitionOutcome::Applied(_)
        ));
        assert!(matches!(
            accept_b.run(&mut delivery, Utc::now()),
            TransitionOutcome::Conflict(_)
        ));
        assert_eq!(delivery.assigned_driver_id.as_deref(), Some("driverA"));

        // same driver tapping twice
        assert!(matches!(
            accept_a.run(&mut delivery, Utc::now()),
            TransitionOutcome::Unchanged(_)
        ));
    }

    #[test]
    fn test_deliver_checks_driver() {
        let mut delivery = delivery("sender", "60661");
        Transition::Acknowledge.run(&mut delivery, Utc::now());
        Transition::Accept {
            driver_id: "driverA".to_string(),
        }
        .run(&mut delivery, Utc::now());

        let deliver_b = Transition::Deliver {
            driver_id: Some("driverB".to_string()),
        };
        assert_eq!(deliver_b.evaluate(&delivery), Evaluation::Conflict);

        let deliver_anonymous = Transition::Deliver { driver_id: None };
        assert_eq!(deliver_anonymous.evaluate(&delivery), Evaluation::Conflict);

        let deliver_a = Transition::Deliver {
            driver_id: Some("driverA".to_string()),
        };
        deliver_a.run(&mut delivery, Utc::now());
        assert_eq!(delivery.status, Status::DeliveredPendingReceiver);

        // the other driver retrying after the fact is still a conflict
        assert_eq!(deliver_b.evaluate(&delivery), Evaluation::Conflict);
        assert_eq!(deliver_a.evaluate(&delivery), Evaluation::Unchanged);
    }

    #[test]
    fn test_idempotent_confirm() {
        let mut delivery = delivery("sender", "60661");
        delivery.status = Status::DeliveredPendingReceiver;

        assert!(matches!(
            Transition::Confirm.run(&mut delivery, Utc::now()),
            TransitionOutcome::Applied(_)
        ));
        assert!(matches!(
            Transition::Confirm.run(&mut delivery, Utc::now()),
            TransitionOutcome::Unchanged(_)
        ));
        assert_eq!(delivery.status, Status::Completed);
    }

    #[test]
    fn test_acknowledge_after_assignment_is_conflict() {
        let mut delivery = delivery("sender", "60661");
        delivery.status = Status::Assigned;

        assert_eq!(
            Transition::Acknowledge.evaluate(&delivery),
            Evaluation::Conflict
        );
    }

    #[test]
    fn test_driver_view_community_scoping() {
        let mut chicago = delivery("sender", "60661");
        let mut baltimore = delivery("sender", "21201");
        chicago.status = Status::AwaitingDriver;
        baltimore.status = Status::AwaitingDriver;

        let view = DeliveryView::for_role(Role::Driver, "driverA", Some("60661".to_string()));
        let selected = view.select([&chicago, &baltimore]);

        assert_eq!(selected, vec![chicago]);
    }

    #[test]
    fn test_driver_view_assigned_only_for_own_driver() {
        let mut mine = delivery("sender", "60661");
        mine.status = Status::Assigned;
        mine.assigned_driver_id = Some("driverA".to_string());

        let mut theirs = delivery("sender", "60661");
        theirs.status = Status::Assigned;
        theirs.assigned_driver_id = Some("driverB".to_string());

        let waiting = delivery("sender", "60661");

        let view = DeliveryView::for_role(Role::Driver, "driverA", None);
        assert!(view.includes(&mine));
        assert!(!view.includes(&theirs));
        assert!(!view.includes(&waiting));

        let anonymous = DeliveryView::Driver {
            driver_id: None,
            community_id: None,
        };
        assert!(!anonymous.includes(&mine));
    }

    #[test]
    fn test_receiver_view_hides_completed() {
        let pending = delivery("sender", "60661");
        let mut completed = delivery("sender", "60661");
        completed.status = Status::Completed;

        let view = DeliveryView::for_role(Role::Receiver, "anyone", None);
        assert!(view.includes(&pending));
        assert!(!view.includes(&completed));
    }

    #[test]
    fn test_sender_view_and_order() {
        let mut older = delivery("sender", "60661");
        older.created_at -= Duration::minutes(5);
        let mut newer = delivery("sender", "21201");
        newer.status = Status::Completed;
        let other = delivery("someone-else", "60661");

        let view = DeliveryView::for_role(Role::Sender, "sender", Some("60661".to_string()));
        let selected = view.select([&older, &other, &newer]);

        assert_eq!(selected, vec![newer, older]);
    }
}
