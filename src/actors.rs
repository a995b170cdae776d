//! Actors acting on deliveries
//!
//! An actor is whoever holds a valid token: the same person can send one parcel and drive
//! another, roles are picked per request.

/// The authenticated caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    /// Stable identifier of the actor, used as sender or driver ID
    pub id: String,

    /// Display name
    pub name: Option<String>,

    /// Home community, used when a listing does not name one
    pub community: Option<String>,
}
