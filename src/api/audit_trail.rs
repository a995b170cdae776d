//! Audit trail service

use std::net::IpAddr;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_client_ip::ClientIp;

use crate::storage::AuditEntry;
use crate::storage::Storage;

use super::CurrentActor;
use super::Error;

/// Audit trail service
pub struct AuditTrail<S: Storage> {
    /// Storage in where the trail is saved
    storage: S,

    /// The current actor for the audit trail
    current_actor: CurrentActor,

    /// The IP address associated with the audit trail
    ip_address: Option<IpAddr>,
}

impl<S: Storage> AuditTrail<S> {
    /// Register an entry on the audit trail
    ///
    /// Failures are logged, the action itself already happened
    pub async fn register(&self, entry: AuditEntry<'_>) {
        let result = self
            .storage
            .register_audit_trail(&self.current_actor.id, &entry, self.ip_address.as_ref())
            .await;

        if let Err(err) = result {
            tracing::error!("Could not register audit trail entry: {err}");
        }
    }
}

impl<B, S> FromRequestParts<B> for AuditTrail<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &B) -> Result<Self, Self::Rejection> {
        let Extension(storage) = parts
            .extract::<Extension<S>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the storage"))?;

        let current_actor = CurrentActor::from_request_parts(parts, state).await?;

        // requests without a socket (like in tests) have no address
        let ip_address = ClientIp::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ClientIp(ip_address)| ip_address);

        Ok(AuditTrail {
            storage,
            current_actor,
            ip_address,
        })
    }
}
