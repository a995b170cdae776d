//! Current actor service
//!
//! Get the current actor from the request based on the Authorization header. Tokens are issued
//! by the identity provider of the platform, signed with the shared `JWT_SECRET`.

use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;

use crate::actors::Actor;
use crate::api::Error;

/// The keys used for encoding/decoding JWT tokens
#[derive(Clone)]
pub struct JwtKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The JWT claims to identify an actor
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// The actor ID
    sub: String,

    /// When does the token expire, as a UNIX timestamp
    exp: i64,

    /// Display name of the actor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Home community of the actor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    community: Option<String>,
}

/// Current actor service
#[derive(Clone, Debug)]
pub struct CurrentActor {
    /// The actual actor
    actor: Arc<Actor>,
}

impl CurrentActor {
    /// Create the current actor from an actor
    fn new(actor: Actor) -> Self {
        Self {
            actor: Arc::new(actor),
        }
    }
}

impl Deref for CurrentActor {
    type Target = Actor;

    fn deref(&self) -> &Self::Target {
        &self.actor
    }
}

/// Generate a token for a given actor, valid for an hour
#[allow(dead_code)] // used by tests
pub fn generate_token(jwt_keys: &JwtKeys, actor: &Actor) -> Result<String, Error> {
    use jsonwebtoken::Header;
    use jsonwebtoken::encode;

    let claims = Claims {
        sub: actor.id.clone(),
        exp: chrono::Utc::now().timestamp() + 3600,
        name: actor.name.clone(),
        community: actor.community.clone(),
    };

    encode(&Header::default(), &claims, &jwt_keys.encoding).map_err(Error::internal_server_error)
}

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        use jsonwebtoken::Validation;
        use jsonwebtoken::decode;

        // Extract the token from the authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| Error::forbidden("Missing API token"))?;

        let Extension(jwt_keys) = parts
            .extract::<Extension<JwtKeys>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get JWT keys"))?;

        let token_data = decode::<Claims>(bearer.token(), &jwt_keys.decoding, &Validation::default())
            .map_err(|err| Error::forbidden(format!("Invalid token: {err}")))?;

        let claims = token_data.claims;

        if claims.sub.trim().is_empty() {
            return Err(Error::forbidden("Invalid token: empty subject"));
        }

        Ok(CurrentActor::new(Actor {
            id: claims.sub,
            name: claims.name,
            community: claims.community,
        }))
    }
}
