//! Anonymous identity bootstrap.
//!
//! Every browser gets a stable anonymous uid the first time it needs one. The
//! uid lives in its server-side `tower-sessions` session (persisted by
//! [`IdentityStore`](crate::IdentityStore)), so all writes from that browser
//! are attributed to the same uid until the session lapses.

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use crate::error::{Error, Result};
use crate::http::ApiError;

/// Session key under which the anonymous uid is stored.
pub const UID_KEY: &str = "anonymous_uid";

/// Stable identifier of an anonymous user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn identity_err(err: tower_sessions::session::Error) -> Error {
    Error::Identity(err.to_string())
}

/// Returns the uid already held by `session`, if any.
pub async fn current_identity(session: &Session) -> Result<Option<Uid>> {
    session.get::<Uid>(UID_KEY).await.map_err(identity_err)
}

/// Returns the current anonymous identity, creating one if the session has none.
///
/// A fresh identity is persisted before this returns, so the uid is usable by
/// the caller and by any request that presents the same cookie.
pub async fn ensure_anonymous_auth(session: &Session) -> Result<Uid> {
    if let Some(uid) = current_identity(session).await? {
        return Ok(uid);
    }

    let uid = Uid::generate();
    session.insert(UID_KEY, &uid).await.map_err(identity_err)?;
    session.save().await.map_err(identity_err)?;
    info!(%uid, "issued anonymous identity");
    Ok(uid)
}

/// Upgrades the anonymous identity to a permanent account.
///
/// Not wired to any provider yet.
pub async fn link_anonymous_to_provider(session: &Session) -> Result<Uid> {
    if current_identity(session).await?.is_none() {
        return Err(Error::Identity("No anonymous user to link.".to_string()));
    }
    Err(Error::NotImplemented("Provider linking"))
}

/// Signs in with a permanent provider. Not wired to any provider yet.
pub async fn sign_in_with_provider() -> Result<Uid> {
    Err(Error::NotImplemented("Provider sign-in"))
}

/// Extractor yielding the caller's anonymous uid, establishing one if needed.
///
/// Requires the `tower-sessions` session layer on the router.
#[derive(Clone, Debug)]
pub struct AnonymousUser(pub Uid);

impl<S> FromRequestParts<S> for AnonymousUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| ApiError::from(Error::Identity(msg.to_string())))?;
        let uid = ensure_anonymous_auth(&session).await?;
        Ok(Self(uid))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn fresh_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn issues_identity_once() {
        let session = fresh_session();
        assert_eq!(current_identity(&session).await.unwrap(), None);

        let first = ensure_anonymous_auth(&session).await.unwrap();
        let second = ensure_anonymous_auth(&session).await.unwrap();
        assert_eq!(first, second);
        assert!(session.id().is_some());
    }

    #[tokio::test]
    async fn provider_flows_are_not_implemented() {
        let session = fresh_session();
        assert!(matches!(
            link_anonymous_to_provider(&session).await,
            Err(Error::Identity(_))
        ));

        ensure_anonymous_auth(&session).await.unwrap();
        assert!(matches!(
            link_anonymous_to_provider(&session).await,
            Err(Error::NotImplemented(_))
        ));
        assert!(matches!(
            sign_in_with_provider().await,
            Err(Error::NotImplemented(_))
        ));
    }
}
