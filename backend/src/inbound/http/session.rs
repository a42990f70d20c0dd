//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers only deal with domain-friendly
//! operations: persisting, reading, requiring, or clearing the logged-in
//! username.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{DomainError, Username};

pub(crate) const USER_KEY: &str = "user";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated username in the session cookie.
    pub fn persist_user(&self, username: &Username) -> Result<(), DomainError> {
        self.0
            .insert(USER_KEY, username.as_str())
            .map_err(|error| DomainError::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current username from the session, if present.
    pub fn current_user(&self) -> Result<Option<Username>, DomainError> {
        let stored = self
            .0
            .get::<String>(USER_KEY)
            .map_err(|error| DomainError::internal(format!("failed to read session: {error}")))?;
        match stored {
            Some(raw) => match Username::new(&raw) {
                Ok(username) => Ok(Some(username)),
                Err(error) => {
                    tracing::warn!("invalid username in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated username or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<Username, DomainError> {
        self.current_user()?
            .ok_or_else(|| DomainError::unauthorized("login required"))
    }

    /// Drop all session state, ending the login.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
