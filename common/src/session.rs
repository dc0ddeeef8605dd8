use crate::constants::{PROFILE_KEY, TOKEN_KEY};
use crate::errors::RiderError;
use crate::storage::KeyValueStore;
use crate::types::dtos::RiderProfileDTO;
use std::fmt;
use std::sync::Arc;

/// Authenticated rider: bearer token plus cached profile.
///
/// Built once by the login flow and handed explicitly to whatever needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub profile: RiderProfileDTO,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}

/// Mirrors a [`Session`] into a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, session: &Session) -> Result<(), RiderError> {
        self.store.set(TOKEN_KEY, &session.token)?;
        self.save_profile(&session.profile)
    }

    pub fn save_profile(&self, profile: &RiderProfileDTO) -> Result<(), RiderError> {
        self.store.set(PROFILE_KEY, &serde_json::to_string(profile)?)
    }

    /// The stored session, if a token is present. A missing or unreadable
    /// profile falls back to an empty one; the token alone is enough to talk
    /// to the API.
    pub fn load(&self) -> Result<Option<Session>, RiderError> {
        let token = match self.store.get(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        let profile = self
            .store
            .get(PROFILE_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Ok(Some(Session { token, profile }))
    }

    pub fn clear(&self) -> Result<(), RiderError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(PROFILE_KEY)
    }
}
