//! Local session holder.
//!
//! Sign-in is a local mock: it creates a demo user with a fresh id and
//! persists it under [`SESSION_KEY`]. There is no identity verification.
//! The session is an explicit value owned by the caller; nothing here is
//! process-global.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::storage::{write_blob, KeyValueStore, SESSION_KEY};

const DEMO_EMAIL: &str = "user@example.com";
const DEMO_NAME: &str = "Demo User";
const DEMO_AVATAR: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=demo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    fn demo() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: DEMO_EMAIL.to_string(),
            name: DEMO_NAME.to_string(),
            avatar: Some(DEMO_AVATAR.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// Restore the persisted session. An unreadable session blob is removed
    /// and the session starts signed out.
    pub fn load(store: &mut impl KeyValueStore) -> Result<Self> {
        let Some(raw) = store.get(SESSION_KEY)? else {
            return Ok(Self::default());
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Self { user: Some(user) }),
            Err(err) => {
                warn!(error = %err, "discarding unreadable session");
                store.remove(SESSION_KEY)?;
                Ok(Self::default())
            }
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Sign in as a fresh demo user, replacing any current user
    pub fn sign_in(&mut self, store: &mut impl KeyValueStore) -> Result<&User> {
        let user = User::demo();
        write_blob(store, SESSION_KEY, &user)?;
        info!(user = %user.id, "signed in");
        Ok(&*self.user.insert(user))
    }

    /// Clear the session. Returns whether a user was signed in.
    pub fn sign_out(&mut self, store: &mut impl KeyValueStore) -> Result<bool> {
        store.remove(SESSION_KEY)?;
        let was_signed_in = self.user.take().is_some();
        if was_signed_in {
            info!("signed out");
        }
        Ok(was_signed_in)
    }
}
