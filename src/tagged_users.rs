//! Users the account owner has tagged, kept sorted and persisted.

use par_chat_config::{SettingsError, SettingsStore, SettingsStoreExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings key holding the tagged user list.
pub const TAGGED_USERS_SETTING: &str = "/users/tagged";

/// Chat network a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Twitch,
}

/// Ordered by provider, then name, then id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaggedUser {
    pub provider: ProviderId,
    pub name: String,
    pub id: String,
}

impl TaggedUser {
    pub fn new(provider: ProviderId, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Sorted, duplicate-free list of tagged users with write-through.
pub struct TaggedUsers {
    store: Arc<dyn SettingsStore>,
    users: Mutex<Vec<TaggedUser>>,
}

impl std::fmt::Debug for TaggedUsers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaggedUsers")
            .field("users", &self.users.lock().len())
            .finish_non_exhaustive()
    }
}

impl TaggedUsers {
    /// Load the stored list. Unreadable data starts an empty list.
    pub fn load(store: Arc<dyn SettingsStore>) -> Self {
        let mut users: Vec<TaggedUser> = match store.load(TAGGED_USERS_SETTING) {
            Ok(users) => users.unwrap_or_default(),
            Err(e) => {
                log::error!("Failed to read {TAGGED_USERS_SETTING}: {e}");
                Vec::new()
            }
        };
        users.sort();
        users.dedup();
        Self {
            store,
            users: Mutex::new(users),
        }
    }

    pub fn users(&self) -> Vec<TaggedUser> {
        self.users.lock().clone()
    }

    pub fn is_tagged(&self, user: &TaggedUser) -> bool {
        self.users.lock().binary_search(user).is_ok()
    }

    /// Insert `user` at its sorted position. Returns `false` if it was
    /// already tagged.
    pub fn tag(&self, user: TaggedUser) -> Result<bool, SettingsError> {
        let mut users = self.users.lock();
        let Err(index) = users.binary_search(&user) else {
            return Ok(false);
        };
        let mut next = users.clone();
        next.insert(index, user);
        self.store.save(TAGGED_USERS_SETTING, &next)?;
        *users = next;
        Ok(true)
    }

    /// Returns `false` if `user` was not tagged.
    pub fn untag(&self, user: &TaggedUser) -> Result<bool, SettingsError> {
        let mut users = self.users.lock();
        let Ok(index) = users.binary_search(user) else {
            return Ok(false);
        };
        let mut next = users.clone();
        next.remove(index);
        self.store.save(TAGGED_USERS_SETTING, &next)?;
        *users = next;
        Ok(true)
    }
}
