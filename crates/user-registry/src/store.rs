//! In-memory keyed store for registering and registered users.

use crate::error::{RegistryError, RegistryResult};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Keyed store holding both user collections.
///
/// Every mutation is a single critical section, so lookup-then-mutate
/// sequences cannot interleave. When both maps are needed the locks are
/// taken in the order registered, then registering.
#[derive(Clone, Default)]
pub struct UserStore {
    registered: Arc<RwLock<HashMap<String, RegisteredUser>>>,
    registering: Arc<RwLock<HashMap<String, RegisteringUser>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a registering record unless the user is already in either set.
    pub async fn insert_registering_if_absent(&self, record: RegisteringUser) -> RegistryResult<()> {
        let registered = self.registered.read().await;
        let mut registering = self.registering.write().await;

        if registered.contains_key(&record.chat_user_id) {
            return Err(RegistryError::UserAlreadyRegistered);
        }
        if registering.contains_key(&record.chat_user_id) {
            return Err(RegistryError::UserAlreadyInRegistrationProcess);
        }

        debug!(user_id = %record.chat_user_id, "Inserted registering user");
        registering.insert(record.chat_user_id.clone(), record);
        Ok(())
    }

    /// Attach a follow-up collector; returns false if the user is not registering.
    pub async fn attach_collector(
        &self,
        user_id: &str,
        collector: Arc<dyn FollowUpCollector>,
    ) -> bool {
        let mut registering = self.registering.write().await;
        match registering.get_mut(user_id) {
            Some(record) => {
                record.follow_up_collector = Some(collector);
                true
            }
            None => false,
        }
    }

    pub async fn registering(&self, user_id: &str) -> Option<RegisteringUser> {
        self.registering.read().await.get(user_id).cloned()
    }

    pub async fn pending_token(&self, user_id: &str) -> Option<String> {
        self.registering
            .read()
            .await
            .get(user_id)
            .map(|r| r.pending_request_token.clone())
    }

    pub async fn remove_registering(&self, user_id: &str) -> Option<RegisteringUser> {
        self.registering.write().await.remove(user_id)
    }

    /// Move a user from registering to registered in one step.
    ///
    /// The registering record is removed even when the insert is refused.
    pub async fn promote(&self, record: RegisteredUser) -> RegistryResult<RegisteredUser> {
        let mut registered = self.registered.write().await;
        let mut registering = self.registering.write().await;

        if registering.remove(&record.chat_user_id).is_none() {
            return Err(RegistryError::UserNotInRegistrationProcess);
        }
        if registered.contains_key(&record.chat_user_id) {
            return Err(RegistryError::UserAlreadyRegistered);
        }

        registered.insert(record.chat_user_id.clone(), record.clone());
        Ok(record)
    }

    pub async fn registered(&self, user_id: &str) -> Option<RegisteredUser> {
        self.registered.read().await.get(user_id).cloned()
    }

    /// Set the scrobbling flag, returning the previous value.
    pub async fn set_scrobbling(&self, user_id: &str, enabled: bool) -> Option<bool> {
        let mut registered = self.registered.write().await;
        registered
            .get_mut(user_id)
            .map(|user| std::mem::replace(&mut user.scrobbling_enabled, enabled))
    }

    pub async fn remove_registered(&self, user_id: &str) -> Option<RegisteredUser> {
        self.registered.write().await.remove(user_id)
    }

    pub async fn is_registered(&self, user_id: &str) -> bool {
        self.registered.read().await.contains_key(user_id)
    }

    pub async fn is_registering(&self, user_id: &str) -> bool {
        self.registering.read().await.contains_key(user_id)
    }

    pub async fn registered_count(&self) -> usize {
        self.registered.read().await.len()
    }

    pub async fn registering_count(&self) -> usize {
        self.registering.read().await.len()
    }
}
