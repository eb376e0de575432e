//! Registration handshake and session management.

use crate::api::ScrobblingApi;
use crate::error::{RegistryError, RegistryResult};
use crate::locks::UserLocks;
use crate::store::UserStore;
use crate::types::*;
use lastfm_client::MAX_SCROBBLES_PER_REQUEST;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Drives the per-user state machine
/// `Unregistered -> Registering -> Registered`, with cancellation back to
/// `Unregistered`.
///
/// Transitions that await the network hold the user's lock for their whole
/// duration, so at most one registration is ever in flight per chat user.
pub struct UsersService<A> {
    api: Arc<A>,
    store: UserStore,
    locks: UserLocks,
}

impl<A> Clone for UsersService<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<A: ScrobblingApi> UsersService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_store(api, UserStore::new())
    }

    pub fn with_store(api: Arc<A>, store: UserStore) -> Self {
        Self {
            api,
            store,
            locks: UserLocks::new(),
        }
    }

    /// Fetch a request token and move the user into `Registering`.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn start_registration_process(&self, user: &ChatUser) -> RegistryResult<()> {
        let _guard = self.locks.lock(&user.id).await;

        if self.store.is_registered(&user.id).await {
            return Err(RegistryError::UserAlreadyRegistered);
        }
        if self.store.is_registering(&user.id).await {
            return Err(RegistryError::UserAlreadyInRegistrationProcess);
        }

        let token = self.api.fetch_request_token().await?;
        self.store
            .insert_registering_if_absent(RegisteringUser::new(user, token))
            .await?;

        info!("Registration started for {}", user.display_name);
        Ok(())
    }

    /// Authorization URL for the user's pending token. No network I/O.
    pub async fn get_registration_process_login_url(&self, user: &ChatUser) -> RegistryResult<String> {
        let token = self
            .store
            .pending_token(&user.id)
            .await
            .ok_or(RegistryError::UserNotInRegistrationProcess)?;

        Ok(self.api.authorization_url(&token))
    }

    /// Remember the follow-up listener so a cancel can stop it.
    ///
    /// Does nothing if the user is not registering.
    pub async fn append_collector_on_registration_process(
        &self,
        user: &ChatUser,
        collector: Arc<dyn FollowUpCollector>,
    ) {
        if !self.store.attach_collector(&user.id, collector).await {
            debug!(user_id = %user.id, "No registration to attach a collector to");
        }
    }

    /// Drop the pending registration, if any, and stop its listener.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn cancel_registration_process(&self, user: &ChatUser) {
        let _guard = self.locks.lock(&user.id).await;

        if let Some(record) = self.store.remove_registering(&user.id).await {
            info!("Registration cancelled for {}", user.display_name);
            if let Some(collector) = record.follow_up_collector {
                collector.stop();
            }
        }
    }

    /// Exchange the pending token for a session and register the user.
    ///
    /// The registering record is cleared whether or not the exchange works,
    /// so a failed attempt has to start over.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn complete_registration_process(&self, user: &ChatUser) -> RegistryResult<RegisteredUser> {
        let _guard = self.locks.lock(&user.id).await;

        let token = self
            .store
            .pending_token(&user.id)
            .await
            .ok_or(RegistryError::UserNotInRegistrationProcess)?;

        let session = match self.api.get_session(token).await {
            Ok(session) => session,
            Err(e) => {
                self.store.remove_registering(&user.id).await;
                warn!("Session exchange failed for {}: {}", user.display_name, e);
                return Err(e.into());
            }
        };

        let registered = self
            .store
            .promote(RegisteredUser {
                chat_user_id: user.id.clone(),
                chat_user_display_name: user.display_name.clone(),
                external_user_name: session.user_name,
                external_session_key: session.session_key,
                scrobbling_enabled: true,
            })
            .await?;

        info!(
            "Registered {} as Last.fm user {}",
            user.display_name, registered.external_user_name
        );
        Ok(registered)
    }

    pub async fn is_user_in_registration_process(&self, user: &ChatUser) -> bool {
        self.store.is_registering(&user.id).await
    }

    pub async fn is_user_registered(&self, user: &ChatUser) -> bool {
        self.store.is_registered(&user.id).await
    }

    /// Copy of the user's registration record.
    pub async fn get_registered_user(&self, user: &ChatUser) -> RegistryResult<RegisteredUser> {
        self.store
            .registered(&user.id)
            .await
            .ok_or(RegistryError::UserNotRegistered)
    }

    /// Turn scrobbling on or off, returning the previous setting.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn toggle_scrobbling_for_user(&self, user: &ChatUser, enabled: bool) -> RegistryResult<bool> {
        let previous = self
            .store
            .set_scrobbling(&user.id, enabled)
            .await
            .ok_or(RegistryError::UserNotRegistered)?;

        debug!("Scrobbling {} -> {}", previous, enabled);
        Ok(previous)
    }

    /// Forget the user's Last.fm link.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn unregister_user(&self, user: &ChatUser) -> RegistryResult<()> {
        let _guard = self.locks.lock(&user.id).await;

        self.store
            .remove_registered(&user.id)
            .await
            .ok_or(RegistryError::UserNotRegistered)?;

        info!("Unregistered {}", user.display_name);
        Ok(())
    }

    /// Submit plays with an explicit session key.
    ///
    /// Tracks and playbacks are paired by position. Returns the number of
    /// plays submitted.
    #[instrument(skip_all, fields(count = tracks.len()))]
    pub async fn scrobble(
        &self,
        tracks: &[Track],
        playbacks: &[PlaybackData],
        session_key: &str,
    ) -> RegistryResult<usize> {
        if tracks.len() != playbacks.len() {
            return Err(RegistryError::MismatchedScrobbleData {
                tracks: tracks.len(),
                playbacks: playbacks.len(),
            });
        }

        let scrobbles: Vec<_> = tracks
            .iter()
            .zip(playbacks)
            .map(|(track, playback)| to_scrobble(track, playback))
            .collect();

        for batch in scrobbles.chunks(MAX_SCROBBLES_PER_REQUEST) {
            self.api
                .scrobble(batch.to_vec(), session_key.to_string())
                .await?;
        }

        Ok(scrobbles.len())
    }

    /// Submit plays on behalf of a registered user, honouring their toggle.
    #[instrument(skip_all, fields(user_id = %user.id, count = tracks.len()))]
    pub async fn scrobble_for_user(
        &self,
        user: &ChatUser,
        tracks: &[Track],
        playbacks: &[PlaybackData],
    ) -> RegistryResult<ScrobbleOutcome> {
        let registered = self.get_registered_user(user).await?;

        if !registered.scrobbling_enabled {
            debug!("Scrobbling disabled, skipping {} plays", tracks.len());
            return Ok(ScrobbleOutcome::Disabled);
        }

        let count = self
            .scrobble(
                tracks,
                playbacks,
                registered.external_session_key.expose_secret(),
            )
            .await?;

        Ok(ScrobbleOutcome::Submitted(count))
    }

    pub async fn registered_count(&self) -> usize {
        self.store.registered_count().await
    }

    pub async fn registering_count(&self) -> usize {
        self.store.registering_count().await
    }
}
