//! Session ownership and the authentication state machine.
//!
//! The session is created once per process run and never recreated: it is
//! transitioned in place, and fatal conditions terminate the process. The
//! bridge (dispatcher and forwarder) is built exactly once, by the caller,
//! after the first transition into [`SessionState::Active`]; re-entering
//! `Active` after a reconnect reuses the same actor handles.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use steamgate_config::{Config, ConfigStore, Prompter};

use crate::actor::Actor;
use crate::auth::{AuthFailure, Credentials, FatalError, GuardMaterial, LogonRequest};
use crate::primary::{
    DependentActor, PersonaState, PrimaryActor, PrimaryNotification, SessionArtifacts,
};

/// Authentication lifecycle of the backend session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No authentication attempt issued yet.
    Unauthenticated,
    /// First authentication attempt in flight.
    AwaitingFirstLogin,
    /// Authentication blocked on a guard challenge.
    AwaitingGuardChallenge,
    /// Authenticated; actor handles are valid.
    Active,
    /// Connection dropped; re-authentication in flight.
    Reconnecting,
}

/// The backend actor handles owned by one session.
///
/// Holds every actor twice: once behind its role trait for the session
/// manager, once as a plain [`Actor`] handle for the bridge.
pub struct ActorSet {
    primary: Arc<dyn PrimaryActor>,
    dependents: Vec<Arc<dyn DependentActor>>,
    handles: Vec<Arc<dyn Actor>>,
}

impl ActorSet {
    /// Start building a set around its primary actor.
    pub fn builder<P: PrimaryActor + 'static>(primary: Arc<P>) -> ActorSetBuilder {
        ActorSetBuilder {
            primary: primary.clone(),
            dependents: Vec::new(),
            handles: vec![primary],
        }
    }

    /// The primary actor.
    pub fn primary(&self) -> &Arc<dyn PrimaryActor> {
        &self.primary
    }

    /// The dependent actors.
    pub fn dependents(&self) -> &[Arc<dyn DependentActor>] {
        &self.dependents
    }

    /// Every actor in the set, as plain actor handles.
    pub fn handles(&self) -> &[Arc<dyn Actor>] {
        &self.handles
    }

    /// Look an actor up by group name.
    pub fn actor(&self, group: &str) -> Option<&Arc<dyn Actor>> {
        self.handles.iter().find(|a| a.group() == group)
    }
}

/// Builder for [`ActorSet`].
pub struct ActorSetBuilder {
    primary: Arc<dyn PrimaryActor>,
    dependents: Vec<Arc<dyn DependentActor>>,
    handles: Vec<Arc<dyn Actor>>,
}

impl ActorSetBuilder {
    /// Attach a dependent actor.
    #[must_use]
    pub fn dependent<D: DependentActor + 'static>(mut self, actor: Arc<D>) -> Self {
        self.dependents.push(actor.clone());
        self.handles.push(actor);
        self
    }

    /// Finish the set.
    pub fn build(self) -> ActorSet {
        ActorSet {
            primary: self.primary,
            dependents: self.dependents,
            handles: self.handles,
        }
    }
}

/// Owns the actor set and drives authentication.
pub struct SessionManager {
    actors: ActorSet,
    store: Arc<dyn ConfigStore>,
    prompter: Arc<dyn Prompter>,
    credentials: Credentials,
    guard_artifact: Option<Vec<u8>>,
    pending_auth_code: Option<String>,
    state: SessionState,
    notifications: broadcast::Receiver<PrimaryNotification>,
}

impl SessionManager {
    /// Create the session around its actors and ports.
    ///
    /// Subscribes to primary-actor notifications immediately so that
    /// artifacts issued during the first logon are not lost.
    pub fn new(
        actors: ActorSet,
        store: Arc<dyn ConfigStore>,
        prompter: Arc<dyn Prompter>,
        config: &Config,
    ) -> Result<Self, FatalError> {
        let (Some(account_name), Some(password)) =
            (config.steam_username.clone(), config.steam_password.clone())
        else {
            return Err(FatalError::MissingCredentials);
        };
        let notifications = actors.primary().notifications();
        Ok(Self {
            actors,
            store,
            prompter,
            credentials: Credentials {
                account_name,
                password,
            },
            guard_artifact: config.steam_guard.clone(),
            pending_auth_code: None,
            state: SessionState::Unauthenticated,
            notifications,
        })
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The primary actor handle.
    pub fn primary(&self) -> &Arc<dyn PrimaryActor> {
        self.actors.primary()
    }

    /// Every actor handle, for bridge construction. Only meaningful once the
    /// session is [`SessionState::Active`].
    pub fn actor_handles(&self) -> Vec<Arc<dyn Actor>> {
        self.actors.handles().to_vec()
    }

    /// Drive the first authentication to [`SessionState::Active`].
    ///
    /// A guard challenge with no stored artifact and no previously supplied
    /// code asks the input port for one and retries; a challenge raised
    /// against supplied material is fatal.
    pub async fn log_on(&mut self) -> Result<(), FatalError> {
        self.state = SessionState::AwaitingFirstLogin;
        loop {
            let guard = self.guard_material();
            let had_material = guard.is_some();
            let request = LogonRequest {
                credentials: self.credentials.clone(),
                guard,
            };
            let outcome = self.actors.primary().log_on(&request).await;
            match outcome {
                Ok(success) => {
                    info!(identity = %success.identity, "logged on");
                    self.enter_active().await;
                    return Ok(());
                }
                Err(AuthFailure::InvalidCredentials) => {
                    self.clear_stored_credentials()?;
                    return Err(FatalError::InvalidCredentials);
                }
                Err(AuthFailure::AlreadyActiveElsewhere) => {
                    return Err(FatalError::AlreadyActiveElsewhere);
                }
                Err(AuthFailure::ChallengeRequired) => {
                    self.state = SessionState::AwaitingGuardChallenge;
                    if had_material {
                        return Err(FatalError::GuardRejected);
                    }
                    info!("guard challenge raised, asking for a code");
                    let code = self.prompter.request_line(
                        "A guard code has been sent to you. Enter it:",
                        Some("A guard code is required to finish signing in."),
                    )?;
                    self.pending_auth_code = Some(code);
                }
                Err(AuthFailure::Other(cause)) => return Err(FatalError::Auth(cause)),
            }
        }
    }

    /// Consume primary-actor notifications until the backend goes away or a
    /// fatal condition arises. Re-authenticates in place on a logged-off
    /// signal; the caller's bridge is never rebuilt.
    pub async fn run(&mut self) -> Result<(), FatalError> {
        loop {
            let notification = self.notifications.recv().await;
            match notification {
                Ok(PrimaryNotification::WebSession { session_id }) => {
                    self.bind_dependents(session_id).await;
                }
                Ok(PrimaryNotification::Sentry { artifact }) => {
                    self.persist_guard_artifact(artifact)?;
                }
                Ok(PrimaryNotification::LoggedOff) => {
                    warn!("logged off by the backend, re-authenticating");
                    self.re_log_on().await?;
                }
                Ok(PrimaryNotification::Debug { line }) => {
                    debug!(group = self.actors.primary().group(), "{line}");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session notification stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("primary actor notification stream closed");
                    return Ok(());
                }
            }
        }
    }

    /// Re-issue authentication after a logged-off signal, without user
    /// interaction. Credential failures at this point were working before,
    /// so every failure is fatal with a pointed message.
    async fn re_log_on(&mut self) -> Result<(), FatalError> {
        self.state = SessionState::Reconnecting;
        let request = LogonRequest {
            credentials: self.credentials.clone(),
            guard: self.guard_material(),
        };
        let outcome = self.actors.primary().log_on(&request).await;
        match outcome {
            Ok(success) => {
                info!(identity = %success.identity, "re-authenticated");
                self.enter_active().await;
                Ok(())
            }
            Err(AuthFailure::InvalidCredentials) => Err(FatalError::CredentialsRejected),
            Err(AuthFailure::AlreadyActiveElsewhere) => Err(FatalError::AlreadyActiveElsewhere),
            Err(AuthFailure::ChallengeRequired) => Err(FatalError::GuardRejected),
            Err(AuthFailure::Other(cause)) => Err(FatalError::Auth(cause)),
        }
    }

    async fn enter_active(&mut self) {
        if let Err(err) = self.actors.primary().set_persona(PersonaState::Online).await {
            warn!(%err, "failed to set persona state");
        }
        self.state = SessionState::Active;
    }

    /// Bind every dependent actor to freshly negotiated web-session
    /// artifacts.
    async fn bind_dependents(&self, session_id: String) {
        let cookies = match self.actors.primary().establish_web_session().await {
            Ok(cookies) => cookies,
            Err(err) => {
                warn!(%err, "web session negotiation failed");
                return;
            }
        };
        let artifacts = SessionArtifacts {
            session_id,
            cookies,
        };
        for dependent in self.actors.dependents() {
            dependent.bind_session(&artifacts);
        }
        debug!(
            dependents = self.actors.dependents().len(),
            "dependent actors bound to web session"
        );
    }

    fn guard_material(&self) -> Option<GuardMaterial> {
        if let Some(artifact) = &self.guard_artifact {
            Some(GuardMaterial::Artifact(artifact.clone()))
        } else {
            self.pending_auth_code.clone().map(GuardMaterial::Code)
        }
    }

    /// Store a server-issued persistent-login artifact for future runs.
    fn persist_guard_artifact(&mut self, artifact: Vec<u8>) -> Result<(), FatalError> {
        info!(bytes = artifact.len(), "persisting guard artifact");
        self.guard_artifact = Some(artifact.clone());
        let mut config = self.store.load()?.unwrap_or_default();
        config.steam_guard = Some(artifact);
        self.store.save(&config)?;
        Ok(())
    }

    fn clear_stored_credentials(&self) -> Result<(), FatalError> {
        if let Some(mut config) = self.store.load()? {
            config.clear_credentials();
            self.store.save(&config)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::{LoopbackDependent, LoopbackPrimary};
    use steamgate_config::prompt::ScriptedPrompter;
    use steamgate_config::store::JsonConfigStore;
    use steamgate_core::SteamId;

    struct Fixture {
        primary: Arc<LoopbackPrimary>,
        trade: Arc<LoopbackDependent>,
        store: Arc<JsonConfigStore>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonConfigStore::new(dir.path().join("bot.json")));
        store
            .save(&Config {
                steam_username: Some("bot".into()),
                steam_password: Some("pw".into()),
                ..Config::default()
            })
            .unwrap();
        Fixture {
            primary: Arc::new(LoopbackPrimary::new(SteamId::new(76_561_198_000_000_001))),
            trade: Arc::new(LoopbackDependent::new("trade")),
            store,
            _dir: dir,
        }
    }

    fn manager(fixture: &Fixture, prompter: ScriptedPrompter) -> SessionManager {
        let actors = ActorSet::builder(fixture.primary.clone())
            .dependent(fixture.trade.clone())
            .build();
        let config = fixture.store.load().unwrap().unwrap();
        SessionManager::new(actors, fixture.store.clone(), Arc::new(prompter), &config).unwrap()
    }

    // ── First logon ─────────────────────────────────────────────────

    #[tokio::test]
    async fn logon_success_reaches_active() {
        let fixture = fixture();
        let mut session = manager(&fixture, ScriptedPrompter::default());

        assert_eq!(session.state(), SessionState::Unauthenticated);
        session.log_on().await.unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(
            fixture.primary.identity(),
            Some(SteamId::new(76_561_198_000_000_001))
        );
        assert_eq!(fixture.primary.persona(), Some(PersonaState::Online));
    }

    #[tokio::test]
    async fn invalid_credentials_clear_the_stored_ones() {
        let fixture = fixture();
        fixture
            .primary
            .push_auth_failure(AuthFailure::InvalidCredentials);
        let mut session = manager(&fixture, ScriptedPrompter::default());

        let err = session.log_on().await.unwrap_err();
        assert!(matches!(err, FatalError::InvalidCredentials));

        let on_disk = fixture.store.load().unwrap().unwrap();
        assert!(on_disk.steam_username.is_none());
        assert!(on_disk.steam_password.is_none());
    }

    #[tokio::test]
    async fn already_active_elsewhere_is_fatal_without_mutation() {
        let fixture = fixture();
        fixture
            .primary
            .push_auth_failure(AuthFailure::AlreadyActiveElsewhere);
        let mut session = manager(&fixture, ScriptedPrompter::default());

        let err = session.log_on().await.unwrap_err();
        assert!(matches!(err, FatalError::AlreadyActiveElsewhere));

        let on_disk = fixture.store.load().unwrap().unwrap();
        assert_eq!(on_disk.steam_username.as_deref(), Some("bot"));
    }

    #[tokio::test]
    async fn challenge_prompts_once_and_retries_with_the_code() {
        let fixture = fixture();
        fixture
            .primary
            .push_auth_failure(AuthFailure::ChallengeRequired);
        let prompter = ScriptedPrompter::new(["ABC12"]);
        let mut session = manager(&fixture, prompter);

        session.log_on().await.unwrap();
        assert_eq!(session.state(), SessionState::Active);

        let attempts = fixture.primary.logon_attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].guard.is_none());
        assert_eq!(
            attempts[1].guard,
            Some(GuardMaterial::Code("ABC12".into()))
        );
    }

    #[tokio::test]
    async fn stored_artifact_is_sent_without_prompting() {
        let fixture = fixture();
        let mut config = fixture.store.load().unwrap().unwrap();
        config.steam_guard = Some(vec![7, 7, 7]);
        fixture.store.save(&config).unwrap();

        let prompter = ScriptedPrompter::default();
        let actors = ActorSet::builder(fixture.primary.clone()).build();
        let mut session = SessionManager::new(
            actors,
            fixture.store.clone(),
            Arc::new(prompter),
            &config,
        )
        .unwrap();

        session.log_on().await.unwrap();
        let attempts = fixture.primary.logon_attempts();
        assert_eq!(
            attempts[0].guard,
            Some(GuardMaterial::Artifact(vec![7, 7, 7]))
        );
    }

    #[tokio::test]
    async fn challenge_against_supplied_material_is_fatal() {
        let fixture = fixture();
        let mut config = fixture.store.load().unwrap().unwrap();
        config.steam_guard = Some(vec![1]);
        fixture.store.save(&config).unwrap();
        fixture
            .primary
            .push_auth_failure(AuthFailure::ChallengeRequired);

        let actors = ActorSet::builder(fixture.primary.clone()).build();
        let mut session = SessionManager::new(
            actors,
            fixture.store.clone(),
            Arc::new(ScriptedPrompter::default()),
            &config,
        )
        .unwrap();

        let err = session.log_on().await.unwrap_err();
        assert!(matches!(err, FatalError::GuardRejected));
    }

    #[tokio::test]
    async fn other_failures_surface_as_is() {
        let fixture = fixture();
        fixture
            .primary
            .push_auth_failure(AuthFailure::Other("eresult 88".into()));
        let mut session = manager(&fixture, ScriptedPrompter::default());

        let err = session.log_on().await.unwrap_err();
        assert!(matches!(err, FatalError::Auth(ref cause) if cause.contains("88")));
    }

    #[test]
    fn missing_credentials_refuse_construction() {
        let fixture = fixture();
        let actors = ActorSet::builder(fixture.primary.clone()).build();
        let result = SessionManager::new(
            actors,
            fixture.store.clone(),
            Arc::new(ScriptedPrompter::default()),
            &Config::default(),
        );
        assert!(matches!(result, Err(FatalError::MissingCredentials)));
    }

    // ── Notification loop ───────────────────────────────────────────

    #[tokio::test]
    async fn web_session_binds_dependents() {
        let fixture = fixture();
        let mut session = manager(&fixture, ScriptedPrompter::default());
        session.log_on().await.unwrap();

        fixture.primary.emit(PrimaryNotification::WebSession {
            session_id: "sess-9".into(),
        });
        // A fatal logged-off lets run() return so the test can observe state.
        fixture
            .primary
            .push_auth_failure(AuthFailure::InvalidCredentials);
        fixture.primary.emit(PrimaryNotification::LoggedOff);

        let err = session.run().await.unwrap_err();
        assert!(matches!(err, FatalError::CredentialsRejected));

        let bound = fixture.trade.bound_artifacts().unwrap();
        assert_eq!(bound.session_id, "sess-9");
        assert!(!bound.cookies.is_empty());
    }

    #[tokio::test]
    async fn sentry_artifact_is_persisted() {
        let fixture = fixture();
        let mut session = manager(&fixture, ScriptedPrompter::default());
        session.log_on().await.unwrap();

        fixture.primary.emit(PrimaryNotification::Sentry {
            artifact: vec![0xAA, 0xBB],
        });
        fixture
            .primary
            .push_auth_failure(AuthFailure::InvalidCredentials);
        fixture.primary.emit(PrimaryNotification::LoggedOff);

        let _ = session.run().await.unwrap_err();
        let on_disk = fixture.store.load().unwrap().unwrap();
        assert_eq!(on_disk.steam_guard, Some(vec![0xAA, 0xBB]));
    }

    #[tokio::test]
    async fn logged_off_re_authenticates_without_prompting() {
        let fixture = fixture();
        let prompter = ScriptedPrompter::default();
        let mut session = manager(&fixture, prompter);
        session.log_on().await.unwrap();
        assert_eq!(fixture.primary.logon_attempts().len(), 1);

        // First logged-off re-authenticates; the second hits a fatal failure
        // so run() returns and the test can observe the attempts.
        fixture.primary.push_auth_outcome(Ok(()));
        fixture
            .primary
            .push_auth_failure(AuthFailure::AlreadyActiveElsewhere);
        fixture.primary.emit(PrimaryNotification::LoggedOff);
        fixture.primary.emit(PrimaryNotification::LoggedOff);

        let err = session.run().await.unwrap_err();
        assert!(matches!(err, FatalError::AlreadyActiveElsewhere));
        assert_eq!(fixture.primary.logon_attempts().len(), 3);
        // Re-authentication used the same material with no interaction.
        let attempts = fixture.primary.logon_attempts();
        assert_eq!(attempts[1].credentials, attempts[0].credentials);
    }

    #[tokio::test]
    async fn reconnect_challenge_is_fatal() {
        let fixture = fixture();
        let mut session = manager(&fixture, ScriptedPrompter::default());
        session.log_on().await.unwrap();

        fixture
            .primary
            .push_auth_failure(AuthFailure::ChallengeRequired);
        fixture.primary.emit(PrimaryNotification::LoggedOff);

        let err = session.run().await.unwrap_err();
        assert!(matches!(err, FatalError::GuardRejected));
    }

    #[tokio::test]
    async fn actor_set_lookup_by_group() {
        let fixture = fixture();
        let actors = ActorSet::builder(fixture.primary.clone())
            .dependent(fixture.trade.clone())
            .build();
        assert!(actors.actor("steam").is_some());
        assert!(actors.actor("trade").is_some());
        assert!(actors.actor("tradeOffers").is_none());
        assert_eq!(actors.handles().len(), 2);
    }
}
