//! Session lifecycle: profile construction, launch, teardown.
//!
//! One [`Session`] per scenario task, created by the [`SessionManager`] at
//! scenario start and released at scenario end. The handle carries the
//! `Uninitialized -> Active -> Terminated` state machine; a terminated
//! session is never reused, and every driver access is gated on the Active
//! state so lifecycle ordering bugs fail fast instead of silently creating a
//! session.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{BrowserKind, Environment, RunConfig};
use crate::driver::Driver;
use crate::result::{CarritoError, CarritoResult};

/// Lifecycle state of a session slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been created yet
    Uninitialized,
    /// Session is live and usable
    Active,
    /// Session has been released; terminal, never reused
    Terminated,
}

/// Pre-launch session configuration.
///
/// Profile settings are immutable once the session is launched, so
/// everything here must be decided before [`SessionProvider::launch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    /// Browser kind the profile was built for
    pub kind: BrowserKind,
    /// Effective headless flag (requested kind or forced by CI detection)
    pub headless: bool,
    /// Fixed window size
    pub window_size: (u32, u32),
    /// Process arguments
    pub args: Vec<String>,
    /// Profile preferences (key, value)
    pub prefs: Vec<(String, String)>,
    /// Deterministic download directory
    pub download_dir: PathBuf,
}

impl SessionProfile {
    /// Build the launch profile for a browser kind.
    ///
    /// Any CI/container detection signal switches the profile into
    /// headless/sandbox-safe mode and adds the CI-stability flags, regardless
    /// of the nominally requested kind.
    #[must_use]
    pub fn build(kind: BrowserKind, env: &Environment) -> Self {
        let ci = env.is_ci();
        let headless = kind.is_headless() || ci;
        let window_size = (1920, 1080);
        let download_dir = std::env::temp_dir().join("carrito-downloads");

        let mut args = Vec::new();
        let mut prefs = Vec::new();
        match kind {
            BrowserKind::Chrome | BrowserKind::HeadlessChrome | BrowserKind::Edge => {
                args.extend(
                    [
                        "--no-sandbox",
                        "--disable-dev-shm-usage",
                        "--disable-gpu",
                        "--disable-extensions",
                        "--disable-notifications",
                        "--mute-audio",
                    ]
                    .map(String::from),
                );
                args.push(format!(
                    "--window-size={},{}",
                    window_size.0, window_size.1
                ));
                prefs.push((
                    "download.default_directory".to_string(),
                    download_dir.display().to_string(),
                ));
                prefs.push(("download.prompt_for_download".to_string(), "false".to_string()));
                prefs.push(("safebrowsing.enabled".to_string(), "false".to_string()));
            }
            BrowserKind::Firefox | BrowserKind::HeadlessFirefox => {
                prefs.push(("dom.webnotifications.enabled".to_string(), "false".to_string()));
                prefs.push(("media.volume_scale".to_string(), "0.0".to_string()));
                prefs.push(("browser.download.folderList".to_string(), "2".to_string()));
                prefs.push((
                    "browser.download.dir".to_string(),
                    download_dir.display().to_string(),
                ));
                prefs.push((
                    "browser.safebrowsing.malware.enabled".to_string(),
                    "false".to_string(),
                ));
            }
        }

        if headless {
            args.push("--headless".to_string());
        }
        if ci {
            args.extend(
                [
                    "--disable-background-timer-throttling",
                    "--disable-backgrounding-occluded-windows",
                    "--disable-renderer-backgrounding",
                ]
                .map(String::from),
            );
        }

        Self {
            kind,
            headless,
            window_size,
            args,
            prefs,
            download_dir,
        }
    }
}

/// Launches browser sessions from a pre-built profile.
///
/// The real chromiumoxide-backed provider lives behind the `browser`
/// feature; tests use [`MockProvider`].
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Launch a browser and return its capability driver
    async fn launch(&self, profile: &SessionProfile) -> CarritoResult<Box<dyn Driver>>;
}

struct SessionInner {
    driver: Box<dyn Driver>,
    kind: BrowserKind,
    headless: bool,
    state: Mutex<SessionState>,
}

/// Handle to one live automation session.
///
/// Cheap to clone; all clones share the same state machine, so terminating
/// through the manager immediately invalidates every page object holding a
/// clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("kind", &self.inner.kind)
            .field("headless", &self.inner.headless)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    fn new_active(driver: Box<dyn Driver>, kind: BrowserKind, headless: bool) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                driver,
                kind,
                headless,
                state: Mutex::new(SessionState::Active),
            }),
        }
    }

    /// Browser kind this session was launched as
    #[must_use]
    pub fn kind(&self) -> BrowserKind {
        self.inner.kind
    }

    /// Whether the session runs without a display surface
    #[must_use]
    pub fn is_headless(&self) -> bool {
        self.inner.headless
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.inner.state.lock().unwrap()
    }

    /// Whether the session is Active
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Access the capability driver.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::SessionNotInitialized`] unless Active.
    pub fn driver(&self) -> CarritoResult<&dyn Driver> {
        if self.is_active() {
            Ok(&*self.inner.driver)
        } else {
            Err(CarritoError::SessionNotInitialized)
        }
    }

    fn mark_terminated(&self) {
        *self.inner.state.lock().unwrap() = SessionState::Terminated;
    }
}

/// Owns the scenario's single session slot.
///
/// Mutation of the slot only ever happens on the owning scenario task, and
/// teardown always leaves it empty so a later `initialize` starts clean.
pub struct SessionManager {
    provider: Arc<dyn SessionProvider>,
    config: RunConfig,
    environment: Environment,
    slot: Option<Session>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("initialized", &self.slot.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager over a session provider
    #[must_use]
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        config: RunConfig,
        environment: Environment,
    ) -> Self {
        Self {
            provider,
            config,
            environment,
            slot: None,
        }
    }

    /// The run configuration this manager applies
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The environment probe used for CI/Docker detection
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Create and fully configure a session for the given kind.
    ///
    /// Builds the immutable profile, launches through the provider, applies
    /// the implicit-wait and page-load bounds, and fullscreens the viewport
    /// unless headless. The new session fills the slot.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::SessionLaunch`] (or a driver error) if the
    /// session cannot be created or configured.
    pub async fn initialize(&mut self, kind: BrowserKind) -> CarritoResult<Session> {
        if self.slot.is_some() {
            warn!("initialize called with a live session; terminating it first");
            self.terminate().await;
        }

        let profile = SessionProfile::build(kind, &self.environment);
        info!(kind = %kind, headless = profile.headless, "launching browser session");
        let driver = self.provider.launch(&profile).await?;
        driver
            .set_timeouts(self.config.implicit_wait, self.config.page_load_timeout)
            .await?;
        if !profile.headless {
            driver.fullscreen().await?;
        }

        let session = Session::new_active(driver, kind, profile.headless);
        self.slot = Some(session.clone());
        Ok(session)
    }

    /// The current session.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::SessionNotInitialized`] if the slot is empty.
    pub fn active(&self) -> CarritoResult<Session> {
        self.slot
            .clone()
            .ok_or(CarritoError::SessionNotInitialized)
    }

    /// Whether the slot currently holds a session
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.slot.is_some()
    }

    /// Release the current session.
    ///
    /// Quit failures are logged and swallowed: teardown never propagates an
    /// error from cleanup. The slot is always cleared and the handle marked
    /// Terminated, so clones held by page objects fail fast afterwards.
    pub async fn terminate(&mut self) {
        let Some(session) = self.slot.take() else {
            debug!("terminate called with no live session");
            return;
        };
        if let Ok(driver) = session.driver() {
            if let Err(err) = driver.quit().await {
                warn!(error = %err, "failed to quit browser session");
            }
        }
        session.mark_terminated();
        info!(kind = %session.kind(), "browser session terminated");
    }
}

// ============================================================================
// Mock provider
// ============================================================================

/// Scripted provider for hermetic tests.
///
/// Hands out pre-registered [`crate::driver::MockDriver`]s (shared via `Arc`
/// so the test keeps a handle for inspection) and records every launch
/// profile.
#[derive(Debug, Default)]
pub struct MockProvider {
    drivers: Mutex<Vec<Arc<crate::driver::MockDriver>>>,
    launches: Mutex<Vec<SessionProfile>>,
    fail_launch: bool,
}

impl MockProvider {
    /// Create an empty provider; launches yield blank mock pages
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a driver for the next launch
    #[must_use]
    pub fn with_driver(self, driver: Arc<crate::driver::MockDriver>) -> Self {
        self.drivers.lock().unwrap().push(driver);
        self
    }

    /// Make every launch fail
    #[must_use]
    pub fn with_failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Profiles seen so far, in launch order
    #[must_use]
    pub fn launches(&self) -> Vec<SessionProfile> {
        self.launches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionProvider for MockProvider {
    async fn launch(&self, profile: &SessionProfile) -> CarritoResult<Box<dyn Driver>> {
        if self.fail_launch {
            return Err(CarritoError::SessionLaunch {
                message: "scripted launch failure".to_string(),
            });
        }
        self.launches.lock().unwrap().push(profile.clone());
        let mut drivers = self.drivers.lock().unwrap();
        let driver = if drivers.is_empty() {
            Arc::new(crate::driver::MockDriver::new())
        } else {
            drivers.remove(0)
        };
        Ok(Box::new(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use std::time::Duration;

    fn plain_env() -> Environment {
        Environment::from_vars::<_, String, String>([])
    }

    fn manager_with(driver: Arc<MockDriver>) -> SessionManager {
        let provider = Arc::new(MockProvider::new().with_driver(driver));
        SessionManager::new(provider, RunConfig::default(), plain_env())
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn test_chrome_profile_has_stability_args() {
            let profile = SessionProfile::build(BrowserKind::Chrome, &plain_env());
            assert!(!profile.headless);
            assert!(profile.args.iter().any(|a| a == "--disable-notifications"));
            assert!(profile.args.iter().any(|a| a == "--mute-audio"));
            assert!(profile.args.iter().any(|a| a == "--window-size=1920,1080"));
            assert!(profile
                .prefs
                .iter()
                .any(|(k, v)| k == "safebrowsing.enabled" && v == "false"));
        }

        #[test]
        fn test_download_dir_is_preset() {
            let profile = SessionProfile::build(BrowserKind::Chrome, &plain_env());
            let dir = profile.download_dir.display().to_string();
            assert!(profile
                .prefs
                .iter()
                .any(|(k, v)| k == "download.default_directory" && *v == dir));
        }

        #[test]
        fn test_headless_kind_adds_headless_arg() {
            let profile = SessionProfile::build(BrowserKind::HeadlessChrome, &plain_env());
            assert!(profile.headless);
            assert!(profile.args.iter().any(|a| a == "--headless"));
        }

        #[test]
        fn test_ci_forces_headless_for_any_kind() {
            let env = Environment::from_vars([("CI", "true")]);
            for kind in BrowserKind::SUPPORTED {
                let profile = SessionProfile::build(kind, &env);
                assert!(profile.headless, "{kind} should be headless under CI");
                assert!(profile
                    .args
                    .iter()
                    .any(|a| a == "--disable-background-timer-throttling"));
            }
        }

        #[test]
        fn test_firefox_profile_mutes_and_redirects_downloads() {
            let profile = SessionProfile::build(BrowserKind::Firefox, &plain_env());
            assert!(profile
                .prefs
                .iter()
                .any(|(k, v)| k == "media.volume_scale" && v == "0.0"));
            assert!(profile.prefs.iter().any(|(k, _)| k == "browser.download.dir"));
        }
    }

    mod manager_tests {
        use super::*;

        #[tokio::test]
        async fn test_initialize_applies_timeouts_and_fullscreen() {
            let driver = Arc::new(MockDriver::new());
            let mut manager = manager_with(driver.clone());
            let session = manager.initialize(BrowserKind::Chrome).await.unwrap();
            assert!(session.is_active());
            assert_eq!(session.kind(), BrowserKind::Chrome);
            assert!(driver.was_called("set_timeouts:10000:30000"));
            assert!(driver.was_called("fullscreen"));
        }

        #[tokio::test]
        async fn test_every_supported_kind_initializes_with_bounds_applied() {
            let provider = Arc::new(MockProvider::new());
            let mut manager =
                SessionManager::new(provider, RunConfig::default(), plain_env());
            for kind in BrowserKind::SUPPORTED {
                let session = manager.initialize(kind).await.unwrap();
                assert!(session.is_active(), "{kind} session should be active");
                assert_eq!(session.kind(), kind);
                manager.terminate().await;
            }
        }

        #[tokio::test]
        async fn test_headless_initialize_skips_fullscreen() {
            let driver = Arc::new(MockDriver::new());
            let mut manager = manager_with(driver.clone());
            manager
                .initialize(BrowserKind::HeadlessChrome)
                .await
                .unwrap();
            assert!(!driver.was_called("fullscreen"));
        }

        #[tokio::test]
        async fn test_active_before_initialize_fails() {
            let manager = SessionManager::new(
                Arc::new(MockProvider::new()),
                RunConfig::default(),
                plain_env(),
            );
            let err = manager.active().unwrap_err();
            assert!(matches!(err, CarritoError::SessionNotInitialized));
        }

        #[tokio::test]
        async fn test_terminate_quits_and_clears_slot() {
            let driver = Arc::new(MockDriver::new());
            let mut manager = manager_with(driver.clone());
            let session = manager.initialize(BrowserKind::Chrome).await.unwrap();
            manager.terminate().await;

            assert!(driver.was_called("quit"));
            assert!(!manager.is_initialized());
            assert_eq!(session.state(), SessionState::Terminated);
            assert!(matches!(
                session.driver(),
                Err(CarritoError::SessionNotInitialized)
            ));
        }

        #[tokio::test]
        async fn test_quit_failure_is_swallowed_and_slot_still_cleared() {
            let driver = Arc::new(MockDriver::new().with_failing_quit());
            let mut manager = manager_with(driver.clone());
            manager.initialize(BrowserKind::Chrome).await.unwrap();
            manager.terminate().await;
            assert!(!manager.is_initialized());
        }

        #[tokio::test]
        async fn test_reinitialize_after_terminate_starts_clean() {
            let first = Arc::new(MockDriver::new());
            let second = Arc::new(MockDriver::new());
            let provider = Arc::new(
                MockProvider::new()
                    .with_driver(first)
                    .with_driver(second),
            );
            let mut manager =
                SessionManager::new(provider, RunConfig::default(), plain_env());

            manager.initialize(BrowserKind::Chrome).await.unwrap();
            manager.terminate().await;
            let session = manager.initialize(BrowserKind::Firefox).await.unwrap();
            assert!(session.is_active());
            assert_eq!(session.kind(), BrowserKind::Firefox);
        }

        #[tokio::test]
        async fn test_launch_failure_propagates() {
            let provider = Arc::new(MockProvider::new().with_failing_launch());
            let mut manager =
                SessionManager::new(provider, RunConfig::default(), plain_env());
            let err = manager.initialize(BrowserKind::Edge).await.unwrap_err();
            assert!(matches!(err, CarritoError::SessionLaunch { .. }));
        }

        #[tokio::test]
        async fn test_custom_timeout_bounds_are_applied() {
            let driver = Arc::new(MockDriver::new());
            let provider = Arc::new(MockProvider::new().with_driver(driver.clone()));
            let config = RunConfig::new()
                .with_implicit_wait(Duration::from_secs(5))
                .with_page_load_timeout(Duration::from_secs(15));
            let mut manager = SessionManager::new(provider, config, plain_env());
            manager.initialize(BrowserKind::Chrome).await.unwrap();
            assert!(driver.was_called("set_timeouts:5000:15000"));
        }
    }
}
