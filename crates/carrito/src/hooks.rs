//! Scenario lifecycle orchestration.
//!
//! [`ScenarioHooks`] brackets each scenario: `before` resolves the browser
//! kind, launches the session, and binds the page set; `after` captures a
//! failure screenshot best-effort, then unconditionally clears scenario state
//! and releases the session. Teardown runs in full no matter what the
//! scenario body did.

use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{BrowserKind, Environment, RunConfig};
use crate::context::ScenarioContext;
use crate::driver::Driver;
use crate::page::LoginPage;
use crate::result::CarritoResult;
use crate::session::{SessionManager, SessionProvider};

/// Terminal status of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    /// Every step succeeded
    Passed,
    /// A step failed
    Failed,
}

/// Record of one completed scenario, handed to an external reporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Terminal status
    pub status: ScenarioStatus,
    /// Failure screenshot, when one could be captured
    #[serde(skip)]
    pub screenshot: Option<Vec<u8>>,
    /// When teardown finished
    pub completed_at: SystemTime,
}

impl ScenarioOutcome {
    /// Whether the scenario passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Before/after bracket around each scenario
pub struct ScenarioHooks {
    manager: SessionManager,
    context: ScenarioContext,
}

impl std::fmt::Debug for ScenarioHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioHooks")
            .field("manager", &self.manager)
            .field("context", &self.context)
            .finish()
    }
}

impl ScenarioHooks {
    /// Create hooks over a session provider
    #[must_use]
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        config: RunConfig,
        environment: Environment,
    ) -> Self {
        Self {
            manager: SessionManager::new(provider, config, environment),
            context: ScenarioContext::new(),
        }
    }

    /// The scenario context
    #[must_use]
    pub const fn context(&self) -> &ScenarioContext {
        &self.context
    }

    /// The scenario context, mutably
    pub fn context_mut(&mut self) -> &mut ScenarioContext {
        &mut self.context
    }

    /// The session manager
    #[must_use]
    pub const fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Start a scenario: resolve the browser kind, launch the session, bind
    /// the page set.
    ///
    /// Kind precedence: explicit config value, then the `BROWSER` variable,
    /// then Chrome.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unsupported kind, or a launch
    /// error if the session cannot be created.
    pub async fn before(&mut self, scenario_name: &str) -> CarritoResult<()> {
        let browser = self.manager.config().browser.clone();
        let kind = BrowserKind::resolve(browser.as_deref(), self.manager.environment())?;
        info!(scenario = scenario_name, kind = %kind, "starting scenario");

        let base_url = self.manager.config().base_url.clone();
        let session = self.manager.initialize(kind).await?;
        let login = LoginPage::new(session.clone()).with_base_url(base_url);
        self.context.initialize_pages_with_login(&session, login);
        Ok(())
    }

    /// Finish a scenario and produce its outcome.
    ///
    /// On failure a screenshot is captured from the live session best-effort;
    /// a capture failure is logged and suppressed, never replacing the
    /// scenario's own result. Scratch data, page bindings, and the session
    /// are released unconditionally, in that order.
    pub async fn after(&mut self, scenario_name: &str, failed: bool) -> ScenarioOutcome {
        let screenshot = if failed {
            self.capture_screenshot(scenario_name).await
        } else {
            None
        };

        self.context.clear_data();
        self.context.release_pages();
        self.manager.terminate().await;

        let status = if failed {
            ScenarioStatus::Failed
        } else {
            ScenarioStatus::Passed
        };
        info!(scenario = scenario_name, status = ?status, "scenario finished");
        ScenarioOutcome {
            name: scenario_name.to_string(),
            status,
            screenshot,
            completed_at: SystemTime::now(),
        }
    }

    async fn capture_screenshot(&self, scenario_name: &str) -> Option<Vec<u8>> {
        let session = match self.manager.active() {
            Ok(session) => session,
            Err(err) => {
                warn!(scenario = scenario_name, error = %err, "no session for failure screenshot");
                return None;
            }
        };
        let driver = match session.driver() {
            Ok(driver) => driver,
            Err(err) => {
                warn!(scenario = scenario_name, error = %err, "no session for failure screenshot");
                return None;
            }
        };
        match driver.screenshot_png().await {
            Ok(png) => Some(png),
            Err(err) => {
                warn!(scenario = scenario_name, error = %err, "failure screenshot capture failed");
                None
            }
        }
    }
}
