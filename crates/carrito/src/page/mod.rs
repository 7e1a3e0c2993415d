//! Page objects and the shared interaction layer.
//!
//! Every page object interacts with the DOM only through the bounded-wait
//! primitives of the [`Interact`] trait. Funneling every interaction through
//! an explicit wait turns the asynchronous, flaky DOM into deterministic
//! pass/fail outcomes: an element is ready within the bound or the step fails
//! with [`CarritoError::ElementTimeout`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::driver::Driver;
use crate::locator::Locator;
use crate::result::{CarritoError, CarritoResult};
use crate::session::Session;

mod cart;
mod checkout;
mod login;
mod products;

pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use login::LoginPage;
pub use products::ProductsPage;

/// Default explicit-wait timeout (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling cadence (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Bounded-wait policy shared by a page object's primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Upper bound for a single wait
    pub timeout: Duration,
    /// Poll cadence within the bound
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitPolicy {
    /// Create the default policy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout bound
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll cadence
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

fn cart_badge() -> Locator {
    Locator::class_name("shopping_cart_badge")
}

fn cart_link() -> Locator {
    Locator::class_name("shopping_cart_link")
}

/// Shared page capability: bounded waits and synchronized interactions.
///
/// Implementors provide the borrowed [`Session`] and their [`WaitPolicy`];
/// the interaction primitives come for free. Transient driver failures while
/// polling (element not yet attached, stale reference) count as "not ready
/// yet"; only the lifecycle guard (`SessionNotInitialized`) short-circuits a
/// wait.
#[async_trait]
pub trait Interact {
    /// The session this page is bound to
    fn session(&self) -> &Session;

    /// The wait policy for this page
    fn waits(&self) -> &WaitPolicy;

    /// Poll until the element exists and is visible, within `timeout`
    async fn wait_visible_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> CarritoResult<()> {
        let driver = self.session().driver()?;
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(Some(el)) = driver.find(locator).await {
                if el.displayed {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(CarritoError::ElementTimeout {
                    locator: locator.to_string(),
                    ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.waits().poll_interval).await;
        }
    }

    /// Poll until the element exists and is visible
    async fn wait_visible(&self, locator: &Locator) -> CarritoResult<()> {
        self.wait_visible_within(locator, self.waits().timeout).await
    }

    /// Poll until the element is visible and enabled, within `timeout`
    async fn wait_clickable_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> CarritoResult<()> {
        let driver = self.session().driver()?;
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(Some(el)) = driver.find(locator).await {
                if el.displayed && el.enabled {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(CarritoError::ElementTimeout {
                    locator: locator.to_string(),
                    ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.waits().poll_interval).await;
        }
    }

    /// Poll until the element is visible and enabled
    async fn wait_clickable(&self, locator: &Locator) -> CarritoResult<()> {
        self.wait_clickable_within(locator, self.waits().timeout)
            .await
    }

    /// Whether the element is currently displayed.
    ///
    /// Non-throwing by contract: any lookup or staleness failure counts as
    /// "not displayed". The only error is the lifecycle guard when the
    /// session is not Active. This is the primitive for negative/optional
    /// assertions; it does not distinguish "not yet rendered" from "never
    /// existed".
    async fn is_displayed(&self, locator: &Locator) -> CarritoResult<bool> {
        let driver = self.session().driver()?;
        Ok(driver.is_displayed(locator).await.unwrap_or(false))
    }

    /// Wait for visibility, then read the element's text
    async fn read_text(&self, locator: &Locator) -> CarritoResult<String> {
        self.wait_visible(locator).await?;
        self.session().driver()?.text(locator).await
    }

    /// Wait for clickability, then click
    async fn click(&self, locator: &Locator) -> CarritoResult<()> {
        self.wait_clickable(locator).await?;
        self.session().driver()?.click(locator).await
    }

    /// Wait for visibility, clear prior content, then type.
    ///
    /// Always clearing first makes re-entry idempotent.
    async fn type_text(&self, locator: &Locator, text: &str) -> CarritoResult<()> {
        self.wait_visible(locator).await?;
        let driver = self.session().driver()?;
        driver.clear(locator).await?;
        driver.send_keys(locator, text).await
    }

    /// Text of every match, in on-page order, without waiting
    async fn read_all_text(&self, locator: &Locator) -> CarritoResult<Vec<String>> {
        let driver = self.session().driver()?;
        let all = driver.find_all(locator).await?;
        Ok(all.into_iter().map(|e| e.text).collect())
    }

    /// Number of current matches, without waiting
    async fn count(&self, locator: &Locator) -> CarritoResult<usize> {
        Ok(self.session().driver()?.find_all(locator).await?.len())
    }

    /// Current URL of the session
    async fn current_url(&self) -> CarritoResult<String> {
        self.session().driver()?.current_url().await
    }

    /// Cart badge text, `"0"` when the badge is absent
    async fn cart_badge_count(&self) -> CarritoResult<String> {
        if self.is_displayed(&cart_badge()).await? {
            self.read_text(&cart_badge()).await
        } else {
            Ok("0".to_string())
        }
    }

    /// Whether the cart badge is visible
    async fn is_cart_badge_visible(&self) -> CarritoResult<bool> {
        self.is_displayed(&cart_badge()).await
    }

    /// Open the cart via the header icon
    async fn open_cart(&self) -> CarritoResult<()> {
        self.click(&cart_link()).await
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    //! Shared helpers for page-object tests.

    use std::sync::Arc;

    use super::*;
    use crate::config::{BrowserKind, Environment, RunConfig};
    use crate::driver::MockDriver;
    use crate::session::{MockProvider, SessionManager};

    /// Fast policy so timeout tests stay quick
    pub fn fast_waits() -> WaitPolicy {
        WaitPolicy::new()
            .with_timeout(Duration::from_millis(80))
            .with_poll_interval(Duration::from_millis(10))
    }

    /// Launch a session over the given scripted driver
    pub async fn session_over(driver: Arc<MockDriver>) -> (Session, SessionManager) {
        let provider = Arc::new(MockProvider::new().with_driver(driver));
        let mut manager = SessionManager::new(
            provider,
            RunConfig::default(),
            Environment::from_vars::<_, String, String>([]),
        );
        let session = manager
            .initialize(BrowserKind::HeadlessChrome)
            .await
            .unwrap();
        (session, manager)
    }
}
