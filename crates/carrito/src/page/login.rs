//! Login page facade.

use crate::config::DEFAULT_BASE_URL;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::result::CarritoResult;
use crate::session::Session;

use super::{Interact, WaitPolicy};

fn username_field() -> Locator {
    Locator::id("user-name")
}

fn password_field() -> Locator {
    Locator::id("password")
}

fn login_button() -> Locator {
    Locator::id("login-button")
}

fn error_message() -> Locator {
    Locator::test_id("error")
}

fn error_dismiss_button() -> Locator {
    Locator::class_name("error-button")
}

/// Page object for the storefront login screen
#[derive(Debug, Clone)]
pub struct LoginPage {
    session: Session,
    waits: WaitPolicy,
    base_url: String,
}

impl Interact for LoginPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn waits(&self) -> &WaitPolicy {
        &self.waits
    }
}

impl LoginPage {
    /// Bind a login page to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            waits: WaitPolicy::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the wait policy
    #[must_use]
    pub const fn with_waits(mut self, waits: WaitPolicy) -> Self {
        self.waits = waits;
        self
    }

    /// Override the storefront base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Navigate to the login page
    pub async fn open(&self) -> CarritoResult<()> {
        self.session.driver()?.goto(&self.base_url).await
    }

    /// Type the username, clearing any prior input
    pub async fn enter_username(&self, username: &str) -> CarritoResult<()> {
        self.type_text(&username_field(), username).await
    }

    /// Type the password, clearing any prior input
    pub async fn enter_password(&self, password: &str) -> CarritoResult<()> {
        self.type_text(&password_field(), password).await
    }

    /// Submit the login form
    pub async fn click_login(&self) -> CarritoResult<()> {
        self.click(&login_button()).await
    }

    /// Full login flow: username, password, submit
    pub async fn login(&self, username: &str, password: &str) -> CarritoResult<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login().await
    }

    /// Whether the login screen is currently shown
    pub async fn is_login_page_displayed(&self) -> CarritoResult<bool> {
        Ok(self.is_displayed(&login_button()).await?
            && self.current_url().await?.starts_with(&self.base_url))
    }

    /// Text of the credentials error banner
    pub async fn error_message(&self) -> CarritoResult<String> {
        self.read_text(&error_message()).await
    }

    /// Whether the credentials error banner is shown
    pub async fn is_error_displayed(&self) -> CarritoResult<bool> {
        self.is_displayed(&error_message()).await
    }

    /// Dismiss the error banner if it is shown
    pub async fn clear_error(&self) -> CarritoResult<()> {
        if self.is_displayed(&error_dismiss_button()).await? {
            self.click(&error_dismiss_button()).await?;
        }
        Ok(())
    }

    /// Whether the username input holds no text
    pub async fn is_username_empty(&self) -> CarritoResult<bool> {
        let value = self
            .session
            .driver()?
            .attribute(&username_field(), "value")
            .await?;
        Ok(value.is_none_or(|v| v.is_empty()))
    }

    /// Whether the password input holds no text
    pub async fn is_password_empty(&self) -> CarritoResult<bool> {
        let value = self
            .session
            .driver()?
            .attribute(&password_field(), "value")
            .await?;
        Ok(value.is_none_or(|v| v.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testkit::{fast_waits, session_over};
    use super::*;
    use crate::driver::{ClickEffect, MockDriver, MockElement};

    fn login_form() -> MockDriver {
        MockDriver::new()
            .with_url(DEFAULT_BASE_URL)
            .with_element(&username_field(), MockElement::blank().with_tag("input"))
            .with_element(&password_field(), MockElement::blank().with_tag("input"))
            .with_element(&login_button(), MockElement::blank().with_tag("input"))
    }

    async fn page(driver: Arc<MockDriver>) -> (LoginPage, crate::session::SessionManager) {
        let (session, manager) = session_over(driver).await;
        (LoginPage::new(session).with_waits(fast_waits()), manager)
    }

    #[tokio::test]
    async fn test_open_navigates_to_base_url() {
        let driver = Arc::new(login_form());
        let (page, _mgr) = page(driver.clone()).await;
        page.open().await.unwrap();
        assert!(driver.was_called(&format!("goto:{DEFAULT_BASE_URL}")));
    }

    #[tokio::test]
    async fn test_login_fills_both_fields_and_submits() {
        let driver = Arc::new(login_form());
        let (page, _mgr) = page(driver.clone()).await;
        page.login("standard_user", "secret_sauce").await.unwrap();
        assert_eq!(driver.value_of(&username_field()).unwrap(), "standard_user");
        assert_eq!(driver.value_of(&password_field()).unwrap(), "secret_sauce");
        assert!(driver.was_called("click:id=login-button"));
    }

    #[tokio::test]
    async fn test_login_page_displayed_matches_url_and_button() {
        let driver = Arc::new(login_form());
        let (page, _mgr) = page(driver).await;
        assert!(page.is_login_page_displayed().await.unwrap());
    }

    #[tokio::test]
    async fn test_error_banner_read_and_dismiss() {
        let driver = Arc::new(
            login_form()
                .with_element(
                    &error_message(),
                    MockElement::text("Epic sadface: Sorry, this user has been locked out."),
                )
                .with_element(&error_dismiss_button(), MockElement::blank())
                .with_click_effect(
                    &error_dismiss_button(),
                    ClickEffect::Remove(vec![error_message(), error_dismiss_button()]),
                ),
        );
        let (page, _mgr) = page(driver).await;
        assert!(page.is_error_displayed().await.unwrap());
        assert_eq!(
            page.error_message().await.unwrap(),
            "Epic sadface: Sorry, this user has been locked out."
        );
        page.clear_error().await.unwrap();
        assert!(!page.is_error_displayed().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_error_is_noop_without_banner() {
        let driver = Arc::new(login_form());
        let (page, _mgr) = page(driver).await;
        page.clear_error().await.unwrap();
    }

    #[tokio::test]
    async fn test_field_emptiness_tracks_typed_input() {
        let driver = Arc::new(login_form());
        let (page, _mgr) = page(driver).await;
        assert!(page.is_username_empty().await.unwrap());
        page.enter_username("standard_user").await.unwrap();
        assert!(!page.is_username_empty().await.unwrap());
        assert!(page.is_password_empty().await.unwrap());
    }
}
