//! Driver - the browser capability boundary.
//!
//! The core never talks to a browser protocol directly; everything goes
//! through the abstract [`Driver`] trait: element lookup by locator, click,
//! send-keys, read-text, navigation, screenshot, quit. Swapping the backend
//! (CDP, a remote WebDriver bridge, the scripted mock) never touches the
//! synchronization layer or the page objects.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::result::{CarritoError, CarritoResult};

/// Snapshot of a located DOM element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Element tag name
    pub tag_name: String,
    /// Trimmed text content
    pub text: String,
    /// Whether the element is rendered and visible
    pub displayed: bool,
    /// Whether the element is enabled/interactable
    pub enabled: bool,
}

impl ElementHandle {
    /// Create a handle with the given text, displayed and enabled
    #[must_use]
    pub fn new(tag_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            text: text.into(),
            displayed: true,
            enabled: true,
        }
    }
}

/// Abstract browser automation capability.
///
/// Lookup failures are errors at this level; the interaction layer decides
/// which of them are swallowed (see `Interact::is_displayed`).
#[async_trait]
pub trait Driver: Send + Sync {
    /// Locate the first element matching the locator, if any
    async fn find(&self, locator: &Locator) -> CarritoResult<Option<ElementHandle>>;

    /// Locate all matching elements, in on-page order
    async fn find_all(&self, locator: &Locator) -> CarritoResult<Vec<ElementHandle>>;

    /// Click the first matching element
    async fn click(&self, locator: &Locator) -> CarritoResult<()>;

    /// Clear the value of the first matching input element
    async fn clear(&self, locator: &Locator) -> CarritoResult<()>;

    /// Send keystrokes to the first matching element
    async fn send_keys(&self, locator: &Locator, text: &str) -> CarritoResult<()>;

    /// Read the text content of the first matching element
    async fn text(&self, locator: &Locator) -> CarritoResult<String>;

    /// Read an attribute of the first matching element
    async fn attribute(&self, locator: &Locator, name: &str) -> CarritoResult<Option<String>>;

    /// Whether the first matching element exists and is visible
    async fn is_displayed(&self, locator: &Locator) -> CarritoResult<bool>;

    /// Whether the first matching element is enabled
    async fn is_enabled(&self, locator: &Locator) -> CarritoResult<bool>;

    /// Navigate to a URL
    async fn goto(&self, url: &str) -> CarritoResult<()>;

    /// Get the current URL
    async fn current_url(&self) -> CarritoResult<String>;

    /// Get the page title
    async fn title(&self) -> CarritoResult<String>;

    /// Capture a PNG screenshot of the current page
    async fn screenshot_png(&self) -> CarritoResult<Vec<u8>>;

    /// Apply implicit element-lookup and page-load timeout bounds
    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> CarritoResult<()>;

    /// Fullscreen the viewport
    async fn fullscreen(&self) -> CarritoResult<()>;

    /// Release the underlying browser process/connection
    async fn quit(&self) -> CarritoResult<()>;
}

#[async_trait]
impl<T: Driver + ?Sized> Driver for std::sync::Arc<T> {
    async fn find(&self, locator: &Locator) -> CarritoResult<Option<ElementHandle>> {
        (**self).find(locator).await
    }

    async fn find_all(&self, locator: &Locator) -> CarritoResult<Vec<ElementHandle>> {
        (**self).find_all(locator).await
    }

    async fn click(&self, locator: &Locator) -> CarritoResult<()> {
        (**self).click(locator).await
    }

    async fn clear(&self, locator: &Locator) -> CarritoResult<()> {
        (**self).clear(locator).await
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> CarritoResult<()> {
        (**self).send_keys(locator, text).await
    }

    async fn text(&self, locator: &Locator) -> CarritoResult<String> {
        (**self).text(locator).await
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> CarritoResult<Option<String>> {
        (**self).attribute(locator, name).await
    }

    async fn is_displayed(&self, locator: &Locator) -> CarritoResult<bool> {
        (**self).is_displayed(locator).await
    }

    async fn is_enabled(&self, locator: &Locator) -> CarritoResult<bool> {
        (**self).is_enabled(locator).await
    }

    async fn goto(&self, url: &str) -> CarritoResult<()> {
        (**self).goto(url).await
    }

    async fn current_url(&self) -> CarritoResult<String> {
        (**self).current_url().await
    }

    async fn title(&self) -> CarritoResult<String> {
        (**self).title().await
    }

    async fn screenshot_png(&self) -> CarritoResult<Vec<u8>> {
        (**self).screenshot_png().await
    }

    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> CarritoResult<()> {
        (**self).set_timeouts(implicit, page_load).await
    }

    async fn fullscreen(&self) -> CarritoResult<()> {
        (**self).fullscreen().await
    }

    async fn quit(&self) -> CarritoResult<()> {
        (**self).quit().await
    }
}

// ============================================================================
// Scripted mock driver
// ============================================================================

/// A scripted element in the mock DOM
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Tag name
    pub tag_name: String,
    /// Text content
    pub text: String,
    /// Current input value
    pub value: String,
    /// Visible flag
    pub displayed: bool,
    /// Enabled flag
    pub enabled: bool,
}

impl MockElement {
    /// A visible, enabled element with the given text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag_name: "div".to_string(),
            text: text.into(),
            value: String::new(),
            displayed: true,
            enabled: true,
        }
    }

    /// A visible, enabled element with no text (buttons, inputs)
    #[must_use]
    pub fn blank() -> Self {
        Self::text("")
    }

    /// Set the tag name
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = tag.into();
        self
    }

    /// Mark the element hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark the element disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn handle(&self) -> ElementHandle {
        ElementHandle {
            tag_name: self.tag_name.clone(),
            text: self.text.clone(),
            displayed: self.displayed,
            enabled: self.enabled,
        }
    }
}

/// Scripted side effect applied after a successful mock click
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Navigate to a new page: swap the URL and replace the element set
    Navigate {
        /// Destination URL
        url: String,
        /// Elements present on the destination page
        install: Vec<(Locator, MockElement)>,
    },
    /// Remove elements (e.g. a badge disappearing)
    Remove(Vec<Locator>),
    /// Insert elements (e.g. a Remove button replacing Add to cart)
    Insert(Vec<(Locator, MockElement)>),
}

#[derive(Debug, Default)]
struct MockState {
    // Insertion order preserved so find_all mirrors on-page order
    elements: Vec<(String, MockElement)>,
    effects: HashMap<String, ClickEffect>,
    exploding: HashSet<String>,
    current_url: String,
    title: String,
    screenshot: Option<Vec<u8>>,
    fail_screenshot: bool,
    fail_quit: bool,
    calls: Vec<String>,
}

/// Scripted driver for hermetic tests.
///
/// Elements are keyed by the locator's canonical `strategy=value` string, so
/// a rendered template only matches when it rendered to the exact selector
/// the mock page was scripted with.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty mock page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element to the mock page
    #[must_use]
    pub fn with_element(self, locator: &Locator, element: MockElement) -> Self {
        self.state
            .lock()
            .unwrap()
            .elements
            .push((locator.to_string(), element));
        self
    }

    /// Script a side effect for clicking a locator
    #[must_use]
    pub fn with_click_effect(self, locator: &Locator, effect: ClickEffect) -> Self {
        self.state
            .lock()
            .unwrap()
            .effects
            .insert(locator.to_string(), effect);
        self
    }

    /// Make every operation on a locator fail (stale-element simulation)
    #[must_use]
    pub fn with_exploding(self, locator: &Locator) -> Self {
        self.state
            .lock()
            .unwrap()
            .exploding
            .insert(locator.to_string());
        self
    }

    /// Set the current URL
    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.state.lock().unwrap().current_url = url.into();
        self
    }

    /// Set the scripted screenshot bytes
    #[must_use]
    pub fn with_screenshot(self, png: Vec<u8>) -> Self {
        self.state.lock().unwrap().screenshot = Some(png);
        self
    }

    /// Make screenshot capture fail
    #[must_use]
    pub fn with_failing_screenshot(self) -> Self {
        self.state.lock().unwrap().fail_screenshot = true;
        self
    }

    /// Make quit fail
    #[must_use]
    pub fn with_failing_quit(self) -> Self {
        self.state.lock().unwrap().fail_quit = true;
        self
    }

    /// Recorded call history
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Whether a call with the given prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Current input value of a scripted element
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        state
            .elements
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, e)| e.value.clone())
    }

    fn check_exploding(state: &MockState, key: &str) -> CarritoResult<()> {
        if state.exploding.contains(key) {
            return Err(CarritoError::Driver {
                locator: key.to_string(),
                message: "stale element reference".to_string(),
            });
        }
        Ok(())
    }

    fn missing(key: &str) -> CarritoError {
        CarritoError::Driver {
            locator: key.to_string(),
            message: "no such element".to_string(),
        }
    }

    fn apply_effect(state: &mut MockState, key: &str) {
        let Some(effect) = state.effects.get(key).cloned() else {
            return;
        };
        match effect {
            ClickEffect::Navigate { url, install } => {
                state.current_url = url;
                state.elements.clear();
                for (loc, el) in install {
                    state.elements.push((loc.to_string(), el));
                }
            }
            ClickEffect::Remove(locators) => {
                let keys: HashSet<String> = locators.iter().map(|l| l.to_string()).collect();
                state.elements.retain(|(k, _)| !keys.contains(k));
            }
            ClickEffect::Insert(entries) => {
                for (loc, el) in entries {
                    state.elements.push((loc.to_string(), el));
                }
            }
        }
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn find(&self, locator: &Locator) -> CarritoResult<Option<ElementHandle>> {
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        Ok(state
            .elements
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, e)| e.handle()))
    }

    async fn find_all(&self, locator: &Locator) -> CarritoResult<Vec<ElementHandle>> {
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        Ok(state
            .elements
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, e)| e.handle())
            .collect())
    }

    async fn click(&self, locator: &Locator) -> CarritoResult<()> {
        let key = locator.to_string();
        let mut state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        state.calls.push(format!("click:{key}"));
        if !state.elements.iter().any(|(k, _)| *k == key) {
            return Err(Self::missing(&key));
        }
        Self::apply_effect(&mut state, &key);
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> CarritoResult<()> {
        let key = locator.to_string();
        let mut state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        state.calls.push(format!("clear:{key}"));
        let entry = state
            .elements
            .iter_mut()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| Self::missing(&key))?;
        entry.1.value.clear();
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> CarritoResult<()> {
        let key = locator.to_string();
        let mut state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        state.calls.push(format!("send_keys:{key}:{text}"));
        let entry = state
            .elements
            .iter_mut()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| Self::missing(&key))?;
        entry.1.value.push_str(text);
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> CarritoResult<String> {
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        state
            .elements
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, e)| e.text.clone())
            .ok_or_else(|| Self::missing(&key))
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> CarritoResult<Option<String>> {
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        let entry = state
            .elements
            .iter()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| Self::missing(&key))?;
        Ok(match name {
            "value" => Some(entry.1.value.clone()),
            _ => None,
        })
    }

    async fn is_displayed(&self, locator: &Locator) -> CarritoResult<bool> {
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        Ok(state
            .elements
            .iter()
            .find(|(k, _)| *k == key)
            .is_some_and(|(_, e)| e.displayed))
    }

    async fn is_enabled(&self, locator: &Locator) -> CarritoResult<bool> {
        let key = locator.to_string();
        let state = self.state.lock().unwrap();
        Self::check_exploding(&state, &key)?;
        Ok(state
            .elements
            .iter()
            .find(|(k, _)| *k == key)
            .is_some_and(|(_, e)| e.enabled))
    }

    async fn goto(&self, url: &str) -> CarritoResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("goto:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> CarritoResult<String> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn title(&self) -> CarritoResult<String> {
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn screenshot_png(&self) -> CarritoResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("screenshot".to_string());
        if state.fail_screenshot {
            return Err(CarritoError::Screenshot {
                message: "scripted capture failure".to_string(),
            });
        }
        Ok(state
            .screenshot
            .clone()
            .unwrap_or_else(|| vec![0x89, b'P', b'N', b'G']))
    }

    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> CarritoResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!(
            "set_timeouts:{}:{}",
            implicit.as_millis(),
            page_load.as_millis()
        ));
        Ok(())
    }

    async fn fullscreen(&self) -> CarritoResult<()> {
        self.state.lock().unwrap().calls.push("fullscreen".to_string());
        Ok(())
    }

    async fn quit(&self) -> CarritoResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("quit".to_string());
        if state.fail_quit {
            return Err(CarritoError::SessionLaunch {
                message: "scripted quit failure".to_string(),
            });
        }
        Ok(())
    }
}
