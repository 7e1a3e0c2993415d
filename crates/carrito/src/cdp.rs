//! Chrome DevTools Protocol backend.
//!
//! A [`SessionProvider`]/[`Driver`] pair over chromiumoxide, enabled by the
//! `browser` feature. Element operations evaluate JS built from the
//! locator's query expression; screenshots go through the CDP page-capture
//! command. Only the Chromium family is supported here; the core never
//! depends on this module.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::BrowserKind;
use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::result::{CarritoError, CarritoResult};
use crate::session::{SessionProfile, SessionProvider};

/// JS expression returning an element probe object or null
fn probe_js(locator: &Locator) -> String {
    format!(
        "(() => {{ const el = {query}; if (!el) return null; \
         const style = window.getComputedStyle(el); \
         const rect = el.getBoundingClientRect(); \
         return {{ tag_name: el.tagName.toLowerCase(), \
         text: (el.textContent || '').trim(), \
         displayed: style.display !== 'none' && style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0, \
         enabled: !el.disabled }}; }})()",
        query = locator.to_query()
    )
}

/// JS expression returning an array of element probe objects
fn probe_all_js(locator: &Locator) -> String {
    format!(
        "{query}.map(el => {{ \
         const style = window.getComputedStyle(el); \
         const rect = el.getBoundingClientRect(); \
         return {{ tag_name: el.tagName.toLowerCase(), \
         text: (el.textContent || '').trim(), \
         displayed: style.display !== 'none' && style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0, \
         enabled: !el.disabled }}; }})",
        query = locator.to_query_all()
    )
}

/// JS statement applied to the first matching element, erroring when absent
fn with_element_js(locator: &Locator, body: &str) -> String {
    format!(
        "(() => {{ const el = {query}; \
         if (!el) throw new Error('no such element'); {body} }})()",
        query = locator.to_query()
    )
}

fn js_string(value: &str) -> String {
    // serde_json string encoding is valid JS string literal syntax
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// CDP-backed session provider
#[derive(Debug, Default)]
pub struct CdpProvider;

impl CdpProvider {
    /// Create a provider
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionProvider for CdpProvider {
    async fn launch(&self, profile: &SessionProfile) -> CarritoResult<Box<dyn Driver>> {
        match profile.kind {
            BrowserKind::Chrome | BrowserKind::HeadlessChrome | BrowserKind::Edge => {}
            BrowserKind::Firefox | BrowserKind::HeadlessFirefox => {
                return Err(CarritoError::SessionLaunch {
                    message: format!("{} is not supported by the CDP backend", profile.kind),
                });
            }
        }

        let mut builder = BrowserConfig::builder()
            .window_size(profile.window_size.0, profile.window_size.1)
            .args(profile.args.iter().map(String::as_str));
        if !profile.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| CarritoError::SessionLaunch { message: e.to_string() })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| CarritoError::SessionLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CarritoError::SessionLaunch {
                message: e.to_string(),
            })?;

        Ok(Box::new(CdpDriver {
            browser: Arc::new(Mutex::new(browser)),
            page: Arc::new(Mutex::new(page)),
            _handle: handle,
        }))
    }
}

/// Driver over a live CDP page
pub struct CdpDriver {
    browser: Arc<Mutex<Browser>>,
    page: Arc<Mutex<Page>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for CdpDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpDriver").finish_non_exhaustive()
    }
}

impl CdpDriver {
    async fn eval<T: serde::de::DeserializeOwned>(
        &self,
        locator: &Locator,
        expr: &str,
    ) -> CarritoResult<T> {
        let page = self.page.lock().await;
        let result = page.evaluate(expr).await.map_err(|e| CarritoError::Driver {
            locator: locator.to_string(),
            message: e.to_string(),
        })?;
        result.into_value().map_err(|e| CarritoError::Driver {
            locator: locator.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Driver for CdpDriver {
    async fn find(&self, locator: &Locator) -> CarritoResult<Option<ElementHandle>> {
        self.eval(locator, &probe_js(locator)).await
    }

    async fn find_all(&self, locator: &Locator) -> CarritoResult<Vec<ElementHandle>> {
        self.eval(locator, &probe_all_js(locator)).await
    }

    async fn click(&self, locator: &Locator) -> CarritoResult<()> {
        let expr = with_element_js(locator, "el.click(); return null;");
        self.eval::<Option<()>>(locator, &expr).await?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> CarritoResult<()> {
        let expr = with_element_js(
            locator,
            "el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true })); return null;",
        );
        self.eval::<Option<()>>(locator, &expr).await?;
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> CarritoResult<()> {
        let body = format!(
            "el.focus(); el.value += {value}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); return null;",
            value = js_string(text)
        );
        let expr = with_element_js(locator, &body);
        self.eval::<Option<()>>(locator, &expr).await?;
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> CarritoResult<String> {
        let expr = with_element_js(locator, "return (el.textContent || '').trim();");
        self.eval(locator, &expr).await
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> CarritoResult<Option<String>> {
        let body = format!(
            "if ({name} === 'value' && 'value' in el) return el.value; \
             return el.getAttribute({name});",
            name = js_string(name)
        );
        let expr = with_element_js(locator, &body);
        self.eval(locator, &expr).await
    }

    async fn is_displayed(&self, locator: &Locator) -> CarritoResult<bool> {
        Ok(self
            .find(locator)
            .await?
            .is_some_and(|el| el.displayed))
    }

    async fn is_enabled(&self, locator: &Locator) -> CarritoResult<bool> {
        Ok(self.find(locator).await?.is_some_and(|el| el.enabled))
    }

    async fn goto(&self, url: &str) -> CarritoResult<()> {
        let page = self.page.lock().await;
        page.goto(url)
            .await
            .map_err(|e| CarritoError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        page.wait_for_navigation()
            .await
            .map_err(|e| CarritoError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> CarritoResult<String> {
        let page = self.page.lock().await;
        let url = page.url().await.map_err(|e| CarritoError::Navigation {
            url: String::new(),
            message: e.to_string(),
        })?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> CarritoResult<String> {
        let page = self.page.lock().await;
        let title = page.get_title().await.map_err(|e| CarritoError::Driver {
            locator: "title".to_string(),
            message: e.to_string(),
        })?;
        Ok(title.unwrap_or_default())
    }

    async fn screenshot_png(&self) -> CarritoResult<Vec<u8>> {
        let page = self.page.lock().await;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let captured = page
            .execute(params)
            .await
            .map_err(|e| CarritoError::Screenshot {
                message: e.to_string(),
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(&captured.data)
            .map_err(|e| CarritoError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> CarritoResult<()> {
        // CDP has no implicit-wait notion; bounds are enforced by the wait
        // layer. Recorded for diagnostics only.
        debug!(
            implicit_ms = implicit.as_millis() as u64,
            page_load_ms = page_load.as_millis() as u64,
            "timeout bounds noted for CDP session"
        );
        Ok(())
    }

    async fn fullscreen(&self) -> CarritoResult<()> {
        let page = self.page.lock().await;
        page.evaluate("window.moveTo(0, 0); window.resizeTo(screen.width, screen.height); null")
            .await
            .map_err(|e| CarritoError::Driver {
                locator: "window".to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn quit(&self) -> CarritoResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| CarritoError::SessionLaunch {
                message: e.to_string(),
            })?;
        Ok(())
    }
}
