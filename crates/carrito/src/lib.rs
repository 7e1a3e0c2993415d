//! Carrito: browser-session UI regression framework
//!
//! Carrito (Spanish: "shopping cart") drives end-to-end regression suites
//! against an e-commerce storefront: session lifecycle management, a
//! bounded-explicit-wait synchronization layer, Page Object facades over the
//! storefront screens, per-scenario state, and lifecycle hooks that
//! guarantee cleanup.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     CARRITO Architecture                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌──────────┐   ┌─────────┐  │
//! │  │ Scenario  │   │ Scenario  │   │ Page     │   │ Session │  │
//! │  │ Hooks     │──►│ Context   │──►│ Objects  │──►│ Manager │  │
//! │  │           │   │           │   │ (waits)  │   │ (driver)│  │
//! │  └───────────┘   └───────────┘   └──────────┘   └─────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scenario-definition runner and report renderer are external
//! collaborators: hooks consume scenario names and failure flags, and emit
//! [`ScenarioOutcome`] records.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use carrito::{Environment, MockProvider, RunConfig, ScenarioHooks};
//!
//! # async fn run() -> carrito::CarritoResult<()> {
//! let provider = Arc::new(MockProvider::new());
//! let mut hooks = ScenarioHooks::new(provider, RunConfig::default(), Environment::detect());
//!
//! hooks.before("valid login").await?;
//! let login = hooks.context().login_page()?;
//! login.open().await?;
//! login.login("standard_user", "secret_sauce").await?;
//! let outcome = hooks.after("valid login", false).await;
//! assert!(outcome.passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[cfg(feature = "browser")]
pub mod cdp;
pub mod config;
pub mod context;
pub mod driver;
pub mod hooks;
pub mod locator;
pub mod page;
pub mod result;
pub mod session;
pub mod testdata;

pub use config::{BrowserKind, Environment, RunConfig};
pub use context::ScenarioContext;
pub use driver::{ClickEffect, Driver, ElementHandle, MockDriver, MockElement};
pub use hooks::{ScenarioHooks, ScenarioOutcome, ScenarioStatus};
pub use locator::{Locator, Strategy, Template};
pub use page::{CartPage, CheckoutPage, Interact, LoginPage, ProductsPage, WaitPolicy};
pub use result::{CarritoError, CarritoResult};
pub use session::{
    MockProvider, Session, SessionManager, SessionProfile, SessionProvider, SessionState,
};
pub use testdata::TestData;

#[cfg(feature = "browser")]
pub use cdp::{CdpDriver, CdpProvider};
