//! Per-scenario state container.
//!
//! A [`ScenarioContext`] carries the page objects bound to the scenario's
//! session plus a string-keyed scratch bag for values produced by one step
//! and consumed by a later one. Page accessors fail fast with
//! [`CarritoError::SessionNotInitialized`] when the context has not been
//! bound; they never create a session on demand.

use std::collections::HashMap;

use serde_json::Value;

use crate::page::{CartPage, CheckoutPage, LoginPage, ProductsPage};
use crate::result::{CarritoError, CarritoResult};
use crate::session::Session;

/// Well-known scratch-bag keys
pub mod keys {
    /// Username the scenario logged in as
    pub const CURRENT_USER: &str = "current_user";
    /// Product the scenario is operating on
    pub const CURRENT_PRODUCT: &str = "current_product";
    /// Items the scenario has added to the cart
    pub const CART_ITEMS: &str = "cart_items";
    /// Total read from the checkout overview
    pub const ORDER_TOTAL: &str = "order_total";
    /// Checkout information the scenario filled in
    pub const CHECKOUT_INFO: &str = "checkout_info";
}

struct Pages {
    login: LoginPage,
    products: ProductsPage,
    cart: CartPage,
    checkout: CheckoutPage,
}

/// Scenario-scoped state: bound page objects and the scratch bag
#[derive(Default)]
pub struct ScenarioContext {
    pages: Option<Pages>,
    data: HashMap<String, Value>,
}

impl std::fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("bound", &self.pages.is_some())
            .field("data_keys", &self.data.len())
            .finish()
    }
}

impl ScenarioContext {
    /// Create an unbound context with an empty scratch bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every page object to the given session.
    ///
    /// All four pages are created eagerly so a missing session surfaces here,
    /// at scenario start, rather than mid-step.
    pub fn initialize_pages(&mut self, session: &Session) {
        self.pages = Some(Pages {
            login: LoginPage::new(session.clone()),
            products: ProductsPage::new(session.clone()),
            cart: CartPage::new(session.clone()),
            checkout: CheckoutPage::new(session.clone()),
        });
    }

    /// Bind pages with a custom login page (e.g. non-default base URL)
    pub fn initialize_pages_with_login(&mut self, session: &Session, login: LoginPage) {
        self.pages = Some(Pages {
            login,
            products: ProductsPage::new(session.clone()),
            cart: CartPage::new(session.clone()),
            checkout: CheckoutPage::new(session.clone()),
        });
    }

    /// Drop the page bindings (scenario end)
    pub fn release_pages(&mut self) {
        self.pages = None;
    }

    /// Whether pages are currently bound
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.pages.is_some()
    }

    fn pages(&self) -> CarritoResult<&Pages> {
        self.pages.as_ref().ok_or(CarritoError::SessionNotInitialized)
    }

    /// The login page.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::SessionNotInitialized`] when unbound.
    pub fn login_page(&self) -> CarritoResult<&LoginPage> {
        Ok(&self.pages()?.login)
    }

    /// The products page.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::SessionNotInitialized`] when unbound.
    pub fn products_page(&self) -> CarritoResult<&ProductsPage> {
        Ok(&self.pages()?.products)
    }

    /// The cart page.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::SessionNotInitialized`] when unbound.
    pub fn cart_page(&self) -> CarritoResult<&CartPage> {
        Ok(&self.pages()?.cart)
    }

    /// The checkout page.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::SessionNotInitialized`] when unbound.
    pub fn checkout_page(&self) -> CarritoResult<&CheckoutPage> {
        Ok(&self.pages()?.checkout)
    }

    /// Store a value under a key, replacing any previous value
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// The stored value for a key, if any
    #[must_use]
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// The stored value as a string, if present and a string
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// The stored value as an integer, if present and numeric
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// The stored value as a boolean, if present and boolean
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// The stored value as a float, if present and numeric
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }

    /// Whether a key is present in the scratch bag
    #[must_use]
    pub fn has_data(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Empty the scratch bag
    pub fn clear_data(&mut self) {
        self.data.clear();
    }

    /// Number of keys in the scratch bag
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data.len()
    }
}
