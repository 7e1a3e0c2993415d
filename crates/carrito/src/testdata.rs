//! Flat test-data lookup.
//!
//! Suites keep credentials, product names, expected messages, and page
//! headers in a properties file (`key=value`, `#`/`!` comments) outside the
//! scenario definitions. The rest of the crate only ever consumes resolved
//! strings; this module is the one place that knows the file format.

use std::collections::HashMap;
use std::path::Path;

use crate::result::{CarritoError, CarritoResult};

/// Key/value test data loaded from a properties file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestData {
    entries: HashMap<String, String>,
}

impl TestData {
    /// Create an empty data set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties-format text.
    ///
    /// Lines are `key=value` with whitespace trimmed on both sides; blank
    /// lines and lines starting with `#` or `!` are skipped. A non-blank
    /// line without `=` is malformed.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::TestData`] for a malformed line.
    pub fn parse(text: &str) -> CarritoResult<Self> {
        let mut entries = HashMap::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(CarritoError::TestData {
                    message: format!("line {}: expected key=value, got {line:?}", number + 1),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CarritoError::TestData {
                    message: format!("line {}: empty key", number + 1),
                });
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { entries })
    }

    /// Load and parse a properties file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`CarritoError::TestData`] if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> CarritoResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// The value for a key, if present
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The value for a key, or a default
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether a key is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the data set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Credentials

    /// Standard user's username
    #[must_use]
    pub fn standard_username(&self) -> Option<&str> {
        self.get("user.standard.username")
    }

    /// Standard user's password
    #[must_use]
    pub fn standard_password(&self) -> Option<&str> {
        self.get("user.standard.password")
    }

    /// Locked-out user's username
    #[must_use]
    pub fn locked_username(&self) -> Option<&str> {
        self.get("user.locked.username")
    }

    /// Locked-out user's password
    #[must_use]
    pub fn locked_password(&self) -> Option<&str> {
        self.get("user.locked.password")
    }

    /// A username known to be invalid
    #[must_use]
    pub fn invalid_username(&self) -> Option<&str> {
        self.get("user.invalid.username")
    }

    /// A password known to be invalid
    #[must_use]
    pub fn invalid_password(&self) -> Option<&str> {
        self.get("user.invalid.password")
    }

    // Products

    /// Display name of a product by short key (e.g. `backpack`)
    #[must_use]
    pub fn product_name(&self, short: &str) -> Option<&str> {
        self.get(&format!("product.{short}"))
    }

    /// Listed price of a product by short key
    #[must_use]
    pub fn product_price(&self, short: &str) -> Option<&str> {
        self.get(&format!("price.{short}"))
    }

    // Checkout fields

    /// Checkout first name
    #[must_use]
    pub fn checkout_first_name(&self) -> Option<&str> {
        self.get("checkout.firstname")
    }

    /// Checkout last name
    #[must_use]
    pub fn checkout_last_name(&self) -> Option<&str> {
        self.get("checkout.lastname")
    }

    /// Checkout postal code
    #[must_use]
    pub fn checkout_postal_code(&self) -> Option<&str> {
        self.get("checkout.postalcode")
    }

    // Expected messages

    /// Expected invalid-login error message
    #[must_use]
    pub fn login_error_message(&self) -> Option<&str> {
        self.get("message.login.error")
    }

    /// Expected order-success message
    #[must_use]
    pub fn order_success_message(&self) -> Option<&str> {
        self.get("message.order.success")
    }

    /// Expected first-name-required validation message
    #[must_use]
    pub fn first_name_required_message(&self) -> Option<&str> {
        self.get("message.checkout.firstname.required")
    }

    // Page headers

    /// Expected products page header
    #[must_use]
    pub fn products_header(&self) -> Option<&str> {
        self.get("header.products")
    }

    /// Expected cart page header
    #[must_use]
    pub fn cart_header(&self) -> Option<&str> {
        self.get("header.cart")
    }

    /// Expected checkout page header
    #[must_use]
    pub fn checkout_header(&self) -> Option<&str> {
        self.get("header.checkout")
    }
}
