//! Locator descriptors and runtime-parameterized templates.
//!
//! A [`Locator`] is an immutable selector descriptor (strategy + value). A
//! [`Template`] is a selector pattern with a `{}` placeholder filled at call
//! time with a runtime string, used to target one of many structurally
//! identical rows (e.g. a product by name).
//!
//! The placeholder always stands for a complete quoted string literal in the
//! target grammar; the renderer inserts the quoting and escapes the value, so
//! an interpolated value can never break out of its literal.

use serde::{Deserialize, Serialize};

use crate::result::{CarritoError, CarritoResult};

/// Selection strategy for a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Element id attribute
    Id,
    /// Single class name
    ClassName,
    /// `data-test` attribute (the storefront's stable hooks)
    TestId,
}

impl Strategy {
    /// Canonical short name used in error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::ClassName => "class",
            Self::TestId => "test-id",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable selector descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    value: String,
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            value: selector.into(),
        }
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::XPath,
            value: expr.into(),
        }
    }

    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Id,
            value: id.into(),
        }
    }

    /// Create a class-name locator
    #[must_use]
    pub fn class_name(name: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::ClassName,
            value: name.into(),
        }
    }

    /// Create a `data-test` attribute locator
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::TestId,
            value: id.into(),
        }
    }

    /// Get the strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the raw selector value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Normalize to a CSS selector string where the strategy allows it
    fn as_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Css => Some(self.value.clone()),
            Strategy::Id => Some(format!("#{}", self.value)),
            Strategy::ClassName => Some(format!(".{}", self.value)),
            Strategy::TestId => Some(format!("[data-test={}]", quote_css(&self.value))),
            Strategy::XPath => None,
        }
    }

    /// Convert to a JS expression yielding the first matching element
    #[must_use]
    pub fn to_query(&self) -> String {
        match self.as_css() {
            Some(css) => format!("document.querySelector({css:?})"),
            None => format!(
                "document.evaluate({:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                self.value
            ),
        }
    }

    /// Convert to a JS expression yielding the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        match self.as_css() {
            Some(css) => format!("document.querySelectorAll({css:?}).length"),
            None => format!(
                "document.evaluate({:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
                self.value
            ),
        }
    }

    /// Convert to a JS expression yielding an array of all matching elements
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self.as_css() {
            Some(css) => format!("Array.from(document.querySelectorAll({css:?}))"),
            None => format!(
                "(() => {{ const r = document.evaluate({:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); return out; }})()",
                self.value
            ),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// Placeholder token in template patterns
const PLACEHOLDER: &str = "{}";

/// A selector pattern with a runtime-filled placeholder.
///
/// The placeholder stands for a complete quoted string literal: a CSS pattern
/// is written `[data-test={}]` (not `[data-test='{}']`), an XPath pattern
/// `//div[text()={}]`. [`Template::render`] inserts the quoting itself after
/// escaping the value for the target grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    strategy: Strategy,
    pattern: String,
}

impl Template {
    /// Create a CSS template
    #[must_use]
    pub fn css(pattern: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            pattern: pattern.into(),
        }
    }

    /// Create an XPath template
    #[must_use]
    pub fn xpath(pattern: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::XPath,
            pattern: pattern.into(),
        }
    }

    /// Get the raw pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render the template with a runtime value.
    ///
    /// Every placeholder occurrence receives the same value, escaped and
    /// quoted for the template's grammar.
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::Template`] if the pattern has no placeholder.
    pub fn render(&self, value: &str) -> CarritoResult<Locator> {
        if !self.pattern.contains(PLACEHOLDER) {
            return Err(CarritoError::Template {
                pattern: self.pattern.clone(),
                message: "pattern has no {} placeholder".to_string(),
            });
        }
        let literal = match self.strategy {
            Strategy::XPath => xpath_literal(value),
            _ => quote_css(value),
        };
        let rendered = self.pattern.replace(PLACEHOLDER, &literal);
        Ok(Locator {
            strategy: self.strategy,
            value: rendered,
        })
    }
}

/// Quote a value as a double-quoted CSS string literal
fn quote_css(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\a "),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Quote a value as an XPath 1.0 string literal.
///
/// XPath 1.0 has no escape sequences inside literals, so a value containing
/// both quote kinds must be split with `concat(...)`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let mut parts = Vec::new();
    for (i, piece) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !piece.is_empty() {
            parts.push(format!("'{piece}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod locator_tests {
        use super::*;

        #[test]
        fn test_constructors_set_strategy() {
            assert_eq!(Locator::css(".title").strategy(), Strategy::Css);
            assert_eq!(Locator::id("login-button").strategy(), Strategy::Id);
            assert_eq!(
                Locator::class_name("shopping_cart_badge").strategy(),
                Strategy::ClassName
            );
            assert_eq!(Locator::test_id("error").strategy(), Strategy::TestId);
            assert_eq!(Locator::xpath("//div").strategy(), Strategy::XPath);
        }

        #[test]
        fn test_display_names_strategy_and_value() {
            let loc = Locator::class_name("title");
            assert_eq!(loc.to_string(), "class=title");
        }

        #[test]
        fn test_css_query() {
            let q = Locator::css("button.primary").to_query();
            assert!(q.contains("querySelector"));
            assert!(q.contains("button.primary"));
        }

        #[test]
        fn test_id_query_normalizes_to_css() {
            let q = Locator::id("user-name").to_query();
            assert!(q.contains("#user-name"));
        }

        #[test]
        fn test_test_id_query_uses_data_test_attribute() {
            let q = Locator::test_id("error").to_query();
            assert!(q.contains("[data-test="));
            assert!(q.contains("error"));
        }

        #[test]
        fn test_xpath_query_uses_evaluate() {
            let q = Locator::xpath("//button[@id='finish']").to_query();
            assert!(q.contains("document.evaluate"));
            assert!(q.contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_count_query() {
            let q = Locator::class_name("inventory_item").to_count_query();
            assert!(q.contains("querySelectorAll"));
            assert!(q.contains(".length"));
        }

        #[test]
        fn test_query_all_xpath_snapshot() {
            let q = Locator::xpath("//div[@class='cart_item']").to_query_all();
            assert!(q.contains("snapshotItem"));
        }
    }

    mod template_tests {
        use super::*;

        #[test]
        fn test_render_css_quotes_value() {
            let tpl = Template::css("[data-test={}]");
            let loc = tpl.render("add-to-cart-sauce-labs-backpack").unwrap();
            assert_eq!(
                loc.value(),
                "[data-test=\"add-to-cart-sauce-labs-backpack\"]"
            );
        }

        #[test]
        fn test_render_xpath_plain_value() {
            let tpl = Template::xpath("//div[text()={}]");
            let loc = tpl.render("Sauce Labs Backpack").unwrap();
            assert_eq!(loc.value(), "//div[text()='Sauce Labs Backpack']");
            assert_eq!(loc.strategy(), Strategy::XPath);
        }

        #[test]
        fn test_render_escapes_css_quotes() {
            let tpl = Template::css("[data-name={}]");
            let loc = tpl.render("a\"b\\c").unwrap();
            assert_eq!(loc.value(), "[data-name=\"a\\\"b\\\\c\"]");
        }

        #[test]
        fn test_render_xpath_value_with_single_quote() {
            let tpl = Template::xpath("//div[text()={}]");
            let loc = tpl.render("O'Neill Tee").unwrap();
            assert_eq!(loc.value(), "//div[text()=\"O'Neill Tee\"]");
        }

        #[test]
        fn test_render_xpath_value_with_both_quote_kinds() {
            let tpl = Template::xpath("//div[text()={}]");
            let loc = tpl.render("a'b\"c").unwrap();
            assert_eq!(loc.value(), "//div[text()=concat('a', \"'\", 'b\"c')]");
        }

        #[test]
        fn test_render_fills_every_placeholder() {
            let tpl = Template::xpath("//div[text()={} or @data-name={}]");
            let loc = tpl.render("x").unwrap();
            assert_eq!(loc.value().matches("'x'").count(), 2);
        }

        #[test]
        fn test_render_without_placeholder_fails() {
            let tpl = Template::css(".inventory_item");
            let err = tpl.render("anything").unwrap_err();
            assert!(matches!(err, CarritoError::Template { .. }));
        }
    }

    mod xpath_literal_tests {
        use super::*;

        #[test]
        fn test_plain() {
            assert_eq!(xpath_literal("abc"), "'abc'");
        }

        #[test]
        fn test_single_quote_only() {
            assert_eq!(xpath_literal("a'b"), "\"a'b\"");
        }

        #[test]
        fn test_leading_and_trailing_quotes() {
            assert_eq!(xpath_literal("'a\"'"), "concat(\"'\", 'a\"', \"'\")");
        }
    }

    mod escaping_property_tests {
        use super::*;
        use crate::locator::Strategy;
        use proptest::prelude::*;

        // Inverse of quote_css: None means the literal was not well formed,
        // i.e. the value broke out of its quoting.
        fn unquote_css(literal: &str) -> Option<String> {
            let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
            let mut out = String::new();
            let mut chars = inner.chars();
            while let Some(ch) = chars.next() {
                match ch {
                    '"' => return None,
                    '\\' => match chars.next()? {
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        'a' => {
                            if chars.next() != Some(' ') {
                                return None;
                            }
                            out.push('\n');
                        }
                        _ => return None,
                    },
                    other => out.push(other),
                }
            }
            Some(out)
        }

        proptest! {
            #[test]
            fn test_css_quoting_round_trips(value in ".*") {
                let quoted = quote_css(&value);
                prop_assert_eq!(unquote_css(&quoted), Some(value));
            }

            #[test]
            fn test_render_accepts_any_value(value in ".*") {
                let loc = Template::xpath("//div[text()={}]").render(&value).unwrap();
                prop_assert_eq!(loc.strategy(), Strategy::XPath);
            }

            #[test]
            fn test_xpath_literal_has_no_bare_quote_conflicts(value in "[a-z'\"]{0,12}") {
                let literal = xpath_literal(&value);
                if literal.starts_with("concat(") {
                    prop_assert!(value.contains('\'') && value.contains('"'));
                } else {
                    let quote = literal.chars().next().unwrap();
                    prop_assert!(!literal[1..literal.len() - 1].contains(quote));
                }
            }
        }
    }
}
