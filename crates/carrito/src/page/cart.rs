//! Shopping cart page facade.

use crate::driver::Driver;
use crate::locator::{Locator, Template};
use crate::result::{CarritoError, CarritoResult};
use crate::session::Session;

use super::{Interact, WaitPolicy};

fn page_title() -> Locator {
    Locator::class_name("title")
}

fn cart_items() -> Locator {
    Locator::class_name("cart_item")
}

fn cart_item_names() -> Locator {
    Locator::class_name("inventory_item_name")
}

fn remove_buttons() -> Locator {
    Locator::xpath("//button[contains(text(),'Remove')]")
}

fn continue_shopping_button() -> Locator {
    Locator::id("continue-shopping")
}

fn checkout_button() -> Locator {
    Locator::id("checkout")
}

fn cart_item_template() -> Template {
    Template::xpath("//div[@class='inventory_item_name' and text()={}]")
}

fn remove_item_template() -> Template {
    Template::xpath(
        "//div[text()={}]/ancestor::div[@class='cart_item']//button[contains(text(),'Remove')]",
    )
}

fn item_price_template() -> Template {
    Template::xpath(
        "//div[text()={}]/ancestor::div[@class='cart_item']//div[@class='inventory_item_price']",
    )
}

/// Page object for the shopping cart
#[derive(Debug, Clone)]
pub struct CartPage {
    session: Session,
    waits: WaitPolicy,
}

impl Interact for CartPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn waits(&self) -> &WaitPolicy {
        &self.waits
    }
}

impl CartPage {
    /// Bind a cart page to a session
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            waits: WaitPolicy::default(),
        }
    }

    /// Override the wait policy
    #[must_use]
    pub const fn with_waits(mut self, waits: WaitPolicy) -> Self {
        self.waits = waits;
        self
    }

    /// Whether the cart page is currently shown
    pub async fn is_cart_page_displayed(&self) -> CarritoResult<bool> {
        Ok(self.is_displayed(&page_title()).await?
            && self.current_url().await?.contains("cart.html"))
    }

    /// Text of the page header
    pub async fn header(&self) -> CarritoResult<String> {
        self.read_text(&page_title()).await
    }

    /// Names of every item in the cart, in on-page order
    pub async fn item_names(&self) -> CarritoResult<Vec<String>> {
        self.read_all_text(&cart_item_names()).await
    }

    /// Number of items in the cart
    pub async fn item_count(&self) -> CarritoResult<usize> {
        self.count(&cart_items()).await
    }

    /// Whether the named item is in the cart
    pub async fn has_item(&self, item_name: &str) -> CarritoResult<bool> {
        self.is_displayed(&cart_item_template().render(item_name)?).await
    }

    /// Remove the named item from the cart
    pub async fn remove_item(&self, item_name: &str) -> CarritoResult<()> {
        self.click(&remove_item_template().render(item_name)?).await
    }

    /// Remove every item currently in the cart.
    ///
    /// The row list mutates under each click, so the names are re-queried
    /// after every removal rather than iterated from a stale snapshot.
    pub async fn remove_all_items(&self) -> CarritoResult<()> {
        let mut remaining = self.item_names().await?;
        while let Some(name) = remaining.first() {
            self.remove_item(name).await?;
            let now = self.item_names().await?;
            if now.len() >= remaining.len() {
                return Err(CarritoError::Driver {
                    locator: remove_buttons().to_string(),
                    message: format!("cart row for '{name}' still present after Remove"),
                });
            }
            remaining = now;
        }
        Ok(())
    }

    /// Whether the cart holds no items
    pub async fn is_empty(&self) -> CarritoResult<bool> {
        Ok(self.item_count().await? == 0)
    }

    /// The listed price of a cart item
    pub async fn item_price(&self, item_name: &str) -> CarritoResult<String> {
        self.read_text(&item_price_template().render(item_name)?).await
    }

    /// Return to the products listing
    pub async fn continue_shopping(&self) -> CarritoResult<()> {
        self.click(&continue_shopping_button()).await
    }

    /// Start the checkout flow
    pub async fn proceed_to_checkout(&self) -> CarritoResult<()> {
        self.click(&checkout_button()).await
    }

    /// Number of Remove buttons currently shown
    pub async fn remove_button_count(&self) -> CarritoResult<usize> {
        self.count(&remove_buttons()).await
    }

    /// Whether the checkout button is interactable
    pub async fn is_checkout_enabled(&self) -> CarritoResult<bool> {
        self.session.driver()?.is_enabled(&checkout_button()).await
    }

    /// Whether the continue-shopping button is shown
    pub async fn is_continue_shopping_displayed(&self) -> CarritoResult<bool> {
        self.is_displayed(&continue_shopping_button()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testkit::{fast_waits, session_over};
    use super::*;
    use crate::driver::{ClickEffect, MockDriver, MockElement};

    const BACKPACK: &str = "Sauce Labs Backpack";

    fn cart_with_backpack() -> MockDriver {
        let row = cart_item_template().render(BACKPACK).unwrap();
        let remove = remove_item_template().render(BACKPACK).unwrap();
        MockDriver::new()
            .with_url("https://www.saucedemo.com/cart.html")
            .with_element(&page_title(), MockElement::text("Your Cart"))
            .with_element(&cart_items(), MockElement::blank())
            .with_element(&cart_item_names(), MockElement::text(BACKPACK))
            .with_element(&row, MockElement::text(BACKPACK))
            .with_element(&remove, MockElement::text("Remove").with_tag("button"))
            .with_element(&checkout_button(), MockElement::blank().with_tag("button"))
            .with_element(
                &continue_shopping_button(),
                MockElement::blank().with_tag("button"),
            )
    }

    async fn page(driver: Arc<MockDriver>) -> (CartPage, crate::session::SessionManager) {
        let (session, manager) = session_over(driver).await;
        (CartPage::new(session).with_waits(fast_waits()), manager)
    }

    #[tokio::test]
    async fn test_cart_page_check_requires_url_fragment() {
        let (page, _mgr) = page(Arc::new(cart_with_backpack())).await;
        assert!(page.is_cart_page_displayed().await.unwrap());
        assert_eq!(page.header().await.unwrap(), "Your Cart");
    }

    #[tokio::test]
    async fn test_item_presence_and_count() {
        let (page, _mgr) = page(Arc::new(cart_with_backpack())).await;
        assert_eq!(page.item_count().await.unwrap(), 1);
        assert!(!page.is_empty().await.unwrap());
        assert!(page.has_item(BACKPACK).await.unwrap());
        assert!(!page.has_item("Sauce Labs Bike Light").await.unwrap());
        assert_eq!(page.item_names().await.unwrap(), vec![BACKPACK.to_string()]);
    }

    #[tokio::test]
    async fn test_remove_item_empties_cart() {
        let row = cart_item_template().render(BACKPACK).unwrap();
        let remove = remove_item_template().render(BACKPACK).unwrap();
        let driver = Arc::new(cart_with_backpack().with_click_effect(
            &remove,
            ClickEffect::Remove(vec![
                remove.clone(),
                row,
                cart_items(),
                cart_item_names(),
            ]),
        ));
        let (page, _mgr) = page(driver).await;

        page.remove_item(BACKPACK).await.unwrap();
        assert!(page.is_empty().await.unwrap());
        assert!(!page.has_item(BACKPACK).await.unwrap());
        assert_eq!(page.remove_button_count().await.unwrap(), 0);
    }

    fn cart_rows(names: &[&str]) -> Vec<(Locator, MockElement)> {
        let mut elements = vec![(page_title(), MockElement::text("Your Cart"))];
        for name in names {
            elements.push((cart_items(), MockElement::blank()));
            elements.push((cart_item_names(), MockElement::text(*name)));
            elements.push((
                remove_item_template().render(name).unwrap(),
                MockElement::text("Remove").with_tag("button"),
            ));
        }
        elements
    }

    #[tokio::test]
    async fn test_remove_all_items_clears_multi_item_cart() {
        const BIKE_LIGHT: &str = "Sauce Labs Bike Light";
        const CART_URL: &str = "https://www.saucedemo.com/cart.html";
        let remove_backpack = remove_item_template().render(BACKPACK).unwrap();
        let remove_bike_light = remove_item_template().render(BIKE_LIGHT).unwrap();

        let mut driver = MockDriver::new().with_url(CART_URL);
        for (loc, el) in cart_rows(&[BACKPACK, BIKE_LIGHT]) {
            driver = driver.with_element(&loc, el);
        }
        let driver = Arc::new(
            driver
                .with_click_effect(
                    &remove_backpack,
                    ClickEffect::Navigate {
                        url: CART_URL.to_string(),
                        install: cart_rows(&[BIKE_LIGHT]),
                    },
                )
                .with_click_effect(
                    &remove_bike_light,
                    ClickEffect::Navigate {
                        url: CART_URL.to_string(),
                        install: cart_rows(&[]),
                    },
                ),
        );
        let (page, _mgr) = page(driver.clone()).await;

        assert_eq!(page.item_count().await.unwrap(), 2);
        page.remove_all_items().await.unwrap();
        assert!(page.is_empty().await.unwrap());
        assert_eq!(page.remove_button_count().await.unwrap(), 0);
        assert!(driver.was_called(&format!("click:{remove_backpack}")));
        assert!(driver.was_called(&format!("click:{remove_bike_light}")));
    }

    #[tokio::test]
    async fn test_remove_all_items_errors_when_row_survives_click() {
        // Remove button is present but its click is scripted with no effect,
        // so the row list never shrinks.
        let (page, _mgr) = page(Arc::new(cart_with_backpack())).await;
        let err = page.remove_all_items().await.unwrap_err();
        assert!(matches!(err, CarritoError::Driver { .. }));
    }

    #[tokio::test]
    async fn test_item_price_reads_row_field() {
        let price = item_price_template().render(BACKPACK).unwrap();
        let driver =
            Arc::new(cart_with_backpack().with_element(&price, MockElement::text("$29.99")));
        let (page, _mgr) = page(driver).await;
        assert_eq!(page.item_price(BACKPACK).await.unwrap(), "$29.99");
    }

    #[tokio::test]
    async fn test_proceed_to_checkout_clicks_button() {
        let driver = Arc::new(cart_with_backpack());
        let (page, _mgr) = page(driver.clone()).await;
        assert!(page.is_checkout_enabled().await.unwrap());
        page.proceed_to_checkout().await.unwrap();
        assert!(driver.was_called("click:id=checkout"));
    }

    #[tokio::test]
    async fn test_continue_shopping_clicks_button() {
        let driver = Arc::new(cart_with_backpack());
        let (page, _mgr) = page(driver.clone()).await;
        assert!(page.is_continue_shopping_displayed().await.unwrap());
        page.continue_shopping().await.unwrap();
        assert!(driver.was_called("click:id=continue-shopping"));
    }
}
