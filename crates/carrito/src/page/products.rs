//! Products listing page facade.
//!
//! Row-targeting operations (add, remove, price) render an XPath template
//! with the product's display name, so one locator pattern covers every
//! structurally identical inventory row.

use crate::locator::{Locator, Template};
use crate::result::CarritoResult;
use crate::session::Session;

use super::{Interact, WaitPolicy};

fn page_title() -> Locator {
    Locator::class_name("title")
}

fn product_items() -> Locator {
    Locator::class_name("inventory_item")
}

fn product_names() -> Locator {
    Locator::class_name("inventory_item_name")
}

fn remove_buttons() -> Locator {
    Locator::xpath("//button[contains(text(),'Remove')]")
}

fn sort_dropdown() -> Locator {
    Locator::class_name("product_sort_container")
}

fn add_to_cart_template() -> Template {
    Template::xpath(
        "//div[text()={}]/ancestor::div[@class='inventory_item']//button[text()='Add to cart']",
    )
}

fn remove_from_cart_template() -> Template {
    Template::xpath(
        "//div[text()={}]/ancestor::div[@class='inventory_item']//button[text()='Remove']",
    )
}

fn product_link_template() -> Template {
    Template::xpath("//div[text()={}]")
}

fn product_price_template() -> Template {
    Template::xpath(
        "//div[text()={}]/ancestor::div[@class='inventory_item']//div[@class='inventory_item_price']",
    )
}

fn sort_option_template() -> Template {
    Template::xpath("//option[text()={}]")
}

/// Page object for the inventory listing
#[derive(Debug, Clone)]
pub struct ProductsPage {
    session: Session,
    waits: WaitPolicy,
}

impl Interact for ProductsPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn waits(&self) -> &WaitPolicy {
        &self.waits
    }
}

impl ProductsPage {
    /// Bind a products page to a session
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

    /// Text of the page header
    pub async fn header(&self) -> CarritoResult<String> {
        self.read_text(&page_title()).await
    }

    /// Whether the products listing is currently shown
    pub async fn is_products_page_displayed(&self) -> CarritoResult<bool> {
        Ok(self.is_displayed(&page_title()).await? && self.header().await? == "Products")
    }

    /// All product display names, in on-page order
    pub async fn product_names(&self) -> CarritoResult<Vec<String>> {
        self.read_all_text(&product_names()).await
    }

    /// Number of products listed
    pub async fn product_count(&self) -> CarritoResult<usize> {
        self.count(&product_items()).await
    }

    /// Add a product to the cart by display name
    pub async fn add_to_cart(&self, product_name: &str) -> CarritoResult<()> {
        self.click(&add_to_cart_template().render(product_name)?).await
    }

    /// Remove a product from the cart by display name
    pub async fn remove_from_cart(&self, product_name: &str) -> CarritoResult<()> {
        self.click(&remove_from_cart_template().render(product_name)?)
            .await
    }

    /// Open a product's detail view by display name
    pub async fn open_product(&self, product_name: &str) -> CarritoResult<()> {
        self.click(&product_link_template().render(product_name)?).await
    }

    /// Whether the product's row shows a Remove button
    pub async fn is_product_in_cart(&self, product_name: &str) -> CarritoResult<bool> {
        self.is_displayed(&remove_from_cart_template().render(product_name)?)
            .await
    }

    /// The listed price of a product, read from its row
    pub async fn product_price(&self, product_name: &str) -> CarritoResult<String> {
        self.read_text(&product_price_template().render(product_name)?)
            .await
    }

    /// Number of listed products currently in the cart
    pub async fn items_in_cart_count(&self) -> CarritoResult<usize> {
        self.count(&remove_buttons()).await
    }

    /// Sort the listing by the dropdown option's visible text
    pub async fn sort_by(&self, option: &str) -> CarritoResult<()> {
        self.click(&sort_dropdown()).await?;
        self.click(&sort_option_template().render(option)?).await
    }

    /// Whether a product with this display name is listed
    pub async fn is_product_displayed(&self, product_name: &str) -> CarritoResult<bool> {
        self.is_displayed(&product_link_template().render(product_name)?)
            .await
    }
}
