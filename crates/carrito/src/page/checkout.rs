//! Checkout flow facade: information, overview, and completion steps.

use crate::locator::Locator;
use crate::result::CarritoResult;
use crate::session::Session;

use super::{Interact, WaitPolicy};

/// Completion phrase shown on a successful order
const COMPLETION_PHRASE: &str = "Thank you for your order!";

fn page_title() -> Locator {
    Locator::class_name("title")
}

fn first_name_field() -> Locator {
    Locator::id("first-name")
}

fn last_name_field() -> Locator {
    Locator::id("last-name")
}

fn postal_code_field() -> Locator {
    Locator::id("postal-code")
}

fn continue_button() -> Locator {
    Locator::id("continue")
}

fn cancel_button() -> Locator {
    Locator::id("cancel")
}

fn error_message() -> Locator {
    Locator::test_id("error")
}

fn summary_items() -> Locator {
    Locator::class_name("cart_item")
}

fn summary_item_names() -> Locator {
    Locator::class_name("inventory_item_name")
}

fn summary_subtotal() -> Locator {
    Locator::class_name("summary_subtotal_label")
}

fn summary_tax() -> Locator {
    Locator::class_name("summary_tax_label")
}

fn summary_total() -> Locator {
    Locator::class_name("summary_total_label")
}

fn finish_button() -> Locator {
    Locator::id("finish")
}

fn complete_header() -> Locator {
    Locator::class_name("complete-header")
}

fn complete_text() -> Locator {
    Locator::class_name("complete-text")
}

fn back_to_products_button() -> Locator {
    Locator::id("back-to-products")
}

/// Page object for the three-step checkout flow
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    session: Session,
    waits: WaitPolicy,
}

impl Interact for CheckoutPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn waits(&self) -> &WaitPolicy {
        &self.waits
    }
}

impl CheckoutPage {
    /// Bind a checkout page to a session
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

    // Information step

    /// Whether the information step is currently shown
    pub async fn is_information_displayed(&self) -> CarritoResult<bool> {
        Ok(self.is_displayed(&first_name_field()).await?
            && self.current_url().await?.contains("checkout-step-one.html"))
    }

    /// Type the first name, clearing any prior input
    pub async fn enter_first_name(&self, first_name: &str) -> CarritoResult<()> {
        self.type_text(&first_name_field(), first_name).await
    }

    /// Type the last name, clearing any prior input
    pub async fn enter_last_name(&self, last_name: &str) -> CarritoResult<()> {
        self.type_text(&last_name_field(), last_name).await
    }

    /// Type the postal code, clearing any prior input
    pub async fn enter_postal_code(&self, postal_code: &str) -> CarritoResult<()> {
        self.type_text(&postal_code_field(), postal_code).await
    }

    /// Fill every information field
    pub async fn fill_information(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> CarritoResult<()> {
        self.enter_first_name(first_name).await?;
        self.enter_last_name(last_name).await?;
        self.enter_postal_code(postal_code).await
    }

    /// Proceed to the overview step
    pub async fn click_continue(&self) -> CarritoResult<()> {
        self.click(&continue_button()).await
    }

    /// Abandon checkout and return to the cart
    pub async fn click_cancel(&self) -> CarritoResult<()> {
        self.click(&cancel_button()).await
    }

    /// Text of the validation error banner
    pub async fn error_message(&self) -> CarritoResult<String> {
        self.read_text(&error_message()).await
    }

    /// Whether the validation error banner is shown
    pub async fn is_error_displayed(&self) -> CarritoResult<bool> {
        self.is_displayed(&error_message()).await
    }

    // Overview step

    /// Whether the overview step is currently shown
    pub async fn is_overview_displayed(&self) -> CarritoResult<bool> {
        Ok(self.is_displayed(&finish_button()).await?
            && self.current_url().await?.contains("checkout-step-two.html"))
    }

    /// Names of every item in the order summary, in on-page order
    pub async fn summary_item_names(&self) -> CarritoResult<Vec<String>> {
        self.read_all_text(&summary_item_names()).await
    }

    /// Whether the named item appears in the order summary
    pub async fn has_summary_item(&self, item_name: &str) -> CarritoResult<bool> {
        Ok(self
            .summary_item_names()
            .await?
            .iter()
            .any(|n| n == item_name))
    }

    /// Subtotal line of the order summary
    pub async fn subtotal(&self) -> CarritoResult<String> {
        self.read_text(&summary_subtotal()).await
    }

    /// Tax line of the order summary
    pub async fn tax(&self) -> CarritoResult<String> {
        self.read_text(&summary_tax()).await
    }

    /// Total line of the order summary
    pub async fn total(&self) -> CarritoResult<String> {
        self.read_text(&summary_total()).await
    }

    /// Number of items in the order summary
    pub async fn summary_item_count(&self) -> CarritoResult<usize> {
        self.count(&summary_items()).await
    }

    /// Place the order
    pub async fn click_finish(&self) -> CarritoResult<()> {
        self.click(&finish_button()).await
    }

    // Completion step

    /// Whether the completion step is currently shown
    pub async fn is_complete_displayed(&self) -> CarritoResult<bool> {
        Ok(self.is_displayed(&complete_header()).await?
            && self
                .current_url()
                .await?
                .contains("checkout-complete.html"))
    }

    /// Header of the completion screen
    pub async fn completion_header(&self) -> CarritoResult<String> {
        self.read_text(&complete_header()).await
    }

    /// Body message of the completion screen
    pub async fn completion_message(&self) -> CarritoResult<String> {
        self.read_text(&complete_text()).await
    }

    /// Return to the products listing from the completion screen
    pub async fn click_back_to_products(&self) -> CarritoResult<()> {
        self.click(&back_to_products_button()).await
    }

    /// Whether the order completed successfully
    pub async fn is_order_complete(&self) -> CarritoResult<bool> {
        Ok(self.is_complete_displayed().await?
            && self.completion_header().await?.contains(COMPLETION_PHRASE))
    }
}
