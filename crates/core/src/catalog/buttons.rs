//! Purchase button view model

use rustc_hash::FxHashSet;

use crate::{cart::Cart, catalog::ProductId};

/// State of the purchase control shown next to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseButton {
    /// Already bought; the control links to the library.
    Owned,

    /// Already in the cart; the control opens the cart.
    InCart,

    /// Can be added to the cart.
    AddToCart,
}

impl PurchaseButton {
    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Owned => "View in library",
            Self::InCart => "In cart",
            Self::AddToCart => "Add to cart",
        }
    }

    /// Whether clicking the control adds the product to the cart.
    pub fn adds_to_cart(self) -> bool {
        matches!(self, Self::AddToCart)
    }
}

/// Map cart and purchase state for `product` to its button state.
///
/// Ownership wins over cart membership, so a product bought on another device
/// while still sitting in this cart shows as owned.
pub fn purchase_button(
    product: &ProductId,
    cart: &Cart,
    owned: &FxHashSet<ProductId>,
) -> PurchaseButton {
    if owned.contains(product) {
        PurchaseButton::Owned
    } else if cart.contains(product) {
        PurchaseButton::InCart
    } else {
        PurchaseButton::AddToCart
    }
}
