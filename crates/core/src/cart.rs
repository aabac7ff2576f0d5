//! Cart

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Product, ProductId},
    users::UserId,
};

/// One product reference in a cart.
///
/// `display_price` is copied from the catalog when the item is added and is
/// only ever used for display. Checkout re-reads the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Referenced product
    pub product_id: ProductId,

    /// Title at the time of adding
    pub title: String,

    /// Advisory price at the time of adding
    pub display_price: u64,

    /// Preview image location
    #[serde(default)]
    pub preview_image: Option<String>,

    /// File type label
    #[serde(default)]
    pub file_type: Option<String>,

    /// Publishing author
    pub author_id: UserId,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            display_price: product.price,
            preview_image: product.preview_image.clone(),
            file_type: product.file_type.clone(),
            author_id: product.author_id.clone(),
        }
    }
}

/// Ordered cart contents, at most one item per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Cart items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `product` is in the cart.
    pub fn contains(&self, product: &ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == *product)
    }

    /// A copy of this cart with `product` removed.
    #[must_use]
    pub fn without(&self, product: &ProductId) -> Self {
        self.items
            .iter()
            .filter(|item| item.product_id != *product)
            .cloned()
            .collect()
    }

    /// Array-union style merge: appends `item` unless its product is present.
    ///
    /// Returns whether the cart changed.
    pub fn merge(&mut self, item: CartItem) -> bool {
        if self.contains(&item.product_id) {
            return false;
        }

        self.items.push(item);

        true
    }

    /// Sum of advisory display prices.
    pub fn subtotal(&self) -> u64 {
        self.items
            .iter()
            .fold(0_u64, |total, item| total.saturating_add(item.display_price))
    }

    /// Consume the cart, returning its items.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

impl From<Vec<CartItem>> for Cart {
    /// Builds a cart, keeping only the first item for each product.
    fn from(items: Vec<CartItem>) -> Self {
        items.into_iter().collect()
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        let mut cart = Self::default();

        for item in iter {
            cart.merge(item);
        }

        cart
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Delivery;

    use super::*;

    fn item(id: &str, price: u64) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            title: format!("Title {id}"),
            display_price: price,
            preview_image: None,
            file_type: Some("pdf".to_string()),
            author_id: UserId::new("author-1"),
        }
    }

    #[test]
    fn merge_is_idempotent_per_product() {
        let mut cart = Cart::default();

        assert!(cart.merge(item("p1", 1_000)));
        assert!(!cart.merge(item("p1", 9_999)));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal(), 1_000);
    }

    #[test]
    fn without_absent_product_is_unchanged() {
        let cart = Cart::from(vec![item("p1", 1_000), item("p2", 2_000)]);

        assert_eq!(cart.without(&ProductId::new("p9")), cart);
        assert_eq!(cart.without(&ProductId::new("p1")).items(), [item("p2", 2_000)]);
    }

    #[test]
    fn from_vec_drops_duplicate_products() {
        let cart = Cart::from(vec![item("p1", 1_000), item("p1", 1_500), item("p2", 2_000)]);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal(), 3_000);
    }

    #[test]
    fn item_copies_product_display_data() {
        let product = Product {
            id: ProductId::new("p1"),
            title: "Fractions".to_string(),
            description: None,
            price: 3_000,
            delivery: Delivery::File {
                file_url: "https://files.example.com/p1.pdf".to_string(),
            },
            preview_image: Some("https://img.example.com/p1.png".to_string()),
            file_type: Some("pdf".to_string()),
            author_id: UserId::new("author-1"),
            created_at: None,
        };

        let item = CartItem::from(&product);

        assert_eq!(item.product_id, product.id);
        assert_eq!(item.display_price, 3_000);
        assert_eq!(item.preview_image, product.preview_image);
    }
}
