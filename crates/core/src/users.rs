//! Users

use serde::{Deserialize, Serialize};

use crate::{cart::Cart, catalog::ProductId, ids::DocumentId};

/// User document id
pub type UserId = DocumentId<UserRecord>;

/// User record as stored in the users collection.
///
/// The cart lives in `myCart`. Every other field is owned by other parts of
/// the storefront and must survive cart writes untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Document id
    pub id: UserId,

    /// Contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,

    /// Products already purchased by this user.
    #[serde(default)]
    pub purchased_products: Vec<ProductId>,

    /// Persisted cart
    #[serde(default)]
    pub my_cart: Cart,
}

impl UserRecord {
    /// Empty record for a newly seen user.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            email: None,
            display_name: None,
            purchased_products: Vec::new(),
            my_cart: Cart::default(),
        }
    }
}

/// Signed-in identity supplied by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// User id
    pub id: UserId,

    /// Sign-in email
    pub email: String,

    /// Display name, when the provider has one.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl AuthUser {
    /// Name shown on orders; falls back to the email address.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}
