//! Catalog
//!
//! Products are published by a separate subsystem and are read-only here. The
//! `price` on a [`Product`] is authoritative; anything copied into a cart is
//! only advisory.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{ids::DocumentId, users::UserId};

pub mod buttons;
pub mod filter;

pub use buttons::{PurchaseButton, purchase_button};
pub use filter::{CatalogFilter, CatalogSort, browse};

/// Product document id
pub type ProductId = DocumentId<Product>;

/// How a purchased product is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "deliveryType", rename_all = "lowercase")]
pub enum Delivery {
    /// Downloadable file in object storage.
    File {
        /// Download location
        #[serde(rename = "fileUrl")]
        file_url: String,
    },

    /// External resource opened by link.
    Url {
        /// Access location
        #[serde(rename = "accessUrl")]
        access_url: String,
    },
}

impl Delivery {
    /// Location the buyer is sent to after purchase.
    pub fn location(&self) -> &str {
        match self {
            Self::File { file_url } => file_url,
            Self::Url { access_url } => access_url,
        }
    }

    /// Wire name of the delivery type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Url { .. } => "url",
        }
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document id
    pub id: ProductId,

    /// Product title
    pub title: String,

    /// Long description
    #[serde(default)]
    pub description: Option<String>,

    /// Authoritative price in whole currency units
    pub price: u64,

    /// Delivery details
    #[serde(flatten)]
    pub delivery: Delivery,

    /// Preview image location
    #[serde(default)]
    pub preview_image: Option<String>,

    /// File type label, e.g. `pdf`
    #[serde(default)]
    pub file_type: Option<String>,

    /// Publishing author
    pub author_id: UserId,

    /// Publication time
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}
