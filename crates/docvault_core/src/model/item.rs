//! Catalogue item referenced by document line items.
//!
//! # Responsibility
//! - Hold the fields stored in the `items` table.
//! - Validate item data before it is inserted or linked to a document.
//!
//! # Invariants
//! - `product_code` is the natural key; two rows never share it.
//! - `unit_price` is expressed in minor currency units and is never negative.
//! - `currency` is an ISO-4217 style three-letter upper-case code.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity of a row in `items`.
pub type ItemId = i64;

/// Currency assigned to items that do not specify one.
pub const DEFAULT_ITEM_CURRENCY: &str = "RON";

static PRODUCT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,63}$").expect("valid code regex"));
static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));

/// Item or line validation failure, surfaced as "document item invalid".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyProductCode,
    InvalidProductCode(String),
    EmptyTitle { product_code: String },
    NegativeUnitPrice { product_code: String, unit_price: i64 },
    InvalidCurrency { product_code: String, currency: String },
    /// A line links the item with a zero quantity.
    ZeroQuantity { product_code: String },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyProductCode => write!(f, "item product_code cannot be empty"),
            Self::InvalidProductCode(code) => write!(f, "invalid item product_code `{code}`"),
            Self::EmptyTitle { product_code } => {
                write!(f, "item `{product_code}` title cannot be empty")
            }
            Self::NegativeUnitPrice {
                product_code,
                unit_price,
            } => write!(
                f,
                "item `{product_code}` unit_price must not be negative, got {unit_price}"
            ),
            Self::InvalidCurrency {
                product_code,
                currency,
            } => write!(
                f,
                "item `{product_code}` currency `{currency}` is not a three-letter code"
            ),
            Self::ZeroQuantity { product_code } => {
                write!(f, "line for item `{product_code}` must have a positive quantity")
            }
        }
    }
}

impl Error for ItemValidationError {}

/// Catalogue item shared across documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Row id; `None` until the item exists in storage.
    pub id: Option<ItemId>,
    pub product_code: String,
    pub title: String,
    /// Minor currency units.
    pub unit_price: i64,
    pub currency: String,
}

impl Item {
    /// Creates an unsaved item priced in `DEFAULT_ITEM_CURRENCY`.
    pub fn new(product_code: impl Into<String>, title: impl Into<String>, unit_price: i64) -> Self {
        Self {
            id: None,
            product_code: product_code.into(),
            title: title.into(),
            unit_price,
            currency: DEFAULT_ITEM_CURRENCY.to_string(),
        }
    }

    /// Replaces the currency code.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Returns whether the item already has a storage identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Validates item fields before persistence.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        let code = self.product_code.trim();
        if code.is_empty() {
            return Err(ItemValidationError::EmptyProductCode);
        }
        if !PRODUCT_CODE_RE.is_match(code) || code != self.product_code {
            return Err(ItemValidationError::InvalidProductCode(
                self.product_code.clone(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::EmptyTitle {
                product_code: self.product_code.clone(),
            });
        }
        if self.unit_price < 0 {
            return Err(ItemValidationError::NegativeUnitPrice {
                product_code: self.product_code.clone(),
                unit_price: self.unit_price,
            });
        }
        if !CURRENCY_RE.is_match(&self.currency) {
            return Err(ItemValidationError::InvalidCurrency {
                product_code: self.product_code.clone(),
                currency: self.currency.clone(),
            });
        }
        Ok(())
    }
}
