//! Ordered `(item, quantity)` lines attached to a document.

use crate::model::item::{Item, ItemValidationError};

/// One document line: an item reference and how many units it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub item: Item,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(item: Item, quantity: u32) -> Self {
        Self { item, quantity }
    }

    /// Validates the referenced item and the line quantity.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        self.item.validate()?;
        if self.quantity == 0 {
            return Err(ItemValidationError::ZeroQuantity {
                product_code: self.item.product_code.clone(),
            });
        }
        Ok(())
    }

    /// Line value in minor currency units, `None` on overflow.
    pub fn amount(&self) -> Option<i64> {
        self.item.unit_price.checked_mul(i64::from(self.quantity))
    }
}

/// Insertion-ordered collection of document lines.
///
/// Adding a line never validates it; validation happens when the owning
/// document is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemCollection {
    rows: Vec<LineItem>,
}

impl LineItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line at the end of the collection.
    pub fn add_item(&mut self, item: Item, quantity: u32) {
        self.rows.push(LineItem::new(item, quantity));
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all line amounts in minor units, `None` on overflow.
    ///
    /// Lines are summed regardless of currency; callers mixing currencies
    /// must group lines themselves.
    pub fn total(&self) -> Option<i64> {
        self.rows
            .iter()
            .try_fold(0_i64, |acc, line| acc.checked_add(line.amount()?))
    }
}

impl<'a> IntoIterator for &'a LineItemCollection {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<LineItem> for LineItemCollection {
    fn from_iter<T: IntoIterator<Item = LineItem>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
