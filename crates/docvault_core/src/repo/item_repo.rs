//! Catalogue item repository.
//!
//! # Responsibility
//! - Fetch items by row id or by natural key (`ProductCode`).
//! - Insert new items, and resolve a storage identity for line items before
//!   they are linked to a document.
//!
//! # Invariants
//! - Write paths call `Item::validate()` before SQL mutations.
//! - `ensure_item` never inserts a second row for an existing product code.

use crate::model::item::{Item, ItemId};
use crate::repo::document_repo::{RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, TableSpec};
use rusqlite::{params, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    ID,
    ProductCode,
    Title,
    UnitPrice,
    Currency
FROM items";

const ITEM_TABLES: &[TableSpec] = &[(
    "items",
    &["ID", "ProductCode", "Title", "UnitPrice", "Currency"],
)];

/// Repository interface for catalogue items.
pub trait ItemRepository {
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn find_item_by_product_code(&self, product_code: &str) -> RepoResult<Option<Item>>;
    /// Inserts a new item and returns its id.
    fn create_item(&self, item: &Item) -> RepoResult<ItemId>;
    /// Returns the stored version of `item`, inserting it first when no row
    /// exists for its id or product code.
    fn ensure_item(&self, item: &Item) -> RepoResult<Item>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, ITEM_TABLES)?;
        Ok(Self { conn })
    }

    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, filter: &str, value: &dyn rusqlite::ToSql) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE {filter};"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.query_one("ID = ?1", &id)
    }

    fn find_item_by_product_code(&self, product_code: &str) -> RepoResult<Option<Item>> {
        self.query_one("ProductCode = ?1", &product_code)
    }

    fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        if let Some(id) = item.id {
            return Err(RepoError::AlreadyPersisted { entity: "item", id });
        }
        item.validate()?;

        self.conn.execute(
            "INSERT INTO items (ProductCode, Title, UnitPrice, Currency)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                item.product_code.as_str(),
                item.title.as_str(),
                item.unit_price,
                item.currency.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn ensure_item(&self, item: &Item) -> RepoResult<Item> {
        if let Some(id) = item.id {
            return self
                .get_item(id)?
                .ok_or(RepoError::NotFound { entity: "item", id });
        }

        if let Some(existing) = self.find_item_by_product_code(&item.product_code)? {
            return Ok(existing);
        }

        let id = self.create_item(item)?;
        Ok(Item {
            id: Some(id),
            ..item.clone()
        })
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let item = Item {
        id: Some(row.get("ID")?),
        product_code: row.get("ProductCode")?,
        title: row.get("Title")?,
        unit_price: row.get("UnitPrice")?,
        currency: row.get("Currency")?,
    };
    item.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "item {} failed validation: {err}",
            item.id.unwrap_or_default()
        ))
    })?;
    Ok(item)
}
