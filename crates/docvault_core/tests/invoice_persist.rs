use docvault_core::db::open_db_in_memory;
use docvault_core::{
    Document, DocumentStatus, InvoiceRecord, InvoiceRepository, Item, ItemRepository,
    ItemValidationError, RepoError, SqliteInvoiceRepository, SqliteItemRepository,
};
use rusqlite::Connection;

#[test]
fn persist_without_lines_assigns_document_and_entry_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();

    let mut invoice = InvoiceRecord::new();
    let entry_id = repo.persist(&mut invoice).unwrap();

    assert_eq!(invoice.entry_id(), Some(entry_id));
    let document_id = invoice.document_id().unwrap();
    assert!(invoice.is_persisted());

    let loaded = repo.load_by_document_id(document_id).unwrap();
    assert_eq!(loaded.entry_id(), Some(entry_id));
    assert!(loaded.items().is_empty());
    assert_eq!(count(&conn, "document_items"), 0);
}

#[test]
fn persist_links_existing_items_with_quantities() {
    let mut conn = open_db_in_memory().unwrap();
    let (widget, gadget) = {
        let items = SqliteItemRepository::try_new(&conn).unwrap();
        let widget = items.ensure_item(&Item::new("W-1", "Widget", 1_000)).unwrap();
        let gadget = items.ensure_item(&Item::new("G-1", "Gadget", 250)).unwrap();
        (widget, gadget)
    };

    let mut invoice = InvoiceRecord::new();
    invoice
        .add_item(widget.clone(), 3)
        .add_single_item(gadget.clone());

    let entry_id = {
        let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
        repo.persist(&mut invoice).unwrap()
    };

    assert_eq!(count(&conn, "items"), 2);
    assert_eq!(
        link_rows(&conn, entry_id),
        vec![
            (entry_id, widget.id.unwrap(), 3),
            (entry_id, gadget.id.unwrap(), 1),
        ]
    );
}

#[test]
fn persist_creates_unknown_items_before_linking_them() {
    let mut conn = open_db_in_memory().unwrap();
    let mut invoice = InvoiceRecord::new();
    invoice.add_item(Item::new("NEW-1", "Fresh item", 700), 2);
    assert!(!invoice.items().rows()[0].item.is_persisted());

    let entry_id = {
        let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
        repo.persist(&mut invoice).unwrap()
    };

    let item_id = invoice.items().rows()[0].item.id.unwrap();
    assert_eq!(link_rows(&conn, entry_id), vec![(entry_id, item_id, 2)]);

    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let stored = items.find_item_by_product_code("NEW-1").unwrap().unwrap();
    assert_eq!(stored.id, Some(item_id));
    assert_eq!(stored.currency, "RON");
}

#[test]
fn persist_reuses_item_found_by_product_code() {
    let mut conn = open_db_in_memory().unwrap();
    let existing_id = SqliteItemRepository::try_new(&conn)
        .unwrap()
        .create_item(&Item::new("SKU-7", "Stored title", 90))
        .unwrap();

    let mut invoice = InvoiceRecord::new();
    invoice.add_item(Item::new("SKU-7", "Caller title", 90), 5);
    {
        let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
        repo.persist(&mut invoice).unwrap();
    }

    assert_eq!(count(&conn, "items"), 1);
    let line = &invoice.items().rows()[0];
    assert_eq!(line.item.id, Some(existing_id));
    assert_eq!(line.item.title, "Stored title");
}

#[test]
fn persist_without_invoice_document_type_fails_without_writes() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute("DELETE FROM document_types WHERE Title = 'Invoice';", [])
        .unwrap();

    let mut invoice = InvoiceRecord::new();
    invoice.add_item(Item::new("SKU-1", "Widget", 10), 1);
    let err = {
        let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
        repo.persist(&mut invoice).unwrap_err()
    };

    assert!(matches!(err, RepoError::DocumentTypeNotFound(ref title) if title == "Invoice"));
    assert_eq!(invoice.document_id(), None);
    assert_eq!(invoice.entry_id(), None);
    for table in ["documents", "invoices", "items", "document_items"] {
        assert_eq!(count(&conn, table), 0, "unexpected rows in {table}");
    }
}

#[test]
fn document_type_lookup_ignores_case() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "UPDATE document_types SET Title = 'INVOICE' WHERE Title = 'Invoice';",
        [],
    )
    .unwrap();

    let mut invoice = InvoiceRecord::new();
    let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
    assert!(repo.persist(&mut invoice).is_ok());
}

#[test]
fn invalid_header_and_lines_are_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();

    let mut bad_header = InvoiceRecord::with_document(Document {
        status: DocumentStatus::Issued,
        ..Document::new()
    });
    let mut zero_quantity = InvoiceRecord::new();
    zero_quantity.add_item(Item::new("SKU-1", "Widget", 10), 0);

    {
        let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
        let header_err = repo.persist(&mut bad_header).unwrap_err();
        assert!(matches!(header_err, RepoError::DocumentInvalid(_)));

        let line_err = repo.persist(&mut zero_quantity).unwrap_err();
        assert!(matches!(
            line_err,
            RepoError::DocumentItemInvalid(ItemValidationError::ZeroQuantity { .. })
        ));
    }

    assert_eq!(count(&conn, "documents"), 0);
    assert_eq!(count(&conn, "items"), 0);
}

#[test]
fn failure_after_first_write_rolls_back_every_row() {
    let mut conn = open_db_in_memory().unwrap();

    let mut ghost = Item::new("GHOST", "Missing row", 1);
    ghost.id = Some(9_999);
    let mut invoice = InvoiceRecord::new();
    invoice
        .add_item(Item::new("SKU-1", "Widget", 10), 1)
        .add_item(ghost, 1);

    let err = {
        let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
        repo.persist(&mut invoice).unwrap_err()
    };

    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "item",
            id: 9_999
        }
    ));
    assert_eq!(invoice.entry_id(), None);
    assert!(invoice.items().rows()[0].item.id.is_none());
    for table in ["documents", "invoices", "items", "document_items"] {
        assert_eq!(count(&conn, table), 0, "unexpected rows in {table}");
    }
}

#[test]
fn dangling_receipt_link_is_a_storage_failure_and_rolls_back() {
    let mut conn = open_db_in_memory().unwrap();
    let mut invoice = InvoiceRecord::new();
    invoice.set_receipt_entry_id(Some(77));

    let err = {
        let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();
        repo.persist(&mut invoice).unwrap_err()
    };

    assert!(err.is_storage_failure());
    assert_eq!(count(&conn, "documents"), 0);
}

#[test]
fn persisting_twice_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteInvoiceRepository::try_new(&mut conn).unwrap();

    let mut invoice = InvoiceRecord::new();
    let entry_id = repo.persist(&mut invoice).unwrap();
    let err = repo.persist(&mut invoice).unwrap_err();

    assert!(matches!(
        err,
        RepoError::AlreadyPersisted { entity: "invoice", id } if id == entry_id
    ));
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn link_rows(conn: &Connection, entry_id: i64) -> Vec<(i64, i64, i64)> {
    let mut stmt = conn
        .prepare(
            "SELECT Invoices_ID, Items_ID, Quantity
             FROM document_items
             WHERE Invoices_ID = ?1
             ORDER BY ID;",
        )
        .unwrap();
    let rows = stmt
        .query_map([entry_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap();
    rows.collect::<Result<Vec<_>, _>>().unwrap()
}
