use docvault_core::api::response::{
    STATUS_DB_EXCEPT, STATUS_DOCUMENT_ITEM_INVALID, STATUS_DOCUMENT_TYPE_NOT_FOUND,
    STATUS_NOT_FOUND,
};
use docvault_core::db::{open_db, open_db_in_memory};
use docvault_core::{invoice_create, invoice_show, ConnectionScope, InvoiceRecord, Item};

#[test]
fn create_then_show_returns_invoice_payload() {
    let mut conn = open_db_in_memory().unwrap();
    let mut invoice = InvoiceRecord::new();
    invoice.add_item(Item::new("SKU-1", "Widget", 450), 2);

    let created = invoice_create(&mut conn, &mut invoice).to_json();
    assert_eq!(created["status"]["ok"], true);
    assert_eq!(created["data"]["documentType"], "invoice");
    let document_id = created["data"]["documentId"].as_i64().unwrap();
    assert_eq!(
        created["data"]["entryId"].as_i64(),
        invoice.entry_id()
    );

    let shown = invoice_show(ConnectionScope::Reuse(&conn), document_id).to_json();
    assert_eq!(shown["status"]["code"], "OK");
    assert_eq!(shown["data"]["documentType"], "invoice");
    let document = &shown["data"]["document"];
    assert_eq!(document["id"], document_id);
    assert_eq!(document["total"], 900);
    assert_eq!(document["items"][0]["productCode"], "SKU-1");
    assert_eq!(document["items"][0]["currency"], "RON");
    assert!(document.get("entryId").is_none());
}

#[test]
fn missing_document_type_maps_to_its_own_status() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute("DELETE FROM document_types WHERE Title = 'Invoice';", [])
        .unwrap();

    let envelope = invoice_create(&mut conn, &mut InvoiceRecord::new());
    assert!(!envelope.is_ok());
    assert_eq!(envelope.status.code, STATUS_DOCUMENT_TYPE_NOT_FOUND);
}

#[test]
fn invalid_line_maps_to_document_item_invalid() {
    let mut conn = open_db_in_memory().unwrap();
    let mut invoice = InvoiceRecord::new();
    invoice.add_item(Item::new("SKU-1", "Widget", 450), 0);

    let envelope = invoice_create(&mut conn, &mut invoice);
    assert_eq!(envelope.status.code, STATUS_DOCUMENT_ITEM_INVALID);
    assert!(envelope.status.message.contains("positive quantity"));
}

#[test]
fn unknown_document_maps_to_not_found() {
    let conn = open_db_in_memory().unwrap();
    let envelope = invoice_show(ConnectionScope::Reuse(&conn), 404);
    assert_eq!(envelope.status.code, STATUS_NOT_FOUND);
    assert!(envelope.data.is_empty());
}

#[test]
fn storage_failure_is_returned_as_db_except() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    }

    let envelope = invoice_show(ConnectionScope::Open(&path), 1);
    assert!(!envelope.is_ok());
    assert_eq!(envelope.status.code, STATUS_DB_EXCEPT);
    assert_eq!(envelope.status.message, "database exception");
}

#[test]
fn show_on_missing_database_file_is_db_except_and_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.sqlite3");

    let envelope = invoice_show(ConnectionScope::Open(&path), 1);
    assert_eq!(envelope.status.code, STATUS_DB_EXCEPT);
    assert!(!path.exists());
}

#[test]
fn show_does_not_migrate_an_outdated_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outdated.sqlite3");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE documents (ID INTEGER PRIMARY KEY);")
            .unwrap();
    }

    let envelope = invoice_show(ConnectionScope::Open(&path), 1);
    assert_eq!(envelope.status.code, STATUS_DB_EXCEPT);

    let conn = rusqlite::Connection::open(&path).unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, 0);
}
