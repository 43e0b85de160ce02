//! Recording and amending movements through the forms.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use stockbook_core::{LocationId, MovementId, MovementKind};
use stockbook_integration_tests::TestApp;
use stockbook_web::db::InventoryStore;

fn movement<'a>(
    id: &'a str,
    product: &'a str,
    from: &'a str,
    to: &'a str,
    qty: &'a str,
) -> [(&'static str, &'a str); 5] {
    [
        ("movement_id", id),
        ("product_id", product),
        ("from_location", from),
        ("to_location", to),
        ("qty", qty),
    ]
}

#[tokio::test]
async fn test_stock_in_is_recorded_and_announced() {
    let mut app = TestApp::with_catalog().await;

    let resp = app
        .post_form_and_follow("/movements/add", &movement("MOV001", "PROD001", "", "WH001", "50"))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains("Stock In movement added successfully!"));
    assert!(resp.contains("MOV001"));

    let stored = app
        .store()
        .get_movement(&MovementId::new("MOV001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.kind(), MovementKind::StockIn);
    assert_eq!(stored.from_location, None);
    assert_eq!(stored.to_location, Some(LocationId::new("WH001")));
    assert_eq!(stored.qty, 50);
}

#[tokio::test]
async fn test_transfer_and_stock_out_messages() {
    let mut app = TestApp::with_catalog().await;
    app.post_form("/movements/add", &movement("MOV001", "PROD001", "", "WH001", "50"))
        .await;

    let resp = app
        .post_form_and_follow(
            "/movements/add",
            &movement("MOV002", "PROD001", "WH001", "STORE01", "10"),
        )
        .await;
    assert!(resp.contains("Transfer movement added successfully!"));

    let resp = app
        .post_form_and_follow(
            "/movements/add",
            &movement("MOV003", "PROD001", "STORE01", "", "3"),
        )
        .await;
    assert!(resp.contains("Stock Out movement added successfully!"));
}

#[tokio::test]
async fn test_every_violated_rule_is_reported() {
    let mut app = TestApp::with_catalog().await;

    let resp = app
        .post_form("/movements/add", &movement("MOV001", "PROD001", "", "", "0"))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains("At least one location (from or to) must be specified"));
    assert!(resp.contains("Quantity must be greater than 0"));
    assert!(app.store().list_movements().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_same_location_is_rejected() {
    let mut app = TestApp::with_catalog().await;

    let resp = app
        .post_form(
            "/movements/add",
            &movement("MOV001", "PROD001", "WH001", "WH001", "5"),
        )
        .await;

    assert!(resp.contains("Cannot move from and to the same location"));
    assert!(app.store().list_movements().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_quantity_is_rejected() {
    let mut app = TestApp::with_catalog().await;

    for qty in ["abc", "2.5", ""] {
        let resp = app
            .post_form("/movements/add", &movement("MOV001", "PROD001", "", "WH001", qty))
            .await;
        assert!(resp.contains("Quantity must be a valid number!"), "qty {qty:?}");
    }
    assert!(app.store().list_movements().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_reference_is_rejected() {
    let mut app = TestApp::with_catalog().await;

    let resp = app
        .post_form("/movements/add", &movement("MOV001", "PROD001", "", "WH999", "5"))
        .await;
    assert!(resp.contains("Unknown product or location referenced"));

    let resp = app
        .post_form("/movements/add", &movement("MOV001", "PROD999", "", "WH001", "5"))
        .await;
    assert!(resp.contains("Unknown product or location referenced"));

    assert!(app.store().list_movements().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_movement_id_is_rejected() {
    let mut app = TestApp::with_catalog().await;
    app.post_form("/movements/add", &movement("MOV001", "PROD001", "", "WH001", "50"))
        .await;

    let resp = app
        .post_form("/movements/add", &movement("MOV001", "PROD002", "", "WH002", "7"))
        .await;
    assert!(resp.contains("Movement ID already exists!"));

    let stored = app
        .store()
        .get_movement(&MovementId::new("MOV001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.qty, 50);
}

#[tokio::test]
async fn test_invalid_edit_leaves_movement_unchanged() {
    let mut app = TestApp::with_catalog().await;
    app.post_form("/movements/add", &movement("MOV001", "PROD001", "", "WH001", "50"))
        .await;
    let before = app
        .store()
        .get_movement(&MovementId::new("MOV001"))
        .await
        .unwrap()
        .unwrap();

    let resp = app
        .post_form(
            "/movements/edit/MOV001",
            &[
                ("product_id", "PROD001"),
                ("from_location", "WH002"),
                ("to_location", "WH002"),
                ("qty", "-4"),
            ],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains("Quantity must be greater than 0"));
    assert!(resp.contains("Cannot move from and to the same location"));
    // The form shows the stored quantity, not the rejected one
    assert!(resp.contains(r#"value="50""#));

    let after = app
        .store()
        .get_movement(&MovementId::new("MOV001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_edit_changes_kind_but_keeps_id_and_timestamp() {
    let mut app = TestApp::with_catalog().await;
    app.post_form("/movements/add", &movement("MOV001", "PROD001", "", "WH001", "50"))
        .await;
    let before = app
        .store()
        .get_movement(&MovementId::new("MOV001"))
        .await
        .unwrap()
        .unwrap();

    let resp = app
        .post_form_and_follow(
            "/movements/edit/MOV001",
            &[
                ("product_id", "PROD002"),
                ("from_location", "WH001"),
                ("to_location", "STORE01"),
                ("qty", "12"),
            ],
        )
        .await;
    assert!(resp.contains("Transfer movement updated successfully!"));

    let after = app
        .store()
        .get_movement(&MovementId::new("MOV001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.timestamp, before.timestamp);
    assert_eq!(after.kind(), MovementKind::Transfer);
    assert_eq!(after.qty, 12);
    assert_eq!(after.product_id.as_str(), "PROD002");
}

#[tokio::test]
async fn test_edit_form_preselects_stored_values() {
    let (mut app, _) = TestApp::seeded().await;

    let resp = app.get("/movements/edit/MOV009").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains(r#"<option value="PROD001" selected>"#));
    assert!(resp.contains(r#"<option value="WH001" selected>"#));
    assert!(resp.contains(r#"<option value="STORE01" selected>"#));
    assert!(resp.contains(r#"value="10""#));
}

#[tokio::test]
async fn test_movement_list_is_newest_first() {
    let (mut app, _) = TestApp::seeded().await;
    let movements = app.store().list_movements().await.unwrap();

    let resp = app.get("/movements").await;

    let positions: Vec<usize> = movements
        .iter()
        .map(|m| resp.body.find(&format!(">{}</a>", m.id)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(
        movements
            .windows(2)
            .all(|w| w[0].timestamp >= w[1].timestamp)
    );
}
