//! Product pages: add, edit, duplicate handling and the detail view.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use stockbook_core::ProductId;
use stockbook_integration_tests::TestApp;
use stockbook_web::db::InventoryStore;

#[tokio::test]
async fn test_add_product_redirects_with_flash_shown_once() {
    let mut app = TestApp::new();

    let resp = app
        .post_form_and_follow(
            "/products/add",
            &[
                ("product_id", " PROD001 "),
                ("name", "Laptop"),
                ("description", "Business laptop"),
            ],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains("Product added successfully!"));
    assert!(resp.contains("PROD001"));
    assert!(resp.contains("Business laptop"));

    // The flash is consumed by the first page that shows it
    let again = app.get("/products").await;
    assert!(!again.contains("Product added successfully!"));

    let stored = app
        .store()
        .get_product(&ProductId::new("PROD001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Laptop");
}

#[tokio::test]
async fn test_duplicate_product_is_rejected_and_original_kept() {
    let mut app = TestApp::with_catalog().await;

    let resp = app
        .post_form(
            "/products/add",
            &[("product_id", "PROD001"), ("name", "Something else")],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains("Product ID already exists!"));

    let stored = app
        .store()
        .get_product(&ProductId::new("PROD001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Laptop");
}

#[tokio::test]
async fn test_blank_fields_are_reported() {
    let mut app = TestApp::new();

    let resp = app
        .post_form("/products/add", &[("product_id", "   "), ("name", "Laptop")])
        .await;
    assert!(resp.contains("Product ID is required"));

    let resp = app
        .post_form("/products/add", &[("product_id", "PROD001"), ("name", "")])
        .await;
    assert!(resp.contains("Product name is required"));

    assert!(app.store().list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_identifier_with_path_characters_is_rejected() {
    let mut app = TestApp::new();

    for raw in ["P/1", "P?1", "P#1"] {
        let resp = app
            .post_form("/products/add", &[("product_id", raw), ("name", "Laptop")])
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(
            resp.contains("Product ID may only contain letters, digits, hyphens and underscores")
        );
    }

    assert!(app.store().list_products().await.unwrap().is_empty());

    // Accepted codes round-trip through their detail link
    app.post_form("/products/add", &[("product_id", "P-1_a"), ("name", "Laptop")])
        .await;
    assert_eq!(app.store().list_products().await.unwrap().len(), 1);
    let view = app.get("/products/view/P-1_a").await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.contains("Laptop"));
}

#[tokio::test]
async fn test_edit_product_keeps_identifier() {
    let mut app = TestApp::with_catalog().await;

    let form = app.get("/products/edit/PROD002").await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.contains(r#"value="Monitor""#));

    let resp = app
        .post_form_and_follow(
            "/products/edit/PROD002",
            &[("name", "Monitor 27in"), ("description", "")],
        )
        .await;
    assert!(resp.contains("Product updated successfully!"));

    let stored = app
        .store()
        .get_product(&ProductId::new("PROD002"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Monitor 27in");
    assert_eq!(stored.description, None);
}

#[tokio::test]
async fn test_edit_with_blank_name_redisplays_form() {
    let mut app = TestApp::with_catalog().await;

    let resp = app
        .post_form("/products/edit/PROD001", &[("name", "  ")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains("Product name is required"));
    assert!(resp.contains(r#"value="Laptop""#));
}

#[tokio::test]
async fn test_edit_unknown_product_is_not_found() {
    let mut app = TestApp::new();

    let resp = app
        .post_form("/products/edit/PROD404", &[("name", "Ghost")])
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_view_lists_its_movements() {
    let (mut app, _) = TestApp::seeded().await;

    let resp = app.get("/products/view/PROD003").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains("Monitor"));
    for id in ["MOV003", "MOV007", "MOV011", "MOV015", "MOV019"] {
        assert!(resp.contains(id), "missing {id}");
    }
    assert!(!resp.contains("MOV001"));
}
