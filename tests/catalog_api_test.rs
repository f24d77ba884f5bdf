// Catalog browsing, CRUD and export through the HTTP surface
use std::sync::Arc;

use actix_web::http::header;
use actix_web::{test, App};
use item_catalog::catalog::{Category, Item};
use item_catalog::testing::mock::FakeIdentityProvider;
use item_catalog::testing::{assert_json_error, assert_redirects_to_login, assert_status, TestFixtures};
use item_catalog::AppServices;
use serde_json::Value;

async fn seeded_services() -> AppServices {
    TestFixtures::services(
        Arc::new(FakeIdentityProvider::new()),
        TestFixtures::seeded_catalog_db().await,
    )
}

fn logged_in(req: test::TestRequest) -> test::TestRequest {
    req.cookie(TestFixtures::session_cookie(&TestFixtures::logged_in_session()))
}

#[actix_web::test]
async fn test_index_lists_categories_and_latest_items() {
    let services = seeded_services().await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);
    assert_eq!(body["latest_items"][0]["title"], "Stick");
    assert_eq!(body["category_names"]["1"], "Soccer");
    assert!(body["username"].is_null());
}

#[actix_web::test]
async fn test_browse_category_and_item() {
    let services = seeded_services().await;
    let soccer = Category::find_by_name(&services.catalog.pool, "Soccer")
        .await
        .unwrap()
        .unwrap();
    let ball = Item::find_by_title(&services.catalog.pool, "Ball")
        .await
        .unwrap()
        .unwrap();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri(&format!("/items/{}", soccer.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["category_name"], "Soccer");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri(&format!("/item/{}", ball.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["item"]["title"], "Ball");
    assert_eq!(body["category_name"], "Soccer");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/items/999").to_request()).await;
    assert_json_error(resp, 404, "not_found").await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/item/999").to_request()).await;
    assert_json_error(resp, 404, "not_found").await;
}

#[actix_web::test]
async fn test_crud_requires_login() {
    let services = seeded_services().await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    for uri in ["/category/create", "/item/create", "/item/edit/1", "/item/delete/1"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_form([("name", "Chess"), ("title", "Board"), ("description", "d"), ("category", "1")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_redirects_to_login(&resp);
    }
    assert!(Item::find_by_id(&services.catalog.pool, 1).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_create_category() {
    let services = seeded_services().await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = logged_in(test::TestRequest::post().uri("/category/create"))
        .set_form([("name", "Chess")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Chess");

    let req = logged_in(test::TestRequest::post().uri("/category/create"))
        .set_form([("name", "Chess")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 409, "duplicate").await;

    let long_name = "x".repeat(31);
    let req = logged_in(test::TestRequest::post().uri("/category/create"))
        .set_form([("name", long_name.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 400, "invalid_field").await;
}

#[actix_web::test]
async fn test_create_item() {
    let services = seeded_services().await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = logged_in(test::TestRequest::post().uri("/item/create"))
        .set_form([("title", "Goal"), ("description", "Two posts and a net"), ("category", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Goal");
    assert_eq!(body["category_id"], 1);

    // Duplicate title
    let req = logged_in(test::TestRequest::post().uri("/item/create"))
        .set_form([("title", "Goal"), ("description", "Again"), ("category", "2")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 409, "duplicate").await;

    // Unknown category
    let req = logged_in(test::TestRequest::post().uri("/item/create"))
        .set_form([("title", "Rook"), ("description", "A chess piece"), ("category", "42")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 400, "invalid_field").await;

    // Missing description
    let req = logged_in(test::TestRequest::post().uri("/item/create"))
        .set_form([("title", "Puck"), ("category", "2")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 400, "invalid_field").await;
}

#[actix_web::test]
async fn test_edit_and_delete_item() {
    let services = seeded_services().await;
    let ball = Item::find_by_title(&services.catalog.pool, "Ball")
        .await
        .unwrap()
        .unwrap();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = logged_in(test::TestRequest::post().uri(&format!("/item/edit/{}", ball.id)))
        .set_form([("title", "Match ball"), ("description", "Size 5"), ("category", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Match ball");
    assert_eq!(body["id"], ball.id);

    // Taking another item's title is a conflict
    let req = logged_in(test::TestRequest::post().uri(&format!("/item/edit/{}", ball.id)))
        .set_form([("title", "Cleats"), ("description", "Size 5"), ("category", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 409, "duplicate").await;

    let req = logged_in(test::TestRequest::post().uri("/item/edit/999"))
        .set_form([("title", "Ghost"), ("description", "Nothing"), ("category", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 404, "not_found").await;

    let req = logged_in(test::TestRequest::post().uri(&format!("/item/delete/{}", ball.id))).to_request();
    let resp = test::call_service(&app, req).await;
    assert_status(&resp, 200);
    assert!(Item::find_by_id(&services.catalog.pool, ball.id).await.unwrap().is_none());

    let req = logged_in(test::TestRequest::post().uri(&format!("/item/delete/{}", ball.id))).to_request();
    let resp = test::call_service(&app, req).await;
    assert_json_error(resp, 404, "not_found").await;
}

#[actix_web::test]
async fn test_catalog_exports() {
    let services = seeded_services().await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/catalog.json").to_request(),
    )
    .await;
    assert_eq!(body["1"]["category-name"], "Soccer");
    assert_eq!(body["1"]["items"].as_object().unwrap().len(), 2);
    assert_eq!(body["2"]["items"]["3"]["title"], "Stick");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/catalog.xml").to_request()).await;
    assert_status(&resp, 200);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/xml");
    let xml = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" ?><root><key name="1" type="dict">"#));
    assert!(xml.contains(r#"<category-name type="str">Hockey</category-name>"#));
    assert!(xml.ends_with("</root>"));
}

#[actix_web::test]
async fn test_health() {
    let services = seeded_services().await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/ping").to_request()).await;
    assert_eq!(body["status"], "ok");
}
