use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_cart_add_and_remove_flow() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone()).await;

    let ids = common::seed_ingredients(&pool, &[("salt", "g")]).await;
    let (_, token) =
        common::register_and_login(&app, "alice@example.com", "alice", "password123").await;
    let recipe =
        common::create_recipe(&app, &token, "Soup", vec![json!({ "id": ids[0], "amount": 1 })]).await;

    let uri = format!("/api/recipes/{recipe}/shopping_cart");

    let response = common::request(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    assert_eq!(body["id"], recipe);
    assert_eq!(body["is_in_shopping_cart"], true);

    // Duplicate add rejected
    let response = common::request(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = common::request(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Removing a recipe that is not in the cart rejected
    let response = common::request(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_add_unknown_recipe_returns_not_found() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool).await;

    let (_, token) =
        common::register_and_login(&app, "alice@example.com", "alice", "password123").await;

    let response = common::request(
        &app,
        "POST",
        "/api/recipes/nope/shopping_cart",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_listing_is_per_user() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone()).await;

    let ids = common::seed_ingredients(&pool, &[("salt", "g")]).await;
    let (_, alice_token) =
        common::register_and_login(&app, "alice@example.com", "alice", "password123").await;
    let (_, bob_token) =
        common::register_and_login(&app, "bob@example.com", "bob", "password123").await;

    let recipe = common::create_recipe(
        &app,
        &alice_token,
        "Soup",
        vec![json!({ "id": ids[0], "amount": 1 })],
    )
    .await;

    common::request(
        &app,
        "POST",
        &format!("/api/recipes/{recipe}/shopping_cart"),
        Some(&alice_token),
        None,
    )
    .await;

    let response = common::request(
        &app,
        "GET",
        "/api/recipes/shopping_cart",
        Some(&alice_token),
        None,
    )
    .await;
    let body = common::body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Soup");

    let response = common::request(
        &app,
        "GET",
        "/api/recipes/shopping_cart",
        Some(&bob_token),
        None,
    )
    .await;
    let body = common::body_json(response).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_download_aggregates_across_recipes() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone()).await;

    let ids =
        common::seed_ingredients(&pool, &[("flour", "g"), ("sugar", "g"), ("milk", "ml")]).await;
    let (_, token) =
        common::register_and_login(&app, "alice@example.com", "alice", "password123").await;

    let pancakes = common::create_recipe(
        &app,
        &token,
        "Pancakes",
        vec![
            json!({ "id": ids[0], "amount": 200 }),
            json!({ "id": ids[1], "amount": 50 }),
        ],
    )
    .await;
    let bread = common::create_recipe(
        &app,
        &token,
        "Bread",
        vec![
            json!({ "id": ids[0], "amount": 100 }),
            json!({ "id": ids[2], "amount": 150 }),
        ],
    )
    .await;

    for recipe in [&pancakes, &bread] {
        let response = common::request(
            &app,
            "POST",
            &format!("/api/recipes/{recipe}/shopping_cart"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = common::request(
        &app,
        "GET",
        "/api/recipes/download_shopping_cart",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"shopping_list.txt\""
    );

    let text = common::body_text(response).await;
    // Shared flour is summed, the rest pass through, names ascend
    assert_eq!(
        text,
        "Shopping list for alice\n\nflour (g) — 300\nmilk (ml) — 150\nsugar (g) — 50\n"
    );
}

#[tokio::test]
async fn test_download_empty_cart_is_header_only() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool).await;

    let (_, token) =
        common::register_and_login(&app, "bob@example.com", "bob", "password123").await;

    let response = common::request(
        &app,
        "GET",
        "/api/recipes/download_shopping_cart",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let text = common::body_text(response).await;
    assert_eq!(text, "Shopping list for bob\n\n");
}

#[tokio::test]
async fn test_download_requires_auth() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool).await;

    let response = common::request(
        &app,
        "GET",
        "/api/recipes/download_shopping_cart",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_removing_recipe_from_cart_updates_download() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone()).await;

    let ids = common::seed_ingredients(&pool, &[("flour", "g")]).await;
    let (_, token) =
        common::register_and_login(&app, "alice@example.com", "alice", "password123").await;

    let a = common::create_recipe(&app, &token, "A", vec![json!({ "id": ids[0], "amount": 200 })])
        .await;
    let b = common::create_recipe(&app, &token, "B", vec![json!({ "id": ids[0], "amount": 100 })])
        .await;

    for recipe in [&a, &b] {
        common::request(
            &app,
            "POST",
            &format!("/api/recipes/{recipe}/shopping_cart"),
            Some(&token),
            None,
        )
        .await;
    }

    common::request(
        &app,
        "DELETE",
        &format!("/api/recipes/{b}/shopping_cart"),
        Some(&token),
        None,
    )
    .await;

    let response = common::request(
        &app,
        "GET",
        "/api/recipes/download_shopping_cart",
        Some(&token),
        None,
    )
    .await;
    let text = common::body_text(response).await;
    assert_eq!(text, "Shopping list for alice\n\nflour (g) — 200\n");
}
