mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{get, post, register_and_login, send, test_app};

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn register_login_and_me() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, body) = get(&app, "/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "other@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_with_email_and_wrong_password() {
    let app = test_app().await;
    register_and_login(&app, "bob").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "bob@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "bob", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_and_bad_tokens() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/records", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = get(&app, "/api/records", "not-a-jwt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn refresh_issues_new_tokens() {
    let app = test_app().await;
    register_and_login(&app, "carol").await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "carol", "password": "secret123" })),
    )
    .await;
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();
    let access = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());

    // an access token is not accepted as a refresh token
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/refresh",
        None,
        Some(json!({ "refresh_token": access })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn records_and_statistics() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, body) = get(&app, "/api/categories/type/income", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);

    for (kind, category, amount, date) in [
        ("income", 1, 5000.0, "2024-01-05"),
        ("expense", 5, 30.5, "2024-01-05"),
        ("expense", 5, 19.5, "2024-01-06"),
        ("expense", 6, 50.0, "2024-02-01"),
    ] {
        let (status, body) = post(
            &app,
            "/api/records",
            &token,
            json!({ "type": kind, "category_id": category, "amount": amount, "record_date": date }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert!(body["data"]["id"].as_i64().unwrap() > 0);
    }

    let (status, body) = get(
        &app,
        "/api/records/statistics?start_date=2024-01-01&end_date=2024-01-31",
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["income"], 5000.0);
    assert_eq!(body["data"]["expense"], 50.0);
    assert_eq!(body["data"]["balance"], 4950.0);
    assert_eq!(body["data"]["expenseCount"], 2);

    let (_, body) = get(
        &app,
        "/api/records/statistics/categories?type=expense",
        &token,
    )
    .await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["total"], 50.0);
    assert_eq!(rows[0]["percentage"], 50.0);

    let (_, body) = get(&app, "/api/records?type=expense&limit=1", &token).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["record_date"], "2024-02-01");
}

#[tokio::test]
async fn record_category_must_match_type() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, body) = post(
        &app,
        "/api/records",
        &token,
        json!({ "type": "income", "category_id": 5, "amount": 10, "record_date": "2024-01-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = post(
        &app,
        "/api/records",
        &token,
        json!({ "type": "expense", "category_id": 5, "amount": 0, "record_date": "2024-01-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn records_are_private() {
    let app = test_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let (_, body) = post(
        &app,
        "/api/records",
        &alice,
        json!({ "type": "expense", "category_id": 7, "amount": 99, "record_date": "2024-03-01" }),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = get(&app, &format!("/api/records/{id}"), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/records/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, &format!("/api/records/{id}"), &alice).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn used_category_cannot_be_deleted() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, body) = post(
        &app,
        "/api/categories",
        &token,
        json!({ "name": "Pets", "type": "expense" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category = body["data"]["id"].as_i64().unwrap();

    post(
        &app,
        "/api/records",
        &token,
        json!({ "type": "expense", "category_id": category, "amount": 12, "record_date": "2024-01-02" }),
    )
    .await;

    let uri = format!("/api/categories/{category}");
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // shared categories are read-only
    let (status, _) = send(&app, Method::DELETE, "/api/categories/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_type_is_locked_by_records() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (_, body) = post(&app, "/api/categories", &token, json!({ "name": "Gig", "type": "income" })).await;
    let category = body["data"]["id"].as_i64().unwrap();
    let (status, _) = post(
        &app,
        "/api/records",
        &token,
        json!({ "type": "income", "category_id": category, "amount": 80, "record_date": "2024-04-02" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/categories/{category}");
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "name": "Gig", "type": "expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = get(&app, "/api/records", &token).await;
    assert_eq!(body["data"][0]["category_type"], "income");
}

#[tokio::test]
async fn mahjong_daily_breakdown_runs_forward_in_time() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    for day in ["2024-01-01", "2024-01-03", "2024-01-02"] {
        let (status, body) = post(
            &app,
            "/api/mahjong",
            &token,
            json!({ "game_date": day, "players": [], "scores": [], "win_amount": 10 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = get(&app, "/api/mahjong/statistics/daily", &token).await;
    assert_eq!(status, StatusCode::OK);
    let days: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(days, ["2024-01-01", "2024-01-02", "2024-01-03"]);
}

#[tokio::test]
async fn mahjong_sessions() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, _) = post(
        &app,
        "/api/mahjong",
        &token,
        json!({
            "game_date": "2024-01-10",
            "players": ["A", "B", "C", "D"],
            "scores": [10, -5, -5],
            "win_amount": 100,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &app,
        "/api/mahjong",
        &token,
        json!({
            "game_date": "2024-01-10",
            "game_time": "19:30",
            "players": ["A", "B", "C", "D"],
            "scores": [30, -10, -10, -10],
            "win_amount": 100,
            "table_fee": 20,
            "game_type": "sichuan",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_i64().unwrap();

    post(
        &app,
        "/api/mahjong",
        &token,
        json!({
            "game_date": "2024-01-11",
            "players": ["A", "E"],
            "scores": ["-40", 40],
            "win_amount": -40,
            "taxi_fee": "15",
        }),
    )
    .await;

    let (_, body) = get(&app, &format!("/api/mahjong/{id}"), &token).await;
    assert_eq!(body["data"]["players"], json!(["A", "B", "C", "D"]));
    assert_eq!(body["data"]["net_amount"], 80.0);

    let (status, body) = get(&app, "/api/mahjong/statistics", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_games"], 2);
    assert_eq!(body["data"]["win_games"], 1);
    assert_eq!(body["data"]["lose_games"], 1);
    assert_eq!(body["data"]["total_amount"], 60.0);
    assert_eq!(body["data"]["total_fees"], 35.0);

    let (_, body) = get(&app, "/api/mahjong?result_type=lose", &token).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn gift_ledger_balances() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    for (direction, amount, date) in [
        ("giving", 500, "2024-05-01"),
        ("receiving", 800, "2024-09-01"),
    ] {
        let (status, body) = post(
            &app,
            "/api/gifts",
            &token,
            json!({
                "gift_type": direction,
                "name": "Uncle Wang",
                "event_type": "wedding",
                "amount": amount,
                "event_date": date,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = get(&app, "/api/gifts/statistics/names", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Uncle Wang");
    assert_eq!(body["data"][0]["balance"], 300.0);
}

#[tokio::test]
async fn shopping_defaults_and_batch_status() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let mut ids = Vec::new();
    for name in ["rings", "candy", "wine"] {
        let (status, body) = post(
            &app,
            "/api/shopping",
            &token,
            json!({ "item_name": name, "category": "wedding", "amount": 100 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (_, body) = get(&app, &format!("/api/shopping/{}", ids[0]), &token).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["priority"], 2);
    assert_eq!(body["data"]["quantity"], 1);
    assert_eq!(body["data"]["unit"], "piece");
    assert!(body["data"]["purchase_date"].is_null());

    let (status, body) = post(
        &app,
        "/api/shopping/batch/status",
        &token,
        json!({ "ids": [ids[0], ids[1], 9999], "status": "purchased" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, body) = get(&app, &format!("/api/shopping/{}", ids[0]), &token).await;
    assert_eq!(body["data"]["status"], "purchased");
    assert!(body["data"]["purchase_date"].is_string());

    let (_, body) = get(&app, "/api/shopping/statistics", &token).await;
    assert_eq!(body["data"]["total_items"], 3);
    assert_eq!(body["data"]["purchased_count"], 2);
    assert_eq!(body["data"]["total_spent"], 200.0);
    assert_eq!(body["data"]["pending_amount"], 100.0);

    let (status, _) = post(&app, "/api/shopping/batch/delete", &token, json!({ "ids": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
