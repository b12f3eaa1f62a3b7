use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, password) in [("alice", "password"), ("bob", "hunter2")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), password.into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::app(engine, db)
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn request(method: &str, uri: &str, user: (&str, &str), body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user.0, user.1));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

const ALICE: (&str, &str) = ("alice", "password");
const BOB: (&str, &str) = ("bob", "hunter2");

async fn create_farm(app: &Router, name: &str, crop_type: &str) -> String {
    create_farm_with_area(app, name, crop_type, 2.0).await
}

async fn create_farm_with_area(app: &Router, name: &str, crop_type: &str, area: f64) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/farms",
            ALICE,
            Some(json!({ "farm_name": name, "village": "Rampur", "crop_type": crop_type, "season": "Rabi", "area": area })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_unauthorized() {
    let app = app().await;

    let req = Request::builder()
        .uri("/farms")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request("GET", "/farms", ("alice", "wrong"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request("GET", "/farms", ("ali", "password"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn farm_lifecycle() {
    let app = app().await;
    let farm_id = create_farm(&app, "North Field", "Wheat").await;

    let (status, body) = send(&app, request("GET", &format!("/farms/{farm_id}"), ALICE, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["farm_name"], "North Field");
    assert_eq!(body["crop_category"], "Cereals");

    let (status, body) = send(
        &app,
        request(
            "PATCH",
            &format!("/farms/{farm_id}"),
            ALICE,
            Some(json!({ "village": "Sitapur" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["village"], "Sitapur");
    assert_eq!(body["farm_name"], "North Field");

    let (status, _) = send(&app, request("DELETE", &format!("/farms/{farm_id}"), ALICE, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, request("GET", &format!("/farms/{farm_id}"), ALICE, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], server::FARMS_FETCH_FAILED);
}

#[tokio::test]
async fn invalid_farm_is_unprocessable() {
    let app = app().await;

    let (status, body) = send(
        &app,
        request("POST", "/farms", ALICE, Some(json!({ "farm_name": "  " }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn farm_list_is_filtered_and_sorted() {
    let app = app().await;
    create_farm(&app, "Mango Grove", "Mango").await;
    create_farm(&app, "b field", "Wheat").await;
    create_farm(&app, "A field", "Rice").await;

    let (status, body) = send(&app, request("GET", "/farms", ALICE, None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["farms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|farm| farm["farm_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A field", "b field", "Mango Grove"]);

    let (_, body) = send(
        &app,
        request("GET", "/farms?crop_category=Cereals&search=FIELD", ALICE, None),
    )
    .await;
    assert_eq!(body["farms"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, request("GET", "/farms", BOB, None)).await;
    assert!(body["farms"].as_array().unwrap().is_empty());
}

fn farm_names(body: &Value) -> Vec<&str> {
    body["farms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|farm| farm["farm_name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn farm_list_orders_by_creation_or_area() {
    let app = app().await;
    create_farm_with_area(&app, "Mango Grove", "Mango", 5.0).await;
    create_farm_with_area(&app, "b field", "Wheat", 1.0).await;
    create_farm_with_area(&app, "A field", "Rice", 3.0).await;

    let (status, body) = send(&app, request("GET", "/farms?sort_by=created_at", ALICE, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(farm_names(&body), vec!["Mango Grove", "b field", "A field"]);

    let (_, body) = send(&app, request("GET", "/farms?sort_by=area", ALICE, None)).await;
    assert_eq!(farm_names(&body), vec!["b field", "A field", "Mango Grove"]);

    let (_, body) = send(&app, request("GET", "/farms?sort_by=totalArea", ALICE, None)).await;
    assert_eq!(farm_names(&body), vec!["b field", "A field", "Mango Grove"]);
}

#[tokio::test]
async fn farm_area_can_be_cleared() {
    let app = app().await;
    let farm_id = create_farm(&app, "North", "Wheat").await;
    let uri = format!("/farms/{farm_id}");

    let (_, body) = send(&app, request("PATCH", &uri, ALICE, Some(json!({ "area": 7.5 })))).await;
    assert_eq!(body["area"], 7.5);

    let (status, body) = send(
        &app,
        request("PATCH", &uri, ALICE, Some(json!({ "clear_area": true }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"], Value::Null);
    assert_eq!(body["farm_name"], "North");
}

#[tokio::test]
async fn expenses_are_filtered_with_summary() {
    let app = app().await;
    let farm_id = create_farm(&app, "North", "Wheat").await;
    let uri = format!("/farms/{farm_id}/expenses");

    for (amount, category, status, date) in [
        (10_000, "Seeds", "Paid", "2024-03-01T09:00:00+05:30"),
        (2_500, "Fertilizer", "Pending", "2024-03-05T09:00:00+05:30"),
        (5_000, "Seeds", "Pending", "2024-03-10T09:00:00+05:30"),
    ] {
        let (code, _) = send(
            &app,
            request(
                "POST",
                &uri,
                ALICE,
                Some(json!({
                    "amount_minor": amount,
                    "category": category,
                    "payment_status": status,
                    "date": date,
                })),
            ),
        )
        .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, body) = send(&app, request("GET", &format!("{uri}?category=Seeds"), ALICE, None)).await;
    assert_eq!(status, StatusCode::OK);
    let amounts: Vec<i64> = body["expenses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["amount_minor"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, vec![5_000, 10_000]);
    assert_eq!(body["summary"]["count"], 2);
    assert_eq!(body["summary"]["total_minor"], 15_000);
    assert_eq!(body["summary"]["paid_minor"], 10_000);
    assert_eq!(body["summary"]["pending_minor"], 5_000);
    assert_eq!(body["expenses"][0]["farm_name"], "North");

    let (_, body) = send(
        &app,
        request(
            "GET",
            &format!("{uri}?from_date=2024-03-05&to_date=2024-03-10&sort_by=amount"),
            ALICE,
            None,
        ),
    )
    .await;
    let amounts: Vec<i64> = body["expenses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["amount_minor"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, vec![5_000, 2_500]);

    let (status, _) = send(&app, request("GET", &format!("{uri}?from_date=yesterday"), ALICE, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expense_update_and_delete() {
    let app = app().await;
    let farm_id = create_farm(&app, "North", "Wheat").await;
    let (_, created) = send(
        &app,
        request(
            "POST",
            &format!("/farms/{farm_id}/expenses"),
            ALICE,
            Some(json!({
                "amount_minor": 1_000,
                "category": "Labour",
                "date": "2024-03-01T00:00:00Z",
                "description": "weeding",
            })),
        ),
    )
    .await;
    assert_eq!(created["payment_status"], "Pending");
    let uri = format!("/farms/{farm_id}/expenses/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        request(
            "PATCH",
            &uri,
            ALICE,
            Some(json!({ "payment_status": "Paid", "description": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment_status"], "Paid");
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["amount_minor"], 1_000);

    let (status, _) = send(&app, request("DELETE", &uri, ALICE, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("DELETE", &uri, ALICE, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_amount_is_unprocessable() {
    let app = app().await;
    let farm_id = create_farm(&app, "North", "Wheat").await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/farms/{farm_id}/expenses"),
            ALICE,
            Some(json!({ "amount_minor": -5, "category": "Seeds", "date": "2024-03-01T00:00:00Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expenses_of_unknown_farm_report_the_banner() {
    let app = app().await;

    let (status, body) = send(&app, request("GET", "/farms/nope/expenses", ALICE, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], server::EXPENSES_FETCH_FAILED);
}

#[tokio::test]
async fn dashboard_aggregates_every_farm() {
    let app = app().await;
    let north = create_farm(&app, "North", "Wheat").await;
    let south = create_farm(&app, "South", "Rice").await;
    for (farm, amount, status, date) in [
        (&north, 10_000, "Paid", "2024-03-01T00:00:00Z"),
        (&south, 5_000, "Pending", "2024-03-02T00:00:00Z"),
    ] {
        send(
            &app,
            request(
                "POST",
                &format!("/farms/{farm}/expenses"),
                ALICE,
                Some(json!({
                    "amount_minor": amount,
                    "category": "Seeds",
                    "payment_status": status,
                    "date": date,
                })),
            ),
        )
        .await;
    }

    let (status, body) = send(&app, request("GET", "/dashboard", ALICE, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total_farms"], 2);
    assert_eq!(body["stats"]["total_expenses_minor"], 15_000);
    assert_eq!(body["stats"]["paid_amount_minor"], 10_000);
    assert_eq!(body["stats"]["pending_amount_minor"], 5_000);
    assert_eq!(body["recent_expenses"][0]["farm_name"], "South");
    assert_eq!(body["recent_expenses"][1]["farm_name"], "North");

    let (_, body) = send(&app, request("GET", "/dashboard", BOB, None)).await;
    assert_eq!(body["stats"]["total_farms"], 0);
    assert!(body["recent_expenses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn crops_catalogue_is_served() {
    let app = app().await;

    let (status, body) = send(&app, request("GET", "/crops", ALICE, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seasons"], json!(["Kharif", "Rabi", "Zaid", "Perennial"]));
    assert_eq!(body["categories"][0]["name"], "Cereals");
}
