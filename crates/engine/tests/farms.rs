use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::json;

use engine::{
    Engine, EngineError, ExpenseCategory, FarmSortBy, FarmUpdate, Money, NewExpense, NewFarm,
    PaymentStatus, sort_farms,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn insert_raw(db: &DatabaseConnection, collection: &str, id: &str, data: serde_json::Value) {
    let backend = db.get_database_backend();
    let now = Utc::now();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        vec![
            collection.into(),
            id.into(),
            data.into(),
            now.into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
}

async fn count_documents(db: &DatabaseConnection, collection: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS n FROM documents WHERE collection = ?",
            vec![collection.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

fn wheat_farm(name: &str) -> NewFarm {
    NewFarm {
        name: name.to_string(),
        village: "Rampur".to_string(),
        crop_type: "Wheat".to_string(),
        season: "Rabi".to_string(),
        area: Some(2.5),
    }
}

fn seeds(amount: i64, status: PaymentStatus) -> NewExpense {
    NewExpense {
        amount: Money::new(amount),
        category: ExpenseCategory::Seeds,
        payment_status: status,
        date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        description: None,
    }
}

#[tokio::test]
async fn new_farm_is_listed_with_trimmed_name() {
    let (engine, _db) = engine_with_db().await;

    let farm = engine
        .new_farm(&wheat_farm("  North Field  "), "alice")
        .await
        .unwrap();
    assert_eq!(farm.name, "North Field");
    assert_eq!(farm.crop_category(), Some("Cereals"));

    let farms = engine.list_farms("alice").await.unwrap();
    assert_eq!(farms, vec![farm]);
}

#[tokio::test]
async fn new_farm_rejects_empty_name_and_negative_area() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.new_farm(&wheat_farm("   "), "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let mut input = wheat_farm("North");
    input.area = Some(-1.0);
    let err = engine.new_farm(&input, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidValue(_)));

    assert!(engine.list_farms("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_farm_changes_only_given_fields() {
    let (engine, _db) = engine_with_db().await;
    let farm = engine.new_farm(&wheat_farm("North"), "alice").await.unwrap();

    let updated = engine
        .update_farm(
            &farm.id,
            &FarmUpdate {
                season: Some("Kharif".to_string()),
                area: Some(Some(4.0)),
                ..FarmUpdate::default()
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "North");
    assert_eq!(updated.village, "Rampur");
    assert_eq!(updated.season, "Kharif");
    assert_eq!(updated.area, Some(4.0));
    assert_eq!(updated.created_at, farm.created_at);
    assert_eq!(engine.farm(&farm.id, "alice").await.unwrap(), updated);
}

#[tokio::test]
async fn update_farm_can_clear_the_area() {
    let (engine, _db) = engine_with_db().await;
    let farm = engine.new_farm(&wheat_farm("North"), "alice").await.unwrap();
    assert_eq!(farm.area, Some(2.5));

    let kept = engine
        .update_farm(&farm.id, &FarmUpdate::default(), "alice")
        .await
        .unwrap();
    assert_eq!(kept.area, Some(2.5));

    let cleared = engine
        .update_farm(
            &farm.id,
            &FarmUpdate {
                area: Some(None),
                ..FarmUpdate::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(cleared.area, None);
    assert_eq!(engine.farm(&farm.id, "alice").await.unwrap().area, None);
}

#[tokio::test]
async fn unknown_farm_is_key_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.farm("missing", "alice").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("farm not exists".to_string()));

    let err = engine.delete_farm("missing", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine.list_expenses("missing", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn farms_are_scoped_by_user() {
    let (engine, _db) = engine_with_db().await;
    let farm = engine.new_farm(&wheat_farm("North"), "alice").await.unwrap();

    assert!(engine.list_farms("bob").await.unwrap().is_empty());
    let err = engine.farm(&farm.id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .new_expense(&farm.id, &seeds(100, PaymentStatus::Paid), "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn invalid_user_id_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.list_farms("a/b").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidId(_)));
}

#[tokio::test]
async fn delete_farm_removes_its_expenses() {
    let (engine, db) = engine_with_db().await;
    let farm = engine.new_farm(&wheat_farm("North"), "alice").await.unwrap();
    let other = engine.new_farm(&wheat_farm("South"), "alice").await.unwrap();
    engine
        .new_expense(&farm.id, &seeds(100, PaymentStatus::Paid), "alice")
        .await
        .unwrap();
    engine
        .new_expense(&farm.id, &seeds(50, PaymentStatus::Pending), "alice")
        .await
        .unwrap();
    engine
        .new_expense(&other.id, &seeds(70, PaymentStatus::Pending), "alice")
        .await
        .unwrap();

    engine.delete_farm(&farm.id, "alice").await.unwrap();

    let farms = engine.list_farms("alice").await.unwrap();
    assert_eq!(farms, vec![other.clone()]);
    let collection = format!("users/alice/farms/{}/expenses", farm.id);
    assert_eq!(count_documents(&db, &collection).await, 0);
    assert_eq!(engine.list_expenses(&other.id, "alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_farm_documents_are_skipped() {
    let (engine, db) = engine_with_db().await;
    let farm = engine.new_farm(&wheat_farm("North"), "alice").await.unwrap();

    insert_raw(&db, "users/alice/farms", "noname", json!({ "village": "X" })).await;
    insert_raw(
        &db,
        "users/alice/farms",
        "badarea",
        json!({ "farmName": "Broken", "area": "lots" }),
    )
    .await;
    insert_raw(&db, "users/alice/farms", "notobject", json!([1, 2, 3])).await;

    let farms = engine.list_farms("alice").await.unwrap();
    assert_eq!(farms, vec![farm]);
}

#[tokio::test]
async fn stored_area_as_text_is_accepted() {
    let (engine, db) = engine_with_db().await;
    insert_raw(
        &db,
        "users/alice/farms",
        "legacy",
        json!({
            "farmName": "Legacy",
            "cropType": "Cotton",
            "area": "3.5",
            "createdAt": { "seconds": 1_700_000_000, "nanoseconds": 0 }
        }),
    )
    .await;

    let farm = engine.farm("legacy", "alice").await.unwrap();
    assert_eq!(farm.area, Some(3.5));
    assert_eq!(farm.crop_category(), Some("Cash Crops"));
    assert_eq!(farm.created_at, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    assert_eq!(farm.village, "");
}

#[tokio::test]
async fn stored_total_area_is_read_and_sortable() {
    let (engine, db) = engine_with_db().await;
    insert_raw(
        &db,
        "users/alice/farms",
        "big",
        json!({ "farmName": "big", "totalArea": 9.0 }),
    )
    .await;
    insert_raw(
        &db,
        "users/alice/farms",
        "small",
        json!({ "farmName": "small", "totalArea": 1.0 }),
    )
    .await;

    let mut farms = engine.list_farms("alice").await.unwrap();
    sort_farms(&mut farms, FarmSortBy::from_key("totalArea"));
    let areas: Vec<(&str, Option<f64>)> = farms
        .iter()
        .map(|farm| (farm.name.as_str(), farm.area))
        .collect();
    assert_eq!(areas, vec![("small", Some(1.0)), ("big", Some(9.0))]);
}
