//! Document store access.
//!
//! Farms and expenses are schemaless JSON documents grouped by collection
//! path (`users/{user}/farms`, `users/{user}/farms/{farm}/expenses`). This
//! module owns the `documents` table and the raw list/get/insert/update/delete
//! operations; typed records are built on top of it in `farms` and `expenses`.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, entity::prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::validate_segment};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub data: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Path of a document collection owned by one user.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// `users/{user_id}/farms`
    pub fn farms(user_id: &str) -> ResultEngine<Self> {
        validate_segment(user_id, "user")?;
        Ok(Self(format!("users/{user_id}/farms")))
    }

    /// `users/{user_id}/farms/{farm_id}/expenses`
    pub fn expenses(user_id: &str, farm_id: &str) -> ResultEngine<Self> {
        validate_segment(user_id, "user")?;
        validate_segment(farm_id, "farm")?;
        Ok(Self(format!("users/{user_id}/farms/{farm_id}/expenses")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raw document: its id, its JSON fields and when the row was written.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for Document {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        match model.data {
            Value::Object(data) => Ok(Self {
                id: model.id,
                data,
                created_at: model.created_at,
            }),
            _ => Err(EngineError::InvalidRecord(format!(
                "document {} is not an object",
                model.id
            ))),
        }
    }
}

/// A timestamp field as it may appear in a document.
///
/// Accepts RFC 3339 strings, bare `YYYY-MM-DD` dates (midnight UTC) and
/// `{ "seconds", "nanoseconds" }` objects. Always written back as RFC 3339.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum Timestamp {
    Rfc3339(DateTime<Utc>),
    Date(NaiveDate),
    Seconds {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
}

impl Timestamp {
    pub(crate) fn to_utc(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Rfc3339(value) => Some(value),
            Self::Date(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            Self::Seconds {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(seconds, nanoseconds).single(),
        }
    }
}

/// A numeric field that older clients sometimes wrote as a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberField {
    Number(f64),
    Text(String),
}

impl NumberField {
    pub(crate) fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().replace(',', ".").parse().ok(),
        }
    }
}

/// Decode a document's fields into a typed schema struct.
pub(crate) fn decode<T>(document: &Document) -> ResultEngine<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(Value::Object(document.data.clone())).map_err(|err| {
        EngineError::InvalidRecord(format!("document {}: {err}", document.id))
    })
}

/// Encode a schema struct into document fields.
pub(crate) fn encode<T: Serialize>(value: &T) -> ResultEngine<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(EngineError::InvalidRecord(
            "document fields must be an object".to_string(),
        )),
        Err(err) => Err(EngineError::InvalidRecord(err.to_string())),
    }
}

/// Lists every document of a collection, oldest first.
///
/// Rows whose payload is not a JSON object are skipped.
pub(crate) async fn list<C>(db: &C, path: &CollectionPath) -> ResultEngine<Vec<Document>>
where
    C: ConnectionTrait,
{
    let models = Entity::find()
        .filter(Column::Collection.eq(path.as_str()))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?;

    Ok(models
        .into_iter()
        .filter_map(|model| match Document::try_from(model) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!("skipping document in {path}: {err}");
                None
            }
        })
        .collect())
}

pub(crate) async fn get<C>(db: &C, path: &CollectionPath, id: &str) -> ResultEngine<Option<Document>>
where
    C: ConnectionTrait,
{
    Entity::find_by_id((path.as_str().to_string(), id.to_string()))
        .one(db)
        .await?
        .map(Document::try_from)
        .transpose()
}

/// Inserts a new document and returns its generated id.
pub(crate) async fn insert<C>(
    db: &C,
    path: &CollectionPath,
    data: Map<String, Value>,
) -> ResultEngine<String>
where
    C: ConnectionTrait,
{
    let id = Uuid::new_v4().simple().to_string();
    let now = Utc::now();
    let model = ActiveModel {
        collection: ActiveValue::Set(path.as_str().to_string()),
        id: ActiveValue::Set(id.clone()),
        data: ActiveValue::Set(Value::Object(data)),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    };
    Entity::insert(model).exec_without_returning(db).await?;
    tracing::debug!("inserted document {id} into {path}");
    Ok(id)
}

/// Replaces the fields of an existing document. Returns `false` when the
/// document does not exist.
pub(crate) async fn replace<C>(
    db: &C,
    path: &CollectionPath,
    id: &str,
    data: Map<String, Value>,
) -> ResultEngine<bool>
where
    C: ConnectionTrait,
{
    let result = Entity::update_many()
        .col_expr(Column::Data, Expr::value(Value::Object(data)))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Collection.eq(path.as_str()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Deletes one document. Returns `false` when nothing was deleted.
pub(crate) async fn delete<C>(db: &C, path: &CollectionPath, id: &str) -> ResultEngine<bool>
where
    C: ConnectionTrait,
{
    let result = Entity::delete_many()
        .filter(Column::Collection.eq(path.as_str()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Deletes every document of a collection and returns how many went away.
pub(crate) async fn delete_collection<C>(db: &C, path: &CollectionPath) -> ResultEngine<u64>
where
    C: ConnectionTrait,
{
    let result = Entity::delete_many()
        .filter(Column::Collection.eq(path.as_str()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_paths() {
        assert_eq!(
            CollectionPath::farms("alice").unwrap().as_str(),
            "users/alice/farms"
        );
        assert_eq!(
            CollectionPath::expenses("alice", "f1").unwrap().to_string(),
            "users/alice/farms/f1/expenses"
        );
        assert!(CollectionPath::expenses("alice", "../bob").is_err());
    }

    #[test]
    fn timestamps_accept_all_shapes() {
        let rfc: Timestamp = serde_json::from_value(Value::from("2024-03-01T10:00:00Z")).unwrap();
        let date: Timestamp = serde_json::from_value(Value::from("2024-03-01")).unwrap();
        let secs: Timestamp =
            serde_json::from_value(serde_json::json!({ "seconds": 1_709_287_200, "nanoseconds": 0 }))
                .unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(rfc.to_utc(), Some(expected));
        assert_eq!(secs.to_utc(), Some(expected));
        assert_eq!(
            date.to_utc(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn number_fields_parse_text() {
        assert_eq!(NumberField::Number(2.5).to_f64(), Some(2.5));
        assert_eq!(NumberField::Text(" 12,5 ".to_string()).to_f64(), Some(12.5));
        assert_eq!(NumberField::Text("abc".to_string()).to_f64(), None);
    }

    #[test]
    fn non_object_rows_are_rejected() {
        let model = Model {
            collection: "users/alice/farms".to_string(),
            id: "x".to_string(),
            data: Value::from(42),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            Document::try_from(model),
            Err(EngineError::InvalidRecord(_))
        ));
    }
}
