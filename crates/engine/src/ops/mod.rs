use sea_orm::DatabaseConnection;

use crate::{EngineError, Farm, ResultEngine, documents, documents::CollectionPath};

mod dashboard;
mod expenses;
mod farms;

pub use dashboard::Fetched;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every farm and expense operation.
///
/// The engine is stateless: every call reads the document store fresh and
/// every call is scoped by the `user_id` it receives.
#[derive(Debug, Clone)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Loads one farm or fails with `KeyNotFound`.
    async fn require_farm<C>(&self, db: &C, farm_id: &str, user_id: &str) -> ResultEngine<Farm>
    where
        C: sea_orm::ConnectionTrait,
    {
        let path = CollectionPath::farms(user_id)?;
        let document = documents::get(db, &path, farm_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("farm not exists".to_string()))?;
        Farm::try_from(document)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
