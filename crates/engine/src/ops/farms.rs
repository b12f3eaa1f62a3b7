use chrono::Utc;
use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::{
    EngineError, Farm, FarmUpdate, NewFarm, ResultEngine,
    documents::{self, CollectionPath},
    farms::{FarmDocument, validate_area},
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists every valid farm of a user, oldest first.
    ///
    /// Documents that do not decode into a farm are skipped and logged.
    pub async fn list_farms(&self, user_id: &str) -> ResultEngine<Vec<Farm>> {
        list_farms_in(&self.database, user_id).await
    }

    pub async fn farm(&self, farm_id: &str, user_id: &str) -> ResultEngine<Farm> {
        self.require_farm(&self.database, farm_id, user_id).await
    }

    /// Creates a farm and returns it as stored.
    pub async fn new_farm(&self, input: &NewFarm, user_id: &str) -> ResultEngine<Farm> {
        let path = CollectionPath::farms(user_id)?;
        let stored = FarmDocument::new(input, Utc::now())?;
        let id = documents::insert(&self.database, &path, documents::encode(&stored)?).await?;
        tracing::info!("user {user_id} created farm {id}");
        self.farm(&id, user_id).await
    }

    /// Applies a partial update to a farm.
    pub async fn update_farm(
        &self,
        farm_id: &str,
        update: &FarmUpdate,
        user_id: &str,
    ) -> ResultEngine<Farm> {
        with_tx!(self, |db_tx| {
            let mut farm = self.require_farm(&db_tx, farm_id, user_id).await?;

            if let Some(name) = &update.name {
                farm.name = normalize_required_name(name, "farm")?;
            }
            if let Some(village) = &update.village {
                farm.village = village.trim().to_string();
            }
            if let Some(crop_type) = &update.crop_type {
                farm.crop_type = crop_type.trim().to_string();
            }
            if let Some(season) = &update.season {
                farm.season = season.trim().to_string();
            }
            if let Some(area) = update.area {
                farm.area = validate_area(area)?;
            }

            let path = CollectionPath::farms(user_id)?;
            let data = documents::encode(&FarmDocument::from_farm(&farm))?;
            if !documents::replace(&db_tx, &path, farm_id, data).await? {
                return Err(EngineError::KeyNotFound("farm not exists".to_string()));
            }
            Ok(farm)
        })
    }

    /// Deletes a farm together with its expense collection.
    pub async fn delete_farm(&self, farm_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let farms = CollectionPath::farms(user_id)?;
            let expenses = CollectionPath::expenses(user_id, farm_id)?;

            if !documents::delete(&db_tx, &farms, farm_id).await? {
                return Err(EngineError::KeyNotFound("farm not exists".to_string()));
            }
            let removed = documents::delete_collection(&db_tx, &expenses).await?;
            tracing::info!("user {user_id} deleted farm {farm_id} and {removed} expenses");
            Ok(())
        })
    }
}

pub(super) async fn list_farms_in<C>(db: &C, user_id: &str) -> ResultEngine<Vec<Farm>>
where
    C: ConnectionTrait,
{
    let path = CollectionPath::farms(user_id)?;
    let documents = documents::list(db, &path).await?;
    Ok(documents
        .into_iter()
        .filter_map(|document| match Farm::try_from(document) {
            Ok(farm) => Some(farm),
            Err(err) => {
                tracing::warn!("skipping farm in {path}: {err}");
                None
            }
        })
        .collect())
}
