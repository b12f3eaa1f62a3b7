//! Farms API endpoints

use api_types::farm::{FarmList, FarmListResponse, FarmNew, FarmUpdate, FarmView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Farm, FarmFilter, FarmSortBy, sort_farms};

use crate::{FARMS_FETCH_FAILED, ServerError, server::ServerState, user};

pub(crate) fn farm_view(farm: &Farm) -> FarmView {
    FarmView {
        id: farm.id.clone(),
        farm_name: farm.name.clone(),
        village: farm.village.clone(),
        crop_type: farm.crop_type.clone(),
        crop_category: farm.crop_category().map(ToString::to_string),
        season: farm.season.clone(),
        area: farm.area,
        created_at: farm.created_at,
    }
}

/// Lists the user's farms matching the query, ordered by `sort_by`.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<FarmList>,
) -> Result<Json<FarmListResponse>, ServerError> {
    let farms = state
        .engine
        .list_farms(&user.username)
        .await
        .map_err(ServerError::fetch(FARMS_FETCH_FAILED))?;

    let filter = FarmFilter {
        search: query.search.unwrap_or_default(),
        crop_category: query.crop_category.unwrap_or_default(),
        season: query.season.unwrap_or_default(),
    };
    let mut farms = filter.apply(&farms);
    sort_farms(
        &mut farms,
        query
            .sort_by
            .as_deref()
            .map(FarmSortBy::from_key)
            .unwrap_or_default(),
    );

    Ok(Json(FarmListResponse {
        farms: farms.iter().map(farm_view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(farm_id): Path<String>,
) -> Result<Json<FarmView>, ServerError> {
    let farm = state
        .engine
        .farm(&farm_id, &user.username)
        .await
        .map_err(ServerError::fetch(FARMS_FETCH_FAILED))?;
    Ok(Json(farm_view(&farm)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FarmNew>,
) -> Result<(StatusCode, Json<FarmView>), ServerError> {
    let input = engine::NewFarm {
        name: payload.farm_name,
        village: payload.village.unwrap_or_default(),
        crop_type: payload.crop_type.unwrap_or_default(),
        season: payload.season.unwrap_or_default(),
        area: payload.area,
    };
    let farm = state.engine.new_farm(&input, &user.username).await?;
    Ok((StatusCode::CREATED, Json(farm_view(&farm))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(farm_id): Path<String>,
    Json(payload): Json<FarmUpdate>,
) -> Result<Json<FarmView>, ServerError> {
    let update = engine::FarmUpdate {
        name: payload.farm_name,
        village: payload.village,
        crop_type: payload.crop_type,
        season: payload.season,
        area: if payload.clear_area {
            Some(None)
        } else {
            payload.area.map(Some)
        },
    };
    let farm = state
        .engine
        .update_farm(&farm_id, &update, &user.username)
        .await?;
    Ok(Json(farm_view(&farm)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(farm_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_farm(&farm_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
