use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};

use crate::auth::{authorize, Operation, Principal};
use crate::error::ApiError;
use crate::models::actor_model::{Actor, ActorInput};
use crate::storage::DynStore;

pub async fn load_actors(
    principal: Principal,
    Extension(store): Extension<DynStore>,
) -> Result<Json<Vec<Actor>>, ApiError> {
    authorize(&principal, Operation::List)?;
    Ok(Json(store.list_actors().await?))
}

pub async fn load_actor(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<Json<Actor>, ApiError> {
    authorize(&principal, Operation::Retrieve)?;
    Ok(Json(store.get_actor(id).await?))
}

pub async fn add_actor(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Json(input): Json<ActorInput>,
) -> Result<(StatusCode, Json<Actor>), ApiError> {
    authorize(&principal, Operation::Create)?;
    input.validate().into_result()?;
    let actor = store
        .insert_actor(input.first_name.trim(), input.last_name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(actor)))
}

pub async fn delete_actor(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::Delete)?;
    store.delete_actor(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
