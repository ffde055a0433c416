use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};

use crate::auth::{authorize, Operation, Principal};
use crate::error::ApiError;
use crate::models::hall_model::{HallDetail, HallInput, HallUpdate};
use crate::storage::DynStore;

pub async fn load_halls(
    principal: Principal,
    Extension(store): Extension<DynStore>,
) -> Result<Json<Vec<HallDetail>>, ApiError> {
    authorize(&principal, Operation::List)?;
    let halls = store.list_halls().await?;
    Ok(Json(halls.iter().map(HallDetail::from).collect()))
}

pub async fn load_hall(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<Json<HallDetail>, ApiError> {
    authorize(&principal, Operation::Retrieve)?;
    let hall = store.get_hall(id).await?;
    Ok(Json(HallDetail::from(&hall)))
}

pub async fn add_hall(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Json(input): Json<HallInput>,
) -> Result<(StatusCode, Json<HallDetail>), ApiError> {
    authorize(&principal, Operation::Create)?;
    input.validate().into_result()?;
    let hall = store
        .insert_hall(input.name.trim(), input.rows, input.seats_in_row)
        .await?;
    Ok((StatusCode::CREATED, Json(HallDetail::from(&hall))))
}

pub async fn update_hall(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
    Json(update): Json<HallUpdate>,
) -> Result<Json<HallDetail>, ApiError> {
    authorize(&principal, Operation::PartialUpdate)?;
    update.validate().into_result()?;
    let hall = store.update_hall(id, update).await?;
    Ok(Json(HallDetail::from(&hall)))
}

pub async fn delete_hall(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::Delete)?;
    store.delete_hall(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
