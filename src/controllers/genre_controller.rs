use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};

use crate::auth::{authorize, Operation, Principal};
use crate::error::{ApiError, ValidationErrors};
use crate::models::genre_model::{Genre, GenreInput};
use crate::storage::DynStore;

pub async fn load_genres(
    principal: Principal,
    Extension(store): Extension<DynStore>,
) -> Result<Json<Vec<Genre>>, ApiError> {
    authorize(&principal, Operation::List)?;
    Ok(Json(store.list_genres().await?))
}

pub async fn load_genre(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<Json<Genre>, ApiError> {
    authorize(&principal, Operation::Retrieve)?;
    Ok(Json(store.get_genre(id).await?))
}

pub async fn add_genre(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Json(input): Json<GenreInput>,
) -> Result<(StatusCode, Json<Genre>), ApiError> {
    authorize(&principal, Operation::Create)?;
    let mut errors = input.validate();

    // Genre names are unique.
    let name = input.name.trim();
    if errors.is_empty()
        && store
            .list_genres()
            .await?
            .iter()
            .any(|genre| genre.name.eq_ignore_ascii_case(name))
    {
        let mut duplicate = ValidationErrors::new();
        duplicate.push("name", "genre with this name already exists");
        errors = duplicate;
    }
    errors.into_result()?;

    let genre = store.insert_genre(name).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

pub async fn delete_genre(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::Delete)?;
    store.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
