use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::Json,
};

use crate::auth::{authorize, Operation, Principal};
use crate::error::{ApiError, ValidationErrors};
use crate::filters::{MovieFilter, MovieListParams};
use crate::media::{image_extension, MediaStore};
use crate::models::actor_model::Actor;
use crate::models::genre_model::Genre;
use crate::models::movie_model::{Movie, MovieDetail, MovieInput, MovieListItem, MovieUpdate};
use crate::storage::{DynStore, NewMovie};
use crate::utils::dedup_ids;

use super::index_by_id;

async fn load_catalog(
    store: &DynStore,
) -> Result<(BTreeMap<i64, Genre>, BTreeMap<i64, Actor>), ApiError> {
    let genres = index_by_id(store.list_genres().await?, |genre| genre.id);
    let actors = index_by_id(store.list_actors().await?, |actor| actor.id);
    Ok((genres, actors))
}

fn check_related<T>(
    errors: &mut ValidationErrors,
    field: &str,
    ids: &[i64],
    known: &BTreeMap<i64, T>,
) {
    for id in ids {
        if !known.contains_key(id) {
            errors.push(field, format!("unknown {field} id {id}"));
        }
    }
}

pub async fn load_movies(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Query(params): Query<MovieListParams>,
) -> Result<Json<Vec<MovieListItem>>, ApiError> {
    authorize(&principal, Operation::List)?;
    let filter = MovieFilter::parse(&params)?;
    let movies = store.list_movies(&filter).await?;
    let (genres, actors) = load_catalog(&store).await?;
    let items = movies
        .iter()
        .map(|movie| MovieListItem::assemble(movie, &genres, &actors))
        .collect();
    Ok(Json(items))
}

pub async fn load_movie(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<Json<MovieDetail>, ApiError> {
    authorize(&principal, Operation::Retrieve)?;
    let movie = store.get_movie(id).await?;
    let (genres, actors) = load_catalog(&store).await?;
    Ok(Json(MovieDetail::assemble(&movie, &genres, &actors)))
}

pub async fn add_movie(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Json(input): Json<MovieInput>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    authorize(&principal, Operation::Create)?;
    let mut errors = input.validate();

    let genre_ids = dedup_ids(&input.genres);
    let actor_ids = dedup_ids(&input.actors);
    let (genres, actors) = load_catalog(&store).await?;
    check_related(&mut errors, "genres", &genre_ids, &genres);
    check_related(&mut errors, "actors", &actor_ids, &actors);
    errors.into_result()?;

    let movie = store
        .insert_movie(NewMovie {
            title: input.title.trim().to_string(),
            description: input.description,
            duration: input.duration,
            genres: genre_ids,
            actors: actor_ids,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
    Json(input): Json<MovieInput>,
) -> Result<Json<Movie>, ApiError> {
    authorize(&principal, Operation::Update)?;
    let mut errors = input.validate();

    let genre_ids = dedup_ids(&input.genres);
    let actor_ids = dedup_ids(&input.actors);
    let (genres, actors) = load_catalog(&store).await?;
    check_related(&mut errors, "genres", &genre_ids, &genres);
    check_related(&mut errors, "actors", &actor_ids, &actors);
    errors.into_result()?;

    let movie = store
        .update_movie(
            id,
            MovieUpdate {
                title: Some(input.title.trim().to_string()),
                description: Some(input.description),
                duration: Some(input.duration),
                genres: Some(genre_ids),
                actors: Some(actor_ids),
            },
        )
        .await?;
    Ok(Json(movie))
}

pub async fn patch_movie(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
    Json(mut update): Json<MovieUpdate>,
) -> Result<Json<Movie>, ApiError> {
    authorize(&principal, Operation::PartialUpdate)?;
    let mut errors = update.validate();

    update.genres = update.genres.map(|ids| dedup_ids(&ids));
    update.actors = update.actors.map(|ids| dedup_ids(&ids));
    let (genres, actors) = load_catalog(&store).await?;
    if let Some(ids) = &update.genres {
        check_related(&mut errors, "genres", ids, &genres);
    }
    if let Some(ids) = &update.actors {
        check_related(&mut errors, "actors", ids, &actors);
    }
    errors.into_result()?;

    let movie = store.update_movie(id, update).await?;
    Ok(Json(movie))
}

pub async fn delete_movie(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::Delete)?;
    store.delete_movie(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attaches a poster to an existing movie. The payload is a single
/// multipart field named `image`; anything that does not sniff as an image
/// is rejected with the movie left unchanged.
pub async fn upload_movie_image(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Extension(media): Extension<Arc<MediaStore>>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Movie>, ApiError> {
    authorize(&principal, Operation::UploadImage)?;
    store.get_movie(id).await?;

    let mut image_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("malformed multipart body: {err}")))?
    {
        if field.name() == Some("image") {
            image_bytes = Some(field.bytes().await.map_err(|err| {
                ApiError::bad_request(format!("malformed multipart body: {err}"))
            })?);
        }
    }

    let mut errors = ValidationErrors::new();
    let Some(bytes) = image_bytes else {
        errors.push("image", "no image file was submitted");
        return Err(errors.into());
    };
    let Some(extension) = image_extension(&bytes) else {
        errors.push("image", "upload a valid image");
        return Err(errors.into());
    };

    let image = media
        .save_poster(id, extension, &bytes)
        .await
        .map_err(|err| ApiError::internal(format!("failed to store poster: {err}")))?;
    let movie = store.set_movie_image(id, image).await?;
    Ok(Json(movie))
}
