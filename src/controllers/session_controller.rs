use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};

use crate::auth::{authorize, Operation, Principal};
use crate::error::{ApiError, ValidationErrors};
use crate::filters::{MovieFilter, SessionFilter, SessionListParams};
use crate::models::booking_model::Seat;
use crate::models::hall_model::HallDetail;
use crate::models::movie_model::MovieListItem;
use crate::models::session_model::{
    MovieSession, SessionDetail, SessionInput, SessionListItem, SessionUpdate,
};
use crate::storage::{DynStore, NewSession, StoreError};

use super::index_by_id;

pub async fn load_sessions(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Query(params): Query<SessionListParams>,
) -> Result<Json<Vec<SessionListItem>>, ApiError> {
    authorize(&principal, Operation::List)?;
    let filter = SessionFilter::parse(&params)?;
    let sessions = store.list_sessions(&filter).await?;

    let movies = index_by_id(
        store.list_movies(&MovieFilter::default()).await?,
        |movie| movie.id,
    );
    let halls = index_by_id(store.list_halls().await?, |hall| hall.id);
    let mut booked: HashMap<i64, i32> = HashMap::new();
    for ticket in store.list_tickets().await? {
        *booked.entry(ticket.movie_session_id).or_default() += 1;
    }

    // Sessions whose movie or hall has since been deleted carry no
    // presentable denormalized fields and are omitted.
    let items = sessions
        .iter()
        .filter_map(|session| {
            let movie = movies.get(&session.movie_id)?;
            let hall = halls.get(&session.cinema_hall_id)?;
            let taken = booked.get(&session.id).copied().unwrap_or(0);
            Some(SessionListItem::assemble(session, movie, hall, taken))
        })
        .collect();
    Ok(Json(items))
}

pub async fn load_session(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<Json<SessionDetail>, ApiError> {
    authorize(&principal, Operation::Retrieve)?;
    let session = store.get_session(id).await?;
    let movie = store.get_movie(session.movie_id).await?;
    let hall = store.get_hall(session.cinema_hall_id).await?;

    let genres = index_by_id(store.list_genres().await?, |genre| genre.id);
    let actors = index_by_id(store.list_actors().await?, |actor| actor.id);
    let taken_places: Vec<Seat> = store
        .session_tickets(id)
        .await?
        .iter()
        .map(Seat::from)
        .collect();

    Ok(Json(SessionDetail {
        id: session.id,
        show_time: session.show_time,
        movie: MovieListItem::assemble(&movie, &genres, &actors),
        cinema_hall: HallDetail::from(&hall),
        taken_places,
    }))
}

async fn check_session_refs(
    store: &DynStore,
    errors: &mut ValidationErrors,
    movie_id: Option<i64>,
    cinema_hall_id: Option<i64>,
) -> Result<(), ApiError> {
    if let Some(movie_id) = movie_id {
        match store.get_movie(movie_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                errors.push("movie_id", format!("unknown movie id {movie_id}"));
            }
            Err(err) => return Err(err.into()),
        }
    }
    if let Some(hall_id) = cinema_hall_id {
        match store.get_hall(hall_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                errors.push(
                    "cinema_hall_id",
                    format!("unknown cinema hall id {hall_id}"),
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

pub async fn add_session(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Json(input): Json<SessionInput>,
) -> Result<(StatusCode, Json<MovieSession>), ApiError> {
    authorize(&principal, Operation::Create)?;
    let mut errors = ValidationErrors::new();
    check_session_refs(
        &store,
        &mut errors,
        Some(input.movie_id),
        Some(input.cinema_hall_id),
    )
    .await?;
    errors.into_result()?;

    let session = store
        .insert_session(NewSession {
            show_time: input.show_time,
            movie_id: input.movie_id,
            cinema_hall_id: input.cinema_hall_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn update_session(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
    Json(input): Json<SessionInput>,
) -> Result<Json<MovieSession>, ApiError> {
    authorize(&principal, Operation::Update)?;
    let mut errors = ValidationErrors::new();
    check_session_refs(
        &store,
        &mut errors,
        Some(input.movie_id),
        Some(input.cinema_hall_id),
    )
    .await?;
    errors.into_result()?;

    let session = store
        .update_session(
            id,
            SessionUpdate {
                show_time: Some(input.show_time),
                movie_id: Some(input.movie_id),
                cinema_hall_id: Some(input.cinema_hall_id),
            },
        )
        .await?;
    Ok(Json(session))
}

pub async fn patch_session(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
    Json(update): Json<SessionUpdate>,
) -> Result<Json<MovieSession>, ApiError> {
    authorize(&principal, Operation::PartialUpdate)?;
    let mut errors = ValidationErrors::new();
    check_session_refs(&store, &mut errors, update.movie_id, update.cinema_hall_id).await?;
    errors.into_result()?;

    let session = store.update_session(id, update).await?;
    Ok(Json(session))
}

pub async fn delete_session(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::Delete)?;
    store.delete_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
