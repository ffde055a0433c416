//! Cinema management backend: movies, genres, actors, halls, sessions and
//! seat booking behind a CRUD HTTP API with role-gated writes.

pub mod auth;
pub mod config;
pub mod controllers;
pub mod error;
pub mod filters;
pub mod media;
pub mod models;
pub mod storage;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::services::ServeDir;

use auth::TokenRegistry;
use controllers::{
    actor_controller::*, booking_controller::*, genre_controller::*, hall_controller::*,
    home_controller, movie_controller::*, session_controller::*,
};
use media::MediaStore;
use storage::DynStore;

/// Builds the application router. The store, token registry and media store
/// are injected through `Extension` layers so handlers and tests share one
/// construction path.
pub fn create_router(
    store: DynStore,
    tokens: Arc<TokenRegistry>,
    media: Arc<MediaStore>,
) -> Router {
    let media_dir = media.root().to_path_buf();
    Router::new()
        .route("/health", get(home_controller::health))
        .route("/genres", get(load_genres).post(add_genre))
        .route("/genres/:id", get(load_genre).delete(delete_genre))
        .route("/actors", get(load_actors).post(add_actor))
        .route("/actors/:id", get(load_actor).delete(delete_actor))
        .route("/halls", get(load_halls).post(add_hall))
        .route(
            "/halls/:id",
            get(load_hall).patch(update_hall).delete(delete_hall),
        )
        .route("/movies", get(load_movies).post(add_movie))
        .route(
            "/movies/:id",
            get(load_movie)
                .put(update_movie)
                .patch(patch_movie)
                .delete(delete_movie),
        )
        .route("/movies/:id/image", post(upload_movie_image))
        .route("/sessions", get(load_sessions).post(add_session))
        .route(
            "/sessions/:id",
            get(load_session)
                .put(update_session)
                .patch(patch_session)
                .delete(delete_session),
        )
        .route("/tickets", get(load_tickets).post(add_ticket))
        .route("/tickets/:id", get(load_ticket).delete(delete_ticket))
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(Extension(store))
        .layer(Extension(tokens))
        .layer(Extension(media))
}
