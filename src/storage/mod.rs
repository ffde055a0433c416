//! Entity store abstraction.
//!
//! Handlers talk to an [`EntityStore`] trait object; [`MongoStore`] backs the
//! running service and [`MemoryStore`] backs the test suite and local
//! development. Both return id-ordered listings so repeated reads over an
//! unchanged store yield identical result sets.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::filters::{MovieFilter, SessionFilter};
use crate::models::actor_model::Actor;
use crate::models::booking_model::Ticket;
use crate::models::genre_model::Genre;
use crate::models::hall_model::{CinemaHall, HallUpdate};
use crate::models::movie_model::{Movie, MovieUpdate};
use crate::models::session_model::{MovieSession, SessionUpdate};

/// Storage-level failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// Booking uniqueness conflict on `(movie_session, row, seat)`.
    #[error("seat {seat} in row {row} is already booked for this session")]
    SeatTaken { row: i32, seat: i32 },

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Movie fields for insertion; the store allocates the id.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<i64>,
    pub actors: Vec<i64>,
}

/// Session fields for insertion.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub show_time: DateTime<Utc>,
    pub movie_id: i64,
    pub cinema_hall_id: i64,
}

/// Ticket fields for insertion.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub movie_session_id: i64,
    pub row: i32,
    pub seat: i32,
}

/// Abstract persistence interface for the cinema entities.
///
/// Implementations must be thread-safe and keep listing order stable for a
/// fixed store state. Referential validation of write payloads happens in
/// the controllers before any of these methods run; the one invariant
/// enforced here is seat uniqueness, because it has to hold under
/// concurrent bookings.
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    // Genres

    async fn list_genres(&self) -> StoreResult<Vec<Genre>>;
    async fn get_genre(&self, id: i64) -> StoreResult<Genre>;
    async fn insert_genre(&self, name: &str) -> StoreResult<Genre>;
    async fn delete_genre(&self, id: i64) -> StoreResult<()>;

    // Actors

    async fn list_actors(&self) -> StoreResult<Vec<Actor>>;
    async fn get_actor(&self, id: i64) -> StoreResult<Actor>;
    async fn insert_actor(&self, first_name: &str, last_name: &str) -> StoreResult<Actor>;
    async fn delete_actor(&self, id: i64) -> StoreResult<()>;

    // Cinema halls

    async fn list_halls(&self) -> StoreResult<Vec<CinemaHall>>;
    async fn get_hall(&self, id: i64) -> StoreResult<CinemaHall>;
    async fn insert_hall(&self, name: &str, rows: i32, seats_in_row: i32)
        -> StoreResult<CinemaHall>;
    async fn update_hall(&self, id: i64, update: HallUpdate) -> StoreResult<CinemaHall>;
    async fn delete_hall(&self, id: i64) -> StoreResult<()>;

    // Movies

    /// Returns movies matching `filter`, id-ordered.
    async fn list_movies(&self, filter: &MovieFilter) -> StoreResult<Vec<Movie>>;
    async fn get_movie(&self, id: i64) -> StoreResult<Movie>;
    async fn insert_movie(&self, new: NewMovie) -> StoreResult<Movie>;
    async fn update_movie(&self, id: i64, update: MovieUpdate) -> StoreResult<Movie>;
    async fn set_movie_image(&self, id: i64, image: String) -> StoreResult<Movie>;
    async fn delete_movie(&self, id: i64) -> StoreResult<()>;

    // Sessions

    async fn list_sessions(&self, filter: &SessionFilter) -> StoreResult<Vec<MovieSession>>;
    async fn get_session(&self, id: i64) -> StoreResult<MovieSession>;
    async fn insert_session(&self, new: NewSession) -> StoreResult<MovieSession>;
    async fn update_session(&self, id: i64, update: SessionUpdate) -> StoreResult<MovieSession>;
    async fn delete_session(&self, id: i64) -> StoreResult<()>;

    // Tickets

    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>>;
    async fn get_ticket(&self, id: i64) -> StoreResult<Ticket>;
    async fn session_tickets(&self, session_id: i64) -> StoreResult<Vec<Ticket>>;
    /// Fails with [`StoreError::SeatTaken`] when the seat is already booked.
    async fn insert_ticket(&self, new: NewTicket) -> StoreResult<Ticket>;
    async fn delete_ticket(&self, id: i64) -> StoreResult<()>;
}

pub type DynStore = Arc<dyn EntityStore>;
