//! In-memory entity store, used by the test suite and local development.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::filters::{MovieFilter, SessionFilter};
use crate::models::actor_model::Actor;
use crate::models::booking_model::Ticket;
use crate::models::genre_model::Genre;
use crate::models::hall_model::{CinemaHall, HallUpdate};
use crate::models::movie_model::{Movie, MovieUpdate};
use crate::models::session_model::{MovieSession, SessionUpdate};

use super::{EntityStore, NewMovie, NewSession, NewTicket, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    genres: BTreeMap<i64, Genre>,
    actors: BTreeMap<i64, Actor>,
    halls: BTreeMap<i64, CinemaHall>,
    movies: BTreeMap<i64, Movie>,
    sessions: BTreeMap<i64, MovieSession>,
    tickets: BTreeMap<i64, Ticket>,
    /// Booked `(session, row, seat)` triples, the uniqueness invariant.
    seats: HashSet<(i64, i32, i32)>,
    /// Per-kind id sequences, mirroring the Mongo counters collection.
    counters: HashMap<&'static str, i64>,
}

impl State {
    fn next_id(&mut self, kind: &'static str) -> i64 {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Entity store backed by id-keyed maps. `BTreeMap` keeps every listing
/// id-ordered, which is the stability the filter contract asks for.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(kind: &'static str, id: i64) -> StoreError {
    StoreError::NotFound { kind, id }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(self.read().genres.values().cloned().collect())
    }

    async fn get_genre(&self, id: i64) -> StoreResult<Genre> {
        self.read()
            .genres
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("genre", id))
    }

    async fn insert_genre(&self, name: &str) -> StoreResult<Genre> {
        let mut state = self.write();
        let id = state.next_id("genres");
        let genre = Genre {
            id,
            name: name.to_string(),
        };
        state.genres.insert(id, genre.clone());
        Ok(genre)
    }

    async fn delete_genre(&self, id: i64) -> StoreResult<()> {
        self.write()
            .genres
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("genre", id))
    }

    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        Ok(self.read().actors.values().cloned().collect())
    }

    async fn get_actor(&self, id: i64) -> StoreResult<Actor> {
        self.read()
            .actors
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("actor", id))
    }

    async fn insert_actor(&self, first_name: &str, last_name: &str) -> StoreResult<Actor> {
        let mut state = self.write();
        let id = state.next_id("actors");
        let actor = Actor {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        state.actors.insert(id, actor.clone());
        Ok(actor)
    }

    async fn delete_actor(&self, id: i64) -> StoreResult<()> {
        self.write()
            .actors
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("actor", id))
    }

    async fn list_halls(&self) -> StoreResult<Vec<CinemaHall>> {
        Ok(self.read().halls.values().cloned().collect())
    }

    async fn get_hall(&self, id: i64) -> StoreResult<CinemaHall> {
        self.read()
            .halls
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("cinema hall", id))
    }

    async fn insert_hall(
        &self,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> StoreResult<CinemaHall> {
        let mut state = self.write();
        let id = state.next_id("halls");
        let hall = CinemaHall {
            id,
            name: name.to_string(),
            rows,
            seats_in_row,
        };
        state.halls.insert(id, hall.clone());
        Ok(hall)
    }

    async fn update_hall(&self, id: i64, update: HallUpdate) -> StoreResult<CinemaHall> {
        let mut state = self.write();
        let hall = state
            .halls
            .get_mut(&id)
            .ok_or_else(|| not_found("cinema hall", id))?;
        if let Some(name) = update.name {
            hall.name = name;
        }
        if let Some(rows) = update.rows {
            hall.rows = rows;
        }
        if let Some(seats_in_row) = update.seats_in_row {
            hall.seats_in_row = seats_in_row;
        }
        Ok(hall.clone())
    }

    async fn delete_hall(&self, id: i64) -> StoreResult<()> {
        self.write()
            .halls
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("cinema hall", id))
    }

    async fn list_movies(&self, filter: &MovieFilter) -> StoreResult<Vec<Movie>> {
        Ok(self
            .read()
            .movies
            .values()
            .filter(|movie| filter.matches(movie))
            .cloned()
            .collect())
    }

    async fn get_movie(&self, id: i64) -> StoreResult<Movie> {
        self.read()
            .movies
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("movie", id))
    }

    async fn insert_movie(&self, new: NewMovie) -> StoreResult<Movie> {
        let mut state = self.write();
        let id = state.next_id("movies");
        let movie = Movie {
            id,
            title: new.title,
            description: new.description,
            duration: new.duration,
            image: None,
            genres: new.genres,
            actors: new.actors,
        };
        state.movies.insert(id, movie.clone());
        Ok(movie)
    }

    async fn update_movie(&self, id: i64, update: MovieUpdate) -> StoreResult<Movie> {
        let mut state = self.write();
        let movie = state
            .movies
            .get_mut(&id)
            .ok_or_else(|| not_found("movie", id))?;
        if let Some(title) = update.title {
            movie.title = title;
        }
        if let Some(description) = update.description {
            movie.description = description;
        }
        if let Some(duration) = update.duration {
            movie.duration = duration;
        }
        if let Some(genres) = update.genres {
            movie.genres = genres;
        }
        if let Some(actors) = update.actors {
            movie.actors = actors;
        }
        Ok(movie.clone())
    }

    async fn set_movie_image(&self, id: i64, image: String) -> StoreResult<Movie> {
        let mut state = self.write();
        let movie = state
            .movies
            .get_mut(&id)
            .ok_or_else(|| not_found("movie", id))?;
        movie.image = Some(image);
        Ok(movie.clone())
    }

    async fn delete_movie(&self, id: i64) -> StoreResult<()> {
        self.write()
            .movies
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("movie", id))
    }

    async fn list_sessions(&self, filter: &SessionFilter) -> StoreResult<Vec<MovieSession>> {
        Ok(self
            .read()
            .sessions
            .values()
            .filter(|session| filter.matches(session))
            .cloned()
            .collect())
    }

    async fn get_session(&self, id: i64) -> StoreResult<MovieSession> {
        self.read()
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("movie session", id))
    }

    async fn insert_session(&self, new: NewSession) -> StoreResult<MovieSession> {
        let mut state = self.write();
        let id = state.next_id("sessions");
        let session = MovieSession {
            id,
            show_time: new.show_time,
            movie_id: new.movie_id,
            cinema_hall_id: new.cinema_hall_id,
        };
        state.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn update_session(&self, id: i64, update: SessionUpdate) -> StoreResult<MovieSession> {
        let mut state = self.write();
        let session = state
            .sessions
            .get_mut(&id)
            .ok_or_else(|| not_found("movie session", id))?;
        if let Some(show_time) = update.show_time {
            session.show_time = show_time;
        }
        if let Some(movie_id) = update.movie_id {
            session.movie_id = movie_id;
        }
        if let Some(cinema_hall_id) = update.cinema_hall_id {
            session.cinema_hall_id = cinema_hall_id;
        }
        Ok(session.clone())
    }

    async fn delete_session(&self, id: i64) -> StoreResult<()> {
        self.write()
            .sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("movie session", id))
    }

    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        Ok(self.read().tickets.values().cloned().collect())
    }

    async fn get_ticket(&self, id: i64) -> StoreResult<Ticket> {
        self.read()
            .tickets
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("ticket", id))
    }

    async fn session_tickets(&self, session_id: i64) -> StoreResult<Vec<Ticket>> {
        Ok(self
            .read()
            .tickets
            .values()
            .filter(|ticket| ticket.movie_session_id == session_id)
            .cloned()
            .collect())
    }

    async fn insert_ticket(&self, new: NewTicket) -> StoreResult<Ticket> {
        // Check-and-insert under the write lock keeps double-booking out
        // even with concurrent requests.
        let mut state = self.write();
        let key = (new.movie_session_id, new.row, new.seat);
        if !state.seats.insert(key) {
            return Err(StoreError::SeatTaken {
                row: new.row,
                seat: new.seat,
            });
        }
        let id = state.next_id("tickets");
        let ticket = Ticket {
            id,
            movie_session_id: new.movie_session_id,
            row: new.row,
            seat: new.seat,
        };
        state.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn delete_ticket(&self, id: i64) -> StoreResult<()> {
        let mut state = self.write();
        let ticket = state
            .tickets
            .remove(&id)
            .ok_or_else(|| not_found("ticket", id))?;
        state
            .seats
            .remove(&(ticket.movie_session_id, ticket.row, ticket.seat));
        Ok(())
    }
}
