//! MongoDB entity store.
//!
//! One collection per entity kind, numeric ids allocated from a `counters`
//! collection, and a unique index on `(movie_session_id, row, seat)` so the
//! booking invariant holds at the database even under concurrent writes.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::filters::{MovieFilter, SessionFilter};
use crate::models::actor_model::Actor;
use crate::models::booking_model::Ticket;
use crate::models::genre_model::Genre;
use crate::models::hall_model::{CinemaHall, HallUpdate};
use crate::models::movie_model::{Movie, MovieUpdate};
use crate::models::session_model::{MovieSession, SessionUpdate};
use crate::utils::escape_regex;

use super::{EntityStore, NewMovie, NewSession, NewTicket, StoreError, StoreResult};

pub struct MongoStore {
    db: Database,
}

#[derive(Debug, Serialize, Deserialize)]
struct GenreDoc {
    #[serde(rename = "_id")]
    id: i64,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ActorDoc {
    #[serde(rename = "_id")]
    id: i64,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct HallDoc {
    #[serde(rename = "_id")]
    id: i64,
    name: String,
    rows: i32,
    seats_in_row: i32,
}

#[derive(Debug, Serialize, Deserialize)]
struct MovieDoc {
    #[serde(rename = "_id")]
    id: i64,
    title: String,
    description: String,
    duration: i32,
    image: Option<String>,
    genres: Vec<i64>,
    actors: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionDoc {
    #[serde(rename = "_id")]
    id: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    show_time: chrono::DateTime<chrono::Utc>,
    movie_id: i64,
    cinema_hall_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TicketDoc {
    #[serde(rename = "_id")]
    id: i64,
    movie_session_id: i64,
    row: i32,
    seat: i32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CounterDoc {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

impl From<GenreDoc> for Genre {
    fn from(doc: GenreDoc) -> Self {
        Genre {
            id: doc.id,
            name: doc.name,
        }
    }
}

impl From<ActorDoc> for Actor {
    fn from(doc: ActorDoc) -> Self {
        Actor {
            id: doc.id,
            first_name: doc.first_name,
            last_name: doc.last_name,
        }
    }
}

impl From<HallDoc> for CinemaHall {
    fn from(doc: HallDoc) -> Self {
        CinemaHall {
            id: doc.id,
            name: doc.name,
            rows: doc.rows,
            seats_in_row: doc.seats_in_row,
        }
    }
}

impl From<MovieDoc> for Movie {
    fn from(doc: MovieDoc) -> Self {
        Movie {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            duration: doc.duration,
            image: doc.image,
            genres: doc.genres,
            actors: doc.actors,
        }
    }
}

impl From<SessionDoc> for MovieSession {
    fn from(doc: SessionDoc) -> Self {
        MovieSession {
            id: doc.id,
            show_time: doc.show_time,
            movie_id: doc.movie_id,
            cinema_hall_id: doc.cinema_hall_id,
        }
    }
}

impl From<TicketDoc> for Ticket {
    fn from(doc: TicketDoc) -> Self {
        Ticket {
            id: doc.id,
            movie_session_id: doc.movie_session_id,
            row: doc.row,
            seat: doc.seat,
        }
    }
}

fn backend(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend {
        message: err.to_string(),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

fn id_sort() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

impl MongoStore {
    pub fn new(client: &Client, db_name: &str) -> Self {
        Self {
            db: client.database(db_name),
        }
    }

    /// Creates the unique booking index. Call once at startup.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "movie_session_id": 1, "row": 1, "seat": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.tickets()
            .create_index(index, None)
            .await
            .map_err(backend)?;
        Ok(())
    }

    fn genres(&self) -> Collection<GenreDoc> {
        self.db.collection("genres")
    }

    fn actors(&self) -> Collection<ActorDoc> {
        self.db.collection("actors")
    }

    fn halls(&self) -> Collection<HallDoc> {
        self.db.collection("halls")
    }

    fn movies(&self) -> Collection<MovieDoc> {
        self.db.collection("movies")
    }

    fn sessions(&self) -> Collection<SessionDoc> {
        self.db.collection("sessions")
    }

    fn tickets(&self) -> Collection<TicketDoc> {
        self.db.collection("tickets")
    }

    async fn next_id(&self, kind: &str) -> StoreResult<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = self
            .db
            .collection::<CounterDoc>("counters")
            .find_one_and_update(doc! { "_id": kind }, doc! { "$inc": { "seq": 1_i64 } }, options)
            .await
            .map_err(backend)?
            .ok_or_else(|| backend(format!("counter {kind} missing after upsert")))?;
        Ok(counter.seq)
    }

    async fn find_all<D, T>(&self, collection: &Collection<D>, query: Document) -> StoreResult<Vec<T>>
    where
        D: DeserializeOwned + Unpin + Send + Sync,
        T: From<D>,
    {
        let mut cursor = collection
            .find(query, id_sort())
            .await
            .map_err(backend)?;
        let mut out = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(backend)? {
            out.push(doc.into());
        }
        Ok(out)
    }

    async fn find_by_id<D, T>(
        &self,
        collection: &Collection<D>,
        kind: &'static str,
        id: i64,
    ) -> StoreResult<T>
    where
        D: DeserializeOwned + Unpin + Send + Sync,
        T: From<D>,
    {
        collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(backend)?
            .map(T::from)
            .ok_or(StoreError::NotFound { kind, id })
    }

    async fn delete_by_id<D>(
        &self,
        collection: &Collection<D>,
        kind: &'static str,
        id: i64,
    ) -> StoreResult<()> {
        let result = collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(backend)?;
        if result.deleted_count == 1 {
            Ok(())
        } else {
            Err(StoreError::NotFound { kind, id })
        }
    }

    async fn apply_update<D, T>(
        &self,
        collection: &Collection<D>,
        kind: &'static str,
        id: i64,
        set: Document,
    ) -> StoreResult<T>
    where
        D: DeserializeOwned + Unpin + Send + Sync,
        T: From<D>,
    {
        if set.is_empty() {
            return self.find_by_id(collection, kind, id).await;
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
            .map_err(backend)?
            .map(T::from)
            .ok_or(StoreError::NotFound { kind, id })
    }
}

#[async_trait]
impl EntityStore for MongoStore {
    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        self.find_all(&self.genres(), Document::new()).await
    }

    async fn get_genre(&self, id: i64) -> StoreResult<Genre> {
        self.find_by_id(&self.genres(), "genre", id).await
    }

    async fn insert_genre(&self, name: &str) -> StoreResult<Genre> {
        let doc = GenreDoc {
            id: self.next_id("genres").await?,
            name: name.to_string(),
        };
        self.genres()
            .insert_one(&doc, None)
            .await
            .map_err(backend)?;
        Ok(doc.into())
    }

    async fn delete_genre(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id(&self.genres(), "genre", id).await
    }

    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        self.find_all(&self.actors(), Document::new()).await
    }

    async fn get_actor(&self, id: i64) -> StoreResult<Actor> {
        self.find_by_id(&self.actors(), "actor", id).await
    }

    async fn insert_actor(&self, first_name: &str, last_name: &str) -> StoreResult<Actor> {
        let doc = ActorDoc {
            id: self.next_id("actors").await?,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        self.actors()
            .insert_one(&doc, None)
            .await
            .map_err(backend)?;
        Ok(doc.into())
    }

    async fn delete_actor(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id(&self.actors(), "actor", id).await
    }

    async fn list_halls(&self) -> StoreResult<Vec<CinemaHall>> {
        self.find_all(&self.halls(), Document::new()).await
    }

    async fn get_hall(&self, id: i64) -> StoreResult<CinemaHall> {
        self.find_by_id(&self.halls(), "cinema hall", id).await
    }

    async fn insert_hall(
        &self,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> StoreResult<CinemaHall> {
        let doc = HallDoc {
            id: self.next_id("halls").await?,
            name: name.to_string(),
            rows,
            seats_in_row,
        };
        self.halls().insert_one(&doc, None).await.map_err(backend)?;
        Ok(doc.into())
    }

    async fn update_hall(&self, id: i64, update: HallUpdate) -> StoreResult<CinemaHall> {
        let mut set = Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(rows) = update.rows {
            set.insert("rows", rows);
        }
        if let Some(seats_in_row) = update.seats_in_row {
            set.insert("seats_in_row", seats_in_row);
        }
        self.apply_update(&self.halls(), "cinema hall", id, set).await
    }

    async fn delete_hall(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id(&self.halls(), "cinema hall", id).await
    }

    async fn list_movies(&self, filter: &MovieFilter) -> StoreResult<Vec<Movie>> {
        let mut query = Document::new();
        if let Some(title) = &filter.title {
            query.insert(
                "title",
                doc! { "$regex": escape_regex(title), "$options": "i" },
            );
        }
        if let Some(ids) = &filter.genres {
            query.insert("genres", doc! { "$in": ids.clone() });
        }
        if let Some(ids) = &filter.actors {
            query.insert("actors", doc! { "$in": ids.clone() });
        }
        self.find_all(&self.movies(), query).await
    }

    async fn get_movie(&self, id: i64) -> StoreResult<Movie> {
        self.find_by_id(&self.movies(), "movie", id).await
    }

    async fn insert_movie(&self, new: NewMovie) -> StoreResult<Movie> {
        let doc = MovieDoc {
            id: self.next_id("movies").await?,
            title: new.title,
            description: new.description,
            duration: new.duration,
            image: None,
            genres: new.genres,
            actors: new.actors,
        };
        self.movies()
            .insert_one(&doc, None)
            .await
            .map_err(backend)?;
        Ok(doc.into())
    }

    async fn update_movie(&self, id: i64, update: MovieUpdate) -> StoreResult<Movie> {
        let mut set = Document::new();
        if let Some(title) = update.title {
            set.insert("title", title);
        }
        if let Some(description) = update.description {
            set.insert("description", description);
        }
        if let Some(duration) = update.duration {
            set.insert("duration", duration);
        }
        if let Some(genres) = update.genres {
            set.insert("genres", genres);
        }
        if let Some(actors) = update.actors {
            set.insert("actors", actors);
        }
        self.apply_update(&self.movies(), "movie", id, set).await
    }

    async fn set_movie_image(&self, id: i64, image: String) -> StoreResult<Movie> {
        self.apply_update(&self.movies(), "movie", id, doc! { "image": image })
            .await
    }

    async fn delete_movie(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id(&self.movies(), "movie", id).await
    }

    async fn list_sessions(&self, filter: &SessionFilter) -> StoreResult<Vec<MovieSession>> {
        let mut query = Document::new();
        if let Some(ids) = &filter.movie {
            query.insert("movie_id", doc! { "$in": ids.clone() });
        }
        if let Some(date) = filter.date {
            let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
            let end = start + chrono::Duration::days(1);
            query.insert(
                "show_time",
                doc! {
                    "$gte": BsonDateTime::from_chrono(start),
                    "$lt": BsonDateTime::from_chrono(end),
                },
            );
        }
        self.find_all(&self.sessions(), query).await
    }

    async fn get_session(&self, id: i64) -> StoreResult<MovieSession> {
        self.find_by_id(&self.sessions(), "movie session", id).await
    }

    async fn insert_session(&self, new: NewSession) -> StoreResult<MovieSession> {
        let doc = SessionDoc {
            id: self.next_id("sessions").await?,
            show_time: new.show_time,
            movie_id: new.movie_id,
            cinema_hall_id: new.cinema_hall_id,
        };
        self.sessions()
            .insert_one(&doc, None)
            .await
            .map_err(backend)?;
        Ok(doc.into())
    }

    async fn update_session(&self, id: i64, update: SessionUpdate) -> StoreResult<MovieSession> {
        let mut set = Document::new();
        if let Some(show_time) = update.show_time {
            set.insert(
                "show_time",
                Bson::DateTime(BsonDateTime::from_chrono(show_time)),
            );
        }
        if let Some(movie_id) = update.movie_id {
            set.insert("movie_id", movie_id);
        }
        if let Some(cinema_hall_id) = update.cinema_hall_id {
            set.insert("cinema_hall_id", cinema_hall_id);
        }
        self.apply_update(&self.sessions(), "movie session", id, set)
            .await
    }

    async fn delete_session(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id(&self.sessions(), "movie session", id).await
    }

    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        self.find_all(&self.tickets(), Document::new()).await
    }

    async fn get_ticket(&self, id: i64) -> StoreResult<Ticket> {
        self.find_by_id(&self.tickets(), "ticket", id).await
    }

    async fn session_tickets(&self, session_id: i64) -> StoreResult<Vec<Ticket>> {
        self.find_all(&self.tickets(), doc! { "movie_session_id": session_id })
            .await
    }

    async fn insert_ticket(&self, new: NewTicket) -> StoreResult<Ticket> {
        let doc = TicketDoc {
            id: self.next_id("tickets").await?,
            movie_session_id: new.movie_session_id,
            row: new.row,
            seat: new.seat,
        };
        match self.tickets().insert_one(&doc, None).await {
            Ok(_) => Ok(doc.into()),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::SeatTaken {
                row: new.row,
                seat: new.seat,
            }),
            Err(err) => Err(backend(err)),
        }
    }

    async fn delete_ticket(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id(&self.tickets(), "ticket", id).await
    }
}
