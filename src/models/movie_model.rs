use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

use super::{actor_model::Actor, genre_model::Genre};

/// Stored movie. Genre and actor relations are kept as independent id sets
/// so intersection filtering stays a plain set operation. Doubles as the
/// write view: create and update responses echo the related ids as supplied.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub image: Option<String>,
    #[serde(default)]
    pub genres: Vec<i64>,
    #[serde(default)]
    pub actors: Vec<i64>,
}

/// List representation: related entities flattened to display names. The
/// detail view is the one that adds the description.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MovieListItem {
    pub id: i64,
    pub title: String,
    pub duration: i32,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub image: Option<String>,
}

impl MovieListItem {
    pub fn assemble(
        movie: &Movie,
        genres: &BTreeMap<i64, Genre>,
        actors: &BTreeMap<i64, Actor>,
    ) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            duration: movie.duration,
            genres: movie
                .genres
                .iter()
                .filter_map(|id| genres.get(id).map(|g| g.name.clone()))
                .collect(),
            actors: movie
                .actors
                .iter()
                .filter_map(|id| actors.get(id).map(Actor::full_name))
                .collect(),
            image: movie.image.clone(),
        }
    }
}

/// Detail representation: related entities embedded as objects.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<Genre>,
    pub actors: Vec<Actor>,
    pub image: Option<String>,
}

impl MovieDetail {
    pub fn assemble(
        movie: &Movie,
        genres: &BTreeMap<i64, Genre>,
        actors: &BTreeMap<i64, Actor>,
    ) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            duration: movie.duration,
            genres: movie
                .genres
                .iter()
                .filter_map(|id| genres.get(id).cloned())
                .collect(),
            actors: movie
                .actors
                .iter()
                .filter_map(|id| actors.get(id).cloned())
                .collect(),
            image: movie.image.clone(),
        }
    }
}

/// Write view for create and full update. There is deliberately no `image`
/// field: posters are attached through the upload endpoint only, and an
/// `image` value in a create payload is dropped.
#[derive(Debug, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration: i32,
    #[serde(default)]
    pub genres: Vec<i64>,
    #[serde(default)]
    pub actors: Vec<i64>,
}

impl MovieInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.push("title", "may not be blank");
        }
        if self.duration < 1 {
            errors.push("duration", "must be a positive number of minutes");
        }
        errors
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub genres: Option<Vec<i64>>,
    pub actors: Option<Vec<i64>>,
}

impl MovieUpdate {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push("title", "may not be blank");
        }
        if self.duration.is_some_and(|d| d < 1) {
            errors.push("duration", "must be a positive number of minutes");
        }
        errors
    }
}
