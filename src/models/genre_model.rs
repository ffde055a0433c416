use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Write view for creating a genre.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

impl GenreInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "may not be blank");
        }
        errors
    }
}
