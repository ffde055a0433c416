use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Actor {
    /// Derived display name used by list representations.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Write view for creating an actor.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActorInput {
    pub first_name: String,
    pub last_name: String,
}

impl ActorInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.first_name.trim().is_empty() {
            errors.push("first_name", "may not be blank");
        }
        if self.last_name.trim().is_empty() {
            errors.push("last_name", "may not be blank");
        }
        errors
    }
}
