use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CinemaHall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl CinemaHall {
    /// Derived seat count.
    pub fn capacity(&self) -> i32 {
        self.rows * self.seats_in_row
    }
}

/// Read representation with the derived `capacity` field materialized.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HallDetail {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub capacity: i32,
}

impl From<&CinemaHall> for HallDetail {
    fn from(hall: &CinemaHall) -> Self {
        Self {
            id: hall.id,
            name: hall.name.clone(),
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
            capacity: hall.capacity(),
        }
    }
}

/// Write view for creating a hall.
#[derive(Debug, Serialize, Deserialize)]
pub struct HallInput {
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl HallInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "may not be blank");
        }
        if self.rows < 1 {
            errors.push("rows", "must be a positive number");
        }
        if self.seats_in_row < 1 {
            errors.push("seats_in_row", "must be a positive number");
        }
        errors
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct HallUpdate {
    pub name: Option<String>,
    pub rows: Option<i32>,
    pub seats_in_row: Option<i32>,
}

impl HallUpdate {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            errors.push("name", "may not be blank");
        }
        if self.rows.is_some_and(|r| r < 1) {
            errors.push("rows", "must be a positive number");
        }
        if self.seats_in_row.is_some_and(|s| s < 1) {
            errors.push("seats_in_row", "must be a positive number");
        }
        errors
    }
}
