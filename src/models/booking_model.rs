use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

use super::hall_model::CinemaHall;

/// A booked seat for one session. `(movie_session_id, row, seat)` is unique;
/// the entity store rejects duplicates.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: i64,
    pub movie_session_id: i64,
    pub row: i32,
    pub seat: i32,
}

/// A seat position, as exposed in `taken_places`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub row: i32,
    pub seat: i32,
}

impl From<&Ticket> for Seat {
    fn from(ticket: &Ticket) -> Self {
        Self {
            row: ticket.row,
            seat: ticket.seat,
        }
    }
}

/// Write view for booking a seat.
#[derive(Debug, Serialize, Deserialize)]
pub struct TicketInput {
    pub movie_session_id: i64,
    pub row: i32,
    pub seat: i32,
}

impl TicketInput {
    /// Range-checks the seat position against the hall the session runs in.
    pub fn validate_for_hall(&self, hall: &CinemaHall) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.row < 1 || self.row > hall.rows {
            errors.push("row", format!("row must be between 1 and {}", hall.rows));
        }
        if self.seat < 1 || self.seat > hall.seats_in_row {
            errors.push(
                "seat",
                format!("seat must be between 1 and {}", hall.seats_in_row),
            );
        }
        errors
    }
}
