use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    booking_model::Seat, hall_model::CinemaHall, hall_model::HallDetail, movie_model::MovieListItem,
};

/// A showtime: one movie in one hall at one instant.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MovieSession {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie_id: i64,
    pub cinema_hall_id: i64,
}

/// List representation with denormalized movie and hall fields plus the
/// derived seat availability.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionListItem {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie_title: String,
    pub movie_image: Option<String>,
    pub cinema_hall_name: String,
    pub cinema_hall_capacity: i32,
    pub tickets_available: i32,
}

impl SessionListItem {
    pub fn assemble(
        session: &MovieSession,
        movie: &super::movie_model::Movie,
        hall: &CinemaHall,
        booked: i32,
    ) -> Self {
        let capacity = hall.capacity();
        Self {
            id: session.id,
            show_time: session.show_time,
            movie_title: movie.title.clone(),
            movie_image: movie.image.clone(),
            cinema_hall_name: hall.name.clone(),
            cinema_hall_capacity: capacity,
            tickets_available: (capacity - booked).max(0),
        }
    }
}

/// Detail representation: embedded movie and hall plus booked seats.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionDetail {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie: MovieListItem,
    pub cinema_hall: HallDetail,
    pub taken_places: Vec<Seat>,
}

/// Write view for create and full update.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInput {
    pub show_time: DateTime<Utc>,
    pub movie_id: i64,
    pub cinema_hall_id: i64,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct SessionUpdate {
    pub show_time: Option<DateTime<Utc>>,
    pub movie_id: Option<i64>,
    pub cinema_hall_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie_model::Movie;
    use chrono::TimeZone;

    #[test]
    fn list_item_denormalizes_movie_and_hall() {
        let session = MovieSession {
            id: 9,
            show_time: Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap(),
            movie_id: 3,
            cinema_hall_id: 4,
        };
        let movie = Movie {
            id: 3,
            title: "Sample movie".to_string(),
            description: String::new(),
            duration: 90,
            image: Some("/media/movie-3.jpg".to_string()),
            genres: vec![],
            actors: vec![],
        };
        let hall = CinemaHall {
            id: 4,
            name: "Blue".to_string(),
            rows: 10,
            seats_in_row: 12,
        };

        let item = SessionListItem::assemble(&session, &movie, &hall, 5);
        assert_eq!(item.movie_title, "Sample movie");
        assert_eq!(item.movie_image.as_deref(), Some("/media/movie-3.jpg"));
        assert_eq!(item.cinema_hall_capacity, 120);
        assert_eq!(item.tickets_available, 115);
    }
}
