//! Query filter engines for the movie and session list endpoints.
//!
//! Each recognized query parameter becomes an optional predicate; present
//! predicates are combined with logical AND, while a multi-valued parameter
//! matches when *any* of its ids does (set intersection). Parsing happens
//! before any store access, so a malformed value rejects the request without
//! touching the backend.
//!
//! Every filter has two evaluations that must agree: the in-process
//! [`MovieFilter::matches`] / [`SessionFilter::matches`] predicates used by
//! the memory backend, and the query documents built in `storage::mongo`.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::models::movie_model::Movie;
use crate::models::session_model::MovieSession;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid id value: {raw:?}")]
    InvalidId { raw: String },
    #[error("invalid date value: {raw:?} (expected YYYY-MM-DD)")]
    InvalidDate { raw: String },
}

/// Raw query parameters of `GET /movies`. Unrecognized parameters are
/// dropped by deserialization.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MovieListParams {
    pub title: Option<String>,
    pub genres: Option<String>,
    pub actors: Option<String>,
}

/// Parsed movie list filter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub genres: Option<Vec<i64>>,
    pub actors: Option<Vec<i64>>,
}

impl MovieFilter {
    pub fn parse(params: &MovieListParams) -> Result<Self, FilterError> {
        Ok(Self {
            title: params.title.clone(),
            genres: params.genres.as_deref().map(parse_id_list).transpose()?,
            actors: params.actors.as_deref().map(parse_id_list).transpose()?,
        })
    }

    /// True when every supplied dimension accepts the movie.
    pub fn matches(&self, movie: &Movie) -> bool {
        let title_ok = self.title.as_ref().map_or(true, |needle| {
            movie
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let genres_ok = self
            .genres
            .as_ref()
            .map_or(true, |ids| movie.genres.iter().any(|g| ids.contains(g)));
        let actors_ok = self
            .actors
            .as_ref()
            .map_or(true, |ids| movie.actors.iter().any(|a| ids.contains(a)));
        title_ok && genres_ok && actors_ok
    }
}

/// Raw query parameters of `GET /sessions`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SessionListParams {
    pub movie: Option<String>,
    pub date: Option<String>,
}

/// Parsed session list filter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionFilter {
    pub movie: Option<Vec<i64>>,
    pub date: Option<NaiveDate>,
}

impl SessionFilter {
    pub fn parse(params: &SessionListParams) -> Result<Self, FilterError> {
        let date = match params.date.as_deref() {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                FilterError::InvalidDate {
                    raw: raw.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            movie: params.movie.as_deref().map(parse_id_list).transpose()?,
            date,
        })
    }

    pub fn matches(&self, session: &MovieSession) -> bool {
        let movie_ok = self
            .movie
            .as_ref()
            .map_or(true, |ids| ids.contains(&session.movie_id));
        let date_ok = self
            .date
            .map_or(true, |date| session.show_time.date_naive() == date);
        movie_ok && date_ok
    }
}

/// Parses a comma-separated id list. Any segment that is not an integer,
/// including an empty one, is a [`FilterError::InvalidId`]; malformed ids
/// are never silently dropped.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, FilterError> {
    raw.split(',')
        .map(|segment| {
            let segment = segment.trim();
            segment
                .parse::<i64>()
                .map_err(|_| FilterError::InvalidId {
                    raw: segment.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn movie(id: i64, title: &str, genres: &[i64], actors: &[i64]) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            description: String::new(),
            duration: 90,
            image: None,
            genres: genres.to_vec(),
            actors: actors.to_vec(),
        }
    }

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_id_list("1,2,3"), Ok(vec![1, 2, 3]));
        assert_eq!(parse_id_list("7"), Ok(vec![7]));
        assert_eq!(parse_id_list(" 1 , 2 "), Ok(vec![1, 2]));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert_eq!(
            parse_id_list("1,abc"),
            Err(FilterError::InvalidId {
                raw: "abc".to_string()
            })
        );
        // Empty segments are malformed, not skipped.
        assert!(parse_id_list("1,,2").is_err());
        assert!(parse_id_list("").is_err());
    }

    #[test]
    fn no_parameters_matches_everything() {
        let filter = MovieFilter::parse(&MovieListParams::default()).unwrap();
        assert!(filter.matches(&movie(1, "Anything", &[], &[])));
    }

    #[test]
    fn title_matches_case_insensitive_substring() {
        let filter = MovieFilter {
            title: Some("test".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&movie(1, "A Test Movie", &[], &[])));
        assert!(filter.matches(&movie(2, "Another test movie", &[], &[])));
        assert!(!filter.matches(&movie(3, "Different One", &[], &[])));
    }

    #[test]
    fn id_dimensions_match_any_listed_id() {
        let filter = MovieFilter {
            actors: Some(vec![1, 2]),
            ..Default::default()
        };
        assert!(filter.matches(&movie(1, "With One", &[], &[1])));
        assert!(filter.matches(&movie(2, "With Two", &[], &[2])));
        assert!(filter.matches(&movie(3, "With Both", &[], &[1, 2])));
        assert!(!filter.matches(&movie(4, "With Neither", &[], &[3])));
    }

    #[test]
    fn dimensions_combine_with_and() {
        let filter = MovieFilter {
            title: Some("action".to_string()),
            actors: Some(vec![1]),
            ..Default::default()
        };
        assert!(filter.matches(&movie(1, "Action Movie", &[], &[1])));
        assert!(!filter.matches(&movie(2, "Action Comedy", &[], &[2])));
        assert!(!filter.matches(&movie(3, "Just a Movie", &[], &[1])));
    }

    #[test]
    fn session_filter_parses_date() {
        let params = SessionListParams {
            movie: None,
            date: Some("2022-06-02".to_string()),
        };
        let filter = SessionFilter::parse(&params).unwrap();
        let session = MovieSession {
            id: 1,
            show_time: Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap(),
            movie_id: 1,
            cinema_hall_id: 1,
        };
        assert!(filter.matches(&session));

        let other = MovieSession {
            show_time: Utc.with_ymd_and_hms(2022, 6, 3, 0, 0, 0).unwrap(),
            ..session
        };
        assert!(!filter.matches(&other));
    }

    #[test]
    fn session_filter_rejects_malformed_values() {
        let params = SessionListParams {
            movie: Some("x".to_string()),
            date: None,
        };
        assert!(SessionFilter::parse(&params).is_err());

        let params = SessionListParams {
            movie: None,
            date: Some("02-06-2022".to_string()),
        };
        assert_eq!(
            SessionFilter::parse(&params),
            Err(FilterError::InvalidDate {
                raw: "02-06-2022".to_string()
            })
        );
    }
}
