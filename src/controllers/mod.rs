pub mod actor_controller;
pub mod booking_controller;
pub mod genre_controller;
pub mod hall_controller;
pub mod home_controller;
pub mod movie_controller;
pub mod session_controller;

use std::collections::BTreeMap;

/// Indexes a listing by id for representation assembly.
pub(crate) fn index_by_id<T>(items: Vec<T>, id_of: impl Fn(&T) -> i64) -> BTreeMap<i64, T> {
    items.into_iter().map(|item| (id_of(&item), item)).collect()
}
