//! Project-specific utilities live here.

use axum::{
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

/// Whole calendar years between `date_of_birth` and `today`.
///
/// The count drops by one while this year's birthday is still ahead.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Age as of today's UTC date.
pub fn current_age(date_of_birth: NaiveDate) -> i32 {
    age_on(date_of_birth, Utc::now().date_naive())
}

/// `201 Created` with a `Location` header and a JSON body.
pub fn created<T: Serialize>(location: String, body: T) -> Response {
    (StatusCode::CREATED, [(LOCATION, location)], Json(body)).into_response()
}
