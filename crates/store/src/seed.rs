//! Demo data for local runs.

use chrono::NaiveDate;

use crate::entities::{Author, Course};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Authors loaded when `library.seed_demo_data` is enabled.
pub fn demo_authors() -> Vec<Author> {
    vec![
        Author::new("Atherton", "Uldae", date(1999, 4, 3), "Rum")
            .with_course(Course::new("Boxing", Some("The best gym ever".into())))
            .with_course(Course::new("Fitness", Some("Strength and cardio basics".into()))),
        Author::new("Eva", "Yneq", date(1999, 5, 3), "Rum")
            .with_course(Course::new("Cafe", Some("The best cafe ever".into())))
            .with_course(Course::new("Books", Some("The best books ever".into()))),
        Author::new("Nancy", "Rye", date(1978, 11, 23), "Singing")
            .with_course(Course::new(
                "Sea shanties",
                Some("Songs for long voyages".into()),
            )),
    ]
}
