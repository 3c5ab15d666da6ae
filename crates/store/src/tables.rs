use uuid::Uuid;

use crate::entities::{Author, Course};
use crate::error::{StoreError, StoreResult};

/// A staged write waiting for the next commit.
#[derive(Debug, Clone)]
pub(crate) enum Change {
    AddAuthor(Author),
    UpdateAuthor(Author),
    DeleteAuthor(Uuid),
    AddCourse(Course),
    UpdateCourse(Course),
    DeleteCourse { author_id: Uuid, course_id: Uuid },
}

/// Committed rows in insertion order.
///
/// Author rows never carry their courses; those live in `courses` and are
/// attached on read.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) authors: Vec<Author>,
    pub(crate) courses: Vec<Course>,
}

impl Tables {
    pub(crate) fn author_exists(&self, author_id: Uuid) -> bool {
        self.authors.iter().any(|author| author.id == author_id)
    }

    /// Clone an author row with its courses attached.
    pub(crate) fn hydrate(&self, author: &Author) -> Author {
        let mut author = author.clone();
        author.courses = self
            .courses
            .iter()
            .filter(|course| course.author_id == author.id)
            .cloned()
            .collect();
        author
    }

    pub(crate) fn apply(&mut self, change: &Change) -> StoreResult<()> {
        match change {
            Change::AddAuthor(author) => {
                if self.author_exists(author.id) {
                    return Err(StoreError::persistence(format!(
                        "author {} already exists",
                        author.id
                    )));
                }
                let mut row = author.clone();
                let courses = std::mem::take(&mut row.courses);
                self.authors.push(row);
                for course in &courses {
                    self.insert_course(course)?;
                }
            }
            Change::UpdateAuthor(author) => {
                let row = self
                    .authors
                    .iter_mut()
                    .find(|row| row.id == author.id)
                    .ok_or_else(|| {
                        StoreError::persistence(format!("author {} no longer exists", author.id))
                    })?;
                row.first_name.clone_from(&author.first_name);
                row.last_name.clone_from(&author.last_name);
                row.date_of_birth = author.date_of_birth;
                row.main_category.clone_from(&author.main_category);
            }
            Change::DeleteAuthor(author_id) => {
                let before = self.authors.len();
                self.authors.retain(|row| row.id != *author_id);
                if self.authors.len() == before {
                    return Err(StoreError::persistence(format!(
                        "author {} no longer exists",
                        author_id
                    )));
                }
                self.courses.retain(|course| course.author_id != *author_id);
            }
            Change::AddCourse(course) => self.insert_course(course)?,
            Change::UpdateCourse(course) => {
                let row = self
                    .courses
                    .iter_mut()
                    .find(|row| row.id == course.id && row.author_id == course.author_id)
                    .ok_or_else(|| {
                        StoreError::persistence(format!("course {} no longer exists", course.id))
                    })?;
                row.title.clone_from(&course.title);
                row.description.clone_from(&course.description);
            }
            Change::DeleteCourse {
                author_id,
                course_id,
            } => {
                let before = self.courses.len();
                self.courses
                    .retain(|row| !(row.id == *course_id && row.author_id == *author_id));
                if self.courses.len() == before {
                    return Err(StoreError::persistence(format!(
                        "course {} no longer exists",
                        course_id
                    )));
                }
            }
        }

        Ok(())
    }

    fn insert_course(&mut self, course: &Course) -> StoreResult<()> {
        if !self.author_exists(course.author_id) {
            return Err(StoreError::persistence(format!(
                "course {} references missing author {}",
                course.id, course.author_id
            )));
        }
        if self.courses.iter().any(|row| row.id == course.id) {
            return Err(StoreError::persistence(format!(
                "course {} already exists",
                course.id
            )));
        }
        self.courses.push(course.clone());
        Ok(())
    }
}
