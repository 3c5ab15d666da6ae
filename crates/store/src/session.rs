use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::{Author, Course};
use crate::error::{StoreError, StoreResult};
use crate::filter::AuthorFilter;
use crate::tables::{Change, Tables};

/// Shared handle to the committed author and course tables.
#[derive(Debug, Clone, Default)]
pub struct LibraryStore {
    tables: Arc<RwLock<Tables>>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a unit of work. Use one session per request.
    pub fn session(&self) -> LibrarySession {
        LibrarySession {
            store: self.clone(),
            pending: Vec::new(),
        }
    }

    pub async fn author_count(&self) -> usize {
        self.tables.read().await.authors.len()
    }

    /// Insert `authors` in one commit.
    pub async fn seed(&self, authors: Vec<Author>) -> StoreResult<usize> {
        let mut session = self.session();
        for author in authors {
            session.add_author(author);
        }
        session.save().await
    }
}

/// Unit of work over a [`LibraryStore`].
///
/// Queries see committed rows only. `add_*`, `update_*` and `delete_*`
/// stage changes that [`LibrarySession::save`] commits all at once.
#[derive(Debug)]
pub struct LibrarySession {
    store: LibraryStore,
    pending: Vec<Change>,
}

fn require_id(id: Uuid, name: &'static str) -> StoreResult<()> {
    if id.is_nil() {
        return Err(StoreError::InvalidArgument(name));
    }
    Ok(())
}

impl LibrarySession {
    /// Number of staged changes.
    pub fn pending_changes(&self) -> usize {
        self.pending.len()
    }

    pub async fn get_authors(&self) -> Vec<Author> {
        let tables = self.store.tables.read().await;
        tables
            .authors
            .iter()
            .map(|author| tables.hydrate(author))
            .collect()
    }

    /// Authors matching `filter`; identical to [`Self::get_authors`] when the filter is empty.
    pub async fn get_authors_filtered(&self, filter: &AuthorFilter) -> Vec<Author> {
        if filter.is_empty() {
            return self.get_authors().await;
        }

        let tables = self.store.tables.read().await;
        tables
            .authors
            .iter()
            .filter(|author| filter.matches(author))
            .map(|author| tables.hydrate(author))
            .collect()
    }

    /// Authors whose id is in `author_ids`, ordered by last then first name.
    /// Unknown ids are skipped, so callers compare counts to detect misses.
    pub async fn get_authors_by_ids(&self, author_ids: &HashSet<Uuid>) -> Vec<Author> {
        let tables = self.store.tables.read().await;
        let mut authors: Vec<Author> = tables
            .authors
            .iter()
            .filter(|author| author_ids.contains(&author.id))
            .map(|author| tables.hydrate(author))
            .collect();
        authors.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        authors
    }

    pub async fn get_author(&self, author_id: Uuid) -> StoreResult<Option<Author>> {
        require_id(author_id, "author_id")?;

        let tables = self.store.tables.read().await;
        Ok(tables
            .authors
            .iter()
            .find(|author| author.id == author_id)
            .map(|author| tables.hydrate(author)))
    }

    pub async fn author_exists(&self, author_id: Uuid) -> StoreResult<bool> {
        require_id(author_id, "author_id")?;
        Ok(self.store.tables.read().await.author_exists(author_id))
    }

    /// Assign fresh ids to the author and each nested course, then stage the insert.
    /// Returns the author as it will be stored.
    pub fn add_author(&mut self, mut author: Author) -> Author {
        author.id = Uuid::new_v4();
        for course in &mut author.courses {
            course.id = Uuid::new_v4();
            course.author_id = author.id;
        }

        tracing::debug!(author_id = %author.id, courses = author.courses.len(), "author staged");
        self.pending.push(Change::AddAuthor(author.clone()));
        author
    }

    /// Stage a field update for an existing author. Courses are not touched.
    pub fn update_author(&mut self, author: &Author) -> StoreResult<()> {
        require_id(author.id, "author.id")?;
        self.pending.push(Change::UpdateAuthor(author.clone()));
        Ok(())
    }

    /// Stage removal of the author and every course it owns.
    pub fn delete_author(&mut self, author: &Author) -> StoreResult<()> {
        require_id(author.id, "author.id")?;
        self.pending.push(Change::DeleteAuthor(author.id));
        Ok(())
    }

    /// Courses of one author sorted by title; ties keep insertion order.
    pub async fn get_courses(&self, author_id: Uuid) -> StoreResult<Vec<Course>> {
        require_id(author_id, "author_id")?;

        let tables = self.store.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .iter()
            .filter(|course| course.author_id == author_id)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    pub async fn get_course(&self, author_id: Uuid, course_id: Uuid) -> StoreResult<Option<Course>> {
        require_id(author_id, "author_id")?;
        require_id(course_id, "course_id")?;

        let tables = self.store.tables.read().await;
        Ok(tables
            .courses
            .iter()
            .find(|course| course.id == course_id && course.author_id == author_id)
            .cloned())
    }

    /// Whether any author owns a course with this id.
    pub async fn course_exists(&self, course_id: Uuid) -> StoreResult<bool> {
        require_id(course_id, "course_id")?;
        Ok(self
            .store
            .tables
            .read()
            .await
            .courses
            .iter()
            .any(|course| course.id == course_id))
    }

    /// Attach the course to `author_id` and stage the insert. A nil course id
    /// is replaced with a fresh one; any other id is kept.
    pub fn add_course(&mut self, author_id: Uuid, mut course: Course) -> StoreResult<Course> {
        require_id(author_id, "author_id")?;

        if course.id.is_nil() {
            course.id = Uuid::new_v4();
        }
        course.author_id = author_id;

        tracing::debug!(%author_id, course_id = %course.id, "course staged");
        self.pending.push(Change::AddCourse(course.clone()));
        Ok(course)
    }

    /// Stage the course's current title and description for the next commit.
    pub fn update_course(&mut self, course: &Course) -> StoreResult<()> {
        require_id(course.id, "course.id")?;
        require_id(course.author_id, "course.author_id")?;
        self.pending.push(Change::UpdateCourse(course.clone()));
        Ok(())
    }

    pub fn delete_course(&mut self, course: &Course) -> StoreResult<()> {
        require_id(course.id, "course.id")?;
        self.pending.push(Change::DeleteCourse {
            author_id: course.author_id,
            course_id: course.id,
        });
        Ok(())
    }

    /// Commit every staged change atomically and return how many were applied.
    ///
    /// If any change is rejected nothing is applied and the staged changes are
    /// discarded.
    pub async fn save(&mut self) -> StoreResult<usize> {
        let changes = std::mem::take(&mut self.pending);
        if changes.is_empty() {
            return Ok(0);
        }

        let mut tables = self.store.tables.write().await;
        let mut staged = tables.clone();
        for change in &changes {
            if let Err(err) = staged.apply(change) {
                tracing::warn!(error = %err, changes = changes.len(), "commit rejected");
                return Err(err);
            }
        }
        *tables = staged;

        tracing::debug!(changes = changes.len(), "commit applied");
        Ok(changes.len())
    }
}
