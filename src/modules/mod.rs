pub mod author_collections;
pub mod authors;
pub mod courses;

use std::sync::Arc;

use courselib_kernel::ModuleRegistry;
use courselib_store::LibraryStore;

/// Register every resource module against the shared `store`.
pub fn register_all(registry: &mut ModuleRegistry, store: &LibraryStore) {
    registry.register(Arc::new(authors::AuthorsModule::new(store.clone())));
    registry.register(Arc::new(courses::CoursesModule::new(store.clone())));
    registry.register(Arc::new(author_collections::AuthorCollectionsModule::new(
        store.clone(),
    )));
}
