use crate::entities::Author;

/// Optional author list filters.
///
/// `main_category` is an exact match. `search_query` is a substring match
/// against the category, first name or last name. Both present means both
/// must hold. Blank values count as absent.
#[derive(Debug, Clone, Default)]
pub struct AuthorFilter {
    pub main_category: Option<String>,
    pub search_query: Option<String>,
    /// Substring search is case-insensitive unless set.
    pub match_case: bool,
}

impl AuthorFilter {
    fn normalized(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn main_category(&self) -> Option<&str> {
        Self::normalized(&self.main_category)
    }

    pub fn search_query(&self) -> Option<&str> {
        Self::normalized(&self.search_query)
    }

    /// True when no filter would narrow the result.
    pub fn is_empty(&self) -> bool {
        self.main_category().is_none() && self.search_query().is_none()
    }

    pub fn matches(&self, author: &Author) -> bool {
        if let Some(category) = self.main_category() {
            if author.main_category != category {
                return false;
            }
        }

        match self.search_query() {
            Some(query) => [
                &author.main_category,
                &author.first_name,
                &author.last_name,
            ]
            .into_iter()
            .any(|field| self.contains(field, query)),
            None => true,
        }
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        if self.match_case {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
    }
}
