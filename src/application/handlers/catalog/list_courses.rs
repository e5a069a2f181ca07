//! ListCoursesHandler - Query handler for the public course list.

use std::sync::Arc;

use crate::domain::catalog::CatalogError;
use crate::ports::{CatalogReader, CourseSummary};

/// Query for the course list. The list is public.
#[derive(Debug, Clone, Default)]
pub struct ListCoursesQuery;

/// Handler for listing courses with their lesson counts.
pub struct ListCoursesHandler {
    catalog: Arc<dyn CatalogReader>,
}

impl ListCoursesHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: ListCoursesQuery) -> Result<Vec<CourseSummary>, CatalogError> {
        Ok(self.catalog.list_courses().await?)
    }
}
