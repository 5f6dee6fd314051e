use std::sync::Arc;

use crate::error::{AppError, AppResult, StoreContext};
use crate::models::{Cinema, CinemaFilter};
use crate::pagination::{Page, PageRequest};
use crate::store::{CatalogStore, Storage};

#[derive(Clone)]
pub struct CinemaService {
    store: Arc<dyn Storage>,
}

impl CinemaService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    pub async fn list_cinemas(&self, filter: &CinemaFilter, page: PageRequest) -> AppResult<Page<Cinema>> {
        let (cinemas, total) = self.store.list_cinemas(filter, page).await.context("list cinemas")?;
        Ok(Page::new(cinemas, page, total))
    }

    pub async fn get_cinema(&self, id: i64) -> AppResult<Cinema> {
        self.store
            .get_cinema(id)
            .await
            .context("load cinema")?
            .ok_or(AppError::NotFound("cinema"))
    }
}
