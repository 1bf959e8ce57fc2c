//! Catalog state: the item set plus the filter, search and page cursor.
//!
//! The filtered set is cached and recomputed only when its inputs change
//! (items, filter, search, auth, or a favorite toggle while the favorites
//! filter is active). Paging moves over the cached set.

use std::sync::Arc;

use dorama_core::catalog::{self, CatalogFilter, DEFAULT_PAGE_SIZE};
use dorama_core::drama::Drama;
use dorama_core::naming::ImageNaming;
use dorama_core::status::WatchStatus;
use dorama_core::types::DbId;
use serde::Serialize;

use crate::user_data::UserDataManager;

/// One card of the visible page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogCard {
    pub drama: Drama,
    pub image_path: String,
    /// Shown when `image_path` fails to load.
    pub fallback_image: String,
    pub is_favorite: bool,
    pub status: Option<WatchStatus>,
}

/// One selectable filter button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: String,
    pub active: bool,
}

/// Shown instead of cards when the current page has nothing to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub search: String,
    pub filter: String,
}

impl EmptyState {
    pub fn message(&self) -> String {
        format!(
            "Nenhum drama encontrado para \"{}\" no filtro \"{}\".",
            self.search, self.filter
        )
    }
}

/// Everything needed to render the catalog at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub cards: Vec<CatalogCard>,
    pub filters: Vec<FilterOption>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub empty_state: Option<EmptyState>,
}

impl CatalogView {
    /// Pagination controls are only shown for more than one page.
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1
    }
}

pub struct CatalogManager {
    dramas: Vec<Drama>,
    filters: Vec<String>,
    filter: CatalogFilter,
    search: String,
    page: usize,
    page_size: usize,
    naming: ImageNaming,
    /// Indices into `dramas` of the current filtered set.
    filtered: Vec<usize>,
    user_data: Arc<UserDataManager>,
}

impl CatalogManager {
    pub fn new(user_data: Arc<UserDataManager>) -> Self {
        Self {
            dramas: Vec::new(),
            filters: catalog::filter_options(&[]),
            filter: CatalogFilter::All,
            search: String::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            naming: ImageNaming::default(),
            filtered: Vec::new(),
            user_data,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self.recompute();
        self
    }

    pub fn with_naming(mut self, naming: ImageNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Replace the item set and rebuild the filter list.
    pub fn set_items(&mut self, dramas: Vec<Drama>) -> CatalogView {
        self.filters = catalog::filter_options(&dramas);
        self.dramas = dramas;
        self.page = 1;
        self.recompute();
        self.view()
    }

    pub fn items(&self) -> &[Drama] {
        &self.dramas
    }

    pub fn find(&self, drama_id: DbId) -> Option<&Drama> {
        self.dramas.iter().find(|d| d.id == drama_id)
    }

    pub fn filter_labels(&self) -> &[String] {
        &self.filters
    }

    pub fn active_filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        catalog::total_pages(self.filtered.len(), self.page_size)
    }

    /// Select a filter by its button label and go back to page 1.
    pub fn select_filter(&mut self, label: &str) -> CatalogView {
        self.filter = CatalogFilter::from_label(label);
        self.page = 1;
        self.recompute();
        self.view()
    }

    /// Update the search term from raw input and go back to page 1.
    pub fn set_search(&mut self, input: &str) -> CatalogView {
        self.search = catalog::normalize_search(input);
        self.page = 1;
        self.recompute();
        self.view()
    }

    /// Advance one page; no-op on the last page.
    pub fn next_page(&mut self) -> CatalogView {
        if self.page < self.total_pages() {
            self.page += 1;
        }
        self.view()
    }

    /// Go back one page; no-op on page 1.
    pub fn previous_page(&mut self) -> CatalogView {
        if self.page > 1 {
            self.page -= 1;
        }
        self.view()
    }

    /// Recompute against freshly loaded user data and go back to page 1.
    pub fn reset_page(&mut self) -> CatalogView {
        self.page = 1;
        self.recompute();
        self.view()
    }

    /// Toggle the favorite flag of an item. Under the favorites filter the
    /// filtered set is recomputed (the page is kept). Returns the new flag,
    /// or `None` if no item has that id.
    pub async fn toggle_favorite(&mut self, drama_id: DbId) -> Option<bool> {
        let drama = self.find(drama_id)?.clone();
        let favorite = self.user_data.toggle_favorite(&drama).await;
        self.favorites_changed();
        Some(favorite)
    }

    /// Re-derive the filtered set after a favorite flag changed elsewhere.
    /// Only the favorites filter depends on it. If the set shrank below the
    /// current page, the page moves back to the last one.
    pub fn favorites_changed(&mut self) -> CatalogView {
        if self.filter == CatalogFilter::Favorites {
            self.recompute();
            self.page = self.page.min(self.total_pages().max(1));
        }
        self.view()
    }

    /// Set or clear the status of an item. Returns `false` if no item has
    /// that id.
    pub async fn set_status(&mut self, drama_id: DbId, status: Option<WatchStatus>) -> bool {
        let Some(drama) = self.find(drama_id).cloned() else {
            return false;
        };
        self.user_data.set_status(&drama, status).await;
        true
    }

    fn recompute(&mut self) {
        let user_data = &self.user_data;
        self.filtered = catalog::apply_filter(&self.dramas, &self.filter, &self.search, |d| {
            user_data.is_favorite(d)
        });
    }

    /// The current page as a renderable view.
    pub fn view(&self) -> CatalogView {
        let total_items = self.filtered.len();
        let total_pages = self.total_pages();
        let cards: Vec<CatalogCard> = catalog::paginate(&self.filtered, self.page, self.page_size)
            .iter()
            .map(|&i| self.card(&self.dramas[i]))
            .collect();
        let filters = self
            .filters
            .iter()
            .map(|label| FilterOption {
                active: label == self.filter.label(),
                label: label.clone(),
            })
            .collect();
        let empty_state = cards.is_empty().then(|| EmptyState {
            search: self.search.clone(),
            filter: self.filter.label().to_string(),
        });

        CatalogView {
            cards,
            filters,
            page: self.page,
            total_pages,
            total_items,
            has_previous: self.page > 1,
            has_next: self.page < total_pages,
            empty_state,
        }
    }

    fn card(&self, drama: &Drama) -> CatalogCard {
        CatalogCard {
            image_path: self.naming.resolve(&drama.image),
            fallback_image: self.naming.fallback().to_string(),
            is_favorite: self.user_data.is_favorite(drama),
            status: self.user_data.status(drama),
            drama: drama.clone(),
        }
    }
}
