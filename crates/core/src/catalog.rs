//! Catalog filter, search, and pagination rules.
//!
//! Everything here is a pure function over a slice of [`Drama`]s. The
//! stateful side (current filter, search term, page cursor) lives in the
//! library crate's catalog manager, which calls into these helpers.

use std::collections::BTreeSet;

use crate::drama::Drama;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Label of the pass-everything filter.
pub const FILTER_ALL: &str = "Todos";

/// Label of the favorites-only filter.
pub const FILTER_FAVORITES: &str = "Meus Favoritos";

/// Default number of items per catalog page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// The active genre/favorites criterion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogFilter {
    #[default]
    All,
    Favorites,
    /// Exact genre string; compared verbatim against an item's genre list.
    Genre(String),
}

impl CatalogFilter {
    /// Map a filter label (as offered by [`filter_options`]) to a filter.
    pub fn from_label(label: &str) -> Self {
        match label {
            FILTER_ALL => Self::All,
            FILTER_FAVORITES => Self::Favorites,
            genre => Self::Genre(genre.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => FILTER_ALL,
            Self::Favorites => FILTER_FAVORITES,
            Self::Genre(genre) => genre,
        }
    }
}

/// Upper-case the first character and lower-case the rest.
pub fn normalize_genre(genre: &str) -> String {
    let mut chars = genre.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Build the selectable filter list for an item set.
///
/// Always `["Todos", "Meus Favoritos", ...genres]` where the genres are the
/// distinct, case-normalized genres of all items in lexicographic order.
/// Empty genre strings are not offered as filters.
pub fn filter_options(dramas: &[Drama]) -> Vec<String> {
    let genres: BTreeSet<String> = dramas
        .iter()
        .flat_map(|d| d.genres.iter())
        .filter(|g| !g.is_empty())
        .map(|g| normalize_genre(g))
        .collect();

    let mut options = Vec::with_capacity(genres.len() + 2);
    options.push(FILTER_ALL.to_string());
    options.push(FILTER_FAVORITES.to_string());
    options.extend(genres);
    options
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Normalize raw search input the way the search box does: trimmed and
/// lower-cased.
pub fn normalize_search(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Case-insensitive substring match on the title. `term` must already be
/// normalized; an empty term matches everything.
pub fn matches_search(drama: &Drama, term: &str) -> bool {
    term.is_empty() || drama.title.to_lowercase().contains(term)
}

/// Genre/favorites criterion. `is_favorite` is only consulted for
/// [`CatalogFilter::Favorites`].
pub fn matches_filter(
    drama: &Drama,
    filter: &CatalogFilter,
    is_favorite: impl FnOnce(&Drama) -> bool,
) -> bool {
    match filter {
        CatalogFilter::All => true,
        CatalogFilter::Favorites => is_favorite(drama),
        CatalogFilter::Genre(genre) => drama.genres.iter().any(|g| g == genre),
    }
}

/// Positions in `dramas` of every item passing both the filter and the
/// search criterion, in input order.
pub fn apply_filter<F>(
    dramas: &[Drama],
    filter: &CatalogFilter,
    term: &str,
    is_favorite: F,
) -> Vec<usize>
where
    F: Fn(&Drama) -> bool,
{
    dramas
        .iter()
        .enumerate()
        .filter(|(_, d)| matches_filter(d, filter, &is_favorite) && matches_search(d, term))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Number of pages needed for `count` items (`ceil(count / page_size)`).
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// The `[ (page-1)*page_size, page*page_size )` window of `items`.
///
/// Pages are 1-based. Out-of-range pages (including page 0) yield an empty
/// slice instead of wrapping.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Drama> {
        vec![
            Drama::new(1, "A", &["Drama"]),
            Drama::new(2, "B", &["Comedy"]),
        ]
    }

    #[test]
    fn normalize_genre_capitalizes_first_letter_only() {
        assert_eq!(normalize_genre("rOMANCE"), "Romance");
        assert_eq!(normalize_genre("ação"), "Ação");
        assert_eq!(normalize_genre(""), "");
    }

    #[test]
    fn filter_options_dedupes_normalizes_and_sorts() {
        let dramas = vec![
            Drama::new(1, "A", &["romance", "Drama"]),
            Drama::new(2, "B", &["ROMANCE", "comedy"]),
            Drama::new(3, "C", &[]),
        ];
        assert_eq!(
            filter_options(&dramas),
            vec!["Todos", "Meus Favoritos", "Comedy", "Drama", "Romance"]
        );
    }

    #[test]
    fn empty_genre_is_not_a_filter() {
        let dramas = vec![Drama::new(1, "A", &["", "Drama"])];
        assert_eq!(filter_options(&dramas), vec![FILTER_ALL, FILTER_FAVORITES, "Drama"]);
    }

    #[test]
    fn filter_options_for_empty_catalog_has_only_fixed_entries() {
        assert_eq!(filter_options(&[]), vec![FILTER_ALL, FILTER_FAVORITES]);
    }

    #[test]
    fn filter_labels_round_trip() {
        assert_eq!(CatalogFilter::from_label("Todos"), CatalogFilter::All);
        assert_eq!(
            CatalogFilter::from_label("Meus Favoritos"),
            CatalogFilter::Favorites
        );
        let genre = CatalogFilter::from_label("Drama");
        assert_eq!(genre, CatalogFilter::Genre("Drama".into()));
        assert_eq!(genre.label(), "Drama");
    }

    #[test]
    fn genre_filter_matches_exact_string() {
        let dramas = sample();
        let visible = apply_filter(&dramas, &CatalogFilter::Genre("Drama".into()), "", |_| false);
        assert_eq!(visible.len(), 1);
        assert_eq!(dramas[visible[0]].title, "A");

        let none = apply_filter(&dramas, &CatalogFilter::Genre("drama".into()), "", |_| false);
        assert!(none.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let dramas = sample();
        let term = normalize_search("  b ");
        let visible = apply_filter(&dramas, &CatalogFilter::All, &term, |_| false);
        assert_eq!(visible.len(), 1);
        assert_eq!(dramas[visible[0]].title, "B");
    }

    #[test]
    fn favorites_filter_consults_predicate() {
        let dramas = sample();
        let visible = apply_filter(&dramas, &CatalogFilter::Favorites, "", |d| d.id == 2);
        assert_eq!(visible.iter().map(|&i| dramas[i].id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn apply_filter_is_idempotent() {
        let dramas = vec![
            Drama::new(1, "Goblin", &["Fantasy"]),
            Drama::new(2, "Vincenzo", &["Crime"]),
            Drama::new(3, "Signal", &["Crime", "Fantasy"]),
        ];
        let filter = CatalogFilter::Genre("Crime".into());
        let first = apply_filter(&dramas, &filter, "n", |_| false);
        let second = apply_filter(&dramas, &filter, "n", |_| false);
        assert_eq!(first, second);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn paginate_out_of_range_is_empty() {
        let items: Vec<u32> = (0..5).collect();
        assert_eq!(paginate(&items, 1, 2), &[0, 1]);
        assert_eq!(paginate(&items, 3, 2), &[4]);
        assert!(paginate(&items, 4, 2).is_empty());
        assert!(paginate(&items, 0, 2).is_empty());
    }

    #[test]
    fn concatenated_pages_reconstruct_the_full_set() {
        for n in 0..30usize {
            let items: Vec<usize> = (0..n).collect();
            for page_size in 1..8usize {
                let rebuilt: Vec<usize> = (1..=total_pages(n, page_size))
                    .flat_map(|p| paginate(&items, p, page_size).iter().copied())
                    .collect();
                assert_eq!(rebuilt, items, "n={n} page_size={page_size}");
            }
        }
    }
}
