//! Named dispersion catalog.
//!
//! Entries are addressed by a `(book, page)` pair: the book names the
//! compound or glass family, the page the source of the data. A lookup
//! succeeds only if exactly one entry matches both identifiers.

use std::sync::Arc;

use crate::dispersion::{Dispersion, MaterialError};
use crate::formulas::{ConstantIndex, Sellmeier};
use crate::material::IsotropicMaterial;

/// A single catalog entry.
#[derive(Clone)]
pub struct CatalogEntry {
    pub book: String,
    pub page: String,
    /// Long descriptive name of the book (e.g. "Fused silica").
    pub long_name: String,
    pub dispersion: Arc<dyn Dispersion>,
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("book", &self.book)
            .field("page", &self.page)
            .field("long_name", &self.long_name)
            .finish()
    }
}

/// In-memory `(book, page)` registry.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with a few reference dispersions.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        // I. H. Malitson, J. Opt. Soc. Am. 55, 1205 (1965).
        catalog.register(
            "SiO2",
            "Malitson",
            "Fused silica",
            Arc::new(
                Sellmeier::new("SiO2 (Malitson)")
                    .term(0.696_166_3, 0.068_404_3_f64.powi(2))
                    .term(0.407_942_6, 0.116_241_4_f64.powi(2))
                    .term(0.897_479_4, 9.896_161_f64.powi(2))
                    .valid_between(210.0, 6700.0),
            ),
        );

        // SCHOTT optical glass data sheet, N-BK7.
        catalog.register(
            "SCHOTT-BK",
            "N-BK7",
            "Borosilicate crown glass",
            Arc::new(
                Sellmeier::new("N-BK7 (SCHOTT)")
                    .term(1.039_612_12, 0.006_000_698_67)
                    .term(0.231_792_344, 0.020_017_914_4)
                    .term(1.010_469_45, 103.560_653)
                    .valid_between(300.0, 2500.0),
            ),
        );

        catalog.register(
            "Air",
            "Vacuum",
            "Air (vacuum approximation)",
            Arc::new(ConstantIndex::real(1.0).with_name("Air")),
        );

        catalog
    }

    /// Add an entry. Duplicates are accepted and make lookups ambiguous.
    pub fn register(
        &mut self,
        book: impl Into<String>,
        page: impl Into<String>,
        long_name: impl Into<String>,
        dispersion: Arc<dyn Dispersion>,
    ) {
        self.entries.push(CatalogEntry {
            book: book.into(),
            page: page.into(),
            long_name: long_name.into(),
            dispersion,
        });
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries whose book or long name contains `query` (case-insensitive).
    pub fn search_book(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.book.to_lowercase().contains(&query) || e.long_name.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Entries whose page contains `query` (case-insensitive).
    pub fn search_page(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.page.to_lowercase().contains(&query))
            .collect()
    }

    /// The dispersion registered under exactly `(book, page)`.
    pub fn load_dispersion(&self, book: &str, page: &str) -> Result<Arc<dyn Dispersion>, MaterialError> {
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.book == book && e.page == page);

        let first = matches.next();
        let rest = matches.count();
        match (first, rest) {
            (Some(entry), 0) => {
                log::debug!("Catalog: loaded {}/{} ({})", book, page, entry.long_name);
                Ok(Arc::clone(&entry.dispersion))
            }
            (None, _) => Err(MaterialError::NotFound {
                book: book.into(),
                page: page.into(),
            }),
            (Some(_), rest) => Err(MaterialError::Ambiguous {
                book: book.into(),
                page: page.into(),
                matches: rest + 1,
            }),
        }
    }

    /// Isotropic material built from a catalog dispersion.
    pub fn get_material(&self, book: &str, page: &str) -> Result<IsotropicMaterial, MaterialError> {
        self.load_dispersion(book, page).map(IsotropicMaterial::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::OpticalMaterial;

    #[test]
    fn test_builtin_lookup() {
        let catalog = Catalog::builtin();
        let bk7 = catalog.get_material("SCHOTT-BK", "N-BK7").unwrap();
        let n = bk7.refractive_index(587.6).unwrap().unwrap();
        assert!((n.re - 1.5168).abs() < 2e-4, "N-BK7 n_d = {}", n.re);
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let catalog = Catalog::builtin();
        assert!(matches!(
            catalog.load_dispersion("Au", "Johnson"),
            Err(MaterialError::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_entries_are_ambiguous() {
        let mut catalog = Catalog::new();
        catalog.register("X", "Y", "first", Arc::new(ConstantIndex::real(1.2)));
        catalog.register("X", "Y", "second", Arc::new(ConstantIndex::real(1.3)));
        match catalog.load_dispersion("X", "Y") {
            Err(MaterialError::Ambiguous { matches, .. }) => assert_eq!(matches, 2),
            other => panic!("expected Ambiguous, got {:?}", other.map(|d| d.name().to_string())),
        }
    }

    #[test]
    fn test_search_book_matches_long_name() {
        let catalog = Catalog::builtin();
        let hits = catalog.search_book("fused");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book, "SiO2");

        // Substring search, no word boundaries: "borosilicate" contains "silica".
        let mut books: Vec<_> = catalog.search_book("Silica").into_iter().map(|e| e.book.as_str()).collect();
        books.sort_unstable();
        assert_eq!(books, ["SCHOTT-BK", "SiO2"]);
    }

    #[test]
    fn test_search_page_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let hits = catalog.search_page("bk7");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].page, "N-BK7");
        assert!(catalog.search_page("johnson").is_empty());
    }
}
