//! Database access layer
//!
//! One module per table family. Functions taking `&PgPool` run standalone;
//! functions taking `&mut PgConnection` are meant to run inside a caller's
//! transaction (`&mut *tx`).

pub mod customers;
pub mod dashboard;
pub mod movements;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod raw_materials;
pub mod seed;
pub mod stores;
pub mod users;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Escape `%`/`_` and wrap for `ILIKE` substring search
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" kopi "), "%kopi%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
