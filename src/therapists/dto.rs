use serde::{Deserialize, Serialize};

use crate::therapists::repo::TherapistProfile;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 50;

/// Query string for the directory listing. Page and page size are sanitized
/// here; the response metadata always reflects the sanitized values.
#[derive(Debug, Default, Deserialize)]
pub struct TherapistListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub specialization: Option<String>,
    pub verified: Option<bool>,
    pub min_rating: Option<f64>,
}

impl TherapistListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Clamped to MAX_PER_PAGE regardless of what the caller asked for.
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Row offset for the sanitized page. Saturates so an absurd page number
    /// still lands on an empty page instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PageMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// Derived from the total count at query time; nothing here is cached.
    pub fn compute(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TherapistListResponse {
    pub therapists: Vec<TherapistProfile>,
    pub pagination: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct TherapistResponse {
    pub therapist: TherapistProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_floors() {
        let q = TherapistListQuery::default();
        assert_eq!(q.page(), 1);

        let q = TherapistListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);

        let q = TherapistListQuery {
            page: Some(-3),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn per_page_defaults_to_ten() {
        let q = TherapistListQuery::default();
        assert_eq!(q.per_page(), 10);
    }

    #[test]
    fn per_page_clamps_to_fifty() {
        let q = TherapistListQuery {
            per_page: Some(1000),
            ..Default::default()
        };
        assert_eq!(q.per_page(), 50);

        let q = TherapistListQuery {
            per_page: Some(0),
            ..Default::default()
        };
        assert_eq!(q.per_page(), 1);
    }

    #[test]
    fn offset_starts_at_zero() {
        let q = TherapistListQuery::default();
        assert_eq!(q.offset(), 0);

        let q = TherapistListQuery {
            page: Some(3),
            per_page: Some(10),
            ..Default::default()
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn offset_saturates_on_huge_page() {
        // page=i64::MAX must stay an empty page, never an overflow.
        let q = TherapistListQuery {
            page: Some(i64::MAX),
            per_page: Some(50),
            ..Default::default()
        };
        assert_eq!(q.offset(), i64::MAX);

        let q = TherapistListQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(q.offset(), i64::MAX);
    }

    #[test]
    fn meta_for_partial_last_page() {
        let meta = PageMeta::compute(1, 10, 23);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let meta = PageMeta::compute(3, 10, 23);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn meta_for_exact_multiple() {
        let meta = PageMeta::compute(2, 10, 20);
        assert_eq!(meta.pages, 2);
        assert!(!meta.has_next);
    }

    #[test]
    fn meta_for_empty_directory() {
        let meta = PageMeta::compute(1, 10, 0);
        assert_eq!(meta.pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn meta_past_the_end_has_no_next() {
        // page=999 with 3 matches: empty items, not an error.
        let meta = PageMeta::compute(999, 10, 3);
        assert_eq!(meta.total, 3);
        assert_eq!(meta.pages, 1);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn query_deserializes_from_url_params() {
        let q: TherapistListQuery =
            serde_urlencoded_like("page=2&per_page=25&specialization=cbt&verified=true&min_rating=4.5");
        assert_eq!(q.page(), 2);
        assert_eq!(q.per_page(), 25);
        assert_eq!(q.specialization.as_deref(), Some("cbt"));
        assert_eq!(q.verified, Some(true));
        assert_eq!(q.min_rating, Some(4.5));
    }

    // Deserialize through serde_json to avoid pulling a query-string crate
    // into dev-dependencies; field semantics are identical.
    fn serde_urlencoded_like(qs: &str) -> TherapistListQuery {
        let mut map = serde_json::Map::new();
        for pair in qs.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            let value = match k {
                "page" | "per_page" => serde_json::json!(v.parse::<i64>().unwrap()),
                "verified" => serde_json::json!(v.parse::<bool>().unwrap()),
                "min_rating" => serde_json::json!(v.parse::<f64>().unwrap()),
                _ => serde_json::json!(v),
            };
            map.insert(k.to_string(), value);
        }
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }
}
