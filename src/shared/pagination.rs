//! Pagination and name filtering shared by every listing endpoint.

use serde::{Deserialize, Serialize};

use super::error::AppError;

pub const DEFAULT_PAGE_ITEMS: u32 = 50;
const MAX_FILTER_LENGTH: usize = 50;

/// Requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_items: u32,
}

impl Pagination {
    /// Build from raw query values, applying defaults and bounds.
    pub fn new(page: Option<u32>, page_items: Option<u32>, max_page_items: u32) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        let page_items = page_items.unwrap_or(DEFAULT_PAGE_ITEMS.min(max_page_items));

        if page == 0 {
            return Err(AppError::invalid("page", "Page must be greater than zero"));
        }
        if page_items == 0 || page_items > max_page_items {
            return Err(AppError::Validation(vec![super::error::FieldError::new(
                "page_items",
                format!("Page items must be between 1 and {}", max_page_items),
            )]));
        }

        Ok(Self { page, page_items })
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_items as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_items as i64
    }

    /// Total number of pages for `total` rows.
    pub fn pages_total(&self, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        ((total + self.limit() - 1) / self.limit()) as u32
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_items: DEFAULT_PAGE_ITEMS,
        }
    }
}

/// One page of results together with the row count it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Paginated response envelope.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub page: u32,
    pub pages_total: u32,
    pub items: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<U>(page: Page<U>, pagination: Pagination, f: impl FnMut(U) -> T) -> Self {
        let pages_total = pagination.pages_total(page.total);
        Self {
            page: pagination.page,
            pages_total,
            items: page.items.into_iter().map(f).collect(),
        }
    }
}

/// How a name filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

/// Case-insensitive name filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    pub text: String,
    pub filter_type: FilterType,
}

impl NameFilter {
    /// Both parts must be present together, or neither.
    pub fn from_query(text: Option<String>, filter_type: Option<FilterType>) -> Result<Option<Self>, AppError> {
        match (text, filter_type) {
            (None, None) => Ok(None),
            (Some(text), Some(filter_type)) => {
                let len = text.chars().count();
                if len == 0 || len > MAX_FILTER_LENGTH {
                    return Err(AppError::invalid(
                        "filter_text",
                        "Filter text must be between 1 and 50 characters",
                    ));
                }
                Ok(Some(Self { text, filter_type }))
            }
            (Some(_), None) => Err(AppError::invalid(
                "filter_type",
                "Filter type is required when filter text is given",
            )),
            (None, Some(_)) => Err(AppError::invalid(
                "filter_text",
                "Filter text is required when filter type is given",
            )),
        }
    }

    /// Pattern for `ILIKE ... ESCAPE '\'`.
    pub fn like_pattern(&self) -> String {
        let escaped = escape_like(&self.text);
        match self.filter_type {
            FilterType::Equals => escaped,
            FilterType::StartsWith => format!("{}%", escaped),
            FilterType::EndsWith => format!("%{}", escaped),
            FilterType::Contains => format!("%{}%", escaped),
        }
    }
}

/// Optional filter to a pattern that matches everything when absent.
pub fn like_pattern(filter: Option<&NameFilter>) -> String {
    filter.map(NameFilter::like_pattern).unwrap_or_else(|| "%".into())
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let p = Pagination::new(None, None, 100).unwrap();
        assert_eq!(p, Pagination { page: 1, page_items: 50 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_default_page_items_respects_lower_max() {
        let p = Pagination::new(None, None, 20).unwrap();
        assert_eq!(p.page_items, 20);
    }

    #[test]
    fn test_offset() {
        let p = Pagination::new(Some(3), Some(10), 100).unwrap();
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 10);
    }

    #[test_case(Some(0), Some(10) ; "zero page")]
    #[test_case(Some(1), Some(0) ; "zero page items")]
    #[test_case(Some(1), Some(101) ; "too many page items")]
    fn test_invalid_pagination(page: Option<u32>, page_items: Option<u32>) {
        assert!(Pagination::new(page, page_items, 100).is_err());
    }

    #[test_case(0, 0)]
    #[test_case(1, 1)]
    #[test_case(10, 1)]
    #[test_case(11, 2)]
    #[test_case(30, 3)]
    fn test_pages_total(total: i64, expected: u32) {
        let p = Pagination::new(Some(1), Some(10), 100).unwrap();
        assert_eq!(p.pages_total(total), expected);
    }

    #[test]
    fn test_paginated_response_beyond_last_page_is_empty() {
        let p = Pagination::new(Some(5), Some(10), 100).unwrap();
        let response = PaginatedResponse::from_page(Page::<i32>::new(vec![], 12), p, |x| x);
        assert_eq!(response.page, 5);
        assert_eq!(response.pages_total, 2);
        assert!(response.items.is_empty());
    }

    #[test_case(FilterType::Equals, "milk")]
    #[test_case(FilterType::StartsWith, "milk%")]
    #[test_case(FilterType::EndsWith, "%milk")]
    #[test_case(FilterType::Contains, "%milk%")]
    fn test_like_patterns(filter_type: FilterType, expected: &str) {
        let filter = NameFilter {
            text: "milk".into(),
            filter_type,
        };
        assert_eq!(filter.like_pattern(), expected);
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        let filter = NameFilter {
            text: "50%_off\\".into(),
            filter_type: FilterType::Contains,
        };
        assert_eq!(filter.like_pattern(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_absent_filter_matches_everything() {
        assert_eq!(like_pattern(None), "%");
    }

    #[test]
    fn test_filter_requires_both_parts() {
        assert!(NameFilter::from_query(None, None).unwrap().is_none());
        assert!(NameFilter::from_query(Some("a".into()), None).is_err());
        assert!(NameFilter::from_query(None, Some(FilterType::Equals)).is_err());
        assert!(NameFilter::from_query(Some(String::new()), Some(FilterType::Equals)).is_err());
        assert!(NameFilter::from_query(Some("a".repeat(51)), Some(FilterType::Equals)).is_err());
        assert!(NameFilter::from_query(Some("bread".into()), Some(FilterType::Contains))
            .unwrap()
            .is_some());
    }
}
