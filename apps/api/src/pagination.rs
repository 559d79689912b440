//! Page-number pagination for list endpoints.
//! Responses follow the `{count, next, previous, results}` shape the
//! frontend consumes, with relative link URLs.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// 1-based page number; anything missing or zero means page 1.
pub fn page_number(page: Option<u32>) -> u32 {
    page.filter(|p| *p > 0).unwrap_or(1)
}

pub fn page_offset(page_number: u32) -> i64 {
    (page_number as i64 - 1) * DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assembles a page from a total row count and the current page's rows.
    /// `path` is the request path, `filters` any extra query pairs to carry
    /// through into the page links.
    pub fn new(
        count: i64,
        results: Vec<T>,
        page_number: u32,
        path: &str,
        filters: &[(&str, &str)],
    ) -> Self {
        let last_page = ((count.max(0) + DEFAULT_PAGE_SIZE - 1) / DEFAULT_PAGE_SIZE).max(1) as u32;
        let next = (page_number < last_page).then(|| page_link(path, filters, page_number + 1));
        let previous = (page_number > 1).then(|| page_link(path, filters, page_number - 1));
        Page {
            count,
            next,
            previous,
            results,
        }
    }
}

fn page_link(path: &str, filters: &[(&str, &str)], page: u32) -> String {
    let mut link = format!("{path}?page={page}");
    for (key, value) in filters {
        link.push('&');
        link.push_str(key);
        link.push('=');
        link.push_str(value);
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_has_no_links() {
        let page = Page::new(10, vec![1, 2, 3], 1, "/api/profiles", &[]);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
        assert_eq!(page.count, 10);
    }

    #[test]
    fn test_first_of_two_pages() {
        let rows: Vec<u32> = (0..50).collect();
        let page = Page::new(51, rows, 1, "/api/profiles", &[]);
        assert_eq!(page.next.as_deref(), Some("/api/profiles?page=2"));
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_last_page_has_previous_only() {
        let page = Page::new(51, vec![50], 2, "/api/profiles", &[]);
        assert!(page.next.is_none());
        assert_eq!(page.previous.as_deref(), Some("/api/profiles?page=1"));
    }

    #[test]
    fn test_filters_carried_into_links() {
        let page = Page::new(120, vec![0; 50], 2, "/api/jobs", &[("status", "pending")]);
        assert_eq!(page.next.as_deref(), Some("/api/jobs?page=3&status=pending"));
        assert_eq!(
            page.previous.as_deref(),
            Some("/api/jobs?page=1&status=pending")
        );
    }

    #[test]
    fn test_empty_result_set() {
        let page: Page<u32> = Page::new(0, vec![], 1, "/api/jobs", &[]);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_page_number_defaults_to_one() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some(0)), 1);
        assert_eq!(page_number(Some(3)), 3);
        assert_eq!(page_offset(2), 50);
    }
}
