use axum::http::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::models::QueryParams;

pub const DEFAULT_LIMIT: u64 = 30;

/// Largest `LIMIT` / `OFFSET` the database drivers bind (they take signed 64-bit).
pub const MAX_WINDOW: u64 = i64::MAX.unsigned_abs();

/// Pagination defaults, deserializable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Page size when `limit` is absent or unusable
    pub default_limit: u64,
    /// Upper bound applied to `limit`, if any
    pub max_limit: Option<u64>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

/// Requested page, read from `limit` and `page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Non-numeric, zero or out-of-range values fall back to the defaults.
    #[must_use]
    pub fn from_params(params: &QueryParams, settings: &QuerySettings) -> Self {
        let positive = |key: &str| {
            params
                .get(key)
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .filter(|n| (1..=MAX_WINDOW).contains(n))
        };

        let mut per_page = positive("limit")
            .unwrap_or(settings.default_limit)
            .clamp(1, MAX_WINDOW);
        if let Some(max) = settings.max_limit {
            per_page = per_page.min(max.max(1));
        }

        Self {
            page: positive("page").unwrap_or(1),
            per_page,
        }
    }

    /// Rows to skip, clamped to [`MAX_WINDOW`]
    #[must_use]
    pub fn offset(&self) -> u64 {
        window_offset(self.page, self.per_page)
    }
}

fn window_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(per_page)
        .min(MAX_WINDOW)
}

/// One page of results plus the metadata clients need to page through the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
    /// 1-based position of the first item on this page
    pub from: Option<u64>,
    /// 1-based position of the last item on this page
    pub to: Option<u64>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, per_page: u64, current_page: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let first = window_offset(current_page, per_page).saturating_add(1);
            (Some(first), Some(first.saturating_add(data.len() as u64 - 1)))
        };

        Self {
            data,
            total,
            per_page,
            current_page,
            last_page,
            from,
            to,
        }
    }

    /// Offset of the first item on this page
    #[must_use]
    pub fn offset(&self) -> u64 {
        window_offset(self.current_page, self.per_page)
    }
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build the `Content-Range` header for a page: `<resource> <offset>-<last>/<total>`.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let max_offset_limit = offset.saturating_add(limit.max(1) - 1).min(total_count);
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {offset}-{max_offset_limit}/{total_count}");

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    } else {
        tracing::debug!(resource = %safe_name, "Skipping unrepresentable Content-Range header");
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::from_params(&QueryParams::new(), &QuerySettings::default());
        assert_eq!(request, PageRequest { page: 1, per_page: 30 });
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_page_request_reads_limit_and_page() {
        let request = PageRequest::from_params(
            &params(&[("limit", "10"), ("page", "3")]),
            &QuerySettings::default(),
        );
        assert_eq!(request, PageRequest { page: 3, per_page: 10 });
        assert_eq!(request.offset(), 20);
    }

    #[test]
    fn test_page_request_invalid_values_fall_back() {
        let request = PageRequest::from_params(
            &params(&[("limit", "lots"), ("page", "0")]),
            &QuerySettings::default(),
        );
        assert_eq!(request, PageRequest { page: 1, per_page: 30 });
    }

    #[test]
    fn test_page_request_out_of_range_values() {
        let huge = PageRequest::from_params(
            &params(&[("limit", "18446744073709551615"), ("page", "18446744073709551615")]),
            &QuerySettings::default(),
        );
        assert_eq!(huge, PageRequest { page: 1, per_page: 30 });

        let far = PageRequest::from_params(
            &params(&[("limit", "30"), ("page", "9223372036854775807")]),
            &QuerySettings::default(),
        );
        assert_eq!(far.page, MAX_WINDOW);
        assert_eq!(far.offset(), MAX_WINDOW);

        let page: Page<u8> = Page::new(vec![], 3, MAX_WINDOW, MAX_WINDOW);
        assert_eq!(page.offset(), MAX_WINDOW);
        assert_eq!(page.last_page, 1);
    }

    #[test]
    fn test_page_request_max_limit() {
        let settings = QuerySettings {
            default_limit: 15,
            max_limit: Some(50),
        };
        let capped = PageRequest::from_params(&params(&[("limit", "500")]), &settings);
        assert_eq!(capped.per_page, 50);
        let defaulted = PageRequest::from_params(&QueryParams::new(), &settings);
        assert_eq!(defaulted.per_page, 15);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 25, 10, 1);
        assert_eq!(page.last_page, 3);
        assert_eq!((page.from, page.to), (Some(1), Some(10)));

        let last = Page::new(vec![21, 22, 23, 24, 25], 25, 10, 3);
        assert_eq!((last.from, last.to), (Some(21), Some(25)));
        assert_eq!(last.offset(), 20);
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u8> = Page::new(vec![], 0, 30, 1);
        assert_eq!(page.last_page, 1);
        assert_eq!((page.from, page.to), (None, None));
    }

    #[test]
    fn test_settings_deserialize_defaults() {
        let settings: QuerySettings = serde_json::from_str(r#"{"max_limit": 100}"#).unwrap();
        assert_eq!(settings.default_limit, DEFAULT_LIMIT);
        assert_eq!(settings.max_limit, Some(100));
    }

    #[test]
    fn test_content_range_normal() {
        let headers = calculate_content_range(0, 10, 100, "users");
        let value = headers.get("Content-Range").unwrap().to_str().unwrap();
        assert_eq!(value, "users 0-9/100");
    }

    #[test]
    fn test_content_range_does_not_overflow() {
        let headers = calculate_content_range(MAX_WINDOW, MAX_WINDOW, 4, "users");
        let value = headers.get("Content-Range").unwrap().to_str().unwrap();
        assert_eq!(value, format!("users {MAX_WINDOW}-4/4"));
    }

    #[test]
    fn test_content_range_strips_control_characters() {
        let headers = calculate_content_range(0, 10, 100, "users\r\nInjected: evil");
        let value = headers.get("Content-Range").unwrap().to_str().unwrap();
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
    }
}
