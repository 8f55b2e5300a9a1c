//! Page-number pagination envelope: `{count, next, previous, results}`

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one page of results, linking neighbor pages relative to `path`
    pub fn new(path: &str, query: &PageQuery, count: i64, results: Vec<T>) -> Self {
        Self::with_params(path, query, &[], count, results)
    }

    /// Like `new`, but carries the listing's active filter params into the
    /// neighbor links so following `next` keeps the filtered view
    pub fn with_params(
        path: &str,
        query: &PageQuery,
        params: &[(&str, &str)],
        count: i64,
        results: Vec<T>,
    ) -> Self {
        let page = query.page();
        let limit = query.limit();

        let link = |target_page: i64| {
            let mut url = format!("{path}?page={target_page}&limit={limit}");
            for (name, value) in params {
                url.push_str(&format!("&{name}={value}"));
            }
            url
        };

        let next = (page * limit < count).then(|| link(page + 1));
        let previous = (page > 1).then(|| link(page - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}
