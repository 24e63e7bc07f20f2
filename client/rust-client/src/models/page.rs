use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by the admin endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Number of pages for the given page size (at least one)
    pub fn total_pages(&self, per_page: u32) -> u64 {
        let per_page = u64::from(per_page.max(1));
        self.count.div_ceil(per_page).max(1)
    }
}

/// Query параметры для списков админки
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,

    /// Поиск по тексту (title, description, body)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Resource specific filters, e.g. ("quiz", "12") or ("category", "3")
    #[serde(flatten)]
    pub filters: std::collections::BTreeMap<String, String>,
}

impl ListQuery {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.insert(key.into(), value.to_string());
        self
    }
}
