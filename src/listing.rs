//! Derived list state: tag scoping, project search and pagination.

use std::collections::{BTreeSet, HashSet};

use crate::models::{Project, Tagged};

/// Reserved tag value meaning "no filter".
pub const ALL_TAGS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some(ALL_TAGS) => TagFilter::All,
            Some(tag) => TagFilter::Tag(tag.to_string()),
        }
    }

    pub fn matches(&self, tags: &[String]) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Tag(wanted) => tags.iter().any(|t| t == wanted),
        }
    }

    pub fn apply<'a, T: Tagged>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item.tags())).collect()
    }
}

/// Tag and page cursor for a paginated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    tag: TagFilter,
    page: usize,
    per_page: usize,
}

impl ListState {
    pub fn new(per_page: usize) -> Self {
        Self {
            tag: TagFilter::All,
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn tag(&self) -> &TagFilter {
        &self.tag
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Changing the tag always sends the cursor back to the first page.
    pub fn select_tag(&mut self, tag: TagFilter) {
        self.tag = tag;
        self.page = 1;
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn with_tag(&self, tag: TagFilter) -> Self {
        let mut next = self.clone();
        next.select_tag(tag);
        next
    }

    pub fn with_page(&self, page: usize) -> Self {
        let mut next = self.clone();
        next.go_to(page);
        next
    }

    /// Query-string link for this state under `base`.
    pub fn href(&self, base: &str) -> String {
        let mut params = Vec::new();
        if let TagFilter::Tag(tag) = &self.tag {
            params.push(format!("tag={}", urlencoding::encode(tag)));
        }
        if self.page > 1 {
            params.push(format!("page={}", self.page));
        }
        if params.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, params.join("&"))
        }
    }

    pub fn view<'a, T: Tagged>(&self, items: &'a [T]) -> PageView<'a, T> {
        let filtered = self.tag.apply(items);
        let total_items = filtered.len();
        let total_pages = total_items.div_ceil(self.per_page);
        let page = self.page.clamp(1, total_pages.max(1));

        let items = filtered
            .into_iter()
            .skip((page - 1) * self.per_page)
            .take(self.per_page)
            .collect();

        PageView {
            items,
            page,
            total_pages,
            total_items,
        }
    }
}

#[derive(Debug)]
pub struct PageView<'a, T> {
    pub items: Vec<&'a T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> PageView<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `"all"` followed by every distinct tag in first-seen order.
/// Tags that would read back as "no filter" are left out.
pub fn tag_vocabulary<T: Tagged>(items: &[T]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = vec![ALL_TAGS.to_string()];
    for tag in items.iter().flat_map(|item| item.tags()) {
        if TagFilter::parse(Some(tag)) == TagFilter::All {
            continue;
        }
        if seen.insert(tag.as_str()) {
            tags.push(tag.clone());
        }
    }
    tags
}

pub fn sorted_tags<T: Tagged>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.tags())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Free-text search ANDed with an optional tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub query: String,
    pub tag: Option<String>,
}

impl ProjectFilter {
    pub fn new(query: Option<&str>, tag: Option<&str>) -> Self {
        Self {
            query: query.unwrap_or_default().trim().to_string(),
            tag: tag
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        let needle = self.query.to_lowercase();
        let matches_search = project.title.to_lowercase().contains(&needle)
            || project.desc.to_lowercase().contains(&needle);
        let matches_tag = self
            .tag
            .as_ref()
            .is_none_or(|tag| project.tags.iter().any(|t| t == tag));
        matches_search && matches_tag
    }

    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}
