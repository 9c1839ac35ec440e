//
//  gitlab-tools
//  api/filter.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Client-side result filters.
//!
//! GitLab has no query parameter for either of these, so they are applied to
//! each page after it arrives. Pagination info still describes the unfiltered
//! page, which means a filtered page may hold fewer items than `perPage`.
//!
//! - [`filter_by_namespace`]: keep projects under whitelisted namespace prefixes
//! - [`PathFilter`]: exact include/exclude matching on diff file paths

/// An entity that lives under a namespace path such as `group/sub/project`.
pub trait Namespaced {
    /// The full namespaced path
    fn namespace_path(&self) -> &str;
}

/// An entity with an old and a new file path (diff entries).
pub trait FilePaths {
    /// Path before the change
    fn old_path(&self) -> &str;
    /// Path after the change
    fn new_path(&self) -> &str;
}

/// Keeps items whose namespaced path starts with at least one whitelist entry.
///
/// An empty whitelist passes everything through.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::filter::{filter_by_namespace, Namespaced};
///
/// struct P(&'static str);
/// impl Namespaced for P {
///     fn namespace_path(&self) -> &str { self.0 }
/// }
///
/// let kept = filter_by_namespace(vec![P("team/api"), P("other/web")], &["team/".to_string()]);
/// assert_eq!(kept.len(), 1);
/// ```
pub fn filter_by_namespace<T: Namespaced>(items: Vec<T>, whitelist: &[String]) -> Vec<T> {
    if whitelist.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            let path = item.namespace_path();
            whitelist.iter().any(|prefix| path.starts_with(prefix.as_str()))
        })
        .collect()
}

/// Exact-path include/exclude filter for diff files.
///
/// A file survives when the include list is empty or one of its paths is
/// listed, and no path is in the exclude list. Matching is plain string
/// equality against both the old and the new path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl PathFilter {
    /// Builds a filter from include and exclude lists.
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Builds a filter for a single file.
    pub fn single(path: impl Into<String>) -> Self {
        Self {
            include: vec![path.into()],
            exclude: Vec::new(),
        }
    }

    /// Resolves the diff tool inputs: a single `file_path` overrides both lists.
    pub fn from_options(
        file_path: Option<String>,
        include: Vec<String>,
        exclude: Vec<String>,
    ) -> Self {
        match file_path {
            Some(path) => Self::single(path),
            None => Self::new(include, exclude),
        }
    }

    /// Returns `true` if the filter lets everything through.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Checks one file against the filter.
    pub fn matches(&self, old_path: &str, new_path: &str) -> bool {
        let listed = |list: &[String]| list.iter().any(|p| p == old_path || p == new_path);

        let included = self.include.is_empty() || listed(&self.include);
        let excluded = !self.exclude.is_empty() && listed(&self.exclude);

        included && !excluded
    }

    /// Applies the filter to a list of files, preserving order.
    pub fn apply<T: FilePaths>(&self, files: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return files;
        }
        files
            .into_iter()
            .filter(|f| self.matches(f.old_path(), f.new_path()))
            .collect()
    }
}
