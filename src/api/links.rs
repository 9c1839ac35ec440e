//
//  gitlab-tools
//  api/links.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deep links into the GitLab web UI.
//!
//! These are presentation helpers, no request is made. Links are built by
//! appending path segments to the configured base URL, so instances hosted
//! under a sub-path (`https://example.com/gitlab`) keep that prefix. Namespace
//! paths keep their `/` separators; each segment and every query value is
//! percent-encoded.

use url::Url;

/// Ref used for tag creation links when the project's default branch is unknown.
pub const DEFAULT_TAG_REF: &str = "master";

/// Builds web URLs relative to a GitLab instance.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::links::WebLinks;
/// use url::Url;
///
/// let links = WebLinks::new(Url::parse("https://gitlab.example.com").unwrap());
/// assert_eq!(
///     links.merge_request_url("team/api", 7),
///     "https://gitlab.example.com/team/api/-/merge_requests/7"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebLinks {
    base: Url,
}

impl WebLinks {
    /// Creates a link builder for the given instance URL.
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// The instance URL links are built from.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn build<'a>(&self, path: &'a str, suffix: &[&'a str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()))
                .extend(suffix.iter().copied());
        }
        url
    }

    /// `{base}/{path}`
    pub fn project_url(&self, project_path: &str) -> String {
        self.build(project_path, &[]).to_string()
    }

    /// `{base}/{path}/-/merge_requests/{iid}`
    pub fn merge_request_url(&self, project_path: &str, iid: u64) -> String {
        let iid = iid.to_string();
        self.build(project_path, &["-", "merge_requests", iid.as_str()])
            .to_string()
    }

    /// `{base}/{path}/-/pipelines/{id}`
    pub fn pipeline_url(&self, project_path: &str, pipeline_id: u64) -> String {
        let id = pipeline_id.to_string();
        self.build(project_path, &["-", "pipelines", id.as_str()]).to_string()
    }

    /// `{base}/{path}/-/jobs/{id}`
    pub fn job_url(&self, project_path: &str, job_id: u64) -> String {
        let id = job_id.to_string();
        self.build(project_path, &["-", "jobs", id.as_str()]).to_string()
    }

    /// `{base}/{path}/-/jobs/{id}/raw`, the plain-text job log.
    pub fn job_raw_trace_url(&self, project_path: &str, job_id: u64) -> String {
        let id = job_id.to_string();
        self.build(project_path, &["-", "jobs", id.as_str(), "raw"])
            .to_string()
    }

    /// `{base}/{path}/-/tags/{name}`
    pub fn tag_url(&self, project_path: &str, tag_name: &str) -> String {
        self.build(project_path, &["-", "tags", tag_name]).to_string()
    }

    /// `{base}/{path}/-/tags/new?tag_name={tag}&ref={ref}`
    ///
    /// `git_ref` falls back to [`DEFAULT_TAG_REF`].
    pub fn tag_creation_url(
        &self,
        project_path: &str,
        tag_name: &str,
        git_ref: Option<&str>,
    ) -> String {
        let mut url = self.build(project_path, &["-", "tags", "new"]);
        url.query_pairs_mut()
            .append_pair("tag_name", tag_name)
            .append_pair("ref", git_ref.unwrap_or(DEFAULT_TAG_REF));
        url.to_string()
    }

    /// `{base}/{username}`
    pub fn user_url(&self, username: &str) -> String {
        self.build(username, &[]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(base: &str) -> WebLinks {
        WebLinks::new(Url::parse(base).unwrap())
    }

    #[test]
    fn test_resource_links() {
        let l = links("https://gitlab.example.com");
        assert_eq!(
            l.project_url("group/sub/proj"),
            "https://gitlab.example.com/group/sub/proj"
        );
        assert_eq!(
            l.pipeline_url("group/proj", 991),
            "https://gitlab.example.com/group/proj/-/pipelines/991"
        );
        assert_eq!(
            l.job_url("group/proj", 12),
            "https://gitlab.example.com/group/proj/-/jobs/12"
        );
        assert_eq!(
            l.job_raw_trace_url("group/proj", 12),
            "https://gitlab.example.com/group/proj/-/jobs/12/raw"
        );
        assert_eq!(l.user_url("jdoe"), "https://gitlab.example.com/jdoe");
    }

    #[test]
    fn test_base_with_sub_path() {
        for base in ["https://example.com/gitlab", "https://example.com/gitlab/"] {
            assert_eq!(
                links(base).merge_request_url("team/api", 3),
                "https://example.com/gitlab/team/api/-/merge_requests/3"
            );
        }
    }

    #[test]
    fn test_tag_creation_link_encodes_query() {
        let l = links("https://gitlab.example.com/");
        assert_eq!(
            l.tag_creation_url("team/api", "v1.3.1", None),
            "https://gitlab.example.com/team/api/-/tags/new?tag_name=v1.3.1&ref=master"
        );
        assert_eq!(
            l.tag_creation_url("team/api", "v1.3.1", Some("release/1.x")),
            "https://gitlab.example.com/team/api/-/tags/new?tag_name=v1.3.1&ref=release%2F1.x"
        );
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let l = links("https://gitlab.example.com");
        assert_eq!(
            l.tag_url("team/api", "v1.0.0+build 5"),
            "https://gitlab.example.com/team/api/-/tags/v1.0.0+build%205"
        );
    }
}
