//
//  gitlab-tools
//  api/resources/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Projects: listing, lookup and search.
//!
//! Listings and searches pass through the namespace whitelist from the
//! configuration. The filter runs after the page arrives, so a filtered page
//! may hold fewer than `perPage` items while its pagination still describes
//! the unfiltered page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SortDirection;
use crate::api::client::{GitLabClient, Query};
use crate::api::common::{ApiError, Identifier, Paginated, PaginationRequest};
use crate::api::filter::{filter_by_namespace, Namespaced};

/// Project as returned by `GET projects` (with `simple=true`) and `GET projects/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    pub id: u64,
    pub name: String,
    pub name_with_namespace: String,
    pub path_with_namespace: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    pub web_url: String,
}

/// Normalized project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub name_with_namespace: String,
    pub path_with_namespace: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub web_url: String,
}

impl From<GitLabProject> for Project {
    fn from(p: GitLabProject) -> Self {
        Self {
            id: p.id,
            name: p.name,
            name_with_namespace: p.name_with_namespace,
            path_with_namespace: p.path_with_namespace,
            description: p.description.filter(|d| !d.trim().is_empty()),
            default_branch: p.default_branch,
            last_activity_at: p.last_activity_at,
            web_url: p.web_url,
        }
    }
}

impl Namespaced for Project {
    fn namespace_path(&self) -> &str {
        &self.path_with_namespace
    }
}

impl Project {
    /// Identifier addressing this project by its full path.
    pub fn identifier(&self) -> Identifier {
        Identifier::Named(self.path_with_namespace.clone())
    }
}

wire_enum! {
    /// Sort key for project listings.
    ProjectOrder, "orderBy" {
        Id => "id",
        Name => "name",
        Path => "path",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
        LastActivityAt => "last_activity_at",
    }
}

/// Filters for `GET projects`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectQuery {
    /// Free-text search on name and path
    pub search: Option<String>,
    /// Only projects the user is a member of; `None` uses the configured default
    pub membership: Option<bool>,
    /// Archived filter; `None` returns both
    pub archived: Option<bool>,
    /// Defaults to `last_activity_at`
    pub order_by: Option<ProjectOrder>,
    /// Defaults to `desc`
    pub sort: Option<SortDirection>,
}

impl GitLabClient {
    /// Lists projects visible to the token, newest activity first.
    pub async fn list_projects(
        &self,
        query: &ProjectQuery,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Project>>, ApiError> {
        let membership = query
            .membership
            .unwrap_or(self.config().filters.include_membership_only);

        let params = Query::new()
            .push("simple", true)
            .push("membership", membership)
            .push(
                "order_by",
                query.order_by.unwrap_or(ProjectOrder::LastActivityAt),
            )
            .push("sort", query.sort.unwrap_or(SortDirection::Desc))
            .push_opt("search", query.search.as_deref())
            .push_opt("archived", query.archived);

        let page = self
            .get_page::<GitLabProject>(self.endpoint(&["projects"]), params, page)
            .await?;
        Ok(self.namespace_filtered(page.convert()))
    }

    /// Fetches one project by numeric id or full path.
    pub async fn get_project(&self, project: &Identifier) -> Result<Project, ApiError> {
        let remote: GitLabProject = self
            .get_json(self.project_endpoint(project, &[]), Query::new())
            .await?;
        Ok(remote.into())
    }

    /// Global project search (`scope=projects`).
    pub async fn search_projects(
        &self,
        term: &str,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Project>>, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ApiError::validation("search", "must not be empty"));
        }

        let params = Query::new().push("scope", "projects").push("search", term);
        let page = self
            .get_page::<GitLabProject>(self.endpoint(&["search"]), params, page)
            .await?;
        Ok(self.namespace_filtered(page.convert()))
    }

    fn namespace_filtered(&self, page: Paginated<Vec<Project>>) -> Paginated<Vec<Project>> {
        let whitelist = &self.config().filters.include_namespaces;
        page.map(|projects| filter_by_namespace(projects, whitelist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_mapper() {
        let remote: GitLabProject = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "api",
            "name_with_namespace": "Team / api",
            "path_with_namespace": "team/api",
            "description": "  ",
            "default_branch": "main",
            "last_activity_at": "2024-05-01T12:00:00Z",
            "web_url": "https://gitlab.example.com/team/api",
            "star_count": 3
        }))
        .unwrap();

        let project = Project::from(remote);
        assert_eq!(project.id, 42);
        assert_eq!(project.description, None);
        assert_eq!(project.namespace_path(), "team/api");
        assert_eq!(project.identifier(), Identifier::Named("team/api".to_string()));

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["pathWithNamespace"], "team/api");
        assert_eq!(json["defaultBranch"], "main");
        assert_eq!(json["lastActivityAt"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_project_order_wire_names() {
        assert_eq!(ProjectOrder::LastActivityAt.as_str(), "last_activity_at");
        assert_eq!(
            "created_at".parse::<ProjectOrder>().unwrap(),
            ProjectOrder::CreatedAt
        );
        assert_eq!(
            "stars".parse::<ProjectOrder>().unwrap_err().field(),
            Some("orderBy")
        );
    }
}
