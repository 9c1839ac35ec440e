//
//  gitlab-tools
//  api/resources/members.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project and group members.
//!
//! With `inherited` set (the default) the `/members/all` endpoint is used, which
//! includes members inherited from ancestor groups.

use serde::{Deserialize, Serialize};

use crate::api::client::{GitLabClient, Query};
use crate::api::common::{ApiError, Identifier, Paginated, PaginationRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMember {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub web_url: String,
    pub access_level: u32,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Normalized member with a readable role name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub avatar_url: Option<String>,
    pub web_url: String,
    pub access_level: u32,
    pub access_level_description: String,
    pub expires_at: Option<String>,
}

impl From<GitLabMember> for Member {
    fn from(m: GitLabMember) -> Self {
        Self {
            access_level_description: access_level_description(m.access_level),
            id: m.id,
            username: m.username,
            name: m.name,
            state: m.state,
            avatar_url: m.avatar_url,
            web_url: m.web_url,
            access_level: m.access_level,
            expires_at: m.expires_at,
        }
    }
}

/// Role name for a GitLab access level.
///
/// ```rust
/// use gitlab_tools::api::resources::access_level_description;
///
/// assert_eq!(access_level_description(30), "Developer");
/// assert_eq!(access_level_description(15), "Level 15");
/// ```
pub fn access_level_description(level: u32) -> String {
    match level {
        10 => "Guest".to_string(),
        20 => "Reporter".to_string(),
        30 => "Developer".to_string(),
        40 => "Maintainer".to_string(),
        50 => "Owner".to_string(),
        other => format!("Level {other}"),
    }
}

impl GitLabClient {
    /// Lists project members.
    pub async fn project_members(
        &self,
        project: &Identifier,
        inherited: bool,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Member>>, ApiError> {
        let url = self.project_endpoint(project, members_path(inherited));
        let page = self.get_page::<GitLabMember>(url, Query::new(), page).await?;
        Ok(page.convert())
    }

    /// Lists group members.
    pub async fn group_members(
        &self,
        group: &Identifier,
        inherited: bool,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Member>>, ApiError> {
        let url = self.group_endpoint(group, members_path(inherited));
        let page = self.get_page::<GitLabMember>(url, Query::new(), page).await?;
        Ok(page.convert())
    }
}

fn members_path(inherited: bool) -> &'static [&'static str] {
    if inherited {
        &["members", "all"]
    } else {
        &["members"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_levels() {
        let names: Vec<String> = [10, 20, 30, 40, 50, 5, 60]
            .into_iter()
            .map(access_level_description)
            .collect();
        assert_eq!(
            names,
            ["Guest", "Reporter", "Developer", "Maintainer", "Owner", "Level 5", "Level 60"]
        );
    }

    #[test]
    fn test_member_mapper() {
        let remote: GitLabMember = serde_json::from_value(serde_json::json!({
            "id": 9,
            "username": "ops",
            "name": "Ops Bot",
            "state": "active",
            "web_url": "https://gitlab.example.com/ops",
            "access_level": 40,
            "expires_at": "2025-01-01"
        }))
        .unwrap();

        let json = serde_json::to_value(Member::from(remote)).unwrap();
        assert_eq!(json["accessLevel"], 40);
        assert_eq!(json["accessLevelDescription"], "Maintainer");
        assert_eq!(json["expiresAt"], "2025-01-01");
    }

    #[test]
    fn test_members_path() {
        assert_eq!(members_path(true), &["members", "all"]);
        assert_eq!(members_path(false), &["members"]);
    }
}
