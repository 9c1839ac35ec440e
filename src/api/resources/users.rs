//
//  gitlab-tools
//  api/resources/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Users: listing, single lookup by id or username, batch lookup and the
//! token's own account.
//!
//! A username lookup goes through `GET users?username=`; GitLab answers an
//! unknown username with an empty list rather than a 404, which is reported
//! here as [`ApiError::NotFound`] so the batch resolver can tell it apart
//! from real failures.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::batch::{BatchOutcome, BatchResolver, Lookup};
use crate::api::client::{GitLabClient, Query};
use crate::api::common::{ApiError, Identifier, Paginated, PaginationRequest};

/// Abbreviated user embedded in other entities (authors, assignees, triggerers).
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUserBasic {
    pub id: u64,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Normalized abbreviated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: u64,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

impl From<GitLabUserBasic> for UserSummary {
    fn from(u: GitLabUserBasic) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            state: u.state,
            avatar_url: u.avatar_url,
            web_url: u.web_url,
        }
    }
}

/// A user as returned by `GET users` and `GET users/:id`.
///
/// Admin-only fields (`email`, `is_admin`, ...) are absent for regular tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub public_email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub web_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub last_activity_on: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Normalized user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub email: Option<String>,
    pub public_email: Option<String>,
    pub avatar_url: Option<String>,
    pub web_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub is_admin: Option<bool>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub organization: Option<String>,
    pub last_activity_on: Option<String>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<GitLabUser> for User {
    fn from(u: GitLabUser) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            state: u.state,
            email: u.email,
            public_email: u.public_email.filter(|e| !e.is_empty()),
            avatar_url: u.avatar_url,
            web_url: u.web_url,
            created_at: u.created_at,
            is_admin: u.is_admin,
            bio: u.bio.filter(|b| !b.is_empty()),
            location: u.location.filter(|l| !l.is_empty()),
            organization: u.organization.filter(|o| !o.is_empty()),
            last_activity_on: u.last_activity_on,
            last_sign_in_at: u.last_sign_in_at,
        }
    }
}

/// An external identity linked to the current account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Identity {
    pub provider: String,
    pub extern_uid: String,
}

/// `GET user`: the account behind the token.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCurrentUser {
    #[serde(flatten)]
    pub user: GitLabUser,
    #[serde(default)]
    pub private_profile: Option<bool>,
    #[serde(default)]
    pub can_create_group: Option<bool>,
    #[serde(default)]
    pub can_create_project: Option<bool>,
    #[serde(default)]
    pub two_factor_enabled: Option<bool>,
    #[serde(default)]
    pub identities: Vec<Identity>,
}

/// Normalized current user: a [`User`] plus account settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: User,
    pub private_profile: Option<bool>,
    pub can_create_group: Option<bool>,
    pub can_create_project: Option<bool>,
    pub two_factor_enabled: Option<bool>,
    pub identities: Vec<Identity>,
}

impl From<GitLabCurrentUser> for CurrentUser {
    fn from(u: GitLabCurrentUser) -> Self {
        Self {
            user: u.user.into(),
            private_profile: u.private_profile,
            can_create_group: u.can_create_group,
            can_create_project: u.can_create_project,
            two_factor_enabled: u.two_factor_enabled,
            identities: u.identities,
        }
    }
}

/// Filters for `GET users`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Matches name, username and public email
    pub search: Option<String>,
    /// Exact username
    pub username: Option<String>,
    /// Only active users
    pub active: bool,
    /// Only blocked users
    pub blocked: bool,
    /// Only external users
    pub external: bool,
}

/// Result of a batch lookup: found users and the keys that did not resolve.
pub type UserBatch = BatchOutcome<Identifier, User>;

impl GitLabClient {
    /// Lists users.
    pub async fn list_users(
        &self,
        query: &UserQuery,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<User>>, ApiError> {
        let params = Query::new()
            .push_opt("search", query.search.as_deref())
            .push_opt("username", query.username.as_deref())
            .flag("active", query.active)
            .flag("blocked", query.blocked)
            .flag("external", query.external);

        let page = self
            .get_page::<GitLabUser>(self.endpoint(&["users"]), params, page)
            .await?;
        Ok(page.convert())
    }

    /// Fetches one user by numeric id or by username.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the id 404s or no user has that username.
    pub async fn get_user(&self, user: &Identifier) -> Result<User, ApiError> {
        match user {
            Identifier::Numeric(id) => {
                let id = id.to_string();
                let remote: GitLabUser = self
                    .get_json(self.endpoint(&["users", id.as_str()]), Query::new())
                    .await?;
                Ok(remote.into())
            }
            Identifier::Named(username) => {
                let request = self
                    .request(Method::GET, self.endpoint(&["users"]))
                    .query(Query::new().push("username", username).pairs());
                let matches: Vec<GitLabUser> = self.execute(request).await?.json().await?;
                matches
                    .into_iter()
                    .next()
                    .map(User::from)
                    .ok_or_else(|| ApiError::NotFound(format!("User '{username}' not found")))
            }
        }
    }

    /// Resolves many users with at most `batch_concurrency` lookups in flight.
    ///
    /// Unknown ids and usernames are reported per key; any other failure
    /// aborts the whole batch.
    pub async fn get_users_batch(&self, keys: Vec<Identifier>) -> Result<UserBatch, ApiError> {
        let client = self.clone();
        BatchResolver::new(self.config().batch_concurrency)
            .resolve(keys, move |key| {
                let client = client.clone();
                async move { Lookup::from(client.get_user(&key).await) }
            })
            .await
    }

    /// The account the token belongs to.
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        let remote: GitLabCurrentUser =
            self.get_json(self.endpoint(&["user"]), Query::new()).await?;
        Ok(remote.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_user() -> GitLabUser {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "username": "jdoe",
            "name": "Jane Doe",
            "state": "active",
            "avatar_url": "https://gitlab.example.com/uploads/jdoe.png",
            "web_url": "https://gitlab.example.com/jdoe",
            "created_at": "2021-03-01T10:00:00.000Z",
            "bio": "",
            "public_email": "jane@example.com",
            "last_activity_on": "2024-05-01"
        }))
        .unwrap()
    }

    #[test]
    fn test_user_mapper() {
        let user = User::from(remote_user());
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.public_email.as_deref(), Some("jane@example.com"));
        assert_eq!(user.bio, None);
        assert_eq!(user.last_activity_on.as_deref(), Some("2024-05-01"));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["webUrl"], "https://gitlab.example.com/jdoe");
        assert_eq!(json["avatarUrl"], "https://gitlab.example.com/uploads/jdoe.png");
    }

    #[test]
    fn test_current_user_flattens() {
        let remote: GitLabCurrentUser = serde_json::from_value(serde_json::json!({
            "id": 1,
            "username": "root",
            "name": "Administrator",
            "state": "active",
            "web_url": "https://gitlab.example.com/root",
            "is_admin": true,
            "two_factor_enabled": true,
            "can_create_group": true,
            "identities": [{"provider": "ldapmain", "extern_uid": "uid=root"}]
        }))
        .unwrap();

        let json = serde_json::to_value(CurrentUser::from(remote)).unwrap();
        assert_eq!(json["username"], "root");
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["twoFactorEnabled"], true);
        assert_eq!(json["identities"][0]["externUid"], "uid=root");
    }

    #[test]
    fn test_summary_skips_missing_fields() {
        let basic: GitLabUserBasic =
            serde_json::from_value(serde_json::json!({"id": 3, "username": "ci", "name": "CI"}))
                .unwrap();
        let json = serde_json::to_value(UserSummary::from(basic)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "username": "ci", "name": "CI"}));
    }
}
