//
//  gitlab-tools
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Gateway for the GitLab REST API
//!
//! [`GitLabClient`] owns the HTTP client, the `/api/v4` base URL and the
//! bearer credential. The resource modules under [`resources`](super::resources)
//! add one method per remote operation on top of the plumbing defined here.
//!
//! ## Request Lifecycle
//!
//! 1. Build the endpoint from path segments (each one percent-encoded, so a
//!    project path `group/project` becomes `group%2Fproject`)
//! 2. Attach query parameters and the bearer token
//! 3. Send with the configured timeout
//! 4. Non-success statuses become a classified [`ApiError`]
//! 5. Listing responses have their headers normalized and turned into
//!    [`PaginationInfo`]
//!
//! Nothing is retried here. A failed call surfaces to the caller with its
//! classification.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::common::{
    ApiError, Identifier, NormalizedHeaders, Paginated, PaginationInfo, PaginationRequest,
};
use super::links::WebLinks;
use crate::auth::Credential;
use crate::config::Config;

/// Query parameters for a request, in insertion order.
///
/// Repeated keys are allowed (`scope[]=failed&scope[]=running`).
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::client::Query;
///
/// let query = Query::new()
///     .push("simple", true)
///     .push_opt("search", None::<String>)
///     .flag("archived", false);
/// assert_eq!(query.pairs(), &[("simple", "true".to_string())]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    /// An empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Appends a parameter when a value is present.
    pub fn push_opt<V: ToString>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Appends `key=true` only when `enabled` is set.
    pub fn flag(self, key: &'static str, enabled: bool) -> Self {
        if enabled {
            self.push(key, true)
        } else {
            self
        }
    }

    /// Appends the `page` and `per_page` parameters.
    pub fn page(mut self, page: PaginationRequest) -> Self {
        self.pairs.extend(page.query_pairs());
        self
    }

    /// The collected pairs.
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// Client for one GitLab instance.
///
/// Cheap to clone: the HTTP connection pool and the configuration snapshot
/// are shared.
///
/// # Example
///
/// ```rust,no_run
/// use gitlab_tools::api::GitLabClient;
/// use gitlab_tools::config::ConfigStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = ConfigStore::load()?;
/// let client = GitLabClient::new(store.current())?;
/// let project = client.get_project(&"group/project".parse()?).await?;
/// println!("{}", project.web_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    api_base: Url,
    links: WebLinks,
    credential: Credential,
    config: Arc<Config>,
}

impl GitLabClient {
    /// Builds a client from a configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the TLS backend cannot be initialized.
    pub fn new(config: Arc<Config>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let mut api_base = config.gitlab.url.clone();
        api_base.set_query(None);
        api_base.set_fragment(None);
        if let Ok(mut segments) = api_base.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "v4"]);
        }

        Ok(Self {
            http,
            api_base,
            links: WebLinks::new(config.gitlab.url.clone()),
            credential: Credential::bearer(config.gitlab.token.clone()),
            config,
        })
    }

    /// The configuration snapshot this client was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Deep-link builder for the same instance.
    pub fn links(&self) -> &WebLinks {
        &self.links
    }

    /// `{base}/api/v4`
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Builds an API URL from raw path segments, encoding each one.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments.iter().map(AsRef::as_ref));
        }
        url
    }

    /// `projects/:id/...`
    pub fn project_endpoint(&self, project: &Identifier, rest: &[&str]) -> Url {
        self.scoped_endpoint("projects", project, rest)
    }

    /// `groups/:id/...`
    pub fn group_endpoint(&self, group: &Identifier, rest: &[&str]) -> Url {
        self.scoped_endpoint("groups", group, rest)
    }

    fn scoped_endpoint(&self, collection: &str, id: &Identifier, rest: &[&str]) -> Url {
        let id = id.as_segment();
        let mut segments = Vec::with_capacity(rest.len() + 2);
        segments.push(collection);
        segments.push(id.as_str());
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Starts an authenticated request.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, path = url.path(), "gitlab request");
        self.credential
            .apply_to_request(self.http.request(method, url))
    }

    /// Sends a request and turns non-success statuses into [`ApiError`].
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gitlab request failed");
            return Err(ApiError::from_status(status, &body));
        }

        Ok(response)
    }

    /// GET a single JSON document.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: Query,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, url).query(query.pairs());
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// GET one page of a listing, with pagination read from the headers.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        url: Url,
        query: Query,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<T>>, ApiError> {
        let request = self
            .request(Method::GET, url)
            .query(query.page(page).pairs());
        let response = self.execute(request).await?;

        let headers = NormalizedHeaders::from_header_map(response.headers());
        let pagination = PaginationInfo::from_request(&headers, page);
        let data: Vec<T> = response.json().await?;

        debug!(
            items = data.len(),
            page = pagination.page,
            has_more = pagination.has_more,
            "page received"
        );

        Ok(Paginated { data, pagination })
    }

    /// POST a JSON body and decode the JSON response.
    pub(crate) async fn post_json<T, B>(&self, url: Url, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, url).json(body);
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }
}
