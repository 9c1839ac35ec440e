//
//  gitlab-tools
//  tests/gateway.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Gateway behavior against a mock GitLab server.

use std::collections::HashMap;
use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use gitlab_tools::api::filter::PathFilter;
use gitlab_tools::api::resources::{
    ByteRange, CreateTag, MergeRequestSearch, MergeRequestState, PipelineQuery, PipelineStatus,
    ProjectQuery, StatusQuery,
};
use gitlab_tools::api::{ApiError, ErrorKind, GitLabClient, Identifier, PaginationRequest};
use gitlab_tools::config::{Config, FileConfig};

fn client(server: &ServerGuard, overrides: &[(&str, &str)]) -> GitLabClient {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("GITLAB_URL".to_string(), server.url()),
        ("GITLAB_TOKEN".to_string(), "glpat-test".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = Config::resolve(FileConfig::default(), move |key: &str| vars.get(key).cloned())
        .expect("valid test configuration");
    GitLabClient::new(Arc::new(config)).expect("client")
}

fn project_json(id: u64, path: &str) -> serde_json::Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({
        "id": id,
        "name": name,
        "name_with_namespace": path.replace('/', " / "),
        "path_with_namespace": path,
        "description": "",
        "default_branch": "main",
        "last_activity_at": "2024-05-01T10:00:00Z",
        "web_url": format!("https://gitlab.example.com/{path}")
    })
}

fn user_json(id: u64, username: &str) -> serde_json::Value {
    json!({
        "id": id,
        "username": username,
        "name": username.to_uppercase(),
        "state": "active",
        "web_url": format!("https://gitlab.example.com/{username}")
    })
}

#[tokio::test]
async fn projects_page_reports_pagination_and_applies_namespace_filter() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/projects")
        .match_header("authorization", "Bearer glpat-test")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("simple".into(), "true".into()),
            Matcher::UrlEncoded("membership".into(), "false".into()),
            Matcher::UrlEncoded("order_by".into(), "last_activity_at".into()),
            Matcher::UrlEncoded("sort".into(), "desc".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("per_page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("X-Total", "5")
        .with_header("X-Total-Pages", "3")
        .with_header("X-Next-Page", "3")
        .with_header("X-Prev-Page", "1")
        .with_body(json!([project_json(1, "team/api"), project_json(2, "other/web")]).to_string())
        .create_async()
        .await;

    let client = client(&server, &[("GITLAB_NAMESPACES", "team/")]);
    let page = client
        .list_projects(
            &ProjectQuery::default(),
            PaginationRequest::new(Some(2), Some(2)).unwrap(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].path_with_namespace, "team/api");
    assert_eq!(page.data[0].description, None);
    assert_eq!(page.pagination.total, Some(5));
    assert_eq!(page.pagination.total_pages, Some(3));
    assert_eq!(page.pagination.next_page, Some(3));
    assert_eq!(page.pagination.prev_page, Some(1));
    assert!(page.pagination.has_more);
}

#[tokio::test]
async fn last_page_has_no_more() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/42/repository/tags")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("order_by".into(), "version".into()),
            Matcher::UrlEncoded("sort".into(), "desc".into()),
        ]))
        .with_status(200)
        .with_header("x-next-page", "")
        .with_body(json!([{"name": "v1.0.0", "commit": {"id": "abc"}}]).to_string())
        .create_async()
        .await;

    let page = client(&server, &[])
        .list_tags(&Identifier::Numeric(42), PaginationRequest::default())
        .await
        .unwrap();

    assert_eq!(page.data[0].name, "v1.0.0");
    assert!(!page.pagination.has_more);
    assert_eq!(page.pagination.next_page, None);
}

#[tokio::test]
async fn project_path_is_sent_as_one_encoded_segment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/api/v4/projects/team%2Fapi$".to_string()))
        .with_status(200)
        .with_body(project_json(7, "team/api").to_string())
        .create_async()
        .await;

    let project = client(&server, &[])
        .get_project(&"team/api".parse().unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(project.id, 7);
}

#[tokio::test]
async fn missing_project_is_classified_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/404")
        .with_status(404)
        .with_body(r#"{"message":"404 Project Not Found"}"#)
        .create_async()
        .await;

    let err = client(&server, &[])
        .get_project(&Identifier::Numeric(404))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Resource not found: 404 Project Not Found");
}

#[tokio::test]
async fn user_batch_reports_misses_in_input_order() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/users/1")
        .with_status(200)
        .with_body(user_json(1, "alice").to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/v4/users/2")
        .with_status(404)
        .with_body(r#"{"message":"404 User Not Found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v4/users")
        .match_query(Matcher::UrlEncoded("username".into(), "ghost".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    server
        .mock("GET", "/api/v4/users")
        .match_query(Matcher::UrlEncoded("username".into(), "bob".into()))
        .with_status(200)
        .with_body(json!([user_json(3, "bob")]).to_string())
        .create_async()
        .await;

    let keys = vec![
        Identifier::Numeric(2),
        Identifier::Numeric(1),
        Identifier::Named("ghost".to_string()),
        Identifier::Named("bob".to_string()),
    ];
    let outcome = client(&server, &[("GITLAB_BATCH_CONCURRENCY", "2")])
        .get_users_batch(keys)
        .await
        .unwrap();

    let (users, missing) = outcome.into_parts();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(
        missing,
        vec![Identifier::Numeric(2), Identifier::Named("ghost".to_string())]
    );
}

#[tokio::test]
async fn user_batch_fails_on_server_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/users/1")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = client(&server, &[])
        .get_users_batch(vec![Identifier::Numeric(1)])
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ServerError { status: 500, .. }));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn user_batch_rejects_oversized_input() {
    let server = Server::new_async().await;
    let keys = (1..=51).map(Identifier::Numeric).collect();

    let err = client(&server, &[])
        .get_users_batch(keys)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
}

fn tag_request(name: &str) -> CreateTag {
    CreateTag {
        tag_name: name.to_string(),
        git_ref: "main".to_string(),
        message: None,
        release_description: None,
    }
}

#[tokio::test]
async fn tag_creation_is_refused_in_read_only_mode() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server, &[])
        .create_tag(&Identifier::Numeric(42), &tag_request("v1.2.4"))
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ApiError::ReadOnly(_)));
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert!(err.to_string().contains("GITLAB_READ_ONLY=false"));
}

#[tokio::test]
async fn tag_creation_rejects_non_semver_names_before_any_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server, &[("GITLAB_READ_ONLY", "false")])
        .create_tag(&Identifier::Numeric(42), &tag_request("release-7"))
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.field(), Some("tagName"));
}

#[tokio::test]
async fn tag_creation_conflict_names_tag_and_project() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v4/projects/42/repository/tags")
        .with_status(409)
        .with_body(r#"{"message":"Tag v1.2.4 already exists"}"#)
        .create_async()
        .await;

    let err = client(&server, &[("GITLAB_READ_ONLY", "false")])
        .create_tag(&Identifier::Numeric(42), &tag_request("v1.2.4"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        err.to_string(),
        "Conflict: Tag 'v1.2.4' already exists in project 42."
    );
}

#[tokio::test]
async fn tag_creation_posts_name_as_given_and_links_the_tag() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock(
            "POST",
            Matcher::Regex(r"^/api/v4/projects/team%2Fapi/repository/tags$".to_string()),
        )
        .match_body(Matcher::Json(json!({
            "tag_name": "v1.2.4",
            "ref": "main",
            "message": "Release 1.2.4"
        })))
        .with_status(201)
        .with_body(
            json!({
                "name": "v1.2.4",
                "message": "Release 1.2.4",
                "target": "2695effb",
                "commit": {"id": "2695effb", "message": "Fix", "created_at": "2024-05-01T10:00:00Z"},
                "release": null
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut request = tag_request("v1.2.4");
    request.message = Some("Release 1.2.4".to_string());
    let created = client(&server, &[("GITLAB_READ_ONLY", "false")])
        .create_tag(&"team/api".parse().unwrap(), &request)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(created.name, "v1.2.4");
    assert_eq!(
        created.url,
        Some(format!("{}/team/api/-/tags/v1.2.4", server.url()))
    );
}

#[tokio::test]
async fn tag_creation_sends_release_notes() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v4/projects/42/repository/tags")
        .match_body(Matcher::Json(json!({
            "tag_name": "v2.0.0",
            "ref": "master",
            "release_description": "## Changes\n- retry budget"
        })))
        .with_status(201)
        .with_body(
            json!({
                "name": "v2.0.0",
                "target": "2695effb",
                "commit": {"id": "2695effb"},
                "release": {"tag_name": "v2.0.0", "description": "## Changes\n- retry budget"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = CreateTag {
        tag_name: "v2.0.0".to_string(),
        git_ref: "master".to_string(),
        message: None,
        release_description: Some("## Changes\n- retry budget".to_string()),
    };
    let created = client(&server, &[("GITLAB_READ_ONLY", "false")])
        .create_tag(&Identifier::Numeric(42), &request)
        .await
        .unwrap();

    mock.assert_async().await;
    let release = created.release.expect("release attached");
    assert_eq!(release.tag_name, "v2.0.0");
    assert_eq!(created.url, None);
}

#[tokio::test]
async fn merge_request_diffs_use_diff_page_size_and_path_filter() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/42/merge_requests/5/diffs")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("per_page".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([
                {"old_path": "src/lib.rs", "new_path": "src/lib.rs", "diff": "@@ -1 +1 @@"},
                {"old_path": "README.md", "new_path": "README.md", "diff": "@@ -2 +2 @@"},
                {"old_path": "old.rs", "new_path": "src/new.rs", "renamed_file": true, "diff": ""}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let page = PaginationRequest::with_default(None, None, 20).unwrap();
    let filter = PathFilter::new(vec![], vec!["README.md".to_string()]);
    let result = client(&server, &[])
        .merge_request_diffs(&Identifier::Numeric(42), 5, &filter, page)
        .await
        .unwrap();

    let paths: Vec<&str> = result.data.iter().map(|d| d.new_path.as_str()).collect();
    assert_eq!(paths, vec!["src/lib.rs", "src/new.rs"]);
    assert!(result.data[1].renamed_file);
}

#[tokio::test]
async fn ranged_trace_reports_partial_content() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/42/jobs/7/trace")
        .match_header("range", "bytes=0-9")
        .with_status(206)
        .with_header("content-range", "bytes 0-9/100")
        .with_body("0123456789")
        .create_async()
        .await;

    let trace = client(&server, &[])
        .job_trace(
            &Identifier::Numeric(42),
            7,
            Some(ByteRange::new(0, Some(10)).unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(trace.content, "0123456789");
    assert_eq!(trace.bytes, 10);
    assert!(trace.partial);
    assert_eq!(trace.total_bytes, Some(100));
    assert_eq!(trace.content_range.as_deref(), Some("bytes 0-9/100"));
}

#[tokio::test]
async fn full_trace_is_not_partial() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/42/jobs/7/trace")
        .with_status(200)
        .with_body("Job succeeded\n")
        .create_async()
        .await;

    let trace = client(&server, &[])
        .job_trace(&Identifier::Numeric(42), 7, None)
        .await
        .unwrap();

    assert!(!trace.partial);
    assert_eq!(trace.total_bytes, None);
}

#[tokio::test]
async fn trace_download_streams_to_file() {
    let mut server = Server::new_async().await;
    let body = "line\n".repeat(1000);
    server
        .mock("GET", "/api/v4/projects/42/jobs/9/trace")
        .with_status(200)
        .with_body(body.clone())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job-9.log");
    let download = client(&server, &[])
        .download_job_trace(&Identifier::Numeric(42), 9, None, &path)
        .await
        .unwrap();

    assert_eq!(download.bytes_written, body.len() as u64);
    assert!(!download.partial);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
}

#[tokio::test]
async fn trace_download_creates_missing_directories() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/42/jobs/9/trace")
        .match_header("range", "bytes=0-2047")
        .with_status(206)
        .with_header("content-range", "bytes 0-2047/9000")
        .with_body("x".repeat(2048))
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("logs").join("job.log");
    let download = client(&server, &[])
        .download_job_trace(
            &Identifier::Numeric(42),
            9,
            Some(ByteRange::new(0, Some(2048)).unwrap()),
            &path,
        )
        .await
        .unwrap();

    assert_eq!(download.bytes_written, 2048);
    assert!(download.partial);
    assert_eq!(download.total_bytes, Some(9000));
    assert!(download.path.is_absolute());
    assert_eq!(std::fs::read(&path).unwrap().len(), 2048);
}

#[tokio::test]
async fn trace_download_rejects_window_outside_limits() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.log");
    let err = client(&server, &[])
        .download_job_trace(
            &Identifier::Numeric(42),
            9,
            Some(ByteRange::new(0, Some(100)).unwrap()),
            &path,
        )
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.field(), Some("maxBytes"));
    assert!(!path.exists());
}

#[tokio::test]
async fn failed_trace_download_creates_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/42/jobs/9/trace")
        .with_status(404)
        .with_body(r#"{"message":"404 Not found"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("never");
    let err = client(&server, &[])
        .download_job_trace(&Identifier::Numeric(42), 9, None, &parent.join("job.log"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!parent.exists());
}

#[tokio::test]
async fn inherited_members_use_the_all_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/groups/9/members/all")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([{
                "id": 3,
                "username": "maint",
                "name": "Maintainer",
                "state": "active",
                "web_url": "https://gitlab.example.com/maint",
                "access_level": 40
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let page = client(&server, &[])
        .group_members(&Identifier::Numeric(9), true, PaginationRequest::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.data[0].access_level_description, "Maintainer");
}

#[tokio::test]
async fn pipeline_filters_are_forwarded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/projects/42/pipelines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ref".into(), "main".into()),
            Matcher::UrlEncoded("status".into(), "failed".into()),
            Matcher::UrlEncoded("updated_after".into(), "2024-05-01".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{
                "id": 1001,
                "project_id": 42,
                "status": "failed",
                "ref": "main",
                "sha": "2695effb",
                "web_url": "https://gitlab.example.com/team/api/-/pipelines/1001"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let query = PipelineQuery {
        git_ref: Some("main".to_string()),
        status: Some(PipelineStatus::Failed),
        updated_after: Some("2024-05-01".to_string()),
        ..PipelineQuery::default()
    };
    let page = client(&server, &[])
        .list_pipelines(&Identifier::Numeric(42), &query, PaginationRequest::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.data[0].git_ref.as_deref(), Some("main"));
}

#[tokio::test]
async fn malformed_timestamp_is_rejected_before_any_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

    let query = PipelineQuery {
        updated_before: Some("yesterday".to_string()),
        ..PipelineQuery::default()
    };
    let err = client(&server, &[])
        .list_pipelines(&Identifier::Numeric(42), &query, PaginationRequest::default())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.field(), Some("updatedBefore"));
}

#[tokio::test]
async fn commit_statuses_carry_pipeline_filter() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/42/repository/commits/2695effb/statuses")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("all".into(), "true".into()),
            Matcher::UrlEncoded("pipeline_id".into(), "1001".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{
                "id": 5,
                "sha": "2695effb",
                "ref": "main",
                "status": "success",
                "name": "rspec",
                "allow_failure": false,
                "pipeline_id": 1001
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let query = StatusQuery {
        all: true,
        pipeline_id: Some(1001),
        ..StatusQuery::default()
    };
    let page = client(&server, &[])
        .commit_statuses(&Identifier::Numeric(42), "2695effb", &query, PaginationRequest::default())
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].name, "rspec");
    assert_eq!(page.data[0].pipeline_id, Some(1001));
}

#[tokio::test]
async fn merge_request_search_omits_state_for_all() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("scope".into(), "merge_requests".into()),
            Matcher::UrlEncoded("search".into(), "retry".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let search = MergeRequestSearch {
        term: "  retry ".to_string(),
        project: None,
        state: MergeRequestState::All,
    };
    let page = client(&server, &[])
        .search_merge_requests(&search, PaginationRequest::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(page.data.is_empty());
    assert!(!page.pagination.has_more);
}

#[test]
fn current_user_from_blocking_context() {
    let mut server = Server::new();
    let mut me = user_json(1, "root");
    me["two_factor_enabled"] = json!(true);
    me["identities"] = json!([{"provider": "github", "extern_uid": "2435223452345"}]);
    server
        .mock("GET", "/api/v4/user")
        .with_status(200)
        .with_body(me.to_string())
        .create();

    let client = client(&server, &[]);
    let current = tokio_test::block_on(client.current_user()).unwrap();

    assert_eq!(current.user.username, "root");
    assert_eq!(current.two_factor_enabled, Some(true));
    assert_eq!(current.identities.len(), 1);
}
