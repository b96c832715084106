//! REST providers against a local fake GitHub/GitLab server

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode as HttpStatus};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use ci_pulse_core::config::{PulseConfig, ServerConfig};
use ci_pulse_core::github::GitHubActionsProvider;
use ci_pulse_core::gitlab::GitLabCiProvider;
use ci_pulse_core::paging::RepositoryPager;
use ci_pulse_core::{
    AggregateStatus, CiProvider, Coordinator, ProviderKind, PulseError, StatusCode,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;

const GITHUB_TOKEN: &str = "ghp_test";
const GITLAB_TOKEN: &str = "glpat-test";

#[derive(Clone)]
struct FakeForge {
    base: String,
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

fn has_header(headers: &HeaderMap, name: &str, expected: &str) -> bool {
    headers.get(name).and_then(|v| v.to_str().ok()) == Some(expected)
}

fn unauthorized() -> Response {
    (HttpStatus::UNAUTHORIZED, Json(json!({"message": "Bad credentials"}))).into_response()
}

async fn github_repos(
    State(forge): State<FakeForge>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if !has_header(&headers, "authorization", &format!("Bearer {GITHUB_TOKEN}")) {
        return unauthorized();
    }

    match query.page.unwrap_or(1) {
        1 => {
            let mut out = HeaderMap::new();
            let link = format!(
                r#"<{base}/user/repos?per_page=100&page=2>; rel="next", <{base}/user/repos?per_page=100&page=2>; rel="last""#,
                base = forge.base
            );
            if let Ok(value) = HeaderValue::from_str(&link) {
                out.insert("link", value);
            }
            let body = json!([
                {"id": 1, "full_name": "me/api", "html_url": "https://github.example.com/me/api"},
                {"id": 2, "full_name": "me/quiet", "html_url": "https://github.example.com/me/quiet"}
            ]);
            (out, Json(body)).into_response()
        }
        _ => Json(json!([
            {"id": 3, "full_name": "someone/else", "html_url": "https://github.example.com/someone/else"}
        ]))
        .into_response(),
    }
}

async fn github_runs(Path((owner, repo)): Path<(String, String)>, headers: HeaderMap) -> Response {
    if !has_header(&headers, "authorization", &format!("Bearer {GITHUB_TOKEN}")) {
        return unauthorized();
    }

    let runs = match (owner.as_str(), repo.as_str()) {
        ("me", "api") => json!([{
            "status": "completed",
            "conclusion": "failure",
            "html_url": "https://github.example.com/me/api/actions/runs/42",
            "updated_at": "2026-03-10T11:00:00Z"
        }]),
        _ => json!([]),
    };
    Json(json!({"total_count": runs.as_array().map_or(0, Vec::len), "workflow_runs": runs}))
        .into_response()
}

async fn gitlab_projects(headers: HeaderMap, Query(query): Query<PageQuery>) -> Response {
    if !has_header(&headers, "private-token", GITLAB_TOKEN) {
        return unauthorized();
    }

    let page = query.page.unwrap_or(1);
    let (next, body) = match page {
        1 => (
            "2",
            json!([{"id": 11, "path_with_namespace": "team/api", "web_url": "https://gitlab.example.com/team/api"}]),
        ),
        _ => (
            "",
            json!([{"id": 12, "path_with_namespace": "team/broken", "web_url": "https://gitlab.example.com/team/broken"}]),
        ),
    };

    let mut out = HeaderMap::new();
    out.insert("x-next-page", HeaderValue::from_static(next));
    (out, Json(body)).into_response()
}

async fn gitlab_pipelines(Path(id): Path<u64>, headers: HeaderMap) -> Response {
    if !has_header(&headers, "private-token", GITLAB_TOKEN) {
        return unauthorized();
    }

    match id {
        11 => Json(json!([{
            "id": 900,
            "status": "running",
            "web_url": "https://gitlab.example.com/team/api/-/pipelines/900",
            "updated_at": "2026-03-10T13:30:00+02:00"
        }]))
        .into_response(),
        12 => (HttpStatus::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn spawn_forge() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let forge = FakeForge {
        base: format!("http://{addr}"),
    };

    let app = Router::new()
        .route("/user/repos", get(github_repos))
        .route("/repos/{owner}/{repo}/actions/runs", get(github_runs))
        .route("/api/v4/projects", get(gitlab_projects))
        .route("/api/v4/projects/{id}/pipelines", get(gitlab_pipelines))
        .with_state(forge);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn base(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

#[tokio::test]
async fn test_github_lists_all_pages() {
    let addr = spawn_forge().await;
    let provider =
        GitHubActionsProvider::new("gh", Some(&base(addr)), GITHUB_TOKEN, None).unwrap();

    let first = provider.fetch_repository_page(1).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.next_page, Some(2));

    let repos = RepositoryPager::new(&provider).collect_all().await.unwrap();
    let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["me/api", "me/quiet", "someone/else"]);
}

#[tokio::test]
async fn test_github_latest_run_uses_conclusion() {
    let addr = spawn_forge().await;
    let provider =
        GitHubActionsProvider::new("gh", Some(&base(addr)), GITHUB_TOKEN, None).unwrap();
    let repos = RepositoryPager::new(&provider).collect_all().await.unwrap();

    let run = provider.latest_run(&repos[0]).await.unwrap().unwrap();
    assert_eq!(run.provider, ProviderKind::GitHub);
    assert_eq!(run.effective_status(), "failure");
    assert_eq!(run.url, "https://github.example.com/me/api/actions/runs/42");

    assert!(provider.latest_run(&repos[1]).await.unwrap().is_none());
}

#[tokio::test]
async fn test_github_bad_token_is_auth_error() {
    let addr = spawn_forge().await;
    let provider = GitHubActionsProvider::new("gh", Some(&base(addr)), "wrong", None).unwrap();

    let err = provider.fetch_repository_page(1).await.unwrap_err();
    assert!(err.is_auth(), "expected auth error, got {err}");
}

#[tokio::test]
async fn test_gitlab_pages_via_next_page_header() {
    let addr = spawn_forge().await;
    let provider = GitLabCiProvider::new("work", Some(&base(addr)), GITLAB_TOKEN, None).unwrap();

    let first = provider.fetch_repository_page(1).await.unwrap();
    assert_eq!(first.next_page, Some(2));
    let second = provider.fetch_repository_page(2).await.unwrap();
    assert_eq!(second.next_page, None);
    assert_eq!(second.items[0].full_name, "team/broken");
}

#[tokio::test]
async fn test_gitlab_pipeline_timestamp_with_offset() {
    let addr = spawn_forge().await;
    let provider = GitLabCiProvider::new("work", Some(&base(addr)), GITLAB_TOKEN, None).unwrap();
    let repos = RepositoryPager::new(&provider).collect_all().await.unwrap();

    let run = provider.latest_run(&repos[0]).await.unwrap().unwrap();
    let expected: DateTime<Utc> = "2026-03-10T11:30:00Z".parse().unwrap();
    assert_eq!(run.updated_at, expected);
    assert_eq!(run.effective_status(), "running");
    assert!(run.conclusion.is_none());
}

#[tokio::test]
async fn test_gitlab_server_error_is_transport() {
    let addr = spawn_forge().await;
    let provider = GitLabCiProvider::new("work", Some(&base(addr)), GITLAB_TOKEN, None).unwrap();
    let repos = RepositoryPager::new(&provider).collect_all().await.unwrap();

    let err = provider.latest_run(&repos[1]).await.unwrap_err();
    assert!(matches!(err, PulseError::Transport { .. }));
    assert!(!err.is_auth());
}

#[tokio::test]
async fn test_gitlab_bad_token_is_auth_error() {
    let addr = spawn_forge().await;
    let provider = GitLabCiProvider::new("work", Some(&base(addr)), "nope", None).unwrap();

    let err = RepositoryPager::new(&provider).collect_all().await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_end_to_end_report_over_http() {
    let addr = spawn_forge().await;
    let now: DateTime<Utc> = "2026-03-10T12:00:00Z".parse().unwrap();

    let mut config = PulseConfig::default();
    config.servers.github.push(ServerConfig {
        name: "gh".to_string(),
        base_url: Some(base(addr)),
        token: Some(GITHUB_TOKEN.to_string()),
        repositories: vec!["me/*".to_string()],
        ..Default::default()
    });
    config.servers.gitlab.push(ServerConfig {
        name: "work".to_string(),
        base_url: Some(base(addr)),
        token: Some(GITLAB_TOKEN.to_string()),
        repositories: vec!["team/api".to_string()],
        ..Default::default()
    });

    let coordinator = Coordinator::from_config(&config).unwrap();
    let projects = coordinator.run_at(now).await.unwrap();
    let report = ci_pulse_core::StatusReport::build(projects);

    let summary: Vec<(&str, StatusCode)> = report
        .projects()
        .iter()
        .map(|p| (p.name.as_str(), p.status))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("team/api", StatusCode::Running),
            ("me/api", StatusCode::Failed),
        ]
    );
    assert_eq!(report.aggregate(), AggregateStatus::Status(StatusCode::Running));
}

#[tokio::test]
async fn test_end_to_end_lookup_failure_fails_run() {
    let addr = spawn_forge().await;
    let now: DateTime<Utc> = "2026-03-10T12:00:00Z".parse().unwrap();

    let mut config = PulseConfig::default();
    config.servers.gitlab.push(ServerConfig {
        name: "work".to_string(),
        base_url: Some(format!("{}/api/v4/", base(addr))),
        token: Some(GITLAB_TOKEN.to_string()),
        repositories: vec!["team/*".to_string()],
        ..Default::default()
    });

    let coordinator = Coordinator::from_config(&config).unwrap();
    let err = coordinator.run_at(now).await.unwrap_err();
    assert!(matches!(err, PulseError::Transport { .. }));
}
