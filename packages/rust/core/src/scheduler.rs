//! Scheduled publication run: due-task selection, generation, publishing,
//! and the single plan write-back.
//!
//! Tasks are processed sequentially in plan order. One task failing is
//! logged and skipped; the run itself only fails on plan load problems or
//! on the final write-back.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};

use contentpilot_gemini::GeminiClient;
use contentpilot_github::GithubClient;
use contentpilot_shared::{ContentTask, PromptLanguage, PublishedArticle, Result, TaskStatus};

use crate::generator;
use crate::publisher::{self, PublishConfig};

// ---------------------------------------------------------------------------
// Run config & report
// ---------------------------------------------------------------------------

/// Configuration for one scheduled publication run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Repository path of the content plan JSON.
    pub plan_path: String,
    /// Prompt language for generated drafts.
    pub language: PromptLanguage,
    /// Publishing destination and front matter.
    pub publish: PublishConfig,
}

/// Outcome of one scheduled publication run.
#[derive(Debug)]
pub struct RunReport {
    /// Tasks that were due at the start of the run.
    pub due: usize,
    /// Tasks published successfully.
    pub published: usize,
    /// Tasks that failed; their plan status is left untouched so the next
    /// run retries them.
    pub failed: usize,
    /// Whether the plan was written back.
    pub plan_updated: bool,
    /// Articles committed during the run.
    pub articles: Vec<PublishedArticle>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting run status.
pub trait RunProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a task's article lands in the repository.
    fn task_published(&self, title: &str, current: usize, total: usize);
    /// Called when a task fails and is skipped.
    fn task_failed(&self, prompt: &str, error: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl RunProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn task_published(&self, _title: &str, _current: usize, _total: usize) {}
    fn task_failed(&self, _prompt: &str, _error: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// Due selection
// ---------------------------------------------------------------------------

/// Indices of tasks due on `today`: status `scheduled` with a publish date
/// on or before it, in plan order.
pub(crate) fn due_indices(tasks: &[ContentTask], today: NaiveDate) -> Vec<usize> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.is_due(today))
        .map(|(index, _)| index)
        .collect()
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the scheduled publication flow end to end.
///
/// 1. Fetch and decode the content plan
/// 2. Select tasks due today
/// 3. Per due task: generate a draft, publish it, mark it `published`
/// 4. Write the plan back once if anything changed, with the revision
///    read in step 1
#[instrument(skip_all, fields(plan = %config.plan_path))]
pub async fn run_scheduled(
    gemini: &GeminiClient,
    github: &GithubClient,
    config: &RunConfig,
    progress: &dyn RunProgress,
) -> Result<RunReport> {
    let start = Instant::now();

    // --- Load plan ---
    progress.phase("Loading content plan");
    let (mut tasks, revision) = contentpilot_github::fetch_plan(github, &config.plan_path).await?;

    let today = Utc::now().date_naive();
    let due = due_indices(&tasks, today);

    info!(tasks = tasks.len(), due = due.len(), %today, "content plan loaded");

    if due.is_empty() {
        let report = RunReport {
            due: 0,
            published: 0,
            failed: 0,
            plan_updated: false,
            articles: vec![],
            elapsed: start.elapsed(),
        };
        info!("no articles due for publication");
        progress.done(&report);
        return Ok(report);
    }

    // --- Process due tasks sequentially ---
    let total = due.len();
    let mut published = 0usize;
    let mut failed = 0usize;
    let mut articles: Vec<PublishedArticle> = Vec::new();
    let mut plan_changed = false;

    for (current, index) in due.into_iter().enumerate() {
        let prompt = tasks[index].prompt.clone();
        progress.phase(&format!("[{}/{total}] Generating article", current + 1));

        let outcome = async {
            let draft = generator::generate_draft(gemini, &prompt, config.language).await?;
            publisher::publish_article(github, &config.publish, &draft).await
        }
        .await;

        match outcome {
            Ok(article) => {
                tasks[index].status = TaskStatus::Published;
                plan_changed = true;
                published += 1;
                progress.task_published(&article.title, current + 1, total);
                info!(title = %article.title, path = %article.path, "task published");
                articles.push(article);
            }
            Err(e) => {
                // Status stays `scheduled` so the next run retries it.
                failed += 1;
                progress.task_failed(&prompt, &e.to_string(), current + 1, total);
                warn!(prompt = %prompt, error = %e, "task failed, continuing");
            }
        }
    }

    // --- Write plan back once ---
    let plan_updated = if plan_changed {
        progress.phase("Updating content plan");
        contentpilot_github::write_plan(github, &config.plan_path, &tasks, &revision).await?;
        true
    } else {
        false
    };

    let report = RunReport {
        due: total,
        published,
        failed,
        plan_updated,
        articles,
        elapsed: start.elapsed(),
    };

    info!(
        due = report.due,
        published = report.published,
        failed = report.failed,
        plan_updated = report.plan_updated,
        elapsed_ms = report.elapsed.as_millis(),
        "scheduled run complete"
    );

    progress.done(&report);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use contentpilot_gemini::GeminiOptions;
    use contentpilot_github::GithubOptions;
    use contentpilot_shared::{ContentConfig, ContentPilotError};

    const PLAN_PATH: &str = "src/data/content-plan.json";

    fn make_task(prompt: &str, date: NaiveDate, status: TaskStatus) -> ContentTask {
        ContentTask {
            prompt: prompt.into(),
            publish_date: date,
            status,
        }
    }

    fn run_config() -> RunConfig {
        RunConfig {
            plan_path: PLAN_PATH.into(),
            language: PromptLanguage::En,
            publish: PublishConfig::from_content(&ContentConfig::default()),
        }
    }

    fn gemini_client(server_uri: &str) -> GeminiClient {
        GeminiClient::new(GeminiOptions {
            api_base: server_uri.to_string(),
            api_key: "test-key".into(),
            model: "test-model".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn github_client(server_uri: &str) -> GithubClient {
        GithubClient::new(GithubOptions {
            api_base: server_uri.to_string(),
            owner: "acme".into(),
            repo: "site".into(),
            branch: "main".into(),
            token: "test-token".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn plan_get_body(tasks: &[ContentTask], sha: &str) -> String {
        let raw = serde_json::to_string_pretty(tasks).unwrap();
        serde_json::json!({
            "content": STANDARD.encode(raw.as_bytes()),
            "sha": sha,
        })
        .to_string()
    }

    fn gemini_draft_body(title: &str) -> String {
        let model_text = format!(
            "```json\n{{\"title\":\"{title}\",\"description\":\"Desc.\",\"content\":\"## Body\"}}\n```"
        );
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": model_text}]}}]
        })
        .to_string()
    }

    async fn mount_plan_get(server: &wiremock::MockServer, tasks: &[ContentTask], sha: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(format!(
                "/repos/acme/site/contents/{PLAN_PATH}"
            )))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(plan_get_body(tasks, sha)),
            )
            .mount(server)
            .await;
    }

    fn mount_article_put(expected: u64) -> wiremock::Mock {
        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .and(wiremock::matchers::path_regex(
                r"^/repos/acme/site/contents/src/content/blog/.*\.md$",
            ))
            .respond_with(
                wiremock::ResponseTemplate::new(201)
                    .set_body_string(r#"{"content":{"sha":"articlesha"}}"#),
            )
            .expect(expected)
    }

    /// Decode the plan JSON committed by the write-back request.
    fn committed_plan(requests: &[wiremock::Request]) -> Vec<ContentTask> {
        let put = requests
            .iter()
            .find(|r| {
                r.method.as_str() == "PUT" && r.url.path().ends_with("content-plan.json")
            })
            .expect("plan write-back request");
        let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
        let decoded = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
        serde_json::from_slice(&decoded).unwrap()
    }

    #[test]
    fn due_selection_honors_date_and_status() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let tasks = vec![
            make_task("yesterday", today.pred_opt().unwrap(), TaskStatus::Scheduled),
            make_task("today", today, TaskStatus::Scheduled),
            make_task("tomorrow", today.succ_opt().unwrap(), TaskStatus::Scheduled),
            make_task("done", today, TaskStatus::Published),
            make_task("gave-up", today, TaskStatus::Failed),
        ];

        assert_eq!(due_indices(&tasks, today), vec![0, 1]);
    }

    #[test]
    fn due_selection_preserves_plan_order() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let tasks = vec![
            make_task("b", today, TaskStatus::Scheduled),
            make_task("a", today.pred_opt().unwrap(), TaskStatus::Scheduled),
        ];
        assert_eq!(due_indices(&tasks, today), vec![0, 1]);
    }

    #[tokio::test]
    async fn one_due_task_generates_publishes_and_writes_back_once() {
        let server = wiremock::MockServer::start().await;
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let tasks = vec![make_task("Write about sump pumps", yesterday, TaskStatus::Scheduled)];

        mount_plan_get(&server, &tasks, "plansha1").await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(
                "/v1beta/models/test-model:generateContent",
            ))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(gemini_draft_body("Sump Pumps 101")),
            )
            .expect(1)
            .mount(&server)
            .await;

        mount_article_put(1).mount(&server).await;

        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .and(wiremock::matchers::path(format!(
                "/repos/acme/site/contents/{PLAN_PATH}"
            )))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "message": "chore: Update content plan status",
                "sha": "plansha1",
            })))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(r#"{"content":{"sha":"plansha2"}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let report = run_scheduled(
            &gemini_client(&server.uri()),
            &github_client(&server.uri()),
            &run_config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(report.due, 1);
        assert_eq!(report.published, 1);
        assert_eq!(report.failed, 0);
        assert!(report.plan_updated);
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.articles[0].title, "Sump Pumps 101");

        let requests = server.received_requests().await.unwrap();
        let committed = committed_plan(&requests);
        assert_eq!(committed[0].status, TaskStatus::Published);
    }

    #[tokio::test]
    async fn first_failure_does_not_abort_run() {
        let server = wiremock::MockServer::start().await;
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let tasks = vec![
            make_task("doomed prompt", yesterday, TaskStatus::Scheduled),
            make_task("healthy prompt", yesterday, TaskStatus::Scheduled),
        ];

        mount_plan_get(&server, &tasks, "plansha1").await;

        // First task: the model replies with no candidates
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::body_string_contains("doomed prompt"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(r#"{"candidates":[]}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        // Second task succeeds
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::body_string_contains("healthy prompt"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(gemini_draft_body("Healthy Article")),
            )
            .expect(1)
            .mount(&server)
            .await;

        mount_article_put(1).mount(&server).await;

        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .and(wiremock::matchers::path(format!(
                "/repos/acme/site/contents/{PLAN_PATH}"
            )))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(r#"{"content":{"sha":"plansha2"}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let report = run_scheduled(
            &gemini_client(&server.uri()),
            &github_client(&server.uri()),
            &run_config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(report.due, 2);
        assert_eq!(report.published, 1);
        assert_eq!(report.failed, 1);
        assert!(report.plan_updated);

        // Only the second task's status changed
        let requests = server.received_requests().await.unwrap();
        let committed = committed_plan(&requests);
        assert_eq!(committed[0].status, TaskStatus::Scheduled);
        assert_eq!(committed[1].status, TaskStatus::Published);
    }

    #[tokio::test]
    async fn zero_due_tasks_skip_the_write_path() {
        let server = wiremock::MockServer::start().await;
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
        let tasks = vec![
            make_task("future prompt", tomorrow, TaskStatus::Scheduled),
            make_task("old prompt", tomorrow, TaskStatus::Published),
        ];

        mount_plan_get(&server, &tasks, "plansha1").await;

        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let report = run_scheduled(
            &gemini_client(&server.uri()),
            &github_client(&server.uri()),
            &run_config(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(report.due, 0);
        assert_eq!(report.published, 0);
        assert!(!report.plan_updated);
        assert!(report.articles.is_empty());
    }

    #[tokio::test]
    async fn concurrent_plan_edit_surfaces_as_conflict() {
        let server = wiremock::MockServer::start().await;
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let tasks = vec![make_task("Write about drains", yesterday, TaskStatus::Scheduled)];

        mount_plan_get(&server, &tasks, "plansha1").await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(gemini_draft_body("French Drains")),
            )
            .mount(&server)
            .await;

        mount_article_put(1).mount(&server).await;

        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .and(wiremock::matchers::path(format!(
                "/repos/acme/site/contents/{PLAN_PATH}"
            )))
            .respond_with(wiremock::ResponseTemplate::new(409).set_body_string(
                r#"{"message":"content-plan.json is at plansha9 but expected plansha1"}"#,
            ))
            .mount(&server)
            .await;

        let err = run_scheduled(
            &gemini_client(&server.uri()),
            &github_client(&server.uri()),
            &run_config(),
            &SilentProgress,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ContentPilotError::Conflict(_)));
    }

    #[tokio::test]
    async fn plan_load_failure_fails_the_run() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(format!(
                "/repos/acme/site/contents/{PLAN_PATH}"
            )))
            .respond_with(
                wiremock::ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#),
            )
            .mount(&server)
            .await;

        let err = run_scheduled(
            &gemini_client(&server.uri()),
            &github_client(&server.uri()),
            &run_config(),
            &SilentProgress,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ContentPilotError::RemoteRead(_)));
    }
}
