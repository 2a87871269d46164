use async_trait::async_trait;
use questionnaire_types::{
    Answers, FetchedScript, Script, ScriptLoadError, ScriptProvider, Step, Submission,
    SubmissionError, SubmissionReceipt, SubmissionSink,
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{BackendConfig, ConfigError};

/// Shown when a request runs past the configured timeout.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Is the backend running?";

/// Shown when the backend cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "Network error: could not reach backend";

const SESSION_PATH: &str = "session_questions";
const RESPONSES_PATH: &str = "responses_sb";

/// The backend's `/session_questions` body.
#[derive(Debug, Deserialize)]
struct SessionBody {
    #[serde(default)]
    session_id: Option<String>,
    steps: Vec<Step>,
    /// Answers stored by an earlier attempt of the same respondent.
    #[serde(default)]
    answers: Option<Answers>,
}

/// Talks to the questionnaire backend over HTTP.
///
/// Serves scripts from `GET /session_questions` and delivers answers to
/// `POST /responses_sb`. Failures are turned into short messages a
/// respondent can read.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Configure from the environment; see [`BackendConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[async_trait]
impl ScriptProvider for HttpBackend {
    async fn fetch_script(
        &self,
        instance_id: &str,
        respondent_email: Option<&str>,
    ) -> Result<FetchedScript, ScriptLoadError> {
        let url = self.config.endpoint(SESSION_PATH);
        debug!(%url, instance = instance_id, "fetching script");

        let mut request = self.client.get(&url).query(&[("session_id", instance_id)]);
        if let Some(email) = respondent_email {
            request = request.query(&[("tester_email", email)]);
        }

        let response = request.send().await.map_err(|err| {
            warn!(instance = instance_id, error = %err, "script request failed");
            if err.is_timeout() {
                ScriptLoadError::Timeout
            } else {
                ScriptLoadError::Network("could not reach backend".to_string())
            }
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ScriptLoadError::NotFound(instance_id.to_string()));
        }
        let response = ensure_success(response)
            .await
            .map_err(|message| ScriptLoadError::transport(anyhow::anyhow!(message)))?;

        let body: SessionBody = response
            .json()
            .await
            .map_err(|err| ScriptLoadError::Malformed(err.to_string()))?;

        if let Some(echoed) = body.session_id.as_deref()
            && echoed != instance_id
        {
            return Err(ScriptLoadError::Malformed(format!(
                "asked for session '{instance_id}' but got '{echoed}'"
            )));
        }

        let mut fetched = FetchedScript::new(Script::new(body.steps));
        if let Some(answers) = body.answers.filter(|answers| !answers.is_empty()) {
            fetched = fetched.with_prior_answers(answers);
        }
        Ok(fetched)
    }
}

#[async_trait]
impl SubmissionSink for HttpBackend {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, SubmissionError> {
        let url = self.config.endpoint(RESPONSES_PATH);
        debug!(%url, instance = %submission.instance_id, "posting answers");

        let response = self
            .client
            .post(&url)
            .json(submission)
            .send()
            .await
            .map_err(|err| {
                warn!(instance = %submission.instance_id, error = %err, "submission request failed");
                SubmissionError::Failed(describe_request_error(&err).to_string())
            })?;

        let response = ensure_success(response)
            .await
            .map_err(SubmissionError::Failed)?;

        response.json().await.map_err(SubmissionError::transport)
    }
}

/// The message for a request that never got a response.
pub fn describe_request_error(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        TIMEOUT_MESSAGE
    } else {
        UNREACHABLE_MESSAGE
    }
}

/// The message for an HTTP error response.
///
/// The backend reports errors as JSON with a `detail`, `error` or `message`
/// field; anything else becomes `HTTP <status>`.
pub fn http_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["detail", "error", "message"]
                .iter()
                .find_map(|field| json.get(field).and_then(|value| value.as_str()).map(str::to_string))
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

async fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = http_error_message(status, &body);
    warn!(status = status.as_u16(), %message, "backend returned an error");
    Err(message)
}
