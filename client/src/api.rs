use async_trait::async_trait;
use serde::Serialize;
use serde_json::value::RawValue;
use taskboard_types::{AnswerEntry, AnswerSubmission, Envelope, Id, TaskQuery, TaskSelector};

use crate::{config::Session, error::Error};

pub const TASKS_ENDPOINT: &str = "gettasks.php";
pub const ANSWER_ENDPOINT: &str = "answer.php";

pub const TRANSPORT_FAILURE: &str = "API request failed.";
pub const LOAD_TASKS_FAILURE: &str = "Failed to load tasks.";
pub const LOAD_DETAIL_FAILURE: &str = "Failed to load task details.";
pub const SUBMIT_FAILURE: &str = "Failed to submit answers.";

/// What a submission echoes back alongside its answers.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Id,
    pub original_data: Box<RawValue>,
    pub original_hash: Option<String>,
    pub answers: Vec<AnswerEntry>,
}

/// The two calls the competition server understands.
///
/// Implementations never fail: transport errors come back as an error
/// envelope, indistinguishable from an application-level failure.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn get_tasks(&self, team_code: &str, selector: TaskSelector) -> Envelope;

    async fn submit_answers(&self, team_code: &str, submission: Submission) -> Envelope;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub http_client: reqwest::Client,
    pub base_url: String,
}

impl ApiClient {
    pub fn new(session: &Session) -> Result<Self, Error> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(ApiClient {
            http_client,
            base_url: session.base_url.clone(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Envelope {
        match self.try_post(endpoint, body).await {
            Ok(envelope) => envelope,
            Err(err) => {
                log::error!("{} request failed: {:?}", endpoint, err);
                Envelope::error(TRANSPORT_FAILURE)
            }
        }
    }

    async fn try_post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Envelope, Error> {
        let envelope = self
            .http_client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json::<Envelope>()
            .await?;
        Ok(envelope)
    }
}

#[async_trait]
impl TaskApi for ApiClient {
    async fn get_tasks(&self, team_code: &str, selector: TaskSelector) -> Envelope {
        log::debug!("getting tasks {:?}", selector);
        let query = TaskQuery {
            id: selector,
            teamcode: team_code.to_string(),
        };
        self.post(TASKS_ENDPOINT, &query).await
    }

    async fn submit_answers(&self, team_code: &str, submission: Submission) -> Envelope {
        log::debug!("submitting {} answers for task {}", submission.answers.len(), submission.id);
        let body = AnswerSubmission {
            id: submission.id,
            teamcode: team_code.to_string(),
            original_data: submission.original_data,
            original_hash: submission.original_hash,
            answer_data: submission.answers,
        };
        self.post(ANSWER_ENDPOINT, &body).await
    }
}
