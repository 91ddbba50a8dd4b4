//! REST client for the quiz backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::models::{Identity, LeaderboardEntry, Question};
use crate::protocol::{
    extract_error_message, extract_user_id, AnswerRequest, AnswerResponse, RegistrationForm,
    SignInForm,
};

use super::{ApiError, QuizApi};

pub struct HttpApi {
    client: Client,
    api_url: String,
    auth_url: String,
}

impl HttpApi {
    /// Build a client for the quiz API at `api_url` and the account API at
    /// `auth_url`.
    pub fn new(api_url: &str, auth_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_endpoint(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }

    fn auth_endpoint(&self, path: &str) -> String {
        join_url(&self.auth_url, path)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let url = self.api_endpoint(path);
        debug!("GET {}", url);

        let fetch_error = |reason: String| ApiError::Fetch { what, reason };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())));
        }

        response.json().await.map_err(|e| fetch_error(e.to_string()))
    }

    /// POST a JSON body to an account endpoint and return the response text.
    async fn post_account<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        let url = self.auth_endpoint(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::Server {
                status: status.as_u16(),
                message: extract_error_message(&text),
            })
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Parse a 2xx `/answer` body.
fn decode_answer(status: StatusCode, body: &str) -> Result<AnswerResponse, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        warn!("Undecodable answer response: {}", e);
        ApiError::Server {
            status: status.as_u16(),
            message: format!("Invalid answer response: {e}"),
        }
    })
}

async fn server_error(status: StatusCode, response: Response) -> ApiError {
    let body = response.text().await.unwrap_or_default();
    ApiError::Server {
        status: status.as_u16(),
        message: extract_error_message(&body),
    }
}

#[async_trait]
impl QuizApi for HttpApi {
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
        let questions: Vec<Question> = self.fetch_json("questions", "questions").await?;
        info!("Fetched {} questions", questions.len());
        Ok(questions)
    }

    async fn submit_answer(
        &self,
        identity: Option<&Identity>,
        question_id: &str,
        selected_option: &str,
    ) -> Result<AnswerResponse, ApiError> {
        let identity = identity.ok_or(ApiError::Unauthenticated)?;

        let request = AnswerRequest {
            question_id: question_id.to_string(),
            selected_option: selected_option.to_string(),
            username: identity.user_id.clone(),
            user_id: identity.user_id.clone(),
        };

        let url = self.api_endpoint("answer");
        debug!("POST {} for question {}", url, question_id);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let err = server_error(status, response).await;
            warn!("Answer submission rejected: {}", err);
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode_answer(status, &body)
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.fetch_json("leaderboard", "leaderboard").await
    }

    async fn register(&self, form: &RegistrationForm) -> Result<(), ApiError> {
        form.validate()?;
        self.post_account("api/user/register", form).await?;
        info!("Registered {}", form.email);
        Ok(())
    }

    async fn sign_in(&self, form: &SignInForm) -> Result<Identity, ApiError> {
        form.validate()?;
        let body = self.post_account("api/user/signin", form).await?;

        let user_id = extract_user_id(&body).unwrap_or_else(|| form.email.clone());
        info!("Signed in as {}", user_id);
        Ok(Identity::new(user_id).with_email(form.email.clone()))
    }
}
