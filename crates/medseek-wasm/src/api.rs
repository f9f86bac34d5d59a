//! REST calls against the consultation backend.

use gloo_net::http::{Request, Response};
use medseek_chat::{api_url, socket_url, ClientConfig};
use medseek_types::{
    ClientError, CloseAck, CreateSessionRequest, CreateSessionResponse, Message,
};
use serde::de::DeserializeOwned;

use crate::utils;

pub struct ApiClient {
    api_base: String,
    ws_path: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            ws_path: config.ws_path.clone(),
        }
    }

    /// `POST /session/create`
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreateSessionResponse, ClientError> {
        const CONTEXT: &str = "Failed to create session";

        let response = Request::post(&api_url(&self.api_base, "/session/create"))
            .json(request)
            .map_err(|e| ClientError::network(CONTEXT, e))?
            .send()
            .await
            .map_err(|e| ClientError::network(CONTEXT, e))?;

        let body: Option<CreateSessionResponse> = read_json(response, CONTEXT).await?;
        body.ok_or_else(|| ClientError::network(CONTEXT, "empty response"))
    }

    /// `GET /session/messages`; a missing body means no messages
    pub async fn get_session_messages(&self, session_id: &str) -> Result<Vec<Message>, ClientError> {
        const CONTEXT: &str = "Failed to fetch messages";

        let response = Request::get(&api_url(&self.api_base, "/session/messages"))
            .query([("session_id", session_id)])
            .send()
            .await
            .map_err(|e| ClientError::network(CONTEXT, e))?;

        let messages: Option<Vec<Message>> = read_json(response, CONTEXT).await?;
        Ok(messages.unwrap_or_default())
    }

    /// `POST /session/close`
    pub async fn close_session(&self, session_id: &str) -> Result<CloseAck, ClientError> {
        const CONTEXT: &str = "Failed to close session";

        let response = Request::post(&api_url(&self.api_base, "/session/close"))
            .query([("session_id", session_id)])
            .send()
            .await
            .map_err(|e| ClientError::network(CONTEXT, e))?;

        let ack: Option<CloseAck> = read_json(response, CONTEXT).await?;
        Ok(ack.unwrap_or_default())
    }

    /// Socket URL for a session on the current page host
    pub fn socket_url(&self, session_id: &str, user_id: &str) -> Result<String, ClientError> {
        let host = utils::get_host().map_err(|e| ClientError::Dom(format!("{:?}", e)))?;
        Ok(socket_url(
            &utils::get_page_protocol(),
            &host,
            &self.ws_path,
            &utils::encode_query_value(session_id),
            &utils::encode_query_value(user_id),
        ))
    }
}

/// Check the status and decode the body; an empty or `null` body is `None`
async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<Option<T>, ClientError> {
    if !response.ok() {
        let detail = format!("HTTP {} {}", response.status(), response.status_text());
        let body = response.text().await.unwrap_or_default();
        let body = body.trim();
        return Err(if body.is_empty() {
            ClientError::network(context, detail)
        } else {
            ClientError::network(context, format!("{} ({})", detail, body))
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| ClientError::network(context, e))?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text).map_err(|e| ClientError::network(context, e))
}
