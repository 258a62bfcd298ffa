use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::models::board::BoardKind;
use crate::models::booking::Booking;
use crate::models::movement::{MoveConfirmation, MoveResponse, SlotAvailability};
use crate::models::settings::Settings;

use super::{RemoteError, RemoteScheduler};

/// REST client for the clinic backend.
pub struct HttpScheduler {
    client: Client,
    base_url: String,
    kind: BoardKind,
    max_retries: usize,
    retry_delay_ms: u64,
}

impl HttpScheduler {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("Failed to build scheduler HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            kind: settings.board,
            max_retries: settings.fetch_retries,
            retry_delay_ms: settings.retry_delay_ms,
        })
    }

    fn window_url(&self, branch_id: &str) -> String {
        format!("{}/branches/{}/{}", self.base_url, branch_id, self.kind.resource())
    }

    fn schedule_url(&self, confirmation: &MoveConfirmation) -> String {
        format!(
            "{}/{}/{}/schedule",
            self.base_url,
            self.kind.resource(),
            confirmation.booking_id
        )
    }

    fn slots_url(&self, branch_id: &str) -> String {
        format!("{}/branches/{}/slots", self.base_url, branch_id)
    }

    async fn fetch_window_once(
        &self,
        branch_id: &str,
        week_start: NaiveDate,
    ) -> Result<Vec<Booking>, RemoteError> {
        let response = self
            .client
            .get(self.window_url(branch_id))
            .query(&[("weekStart", week_start.format("%Y-%m-%d").to_string())])
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response).await
    }
}

#[async_trait]
impl RemoteScheduler for HttpScheduler {
    async fn fetch_window(
        &self,
        branch_id: &str,
        week_start: NaiveDate,
    ) -> Result<Vec<Booking>, RemoteError> {
        let mut attempt = 0;
        loop {
            match self.fetch_window_once(branch_id, week_start).await {
                Ok(bookings) => return Ok(bookings),
                Err(err) if err.is_network() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Window fetch attempt {} for week {} failed: {}",
                        attempt,
                        week_start,
                        err
                    );
                    tokio::time::sleep(Duration::from_millis(self.retry_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    // Not retried: a move that timed out may already have been applied.
    async fn confirm_move(
        &self,
        _branch_id: &str,
        confirmation: &MoveConfirmation,
    ) -> Result<MoveResponse, RemoteError> {
        let response = self
            .client
            .put(self.schedule_url(confirmation))
            .json(confirmation)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if is_refusal(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(refusal(status, &body));
        }

        read_json(response).await
    }

    async fn slot_availability(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, RemoteError> {
        let response = self
            .client
            .get(self.slots_url(branch_id))
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response).await
    }
}

/// 4xx means the backend refused the move, except 408 which is a timeout.
fn is_refusal(status: StatusCode) -> bool {
    status.is_client_error() && status != StatusCode::REQUEST_TIMEOUT
}

fn refusal(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<MoveResponse>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| format!("request refused (HTTP {})", status));
    RemoteError::Rejected { message }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Network("request timed out".to_string())
    } else {
        RemoteError::Network(err.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        return Err(RemoteError::Network(format!("HTTP status {}", status)));
    }
    if !status.is_success() {
        return Err(RemoteError::InvalidResponse(format!("HTTP status {}", status)));
    }

    response
        .json::<T>()
        .await
        .map_err(|err| RemoteError::InvalidResponse(err.to_string()))
}
