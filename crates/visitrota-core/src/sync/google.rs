//! Google Calendar client for rotation events.
//!
//! One event per rotation on the assignee's primary calendar. Requests carry
//! a timeout and bounded retry with exponential backoff; expired access
//! tokens are refreshed before the call and written back into the caller's
//! `User`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use super::oauth;
use super::CalendarSync;
use crate::error::{Result, RotaError};
use crate::model::{Group, User};
use crate::period;
use crate::storage::Config;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;

/// Google Calendar API client.
pub struct GoogleCalendar {
    http: Client,
    api_base: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    time_zone: String,
}

impl GoogleCalendar {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            time_zone: time_zone.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.google.client_id,
            &config.google.client_secret,
            &config.calendar.time_zone,
        )
    }

    /// Point the client at different endpoints (tests).
    pub fn with_endpoints(
        mut self,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.token_url = token_url.into();
        self
    }

    /// Return a valid access token, refreshing if expired.
    ///
    /// A successful refresh is written back into `user` so the caller can
    /// persist it alongside the calendar mutation.
    async fn valid_access_token(&self, user: &mut User) -> Result<String> {
        let tokens = user.calendar_tokens.as_ref().ok_or_else(|| {
            RotaError::Unauthenticated(format!(
                "user '{}' has not connected a calendar",
                user.email
            ))
        })?;

        if !oauth::is_expired(tokens) {
            return Ok(tokens.access_token.clone());
        }

        let refresh = tokens.refresh_token.as_deref().ok_or_else(|| {
            RotaError::Unauthenticated(format!(
                "user '{}' has an expired token and no refresh token",
                user.email
            ))
        })?;

        let refreshed = oauth::refresh(
            &self.http,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
            refresh,
        )
        .await?;

        let token = refreshed.access_token.clone();
        user.calendar_tokens = Some(refreshed);
        Ok(token)
    }

    /// Issue a request, retrying transport errors, 5xx and 429.
    async fn send_with_retry<F>(&self, mut request: F) -> Result<reqwest::Response>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut delay = Duration::from_millis(500);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match request().timeout(REQUEST_TIMEOUT).send().await {
                Ok(resp)
                    if resp.status().is_server_error() || resp.status().as_u16() == 429 =>
                {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(RotaError::ExternalSync(format!(
                            "calendar API returned {} after {attempt} attempts",
                            resp.status()
                        )));
                    }
                }
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(err.into());
                    }
                }
            }

            debug!(attempt, "retrying calendar request");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl CalendarSync for GoogleCalendar {
    async fn create_event(
        &self,
        user: &mut User,
        group: &Group,
        period_start: NaiveDate,
    ) -> Result<String> {
        let token = self.valid_access_token(user).await?;
        let (start, end) = period::visit_window(&group.schedule, period_start)?;
        let body = event_payload(group, start, end, &self.time_zone);

        let url = format!("{}/calendars/primary/events", self.api_base);
        let resp = self
            .send_with_retry(|| self.http.post(&url).bearer_auth(&token).json(&body))
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(RotaError::ExternalSync(format!(
                "event create returned {status}: {detail}"
            )));
        }

        let body: serde_json::Value = resp.json().await?;
        let event_id = body["id"]
            .as_str()
            .ok_or_else(|| RotaError::ExternalSync("missing event id in response".to_string()))?
            .to_string();

        Ok(event_id)
    }

    async fn delete_event(&self, user: &mut User, event_id: &str) -> Result<()> {
        let token = self.valid_access_token(user).await?;

        let url = format!("{}/calendars/primary/events/{}", self.api_base, event_id);
        let resp = self
            .send_with_retry(|| self.http.delete(&url).bearer_auth(&token))
            .await?;

        if !resp.status().is_success() {
            return Err(RotaError::ExternalSync(format!(
                "event delete returned {}",
                resp.status()
            )));
        }

        Ok(())
    }
}

/// Build the Calendar API event body for a visit.
///
/// Reminders are fixed: one popup a day before, one an hour before.
pub fn event_payload(
    group: &Group,
    start: NaiveDateTime,
    end: NaiveDateTime,
    time_zone: &str,
) -> serde_json::Value {
    let description = group
        .description
        .clone()
        .unwrap_or_else(|| format!("Rotating visit for {}", group.name));

    json!({
        "summary": format!("Visit: {}", group.name),
        "description": description,
        "start": {
            "dateTime": start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": time_zone,
        },
        "end": {
            "dateTime": end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "timeZone": time_zone,
        },
        "reminders": {
            "useDefault": false,
            "overrides": [
                {"method": "popup", "minutes": 24 * 60},
                {"method": "popup", "minutes": 60},
            ],
        },
    })
}
