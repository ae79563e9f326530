//! OAuth2 token model and the refresh grant.
//!
//! The interactive authorization exchange belongs to the identity
//! collaborator outside this crate; the core only checks expiry and
//! refreshes.

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RotaError};

/// Stored OAuth tokens for a user's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>, // Unix timestamp
    pub token_type: String,
    pub scope: Option<String>,
}

/// Check if tokens are expired (with 60s buffer).
pub fn is_expired(tokens: &CalendarTokens) -> bool {
    match tokens.expires_at {
        Some(exp) => Utc::now().timestamp() > exp - 60,
        None => false,
    }
}

/// Refresh an access token using a refresh token.
///
/// An explicit rejection from the token endpoint means the credentials are
/// unrefreshable and surfaces as `Unauthenticated`; transport failures
/// surface as `ExternalSync`.
pub async fn refresh(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh: &str,
) -> Result<CalendarTokens> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh),
        ("grant_type", "refresh_token"),
    ];

    let resp = http.post(token_url).form(&params).send().await?;
    let body: serde_json::Value = resp.json().await?;

    if let Some(error) = body.get("error") {
        return Err(RotaError::Unauthenticated(format!(
            "token refresh rejected: {error}"
        )));
    }

    let expires_in = body.get("expires_in").and_then(|v| v.as_i64());
    let expires_at = expires_in.map(|ei| Utc::now().timestamp() + ei);

    Ok(CalendarTokens {
        access_token: body["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        refresh_token: body
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| Some(refresh.to_string())),
        expires_at,
        token_type: body["token_type"].as_str().unwrap_or("Bearer").to_string(),
        scope: body.get("scope").and_then(|v| v.as_str()).map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expires_at: Option<i64>) -> CalendarTokens {
        CalendarTokens {
            access_token: "tok".to_string(),
            refresh_token: Some("ref".to_string()),
            expires_at,
            token_type: "Bearer".to_string(),
            scope: None,
        }
    }

    #[test]
    fn no_expiry_means_not_expired() {
        assert!(!is_expired(&tokens(None)));
    }

    #[test]
    fn past_expiry_is_expired() {
        assert!(is_expired(&tokens(Some(1))));
    }

    #[test]
    fn far_future_expiry_is_valid() {
        let exp = Utc::now().timestamp() + 3600;
        assert!(!is_expired(&tokens(Some(exp))));
    }

    #[test]
    fn buffer_treats_soon_to_expire_as_expired() {
        let exp = Utc::now().timestamp() + 30;
        assert!(is_expired(&tokens(Some(exp))));
    }
}
