//! Third-party mailing list forwarding
//!
//! Subscriptions are stored locally first; forwarding is best effort and its
//! errors are only logged by the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stdg_common::config::MailingListSettings;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum MailingListError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mailing list rejected member ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Client setup failed: {0}")]
    Setup(String),
}

#[async_trait]
pub trait MailingList: Send + Sync {
    /// Add a subscriber; an already-subscribed address is success
    async fn add_member(&self, email: &str, name: Option<&str>) -> Result<(), MailingListError>;
}

#[derive(Debug, Serialize)]
struct MemberRequest<'a> {
    email_address: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    merge_fields: Option<MergeFields<'a>>,
}

#[derive(Debug, Serialize)]
struct MergeFields<'a> {
    #[serde(rename = "FNAME")]
    first_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProblemDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

/// Mailchimp marketing API client
pub struct MailchimpClient {
    http_client: Client,
    api_key: String,
    list_id: String,
    base_url: String,
}

impl MailchimpClient {
    pub fn new(settings: &MailingListSettings) -> Result<Self, MailingListError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailingListError::Setup(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: settings.api_key.clone(),
            list_id: settings.list_id.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn members_url(&self) -> String {
        format!("{}/lists/{}/members", self.base_url, self.list_id)
    }
}

fn is_member_exists(problem: &ProblemDetail) -> bool {
    problem.title.eq_ignore_ascii_case("Member Exists")
}

#[async_trait]
impl MailingList for MailchimpClient {
    async fn add_member(&self, email: &str, name: Option<&str>) -> Result<(), MailingListError> {
        let body = MemberRequest {
            email_address: email,
            status: "subscribed",
            merge_fields: name.map(|first_name| MergeFields { first_name }),
        };

        let response = self
            .http_client
            .post(self.members_url())
            .basic_auth("stdg", Some(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(email = %email, "Forwarded subscriber to mailing list");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let problem = serde_json::from_str::<ProblemDetail>(&text).unwrap_or(ProblemDetail {
            title: String::new(),
            detail: text,
        });

        if is_member_exists(&problem) {
            debug!(email = %email, "Subscriber already on mailing list");
            return Ok(());
        }

        Err(MailingListError::Rejected {
            status: status.as_u16(),
            detail: if problem.detail.is_empty() {
                problem.title
            } else {
                problem.detail
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MailchimpClient {
        MailchimpClient::new(&MailingListSettings {
            api_key: "abc-us21".to_string(),
            list_id: "list123".to_string(),
            base_url: "https://us21.api.mailchimp.com/3.0/".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_members_url() {
        assert_eq!(
            client().members_url(),
            "https://us21.api.mailchimp.com/3.0/lists/list123/members"
        );
    }

    #[test]
    fn test_member_request_shape() {
        let body = MemberRequest {
            email_address: "a@example.com",
            status: "subscribed",
            merge_fields: Some(MergeFields { first_name: "Ann" }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "subscribed");
        assert_eq!(json["merge_fields"]["FNAME"], "Ann");

        let anonymous = MemberRequest {
            email_address: "a@example.com",
            status: "subscribed",
            merge_fields: None,
        };
        let json = serde_json::to_value(&anonymous).unwrap();
        assert!(json.get("merge_fields").is_none());
    }

    #[test]
    fn test_member_exists_detection() {
        let problem: ProblemDetail =
            serde_json::from_str(r#"{"title":"Member Exists","detail":"already a list member"}"#)
                .unwrap();
        assert!(is_member_exists(&problem));

        let problem: ProblemDetail =
            serde_json::from_str(r#"{"title":"Invalid Resource"}"#).unwrap();
        assert!(!is_member_exists(&problem));
    }
}
