//! Jira REST API v2 request and response models.
//!
//! Only the fields the adapter reads or writes are modelled.

use serde::{Deserialize, Serialize};

/// Response of `GET /rest/api/2/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraSearchResponse {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraIssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssueFields {
    #[serde(default)]
    pub summary: String,
}

/// Body of `POST /rest/api/2/issue`.
#[derive(Debug, Clone, Serialize)]
pub struct JiraCreateIssueRequest {
    pub fields: JiraCreateFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct JiraCreateFields {
    pub project: JiraProjectRef,
    pub summary: String,
    pub description: String,
    pub issuetype: JiraIssueTypeRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct JiraProjectRef {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JiraIssueTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraCreateIssueResponse {
    pub key: String,
}

/// Response of `GET /rest/api/2/myself`.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraMyself {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
}

impl JiraMyself {
    /// Best available label for the authenticated user.
    pub fn label(&self) -> String {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.email_address.as_deref())
            .unwrap_or("unknown")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parses() {
        let body = r#"{"startAt": 0, "total": 1, "issues": [
            {"id": "10001", "key": "PAY-7", "fields": {"summary": "Send invoice"}}
        ]}"#;
        let parsed: JiraSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.issues[0].key, "PAY-7");
        assert_eq!(parsed.issues[0].fields.summary, "Send invoice");
    }

    #[test]
    fn test_myself_label_prefers_display_name() {
        let me: JiraMyself =
            serde_json::from_str(r#"{"displayName": "Ada", "name": "ada"}"#).unwrap();
        assert_eq!(me.label(), "Ada");

        let me: JiraMyself = serde_json::from_str(r#"{"name": "ada"}"#).unwrap();
        assert_eq!(me.label(), "ada");
    }

    #[test]
    fn test_create_request_shape() {
        let request = JiraCreateIssueRequest {
            fields: JiraCreateFields {
                project: JiraProjectRef { key: "PAY".into() },
                summary: "Send invoice".into(),
                description: "d".into(),
                issuetype: JiraIssueTypeRef { name: "Story".into() },
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fields"]["project"]["key"], "PAY");
        assert_eq!(json["fields"]["issuetype"]["name"], "Story");
    }
}
