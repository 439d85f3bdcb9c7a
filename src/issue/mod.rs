// Issue source boundary - supplies tracked-issue context to the pipeline
//
// The issue tracker integration lives outside the core; it hands over a
// best-effort plain-text extraction of the issue's structured fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attachment metadata as reported by the issue tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueAttachment {
    pub filename: String,
    pub mime_type: String,
}

/// Plain-text issue context handed over by the issue source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueContext {
    /// Tracker key, e.g. "PROJ-123"
    pub key: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(default)]
    pub attachments: Vec<IssueAttachment>,
}

#[derive(Debug, Clone, Error)]
pub enum IssueError {
    #[error("Issue '{0}' not found")]
    NotFound(String),
    #[error("Issue source error: {0}")]
    Source(String),
}

/// External collaborator that resolves issue keys to context
pub trait IssueSource: Send + Sync {
    fn get_issue(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<IssueContext, IssueError>> + Send;
}

/// Assemble the free-text context block for a generation request:
/// summary, then description, then acceptance criteria when present.
pub fn compose_issue_context(issue: &IssueContext) -> String {
    let mut text = format!("Issue: {}\nSummary: {}", issue.key, issue.summary);

    if let Some(description) = issue
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        text.push_str("\n\nDescription:\n");
        text.push_str(description.trim());
    }

    if let Some(criteria) = issue
        .acceptance_criteria
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        text.push_str("\n\nAcceptance Criteria:\n");
        text.push_str(criteria.trim());
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> IssueContext {
        IssueContext {
            key: "PROJ-9".to_string(),
            summary: "Login button unresponsive".to_string(),
            description: Some("Clicking login does nothing on Safari.".to_string()),
            acceptance_criteria: Some("Login works on all supported browsers".to_string()),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_compose_full_context() {
        let text = compose_issue_context(&issue());
        assert!(text.starts_with("Issue: PROJ-9\nSummary: Login button unresponsive"));
        assert!(text.contains("Description:\nClicking login does nothing on Safari."));
        assert!(text.contains("Acceptance Criteria:\nLogin works on all supported browsers"));
    }

    #[test]
    fn test_compose_skips_empty_sections() {
        let mut issue = issue();
        issue.description = Some("   ".to_string());
        issue.acceptance_criteria = None;

        let text = compose_issue_context(&issue);
        assert!(!text.contains("Description:"));
        assert!(!text.contains("Acceptance Criteria:"));
    }
}
