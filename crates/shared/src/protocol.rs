use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MessageId, ProjectSummary};

/// Current page-view count; `None` is the "unknown" sentinel returned when
/// the counter row does not exist yet or the read failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageViewsResponse {
    pub views: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMessageRequest {
    pub body: String,
    #[serde(default)]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    pub message_id: MessageId,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub received_at: DateTime<Utc>,
}
