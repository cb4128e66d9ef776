use shared::{
    domain::{ProjectSummary, SiteContent},
    error::{ApiError, ErrorCode},
    protocol::{MessageSummary, SubmitMessageRequest},
};
use storage::{CounterStore, Storage};
use tracing::warn;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub content: SiteContent,
}

const MAX_MESSAGE_BYTES: usize = 4000;
const MAX_REPLY_TO_BYTES: usize = 180;

/// Best-effort page-view telemetry. A store failure is logged and swallowed;
/// this never propagates and must never fail the page render.
pub async fn record_page_view<S: CounterStore + ?Sized>(store: &S) {
    if let Err(error) = store.increment_visits().await {
        warn!(%error, "page view increment failed");
    }
}

/// Current view count for display. Row absence and read failures both
/// resolve to the unknown sentinel (`None`), never to an error.
pub async fn page_view_count<S: CounterStore + ?Sized>(store: &S) -> Option<u64> {
    match store.visit_count().await {
        Ok(count) => count,
        Err(error) => {
            warn!(%error, "page view read failed");
            None
        }
    }
}

pub fn featured_projects(ctx: &ApiContext) -> Vec<ProjectSummary> {
    ctx.content.projects.clone()
}

pub async fn submit_message(
    ctx: &ApiContext,
    req: SubmitMessageRequest,
) -> Result<MessageSummary, ApiError> {
    let body = req.body.trim();
    if body.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "message body cannot be empty",
        ));
    }
    if body.len() > MAX_MESSAGE_BYTES {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("message body exceeds {} bytes", MAX_MESSAGE_BYTES),
        ));
    }

    let reply_to = req
        .reply_to
        .as_deref()
        .map(str::trim)
        .filter(|handle| !handle.is_empty());
    if let Some(handle) = reply_to {
        if handle.len() > MAX_REPLY_TO_BYTES {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "reply-to handle is too long",
            ));
        }
    }

    let stored = ctx
        .storage
        .insert_contact_message(body, reply_to)
        .await
        .map_err(internal)?;

    Ok(MessageSummary {
        message_id: stored.message_id,
        body: stored.body,
        reply_to: stored.reply_to,
        received_at: stored.received_at,
    })
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use shared::domain::Profile;
    use storage::Storage;

    struct FailingStore;

    #[async_trait]
    impl CounterStore for FailingStore {
        async fn increment_visits(&self) -> Result<()> {
            Err(anyhow!("counter store unreachable"))
        }

        async fn visit_count(&self) -> Result<Option<u64>> {
            Err(anyhow!("counter store unreachable"))
        }
    }

    fn content() -> SiteContent {
        SiteContent {
            profile: Profile {
                display_name: "@dev".into(),
                tagline: "software developer".into(),
                bio: vec!["Builds things for the web.".into()],
                footer: "All rights reserved.".into(),
            },
            links: Vec::new(),
            projects: vec![ProjectSummary {
                name: "Fractal explorer".into(),
                summary: "Interactive fractal renderer.".into(),
                tags: vec!["graphics".into()],
                live_url: None,
            }],
        }
    }

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext {
            storage,
            content: content(),
        }
    }

    #[tokio::test]
    async fn record_page_view_swallows_store_errors() {
        // Must return normally for any error the store produces.
        record_page_view(&FailingStore).await;
    }

    #[tokio::test]
    async fn page_view_count_resolves_failure_to_unknown() {
        assert_eq!(page_view_count(&FailingStore).await, None);
    }

    #[tokio::test]
    async fn page_view_count_is_unknown_before_any_view() {
        let ctx = setup().await;
        assert_eq!(page_view_count(&ctx.storage).await, None);
    }

    #[tokio::test]
    async fn page_view_count_reflects_recorded_views() {
        let ctx = setup().await;
        record_page_view(&ctx.storage).await;
        assert_eq!(page_view_count(&ctx.storage).await, Some(1));

        record_page_view(&ctx.storage).await;
        assert_eq!(page_view_count(&ctx.storage).await, Some(2));
    }

    #[tokio::test]
    async fn rejects_empty_message_body() {
        let ctx = setup().await;
        let err = submit_message(
            &ctx,
            SubmitMessageRequest {
                body: "   ".into(),
                reply_to: None,
            },
        )
        .await
        .expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::Validation));
    }

    #[tokio::test]
    async fn rejects_oversized_message_body() {
        let ctx = setup().await;
        let err = submit_message(
            &ctx,
            SubmitMessageRequest {
                body: "x".repeat(MAX_MESSAGE_BYTES + 1),
                reply_to: None,
            },
        )
        .await
        .expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::Validation));
    }

    #[tokio::test]
    async fn stores_trimmed_message_and_blank_reply_to_as_none() {
        let ctx = setup().await;
        let summary = submit_message(
            &ctx,
            SubmitMessageRequest {
                body: "  hello there  ".into(),
                reply_to: Some("   ".into()),
            },
        )
        .await
        .expect("submit");

        assert_eq!(summary.body, "hello there");
        assert_eq!(summary.reply_to, None);

        let listed = ctx
            .storage
            .list_contact_messages(10, None)
            .await
            .expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].message_id, summary.message_id);
    }

    #[tokio::test]
    async fn featured_projects_come_from_site_content() {
        let ctx = setup().await;
        let projects = featured_projects(&ctx);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Fractal explorer");
    }
}
