//! Entity to DTO mappers

use share_core::entities::{Content, DiscoverySelection, LikeOutcome, Reconciliation};

use super::responses::{ContentResponse, DiscoveryResponse, LikeResponse, ReconcileReport};

impl From<&Content> for ContentResponse {
    fn from(content: &Content) -> Self {
        Self {
            id: content.id,
            owner_id: content.owner_id,
            category_id: content.category_id,
            title: content.title.clone(),
            media_url: content.media_url.clone(),
            status: content.status,
            view_count: content.view_count,
            like_count: content.like_count,
            created_at: content.created_at,
            updated_at: content.updated_at,
            view: None,
            liked: None,
        }
    }
}

impl From<Content> for ContentResponse {
    fn from(content: Content) -> Self {
        Self::from(&content)
    }
}

impl From<LikeOutcome> for LikeResponse {
    fn from(outcome: LikeOutcome) -> Self {
        Self {
            liked: outcome.liked,
            like_count: outcome.like_count,
        }
    }
}

impl From<DiscoverySelection> for DiscoveryResponse {
    fn from(selection: DiscoverySelection) -> Self {
        Self {
            items: selection.items,
            generated_at: selection.generated_at,
        }
    }
}

impl ReconcileReport {
    /// Counters after the overwrite, with the drift from what was stored
    /// before when it exceeds `tolerance`
    pub fn new(rec: Reconciliation, tolerance: i64) -> Self {
        Self {
            content_id: rec.content_id,
            view_count: rec.recomputed.view_count,
            like_count: rec.recomputed.like_count,
            drift: rec.drift(tolerance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use share_core::{ContentStatus, Counters, Snowflake};

    #[test]
    fn test_content_mapping_keeps_counters() {
        let mut content = Content::new(
            Snowflake::new(5),
            Snowflake::new(1),
            Snowflake::new(2),
            "Lake",
            ContentStatus::Draft,
        )
        .with_media_url("/m/5.png");
        content.view_count = 12;
        content.like_count = 3;

        let response = ContentResponse::from(&content);
        assert_eq!(response.view_count, 12);
        assert_eq!(response.like_count, 3);
        assert_eq!(response.media_url.as_deref(), Some("/m/5.png"));
        assert!(response.view.is_none());
    }

    #[test]
    fn test_reconcile_report_applies_tolerance() {
        let rec = Reconciliation {
            content_id: Snowflake::new(1),
            stored: Counters::new(4, 1),
            recomputed: Counters::new(3, 1),
        };
        assert_eq!(ReconcileReport::new(rec, 0).drift.map(|d| d.view_delta), Some(-1));
        assert!(ReconcileReport::new(rec, 1).drift.is_none());
    }

    #[test]
    fn test_reconcile_report_without_drift() {
        let rec = Reconciliation {
            content_id: Snowflake::new(1),
            stored: Counters::new(2, 1),
            recomputed: Counters::new(2, 1),
        };
        let report = ReconcileReport::new(rec, 0);
        assert_eq!(report.view_count, 2);
        assert!(report.drift.is_none());
    }
}
