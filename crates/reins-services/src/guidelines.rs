//! Guidelines store contract: a sink for proposed guideline updates.
//!
//! The engine never applies an update itself. Proposals land here and wait
//! for human review.

use std::sync::RwLock;

use async_trait::async_trait;
use reins_types::{GuidelineUpdate, SessionId};

use crate::error::ServiceError;

/// Contract for the guideline-update sink.
#[async_trait]
pub trait GuidelinesStore: Send + Sync {
    /// Deliver proposed updates from one learning pass.
    async fn submit(
        &self,
        session: &SessionId,
        updates: &[GuidelineUpdate],
    ) -> Result<(), ServiceError>;
}

/// In-memory guidelines store retaining every submission for inspection.
pub struct InMemoryGuidelinesStore {
    submissions: RwLock<Vec<(SessionId, GuidelineUpdate)>>,
}

impl InMemoryGuidelinesStore {
    pub fn new() -> Self {
        Self {
            submissions: RwLock::new(Vec::new()),
        }
    }

    /// Every update submitted so far, in arrival order.
    pub fn all(&self) -> Vec<GuidelineUpdate> {
        self.submissions
            .read()
            .unwrap()
            .iter()
            .map(|(_, u)| u.clone())
            .collect()
    }

    pub fn for_session(&self, session: &SessionId) -> Vec<GuidelineUpdate> {
        self.submissions
            .read()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == session)
            .map(|(_, u)| u.clone())
            .collect()
    }
}

impl Default for InMemoryGuidelinesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GuidelinesStore for InMemoryGuidelinesStore {
    async fn submit(
        &self,
        session: &SessionId,
        updates: &[GuidelineUpdate],
    ) -> Result<(), ServiceError> {
        let mut submissions = self.submissions.write().unwrap();
        for update in updates {
            submissions.push((session.clone(), update.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_update() -> GuidelineUpdate {
        GuidelineUpdate {
            update_type: "tone".into(),
            path: "messaging/outreach".into(),
            reason: "agent register too formal".into(),
            suggested_change: "Prefer a conversational opening".into(),
        }
    }

    #[tokio::test]
    async fn submissions_are_retained_per_session() {
        let store = InMemoryGuidelinesStore::new();
        let session_a = SessionId::new("a");
        let session_b = SessionId::new("b");

        store
            .submit(&session_a, &[sample_update(), sample_update()])
            .await
            .unwrap();
        store.submit(&session_b, &[sample_update()]).await.unwrap();

        assert_eq!(store.all().len(), 3);
        assert_eq!(store.for_session(&session_a).len(), 2);
        assert_eq!(store.for_session(&session_b).len(), 1);
    }
}
