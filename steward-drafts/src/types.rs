//! DraftRecord / DraftImage shapes and the `firstIncompleteStep` cursor.
//! Draft images hold raw bytes rather than a
//! `steward_media::ImageBlob` — DraftStore is deliberately decoupled from
//! the upload pipeline, which only sees images after a draft is enqueued.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steward_core::{ChainId, UserAddress};
use uuid::Uuid;

/// Opaque identifier for a `DraftRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftId(pub String);

impl DraftId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for a `DraftImage`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftImageId(pub String);

impl DraftImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for DraftImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Step order is fixed: intro → media → details → review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftStep {
    Intro,
    Media,
    Details,
    Review,
}

/// Fields an `updateDraft` call may change. `user_address`, `chain_id`,
/// `id`, and `created_at` are immutable after creation.
#[derive(Debug, Clone, Default)]
pub struct DraftFields {
    pub target_resource_id: Option<String>,
    pub action_id: Option<i64>,
    pub current_step: Option<DraftStep>,
    pub feedback: Option<String>,
    pub selections: Option<Vec<String>>,
    pub count: Option<Option<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: DraftId,
    pub user_address: UserAddress,
    pub chain_id: ChainId,
    pub target_resource_id: String,
    pub action_id: Option<i64>,
    pub current_step: DraftStep,
    pub first_incomplete_step: DraftStep,
    pub feedback: String,
    pub selections: Vec<String>,
    pub count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftRecord {
    pub fn new(
        id: DraftId,
        user_address: UserAddress,
        chain_id: ChainId,
        target_resource_id: String,
        action_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_address,
            chain_id,
            target_resource_id,
            action_id,
            current_step: DraftStep::Intro,
            first_incomplete_step: DraftStep::Intro,
            feedback: String::new(),
            selections: Vec::new(),
            count: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: DraftFields, now: DateTime<Utc>) {
        if let Some(target_resource_id) = fields.target_resource_id {
            self.target_resource_id = target_resource_id;
        }
        if let Some(action_id) = fields.action_id {
            self.action_id = Some(action_id);
        }
        if let Some(current_step) = fields.current_step {
            self.current_step = current_step;
        }
        if let Some(feedback) = fields.feedback {
            self.feedback = feedback;
        }
        if let Some(selections) = fields.selections {
            self.selections = selections;
        }
        if let Some(count) = fields.count {
            self.count = count;
        }
        self.updated_at = now;
    }

    /// The dedup key: at most one draft per `(user, chain, resource, action)`.
    pub fn dedup_key(&self) -> (UserAddress, ChainId, String, i64) {
        (
            self.user_address.clone(),
            self.chain_id,
            self.target_resource_id.clone(),
            self.action_id.unwrap_or_default(),
        )
    }

    fn intro_complete(&self) -> bool {
        !self.target_resource_id.is_empty() && self.action_id.is_some()
    }

    fn media_complete(&self, image_count: usize) -> bool {
        image_count > 0
    }

    fn details_complete(&self) -> bool {
        !self.feedback.trim().is_empty()
    }

    /// Computes the cursor from current fields and image count, per the
    /// fixed step order intro → media → details → review.
    fn compute_first_incomplete_step(&self, image_count: usize) -> DraftStep {
        if !self.intro_complete() {
            return DraftStep::Intro;
        }
        if !self.media_complete(image_count) {
            return DraftStep::Media;
        }
        if !self.details_complete() {
            return DraftStep::Details;
        }
        DraftStep::Review
    }

    /// Recomputes and stores `first_incomplete_step`. Called after every
    /// write that could change step completeness (field update, image
    /// add/remove/replace).
    pub fn recompute_cursor(&mut self, image_count: usize) {
        self.first_incomplete_step = self.compute_first_incomplete_step(image_count);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftImage {
    pub id: DraftImageId,
    pub draft_id: DraftId,
    pub position: u32,
    pub bytes: bytes::Bytes,
    pub content_type: String,
    pub size: u64,
}

impl DraftImage {
    pub fn new(draft_id: DraftId, position: u32, bytes: bytes::Bytes, content_type: String) -> Self {
        let size = bytes.len() as u64;
        Self {
            id: DraftImageId::new(),
            draft_id,
            position,
            bytes,
            content_type,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> DraftRecord {
        DraftRecord::new(
            DraftId::new(),
            UserAddress::new("0xuser"),
            ChainId(10),
            String::new(),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn cursor_starts_at_intro_when_resource_unset() {
        let mut d = draft();
        d.recompute_cursor(0);
        assert_eq!(d.first_incomplete_step, DraftStep::Intro);
    }

    #[test]
    fn cursor_advances_through_media_and_details() {
        let mut d = draft();
        d.target_resource_id = "garden-1".into();
        d.action_id = Some(7);
        d.recompute_cursor(0);
        assert_eq!(d.first_incomplete_step, DraftStep::Media);

        d.recompute_cursor(1);
        assert_eq!(d.first_incomplete_step, DraftStep::Details);

        d.feedback = "looks healthy".into();
        d.recompute_cursor(1);
        assert_eq!(d.first_incomplete_step, DraftStep::Review);
    }

    #[test]
    fn apply_never_touches_immutable_fields() {
        let mut d = draft();
        let created = d.created_at;
        let id = d.id.clone();
        d.apply(
            DraftFields {
                feedback: Some("hi".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(d.created_at, created);
        assert_eq!(d.id, id);
        assert_eq!(d.feedback, "hi");
    }
}
