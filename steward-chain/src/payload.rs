use serde::{Deserialize, Serialize};
use serde_json::Value;
use steward_media::{ImageBlob, MediaId};

/// The two shapes a `Job`'s payload can take. Kept as a tagged enum per
/// field rather than an untyped map so every consumer pattern-matches
/// instead of probing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    Work,
    Approval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkJobPayload {
    pub target_resource_id: String,
    pub action_id: i64,
    pub title: String,
    pub feedback: String,
    pub selections: Vec<String>,
    pub count: Option<u64>,
    pub images: Vec<ImageBlob>,
    /// One slot per image, filled in as uploads complete so a crash mid
    /// batch resumes only the remaining slots (spec'd as `uploadedIds[]`).
    pub uploaded_ids: Vec<Option<MediaId>>,
    /// Free-form metadata; must always carry `client_op_id` and
    /// `submitted_at` so the indexer can echo the dedup key back.
    pub metadata: Value,
}

impl WorkJobPayload {
    pub fn new(
        target_resource_id: String,
        action_id: i64,
        title: String,
        feedback: String,
        selections: Vec<String>,
        count: Option<u64>,
        images: Vec<ImageBlob>,
        client_op_id: &str,
        submitted_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let uploaded_ids = vec![None; images.len()];
        Self {
            target_resource_id,
            action_id,
            title,
            feedback,
            selections,
            count,
            images,
            uploaded_ids,
            metadata: serde_json::json!({
                "clientOpId": client_op_id,
                "submittedAt": submitted_at.to_rfc3339(),
            }),
        }
    }

    /// Indices whose image still needs uploading.
    pub fn pending_upload_indices(&self) -> Vec<usize> {
        self.uploaded_ids
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| id.is_none().then_some(idx))
            .collect()
    }

    pub fn all_uploaded(&self) -> bool {
        self.uploaded_ids.iter().all(Option::is_some)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalJobPayload {
    pub target_resource_id: String,
    pub work_id: String,
    pub approved: bool,
    pub feedback: Option<String>,
    pub recipient_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JobPayload {
    Work(WorkJobPayload),
    Approval(ApprovalJobPayload),
}

impl JobPayload {
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::Work(_) => JobKind::Work,
            JobPayload::Approval(_) => JobKind::Approval,
        }
    }

    /// The resource this job targets, for MergeView grouping and indexer
    /// queries — a garden/plot address for both payload shapes.
    pub fn target_resource_id(&self) -> &str {
        match self {
            JobPayload::Work(work) => &work.target_resource_id,
            JobPayload::Approval(approval) => &approval.target_resource_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_upload_indices_tracks_nulls() {
        let images = vec![
            ImageBlob::new(bytes::Bytes::from_static(b"a"), "image/jpeg"),
            ImageBlob::new(bytes::Bytes::from_static(b"b"), "image/jpeg"),
        ];
        let mut payload = WorkJobPayload::new(
            "garden-1".into(),
            1,
            "title".into(),
            "feedback".into(),
            vec![],
            None,
            images,
            "op-1",
            chrono::Utc::now(),
        );
        assert_eq!(payload.pending_upload_indices(), vec![0, 1]);
        payload.uploaded_ids[0] = Some(MediaId::new());
        assert_eq!(payload.pending_upload_indices(), vec![1]);
        assert!(!payload.all_uploaded());
    }
}
