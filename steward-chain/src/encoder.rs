use serde::Serialize;
use thiserror::Error;

use crate::payload::{JobPayload, WorkJobPayload};
use steward_media::MediaId;

/// Bytes ready to hand to a chain RPC endpoint, either as the real
/// submission or as a cheap pre-flight simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(pub Vec<u8>);

#[derive(Error, Debug, Clone)]
pub enum EncodeError {
    /// `encodeForSubmission` was asked to encode a job whose images are
    /// not all uploaded yet.
    #[error("image at index {index} has no uploaded media id")]
    MissingMedia { index: usize },
}

const SIMULATION_PLACEHOLDER: &str = "simulated-media-id";

/// A pure mapping from a job's payload to the wire bytes the attestation
/// protocol expects. The wire format itself is out of scope; this crate
/// only needs a deterministic, round-trippable encoding so tests can
/// assert on shape rather than on a real protocol's byte layout.
pub trait Encoder: Send + Sync {
    fn encode_for_simulation(&self, payload: &JobPayload) -> EncodedPayload;
    fn encode_for_submission(&self, payload: &JobPayload) -> Result<EncodedPayload, EncodeError>;
}

#[derive(Serialize)]
struct WireWork<'a> {
    target_resource_id: &'a str,
    action_id: i64,
    title: &'a str,
    feedback: &'a str,
    selections: &'a [String],
    count: Option<u64>,
    media_ids: Vec<String>,
    metadata: &'a serde_json::Value,
}

#[derive(Serialize)]
struct WireApproval<'a> {
    target_resource_id: &'a str,
    work_id: &'a str,
    approved: bool,
    feedback: Option<&'a str>,
    recipient_address: &'a str,
}

fn work_media_ids(payload: &WorkJobPayload, placeholder: bool) -> Result<Vec<String>, EncodeError> {
    if placeholder {
        return Ok(vec![SIMULATION_PLACEHOLDER.to_string(); payload.images.len()]);
    }
    payload
        .uploaded_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| {
            id.as_ref()
                .map(MediaId::to_string)
                .ok_or(EncodeError::MissingMedia { index: idx })
        })
        .collect()
}

/// JSON-based implementation. Real deployments would swap this for the
/// protocol's actual ABI/SSZ/whatever encoder; nothing else in the core
/// depends on the concrete byte layout.
#[derive(Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode_for_simulation(&self, payload: &JobPayload) -> EncodedPayload {
        let bytes = match payload {
            JobPayload::Work(work) => {
                let media_ids = work_media_ids(work, true).expect("placeholder encoding is infallible");
                serde_json::to_vec(&WireWork {
                    target_resource_id: &work.target_resource_id,
                    action_id: work.action_id,
                    title: &work.title,
                    feedback: &work.feedback,
                    selections: &work.selections,
                    count: work.count,
                    media_ids,
                    metadata: &work.metadata,
                })
            }
            JobPayload::Approval(approval) => serde_json::to_vec(&WireApproval {
                target_resource_id: &approval.target_resource_id,
                work_id: &approval.work_id,
                approved: approval.approved,
                feedback: approval.feedback.as_deref(),
                recipient_address: &approval.recipient_address,
            }),
        };
        EncodedPayload(bytes.unwrap_or_default())
    }

    fn encode_for_submission(&self, payload: &JobPayload) -> Result<EncodedPayload, EncodeError> {
        match payload {
            JobPayload::Work(work) => {
                let media_ids = work_media_ids(work, false)?;
                let bytes = serde_json::to_vec(&WireWork {
                    target_resource_id: &work.target_resource_id,
                    action_id: work.action_id,
                    title: &work.title,
                    feedback: &work.feedback,
                    selections: &work.selections,
                    count: work.count,
                    media_ids,
                    metadata: &work.metadata,
                })
                .map_err(|_| EncodeError::MissingMedia { index: 0 })?;
                Ok(EncodedPayload(bytes))
            }
            JobPayload::Approval(approval) => {
                let bytes = serde_json::to_vec(&WireApproval {
                    target_resource_id: &approval.target_resource_id,
                    work_id: &approval.work_id,
                    approved: approval.approved,
                    feedback: approval.feedback.as_deref(),
                    recipient_address: &approval.recipient_address,
                })
                .unwrap_or_default();
                Ok(EncodedPayload(bytes))
            }
        }
    }
}
