use serde::{Deserialize, Serialize};

/// An on-chain transaction identifier, once one exists. Distinct from the
/// synthetic `offline-` id a `Job` carries before submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a pre-flight simulation.
#[derive(Debug, Clone)]
pub enum SimulateOutcome {
    Ok,
    KnownContractError { reason: String },
    UnknownRevert,
}

/// Outcome of polling a submitted transaction's receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Reverted,
    Timeout,
}

/// An attestation as the indexer reports it, enough for the Guard and
/// Reconcile steps to match a job by its dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedAttestation {
    pub tx_id: TxId,
    pub resource_id: String,
    pub client_op_id: Option<String>,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}
