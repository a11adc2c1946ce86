//! Core identity types: who a submission belongs to, and which chain and
//! signer mode it targets. Every durable record (`DraftRecord`, `Job`) is
//! keyed by `(UserAddress, ChainId, ...)`; every worker loop is scoped to a
//! single `UserAddress` (the single-writer-per-user invariant).

use std::fmt;

/// The wallet/account address a submission is attributed to. Opaque string
/// wrapper so callers can't accidentally compare it to a `ChainId` or a
/// `JobId` — the three are distinct newtypes even though all are strings
/// on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserAddress(pub String);

impl UserAddress {
    pub fn new<S: Into<String>>(address: S) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// EVM-style chain identifier. A draft and a job are scoped by chain as
/// well as user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which submission path the auth layer has made available for this user:
/// a directly-signed wallet transaction, or a sponsored smart-account
/// transaction relayed through a bundler. The JobRunner
/// picks its Submitter implementation from this, carried on `UserContext`
/// rather than on the job itself, because it reflects whichever signer the
/// QueueController currently has — not a property of the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Direct,
    Sponsored,
}

/// Context threaded through DraftStore/JobStore/QueueController calls:
/// who is acting, on which chain, and (when a signer is present) which
/// submission path applies. `auth_mode` is `None` when unauthenticated —
/// jobs can still be enqueued, they simply cannot be claimed until a
/// signer becomes available.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_address: UserAddress,
    pub chain_id: ChainId,
    pub auth_mode: Option<AuthMode>,
}

impl UserContext {
    pub fn new(user_address: impl Into<UserAddress>, chain_id: ChainId) -> Self {
        Self {
            user_address: user_address.into(),
            chain_id,
            auth_mode: None,
        }
    }

    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = Some(mode);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_mode.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_address_display_roundtrip() {
        let addr = UserAddress::new("0xABC");
        assert_eq!(addr.to_string(), "0xABC");
        assert_eq!(addr.as_str(), "0xABC");
    }

    #[test]
    fn unauthenticated_context_has_no_auth_mode() {
        let ctx = UserContext::new("0xABC", ChainId(10));
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn authenticated_context_carries_mode() {
        let ctx = UserContext::new("0xABC", ChainId(10)).with_auth_mode(AuthMode::Sponsored);
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.auth_mode, Some(AuthMode::Sponsored));
    }
}
