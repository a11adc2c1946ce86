use std::time::Duration;

use steward_core::CoreConfigSnapshot;

/// Tunables for the full-jitter exponential backoff curve: `base *
/// factor^(attempts - 1)`, capped.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base: Duration,
    pub factor: u32,
    pub cap: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            factor: 2,
            cap: Duration::from_secs(60),
        }
    }
}

impl BackoffConfig {
    /// Reads `backoff.base_ms`/`backoff.factor`/`backoff.cap_ms`, falling
    /// back to the default curve for any key that is absent or unparseable.
    pub fn from_snapshot(snapshot: &CoreConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            base: snapshot
                .get_u64("backoff.base_ms")
                .map(Duration::from_millis)
                .unwrap_or(defaults.base),
            factor: snapshot
                .get_u64("backoff.factor")
                .map(|v| v as u32)
                .unwrap_or(defaults.factor),
            cap: snapshot
                .get_u64("backoff.cap_ms")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cap),
        }
    }
}

/// Exponential backoff with full jitter: `base * factor^(attempts - 1)`,
/// capped, then a uniform random draw between zero and that cap. `attempts`
/// is the number of prior attempts, so the first retry (`attempts == 1`)
/// draws from `[0, base]`.
pub fn backoff(attempts: u32, config: &BackoffConfig) -> Duration {
    let exponent = attempts.saturating_sub(1).min(31);
    let scaled = config
        .base
        .as_millis()
        .saturating_mul(u128::from(config.factor).saturating_pow(exponent));
    let capped = scaled.min(config.cap.as_millis());
    let jittered = rand::random::<f64>() * capped as f64;
    Duration::from_millis(jittered.round() as u64)
}
