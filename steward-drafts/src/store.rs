use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use steward_core::{ChainId, Clock, SystemClock, UserAddress};

use crate::error::{DraftError, DraftResult};
use crate::types::{DraftFields, DraftId, DraftImage, DraftImageId, DraftRecord};

/// Durable, per-user, per-resource draft persistence plus image blob
/// storage with stable ordering.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn create_or_get_draft(
        &self,
        user_address: UserAddress,
        chain_id: ChainId,
        target_resource_id: String,
        action_id: Option<i64>,
    ) -> DraftResult<DraftId>;

    async fn update_draft(&self, draft_id: &DraftId, fields: DraftFields) -> DraftResult<DraftRecord>;

    async fn set_images(&self, draft_id: &DraftId, blobs: Vec<(bytes::Bytes, String)>) -> DraftResult<Vec<DraftImage>>;

    async fn add_image(&self, draft_id: &DraftId, bytes: bytes::Bytes, content_type: String) -> DraftResult<DraftImage>;

    async fn remove_image(&self, image_id: &DraftImageId) -> DraftResult<()>;

    async fn get_draft(&self, draft_id: &DraftId) -> DraftResult<DraftRecord>;

    async fn get_drafts_for_user(&self, user_address: &UserAddress, chain_id: ChainId) -> DraftResult<Vec<DraftRecord>>;

    async fn get_images_for_draft(&self, draft_id: &DraftId) -> DraftResult<Vec<DraftImage>>;

    async fn delete_draft(&self, draft_id: &DraftId) -> DraftResult<()>;
}

pub type SharedDraftStore = Arc<dyn DraftStore>;

#[derive(Default)]
struct Shard {
    drafts: HashMap<DraftId, DraftRecord>,
    images: HashMap<DraftId, Vec<DraftImage>>,
    dedup: HashMap<(UserAddress, ChainId, String, i64), DraftId>,
}

/// In-process `DraftStore`. Every operation re-reads the shard under its
/// lock rather than trusting a cached copy, matching the "no in-memory
/// cache is authoritative" failure semantics.
pub struct InMemoryDraftStore<C: Clock = SystemClock> {
    shard: RwLock<Shard>,
    clock: C,
}

impl InMemoryDraftStore<SystemClock> {
    pub fn new() -> Self {
        Self {
            shard: RwLock::new(Shard::default()),
            clock: SystemClock,
        }
    }
}

impl Default for InMemoryDraftStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryDraftStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            shard: RwLock::new(Shard::default()),
            clock,
        }
    }
}

fn renormalize_positions(images: &mut [DraftImage]) {
    for (index, image) in images.iter_mut().enumerate() {
        image.position = index as u32;
    }
}

#[async_trait]
impl<C: Clock> DraftStore for InMemoryDraftStore<C> {
    async fn create_or_get_draft(
        &self,
        user_address: UserAddress,
        chain_id: ChainId,
        target_resource_id: String,
        action_id: Option<i64>,
    ) -> DraftResult<DraftId> {
        let now = self.clock.now();
        let key = (user_address.clone(), chain_id, target_resource_id.clone(), action_id.unwrap_or_default());
        let mut shard = self.shard.write();
        if let Some(existing) = shard.dedup.get(&key) {
            return Ok(existing.clone());
        }
        let id = DraftId::new();
        let record = DraftRecord::new(id.clone(), user_address, chain_id, target_resource_id, action_id, now);
        shard.dedup.insert(key, id.clone());
        shard.drafts.insert(id.clone(), record);
        shard.images.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn update_draft(&self, draft_id: &DraftId, fields: DraftFields) -> DraftResult<DraftRecord> {
        let now = self.clock.now();
        let mut shard = self.shard.write();
        let image_count = shard.images.get(draft_id).map(|images| images.len()).unwrap_or(0);

        let current = shard
            .drafts
            .get(draft_id)
            .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;
        let old_key = current.dedup_key();
        let prospective_resource_id = fields.target_resource_id.clone().unwrap_or_else(|| current.target_resource_id.clone());
        let prospective_action_id = fields.action_id.or(current.action_id).unwrap_or_default();
        let new_key = (current.user_address.clone(), current.chain_id, prospective_resource_id.clone(), prospective_action_id);

        if new_key != old_key {
            if let Some(existing) = shard.dedup.get(&new_key) {
                if existing != draft_id {
                    return Err(DraftError::DuplicateTarget(prospective_resource_id));
                }
            }
        }

        let record = shard
            .drafts
            .get_mut(draft_id)
            .expect("presence already checked above");
        record.apply(fields, now);
        record.recompute_cursor(image_count);
        let result = record.clone();

        if new_key != old_key {
            shard.dedup.remove(&old_key);
            shard.dedup.insert(new_key, draft_id.clone());
        }

        Ok(result)
    }

    async fn set_images(&self, draft_id: &DraftId, blobs: Vec<(bytes::Bytes, String)>) -> DraftResult<Vec<DraftImage>> {
        let now = self.clock.now();
        let mut shard = self.shard.write();
        if !shard.drafts.contains_key(draft_id) {
            return Err(DraftError::NotFound(draft_id.to_string()));
        }
        let mut images: Vec<DraftImage> = blobs
            .into_iter()
            .enumerate()
            .map(|(position, (bytes, content_type))| DraftImage::new(draft_id.clone(), position as u32, bytes, content_type))
            .collect();
        renormalize_positions(&mut images);
        let count = images.len();
        shard.images.insert(draft_id.clone(), images.clone());
        if let Some(record) = shard.drafts.get_mut(draft_id) {
            record.updated_at = now;
            record.recompute_cursor(count);
        }
        Ok(images)
    }

    async fn add_image(&self, draft_id: &DraftId, bytes: bytes::Bytes, content_type: String) -> DraftResult<DraftImage> {
        let now = self.clock.now();
        let mut shard = self.shard.write();
        if !shard.drafts.contains_key(draft_id) {
            return Err(DraftError::NotFound(draft_id.to_string()));
        }
        let images = shard.images.entry(draft_id.clone()).or_default();
        let image = DraftImage::new(draft_id.clone(), images.len() as u32, bytes, content_type);
        images.push(image.clone());
        renormalize_positions(images);
        let count = images.len();
        if let Some(record) = shard.drafts.get_mut(draft_id) {
            record.updated_at = now;
            record.recompute_cursor(count);
        }
        Ok(image)
    }

    async fn remove_image(&self, image_id: &DraftImageId) -> DraftResult<()> {
        let now = self.clock.now();
        let mut shard = self.shard.write();
        let owner = shard
            .images
            .iter()
            .find(|(_, images)| images.iter().any(|image| &image.id == image_id))
            .map(|(draft_id, _)| draft_id.clone())
            .ok_or_else(|| DraftError::ImageNotFound(image_id.to_string()))?;

        let images = shard.images.get_mut(&owner).expect("owner located above");
        images.retain(|image| &image.id != image_id);
        renormalize_positions(images);
        let count = images.len();
        if let Some(record) = shard.drafts.get_mut(&owner) {
            record.updated_at = now;
            record.recompute_cursor(count);
        }
        Ok(())
    }

    async fn get_draft(&self, draft_id: &DraftId) -> DraftResult<DraftRecord> {
        self.shard
            .read()
            .drafts
            .get(draft_id)
            .cloned()
            .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))
    }

    async fn get_drafts_for_user(&self, user_address: &UserAddress, chain_id: ChainId) -> DraftResult<Vec<DraftRecord>> {
        let shard = self.shard.read();
        let mut drafts: Vec<DraftRecord> = shard
            .drafts
            .values()
            .filter(|record| &record.user_address == user_address && record.chain_id == chain_id)
            .cloned()
            .collect();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(drafts)
    }

    async fn get_images_for_draft(&self, draft_id: &DraftId) -> DraftResult<Vec<DraftImage>> {
        if !self.shard.read().drafts.contains_key(draft_id) {
            return Err(DraftError::NotFound(draft_id.to_string()));
        }
        let mut images = self.shard.read().images.get(draft_id).cloned().unwrap_or_default();
        images.sort_by_key(|image| image.position);
        Ok(images)
    }

    async fn delete_draft(&self, draft_id: &DraftId) -> DraftResult<()> {
        let mut shard = self.shard.write();
        let record = shard
            .drafts
            .remove(draft_id)
            .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;
        shard.images.remove(draft_id);
        shard.dedup.remove(&record.dedup_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    /// A fixed clock for deterministic ordering assertions, local to these
    /// tests (steward-core's own `FixedClock` is `#[cfg(test)]`-private to
    /// that crate and not reachable from here).
    #[derive(Clone)]
    struct FixedClock(Arc<RwLock<DateTime<Utc>>>);

    impl FixedClock {
        fn new(start: DateTime<Utc>) -> Self {
            Self(Arc::new(RwLock::new(start)))
        }

        fn advance(&self, delta: chrono::Duration) {
            *self.0.write() += delta;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.read()
        }
    }

    fn store() -> InMemoryDraftStore<FixedClock> {
        InMemoryDraftStore::with_clock(FixedClock::new(Utc::now()))
    }

    #[tokio::test]
    async fn create_or_get_draft_is_idempotent_on_tuple() {
        let store = store();
        let user = UserAddress::new("0xuser");
        let first = store
            .create_or_get_draft(user.clone(), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        let second = store
            .create_or_get_draft(user, ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_draft_rejects_unknown_id() {
        let store = store();
        let err = store.update_draft(&DraftId::new(), DraftFields::default()).await;
        assert!(matches!(err, Err(DraftError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_draft_rekeys_dedup_index_when_target_changes() {
        let store = store();
        let user = UserAddress::new("0xuser");
        let draft_id = store
            .create_or_get_draft(user.clone(), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();

        store
            .update_draft(
                &draft_id,
                DraftFields {
                    target_resource_id: Some("garden-2".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // The old tuple is free again: create_or_get_draft for it makes a
        // fresh draft rather than finding the one that moved on.
        let reopened = store
            .create_or_get_draft(user.clone(), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        assert_ne!(reopened, draft_id);

        // The new tuple now resolves to the updated draft.
        let same = store
            .create_or_get_draft(user, ChainId(10), "garden-2".into(), Some(7))
            .await
            .unwrap();
        assert_eq!(same, draft_id);
    }

    #[tokio::test]
    async fn update_draft_rejects_retarget_onto_an_existing_tuple() {
        let store = store();
        let user = UserAddress::new("0xuser");
        let first = store
            .create_or_get_draft(user.clone(), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        let second = store
            .create_or_get_draft(user, ChainId(10), "garden-2".into(), Some(7))
            .await
            .unwrap();

        let err = store
            .update_draft(
                &second,
                DraftFields {
                    target_resource_id: Some("garden-1".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(DraftError::DuplicateTarget(_))));

        // The rejected draft is untouched: it still resolves under its own tuple.
        let unchanged = store.get_draft(&first).await.unwrap();
        assert_eq!(unchanged.target_resource_id, "garden-1");
    }

    #[tokio::test]
    async fn cursor_recomputes_after_first_image_added() {
        let store = store();
        let draft_id = store
            .create_or_get_draft(UserAddress::new("0xuser"), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        let before = store.get_draft(&draft_id).await.unwrap();
        assert_eq!(before.first_incomplete_step, crate::types::DraftStep::Media);

        store
            .add_image(&draft_id, bytes::Bytes::from_static(b"jpeg-bytes"), "image/jpeg".into())
            .await
            .unwrap();
        let after = store.get_draft(&draft_id).await.unwrap();
        assert_eq!(after.first_incomplete_step, crate::types::DraftStep::Details);
    }

    #[tokio::test]
    async fn remove_image_renormalizes_positions() {
        let store = store();
        let draft_id = store
            .create_or_get_draft(UserAddress::new("0xuser"), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        let first = store
            .add_image(&draft_id, bytes::Bytes::from_static(b"a"), "image/jpeg".into())
            .await
            .unwrap();
        store
            .add_image(&draft_id, bytes::Bytes::from_static(b"b"), "image/jpeg".into())
            .await
            .unwrap();
        store.remove_image(&first.id).await.unwrap();

        let images = store.get_images_for_draft(&draft_id).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].position, 0);
    }

    #[tokio::test]
    async fn set_images_replaces_atomically() {
        let store = store();
        let draft_id = store
            .create_or_get_draft(UserAddress::new("0xuser"), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        store
            .add_image(&draft_id, bytes::Bytes::from_static(b"a"), "image/jpeg".into())
            .await
            .unwrap();

        let replaced = store
            .set_images(
                &draft_id,
                vec![
                    (bytes::Bytes::from_static(b"x"), "image/png".into()),
                    (bytes::Bytes::from_static(b"y"), "image/png".into()),
                ],
            )
            .await
            .unwrap();

        assert_eq!(replaced.len(), 2);
        let stored = store.get_images_for_draft(&draft_id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].position, 1);
    }

    #[tokio::test]
    async fn get_drafts_for_user_orders_by_updated_at_desc() {
        let store = store();
        let user = UserAddress::new("0xuser");
        let older = store
            .create_or_get_draft(user.clone(), ChainId(10), "garden-1".into(), Some(1))
            .await
            .unwrap();
        store.clock.advance(chrono::Duration::seconds(1));
        let newer = store
            .create_or_get_draft(user.clone(), ChainId(10), "garden-2".into(), Some(2))
            .await
            .unwrap();
        store.clock.advance(chrono::Duration::seconds(1));
        store
            .update_draft(
                &newer,
                DraftFields {
                    feedback: Some("growing well".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let drafts = store.get_drafts_for_user(&user, ChainId(10)).await.unwrap();
        assert_eq!(drafts[0].id, newer);
        assert_eq!(drafts[1].id, older);
    }

    #[tokio::test]
    async fn delete_draft_cascades_to_images_and_dedup_index() {
        let store = store();
        let user = UserAddress::new("0xuser");
        let draft_id = store
            .create_or_get_draft(user.clone(), ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        store
            .add_image(&draft_id, bytes::Bytes::from_static(b"a"), "image/jpeg".into())
            .await
            .unwrap();

        store.delete_draft(&draft_id).await.unwrap();

        assert!(matches!(store.get_draft(&draft_id).await, Err(DraftError::NotFound(_))));
        let reborn = store
            .create_or_get_draft(user, ChainId(10), "garden-1".into(), Some(7))
            .await
            .unwrap();
        assert_ne!(reborn, draft_id);
    }

    #[tokio::test]
    async fn delete_draft_on_missing_id_fails_not_found() {
        let store = store();
        assert!(matches!(store.delete_draft(&DraftId::new()).await, Err(DraftError::NotFound(_))));
    }
}
