use super::draft::DraftEvent;
use crate::error::{BotResult, Error};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One guild's session slot. The slot mutex serializes every
/// read-modify-write sequence against that guild's draft; `None` means no
/// session is active.
pub type SessionSlot = Arc<Mutex<Option<DraftEvent>>>;

/// Process-wide table of guild ID to at most one active draft.
///
/// The outer lock only guards the table itself and is never held across
/// anything slower than a map lookup; each guild's slot has its own mutex,
/// so different guilds never contend.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: RwLock<HashMap<u64, SessionSlot>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the slot for a guild, creating an empty one if needed. Used by
    /// the protocol for compound acquire-validate-mutate sequences.
    pub async fn slot(&self, guild_id: u64) -> SessionSlot {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(&guild_id) {
                return Arc::clone(slot);
            }
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(guild_id).or_default())
    }

    /// Open a session for a guild. Fails with `AlreadyActive` if a draft
    /// already exists for it.
    pub async fn begin(&self, guild_id: u64, draft: DraftEvent) -> BotResult<()> {
        let slot = self.slot(guild_id).await;
        let mut guard = slot.lock().await;
        if guard.is_some() {
            return Err(Error::AlreadyActive);
        }
        *guard = Some(draft);
        Ok(())
    }

    /// Non-mutating snapshot of the guild's draft, if one is active. Never
    /// allocates a slot for a guild that has not opened a session.
    pub async fn get(&self, guild_id: u64) -> Option<DraftEvent> {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(&guild_id).map(Arc::clone)
        };
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => None,
        }
    }

    /// Idempotently discard any draft for the guild
    pub async fn end(&self, guild_id: u64) {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(&guild_id).map(Arc::clone)
        };
        if let Some(slot) = slot {
            let mut guard = slot.lock().await;
            *guard = None;
        }
    }

    /// Whether the guild currently has an active draft
    pub async fn has_active(&self, guild_id: u64) -> bool {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(&guild_id).map(Arc::clone)
        };
        match slot {
            Some(slot) => slot.lock().await.is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn draft(guild_id: u64) -> DraftEvent {
        let tz: Tz = "UTC".parse().unwrap();
        DraftEvent::new(guild_id, "cal".to_string(), tz)
    }

    #[tokio::test]
    async fn test_begin_get_end() {
        let registry = SessionRegistry::new();
        assert!(!registry.has_active(1).await);
        assert!(registry.get(1).await.is_none());

        registry.begin(1, draft(1)).await.unwrap();
        assert!(registry.has_active(1).await);
        assert_eq!(registry.get(1).await.unwrap().guild_id, 1);

        registry.end(1).await;
        assert!(!registry.has_active(1).await);
    }

    #[tokio::test]
    async fn test_begin_twice_fails() {
        let registry = SessionRegistry::new();
        registry.begin(1, draft(1)).await.unwrap();

        let err = registry.begin(1, draft(1)).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyActive));
        // The existing draft is untouched
        assert!(registry.has_active(1).await);
    }

    #[tokio::test]
    async fn test_end_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.end(1).await;
        registry.begin(1, draft(1)).await.unwrap();
        registry.end(1).await;
        registry.end(1).await;
        assert!(!registry.has_active(1).await);
    }

    #[tokio::test]
    async fn test_reads_do_not_allocate_slots() {
        let registry = SessionRegistry::new();
        assert!(registry.get(1).await.is_none());
        assert!(!registry.has_active(2).await);
        registry.end(3).await;
        assert!(registry.slots.read().await.is_empty());

        registry.begin(4, draft(4)).await.unwrap();
        assert_eq!(registry.slots.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_guilds_are_independent() {
        let registry = SessionRegistry::new();
        registry.begin(1, draft(1)).await.unwrap();
        registry.begin(2, draft(2)).await.unwrap();

        registry.end(1).await;
        assert!(!registry.has_active(1).await);
        assert!(registry.has_active(2).await);
    }
}
