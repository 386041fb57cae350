use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;
use uuid::Uuid;

/// Hands out local preview URLs and tracks which ones are still live.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        debug!(%id, "preview created");
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        url.strip_prefix("blob:")
            .and_then(|id| Uuid::parse_str(id).ok())
            .map(|id| {
                self.live
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .contains(&id)
            })
            .unwrap_or(false)
    }

    fn revoke(&self, id: Uuid) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}

/// A live preview URL. Revoked when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> String {
        format!("blob:{}", self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        let revoked = self.registry.revoke(self.id);
        debug_assert!(revoked, "preview {} revoked twice", self.id);
        debug!(id = %self.id, "preview revoked");
    }
}
