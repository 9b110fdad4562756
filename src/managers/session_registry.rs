//! Session registration for Web Portals.
//!
//! Many portal views share one browsing session per partition, and views are
//! created and re-created as the sidebar changes. The registry makes sure the
//! per-session wiring (download hook, window-open policy) runs once per
//! session no matter how many views ask for it.

use std::collections::HashSet;

use tracing::debug;

use crate::types::session::SessionId;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    registered: HashSet<SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `attach` for `session` unless it already ran.
    ///
    /// Returns `true` when the hook was attached by this call. Registration
    /// happens on the event loop only, so the membership check and the insert
    /// cannot interleave with another registration.
    pub fn register<F>(&mut self, session: &SessionId, attach: F) -> bool
    where
        F: FnOnce(&SessionId),
    {
        if !self.registered.insert(session.clone()) {
            return false;
        }
        debug!(%session, "attaching session hooks");
        attach(session);
        true
    }

    pub fn is_registered(&self, session: &SessionId) -> bool {
        self.registered.contains(session)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}
