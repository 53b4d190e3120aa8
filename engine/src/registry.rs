//! Endpoint-keyed sharing of adapter instances
//!
//! Hosts that configure several planners against the same solver endpoint can
//! go through a pool instead of each constructing their own adapter (and each
//! spawning their own solver). Sharing is explicit: the `Arc` strong count is
//! the reference count, and entries whose adapters have been dropped are
//! pruned on the next acquire.

use crate::config::AriesConfig;
use crate::error::Result;
use crate::net::Endpoint;
use crate::solver::Aries;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

#[derive(Default)]
pub struct PlannerPool {
    entries: Mutex<HashMap<Endpoint, Weak<Aries>>>,
}

impl PlannerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the live adapter for the configured endpoint, constructing one
    /// if none exists. Configs asking for an ephemeral port (0) always get a
    /// fresh adapter, since their endpoint is not known until construction.
    pub fn acquire(&self, config: AriesConfig) -> Result<Arc<Aries>> {
        let key = Endpoint::new(config.host.clone(), config.port);
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.retain(|_, adapter| adapter.strong_count() > 0);

        if config.port != 0 {
            if let Some(existing) = entries.get(&key).and_then(Weak::upgrade) {
                debug!(endpoint = %key, "reusing pooled planner instance");
                return Ok(existing);
            }
        }

        let adapter = Arc::new(Aries::new(config)?);
        entries.insert(adapter.endpoint().clone(), Arc::downgrade(&adapter));
        Ok(adapter)
    }

    /// Number of live pooled adapters.
    pub fn len(&self) -> usize {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .values()
            .filter(|adapter| adapter.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
