//! Value-changed observers.
//!
//! Observers are for presentation only. Propagation itself never goes
//! through this list: driven inputs are updated directly by the engine.

use std::collections::HashMap;
use std::fmt;

use crate::endpoint::{Endpoint, OutputId};
use crate::signal::Signal;

/// Notification delivered to watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueChange {
    pub endpoint: Endpoint,
    pub value: Signal,
}

/// Boxed watcher callback.
pub type Watcher = Box<dyn FnMut(&ValueChange)>;

/// Per-endpoint observer lists.
#[derive(Default)]
pub(crate) struct Watchers {
    persistent: HashMap<Endpoint, Vec<Watcher>>,
    once: HashMap<OutputId, Vec<Watcher>>,
}

impl Watchers {
    pub(crate) fn add(&mut self, endpoint: Endpoint, watcher: Watcher) {
        self.persistent.entry(endpoint).or_default().push(watcher);
    }

    pub(crate) fn add_once(&mut self, output: OutputId, watcher: Watcher) {
        self.once.entry(output).or_default().push(watcher);
    }

    /// Deliver `change` to every watcher of its endpoint. One-shot
    /// watchers of an output are consumed.
    pub(crate) fn fire(&mut self, change: ValueChange) {
        if let Some(list) = self.persistent.get_mut(&change.endpoint) {
            for watcher in list.iter_mut() {
                watcher(&change);
            }
        }
        if let Endpoint::Output(output) = change.endpoint {
            if let Some(list) = self.once.remove(&output) {
                for mut watcher in list {
                    watcher(&change);
                }
            }
        }
    }

    /// Drop every watcher of a released endpoint.
    pub(crate) fn forget(&mut self, endpoint: Endpoint) {
        self.persistent.remove(&endpoint);
        if let Endpoint::Output(output) = endpoint {
            self.once.remove(&output);
        }
    }

    pub(crate) fn count(&self, endpoint: Endpoint) -> usize {
        let persistent = self.persistent.get(&endpoint).map_or(0, Vec::len);
        let once = match endpoint {
            Endpoint::Output(output) => self.once.get(&output).map_or(0, Vec::len),
            Endpoint::Input(_) => 0,
        };
        persistent + once
    }
}

impl fmt::Debug for Watchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watchers")
            .field("persistent", &self.persistent.len())
            .field("once", &self.once.len())
            .finish()
    }
}
