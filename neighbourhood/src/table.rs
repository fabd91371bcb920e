use std::cell::Cell;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde_json::json;

use crate::concepts::frame::LinkFrame;
use crate::concepts::neighbour::{Neighbour, NeighbourSnapshot};
use crate::concepts::resolve::{AddressResolver, ResolverSet};
use crate::feedback::LivenessWarning;
use crate::framework::{Clock, LivenessSystem};

/// Liveness table for the peers a node can reach directly.
///
/// The table is I/O free: it never sleeps and owns no real timer. It keeps
/// the deadline of the next purge sweep in `purge_at`, and the host event
/// loop drives it by calling [`NeighbourTable::tick`] (or by sleeping until
/// the deadline and calling it then). Everything else happens synchronously
/// inside the calls of the routing engine and the link layer.
pub struct NeighbourTable<T: LivenessSystem + ?Sized> {
    pub entries: HashMap<T::NodeAddress, Neighbour<T>>,
    pub resolvers: ResolverSet<T>,
    /// deadline of the pending purge sweep, None while unarmed
    pub purge_at: Option<Instant>,
    pub clock: T::Clock,
    purge_delay: Duration,
    /// loss notification of the routing engine; receives the table itself so
    /// it may call back in, the lost entry is already gone when it runs
    on_lost: Option<Box<dyn FnMut(&mut NeighbourTable<T>, &T::NodeAddress)>>,
    /// losses awaiting delivery, drained by the outermost notification pass
    pending_lost: VecDeque<T::NodeAddress>,
    notifying: bool,
}

impl<T: LivenessSystem> NeighbourTable<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            resolvers: ResolverSet::default(),
            purge_at: None,
            clock: Default::default(),
            purge_delay: T::config().purge_delay,
            on_lost: None,
            pending_lost: VecDeque::new(),
            notifying: false,
        }
    }

    // region Routing engine surface

    /// Record fresh evidence of `addr`: create the entry, or extend the
    /// existing one's expiry to `expire_at`. The stored expiry never moves
    /// backwards. The link-layer mapping is refreshed opportunistically from
    /// the registered resolution tables.
    pub fn update(&mut self, addr: T::NodeAddress, expire_at: Instant) {
        if expire_at <= self.clock.now() {
            warn!(
                "update for neighbour {}: {}",
                json!(&addr),
                LivenessWarning::StaleExpiry
            );
        }
        let resolved = self.resolvers.lookup(&addr);
        match self.entries.entry(addr) {
            Entry::Occupied(mut e) => {
                let nb = e.get_mut();
                if nb.closing {
                    // queued for removal by the purge pass in progress, the
                    // loss stands and only a later update may recreate it
                    return;
                }
                nb.expires_at = nb.expires_at.max(expire_at);
                if resolved.is_some() {
                    nb.link_addr = resolved;
                }
            }
            Entry::Vacant(e) => {
                debug!("tracking new neighbour {}", json!(e.key()));
                let addr = e.key().clone();
                e.insert(Neighbour::new(addr, resolved, expire_at));
            }
        }
        self.schedule_timer();
    }

    /// True iff `addr` is tracked and its entry is still live. A present but
    /// expired entry is already dead, whether or not the sweep has run.
    pub fn is_neighbour(&self, addr: &T::NodeAddress) -> bool {
        let now = self.clock.now();
        self.entries.get(addr).map_or(false, |nb| nb.is_live(now))
    }

    /// Absolute expiry of a live entry, None for unknown or stale neighbours.
    pub fn expire_time(&self, addr: &T::NodeAddress) -> Option<Instant> {
        let now = self.clock.now();
        self.entries
            .get(addr)
            .filter(|nb| nb.is_live(now))
            .map(|nb| nb.expires_at)
    }

    /// Drop all entries without raising loss notifications: a protocol
    /// reset is not a failure. The purge deadline and the resolver set are
    /// left as they are.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Install the loss notification, replacing any previous hook.
    pub fn set_lost_hook(
        &mut self,
        hook: impl FnMut(&mut NeighbourTable<T>, &T::NodeAddress) + 'static,
    ) {
        self.on_lost = Some(Box::new(hook));
    }

    /// Live entries as serializable snapshots.
    pub fn snapshot(&self) -> Vec<NeighbourSnapshot<T>> {
        let now = self.clock.now();
        self.entries
            .values()
            .filter(|nb| nb.is_live(now))
            .map(|nb| NeighbourSnapshot {
                addr: nb.addr.clone(),
                link_addr: nb.link_addr.clone(),
                expires_in: nb.expires_at - now,
            })
            .collect()
    }

    // endregion

    // region Purge timer

    /// Arm the purge timer if it is not already pending. Never resets a
    /// pending countdown.
    pub fn schedule_timer(&mut self) {
        if self.purge_at.is_none() {
            self.purge_at = Some(self.clock.now() + self.purge_delay);
        }
    }

    /// Drive the purge timer. Hosts call this from their event loop; a sweep
    /// runs only once the armed deadline has passed.
    pub fn tick(&mut self) {
        if let Some(at) = self.purge_at {
            if at <= self.clock.now() {
                self.purge();
            }
        }
    }

    /// Sweep the table: drop every entry whose expiry has passed and report
    /// each loss exactly once. Entries are marked as closing first and
    /// deleted as a batch; the hooks run only after the marked set is gone,
    /// so a reentrant call never observes a half-removed entry.
    pub fn purge(&mut self) {
        let now = self.clock.now();
        self.purge_at = None;
        for nb in self.entries.values_mut() {
            if !nb.is_live(now) {
                nb.closing = true;
            }
        }
        let mut lost = Vec::new();
        self.entries.retain(|addr, nb| {
            if nb.closing {
                lost.push(addr.clone());
                false
            } else {
                true
            }
        });
        if !self.entries.is_empty() {
            self.purge_at = Some(now + self.purge_delay);
        }
        for addr in &lost {
            info!("neighbour {} timed out", json!(addr));
        }
        self.notify_lost(lost);
    }

    // endregion

    // region Link layer surface

    /// Register an address-resolution table of a freshly up interface.
    pub fn add_resolver(&mut self, handle: &Rc<dyn AddressResolver<T>>) {
        self.resolvers.add(handle);
    }

    /// Stop consulting the given resolution table (its interface went down).
    pub fn del_resolver(&mut self, handle: &Rc<dyn AddressResolver<T>>) {
        self.resolvers.del(handle);
    }

    /// First link-layer mapping for `addr` across the registered resolution
    /// tables, in registration order. Pure query, nothing is cached here.
    pub fn lookup_link_address(&self, addr: &T::NodeAddress) -> Option<T::LinkAddress> {
        self.resolvers.lookup(addr)
    }

    /// The link layer failed to deliver a unicast frame. Map its destination
    /// back to a tracked neighbour and drop that entry, reporting the loss
    /// once. Destinations matching no tracked neighbour are expected
    /// (broadcast, former neighbours) and ignored, and stale entries other
    /// than the failed one are left for the sweep.
    pub fn process_tx_error(&mut self, frame: &impl LinkFrame<T>) {
        let dest = frame.destination();
        let mut failed = None;
        for (addr, nb) in &self.entries {
            let mapped = self.resolvers.lookup(addr).or_else(|| nb.link_addr.clone());
            if mapped.as_ref() == Some(&dest) {
                failed = Some(addr.clone());
                break;
            }
        }
        if let Some(addr) = failed {
            self.entries.remove(&addr);
            info!("neighbour {} unreachable, frame delivery failed", json!(&addr));
            self.notify_lost(vec![addr]);
        }
    }

    // endregion

    /// Deliver queued loss notifications. Losses triggered from within a
    /// hook are enqueued only; the outermost pass delivers them, keeping
    /// every notification exactly-once without nesting.
    fn notify_lost(&mut self, lost: Vec<T::NodeAddress>) {
        self.pending_lost.extend(lost);
        if self.notifying || self.pending_lost.is_empty() {
            return;
        }
        let mut hook = match self.on_lost.take() {
            Some(hook) => hook,
            None => {
                self.pending_lost.clear();
                return;
            }
        };
        self.notifying = true;
        while let Some(addr) = self.pending_lost.pop_front() {
            hook(self, &addr);
        }
        self.notifying = false;
        if self.on_lost.is_none() {
            self.on_lost = Some(hook);
        }
    }
}

impl<T: LivenessSystem> Default for NeighbourTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Manually driven clock for tests and simulations.
pub struct ManualClock {
    now: Cell<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }
}

impl ManualClock {
    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
