use std::time::{Duration, Instant};

use educe::Educe;
use serde::{Deserialize, Serialize};

use crate::framework::LivenessSystem;

/// A directly reachable peer tracked by the table.
#[derive(Educe)]
#[educe(Clone(bound()))]
pub struct Neighbour<T: LivenessSystem + ?Sized> {
    /// the routing network address, unique within a table
    pub addr: T::NodeAddress,
    /// last link-layer mapping observed for this neighbour, None if unresolved
    pub link_addr: Option<T::LinkAddress>,
    /// the entry is dead once this instant has passed
    pub expires_at: Instant,
    /// queued for removal by an in-progress purge pass
    pub closing: bool,
}

impl<T: LivenessSystem + ?Sized> Neighbour<T> {
    pub fn new(
        addr: T::NodeAddress,
        link_addr: Option<T::LinkAddress>,
        expires_at: Instant,
    ) -> Self {
        Self {
            addr,
            link_addr,
            expires_at,
            closing: false,
        }
    }

    /// true iff the entry has fresh enough evidence at `now`
    pub fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Read-only view of a live entry, for control and diagnostic surfaces.
#[derive(Educe, Serialize, Deserialize)]
#[educe(Clone(bound()))]
#[serde(bound = "")]
pub struct NeighbourSnapshot<T: LivenessSystem + ?Sized> {
    pub addr: T::NodeAddress,
    pub link_addr: Option<T::LinkAddress>,
    /// time left until the entry goes stale
    pub expires_in: Duration,
}
