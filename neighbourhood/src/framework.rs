use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait LivenessSystem {
    /// Address of the node on the routing network, MUST be unique per node
    type NodeAddress: Ord + PartialOrd + NodeData + NodeKey;
    /// Address of a node on the physical link, may be shared between interfaces
    type LinkAddress: NodeKey + NodeData;
    /// Time source driving expiry decisions
    type Clock: Clock;
    fn config() -> LivenessParams {
        Default::default()
    }
}

pub trait NodeData: Clone + Serialize + DeserializeOwned + Sized {}
pub trait NodeKey: Eq + PartialEq + Hash {}
impl<T: Eq + PartialEq + Hash> NodeKey for T {}
impl<T: Clone + Serialize + DeserializeOwned + Sized> NodeData for T {}

/// Time source consulted whenever liveness is decided. Implementations must
/// never move backwards.
pub trait Clock: Default {
    fn now(&self) -> Instant;
}

/// Wall clock, the default for live nodes.
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub struct LivenessParams {
    /// delay between purge sweeps of the neighbour table
    pub purge_delay: Duration,
}
impl Default for LivenessParams {
    fn default() -> Self {
        Self {
            purge_delay: Duration::from_secs(15),
        }
    }
}
