use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use neighbourhood::concepts::frame::LinkFrame;
use neighbourhood::concepts::resolve::AddressResolver;
use neighbourhood::framework::{Clock, LivenessParams, LivenessSystem};
use neighbourhood::table::{ManualClock, NeighbourTable};

pub struct VirtualMesh;

impl LivenessSystem for VirtualMesh {
    type NodeAddress = String;
    type LinkAddress = u64;
    type Clock = ManualClock;
    fn config() -> LivenessParams {
        LivenessParams {
            purge_delay: Duration::from_secs(5),
        }
    }
}

/// A single node under test: its table plus a recording loss hook.
pub struct TestNode {
    pub table: NeighbourTable<VirtualMesh>,
    pub lost: Rc<RefCell<Vec<String>>>,
}

impl TestNode {
    pub fn create() -> Self {
        let lost = Rc::new(RefCell::new(Vec::new()));
        let sink = lost.clone();
        let mut table = NeighbourTable::new();
        table.set_lost_hook(move |_, addr: &String| sink.borrow_mut().push(addr.clone()));
        TestNode { table, lost }
    }

    /// Jump the clock forward and give the host event loop its turn.
    pub fn advance(&mut self, secs: u64) {
        self.table.clock.advance(Duration::from_secs(secs));
        self.table.tick();
    }

    pub fn in_secs(&self, secs: u64) -> Instant {
        self.table.clock.now() + Duration::from_secs(secs)
    }

    pub fn losses(&self) -> Vec<String> {
        self.lost.borrow().clone()
    }
}

/// Map-backed resolution table, owned by the test the way an interface
/// would own it.
pub struct StaticArp {
    map: RefCell<HashMap<String, u64>>,
}

impl StaticArp {
    pub fn create(entries: &[(&str, u64)]) -> Rc<Self> {
        Rc::new(Self {
            map: RefCell::new(
                entries
                    .iter()
                    .map(|(addr, link)| (addr.to_string(), *link))
                    .collect(),
            ),
        })
    }

    pub fn learn(&self, addr: &str, link: u64) {
        self.map.borrow_mut().insert(addr.to_string(), link);
    }

    pub fn handle(self: &Rc<Self>) -> Rc<dyn AddressResolver<VirtualMesh>> {
        self.clone()
    }
}

impl AddressResolver<VirtualMesh> for StaticArp {
    fn resolve(&self, addr: &String) -> Option<u64> {
        self.map.borrow().get(addr).copied()
    }
}

/// Failed unicast frame the way the link layer would hand it back.
pub struct FailedFrame {
    pub dest: u64,
}

impl LinkFrame<VirtualMesh> for FailedFrame {
    fn destination(&self) -> u64 {
        self.dest
    }
}
