use std::rc::Rc;
use std::time::Duration;

use neighbourhood::concepts::frame::LinkFrame;
use neighbourhood::concepts::resolve::AddressResolver;
use neighbourhood::framework::{Clock, LivenessSystem};
use neighbourhood::table::{ManualClock, NeighbourTable};

struct StaticMesh {} // just a type to inform neighbourhood of your network parameters
impl LivenessSystem for StaticMesh {
    type NodeAddress = String; // our nodes have string names
    type LinkAddress = [u8; 6]; // flat MAC-style link addresses
    type Clock = ManualClock; // we drive time by hand for this demo
}

// a fixed resolution table standing in for a real interface's ARP cache
struct StaticArp(Vec<(String, [u8; 6])>);
impl AddressResolver<StaticMesh> for StaticArp {
    fn resolve(&self, addr: &String) -> Option<[u8; 6]> {
        self.0.iter().find(|(a, _)| a == addr).map(|(_, mac)| *mac)
    }
}

struct FailedFrame {
    dest: [u8; 6],
}
impl LinkFrame<StaticMesh> for FailedFrame {
    fn destination(&self) -> [u8; 6] {
        self.dest
    }
}

fn main() {
    // bob hears two peers over one radio: eve and alice

    let mut table = NeighbourTable::<StaticMesh>::new();
    table.set_lost_hook(|_, addr| println!("lost neighbour {addr}"));

    let arp: Rc<dyn AddressResolver<StaticMesh>> = Rc::new(StaticArp(vec![
        ("eve".to_string(), [2, 0, 0, 0, 0, 1]),
        ("alice".to_string(), [2, 0, 0, 0, 0, 2]),
    ]));
    table.add_resolver(&arp);

    let hold = Duration::from_secs(10);
    let now = table.clock.now();
    table.update("eve".to_string(), now + hold);
    table.update("alice".to_string(), now + hold * 2);

    for step in 0..4u32 {
        // a real node would sleep until table.purge_at; we jump the clock
        table.clock.advance(Duration::from_secs(8));
        table.tick();
        println!(
            "after {}s: eve neighbour? {} alice neighbour? {}",
            (step + 1) * 8,
            table.is_neighbour(&"eve".to_string()),
            table.is_neighbour(&"alice".to_string())
        );
    }

    // links can also break explicitly: a failed unicast frame reported by
    // the link layer takes the peer out immediately
    let now = table.clock.now();
    table.update("eve".to_string(), now + hold);
    table.process_tx_error(&FailedFrame {
        dest: [2, 0, 0, 0, 0, 1],
    });

    // OUTPUT:
    // after 8s: eve neighbour? true alice neighbour? true
    // lost neighbour eve
    // after 16s: eve neighbour? false alice neighbour? true
    // after 24s: eve neighbour? false alice neighbour? false
    // lost neighbour alice
    // after 32s: eve neighbour? false alice neighbour? false
    // lost neighbour eve
}
