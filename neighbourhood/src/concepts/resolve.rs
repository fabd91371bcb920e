use std::rc::{Rc, Weak};

use log::warn;

use crate::feedback::LivenessWarning;
use crate::framework::LivenessSystem;

/// An externally owned address-resolution table, one per active interface.
/// The interface layer keeps it current; the liveness table only queries it.
pub trait AddressResolver<T: LivenessSystem + ?Sized> {
    /// link address currently mapped to `addr`, if any
    fn resolve(&self, addr: &T::NodeAddress) -> Option<T::LinkAddress>;
}

/// Registration-ordered set of borrowed resolver handles.
///
/// Handles are held weakly: their owner is the interface layer, and a table
/// torn down behind our back must never dangle, only stop matching.
pub struct ResolverSet<T: LivenessSystem + ?Sized> {
    handles: Vec<Weak<dyn AddressResolver<T>>>,
}

impl<T: LivenessSystem + ?Sized> Default for ResolverSet<T> {
    fn default() -> Self {
        Self {
            handles: Vec::new(),
        }
    }
}

impl<T: LivenessSystem + ?Sized> ResolverSet<T> {
    /// Register a handle. Re-registering the same table is a no-op.
    pub fn add(&mut self, handle: &Rc<dyn AddressResolver<T>>) {
        let handle = Rc::downgrade(handle);
        if !self.handles.iter().any(|h| h.ptr_eq(&handle)) {
            self.handles.push(handle);
        }
    }

    /// Deregister a handle (its interface went down). Unknown handles are
    /// ignored.
    pub fn del(&mut self, handle: &Rc<dyn AddressResolver<T>>) {
        let handle = Rc::downgrade(handle);
        self.handles.retain(|h| !h.ptr_eq(&handle));
    }

    /// First mapping for `addr` across live handles, in registration order.
    pub fn lookup(&self, addr: &T::NodeAddress) -> Option<T::LinkAddress> {
        for handle in &self.handles {
            match handle.upgrade() {
                Some(table) => {
                    if let Some(link) = table.resolve(addr) {
                        return Some(link);
                    }
                }
                None => warn!("{}", LivenessWarning::DeadResolver),
            }
        }
        None
    }
}
