use crate::framework::LivenessSystem;

/// Header of a link-layer frame that failed to transmit. Only the unicast
/// destination is consulted here; everything else stays with the link layer.
pub trait LinkFrame<T: LivenessSystem + ?Sized> {
    /// destination link address of the failed frame
    fn destination(&self) -> T::LinkAddress;
}
