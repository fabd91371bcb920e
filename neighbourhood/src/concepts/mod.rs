pub mod frame;
pub mod neighbour;
pub mod resolve;
