mod event_queue;
mod slab;
pub use event_queue::EventQueue;
pub use slab::{Slab, SlabIndex};
