//! Structure of a digital circuit: components, the wires between them and reusable chips.
mod chip;
#[allow(clippy::module_inception)]
mod circuit;
mod component;
mod gate;
mod handles;
mod wire;

pub use chip::{ChipError, ChipLibrary};
pub use circuit::Circuit;
pub use component::{Chip, ChipInstance, Component, Placement, Rotation};
pub(crate) use component::Outputs;
pub use gate::{ComponentKind, GateType, MAX_INPUTS};
pub use handles::*;
pub use wire::{Destination, Wire};
