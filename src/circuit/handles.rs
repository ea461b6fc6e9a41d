use crate::data_structures::SlabIndex;
use std::fmt::{self, Display, Formatter};

/// Identifies a component inside one [Circuit](super::Circuit).
///
/// Ids are handed out in construction order and never reused by the same circuit,
/// a clone of a circuit keeps the ids of the original.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    /// Returns the raw id.
    pub fn index(&self) -> usize {
        self.0
    }

    /// Returns the input pin `index` of this component.
    pub fn input(self, index: usize) -> InputPin {
        InputPin::new(self, index)
    }

    /// Returns the output pin `index` of this component.
    pub fn output(self, index: usize) -> OutputPin {
        OutputPin::new(self, index)
    }
}
impl Display for ComponentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a live circuit inside a [Workbench](crate::sim::Workbench).
///
/// Backed by a generational index, a handle to a discarded chip instance never resolves again.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct CircuitId(pub(crate) SlabIndex);

impl Display for CircuitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "circuit:{}", self.0)
    }
}

/// An input pin: (component, input index).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct InputPin {
    pub component: ComponentId,
    pub index: usize,
}
impl InputPin {
    pub fn new(component: ComponentId, index: usize) -> Self {
        Self { component, index }
    }
}

/// An output pin: (component, output index).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct OutputPin {
    pub component: ComponentId,
    pub index: usize,
}
impl OutputPin {
    pub fn new(component: ComponentId, index: usize) -> Self {
        Self { component, index }
    }
}

impl Display for InputPin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:in{}", self.component, self.index)
    }
}
impl Display for OutputPin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:out{}", self.component, self.index)
    }
}

/// A component anywhere in a [Workbench](crate::sim::Workbench), including inside chip instances.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct ComponentRef {
    pub circuit: CircuitId,
    pub component: ComponentId,
}
impl ComponentRef {
    pub fn new(circuit: CircuitId, component: ComponentId) -> Self {
        Self { circuit, component }
    }
}
impl Display for ComponentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.circuit, self.component)
    }
}
