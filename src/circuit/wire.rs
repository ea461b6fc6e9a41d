use super::handles::InputPin;
use smallvec::SmallVec;

/// One end of a [Wire]: the input pin it drives plus the routing points used to draw it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Destination {
    pub pin: InputPin,
    /// Rendering only, passed through untouched.
    pub waypoints: Vec<(i32, i32)>,
}

/// Signal carrier owned by exactly one output pin, fanning out to any number of input pins.
///
/// A wire is never sourceless: it lives inside the output slot of the component driving it,
/// so removing that component removes the wire. A wire whose destinations have all been
/// disconnected stays attached to its pin with an empty fan-out.
#[derive(Debug, Clone, Default)]
pub struct Wire {
    signal: bool,
    destinations: SmallVec<[Destination; 2]>,
}

impl Wire {
    /// Returns a new wire carrying false with no destinations.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the signal currently carried.
    pub fn signal(&self) -> bool {
        self.signal
    }

    /// Stores `value`, returns true if it differs from the previous signal.
    ///
    /// Forwarding the change to the destinations is the caller's job since it may
    /// schedule work, see [Workbench](crate::sim::Workbench).
    pub(crate) fn set_signal(&mut self, value: bool) -> bool {
        let changed = self.signal != value;
        self.signal = value;
        changed
    }

    /// Returns all destinations in connection order.
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Returns an iterator over the driven input pins.
    pub fn pins(&self) -> impl Iterator<Item = InputPin> + '_ {
        self.destinations.iter().map(|d| d.pin)
    }

    /// Returns true if the wire drives nothing.
    pub fn is_orphaned(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Returns true if `pin` is one of the destinations.
    fn drives(&self, pin: InputPin) -> bool {
        self.destinations.iter().any(|d| d.pin == pin)
    }

    /// Appends `pin` to the destinations, returns false if it was already there.
    pub(crate) fn add_destination(&mut self, pin: InputPin) -> bool {
        if self.drives(pin) {
            return false;
        }
        self.destinations.push(Destination {
            pin,
            waypoints: Vec::new(),
        });
        true
    }

    /// Removes `pin` from the destinations, returns false if it wasn't there.
    pub(crate) fn remove_destination(&mut self, pin: InputPin) -> bool {
        let before = self.destinations.len();
        self.destinations.retain(|d| d.pin != pin);
        before != self.destinations.len()
    }

    /// Keeps only the destinations for which `f` returns true.
    pub(crate) fn retain_destinations<F: FnMut(&Destination) -> bool>(&mut self, mut f: F) {
        self.destinations.retain(|d| f(d))
    }

    /// Returns the routing points of the connection to `pin`.
    pub fn waypoints_mut(&mut self, pin: InputPin) -> Option<&mut Vec<(i32, i32)>> {
        self.destinations
            .iter_mut()
            .find(|d| d.pin == pin)
            .map(|d| &mut d.waypoints)
    }

    /// Forgets the carried signal, used when a circuit becomes a chip template.
    pub(crate) fn reset(&mut self) {
        self.signal = false;
    }
}
