use crate::circuit::{CircuitId, OutputPin};
use bitvec::prelude::*;
use num_integer::Integer;

/// Ring buffer recording the signal of one output pin once per simulated tick,
/// the data behind a timing diagram.
///
/// Monitors are attached with [Workbench::monitor](super::Workbench::monitor).
///
/// # Example
/// ```
/// # use logik::circuit::Circuit;
/// # use logik::sim::Workbench;
/// let mut c = Circuit::new();
/// let clk = c.clock(2, "clk");
/// c.output_probe(clk.output(0), "led");
/// let mut bench = Workbench::new(c);
/// let m = bench.monitor("clk", clk.output(0), 8);
///
/// bench.run(8);
/// let history: Vec<bool> = bench.monitors()[m].history().collect();
/// assert_eq!(history, vec![false, true, true, false, false, true, true, false]);
/// // Negative offsets count back from the newest sample.
/// assert_eq!(bench.monitors()[m].state_at(-1), false);
/// assert_eq!(bench.monitors()[m].state_at(-2), true);
/// ```
#[derive(Debug, Clone)]
pub struct SignalMonitor {
    name: String,
    circuit: CircuitId,
    pin: OutputPin,
    history: BitVec,
    head: usize,
}

impl SignalMonitor {
    /// Returns a monitor for `pin` of `circuit` keeping the last `capacity` samples, all false.
    pub fn new<S: Into<String>>(name: S, circuit: CircuitId, pin: OutputPin, capacity: usize) -> Self {
        Self {
            name: name.into(),
            circuit,
            pin,
            history: bitvec![0; capacity.max(1)],
            head: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn circuit(&self) -> CircuitId {
        self.circuit
    }

    pub fn pin(&self) -> OutputPin {
        self.pin
    }

    pub(crate) fn retarget(&mut self, circuit: CircuitId) {
        self.circuit = circuit;
    }

    /// Returns the number of samples kept.
    pub fn capacity(&self) -> usize {
        self.history.len()
    }

    /// Stores `value` at the write head and moves the head forward, overwriting the oldest sample.
    pub fn record(&mut self, value: bool) {
        self.history.set(self.head, value);
        self.head = (self.head + 1) % self.history.len();
    }

    /// Returns the sample at `offset` from the write head, wrapping around.
    ///
    /// Offset 0 is the oldest sample and -1 the newest one.
    pub fn state_at(&self, offset: isize) -> bool {
        let index = (self.head as isize + offset).mod_floor(&(self.history.len() as isize));
        self.history[index as usize]
    }

    /// Returns every sample from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = bool> + '_ {
        let (newer, older) = self.history.split_at(self.head);
        older.iter().chain(newer.iter()).map(|b| *b)
    }
}
