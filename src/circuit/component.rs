use super::circuit::Circuit;
use super::gate::{ComponentKind, GateType, MAX_INPUTS};
use super::handles::{CircuitId, ComponentId};
use super::wire::Wire;
use crate::sim::DEFAULT_CLOCK_INTERVAL;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use smallvec::{smallvec, SmallVec};

/// New output values computed by an update, one per output pin.
pub(crate) type Outputs = SmallVec<[bool; 2]>;

/// Quarter turns, rendering only.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum Rotation {
    Deg0 = 0,
    Deg90,
    Deg180,
    Deg270,
}
// Not derived, `#[default]` makes TryFromPrimitive accept any value.
impl Default for Rotation {
    fn default() -> Self {
        Rotation::Deg0
    }
}

impl Rotation {
    /// Returns the rotation a quarter turn clockwise from `self`.
    pub fn rotated(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }
}

/// Where a component sits on the canvas. The simulation never looks at it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FlipFlop {
    q: bool,
    last_clock: bool,
}
impl FlipFlop {
    /// Records the clock level, returns true on a rising edge.
    fn clock_edge(&mut self, clock: bool) -> bool {
        let rising = clock && !self.last_clock;
        self.last_clock = clock;
        rising
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ClockState {
    state: bool,
    interval: u64,
    armed: bool,
}

/// Reference from a custom component to its chip template and, once placed in a
/// [Workbench](crate::sim::Workbench), to its private inner circuit.
#[derive(Debug, Clone)]
pub struct Chip {
    name: String,
    instance: Option<ChipInstance>,
}
impl Chip {
    /// Name of the template in the [ChipLibrary](super::ChipLibrary).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the live inner circuit, [None] while the component isn't placed in a workbench.
    pub fn instance(&self) -> Option<&ChipInstance> {
        self.instance.as_ref()
    }
}

/// A live inner circuit and the switches and probes standing in for the external pins.
#[derive(Debug, Clone)]
pub struct ChipInstance {
    pub circuit: CircuitId,
    /// External input `i` drives switch `inputs[i]`.
    pub inputs: Vec<ComponentId>,
    /// External output `i` mirrors probe `outputs[i]`.
    pub outputs: Vec<ComponentId>,
}

/// Closed set of component behaviors together with their stored state.
#[derive(Debug, Clone)]
pub(crate) enum Logic {
    Gate(GateType),
    Switch { state: bool },
    OutputProbe { state: bool },
    SevenSegment { segments: u8 },
    HexDisplay { value: u8 },
    Clock(ClockState),
    DFlipFlop(FlipFlop),
    JkFlipFlop(FlipFlop),
    TFlipFlop(FlipFlop),
    Custom(Chip),
}

impl Logic {
    /// Same behavior and static configuration, state back to power-on.
    fn fresh(&self) -> Logic {
        match self {
            Logic::Gate(gate) => Logic::Gate(*gate),
            Logic::Switch { .. } => Logic::Switch { state: false },
            Logic::OutputProbe { .. } => Logic::OutputProbe { state: false },
            Logic::SevenSegment { .. } => Logic::SevenSegment { segments: 0 },
            Logic::HexDisplay { .. } => Logic::HexDisplay { value: 0 },
            Logic::Clock(clock) => Logic::Clock(ClockState {
                state: false,
                interval: clock.interval,
                armed: false,
            }),
            Logic::DFlipFlop(_) => Logic::DFlipFlop(Default::default()),
            Logic::JkFlipFlop(_) => Logic::JkFlipFlop(Default::default()),
            Logic::TFlipFlop(_) => Logic::TFlipFlop(Default::default()),
            Logic::Custom(chip) => Logic::Custom(Chip {
                name: chip.name.clone(),
                instance: None,
            }),
        }
    }
}

/// A node of a [Circuit]: an input vector, output pins each owning at most one [Wire],
/// and the update function of its [ComponentKind].
///
/// Components are created by the per-kind constructors below or stamped from an existing
/// one with [Component::make_copy].
///
/// # Example
/// ```
/// # use logik::circuit::{Component, ComponentKind, GateType};
/// let and = Component::gate_with_inputs(GateType::And, 3);
/// assert_eq!(and.kind(), ComponentKind::And);
/// assert_eq!(and.input_count(), 3);
/// assert_eq!(and.output_count(), 1);
///
/// let ff = Component::d_flip_flop();
/// assert_eq!(ff.output_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    logic: Logic,
    inputs: SmallVec<[bool; 4]>,
    outputs: SmallVec<[Option<Wire>; 2]>,
    delay: Option<u64>,
    pub placement: Placement,
}

impl Component {
    fn with_logic<S: Into<String>>(name: S, logic: Logic, inputs: usize, outputs: usize) -> Self {
        Self {
            name: name.into(),
            logic,
            inputs: smallvec![false; inputs],
            outputs: (0..outputs).map(|_| None).collect(),
            delay: None,
            placement: Default::default(),
        }
    }

    /// Returns a new gate with its default number of inputs.
    pub fn gate(gate: GateType) -> Self {
        Self::gate_with_inputs(gate, gate.default_inputs())
    }

    /// Returns a new gate with `inputs` inputs clamped to `1..=MAX_INPUTS`,
    /// Not and Buffer always get one.
    pub fn gate_with_inputs(gate: GateType, inputs: usize) -> Self {
        let inputs = if gate.is_variadic() {
            inputs.clamp(1, MAX_INPUTS)
        } else {
            1
        };
        Self::with_logic(gate.kind().default_name(), Logic::Gate(gate), inputs, 1)
    }

    /// Returns a new switch, an input source set with [Workbench::toggle](crate::sim::Workbench::toggle).
    pub fn switch() -> Self {
        Self::with_logic("SW", Logic::Switch { state: false }, 0, 1)
    }

    /// Returns a new output probe, a single input sink.
    pub fn output_probe() -> Self {
        Self::with_logic("OUT", Logic::OutputProbe { state: false }, 1, 0)
    }

    /// Returns a new seven segment display: inputs a to g then the decimal point.
    pub fn seven_segment() -> Self {
        Self::with_logic("7Seg", Logic::SevenSegment { segments: 0 }, 8, 0)
    }

    /// Returns a new hexadecimal display fed by 4 inputs, least significant first.
    pub fn hex_display() -> Self {
        Self::with_logic("Hex", Logic::HexDisplay { value: 0 }, 4, 0)
    }

    /// Returns a new clock flipping its output every `interval` ticks.
    pub fn clock(interval: u64) -> Self {
        let clock = ClockState {
            state: false,
            interval: interval.max(1),
            armed: false,
        };
        Self::with_logic("CLK", Logic::Clock(clock), 0, 1)
    }

    /// Returns a new D flip-flop. Inputs: D, CLK. Outputs: Q, !Q.
    pub fn d_flip_flop() -> Self {
        Self::with_logic("D-FF", Logic::DFlipFlop(Default::default()), 2, 2)
    }

    /// Returns a new JK flip-flop. Inputs: J, K, CLK. Outputs: Q, !Q.
    pub fn jk_flip_flop() -> Self {
        Self::with_logic("JK-FF", Logic::JkFlipFlop(Default::default()), 3, 2)
    }

    /// Returns a new T flip-flop. Inputs: T, CLK. Outputs: Q, !Q.
    pub fn t_flip_flop() -> Self {
        Self::with_logic("T-FF", Logic::TFlipFlop(Default::default()), 2, 2)
    }

    /// Returns a new custom component for chip `name` whose pins mirror the switches and
    /// output probes of `template`.
    ///
    /// The component stays unbound until it is added to a [Workbench](crate::sim::Workbench),
    /// which gives it its own copy of the chip's circuit.
    pub fn custom<S: Into<String>>(name: S, template: &Circuit) -> Self {
        let name = name.into();
        let chip = Chip {
            name: name.clone(),
            instance: None,
        };
        Self::with_logic(
            name,
            Logic::Custom(chip),
            template.switches().count(),
            template.output_probes().count(),
        )
    }

    /// Factory for every kind that needs no extra configuration.
    ///
    /// Returns [None] for [ComponentKind::Custom], see [Component::custom].
    pub fn from_kind(kind: ComponentKind) -> Option<Self> {
        if let Some(gate) = kind.gate_type() {
            return Some(Self::gate(gate));
        }
        Some(match kind {
            ComponentKind::Switch => Self::switch(),
            ComponentKind::OutputProbe => Self::output_probe(),
            ComponentKind::SevenSegment => Self::seven_segment(),
            ComponentKind::HexDisplay => Self::hex_display(),
            ComponentKind::Clock => Self::clock(DEFAULT_CLOCK_INTERVAL),
            ComponentKind::DFlipFlop => Self::d_flip_flop(),
            ComponentKind::JkFlipFlop => Self::jk_flip_flop(),
            ComponentKind::TFlipFlop => Self::t_flip_flop(),
            _ => return None,
        })
    }

    /// Returns a new component of the same kind and static configuration
    /// (arity, delay override, clock interval, chip) with no wiring, power-on state
    /// and a default name.
    pub fn make_copy(&self) -> Component {
        let logic = self.logic.fresh();
        let name = match &logic {
            Logic::Custom(chip) => chip.name.clone(),
            _ => self.kind().default_name().to_string(),
        };
        Component {
            name,
            logic,
            inputs: smallvec![false; self.inputs.len()],
            outputs: (0..self.outputs.len()).map(|_| None).collect(),
            delay: self.delay,
            placement: Default::default(),
        }
    }

    /// Returns the stable kind tag.
    pub fn kind(&self) -> ComponentKind {
        match &self.logic {
            Logic::Gate(gate) => gate.kind(),
            Logic::Switch { .. } => ComponentKind::Switch,
            Logic::OutputProbe { .. } => ComponentKind::OutputProbe,
            Logic::SevenSegment { .. } => ComponentKind::SevenSegment,
            Logic::HexDisplay { .. } => ComponentKind::HexDisplay,
            Logic::Clock(_) => ComponentKind::Clock,
            Logic::DFlipFlop(_) => ComponentKind::DFlipFlop,
            Logic::JkFlipFlop(_) => ComponentKind::JkFlipFlop,
            Logic::TFlipFlop(_) => ComponentKind::TFlipFlop,
            Logic::Custom(_) => ComponentKind::Custom,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Per-instance propagation delay, [None] means the global default.
    pub fn delay(&self) -> Option<u64> {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Option<u64>) {
        self.delay = delay;
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Returns the stored value of input `index`, false if it doesn't exist.
    pub fn input(&self, index: usize) -> bool {
        self.inputs.get(index).copied().unwrap_or(false)
    }

    pub fn inputs(&self) -> &[bool] {
        &self.inputs
    }

    /// Returns true if input `index` can be stored, growing variadic gates on demand.
    pub fn accepts_input(&self, index: usize) -> bool {
        index < self.inputs.len() || (self.is_variadic() && index < MAX_INPUTS)
    }

    fn is_variadic(&self) -> bool {
        matches!(&self.logic, Logic::Gate(gate) if gate.is_variadic())
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Returns the wire on output `index`, if any.
    pub fn output_wire(&self, index: usize) -> Option<&Wire> {
        self.outputs.get(index)?.as_ref()
    }

    /// Returns every wired output as `(output index, wire)`.
    pub fn output_wires(&self) -> impl Iterator<Item = (usize, &Wire)> {
        self.outputs
            .iter()
            .enumerate()
            .filter_map(|(i, w)| Some((i, w.as_ref()?)))
    }

    pub(crate) fn output_wire_mut(&mut self, index: usize) -> Option<&mut Wire> {
        self.outputs.get_mut(index)?.as_mut()
    }

    pub(crate) fn output_wires_mut(&mut self) -> impl Iterator<Item = (usize, &mut Wire)> {
        self.outputs
            .iter_mut()
            .enumerate()
            .filter_map(|(i, w)| Some((i, w.as_mut()?)))
    }

    /// Returns the wire on output `index`, creating it if the pin is unwired.
    pub(crate) fn wire_or_insert(&mut self, index: usize) -> Option<&mut Wire> {
        Some(self.outputs.get_mut(index)?.get_or_insert_with(Wire::new))
    }

    /// Returns the observable state of the component:
    /// the switch, probe or clock level, Q for flip-flops, the current result for gates,
    /// whether anything is lit for displays. Custom components report false.
    pub fn state(&self) -> bool {
        match &self.logic {
            Logic::Gate(gate) => gate.evaluate(&self.inputs),
            Logic::Switch { state } | Logic::OutputProbe { state } => *state,
            Logic::SevenSegment { segments } => *segments != 0,
            Logic::HexDisplay { value } => *value != 0,
            Logic::Clock(clock) => clock.state,
            Logic::DFlipFlop(ff) | Logic::JkFlipFlop(ff) | Logic::TFlipFlop(ff) => ff.q,
            Logic::Custom(_) => false,
        }
    }

    /// Returns the lit segment mask of a seven segment display or the digit of a hex display.
    pub fn display_value(&self) -> Option<u8> {
        match &self.logic {
            Logic::SevenSegment { segments } => Some(*segments),
            Logic::HexDisplay { value } => Some(*value),
            _ => None,
        }
    }

    /// Returns the chip reference of a custom component.
    pub fn chip(&self) -> Option<&Chip> {
        match &self.logic {
            Logic::Custom(chip) => Some(chip),
            _ => None,
        }
    }

    /// Returns the half period of a clock.
    pub fn clock_interval(&self) -> Option<u64> {
        match &self.logic {
            Logic::Clock(clock) => Some(clock.interval),
            _ => None,
        }
    }

    /// Sets the half period of a clock, returns false for other kinds.
    pub fn set_clock_interval(&mut self, interval: u64) -> bool {
        match &mut self.logic {
            Logic::Clock(clock) => {
                clock.interval = interval.max(1);
                true
            }
            _ => false,
        }
    }

    /// Stores `value` at `index`, returns true if the stored value changed.
    pub(crate) fn store_input(&mut self, index: usize, value: bool) -> bool {
        if index >= self.inputs.len() {
            if !self.accepts_input(index) {
                return false;
            }
            self.inputs.resize(index + 1, false);
        }
        let changed = self.inputs[index] != value;
        self.inputs[index] = value;
        changed
    }

    /// Sets the level of a switch, returns true if it changed.
    pub(crate) fn set_switch(&mut self, value: bool) -> Option<bool> {
        match &mut self.logic {
            Logic::Switch { state } => {
                let changed = *state != value;
                *state = value;
                Some(changed)
            }
            _ => None,
        }
    }

    /// Runs the update function of every kind but [ComponentKind::Custom]:
    /// updates stored state from the inputs and returns the new value of each output pin.
    pub(crate) fn evaluate(&mut self) -> Outputs {
        let inputs = &self.inputs;
        let input = |i: usize| inputs.get(i).copied().unwrap_or(false);
        match &mut self.logic {
            Logic::Gate(gate) => smallvec![gate.evaluate(inputs)],
            Logic::Switch { state } => smallvec![*state],
            Logic::Clock(clock) => smallvec![clock.state],
            Logic::OutputProbe { state } => {
                *state = input(0);
                smallvec![]
            }
            Logic::SevenSegment { segments } => {
                *segments = pack(inputs, 8);
                smallvec![]
            }
            Logic::HexDisplay { value } => {
                *value = pack(inputs, 4);
                smallvec![]
            }
            Logic::DFlipFlop(ff) => {
                if ff.clock_edge(input(1)) {
                    ff.q = input(0);
                }
                smallvec![ff.q, !ff.q]
            }
            Logic::JkFlipFlop(ff) => {
                if ff.clock_edge(input(2)) {
                    ff.q = match (input(0), input(1)) {
                        (true, false) => true,
                        (false, true) => false,
                        (true, true) => !ff.q,
                        (false, false) => ff.q,
                    };
                }
                smallvec![ff.q, !ff.q]
            }
            Logic::TFlipFlop(ff) => {
                if ff.clock_edge(input(1)) && input(0) {
                    ff.q = !ff.q;
                }
                smallvec![ff.q, !ff.q]
            }
            Logic::Custom(_) => unreachable!("custom components are bridged by the workbench"),
        }
    }

    /// Marks a clock as running and returns its interval, [None] if it isn't a clock
    /// or is already armed.
    pub(crate) fn arm_clock(&mut self) -> Option<u64> {
        match &mut self.logic {
            Logic::Clock(clock) if !clock.armed => {
                clock.armed = true;
                Some(clock.interval)
            }
            _ => None,
        }
    }

    pub(crate) fn disarm_clock(&mut self) {
        if let Logic::Clock(clock) = &mut self.logic {
            clock.armed = false;
        }
    }

    /// Flips an armed clock and returns its interval, [None] if it isn't an armed clock.
    pub(crate) fn clock_edge(&mut self) -> Option<u64> {
        match &mut self.logic {
            Logic::Clock(clock) if clock.armed => {
                clock.state = !clock.state;
                Some(clock.interval)
            }
            _ => None,
        }
    }

    pub(crate) fn bind_chip(&mut self, instance: ChipInstance) {
        if let Logic::Custom(chip) = &mut self.logic {
            chip.instance = Some(instance);
        }
    }

    pub(crate) fn take_chip_instance(&mut self) -> Option<ChipInstance> {
        match &mut self.logic {
            Logic::Custom(chip) => chip.instance.take(),
            _ => None,
        }
    }

    pub(crate) fn clear_inputs(&mut self) {
        for input in &mut self.inputs {
            *input = false;
        }
    }

    /// Puts the component back to power-on state, keeping its wiring and configuration.
    /// Chip bindings are dropped.
    pub(crate) fn reset_state(&mut self) {
        self.logic = self.logic.fresh();
        self.clear_inputs();
        for (_, wire) in self.output_wires_mut() {
            wire.reset();
        }
    }
}

/// Packs the first `bits` inputs into a number, input 0 being the least significant bit.
fn pack(inputs: &[bool], bits: usize) -> u8 {
    inputs
        .iter()
        .take(bits)
        .enumerate()
        .fold(0, |acc, (i, b)| if *b { acc | 1 << i } else { acc })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(c: &mut Component, index: usize, value: bool) -> Outputs {
        c.store_input(index, value);
        c.evaluate()
    }

    #[test]
    fn test_store_input_is_change_only() {
        let mut and = Component::gate(GateType::And);
        assert!(!and.store_input(0, false));
        assert!(and.store_input(0, true));
        assert!(!and.store_input(0, true));
        assert_eq!(and.input(0), true);
    }

    #[test]
    fn test_variadic_gates_grow() {
        let mut or = Component::gate(GateType::Or);
        assert!(or.accepts_input(5));
        assert!(or.store_input(5, true));
        assert_eq!(or.input_count(), 6);
        assert_eq!(or.evaluate().as_slice(), &[true]);

        let mut not = Component::gate(GateType::Not);
        assert!(!not.accepts_input(1));
        assert!(!not.store_input(1, true));
        assert_eq!(not.input_count(), 1);

        let mut probe = Component::output_probe();
        assert!(!probe.store_input(3, true));
    }

    #[test]
    fn test_variadic_growth_is_capped() {
        let mut and = Component::gate(GateType::And);
        assert!(and.accepts_input(MAX_INPUTS - 1));
        assert!(!and.accepts_input(MAX_INPUTS));
        assert!(!and.accepts_input(usize::MAX));
        assert!(!and.store_input(usize::MAX, true));
        assert!(!and.store_input(4_000_000_000, true));
        assert_eq!(and.input_count(), 2);

        let wide = Component::gate_with_inputs(GateType::Xor, 1 << 20);
        assert_eq!(wide.input_count(), MAX_INPUTS);
    }

    #[test]
    fn test_d_flip_flop_latches_on_rising_edge() {
        let mut ff = Component::d_flip_flop();
        assert_eq!(set(&mut ff, 0, true).as_slice(), &[false, true]);
        assert_eq!(set(&mut ff, 1, true).as_slice(), &[true, false]);
        // Data changes while the clock is high are ignored.
        assert_eq!(set(&mut ff, 0, false).as_slice(), &[true, false]);
        assert_eq!(set(&mut ff, 1, false).as_slice(), &[true, false]);
        assert_eq!(set(&mut ff, 1, true).as_slice(), &[false, true]);
    }

    #[test]
    fn test_jk_flip_flop() {
        let mut ff = Component::jk_flip_flop();
        let mut pulse = |ff: &mut Component| {
            set(ff, 2, true);
            set(ff, 2, false);
            ff.state()
        };
        set(&mut ff, 0, true);
        assert!(pulse(&mut ff));
        set(&mut ff, 0, false);
        assert!(pulse(&mut ff));
        set(&mut ff, 1, true);
        assert!(!pulse(&mut ff));
        set(&mut ff, 0, true);
        assert!(pulse(&mut ff));
        assert!(!pulse(&mut ff));
    }

    #[test]
    fn test_t_flip_flop_toggles() {
        let mut ff = Component::t_flip_flop();
        for i in 0..6 {
            set(&mut ff, 0, i >= 2);
            set(&mut ff, 1, true);
            set(&mut ff, 1, false);
            // Toggles only once T is high, starting at the third pulse.
            let expected = i >= 2 && (i - 2) % 2 == 0;
            assert_eq!(ff.state(), expected, "pulse {}", i);
        }
    }

    #[test]
    fn test_displays() {
        let mut hex = Component::hex_display();
        set(&mut hex, 0, true);
        set(&mut hex, 3, true);
        assert_eq!(hex.display_value(), Some(9));

        let mut seg = Component::seven_segment();
        set(&mut seg, 7, true);
        assert_eq!(seg.display_value(), Some(0x80));
        assert!(seg.state());
    }

    #[test]
    fn test_make_copy_shares_no_state() {
        let mut original = Component::gate_with_inputs(GateType::Xor, 4);
        original.set_name("parity");
        original.set_delay(Some(7));
        original.store_input(2, true);
        original.wire_or_insert(0).unwrap();

        let copy = original.make_copy();
        assert_eq!(copy.kind(), ComponentKind::Xor);
        assert_eq!(copy.name(), "XOR");
        assert_eq!(copy.input_count(), 4);
        assert_eq!(copy.delay(), Some(7));
        assert!(copy.inputs().iter().all(|b| !b));
        assert!(copy.output_wire(0).is_none());

        let mut clock = Component::clock(13);
        clock.arm_clock();
        clock.clock_edge();
        let copy = clock.make_copy();
        assert_eq!(copy.clock_interval(), Some(13));
        assert!(!copy.state());
    }

    #[test]
    fn test_from_kind_covers_every_kind_but_custom() {
        use strum::IntoEnumIterator;
        for kind in ComponentKind::iter() {
            match Component::from_kind(kind) {
                Some(c) => assert_eq!(c.kind(), kind),
                None => assert_eq!(kind, ComponentKind::Custom),
            }
        }
    }

    #[test]
    fn test_clock_arming() {
        let mut clock = Component::clock(4);
        assert_eq!(clock.clock_edge(), None);
        assert_eq!(clock.arm_clock(), Some(4));
        assert_eq!(clock.arm_clock(), None);
        assert_eq!(clock.clock_edge(), Some(4));
        assert!(clock.state());
        clock.disarm_clock();
        assert_eq!(clock.clock_edge(), None);
    }

    #[test]
    fn test_rotation() {
        let mut r = Rotation::default();
        for _ in 0..4 {
            r = r.rotated();
        }
        assert_eq!(r, Rotation::Deg0);
        assert_eq!(Rotation::try_from(2u8), Ok(Rotation::Deg180));
        assert!(Rotation::try_from(4u8).is_err());
        assert!(Rotation::try_from(9u8).is_err());
        assert!(Rotation::try_from(u8::MAX).is_err());
    }
}
