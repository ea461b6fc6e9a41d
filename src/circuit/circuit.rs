use super::component::Component;
use super::gate::{ComponentKind, GateType, GateType::*};
use super::handles::*;
use super::wire::Wire;
use casey::pascal;
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;
use unwrap::unwrap;

/// Creates a constructor for every gate type, fed by a slice of output pins.
macro_rules! gate_constructors {
    ($($name:ident),*) => {
        $(
            #[doc = concat!(
                "Adds a new `", stringify!($name), "` gate named `name` and returns its [ComponentId].\n\n",
                "Output pin `sources[i]` is connected to input `i`, the gate gets at least its default number of inputs."
            )]
            pub fn $name<S: Into<String>>(&mut self, sources: &[OutputPin], name: S) -> ComponentId {
                self.gate(pascal!($name), sources, name)
            }
        )*
    };
}

/// Owning collection of [Components](Component) and the [Wires](Wire) between them.
///
/// A circuit is purely structural, it never propagates signals by itself:
/// connection edits only touch wiring and stored inputs.
/// Simulating a circuit is the job of a [Workbench](crate::sim::Workbench).
///
/// Invariants kept by every operation:
/// - each input pin is driven by at most one wire,
/// - no component drives its own input directly,
/// - no wire references a removed component.
///
/// # Example
/// ```
/// # use logik::circuit::Circuit;
/// let mut c = Circuit::new();
/// let a = c.switch("a");
/// let b = c.switch("b");
/// let and = c.and(&[a.output(0), b.output(0)], "and");
/// let out = c.output_probe(and.output(0), "out");
///
/// assert_eq!(c.len(), 4);
/// assert_eq!(c.driver_of(out.input(0)), Some(and.output(0)));
/// // An input can only be driven once.
/// assert!(!c.add_connection(a, 0, and, 1));
/// // No component may drive itself.
/// assert!(!c.add_connection(and, 0, and, 2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    components: IndexMap<ComponentId, Component>,
    drivers: HashMap<InputPin, OutputPin>,
    next_id: usize,
}

impl Circuit {
    /// Returns an empty [Circuit].
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers `component` and returns its new id.
    ///
    /// Wires the component already carries are adopted. Destinations that don't exist,
    /// can't take the input or are already driven are dropped.
    pub fn add_component(&mut self, mut component: Component) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;

        let mut adopted = Vec::new();
        for (output, wire) in component.output_wires_mut() {
            let components = &self.components;
            let drivers = &mut self.drivers;
            wire.retain_destinations(|d| {
                let valid = d.pin.component != id
                    && !drivers.contains_key(&d.pin)
                    && components
                        .get(&d.pin.component)
                        .map_or(false, |c| c.accepts_input(d.pin.index));
                if valid {
                    drivers.insert(d.pin, id.output(output));
                    adopted.push(d.pin);
                } else {
                    warn!("dropping dangling destination {} of new component {}", d.pin, id);
                }
                valid
            });
        }
        for pin in adopted {
            if let Some(dest) = self.components.get_mut(&pin.component) {
                if pin.index >= dest.input_count() {
                    dest.store_input(pin.index, false);
                }
            }
        }

        debug!("added {} {} {:?}", component.kind(), id, component.name());
        self.components.insert(id, component);
        id
    }

    /// Removes the component `id` and every connection from or to it, returns the removed component.
    ///
    /// The inputs it used to drive are stored as false. Its own wires come back with the
    /// component so the caller can tell which pins were affected.
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Component> {
        let component = self.components.shift_remove(&id)?;

        for (_, wire) in component.output_wires() {
            for pin in wire.pins() {
                self.drivers.remove(&pin);
                if let Some(dest) = self.components.get_mut(&pin.component) {
                    dest.store_input(pin.index, false);
                }
            }
        }

        let incoming: Vec<InputPin> = self
            .drivers
            .keys()
            .filter(|pin| pin.component == id)
            .copied()
            .collect();
        for pin in incoming {
            let source = unwrap!(self.drivers.remove(&pin), "driver of {} vanished", pin);
            if let Some(wire) = self
                .components
                .get_mut(&source.component)
                .and_then(|c| c.output_wire_mut(source.index))
            {
                wire.remove_destination(pin);
            }
        }

        debug!("removed {} {}", component.kind(), id);
        Some(component)
    }

    /// Connects output `output` of `source` to input `input` of `dest`, reusing the wire
    /// already on that output if there is one.
    ///
    /// Returns false and changes nothing if `source == dest`, if either component doesn't
    /// exist, if the pins don't exist or if the destination input is already driven.
    /// Gates with a variable number of inputs grow to fit `input`.
    pub fn add_connection(
        &mut self,
        source: ComponentId,
        output: usize,
        dest: ComponentId,
        input: usize,
    ) -> bool {
        let pin = dest.input(input);
        if source == dest || self.drivers.contains_key(&pin) {
            return false;
        }
        match (self.components.get(&source), self.components.get(&dest)) {
            (Some(s), Some(d)) if output < s.output_count() && d.accepts_input(input) => {}
            _ => return false,
        }

        let dest_component = unwrap!(self.components.get_mut(&dest), "{} vanished", dest);
        if input >= dest_component.input_count() {
            dest_component.store_input(input, false);
        }
        let source_component = unwrap!(self.components.get_mut(&source), "{} vanished", source);
        let wire = unwrap!(
            source_component.wire_or_insert(output),
            "{} has no output {}",
            source,
            output
        );
        wire.add_destination(pin);
        self.drivers.insert(pin, source.output(output));
        debug!("connected {} -> {}", source.output(output), pin);
        true
    }

    /// Disconnects input `input` of `dest` from its driver and stores false in it.
    ///
    /// Returns false if the input wasn't driven. The source wire stays on its pin even when
    /// this was its last destination.
    pub fn remove_connection(&mut self, dest: ComponentId, input: usize) -> bool {
        let pin = dest.input(input);
        let source = match self.drivers.remove(&pin) {
            Some(source) => source,
            None => return false,
        };
        if let Some(dest) = self.components.get_mut(&dest) {
            dest.store_input(input, false);
        }
        if let Some(wire) = self
            .components
            .get_mut(&source.component)
            .and_then(|c| c.output_wire_mut(source.index))
        {
            wire.remove_destination(pin);
        }
        debug!("disconnected {} -> {}", source, pin);
        true
    }

    gate_constructors!(and, or, nand, nor, xor, not, buffer);

    /// Adds a new gate of type `gate` fed by `sources`, see [Circuit::and].
    pub fn gate<S: Into<String>>(
        &mut self,
        gate: GateType,
        sources: &[OutputPin],
        name: S,
    ) -> ComponentId {
        let mut component = Component::gate_with_inputs(gate, sources.len().max(gate.default_inputs()));
        component.set_name(name);
        let id = self.add_component(component);
        for (input, source) in sources.iter().enumerate() {
            if !self.add_connection(source.component, source.index, id, input) {
                warn!("couldn't connect {} to {}", source, id.input(input));
            }
        }
        id
    }

    /// Adds a new switch named `name`.
    pub fn switch<S: Into<String>>(&mut self, name: S) -> ComponentId {
        self.add_named(Component::switch(), name)
    }

    /// Adds a new output probe named `name` watching `source`.
    pub fn output_probe<S: Into<String>>(&mut self, source: OutputPin, name: S) -> ComponentId {
        let id = self.add_named(Component::output_probe(), name);
        if !self.add_connection(source.component, source.index, id, 0) {
            warn!("couldn't connect {} to {}", source, id.input(0));
        }
        id
    }

    /// Adds a new clock named `name` flipping every `interval` ticks.
    pub fn clock<S: Into<String>>(&mut self, interval: u64, name: S) -> ComponentId {
        self.add_named(Component::clock(interval), name)
    }

    /// Adds `component` renamed to `name`.
    pub fn add_named<S: Into<String>>(&mut self, mut component: Component, name: S) -> ComponentId {
        component.set_name(name);
        self.add_component(component)
    }

    /// Returns the component `id`.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Returns the component `id` mutably, for renaming, moving or changing its delay.
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    /// Returns true if the component `id` exists.
    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Returns every component in construction order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components.iter().map(|(id, c)| (*id, c))
    }

    pub(crate) fn components_mut(&mut self) -> impl Iterator<Item = (ComponentId, &mut Component)> {
        self.components.iter_mut().map(|(id, c)| (*id, c))
    }

    /// Returns the ids of every component in construction order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.keys().copied()
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if there are no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the first component named `name`.
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.components().find(|(_, c)| c.name() == name).map(|(id, _)| id)
    }

    /// Returns the output pin driving `pin`.
    pub fn driver_of(&self, pin: InputPin) -> Option<OutputPin> {
        self.drivers.get(&pin).copied()
    }

    /// Returns the wire on `pin`.
    pub fn wire(&self, pin: OutputPin) -> Option<&Wire> {
        self.component(pin.component)?.output_wire(pin.index)
    }

    pub(crate) fn wire_mut(&mut self, pin: OutputPin) -> Option<&mut Wire> {
        self.components.get_mut(&pin.component)?.output_wire_mut(pin.index)
    }

    /// Returns the signal on `pin`, false if it carries no wire.
    pub fn signal(&self, pin: OutputPin) -> bool {
        self.wire(pin).map_or(false, |w| w.signal())
    }

    /// Returns every wire with the output pin it hangs from, orphaned ones included.
    pub fn wires(&self) -> impl Iterator<Item = (OutputPin, &Wire)> {
        self.components()
            .flat_map(|(id, c)| c.output_wires().map(move |(i, w)| (id.output(i), w)))
    }

    fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = ComponentId> + '_ {
        self.components()
            .filter(move |(_, c)| c.kind() == kind)
            .map(|(id, _)| id)
    }

    /// Returns the switches in construction order, the input pins of a chip made from this circuit.
    pub fn switches(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.of_kind(ComponentKind::Switch)
    }

    /// Returns the output probes in construction order, the output pins of a chip made from this circuit.
    pub fn output_probes(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.of_kind(ComponentKind::OutputProbe)
    }

    /// Returns the names of the chips used directly by this circuit, in order of first use.
    pub fn chip_dependencies(&self) -> IndexSet<String> {
        self.components()
            .filter_map(|(_, c)| c.chip())
            .map(|chip| chip.name().to_string())
            .collect()
    }

    /// Puts every component back to power-on state, wiring is kept.
    pub(crate) fn reset_state(&mut self) {
        for component in self.components.values_mut() {
            component.reset_state();
        }
    }

    /// Dumps the circuit in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format
    /// to `path`, one node per component and one edge per connection.
    pub fn dump_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        use petgraph::dot::{Config, Dot};
        use std::io::Write;
        let mut f = std::fs::File::create(path)?;
        let mut graph = petgraph::Graph::<_, ()>::new();
        let mut index = HashMap::new();
        for (id, component) in self.components() {
            let label = format!("{}{}:{}", component.kind(), id, component.name());
            index.insert(id, graph.add_node(label));
        }
        for (pin, wire) in self.wires() {
            graph.extend_with_edges(wire.pins().map(|dest| (index[&pin.component], index[&dest.component])));
        }
        write!(f, "{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::MAX_INPUTS;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn and_circuit() -> (Circuit, ComponentId, ComponentId, ComponentId, ComponentId) {
        let mut c = Circuit::new();
        let a = c.switch("a");
        let b = c.switch("b");
        let and = c.and(&[a.output(0), b.output(0)], "and");
        let out = c.output_probe(and.output(0), "out");
        (c, a, b, and, out)
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut c = Circuit::new();
        let a = c.switch("a");
        c.remove_component(a);
        let b = c.switch("b");
        assert_ne!(a, b);
        assert!(!c.contains(a));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let mut c = Circuit::new();
        let not = c.not(&[], "not");
        assert!(!c.add_connection(not, 0, not, 0));
        assert!(c.wire(not.output(0)).is_none());
        assert_eq!(c.wires().count(), 0);
    }

    #[test]
    fn test_driven_input_is_rejected() {
        let (mut c, a, b, and, _) = and_circuit();
        let before: Vec<_> = c.wires().map(|(p, w)| (p, w.destinations().to_vec())).collect();
        assert!(!c.add_connection(b, 0, and, 0));
        let after: Vec<_> = c.wires().map(|(p, w)| (p, w.destinations().to_vec())).collect();
        assert_eq!(before, after);
        assert_eq!(c.driver_of(and.input(0)), Some(a.output(0)));
    }

    #[test]
    fn test_invalid_pins_are_rejected() {
        let (mut c, a, _, and, out) = and_circuit();
        // Probes have no outputs, switches take no inputs.
        assert!(!c.add_connection(out, 0, and, 5));
        assert!(!c.add_connection(and, 0, a, 0));
        assert!(!c.add_connection(a, 1, and, 5));
        assert!(!c.add_connection(a, 0, ComponentId(99), 0));
        assert_eq!(c.component(and).unwrap().input_count(), 2);
    }

    #[test]
    fn test_variadic_gate_grows_on_connection() {
        let (mut c, a, _, and, _) = and_circuit();
        let extra = c.switch("c");
        assert!(c.add_connection(extra, 0, and, 4));
        assert_eq!(c.component(and).unwrap().input_count(), 5);
        // Fan-out reuses the wire.
        let not = c.not(&[a.output(0)], "not");
        assert_eq!(c.wire(a.output(0)).unwrap().destinations().len(), 2);
        assert_eq!(c.driver_of(not.input(0)), Some(a.output(0)));

        assert!(!c.add_connection(extra, 0, and, usize::MAX));
        assert!(!c.add_connection(extra, 0, and, MAX_INPUTS));
        assert_eq!(c.component(and).unwrap().input_count(), 5);
        assert_eq!(c.wire(extra.output(0)).unwrap().destinations().len(), 1);
    }

    #[test]
    fn test_remove_connection_resets_input_and_keeps_wire() {
        let (mut c, a, _, and, _) = and_circuit();
        c.component_mut(and).unwrap().store_input(0, true);
        assert!(c.remove_connection(and, 0));
        assert!(!c.component(and).unwrap().input(0));
        assert_eq!(c.driver_of(and.input(0)), None);
        assert!(c.wire(a.output(0)).unwrap().is_orphaned());
        assert!(!c.remove_connection(and, 0));
        // The freed input can be driven again.
        assert!(c.add_connection(a, 0, and, 0));
    }

    #[test]
    fn test_remove_component_leaves_no_dangling_references() {
        let (mut c, a, b, and, out) = and_circuit();
        c.component_mut(out).unwrap().store_input(0, true);
        let removed = c.remove_component(and).unwrap();
        assert_eq!(removed.kind(), ComponentKind::And);
        assert!(c.wire(a.output(0)).unwrap().is_orphaned());
        assert!(c.wire(b.output(0)).unwrap().is_orphaned());
        assert_eq!(c.driver_of(out.input(0)), None);
        assert!(!c.component(out).unwrap().input(0));
        for (_, wire) in c.wires() {
            assert!(wire.pins().all(|p| c.contains(p.component)));
        }
        assert!(c.remove_component(and).is_none());
    }

    #[test]
    fn test_add_component_adopts_wires() {
        let (mut c, _, _, and, out) = and_circuit();
        let mut removed = c.remove_component(and).unwrap();
        // The probe input is free again, the copy of the AND wire can take it back.
        removed.wire_or_insert(0).unwrap().add_destination(ComponentId(1234).input(0));
        let and = c.add_component(removed);
        assert_eq!(c.driver_of(out.input(0)), Some(and.output(0)));
        assert_eq!(c.wire(and.output(0)).unwrap().destinations().len(), 1);

        // Adopted destinations past the end of a variadic gate grow it.
        let or = c.or(&[], "or");
        let mut sw = Component::switch();
        sw.wire_or_insert(0).unwrap().add_destination(or.input(5));
        let sw = c.add_component(sw);
        assert_eq!(c.driver_of(or.input(5)), Some(sw.output(0)));
        assert_eq!(c.component(or).unwrap().input_count(), 6);
    }

    #[test]
    fn test_pin_discovery_follows_construction_order() {
        let mut c = Circuit::new();
        let x = c.switch("x");
        let o1 = c.output_probe(x.output(0), "o1");
        let y = c.switch("y");
        let o2 = c.output_probe(y.output(0), "o2");
        assert_eq!(c.switches().collect::<Vec<_>>(), vec![x, y]);
        assert_eq!(c.output_probes().collect::<Vec<_>>(), vec![o1, o2]);
        assert_eq!(c.find("o2"), Some(o2));
    }

    const GATES: [GateType; 7] = [And, Or, Nand, Nor, Xor, Not, Buffer];

    /// An edit picking its components by index into the current ids, modulo their count.
    #[derive(Debug, Clone)]
    enum Edit {
        Switch,
        Gate(usize),
        Probe,
        Copy(usize),
        Remove(usize),
        Connect(usize, usize, usize, usize),
        Disconnect(usize, usize),
    }

    fn edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            Just(Edit::Switch),
            (0..GATES.len()).prop_map(Edit::Gate),
            Just(Edit::Probe),
            any::<usize>().prop_map(Edit::Copy),
            any::<usize>().prop_map(Edit::Remove),
            (any::<usize>(), 0..2usize, any::<usize>(), 0..4usize)
                .prop_map(|(s, o, d, i)| Edit::Connect(s, o, d, i)),
            (any::<usize>(), 0..4usize).prop_map(|(d, i)| Edit::Disconnect(d, i)),
        ]
    }

    fn apply(c: &mut Circuit, edit: &Edit) {
        let ids: Vec<ComponentId> = c.ids().collect();
        let pick = |n: usize| ids.get(n % ids.len().max(1)).copied();
        match *edit {
            Edit::Switch => {
                c.switch("sw");
            }
            Edit::Gate(g) => {
                c.add_component(Component::gate(GATES[g]));
            }
            Edit::Probe => {
                c.add_component(Component::output_probe());
            }
            Edit::Copy(n) => {
                if let Some(id) = pick(n) {
                    let copy = c.component(id).unwrap().make_copy();
                    assert_eq!(copy.output_wires().count(), 0);
                    let copied = c.add_component(copy);
                    assert_eq!(c.component(copied).unwrap().kind(), c.component(id).unwrap().kind());
                }
            }
            Edit::Remove(n) => {
                if let Some(id) = pick(n) {
                    assert!(c.remove_component(id).is_some());
                    assert!(!c.contains(id));
                }
            }
            Edit::Connect(s, o, d, i) => {
                if let (Some(s), Some(d)) = (pick(s), pick(d)) {
                    let driven = c.driver_of(d.input(i)).is_some();
                    let connected = c.add_connection(s, o, d, i);
                    if driven || s == d {
                        assert!(!connected);
                    }
                    if connected {
                        assert_eq!(c.driver_of(d.input(i)), Some(s.output(o)));
                    }
                }
            }
            Edit::Disconnect(d, i) => {
                if let Some(d) = pick(d) {
                    c.remove_connection(d, i);
                    assert!(!c.component(d).unwrap().input(i));
                    assert!(c.driver_of(d.input(i)).is_none());
                }
            }
        }
    }

    /// Every input has at most one driver and no wire points at a missing component.
    fn assert_consistent(c: &Circuit) {
        let mut driven = HashSet::new();
        for (source, wire) in c.wires() {
            assert!(c.contains(source.component));
            for pin in wire.pins() {
                assert!(driven.insert(pin), "{} is driven twice", pin);
                let dest = c
                    .component(pin.component)
                    .unwrap_or_else(|| panic!("{} points at a missing component", pin));
                assert!(pin.index < dest.input_count());
                assert_eq!(c.driver_of(pin), Some(source));
            }
        }
        assert_eq!(driven.len(), c.drivers.len());
    }

    proptest! {
        #[test]
        fn test_random_edits_keep_circuit_consistent(edits in proptest::collection::vec(edit(), 1..60)) {
            let mut c = Circuit::new();
            for edit in &edits {
                apply(&mut c, edit);
                assert_consistent(&c);
            }
        }
    }
}
