use super::config::SimConfig;
use super::monitor::SignalMonitor;
use super::simulator::{EventHost, Simulator};
use crate::circuit::*;
use crate::data_structures::Slab;
#[cfg(feature = "debug_probes")]
use log::info;
use log::{debug, trace, warn};
use smallvec::SmallVec;
use thiserror::Error;
use unwrap::unwrap;

/// Action executed by the [Simulator] of a [Workbench].
///
/// Events addressed to a component that no longer exists are ignored.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SimEvent {
    /// Recompute the outputs of a component after an input change.
    Update(ComponentRef),
    /// Flip a clock and schedule its next edge.
    ClockEdge(ComponentRef),
}

/// Returned by [Workbench::settle] when events are still queued after the allowed ticks.
#[derive(Debug, Clone, Copy, Error, Eq, PartialEq)]
#[error("circuit didn't settle within {0} ticks")]
pub struct Unsettled(pub u64);

#[derive(Debug)]
struct Instance {
    circuit: Circuit,
    /// The custom component this circuit is the inside of, [None] for the main circuit.
    owner: Option<ComponentRef>,
}

/// Owner of the active circuit: simulates it and applies the host's edits.
///
/// Every live circuit, the main one and the private copy behind each placed custom component,
/// sits in one arena addressed by [CircuitId]. Discarding a chip instance frees its slot and
/// invalidates its id, so events scheduled for it before it was discarded fall through.
///
/// Signals move in two ways:
/// - with propagation delay disabled, an input change updates the component immediately
///   and the whole cascade runs before the edit returns,
/// - with propagation delay enabled, an input change schedules an update `delay` ticks later
///   and [Workbench::run] moves the cascade forward.
///
/// # Example
/// ```
/// # use logik::circuit::Circuit;
/// # use logik::sim::{SimConfig, Workbench};
/// let mut c = Circuit::new();
/// let a = c.switch("a");
/// let b = c.switch("b");
/// let and = c.and(&[a.output(0), b.output(0)], "and");
/// let out = c.output_probe(and.output(0), "out");
///
/// let mut bench = Workbench::new(c);
/// bench.toggle(a, true);
/// assert!(!bench.state(out));
/// bench.toggle(b, true);
/// assert!(bench.state(out));
///
/// // With propagation delay each gate takes `gate_delay` ticks.
/// bench.set_config(SimConfig::default().with_propagation_delay(true).with_gate_delay(3));
/// bench.toggle(a, false);
/// bench.run(5);
/// assert!(bench.state(out));
/// bench.run(1);
/// assert!(!bench.state(out));
/// ```
#[derive(Debug)]
pub struct Workbench {
    circuits: Slab<Instance>,
    main: CircuitId,
    library: ChipLibrary,
    simulator: Simulator<SimEvent>,
    config: SimConfig,
    monitors: Vec<SignalMonitor>,
    depth: usize,
}

impl Workbench {
    /// Returns a [Workbench] simulating `circuit` with the default [SimConfig] and an empty
    /// chip library. Custom components in `circuit` stay inert until their chip is
    /// defined and they are placed again.
    pub fn new(circuit: Circuit) -> Self {
        let mut bench = Self::with_config(SimConfig::default());
        let empty = bench.main;
        bench.main = bench.install(circuit);
        bench.circuits.remove(empty.0);
        bench
    }

    /// Returns a [Workbench] with an empty main circuit.
    pub fn with_config(config: SimConfig) -> Self {
        let mut circuits = Slab::new();
        let main = CircuitId(circuits.insert(Instance {
            circuit: Circuit::new(),
            owner: None,
        }));
        Self {
            circuits,
            main,
            library: ChipLibrary::new(),
            simulator: Simulator::new(),
            config,
            monitors: Vec::new(),
            depth: 0,
        }
    }

    /// Returns a [Workbench] simulating `circuit`, whose custom components come from `library`.
    pub fn with_library(
        circuit: Circuit,
        library: ChipLibrary,
        config: SimConfig,
    ) -> Result<Self, ChipError> {
        let mut bench = Self::with_config(config);
        bench.library = library;
        bench.replace_main(circuit)?;
        Ok(bench)
    }

    /// Swaps the main circuit for `circuit`.
    ///
    /// Pending events are dropped and the tick counter restarts. The old circuit and its chip
    /// instances are discarded, the new one gets fresh chip instances, running clocks and
    /// one update of every component in construction order. Monitors keep watching the same
    /// pins in the new circuit.
    ///
    /// Fails without changing anything if `circuit` uses a chip missing from the library.
    pub fn replace_main(&mut self, circuit: Circuit) -> Result<(), ChipError> {
        if let Some(missing) = circuit
            .chip_dependencies()
            .into_iter()
            .find(|name| !self.library.contains(name))
        {
            return Err(ChipError::Undefined(missing));
        }

        self.simulator.clear();
        let old = self.main;
        if let Some(instance) = self.circuits.remove(old.0) {
            self.free_chips(instance.circuit);
        }
        self.main = self.install(circuit);
        for monitor in &mut self.monitors {
            if monitor.circuit() == old {
                monitor.retarget(self.main);
            }
        }
        debug!("replaced main circuit, {} live circuits", self.circuits.len());
        Ok(())
    }

    /// Puts `circuit` in the arena as a top level circuit and powers it on.
    fn install(&mut self, mut circuit: Circuit) -> CircuitId {
        for (_, component) in circuit.components_mut() {
            component.disarm_clock();
        }
        let id = CircuitId(self.circuits.insert(Instance {
            circuit,
            owner: None,
        }));
        self.bind_chips(id);
        self.arm_clocks(id);
        self.power_on(id);
        id
    }

    /// Drops every queued event, restarts the tick counter and restarts every clock.
    pub fn clear(&mut self) {
        self.simulator.clear();
        for id in self.circuits.indexes() {
            let id = CircuitId(id);
            if let Some(circuit) = self.circuit_mut(id) {
                for (_, component) in circuit.components_mut() {
                    component.disarm_clock();
                }
            }
            self.arm_clocks(id);
        }
    }

    /// Returns the id of the main circuit.
    pub fn main(&self) -> CircuitId {
        self.main
    }

    /// Returns the main circuit.
    pub fn main_circuit(&self) -> &Circuit {
        unwrap!(self.circuit(self.main), "main circuit {} is missing", self.main)
    }

    /// Returns the live circuit `id`: the main circuit or the inside of a chip instance.
    pub fn circuit(&self, id: CircuitId) -> Option<&Circuit> {
        self.circuits.get(id.0).map(|i| &i.circuit)
    }

    fn circuit_mut(&mut self, id: CircuitId) -> Option<&mut Circuit> {
        self.circuits.get_mut(id.0).map(|i| &mut i.circuit)
    }

    /// Returns the custom component whose inside is `id`.
    pub fn owner(&self, id: CircuitId) -> Option<ComponentRef> {
        self.circuits.get(id.0)?.owner
    }

    /// Returns the number of live circuits, the main one included.
    pub fn live_circuits(&self) -> usize {
        self.circuits.len()
    }

    /// Returns the component `target`, anywhere in the workbench.
    pub fn component(&self, target: ComponentRef) -> Option<&Component> {
        self.circuit(target.circuit)?.component(target.component)
    }

    /// Returns the component `target` mutably, for renaming, moving or changing its delay.
    pub fn component_mut(&mut self, target: ComponentRef) -> Option<&mut Component> {
        self.circuit_mut(target.circuit)?.component_mut(target.component)
    }

    fn main_ref(&self, id: ComponentId) -> ComponentRef {
        ComponentRef::new(self.main, id)
    }

    /// Returns the state of component `id` of the main circuit, false if it doesn't exist.
    pub fn state(&self, id: ComponentId) -> bool {
        self.component(self.main_ref(id)).map_or(false, |c| c.state())
    }

    /// Returns the signal on `pin` of the main circuit.
    pub fn signal(&self, pin: OutputPin) -> bool {
        self.main_circuit().signal(pin)
    }

    /// Returns the chip instance behind custom component `id` of the main circuit.
    pub fn instance_of(&self, id: ComponentId) -> Option<&ChipInstance> {
        self.component(self.main_ref(id))?.chip()?.instance()
    }

    pub fn library(&self) -> &ChipLibrary {
        &self.library
    }

    /// Returns the chip library for defining new chips. Components already placed keep the
    /// inside they were created with.
    pub fn library_mut(&mut self) -> &mut ChipLibrary {
        &mut self.library
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Changes the configuration, already queued events keep their due tick.
    pub fn set_config(&mut self, config: SimConfig) {
        self.config = config;
    }

    pub fn simulator(&self) -> &Simulator<SimEvent> {
        &self.simulator
    }

    /// Returns the current tick.
    pub fn tick(&self) -> u64 {
        self.simulator.tick()
    }

    /// Returns true if no event is queued.
    pub fn is_stable(&self) -> bool {
        self.simulator.is_stable()
    }

    /// Returns a new component of `kind` configured like this workbench, clocks get
    /// [SimConfig::clock_interval]. Custom components come from the library.
    pub fn create(&self, kind: ComponentKind) -> Option<Component> {
        let mut component = Component::from_kind(kind)?;
        component.set_clock_interval(self.config.clock_interval);
        Some(component)
    }

    /// Places `component` in the main circuit, wires it carries are adopted.
    ///
    /// A custom component gets its own copy of its chip, clocks start running and the
    /// component is updated once so its outputs match its state.
    pub fn add_component(&mut self, mut component: Component) -> Result<ComponentId, ChipError> {
        if let Some(chip) = component.chip() {
            if !self.library.contains(chip.name()) {
                return Err(ChipError::Undefined(chip.name().to_string()));
            }
        }
        component.disarm_clock();
        component.take_chip_instance();
        // Nothing drives a component that was just placed.
        component.clear_inputs();

        let main = self.main;
        let id = unwrap!(self.circuit_mut(main), "main circuit {} is missing", main).add_component(component);
        let target = self.main_ref(id);
        self.bind_chip(target);
        self.arm_clock(target);
        self.update(target);
        self.sync_destinations(target);
        Ok(id)
    }

    /// Removes component `id` from the main circuit together with every connection from or
    /// to it and discards its chip instance.
    ///
    /// Inputs it used to drive fall back to false and the change propagates.
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Component> {
        let main = self.main;
        let mut removed = self.circuit_mut(main)?.remove_component(id)?;
        for (_, wire) in removed.output_wires() {
            if wire.signal() {
                for pin in wire.pins() {
                    self.input_changed(ComponentRef::new(main, pin.component));
                }
            }
        }
        removed.disarm_clock();
        if let Some(instance) = removed.take_chip_instance() {
            self.free_instance(instance);
        }
        Some(removed)
    }

    /// Connects output `output` of `source` to input `input` of `dest` in the main circuit,
    /// see [Circuit::add_connection]. The destination picks up the current signal right away.
    pub fn add_connection(
        &mut self,
        source: ComponentId,
        output: usize,
        dest: ComponentId,
        input: usize,
    ) -> bool {
        let main = self.main;
        let circuit = unwrap!(self.circuit_mut(main), "main circuit {} is missing", main);
        let wired = circuit.wire(source.output(output)).is_some();
        if !circuit.add_connection(source, output, dest, input) {
            return false;
        }
        if !wired {
            // A fresh wire carries false until its source drives it.
            self.update(self.main_ref(source));
        }
        let signal = self.signal(source.output(output));
        self.set_input_in(main, dest.input(input), signal);
        true
    }

    /// Disconnects input `input` of `dest` in the main circuit. The input falls back to false
    /// and the change propagates.
    pub fn remove_connection(&mut self, dest: ComponentId, input: usize) -> bool {
        let main = self.main;
        let circuit = unwrap!(self.circuit_mut(main), "main circuit {} is missing", main);
        let was = circuit.component(dest).map_or(false, |c| c.input(input));
        if !circuit.remove_connection(dest, input) {
            return false;
        }
        if was {
            self.input_changed(self.main_ref(dest));
        }
        true
    }

    /// Sets switch `id` of the main circuit to `value`, returns false if it isn't a switch.
    ///
    /// Switches update right away, the delay applies to the components they drive.
    pub fn toggle(&mut self, id: ComponentId, value: bool) -> bool {
        self.toggle_in(self.main, id, value)
    }

    /// Stores `value` in input `pin` of the main circuit, as if a wire had driven it.
    pub fn set_input(&mut self, pin: InputPin, value: bool) {
        self.set_input_in(self.main, pin, value)
    }

    /// Advances the simulation `ticks` ticks, running the events due at each tick,
    /// then sampling the monitors.
    pub fn run(&mut self, ticks: u64) {
        Simulator::run_host(self, ticks)
    }

    /// Runs one tick at a time until no event is queued, at most `max` ticks.
    /// Returns Ok(ticks run) if the circuit settled.
    ///
    /// Circuits with running clocks or oscillating loops never settle.
    pub fn settle(&mut self, max: u64) -> Result<u64, Unsettled> {
        for i in 0..=max {
            if self.is_stable() {
                return Ok(i);
            }
            if i < max {
                self.run(1);
            }
        }
        Err(Unsettled(max))
    }

    /// Attaches a [SignalMonitor] to `pin` of the main circuit, returns its index in
    /// [Workbench::monitors].
    pub fn monitor<S: Into<String>>(&mut self, name: S, pin: OutputPin, capacity: usize) -> usize {
        self.monitors
            .push(SignalMonitor::new(name, self.main, pin, capacity));
        self.monitors.len() - 1
    }

    pub fn monitors(&self) -> &[SignalMonitor] {
        &self.monitors
    }

    /// Detaches monitor `index`.
    pub fn remove_monitor(&mut self, index: usize) -> Option<SignalMonitor> {
        if index < self.monitors.len() {
            Some(self.monitors.remove(index))
        } else {
            None
        }
    }

    fn sample_monitors(&mut self) {
        let circuits = &self.circuits;
        for monitor in &mut self.monitors {
            let value = circuits
                .get(monitor.circuit().0)
                .map_or(false, |i| i.circuit.signal(monitor.pin()));
            monitor.record(value);
        }
    }

    fn dispatch(&mut self, event: SimEvent) {
        trace!("tick {}: {:?}", self.tick(), event);
        match event {
            SimEvent::Update(target) => self.update(target),
            SimEvent::ClockEdge(target) => {
                let interval = match self.component_mut(target).and_then(|c| c.clock_edge()) {
                    Some(interval) => interval,
                    None => return,
                };
                self.update(target);
                self.simulator.schedule(event, interval);
            }
        }
    }

    fn set_input_in(&mut self, circuit: CircuitId, pin: InputPin, value: bool) {
        let target = ComponentRef::new(circuit, pin.component);
        let changed = match self.component_mut(target) {
            Some(component) => component.store_input(pin.index, value),
            None => return,
        };
        if changed {
            self.input_changed(target);
        }
    }

    /// Reacts to a changed input of `target` according to the propagation mode.
    fn input_changed(&mut self, target: ComponentRef) {
        if self.config.propagation_delay {
            let delay = self
                .component(target)
                .and_then(|c| c.delay())
                .unwrap_or(self.config.gate_delay);
            self.simulator.schedule(SimEvent::Update(target), delay);
        } else {
            self.update(target);
        }
    }

    fn toggle_in(&mut self, circuit: CircuitId, id: ComponentId, value: bool) -> bool {
        let target = ComponentRef::new(circuit, id);
        match self.component_mut(target).and_then(|c| c.set_switch(value)) {
            Some(changed) => {
                if changed {
                    self.update(target);
                }
                true
            }
            None => false,
        }
    }

    /// Recomputes `target` and drives its outputs.
    fn update(&mut self, target: ComponentRef) {
        if self.depth >= self.config.max_depth {
            debug!("propagation deeper than {}, deferring {}", self.config.max_depth, target);
            self.simulator.schedule(SimEvent::Update(target), 1);
            return;
        }
        self.depth += 1;
        self.update_inner(target);
        self.depth -= 1;
    }

    fn update_inner(&mut self, target: ComponentRef) {
        let component = match self.component_mut(target) {
            Some(component) => component,
            None => return,
        };

        if let Some(chip) = component.chip() {
            let instance = match chip.instance() {
                Some(instance) => instance.clone(),
                None => return,
            };
            let inputs: SmallVec<[bool; 8]> = component.inputs().iter().copied().collect();
            for (switch, value) in instance.inputs.iter().zip(inputs) {
                self.toggle_in(instance.circuit, *switch, value);
            }
            self.bridge_out(target, &instance);
            return;
        }

        let was = component.state();
        let outputs = component.evaluate();
        let probe_changed = component.kind() == ComponentKind::OutputProbe && component.state() != was;
        if probe_changed {
            log_probe(target, component);
        }

        for (index, value) in outputs.into_iter().enumerate() {
            self.drive(target.circuit, target.component.output(index), value);
        }
        if probe_changed {
            if let Some(owner) = self.owner(target.circuit) {
                self.refresh_outputs(owner);
            }
        }
    }

    /// Copies the inner probes of a chip instance to the outputs of its owner.
    fn bridge_out(&mut self, owner: ComponentRef, instance: &ChipInstance) {
        let values: SmallVec<[bool; 8]> = match self.circuit(instance.circuit) {
            Some(inner) => instance
                .outputs
                .iter()
                .map(|probe| inner.component(*probe).map_or(false, |c| c.state()))
                .collect(),
            None => return,
        };
        for (index, value) in values.into_iter().enumerate() {
            self.drive(owner.circuit, owner.component.output(index), value);
        }
    }

    fn refresh_outputs(&mut self, owner: ComponentRef) {
        let instance = match self.component(owner).and_then(|c| c.chip()?.instance()) {
            Some(instance) => instance.clone(),
            None => return,
        };
        self.bridge_out(owner, &instance);
    }

    /// Puts `value` on the wire at `pin`, forwarding it to every destination if it changed.
    fn drive(&mut self, circuit: CircuitId, pin: OutputPin, value: bool) {
        let destinations: SmallVec<[InputPin; 4]> =
            match self.circuit_mut(circuit).and_then(|c| c.wire_mut(pin)) {
                Some(wire) => {
                    if !wire.set_signal(value) {
                        return;
                    }
                    wire.pins().collect()
                }
                None => return,
            };
        for destination in destinations {
            self.set_input_in(circuit, destination, value);
        }
    }

    /// Pushes the signal of every wire of `source` to its destinations.
    fn sync_destinations(&mut self, source: ComponentRef) {
        let pending: SmallVec<[(InputPin, bool); 4]> = match self.component(source) {
            Some(component) => component
                .output_wires()
                .flat_map(|(_, wire)| wire.pins().map(move |pin| (pin, wire.signal())))
                .collect(),
            None => return,
        };
        for (pin, value) in pending {
            self.set_input_in(source.circuit, pin, value);
        }
    }

    /// Updates every component of `circuit` once, in construction order.
    fn power_on(&mut self, circuit: CircuitId) {
        let ids: Vec<ComponentId> = match self.circuit(circuit) {
            Some(c) => c.ids().collect(),
            None => return,
        };
        for id in ids {
            self.update(ComponentRef::new(circuit, id));
        }
    }

    fn arm_clock(&mut self, target: ComponentRef) {
        if let Some(interval) = self.component_mut(target).and_then(|c| c.arm_clock()) {
            self.simulator.schedule(SimEvent::ClockEdge(target), interval);
        }
    }

    fn arm_clocks(&mut self, circuit: CircuitId) {
        let ids: Vec<ComponentId> = match self.circuit(circuit) {
            Some(c) => c.ids().collect(),
            None => return,
        };
        for id in ids {
            self.arm_clock(ComponentRef::new(circuit, id));
        }
    }

    fn bind_chips(&mut self, circuit: CircuitId) {
        let ids: Vec<ComponentId> = match self.circuit(circuit) {
            Some(c) => c.ids().collect(),
            None => return,
        };
        for id in ids {
            self.bind_chip(ComponentRef::new(circuit, id));
        }
    }

    /// Gives custom component `target` a private copy of its chip, recursively.
    fn bind_chip(&mut self, target: ComponentRef) {
        let name = match self.component_mut(target) {
            Some(component) => {
                if let Some(stale) = component.take_chip_instance() {
                    debug!("{} was bound to {}, rebinding", target, stale.circuit);
                }
                match component.chip() {
                    Some(chip) => chip.name().to_string(),
                    None => return,
                }
            }
            None => return,
        };
        let template = match self.library.get(&name) {
            Some(template) => template.clone(),
            None => {
                warn!("chip {:?} is not defined, {} stays inert", name, target);
                return;
            }
        };

        let inputs = template.switches().collect();
        let outputs = template.output_probes().collect();
        let inner = CircuitId(self.circuits.insert(Instance {
            circuit: template,
            owner: Some(target),
        }));
        debug!("instantiated chip {:?} as {} inside {}", name, inner, target);

        // The library holds no recursive chips so this terminates.
        self.bind_chips(inner);
        self.arm_clocks(inner);
        self.power_on(inner);

        if let Some(component) = self.component_mut(target) {
            component.bind_chip(ChipInstance {
                circuit: inner,
                inputs,
                outputs,
            });
        }
    }

    fn free_instance(&mut self, instance: ChipInstance) {
        if let Some(inner) = self.circuits.remove(instance.circuit.0) {
            debug!("discarded chip instance {}", instance.circuit);
            self.free_chips(inner.circuit);
        }
    }

    /// Discards the chip instances of every custom component of `circuit`.
    fn free_chips(&mut self, circuit: Circuit) {
        for (_, component) in circuit.components() {
            if let Some(instance) = component.chip().and_then(|c| c.instance()) {
                self.free_instance(instance.clone());
            }
        }
    }
}

impl EventHost<SimEvent> for Workbench {
    fn simulator_mut(&mut self) -> &mut Simulator<SimEvent> {
        &mut self.simulator
    }

    fn execute(&mut self, event: SimEvent) {
        self.dispatch(event)
    }

    fn event_budget(&self) -> usize {
        self.config.event_budget
    }

    fn tick_done(&mut self) {
        self.sample_monitors()
    }
}

#[cfg(feature = "debug_probes")]
fn log_probe(target: ComponentRef, probe: &Component) {
    info!("{} {}: {}", target, probe.name(), probe.state());
}

#[cfg(not(feature = "debug_probes"))]
fn log_probe(_target: ComponentRef, _probe: &Component) {}
