/// Default delay in ticks between an input change and the update it triggers,
/// when propagation delay is enabled.
pub const DEFAULT_GATE_DELAY: u64 = 1;
/// Default half period of a clock in ticks.
pub const DEFAULT_CLOCK_INTERVAL: u64 = 50;
/// Default maximum number of events executed in a single tick.
pub const DEFAULT_EVENT_BUDGET: usize = 100_000;
/// Default maximum depth of synchronous propagation.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs of a [Workbench](super::Workbench).
///
/// # Example
/// ```
/// # use logik::sim::SimConfig;
/// let config = SimConfig::default().with_propagation_delay(true).with_gate_delay(5);
/// assert!(config.propagation_delay);
/// assert_eq!(config.gate_delay, 5);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SimConfig {
    /// When false, input changes update components immediately.
    /// When true, updates go through the simulator after the component's delay.
    pub propagation_delay: bool,
    /// Delay used by components without a delay override.
    pub gate_delay: u64,
    /// Interval given to clocks created by [Workbench::create](super::Workbench::create).
    pub clock_interval: u64,
    /// Events left over once a tick ran this many are postponed to the next tick.
    pub event_budget: usize,
    /// Synchronous updates nested deeper than this are deferred by one tick.
    pub max_depth: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            propagation_delay: false,
            gate_delay: DEFAULT_GATE_DELAY,
            clock_interval: DEFAULT_CLOCK_INTERVAL,
            event_budget: DEFAULT_EVENT_BUDGET,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SimConfig {
    pub fn with_propagation_delay(mut self, enabled: bool) -> Self {
        self.propagation_delay = enabled;
        self
    }

    pub fn with_gate_delay(mut self, ticks: u64) -> Self {
        self.gate_delay = ticks;
        self
    }

    pub fn with_clock_interval(mut self, ticks: u64) -> Self {
        self.clock_interval = ticks.max(1);
        self
    }

    pub fn with_event_budget(mut self, events: usize) -> Self {
        self.event_budget = events.max(1);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }
}
