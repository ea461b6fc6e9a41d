use crate::data_structures::EventQueue;
use log::{trace, warn};
use std::fmt::Debug;

/// Discrete event scheduler: a queue of `(tick, event)` pairs and a monotonic tick counter.
///
/// Events are consumed exactly once, in non-decreasing tick order, and events due on the
/// same tick come out in the order they were scheduled. Nothing is ever cancelled,
/// [Simulator::clear] drops everything at once.
///
/// # Example
/// ```
/// # use logik::sim::Simulator;
/// let mut sim = Simulator::new();
/// let mut seen = Vec::new();
///
/// sim.schedule("b", 2);
/// sim.schedule("a", 1);
/// sim.run(1, |_, e| seen.push(e));
/// assert_eq!(seen, vec!["a"]);
/// assert!(!sim.is_stable());
///
/// // Events can schedule more events, delay 0 runs later in the same tick.
/// sim.run(1, |sim, e| {
///     seen.push(e);
///     if e == "b" {
///         sim.schedule("c", 0);
///     }
/// });
/// assert_eq!(seen, vec!["a", "b", "c"]);
/// assert!(sim.is_stable());
/// assert_eq!(sim.tick(), 2);
/// ```
#[derive(Debug)]
pub struct Simulator<E> {
    queue: EventQueue<E>,
    tick: u64,
}

impl<E: Debug> Simulator<E> {
    /// Returns an idle [Simulator] at tick 0.
    pub fn new() -> Self {
        Self {
            queue: EventQueue::new(),
            tick: 0,
        }
    }

    /// Queues `event` to run `delay` ticks from now.
    ///
    /// A delay of 0 still waits for the queue to be drained, it never runs re-entrantly.
    pub fn schedule(&mut self, event: E, delay: u64) {
        let due = self.tick + delay;
        trace!("tick {}: scheduled {:?} for tick {}", self.tick, event, due);
        self.queue.push(due, event);
    }

    /// Returns the current tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns true if nothing is queued.
    pub fn is_stable(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Returns the tick of the next queued event.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.next_due()
    }

    /// Drops every queued event and resets the tick counter to 0.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.tick = 0;
    }

    /// Moves the tick counter one tick forward.
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Pops the next event due at or before the current tick.
    pub fn pop_due(&mut self) -> Option<E> {
        self.queue.pop_due(self.tick)
    }

    /// Advances the tick counter `ticks` times, running `f` on every event due at the new
    /// tick before moving on. `f` may schedule more events.
    pub fn run<F: FnMut(&mut Self, E)>(&mut self, ticks: u64, f: F) {
        Self::run_host(&mut Handler { simulator: self, f }, ticks)
    }

    /// Same as [Simulator::run] for a simulator owned by `host`.
    ///
    /// At most [EventHost::event_budget] events run per tick, the rest stays queued
    /// and runs on the following ticks.
    pub(crate) fn run_host<H: EventHost<E>>(host: &mut H, ticks: u64) {
        for _ in 0..ticks {
            host.simulator_mut().advance();
            let budget = host.event_budget();
            let mut executed = 0;
            while executed < budget {
                match host.simulator_mut().pop_due() {
                    Some(event) => host.execute(event),
                    None => break,
                }
                executed += 1;
            }
            let simulator = host.simulator_mut();
            let tick = simulator.tick();
            if matches!(simulator.next_due(), Some(due) if due <= tick) {
                warn!("tick {}: ran {} events, postponing the rest", tick, executed);
            }
            host.tick_done();
        }
    }
}

/// Owner of a [Simulator] that carries out its events.
pub(crate) trait EventHost<E> {
    fn simulator_mut(&mut self) -> &mut Simulator<E>;

    /// Carries out `event`, which may schedule more events.
    fn execute(&mut self, event: E);

    fn event_budget(&self) -> usize {
        usize::MAX
    }

    /// Called once the events of a tick have run.
    fn tick_done(&mut self) {}
}

struct Handler<'a, E, F> {
    simulator: &'a mut Simulator<E>,
    f: F,
}

impl<'a, E: Debug, F: FnMut(&mut Simulator<E>, E)> EventHost<E> for Handler<'a, E, F> {
    fn simulator_mut(&mut self) -> &mut Simulator<E> {
        &mut *self.simulator
    }

    fn execute(&mut self, event: E) {
        (self.f)(&mut *self.simulator, event)
    }
}

impl<E: Debug> Default for Simulator<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_exact() {
        let mut sim = Simulator::new();
        let mut fired = 0;
        sim.schedule((), 5);
        sim.run(4, |_, _| fired += 1);
        assert_eq!(fired, 0);
        sim.run(1, |_, _| fired += 1);
        assert_eq!(fired, 1);
        assert!(sim.is_stable());
    }

    #[test]
    fn test_same_tick_is_fifo() {
        let mut sim = Simulator::new();
        for i in 0..10 {
            sim.schedule(i, 3);
        }
        sim.schedule(-1, 1);
        let mut order = Vec::new();
        sim.run(3, |_, e| order.push(e));
        assert_eq!(order, vec![-1, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_self_scheduling_is_bounded_by_ticks() {
        let mut sim = Simulator::new();
        let mut count = 0;
        sim.schedule((), 1);
        sim.run(100, |sim, e| {
            count += 1;
            sim.schedule(e, 1);
        });
        assert_eq!(count, 100);
        assert_eq!(sim.pending(), 1);
    }

    #[test]
    fn test_clear() {
        let mut sim = Simulator::new();
        sim.schedule(1, 10);
        sim.run(3, |_, _| {});
        sim.clear();
        assert_eq!(sim.tick(), 0);
        assert!(sim.is_stable());
        assert_eq!(sim.next_due(), None);
    }

    struct Budgeted {
        simulator: Simulator<u32>,
        ran: Vec<(u64, u32)>,
        ticks: u64,
    }

    impl EventHost<u32> for Budgeted {
        fn simulator_mut(&mut self) -> &mut Simulator<u32> {
            &mut self.simulator
        }

        fn execute(&mut self, event: u32) {
            self.ran.push((self.simulator.tick(), event));
        }

        fn event_budget(&self) -> usize {
            2
        }

        fn tick_done(&mut self) {
            self.ticks += 1;
        }
    }

    #[test]
    fn test_event_budget_postpones_the_rest() {
        let mut host = Budgeted {
            simulator: Simulator::new(),
            ran: Vec::new(),
            ticks: 0,
        };
        for i in 0..5 {
            host.simulator.schedule(i, 1);
        }
        Simulator::run_host(&mut host, 3);
        assert_eq!(host.ran, vec![(1, 0), (1, 1), (2, 2), (2, 3), (3, 4)]);
        assert_eq!(host.ticks, 3);
        assert!(host.simulator.is_stable());
    }
}
