//! Event driven, hierarchical, digital logic simulation.
//!
//! Circuits are built from gates, switches, probes, clocks, flip-flops and custom chips
//! (circuits used as a single component), then handed to a [Workbench](sim::Workbench)
//! which propagates signals through them, either instantly or with per gate delays.
//!
//! # Example
//! ```
//! use logik::{ChipLibrary, Circuit, SimConfig, Workbench};
//!
//! // A chip computing a AND b.
//! let mut and = Circuit::new();
//! let a = and.switch("a");
//! let b = and.switch("b");
//! let gate = and.and(&[a.output(0), b.output(0)], "and");
//! and.output_probe(gate.output(0), "out");
//! let mut library = ChipLibrary::new();
//! library.define("my and", and).unwrap();
//!
//! // Use it like any other component.
//! let mut c = Circuit::new();
//! let x = c.switch("x");
//! let y = c.switch("y");
//! let chip = c.add_component(library.component("my and").unwrap());
//! c.add_connection(x, 0, chip, 0);
//! c.add_connection(y, 0, chip, 1);
//! let out = c.output_probe(chip.output(0), "out");
//!
//! let config = SimConfig::default().with_propagation_delay(true);
//! let mut bench = Workbench::with_library(c, library, config).unwrap();
//! bench.toggle(x, true);
//! bench.toggle(y, true);
//! bench.settle(100).unwrap();
//! assert!(bench.state(out));
//! ```
pub mod circuit;
pub mod data_structures;
pub mod sim;
pub mod storage;
pub use circuit::*;
pub use sim::*;
