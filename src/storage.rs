//! The LOGIK text format: a versioned, line oriented description of a main circuit and the
//! chips it is built from.
//!
//! ```text
//! LOGIK_VERSION 3
//! # Logik Snapshot
//!
//! DEF "half adder"
//! COMP SWITCH 0 0 0 0
//! COMP SWITCH 1 0 40 0
//! COMP XOR 2 60 0 0
//! COMP LIGHT 3 120 0 0 "sum"
//! WIRE 0:0 2:0
//! WIRE 1:0 2:1
//! WIRE 2:0 3:0 [90,0 90,10]
//! ENDDEF
//!
//! SECTION MAIN
//! COMP CUSTOM 0 200 100 1 "half adder"
//! ```
//!
//! `COMP <KIND> <id> <x> <y> <rotation> ["name"]` places a component, ids are local to the
//! enclosing section. For `CUSTOM` the name is the chip, for other kinds it is an optional label.
//! `WIRE <srcId>:<output> <dstId>:<input> [x,y ...]` connects two pins, the waypoints only
//! matter for drawing. Version 1 files have no rotation column.
//!
//! Loading is forgiving: lines that can't be understood are logged and skipped.
//! Only a version newer than [CURRENT_VERSION] stops it.
use crate::circuit::*;
use crate::sim::{SimConfig, Workbench};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use unwrap::unwrap;

/// Newest format version, the one written by [save_to_string].
pub const CURRENT_VERSION: u32 = 3;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("couldn't read circuit file: {0}")]
    Io(#[from] std::io::Error),
    #[error("format version {found} is newer than supported version {}", CURRENT_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("line {line}: invalid version {text:?}")]
    InvalidVersion { line: usize, text: String },
}

/// Result of loading a file: the main circuit and every chip defined in it.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub circuit: Circuit,
    pub library: ChipLibrary,
}

impl Loaded {
    /// Returns a [Workbench] simulating the loaded circuit.
    pub fn into_workbench(self, config: SimConfig) -> Result<Workbench, ChipError> {
        Workbench::with_library(self.circuit, self.library, config)
    }
}

/// Writes `circuit` and every chip of `library` to `path`.
pub fn save<P: AsRef<Path>>(path: P, circuit: &Circuit, library: &ChipLibrary) -> std::io::Result<()> {
    std::fs::write(path, save_to_string(circuit, library))
}

/// Reads the file at `path`, see [load_from_str].
pub fn load<P: AsRef<Path>>(path: P) -> Result<Loaded, LoadError> {
    let data = std::fs::read_to_string(path)?;
    load_from_str(&data)
}

/// Returns `circuit` and every chip of `library` in the current format.
/// Chips are written after the chips they use.
pub fn save_to_string(circuit: &Circuit, library: &ChipLibrary) -> String {
    let mut out = String::new();
    unwrap!(write_snapshot(&mut out, circuit, library), "writing to a String failed");
    out
}

fn write_snapshot(out: &mut String, circuit: &Circuit, library: &ChipLibrary) -> fmt::Result {
    writeln!(out, "LOGIK_VERSION {}", CURRENT_VERSION)?;
    writeln!(out, "# Logik Snapshot")?;
    writeln!(out)?;

    for name in library.dependency_order() {
        if let Some(template) = library.get(name) {
            writeln!(out, "DEF {}", quote(name))?;
            write_circuit(out, template)?;
            writeln!(out, "ENDDEF")?;
            writeln!(out)?;
        }
    }

    writeln!(out, "SECTION MAIN")?;
    write_circuit(out, circuit)
}

fn write_circuit(out: &mut String, circuit: &Circuit) -> fmt::Result {
    let mut ids = HashMap::new();
    for (file_id, (id, component)) in circuit.components().enumerate() {
        ids.insert(id, file_id);
        let Placement { x, y, rotation } = component.placement;
        write!(
            out,
            "COMP {} {} {} {} {}",
            component.kind(),
            file_id,
            x,
            y,
            u8::from(rotation)
        )?;
        match component.chip() {
            Some(chip) => write!(out, " {}", quote(chip.name()))?,
            None if component.name() != component.kind().default_name() => {
                write!(out, " {}", quote(component.name()))?
            }
            None => {}
        }
        writeln!(out)?;
    }

    for (source, wire) in circuit.wires() {
        for destination in wire.destinations() {
            write!(
                out,
                "WIRE {}:{} {}:{}",
                ids[&source.component], source.index, ids[&destination.pin.component], destination.pin.index
            )?;
            if !destination.waypoints.is_empty() {
                let points: Vec<String> = destination
                    .waypoints
                    .iter()
                    .map(|(x, y)| format!("{},{}", x, y))
                    .collect();
                write!(out, " [{}]", points.join(" "))?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Quotes `name`, double quotes inside it become single quotes.
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "'"))
}

/// Strips the surrounding double quotes of `token`, if any.
fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}

/// Splits `line` on whitespace, a double quoted run is a single token even if it holds spaces.
/// Quoted tokens keep their quotes.
fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        let end = if let Some(quoted) = rest.strip_prefix('"') {
            quoted.find('"').map_or(rest.len(), |i| i + 2)
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        tokens.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    tokens
}

/// Circuit being filled by the current section.
enum Section {
    Def { name: String, circuit: Circuit },
    Main,
}

struct Loader {
    version: u32,
    main: Circuit,
    library: ChipLibrary,
    section: Option<Section>,
    ids: HashMap<usize, ComponentId>,
}

impl Loader {
    fn circuit(&mut self) -> Option<&mut Circuit> {
        match self.section.as_mut()? {
            Section::Def { circuit, .. } => Some(circuit),
            Section::Main => Some(&mut self.main),
        }
    }

    fn end_section(&mut self, line: usize) {
        if let Some(Section::Def { name, .. }) = &self.section {
            warn!("line {}: chip {:?} has no ENDDEF, dropping it", line, name);
        }
        self.section = None;
        self.ids.clear();
    }

    fn line(&mut self, number: usize, line: &str) -> Result<(), LoadError> {
        let tokens = tokenize(line);
        match tokens[0] {
            "LOGIK_VERSION" => {
                let version = tokens
                    .get(1)
                    .and_then(|v| u32::from_str(v).ok())
                    .ok_or_else(|| LoadError::InvalidVersion {
                        line: number,
                        text: line.to_string(),
                    })?;
                if version > CURRENT_VERSION {
                    return Err(LoadError::UnsupportedVersion { found: version });
                }
                self.version = version;
            }
            "DEF" => {
                self.end_section(number);
                match tokens.get(1) {
                    Some(name) => {
                        self.section = Some(Section::Def {
                            name: unquote(name).to_string(),
                            circuit: Circuit::new(),
                        })
                    }
                    None => warn!("line {}: DEF without a name", number),
                }
            }
            "ENDDEF" => {
                if let Some(Section::Def { name, circuit }) = self.section.take() {
                    if let Err(e) = self.library.define(name, circuit) {
                        warn!("line {}: skipping chip, {}", number, e);
                    }
                } else {
                    warn!("line {}: ENDDEF outside of a DEF", number);
                }
                self.end_section(number);
            }
            "SECTION" => {
                self.end_section(number);
                match tokens.get(1) {
                    Some(&"MAIN") => self.section = Some(Section::Main),
                    other => warn!("line {}: unknown section {:?}", number, other),
                }
            }
            "COMP" => self.component(number, &tokens),
            "WIRE" => self.wire(number, line),
            other => warn!("line {}: unknown directive {:?}", number, other),
        }
        Ok(())
    }

    fn component(&mut self, number: usize, tokens: &[&str]) {
        if self.section.is_none() {
            warn!("line {}: COMP outside of a section", number);
            return;
        }
        let numbers = (
            tokens.get(2).and_then(|t| usize::from_str(t).ok()),
            tokens.get(3).and_then(|t| i32::from_str(t).ok()),
            tokens.get(4).and_then(|t| i32::from_str(t).ok()),
        );
        let (file_id, x, y) = match numbers {
            (Some(id), Some(x), Some(y)) => (id, x, y),
            _ => {
                warn!("line {}: malformed COMP {:?}", number, tokens);
                return;
            }
        };

        // Version 1 has no rotation column.
        let mut name_index = 5;
        let mut rotation = Rotation::default();
        if self.version >= 2 {
            if let Some(token) = tokens.get(5).filter(|t| !t.starts_with('"')) {
                rotation = match u8::from_str(token).ok().and_then(|r| Rotation::try_from(r).ok()) {
                    Some(rotation) => rotation,
                    None => {
                        warn!("line {}: invalid rotation {:?}", number, token);
                        return;
                    }
                };
                name_index = 6;
            }
        }
        let name = tokens.get(name_index).map(|t| unquote(t));

        let kind = match tokens.get(1).and_then(|t| ComponentKind::from_str(t).ok()) {
            Some(kind) => kind,
            None => {
                warn!("line {}: unknown component kind {:?}", number, tokens.get(1));
                return;
            }
        };
        let mut component = match (kind, name) {
            (ComponentKind::Custom, Some(chip)) => match self.library.component(chip) {
                Some(component) => component,
                None => {
                    warn!("line {}: unknown chip {:?}", number, chip);
                    return;
                }
            },
            (ComponentKind::Custom, None) => {
                warn!("line {}: CUSTOM without a chip name", number);
                return;
            }
            (kind, name) => {
                let mut component = match Component::from_kind(kind) {
                    Some(component) => component,
                    None => return,
                };
                if let Some(name) = name {
                    component.set_name(name);
                }
                component
            }
        };
        component.placement = Placement { x, y, rotation };

        if self.ids.contains_key(&file_id) {
            warn!("line {}: duplicate component id {}", number, file_id);
            return;
        }
        if let Some(circuit) = self.circuit() {
            let id = circuit.add_component(component);
            self.ids.insert(file_id, id);
        }
    }

    fn wire(&mut self, number: usize, line: &str) {
        let (pins, waypoints) = match line.find('[') {
            Some(i) => (&line[..i], Some(line[i + 1..].trim_end().trim_end_matches(']'))),
            None => (line, None),
        };
        let tokens: Vec<&str> = pins.split_whitespace().collect();
        let pair = |token: Option<&&str>| -> Option<(usize, usize)> {
            let (id, port) = token?.split_once(':')?;
            Some((usize::from_str(id).ok()?, usize::from_str(port).ok()?))
        };
        let ((source, output), (dest, input)) = match (pair(tokens.get(1)), pair(tokens.get(2))) {
            (Some(s), Some(d)) if tokens.len() == 3 => (s, d),
            _ => {
                warn!("line {}: malformed WIRE {:?}", number, line);
                return;
            }
        };
        let (source, dest) = match (self.ids.get(&source), self.ids.get(&dest)) {
            (Some(s), Some(d)) => (*s, *d),
            _ => {
                warn!("line {}: WIRE references an unknown component", number);
                return;
            }
        };
        let waypoints = match waypoints.map(parse_waypoints) {
            Some(None) => {
                warn!("line {}: ignoring malformed waypoints", number);
                Vec::new()
            }
            Some(Some(points)) => points,
            None => Vec::new(),
        };

        let circuit = match self.circuit() {
            Some(circuit) => circuit,
            None => {
                warn!("line {}: WIRE outside of a section", number);
                return;
            }
        };
        if !circuit.add_connection(source, output, dest, input) {
            warn!("line {}: invalid connection {}:{} -> {}:{}", number, source, output, dest, input);
            return;
        }
        if let Some(points) = circuit
            .wire_mut(source.output(output))
            .and_then(|w| w.waypoints_mut(dest.input(input)))
        {
            *points = waypoints;
        }
    }
}

fn parse_waypoints(text: &str) -> Option<Vec<(i32, i32)>> {
    text.split_whitespace()
        .map(|point| {
            let (x, y) = point.split_once(',')?;
            Some((i32::from_str(x).ok()?, i32::from_str(y).ok()?))
        })
        .collect()
}

/// Parses `data`, returning the main circuit and the chips defined along it.
///
/// A file without a version line is read as the current version.
///
/// # Example
/// ```
/// # use logik::storage::{load_from_str, LoadError};
/// let loaded = load_from_str(
///     "LOGIK_VERSION 3
///      SECTION MAIN
///      COMP SWITCH 0 0 0 0 \"enable\"
///      COMP TRANSISTOR 1 0 0 0
///      COMP LIGHT 2 40 0 0
///      WIRE 0:0 2:0
///      WIRE 0:0 1:0",
/// )
/// .unwrap();
/// // The unknown kind and the wire to it were skipped.
/// assert_eq!(loaded.circuit.len(), 2);
/// assert_eq!(loaded.circuit.wires().count(), 1);
///
/// assert!(matches!(
///     load_from_str("LOGIK_VERSION 4"),
///     Err(LoadError::UnsupportedVersion { found: 4 })
/// ));
/// ```
pub fn load_from_str(data: &str) -> Result<Loaded, LoadError> {
    let mut loader = Loader {
        version: CURRENT_VERSION,
        main: Circuit::new(),
        library: ChipLibrary::new(),
        section: None,
        ids: HashMap::new(),
    };
    for (i, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        loader.line(i + 1, line)?;
    }
    if let Some(Section::Def { name, .. }) = &loader.section {
        warn!("chip {:?} has no ENDDEF, dropping it", name);
    }
    debug!(
        "loaded {} components and {} chips",
        loader.main.len(),
        loader.library.len()
    );
    Ok(Loaded {
        circuit: loader.main,
        library: loader.library,
    })
}
