use super::circuit::Circuit;
use super::component::Component;
use indexmap::IndexMap;
use log::debug;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;
use thiserror::Error;
use unwrap::unwrap;

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ChipError {
    #[error("chip {chip:?} uses undefined chip {missing:?}")]
    Unknown { chip: String, missing: String },
    #[error("chip {0:?} would contain itself")]
    Recursive(String),
    #[error("chip {0:?} is not defined")]
    Undefined(String),
}

/// Named circuits usable as [custom components](Component::custom).
///
/// Templates are stored with their state reset. The library never holds a chip that contains
/// itself, directly or through other chips, so instantiating a template always terminates.
///
/// # Example
/// ```
/// # use logik::circuit::{ChipLibrary, ChipError, Circuit};
/// let mut half = Circuit::new();
/// let a = half.switch("a");
/// let b = half.switch("b");
/// let sum = half.xor(&[a.output(0), b.output(0)], "sum");
/// let carry = half.and(&[a.output(0), b.output(0)], "carry");
/// half.output_probe(sum.output(0), "s");
/// half.output_probe(carry.output(0), "c");
///
/// let mut library = ChipLibrary::new();
/// library.define("half adder", half).unwrap();
///
/// let chip = library.component("half adder").unwrap();
/// assert_eq!(chip.input_count(), 2);
/// assert_eq!(chip.output_count(), 2);
///
/// // A chip can't be made of itself.
/// let mut outer = Circuit::new();
/// outer.add_component(chip);
/// assert_eq!(
///     library.define("half adder", outer),
///     Err(ChipError::Recursive("half adder".to_string()))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChipLibrary {
    templates: IndexMap<String, Circuit>,
}

impl ChipLibrary {
    /// Returns an empty [ChipLibrary].
    pub fn new() -> Self {
        Default::default()
    }

    /// Stores `circuit` as the template of chip `name`, replacing any previous definition.
    ///
    /// Fails if `circuit` uses a chip that isn't defined or if the definition would make
    /// any chip contain itself. Nothing changes on failure.
    pub fn define<S: Into<String>>(&mut self, name: S, mut circuit: Circuit) -> Result<(), ChipError> {
        let name = name.into();
        let dependencies = circuit.chip_dependencies();
        for dependency in &dependencies {
            if *dependency == name {
                return Err(ChipError::Recursive(name));
            }
            if !self.templates.contains_key(dependency) {
                return Err(ChipError::Unknown {
                    chip: name,
                    missing: dependency.clone(),
                });
            }
        }

        let cyclic = {
            let mut graph = self.graph_without(Some(&name));
            graph.add_node(name.as_str());
            for dependency in &dependencies {
                graph.add_edge(dependency.as_str(), name.as_str(), ());
            }
            is_cyclic_directed(&graph)
        };
        if cyclic {
            return Err(ChipError::Recursive(name));
        }

        circuit.reset_state();
        debug!("defined chip {:?} with {} components", name, circuit.len());
        self.templates.insert(name, circuit);
        Ok(())
    }

    /// Dependency graph of every template but `skip`, edges go from a chip to the chips using it.
    fn graph_without<'a>(&'a self, skip: Option<&str>) -> DiGraphMap<&'a str, ()> {
        let mut graph = DiGraphMap::new();
        for (name, template) in &self.templates {
            if Some(name.as_str()) == skip {
                continue;
            }
            graph.add_node(name.as_str());
            for (_, component) in template.components() {
                if let Some(chip) = component.chip() {
                    graph.add_edge(chip.name(), name.as_str(), ());
                }
            }
        }
        graph
    }

    /// Returns the template of chip `name`.
    pub fn get(&self, name: &str) -> Option<&Circuit> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Returns a new unbound custom component for chip `name`.
    pub fn component(&self, name: &str) -> Option<Component> {
        Some(Component::custom(name, self.get(name)?))
    }

    /// Returns every template in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Circuit)> {
        self.templates.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Returns the names of every template, each after the chips it uses.
    pub fn dependency_order(&self) -> Vec<&str> {
        let graph = self.graph_without(None);
        let order = unwrap!(toposort(&graph, None).ok(), "chip library holds a cycle");
        // Nodes only appear in edges for chips that are defined, filter just in case.
        order.into_iter().filter(|name| self.contains(name)).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough() -> Circuit {
        let mut c = Circuit::new();
        let a = c.switch("a");
        c.output_probe(a.output(0), "out");
        c
    }

    fn using(chips: &[&str], library: &ChipLibrary) -> Circuit {
        let mut c = Circuit::new();
        for chip in chips {
            c.add_component(library.component(chip).unwrap());
        }
        c
    }

    #[test]
    fn test_unknown_dependency() {
        let mut library = ChipLibrary::new();
        let mut other = ChipLibrary::new();
        other.define("wire", passthrough()).unwrap();
        let c = using(&["wire"], &other);
        assert_eq!(
            library.define("outer", c),
            Err(ChipError::Unknown {
                chip: "outer".to_string(),
                missing: "wire".to_string()
            })
        );
        assert!(library.is_empty());
    }

    #[test]
    fn test_transitive_recursion_is_rejected() {
        let mut library = ChipLibrary::new();
        library.define("a", passthrough()).unwrap();
        library.define("b", using(&["a"], &library)).unwrap();
        library.define("c", using(&["b"], &library)).unwrap();

        // Redefining a in terms of c closes the loop a -> c -> b -> a.
        let loop_back = using(&["c"], &library);
        assert_eq!(
            library.define("a", loop_back),
            Err(ChipError::Recursive("a".to_string()))
        );
        // The old definition survives.
        assert_eq!(library.get("a").unwrap().len(), 2);
    }

    #[test]
    fn test_redefinition_without_cycle() {
        let mut library = ChipLibrary::new();
        library.define("a", passthrough()).unwrap();
        library.define("b", using(&["a"], &library)).unwrap();
        library.define("b", using(&["a", "a"], &library)).unwrap();
        assert_eq!(library.get("b").unwrap().len(), 2);
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn test_dependency_order() {
        let mut library = ChipLibrary::new();
        library.define("leaf", passthrough()).unwrap();
        library.define("mid", using(&["leaf"], &library)).unwrap();
        library.define("other", passthrough()).unwrap();
        library.define("top", using(&["mid", "other", "leaf"], &library)).unwrap();
        // Redefine the leaf last so definition order differs from dependency order.
        library.define("leaf", passthrough()).unwrap();

        let order = library.dependency_order();
        assert_eq!(order.len(), 4);
        let position = |name| order.iter().position(|n| *n == name).unwrap();
        assert!(position("leaf") < position("mid"));
        assert!(position("mid") < position("top"));
        assert!(position("other") < position("top"));
    }

    #[test]
    fn test_component_pins_mirror_template() {
        let mut library = ChipLibrary::new();
        library.define("wire", passthrough()).unwrap();
        let chip = library.component("wire").unwrap();
        assert_eq!(chip.name(), "wire");
        assert_eq!(chip.chip().unwrap().name(), "wire");
        assert!(chip.chip().unwrap().instance().is_none());
        assert_eq!((chip.input_count(), chip.output_count()), (1, 1));
        assert!(library.component("missing").is_none());
    }
}
