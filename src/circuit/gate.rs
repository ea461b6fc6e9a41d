use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Most inputs a variadic gate can grow to.
pub const MAX_INPUTS: usize = 64;

/// Stable tag of every concrete component variant.
///
/// The string form is the keyword used by the persisted format, see [crate::storage].
///
/// # Example
/// ```
/// # use logik::circuit::ComponentKind;
/// # use std::str::FromStr;
/// assert_eq!(ComponentKind::DFlipFlop.as_ref(), "D_FF");
/// assert_eq!(ComponentKind::from_str("LIGHT"), Ok(ComponentKind::OutputProbe));
/// assert!(ComponentKind::from_str("TRANSISTOR").is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, AsRefStr, Display, EnumString, EnumIter)]
pub enum ComponentKind {
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "OR")]
    Or,
    #[strum(serialize = "NAND")]
    Nand,
    #[strum(serialize = "NOR")]
    Nor,
    #[strum(serialize = "XOR")]
    Xor,
    #[strum(serialize = "NOT")]
    Not,
    #[strum(serialize = "BUFFER")]
    Buffer,
    #[strum(serialize = "SWITCH")]
    Switch,
    #[strum(serialize = "LIGHT")]
    OutputProbe,
    #[strum(serialize = "SEVEN_SEG")]
    SevenSegment,
    #[strum(serialize = "HEX")]
    HexDisplay,
    #[strum(serialize = "CLOCK")]
    Clock,
    #[strum(serialize = "D_FF")]
    DFlipFlop,
    #[strum(serialize = "JK_FF")]
    JkFlipFlop,
    #[strum(serialize = "T_FF")]
    TFlipFlop,
    #[strum(serialize = "CUSTOM")]
    Custom,
}

use ComponentKind::*;
impl ComponentKind {
    /// Name given to fresh instances, custom components are named after their chip instead.
    pub fn default_name(&self) -> &'static str {
        match self {
            And => "AND",
            Or => "OR",
            Nand => "NAND",
            Nor => "NOR",
            Xor => "XOR",
            Not => "NOT",
            Buffer => "BUF",
            Switch => "SW",
            OutputProbe => "OUT",
            SevenSegment => "7Seg",
            HexDisplay => "Hex",
            Clock => "CLK",
            DFlipFlop => "D-FF",
            JkFlipFlop => "JK-FF",
            TFlipFlop => "T-FF",
            Custom => "CHIP",
        }
    }

    /// Returns the [GateType] if `self` is a combinational gate.
    pub fn gate_type(&self) -> Option<GateType> {
        Some(match self {
            And => GateType::And,
            Or => GateType::Or,
            Nand => GateType::Nand,
            Nor => GateType::Nor,
            Xor => GateType::Xor,
            Not => GateType::Not,
            Buffer => GateType::Buffer,
            _ => return None,
        })
    }

    /// Returns true for components that only consume signals.
    pub fn is_sink(&self) -> bool {
        matches!(self, OutputProbe | SevenSegment | HexDisplay)
    }
}

/// Combinational gate types.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GateType {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Not,
    Buffer,
}

impl GateType {
    /// Folds one more input into the accumulated state.
    /// Keep in mind if the gate [is negated](GateType::is_negated) the result should be negated.
    ///
    /// # Panics
    ///
    /// Panics if `self` is Not or Buffer because those gate types only have one input.
    #[inline(always)]
    pub fn accumulate(&self, acc: bool, b: bool) -> bool {
        match self {
            GateType::Or | GateType::Nor => acc | b,
            GateType::And | GateType::Nand => acc & b,
            GateType::Xor => acc ^ b,
            GateType::Not | GateType::Buffer => {
                unreachable!("Accumulate only works on gates with multiple inputs")
            }
        }
    }

    /// Returns the value that starts the [accumulation](GateType::accumulate),
    /// in other words the value that doesn't affect the result.
    #[inline(always)]
    pub fn init(&self) -> bool {
        match self {
            GateType::Or | GateType::Nor | GateType::Xor => false,
            GateType::And | GateType::Nand => true,
            GateType::Not | GateType::Buffer => false,
        }
    }

    /// Returns true if `self` is Not, Nor or Nand.
    pub fn is_negated(&self) -> bool {
        matches!(self, GateType::Not | GateType::Nor | GateType::Nand)
    }

    /// Returns true if the gate accepts a variable number of inputs, up to [MAX_INPUTS].
    pub fn is_variadic(&self) -> bool {
        !matches!(self, GateType::Not | GateType::Buffer)
    }

    /// Number of inputs of a freshly placed gate.
    pub fn default_inputs(&self) -> usize {
        if self.is_variadic() {
            2
        } else {
            1
        }
    }

    /// Computes the output of the gate for `inputs`.
    ///
    /// Not and Buffer only look at the first input, missing inputs read as false.
    ///
    /// # Example
    /// ```
    /// # use logik::circuit::GateType;
    /// assert_eq!(GateType::Nand.evaluate(&[true, true]), false);
    /// assert_eq!(GateType::Xor.evaluate(&[true, true, true]), true);
    /// assert_eq!(GateType::Not.evaluate(&[]), true);
    /// ```
    pub fn evaluate(&self, inputs: &[bool]) -> bool {
        let state = match self {
            GateType::Not | GateType::Buffer => inputs.first().copied().unwrap_or(false),
            _ => inputs
                .iter()
                .fold(self.init(), |acc, b| self.accumulate(acc, *b)),
        };
        state ^ self.is_negated()
    }

    /// Returns the [ComponentKind] tag of the gate.
    pub fn kind(&self) -> ComponentKind {
        match self {
            GateType::And => And,
            GateType::Or => Or,
            GateType::Nand => Nand,
            GateType::Nor => Nor,
            GateType::Xor => Xor,
            GateType::Not => Not,
            GateType::Buffer => Buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_two_input_truth_tables() {
        let table = [(false, false), (false, true), (true, false), (true, true)];
        for (a, b) in table.iter().copied() {
            let inputs = [a, b];
            assert_eq!(GateType::And.evaluate(&inputs), a && b);
            assert_eq!(GateType::Or.evaluate(&inputs), a || b);
            assert_eq!(GateType::Nand.evaluate(&inputs), !(a && b));
            assert_eq!(GateType::Nor.evaluate(&inputs), !(a || b));
            assert_eq!(GateType::Xor.evaluate(&inputs), a != b);
        }
    }

    #[test]
    fn test_single_input_truth_tables() {
        for a in [false, true].iter().copied() {
            assert_eq!(GateType::Not.evaluate(&[a]), !a);
            assert_eq!(GateType::Buffer.evaluate(&[a]), a);
        }
    }

    #[test]
    fn test_kind_keywords_are_stable() {
        for kind in ComponentKind::iter() {
            assert_eq!(ComponentKind::from_str(kind.as_ref()), Ok(kind));
        }
        assert_eq!(ComponentKind::Buffer.to_string(), "BUFFER");
        assert_eq!(ComponentKind::SevenSegment.to_string(), "SEVEN_SEG");
    }

    #[test]
    fn test_gate_kind_round_trip() {
        for kind in ComponentKind::iter() {
            if let Some(gate) = kind.gate_type() {
                assert_eq!(gate.kind(), kind);
            }
        }
        assert_eq!(ComponentKind::Switch.gate_type(), None);
    }

    #[test]
    fn test_variadic_gates() {
        for width in 0..10 {
            for bits in 0u32..(1 << width) {
                let inputs: Vec<bool> = (0..width).map(|i| bits & (1 << i) != 0).collect();
                let all = bits == (1 << width) - 1;
                let any = bits != 0;
                let odd = bits.count_ones() % 2 == 1;

                assert_eq!(GateType::And.evaluate(&inputs), all, "{:?}", inputs);
                assert_eq!(GateType::Nand.evaluate(&inputs), !all, "{:?}", inputs);
                assert_eq!(GateType::Or.evaluate(&inputs), any, "{:?}", inputs);
                assert_eq!(GateType::Nor.evaluate(&inputs), !any, "{:?}", inputs);
                assert_eq!(GateType::Xor.evaluate(&inputs), odd, "{:?}", inputs);
            }
        }
    }
}
