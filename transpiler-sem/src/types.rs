//! The five declarable variable types, and the broader structural
//! `Kind` used while classifying arbitrary expressions (adds `Any` for
//! call results, which are compatible with every expected type).

use std::fmt;

use transpiler_symbols::terminals;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Integer,
    Real,
    Boolean,
    Char,
    String,
}

impl VarType {
    /// Maps the terminal held by a `Type` node's single child to the
    /// type it denotes. `None` if the terminal isn't one of the five
    /// type keywords (callers only ever pass a `Type` leaf, so this
    /// should not occur in practice).
    pub fn from_terminal(terminal: u32) -> Option<Self> {
        match terminal {
            t if t == terminals::T_INTEGER => Some(VarType::Integer),
            t if t == terminals::T_REAL => Some(VarType::Real),
            t if t == terminals::T_BOOLEAN => Some(VarType::Boolean),
            t if t == terminals::T_CHAR => Some(VarType::Char),
            t if t == terminals::T_STRING => Some(VarType::String),
            _ => None,
        }
    }

    pub fn to_kind(self) -> Kind {
        match self {
            VarType::Integer => Kind::Integer,
            VarType::Real => Kind::Real,
            VarType::Boolean => Kind::Boolean,
            VarType::Char => Kind::Char,
            VarType::String => Kind::String,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarType::Integer => "integer",
            VarType::Real => "real",
            VarType::Boolean => "boolean",
            VarType::Char => "char",
            VarType::String => "string",
        };
        write!(f, "{name}")
    }
}

/// The structural classification assigned to an arbitrary expression
/// while validating boolean conditions and comparison operands. `Any`
/// stands for a call result, which is compatible with any expected
/// `VarType` and comparable against any other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Any,
}

impl Kind {
    fn family(self) -> Option<u8> {
        match self {
            Kind::Integer | Kind::Real => Some(0),
            Kind::Boolean => Some(1),
            Kind::Char | Kind::String => Some(2),
            Kind::Any => None,
        }
    }

    /// Whether two kinds may stand on either side of a comparison:
    /// numbers with numbers, strings with strings, booleans with
    /// booleans; `Any` (a call result) compares against anything.
    pub fn comparable_with(self, other: Kind) -> bool {
        match (self.family(), other.family()) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => a == b,
        }
    }

    pub fn is_boolean_compatible(self) -> bool {
        matches!(self, Kind::Boolean | Kind::Any)
    }

    pub fn is_numeric_compatible(self) -> bool {
        matches!(self, Kind::Integer | Kind::Real | Kind::Any)
    }

    pub fn is_textual_compatible(self) -> bool {
        matches!(self, Kind::Char | Kind::String | Kind::Any)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Integer => "integer",
            Kind::Real => "real",
            Kind::Boolean => "boolean",
            Kind::Char => "char",
            Kind::String => "string",
            Kind::Any => "any",
        };
        write!(f, "{name}")
    }
}
