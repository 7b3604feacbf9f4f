//! Element types of variables.

use serde::{Deserialize, Serialize};

/// Element type of a variable.
///
/// Only the two scalar kinds of the engine type-name table are supported;
/// any other native type name fails the lookup.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum Datatype {
    /// 4-byte IEEE float ("float").
    Float,
    /// 8-byte IEEE float ("double").
    Double,
}

impl Datatype {
    /// Size in bytes of one element.
    pub fn dsize(&self) -> usize {
        use Datatype::*;

        match self {
            Float => 4,
            Double => 8,
        }
    }

    /// Map an engine type name to a `Datatype`.
    pub fn from_type_name(name: &str) -> Result<Datatype, anyhow::Error> {
        match name {
            "float" => Ok(Datatype::Float),
            "double" => Ok(Datatype::Double),
            name => Err(anyhow!("unsupported datatype: {}", name)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Datatype::Float => "float",
            Datatype::Double => "double",
        }
    }
}

/// Scalar types a variable can be read into.
pub trait VarValue: byte_slice_cast::FromByteVec {
    const DATATYPE: Datatype;
}

impl VarValue for f32 {
    const DATATYPE: Datatype = Datatype::Float;
}

impl VarValue for f64 {
    const DATATYPE: Datatype = Datatype::Double;
}
