//! Host array element type codes.
//!
//! The embedding interpreter tags every array with one of these codes.
//! Numeric codes have a fixed binary width; string arrays exist in the host
//! but have no single binary representation.

/// Element type of a host array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    /// 8-bit unsigned byte.
    Char,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Complex number stored as two doubles.
    Complex,
    /// Host string array.
    String,
}

impl TypeCode {
    /// Bytes per element, or `None` for codes without a binary layout.
    pub fn elem_width(self) -> Option<usize> {
        match self {
            TypeCode::Char => Some(1),
            TypeCode::Short => Some(2),
            TypeCode::Int => Some(4),
            TypeCode::Long => Some(8),
            TypeCode::Float => Some(4),
            TypeCode::Double => Some(8),
            TypeCode::Complex => Some(16),
            TypeCode::String => None,
        }
    }

    /// True for codes that can appear in binary payloads.
    pub fn is_numeric(self) -> bool {
        self.elem_width().is_some()
    }

    /// Returns a human-readable name for the type code.
    pub fn name(self) -> &'static str {
        match self {
            TypeCode::Char => "char",
            TypeCode::Short => "short",
            TypeCode::Int => "int",
            TypeCode::Long => "long",
            TypeCode::Float => "float",
            TypeCode::Double => "double",
            TypeCode::Complex => "complex",
            TypeCode::String => "string",
        }
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
