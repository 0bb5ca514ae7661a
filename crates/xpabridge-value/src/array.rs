use crate::error::{Result, ValueError};
use crate::types::TypeCode;

/// A typed host array with its raw binary contents.
///
/// Numeric arrays carry `count * elem_width` bytes in native byte order;
/// string arrays carry no binary contents and fail any byte-level query.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    code: TypeCode,
    count: usize,
    data: Vec<u8>,
}

impl ArrayValue {
    fn from_raw(code: TypeCode, count: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(code.elem_width().map(|w| w * count), Some(data.len()));
        Self { code, count, data }
    }

    /// An array of unsigned bytes.
    pub fn from_bytes(elems: &[u8]) -> Self {
        Self::from_raw(TypeCode::Char, elems.len(), elems.to_vec())
    }

    /// An array of 16-bit integers.
    pub fn from_shorts(elems: &[i16]) -> Self {
        let data = elems.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self::from_raw(TypeCode::Short, elems.len(), data)
    }

    /// An array of 32-bit integers.
    pub fn from_ints(elems: &[i32]) -> Self {
        let data = elems.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self::from_raw(TypeCode::Int, elems.len(), data)
    }

    /// An array of 64-bit integers.
    pub fn from_longs(elems: &[i64]) -> Self {
        let data = elems.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self::from_raw(TypeCode::Long, elems.len(), data)
    }

    /// An array of 32-bit floats.
    pub fn from_floats(elems: &[f32]) -> Self {
        let data = elems.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self::from_raw(TypeCode::Float, elems.len(), data)
    }

    /// An array of 64-bit floats.
    pub fn from_doubles(elems: &[f64]) -> Self {
        let data = elems.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self::from_raw(TypeCode::Double, elems.len(), data)
    }

    /// An array of complex numbers, each stored as (re, im) doubles.
    pub fn from_complex(elems: &[(f64, f64)]) -> Self {
        let data = elems
            .iter()
            .flat_map(|(re, im)| {
                let mut pair = [0u8; 16];
                pair[..8].copy_from_slice(&re.to_ne_bytes());
                pair[8..].copy_from_slice(&im.to_ne_bytes());
                pair
            })
            .collect();
        Self::from_raw(TypeCode::Complex, elems.len(), data)
    }

    /// A host string array. Carries no binary contents.
    pub fn strings(count: usize) -> Self {
        Self {
            code: TypeCode::String,
            count,
            data: Vec::new(),
        }
    }

    /// A zero-filled numeric array, typically used as a scatter target.
    pub fn zeroed(code: TypeCode, count: usize) -> Result<Self> {
        let width = code.elem_width().ok_or(ValueError::Unsupported(code))?;
        Ok(Self::from_raw(code, count, vec![0u8; width * count]))
    }

    /// Element type of the array.
    pub fn code(&self) -> TypeCode {
        self.code
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Total binary size: element count times element width.
    ///
    /// Fails for array types with no binary representation.
    pub fn byte_len(&self) -> Result<usize> {
        let width = self
            .code
            .elem_width()
            .ok_or(ValueError::Unsupported(self.code))?;
        Ok(width * self.count)
    }

    /// Raw contents in native byte order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw contents, for in-place scatter.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reinterpret the raw contents as 64-bit integers.
    ///
    /// The caller chooses the view; no type-code check is performed.
    pub fn to_longs(&self) -> Vec<i64> {
        self.data
            .chunks_exact(8)
            .map(|c| i64::from_ne_bytes(c.try_into().expect("chunk is 8 bytes")))
            .collect()
    }

    /// Reinterpret the raw contents as 64-bit floats.
    pub fn to_doubles(&self) -> Vec<f64> {
        self.data
            .chunks_exact(8)
            .map(|c| f64::from_ne_bytes(c.try_into().expect("chunk is 8 bytes")))
            .collect()
    }
}
