//! Public types for tree leaf metadata and leaf value decoding.

use crate::error::Result;
use crate::rbuffer::RBuffer;

/// Numeric storage type of histogram bins and tree leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `D`: 64-bit float.
    Double,
    /// `F`: 32-bit float.
    Float,
    /// `L`: 64-bit integer.
    Long,
    /// `I`: 32-bit integer.
    Int,
    /// `S`: 16-bit integer.
    Short,
    /// `B` (leaves) or `C` (histograms): 8-bit integer.
    Byte,
    /// `O`: boolean stored in one byte.
    Bool,
    /// `C` leaf: character string, read byte-wise.
    CString,
}

impl ContentType {
    /// Size in bytes of one element on disk.
    pub fn byte_width(self) -> usize {
        match self {
            ContentType::Double | ContentType::Long => 8,
            ContentType::Float | ContentType::Int => 4,
            ContentType::Short => 2,
            ContentType::Byte | ContentType::Bool | ContentType::CString => 1,
        }
    }

    /// Content type named by the last letter of a `TH1?` class.
    pub fn from_histogram_suffix(c: u8) -> Option<Self> {
        match c {
            b'D' => Some(ContentType::Double),
            b'F' => Some(ContentType::Float),
            b'I' => Some(ContentType::Int),
            b'S' => Some(ContentType::Short),
            b'C' => Some(ContentType::Byte),
            _ => None,
        }
    }

    /// Content type named by the last letter of a `TLeaf?` class.
    pub fn from_leaf_suffix(c: u8) -> Option<Self> {
        match c {
            b'D' => Some(ContentType::Double),
            b'F' => Some(ContentType::Float),
            b'L' => Some(ContentType::Long),
            b'I' => Some(ContentType::Int),
            b'S' => Some(ContentType::Short),
            b'B' => Some(ContentType::Byte),
            b'O' => Some(ContentType::Bool),
            b'C' => Some(ContentType::CString),
            _ => None,
        }
    }

    /// Read one element of this type and convert it to `T`.
    pub(crate) fn read_value<T: LeafValue>(self, r: &mut RBuffer, signed: bool) -> Result<T> {
        Ok(match (self, signed) {
            (ContentType::Double, _) => T::from_f64(r.read::<f64>()?),
            (ContentType::Float, _) => T::from_f64(r.read::<f32>()? as f64),
            (ContentType::Long, true) => T::from_i64(r.read::<i64>()?),
            (ContentType::Long, false) => T::from_u64(r.read::<u64>()?),
            (ContentType::Int, true) => T::from_i64(r.read::<i32>()? as i64),
            (ContentType::Int, false) => T::from_u64(r.read::<u32>()? as u64),
            (ContentType::Short, true) => T::from_i64(r.read::<i16>()? as i64),
            (ContentType::Short, false) => T::from_u64(r.read::<u16>()? as u64),
            (ContentType::Byte, true) | (ContentType::CString, _) => {
                T::from_i64(r.read::<i8>()? as i64)
            }
            (ContentType::Byte, false) => T::from_u64(r.read::<u8>()? as u64),
            (ContentType::Bool, _) => T::from_u64(r.read_bool()? as u64),
        })
    }
}

/// Metadata of one tree leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafInfo {
    /// Branch holding the leaf.
    pub branch: String,
    /// Leaf name; equals the branch name for simple leaves.
    pub leaf: String,
    /// Storage type.
    pub content_type: ContentType,
    /// Whether integer values are signed.
    pub signed: bool,
    /// Number of elements per entry (>1 for fixed-size arrays).
    pub elements: usize,
}

/// A numeric type leaf values can be converted to.
///
/// Conversions follow numeric `as` casts, so narrowing truncates and
/// float-to-int saturates.
pub trait LeafValue: Copy {
    /// Convert from a floating-point leaf.
    fn from_f64(v: f64) -> Self;
    /// Convert from a signed integer leaf.
    fn from_i64(v: i64) -> Self;
    /// Convert from an unsigned integer or boolean leaf.
    fn from_u64(v: u64) -> Self;
}

macro_rules! impl_leaf_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl LeafValue for $t {
                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $t
                }
                #[inline]
                fn from_i64(v: i64) -> Self {
                    v as $t
                }
                #[inline]
                fn from_u64(v: u64) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_leaf_value!(f64, f32, i64, u64, i32, u32, i16, u16, i8, u8, isize, usize);
