//! FFI type system - element families crossing the native boundary
//!
//! Defines:
//! - `ElementType`: the two element families of the native contract
//! - `NativeElement`: Rust element types usable as native buffers
//! - `ExtraParameters`: the Beta-Gamma scalar pair
//!
//! Type mapping:
//! - ElementType::IntegerCode → u32 (`unsigned int`)
//! - ElementType::Real → f64 (`double`)
//!
//! Scores are always `double`, whatever the element family.

use crate::table::{LabelColumn, TableData};
use ndarray::Array2;
use std::fmt;
use std::os::raw::{c_double, c_uint};

/// Element family of a table, label column or index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Pre-binned unsigned integer codes (C `unsigned int`)
    IntegerCode,
    /// Floating point values (C `double`), binned by the native routine
    Real,
}

impl ElementType {
    /// C spelling of the element type
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementType::IntegerCode => "c_uint",
            ElementType::Real => "c_double",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::IntegerCode => write!(f, "IntegerCode"),
            ElementType::Real => write!(f, "Real"),
        }
    }
}

/// Output index buffer, typed by the routine's return element
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    Unsigned(Vec<c_uint>),
    Real(Vec<c_double>),
}

impl IndexBuffer {
    pub fn element_type(&self) -> ElementType {
        match self {
            IndexBuffer::Unsigned(_) => ElementType::IntegerCode,
            IndexBuffer::Real(_) => ElementType::Real,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::Unsigned(v) => v.len(),
            IndexBuffer::Real(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Address of the first element, for comparison with native return values
    pub(crate) fn as_ptr(&self) -> *const () {
        match self {
            IndexBuffer::Unsigned(v) => v.as_ptr() as *const (),
            IndexBuffer::Real(v) => v.as_ptr() as *const (),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for f64 {}
}

/// Element types that can be handed to the native routines
///
/// Implemented for `u32` and `f64` only. A routine fed with elements of type
/// `T` writes its selected indices into a buffer of `T` as well.
pub trait NativeElement: sealed::Sealed + Copy + PartialEq + fmt::Debug + 'static {
    const ELEMENT: ElementType;
    const ZERO: Self;

    /// Borrow the backing array if the table holds this element type
    fn table(data: &TableData) -> Option<&Array2<Self>>;

    /// Borrow the labels if the column holds this element type
    fn labels(labels: &LabelColumn) -> Option<&[Self]>;

    fn wrap_table(array: Array2<Self>) -> TableData;

    fn wrap_labels(values: Vec<Self>) -> LabelColumn;

    fn into_index_buffer(buffer: Vec<Self>) -> IndexBuffer;
}

impl NativeElement for u32 {
    const ELEMENT: ElementType = ElementType::IntegerCode;
    const ZERO: Self = 0;

    fn table(data: &TableData) -> Option<&Array2<Self>> {
        match data {
            TableData::IntegerCode(array) => Some(array),
            TableData::Real(_) => None,
        }
    }

    fn labels(labels: &LabelColumn) -> Option<&[Self]> {
        match labels {
            LabelColumn::IntegerCode(values) => Some(values),
            LabelColumn::Real(_) => None,
        }
    }

    fn wrap_table(array: Array2<Self>) -> TableData {
        TableData::IntegerCode(array)
    }

    fn wrap_labels(values: Vec<Self>) -> LabelColumn {
        LabelColumn::IntegerCode(values)
    }

    fn into_index_buffer(buffer: Vec<Self>) -> IndexBuffer {
        IndexBuffer::Unsigned(buffer)
    }
}

impl NativeElement for f64 {
    const ELEMENT: ElementType = ElementType::Real;
    const ZERO: Self = 0.0;

    fn table(data: &TableData) -> Option<&Array2<Self>> {
        match data {
            TableData::Real(array) => Some(array),
            TableData::IntegerCode(_) => None,
        }
    }

    fn labels(labels: &LabelColumn) -> Option<&[Self]> {
        match labels {
            LabelColumn::Real(values) => Some(values),
            LabelColumn::IntegerCode(_) => None,
        }
    }

    fn wrap_table(array: Array2<Self>) -> TableData {
        TableData::Real(array)
    }

    fn wrap_labels(values: Vec<Self>) -> LabelColumn {
        LabelColumn::Real(values)
    }

    fn into_index_buffer(buffer: Vec<Self>) -> IndexBuffer {
        IndexBuffer::Real(buffer)
    }
}

/// The `beta`/`gamma` pair of the Beta-Gamma criterion space
///
/// Values are passed to the native routine verbatim. `[0, 1]` is the
/// conventional range but is not enforced here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtraParameters {
    /// Penalty on the redundancy term I(X_j;X_k)
    pub beta: f64,
    /// Weight on the conditional redundancy term I(X_j;X_k|Y)
    pub gamma: f64,
}

impl ExtraParameters {
    pub fn new(beta: f64, gamma: f64) -> Self {
        Self { beta, gamma }
    }

    /// MIFS (Battiti 1994): beta = 1, gamma = 0
    pub fn mifs() -> Self {
        Self::new(1.0, 0.0)
    }

    /// CIFE, also known as FOU (Lin & Tang 2006): beta = 1, gamma = 1
    pub fn cife() -> Self {
        Self::new(1.0, 1.0)
    }

    /// CondRed: beta = 0, gamma = 1
    pub fn cond_red() -> Self {
        Self::new(0.0, 1.0)
    }
}
