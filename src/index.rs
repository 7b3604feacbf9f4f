//! Index expressions used for selecting a region of a variable.
//!
//! A read takes one [`IndexExpr`] per dimension, in the user-visible
//! (row-major) dimension order. Expressions follow NumPy semantics: negative
//! values count from the end of the dimension, open slice bounds default to
//! the dimension boundaries and out-of-range slice bounds are clamped.
//! Resolution against a variable shape produces a [`Selection`] which can be
//! reversed into the engine's native (column-major) order.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use anyhow::Result;
use itertools::izip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An index expression for a single dimension.
///
/// This type has many ways to be constructed:
/// ```rust
/// # use bpsel::index::IndexExpr;
/// fn take_expr(e: impl Into<IndexExpr>) {}
/// take_expr(3);
/// take_expr(-1);
/// take_expr(..);
/// take_expr(..5);
/// take_expr(3..);
/// take_expr(3..74);
/// take_expr(3..=74);
/// // Negative bounds count from the end
/// take_expr(-10..-2);
/// ```
pub enum IndexExpr {
    /// A single index. Selecting a single index removes ("squeezes") the
    /// dimension from the result.
    Index(isize),
    /// A half-open range. Only unit steps can be resolved; non-unit steps are
    /// rejected by [`Indices::resolve`].
    Slice {
        /// Start of slice, or the start of the dimension.
        start: Option<isize>,
        /// End of slice (exclusive), or the end of the dimension.
        stop: Option<isize>,
        /// Step between elements.
        step: isize,
    },
}

impl IndexExpr {
    /// The full dimension.
    pub fn full() -> IndexExpr {
        IndexExpr::Slice {
            start: None,
            stop: None,
            step: 1,
        }
    }
}

macro_rules! impl_for_ref {
    ($from: ty : $item: ty) => {
        impl From<&$from> for $item {
            fn from(e: &$from) -> Self {
                Self::from(e.clone())
            }
        }
    };
}

macro_rules! impl_expr_for_int {
    ($t: ty) => {
        impl From<$t> for IndexExpr {
            fn from(idx: $t) -> Self {
                Self::Index(idx as isize)
            }
        }
        impl_for_ref!($t: IndexExpr);

        impl From<Range<$t>> for IndexExpr {
            fn from(range: Range<$t>) -> Self {
                Self::Slice {
                    start: Some(range.start as isize),
                    stop: Some(range.end as isize),
                    step: 1,
                }
            }
        }
        impl_for_ref!(Range<$t> : IndexExpr);

        impl From<RangeFrom<$t>> for IndexExpr {
            fn from(range: RangeFrom<$t>) -> Self {
                Self::Slice {
                    start: Some(range.start as isize),
                    stop: None,
                    step: 1,
                }
            }
        }
        impl_for_ref!(RangeFrom<$t> : IndexExpr);

        impl From<RangeTo<$t>> for IndexExpr {
            fn from(range: RangeTo<$t>) -> Self {
                Self::Slice {
                    start: None,
                    stop: Some(range.end as isize),
                    step: 1,
                }
            }
        }
        impl_for_ref!(RangeTo<$t> : IndexExpr);

        impl From<RangeInclusive<$t>> for IndexExpr {
            fn from(range: RangeInclusive<$t>) -> Self {
                Self::Slice {
                    start: Some(*range.start() as isize),
                    stop: Some(*range.end() as isize + 1),
                    step: 1,
                }
            }
        }
        impl_for_ref!(RangeInclusive<$t> : IndexExpr);

        impl From<RangeToInclusive<$t>> for IndexExpr {
            fn from(range: RangeToInclusive<$t>) -> Self {
                Self::Slice {
                    start: None,
                    stop: Some(range.end as isize + 1),
                    step: 1,
                }
            }
        }
        impl_for_ref!(RangeToInclusive<$t> : IndexExpr);
    };
}

impl_expr_for_int!(isize);
impl_expr_for_int!(i32);
impl_expr_for_int!(usize);

impl From<RangeFull> for IndexExpr {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}
impl_for_ref!(RangeFull: IndexExpr);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One index expression per dimension of a variable.
///
/// This type can be constructed in many ways:
/// ```rust
/// # use bpsel::index::{IndexExpr, Indices};
/// fn take_indices(i: impl TryInto<Indices>) {}
/// // One expression per dimension, exactly matching the variable rank
/// take_indices((.., ..));
/// take_indices((0, 1..5));
/// take_indices((-1, .., 3..));
/// // Arrays and vecs of a homogeneous expression type
/// take_indices([1, 2]);
/// take_indices(vec![1..5, 2..6]);
/// take_indices([IndexExpr::full(), IndexExpr::Index(0)]);
/// // The `ndarray::s!` macro can also be used
/// take_indices(ndarray::s![3, 5..]);
/// ```
pub struct Indices(pub Vec<IndexExpr>);

impl From<()> for Indices {
    fn from(_: ()) -> Self {
        Self(vec![])
    }
}

impl<T: Into<IndexExpr>> From<Vec<T>> for Indices {
    fn from(exprs: Vec<T>) -> Self {
        Self(exprs.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<IndexExpr> + Clone> From<&'_ [T]> for Indices {
    fn from(exprs: &[T]) -> Self {
        Self(exprs.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<IndexExpr>, const N: usize> From<[T; N]> for Indices {
    fn from(exprs: [T; N]) -> Self {
        Self(exprs.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<IndexExpr> + Clone, const N: usize> From<&[T; N]> for Indices {
    fn from(exprs: &[T; N]) -> Self {
        Self::from(exprs.as_slice())
    }
}

macro_rules! impl_tuple {
    () => ();

    ($head:ident, $($tail:ident,)*) => (
        #[allow(non_snake_case)]
        impl<$head, $($tail,)*> From<($head, $($tail,)*)> for Indices
            where
                $head: Into<IndexExpr>,
                $(
                    $tail: Into<IndexExpr>,
                )*
        {
            fn from(exprs: ($head, $($tail,)*)) -> Self {
                let ($head, $($tail,)*) = exprs;
                Self(vec![($head).into(), $(($tail).into(),)*])
            }
        }

        impl_tuple! { $($tail,)* }
    )
}

impl_tuple! { T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, }

impl From<&Self> for Indices {
    fn from(indices: &Self) -> Self {
        indices.clone()
    }
}

mod ndarray_impl {
    use super::*;
    use ndarray::{Dimension, SliceInfo, SliceInfoElem};

    impl<T, Din: Dimension, Dout: Dimension> TryFrom<&'_ SliceInfo<T, Din, Dout>> for Indices
    where
        T: AsRef<[SliceInfoElem]>,
    {
        type Error = anyhow::Error;
        fn try_from(slice: &SliceInfo<T, Din, Dout>) -> Result<Self, Self::Error> {
            let slice: &[SliceInfoElem] = slice.as_ref();

            Ok(Indices(
                slice
                    .iter()
                    .map(|&s| match s {
                        SliceInfoElem::Slice { start, end, step } => Ok(IndexExpr::Slice {
                            start: Some(start),
                            stop: end,
                            step,
                        }),
                        SliceInfoElem::Index(index) => Ok(IndexExpr::Index(index)),
                        SliceInfoElem::NewAxis => {
                            Err(anyhow!("can't add new axis in this context"))
                        }
                    })
                    .collect::<Result<Vec<IndexExpr>, Self::Error>>()?,
            ))
        }
    }

    impl<T, Din: Dimension, Dout: Dimension> TryFrom<SliceInfo<T, Din, Dout>> for Indices
    where
        T: AsRef<[SliceInfoElem]>,
    {
        type Error = anyhow::Error;
        fn try_from(slice: SliceInfo<T, Din, Dout>) -> Result<Self, Self::Error> {
            Self::try_from(&slice)
        }
    }
}

/// A resolved rectangular selection, in user-visible (row-major) dimension
/// order, together with the squeezed shape of the resulting array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    start: Vec<u64>,
    count: Vec<u64>,
    shape: Vec<usize>,
}

impl Selection {
    /// Starting index per dimension.
    pub fn start(&self) -> &[u64] {
        &self.start
    }

    /// Number of elements per dimension.
    pub fn count(&self) -> &[u64] {
        &self.count
    }

    /// Shape of the resulting array. Integer-indexed dimensions are squeezed
    /// out, so this can be shorter than `count`.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of selected elements.
    pub fn size(&self) -> usize {
        self.count.iter().product::<u64>() as usize
    }

    /// Start and count reversed into the engine's native (column-major)
    /// dimension order.
    ///
    /// Dimension order is flipped in exactly two places: here, and at the
    /// variable shape when the handle is constructed.
    pub fn to_native(&self) -> (Vec<u64>, Vec<u64>) {
        (
            self.start.iter().rev().copied().collect(),
            self.count.iter().rev().copied().collect(),
        )
    }
}

// Negative bounds count from the end, out-of-range bounds clamp to the
// dimension. Same rules as Python's `slice.indices` for unit steps.
fn clamp_bound(bound: isize, extent: u64) -> u64 {
    let bound = if bound < 0 {
        bound + extent as isize
    } else {
        bound
    };
    bound.clamp(0, extent as isize) as u64
}

impl Indices {
    /// Resolve against a variable shape into a bounded selection.
    ///
    /// One expression is required per dimension. Slices must resolve to a
    /// non-empty forward range with unit step; integer indices must fall
    /// within the dimension after negative normalization.
    pub fn resolve(&self, shape: &[u64]) -> Result<Selection, anyhow::Error> {
        ensure!(
            self.0.len() == shape.len(),
            "rank mismatch: {} index expressions for {} dimensions",
            self.0.len(),
            shape.len()
        );

        let mut start = Vec::with_capacity(shape.len());
        let mut count = Vec::with_capacity(shape.len());
        let mut out = Vec::new();

        for (d, (expr, &n)) in izip!(&self.0, shape).enumerate() {
            match *expr {
                IndexExpr::Index(idx) => {
                    let i = if idx < 0 { idx + n as isize } else { idx };
                    ensure!(
                        i >= 0 && (i as u64) < n,
                        "index {} out of bounds for dimension {} of extent {}",
                        idx,
                        d,
                        n
                    );
                    start.push(i as u64);
                    count.push(1);
                }
                IndexExpr::Slice {
                    start: a,
                    stop: b,
                    step,
                } => {
                    ensure!(
                        step == 1,
                        "strided slicing is not supported (step {} in dimension {})",
                        step,
                        d
                    );
                    let a = clamp_bound(a.unwrap_or(0), n);
                    let b = clamp_bound(b.unwrap_or(n as isize), n);
                    ensure!(
                        b > a,
                        "empty or reversed slice in dimension {}: {:?}",
                        d,
                        expr
                    );
                    start.push(a);
                    count.push(b - a);
                    out.push((b - a) as usize);
                }
            }
        }

        Ok(Selection {
            start,
            count,
            shape: out,
        })
    }
}
