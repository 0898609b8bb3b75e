//! Dense row-major tensors with explicit shape metadata.
//!
//! [`Tensor`] is the only numeric container in the pipeline: raw ego
//! history is `[frames, 7]`, timestamps are `[frames]`, each detection
//! snapshot is `[agents, 8]`, and the assembled agents feature is
//! `[frames, agents, 8]`. Data is `f64` throughout; absolute map
//! coordinates lose centimetres in `f32`. Model-facing output is
//! exported with [`Tensor::to_f32_vec`].

use smallvec::SmallVec;
use trackfeat_core::FeatureError;

/// Tensor shape. Rank is at most 3 in this pipeline.
pub type Shape = SmallVec<[usize; 4]>;

/// Element count of `shape`, or `None` if it overflows `usize`.
fn checked_numel(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// A dense `f64` tensor stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f64>,
}

impl Tensor {
    /// Wrap `data` with `shape`, checking the element count.
    pub fn new(shape: &[usize], data: Vec<f64>) -> Result<Self, FeatureError> {
        let expected = checked_numel(shape).ok_or_else(|| FeatureError::ShapeMismatch {
            reason: format!("shape {shape:?} overflows usize"),
        })?;
        if expected != data.len() {
            return Err(FeatureError::ShapeMismatch {
                reason: format!(
                    "shape {shape:?} holds {expected} elements, got {}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            shape: SmallVec::from_slice(shape),
            data,
        })
    }

    /// Wrap data whose length the caller has already sized to `shape`.
    pub(crate) fn from_parts(shape: &[usize], data: Vec<f64>) -> Self {
        debug_assert_eq!(checked_numel(shape), Some(data.len()));
        Self {
            shape: SmallVec::from_slice(shape),
            data,
        }
    }

    /// An all-zero tensor.
    ///
    /// # Panics
    ///
    /// Panics if the element count of `shape` overflows `usize`.
    pub fn zeros(shape: &[usize]) -> Self {
        let len = match checked_numel(shape) {
            Some(len) => len,
            None => panic!("shape {shape:?} overflows usize"),
        };
        Self {
            shape: SmallVec::from_slice(shape),
            data: vec![0.0; len],
        }
    }

    /// Build a `[rows.len(), width]` tensor from equal-width rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], width: usize) -> Result<Self, FeatureError> {
        let mut data = Vec::with_capacity(rows.len().saturating_mul(width));
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(FeatureError::ShapeMismatch {
                    reason: format!("row {i} has width {}, expected {width}", row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            shape: SmallVec::from_slice(&[rows.len(), width]),
            data,
        })
    }

    /// Stack equal-shape tensors along a new leading axis.
    ///
    /// `parts` must be non-empty so the trailing shape is known.
    pub fn stack(parts: &[Tensor]) -> Result<Self, FeatureError> {
        let first = parts.first().ok_or_else(|| FeatureError::ShapeMismatch {
            reason: "cannot stack zero tensors".into(),
        })?;
        let mut shape: Shape = SmallVec::with_capacity(first.rank() + 1);
        shape.push(parts.len());
        shape.extend_from_slice(first.shape());

        let mut data = Vec::with_capacity(parts.len().saturating_mul(first.numel()));
        for (i, part) in parts.iter().enumerate() {
            if part.shape != first.shape {
                return Err(FeatureError::ShapeMismatch {
                    reason: format!(
                        "stack part {i} has shape {:?}, expected {:?}",
                        part.shape, first.shape
                    ),
                });
            }
            data.extend_from_slice(&part.data);
        }
        Ok(Self { shape, data })
    }

    /// Shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Size of axis `axis`, or 0 if the tensor has fewer axes.
    pub fn dim(&self, axis: usize) -> usize {
        self.shape.get(axis).copied().unwrap_or(0)
    }

    /// Total element count.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Flat row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Elements per step of the leading axis.
    fn leading_stride(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    /// Number of rows (size of the leading axis).
    pub fn nrows(&self) -> usize {
        self.dim(0)
    }

    /// Slice of the `i`-th step along the leading axis.
    ///
    /// For a rank-2 tensor this is row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= nrows()`.
    pub fn row(&self, i: usize) -> &[f64] {
        let stride = self.leading_stride();
        &self.data[i * stride..(i + 1) * stride]
    }

    /// Mutable slice of the `i`-th step along the leading axis.
    ///
    /// # Panics
    ///
    /// Panics if `i >= nrows()`.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        let stride = self.leading_stride();
        &mut self.data[i * stride..(i + 1) * stride]
    }

    /// Iterate over steps of the leading axis.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        let stride = self.leading_stride();
        (0..self.nrows()).map(move |i| &self.data[i * stride..(i + 1) * stride])
    }

    /// Element at a full multi-index, or `None` if out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.rank() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, &d) in index.iter().zip(self.shape.iter()) {
            if i >= d {
                return None;
            }
            flat = flat * d + i;
        }
        self.data.get(flat).copied()
    }

    /// Copy with the leading axis reversed.
    pub fn reversed_leading(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for i in (0..self.nrows()).rev() {
            data.extend_from_slice(self.row(i));
        }
        Self {
            shape: self.shape.clone(),
            data,
        }
    }

    /// Flat `f32` copy of the data.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32).collect()
    }
}
