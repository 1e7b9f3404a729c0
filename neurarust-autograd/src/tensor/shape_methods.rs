// src/tensor/shape_methods.rs

use super::{Element, Tensor};
use crate::error::NeuraRustError;

impl<T: Element> Tensor<T> {
    /// Number of elements in one slice along the leading axis.
    fn leading_stride(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    /// Splits the tensor into `sections` equally sized tensors along the leading axis.
    ///
    /// # Errors
    /// Returns `NeuraRustError::SliceError` if the tensor is rank 0, if `sections` is zero,
    /// or if the leading dimension is not divisible by `sections`.
    pub fn split_leading(&self, sections: usize) -> Result<Vec<Tensor<T>>, NeuraRustError> {
        let leading = match self.shape.first() {
            Some(&dim) => dim,
            None => {
                return Err(NeuraRustError::SliceError {
                    message: "cannot split a rank-0 tensor".to_string(),
                })
            }
        };
        if sections == 0 || leading % sections != 0 {
            return Err(NeuraRustError::SliceError {
                message: format!(
                    "leading dimension {} cannot be split into {} equal sections",
                    leading, sections
                ),
            });
        }

        let rows = leading / sections;
        let chunk = rows * self.leading_stride();
        let mut part_shape = self.shape.clone();
        part_shape[0] = rows;

        Ok((0..sections)
            .map(|i| Tensor {
                data: self.data[i * chunk..(i + 1) * chunk].to_vec(),
                shape: part_shape.clone(),
            })
            .collect())
    }

    /// Concatenates tensors along the leading axis.
    ///
    /// All parts must share the same trailing dimensions.
    pub fn concat_leading(parts: &[&Tensor<T>]) -> Result<Tensor<T>, NeuraRustError> {
        let first = parts.first().ok_or(NeuraRustError::EmptyTensorList)?;
        if first.shape.is_empty() {
            return Err(NeuraRustError::SliceError {
                message: "cannot concatenate rank-0 tensors".to_string(),
            });
        }
        let trailing = &first.shape[1..];

        let mut leading = 0;
        let mut data = Vec::with_capacity(parts.iter().map(|p| p.numel()).sum());
        for part in parts {
            if part.shape.is_empty() || &part.shape[1..] != trailing {
                return Err(NeuraRustError::ShapeMismatch {
                    expected: first.shape.clone(),
                    actual: part.shape.clone(),
                    operation: "concat_leading".to_string(),
                });
            }
            leading += part.shape[0];
            data.extend_from_slice(&part.data);
        }

        let mut shape = first.shape.clone();
        shape[0] = leading;
        Ok(Tensor { data, shape })
    }

    /// Picks elements by flat (row-major) index. The result has shape `[indices.len()]`.
    pub fn gather(&self, indices: &[usize]) -> Result<Tensor<T>, NeuraRustError> {
        let data = indices
            .iter()
            .map(|&index| {
                self.data
                    .get(index)
                    .copied()
                    .ok_or(NeuraRustError::IndexOutOfBounds {
                        index,
                        len: self.data.len(),
                    })
            })
            .collect::<Result<Vec<T>, NeuraRustError>>()?;
        Ok(Tensor {
            shape: vec![data.len()],
            data,
        })
    }

    /// Inverse of [`Tensor::gather`]: builds a zero tensor of `shape` and adds
    /// `values[i]` at flat position `indices[i]`. Repeated indices accumulate.
    pub fn scatter_add(
        shape: &[usize],
        indices: &[usize],
        values: &Tensor<T>,
    ) -> Result<Tensor<T>, NeuraRustError> {
        if values.numel() != indices.len() {
            return Err(NeuraRustError::ShapeMismatch {
                expected: vec![indices.len()],
                actual: values.shape.clone(),
                operation: "scatter_add".to_string(),
            });
        }
        let mut out = Tensor::filled(shape, T::zero());
        let len = out.data.len();
        for (&index, &value) in indices.iter().zip(values.data.iter()) {
            let slot = out
                .data
                .get_mut(index)
                .ok_or(NeuraRustError::IndexOutOfBounds { index, len })?;
            *slot = *slot + value;
        }
        Ok(out)
    }
}
