//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

//! Host-side execution of lowered kernels.
//!
//! These functions do what the emitted C source does, reading nothing but the
//! metadata block. They let tools and tests run a lowered graph without a backend.

use crate::ErrPack;
use crate::error::LoweringError;
use crate::lower::concat::meta_names;

use super::meta::MetaBlock;

//--------------------------------------------------------------------------------------------------

fn to_index(value: i32) -> Result<usize, ErrPack<LoweringError>> {
	usize::try_from(value).map_err(|_| {
		ErrPack::with_message(
			LoweringError::MetaValueOverflow,
			format!("negative metadata value {value}"),
		)
	})
}

fn to_indexes(values: Vec<i32>) -> Result<Vec<usize>, ErrPack<LoweringError>> {
	values.into_iter().map(to_index).collect()
}

/// Runs a concat kernel over `data`.
///
/// Only decoding the metadata can fail. Out of range offsets panic, as they can only come
/// from a block that was not produced by lowering.
#[allow(clippy::indexing_slicing)]
pub fn run_concat(meta: &MetaBlock, data: &mut [f32]) -> Result<(), ErrPack<LoweringError>> {
	let y_offset = to_index(meta.scalar(meta_names::Y_OFFSET)?)?;
	let D = to_index(meta.scalar(meta_names::D)?)?;
	let N = to_index(meta.scalar(meta_names::N)?)?;
	let x_offsets = to_indexes(meta.array(meta_names::X_OFFSETS)?)?;
	let y_offsets = to_indexes(meta.array(meta_names::Y_OFFSETS)?)?;
	let x_shapes = to_indexes(meta.array(meta_names::X_SHAPES)?)?;
	let x_strides_in_y = to_indexes(meta.array(meta_names::X_STRIDES_IN_Y)?)?;

	for n in 0..N {
		let x_offset = x_offsets[n];
		let y_origin = y_offset + y_offsets[n];
		let x_shape = &x_shapes[n * D..(n + 1) * D];
		let x_stride_in_y = &x_strides_in_y[n * D..(n + 1) * D];

		let x_size: usize = x_shape.iter().product();
		for x_index in 0..x_size {
			// unrank `x_index` against `x_shape`, innermost axis first
			let mut y_index = y_origin;
			let mut s = x_index;
			for (&size, &stride) in x_shape.iter().zip(x_stride_in_y).rev() {
				y_index += stride * (s % size);
				s /= size;
			}
			data[y_index] = data[x_offset + x_index];
		}
	}
	Ok(())
}

//--------------------------------------------------------------------------------------------------
