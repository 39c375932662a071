//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use log::{debug, trace, warn};

use crate::ErrPack;
use crate::error::{LoweringError, MissingAxisError};
use crate::graph::{Concat, DimVec, Operator, Variable};
use crate::kernel::template::ensure_resolved;
use crate::kernel::{KernelNameInjector, KernelRecord, LoweringConfig, MetaInjector};
use crate::memory_layout::MemoryLayout;

//--------------------------------------------------------------------------------------------------

pub mod meta_names {
	pub const Y_OFFSET: &str = "concat_y_offset";
	pub const D: &str = "concat_D";
	pub const N: &str = "concat_N";
	pub const X_OFFSETS: &str = "concat_x_offsets";
	pub const Y_OFFSETS: &str = "concat_y_offsets";
	pub const X_SHAPES: &str = "concat_x_shapes";
	pub const X_STRIDES_IN_Y: &str = "concat_x_strides_in_y";
}

// Works for any number of inputs, any rank and any axis order.
// All geometry comes from the metadata.
pub const TEMPLATE: &str = "
void %%FUNC_NAME%%(const int *%%META_NAME%%, float *data_buffer)
{
	float *y = data_buffer + %%META_LOAD(concat_y_offset)%%;
	const int D = %%META_LOAD(concat_D)%%;
	const int N = %%META_LOAD(concat_N)%%;
	const int *x_offsets = %%META_LOAD(concat_x_offsets)%%;
	const int *y_offsets = %%META_LOAD(concat_y_offsets)%%;
	const int *x_shapes = %%META_LOAD(concat_x_shapes)%%;
	const int *x_strides_in_y = %%META_LOAD(concat_x_strides_in_y)%%;

	for (int n = 0; n < N; n++) {
		const float *x = data_buffer + x_offsets[n];
		const int y_offset = y_offsets[n];
		const int *x_shape = &(x_shapes[n * D]);
		const int *x_stride_in_y = &(x_strides_in_y[n * D]);

		int x_size = 1;
		for (int d = 0; d < D; d++) {
			x_size *= x_shape[d];
		}

		for (int x_index = 0; x_index < x_size; x_index++) {
			int y_index = y_offset;
			int s = x_index;
			for (int d = D - 1; d >= 0; d--) {
				y_index += x_stride_in_y[d] * (s % x_shape[d]);
				s /= x_shape[d];
			}

			y[y_index] = x[x_index];
		}
	}
}
";

//--------------------------------------------------------------------------------------------------

#[cold]
#[inline(never)]
fn config_error(code: LoweringError, message: String) -> ErrPack<LoweringError> {
	ErrPack::with_message(code, message)
}

fn check_shapes(op: &Concat) -> Result<(), ErrPack<LoweringError>> {
	let y = op.output.as_ref();
	if op.inputs.is_empty() {
		return Err(config_error(LoweringError::NoInputs, "concat has no inputs".into()));
	}
	if !y.order().contains(op.axis) {
		return Err(config_error(
			LoweringError::MissingAxis,
			format!("concat axis {} not in output order {}", op.axis, y.order()),
		));
	}
	for (i, x) in op.inputs.iter().enumerate() {
		if x.ndim() != y.ndim() {
			return Err(config_error(
				LoweringError::DimsDontMatch,
				format!("input {i} has {} dims, output has {}", x.ndim(), y.ndim()),
			));
		}
		if !x.order().same_axes(y.order()) {
			return Err(config_error(
				LoweringError::MissingAxis,
				format!("input {i} order {} does not match output order {}", x.order(), y.order()),
			));
		}
	}
	for (&axis, &y_size) in y.order().axes().iter().zip(y.shape()) {
		let x_sizes = op.inputs.iter().map(|x| x.shape_of(axis)).collect::<Result<DimVec, _>>()?;
		if axis == op.axis {
			let total: usize = x_sizes.iter().sum();
			if total != y_size {
				return Err(config_error(
					LoweringError::ShapeMismatch,
					format!("inputs sum to {total} along {axis}, output has {y_size}"),
				));
			}
		} else if let Some((i, x_size)) = x_sizes.iter().enumerate().find(|&(_, &s)| s != y_size) {
			return Err(config_error(
				LoweringError::ShapeMismatch,
				format!("input {i} has size {x_size} along {axis}, output has {y_size}"),
			));
		}
	}
	Ok(())
}

/// Strides of `x`'s axes, in `x`'s order, measured in `y`'s memory.
fn strides_in(x: &Variable, y: &Variable, y_strides: &[usize]) -> Result<DimVec, MissingAxisError> {
	x.order()
		.axes()
		.iter()
		.map(|&axis| {
			y.order().position(axis).and_then(|pos| y_strides.get(pos).copied()).ok_or(MissingAxisError)
		})
		.collect()
}

pub fn concat(
	node: &Operator,
	op: &Concat,
	layout: &MemoryLayout,
	config: &LoweringConfig,
) -> Result<Vec<KernelRecord>, ErrPack<LoweringError>> {
	check_shapes(op)?;

	let y = op.output.as_ref();
	let y_alloc = layout.lookup(y)?;
	let x_allocs = op.inputs.iter().map(|x| layout.lookup(x)).collect::<Result<Vec<_>, _>>()?;

	let y_strides = y.contiguous_strides();
	let axis_pos = y.order().position(op.axis).ok_or(MissingAxisError)?;
	let axis_stride = y_strides.get(axis_pos).copied().ok_or(MissingAxisError)?;
	trace!("concat y: order {}, shape {:?}, strides {:?}", y.order(), y.shape(), y_strides);

	let mut x_shapes = Vec::with_capacity(op.inputs.len() * y.ndim());
	let mut x_strides_in_y = Vec::with_capacity(op.inputs.len() * y.ndim());
	let mut y_offsets = Vec::with_capacity(op.inputs.len());
	let mut axis_offset = 0;
	for (i, x) in op.inputs.iter().enumerate() {
		let strides = strides_in(x, y, &y_strides)?;
		let axis_size = x.shape_of(op.axis)?;
		if axis_size == 0 {
			warn!("concat input {i} is empty along {}", op.axis);
		}
		trace!("concat x{i}: order {}, shape {:?}, strides in y {:?}", x.order(), x.shape(), strides);

		x_shapes.extend_from_slice(x.shape());
		x_strides_in_y.extend_from_slice(&strides);
		y_offsets.push(axis_offset * axis_stride);
		axis_offset += axis_size;
	}
	let x_offsets = x_allocs.iter().map(|a| a.offset).collect::<Vec<_>>();

	let mut meta = MetaInjector::new(config);
	meta.register_scalar(meta_names::Y_OFFSET, y_alloc.offset)?;
	meta.register_scalar(meta_names::D, y.ndim())?;
	meta.register_scalar(meta_names::N, op.inputs.len())?;
	meta.register_array(meta_names::X_OFFSETS, &x_offsets)?;
	meta.register_array(meta_names::Y_OFFSETS, &y_offsets)?;
	meta.register_array(meta_names::X_SHAPES, &x_shapes)?;
	meta.register_array(meta_names::X_STRIDES_IN_Y, &x_strides_in_y)?;

	let name = KernelNameInjector::new(node);
	let source = meta.inject(TEMPLATE)?;
	let source = name.inject(&source)?;
	ensure_resolved(&source)?;

	let meta = meta.buffer();
	debug!(
		"lowered {}: N = {}, D = {}, {} metadata bytes",
		name.name(),
		op.inputs.len(),
		y.ndim(),
		meta.len()
	);
	Ok(vec![KernelRecord { name: name.into_name(), source, meta }])
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
