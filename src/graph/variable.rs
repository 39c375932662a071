//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use smallvec::SmallVec;

use crate::ErrPack;
use crate::define_index_type;
use crate::error::{LoweringError, MissingAxisError};

use super::axis::{Axis, Order};

//--------------------------------------------------------------------------------------------------

// Almost every tensor has at most 5 dimensions, so these stay inline.
pub const INLINE_DIMS: usize = 5;

pub type DimVec = SmallVec<[usize; INLINE_DIMS]>;

define_index_type!(VarId);

/// Tensor descriptor: a shape together with the physical order of its axes.
///
/// `shape[i]` is the size of `order.axes()[i]`.
#[derive(Clone, Debug)]
pub struct Variable {
	id: VarId,
	shape: DimVec,
	order: Order,
}

impl Variable {
	pub fn new(id: VarId, shape: &[usize], order: Order) -> Result<Self, ErrPack<LoweringError>> {
		if shape.len() != order.ndim() {
			return Err(ErrPack::with_message(
				LoweringError::DimsDontMatch,
				format!("shape {shape:?} does not match order {order}"),
			));
		}
		Ok(Self { id, shape: DimVec::from_slice(shape), order })
	}

	pub fn id(&self) -> VarId {
		self.id
	}

	pub fn shape(&self) -> &[usize] {
		&self.shape
	}

	pub fn order(&self) -> &Order {
		&self.order
	}

	pub fn ndim(&self) -> usize {
		self.shape.len()
	}

	/// Number of elements.
	pub fn size(&self) -> usize {
		self.shape.iter().product()
	}

	pub fn shape_of(&self, axis: Axis) -> Result<usize, MissingAxisError> {
		self.order
			.position(axis)
			.and_then(|pos| self.shape.get(pos).copied())
			.ok_or(MissingAxisError)
	}

	/// Row-major strides in this variable's own physical order.
	///
	/// The last axis has stride 1, each preceding one the product of all sizes after it.
	pub fn contiguous_strides(&self) -> DimVec {
		let mut strides = DimVec::from_elem(0, self.shape.len());
		let mut stride = 1;
		for (s, &size) in strides.iter_mut().zip(self.shape.iter()).rev() {
			*s = stride;
			stride *= size;
		}
		strides
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
