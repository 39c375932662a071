//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::error::NotAllocatedError;
use crate::graph::{VarId, Variable};
use crate::util::index_vec::IndexVec;

//--------------------------------------------------------------------------------------------------

/// Placement of one variable in the shared data buffer. Both fields are in elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
	pub offset: usize,
	pub size: usize,
}

/// Offsets decided by the allocator, keyed by variable.
///
/// Lowering only reads it. `insert()` and `append()` exist for whoever builds the layout.
#[derive(Clone, Default)]
pub struct MemoryLayout {
	allocations: IndexVec<VarId, Option<Allocation>>,
	size: usize,
}

impl MemoryLayout {
	pub fn new() -> Self {
		Self::default()
	}

	/// Places `var` at `offset`. Replaces any previous placement of the same variable.
	pub fn insert(&mut self, var: &Variable, offset: usize) -> Allocation {
		let alloc = Allocation { offset, size: var.size() };
		*self.allocations.get_or_grow(var.id(), || None) = Some(alloc);
		self.size = self.size.max(offset + alloc.size);
		alloc
	}

	/// Places `var` right after everything allocated so far.
	pub fn append(&mut self, var: &Variable) -> Allocation {
		self.insert(var, self.size)
	}

	pub fn lookup(&self, var: &Variable) -> Result<Allocation, NotAllocatedError> {
		match self.allocations.get(var.id()) {
			Some(Some(alloc)) => Ok(*alloc),
			_ => Err(NotAllocatedError),
		}
	}

	/// Total number of elements the data buffer must hold.
	pub fn size(&self) -> usize {
		self.size
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
