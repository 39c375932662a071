//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::hash::Hash;

//--------------------------------------------------------------------------------------------------

pub trait IndexTrait: Copy + Clone + PartialEq + Eq + Hash + Ord {
	fn to_raw(self) -> usize;
	fn from_raw(raw: usize) -> Self;
}

#[macro_export]
macro_rules! define_index_type {
	($name:ident) => {
		#[repr(transparent)]
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub struct $name {
			pub raw: usize,
		}

		impl $name {
			pub const fn new(raw: usize) -> Self {
				$name { raw }
			}
		}

		impl $crate::util::index_vec::IndexTrait for $name {
			fn to_raw(self) -> usize {
				self.raw
			}

			fn from_raw(raw: usize) -> Self {
				$name { raw }
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
				write!(f, "{}", self.raw)
			}
		}
	};
}

//--------------------------------------------------------------------------------------------------

/// A vector indexed by a typed index instead of `usize`.
pub struct IndexVec<Index: IndexTrait, T> {
	pub raw: Vec<T>,
	_marker: std::marker::PhantomData<Index>,
}

impl<Index: IndexTrait, T> Default for IndexVec<Index, T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<Index: IndexTrait, T: Clone> Clone for IndexVec<Index, T> {
	fn clone(&self) -> Self {
		Self {
			raw: self.raw.clone(),
			_marker: std::marker::PhantomData,
		}
	}
}

impl<Index: IndexTrait, T> IndexVec<Index, T> {
	pub fn new() -> Self {
		Self {
			raw: Vec::new(),
			_marker: std::marker::PhantomData,
		}
	}

	pub fn push(&mut self, item: T) -> Index {
		let index = Index::from_raw(self.raw.len());
		self.raw.push(item);
		index
	}

	pub fn get(&self, index: Index) -> Option<&T> {
		self.raw.get(index.to_raw())
	}

	/// Returns a mutable reference to the slot at `index`,
	/// growing the vector with `fill()` if it is too short.
	#[allow(clippy::indexing_slicing)]
	pub fn get_or_grow(&mut self, index: Index, fill: impl FnMut() -> T) -> &mut T {
		let raw = index.to_raw();
		if raw >= self.raw.len() {
			self.raw.resize_with(raw + 1, fill);
		}
		&mut self.raw[raw]
	}

	pub fn next_index(&self) -> Index {
		Index::from_raw(self.raw.len())
	}
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	crate::define_index_type!(TestIndex);

	#[test]
	fn test_get_or_grow() {
		let mut v: IndexVec<TestIndex, Option<u32>> = IndexVec::new();
		*v.get_or_grow(TestIndex::new(3), || None) = Some(7);
		assert_eq!(v.raw.len(), 4);
		assert_eq!(v.get(TestIndex::new(3)), Some(&Some(7)));
		assert_eq!(v.get(TestIndex::new(1)), Some(&None));
		assert_eq!(v.get(TestIndex::new(4)), None);

		let idx = v.push(Some(1));
		assert_eq!(idx, TestIndex::new(4));
		assert_eq!(v.next_index(), TestIndex::new(5));
	}
}

//--------------------------------------------------------------------------------------------------
