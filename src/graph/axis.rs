//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::borrow::Cow;

use arrayvec::ArrayVec;

use crate::ErrPack;
use crate::error::{InvalidOrderError, LoweringError, TooManyAxesError};

//--------------------------------------------------------------------------------------------------

/// Upper bound on distinct axis ids. Also bounds the dimensionality of any tensor.
pub const MAX_AXES: usize = 16;

const NO_POSITION: u8 = u8::MAX;

/// Interned axis identifier.
///
/// Ids are small integers so that `Order` can map axis -> position with a plain array.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Axis {
	pub raw: u8,
}

impl Axis {
	pub const N: Self = Self { raw: 0 };
	pub const C: Self = Self { raw: 1 };
	pub const H: Self = Self { raw: 2 };
	pub const W: Self = Self { raw: 3 };
	pub const T: Self = Self { raw: 4 };

	const WELL_KNOWN: [&'static str; 5] = ["N", "C", "H", "W", "T"];

	pub fn new(raw: usize) -> Result<Self, TooManyAxesError> {
		match u8::try_from(raw) {
			Ok(raw) if usize::from(raw) < MAX_AXES => Ok(Self { raw }),
			_ => Err(TooManyAxesError),
		}
	}

	pub fn index(self) -> usize {
		usize::from(self.raw)
	}
}

impl std::fmt::Display for Axis {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match Self::WELL_KNOWN.get(self.index()) {
			Some(name) => write!(f, "{name}"),
			None => write!(f, "A{}", self.raw),
		}
	}
}

//--------------------------------------------------------------------------------------------------

/// Maps axis names to `Axis` ids. The well-known axes are always present.
pub struct AxisInterner {
	names: ArrayVec<Cow<'static, str>, MAX_AXES>,
}

impl Default for AxisInterner {
	fn default() -> Self {
		Self::new()
	}
}

impl AxisInterner {
	pub fn new() -> Self {
		let mut names = ArrayVec::new();
		for name in Axis::WELL_KNOWN {
			names.push(Cow::Borrowed(name));
		}
		Self { names }
	}

	pub fn intern(&mut self, name: &str) -> Result<Axis, ErrPack<LoweringError>> {
		if let Some(i) = self.names.iter().position(|n| n == name) {
			return Ok(Axis::new(i)?);
		}
		let axis = Axis::new(self.names.len())?;
		if self.names.try_push(Cow::Owned(name.to_string())).is_err() {
			return Err(TooManyAxesError.into());
		}
		Ok(axis)
	}

	pub fn name(&self, axis: Axis) -> Option<&str> {
		self.names.get(axis.index()).map(|n| &**n)
	}
}

//--------------------------------------------------------------------------------------------------

/// Physical order of a tensor's axes, outermost first.
///
/// Besides the axis list, it keeps the inverse mapping `axis -> position` so that
/// `position()` is a single array load.
#[derive(Clone, PartialEq, Eq)]
pub struct Order {
	axes: ArrayVec<Axis, MAX_AXES>,
	positions: [u8; MAX_AXES],
}

impl Order {
	pub fn new(axes: &[Axis]) -> Result<Self, ErrPack<LoweringError>> {
		let mut positions = [NO_POSITION; MAX_AXES];
		let mut list = ArrayVec::new();
		for (pos, &axis) in axes.iter().enumerate() {
			let Some(slot) = positions.get_mut(axis.index()) else {
				return Err(TooManyAxesError.into());
			};
			if *slot != NO_POSITION {
				return Err(ErrPack::with_message(
					LoweringError::InvalidOrder,
					format!("axis {axis} appears more than once"),
				));
			}
			// `pos < MAX_AXES` because all axes are distinct and below `MAX_AXES`
			*slot = u8::try_from(pos).map_err(|_| InvalidOrderError)?;
			list.push(axis);
		}
		Ok(Self { axes: list, positions })
	}

	pub fn axes(&self) -> &[Axis] {
		&self.axes
	}

	pub fn ndim(&self) -> usize {
		self.axes.len()
	}

	pub fn position(&self, axis: Axis) -> Option<usize> {
		match self.positions.get(axis.index()) {
			Some(&pos) if pos != NO_POSITION => Some(usize::from(pos)),
			_ => None,
		}
	}

	pub fn contains(&self, axis: Axis) -> bool {
		self.position(axis).is_some()
	}

	/// True if both orders contain the same set of axes, regardless of their positions.
	pub fn same_axes(&self, other: &Self) -> bool {
		self.ndim() == other.ndim() && self.axes.iter().all(|&axis| other.contains(axis))
	}
}

impl std::fmt::Debug for Order {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{self}")
	}
}

impl std::fmt::Display for Order {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "(")?;
		for (i, axis) in self.axes.iter().enumerate() {
			if i != 0 {
				write!(f, ", ")?;
			}
			write!(f, "{axis}")?;
		}
		write!(f, ")")
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
