//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::borrow::Cow;

use crate::{ErrExtra, ErrPack};

//--------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NotAllocatedError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct MissingAxisError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct InvalidOrderError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TooManyAxesError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct MetaValueOverflowError;

//--------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoweringError {
	// malformed operator
	NoInputs,
	DimsDontMatch,
	MissingAxis,
	ShapeMismatch,
	InvalidOrder,
	TooManyAxes,

	// memory layout
	NotAllocated,

	// kernel template
	UnknownMetaItem,
	DuplicateMetaItem,
	MalformedPlaceholder,
	UnresolvedPlaceholder,

	DuplicateKernelName,
	MetaValueOverflow,
	IOError,
}

/// Coarse classification of a `LoweringError`.
///
/// `Configuration` errors belong to one operator; the caller may skip that operator
/// and continue. Everything else means the surrounding compiler is broken.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
	Configuration,
	Lookup,
	Template,
	Internal,
}

impl LoweringError {
	pub fn kind(self) -> ErrorKind {
		match self {
			Self::NoInputs
			| Self::DimsDontMatch
			| Self::MissingAxis
			| Self::ShapeMismatch
			| Self::InvalidOrder
			| Self::TooManyAxes => ErrorKind::Configuration,
			Self::NotAllocated => ErrorKind::Lookup,
			Self::UnknownMetaItem
			| Self::DuplicateMetaItem
			| Self::MalformedPlaceholder
			| Self::UnresolvedPlaceholder => ErrorKind::Template,
			Self::DuplicateKernelName | Self::MetaValueOverflow | Self::IOError => {
				ErrorKind::Internal
			},
		}
	}
}

//--------------------------------------------------------------------------------------------------

impl From<NotAllocatedError> for ErrPack<LoweringError> {
	fn from(_: NotAllocatedError) -> Self {
		Self { code: LoweringError::NotAllocated, extra: None }
	}
}

impl From<MissingAxisError> for ErrPack<LoweringError> {
	fn from(_: MissingAxisError) -> Self {
		Self { code: LoweringError::MissingAxis, extra: None }
	}
}

impl From<InvalidOrderError> for ErrPack<LoweringError> {
	fn from(_: InvalidOrderError) -> Self {
		Self { code: LoweringError::InvalidOrder, extra: None }
	}
}

impl From<TooManyAxesError> for ErrPack<LoweringError> {
	fn from(_: TooManyAxesError) -> Self {
		Self { code: LoweringError::TooManyAxes, extra: None }
	}
}

impl From<MetaValueOverflowError> for ErrPack<LoweringError> {
	fn from(_: MetaValueOverflowError) -> Self {
		Self {
			code: LoweringError::MetaValueOverflow,
			extra: None,
		}
	}
}

impl From<std::io::Error> for ErrPack<LoweringError> {
	fn from(err: std::io::Error) -> Self {
		Self {
			code: LoweringError::IOError,
			extra: Some(Box::new(ErrExtra {
				message: Cow::from("IO error occurred"),
				nested: Some(Box::new(err)),
			})),
		}
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
