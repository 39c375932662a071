//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::ErrPack;
use crate::error::LoweringError;
use crate::graph::Operator;

use super::template::{self, Placeholder};

//--------------------------------------------------------------------------------------------------

pub const FUNC_NAME: &str = "FUNC_NAME";

/// Derives the kernel symbol from the operator and resolves `%%FUNC_NAME%%`.
///
/// The symbol is `<kind>_<op id>`. Operator ids are unique within a graph,
/// so two operators lowered in the same pass never share a symbol.
pub struct KernelNameInjector {
	name: String,
}

impl KernelNameInjector {
	pub fn new(op: &Operator) -> Self {
		Self { name: format!("{}_{}", op.kind_name(), op.id()) }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn into_name(self) -> String {
		self.name
	}

	pub fn inject(&self, source: &str) -> Result<String, ErrPack<LoweringError>> {
		template::rewrite(source, |Placeholder { marker, arg }| match (marker, arg) {
			(FUNC_NAME, None) => Ok(Some(self.name.clone())),
			(FUNC_NAME, Some(_)) => Err(ErrPack::with_message(
				LoweringError::MalformedPlaceholder,
				format!("{FUNC_NAME} takes no arguments"),
			)),
			_ => Ok(None),
		})
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
