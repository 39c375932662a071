//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::rc::Rc;

use crate::define_index_type;

use super::axis::Axis;
use super::variable::Variable;

//--------------------------------------------------------------------------------------------------

define_index_type!(OpId);

/// Joins `inputs` along `axis` into `output`.
///
/// Inputs are positional: `inputs[i]` lands before `inputs[i + 1]` along the axis.
#[derive(Clone, Debug)]
pub struct Concat {
	pub id: OpId,
	pub inputs: Vec<Rc<Variable>>,
	pub output: Rc<Variable>,
	pub axis: Axis,
}

#[derive(Clone, Debug)]
pub enum Operator {
	Concat(Concat),
}

impl Operator {
	pub fn id(&self) -> OpId {
		match self {
			Self::Concat(op) => op.id,
		}
	}

	/// Lower-case operator name, used as the prefix of kernel symbols.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Concat(_) => "concat",
		}
	}
}

//--------------------------------------------------------------------------------------------------
