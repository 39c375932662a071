//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::rc::Rc;

use crate::ErrPack;
use crate::error::LoweringError;
use crate::util::index_vec::IndexVec;

pub mod axis;
pub mod operator;
pub mod variable;

pub use axis::{Axis, AxisInterner, MAX_AXES, Order};
pub use operator::{Concat, OpId, Operator};
pub use variable::{DimVec, INLINE_DIMS, VarId, Variable};

//--------------------------------------------------------------------------------------------------

/// Minimal graph container.
///
/// Hands out unique `VarId`s and `OpId`s. Real graphs come from the front end;
/// this one is enough to drive lowering from tests and tools.
#[derive(Default)]
pub struct Graph {
	variables: IndexVec<VarId, Rc<Variable>>,
	operators: IndexVec<OpId, Operator>,
}

impl Graph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_variable(
		&mut self,
		shape: &[usize],
		axes: &[Axis],
	) -> Result<Rc<Variable>, ErrPack<LoweringError>> {
		let var = Rc::new(Variable::new(self.variables.next_index(), shape, Order::new(axes)?)?);
		self.variables.push(var.clone());
		Ok(var)
	}

	pub fn add_concat(&mut self, inputs: &[Rc<Variable>], output: &Rc<Variable>, axis: Axis) -> OpId {
		let id = self.operators.next_index();
		self.operators.push(Operator::Concat(Concat {
			id,
			inputs: inputs.to_vec(),
			output: output.clone(),
			axis,
		}))
	}

	pub fn variables(&self) -> &[Rc<Variable>] {
		&self.variables.raw
	}

	pub fn operators(&self) -> &[Operator] {
		&self.operators.raw
	}
}

//--------------------------------------------------------------------------------------------------
