//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::borrow::Cow;

use log::debug;

use crate::{ErrExtra, ErrPack};
use crate::error::LoweringError;
use crate::graph::Operator;
use crate::kernel::{KernelRecord, KernelSet, LoweringConfig};
use crate::memory_layout::MemoryLayout;

pub mod concat;

//--------------------------------------------------------------------------------------------------

/// Lowers one operator. Returns a list because some operators need several kernels.
pub fn lower_operator(
	op: &Operator,
	layout: &MemoryLayout,
	config: &LoweringConfig,
) -> Result<Vec<KernelRecord>, ErrPack<LoweringError>> {
	match op {
		Operator::Concat(concat_op) => concat::concat(op, concat_op, layout, config),
	}
}

/// Prefixes the error message with the failing operator. Keeps the code and any nested error.
#[cold]
#[inline(never)]
fn with_operator(mut err: ErrPack<LoweringError>, op_name: &str) -> ErrPack<LoweringError> {
	let extra = err
		.extra
		.get_or_insert_with(|| Box::new(ErrExtra { message: Cow::Borrowed(""), nested: None }));
	extra.message = if extra.message.is_empty() {
		Cow::Owned(op_name.to_string())
	} else {
		Cow::Owned(format!("{op_name}: {}", extra.message))
	};
	err
}

/// Lowers all operators in execution order.
///
/// Stops at the first error. The error carries the failing operator in its message.
pub fn lower_graph(
	ops: &[Operator],
	layout: &MemoryLayout,
	config: &LoweringConfig,
) -> Result<KernelSet, ErrPack<LoweringError>> {
	let mut kernels = KernelSet::new();
	for op in ops {
		let records = lower_operator(op, layout, config)
			.map_err(|err| with_operator(err, &format!("{}_{}", op.kind_name(), op.id())))?;
		for record in records {
			kernels.push(record)?;
		}
	}
	let (meta, _) = kernels.meta_bytes();
	debug!("lowered {} operators into {} kernels, {} metadata bytes", ops.len(), kernels.len(), meta.len());
	Ok(kernels)
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
