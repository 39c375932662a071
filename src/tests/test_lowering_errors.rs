//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::ErrPack;
use crate::error::{ErrorKind, LoweringError};
use crate::graph::{Axis, Graph};
use crate::kernel::LoweringConfig;
use crate::lower_graph;
use crate::memory_layout::MemoryLayout;

//--------------------------------------------------------------------------------------------------

/// Lowers `graph` with every variable allocated and returns the error code, if any.
fn lower_err(graph: &Graph) -> Option<LoweringError> {
	let mut layout = MemoryLayout::new();
	for var in graph.variables() {
		layout.append(var);
	}
	lower_graph(graph.operators(), &layout, &LoweringConfig::default()).err().map(|e| e.code)
}

#[test]
fn test_no_inputs() -> Result<(), ErrPack<LoweringError>> {
	let mut graph = Graph::new();
	let y = graph.add_variable(&[4], &[Axis::C])?;
	graph.add_concat(&[], &y, Axis::C);
	assert_eq!(lower_err(&graph), Some(LoweringError::NoInputs));
	Ok(())
}

#[test]
fn test_dims_dont_match() -> Result<(), ErrPack<LoweringError>> {
	let mut graph = Graph::new();
	let x0 = graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?;
	let x1 = graph.add_variable(&[5], &[Axis::C])?;
	let y = graph.add_variable(&[2, 8], &[Axis::N, Axis::C])?;
	graph.add_concat(&[x0, x1], &y, Axis::C);
	assert_eq!(lower_err(&graph), Some(LoweringError::DimsDontMatch));
	Ok(())
}

#[test]
fn test_missing_axis() -> Result<(), ErrPack<LoweringError>> {
	// input uses H where the output has C
	let mut graph = Graph::new();
	let x0 = graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?;
	let x1 = graph.add_variable(&[2, 5], &[Axis::N, Axis::H])?;
	let y = graph.add_variable(&[2, 8], &[Axis::N, Axis::C])?;
	graph.add_concat(&[x0.clone(), x1], &y, Axis::C);
	assert_eq!(lower_err(&graph), Some(LoweringError::MissingAxis));

	// concat axis absent everywhere
	let mut graph = Graph::new();
	let x0 = graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?;
	let y = graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?;
	graph.add_concat(&[x0], &y, Axis::W);
	let err = lower_err(&graph);
	assert_eq!(err, Some(LoweringError::MissingAxis));
	assert_eq!(err.map(LoweringError::kind), Some(ErrorKind::Configuration));
	Ok(())
}

#[test]
fn test_shape_mismatch() -> Result<(), ErrPack<LoweringError>> {
	// sizes along the concat axis do not add up
	let mut graph = Graph::new();
	let x0 = graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?;
	let x1 = graph.add_variable(&[2, 5], &[Axis::N, Axis::C])?;
	let y = graph.add_variable(&[2, 9], &[Axis::N, Axis::C])?;
	graph.add_concat(&[x0, x1], &y, Axis::C);
	assert_eq!(lower_err(&graph), Some(LoweringError::ShapeMismatch));

	// other axis differs
	let mut graph = Graph::new();
	let x0 = graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?;
	let x1 = graph.add_variable(&[5, 3], &[Axis::C, Axis::N])?;
	let y = graph.add_variable(&[2, 8], &[Axis::N, Axis::C])?;
	graph.add_concat(&[x0, x1], &y, Axis::C);
	assert_eq!(lower_err(&graph), Some(LoweringError::ShapeMismatch));
	Ok(())
}

#[test]
fn test_not_allocated() -> Result<(), ErrPack<LoweringError>> {
	let mut graph = Graph::new();
	let x0 = graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?;
	let x1 = graph.add_variable(&[2, 5], &[Axis::N, Axis::C])?;
	let y = graph.add_variable(&[2, 8], &[Axis::N, Axis::C])?;
	graph.add_concat(&[x0.clone(), x1], &y, Axis::C);

	let mut layout = MemoryLayout::new();
	layout.append(&x0);
	layout.append(&y);
	let err = lower_graph(graph.operators(), &layout, &LoweringConfig::default()).err();
	let Some(err) = err else {
		panic!("lowering should fail");
	};
	assert_eq!(err.code, LoweringError::NotAllocated);
	assert_eq!(err.code.kind(), ErrorKind::Lookup);
	assert_eq!(err.message(), "concat_0");
	Ok(())
}

//--------------------------------------------------------------------------------------------------
