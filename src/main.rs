//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

// Lowers a small concat graph and prints what the backend would receive.
//
// usage: x17lower [-v...] [--permuted] [--inline-scalars]

use log::info;

use x17lower::kernel::cpu::run_concat;
use x17lower::{Axis, ErrPack, Graph, LoweringConfig, LoweringError, MemoryLayout, lower_graph};

/// `-v`, `-vv`, ... Each `v` raises the log level by one.
fn is_verbosity_flag(arg: &str) -> bool {
	arg.strip_prefix('-').is_some_and(|r| !r.is_empty() && r.chars().all(|c| c == 'v'))
}

#[allow(clippy::cast_precision_loss)]
fn main() -> Result<(), ErrPack<LoweringError>> {
	let mut verbosity = 1;
	let mut permuted = false;
	let mut config = LoweringConfig::default();
	for arg in std::env::args().skip(1) {
		match arg.as_str() {
			"--permuted" => permuted = true,
			"--inline-scalars" => config.inline_scalars = true,
			v if is_verbosity_flag(v) => {
				verbosity += v.len() - 1;
			},
			_ => {
				eprintln!("usage: x17lower [-v...] [--permuted] [--inline-scalars]");
				std::process::exit(2);
			},
		}
	}
	stderrlog::new()
		.module("x17lower")
		.verbosity(verbosity)
		.timestamp(stderrlog::Timestamp::Off)
		.init()
		.map_err(|e| ErrPack::with_message(LoweringError::IOError, e.to_string()))?;

	let mut graph = Graph::new();
	let x0 = if permuted {
		graph.add_variable(&[3, 2], &[Axis::C, Axis::N])?
	} else {
		graph.add_variable(&[2, 3], &[Axis::N, Axis::C])?
	};
	let x1 = graph.add_variable(&[2, 5], &[Axis::N, Axis::C])?;
	let y = graph.add_variable(&[2, 8], &[Axis::N, Axis::C])?;
	graph.add_concat(&[x0.clone(), x1.clone()], &y, Axis::C);

	let mut layout = MemoryLayout::new();
	let x0_alloc = layout.append(&x0);
	let x1_alloc = layout.append(&x1);
	let y_alloc = layout.append(&y);
	info!(
		"x0 {} at {}, x1 {} at {}, y {} at {}",
		x0.order(),
		x0_alloc.offset,
		x1.order(),
		x1_alloc.offset,
		y.order(),
		y_alloc.offset
	);

	let kernels = lower_graph(graph.operators(), &layout, &config)?;
	kernels.write_sources(&mut std::io::stdout().lock())?;

	let mut data = vec![0.0_f32; layout.size()];
	for (k, v) in data.iter_mut().enumerate().take(y_alloc.offset) {
		*v = k as f32;
	}
	for kernel in kernels.kernels() {
		let words = kernel
			.meta
			.entries
			.iter()
			.map(|e| format!("{}: {:?}", e.name, kernel.meta.array(&e.name).unwrap_or_default()))
			.collect::<Vec<_>>();
		println!("// {} metadata ({} bytes)", kernel.name, kernel.meta.len());
		for w in words {
			println!("//   {w}");
		}
		run_concat(&kernel.meta, &mut data)?;
	}

	let out = data.get(y_alloc.offset..y_alloc.offset + y_alloc.size).unwrap_or_default();
	for row in out.chunks(y.shape().last().copied().unwrap_or(1).max(1)) {
		println!("// y: {row:?}");
	}
	Ok(())
}
