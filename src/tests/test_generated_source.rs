//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::path::Path;
use std::process::Command;

use crate::ErrPack;
use crate::error::LoweringError;
use crate::graph::{Axis, Graph};
use crate::kernel::cpu::run_concat;
use crate::kernel::meta::WORD_SIZE;
use crate::kernel::{KernelSet, LoweringConfig};
use crate::lower_graph;

use super::test_concat::{output, reference, setup};

//--------------------------------------------------------------------------------------------------

fn host_triple() -> Option<String> {
	let arch = std::env::consts::ARCH;
	match std::env::consts::OS {
		"linux" => Some(format!("{arch}-unknown-linux-gnu")),
		"macos" => Some(format!("{arch}-apple-darwin")),
		_ => None,
	}
}

/// The host C compiler, as `cc` would pick it in a build script.
fn c_compiler(out_dir: &Path) -> Option<cc::Tool> {
	let target = host_triple()?;
	let tool = cc::Build::new()
		.cargo_metadata(false)
		.target(&target)
		.host(&target)
		.opt_level(0)
		.debug(false)
		.out_dir(out_dir)
		.try_get_compiler()
		.ok()?;
	if tool.is_like_msvc() { None } else { Some(tool) }
}

/// A C program that runs all kernels once over `data` and prints the whole buffer,
/// one element per line.
fn driver(kernels: &KernelSet, data: &[f32]) -> String {
	let mut sources = Vec::new();
	kernels.write_sources(&mut sources).unwrap();

	let (meta, _) = kernels.meta_bytes();
	let words = meta
		.chunks_exact(WORD_SIZE)
		.map(|w| i32::from_le_bytes(w.try_into().unwrap()).to_string())
		.collect::<Vec<_>>();
	let values = data.iter().map(|v| format!("{v:.1}f")).collect::<Vec<_>>();

	let mut src = String::from("#include <stdio.h>\n\n");
	src.push_str(&String::from_utf8(sources).unwrap());
	src.push_str(&format!("\nstatic const int meta[] = {{ {} }};\n", words.join(", ")));
	src.push_str(&format!("static float data[] = {{ {} }};\n", values.join(", ")));
	src.push_str(
		"
int main(void)
{
	run(meta, data);
	for (size_t i = 0; i < sizeof(data) / sizeof(data[0]); i++) {
		printf(\"%.1f\\n\", data[i]);
	}
	return 0;
}
",
	);
	src
}

/// Builds `source` into an executable and returns what it prints.
///
/// Returns `None` if the compiler cannot be started at all.
fn compile_and_run(tool: &cc::Tool, dir: &Path, name: &str, source: &str) -> Option<Vec<f32>> {
	let c_path = dir.join(format!("{name}.c"));
	let exe_path = dir.join(name);
	std::fs::write(&c_path, source).unwrap();

	let compiled = tool.to_command().arg(&c_path).arg("-o").arg(&exe_path).output().ok()?;
	assert!(
		compiled.status.success(),
		"C compiler failed:\n{}\n{source}",
		String::from_utf8_lossy(&compiled.stderr)
	);

	let run = Command::new(&exe_path).output().unwrap();
	assert!(run.status.success(), "{name} exited with {}", run.status);
	let stdout = String::from_utf8(run.stdout).unwrap();
	Some(stdout.lines().map(|line| line.parse::<f32>().unwrap()).collect())
}

//--------------------------------------------------------------------------------------------------

#[test]
fn test_emitted_c_matches_host_kernel() -> Result<(), ErrPack<LoweringError>> {
	let dir = tempfile::tempdir().unwrap();
	let Some(tool) = c_compiler(dir.path()) else {
		eprintln!("no C compiler for this host, skipping");
		return Ok(());
	};

	// three inputs in three different orders, the middle one empty along C,
	// followed by a second kernel that appends `z` along N
	let mut graph = Graph::new();
	let x0 = graph.add_variable(&[2, 1, 3, 2], &[Axis::N, Axis::C, Axis::H, Axis::W])?;
	let x1 = graph.add_variable(&[3, 2, 0, 2], &[Axis::H, Axis::W, Axis::C, Axis::N])?;
	let x2 = graph.add_variable(&[2, 2, 2, 3], &[Axis::W, Axis::C, Axis::N, Axis::H])?;
	let y = graph.add_variable(&[2, 3, 2, 3], &[Axis::N, Axis::H, Axis::W, Axis::C])?;
	let z = graph.add_variable(&[1, 3, 2, 3], &[Axis::N, Axis::H, Axis::W, Axis::C])?;
	let w = graph.add_variable(&[3, 3, 2, 3], &[Axis::N, Axis::H, Axis::W, Axis::C])?;
	graph.add_concat(&[x0.clone(), x1.clone(), x2.clone()], &y, Axis::C);
	graph.add_concat(&[y.clone(), z.clone()], &w, Axis::N);

	let (layout, data) = setup(&[&x0, &x1, &x2, &y, &z, &w], &[&x0, &x1, &x2, &z]);

	for inline_scalars in [false, true] {
		let config = LoweringConfig { inline_scalars, ..LoweringConfig::default() };
		let kernels = lower_graph(graph.operators(), &layout, &config)?;
		assert_eq!(kernels.len(), 2);

		let mut host = data.clone();
		for kernel in kernels.kernels() {
			run_concat(&kernel.meta, &mut host)?;
		}

		let name = if inline_scalars { "concat_inline" } else { "concat_loads" };
		let Some(emitted) = compile_and_run(&tool, dir.path(), name, &driver(&kernels, &data)) else {
			eprintln!("C compiler could not be started, skipping");
			return Ok(());
		};

		assert_eq!(emitted, host, "inline_scalars = {inline_scalars}");
		let expected = reference(&[&x0, &x1, &x2], &y, Axis::C, &layout, &emitted);
		assert_eq!(output(&y, &layout, &emitted), expected.as_slice());
		let expected = reference(&[&y, &z], &w, Axis::N, &layout, &emitted);
		assert_eq!(output(&w, &layout, &emitted), expected.as_slice());
	}
	Ok(())
}

//--------------------------------------------------------------------------------------------------
