//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::borrow::Cow;
use std::collections::HashSet;

use crate::ErrPack;
use crate::error::LoweringError;

pub mod cpu;
pub mod meta;
pub mod name;
pub mod template;

pub use meta::{MetaBlock, MetaEntry, MetaInjector, MetaKind, MetaValue};
pub use name::KernelNameInjector;

//--------------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct LoweringConfig {
	/// Identifier substituted for `%%META_NAME%%`.
	pub meta_param_name: Cow<'static, str>,

	/// Substitute scalar metadata items as literals instead of loading them at run time.
	pub inline_scalars: bool,
}

impl Default for LoweringConfig {
	fn default() -> Self {
		Self {
			meta_param_name: Cow::Borrowed("meta_buffer"),
			inline_scalars: false,
		}
	}
}

//--------------------------------------------------------------------------------------------------

/// One lowered kernel, ready for the backend compiler.
///
/// Every kernel has the signature `void name(const int *meta, float *data_buffer)`.
#[derive(Clone, Debug)]
pub struct KernelRecord {
	pub name: String,
	pub source: String,
	pub meta: MetaBlock,
}

/// Entry point generated by `KernelSet::sources()`. Runs all kernels in order.
pub const ENTRY_NAME: &str = "run";

const PRELUDE: &str = "// generated kernels\n";

/// All kernels of one lowering pass, in execution order.
#[derive(Default)]
pub struct KernelSet {
	kernels: Vec<KernelRecord>,
	names: HashSet<String>,
}

impl KernelSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, kernel: KernelRecord) -> Result<(), ErrPack<LoweringError>> {
		if !self.names.insert(kernel.name.clone()) {
			return Err(ErrPack::with_message(
				LoweringError::DuplicateKernelName,
				format!("kernel `{}` emitted twice", kernel.name),
			));
		}
		self.kernels.push(kernel);
		Ok(())
	}

	pub fn kernels(&self) -> &[KernelRecord] {
		&self.kernels
	}

	pub fn len(&self) -> usize {
		self.kernels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.kernels.is_empty()
	}

	/// Metadata blocks of all kernels back to back, and the byte offset of each block.
	pub fn meta_bytes(&self) -> (Vec<u8>, Vec<usize>) {
		let mut bytes = Vec::with_capacity(self.kernels.iter().map(|k| k.meta.len()).sum());
		let mut offsets = Vec::with_capacity(self.kernels.len());
		for kernel in &self.kernels {
			offsets.push(bytes.len());
			bytes.extend_from_slice(&kernel.meta.bytes);
		}
		(bytes, offsets)
	}

	/// One translation unit with all kernels and the `run` entry point.
	///
	/// `run(meta, data_buffer)` expects `meta` to point at the bytes returned by `meta_bytes()`.
	pub fn sources(&self) -> String {
		let (_, offsets) = self.meta_bytes();
		let mut src = String::from(PRELUDE);
		for kernel in &self.kernels {
			src.push('\n');
			src.push_str(kernel.source.trim());
			src.push('\n');
		}
		src.push_str(&format!(
			"\nvoid {ENTRY_NAME}(const int *meta, float *data_buffer)\n{{\n"
		));
		for (kernel, offset) in self.kernels.iter().zip(offsets) {
			src.push_str(&format!(
				"\t{}((const int *)((const char *)meta + {offset}), data_buffer);\n",
				kernel.name
			));
		}
		src.push_str("}\n");
		src
	}

	pub fn write_sources(&self, out: &mut dyn std::io::Write) -> Result<(), ErrPack<LoweringError>> {
		out.write_all(self.sources().as_bytes())?;
		Ok(())
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
