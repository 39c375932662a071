//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::borrow::Cow;

use log::trace;

use crate::ErrPack;
use crate::error::{LoweringError, MetaValueOverflowError};

use super::LoweringConfig;
use super::template::{self, Placeholder};

//--------------------------------------------------------------------------------------------------

pub const META_NAME: &str = "META_NAME";
pub const META_LOAD: &str = "META_LOAD";

/// Size of one serialized metadata word.
pub const WORD_SIZE: usize = std::mem::size_of::<i32>();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaKind {
	Scalar,
	Array,
}

/// A metadata value. The kind is explicit: an array of length 1 stays an array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaValue {
	Scalar(i32),
	Array(Vec<i32>),
}

impl MetaValue {
	pub fn kind(&self) -> MetaKind {
		match self {
			Self::Scalar(_) => MetaKind::Scalar,
			Self::Array(_) => MetaKind::Array,
		}
	}

	pub fn words(&self) -> &[i32] {
		match self {
			Self::Scalar(v) => std::slice::from_ref(v),
			Self::Array(v) => v,
		}
	}
}

pub fn to_meta_word(value: usize) -> Result<i32, MetaValueOverflowError> {
	i32::try_from(value).map_err(|_| MetaValueOverflowError)
}

/// Location of one item inside a serialized metadata block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaEntry {
	pub name: Cow<'static, str>,
	pub kind: MetaKind,
	pub byte_offset: usize,

	/// Number of words, 1 for scalars.
	pub len: usize,
}

//--------------------------------------------------------------------------------------------------

/// Serialized metadata: little-endian `i32` words of all items, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetaBlock {
	pub bytes: Vec<u8>,
	pub entries: Vec<MetaEntry>,
}

impl MetaBlock {
	pub fn entry(&self, name: &str) -> Result<&MetaEntry, ErrPack<LoweringError>> {
		self.entries.iter().find(|e| e.name == name).ok_or_else(|| unknown_item(name))
	}

	fn words(&self, entry: &MetaEntry) -> impl Iterator<Item = i32> + '_ {
		let end = (entry.byte_offset + entry.len * WORD_SIZE).min(self.bytes.len());
		let start = entry.byte_offset.min(end);
		self.bytes
			.get(start..end)
			.unwrap_or_default()
			.chunks_exact(WORD_SIZE)
			.map(|w| <[u8; WORD_SIZE]>::try_from(w).map_or(0, i32::from_le_bytes))
	}

	pub fn scalar(&self, name: &str) -> Result<i32, ErrPack<LoweringError>> {
		let entry = self.entry(name)?;
		self.words(entry).next().ok_or_else(|| unknown_item(name))
	}

	pub fn array(&self, name: &str) -> Result<Vec<i32>, ErrPack<LoweringError>> {
		let entry = self.entry(name)?;
		Ok(self.words(entry).collect())
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

#[cold]
#[inline(never)]
fn unknown_item(name: &str) -> ErrPack<LoweringError> {
	ErrPack::with_message(LoweringError::UnknownMetaItem, format!("unknown metadata item `{name}`"))
}

//--------------------------------------------------------------------------------------------------

/// Collects named metadata items for one kernel and resolves the metadata placeholders.
///
/// `%%META_NAME%%` becomes the name of the kernel's metadata parameter.
/// `%%META_LOAD(item)%%` becomes, for an array item, a `const int *` pointing at the item
/// and, for a scalar item, an `int` expression with its value.
pub struct MetaInjector<'c> {
	config: &'c LoweringConfig,
	items: Vec<(Cow<'static, str>, MetaValue)>,
}

impl<'c> MetaInjector<'c> {
	pub fn new(config: &'c LoweringConfig) -> Self {
		Self { config, items: Vec::new() }
	}

	pub fn register(
		&mut self,
		name: impl Into<Cow<'static, str>>,
		value: MetaValue,
	) -> Result<(), ErrPack<LoweringError>> {
		let name = name.into();
		if self.items.iter().any(|(n, _)| *n == name) {
			return Err(ErrPack::with_message(
				LoweringError::DuplicateMetaItem,
				format!("metadata item `{name}` registered twice"),
			));
		}
		self.items.push((name, value));
		Ok(())
	}

	pub fn register_scalar(
		&mut self,
		name: impl Into<Cow<'static, str>>,
		value: usize,
	) -> Result<(), ErrPack<LoweringError>> {
		self.register(name, MetaValue::Scalar(to_meta_word(value)?))
	}

	pub fn register_array<'a>(
		&mut self,
		name: impl Into<Cow<'static, str>>,
		values: impl IntoIterator<Item = &'a usize>,
	) -> Result<(), ErrPack<LoweringError>> {
		let values = values
			.into_iter()
			.map(|&v| to_meta_word(v))
			.collect::<Result<Vec<_>, _>>()?;
		self.register(name, MetaValue::Array(values))
	}

	/// Item locations. Offsets only depend on the registration order and item sizes.
	pub fn entries(&self) -> Vec<MetaEntry> {
		let mut byte_offset = 0;
		self.items
			.iter()
			.map(|(name, value)| {
				let len = value.words().len();
				let entry = MetaEntry {
					name: name.clone(),
					kind: value.kind(),
					byte_offset,
					len,
				};
				byte_offset += len * WORD_SIZE;
				entry
			})
			.collect()
	}

	fn load_expr(&self, entry: &MetaEntry, value: &MetaValue) -> String {
		let meta = &self.config.meta_param_name;
		let offset = entry.byte_offset;
		match value {
			MetaValue::Array(_) => format!("((const int *)((const char *){meta} + {offset}))"),
			MetaValue::Scalar(v) if self.config.inline_scalars => format!("({v})"),
			MetaValue::Scalar(_) => format!("(*(const int *)((const char *){meta} + {offset}))"),
		}
	}

	pub fn inject(&self, source: &str) -> Result<String, ErrPack<LoweringError>> {
		let entries = self.entries();
		template::rewrite(source, |Placeholder { marker, arg }| match (marker, arg) {
			(META_NAME, None) => Ok(Some(self.config.meta_param_name.to_string())),
			(META_LOAD, Some(name)) => {
				let Some((entry, (_, value))) =
					entries.iter().zip(self.items.iter()).find(|(e, _)| e.name == name)
				else {
					return Err(unknown_item(name));
				};
				let expr = self.load_expr(entry, value);
				trace!("{META_LOAD}({name}) -> {expr}");
				Ok(Some(expr))
			},
			(META_NAME | META_LOAD, _) => Err(ErrPack::with_message(
				LoweringError::MalformedPlaceholder,
				format!("wrong arguments for {marker}"),
			)),
			_ => Ok(None),
		})
	}

	/// Serializes all items in registration order.
	pub fn buffer(&self) -> MetaBlock {
		let entries = self.entries();
		let mut bytes = Vec::with_capacity(entries.iter().map(|e| e.len * WORD_SIZE).sum());
		for (_, value) in &self.items {
			for word in value.words() {
				bytes.extend_from_slice(&word.to_le_bytes());
			}
		}
		MetaBlock { bytes, entries }
	}
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	fn injector(config: &LoweringConfig) -> Result<MetaInjector<'_>, ErrPack<LoweringError>> {
		let mut meta = MetaInjector::new(config);
		meta.register_scalar("n", 3)?;
		meta.register_array("offsets", &[10, 20, 30])?;
		meta.register("one", MetaValue::Array(vec![-1]))?;
		Ok(meta)
	}

	#[test]
	fn test_block_layout() -> Result<(), ErrPack<LoweringError>> {
		let config = LoweringConfig::default();
		let meta = injector(&config)?;
		let block = meta.buffer();

		assert_eq!(block.len(), (1 + 3 + 1) * WORD_SIZE);
		assert_eq!(&block.bytes[0..4], &3_i32.to_le_bytes());
		assert_eq!(&block.bytes[16..20], &(-1_i32).to_le_bytes());
		assert_eq!(block.entry("offsets")?.byte_offset, 4);
		assert_eq!(block.entry("one")?.kind, MetaKind::Array);
		assert_eq!(block.scalar("n")?, 3);
		assert_eq!(block.array("offsets")?, vec![10, 20, 30]);
		assert_eq!(block.array("one")?, vec![-1]);

		// same registrations, same bytes
		assert_eq!(injector(&config)?.buffer(), block);
		Ok(())
	}

	#[test]
	fn test_inject() -> Result<(), ErrPack<LoweringError>> {
		let config = LoweringConfig::default();
		let meta = injector(&config)?;
		let src = "f(const int *%%META_NAME%%) { g(%%META_LOAD(n)%%, %%META_LOAD(offsets)%%); }";
		assert_eq!(
			meta.inject(src)?,
			"f(const int *meta_buffer) { g((*(const int *)((const char *)meta_buffer + 0)), \
			 ((const int *)((const char *)meta_buffer + 4))); }"
		);

		let config = LoweringConfig { inline_scalars: true, ..LoweringConfig::default() };
		let meta = injector(&config)?;
		assert_eq!(meta.inject("x = %%META_LOAD(n)%%;")?, "x = (3);");
		assert_eq!(
			meta.inject("p = %%META_LOAD(one)%%;")?,
			"p = ((const int *)((const char *)meta_buffer + 16));"
		);
		Ok(())
	}

	#[test]
	fn test_errors() -> Result<(), ErrPack<LoweringError>> {
		let config = LoweringConfig::default();
		let mut meta = injector(&config)?;

		let err = meta.inject("%%META_LOAD(missing)%%").err();
		assert_eq!(err.map(|e| e.code), Some(LoweringError::UnknownMetaItem));

		let err = meta.inject("%%META_LOAD%%").err();
		assert_eq!(err.map(|e| e.code), Some(LoweringError::MalformedPlaceholder));

		let err = meta.register_scalar("n", 4).err();
		assert_eq!(err.map(|e| e.code), Some(LoweringError::DuplicateMetaItem));

		let err = meta.register_scalar("big", usize::MAX).err();
		assert_eq!(err.map(|e| e.code), Some(LoweringError::MetaValueOverflow));

		// other injectors' placeholders pass through
		assert_eq!(meta.inject("void %%FUNC_NAME%%()")?, "void %%FUNC_NAME%%()");
		Ok(())
	}
}

//--------------------------------------------------------------------------------------------------
