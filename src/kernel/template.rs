//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

//! Placeholder scanning for kernel templates.
//!
//! A placeholder is delimited by `%%` on both sides and is either a bare marker,
//! `%%META_NAME%%`, or a marker with one argument, `%%META_LOAD(concat_N)%%`.
//! Marker names are upper case, arguments are C identifiers.

use crate::ErrPack;
use crate::error::LoweringError;

//--------------------------------------------------------------------------------------------------

pub const DELIMITER: &str = "%%";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placeholder<'a> {
	pub marker: &'a str,
	pub arg: Option<&'a str>,
}

fn is_marker(s: &str) -> bool {
	!s.is_empty() && s.bytes().all(|b| b.is_ascii_uppercase() || b == b'_')
}

fn is_ident(s: &str) -> bool {
	let mut bytes = s.bytes();
	match bytes.next() {
		Some(b) if b.is_ascii_alphabetic() || b == b'_' => {},
		_ => return false,
	}
	bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cold]
#[inline(never)]
fn malformed(body: &str) -> ErrPack<LoweringError> {
	ErrPack::with_message(
		LoweringError::MalformedPlaceholder,
		format!("malformed placeholder `{DELIMITER}{body}{DELIMITER}`"),
	)
}

fn parse(body: &str) -> Result<Placeholder<'_>, ErrPack<LoweringError>> {
	let placeholder = match body.split_once('(') {
		None => Placeholder { marker: body, arg: None },
		Some((marker, rest)) => {
			let Some(arg) = rest.strip_suffix(')') else {
				return Err(malformed(body));
			};
			Placeholder { marker, arg: Some(arg.trim()) }
		},
	};
	if !is_marker(placeholder.marker) || !placeholder.arg.is_none_or(is_ident) {
		return Err(malformed(body));
	}
	Ok(placeholder)
}

/// Rewrites every placeholder in `source` for which `resolve` returns `Some`.
///
/// Placeholders for which `resolve` returns `None` are copied unchanged, so several
/// injectors can run one after another over the same text.
#[allow(clippy::indexing_slicing)]
pub fn rewrite(
	source: &str,
	mut resolve: impl FnMut(Placeholder) -> Result<Option<String>, ErrPack<LoweringError>>,
) -> Result<String, ErrPack<LoweringError>> {
	let mut result = String::with_capacity(source.len());
	let mut rest = source;
	while let Some(start) = rest.find(DELIMITER) {
		let (text, tail) = rest.split_at(start);
		result.push_str(text);

		let tail = &tail[DELIMITER.len()..];
		let Some(end) = tail.find(DELIMITER) else {
			return Err(ErrPack::with_message(
				LoweringError::MalformedPlaceholder,
				"unterminated placeholder",
			));
		};
		let body = &tail[..end];
		match resolve(parse(body)?)? {
			Some(replacement) => result.push_str(&replacement),
			None => {
				result.push_str(DELIMITER);
				result.push_str(body);
				result.push_str(DELIMITER);
			},
		}
		rest = &tail[end + DELIMITER.len()..];
	}
	result.push_str(rest);
	Ok(result)
}

/// Fails if any placeholder is left in `source`.
pub fn ensure_resolved(source: &str) -> Result<(), ErrPack<LoweringError>> {
	rewrite(source, |placeholder| {
		Err(ErrPack::with_message(
			LoweringError::UnresolvedPlaceholder,
			format!("unresolved placeholder {placeholder:?}"),
		))
	})
	.map(|_| ())
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
