//! Typed JSON request/response codec.
//!
//! Encoding failures are returned as [`EncodeError`] instead of producing an empty body, and
//! decoding is all-or-nothing: a body either deserializes into the full target type or the
//! call fails with a path-aware [`DecodeError`].

// std
use std::any;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{DecodeError, EncodeError},
};

/// Serializes a request body to JSON bytes.
pub fn encode<B>(body: &B) -> Result<Vec<u8>>
where
	B: ?Sized + Serialize,
{
	serde_json::to_vec(body)
		.map_err(|source| EncodeError { target: short_type_name::<B>(), source }.into())
}

/// Deserializes a response body carried by an HTTP response with `status`.
pub fn decode<T>(status: u16, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let target = short_type_name::<T>();
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
		let path = err.path().to_string();

		DecodeError { target, status, path, source: err.into_inner() }
	})?;

	// Trailing bytes after a complete document are still a malformed body.
	deserializer
		.end()
		.map_err(|source| DecodeError { target, status, path: ".".into(), source })?;

	Ok(value)
}

fn short_type_name<T>() -> &'static str
where
	T: ?Sized,
{
	let full = any::type_name::<T>();

	full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ErrorKind;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Probe {
		id: String,
		nested: Nested,
	}

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Nested {
		count: u32,
	}

	#[test]
	fn decode_reports_the_failing_path() {
		let err = decode::<Probe>(200, br#"{"id":"c1","nested":{"count":"many"}}"#)
			.expect_err("Type mismatches must fail to decode.");

		assert_eq!(err.kind(), ErrorKind::Decode);

		let Error::Decode(decode) = err else { panic!("Expected a decode error.") };

		assert_eq!(decode.target, "Probe");
		assert_eq!(decode.status, 200);
		assert_eq!(decode.path, "nested.count");
	}

	#[test]
	fn truncated_and_empty_bodies_fail() {
		let bodies: [&[u8]; 4] = [br#"{"id":"c1","nested":{"cou"#, b"", b"null", b"{}"];

		for body in bodies {
			let err = decode::<Probe>(200, body)
				.expect_err("Incomplete bodies must never decode to a value.");

			assert_eq!(err.kind(), ErrorKind::Decode);
		}
	}

	#[test]
	fn trailing_garbage_is_rejected() {
		let err = decode::<Probe>(200, br#"{"id":"c1","nested":{"count":1}} tail"#)
			.expect_err("Trailing bytes must fail to decode.");

		assert_eq!(err.kind(), ErrorKind::Decode);
	}

	#[test]
	fn encode_then_decode_preserves_values() {
		let probe = Probe { id: "c1".into(), nested: Nested { count: 3 } };
		let bytes = encode(&probe).expect("Probe should encode.");

		assert_eq!(bytes, br#"{"id":"c1","nested":{"count":3}}"#.to_vec());
		assert_eq!(decode::<Probe>(200, &bytes).expect("Probe should decode."), probe);
	}

	#[test]
	fn encode_failures_surface() {
		let mut map = std::collections::HashMap::new();

		map.insert((1, 2), "tuple keys are not valid JSON object keys");

		let err = encode(&map).expect_err("Non-string map keys must fail to encode.");

		assert_eq!(err.kind(), ErrorKind::Encode);
	}
}
