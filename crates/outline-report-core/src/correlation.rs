// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Correlation identifiers linking a report to a client-side event.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier attached to a report so it can be cross-referenced with an
/// event captured elsewhere (for example by the client's web layer).
///
/// Caller-supplied identifiers are kept verbatim. When none is supplied a
/// random v4 UUID stands in, so the report is not clustered with unrelated
/// reports on the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
	/// Generates a fresh random identifier.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	/// Uses `supplied` when present, otherwise generates a fresh identifier.
	pub fn from_optional(supplied: Option<&str>) -> Self {
		match supplied {
			Some(id) => Self(id.to_string()),
			None => Self::generate(),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<String> for CorrelationId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&str> for CorrelationId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl fmt::Display for CorrelationId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn generated_ids_are_uuids() {
		let id = CorrelationId::generate();
		assert!(Uuid::parse_str(id.as_str()).is_ok());
	}

	#[test]
	fn consecutive_generated_ids_differ() {
		let a = CorrelationId::from_optional(None);
		let b = CorrelationId::from_optional(None);
		assert_ne!(a, b);
	}

	proptest! {
		#[test]
		fn supplied_id_is_kept_verbatim(id in ".*") {
			let correlation = CorrelationId::from_optional(Some(&id));
			prop_assert_eq!(correlation.as_str(), id.as_str());
		}
	}
}
