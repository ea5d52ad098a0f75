// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors that can occur during K8s operations.
#[derive(Error, Debug)]
pub enum K8sError {
	#[error("K8s API error: {message}")]
	ApiError { message: String },

	#[error("Pod not found: {name}")]
	PodNotFound { name: String },

	#[error("Service not found: {name}")]
	ServiceNotFound { name: String },

	#[error("Namespace not found: {name}")]
	NamespaceNotFound { name: String },
}

impl K8sError {
	/// Whether the error means the object does not exist.
	pub fn is_not_found(&self) -> bool {
		matches!(
			self,
			K8sError::PodNotFound { .. }
				| K8sError::ServiceNotFound { .. }
				| K8sError::NamespaceNotFound { .. }
		)
	}
}

impl From<kube::Error> for K8sError {
	fn from(err: kube::Error) -> Self {
		K8sError::ApiError {
			message: err.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn not_found_variants_are_detected() {
		assert!(K8sError::PodNotFound { name: "p".into() }.is_not_found());
		assert!(K8sError::ServiceNotFound { name: "s".into() }.is_not_found());
		assert!(K8sError::NamespaceNotFound { name: "n".into() }.is_not_found());
		assert!(!K8sError::ApiError {
			message: "quota exceeded".into()
		}
		.is_not_found());
	}

	#[test]
	fn display_includes_object_name() {
		let err = K8sError::ServiceNotFound {
			name: "browser-abc".into(),
		};
		assert_eq!(err.to_string(), "Service not found: browser-abc");
	}
}
