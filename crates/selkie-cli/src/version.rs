// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Build information for the selkie binary.

/// Platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
fn platform() -> String {
	format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"selkie version: {}\n\
         Platform:       {}",
		env!("CARGO_PKG_VERSION"),
		platform(),
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_info_mentions_package_version() {
		let info = format_version_info();
		assert!(info.contains(env!("CARGO_PKG_VERSION")));
		assert!(info.contains(std::env::consts::OS));
	}
}
