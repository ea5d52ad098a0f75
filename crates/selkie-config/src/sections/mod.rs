// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod browser;
mod logging;

pub use browser::{BrowserConfig, BrowserConfigLayer, NamingMode};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
