// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the PaddleOCR service

/// Version reported by `/` and `/health`
pub const VERSION: &str = "1.0.0";

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "PaddleOCR";

/// Service name reported by `/`
pub const ROOT_SERVICE_NAME: &str = "PaddleOCR GPU Service";

/// Crate version the binary was built from
pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} v{} (build {})", SERVICE_NAME, VERSION, BUILD_VERSION)
}
