// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Component registry, built-in integrations and configuration.
//!
//! The registry is the explicit replacement for scanning installed packages:
//! every testable component type is registered under its [`Category`] and
//! handed to the harness as an `Arc<dyn ComponentType>`.
//!
//! [`Category`]: llm_health_core::Category

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod mock;
pub mod registry;
pub mod settings;

pub use registry::{BuiltinComponent, ComponentRegistry, IntegrationInfo};
pub use settings::{ConfigError, HealthConfig};
