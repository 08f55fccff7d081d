// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conformance-testing core for LLM integrations.
//!
//! This crate checks whether a component type (a text-generation model, a
//! chat model or an embedding model) honours the contract expected of its
//! category, and condenses the outcome into a [`TestResult`] with a
//! compatibility score in `[0.0, 1.0]`.
//!
//! # Quick Start
//!
//! ```ignore
//! use llm_health_core::{Category, IntegrationTester};
//!
//! let mut tester = IntegrationTester::new(Category::Llms, component, config);
//! let result = tester.run_all_tests().await;
//! assert!(result.compatibility_score <= 1.0);
//! ```
//!
//! # Modules
//!
//! - [`component`] - The component contract under test
//! - [`capability`] - Capability flags and method tables
//! - [`strategy`] - Per-category probe strategies
//! - [`harness`] - The test pipeline
//! - [`suite`] - Running many components at once
//! - [`score`] - The scoring formula
//! - [`result`] - The `TestResult` record

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capability;
pub mod component;
pub mod error;
pub mod harness;
pub mod probe;
pub mod result;
pub mod score;
pub mod strategy;
pub mod suite;

pub use capability::{Capability, MethodPresence, MethodShape, MethodTable};
pub use component::{
    ChunkStream, Component, ComponentConfig, ComponentType, Message, ModelInput, ModelOutput,
    OutputSchema, Role, ToolSpec,
};
pub use error::{ComponentError, HarnessError, Result};
pub use harness::{InstancePolicy, IntegrationTester, Phase, RunReport};
pub use result::TestResult;
pub use strategy::{CapabilityStrategy, Category, ParseCategoryError, Strategy};
pub use suite::{SuiteEntry, SuiteOptions, TestSuite};
