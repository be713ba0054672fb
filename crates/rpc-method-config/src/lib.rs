//! # RPC Method Config
//!
//! Per-method invocation settings for RPC consumers and providers.
//!
//! ## Overview
//!
//! This crate defines:
//! - **Settings**: [`InvocationSettings`], the typed per-method record (timeout, retries,
//!   actives, load balancing, async/sent, mock, cache, validation, forks, merger and
//!   extension parameters)
//! - **Scopes**: [`Scope`], [`ApplicationScope`], [`ModuleScope`] and the
//!   [`DefaultContext`] that supplies a default module
//! - **Registry**: [`ModuleConfigManager`], reached through a bound module scope
//! - **Export**: [`export_parameters`] and [`append_parameters`], driven by the
//!   [`EXPORT_POLICIES`] table
//! - **Errors**: [`ConfigError`], [`ConfigResult`]
//!
//! ## Usage
//!
//! ```rust
//! use rpc_method_config::{DefaultContext, InvocationSettings, export_parameters};
//!
//! let context = DefaultContext::new();
//! let mut settings = InvocationSettings::in_default_scope(&context);
//! settings.set_timeout(1_000)?.set_retries(0)?;
//! settings.insert_parameter("timeout", "999");
//!
//! let params = export_parameters(&settings);
//! assert_eq!(params["timeout"], "1000");
//! assert_eq!(params["retries"], "0");
//! assert!(!params.contains_key("cache"));
//! # Ok::<(), rpc_method_config::ConfigError>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

mod context;
mod error;
mod export;
mod legacy;
mod manager;
mod scope;
mod settings;

// Re-export all public items
pub use context::{ContextOptions, ContextOptionsBuilder, DEFAULT_APPLICATION_NAME, DefaultContext};
pub use error::{ConfigError, ConfigResult};
pub use export::{
    EXPORT_POLICIES, ExportRule, FieldPolicy, append_parameters, escape_value, export_parameters,
    policy_for,
};
pub use manager::ModuleConfigManager;
pub use scope::{
    ApplicationScope, DEFAULT_MODULE_NAME, FrameworkScope, ModuleScope, Scope, ScopeKind,
};
pub use settings::{Field, InvocationSettings};
