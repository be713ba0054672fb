//! Default scope resolution.
//!
//! Callers that never set up their own applications and modules still need a
//! scope to bind settings to. A [`DefaultContext`] is created once at process
//! start and passed to whoever needs it; it lazily creates a default
//! application whose default module is handed out by
//! [`current_module`](DefaultContext::current_module).
//!
//! # Example
//!
//! ```rust
//! use rpc_method_config::{ContextOptions, DefaultContext, InvocationSettings};
//!
//! let context = DefaultContext::with_options(
//!     ContextOptions::builder().application_name("orders").build(),
//! );
//! let settings = InvocationSettings::in_default_scope(&context);
//! assert_eq!(settings.scope().unwrap().id(), "orders.0");
//! ```

use parking_lot::RwLock;
use std::sync::Arc;

use crate::scope::{ApplicationScope, DEFAULT_MODULE_NAME, ModuleScope};

/// Name given to the default application when none is configured.
pub const DEFAULT_APPLICATION_NAME: &str = "default-application";

/// Options for a [`DefaultContext`].
///
/// Use [`ContextOptionsBuilder`] for construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Name of the lazily created default application
    pub application_name: String,
    /// Name of that application's default module
    pub module_name: String,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            module_name: DEFAULT_MODULE_NAME.to_string(),
        }
    }
}

impl ContextOptions {
    /// Create a new options builder
    #[must_use]
    pub fn builder() -> ContextOptionsBuilder {
        ContextOptionsBuilder::default()
    }
}

/// Builder for [`ContextOptions`]
#[derive(Debug, Clone, Default)]
pub struct ContextOptionsBuilder {
    application_name: Option<String>,
    module_name: Option<String>,
}

impl ContextOptionsBuilder {
    /// Set the default application name
    #[must_use]
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Set the default module name
    #[must_use]
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ContextOptions {
        let defaults = ContextOptions::default();
        ContextOptions {
            application_name: self.application_name.unwrap_or(defaults.application_name),
            module_name: self.module_name.unwrap_or(defaults.module_name),
        }
    }
}

/// Holder of the default application scope.
///
/// Resolution is safe from many threads at once: the first caller creates the
/// application, every other caller observes the same instance until
/// [`shutdown`](Self::shutdown).
#[derive(Debug, Default)]
pub struct DefaultContext {
    options: ContextOptions,
    application: RwLock<Option<Arc<ApplicationScope>>>,
}

impl DefaultContext {
    /// Create a context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with custom options.
    #[must_use]
    pub fn with_options(options: ContextOptions) -> Self {
        Self {
            options,
            application: RwLock::new(None),
        }
    }

    /// Options this context was created with.
    #[must_use]
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// The default application, created on first access.
    pub fn current_application(&self) -> Arc<ApplicationScope> {
        if let Some(application) = self.application.read().as_ref() {
            return Arc::clone(application);
        }

        let mut slot = self.application.write();
        if let Some(application) = slot.as_ref() {
            return Arc::clone(application);
        }
        let application = ApplicationScope::with_default_module_name(
            self.options.application_name.clone(),
            self.options.module_name.clone(),
        );
        tracing::debug!(application = %application.name(), "Created default application scope");
        *slot = Some(Arc::clone(&application));
        application
    }

    /// The default module of the default application.
    pub fn current_module(&self) -> Arc<ModuleScope> {
        self.current_application().default_module()
    }

    /// Whether the default application currently exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.application.read().is_some()
    }

    /// Destroy the default application.
    ///
    /// The next resolution creates a fresh application. Does nothing if no
    /// application was ever created.
    pub fn shutdown(&self) {
        let application = self.application.write().take();
        if let Some(application) = application {
            application.destroy();
            tracing::info!(application = %application.name(), "Default application shut down");
        }
    }
}
