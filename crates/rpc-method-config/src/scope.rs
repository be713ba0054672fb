//! Configuration scopes.
//!
//! Scopes form a small hierarchy: a framework hosts applications, and an
//! application is split into modules. Method settings may only belong to a
//! module scope. [`Scope`] is the sum type callers hand to the binder; the
//! binder checks the variant instead of downcasting.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::manager::ModuleConfigManager;

/// Name given to the default module when none is configured.
pub const DEFAULT_MODULE_NAME: &str = "default-module";

/// The level of a configuration scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Process-wide framework scope.
    Framework,
    /// Whole-application scope.
    Application,
    /// A module within an application.
    Module,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Framework => write!(f, "framework"),
            Self::Application => write!(f, "application"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// A reference to any configuration scope.
///
/// Equality is identity: two `Scope`s are equal only when they point at the
/// same scope instance.
#[derive(Debug, Clone)]
pub enum Scope {
    /// Framework scope
    Framework(Arc<FrameworkScope>),
    /// Application scope
    Application(Arc<ApplicationScope>),
    /// Module scope
    Module(Arc<ModuleScope>),
}

impl Scope {
    /// The level of this scope.
    #[must_use]
    pub const fn kind(&self) -> ScopeKind {
        match self {
            Self::Framework(_) => ScopeKind::Framework,
            Self::Application(_) => ScopeKind::Application,
            Self::Module(_) => ScopeKind::Module,
        }
    }

    /// Human-readable scope name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Framework(scope) => scope.name(),
            Self::Application(scope) => scope.name(),
            Self::Module(scope) => scope.name(),
        }
    }

    /// Returns the module scope, if this is one.
    #[must_use]
    pub fn as_module(&self) -> Option<&Arc<ModuleScope>> {
        match self {
            Self::Module(module) => Some(module),
            _ => None,
        }
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Framework(a), Self::Framework(b)) => Arc::ptr_eq(a, b),
            (Self::Application(a), Self::Application(b)) => Arc::ptr_eq(a, b),
            (Self::Module(a), Self::Module(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Scope {}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} scope '{}'", self.kind(), self.name())
    }
}

impl From<Arc<ModuleScope>> for Scope {
    fn from(module: Arc<ModuleScope>) -> Self {
        Self::Module(module)
    }
}

impl From<Arc<ApplicationScope>> for Scope {
    fn from(application: Arc<ApplicationScope>) -> Self {
        Self::Application(application)
    }
}

impl From<Arc<FrameworkScope>> for Scope {
    fn from(framework: Arc<FrameworkScope>) -> Self {
        Self::Framework(framework)
    }
}

/// Framework scope, wider than any application.
#[derive(Debug)]
pub struct FrameworkScope {
    name: String,
}

impl FrameworkScope {
    /// Create a framework scope.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into() })
    }

    /// Scope name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Application scope. Owns its modules.
#[derive(Debug)]
pub struct ApplicationScope {
    name: String,
    default_module_name: String,
    this: Weak<ApplicationScope>,
    modules: RwLock<Vec<Arc<ModuleScope>>>,
    default_module: RwLock<Option<Arc<ModuleScope>>>,
    destroyed: AtomicBool,
}

impl ApplicationScope {
    /// Create an application scope whose default module uses [`DEFAULT_MODULE_NAME`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_default_module_name(name, DEFAULT_MODULE_NAME)
    }

    /// Create an application scope with a custom default module name.
    #[must_use]
    pub fn with_default_module_name(
        name: impl Into<String>,
        default_module_name: impl Into<String>,
    ) -> Arc<Self> {
        let name = name.into();
        let default_module_name = default_module_name.into();
        Arc::new_cyclic(|this| Self {
            name,
            default_module_name,
            this: this.clone(),
            modules: RwLock::new(Vec::new()),
            default_module: RwLock::new(None),
            destroyed: AtomicBool::new(false),
        })
    }

    /// Scope name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create and register a new module in this application.
    ///
    /// Module ids are `"{application}.{index}"` in creation order. Modules
    /// created after [`destroy`](Self::destroy) start out destroyed.
    pub fn new_module(&self, name: impl Into<String>) -> Arc<ModuleScope> {
        let mut modules = self.modules.write();
        let module = Arc::new(ModuleScope {
            name: name.into(),
            id: format!("{}.{}", self.name, modules.len()),
            application: self.this.clone(),
            config_manager: ModuleConfigManager::new(),
            destroyed: AtomicBool::new(self.is_destroyed()),
        });
        modules.push(Arc::clone(&module));
        tracing::debug!(application = %self.name, module = %module.id, "Created module scope");
        module
    }

    /// The default module, created on first access.
    ///
    /// Every call returns the same module for the lifetime of the application.
    pub fn default_module(&self) -> Arc<ModuleScope> {
        if let Some(module) = self.default_module.read().as_ref() {
            return Arc::clone(module);
        }

        let mut slot = self.default_module.write();
        // Another thread may have won the race between the two locks.
        if let Some(module) = slot.as_ref() {
            return Arc::clone(module);
        }
        let module = self.new_module(self.default_module_name.clone());
        *slot = Some(Arc::clone(&module));
        module
    }

    /// All modules created so far, in creation order.
    #[must_use]
    pub fn modules(&self) -> Vec<Arc<ModuleScope>> {
        self.modules.read().clone()
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Tear down this application and every module it owns.
    ///
    /// Module configuration managers are cleared. Calling this twice is a no-op.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        for module in self.modules.read().iter() {
            module.destroy();
        }
        tracing::debug!(application = %self.name, "Destroyed application scope");
    }
}

/// Module scope: the only scope method settings can bind to.
#[derive(Debug)]
pub struct ModuleScope {
    name: String,
    id: String,
    application: Weak<ApplicationScope>,
    config_manager: ModuleConfigManager,
    destroyed: AtomicBool,
}

impl ModuleScope {
    /// Module name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module id, unique within its application.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The owning application, if it is still alive.
    #[must_use]
    pub fn application(&self) -> Option<Arc<ApplicationScope>> {
        self.application.upgrade()
    }

    /// Configuration manager holding settings registered in this module.
    #[must_use]
    pub fn config_manager(&self) -> &ModuleConfigManager {
        &self.config_manager
    }

    /// Whether the owning application has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
        self.config_manager.clear();
    }
}
