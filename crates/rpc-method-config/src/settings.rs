//! Per-method invocation settings.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::context::DefaultContext;
use crate::error::{ConfigError, ConfigResult};
use crate::manager::ModuleConfigManager;
use crate::scope::{ModuleScope, Scope, ScopeKind};

/// Named fields of [`InvocationSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Remote call timeout in milliseconds
    Timeout,
    /// Retries, excluding the first attempt
    Retries,
    /// Max concurrent in-flight invocations
    Actives,
    /// Load-balancing policy name
    Loadbalance,
    /// Fire-and-forget invocation
    Async,
    /// Wait for the send acknowledgement when async
    Sent,
    /// Client-side fallback on non-business failure
    Mock,
    /// Result caching strategy
    Cache,
    /// Parameter validation mode
    Validation,
    /// Forking-cluster fan-out
    Forks,
    /// Result merging strategy
    Merger,
    /// Owning module scope
    Scope,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 12] = [
        Field::Timeout,
        Field::Retries,
        Field::Actives,
        Field::Loadbalance,
        Field::Async,
        Field::Sent,
        Field::Mock,
        Field::Cache,
        Field::Validation,
        Field::Forks,
        Field::Merger,
        Field::Scope,
    ];

    /// Field name, which is also its export key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Retries => "retries",
            Self::Actives => "actives",
            Self::Loadbalance => "loadbalance",
            Self::Async => "async",
            Self::Sent => "sent",
            Self::Mock => "mock",
            Self::Cache => "cache",
            Self::Validation => "validation",
            Self::Forks => "forks",
            Self::Merger => "merger",
            Self::Scope => "scope",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Invocation behavior for one method: timeouts, retries, concurrency,
/// load balancing, async semantics, mock fallback, caching, validation,
/// forking and result merging, plus free-form extension parameters.
///
/// Unset fields read as `None`, so "not configured" is distinguishable from
/// "configured as zero/false". Numeric setters reject values that break the
/// field's invariant; nothing checks combinations of fields.
///
/// A record is assembled by one caller and treated as immutable once
/// published, e.g. through [`ModuleConfigManager::add_method_settings`].
///
/// # Example
///
/// ```rust
/// use rpc_method_config::{DefaultContext, InvocationSettings, export_parameters};
///
/// let context = DefaultContext::new();
/// let mut settings = InvocationSettings::in_default_scope(&context);
/// settings.set_timeout(500)?.set_retries(2)?;
/// settings.set_loadbalance("roundrobin").set_mock("return null");
///
/// let params = export_parameters(&settings);
/// assert_eq!(params["timeout"], "500");
/// assert_eq!(params["mock"], "return%20null");
/// # Ok::<(), rpc_method_config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InvocationSettings {
    timeout: Option<i32>,
    retries: Option<i32>,
    actives: Option<i32>,
    loadbalance: Option<String>,
    is_async: Option<bool>,
    sent: Option<bool>,
    mock: Option<String>,
    cache: Option<String>,
    validation: Option<String>,
    forks: Option<i32>,
    merger: Option<String>,
    parameters: HashMap<String, String>,
    scope: Option<Weak<ModuleScope>>,
}

impl InvocationSettings {
    /// Create unbound settings with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create settings bound to `scope`.
    ///
    /// # Errors
    ///
    /// `InvalidScopeKind` if `scope` is `None` or not a module scope.
    pub fn in_scope(scope: Option<Scope>) -> ConfigResult<Self> {
        let mut settings = Self::new();
        settings.bind(scope)?;
        Ok(settings)
    }

    /// Create settings bound to the default module of `context`.
    #[must_use]
    pub fn in_default_scope(context: &DefaultContext) -> Self {
        let mut settings = Self::new();
        settings.bind_default(context);
        settings
    }

    // ---------------------------------------------------------------------
    // Scope binding
    // ---------------------------------------------------------------------

    /// Bind these settings to `scope`, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// `InvalidScopeKind` if `scope` is `None` or is a framework or application
    /// scope; `DestroyedScope` if the module's application has been destroyed.
    /// The existing binding is left untouched on error.
    pub fn bind(&mut self, scope: Option<Scope>) -> ConfigResult<&mut Self> {
        let scope = scope.ok_or_else(|| ConfigError::null_scope(ScopeKind::Module))?;
        let module = match scope {
            Scope::Module(module) => module,
            other => {
                return Err(ConfigError::InvalidScopeKind {
                    expected: ScopeKind::Module,
                    found: other.to_string(),
                });
            }
        };
        if module.is_destroyed() {
            return Err(ConfigError::DestroyedScope {
                module: module.id().to_string(),
            });
        }
        tracing::debug!(module = %module.id(), "Bound invocation settings");
        self.scope = Some(Arc::downgrade(&module));
        Ok(self)
    }

    /// Bind these settings to the default module of `context`.
    pub fn bind_default(&mut self, context: &DefaultContext) -> &mut Self {
        let module = context.current_module();
        tracing::debug!(module = %module.id(), "Bound invocation settings to default module");
        self.scope = Some(Arc::downgrade(&module));
        self
    }

    /// The module scope these settings are bound to, if bound and still alive.
    #[must_use]
    pub fn scope(&self) -> Option<Arc<ModuleScope>> {
        self.scope.as_ref().and_then(Weak::upgrade)
    }

    /// Whether a live scope is attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.scope().is_some()
    }

    /// Configuration manager of the owning module.
    ///
    /// # Errors
    ///
    /// `Unbound` if no scope was bound or the scope has been dropped.
    pub fn module_config_manager(&self) -> ConfigResult<ModuleConfigManager> {
        self.scope()
            .map(|module| module.config_manager().clone())
            .ok_or(ConfigError::Unbound)
    }

    // ---------------------------------------------------------------------
    // Numeric fields
    // ---------------------------------------------------------------------

    /// Remote call timeout in milliseconds
    #[must_use]
    pub fn timeout(&self) -> Option<i32> {
        self.timeout
    }

    /// Set the timeout; `None` clears it.
    ///
    /// # Errors
    ///
    /// `InvalidFieldValue` unless the timeout is greater than zero.
    pub fn set_timeout(&mut self, timeout: impl Into<Option<i32>>) -> ConfigResult<&mut Self> {
        self.timeout = check_positive(Field::Timeout, timeout.into())?;
        Ok(self)
    }

    /// Retries, excluding the first call
    #[must_use]
    pub fn retries(&self) -> Option<i32> {
        self.retries
    }

    /// Set the retry count; `None` clears it. Use `0` to disable retries.
    ///
    /// # Errors
    ///
    /// `InvalidFieldValue` if negative.
    pub fn set_retries(&mut self, retries: impl Into<Option<i32>>) -> ConfigResult<&mut Self> {
        self.retries = check_non_negative(Field::Retries, retries.into())?;
        Ok(self)
    }

    /// Max concurrent invocations per method
    #[must_use]
    pub fn actives(&self) -> Option<i32> {
        self.actives
    }

    /// Set the concurrency ceiling; `None` clears it.
    ///
    /// # Errors
    ///
    /// `InvalidFieldValue` if negative.
    pub fn set_actives(&mut self, actives: impl Into<Option<i32>>) -> ConfigResult<&mut Self> {
        self.actives = check_non_negative(Field::Actives, actives.into())?;
        Ok(self)
    }

    /// Forking-cluster fan-out
    #[must_use]
    pub fn forks(&self) -> Option<i32> {
        self.forks
    }

    /// Set the fan-out count; `None` clears it.
    ///
    /// # Errors
    ///
    /// `InvalidFieldValue` if negative.
    pub fn set_forks(&mut self, forks: impl Into<Option<i32>>) -> ConfigResult<&mut Self> {
        self.forks = check_non_negative(Field::Forks, forks.into())?;
        Ok(self)
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------

    /// Fire-and-forget: the return value is ignored and the caller never blocks.
    #[must_use]
    pub fn is_async(&self) -> Option<bool> {
        self.is_async
    }

    /// Set async invocation
    pub fn set_async(&mut self, is_async: impl Into<Option<bool>>) -> &mut Self {
        self.is_async = is_async.into();
        self
    }

    /// When async, whether the caller waits until the request is on the wire.
    #[must_use]
    pub fn sent(&self) -> Option<bool> {
        self.sent
    }

    /// Set send acknowledgement. Not checked against [`is_async`](Self::is_async).
    pub fn set_sent(&mut self, sent: impl Into<Option<bool>>) -> &mut Self {
        self.sent = sent.into();
        self
    }

    // ---------------------------------------------------------------------
    // Strategy names
    // ---------------------------------------------------------------------

    /// Load-balancing policy name
    #[must_use]
    pub fn loadbalance(&self) -> Option<&str> {
        self.loadbalance.as_deref()
    }

    /// Set the load-balancing policy. The name is resolved by the invoker, not here.
    pub fn set_loadbalance(&mut self, loadbalance: impl Into<String>) -> &mut Self {
        self.loadbalance = Some(loadbalance.into());
        self
    }

    /// Mock fallback run after a non-business failure such as a timeout or
    /// network error. Client side only.
    #[must_use]
    pub fn mock(&self) -> Option<&str> {
        self.mock.as_deref()
    }

    /// Set the mock fallback.
    ///
    /// The raw value is stored; escaping happens on export.
    pub fn set_mock(&mut self, mock: impl Into<String>) -> &mut Self {
        self.mock = Some(mock.into());
        self
    }

    /// Result caching strategy, e.g. `lru`, `threadlocal` or `jcache`
    #[must_use]
    pub fn cache(&self) -> Option<&str> {
        self.cache.as_deref()
    }

    /// Set the result caching strategy
    pub fn set_cache(&mut self, cache: impl Into<String>) -> &mut Self {
        self.cache = Some(cache.into());
        self
    }

    /// Parameter validation mode
    #[must_use]
    pub fn validation(&self) -> Option<&str> {
        self.validation.as_deref()
    }

    /// Set the parameter validation mode
    pub fn set_validation(&mut self, validation: impl Into<String>) -> &mut Self {
        self.validation = Some(validation.into());
        self
    }

    /// Result merging strategy
    #[must_use]
    pub fn merger(&self) -> Option<&str> {
        self.merger.as_deref()
    }

    /// Set the result merging strategy
    pub fn set_merger(&mut self, merger: impl Into<String>) -> &mut Self {
        self.merger = Some(merger.into());
        self
    }

    // ---------------------------------------------------------------------
    // Extension parameters
    // ---------------------------------------------------------------------

    /// Free-form extension parameters
    #[must_use]
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    /// Replace all extension parameters
    pub fn set_parameters(&mut self, parameters: HashMap<String, String>) -> &mut Self {
        self.parameters = parameters;
        self
    }

    /// Add or replace one extension parameter
    pub fn insert_parameter(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    // ---------------------------------------------------------------------
    // Generic access
    // ---------------------------------------------------------------------

    /// Unset a field. Clearing [`Field::Scope`] unbinds the settings.
    pub fn clear(&mut self, field: Field) -> &mut Self {
        match field {
            Field::Timeout => self.timeout = None,
            Field::Retries => self.retries = None,
            Field::Actives => self.actives = None,
            Field::Loadbalance => self.loadbalance = None,
            Field::Async => self.is_async = None,
            Field::Sent => self.sent = None,
            Field::Mock => self.mock = None,
            Field::Cache => self.cache = None,
            Field::Validation => self.validation = None,
            Field::Forks => self.forks = None,
            Field::Merger => self.merger = None,
            Field::Scope => self.scope = None,
        }
        self
    }

    /// Textual form of a field's current value, unescaped.
    ///
    /// Returns `None` for unset fields. [`Field::Scope`] yields the module id.
    #[must_use]
    pub fn value_of(&self, field: Field) -> Option<String> {
        match field {
            Field::Timeout => self.timeout.map(|v| v.to_string()),
            Field::Retries => self.retries.map(|v| v.to_string()),
            Field::Actives => self.actives.map(|v| v.to_string()),
            Field::Loadbalance => self.loadbalance.clone(),
            Field::Async => self.is_async.map(|v| v.to_string()),
            Field::Sent => self.sent.map(|v| v.to_string()),
            Field::Mock => self.mock.clone(),
            Field::Cache => self.cache.clone(),
            Field::Validation => self.validation.clone(),
            Field::Forks => self.forks.map(|v| v.to_string()),
            Field::Merger => self.merger.clone(),
            Field::Scope => self.scope().map(|module| module.id().to_string()),
        }
    }
}

fn check_positive(field: Field, value: Option<i32>) -> ConfigResult<Option<i32>> {
    match value {
        Some(v) if v <= 0 => Err(ConfigError::InvalidFieldValue {
            field: field.name(),
            value: i64::from(v),
            reason: "must be > 0",
        }),
        other => Ok(other),
    }
}

fn check_non_negative(field: Field, value: Option<i32>) -> ConfigResult<Option<i32>> {
    match value {
        Some(v) if v < 0 => Err(ConfigError::InvalidFieldValue {
            field: field.name(),
            value: i64::from(v),
            reason: "must be >= 0",
        }),
        other => Ok(other),
    }
}
