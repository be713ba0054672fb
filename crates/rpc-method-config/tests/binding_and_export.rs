//! Integration tests for scope binding, default scope resolution and parameter export

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use rpc_method_config::{
    ApplicationScope, ConfigError, ContextOptions, DefaultContext, FrameworkScope,
    InvocationSettings, Scope, ScopeKind, append_parameters, export_parameters,
};

// =============================================================================
// SCOPE BINDING
// =============================================================================

#[test]
fn test_bind_null_scope_fails() {
    let err = InvocationSettings::in_scope(None).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidScopeKind {
            expected: ScopeKind::Module,
            ..
        }
    ));
}

#[test]
fn test_bind_application_scope_fails() {
    let app = ApplicationScope::new("shop");
    let err = InvocationSettings::in_scope(Some(Scope::from(app))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid scope: expected a module scope but got application scope 'shop'"
    );
}

#[test]
fn test_bind_framework_scope_fails() {
    let err = InvocationSettings::in_scope(Some(Scope::from(FrameworkScope::new("fw"))))
        .unwrap_err();
    assert!(err.is_invalid_scope());
}

#[test]
fn test_bind_module_scope_succeeds() {
    let app = ApplicationScope::new("shop");
    let module = app.new_module("orders");
    let scope = Scope::from(Arc::clone(&module));

    let settings = InvocationSettings::in_scope(Some(scope.clone())).unwrap();
    let bound = Scope::from(settings.scope().unwrap());
    assert_eq!(bound, scope);
}

#[test]
fn test_rebind_moves_to_new_module() {
    let app = ApplicationScope::new("shop");
    let orders = app.new_module("orders");
    let billing = app.new_module("billing");

    let mut settings = InvocationSettings::in_scope(Some(Scope::from(orders))).unwrap();
    settings.bind(Some(Scope::from(Arc::clone(&billing)))).unwrap();
    assert!(Arc::ptr_eq(&settings.scope().unwrap(), &billing));
}

#[test]
fn test_bind_module_of_shut_down_context_fails() {
    let context = DefaultContext::new();
    let stale = context.current_module();
    context.shutdown();

    let err = InvocationSettings::in_scope(Some(Scope::from(stale))).unwrap_err();
    assert!(matches!(err, ConfigError::DestroyedScope { .. }));
    assert!(err.is_invalid_scope());

    let settings = InvocationSettings::in_default_scope(&context);
    assert!(!settings.scope().unwrap().is_destroyed());
}

// =============================================================================
// DEFAULT SCOPE
// =============================================================================

#[test]
fn test_default_binding_uses_current_module() {
    let context = DefaultContext::new();
    let settings = InvocationSettings::in_default_scope(&context);
    assert!(Arc::ptr_eq(
        &settings.scope().unwrap(),
        &context.current_module()
    ));
}

#[test]
fn test_default_binding_follows_options() {
    let context = DefaultContext::with_options(
        ContextOptions::builder()
            .application_name("inventory")
            .module_name("stock")
            .build(),
    );
    let settings = InvocationSettings::in_default_scope(&context);
    let module = settings.scope().unwrap();
    assert_eq!(module.name(), "stock");
    assert_eq!(module.application().unwrap().name(), "inventory");
}

#[test]
fn test_concurrent_resolution_yields_one_module() {
    let context = Arc::new(DefaultContext::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            thread::spawn(move || context.current_module())
        })
        .collect();

    let modules: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for module in &modules[1..] {
        assert!(Arc::ptr_eq(module, &modules[0]));
    }
    assert_eq!(context.current_application().modules().len(), 1);
}

#[test]
fn test_shutdown_unbinds_through_weak_reference() {
    let context = DefaultContext::new();
    let settings = InvocationSettings::in_default_scope(&context);
    assert!(settings.is_bound());

    context.shutdown();
    assert!(!settings.is_bound());
    assert_eq!(
        settings.module_config_manager().unwrap_err(),
        ConfigError::Unbound
    );

    let rebound = InvocationSettings::in_default_scope(&context);
    assert!(rebound.is_bound());
}

// =============================================================================
// REGISTRATION
// =============================================================================

#[test]
fn test_register_and_lookup_through_scope() {
    let context = DefaultContext::new();
    let mut settings = InvocationSettings::in_default_scope(&context);
    settings.set_timeout(200).unwrap();

    let manager = settings.module_config_manager().unwrap();
    manager.add_method_settings("sayHello", settings);

    let found = context
        .current_module()
        .config_manager()
        .method_settings("sayHello")
        .unwrap();
    assert_eq!(found.timeout(), Some(200));
}

#[test]
fn test_shutdown_clears_registry() {
    let context = DefaultContext::new();
    let module = context.current_module();
    let settings = InvocationSettings::in_default_scope(&context);
    module.config_manager().add_method_settings("m", settings);

    context.shutdown();
    assert!(module.config_manager().is_empty());
}

// =============================================================================
// EXPORT
// =============================================================================

#[test]
#[allow(deprecated)]
fn test_legacy_none_then_export() {
    let mut settings = InvocationSettings::new();
    settings.set_mock("foo");
    settings.set_mock_legacy(None::<String>);

    let params = export_parameters(&settings);
    assert_eq!(params["mock"], "foo");
}

#[test]
#[allow(deprecated)]
fn test_legacy_mock_is_escaped_on_export() {
    let mut settings = InvocationSettings::new();
    settings.set_mock_legacy(Some("a=b&c"));

    assert_eq!(settings.mock(), Some("a=b&c"));
    assert_eq!(export_parameters(&settings)["mock"], "a%3Db%26c");
}

#[test]
fn test_zero_actives_and_forks_are_exported() {
    let mut settings = InvocationSettings::new();
    settings.set_actives(0).unwrap().set_forks(0).unwrap();

    let params = export_parameters(&settings);
    assert_eq!(params["actives"], "0");
    assert_eq!(params["forks"], "0");
}

#[test]
fn test_mock_with_delimiters_is_escaped_once() {
    let mut settings = InvocationSettings::new();
    settings.set_mock("force:return a=1&b=2");

    let first = export_parameters(&settings);
    let second = export_parameters(&settings);
    assert_eq!(first["mock"], "force%3Areturn%20a%3D1%26b%3D2");
    assert_eq!(first, second);
    assert_eq!(settings.mock(), Some("force:return a=1&b=2"));
}

#[test]
fn test_retries_validation_and_export() {
    let mut settings = InvocationSettings::new();
    assert!(matches!(
        settings.set_retries(-1),
        Err(ConfigError::InvalidFieldValue {
            field: "retries",
            ..
        })
    ));

    settings.set_retries(0).unwrap();
    assert_eq!(export_parameters(&settings)["retries"], "0");

    settings.set_retries(5).unwrap();
    assert_eq!(export_parameters(&settings)["retries"], "5");
}

#[test]
fn test_unset_field_is_absent() {
    let mut settings = InvocationSettings::new();
    settings.set_loadbalance("random");
    let params = export_parameters(&settings);
    assert!(!params.contains_key("cache"));
    assert_eq!(params.len(), 1);
}

#[test]
fn test_named_field_wins_over_extension() {
    let mut settings = InvocationSettings::new();
    settings.set_parameters(HashMap::from([
        ("timeout".to_string(), "999".to_string()),
        ("region".to_string(), "eu".to_string()),
    ]));
    settings.set_timeout(50).unwrap();

    let params = export_parameters(&settings);
    assert_eq!(params["timeout"], "50");
    assert_eq!(params["region"], "eu");
}

#[test]
fn test_scope_is_never_exported() {
    let context = DefaultContext::new();
    let settings = InvocationSettings::in_default_scope(&context);
    let params = export_parameters(&settings);
    assert!(params.is_empty());
}

#[test]
fn test_method_prefixed_export() {
    let mut service_params = HashMap::from([("retries".to_string(), "2".to_string())]);

    let mut say_hello = InvocationSettings::new();
    say_hello.set_retries(0).unwrap().set_async(true);
    append_parameters(&say_hello, &mut service_params, Some("sayHello"));

    assert_eq!(
        service_params,
        HashMap::from([
            ("retries".to_string(), "2".to_string()),
            ("sayHello.retries".to_string(), "0".to_string()),
            ("sayHello.async".to_string(), "true".to_string()),
        ])
    );
}
