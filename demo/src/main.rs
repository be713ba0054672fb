//! Settings demo
//!
//! Assembles settings for two methods of one service, publishes them into the
//! default module and prints the parameter map an invoker would receive.
//! Logs go to stderr; set `RUST_LOG=debug` to see binding and export events.

use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use rpc_method_config::{
    ContextOptions, DefaultContext, InvocationSettings, append_parameters, export_parameters,
};
use tracing_subscriber::{EnvFilter, fmt};

fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let context = DefaultContext::with_options(
        ContextOptions::builder()
            .application_name("greeter")
            .build(),
    );

    let mut say_hello = InvocationSettings::in_default_scope(&context);
    say_hello.set_timeout(1_500)?.set_retries(2)?.set_actives(20)?;
    say_hello
        .set_loadbalance("roundrobin")
        .set_mock("force:return Hello, fallback!")
        .insert_parameter("token-ttl", "30");

    let mut notify = InvocationSettings::in_default_scope(&context);
    notify.set_forks(3)?.set_retries(0)?;
    notify.set_async(true).set_sent(true).set_merger("list");

    let manager = say_hello
        .module_config_manager()
        .context("settings are not bound")?;
    manager.add_method_settings("sayHello", say_hello);
    manager.add_method_settings("notify", notify);
    tracing::info!(methods = manager.len(), "Published method settings");

    let mut service_params = HashMap::new();
    for id in manager.method_ids() {
        let settings = manager
            .method_settings(&id)
            .with_context(|| format!("method {id} vanished"))?;
        println!("{id}: {:?}", sorted(export_parameters(&settings)));
        append_parameters(&settings, &mut service_params, Some(&id));
    }
    println!("service: {:?}", sorted(service_params));

    context.shutdown();
    Ok(())
}

fn sorted(parameters: HashMap<String, String>) -> BTreeMap<String, String> {
    parameters.into_iter().collect()
}
