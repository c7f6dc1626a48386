//! Reload example: atomic reloads and change notifications
//!
//! This example demonstrates:
//! - A process-wide registry owned by the application
//! - Subscribing to change events
//! - Rejected reloads leaving the previous configuration in place
//! - Logging through `tracing`

use serde_json::json;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use variantly::*;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::new)
}

fn main() -> Result<(), VariantError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let mut changes = registry().subscribe();

    registry().load_config_from_slice(
        br#"{
            "flags": [{ "name": "banner", "baseValue": "none" }],
            "variants": [{
                "identifier": "spring_sale",
                "mods": [{ "flagName": "banner", "value": "spring" }]
            }]
        }"#,
    )?;
    println!("banner = {}", registry().flag_value_without_context("banner")?);

    while let Ok(event) = changes.try_recv() {
        println!("registry {} changed", event.registry_id);
    }

    println!("\nLoading a broken configuration...");
    let result = registry().load_config_from_value(json!({
        "flags": [{ "name": "banner", "baseValue": "none" }],
        "variants": [{ "identifier": "summer_sale", "mods": [] }]
    }));
    if let Err(err) = result {
        println!("rejected: {err}");
    }
    println!("banner = {} (unchanged)", registry().flag_value_without_context("banner")?);
    println!("pending change events: {}", changes.len());

    Ok(())
}
