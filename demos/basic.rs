//! Basic example: flags, variants, and resolution
//!
//! This example demonstrates:
//! - Loading a configuration from JSON
//! - Resolving flags with and without a context
//! - Inspecting which variant supplied a value

use serde_json::json;
use variantly::*;

fn main() -> Result<(), VariantError> {
    let registry = Registry::new();

    println!("Loading configuration...");
    registry.load_config_from_value(json!({
        "flags": [
            { "name": "max_items", "description": "Items per page", "baseValue": 10 },
            { "name": "theme", "description": "UI theme", "baseValue": "light" }
        ],
        "variants": [
            {
                "identifier": "everyone_gets_more_items",
                "operator": "AND",
                "conditions": [],
                "mods": [{ "flagName": "max_items", "value": 20 }]
            },
            {
                "identifier": "dark_theme_rollout",
                "operator": "AND",
                "conditions": [{ "type": "RANDOM", "params": 0.25 }],
                "mods": [{ "flagName": "theme", "value": "dark" }]
            }
        ]
    }))?;

    println!("\nFlags:");
    for name in registry.flag_names() {
        if let Some(flag) = registry.flag(name.as_str()) {
            println!("  {} = {} ({})", name, flag.base_value(), flag.description());
        }
    }

    println!("\nResolved values:");
    println!("  max_items = {}", registry.flag_value_without_context("max_items")?);

    let mut dark = 0;
    for _ in 0..1_000 {
        if registry.flag_value_without_context("theme")? == json!("dark") {
            dark += 1;
        }
    }
    println!("  theme = dark in {dark} of 1000 evaluations (RANDOM 0.25)");

    println!("\nProvenance:");
    let resolved = registry.resolve("max_items", None)?;
    println!("  {} = {} from {:?}", resolved.flag, resolved.value, resolved.source);

    match registry.flag_value_without_context("does_not_exist") {
        Err(err) => println!("\nExpected error: {err}"),
        Ok(value) => println!("\nUnexpected value: {value}"),
    }

    Ok(())
}
