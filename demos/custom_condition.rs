//! Custom condition example: registering a new condition type
//!
//! This example demonstrates:
//! - Registering a condition type that reads the context
//! - Combining conditions with OR
//! - Duplicate registration errors

use serde_json::{json, Value};
use variantly::*;

fn main() -> Result<(), VariantError> {
    let registry = Registry::new();

    // PLATFORM: active when context["platform"] is one of the configured values
    registry.register_condition_type("PLATFORM", |params: &Value| {
        let platforms: Vec<String> = serde_json::from_value(params.clone())?;
        Ok(Condition::from_fn(move |ctx: Option<&Value>| {
            ctx.and_then(|c| c["platform"].as_str())
                .is_some_and(|p| platforms.iter().any(|wanted| wanted == p))
        }))
    })?;
    println!("Registered condition types: {:?}", registry.condition_type_identifiers());

    if let Err(err) = registry.register_condition_type(RANDOM, |_: &Value| Ok(Condition::never())) {
        println!("Re-registering {RANDOM} fails: {err}");
    }

    registry.load_config_from_value(json!({
        "flags": [{ "name": "haptics", "baseValue": false }],
        "variants": [{
            "identifier": "mobile_or_lucky",
            "operator": "OR",
            "conditions": [
                { "type": "PLATFORM", "params": ["ios", "android"] },
                { "type": "RANDOM", "params": 0.1 }
            ],
            "mods": [{ "flagName": "haptics", "value": true }]
        }]
    }))?;

    println!();
    for platform in ["ios", "android", "web", "desktop"] {
        let context = json!({ "platform": platform });
        let value = registry.flag_value("haptics", Some(&context))?;
        println!("  {platform:>8}: haptics = {value}");
    }

    Ok(())
}
