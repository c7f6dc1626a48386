//! Bucketing example: sticky experiments with MOD_RANGE
//!
//! This example demonstrates:
//! - Splitting users into stable buckets
//! - Bucketing on a field of a structured context
//! - Failing closed when no context is given

use serde_json::json;
use variantly::*;

fn main() -> Result<(), VariantError> {
    let registry = Registry::new();

    registry.load_config_from_value(json!({
        "flags": [
            { "name": "checkout", "description": "Checkout flow", "baseValue": "classic" }
        ],
        "variants": [
            {
                "identifier": "one_page_30pct",
                "operator": "AND",
                "conditions": [{
                    "type": "MOD_RANGE",
                    "params": { "modulus": 100, "range": [0, 30], "key": "user_id" }
                }],
                "mods": [{ "flagName": "checkout", "value": "one_page" }]
            }
        ]
    }))?;

    println!("=== Per-user assignment ===");
    for id in ["alice", "bob", "carol", "dave", "erin"] {
        let context = json!({ "user_id": id, "plan": "free" });
        let value = registry.flag_value("checkout", Some(&context))?;
        let again = registry.flag_value("checkout", Some(&context))?;
        println!("  {id:>5}: {value} (stable: {})", value == again);
    }

    println!("\n=== Population split ===");
    let total = 10_000;
    let treated = (0..total)
        .map(|i| json!({ "user_id": format!("user-{i}") }))
        .filter(|ctx| {
            registry
                .flag_value("checkout", Some(ctx))
                .map(|v| v == json!("one_page"))
                .unwrap_or(false)
        })
        .count();
    println!("  {treated} of {total} users in treatment (target 30%)");

    println!("\n=== No context ===");
    println!("  checkout = {}", registry.flag_value_without_context("checkout")?);

    Ok(())
}
