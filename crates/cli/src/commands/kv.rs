use anyhow::Result;
use serde_json::Value;

use super::{Ctx, print_envelope, print_json, print_outcome};

/// Command-line values are JSON when they parse as JSON, otherwise plain strings
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn keys(ctx: &Ctx, namespace: &str) -> Result<()> {
    print_outcome(ctx.client.list_keys(&ctx.scope, namespace).await?)
}

pub async fn get(ctx: &Ctx, namespace: &str, key: &str) -> Result<()> {
    print_outcome(ctx.client.get_value(&ctx.scope, namespace, key).await?)
}

pub async fn set(ctx: &Ctx, namespace: &str, key: &str, value: &str) -> Result<()> {
    let value = parse_value(value);
    print_envelope(&ctx.client.set_value(&ctx.scope, namespace, key, &value).await?)?;
    println!("✓ Stored {}", key);
    Ok(())
}

pub async fn delete(ctx: &Ctx, namespace: &str, key: &str) -> Result<()> {
    print_envelope(&ctx.client.delete_key(&ctx.scope, namespace, key).await?)?;
    println!("✓ Deleted {}", key);
    Ok(())
}

pub async fn dump(ctx: &Ctx, namespace: &str) -> Result<()> {
    print_json(&ctx.client.all_keys_and_values(&ctx.scope, namespace).await?)
}
