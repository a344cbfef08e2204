use anyhow::Result;
use workers_kit_client::is_duplicate_namespace_error;

use super::{Ctx, print_envelope, print_outcome};

pub async fn list(ctx: &Ctx) -> Result<()> {
    print_outcome(ctx.client.list_namespaces(&ctx.scope).await?)
}

/// Create a namespace; an existing title is reported, not treated as failure
pub async fn create(ctx: &Ctx, title: &str) -> Result<()> {
    let envelope = ctx.client.create_namespace(&ctx.scope, title).await?;
    if is_duplicate_namespace_error(&envelope) {
        println!("ℹ️  Namespace '{}' already exists", title);
        return Ok(());
    }
    print_envelope(&envelope)
}

pub async fn rename(ctx: &Ctx, namespace: &str, title: &str) -> Result<()> {
    print_envelope(&ctx.client.rename_namespace(&ctx.scope, namespace, title).await?)?;
    println!("✓ Renamed {} to {}", namespace, title);
    Ok(())
}

pub async fn remove(ctx: &Ctx, namespace: &str) -> Result<()> {
    print_envelope(&ctx.client.remove_namespace(&ctx.scope, namespace).await?)?;
    println!("✓ Deleted namespace {}", namespace);
    Ok(())
}
