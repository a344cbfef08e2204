use anyhow::Result;

use super::{Ctx, print_envelope, print_outcome};

pub async fn list(ctx: &Ctx) -> Result<()> {
    print_outcome(ctx.client.list_filters(&ctx.scope).await?)
}

pub async fn add(ctx: &Ctx, pattern: &str) -> Result<()> {
    print_envelope(&ctx.client.add_filter(&ctx.scope, pattern).await?)
}

/// Remove a filter given by id, or by pattern when `by_pattern` is set
pub async fn remove(ctx: &Ctx, filter: &str, by_pattern: bool) -> Result<()> {
    let filter_id = if by_pattern {
        let found = ctx.client.find_filter(&ctx.scope, filter).await?;
        found
            .id
            .ok_or_else(|| anyhow::anyhow!("Filter '{}' has no id", filter))?
    } else {
        filter.to_string()
    };
    print_envelope(&ctx.client.remove_filter(&ctx.scope, &filter_id).await?)?;
    println!("✓ Deleted filter {}", filter_id);
    Ok(())
}

pub async fn clear(ctx: &Ctx) -> Result<()> {
    let results = ctx.client.remove_all_filters(&ctx.scope).await?;
    let failed = results.iter().filter(|envelope| !envelope.success).count();
    println!("🗑️  Removed {} of {} filters", results.len() - failed, results.len());
    if failed > 0 {
        anyhow::bail!("{} filter removals failed", failed);
    }
    Ok(())
}
