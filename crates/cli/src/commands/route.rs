use anyhow::Result;

use super::{Ctx, print_envelope, print_outcome};

pub async fn list(ctx: &Ctx) -> Result<()> {
    print_outcome(ctx.client.list_routes(&ctx.scope).await?)
}

pub async fn add(ctx: &Ctx, pattern: &str, script: &str) -> Result<()> {
    print_envelope(&ctx.client.add_route(&ctx.scope, pattern, script).await?)
}

/// Remove a route given by id, or by pattern when `by_pattern` is set
pub async fn remove(ctx: &Ctx, route: &str, by_pattern: bool) -> Result<()> {
    let route_id = if by_pattern {
        let found = ctx.client.find_route(&ctx.scope, route).await?;
        found
            .id
            .ok_or_else(|| anyhow::anyhow!("Route '{}' has no id", route))?
    } else {
        route.to_string()
    };
    print_envelope(&ctx.client.remove_route(&ctx.scope, &route_id).await?)?;
    println!("✓ Deleted route {}", route_id);
    Ok(())
}
