use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use workers_kit_client::ScriptDeploy;

use super::{Ctx, print_envelope, print_outcome};

fn parse_bindings(raw: &[String]) -> Result<Vec<Value>> {
    raw.iter()
        .map(|binding| {
            serde_json::from_str(binding)
                .with_context(|| format!("Binding is not valid JSON: {}", binding))
        })
        .collect()
}

/// Deploy a script read from `file`
pub async fn deploy(
    ctx: &Ctx,
    name: Option<String>,
    file: &Path,
    bindings: &[String],
    wasm: Vec<PathBuf>,
) -> Result<()> {
    let script = fs::read_to_string(file)
        .with_context(|| format!("Failed to read script {}", file.display()))?;

    let deploy = ScriptDeploy {
        name,
        script,
        bindings: parse_bindings(bindings)?,
        wasm_modules: wasm,
    };

    println!("☁️  Deploying {}...", file.display());
    print_envelope(&ctx.client.deploy_script(&ctx.scope, &deploy).await?)?;
    println!("   ✓ Deployed successfully");
    Ok(())
}

pub async fn remove(ctx: &Ctx, name: Option<&str>) -> Result<()> {
    print_envelope(&ctx.client.remove_script(&ctx.scope, name).await?)?;
    println!("✓ Script removed");
    Ok(())
}

pub async fn settings(ctx: &Ctx) -> Result<()> {
    print_outcome(ctx.client.get_settings(&ctx.scope).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bindings_keeps_order() {
        let bindings = parse_bindings(&[
            r#"{"type":"kv_namespace","name":"A","namespace_id":"n"}"#.to_string(),
            r#"{"type":"plain_text","name":"B","text":"t"}"#.to_string(),
        ])
        .unwrap();
        assert_eq!(bindings[0]["name"], json!("A"));
        assert_eq!(bindings[1]["name"], json!("B"));
    }

    #[test]
    fn test_parse_bindings_rejects_invalid_json() {
        let err = parse_bindings(&["{name".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Binding is not valid JSON"));
    }
}
