use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::info;
use workers_kit_core::{Envelope, Error, Result, Scope};

use crate::client::{Client, Target, require};
use crate::envelope::{self, Outcome};
use crate::transport::{ApiRequest, FormPart};

const NO_TARGET: &str = "an account ID or a zone ID";

/// Script upload: source, bindings metadata and optional wasm modules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptDeploy {
    /// Script name; required for account (multi-script) deployments
    pub name: Option<String>,
    pub script: String,
    /// Binding descriptors, sent in order as the metadata `bindings` list
    pub bindings: Vec<Value>,
    /// Local `.wasm` files, each uploaded as a part named after its file stem
    pub wasm_modules: Vec<PathBuf>,
}

impl ScriptDeploy {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(script)
        }
    }

    pub fn binding(mut self, binding: Value) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn wasm_module(mut self, path: impl Into<PathBuf>) -> Self {
        self.wasm_modules.push(path.into());
        self
    }

    /// Metadata part: tells the API which part holds the script
    fn metadata(&self) -> Value {
        json!({
            "body_part": "script",
            "bindings": self.bindings,
        })
    }
}

/// Part name for a wasm module: its file name without extension
fn module_part_name(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "wasm module '{}' has no UTF-8 file name",
                path.display()
            ))
        })
}

fn script_path(target: &Target, name: Option<&str>) -> Result<String> {
    match target {
        Target::Zone(zone) => Ok(format!("/zones/{}/workers/script", zone)),
        Target::Account(account) => {
            let name = require(name.unwrap_or_default(), "a script name")?;
            Ok(format!("/accounts/{}/workers/scripts/{}", account, name))
        }
    }
}

impl Client {
    /// Upload a worker script.
    ///
    /// Account scope deploys the named script
    /// (`/accounts/{account}/workers/scripts/{name}`); zone scope deploys the
    /// zone's single script (`/zones/{zone}/workers/script`).
    pub async fn deploy_script(&self, scope: &Scope, deploy: &ScriptDeploy) -> Result<Envelope> {
        let target = self.target(scope).ok_or(Error::MissingScope(NO_TARGET))?;
        let path = script_path(&target, deploy.name.as_deref())?;

        let module_names = deploy
            .wasm_modules
            .iter()
            .map(|module| module_part_name(module))
            .collect::<Result<Vec<_>>>()?;

        let mut parts = vec![
            FormPart::text("metadata", deploy.metadata().to_string()).mime("application/json"),
            FormPart::text("script", deploy.script.clone()).mime("application/javascript"),
        ];
        for (module, part_name) in deploy.wasm_modules.iter().zip(module_names) {
            let content = tokio::fs::read(module).await?;
            let file_name = module
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(part_name)
                .to_string();
            parts.push(
                FormPart::bytes(part_name, content)
                    .file_name(file_name)
                    .mime("application/wasm"),
            );
        }

        info!(%path, modules = deploy.wasm_modules.len(), "deploying worker script");
        let response = self.send(ApiRequest::put(path).multipart(parts)).await?;
        Ok(envelope::raw(response))
    }

    /// Delete a worker script.
    ///
    /// Needs a zone (removes its single script) or an account plus `name`.
    pub async fn remove_script(&self, scope: &Scope, name: Option<&str>) -> Result<Envelope> {
        let name = name.filter(|n| !n.is_empty());
        let target = match (self.target(scope), name) {
            (Some(Target::Account(account)), Some(_)) => Target::Account(account),
            (Some(Target::Zone(zone)), _) => Target::Zone(zone),
            _ => Target::Zone(self.zone_id(scope).map_err(|_| {
                Error::MissingArgument("a zone ID or an account ID and script name")
            })?),
        };
        let path = script_path(&target, name)?;

        info!(%path, "removing worker script");
        Ok(envelope::raw(self.send(ApiRequest::delete(path)).await?))
    }

    /// Workers settings of the account, or of the zone
    pub async fn get_settings(&self, scope: &Scope) -> Result<Outcome<Value>> {
        let path = match self.target(scope).ok_or(Error::MissingScope(NO_TARGET))? {
            Target::Account(account) => format!("/accounts/{}/workers/settings", account),
            Target::Zone(zone) => format!("/zones/{}/workers/settings", zone),
        };
        envelope::unwrap(self.send(ApiRequest::get(path)).await?)
    }
}
