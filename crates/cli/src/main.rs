mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use workers_kit_core::Scope;

#[derive(Parser)]
#[command(name = "workers-kit")]
#[command(
    version,
    about = "Manage Cloudflare Workers scripts, routes, filters and KV storage",
    long_about = None
)]
struct Cli {
    /// Account ID (overrides config file and CLOUDFLARE_ACCOUNT_ID)
    #[arg(long, global = true)]
    account: Option<String>,

    /// Zone ID (overrides config file and CLOUDFLARE_ZONE_ID)
    #[arg(long, global = true)]
    zone: Option<String>,

    /// Config file (default: ~/.workers-kit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store Cloudflare credentials and default account/zone
    ///
    /// Uses the global API key (X-Auth-Email / X-Auth-Key).
    /// Find it at: https://dash.cloudflare.com/profile/api-tokens
    Configure,

    /// Manage Workers KV namespaces
    Namespace {
        #[command(subcommand)]
        command: NamespaceCommand,
    },

    /// Read and write keys in a KV namespace
    Kv {
        #[command(subcommand)]
        command: KvCommand,
    },

    /// Deploy and remove worker scripts
    Script {
        #[command(subcommand)]
        command: ScriptCommand,
    },

    /// Manage routes (multi-script zones)
    Route {
        #[command(subcommand)]
        command: RouteCommand,
    },

    /// Manage filters (single-script zones)
    Filter {
        #[command(subcommand)]
        command: FilterCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum NamespaceCommand {
    /// List namespaces of the account
    List,
    /// Create a namespace
    Create { title: String },
    /// Rename a namespace (by id or title)
    Rename { namespace: String, title: String },
    /// Delete a namespace (by id or title)
    Remove { namespace: String },
}

#[derive(Subcommand)]
enum KvCommand {
    /// List keys of a namespace
    Keys { namespace: String },
    /// Print the value stored under a key
    Get { namespace: String, key: String },
    /// Store a value (parsed as JSON when possible, else stored as a string)
    Set {
        namespace: String,
        key: String,
        value: String,
    },
    /// Delete a key
    Delete { namespace: String, key: String },
    /// Print every key with its value
    Dump { namespace: String },
}

#[derive(Subcommand)]
enum ScriptCommand {
    /// Upload a script (named for accounts, unnamed for a zone's single script)
    Deploy {
        /// Script name (required with --account)
        name: Option<String>,

        /// JavaScript source file
        #[arg(short, long)]
        file: PathBuf,

        /// Binding descriptor as JSON, repeatable
        #[arg(long = "binding")]
        bindings: Vec<String>,

        /// WebAssembly module to attach, repeatable
        #[arg(long = "wasm")]
        wasm: Vec<PathBuf>,
    },
    /// Delete a script
    Remove { name: Option<String> },
    /// Show Workers settings
    Settings,
}

#[derive(Subcommand)]
enum RouteCommand {
    /// List routes of the zone
    List,
    /// Route a pattern to a script
    Add { pattern: String, script: String },
    /// Delete a route by id, or by pattern with --pattern
    Remove {
        route: String,
        #[arg(long)]
        pattern: bool,
    },
}

#[derive(Subcommand)]
enum FilterCommand {
    /// List filters of the zone
    List,
    /// Enable the zone script on a pattern
    Add { pattern: String },
    /// Delete a filter by id, or by pattern with --pattern
    Remove {
        filter: String,
        #[arg(long)]
        pattern: bool,
    },
    /// Delete every filter of the zone
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let scope = Scope {
        account_id: cli.account,
        zone_id: cli.zone,
    };

    match cli.command {
        Command::Configure => commands::configure::run(cli.config).await,
        Command::Namespace { command } => {
            let ctx = commands::connect(cli.config, scope)?;
            match command {
                NamespaceCommand::List => commands::namespace::list(&ctx).await,
                NamespaceCommand::Create { title } => {
                    commands::namespace::create(&ctx, &title).await
                }
                NamespaceCommand::Rename { namespace, title } => {
                    commands::namespace::rename(&ctx, &namespace, &title).await
                }
                NamespaceCommand::Remove { namespace } => {
                    commands::namespace::remove(&ctx, &namespace).await
                }
            }
        }
        Command::Kv { command } => {
            let ctx = commands::connect(cli.config, scope)?;
            match command {
                KvCommand::Keys { namespace } => commands::kv::keys(&ctx, &namespace).await,
                KvCommand::Get { namespace, key } => {
                    commands::kv::get(&ctx, &namespace, &key).await
                }
                KvCommand::Set {
                    namespace,
                    key,
                    value,
                } => commands::kv::set(&ctx, &namespace, &key, &value).await,
                KvCommand::Delete { namespace, key } => {
                    commands::kv::delete(&ctx, &namespace, &key).await
                }
                KvCommand::Dump { namespace } => commands::kv::dump(&ctx, &namespace).await,
            }
        }
        Command::Script { command } => {
            let ctx = commands::connect(cli.config, scope)?;
            match command {
                ScriptCommand::Deploy {
                    name,
                    file,
                    bindings,
                    wasm,
                } => commands::script::deploy(&ctx, name, &file, &bindings, wasm).await,
                ScriptCommand::Remove { name } => {
                    commands::script::remove(&ctx, name.as_deref()).await
                }
                ScriptCommand::Settings => commands::script::settings(&ctx).await,
            }
        }
        Command::Route { command } => {
            let ctx = commands::connect(cli.config, scope)?;
            match command {
                RouteCommand::List => commands::route::list(&ctx).await,
                RouteCommand::Add { pattern, script } => {
                    commands::route::add(&ctx, &pattern, &script).await
                }
                RouteCommand::Remove { route, pattern } => {
                    commands::route::remove(&ctx, &route, pattern).await
                }
            }
        }
        Command::Filter { command } => {
            let ctx = commands::connect(cli.config, scope)?;
            match command {
                FilterCommand::List => commands::filter::list(&ctx).await,
                FilterCommand::Add { pattern } => commands::filter::add(&ctx, &pattern).await,
                FilterCommand::Remove { filter, pattern } => {
                    commands::filter::remove(&ctx, &filter, pattern).await
                }
                FilterCommand::Clear => commands::filter::clear(&ctx).await,
            }
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "workers-kit", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_scope_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "workers-kit",
            "kv",
            "get",
            "myNamespace",
            "abc",
            "--account",
            "13",
        ])
        .unwrap();
        assert_eq!(cli.account.as_deref(), Some("13"));
        assert!(matches!(
            cli.command,
            Command::Kv {
                command: KvCommand::Get { .. }
            }
        ));
    }

    #[test]
    fn test_script_deploy_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "workers-kit",
            "script",
            "deploy",
            "W",
            "--file",
            "worker.js",
            "--binding",
            r#"{"type":"kv_namespace","name":"A","namespace_id":"n"}"#,
            "--wasm",
            "a.wasm",
            "--wasm",
            "b.wasm",
        ])
        .unwrap();
        match cli.command {
            Command::Script {
                command:
                    ScriptCommand::Deploy {
                        name,
                        bindings,
                        wasm,
                        ..
                    },
            } => {
                assert_eq!(name.as_deref(), Some("W"));
                assert_eq!(bindings.len(), 1);
                assert_eq!(wasm, vec![PathBuf::from("a.wasm"), PathBuf::from("b.wasm")]);
            }
            _ => panic!("expected script deploy"),
        }
    }
}
