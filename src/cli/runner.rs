//! CLI command execution

use super::commands::{Cli, Commands, OutputFormat};
use crate::config::ConfiguredCatalog;
use crate::connector::{ApiConnector, Connector};
use crate::connectors;
use crate::engine::{Message, SyncOptions};
use crate::error::{Error, Result};
use crate::loader::{load_connector, ConnectorDefinition};
use crate::state::StateManager;
use crate::types::LogLevel;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Executes a parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for a parsed CLI
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Execute the selected command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check { config_json } => self.cmd_check(config_json.as_deref()).await,
            Commands::Discover { config_json } => self.cmd_discover(config_json.as_deref()).await,
            Commands::Read {
                streams,
                config_json,
                max_records,
                final_state_only,
            } => {
                self.cmd_read(
                    streams.as_deref(),
                    config_json.as_deref(),
                    *max_records,
                    *final_state_only,
                )
                .await
            }
            Commands::Spec => self.cmd_spec(),
            Commands::Validate => self.cmd_validate(),
            Commands::List => self.cmd_list(),
        }
    }

    fn load_definition(&self) -> Result<ConnectorDefinition> {
        let path = self
            .cli
            .connector
            .as_ref()
            .ok_or_else(|| Error::config("No connector given; pass --connector <name|path>"))?;
        load_connector(path)
    }

    fn load_config(&self, inline: Option<&str>) -> Result<Value> {
        if let Some(inline) = inline {
            return serde_json::from_str(inline)
                .map_err(|e| Error::config(format!("Invalid --config-json: {e}")));
        }
        if let Some(path) = &self.cli.config {
            let contents = std::fs::read_to_string(path)?;
            return serde_json::from_str(&contents)
                .map_err(|e| Error::config(format!("Invalid config file: {e}")));
        }
        Ok(json!({}))
    }

    fn state_manager(&self) -> Result<StateManager> {
        if let Some(inline) = &self.cli.state_json {
            return StateManager::from_json(inline);
        }
        if let Some(path) = &self.cli.state {
            return StateManager::from_file(path);
        }
        Ok(StateManager::in_memory())
    }

    async fn cmd_check(&self, config_json: Option<&str>) -> Result<()> {
        let connector = ApiConnector::new(self.load_definition()?);
        let config = self.load_config(config_json)?;

        let result = connector.check(&config).await?;

        match self.cli.format {
            OutputFormat::Json => {
                let status = if result.success { "SUCCEEDED" } else { "FAILED" };
                println!(
                    "{}",
                    json!({"type": "CONNECTION_STATUS", "status": status, "message": result.message})
                );
            }
            OutputFormat::Pretty => {
                if result.success {
                    println!("Connection check succeeded");
                } else {
                    println!(
                        "Connection check failed: {}",
                        result.message.unwrap_or_default()
                    );
                }
            }
        }

        if result.success {
            Ok(())
        } else {
            Err(Error::ConnectionCheck {
                message: "connection check failed".to_string(),
            })
        }
    }

    async fn cmd_discover(&self, config_json: Option<&str>) -> Result<()> {
        let connector = ApiConnector::new(self.load_definition()?);
        let config = self.load_config(config_json)?;

        let catalog = connector.discover(&config).await?;

        match self.cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    json!({"type": "CATALOG", "catalog": serde_json::to_value(&catalog)?})
                );
            }
            OutputFormat::Pretty => {
                for stream in &catalog.streams {
                    let modes: Vec<String> = stream
                        .supported_sync_modes
                        .iter()
                        .map(|m| format!("{m:?}"))
                        .collect();
                    println!("{} [{}]", stream.name, modes.join(", "));
                }
            }
        }

        Ok(())
    }

    async fn cmd_read(
        &self,
        streams: Option<&str>,
        config_json: Option<&str>,
        max_records: Option<usize>,
        final_state_only: bool,
    ) -> Result<()> {
        let options = SyncOptions::new()
            .with_max_records(max_records.unwrap_or(0))
            .with_page_checkpoints(!final_state_only);

        let connector = ApiConnector::new(self.load_definition()?).with_options(options);
        let config = self.load_config(config_json)?;
        let manager = self.state_manager()?;

        let catalog = connector.discover(&config).await?;
        let mut configured = ConfiguredCatalog::select_all(&catalog);

        if let Some(selection) = streams {
            let wanted: Vec<&str> = selection.split(',').map(str::trim).collect();
            for name in &wanted {
                if catalog.get_stream(name).is_none() {
                    return Err(Error::StreamNotFound {
                        stream: (*name).to_string(),
                    });
                }
            }
            configured.streams.retain(|s| wanted.contains(&s.name.as_str()));
        }

        let state = manager.snapshot().await;
        let mut messages = connector.read(&config, &configured, Some(&state)).await?;

        let mut records = 0usize;
        while let Some(message) = messages.next().await {
            match message {
                Ok(Message::Record {
                    stream,
                    record,
                    emitted_at,
                }) => {
                    records += 1;
                    match self.cli.format {
                        OutputFormat::Json => println!(
                            "{}",
                            json!({
                                "type": "RECORD",
                                "stream": stream,
                                "emitted_at": emitted_at.to_rfc3339(),
                                "record": record
                            })
                        ),
                        OutputFormat::Pretty => println!("[{stream}] {record}"),
                    }
                }
                Ok(Message::State { stream, state }) => {
                    manager.set_stream(&stream, state.clone()).await?;
                    match self.cli.format {
                        OutputFormat::Json => println!(
                            "{}",
                            json!({
                                "type": "STATE",
                                "stream": stream,
                                "state": serde_json::to_value(&state)?
                            })
                        ),
                        OutputFormat::Pretty => {
                            println!("[{stream}] checkpoint: {:?}", state.cursor);
                        }
                    }
                }
                Ok(Message::Log { level, message }) => match level {
                    LogLevel::Warn | LogLevel::Error => warn!("{message}"),
                    _ => info!("{message}"),
                },
                Err(e) => {
                    // The sync is interrupted at the last persisted
                    // checkpoint; surface the failure after saving.
                    manager.save().await?;
                    return Err(e);
                }
            }
        }

        manager.save().await?;
        info!("Read complete: {records} records");
        Ok(())
    }

    fn cmd_spec(&self) -> Result<()> {
        let connector = ApiConnector::new(self.load_definition()?);
        let spec = connector.spec();

        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", json!({"type": "SPEC", "spec": serde_json::to_value(&spec)?}));
            }
            OutputFormat::Pretty => {
                println!("{} - {}", spec.name, spec.title);
                if let Some(description) = &spec.description {
                    println!("{description}");
                }
                for (name, prop) in &spec.spec.properties {
                    let required = if prop.required { " (required)" } else { "" };
                    let secret = if prop.secret { " [secret]" } else { "" };
                    println!("  {name}{required}{secret}");
                }
            }
        }

        Ok(())
    }

    fn cmd_validate(&self) -> Result<()> {
        let definition = self.load_definition()?;
        println!(
            "Connector '{}' is valid ({} streams)",
            definition.name,
            definition.streams.len()
        );
        Ok(())
    }

    fn cmd_list(&self) -> Result<()> {
        for info in connectors::list_builtin_info() {
            match self.cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({
                        "name": info.name,
                        "description": info.description,
                        "category": info.category,
                        "streams": info.streams
                    })
                ),
                OutputFormat::Pretty => {
                    println!("{:<12} {} ({})", info.name, info.description, info.category);
                }
            }
        }
        Ok(())
    }
}
