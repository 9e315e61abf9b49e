use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use entity_console::config::{API_KEY_ENV, URL_ENV};
use entity_console::{ConsoleConfig, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "entity-console")]
#[command(about = "List, search, create, edit and delete rows of the styling collections")]
pub struct Cli {
    /// REST endpoint, e.g. https://<api-key>@db.example.com/rest/v1
    #[arg(long, env = URL_ENV, global = true)]
    pub url: Option<String>,

    #[arg(long, env = API_KEY_ENV, global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Use an in-memory store seeded with sample data
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Registered entities
    Entities,
    /// Rows of an entity, optionally filtered
    List {
        entity: String,
        #[arg(long)]
        search: Option<String>,
    },
    /// The create form, or the edit form of one row
    Form {
        entity: String,
        #[arg(long)]
        id: Option<String>,
    },
    Create {
        entity: String,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    Update {
        entity: String,
        id: String,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    Delete {
        entity: String,
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Resolved foreign-key options of an entity's form
    Options { entity: String },
}

impl Cli {
    pub fn console_config(&self) -> Result<ConsoleConfig> {
        if self.demo {
            return Ok(ConsoleConfig::demo());
        }
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("no store configured: pass --url (or set {}) or use --demo", URL_ENV))?;
        let mut store = StoreConfig::from_url(url).with_context(|| format!("Invalid store URL '{}'", url))?;
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            store = store.api_key(key);
        }
        store.validate()?;
        Ok(ConsoleConfig::remote(store))
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
