use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use orcrim_core::config::DEFAULT_SCOPES;
use orcrim_core::OrcrimConfig;
use uuid::Uuid;

/// Start of the full-history search window used by the batch exports.
pub const DEFAULT_START: &str = "01/01/2010 00:00:00.000";

/// Command-line client for the ORCRIM registry API
#[derive(Debug, Parser)]
#[command(name = "orcrim", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Append log lines to this file instead of stderr
    #[arg(long, global = true, env = "ORCRIM_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Backend base URL, context path included
    #[arg(
        long,
        global = true,
        env = "ORCRIM_BASE_URL",
        default_value = "https://hmlorcrim.mj.gov.br/backend-orcrim"
    )]
    pub base_url: String,

    /// Identity provider host
    #[arg(
        long,
        global = true,
        env = "ORCRIM_AUTH_URL",
        default_value = "https://hmlsegurancaorcrim.mj.gov.br"
    )]
    pub auth_url: String,

    #[arg(long, global = true, env = "ORCRIM_REALM", default_value = "hmlorcrim")]
    pub realm: String,

    #[arg(long, global = true, env = "ORCRIM_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, global = true, env = "ORCRIM_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    #[arg(long, global = true, env = "ORCRIM_SCOPES", default_value = DEFAULT_SCOPES)]
    pub scopes: String,

    /// Use this pre-issued bearer token instead of client credentials
    #[arg(long, global = true, env = "ORCRIM_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> Result<OrcrimConfig> {
        let client_id = self
            .client_id
            .clone()
            .context("missing client id (--client-id or ORCRIM_CLIENT_ID)")?;
        let client_secret = self
            .client_secret
            .clone()
            .context("missing client secret (--client-secret or ORCRIM_CLIENT_SECRET)")?;
        Ok(OrcrimConfig {
            base_url: self.base_url.clone(),
            auth_url: self.auth_url.clone(),
            realm: self.realm.clone(),
            client_id,
            client_secret,
            scopes: self.scopes.clone(),
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a new access token and print it
    Token,

    /// Download reference tables, one JSON file each
    Lookups {
        #[arg(long, default_value = "json")]
        out_dir: PathBuf,
        /// Restrict to these paths, e.g. --only /ufs,/sexos
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// Save the people updated in a date range to personalidade.json
    Personalidades {
        /// DD/MM/YYYY HH:MM:SS.mmm
        #[arg(long, default_value = DEFAULT_START)]
        inicio: String,
        /// DD/MM/YYYY HH:MM:SS.mmm, defaults to now
        #[arg(long)]
        fim: Option<String>,
        #[arg(long, default_value = "json")]
        out_dir: PathBuf,
    },

    /// Print the UUIDs of a saved listing
    Uuids {
        #[arg(long)]
        file: PathBuf,
        /// Print the update date of this UUID instead
        #[arg(long)]
        updated_at: Option<String>,
    },

    /// Fetch one person
    Get { id: Uuid },

    /// Create a person from a JSON file of flat fields
    Create {
        #[arg(long)]
        file: PathBuf,
    },

    /// Add a phone number to a person
    AddPhone { id: Uuid, phone: String },

    /// Add an alias to a person
    AddAlias { id: Uuid, alias: String, date: String },
}
