use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use orcrim_core::dates::parse_query_date;
use orcrim_core::{OrcrimClient, Session, StaticToken, TokenManager, TokenProvider};
use orcrim_cli::cli::{Cli, Command, ConnectionArgs};
use orcrim_cli::commands::{self, AnyToken};
use orcrim_cli::logging;
use orcrim_cli::transport::UreqTransport;

fn session(connection: &ConnectionArgs) -> Result<Session<UreqTransport, AnyToken>> {
    let tokens = match &connection.access_token {
        Some(token) => AnyToken::Static(StaticToken(token.clone())),
        None => AnyToken::Managed(TokenManager::from_config(&connection.to_config()?)),
    };
    Ok(Session::new(
        OrcrimClient::new(&connection.base_url),
        tokens,
        UreqTransport::new(),
    ))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    match cli.command {
        Command::Token => {
            let config = cli.connection.to_config()?;
            let mut manager = TokenManager::from_config(&config);
            let token = manager
                .access_token(&UreqTransport::new())
                .context("Failed to obtain access token")?;
            println!("{token}");
        }
        Command::Lookups { out_dir, only } => {
            let lookups = commands::select_lookups(&only)?;
            let mut session = session(&cli.connection)?;
            let report = commands::export_lookups(&mut session, &lookups, &out_dir)?;
            tracing::info!(
                written = report.written.len(),
                empty = report.empty.len(),
                failed = report.failed.len(),
                "lookups done"
            );
            if !report.failed.is_empty() {
                bail!("{} lookup endpoint(s) failed", report.failed.len());
            }
        }
        Command::Personalidades {
            inicio,
            fim,
            out_dir,
        } => {
            let start = parse_query_date(&inicio)?;
            let end = match fim {
                Some(fim) => parse_query_date(&fim)?,
                None => Local::now().naive_local(),
            };
            let mut session = session(&cli.connection)?;
            match commands::export_personalidades(&mut session, start, end, &out_dir)? {
                Some(path) => println!("{}", path.display()),
                None => tracing::info!("nothing to save"),
            }
        }
        Command::Uuids { file, updated_at } => {
            let listing = commands::load_listing(&file)?;
            match updated_at {
                Some(uuid) => match listing.updated_at(&uuid) {
                    Some(date) => println!("{date}"),
                    None => bail!("no update date for {uuid}"),
                },
                None => {
                    for uuid in listing.uuids() {
                        println!("{uuid}");
                    }
                }
            }
        }
        Command::Get { id } => {
            let mut session = session(&cli.connection)?;
            print_json(&session.get_person(id)?)?;
        }
        Command::Create { file } => {
            let person = commands::load_person(&file)?;
            let mut session = session(&cli.connection)?;
            print_json(&session.create_person(&person)?)?;
        }
        Command::AddPhone { id, phone } => {
            let mut session = session(&cli.connection)?;
            print_json(&session.add_phone(id, &phone)?)?;
        }
        Command::AddAlias { id, alias, date } => {
            let mut session = session(&cli.connection)?;
            print_json(&session.add_alias(id, &alias, &date)?)?;
        }
    }
    Ok(())
}
