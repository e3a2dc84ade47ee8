//! `vitals` - CLI for the vitals log
//!
//! This binary records health readings and shows the reading history.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use vitals::cli::{
    AddCommand, Cli, Command, ConfigCommand, LastCommand, ListCommand, OutputFormat,
};
use vitals::storage::StorageBackend;
use vitals::view::{format_local, limit_records, render_records, render_summary};
use vitals::{init_logging, open_store, Config, Dashboard, RecordId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if cli.memory {
        config.storage.backend = StorageBackend::Memory;
    }

    match cli.command {
        Command::Add(add_cmd) => handle_add(&config, &add_cmd).await,
        Command::List(list_cmd) => handle_list(&config, &list_cmd).await,
        Command::Last(last_cmd) => handle_last(&config, &last_cmd).await,
        Command::Delete(delete_cmd) => handle_delete(&config, delete_cmd.id).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn start_dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    let mut dashboard = Dashboard::new(open_store(config));
    dashboard
        .start()
        .await
        .with_context(|| format!("opening {} store", config.storage.backend))?;
    Ok(dashboard)
}

async fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let mut dashboard = start_dashboard(config).await?;
    dashboard.open_form();
    *dashboard.form_mut() = cmd.to_form();

    match dashboard.submit().await? {
        Some(id) => println!("Saved reading #{id}"),
        None => anyhow::bail!("store is not ready; reading was not saved"),
    }
    Ok(())
}

async fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let dashboard = start_dashboard(config).await?;
    let shown = limit_records(dashboard.records(), cmd.limit, config);

    print!(
        "{}",
        render_records(shown, cmd.format, &config.display.time_format)?
    );
    if cmd.format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

async fn handle_last(config: &Config, cmd: &LastCommand) -> anyhow::Result<()> {
    let dashboard = start_dashboard(config).await?;
    let summary = dashboard.summary(&config.display.time_format);
    let rendered = render_summary(&summary, cmd.format)?;

    if cmd.format == OutputFormat::Json {
        println!("{rendered}");
    } else {
        print!("{rendered}");
    }
    Ok(())
}

async fn handle_delete(config: &Config, id: RecordId) -> anyhow::Result<()> {
    let mut dashboard = start_dashboard(config).await?;
    dashboard.delete_existing(id).await?;
    println!("Deleted reading #{id}");
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let dashboard = start_dashboard(config).await?;
    let stats = dashboard.store().stats().await?;
    let time_format = &config.display.time_format;
    let format_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map_or_else(|| "-".to_string(), |t| format_local(t, time_format))
    };

    if json {
        let status = serde_json::json!({
            "backend": stats.backend,
            "database_path": (stats.backend == StorageBackend::Sqlite).then(|| config.database_path()),
            "total_records": stats.total_records,
            "oldest": stats.oldest,
            "newest": stats.newest,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("vitals status");
        println!("-------------");
        println!("Backend:       {}", stats.backend);
        if stats.backend == StorageBackend::Sqlite {
            println!("Database:      {}", config.database_path().display());
            println!("Size:          {} bytes", stats.db_size_bytes);
        }
        println!("Records:       {}", stats.total_records);
        println!("Oldest:        {}", format_time(stats.oldest));
        println!("Newest:        {}", format_time(stats.newest));
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Journal mode:       {}", config.storage.journal_mode.as_str());
                println!();
                println!("[Display]");
                println!("  Time format:        {}", config.display.time_format);
                println!("  List limit:         {}", config.display.list_limit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("validating {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
