use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use whisky_catalog::config::cli::Command;
use whisky_catalog::core::DispatchReport;
use whisky_catalog::utils::error::ErrorCategory;
use whisky_catalog::utils::{logger, validation::Validate};
use whisky_catalog::{
    AppConfig, CatalogError, CliConfig, NotificationDispatcher, Whisky, WhiskyRepository,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // Config file first: it decides the log format
    let config = match cli.load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    };

    logger::init_logger(cli.verbose, config.logging.json);
    tracing::debug!("CLI config: {:?}", cli);

    // Validate before touching the catalog
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(2);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("Command failed: {:#}", e);

        // Not found and config problems get their own exit codes
        let exit_code = match e.downcast_ref::<CatalogError>().map(CatalogError::category) {
            Some(ErrorCategory::NotFound) => 4,
            Some(ErrorCategory::Configuration) => 2,
            _ => 1,
        };
        let message = e
            .downcast_ref::<CatalogError>()
            .map(CatalogError::user_friendly_message)
            .unwrap_or_else(|| format!("{:#}", e));

        eprintln!("❌ {}", message);
        std::process::exit(exit_code);
    }
}

async fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    // Load the catalog (ratings included)
    let mut repository = WhiskyRepository::open(&config.catalog.csv_path).await?;

    match command {
        Command::List { .. } => {
            let (page, size) = command.paging().unwrap_or_default();
            print_json(&repository.get_all(page, size))?;
        }
        Command::Get { id } => {
            let whisky = repository
                .get_by_id(&id)
                .ok_or_else(|| CatalogError::not_found(id.to_string()))?;
            print_json(whisky)?;
        }
        Command::Add { name, region } => {
            let stored = repository.add(Whisky::new(name, region)).await?;
            print_json(&stored)?;

            // Subscribers hear about it only after the catalog is saved
            let dispatcher = dispatcher(config).await?;
            report(&dispatcher.on_whisky_added(&stored).await);
        }
        Command::Update { name, region } => {
            repository.update(&Whisky::new(name.clone(), region)).await?;
            println!("✅ Updated {}", name);
        }
        Command::Delete { id } => {
            repository.delete(&id).await?;
            println!("✅ Deleted {}", id);
        }
        Command::Rate { id, stars, message } => {
            // Looked up by name: the message has to be the whisky's name
            let (whisky, rating) = repository.add_rating(&id, stars, &message).await?;
            print_json(&whisky)?;

            let dispatcher = dispatcher(config).await?;
            report(&dispatcher.on_rating_added(&whisky, &rating).await);
        }
    }

    Ok(())
}

async fn dispatcher(config: &AppConfig) -> anyhow::Result<NotificationDispatcher> {
    // Relay when mail is enabled, log-only otherwise
    let transport = config.build_transport()?;
    NotificationDispatcher::from_file(
        &config.notifications.subscriptions_path,
        transport,
        config.dispatch_settings(),
    )
    .await
    .with_context(|| {
        format!(
            "loading subscriptions from {}",
            config.notifications.subscriptions_path
        )
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(report: &DispatchReport) {
    if report.attempted() == 0 {
        println!("📭 No subscribers to notify");
        return;
    }

    println!("📨 Notified {} subscriber(s)", report.delivered.len());
    for failure in &report.failed {
        println!("⚠️  {} not notified: {}", failure.recipient, failure.error);
    }
}
