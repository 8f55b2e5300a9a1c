use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sqlx::migrate::MigrateDatabase;

/// potluck - recipe sharing backend
#[derive(Parser)]
#[command(name = "potluck")]
#[command(about = "Recipe sharing platform with shopping list aggregation", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Bulk-load the ingredient catalog from a JSON file
    LoadIngredients {
        /// Path to a JSON array of {"name", "measurement_unit"} objects
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = potluck::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    potluck::observability::init_observability(
        "potluck",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::LoadIngredients { path } => load_ingredients_command(config, path).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: potluck::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting potluck server...");

    let host = host_override.unwrap_or_else(|| config.server.host.clone());
    let port = port_override.unwrap_or(config.server.port);

    let pool =
        potluck::db::create_pool(&config.database.url, config.database.max_connections).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let app = potluck::create_app(pool, config);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: potluck::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = potluck::db::create_pool(&config.database.url, 1).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: potluck::config::Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
        tracing::info!("Database dropped successfully");
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}

#[derive(Debug, Deserialize)]
struct IngredientImport {
    name: String,
    measurement_unit: String,
}

/// Idempotent bulk import; existing (name, unit) pairs are skipped
#[tracing::instrument(skip(config))]
async fn load_ingredients_command(config: potluck::config::Config, path: String) -> Result<()> {
    let raw = tokio::fs::read_to_string(&path).await?;
    let imports: Vec<IngredientImport> = serde_json::from_str(&raw)?;

    tracing::info!("Loading {} ingredients from {}", imports.len(), path);

    let pool =
        potluck::db::create_pool(&config.database.url, config.database.max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mut tx = pool.begin().await?;
    let mut created = 0u64;
    for import in &imports {
        if potluck::queries::ingredient::insert_ingredient_if_missing(
            &mut *tx,
            &import.name,
            &import.measurement_unit,
        )
        .await?
        {
            created += 1;
        }
    }
    tx.commit().await?;

    let total = potluck::queries::ingredient::count_ingredients(&pool).await?;
    tracing::info!(
        created,
        existing = imports.len() as u64 - created,
        total,
        "Ingredient catalog loaded"
    );

    Ok(())
}
