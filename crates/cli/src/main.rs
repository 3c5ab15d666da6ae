use anyhow::Context;
use clap::{Parser, Subcommand};
use courselib_kernel::settings::Settings;
use courselib_store::LibraryStore;

#[derive(Debug, Parser)]
#[command(name = "courselib", version, about = "Authors and courses REST API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl-C
    Serve,
    /// Print the effective settings as JSON
    Settings,
    /// Print the merged OpenAPI document
    Openapi,
}

fn load_settings() -> anyhow::Result<Settings> {
    Settings::load().context("failed to load courselib settings")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            let settings = load_settings()?;
            courselib_telemetry::init(&settings.telemetry)?;
            tracing::info!(
                env = ?settings.environment,
                address = %settings.server.bind_address(),
                "courselib serve"
            );
            courselib_app::run(settings).await
        }
        Command::Settings => {
            let settings = load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Openapi => {
            let registry = courselib_app::build_registry(&LibraryStore::new());
            let document = courselib_http::router::openapi_document(&registry);
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
    }
}
