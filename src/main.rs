use anyhow::Context;
use courselib_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load courselib settings")?;
    courselib_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        address = %settings.server.bind_address(),
        seed_demo_data = settings.library.seed_demo_data,
        "courselib-app starting"
    );

    courselib_app::run(settings).await
}
