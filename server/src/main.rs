use notetree_server::config::Config;
use notetree_server::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.environment);

    notetree_server::run(config).await
}
