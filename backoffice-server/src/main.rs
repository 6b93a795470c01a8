use backoffice_server::{Config, Server, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir();
    init_logger_with_file(Some(&config.log_level), logs_dir.to_str());

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        work_dir = %config.work_dir,
        "Starting backoffice server"
    );

    let server = Server::new(config);
    server.run().await?;

    Ok(())
}
