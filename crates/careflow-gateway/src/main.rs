use anyhow::Context;
use careflow_core::PatientRecord;
use careflow_gateway::config::{Cli, Command};
use careflow_gateway::{router, AnalysisRequest, Gateway};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let gateway = Gateway::new(cli.oracle.build_oracle()?);

    match cli.command {
        Command::Serve { bind } => serve(gateway, &bind).await,
        Command::Analyze { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let patient: PatientRecord = serde_json::from_str(&json)
                .with_context(|| format!("parsing patient record {}", path.display()))?;
            print_response(&gateway, AnalysisRequest::Patient(patient)).await
        }
        Command::Chat { question } => print_response(&gateway, AnalysisRequest::Chat(question)).await,
    }
}

async fn serve(gateway: Gateway, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!("Gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn print_response(gateway: &Gateway, request: AnalysisRequest) -> anyhow::Result<()> {
    let response = gateway.respond(&request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(error) = response.error {
        anyhow::bail!("analysis failed: {}", error);
    }
    Ok(())
}
