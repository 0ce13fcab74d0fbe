use clap::Parser;
use tokengate::cli::{Args, build_config, init_logging, load_secrets};
use tokengate::run_server;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Secrets and settings may come from a local .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(secrets) = load_secrets(args.secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let config = build_config(
        secrets,
        args.access_token_lifetime,
        args.refresh_token_lifetime,
    );

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    match listener.local_addr() {
        Ok(local_addr) => info!(address = %local_addr, "Listening"),
        Err(e) => error!(error = %e, "Failed to get local address"),
    }

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
