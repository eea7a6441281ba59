use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let config = mock_server::MockConfig::default();
    tracing::info!(
        %addr,
        realm = %config.realm,
        client_id = %config.client_id,
        "mock ORCRIM listening"
    );
    mock_server::run_with(listener, mock_server::MockState::new(config)).await
}
