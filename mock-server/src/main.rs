use std::sync::Arc;

use tokio::net::TcpListener;

/// Serves the test backend on `127.0.0.1:$PORT` (default 3000).
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("backend listening on http://{addr} (profiles, status, echo, images)");
    mock_server::run_with_state(listener, Arc::default()).await
}
