use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::types::Result;

const RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";

/// Minimal liveness endpoint for process supervisors. Answers every
/// request with `200 ok`; deliberately touches no data path.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Health endpoint listening on {}", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        tokio::spawn(async move {
            debug!("Health check from {}", peer);
            let mut buf = [0u8; 512];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(RESPONSE).await;
        });
    }
}
