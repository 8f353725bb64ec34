//! Local HTTP endpoints for readiness tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn answer(stream: &mut TcpStream, reply: &[u8]) -> std::io::Result<()> {
    let mut request = [0_u8; 1024];
    let _read = stream.read(&mut request).await?;
    stream.write_all(reply).await
}

/// Serves every request on a fresh local port with `status_line`, returning
/// the endpoint URL.
pub(crate) async fn serve_status(status_line: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local address");
    let reply = format!(
        "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
    );
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            answer(&mut stream, reply.as_bytes())
                .await
                .unwrap_or_default();
        }
    });
    format!("http://{address}/health")
}

/// Returns a URL on a local port nothing listens on.
pub(crate) async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{address}/health")
}
