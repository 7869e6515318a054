// Server loop module
// Accepts connections for the lifetime of the process

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections forever, handing each one to its own task.
///
/// Accept errors (e.g. file descriptor exhaustion) are logged and the loop
/// keeps going.
pub async fn run(listener: TcpListener, state: Arc<AppState>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state, &active_connections);
            }
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DatasetConfig};
    use crate::dataset::Dataset;
    use crate::server::create_listener;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_housing_over_tcp() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": null, "properties": {"muni": "Boston"}},
            {"type": "Feature", "geometry": null, "properties": {"muni": "Cambridge"}}
        ]}"#;
        let dataset = Dataset::from_geojson_str(text, &DatasetConfig::default()).unwrap();
        let state = Arc::new(AppState::new(Config::for_tests(), dataset));

        let listener = create_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(run(listener, state));

        let response = raw_request(
            addr,
            "GET /api/housing?municipality=cambridge HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("content-type: application/geo+json"));
        let body = response.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["features"].as_array().unwrap().len(), 1);
        assert_eq!(json["features"][0]["properties"]["muni"], "Cambridge");
    }

    #[tokio::test]
    async fn test_idle_keep_alive_connection_is_closed() {
        let mut config = Config::for_tests();
        config.performance.keep_alive_timeout = 1;
        config.performance.read_timeout = 30;
        config.performance.write_timeout = 30;
        let dataset = Dataset::from_geojson_str(
            r#"{"type": "FeatureCollection", "features": []}"#,
            &DatasetConfig::default(),
        )
        .unwrap();
        let state = Arc::new(AppState::new(config, dataset));

        let listener = create_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(run(listener, state));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let mut response = Vec::new();
        let mut buf = [0_u8; 1024];
        while !response.ends_with(br#"{"status":"ok"}"#) {
            let read = stream.read(&mut buf).await.unwrap();
            assert!(read > 0, "connection closed before the response");
            response.extend_from_slice(&buf[..read]);
        }
        assert!(response.starts_with(b"HTTP/1.1 200 OK"));

        // Closed after the 1s idle limit, long before the 30s read timeout
        let read = tokio::time::timeout(Duration::from_secs(10), stream.read(&mut buf))
            .await
            .expect("idle connection was not closed")
            .unwrap_or(0);
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn test_connection_limit_rejects_extra_clients() {
        let mut config = Config::for_tests();
        config.performance.max_connections = Some(0);
        let dataset = Dataset::from_geojson_str(
            r#"{"type": "FeatureCollection", "features": []}"#,
            &DatasetConfig::default(),
        )
        .unwrap();
        let state = Arc::new(AppState::new(config, dataset));

        let listener = create_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(run(listener, state));

        // The server closes without answering; depending on timing the
        // client sees EOF or a reset, never a response
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let _ = stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await;
        let mut buf = [0_u8; 64];
        let read = stream.read(&mut buf).await.unwrap_or(0);
        assert_eq!(read, 0);
    }
}
