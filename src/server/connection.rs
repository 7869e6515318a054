// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Notify;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// A rejected connection is logged and dropped unanswered.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment first, then check, so concurrent accepts cannot both slip in
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
    );
}

/// Serve one connection in a spawned task.
///
/// Request headers must arrive within `read_timeout`. A connection with no
/// new request for `keep_alive_timeout` seconds is shut down gracefully;
/// without keep-alive the single exchange gets `read_timeout +
/// write_timeout`. An in-flight response then has `write_timeout` to
/// finish. The counter is decremented when the task ends.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let perf = &state.config.performance;
        let keep_alive = perf.keep_alive_timeout > 0;
        let idle_timeout = if keep_alive {
            Duration::from_secs(perf.keep_alive_timeout)
        } else {
            Duration::from_secs(perf.read_timeout.saturating_add(perf.write_timeout))
        };
        let write_timeout = Duration::from_secs(perf.write_timeout);

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(perf.read_timeout))
            .keep_alive(keep_alive);

        // Signalled once per request; restarts the idle timer
        let activity = Arc::new(Notify::new());
        let service_activity = Arc::clone(&activity);
        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                service_activity.notify_one();
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );
        tokio::pin!(conn);

        let result = loop {
            tokio::select! {
                result = conn.as_mut() => break Some(result),
                () = activity.notified() => {}
                () = tokio::time::sleep(idle_timeout) => {
                    logger::log_connection_idle(&peer_addr, idle_timeout);
                    conn.as_mut().graceful_shutdown();
                    break tokio::time::timeout(write_timeout, conn.as_mut()).await.ok();
                }
            }
        };

        match result {
            Some(Ok(())) => {}
            Some(Err(err)) => logger::log_connection_error(&err),
            None => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    idle_timeout.as_secs().saturating_add(write_timeout.as_secs())
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
