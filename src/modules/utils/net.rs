// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::raise_error;
use std::pin::Pin;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_io_timeout::TimeoutStream;
use tracing::error;

/// Opens a TCP connection whose connect, read and write phases are all bounded by `limit`.
pub(crate) async fn establish_tcp_connection_with_timeout(
    address: &str,
    limit: Duration,
) -> WebmailResult<Pin<Box<TimeoutStream<TcpStream>>>> {
    let tcp_stream = timeout(limit, TcpStream::connect(address))
        .await
        .map_err(|_| {
            error!(
                "TCP connection to {} timed out after {}s",
                address,
                limit.as_secs()
            );
            raise_error!(
                format!(
                    "TCP connection to {} timed out after {}s",
                    address,
                    limit.as_secs()
                ),
                ErrorCode::ConnectionTimeout
            )
        })?
        .map_err(|e| {
            raise_error!(
                format!("Failed to connect to {}: {}", address, e),
                ErrorCode::NetworkError
            )
        })?;

    // Disable Nagle's algorithm, commands are tiny single-line writes
    tcp_stream
        .set_nodelay(true)
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;

    let mut timeout_stream = TimeoutStream::new(tcp_stream);
    timeout_stream.set_write_timeout(Some(limit));
    timeout_stream.set_read_timeout(Some(limit));

    Ok(Box::pin(timeout_stream))
}
