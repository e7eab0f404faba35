// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::modules::error::code::ErrorCode;
use crate::modules::error::WebmailResult;
use crate::modules::utils::net::establish_tcp_connection_with_timeout;
use crate::raise_error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get => write!(f, "GET"),
            Command::Post => write!(f, "POST"),
            Command::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    /// Only `200` replies carry a body line.
    pub body: Option<String>,
}

/// Parses the leading numeric code of a status line such as `201 Created`.
pub fn parse_status_line(line: &str) -> WebmailResult<u16> {
    line.split_whitespace()
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            raise_error!(
                format!("Unexpected blacklist status line: {:?}", line.trim()),
                ErrorCode::BlacklistProtocolError
            )
        })
}

/// Sends one command over a fresh connection and reads the reply.
pub async fn send_command(
    addr: &str,
    limit: Duration,
    command: Command,
    url: &str,
) -> WebmailResult<Reply> {
    let mut stream = establish_tcp_connection_with_timeout(addr, limit).await?;
    stream
        .write_all(format!("{} {}\n", command, url).as_bytes())
        .await
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;
    stream
        .flush()
        .await
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;

    let mut reader = BufReader::new(stream);
    let status_line = read_non_empty_line(&mut reader).await?.ok_or_else(|| {
        raise_error!(
            format!("Blacklist service at {} closed without a reply", addr),
            ErrorCode::BlacklistProtocolError
        )
    })?;
    let status = parse_status_line(&status_line)?;
    let body = if status == 200 {
        read_non_empty_line(&mut reader).await?
    } else {
        None
    };
    Ok(Reply { status, body })
}

async fn read_non_empty_line<R>(reader: &mut R) -> WebmailResult<Option<String>>
where
    R: AsyncBufReadExt + Unpin,
{
    loop {
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}
