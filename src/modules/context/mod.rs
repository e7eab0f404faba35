// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::LazyLock;

use crate::modules::error::WebmailResult;
use crate::utc_now;

pub mod status;

pub static SERVER_CONTEXT: LazyLock<ServerContext> = LazyLock::new(ServerContext::new);

pub trait Initialize {
    async fn initialize() -> WebmailResult<()>;
}

pub struct ServerContext {
    start_at: i64,
}

impl ServerContext {
    fn new() -> Self {
        Self {
            start_at: utc_now!(),
        }
    }

    pub fn start_at(&self) -> i64 {
        self.start_at
    }

    pub fn uptime_ms(&self) -> i64 {
        utc_now!() - self.start_at
    }
}

impl Initialize for ServerContext {
    async fn initialize() -> WebmailResult<()> {
        // pin the start time before the first request can observe it
        LazyLock::force(&SERVER_CONTEXT);
        Ok(())
    }
}
