// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `logi stop` - ask the daemon to exit

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn stop(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.shutdown().await?;
    output::print(format, &serde_json::json!({ "status": "stopping" }), || {
        "Daemon stopping\n".to_string()
    })
}
