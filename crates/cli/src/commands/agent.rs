// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent listing

use anyhow::Result;
use clap::ValueEnum;
use logi_core::Role;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum RoleArg {
    Crafter,
    Worker,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Crafter => Role::Crafter,
            RoleArg::Worker => Role::Worker,
        }
    }
}

pub async fn list(client: &DaemonClient, role: Option<RoleArg>, format: OutputFormat) -> Result<()> {
    let agents = client.agents(role.map(Role::from)).await?;
    output::print(format, &agents, || output::render_agents(&agents))
}
