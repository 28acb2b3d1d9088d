// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use logi_adapters::PeripheralError;
use logi_core::{ItemId, JobId};
use thiserror::Error;

/// Why a job stopped short. Progress made before the error still counts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("storage gave {got} of {wanted} {item}")]
    TransferShortfall { item: ItemId, wanted: u64, got: u64 },

    #[error(transparent)]
    Peripheral(#[from] PeripheralError),

    #[error("job {0} carries no recipe")]
    NoRecipe(JobId),

    #[error("job {0} is for the other role")]
    WrongRole(JobId),

    #[error("agent shutting down")]
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("no server answered")]
    NoServer,

    #[error("registration timed out")]
    RegisterTimeout,

    #[error("not connected to a server")]
    NotConnected,
}
