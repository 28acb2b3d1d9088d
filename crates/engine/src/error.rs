// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use logi_core::{AgentId, ItemId, JobId, RecipeKind};
use thiserror::Error;

/// Job queue failures. All are recoverable: dispatch retries next pass and
/// late agent reports are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("no {kind} recipe for {item}")]
    NoRecipe { item: ItemId, kind: RecipeKind },

    #[error("{kind} recipe for {item} produces nothing")]
    EmptyRecipe { item: ItemId, kind: RecipeKind },

    #[error("insufficient materials for {item}")]
    InsufficientMaterials { item: ItemId },

    #[error("nothing to make: zero quantity requested for {item}")]
    ZeroQuantity { item: ItemId },

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("job {0} already finished")]
    NotActive(JobId),

    #[error("job {job_id} is not held by {agent}")]
    NotHolder { job_id: JobId, agent: AgentId, holder: Option<AgentId> },
}
