// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credit-exhaustion incidents (distilled spec §4.9).

use crate::invocation::Role;
use crate::runner::RunnerId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a credit incident.
    #[derive(Default)]
    pub struct CreditIncidentId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditResolution {
    ConfigChanged,
    Dismissed,
}

/// Maximum length a credit-incident message is truncated to before storage
/// (distilled spec §4.9 step 1).
pub const MESSAGE_MAX_LEN: usize = 200;

/// Truncate a message to `MESSAGE_MAX_LEN` bytes on a `char` boundary.
pub fn sanitize_message(message: &str) -> String {
    if message.len() <= MESSAGE_MAX_LEN {
        return message.to_string();
    }
    let mut end = MESSAGE_MAX_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditIncident {
    pub id: CreditIncidentId,
    pub provider: String,
    pub model: String,
    pub role: Role,
    pub message: String,
    pub runner_id: RunnerId,
    pub opened_at_ms: u64,
    pub resolved_at_ms: Option<u64>,
    pub resolution: Option<CreditResolution>,
}

impl CreditIncident {
    pub fn is_unresolved(&self) -> bool {
        self.resolved_at_ms.is_none()
    }

    /// Dedup key: incidents for the same `(provider, model, role)` while a
    /// previous incident is unresolved should not open a second row.
    pub fn dedup_key(&self) -> (&str, &str, Role) {
        (&self.provider, &self.model, self.role)
    }
}

#[cfg(test)]
#[path = "credit_tests.rs"]
mod tests;
