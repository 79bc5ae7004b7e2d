// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain failures that callers may want to match on. Everything else travels
/// as `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum FinmateError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("payment must be greater than zero and at most {remaining} (got {payment})")]
    InvalidPayment { payment: Decimal, remaining: Decimal },

    #[error("split bill '{0}' is already settled")]
    AlreadySettled(String),

    #[error("'{email}' is not a participant of '{bill}'")]
    UnknownParticipant { email: String, bill: String },

    #[error("unsupported field name '{0}'")]
    UnsafeField(String),

    #[error("backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },
}

impl FinmateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FinmateError::Validation(msg.into())
    }
}
