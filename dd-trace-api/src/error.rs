// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors produced while building samplers from configuration.
///
/// None of these are fatal: the sampler selection policy catches them, logs
/// them and falls back to the accept-all sampler.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid sample rate {rate}, must be between 0.0 and 1.0")]
    InvalidSampleRate { rate: f64 },

    #[error("sample rate {value:?} is not a number")]
    UnparsableSampleRate { value: String },

    #[error("invalid sampling rule pattern {pattern:?}")]
    InvalidRulePattern { pattern: String },

    #[error("invalid trace rate limit {limit}")]
    InvalidRateLimit { limit: f64 },

    #[error("invalid sampling rules configuration: {0}")]
    InvalidRulesJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
