// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod checkpoint;
pub mod configuration;
pub mod log;
pub mod sampling;
pub mod span;

mod error;
pub use configuration::Config;
pub use error::{Error, Result};
