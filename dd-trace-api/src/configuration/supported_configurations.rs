// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// The closed set of configuration keys the library reads.
///
/// Keys are named after the environment variable that carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub(crate) enum SupportedConfigurations {
    DD_SERVICE,
    DD_ENV,
    DD_TRACE_ENABLED,
    DD_LOG_LEVEL,
    DD_TRACE_SAMPLE_RATE,
    DD_TRACE_RATE_LIMIT,
    DD_TRACE_SAMPLING_SERVICE_RULES,
    DD_TRACE_SAMPLING_OPERATION_RULES,
    DD_TRACE_SAMPLING_RULES,
    DD_PRIORITY_SAMPLING,
    DD_PRIORITY_SAMPLING_FORCE,
}

impl SupportedConfigurations {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::DD_SERVICE => "DD_SERVICE",
            Self::DD_ENV => "DD_ENV",
            Self::DD_TRACE_ENABLED => "DD_TRACE_ENABLED",
            Self::DD_LOG_LEVEL => "DD_LOG_LEVEL",
            Self::DD_TRACE_SAMPLE_RATE => "DD_TRACE_SAMPLE_RATE",
            Self::DD_TRACE_RATE_LIMIT => "DD_TRACE_RATE_LIMIT",
            Self::DD_TRACE_SAMPLING_SERVICE_RULES => "DD_TRACE_SAMPLING_SERVICE_RULES",
            Self::DD_TRACE_SAMPLING_OPERATION_RULES => "DD_TRACE_SAMPLING_OPERATION_RULES",
            Self::DD_TRACE_SAMPLING_RULES => "DD_TRACE_SAMPLING_RULES",
            Self::DD_PRIORITY_SAMPLING => "DD_PRIORITY_SAMPLING",
            Self::DD_PRIORITY_SAMPLING_FORCE => "DD_PRIORITY_SAMPLING_FORCE",
        }
    }
}
