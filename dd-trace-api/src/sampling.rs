// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, str::FromStr};

/// The outcome of a trace sampling decision: the priority stamped on the
/// trace, and the mechanism that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingDecision {
    pub priority: SamplingPriority,
    pub mechanism: SamplingMechanism,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplingPriority {
    value: i8,
}

impl SamplingPriority {
    pub const fn from_i8(value: i8) -> Self {
        Self { value }
    }

    pub fn into_i8(self) -> i8 {
        self.value
    }

    /// Positive priorities keep the trace, zero and negative ones drop it.
    pub fn is_keep(&self) -> bool {
        self.value > 0
    }
}

pub mod priority {
    use super::SamplingPriority;

    pub const USER_REJECT: SamplingPriority = SamplingPriority::from_i8(-1);
    pub const AUTO_REJECT: SamplingPriority = SamplingPriority::from_i8(0);
    pub const AUTO_KEEP: SamplingPriority = SamplingPriority::from_i8(1);
    pub const USER_KEEP: SamplingPriority = SamplingPriority::from_i8(2);
}

impl fmt::Display for SamplingPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for SamplingPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i8>() {
            Ok(value) => Ok(SamplingPriority::from_i8(value)),
            Err(_) => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplingMechanism {
    value: u8,
}

impl SamplingMechanism {
    pub const fn from_u8(value: u8) -> Self {
        Self { value }
    }

    pub fn into_u8(self) -> u8 {
        self.value
    }

    /// Maps a keep/drop outcome to the priority pair this mechanism stamps.
    ///
    /// Automatic mechanisms use the AUTO pair, operator-driven ones the USER
    /// pair.
    pub fn to_priority(&self, is_keep: bool) -> SamplingPriority {
        const AUTO_PAIR: PriorityPair = PriorityPair {
            keep: priority::AUTO_KEEP,
            reject: priority::AUTO_REJECT,
        };
        const USER_PAIR: PriorityPair = PriorityPair {
            keep: priority::USER_KEEP,
            reject: priority::USER_REJECT,
        };
        let pair = match *self {
            mechanism::LOCAL_TRACE_SAMPLING_RULE | mechanism::MANUAL => USER_PAIR,
            _ => AUTO_PAIR,
        };
        if is_keep {
            pair.keep
        } else {
            pair.reject
        }
    }
}

pub mod mechanism {
    use super::SamplingMechanism;

    pub const DEFAULT: SamplingMechanism = SamplingMechanism::from_u8(0);
    pub const AGENT_RATE_BY_SERVICE: SamplingMechanism = SamplingMechanism::from_u8(1);
    pub const LOCAL_TRACE_SAMPLING_RULE: SamplingMechanism = SamplingMechanism::from_u8(3);
    pub const MANUAL: SamplingMechanism = SamplingMechanism::from_u8(4);
}

impl fmt::Display for SamplingMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}", self.into_u8())
    }
}

struct PriorityPair {
    keep: SamplingPriority,
    reject: SamplingPriority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_keep() {
        assert!(priority::AUTO_KEEP.is_keep());
        assert!(priority::USER_KEEP.is_keep());
        assert!(!priority::AUTO_REJECT.is_keep());
        assert!(!priority::USER_REJECT.is_keep());
    }

    #[test]
    fn test_mechanism_to_priority() {
        assert_eq!(
            mechanism::DEFAULT.to_priority(true),
            priority::AUTO_KEEP
        );
        assert_eq!(
            mechanism::DEFAULT.to_priority(false),
            priority::AUTO_REJECT
        );
        assert_eq!(
            mechanism::AGENT_RATE_BY_SERVICE.to_priority(true),
            priority::AUTO_KEEP
        );
        assert_eq!(
            mechanism::LOCAL_TRACE_SAMPLING_RULE.to_priority(true),
            priority::USER_KEEP
        );
        assert_eq!(
            mechanism::LOCAL_TRACE_SAMPLING_RULE.to_priority(false),
            priority::USER_REJECT
        );
        assert_eq!(mechanism::MANUAL.to_priority(false), priority::USER_REJECT);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("2".parse::<SamplingPriority>(), Ok(priority::USER_KEEP));
        assert_eq!("-1".parse::<SamplingPriority>(), Ok(priority::USER_REJECT));
        assert!("keep".parse::<SamplingPriority>().is_err());
    }
}
