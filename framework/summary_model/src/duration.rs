use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Rejected duration token.
///
/// Tokens must be one or more ASCII digits followed by a single unit of `s`, `m` or `h`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid duration format '{token}'. Please provide a list of durations in the format: 25s,25m,25h")]
pub struct InvalidDurationError {
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
}

impl DurationUnit {
    fn suffix(self) -> char {
        match self {
            DurationUnit::Seconds => 's',
            DurationUnit::Minutes => 'm',
            DurationUnit::Hours => 'h',
        }
    }

    fn seconds(self) -> u64 {
        match self {
            DurationUnit::Seconds => 1,
            DurationUnit::Minutes => 60,
            DurationUnit::Hours => 3600,
        }
    }
}

/// A validated duration token such as `25s`, `25m` or `25h`, passed verbatim to the workload tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunDuration {
    amount: u64,
    unit: DurationUnit,
}

impl RunDuration {
    pub fn new(amount: u64, unit: DurationUnit) -> Self {
        Self { amount, unit }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn unit(&self) -> DurationUnit {
        self.unit
    }

    /// The planned wall-clock length of a run with this duration.
    pub fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.amount.saturating_mul(self.unit.seconds()))
    }
}

impl FromStr for RunDuration {
    type Err = InvalidDurationError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDurationError {
            token: token.to_string(),
        };

        let suffix = token.chars().last().ok_or_else(invalid)?;
        let unit = match suffix {
            's' => DurationUnit::Seconds,
            'm' => DurationUnit::Minutes,
            'h' => DurationUnit::Hours,
            _ => return Err(invalid()),
        };

        let digits = &token[..token.len() - suffix.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let amount = digits.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for RunDuration {
    type Error = InvalidDurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RunDuration> for String {
    fn from(value: RunDuration) -> Self {
        value.to_string()
    }
}

impl Display for RunDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

/// Parse a comma separated list of duration tokens, e.g. `1s,5m,10s`.
///
/// Every token is validated and the first bad one rejects the whole list, so that nothing is
/// dispatched for a partially valid request.
pub fn parse_duration_list(list: &str) -> Result<Vec<RunDuration>, InvalidDurationError> {
    list.split(',').map(RunDuration::from_str).collect()
}
