//! Time-control selectors accepted when a match is created

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown time control {0:?} (expected one of \"15+10\", \"5+3\", \"2+1\")")]
pub struct UnknownTimeControl(pub String);

/// `minutes+incrementSeconds`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeControl {
    Rapid15Plus10,
    Blitz5Plus3,
    Bullet2Plus1,
}

impl TimeControl {
    pub const ALL: [TimeControl; 3] = [
        TimeControl::Rapid15Plus10,
        TimeControl::Blitz5Plus3,
        TimeControl::Bullet2Plus1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeControl::Rapid15Plus10 => "15+10",
            TimeControl::Blitz5Plus3 => "5+3",
            TimeControl::Bullet2Plus1 => "2+1",
        }
    }

    fn minutes_and_increment(self) -> (u64, u64) {
        match self {
            TimeControl::Rapid15Plus10 => (15, 10),
            TimeControl::Blitz5Plus3 => (5, 3),
            TimeControl::Bullet2Plus1 => (2, 1),
        }
    }

    /// Starting time per side in milliseconds
    pub fn initial_ms(self) -> u64 {
        self.minutes_and_increment().0 * 60_000
    }

    pub fn increment_ms(self) -> u64 {
        self.minutes_and_increment().1 * 1_000
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeControl {
    type Err = UnknownTimeControl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeControl::ALL
            .into_iter()
            .find(|tc| tc.as_str() == s)
            .ok_or_else(|| UnknownTimeControl(s.to_string()))
    }
}

impl TryFrom<String> for TimeControl {
    type Error = UnknownTimeControl;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeControl> for String {
    fn from(tc: TimeControl) -> Self {
        tc.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blitz_clock_values() {
        let tc: TimeControl = "5+3".parse().expect("Should parse");
        assert_eq!(tc.initial_ms(), 300_000);
        assert_eq!(tc.increment_ms(), 3_000);
    }

    #[test]
    fn test_all_selectors_parse_back() {
        for tc in TimeControl::ALL {
            assert_eq!(tc.as_str().parse::<TimeControl>(), Ok(tc));
        }
        assert_eq!(TimeControl::Rapid15Plus10.initial_ms(), 900_000);
        assert_eq!(TimeControl::Bullet2Plus1.increment_ms(), 1_000);
    }

    #[test]
    fn test_unknown_selector_rejected() {
        for bad in ["10+0", "", "5+3 ", "blitz"] {
            assert!(bad.parse::<TimeControl>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_serde_uses_selector_string() {
        let json = serde_json::to_string(&TimeControl::Blitz5Plus3).expect("Should serialize");
        assert_eq!(json, "\"5+3\"");
        assert!(serde_json::from_str::<TimeControl>("\"1+0\"").is_err());
    }
}
