//! Server configuration
//!
//! Flags fall back to `PRIMECHESS_*` environment variables, which may come
//! from a `.env` file loaded before parsing.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::clock::ClockMode;

#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Authoritative match server for timed chess")]
pub struct ServerConfig {
    /// Address the HTTP and WebSocket listener binds to
    #[arg(long, env = "PRIMECHESS_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Delay between a match ending and its removal
    #[arg(long, env = "PRIMECHESS_GAME_OVER_GRACE_MS", default_value_t = 5_000)]
    pub game_over_grace_ms: u64,

    /// Who is authoritative for elapsed time
    #[arg(long, env = "PRIMECHESS_CLOCK_MODE", value_enum, default_value_t = ClockMode::Client)]
    pub clock_mode: ClockMode,

    /// Clock tick period in server clock mode
    #[arg(long, env = "PRIMECHESS_TICK_MS", default_value_t = 100)]
    pub tick_ms: u64,
}

impl ServerConfig {
    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            clock_mode: self.clock_mode,
            tick: Duration::from_millis(self.tick_ms.max(1)),
            game_over_grace: Duration::from_millis(self.game_over_grace_ms),
        }
    }
}

/// Per-match runtime settings handed to every match task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    pub clock_mode: ClockMode,
    pub tick: Duration,
    pub game_over_grace: Duration,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            clock_mode: ClockMode::Client,
            tick: Duration::from_millis(100),
            game_over_grace: Duration::from_millis(5_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["backend"]).expect("Defaults should parse");
        assert_eq!(config.bind, "0.0.0.0:3000".parse().expect("addr"));
        assert_eq!(config.match_settings(), MatchSettings::default());
    }

    #[test]
    fn test_server_clock_flags() {
        let config = ServerConfig::try_parse_from([
            "backend",
            "--clock-mode",
            "server",
            "--tick-ms",
            "0",
            "--game-over-grace-ms",
            "250",
        ])
        .expect("Flags should parse");
        let settings = config.match_settings();
        assert_eq!(settings.clock_mode, ClockMode::Server);
        assert_eq!(settings.tick, Duration::from_millis(1), "Tick is never zero");
        assert_eq!(settings.game_over_grace, Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_clock_mode_rejected() {
        assert!(ServerConfig::try_parse_from(["backend", "--clock-mode", "sundial"]).is_err());
    }
}
