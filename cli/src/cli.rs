use adapters::compound::CToken;
use clap::Parser;
use market::errors::ConfigError;
use market::pulse::utilization::{DEFAULT_THRESHOLD_BPS, DEFAULT_WINDOW_SECONDS, DetectorConfig};

#[derive(Debug, Parser)]
#[clap(name = "utilization-monitor", version)]
pub struct Cli {
    /// Ethereum JSON-RPC endpoint
    #[clap(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Compound market to watch (cUSDC, cDAI, cUSDT, cETH, cWBTC2)
    #[clap(long, env = "CTOKEN", default_value = "cUSDC")]
    pub token: CToken,

    /// Trailing window over which the utilization spread is measured
    #[clap(long, env = "WINDOW_SECONDS", default_value_t = DEFAULT_WINDOW_SECONDS)]
    pub window_seconds: u64,

    /// Spread (max - min) that raises a finding, in basis points
    #[clap(long, env = "THRESHOLD_BPS", default_value_t = DEFAULT_THRESHOLD_BPS)]
    pub threshold_bps: u32,

    /// Decimals of the fixed-point utilization scale
    #[clap(long, default_value_t = 18)]
    pub scale_decimals: u32,

    /// How often the head block is polled
    #[clap(long, env = "POLL_INTERVAL_MS", default_value_t = 4_000)]
    pub poll_interval_ms: u64,

    /// Capacity of the poller -> monitor channel
    #[clap(long, default_value_t = 64)]
    pub queue_capacity: usize,

    /// Emit logs as JSON lines
    #[clap(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Cli {
    pub fn detector_config(&self) -> Result<DetectorConfig, ConfigError> {
        DetectorConfig::from_bps(self.window_seconds, self.threshold_bps, self.scale_decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_detector_defaults() {
        let cli = Cli::try_parse_from(["utilization-monitor", "--rpc-url", "http://localhost:8545"]).unwrap();

        assert_eq!(cli.token, CToken::CUsdc);
        assert_eq!(cli.detector_config().unwrap(), DetectorConfig::default());
        assert!(!cli.json_logs);
    }

    #[test]
    fn overrides_are_applied() {
        let cli = Cli::try_parse_from([
            "utilization-monitor",
            "--rpc-url",
            "http://localhost:8545",
            "--token",
            "cdai",
            "--window-seconds",
            "600",
            "--threshold-bps",
            "250",
            "--scale-decimals",
            "6",
        ])
        .unwrap();

        assert_eq!(cli.token, CToken::CDai);
        let cfg = cli.detector_config().unwrap();
        assert_eq!(cfg.window_length, 600);
        assert_eq!(cfg.denominator, 1_000_000);
        assert_eq!(cfg.threshold.raw(), 25_000);
    }

    #[test]
    fn unknown_token_is_a_parse_error() {
        let res = Cli::try_parse_from([
            "utilization-monitor",
            "--rpc-url",
            "http://localhost:8545",
            "--token",
            "cFOO",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let cli = Cli::try_parse_from([
            "utilization-monitor",
            "--rpc-url",
            "x",
            "--window-seconds",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.detector_config(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn threshold_finer_than_the_scale_is_rejected() {
        let cli = Cli::try_parse_from([
            "utilization-monitor",
            "--rpc-url",
            "x",
            "--threshold-bps",
            "15",
            "--scale-decimals",
            "2",
        ])
        .unwrap();
        assert_eq!(
            cli.detector_config(),
            Err(ConfigError::ThresholdPrecision { bps: 15, decimals: 2 })
        );
    }
}
