use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

/// What the binary should print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full valuation per ticker (every ticker in the input when none given)
    Valuation,
    /// Side-by-side valuation of an explicit ticker list
    Compare,
    Overview,
    Undervalued,
    Sectors,
}

impl Mode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "valuation" => Ok(Mode::Valuation),
            "compare" => Ok(Mode::Compare),
            "overview" => Ok(Mode::Overview),
            "undervalued" => Ok(Mode::Undervalued),
            "sectors" => Ok(Mode::Sectors),
            other => bail!("unknown mode '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub mode: Mode,
    /// JSON array of fundamentals snapshots
    pub input: Option<PathBuf>,
    /// JSON object mapping ticker to sector name
    pub sectors: Option<PathBuf>,
    pub tickers: Vec<String>,
    pub pretty: bool,
    pub max_pe: f64,
    pub max_pb: f64,
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            mode: Mode::Valuation,
            input: env::var("VALUATION_INPUT").ok().map(PathBuf::from),
            sectors: env::var("VALUATION_SECTORS").ok().map(PathBuf::from),
            tickers: Vec::new(),
            pretty: env::var("VALUATION_PRETTY")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("VALUATION_PRETTY must be true or false")?,
            max_pe: env::var("SCREEN_MAX_PE")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("SCREEN_MAX_PE must be a number")?,
            max_pb: env::var("SCREEN_MAX_PB")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("SCREEN_MAX_PB must be a number")?,
        })
    }

    /// Command-line flags override the environment.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        if let Some(mode) = flag_value(args, "--mode") {
            self.mode = Mode::parse(mode)?;
        }
        if let Some(path) = flag_value(args, "--input") {
            self.input = Some(PathBuf::from(path));
        }
        if let Some(path) = flag_value(args, "--sectors") {
            self.sectors = Some(PathBuf::from(path));
        }
        if let Some(v) = flag_value(args, "--max-pe") {
            self.max_pe = v.parse().context("--max-pe must be a number")?;
        }
        if let Some(v) = flag_value(args, "--max-pb") {
            self.max_pb = v.parse().context("--max-pb must be a number")?;
        }
        if args.iter().any(|a| a == "--compact") {
            self.pretty = false;
        }

        if let Some(idx) = args.iter().position(|a| a == "--tickers") {
            self.tickers = args[idx + 1..]
                .iter()
                .take_while(|a| !a.starts_with("--"))
                .flat_map(|a| valuation_engine::parse_tickers(a))
                .collect();
        } else if let Some(ticker) = flag_value(args, "--ticker") {
            self.tickers = valuation_engine::parse_tickers(ticker);
        }

        Ok(())
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> CliConfig {
        CliConfig {
            mode: Mode::Valuation,
            input: None,
            sectors: None,
            tickers: Vec::new(),
            pretty: true,
            max_pe: 15.0,
            max_pb: 2.0,
        }
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flags_override_defaults() {
        let mut config = base();
        config
            .apply_args(&args(&[
                "valuation", "--mode", "undervalued", "--input", "snap.json", "--max-pe", "12.5",
                "--compact",
            ]))
            .unwrap();
        assert_eq!(config.mode, Mode::Undervalued);
        assert_eq!(config.input, Some(PathBuf::from("snap.json")));
        assert_eq!(config.max_pe, 12.5);
        assert_eq!(config.max_pb, 2.0);
        assert!(!config.pretty);
    }

    #[test]
    fn test_tickers_accept_lists_and_commas() {
        let mut config = base();
        config
            .apply_args(&args(&["valuation", "--tickers", "aapl", "msft,goog", "--compact"]))
            .unwrap();
        assert_eq!(config.tickers, vec!["AAPL", "MSFT", "GOOG"]);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let mut config = base();
        assert!(config.apply_args(&args(&["valuation", "--mode", "dcf"])).is_err());
    }
}
