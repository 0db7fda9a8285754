use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::app::CaptureOptions;
use crate::protocol::{DEFAULT_ADDRESS, DEFAULT_PORT, FPS_HIGH};

/// Console motion capture for PSMoveService controllers.
///
/// Keys: F2 record on, F4 record off, F6 center, Numpad 1/3/6 set 1/30/60 FPS,
/// Escape quit. On the controller: Cross record on, Circle record off, Move center.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Tracking service host
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Tracking service port
    #[arg(long, default_value = DEFAULT_PORT)]
    pub port: String,

    /// Timeout for service requests, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Directory the MotionCapture_*.txt file is written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Initial sample rate
    #[arg(long, default_value_t = FPS_HIGH, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Use synthetic controllers instead of the tracking service
    #[arg(long)]
    pub simulate: bool,

    /// Number of synthetic controllers with --simulate
    #[arg(long, value_name = "N", default_value_t = 2)]
    pub simulated_controllers: usize,
}

impl Config {
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            address: self.address.clone(),
            port: self.port.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            output_dir: self.output_dir.clone(),
            target_fps: self.fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DEFAULT_TIMEOUT;

    #[test]
    fn defaults_match_service_defaults() {
        let config = Config::parse_from(["psmove-capture"]);
        let options = config.capture_options();
        assert_eq!(options.address, "localhost");
        assert_eq!(options.port, "9512");
        assert_eq!(options.timeout, DEFAULT_TIMEOUT);
        assert_eq!(options.target_fps, 60);
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert!(!config.simulate);
    }

    #[test]
    fn overrides() {
        let config = Config::parse_from([
            "psmove-capture",
            "--address",
            "10.0.0.2",
            "--fps",
            "30",
            "--output-dir",
            "captures",
            "--simulate",
            "--simulated-controllers",
            "4",
        ]);
        assert_eq!(config.address, "10.0.0.2");
        assert_eq!(config.fps, 30);
        assert_eq!(config.output_dir, PathBuf::from("captures"));
        assert!(config.simulate);
        assert_eq!(config.simulated_controllers, 4);
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(Config::try_parse_from(["psmove-capture", "--fps", "0"]).is_err());
    }
}
