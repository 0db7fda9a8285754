use anyhow::Context;
use clap::Parser;
use log::info;
use psmove_capture::{platform_input, run, Config, SimulatedService};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let options = config.capture_options();
    let mut input = platform_input();

    let result = if config.simulate {
        info!(
            "Using {} simulated controller(s)",
            config.simulated_controllers
        );
        run(
            SimulatedService::new(config.simulated_controllers),
            &mut input,
            &options,
        )
    } else {
        run_service(&mut input, &options)
    };
    let summary = result.context("capture session failed")?;

    if let Some(path) = &summary.capture_path {
        println!(
            "{} sample(s) written to {}",
            summary.samples_written,
            path.display()
        );
    }
    Ok(())
}

#[cfg(feature = "psmoveservice")]
fn run_service(
    input: &mut Box<dyn psmove_capture::InputSource>,
    options: &psmove_capture::CaptureOptions,
) -> psmove_capture::Result<psmove_capture::SessionSummary> {
    run(psmove_capture::PsmClient::new(), input, options)
}

#[cfg(not(feature = "psmoveservice"))]
fn run_service(
    _input: &mut Box<dyn psmove_capture::InputSource>,
    _options: &psmove_capture::CaptureOptions,
) -> psmove_capture::Result<psmove_capture::SessionSummary> {
    Err(psmove_capture::Error::Unsupported(
        "built without the psmoveservice feature; use --simulate",
    ))
}
