use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use locate_cli::{run, LocateError, LocateResult, PipelineConfig, RunArgs};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "locate")]
#[command(about = "Find a target image inside a frame and mark its center")]
struct Cli {
    /// Image to look for
    #[arg(short, long, default_value = "images/target.jpeg")]
    target: PathBuf,

    /// Scene to search in
    #[arg(short, long, default_value = "images/frame.jpeg")]
    frame: PathBuf,

    /// Where to write the annotated frame
    #[arg(short, long = "output_image", default_value = "out.jpeg")]
    output_image: PathBuf,

    /// Pipeline settings (.json or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> LocateResult<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    #[cfg(feature = "serde")]
    let loaded = PipelineConfig::load(path);
    #[cfg(not(feature = "serde"))]
    let loaded = Err(locate_cli::ConfigError::UnsupportedFormat(
        "built without config file support".to_string(),
    ));
    loaded.map_err(|source| LocateError::ConfigFile {
        path: path.clone(),
        source,
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|cfg| {
        info!("settings: {}", cfg.summary());
        let args = RunArgs {
            target: cli.target,
            frame: cli.frame,
            output: cli.output_image,
        };
        run(&args, cfg)
    });

    match result {
        Ok(detection) => {
            println!(
                "center: ({:.2}, {:.2})",
                detection.center.x, detection.center.y
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
