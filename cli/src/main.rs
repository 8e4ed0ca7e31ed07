// Project lints
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unsafe_code)]

use crate::args::Args;
use crate::config::Config;
use classifier::report::{ReportWriter, SystemClock};
use clap::Parser;

fn main() {
    let args = Args::parse();

    // Reading config
    let mut config = match Config::from_file(&args.config) {
        Ok(value) => value,
        Err(err) => exit_with("Config initialization", &err, err.additional_info()),
    };
    if let Err(err) = args.apply(&mut config) {
        exit_with("Arguments", &err, err.additional_info());
    }

    // Logging setup
    logging::setup(&config.log_level, config.log_format.clone()).unwrap_or_else(|err| {
        exit_with("Logger initialization", &err, err.additional_info())
    });

    log::info!("Starting...");
    log::debug!("Config loaded: {:#?}", config);

    match crate::pipeline::start(&config, &ReportWriter::<SystemClock>::default()) {
        Ok(path) => println!("{}", path.display()),
        Err(err) => {
            log::error!("{}", err);
            exit_with("Run", &err, err.additional_info())
        },
    }
}

fn exit_with(context: &str, err: &dyn std::error::Error, additional_info: Option<String>) -> ! {
    let mut message = format!("{context} failed. Error: {err}");
    if let Some(additional_info) = additional_info {
        message.push_str(&format!(" Additional_info: {additional_info}"));
    }
    eprintln!("{}", message);
    std::process::exit(1);
}

mod args;
mod config;
mod logging;
mod pipeline;
