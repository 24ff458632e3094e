use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::{error, LevelFilter};

use previewkit::PreviewKit;
use previewkit::utils::logger::Logger;
use previewkit::commands::{CommandFactory, PreviewkitCommandFactory};

fn main() {
    let matches = ClapCommand::new("PreviewKit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("List and extract embedded previews of JPEG, TIFF and camera raw files")
        .arg(
            Arg::new("input")
                .help("Input image files")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Also print the metadata entries of each file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("extract")
                .short('e')
                .long("extract")
                .help("Extract the preview with this id, or all of them")
                .value_name("ID|all")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory for extracted previews (default: next to the input)")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("mime")
                .long("mime")
                .help("Treat the inputs as this MIME type instead of sniffing it")
                .value_name("TYPE")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write the log to this file instead of the console")
                .value_name("FILE")
                .required(false),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { LevelFilter::Info };
    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            if let Err(e) = Logger::init_global_logger(log_file, level) {
                eprintln!("Error setting up logger: {}", e);
                process::exit(1);
            }
        },
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
        },
    }

    let kit = match matches.get_one::<String>("mime") {
        Some(mime_type) => PreviewKit::new().with_mime_type(mime_type),
        None => PreviewKit::new(),
    };

    let factory = PreviewkitCommandFactory::new();

    let command_result = factory.create_command(&matches, &kit);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
