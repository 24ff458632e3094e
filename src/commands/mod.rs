//! CLI command implementations
//!
//! This module contains implementations of the commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod list_command;
pub mod extract_command;

pub use command_traits::{Command, CommandFactory};
pub use list_command::ListCommand;
pub use extract_command::{ExtractCommand, PreviewSelection};

use clap::ArgMatches;
use crate::api::PreviewKit;
use crate::preview::errors::PreviewResult;

/// Factory for creating command instances based on CLI arguments
pub struct PreviewkitCommandFactory;

impl PreviewkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        PreviewkitCommandFactory
    }
}

impl<'a> CommandFactory<'a> for PreviewkitCommandFactory {
    fn create_command(&self, args: &ArgMatches, kit: &'a PreviewKit) -> PreviewResult<Box<dyn Command + 'a>> {
        if args.contains_id("extract") {
            Ok(Box::new(ExtractCommand::new(args, kit)?))
        } else {
            Ok(Box::new(ListCommand::new(args, kit)?))
        }
    }
}
