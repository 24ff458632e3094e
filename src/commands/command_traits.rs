//! Command pattern interfaces
//!
//! This module defines the core Command pattern interfaces
//! for the CLI application.

use crate::api::PreviewKit;
use crate::preview::errors::PreviewResult;

/// Represents an executable command in the application
///
/// Command objects encapsulate the logic for a specific CLI operation.
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> PreviewResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory<'a> {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Library facade the command runs against
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &clap::ArgMatches, kit: &'a PreviewKit) -> PreviewResult<Box<dyn Command + 'a>>;
}

/// Input file paths given on the command line
pub(crate) fn input_files(args: &clap::ArgMatches) -> PreviewResult<Vec<String>> {
    let inputs: Vec<String> = args.get_many::<String>("input")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if inputs.is_empty() {
        return Err("Missing input file".to_string().into());
    }
    Ok(inputs)
}

/// Turns per-file failures into one error once every file has been tried
pub(crate) fn summarize_failures(failed: usize, total: usize) -> PreviewResult<()> {
    if failed == 0 {
        Ok(())
    } else {
        Err(format!("{} of {} files could not be processed", failed, total).into())
    }
}
