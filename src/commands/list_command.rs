//! Preview listing command

use clap::ArgMatches;
use log::{error, info};

use crate::api::PreviewKit;
use crate::commands::command_traits::{self, Command};
use crate::preview::errors::PreviewResult;
use crate::preview::image::PreviewProperties;
use crate::preview::manager::PreviewManager;
use crate::utils::progress::ProgressTracker;

/// Command for listing the previews of one or more files
pub struct ListCommand<'a> {
    /// Paths of the input files
    input_files: Vec<String>,
    /// Whether to print the metadata entries as well
    verbose: bool,
    kit: &'a PreviewKit,
}

impl<'a> ListCommand<'a> {
    /// Create a new list command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Library facade used to open the files
    pub fn new(args: &ArgMatches, kit: &'a PreviewKit) -> PreviewResult<Self> {
        let input_files = command_traits::input_files(args)?;
        let verbose = args.get_flag("verbose");
        info!("Listing previews of {} files (verbose: {})", input_files.len(), verbose);

        Ok(ListCommand { input_files, verbose, kit })
    }

    fn list_file(&self, input_file: &str, progress: &ProgressTracker) -> PreviewResult<()> {
        let source = self.kit.open(input_file)?;
        let previews = PreviewManager::new(&source).enumerate()?;

        progress.println(&format!("{}: {}, {} previews", input_file, source.mime_type(), previews.len()));
        for properties in &previews {
            progress.println(&format_preview(properties));
        }

        if self.verbose {
            for entry in source.metadata().iter() {
                progress.println(&format!("  {:<48} {:>5} {}", entry.key().to_string(), entry.count(), entry.value()));
            }
        }
        Ok(())
    }
}

impl<'a> Command for ListCommand<'a> {
    fn execute(&self) -> PreviewResult<()> {
        let progress = ProgressTracker::for_items(self.input_files.len(), "Listing previews");
        let mut failed = 0;

        for input_file in &self.input_files {
            progress.set_message(input_file);
            if let Err(e) = self.list_file(input_file, &progress) {
                error!("{}: {}", input_file, e);
                failed += 1;
            }
            progress.increment(1);
        }

        progress.finish();
        command_traits::summarize_failures(failed, self.input_files.len())
    }
}

/// One listing line: id, type, size and dimensions
pub fn format_preview(properties: &PreviewProperties) -> String {
    format!("  Preview {}: {}, {} bytes, {}x{}",
            properties.id, properties.mime_type, properties.size, properties.width, properties.height)
}
