//! Preview extraction command
//!
//! Writes one preview, or all of them, of each input file to
//! `<output>/<stem>-preview<id><ext>`.

use clap::ArgMatches;
use log::{error, info, warn};
use std::path::PathBuf;

use crate::api::PreviewKit;
use crate::commands::command_traits::{self, Command};
use crate::preview::errors::{PreviewError, PreviewResult};
use crate::preview::image::PreviewId;
use crate::utils::progress::ProgressTracker;

/// Which previews to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSelection {
    All,
    Single(PreviewId),
}

impl PreviewSelection {
    /// Parses `all` or a numeric preview id
    pub fn parse(text: &str) -> PreviewResult<Self> {
        if text.eq_ignore_ascii_case("all") {
            return Ok(PreviewSelection::All);
        }

        text.parse::<PreviewId>()
            .map(PreviewSelection::Single)
            .map_err(|_| PreviewError::GenericError(format!("Invalid preview id: {}", text)))
    }
}

/// Command for extracting previews from one or more files
pub struct ExtractCommand<'a> {
    /// Paths of the input files
    input_files: Vec<String>,
    /// Previews to write
    selection: PreviewSelection,
    /// Output directory; each input's own directory if absent
    output_dir: Option<PathBuf>,
    kit: &'a PreviewKit,
}

impl<'a> ExtractCommand<'a> {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Library facade used to open and extract
    ///
    /// # Returns
    /// A new ExtractCommand instance or an error
    pub fn new(args: &ArgMatches, kit: &'a PreviewKit) -> PreviewResult<Self> {
        let input_files = command_traits::input_files(args)?;

        let selection = args.get_one::<String>("extract")
            .ok_or_else(|| PreviewError::GenericError("Missing preview id".to_string()))
            .and_then(|text| PreviewSelection::parse(text))?;
        info!("Preview selection: {:?}", selection);

        let output_dir = args.get_one::<String>("output").map(PathBuf::from);
        info!("Output directory: {:?}", output_dir);

        Ok(ExtractCommand { input_files, selection, output_dir, kit })
    }

    fn extract_file(&self, input_file: &str) -> PreviewResult<Vec<PathBuf>> {
        let output_dir = self.output_dir.as_deref();
        match self.selection {
            PreviewSelection::All => self.kit.extract_all(input_file, output_dir),
            PreviewSelection::Single(id) => {
                let written = self.kit.extract(input_file, id, output_dir)?;
                Ok(written.into_iter().collect())
            },
        }
    }
}

impl<'a> Command for ExtractCommand<'a> {
    fn execute(&self) -> PreviewResult<()> {
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir).map_err(|e| PreviewError::io(dir, e))?;
        }

        let progress = ProgressTracker::for_items(self.input_files.len(), "Extracting previews");
        let mut failed = 0;

        for input_file in &self.input_files {
            progress.set_message(input_file);
            match self.extract_file(input_file) {
                Ok(written) if written.is_empty() => warn!("{}: nothing extracted", input_file),
                Ok(written) => {
                    for path in written {
                        progress.println(&path.display().to_string());
                    }
                },
                Err(e) => {
                    error!("{}: {}", input_file, e);
                    failed += 1;
                },
            }
            progress.increment(1);
        }

        progress.finish();
        command_traits::summarize_failures(failed, self.input_files.len())
    }
}
