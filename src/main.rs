use clap::Parser;
use std::path::PathBuf;
use unimerge::{MergeOptions, MergeResult, Merger, ProjectRules, SystemTools, errors_dir_for};

mod logging;
mod summary;

use summary::SummaryDisplay;

#[derive(Parser, Debug)]
#[command(name = "unimerge")]
#[command(version)]
#[command(about = "Combine two architecture-specific installations into one universal installation")]
#[command(long_about = "Combine two architecture-specific installations into one universal \
installation.

The merge continues even if some individual files do not combine. For files \
that exist in both sources but cannot be combined, the file from <FIRST_DIR> is \
copied to <MERGED_DIR> and the file from <SECOND_DIR> is copied to \
<MERGED_DIR>_errors. For files that exist in only one source, that file is \
copied to <MERGED_DIR> and an empty file is created in <MERGED_DIR>_errors.")]
struct Cli {
    /// Preprocessor test selecting the first architecture, e.g. '#ifndef __aarch64__'
    #[arg(long = "header_condition", value_name = "PREPROC_TEST_FIRST")]
    header_condition: Option<String>,

    /// Install prefix substitution: <FIRST> in the first tree and <SECOND> in
    /// the second tree are both replaced with <MERGED> (repeatable)
    #[arg(
        long = "install_subst",
        num_args = 3,
        value_names = ["FIRST", "SECOND", "MERGED"],
        action = clap::ArgAction::Append
    )]
    install_subst: Vec<String>,

    /// JSON file overriding the feature-flag tables used for .prl/.pri/.cmake files
    #[arg(long = "project_rules", value_name = "FILE")]
    project_rules: Option<PathBuf>,

    #[arg(long, help = "Output results as JSON")]
    json: bool,

    /// First architecture's installation
    first_dir: PathBuf,

    /// Second architecture's installation
    second_dir: PathBuf,

    /// Destination for the merged installation (recreated)
    merged_dir: PathBuf,
}

impl Cli {
    fn merge_options(&self) -> MergeResult<MergeOptions> {
        let mut options = MergeOptions::new();

        if let Some(condition) = &self.header_condition {
            options = options.with_header_condition(condition.as_str())?;
        }

        for triple in self.install_subst.chunks_exact(3) {
            options = options.with_install_substitution(
                triple[0].as_str(),
                triple[1].as_str(),
                triple[2].as_str(),
            );
        }

        if let Some(path) = &self.project_rules {
            options = options.with_project_rules(ProjectRules::from_file(path)?);
        }

        Ok(options)
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging();

    let options = match cli.merge_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let display = SummaryDisplay::new(&cli.first_dir, &cli.second_dir, &cli.merged_dir, &options);
    if !cli.json {
        display.show_banner();
    }

    let tools = SystemTools::new();
    let result = Merger::new(options.clone(), &tools)
        .and_then(|merger| merger.run(&cli.first_dir, &cli.second_dir, &cli.merged_dir));

    match result {
        Ok(report) if cli.json => display.show_json(&report, &errors_dir_for(&cli.merged_dir)),
        Ok(report) => display.show_report(&report),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
