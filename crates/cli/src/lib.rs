use anyhow::{Context as AnyhowContext, Result};
use arbitrem_navigator::{
    AssociationConfig, AssociationEngine, FileIndexWriters, NavigatorParser,
};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::flags::IndicesLayoutFlag;
use crate::settings::SessionSettings;

mod flags;
mod report;
mod settings;
mod template;

/// Print one line; a closed pipe (`| head`) ends output quietly
fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{text}").and_then(|()| stdout.flush()) {
        Err(err) if err.kind() != io::ErrorKind::BrokenPipe => Err(err.into()),
        _ => Ok(()),
    }
}

#[derive(Parser, Debug)]
#[command(name = "process-navigator")]
#[command(
    about = "Process a SerialEM navigator so acquisition points are associated with specific view-maps",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// SerialEM navigator file (text format, not XML)
    #[arg(long, value_name = "FILE")]
    nav: PathBuf,

    /// Diameter of the targeting view-map in micrometers
    #[arg(long, alias = "d", value_name = "MICROMETERS", allow_negative_numbers = true)]
    diameter: f64,

    /// Output directory for ArbitrEM files
    #[arg(long, alias = "o", default_value = "./arbitrEM")]
    output_dir: PathBuf,

    /// Session base path on the SerialEM computer, e.g. "D:\session\specimen_X"
    #[arg(long, alias = "sessionBasePath", required_unless_present = "no_settings")]
    session_base_path: Option<String>,

    /// Beam-image shift offset applied to calculated targeting X,Y shifts
    #[arg(long, alias = "customShiftOffset", default_value = "0.0 0.0", allow_hyphen_values = true)]
    custom_shift_offset: String,

    /// Defocus range and step, e.g. '-1 -2.5 0.2' (step must be positive)
    #[arg(long, alias = "defocusRange", default_value = "-1 -2.6 0.2", allow_hyphen_values = true)]
    defocus_range: String,

    /// 0 - early return on, 1 - early return off
    #[arg(long, alias = "earlyReturn", default_value = "1")]
    early_return: String,

    /// Template script into which parameters are embedded
    #[arg(long, alias = "scriptTemplate", default_value = "./ArbitrEM.txt")]
    script_template: PathBuf,

    /// Defocus used for view-map acquisition
    #[arg(long, alias = "viewMapDefocus", default_value = "-75", allow_hyphen_values = true)]
    view_map_defocus: String,

    /// Exposure time used for view-map acquisition
    #[arg(long, alias = "viewMapExpTime", default_value = "1")]
    view_map_exp_time: String,

    /// Skip settings files and script generation
    #[arg(long)]
    no_settings: bool,

    /// Write one indices line per anchor (what the acquisition script reads) or per record
    #[arg(long, value_enum, default_value_t = IndicesLayoutFlag::PerAnchor)]
    indices_layout: IndicesLayoutFlag,

    /// Verbose output for diagnostic purposes
    #[arg(short, long, alias = "v")]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,

    /// Print the summary as JSON (stdout is reserved for it)
    #[arg(long)]
    json: bool,
}

/// Everything one run needs, resolved from the command line up front
#[derive(Debug, Clone)]
struct RunOptions {
    navigator: PathBuf,
    output_dir: PathBuf,
    association: AssociationConfig,
    settings: Option<SessionSettings>,
    verbose: bool,
    json: bool,
}

impl Cli {
    fn into_options(self) -> Result<RunOptions> {
        let association = AssociationConfig {
            view_map_diameter_um: self.diameter,
            indices_layout: self.indices_layout.as_domain(),
        };
        association
            .validate()
            .map_err(|msg| anyhow::anyhow!("Invalid --diameter: {msg}"))?;

        let settings = match (self.no_settings, self.session_base_path) {
            (true, _) => None,
            (false, Some(session_base_path)) => Some(SessionSettings {
                session_base_path,
                custom_shift_offset: self.custom_shift_offset,
                defocus_range: self.defocus_range,
                early_return: self.early_return,
                script_template: self.script_template,
                view_map_defocus: self.view_map_defocus,
                view_map_exp_time: self.view_map_exp_time,
                view_map_diameter_um: self.diameter,
            }),
            (false, None) => anyhow::bail!(
                "Please specify a session base path on the computer running SerialEM, e.g. --session-base-path \"D:\\session\\specimen_X\""
            ),
        };

        Ok(RunOptions {
            navigator: self.nav,
            output_dir: self.output_dir,
            association,
            settings,
            verbose: self.verbose,
            json: self.json,
        })
    }
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let options = cli.into_options()?;
    run(&options)
}

fn run(options: &RunOptions) -> Result<()> {
    let say = |text: &str| -> Result<()> {
        if options.json {
            Ok(())
        } else {
            print_stdout(text)
        }
    };

    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;
    say(&format!(
        "ArbitrEM related files are being written to: {}",
        options.output_dir.display()
    ))?;

    let records = NavigatorParser::parse_file(&options.navigator)?;
    if options.verbose {
        say(&format!(
            "{} navigator items have been identified...",
            records.len()
        ))?;
    }

    let engine = AssociationEngine::new(options.association)?;
    let report = {
        let mut out = FileIndexWriters::create_in(&options.output_dir)?;
        engine.run(&records, &mut out)?
    };

    if options.verbose {
        for line in report::render_anchor_lines(&report)
            .into_iter()
            .chain(report::render_written_lines(&options.output_dir, &report))
        {
            say(&line)?;
        }
    }

    if options.json {
        let value = report::render_json(&options.navigator, &report);
        print_stdout(&serde_json::to_string_pretty(&value)?)?;
    } else {
        say(&report::render_summary(&options.navigator, &report))?;
    }

    if let Some(session) = &options.settings {
        let written = settings::write_settings_files(&options.output_dir, session);
        log::debug!("wrote {} settings files", written.len());
        if let Err(err) = settings::write_script(&options.output_dir, session) {
            log::warn!("{err:#}");
        }
    }

    say("Finished.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitrem_navigator::IndicesLayout;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("process-navigator").chain(args.iter().copied()))
    }

    #[test]
    fn legacy_flag_spellings_are_accepted() {
        let cli = parse(&[
            "--nav",
            "grid.nav",
            "--d",
            "1.2",
            "--o",
            "out",
            "--sessionBasePath",
            "D:\\session",
            "--defocusRange",
            "-1 -2.5 0.2",
            "--v",
        ])
        .unwrap();
        assert_eq!(cli.diameter, 1.2);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.defocus_range, "-1 -2.5 0.2");
        assert!(cli.verbose);

        let options = cli.into_options().unwrap();
        assert_eq!(options.association.radius_um(), 0.6);
        assert_eq!(options.association.indices_layout, IndicesLayout::PerAnchor);
        let settings = options.settings.unwrap();
        assert_eq!(settings.session_base_path, "D:\\session");
        assert_eq!(settings.custom_shift_offset, "0.0 0.0");
    }

    #[test]
    fn session_base_path_required_unless_settings_skipped() {
        assert!(parse(&["--nav", "grid.nav", "--diameter", "2"]).is_err());

        let cli = parse(&["--nav", "grid.nav", "--diameter", "2", "--no-settings"]).unwrap();
        let options = cli.into_options().unwrap();
        assert!(options.settings.is_none());
    }

    #[test]
    fn non_positive_diameter_is_rejected() {
        let cli = parse(&["--nav", "grid.nav", "--diameter", "-2", "--no-settings"]).unwrap();
        let err = cli.into_options().unwrap_err();
        assert!(err.to_string().contains("--diameter"), "{err}");
    }

    #[test]
    fn per_record_layout_flag_maps_to_domain() {
        let cli = parse(&[
            "--nav",
            "grid.nav",
            "--diameter",
            "2",
            "--no-settings",
            "--indices-layout",
            "per-record",
        ])
        .unwrap();
        let options = cli.into_options().unwrap();
        assert_eq!(options.association.indices_layout, IndicesLayout::PerRecord);
    }
}
