use std::{error::Error, fs::File, path::Path};

use debris_tracker::{
    open_source, run_menu, Detector, FfplayDisplay, PreviewFileDisplay, SessionState,
    Thresholds, Tracker,
};

use crate::app::*;

const WINDOW_TITLE: &str = "Debris Tracker";

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.output_cfg.verbosity, &cfg.output_cfg.log_file);

    let ret = match run_app_inner(&cfg) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.output_cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<()> {
    let detection_cfg = &cfg.detection_cfg;
    let output_cfg = &cfg.output_cfg;

    //bad thresholds on the command line are fatal. From the menu they are only rejected.
    let thresholds = Thresholds::new(detection_cfg.min_area, detection_cfg.max_area)
        .map_err(AppError::from)?;
    let detector = Detector::new(detection_cfg.detector).map_err(AppError::from)?;

    let source = open_source(&cfg.input_cfg.source, cfg.input_cfg.fps.as_deref())
        .map_err(AppError::from)?;

    let session = SessionState::new(thresholds, detection_cfg.visualization);
    let tracker = Tracker::new(source, detector, session)
        .with_paths(output_cfg.paths.clone())
        .with_save_on_exit(output_cfg.save_on_exit);

    let tracker = match output_cfg.display {
        DisplayKind::Ffplay => tracker.with_display(FfplayDisplay::new(WINDOW_TITLE)),
        DisplayKind::PreviewFile => {
            tracker.with_display(PreviewFileDisplay::new(&output_cfg.preview_path))
        }
        DisplayKind::Off => tracker,
    };

    info!(
        "Counting regions of {} to {} pixels",
        thresholds.min_area(),
        thresholds.max_area()
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let session = run_menu(tracker, stdin.lock(), stdout.lock()).map_err(AppError::from)?;

    info!(
        "Session ended after {} frames",
        session.counts().len()
    );

    Ok(())
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn Error + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

pub fn configure_logs(verbosity: ReportVerbosity, log_file: &Path) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_target_level(LevelFilter::Error);
    let cfg = cfg.build();

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        min_loglevel,
        cfg.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    //a missing log file is not worth stopping for.
    let log_file_err = match File::create(log_file) {
        Ok(file) => {
            loggers.push(WriteLogger::new(LevelFilter::Debug, cfg, file));
            None
        }
        Err(e) => Some(e),
    };

    CombinedLogger::init(loggers)
        .unwrap_or_else(|e| print_error_and_quit(eyre::Report::new(e)));

    if let Some(e) = log_file_err {
        warn!(
            "Could not open log file {}: {e}",
            log_file.to_string_lossy()
        );
    }
}
