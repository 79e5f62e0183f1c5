use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};
use debris_tracker::{
    definitions::*, BackgroundKind, ConfigError, DetectorCfg, SourceSpec, TrackerPaths,
};

use crate::app::*;

const DEFAULT_LOG_FILE: &str = "debris_tracker.log";

// input
const INPUT: &str = "Input file or directory";
const DEVICE: &str = "Capture device";
const DEVICE_FORMAT: &str = "Capture device format";
const FPS: &str = "Frame rate";

// detection
const MIN_AREA: &str = "Minimum area";
const MAX_AREA: &str = "Maximum area";
const BACKGROUND: &str = "Background model";
const LEARNING_RATE: &str = "Learning rate";
const DIFF_THRESHOLD: &str = "Difference threshold";
const MEDIAN_RADIUS: &str = "Median filter radius";

// visualization
const NO_VISUALIZATION: &str = "No visualization";
const DISPLAY: &str = "Display";
const PREVIEW_PATH: &str = "Preview path";

// outputs
const CSV_PATH: &str = "Counts CSV path";
const DETECTIONS_PATH: &str = "Sightings CSV path";
const PLOT_PATH: &str = "Plot path";
const SAVE_ON_EXIT: &str = "Save on exit";
const LOG_FILE: &str = "Log file";

// Arg specification
const ARGS_FILE: &str = "Args file";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 21] = [
    //
    // input
    INPUT,
    DEVICE,
    DEVICE_FORMAT,
    FPS,
    //
    // detection
    MIN_AREA,
    MAX_AREA,
    BACKGROUND,
    LEARNING_RATE,
    DIFF_THRESHOLD,
    MEDIAN_RADIUS,
    //
    // visualization
    NO_VISUALIZATION,
    DISPLAY,
    PREVIEW_PATH,
    //
    // outputs
    CSV_PATH,
    DETECTIONS_PATH,
    PLOT_PATH,
    SAVE_ON_EXIT,
    LOG_FILE,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
    //argument replacement
    ARGS_FILE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Debris tracker")
        .version(clap::crate_version!())
        .about("Detect and count space debris in a video feed, driven by a numbered menu");

    clap_app = clap_app.arg(
        clap::Arg::new(INPUT)
            .long("input")
            .short('i')
            .required_unless_present_any([DEVICE, ARGS_FILE])
            .conflicts_with(DEVICE)
            .value_parser(value_parser!(PathBuf))
            .help("A video file, or a directory of still frames which are read in file name order")
            .display_order(get_ordering(INPUT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DEVICE)
            .long("device")
            .help("A live capture device, e.g. /dev/video0")
            .display_order(get_ordering(DEVICE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DEVICE_FORMAT)
            .long("device-format")
            .default_value("v4l2")
            .help("The ffmpeg input format used to open --device (v4l2, dshow, avfoundation...)")
            .display_order(get_ordering(DEVICE_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(FPS)
            .long("fps")
            .help("Resample the input to this frame rate (e.g. 10 or 30000/1001). Ignored for image directories")
            .display_order(get_ordering(FPS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MIN_AREA)
            .long("min-area")
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_MIN_AREA.to_string())
            .help("Smallest region, in pixels, counted as debris")
            .display_order(get_ordering(MIN_AREA)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_AREA)
            .long("max-area")
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_MAX_AREA.to_string())
            .help("Largest region, in pixels, counted as debris")
            .display_order(get_ordering(MAX_AREA)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(BACKGROUND)
            .long("background")
            .value_parser(value_parser!(BackgroundArg))
            .default_value("running-average")
            .help("How foreground is separated from the sky. brightness: anything bright. frame-difference: anything that changed since the last frame. running-average: anything that differs from a slowly updated average of past frames")
            .display_order(get_ordering(BACKGROUND)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(LEARNING_RATE)
            .long("learning-rate")
            .value_parser(parse_learning_rate)
            .default_value(DEFAULT_LEARNING_RATE.to_string())
            .help("Fraction of each new frame blended into the running-average background. Must be greater than 0 and at most 1")
            .display_order(get_ordering(LEARNING_RATE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DIFF_THRESHOLD)
            .long("diff-threshold")
            .value_parser(value_parser!(u8))
            .default_value(DEFAULT_DIFF_THRESHOLD.to_string())
            .help("Luma difference (0-255) at or above which a pixel is foreground")
            .display_order(get_ordering(DIFF_THRESHOLD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MEDIAN_RADIUS)
            .long("median-radius")
            .value_parser(value_parser!(u32))
            .default_value(DEFAULT_MEDIAN_RADIUS.to_string())
            .help("Radius of the median filter used to remove speckle from the foreground. 0 disables it")
            .display_order(get_ordering(MEDIAN_RADIUS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(NO_VISUALIZATION)
            .long("no-visualization")
            .action(SetTrue)
            .help("Start with visualization turned off. It can be turned on from the menu")
            .display_order(get_ordering(NO_VISUALIZATION)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DISPLAY)
            .long("display")
            .value_parser(value_parser!(DisplayKind))
            .default_value("ffplay")
            .help("Where annotated frames are shown. ffplay: a window (needs ffplay). preview-file: overwrite --preview-path with each frame")
            .display_order(get_ordering(DISPLAY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(PREVIEW_PATH)
            .long("preview-path")
            .value_parser(value_parser!(PathBuf))
            .default_value(DEFAULT_PREVIEW_PATH)
            .display_order(get_ordering(PREVIEW_PATH)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CSV_PATH)
            .long("csv-path")
            .value_parser(value_parser!(PathBuf))
            .default_value(DEFAULT_CSV_PATH)
            .help("Where per-frame counts are saved and loaded from")
            .display_order(get_ordering(CSV_PATH)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DETECTIONS_PATH)
            .long("detections-path")
            .value_parser(value_parser!(PathBuf))
            .default_value(DEFAULT_DETECTIONS_PATH)
            .help("Where the position and area of every counted region is saved")
            .display_order(get_ordering(DETECTIONS_PATH)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(PLOT_PATH)
            .long("plot-path")
            .value_parser(value_parser!(PathBuf))
            .default_value(DEFAULT_PLOT_PATH)
            .help("Where the bar chart of counts is saved. The image format follows the extension")
            .display_order(get_ordering(PLOT_PATH)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SAVE_ON_EXIT)
            .long("save-on-exit")
            .action(SetTrue)
            .help("Save both CSV files when the menu exits")
            .display_order(get_ordering(SAVE_ON_EXIT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(LOG_FILE)
            .long("log-file")
            .value_parser(value_parser!(PathBuf))
            .default_value(DEFAULT_LOG_FILE)
            .display_order(get_ordering(LOG_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(ARGS_FILE)
            .long("args-file")
            .value_parser(value_parser!(PathBuf))
            .help("Read arguments from a file instead of the command line. Lines starting with # are ignored")
            .display_order(get_ordering(ARGS_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

fn parse_learning_rate(text: &str) -> Result<f32, String> {
    let rate = text.parse::<f32>().map_err(|e| e.to_string())?;
    ConfigError::check_learning_rate(rate).map_err(|e| e.to_string())
}

pub fn parse_args() -> AppCfg {
    //Start by parsing the provided arguments from the commandline. If the --args-file
    //argument is provided, then we will ignore the true command line arguments and
    //take the arguments from the file instead.
    let args = get_args_from_cmdline_or_file();
    cfg_from_matches(&args)
}

fn cfg_from_matches(args: &clap::ArgMatches) -> AppCfg {
    let source = match (
        args.get_one::<PathBuf>(INPUT),
        args.get_one::<String>(DEVICE),
    ) {
        (_, Some(device)) => SourceSpec::Device {
            format: args
                .get_one::<String>(DEVICE_FORMAT)
                .cloned()
                .unwrap_or_else(|| "v4l2".to_string()),
            name: device.clone(),
        },
        (Some(path), None) => SourceSpec::Path(path.clone()),

        //only reachable from an args file that names no input.
        (None, None) => print_error_and_quit(eyre::Report::msg(
            "one of --input or --device must be given",
        )),
    };

    let input_cfg = InputCfg {
        source,
        fps: args.get_one::<String>(FPS).cloned(),
    };

    let background = match args.get_one::<BackgroundArg>(BACKGROUND) {
        Some(BackgroundArg::Brightness) => BackgroundKind::Brightness,
        Some(BackgroundArg::FrameDifference) => BackgroundKind::FrameDifference,
        Some(BackgroundArg::RunningAverage) | None => BackgroundKind::RunningAverage {
            learning_rate: *args
                .get_one::<f32>(LEARNING_RATE)
                .expect("This argument has a default value"),
        },
    };

    let detector = DetectorCfg {
        background,
        diff_threshold: *args
            .get_one::<u8>(DIFF_THRESHOLD)
            .expect("This argument has a default value"),
        median_radius: *args
            .get_one::<u32>(MEDIAN_RADIUS)
            .expect("This argument has a default value"),
    };

    let detection_cfg = DetectionCfg {
        detector,
        min_area: *args
            .get_one::<u32>(MIN_AREA)
            .expect("This argument has a default value"),
        max_area: *args
            .get_one::<u32>(MAX_AREA)
            .expect("This argument has a default value"),
        visualization: !args.get_flag(NO_VISUALIZATION),
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let path_arg = |name: &str| -> PathBuf {
        args.get_one::<PathBuf>(name)
            .cloned()
            .expect("This argument has a default value")
    };

    let output_cfg = OutputCfg {
        display: *args
            .get_one::<DisplayKind>(DISPLAY)
            .expect("This argument has a default value"),
        preview_path: path_arg(PREVIEW_PATH),
        paths: TrackerPaths {
            counts_csv: path_arg(CSV_PATH),
            sightings_csv: path_arg(DETECTIONS_PATH),
            plot: path_arg(PLOT_PATH),
        },
        save_on_exit: args.get_flag(SAVE_ON_EXIT),
        log_file: path_arg(LOG_FILE),
        verbosity,
    };

    let ret = AppCfg {
        input_cfg,
        detection_cfg,
        output_cfg,
    };

    ret
}

// Arguments are always first read from the command line, but if --args-file
// is present, then arguments are actually located in a file on disk.
// This fn obtains the args from the correct location.
fn get_args_from_cmdline_or_file() -> clap::ArgMatches {
    let cmdline_args = build_app().get_matches();

    match cmdline_args.get_one::<PathBuf>(ARGS_FILE) {
        None => cmdline_args,
        Some(args_path) => get_argsfile_args(args_path),
    }
}

fn get_argsfile_args(argsfile_path: &Path) -> clap::ArgMatches {
    let args = std::fs::read_to_string(argsfile_path)
        .map_err(eyre::Report::msg)
        .and_then(|text| split_argsfile(&text))
        .map_err(|e| {
            e.wrap_err(format!(
                "Failed to parse args file at location {}",
                argsfile_path.to_string_lossy()
            ))
        })
        .unwrap_or_else(|e| print_error_and_quit(e));

    //When parsing args from file, the binary name will not be present,
    // so update the parser that we use to not expect it.
    let matches = build_app().no_binary_name(true).get_matches_from(args);
    matches
}

//drop comment lines, then split the rest into args the same way a shell would.
fn split_argsfile(text: &str) -> eyre::Result<Vec<String>> {
    let contents = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    shell_words::split(&contents).map_err(eyre::Report::msg)
}
