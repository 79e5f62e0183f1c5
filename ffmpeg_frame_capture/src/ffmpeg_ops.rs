use std::{
    ffi::OsStr,
    fmt,
    io::prelude::*,
    path::PathBuf,
    process::{Child, Command, Stdio},
    time::Duration,
};

#[cfg(target_family = "windows")]
use std::os::windows::process::CommandExt;

use image::RgbImage;
use wait_timeout::ChildExt;
use FfmpegCommandName::*;
use FfmpegError::*;

use crate::{FfmpegError, VideoInfo};

const FFPROBE_TIMEOUT_SECS: u64 = 60;
const EXIT_WAIT_SECS: u64 = 2;

/// Where frames come from: a video file, or a capture device opened through one of
/// ffmpeg's input devices (for example `v4l2` with `/dev/video0`, or `dshow` on windows).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureInput {
    File(PathBuf),
    Device { format: String, name: String },
}

impl CaptureInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn device(format: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Device {
            format: format.into(),
            name: name.into(),
        }
    }

    fn ffmpeg_args(&self) -> Vec<&OsStr> {
        match self {
            Self::File(path) => vec![OsStr::new("-i"), path.as_os_str()],
            Self::Device { format, name } => vec![
                OsStr::new("-f"),
                OsStr::new(format),
                OsStr::new("-i"),
                OsStr::new(name),
            ],
        }
    }

    //ffprobe takes the input as a positional argument
    fn ffprobe_args(&self) -> Vec<&OsStr> {
        match self {
            Self::File(path) => vec![path.as_os_str()],
            Self::Device { format, name } => {
                vec![OsStr::new("-f"), OsStr::new(format), OsStr::new(name)]
            }
        }
    }
}

impl fmt::Display for CaptureInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Device { format, name } => write!(f, "{name} ({format})"),
        }
    }
}

/// How a frame stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// ffmpeg closed its output on a frame boundary and exited successfully.
    Finished,
    /// The output stopped part way through a frame.
    Truncated,
    /// ffmpeg exited with an error, did not exit, or produced an unusable frame.
    Failed,
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => write!(f, "end of input"),
            Self::Truncated => write!(f, "truncated frame"),
            Self::Failed => write!(f, "ffmpeg failure"),
        }
    }
}

/// Iterator over decoded frames. Yields None once ffmpeg stops producing complete frames
/// (end of file, device unplugged, decode failure). [`FfmpegFrameIterRgb::stream_end`] then
/// tells these apart.
#[derive(Debug)]
pub struct FfmpegFrameIterRgb {
    x: u32,
    y: u32,
    child: Child,
    frames_read: u64,
    end: Option<StreamEnd>,
}

impl FfmpegFrameIterRgb {
    fn from_child(child: Child, x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            child,
            frames_read: 0,
            end: None,
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// None while frames may still arrive.
    pub fn stream_end(&self) -> Option<StreamEnd> {
        self.end
    }

    //fills as much of buf as the child writes before closing stdout
    fn read_frame(&mut self, buf: &mut [u8]) -> usize {
        let Some(stdout) = self.child.stdout.as_mut() else {
            return 0;
        };

        let mut filled = 0;
        while filled < buf.len() {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        filled
    }

    // Reap the child once. A child still running after EXIT_WAIT_SECS is killed.
    fn finish(&mut self, partial_frame: bool) -> StreamEnd {
        if let Some(end) = self.end {
            return end;
        }

        let status = match self.child.wait_timeout(Duration::from_secs(EXIT_WAIT_SECS)) {
            Ok(Some(status)) => Some(status),
            _ => {
                let _kill_error = self.child.kill();
                let _wait_error = self.child.wait();
                None
            }
        };

        let end = match status {
            _ if partial_frame => StreamEnd::Truncated,
            Some(status) if status.success() => StreamEnd::Finished,
            _ => StreamEnd::Failed,
        };
        self.end = Some(end);
        end
    }

    fn abort(&mut self) {
        if self.end.is_none() {
            let _kill_error = self.child.kill();
            let _wait_error = self.child.wait();
            self.end = Some(StreamEnd::Failed);
        }
    }
}

impl Iterator for FfmpegFrameIterRgb {
    type Item = RgbImage;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end.is_some() {
            return None;
        }

        let raw_buf_size = (self.x as usize)
            .checked_mul(self.y as usize)
            .and_then(|pixels| pixels.checked_mul(3));

        // Attempt to prevent OOM on very implausible sizes
        let five_gigabytes = 5368709120usize;
        let raw_buf_size = match raw_buf_size {
            Some(size) if size <= five_gigabytes => size,
            _ => {
                self.abort();
                return None;
            }
        };
        let mut raw_buf = vec![0u8; raw_buf_size];

        //a short read means ffmpeg has exited or hit an error. Either way there are no more frames.
        let filled = self.read_frame(&mut raw_buf);
        if filled < raw_buf_size {
            self.finish(filled > 0);
            return None;
        }

        self.frames_read += 1;

        let frame = RgbImage::from_raw(self.x, self.y, raw_buf);
        if frame.is_none() {
            self.abort();
        }
        frame
    }
}

// to prevent accumulation of zombie processes, reap the return code of
// ffmpeg subcommands (if nothing else has done so already) here
impl Drop for FfmpegFrameIterRgb {
    fn drop(&mut self) {
        if self.end.is_none() {
            let _kill_error = self.child.kill();
            let _wait_error = self.child.wait();
        }
    }
}

#[derive(Clone, Debug)]
pub struct FfmpegFrameReaderBuilder {
    input: CaptureInput,
    fps: Option<String>,
}

impl FfmpegFrameReaderBuilder {
    pub fn new(input: CaptureInput) -> Self {
        Self {
            input,
            fps: None,
        }
    }

    /// Resample the input to this frame rate. Anything ffmpeg accepts in `-vf fps=` works,
    /// e.g. `"5"` or `"30000/1001"`.
    pub fn fps(&mut self, fps: impl AsRef<str>) -> &mut Self {
        self.fps = Some(fps.as_ref().to_string());
        self
    }

    pub fn spawn_rgb(&self) -> Result<(FfmpegFrameIterRgb, VideoInfo), FfmpegError> {
        //we also need to find out the resolution of the video so that stdout can be converted into frames.
        let stats = VideoInfo::probe(&self.input)?;

        //bail out if we get invalid dimensions.
        let (x, y) = stats.resolution();
        if x == 0 || y == 0 {
            return Err(InvalidResolution);
        }

        let fps_string = self.fps.as_ref().map(|fps| format!("fps={fps}"));
        let fps_arg = match fps_string {
            Some(ref fps_string) => vec![OsStr::new("-vf"), OsStr::new(fps_string)],
            None => vec![],
        };

        #[rustfmt::skip]
        let mut args = vec![
            OsStr::new("-hide_banner"),
            OsStr::new("-loglevel"), OsStr::new("warning"),
            OsStr::new("-nostats"),
        ];

        args.extend(self.input.ffmpeg_args());
        args.extend(fps_arg);

        #[rustfmt::skip]
        args.extend([
            OsStr::new("-pix_fmt"),  OsStr::new("rgb24"),
            OsStr::new("-c:v"),      OsStr::new("rawvideo"),
            OsStr::new("-f"),        OsStr::new("image2pipe"),
            OsStr::new("-")
        ]);

        let child = spawn_ffmpeg_command(Ffmpeg, &args, false, true)?;

        Ok((FfmpegFrameIterRgb::from_child(child, x, y), stats))
    }
}

pub(crate) fn get_video_stats(input: &CaptureInput) -> Result<String, FfmpegError> {
    let mut args = vec![
        OsStr::new("-v"),
        OsStr::new("quiet"),
        OsStr::new("-show_format"),
        OsStr::new("-show_streams"),
        OsStr::new("-print_format"),
        OsStr::new("json"),
    ];
    args.extend(input.ffprobe_args());

    let stdout = run_ffmpeg_command(Ffprobe, &args)?;

    String::from_utf8(stdout).map_err(|_| Utf8Conversion)
}

pub fn ffmpeg_and_ffprobe_are_callable() -> bool {
    //check ffprobe is callable.
    if run_ffmpeg_command(Ffprobe, &[OsStr::new("-version")]).is_err() {
        return false;
    }

    //now ffmpeg.
    if run_ffmpeg_command(Ffmpeg, &[OsStr::new("-version")]).is_err() {
        return false;
    }

    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FfmpegCommandName {
    Ffprobe,
    Ffmpeg,
    Ffplay,
}

impl FfmpegCommandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ffprobe => "ffprobe",
            Self::Ffmpeg => "ffmpeg",
            Self::Ffplay => "ffplay",
        }
    }
}

pub(crate) fn spawn_ffmpeg_command(
    name: FfmpegCommandName,
    args: &[&OsStr],
    stdout_null: bool,
    stderr_null: bool,
) -> Result<Child, FfmpegError> {
    let null_or_piped = |null: bool| if null { Stdio::null() } else { Stdio::piped() };

    let mut command = Command::new(name.as_str());
    command
        .args(args)
        .stdin(Stdio::piped())
        .stdout(null_or_piped(stdout_null))
        .stderr(null_or_piped(stderr_null));

    //do not spawn a command window on windows when when in a gui application
    #[cfg(target_family = "windows")]
    command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);

    command.spawn().map_err(|e| match e.kind() {
        //Separate out NotFound from all other errors as by far the most likely
        //cause is ffmpeg is not installed.
        std::io::ErrorKind::NotFound => CommandNotFound(name.as_str().to_string()),
        _ => Io(format!("{:?}", e.kind())),
    })
}

fn run_ffmpeg_command(name: FfmpegCommandName, args: &[&OsStr]) -> Result<Vec<u8>, FfmpegError> {
    fn truncate_ffmpeg_err_msg(stderr: &[u8]) -> FfmpegError {
        match std::str::from_utf8(stderr) {
            Ok(error_text) => FfmpegInternal(error_text.chars().take(500).collect::<String>()),
            Err(_) => Utf8Conversion,
        }
    }

    fn read_all(mut pipe: impl Read + Send + 'static) -> std::thread::JoinHandle<Vec<u8>> {
        std::thread::spawn(move || {
            let mut acc = vec![];
            let _read_error = pipe.read_to_end(&mut acc);
            acc
        })
    }

    let mut child = spawn_ffmpeg_command(name, args, false, false)?;

    // both pipes are drained concurrently: the child stalls if either fills up.
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Io("failed to obtain stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Io("failed to obtain stderr".to_string()))?;
    let stdout_reader = read_all(stdout);
    let stderr_reader = read_all(stderr);

    let status = match child.wait_timeout(Duration::from_secs(FFPROBE_TIMEOUT_SECS)) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _kill_error = child.kill();
            let _wait_error = child.wait();
            return Err(Timeout(name.as_str().to_string()));
        }
        Err(e) => return Err(Io(format!("{:?}", e.kind()))),
    };

    let stdout_acc = stdout_reader
        .join()
        .map_err(|_| Io("stdout reader panicked".to_string()))?;
    let stderr_acc = stderr_reader
        .join()
        .map_err(|_| Io("stderr reader panicked".to_string()))?;

    if status.success() {
        Ok(stdout_acc)
    } else {
        //sometimes ffmpeg creates very long error messages. Limit them to the first 500 characters
        Err(truncate_ffmpeg_err_msg(&stderr_acc))
    }
}
