use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{ffmpeg_ops::get_video_stats, CaptureInput, FfmpegError};

#[derive(Debug, Deserialize, Serialize, Clone, Error)]
pub enum VideoInfoError {
    #[error("Error parsing stats: {0}")]
    JsonError(String),
    #[error("Error parsing stats: {0}")]
    ParseFloatError(String),
    #[error("Unexpected video rotation: {0}")]
    Rotation(String),
}

impl From<serde_json::Error> for VideoInfoError {
    fn from(e: serde_json::Error) -> Self {
        //limit maximum number of characters
        let error_string = format!("{e}").chars().take(500).collect::<String>();
        VideoInfoError::JsonError(error_string)
    }
}

impl From<std::num::ParseFloatError> for VideoInfoError {
    fn from(e: std::num::ParseFloatError) -> Self {
        VideoInfoError::ParseFloatError(format!("{e}"))
    }
}

// If the video metadata declares a rotation, the raw (x, y) resolution in that metadata
// refers to the "unrotated" resolution. ffmpeg autorotates the decoded frames, so x and y
// must be swapped if the rotation is 90 or 270
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
enum FfmpegVideoRotation {
    #[default]
    Rot0,
    Rot90,
    Rot180,
    Rot270,
}

/// The parts of the ffprobe report needed to decode raw frames.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize, Default)]
pub struct VideoInfo {
    duration: Option<std::time::Duration>,
    resolution: (u32, u32),
}

impl VideoInfo {
    /// Use ffprobe to get the resolution (and duration, when the input has one) of the first
    /// video stream of the input.
    ///
    /// # errors
    /// * The input cannot be opened or is not recognized as a video by ffprobe
    /// * The output from ffprobe could not be parsed as JSON
    pub fn probe(input: &CaptureInput) -> Result<Self, FfmpegError> {
        let stats_string = get_video_stats(input)?;
        let info = Self::from_ffprobe_json(&stats_string)?;
        Ok(info)
    }

    /// Interpret the output of `ffprobe -show_format -show_streams -print_format json`.
    pub fn from_ffprobe_json(stats_string: &str) -> Result<Self, VideoInfoError> {
        let stats_parsed: Value = serde_json::from_str(stats_string)?;

        // live capture devices report no duration
        let duration = match &stats_parsed["format"]["duration"] {
            Value::String(d) => {
                let secs = d.parse::<f64>()?;
                (secs.is_finite() && secs >= 0.0).then(|| std::time::Duration::from_secs_f64(secs))
            }
            _ => None,
        };

        let rotation = {
            let rotation = Self::first_video(&stats_parsed).and_then(|video_stream| {
                video_stream
                    .get("side_data_list")
                    .and_then(|y| y.get(0).and_then(|x| x.get("rotation").cloned()))
            });

            // the rotation may either be a JSON String or JSON number
            let rotation = match rotation {
                None => None,
                Some(Value::Number(val)) => val.as_i64(),
                Some(Value::String(val)) => Some(
                    val.parse::<i64>()
                        .map_err(|_| VideoInfoError::Rotation(val.clone()))?,
                ),
                Some(other) => return Err(VideoInfoError::Rotation(other.to_string())),
            };

            match rotation {
                None | Some(0) => FfmpegVideoRotation::Rot0,
                Some(90) | Some(-270) => FfmpegVideoRotation::Rot90,
                Some(180) | Some(-180) => FfmpegVideoRotation::Rot180,
                Some(-90) | Some(270) => FfmpegVideoRotation::Rot270,
                Some(other) => return Err(VideoInfoError::Rotation(other.to_string())),
            }
        };

        let resolution = {
            let first_width = Self::first_vid_u32(&stats_parsed, "width").unwrap_or(0);
            let first_height = Self::first_vid_u32(&stats_parsed, "height").unwrap_or(0);

            match rotation {
                FfmpegVideoRotation::Rot0 | FfmpegVideoRotation::Rot180 => {
                    (first_width, first_height)
                }
                FfmpegVideoRotation::Rot90 | FfmpegVideoRotation::Rot270 => {
                    (first_height, first_width)
                }
            }
        };

        Ok(VideoInfo {
            duration,
            resolution,
        })
    }

    /// The duration of the input, or None for live sources.
    pub fn duration(&self) -> Option<std::time::Duration> {
        self.duration
    }

    /// The resolution of the decoded frames in pixels, already corrected for rotation metadata.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn first_video(stats_parsed: &Value) -> Option<&Value> {
        Self::streams_of_type(stats_parsed, "video").and_then(|videos| videos.into_iter().next())
    }

    fn streams_of_type<'a>(stats_parsed: &'a Value, stream_type: &str) -> Option<Vec<&'a Value>> {
        if let Value::Array(streams) = &stats_parsed["streams"] {
            let ret = streams
                .iter()
                .filter(|s| match &s["codec_type"] {
                    Value::String(codec_type) => codec_type == stream_type,
                    _ => false,
                })
                .collect();

            Some(ret)
        } else {
            None
        }
    }

    fn first_vid_u32(stats_parsed: &Value, field_name: &str) -> Option<u32> {
        Self::streams_of_type(stats_parsed, "video")?
            .iter()
            .find_map(|stream| match &stream[field_name] {
                Value::Number(v) => v.as_u64().and_then(|v| u32::try_from(v).ok()),
                _ => None,
            })
    }
}
