//! Segment encoding profile.
//!
//! Every normalized segment must be encoded with bit-identical parameters:
//! the final assembly concatenates by stream copy, which only works when
//! codec, resolution, pixel format, frame rate and audio layout match
//! across all inputs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Segment video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Segment audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Constant Rate Factor (quality, 0-51, lower is better)
pub const DEFAULT_CRF: u8 = 18;
/// Audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Audio sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
/// Audio channel count
pub const DEFAULT_CHANNELS: u8 = 2;
/// Segment width in pixels
pub const SEGMENT_WIDTH: u32 = 1920;
/// Segment height in pixels
pub const SEGMENT_HEIGHT: u32 = 1080;
/// Segment frame rate
pub const SEGMENT_FPS: u32 = 30;
/// Segment pixel format
pub const SEGMENT_PIX_FMT: &str = "yuv420p";
/// Segment duration in seconds
pub const SEGMENT_SECONDS: f64 = 1.0;

/// The one encoding target every segment is normalized to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingProfile {
    /// Video codec (e.g. "libx264")
    pub codec: String,
    /// Encoding preset (e.g. "fast", "medium")
    pub preset: String,
    /// Constant Rate Factor
    pub crf: u8,
    /// Target width
    pub width: u32,
    /// Target height
    pub height: u32,
    /// Target frame rate
    pub fps: u32,
    /// Pixel format
    pub pix_fmt: String,
    /// Audio codec
    pub audio_codec: String,
    /// Audio bitrate
    pub audio_bitrate: String,
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Audio channel count
    pub channels: u8,
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            width: SEGMENT_WIDTH,
            height: SEGMENT_HEIGHT,
            fps: SEGMENT_FPS,
            pix_fmt: SEGMENT_PIX_FMT.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl EncodingProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale-and-letterbox filter producing the fixed output geometry:
    /// centered, black padding, square pixels, constant frame rate.
    pub fn letterbox_filter(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps},format={pix}",
            w = self.width,
            h = self.height,
            fps = self.fps,
            pix = self.pix_fmt,
        )
    }

    /// Video encoding arguments shared by both normalization paths.
    pub fn video_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
        ]
    }

    /// Audio encoding arguments shared by both normalization paths.
    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-ac".to_string(),
            self.channels.to_string(),
        ]
    }

    /// lavfi source description for a silent audio bed matching the profile.
    pub fn silence_source(&self) -> String {
        let layout = match self.channels {
            1 => "mono",
            _ => "stereo",
        };
        format!(
            "anullsrc=channel_layout={}:sample_rate={}",
            layout, self.sample_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = EncodingProfile::default();
        assert_eq!(profile.codec, "libx264");
        assert_eq!(profile.width, 1920);
        assert_eq!(profile.height, 1080);
        assert_eq!(profile.fps, 30);
    }

    #[test]
    fn test_letterbox_filter_geometry() {
        let filter = EncodingProfile::default().letterbox_filter();
        assert!(filter.contains("scale=1920:1080:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=1920:1080:(ow-iw)/2:(oh-ih)/2"));
        assert!(filter.contains("fps=30"));
        assert!(filter.contains("format=yuv420p"));
    }

    #[test]
    fn test_args_are_stable_across_calls() {
        // Both normalization paths must see identical parameters.
        let profile = EncodingProfile::default();
        assert_eq!(profile.video_args(), profile.video_args());
        assert_eq!(profile.audio_args(), profile.audio_args());
    }

    #[test]
    fn test_silence_source() {
        let src = EncodingProfile::default().silence_source();
        assert_eq!(src, "anullsrc=channel_layout=stereo:sample_rate=44100");
    }
}
