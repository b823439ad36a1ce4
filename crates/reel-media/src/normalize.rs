//! Media normalization.
//!
//! Converts one daily capture (video or photo) into a fixed 1-second,
//! 1920x1080, 30fps segment. Both paths apply the same
//! [`EncodingProfile`] so the final assembly can concatenate by stream
//! copy. Every segment leaves with an audio track: the source's when it
//! has one, a silent bed otherwise.

use std::path::Path;
use tracing::info;

use reel_models::encoding::SEGMENT_SECONDS;
use reel_models::{EncodingProfile, MediaKind};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_media;

/// Build the normalization command for a video capture.
///
/// Takes the first second of the source. When the source has no audio
/// stream, a silent bed is muxed in so the segment still carries one.
pub fn build_video_command(
    profile: &EncodingProfile,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    has_audio: bool,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(input, output).input_duration(SEGMENT_SECONDS);

    if !has_audio {
        cmd = cmd.add_lavfi_input(profile.silence_source());
    }

    cmd = cmd
        .video_filter(profile.letterbox_filter())
        .map("0:v:0")
        .map(if has_audio { "0:a:0" } else { "1:a:0" })
        .output_args(profile.video_args())
        .output_args(profile.audio_args());

    if !has_audio {
        cmd = cmd.shortest();
    }

    cmd
}

/// Build the normalization command for a photo capture.
///
/// Loops the still for exactly one second over a silent audio bed.
pub fn build_image_command(
    profile: &EncodingProfile,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .loop_input()
        .add_lavfi_input(profile.silence_source())
        .video_filter(profile.letterbox_filter())
        .map("0:v:0")
        .map("1:a:0")
        .output_args(profile.video_args())
        .output_args(profile.audio_args())
        .output_arg("-t")
        .output_arg(format!("{:.3}", SEGMENT_SECONDS))
}

/// Normalize one downloaded capture into a segment at `output`.
pub async fn normalize_item(
    runner: &FfmpegRunner,
    profile: &EncodingProfile,
    kind: MediaKind,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let cmd = match kind {
        MediaKind::Video => {
            let info = probe_media(runner.encoder(), input).await?;
            build_video_command(profile, input, output, info.has_audio)
        }
        MediaKind::Image => build_image_command(profile, input, output),
    };

    runner.run(&cmd).await?;

    info!(
        "Normalized {} ({}) -> {}",
        input.display(),
        kind,
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> EncodingProfile {
        EncodingProfile::default()
    }

    #[test]
    fn test_video_command_with_audio_keeps_source_track() {
        let cmd = build_video_command(&profile(), "in.mp4", "out.mp4", true);
        let args = cmd.build_args();

        assert!(args.contains(&"0:a:0".to_string()));
        assert!(!args.contains(&"lavfi".to_string()));
        assert!(!args.contains(&"-shortest".to_string()));
        // first second only
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "1.000");
    }

    #[test]
    fn test_video_command_without_audio_muxes_silence() {
        let cmd = build_video_command(&profile(), "in.webm", "out.mp4", false);
        let args = cmd.build_args();

        assert!(args.contains(&"lavfi".to_string()));
        assert!(args.contains(&"1:a:0".to_string()));
        assert!(args.contains(&"-shortest".to_string()));
        assert!(args
            .iter()
            .any(|a| a.starts_with("anullsrc=channel_layout=stereo")));
    }

    #[test]
    fn test_image_command_loops_for_one_second() {
        let cmd = build_image_command(&profile(), "in.jpg", "out.mp4");
        let args = cmd.build_args();

        assert!(args.contains(&"-loop".to_string()));
        assert!(args.contains(&"lavfi".to_string()));
        assert!(args.contains(&"1:a:0".to_string()));
        // output-side duration clamp
        let last_t = args.iter().rposition(|a| a == "-t").unwrap();
        assert_eq!(args[last_t + 1], "1.000");
    }

    #[test]
    fn test_both_paths_share_encode_parameters() {
        // The lossless-concat invariant: identical codec parameters on
        // every segment regardless of source kind.
        let video = build_video_command(&profile(), "a.mp4", "a.seg.mp4", true).build_args();
        let image = build_image_command(&profile(), "b.jpg", "b.seg.mp4").build_args();

        for flag in ["-c:v", "-preset", "-crf", "-c:a", "-b:a", "-ar", "-ac", "-vf"] {
            let v = video.iter().position(|a| a == flag).unwrap();
            let i = image.iter().position(|a| a == flag).unwrap();
            assert_eq!(video[v + 1], image[i + 1], "mismatch on {}", flag);
        }
    }
}
