//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::encoder::EncoderPaths;
use crate::error::{MediaError, MediaResult};

/// One `-i` input with its preceding arguments.
#[derive(Debug, Clone)]
struct FfmpegInput {
    /// Arguments placed before this input's `-i`
    args: Vec<String>,
    /// File path or lavfi source description
    source: String,
}

/// Builder for FFmpeg commands.
///
/// Supports multiple inputs; arguments added with `input_arg` apply to the
/// most recently added input.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in order
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after all inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with a single file input.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![FfmpegInput {
                args: Vec::new(),
                source: input.as_ref().to_string_lossy().to_string(),
            }],
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Append another file input.
    pub fn add_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(FfmpegInput {
            args: Vec::new(),
            source: input.as_ref().to_string_lossy().to_string(),
        });
        self
    }

    /// Append a lavfi source input (e.g. a silent audio bed).
    pub fn add_lavfi_input(mut self, source: impl Into<String>) -> Self {
        self.inputs.push(FfmpegInput {
            args: vec!["-f".to_string(), "lavfi".to_string()],
            source: source.into(),
        });
        self
    }

    /// Add an argument before the most recent input's `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(input) = self.inputs.last_mut() {
            input.args.push(arg.into());
        }
        self
    }

    /// Add multiple arguments before the most recent input's `-i`.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(input) = self.inputs.last_mut() {
            input.args.extend(args.into_iter().map(Into::into));
        }
        self
    }

    /// Add an output argument (after all inputs).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Limit the most recent input to `seconds` of content.
    pub fn input_duration(self, seconds: f64) -> Self {
        self.input_arg("-t").input_arg(format!("{:.3}", seconds))
    }

    /// Loop the most recent input (still images).
    pub fn loop_input(self) -> Self {
        self.input_arg("-loop").input_arg("1")
    }

    /// Loop the most recent input indefinitely at the demuxer level
    /// (used to extend music under a longer video).
    pub fn stream_loop_input(self) -> Self {
        self.input_arg("-stream_loop").input_arg("-1")
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Select an output stream by mapping specifier.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Stop writing when the shortest stream ends.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Output path this command writes.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.clone());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with a bounded wall-clock timeout.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    encoder: EncoderPaths,
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    /// Create a runner over resolved encoder paths.
    pub fn new(encoder: EncoderPaths) -> Self {
        Self {
            encoder,
            timeout: None,
        }
    }

    /// Kill the encode if it runs longer than this.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The resolved encoder paths this runner uses.
    pub fn encoder(&self) -> &EncoderPaths {
        &self.encoder
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.encoder.ffmpeg.display(), args.join(" "));

        let mut child = Command::new(&self.encoder.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let output_future = async {
            let mut stderr_buf = Vec::new();
            if let Some(mut stderr) = child.stderr.take() {
                use tokio::io::AsyncReadExt;
                let _ = stderr.read_to_end(&mut stderr_buf).await;
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stderr_buf))
        };

        let (status, stderr_buf) = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, output_future).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        "FFmpeg timed out after {} seconds, killing process",
                        timeout.as_secs()
                    );
                    let _ = child.kill().await;
                    return Err(MediaError::Timeout(timeout.as_secs()));
                }
            },
            None => output_future.await?,
        };

        if status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&stderr_buf);
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(tail(&stderr, 2048)),
                status.code(),
            ))
        }
    }
}

/// Last `max` bytes of a string, on a char boundary.
fn tail(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_input_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .input_duration(1.0)
            .video_filter("fps=30")
            .output_args(["-c:v", "libx264"]);

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-t".to_string()));
        assert!(args.contains(&"1.000".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().unwrap(), "output.mp4");
    }

    #[test]
    fn test_input_args_attach_to_latest_input() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .input_duration(1.0)
            .add_lavfi_input("anullsrc=channel_layout=stereo:sample_rate=44100")
            .input_duration(1.0);

        let args = cmd.build_args();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        // Primary input carries its own -t before its -i.
        assert_eq!(&args[first_i - 2..first_i], ["-t", "1.000"]);
        // The lavfi input is declared with -f lavfi before its -i.
        let lavfi = args.iter().position(|a| a == "lavfi").unwrap();
        assert!(args[lavfi + 1..].contains(&"-t".to_string()));
    }

    #[test]
    fn test_stream_loop_and_maps() {
        let cmd = FfmpegCommand::new("list.txt", "out.mp4")
            .add_input("music.mp3")
            .stream_loop_input()
            .map("0:v:0")
            .map("1:a:0")
            .shortest();

        let args = cmd.build_args();
        let loop_pos = args.iter().position(|a| a == "-stream_loop").unwrap();
        let music_pos = args.iter().position(|a| a == "music.mp3").unwrap();
        assert!(loop_pos < music_pos);
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[test]
    fn test_tail_respects_char_boundary() {
        let s = "αβγδε";
        let t = tail(s, 3);
        assert!(s.ends_with(&t));
    }
}
