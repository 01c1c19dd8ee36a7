use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{anyhow, bail, Context as AnyhowContext, Result};

use crate::image::RgbImage;

/// Decodes a video file to raw RGB frames through an `ffmpeg` child process.
pub struct VideoInput {
    child: Child,
    child_stdout: ChildStdout,
    image: RgbImage,
}

impl VideoInput {
    /// `width` and `height` must match the decoded stream, they are not probed.
    pub fn new(path: &Path, width: usize, height: usize) -> Result<VideoInput> {
        if width == 0 || height == 0 {
            bail!("video dimensions must be positive, got {width} x {height}");
        }
        let path = path.to_str().ok_or(anyhow!("Failed to parse video path."))?;
        let mut child = Command::new("ffmpeg")
            .args([
                "-loglevel",
                "error",
                "-i",
                path,
                "-f",
                "rawvideo",
                "-vcodec",
                "rawvideo",
                "-vsync",
                "vfr",
                "-pix_fmt",
                "rgb24",
                "-",
            ])
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg.")?;
        let child_stdout = child
            .stdout
            .take()
            .ok_or(anyhow!("ffmpeg stdout was not captured."))?;
        Ok(VideoInput {
            child,
            child_stdout,
            image: RgbImage {
                data: vec![0; 3 * width * height],
                width,
                height,
            },
        })
    }

    /// Next frame, or `None` once the stream ends cleanly.
    pub fn read(&mut self) -> Result<Option<&RgbImage>> {
        let mut filled = 0;
        while filled < self.image.data.len() {
            match self.child_stdout.read(&mut self.image.data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err).context("Reading bytes from video input failed."),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < self.image.data.len() {
            bail!(
                "Truncated video frame: got {} of {} bytes.",
                filled,
                self.image.data.len()
            );
        }
        Ok(Some(&self.image))
    }
}

impl Drop for VideoInput {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_dimensions() {
        assert!(VideoInput::new(Path::new("missing.mp4"), 0, 480).is_err());
        assert!(VideoInput::new(Path::new("missing.mp4"), 640, 0).is_err());
    }
}
