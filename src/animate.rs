//! # Animation Encoding
//!
//! Stitches an ordered list of frame images into a looping animated GIF.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default animation frame rate.
pub const DEFAULT_FPS: u32 = 5;

/// Errors that can occur while encoding an animation
#[derive(Error, Debug)]
pub enum AnimateError {
    #[error("no frames to animate")]
    NoFrames,

    #[error("invalid frame rate: {0} fps")]
    InvalidFrameRate(u32),

    #[error("failed to read frame {path}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encodes `frame_paths`, in order, into a GIF at `output` playing at `fps`.
///
/// # Arguments
///
/// * `frame_paths` - Frame image files, first frame first
/// * `output` - Destination `.gif` path; its parent directory must exist
/// * `fps` - Frames per second, must be positive
///
/// # Errors
///
/// Returns an error if the list is empty, `fps` is zero, a frame cannot be
/// decoded, or the output cannot be written.
pub fn animate_frames(frame_paths: &[PathBuf], output: &Path, fps: u32) -> Result<(), AnimateError> {
    if frame_paths.is_empty() {
        return Err(AnimateError::NoFrames);
    }
    if fps == 0 {
        return Err(AnimateError::InvalidFrameRate(fps));
    }

    let delay = Delay::from_numer_denom_ms(1000, fps);
    let mut frames = Vec::with_capacity(frame_paths.len());
    for path in frame_paths {
        debug!("Reading frame {}", path.display());
        let img = image::open(path)
            .map_err(|source| AnimateError::Frame {
                path: path.clone(),
                source,
            })?
            .into_rgba8();
        frames.push(Frame::from_parts(img, 0, 0, delay));
    }

    let writer = BufWriter::new(File::create(output)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames)?;

    info!(
        "Animation of {} frames saved as {}",
        frame_paths.len(),
        output.display()
    );
    Ok(())
}
