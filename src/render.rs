//! # Frame Rendering
//!
//! Rasterises meshes into plate carrée map frames. Scalar frames colour each
//! grid cell with the `Spectral_r` colour map; vector frames colour the vector
//! magnitude and overlay (u, v) arrows. Every frame carries a horizontal colour
//! bar along its bottom edge.

use crate::catalog::{Mesh, finite_range};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use log::debug;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);
const MISSING: Rgb<u8> = Rgb([190, 190, 190]);
const MARGIN: u32 = 10;

/// Errors that can occur while rendering or saving a frame
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("component meshes differ in shape: {0:?} vs {1:?}")]
    ComponentShapeMismatch((usize, usize), (usize, usize)),

    #[error("cannot render an empty mesh")]
    EmptyMesh,

    #[error("frame too small: {0}x{1}")]
    FrameTooSmall(u32, u32),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Frame geometry options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels, colour bar included
    pub height: u32,
    /// Height of the colour bar strip
    pub colorbar_height: u32,
    /// Pixel spacing between quiver arrows in vector frames
    pub arrow_stride: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            colorbar_height: 40,
            arrow_stride: 24,
        }
    }
}

/// Piecewise-linear colour map over `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Colormap {
    stops: Vec<Rgb<u8>>,
}

impl Colormap {
    /// ColorBrewer "Spectral", reversed: purple-blue for low values, dark red for high.
    pub fn spectral_r() -> Self {
        let mut stops = vec![
            Rgb([158, 1, 66]),
            Rgb([213, 62, 79]),
            Rgb([244, 109, 67]),
            Rgb([253, 174, 97]),
            Rgb([254, 224, 139]),
            Rgb([255, 255, 191]),
            Rgb([230, 245, 152]),
            Rgb([171, 221, 164]),
            Rgb([102, 194, 165]),
            Rgb([50, 136, 189]),
            Rgb([94, 79, 162]),
        ];
        stops.reverse();
        Colormap { stops }
    }

    /// Colour at normalised position `t`; values outside `[0, 1]` are clamped.
    pub fn sample(&self, t: f32) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (self.stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(self.stops.len() - 1);
        let upper = (lower + 1).min(self.stops.len() - 1);
        interpolate_color(self.stops[lower], self.stops[upper], scaled - lower as f32)
    }
}

fn interpolate_color(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 * (1.0 - t) + y as f32 * t).round() as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}

/// Pixel rectangle occupied by the map inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapArea {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Renders meshes into RGB frames.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    options: RenderOptions,
    colormap: Colormap,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl FrameRenderer {
    pub fn new(options: RenderOptions) -> Self {
        FrameRenderer {
            options,
            colormap: Colormap::spectral_r(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders a scalar field as a colour mesh.
    pub fn render_scalar(&self, mesh: &Mesh) -> RenderResult<RgbImage> {
        if mesh.is_empty() {
            return Err(RenderError::EmptyMesh);
        }
        let (mut img, area) = self.blank_frame(mesh.shape())?;
        let range = mesh.value_range().unwrap_or((0.0, 0.0));
        self.paint_field(&mut img, area, &mesh.field, range);
        self.paint_colorbar(&mut img);
        Ok(img)
    }

    /// Renders a three-component vector field: the colour mesh shows the
    /// magnitude `sqrt(u² + v² + w²)` and arrows show the horizontal (u, v) flow.
    pub fn render_vector(&self, u: &Mesh, v: &Mesh, w: &Mesh) -> RenderResult<RgbImage> {
        if u.is_empty() {
            return Err(RenderError::EmptyMesh);
        }
        for other in [v, w] {
            if other.shape() != u.shape() {
                return Err(RenderError::ComponentShapeMismatch(u.shape(), other.shape()));
            }
        }

        let mut magnitude = Array2::<f32>::zeros(u.shape());
        Zip::from(&mut magnitude)
            .and(&u.field)
            .and(&v.field)
            .and(&w.field)
            .for_each(|m, &a, &b, &c| *m = (a * a + b * b + c * c).sqrt());

        let (mut img, area) = self.blank_frame(u.shape())?;
        let range = finite_range(&magnitude).unwrap_or((0.0, 0.0));
        self.paint_field(&mut img, area, &magnitude, range);
        self.paint_arrows(&mut img, area, &u.field, &v.field);
        self.paint_colorbar(&mut img);
        Ok(img)
    }

    /// Writes `img` to `<dir>/<time_step>.png` and returns the path.
    pub fn save_frame(&self, img: &RgbImage, dir: &Path, time_step: usize) -> RenderResult<PathBuf> {
        let path = frame_path(dir, time_step);
        img.save(&path)?;
        debug!("Saved frame {}", path.display());
        Ok(path)
    }

    fn blank_frame(&self, (n_rows, n_cols): (usize, usize)) -> RenderResult<(RgbImage, MapArea)> {
        let RenderOptions {
            width,
            height,
            colorbar_height,
            ..
        } = self.options;

        let avail_w = width.saturating_sub(2 * MARGIN);
        let avail_h = height.saturating_sub(colorbar_height.saturating_add(3 * MARGIN));
        if avail_w == 0 || avail_h == 0 {
            return Err(RenderError::FrameTooSmall(width, height));
        }

        // plate carrée: one grid cell is square on screen
        let scale = (avail_w as f64 / n_cols as f64).min(avail_h as f64 / n_rows as f64);
        let map_w = ((n_cols as f64 * scale).round() as u32).clamp(1, avail_w);
        let map_h = ((n_rows as f64 * scale).round() as u32).clamp(1, avail_h);
        let area = MapArea {
            x: MARGIN + (avail_w - map_w) / 2,
            y: MARGIN + (avail_h - map_h) / 2,
            width: map_w,
            height: map_h,
        };

        Ok((RgbImage::from_pixel(width, height, BACKGROUND), area))
    }

    fn paint_field(&self, img: &mut RgbImage, area: MapArea, field: &Array2<f32>, (lo, hi): (f32, f32)) {
        let (n_rows, n_cols) = field.dim();
        let span = if (hi - lo).abs() < f32::EPSILON { 1.0 } else { hi - lo };

        for py in 0..area.height {
            let row = (py as usize * n_rows / area.height as usize).min(n_rows - 1);
            for px in 0..area.width {
                let col = (px as usize * n_cols / area.width as usize).min(n_cols - 1);
                let value = field[[row, col]];
                let color = if value.is_finite() {
                    self.colormap.sample((value - lo) / span)
                } else {
                    MISSING
                };
                img.put_pixel(area.x + px, area.y + py, color);
            }
        }

        draw_hollow_rect_mut(
            img,
            Rect::at(area.x as i32, area.y as i32).of_size(area.width, area.height),
            OUTLINE,
        );
    }

    fn paint_arrows(&self, img: &mut RgbImage, area: MapArea, u: &Array2<f32>, v: &Array2<f32>) {
        let (n_rows, n_cols) = u.dim();
        let stride = self.options.arrow_stride.max(4);

        let max_speed = Zip::from(u)
            .and(v)
            .fold(0.0f32, |acc, &a, &b| {
                let s = (a * a + b * b).sqrt();
                if s.is_finite() { acc.max(s) } else { acc }
            });
        if max_speed <= 0.0 {
            return;
        }
        let max_len = stride as f32 * 0.9;

        let mut py = stride / 2;
        while py < area.height {
            let row = (py as usize * n_rows / area.height as usize).min(n_rows - 1);
            let mut px = stride / 2;
            while px < area.width {
                let col = (px as usize * n_cols / area.width as usize).min(n_cols - 1);
                let (du, dv) = (u[[row, col]], v[[row, col]]);
                if du.is_finite() && dv.is_finite() {
                    let x0 = (area.x + px) as f32;
                    let y0 = (area.y + py) as f32;
                    // screen y grows southwards
                    let dx = du / max_speed * max_len;
                    let dy = -dv / max_speed * max_len;
                    draw_arrow(img, (x0 - dx / 2.0, y0 - dy / 2.0), (x0 + dx / 2.0, y0 + dy / 2.0));
                }
                px += stride;
            }
            py += stride;
        }
    }

    fn paint_colorbar(&self, img: &mut RgbImage) {
        let RenderOptions {
            width,
            height,
            colorbar_height,
            ..
        } = self.options;
        if colorbar_height == 0 {
            return;
        }

        let bar_w = (u64::from(width) * 8 / 10) as u32;
        let bar_x = (width - bar_w) / 2;
        let bar_y = height.saturating_sub(MARGIN).saturating_sub(colorbar_height);
        for px in 0..bar_w {
            let color = self.colormap.sample(px as f32 / (bar_w.max(2) - 1) as f32);
            draw_filled_rect_mut(
                img,
                Rect::at((bar_x + px) as i32, bar_y as i32).of_size(1, colorbar_height),
                color,
            );
        }
        draw_hollow_rect_mut(
            img,
            Rect::at(bar_x as i32, bar_y as i32).of_size(bar_w, colorbar_height),
            OUTLINE,
        );
    }
}

fn draw_arrow(img: &mut RgbImage, start: (f32, f32), end: (f32, f32)) {
    draw_line_segment_mut(img, start, end, OUTLINE);

    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 2.0 {
        return;
    }
    let head = (len * 0.3).min(6.0);
    let (ux, uy) = (dx / len, dy / len);
    for side in [-1.0f32, 1.0] {
        // 30° either side of the shaft
        let hx = -ux * 0.866 - side * uy * 0.5;
        let hy = -uy * 0.866 + side * ux * 0.5;
        draw_line_segment_mut(img, end, (end.0 + hx * head, end.1 + hy * head), OUTLINE);
    }
}

/// Path of the frame for `time_step` inside `dir`.
pub fn frame_path(dir: &Path, time_step: usize) -> PathBuf {
    dir.join(format!("{}.png", time_step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    fn mesh(field: Array2<f32>) -> Mesh {
        let (rows, cols) = field.dim();
        Mesh {
            latitude: Array1::linspace(10.0, 0.0, rows),
            longitude: Array1::linspace(0.0, 10.0, cols),
            field,
        }
    }

    #[test]
    fn test_colormap_endpoints() {
        let cmap = Colormap::spectral_r();
        assert_eq!(cmap.sample(0.0), Rgb([94, 79, 162]));
        assert_eq!(cmap.sample(1.0), Rgb([158, 1, 66]));
        assert_eq!(cmap.sample(0.5), Rgb([255, 255, 191]));
        // clamped
        assert_eq!(cmap.sample(-3.0), cmap.sample(0.0));
        assert_eq!(cmap.sample(7.0), cmap.sample(1.0));
    }

    #[test]
    fn test_scalar_frame_dimensions() {
        let renderer = FrameRenderer::new(RenderOptions {
            width: 200,
            height: 120,
            colorbar_height: 10,
            arrow_stride: 8,
        });
        let img = renderer.render_scalar(&mesh(array![[1.0, 2.0], [3.0, f32::NAN]])).unwrap();
        assert_eq!(img.dimensions(), (200, 120));
    }

    #[test]
    fn test_scalar_frame_colors_extremes() {
        let renderer = FrameRenderer::new(RenderOptions {
            width: 120,
            height: 100,
            colorbar_height: 0,
            arrow_stride: 8,
        });
        let img = renderer.render_scalar(&mesh(array![[0.0, 1.0]])).unwrap();
        let cmap = Colormap::spectral_r();

        // map area is 100x50 centred in the 100x70 available space
        assert_eq!(*img.get_pixel(30, 45), cmap.sample(0.0));
        assert_eq!(*img.get_pixel(90, 45), cmap.sample(1.0));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let renderer = FrameRenderer::default();
        let empty = mesh(Array2::zeros((0, 3)));
        assert!(matches!(renderer.render_scalar(&empty), Err(RenderError::EmptyMesh)));
    }

    #[test]
    fn test_vector_component_shapes_must_match() {
        let renderer = FrameRenderer::default();
        let u = mesh(Array2::ones((4, 4)));
        let v = mesh(Array2::ones((4, 4)));
        let w = mesh(Array2::ones((3, 4)));
        assert!(matches!(
            renderer.render_vector(&u, &v, &w),
            Err(RenderError::ComponentShapeMismatch(_, _))
        ));
    }

    #[test]
    fn test_vector_frame_renders() {
        let renderer = FrameRenderer::new(RenderOptions {
            width: 160,
            height: 120,
            colorbar_height: 10,
            arrow_stride: 16,
        });
        let u = mesh(Array2::from_elem((8, 8), 3.0));
        let v = mesh(Array2::from_elem((8, 8), 4.0));
        let w = mesh(Array2::zeros((8, 8)));
        let img = renderer.render_vector(&u, &v, &w).unwrap();
        assert_eq!(img.dimensions(), (160, 120));
        assert!(img.pixels().any(|p| *p == OUTLINE));
    }

    #[test]
    fn test_frame_too_small() {
        let renderer = FrameRenderer::new(RenderOptions {
            width: 10,
            height: 10,
            colorbar_height: 40,
            arrow_stride: 8,
        });
        assert!(matches!(
            renderer.render_scalar(&mesh(array![[1.0]])),
            Err(RenderError::FrameTooSmall(10, 10))
        ));
    }

    #[test]
    fn test_oversized_colorbar_is_too_small_not_overflow() {
        let renderer = FrameRenderer::new(RenderOptions {
            width: 200,
            height: 100,
            colorbar_height: u32::MAX,
            arrow_stride: 8,
        });
        assert!(matches!(
            renderer.render_scalar(&mesh(array![[1.0]])),
            Err(RenderError::FrameTooSmall(200, 100))
        ));
    }

    #[test]
    fn test_frame_path() {
        assert_eq!(frame_path(Path::new("out/frames"), 7), PathBuf::from("out/frames/7.png"));
    }
}
