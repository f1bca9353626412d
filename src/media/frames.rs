//! # 动图帧适配器
//!
//! 与静态图相同的三种几何模式，但：
//! - 使用最近邻缩放，缩小后的像素画保持锐利的点阵边缘；
//! - 帧可能带透明区域，统一合成到不透明黑底上，而不是直接丢弃 alpha；
//! - 几何适配后逐帧独立量化为索引色。

use image::{Rgba, RgbaImage};

use super::geometry::Placement;
use super::quantize::quantize_frame;
use super::resample::resize_rgba_nearest;
use super::{AnimationFrame, CanvasSpec, MediaConfig, QuantizedFrame};

const OPAQUE_BLACK: Rgba<u8> = Rgba([0, 0, 0, u8::MAX]);

/// 几何适配并量化全部帧。
pub(crate) fn adapt_frames(
    frames: Vec<AnimationFrame>,
    spec: &CanvasSpec,
    config: &MediaConfig,
) -> Vec<QuantizedFrame> {
    frames
        .into_iter()
        .map(|frame| {
            let duration_ms = frame.duration_ms;
            let composed = fit_frame_to_canvas(frame.frame.into_rgba_image(), spec);
            quantize_frame(&composed, duration_ms, config)
        })
        .collect()
}

/// 单帧几何适配，输出 `size x size` 的不透明 RGBA。
pub(crate) fn fit_frame_to_canvas(image: RgbaImage, spec: &CanvasSpec) -> RgbaImage {
    let size = spec.size();
    let placement = Placement::plan(image.width(), image.height(), spec);
    let content = resize_rgba_nearest(
        image,
        placement.source_window,
        placement.target_width,
        placement.target_height,
    );

    let mut background = RgbaImage::from_pixel(size, size, OPAQUE_BLACK);
    let (x, y) = placement.paste_offset;
    image::imageops::overlay(&mut background, &content, i64::from(x), i64::from(y));
    background
}
