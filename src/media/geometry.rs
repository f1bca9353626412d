//! # 几何规划
//!
//! 静态图与动图帧共用同一套“源裁剪窗口 + 缩放目标 + 居中偏移”计算，
//! 两个适配器只在重采样滤镜与颜色模型上不同。
//!
//! ## 实现思路
//!
//! - `Fill` 不先把整张源图放大再裁剪：裁剪偏移先在缩放坐标系中按
//!   `floor((scaled_dim - size) * anchor)` 求出，再换算回源图坐标，
//!   重采样器只读取这个窗口并直接输出 `size x size`。
//!   因此任何阶段的中间缓冲都不会超过画布大小，细长源图不会放大出巨型缓冲。
//! - 缩放尺寸用 64 位整数求出，保证被约束的那条边恰好等于画布尺寸，
//!   不受浮点误差影响（例如 300 * (64 / 300) 不会落到 63）。

use super::{CanvasSpec, ResizeMode};

/// 源图坐标系中的裁剪窗口，允许小数，交给重采样器做亚像素定位。
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SourceWindow {
    pub(crate) left: f64,
    pub(crate) top: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl SourceWindow {
    /// 取整为像素矩形（回退路径使用），保证落在 `image_width x image_height` 内且非空。
    pub(crate) fn pixel_rect(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let left = (self.left.max(0.0).floor() as u32).min(image_width.saturating_sub(1));
        let top = (self.top.max(0.0).floor() as u32).min(image_height.saturating_sub(1));
        let width = (self.width.round().max(1.0) as u32).min(image_width - left);
        let height = (self.height.round().max(1.0) as u32).min(image_height - top);
        (left, top, width, height)
    }
}

/// 一次几何映射的完整方案。
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    /// `Fill` 模式下只读取的源图窗口；其余模式读取整张源图。
    pub(crate) source_window: Option<SourceWindow>,
    /// 重采样输出宽度，恒不超过画布尺寸。
    pub(crate) target_width: u32,
    /// 重采样输出高度，恒不超过画布尺寸。
    pub(crate) target_height: u32,
    /// 结果在画布上的粘贴位置（`Fit` 模式居中留黑边）。
    pub(crate) paste_offset: (u32, u32),
}

impl Placement {
    /// 计算源尺寸 `src_width x src_height` 映射到画布的方案。
    pub(crate) fn plan(src_width: u32, src_height: u32, spec: &CanvasSpec) -> Self {
        let canvas = spec.size();
        let src_width = src_width.max(1);
        let src_height = src_height.max(1);

        match spec.mode() {
            ResizeMode::Fill => Self {
                source_window: Some(fill_window(src_width, src_height, spec)),
                target_width: canvas,
                target_height: canvas,
                paste_offset: (0, 0),
            },
            ResizeMode::Fit => {
                // 长边对齐画布，短边按比例缩小，不裁剪。
                let (target_width, target_height) = if src_width >= src_height {
                    (canvas, scale_dim(src_height, canvas, src_width).clamp(1, u64::from(canvas)) as u32)
                } else {
                    (scale_dim(src_width, canvas, src_height).clamp(1, u64::from(canvas)) as u32, canvas)
                };

                Self {
                    source_window: None,
                    target_width,
                    target_height,
                    paste_offset: ((canvas - target_width) / 2, (canvas - target_height) / 2),
                }
            }
            ResizeMode::Stretch => Self {
                source_window: None,
                target_width: canvas,
                target_height: canvas,
                paste_offset: (0, 0),
            },
        }
    }
}

/// `Fill`：短边对齐画布后，按锚点选出的正方形窗口（源图坐标）。
fn fill_window(src_width: u32, src_height: u32, spec: &CanvasSpec) -> SourceWindow {
    let canvas = spec.size();
    let short = src_width.min(src_height);
    let long = src_width.max(src_height);

    let scaled_long = scale_dim(long, canvas, short).max(u64::from(canvas));
    let slack = scaled_long - u64::from(canvas);

    let anchor = spec.crop_anchor();
    let along = if src_width > src_height { anchor.x() } else { anchor.y() };
    let offset = anchor_offset(slack, along) as f64 * f64::from(short) / f64::from(canvas);

    let side = f64::from(short);
    let (left, top) = if src_width > src_height { (offset, 0.0) } else { (0.0, offset) };

    SourceWindow {
        left,
        top,
        width: side,
        height: side,
    }
}

/// `floor(dim * numer / denom)`，以 64 位整数计算。
fn scale_dim(dim: u32, numer: u32, denom: u32) -> u64 {
    u64::from(dim) * u64::from(numer) / u64::from(denom.max(1))
}

/// `floor(slack * anchor)`，不超过 `slack`。
fn anchor_offset(slack: u64, anchor: f32) -> u64 {
    let offset = (slack as f64 * f64::from(anchor)).floor();
    (offset.max(0.0) as u64).min(slack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{CanvasSpec, CropAnchor, ResizeMode};
    use proptest::prelude::*;

    fn spec(mode: ResizeMode, x: f32, y: f32, size: u32) -> CanvasSpec {
        CanvasSpec::new(size, mode, CropAnchor::clamped(x, y)).expect("valid spec")
    }

    fn window(placement: &Placement) -> SourceWindow {
        placement.source_window.expect("fill has a source window")
    }

    #[test]
    fn fill_landscape_crops_centered_window_in_source_space() {
        // 缩放后 85x64，裁剪偏移 floor(21 * 0.5) = 10，换回源图为 10 * 300 / 64。
        let placement = Placement::plan(400, 300, &spec(ResizeMode::Fill, 0.5, 0.5, 64));
        assert_eq!((placement.target_width, placement.target_height), (64, 64));
        assert_eq!(
            window(&placement),
            SourceWindow {
                left: 46.875,
                top: 0.0,
                width: 300.0,
                height: 300.0
            }
        );
    }

    #[test]
    fn fill_anchor_edges_touch_image_edges() {
        let start = Placement::plan(100, 400, &spec(ResizeMode::Fill, 0.0, 0.0, 32));
        assert_eq!(window(&start).top, 0.0);

        let end = window(&Placement::plan(100, 400, &spec(ResizeMode::Fill, 1.0, 1.0, 32)));
        assert_eq!((end.left, end.width, end.height), (0.0, 100.0, 100.0));
        assert_eq!(end.top + end.height, 400.0);
    }

    #[test]
    fn fill_square_source_has_no_slack() {
        let placement = Placement::plan(300, 300, &spec(ResizeMode::Fill, 1.0, 1.0, 64));
        let window = window(&placement);
        assert_eq!((window.left, window.top, window.width), (0.0, 0.0, 300.0));
    }

    #[test]
    fn fill_thin_source_never_plans_an_oversized_buffer() {
        // 40M x 1 若先整体放大会得到 2_560_000_000 x 64 的中间缓冲。
        let placement = Placement::plan(40_000_000, 1, &spec(ResizeMode::Fill, 0.5, 0.5, 64));
        assert_eq!((placement.target_width, placement.target_height), (64, 64));

        let window = window(&placement);
        assert_eq!((window.width, window.height), (1.0, 1.0));
        assert!(window.left + window.width <= 40_000_000.0);
    }

    #[test]
    fn fit_letterboxes_symmetrically() {
        let placement = Placement::plan(400, 200, &spec(ResizeMode::Fit, 0.0, 0.0, 64));
        assert_eq!((placement.target_width, placement.target_height), (64, 32));
        assert_eq!(placement.paste_offset, (0, 16));
        assert_eq!(placement.source_window, None);

        let portrait = Placement::plan(10, 40, &spec(ResizeMode::Fit, 0.0, 0.0, 16));
        assert_eq!((portrait.target_width, portrait.target_height), (4, 16));
        assert_eq!(portrait.paste_offset, (6, 0));
    }

    #[test]
    fn fit_extreme_aspect_keeps_one_pixel() {
        let placement = Placement::plan(10_000, 1, &spec(ResizeMode::Fit, 0.5, 0.5, 16));
        assert_eq!((placement.target_width, placement.target_height), (16, 1));
    }

    #[test]
    fn stretch_ignores_aspect_and_anchor() {
        let placement = Placement::plan(7, 300, &spec(ResizeMode::Stretch, 1.0, 0.0, 16));
        assert_eq!((placement.target_width, placement.target_height), (16, 16));
        assert_eq!(placement.source_window, None);
        assert_eq!(placement.paste_offset, (0, 0));
    }

    #[test]
    fn pixel_rect_stays_inside_image() {
        let window = SourceWindow {
            left: 46.875,
            top: 0.0,
            width: 300.0,
            height: 300.0,
        };
        assert_eq!(window.pixel_rect(400, 300), (46, 0, 300, 300));

        let edge = SourceWindow {
            left: 399.6,
            top: 0.0,
            width: 1.0,
            height: 1.0,
        };
        assert_eq!(edge.pixel_rect(400, 1), (399, 0, 1, 1));
    }

    proptest! {
        #[test]
        fn targets_and_windows_are_bounded(
            src_width in 1u32..200_000,
            src_height in 1u32..200_000,
            size in 1u32..256,
            x in 0.0f32..=1.0,
            y in 0.0f32..=1.0,
        ) {
            for mode in [ResizeMode::Fit, ResizeMode::Fill, ResizeMode::Stretch] {
                let placement = Placement::plan(src_width, src_height, &spec(mode, x, y, size));
                prop_assert!(placement.target_width >= 1 && placement.target_width <= size);
                prop_assert!(placement.target_height >= 1 && placement.target_height <= size);
                prop_assert!(placement.paste_offset.0 + placement.target_width <= size);
                prop_assert!(placement.paste_offset.1 + placement.target_height <= size);

                if let Some(window) = placement.source_window {
                    prop_assert!(window.left >= 0.0 && window.top >= 0.0);
                    prop_assert!(window.left + window.width <= f64::from(src_width) + 1e-6);
                    prop_assert!(window.top + window.height <= f64::from(src_height) + 1e-6);
                }
            }
        }
    }
}
