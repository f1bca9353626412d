//! # 调色板量化
//!
//! 每帧独立量化到至多 256 色，索引色是压缩 GIF 负载的主要手段。
//!
//! - 颜色数不超过上限的帧（典型像素画）直接使用精确调色板，颜色零损失。
//! - 颜色更丰富的大帧交给 NeuQuant 自适应调色板，采样因子随像素数收紧，
//!   保证网络至少能看到约 4096 个样本。
//! - 小帧或小调色板上 NeuQuant 的网络学不充分（可能塌缩成一两个颜色），
//!   改用中位切分：反复沿最宽通道在中位数处切开颜色盒，取盒内均值。
//! - 最后去掉未使用/重复的调色板项并重排索引，属于无损的体积优化。

use color_quant::NeuQuant;
use image::RgbaImage;
use std::collections::HashMap;

use super::config::MAX_PALETTE_COLORS;
use super::{MediaConfig, QuantizedFrame};

/// NeuQuant 期望的最少像素（也是采样后的最少样本数）。
const NEUQUANT_MIN_PIXELS: u64 = 64 * 64;

/// 调色板小于该值时 NeuQuant 收敛不稳定。
const NEUQUANT_MIN_COLORS: usize = 64;

/// 量化一帧不透明 RGBA 图像。
pub(crate) fn quantize_frame(image: &RgbaImage, duration_ms: u32, config: &MediaConfig) -> QuantizedFrame {
    let max_colors = config.max_palette_colors.clamp(2, MAX_PALETTE_COLORS);

    let (mut indexed_pixels, palette) = match exact_palette(image, max_colors) {
        Some(exact) => exact,
        None if use_neuquant(image, max_colors) => {
            neuquant_palette(image, max_colors, config.quantize_sample_factor)
        }
        None => median_cut_palette(image, max_colors),
    };
    let palette = compact_palette(&mut indexed_pixels, &palette);

    QuantizedFrame {
        width: image.width(),
        height: image.height(),
        indexed_pixels,
        palette,
        duration_ms,
    }
}

/// 颜色数不超过 `max_colors` 时返回精确调色板。
fn exact_palette(image: &RgbaImage, max_colors: usize) -> Option<(Vec<u8>, Vec<[u8; 3]>)> {
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indexed = Vec::with_capacity(image.as_raw().len() / 4);

    for pixel in image.pixels() {
        let rgb = [pixel.0[0], pixel.0[1], pixel.0[2]];
        let index = match lookup.get(&rgb) {
            Some(&index) => index,
            None => {
                if palette.len() >= max_colors {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push(rgb);
                lookup.insert(rgb, index);
                index
            }
        };
        indexed.push(index);
    }

    Some((indexed, palette))
}

fn use_neuquant(image: &RgbaImage, max_colors: usize) -> bool {
    pixel_count(image) > NEUQUANT_MIN_PIXELS && max_colors >= NEUQUANT_MIN_COLORS
}

fn pixel_count(image: &RgbaImage) -> u64 {
    u64::from(image.width()) * u64::from(image.height())
}

fn neuquant_palette(image: &RgbaImage, max_colors: usize, sample_factor: i32) -> (Vec<u8>, Vec<[u8; 3]>) {
    let max_factor = (pixel_count(image) / NEUQUANT_MIN_PIXELS).clamp(1, 30) as i32;
    let quantizer = NeuQuant::new(sample_factor.clamp(1, 30).min(max_factor), max_colors, image.as_raw());

    let palette: Vec<[u8; 3]> = quantizer
        .color_map_rgb()
        .chunks_exact(3)
        .take(max_colors)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    let last = palette.len().saturating_sub(1);
    let indexed = image
        .pixels()
        .map(|pixel| quantizer.index_of(&pixel.0).min(last) as u8)
        .collect();

    (indexed, palette)
}

/// 中位切分中的一个颜色盒。
struct ColorBox {
    colors: Vec<[u8; 3]>,
    range: [u8; 3],
}

impl ColorBox {
    fn new(colors: Vec<[u8; 3]>) -> Self {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        for color in &colors {
            for channel in 0..3 {
                min[channel] = min[channel].min(color[channel]);
                max[channel] = max[channel].max(color[channel]);
            }
        }
        let range = std::array::from_fn(|channel| max[channel].saturating_sub(min[channel]));
        Self { colors, range }
    }

    fn widest_range(&self) -> u8 {
        self.range.into_iter().max().unwrap_or(0)
    }

    /// 切分优先级：颜色多且跨度大的盒先切。
    fn priority(&self) -> usize {
        self.colors.len() * usize::from(self.widest_range())
    }

    /// 沿最宽通道在中位数处一分为二，两半均非空。
    fn split(mut self) -> (ColorBox, ColorBox) {
        let channel = (0..3).max_by_key(|&c| (self.range[c], std::cmp::Reverse(c))).unwrap_or(0);
        self.colors.sort_unstable_by_key(|color| color[channel]);
        let upper = self.colors.split_off(self.colors.len() / 2);
        (ColorBox::new(self.colors), ColorBox::new(upper))
    }

    fn average(&self) -> [u8; 3] {
        let count = self.colors.len().max(1) as u64;
        let mut sums = [0u64; 3];
        for color in &self.colors {
            for channel in 0..3 {
                sums[channel] += u64::from(color[channel]);
            }
        }
        std::array::from_fn(|channel| ((sums[channel] + count / 2) / count) as u8)
    }
}

fn median_cut_palette(image: &RgbaImage, max_colors: usize) -> (Vec<u8>, Vec<[u8; 3]>) {
    let colors: Vec<[u8; 3]> = image.pixels().map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let mut boxes = vec![ColorBox::new(colors)];

    while boxes.len() < max_colors {
        let best = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.colors.len() > 1 && b.widest_range() > 0)
            .max_by_key(|(_, b)| b.priority())
            .map(|(index, _)| index);

        let Some(best) = best else {
            break;
        };

        let (lower, upper) = boxes.swap_remove(best).split();
        boxes.push(lower);
        boxes.push(upper);
    }

    let palette: Vec<[u8; 3]> = boxes.iter().map(ColorBox::average).collect();

    let mut nearest: HashMap<[u8; 3], u8> = HashMap::new();
    let indexed = image
        .pixels()
        .map(|pixel| {
            let rgb = [pixel.0[0], pixel.0[1], pixel.0[2]];
            *nearest.entry(rgb).or_insert_with(|| closest_index(rgb, &palette))
        })
        .collect();

    (indexed, palette)
}

fn closest_index(rgb: [u8; 3], palette: &[[u8; 3]]) -> u8 {
    palette
        .iter()
        .enumerate()
        .min_by_key(|(_, candidate)| {
            (0..3)
                .map(|c| {
                    let diff = i32::from(rgb[c]) - i32::from(candidate[c]);
                    diff * diff
                })
                .sum::<i32>()
        })
        .map_or(0, |(index, _)| index as u8)
}

/// 合并重复颜色、移除未使用项，并原地重写索引。
fn compact_palette(indexed_pixels: &mut [u8], palette: &[[u8; 3]]) -> Vec<[u8; 3]> {
    let mut remap: Vec<Option<u8>> = vec![None; palette.len()];
    let mut by_color: HashMap<[u8; 3], u8> = HashMap::new();
    let mut compacted = Vec::new();

    for index in indexed_pixels.iter_mut() {
        let old = usize::from(*index);
        let new = match remap[old] {
            Some(new) => new,
            None => {
                let color = palette[old];
                let new = *by_color.entry(color).or_insert_with(|| {
                    compacted.push(color);
                    (compacted.len() - 1) as u8
                });
                remap[old] = Some(new);
                new
            }
        };
        *index = new;
    }

    if compacted.is_empty() {
        compacted.push([0, 0, 0]);
    }

    compacted
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    fn assert_valid(frame: &QuantizedFrame) {
        assert!(!frame.palette.is_empty());
        assert!(frame.palette.len() <= MAX_PALETTE_COLORS);
        assert_eq!(frame.indexed_pixels.len(), (frame.width * frame.height) as usize);
        assert!(frame.indexed_pixels.iter().all(|&i| usize::from(i) < frame.palette.len()));
    }

    #[test]
    fn few_colors_are_kept_exactly() {
        let image = RgbaImage::from_fn(4, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([250, 10, 10, 255])
            } else {
                Rgba([10, 10, 250, 255])
            }
        });

        let frame = quantize_frame(&image, 100, &MediaConfig::default());
        assert_valid(&frame);
        assert_eq!(frame.palette.len(), 2);
        assert_eq!(frame.duration_ms, 100);

        for (pixel, &index) in image.pixels().zip(&frame.indexed_pixels) {
            let color = frame.palette[usize::from(index)];
            assert_eq!(color, [pixel.0[0], pixel.0[1], pixel.0[2]]);
        }
    }

    #[test]
    fn rich_gradient_is_reduced_to_palette_limit() {
        let image = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255]));

        let frame = quantize_frame(&image, 50, &MediaConfig::default());
        assert_valid(&frame);
    }

    /// 量化结果与原图逐通道的平均绝对误差。
    fn mean_abs_error(image: &RgbaImage, frame: &QuantizedFrame) -> f64 {
        let total: u64 = image
            .pixels()
            .zip(&frame.indexed_pixels)
            .map(|(pixel, &index)| {
                let color = frame.palette[usize::from(index)];
                (0..3).map(|c| u64::from(pixel.0[c].abs_diff(color[c]))).sum::<u64>()
            })
            .sum();
        total as f64 / (u64::from(image.width() * image.height()) * 3) as f64
    }

    #[test]
    fn smaller_configured_palette_is_respected() {
        let image = RgbaImage::from_fn(32, 32, |x, y| Rgba([(x * 8) as u8, (y * 8) as u8, 0, 255]));

        for (colors, max_error) in [(2, 40.0), (8, 25.0), (16, 16.0)] {
            let mut config = MediaConfig::default();
            config.max_palette_colors = colors;

            let frame = quantize_frame(&image, 50, &config);
            assert_valid(&frame);
            assert!(frame.palette.len() > 1, "colors={colors}: palette collapsed");
            assert!(frame.palette.len() <= colors);

            let error = mean_abs_error(&image, &frame);
            assert!(error < max_error, "colors={colors}: mean error {error:.1}");
        }
    }

    #[test]
    fn median_cut_splits_two_clusters_apart() {
        let image = RgbaImage::from_fn(16, 16, |x, y| {
            let jitter = ((x + y) % 4) as u8;
            if x < 8 {
                Rgba([200 + jitter, 10, 10, 255])
            } else {
                Rgba([10, 10, 200 + jitter, 255])
            }
        });

        let (indexed, palette) = median_cut_palette(&image, 2);
        assert_eq!(palette.len(), 2);
        assert_ne!(indexed[0], indexed[15]);
        assert!(mean_abs_error(&image, &QuantizedFrame {
            width: 16,
            height: 16,
            indexed_pixels: indexed,
            palette,
            duration_ms: 0,
        }) < 2.0);
    }

    #[test]
    fn large_rich_frame_uses_adaptive_palette() {
        let image = RgbaImage::from_fn(128, 128, |x, y| Rgba([(x * 2) as u8, (y * 2) as u8, (x + y) as u8, 255]));
        assert!(use_neuquant(&image, MAX_PALETTE_COLORS));

        let frame = quantize_frame(&image, 50, &MediaConfig::default());
        assert_valid(&frame);
        assert!(frame.palette.len() > 16);
        assert!(mean_abs_error(&image, &frame) < 20.0);
    }

    #[test]
    fn compaction_merges_duplicates_and_drops_unused() {
        let palette = vec![[1, 1, 1], [2, 2, 2], [1, 1, 1], [3, 3, 3]];
        let mut indexed = vec![2, 0, 3, 3];

        let compacted = compact_palette(&mut indexed, &palette);
        assert_eq!(compacted, vec![[1, 1, 1], [3, 3, 3]]);
        assert_eq!(indexed, vec![0, 0, 1, 1]);
    }

    proptest! {
        #[test]
        fn indices_always_within_palette(pixels in proptest::collection::vec(any::<[u8; 3]>(), 1..600)) {
            let width = pixels.len() as u32;
            let image = RgbaImage::from_fn(width, 1, |x, _| {
                let [r, g, b] = pixels[x as usize];
                Rgba([r, g, b, 255])
            });

            let frame = quantize_frame(&image, 10, &MediaConfig::default());
            prop_assert!(frame.palette.len() <= MAX_PALETTE_COLORS);
            prop_assert!(frame.indexed_pixels.iter().all(|&i| usize::from(i) < frame.palette.len()));
        }
    }
}
