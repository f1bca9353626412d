//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `MediaConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中性能档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//! 档位只调整 NeuQuant 采样因子；静态图始终使用 Lanczos3，输出画质不随档位变化。
//!
//! 设备硬件限制（帧数、总时长）不属于可调策略，见 `budget::ANIMATION_BUDGET`。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `MediaPerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为具体参数。
//! - `MediaAdvancedConfig` 可从 JSON 读取，应用前逐项校验范围。

use image::imageops::FilterType;

use super::MediaError;

/// 源帧时长为 0 或缺失时使用的默认帧时长（毫秒）。
pub const DEFAULT_FRAME_DURATION_MS: u32 = 200;

/// 调色板颜色数上限（GIF 索引为单字节）。
pub const MAX_PALETTE_COLORS: usize = 256;

/// 媒体适配配置。
///
/// 字段覆盖了加载、解码、重采样与量化四个阶段。
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// 加载原始字节时允许的最大体积（字节）。
    pub max_input_bytes: u64,
    /// 单张图片/单帧解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    ///
    /// 动图按所有帧累计。
    pub max_decoded_bytes: u64,
    /// 静态图片重采样滤镜。
    pub still_filter: FilterType,
    /// NeuQuant 采样因子（1 最精细，30 最快）。
    pub quantize_sample_factor: i32,
    /// 每帧调色板最大颜色数。
    pub max_palette_colors: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            still_filter: FilterType::Lanczos3,
            quantize_sample_factor: 10,
            max_palette_colors: MAX_PALETTE_COLORS,
        }
    }
}

/// 媒体性能档位（面向产品/用户语义）。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先处理速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl MediaPerformanceProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use dotmatrix_media::media::MediaPerformanceProfile;
    ///
    /// let p = MediaPerformanceProfile::from_str("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), dotmatrix_media::media::MediaError>(())
    /// ```
    pub fn from_str(profile: &str) -> Result<Self, MediaError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(MediaError::InvalidParameter(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl MediaConfig {
    /// 基于当前参数反推性能档位。
    pub(crate) fn infer_performance_profile(&self) -> MediaPerformanceProfile {
        if self.quantize_sample_factor <= 1 {
            return MediaPerformanceProfile::Quality;
        }

        if self.quantize_sample_factor >= 30 {
            return MediaPerformanceProfile::Speed;
        }

        MediaPerformanceProfile::Balanced
    }

    /// 应用指定性能档位到实际参数。
    pub(crate) fn apply_performance_profile(&mut self, profile: MediaPerformanceProfile) {
        match profile {
            MediaPerformanceProfile::Quality => self.quantize_sample_factor = 1,
            MediaPerformanceProfile::Balanced => self.quantize_sample_factor = 10,
            MediaPerformanceProfile::Speed => self.quantize_sample_factor = 30,
        }
        self.still_filter = FilterType::Lanczos3;
    }
}

/// 高级配置（数值限制），可从 JSON 读取。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MediaAdvancedConfig {
    pub max_input_bytes: u64,
    pub max_decoded_pixels: u64,
    pub max_decoded_bytes: u64,
    pub max_palette_colors: usize,
}

impl MediaAdvancedConfig {
    /// 从 JSON 文本解析。
    pub fn from_json_str(json: &str) -> Result<Self, MediaError> {
        serde_json::from_str(json)
            .map_err(|e| MediaError::InvalidParameter(format!("解析高级配置失败：{}", e)))
    }

    pub(crate) fn from_config(config: &MediaConfig) -> Self {
        Self {
            max_input_bytes: config.max_input_bytes,
            max_decoded_pixels: config.max_decoded_pixels,
            max_decoded_bytes: config.max_decoded_bytes,
            max_palette_colors: config.max_palette_colors,
        }
    }

    /// 校验取值范围。
    pub(crate) fn validate(&self) -> Result<(), MediaError> {
        if self.max_input_bytes < 1024 {
            return Err(MediaError::InvalidParameter("max_input_bytes 不能小于 1KB".to_string()));
        }
        if self.max_decoded_pixels < 64 * 64 {
            return Err(MediaError::InvalidParameter(
                "max_decoded_pixels 不能小于 4096".to_string(),
            ));
        }
        if self.max_decoded_bytes < 1024 * 1024 {
            return Err(MediaError::InvalidParameter(
                "max_decoded_bytes 不能小于 1MB".to_string(),
            ));
        }
        if !(2..=MAX_PALETTE_COLORS).contains(&self.max_palette_colors) {
            return Err(MediaError::InvalidParameter(format!(
                "max_palette_colors 必须在 2~{} 之间",
                MAX_PALETTE_COLORS
            )));
        }
        Ok(())
    }

    pub(crate) fn apply_to(&self, config: &mut MediaConfig) {
        config.max_input_bytes = self.max_input_bytes;
        config.max_decoded_pixels = self.max_decoded_pixels;
        config.max_decoded_bytes = self.max_decoded_bytes;
        config.max_palette_colors = self.max_palette_colors;
    }
}
