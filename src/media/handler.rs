//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `MediaHandler` 只负责流程编排与配置管理，不直接与设备或网络绑定。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按类别进入静态图或动图链路
//! 3. 动图：提取 → 帧预算 → 帧适配/量化 → 重新编码
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<MediaConfig>>` 支持运行时动态切档。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录各阶段耗时，便于性能诊断。
//! - 所有阶段同步执行，要么返回完整结果，要么整体失败，不暴露中间产物。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::budget::{ANIMATION_BUDGET, apply_budget};
use super::config::MediaAdvancedConfig;
use super::encode::encode_gif;
use super::extract::extract_frames;
use super::frames::adapt_frames;
use super::loader;
use super::still::adapt_still;
use super::{
    AdaptedAnimation, AdaptedMedia, AdaptedStill, CanvasSpec, MediaConfig, MediaError, MediaKind,
    MediaPerformanceProfile, MediaSource,
};

/// 媒体适配处理器。
///
/// 克隆成本很低（共享同一份配置），可以移动到阻塞线程池中执行。
#[derive(Clone)]
pub struct MediaHandler {
    config: Arc<RwLock<MediaConfig>>,
}

impl MediaHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use dotmatrix_media::media::{MediaConfig, MediaHandler};
    ///
    /// let handler = MediaHandler::new(MediaConfig::default());
    /// assert_eq!(handler.get_performance_profile()?.as_str(), "balanced");
    /// # Ok::<(), dotmatrix_media::media::MediaError>(())
    /// ```
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<MediaConfig, MediaError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| MediaError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置性能档位。
    pub fn set_performance_profile(&self, profile: MediaPerformanceProfile) -> Result<(), MediaError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| MediaError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换媒体性能档位：{:?}（still_filter={:?}, sample_factor={}）",
            profile,
            config.still_filter,
            config.quantize_sample_factor
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_performance_profile(&self) -> Result<MediaPerformanceProfile, MediaError> {
        let config = self
            .config
            .read()
            .map_err(|_| MediaError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile())
    }

    /// 校验并应用高级配置。
    pub fn set_advanced_config(&self, advanced: &MediaAdvancedConfig) -> Result<(), MediaError> {
        advanced.validate()?;

        let mut config = self
            .config
            .write()
            .map_err(|_| MediaError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        advanced.apply_to(&mut config);
        Ok(())
    }

    pub fn get_advanced_config(&self) -> Result<MediaAdvancedConfig, MediaError> {
        let config = self
            .config
            .read()
            .map_err(|_| MediaError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(MediaAdvancedConfig::from_config(&config))
    }

    /// 加载任意来源，按签名自动分派到静态图或动图链路。
    pub fn adapt(&self, source: MediaSource, spec: &CanvasSpec) -> Result<AdaptedMedia, MediaError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = loader::load(source, &config)?;
        let load_elapsed = load_start.elapsed();

        let adapted = match raw.kind {
            MediaKind::Still => AdaptedMedia::Still(self.adapt_still_with(&raw.bytes, spec, &config)?),
            MediaKind::Animation => {
                AdaptedMedia::Animation(self.adapt_animation_with(&raw.bytes, spec, &config)?)
            }
        };

        log::info!(
            "✅ 媒体适配完成 - 来源: {} 类别: {:?} 负载: {} 字节 load={}ms total={}ms",
            raw.source_hint,
            adapted.kind(),
            adapted.payload().len(),
            load_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(adapted)
    }

    /// 静态图链路：输出 `size * size * 3` 字节 RGB。
    pub fn adapt_still(&self, bytes: &[u8], spec: &CanvasSpec) -> Result<AdaptedStill, MediaError> {
        let config = self.config_snapshot()?;
        self.adapt_still_with(bytes, spec, &config)
    }

    /// 动图链路：输出重新编码后的 GIF。
    pub fn adapt_animation(&self, bytes: &[u8], spec: &CanvasSpec) -> Result<AdaptedAnimation, MediaError> {
        let config = self.config_snapshot()?;
        self.adapt_animation_with(bytes, spec, &config)
    }

    fn adapt_still_with(
        &self,
        bytes: &[u8],
        spec: &CanvasSpec,
        config: &MediaConfig,
    ) -> Result<AdaptedStill, MediaError> {
        let start = Instant::now();
        let adapted = adapt_still(bytes, spec, config)?;

        log::info!(
            "🖼️ 静态图数据: {} 字节（{}x{} RGB）adapt={}ms",
            adapted.rgb_bytes.len(),
            spec.size(),
            spec.size(),
            start.elapsed().as_millis()
        );

        Ok(adapted)
    }

    fn adapt_animation_with(
        &self,
        bytes: &[u8],
        spec: &CanvasSpec,
        config: &MediaConfig,
    ) -> Result<AdaptedAnimation, MediaError> {
        let decode_start = Instant::now();
        let frames = extract_frames(bytes, config)?;
        let decode_elapsed = decode_start.elapsed();

        let frames = apply_budget(frames, &ANIMATION_BUDGET);
        let frame_count = frames.len();

        let adapt_start = Instant::now();
        let quantized = adapt_frames(frames, spec, config);
        let adapt_elapsed = adapt_start.elapsed();

        let encode_start = Instant::now();
        let encoded_gif_bytes = encode_gif(&quantized)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "🎞️ GIF 编码完成: {} 帧 {}x{}，{} 字节（{:.1} KB）decode={}ms adapt={}ms encode={}ms",
            frame_count,
            spec.size(),
            spec.size(),
            encoded_gif_bytes.len(),
            encoded_gif_bytes.len() as f64 / 1024.0,
            decode_elapsed.as_millis(),
            adapt_elapsed.as_millis(),
            encode_elapsed.as_millis()
        );

        Ok(AdaptedAnimation {
            canvas: *spec,
            encoded_gif_bytes,
            frame_count,
        })
    }
}
