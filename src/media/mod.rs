//! # 媒体适配模块（media）
//!
//! ## 设计思路
//!
//! 该模块把任意用户图片/GIF 转换成点阵屏可直接显示的负载：
//! 静态图输出 `size * size * 3` 字节 RGB，动图输出满足设备帧数/时长约束的 GIF。
//! 按职责拆分为多个子模块，每个阶段都是纯函数，便于单独测试。
//!
//! - `service`：外部调用入口（解析画布 + 阻塞线程池执行 + 交给传输方）
//! - `handler`：编排整条处理流水线，持有可切档配置
//! - `loader`：字节/Base64/文件加载与签名识别
//! - `canvas/geometry`：画布规格与缩放、裁剪、居中的几何计算
//! - `still`：静态图解码、方向校正与贴合画布
//! - `extract/budget/frames/quantize/encode`：动图提取 → 帧预算 → 帧适配 → 调色板量化 → GIF 编码
//! - `resample/limits`：重采样与资源限制工具
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! MediaService::upload / prepare
//!    ↓
//! CanvasSpec::resolve（模式 + 裁剪锚点 + 设备分辨率）
//!    ↓
//! MediaHandler::adapt
//!    ├─ loader.rs（来源加载 + 体积校验 + 签名识别）
//!    ├─ still.rs（静态图：解码 → 方向校正 → 缩放 → 裁剪/居中 → RGB）
//!    └─ 动图：extract.rs → budget.rs → frames.rs → quantize.rs → encode.rs
//!    ↓
//! AdaptedMedia → DeviceTransport
//! ```
//!
//! ## 分层职责建议
//!
//! - 设备硬件约束（64 帧 / 2000ms）只改 `budget.rs`
//! - 可调策略（滤镜、量化精度、资源上限）优先改 `config.rs`
//! - 几何规则变更只改 `geometry.rs`，静态图与动图共用

mod budget;
mod canvas;
mod config;
mod encode;
mod error;
mod extract;
mod frames;
mod geometry;
mod handler;
mod limits;
mod loader;
mod quantize;
mod resample;
mod service;
mod source;
mod still;

pub use budget::{ANIMATION_BUDGET, AnimationBudget, apply_budget, sample_indices};
pub use canvas::{CanvasSpec, CropAnchor, MAX_CANVAS_SIZE, ResizeMode};
pub use config::{
    DEFAULT_FRAME_DURATION_MS, MAX_PALETTE_COLORS, MediaAdvancedConfig, MediaConfig, MediaPerformanceProfile,
};
pub use error::MediaError;
pub use handler::MediaHandler;
pub use service::{AdaptRequest, MediaService};
pub use source::{
    AdaptedAnimation, AdaptedMedia, AdaptedStill, AnimationFrame, ChannelLayout, MediaKind, MediaSource,
    PixelFrame, QuantizedFrame,
};
