//! # 点阵屏媒体适配 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │           外层调用方（HTTP 上传 / CLI / 测试）              │
//! │                                                          │
//! │   MediaSource + AdaptRequest ── DeviceState (画布尺寸)    │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↓ Result<AdaptedMedia, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            媒体适配 (Rust)                        │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ media ────── 加载·识别·适配·编码                       │
//! │  │   ├─ still          静态图 → size*size*3 RGB           │
//! │  │   └─ animation      GIF → 帧预算 → 量化 → GIF           │
//! │  │                                                       │
//! │  └─ device ───── DeviceState / DeviceTransport           │
//! │                   (分辨率来源 + 独占发送)                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，服务层入口的返回类型 |
//! | [`media`] | 把任意图片/GIF 适配为点阵屏可直接显示的负载 |
//! | [`device`] | 设备分辨率来源与传输能力的窄接口 |

pub mod error;
pub mod device;
pub mod media;
