//! # 设备协作方
//!
//! ## 设计思路
//!
//! 媒体适配流水线不持有任何设备或网络资源，只通过两个窄接口与外界交互：
//! - `DeviceState`：提供当前显示分辨率（画布尺寸），以参数形式传入而非全局读取；
//! - `DeviceTransport`：接收适配结果并负责链路层分包与发送。
//!
//! 同一时刻至多一个发送在进行，这一互斥由传输方自己保证。
//! `ExclusiveTransport` 用一把 `Mutex` 包住物理链路，作为该能力的默认实现。

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// 传输层错误，不属于媒体流水线的错误分类。
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("链路错误：{0}")]
    Link(String),

    #[error("链路不可用：{0}")]
    Busy(String),
}

/// 设备状态：暴露当前画布尺寸。
pub trait DeviceState: Send + Sync {
    /// 设备显示分辨率（宽 = 高）。非正值属于配置故障。
    fn canvas_size(&self) -> i64;
}

/// 设备传输能力。
pub trait DeviceTransport: Send + Sync {
    /// 发送 `size * size * 3` 字节的 RGB 像素。
    fn send_raw_pixels(&self, pixels: &[u8]) -> Result<(), TransportError>;

    /// 发送 GIF 字节流（分包由实现方负责）。
    fn send_animation(&self, gif: &[u8]) -> Result<(), TransportError>;
}

/// 可在运行时更新的设备状态（例如重新连接后分辨率变化）。
#[derive(Debug)]
pub struct SharedDeviceState {
    canvas_size: AtomicI64,
}

impl SharedDeviceState {
    pub fn new(canvas_size: i64) -> Self {
        Self {
            canvas_size: AtomicI64::new(canvas_size),
        }
    }

    pub fn set_canvas_size(&self, canvas_size: i64) {
        self.canvas_size.store(canvas_size, Ordering::SeqCst);
    }
}

impl DeviceState for SharedDeviceState {
    fn canvas_size(&self) -> i64 {
        self.canvas_size.load(Ordering::SeqCst)
    }
}

/// 物理链路，写入需要独占访问。
pub trait DeviceLink: Send {
    fn write_raw_pixels(&mut self, pixels: &[u8]) -> Result<(), TransportError>;
    fn write_animation(&mut self, gif: &[u8]) -> Result<(), TransportError>;
}

/// 用单把互斥锁串行化所有发送的传输实现。
pub struct ExclusiveTransport<L> {
    link: Mutex<L>,
}

impl<L: DeviceLink> ExclusiveTransport<L> {
    pub fn new(link: L) -> Self {
        Self {
            link: Mutex::new(link),
        }
    }

    /// 取回内部链路。
    pub fn into_inner(self) -> Result<L, TransportError> {
        self.link
            .into_inner()
            .map_err(|_| TransportError::Busy("链路锁已中毒".to_string()))
    }

    fn with_link<T>(&self, f: impl FnOnce(&mut L) -> Result<T, TransportError>) -> Result<T, TransportError> {
        let mut link = self
            .link
            .lock()
            .map_err(|_| TransportError::Busy("链路锁已中毒".to_string()))?;
        f(&mut link)
    }
}

impl<L: DeviceLink> DeviceTransport for ExclusiveTransport<L> {
    fn send_raw_pixels(&self, pixels: &[u8]) -> Result<(), TransportError> {
        self.with_link(|link| link.write_raw_pixels(pixels))
    }

    fn send_animation(&self, gif: &[u8]) -> Result<(), TransportError> {
        self.with_link(|link| link.write_animation(gif))
    }
}
