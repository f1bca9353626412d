//! # 帧预算
//!
//! ## 设计思路
//!
//! 设备对动图有两条硬限制：最多 64 帧、总时长最多 2000ms。
//! 两条约束按固定顺序执行（先帧数、后时长），均使用“均匀索引采样”
//! 而不是截断尾部，从而保留完整的动作弧线。
//!
//! ## 实现思路
//!
//! - 采样索引 `floor(i * (len - 1) / (target - 1))`，首帧与末帧必定保留，
//!   且 `target <= len` 时索引严格递增，不会重复。
//! - 帧与时长绑定在同一个 `AnimationFrame` 中按值移动，
//!   被采样的帧永远携带自己的原始时长，不做插值。
//! - 时长约束以首帧时长（下限 16ms）估算目标帧数，并钳制到 `[2, max_frames]`；
//!   若帧时长不均匀导致采样后仍超时，则逐帧收缩目标，直至满足或只剩 2 帧。

use super::AnimationFrame;

/// 设备动图硬件限制。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationBudget {
    pub max_frames: usize,
    pub max_total_duration_ms: u64,
}

/// 进程级常量，不随请求变化。
pub const ANIMATION_BUDGET: AnimationBudget = AnimationBudget {
    max_frames: 64,
    max_total_duration_ms: 2000,
};

/// 动图至少保留的帧数，避免退化为静态图。
const MIN_ANIMATION_FRAMES: usize = 2;

/// 首帧时长下限，避免除以 0 或近 0 时长。
const MIN_FRAME_DURATION_MS: u64 = 16;

/// 从 `len` 个元素中均匀选出 `target` 个索引。
///
/// # 示例
/// ```rust
/// use dotmatrix_media::media::sample_indices;
///
/// let indices = sample_indices(100, 64);
/// assert_eq!(indices.len(), 64);
/// assert_eq!(indices.first(), Some(&0));
/// assert_eq!(indices.last(), Some(&99));
/// ```
pub fn sample_indices(len: usize, target: usize) -> Vec<usize> {
    if target >= len {
        return (0..len).collect();
    }
    match target {
        0 => Vec::new(),
        1 => vec![0],
        _ => (0..target).map(|i| i * (len - 1) / (target - 1)).collect(),
    }
}

/// 按预算裁减帧序列。
pub fn apply_budget(frames: Vec<AnimationFrame>, budget: &AnimationBudget) -> Vec<AnimationFrame> {
    let source_len = frames.len();
    let max_frames = budget.max_frames.max(MIN_ANIMATION_FRAMES);

    // 1. 帧数上限
    let frames = if frames.len() > max_frames {
        let indices = sample_indices(frames.len(), max_frames);
        select(frames, &indices)
    } else {
        frames
    };

    // 2. 时长上限
    let total = total_duration_ms(&frames);
    if total <= budget.max_total_duration_ms || frames.len() <= 1 {
        log_budget(source_len, &frames);
        return frames;
    }

    let first = u64::from(frames[0].duration_ms).max(MIN_FRAME_DURATION_MS);
    let estimated = budget.max_total_duration_ms / first;
    let mut target = usize::try_from(estimated)
        .unwrap_or(usize::MAX)
        .clamp(MIN_ANIMATION_FRAMES, max_frames)
        .min(frames.len());

    let indices = loop {
        let indices = sample_indices(frames.len(), target);
        let sampled_total: u64 = indices.iter().map(|&i| u64::from(frames[i].duration_ms)).sum();

        if sampled_total <= budget.max_total_duration_ms || target <= MIN_ANIMATION_FRAMES {
            break indices;
        }
        target -= 1;
    };

    let frames = select(frames, &indices);
    log_budget(source_len, &frames);
    frames
}

pub(crate) fn total_duration_ms(frames: &[AnimationFrame]) -> u64 {
    frames.iter().map(|f| u64::from(f.duration_ms)).sum()
}

/// 按严格递增的索引保留元素。
fn select<T>(items: Vec<T>, indices: &[usize]) -> Vec<T> {
    let mut wanted = indices.iter().copied().peekable();
    let mut kept = Vec::with_capacity(indices.len());

    for (index, item) in items.into_iter().enumerate() {
        if wanted.peek() == Some(&index) {
            kept.push(item);
            wanted.next();
        }
    }

    kept
}

fn log_budget(source_len: usize, frames: &[AnimationFrame]) {
    log::info!(
        "⏱️ 帧预算 - 帧数: {} -> {} 总时长: {}ms",
        source_len,
        frames.len(),
        total_duration_ms(frames)
    );
}
