//! Recall Model：SM-2 间隔重复计算
//!
//! 纯函数，无状态无 I/O。输入当前 (repetition_count, ease, interval) 与评分 quality（0-5），
//! 输出更新后的三元组：
//! - quality < 3 视为遗忘（lapse）：连续次数清零，间隔回到 1 天，ease 仍按公式下调
//! - quality ≥ 3：连续次数 +1；第 1 次 1 天，第 2 次 6 天，之后 round(interval × ease)
//! - ease′ = max(1.3, ease + 0.1 − (5−q)×(0.08 + (5−q)×0.02))，使用原始 quality 与 ease

use thiserror::Error;

use super::item::{RecallState, MIN_EASE};

/// quality 达到此值才算答对
pub const PASS_THRESHOLD: u8 = 3;

/// 超出 0-5 的评分属于调用方的编程错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("recall quality {0} is outside 0-5")]
pub struct InvalidQuality(pub u8);

/// 回忆质量评分（0 = 完全想不起，5 = 完美回忆），构造时校验范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    /// 空答案：不知道
    pub const BLACKOUT: Quality = Quality(0);
    /// 答错但作答了
    pub const INCORRECT: Quality = Quality(2);
    pub const PERFECT: Quality = Quality(5);

    pub fn new(value: u8) -> Result<Self, InvalidQuality> {
        if value > Self::MAX {
            return Err(InvalidQuality(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_lapse(self) -> bool {
        self.0 < PASS_THRESHOLD
    }
}

impl TryFrom<u8> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// ease 更新：凹形惩罚，quality=5 时 +0.1，quality=4 持平，越低降得越快；不低于 1.3
pub fn next_ease(ease: f64, quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    (ease + 0.1 - miss * (0.08 + miss * 0.02)).max(MIN_EASE)
}

/// 第三次及以后答对的间隔：round(interval × ease)，至少 1 天
fn grown_interval(interval: u32, ease: f64) -> u32 {
    // f64 -> u32 的 as 转换在溢出时饱和
    (f64::from(interval) * ease).round().max(1.0) as u32
}

/// 根据一次复习的评分计算新的调度状态
pub fn update(state: RecallState, quality: Quality) -> RecallState {
    let ease = next_ease(state.ease, quality);

    if quality.is_lapse() {
        return RecallState {
            repetition_count: 0,
            ease,
            interval: 1,
        };
    }

    let repetition_count = state.repetition_count.saturating_add(1);
    let interval = match repetition_count {
        1 => 1,
        2 => 6,
        _ => grown_interval(state.interval, state.ease),
    };

    RecallState {
        repetition_count,
        ease,
        interval,
    }
}
