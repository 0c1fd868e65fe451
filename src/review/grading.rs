//! 答案评分：粗粒度子串启发式
//!
//! - 空答案（去掉首尾空白后）→ 不知道，quality 0，并显示正确释义
//! - 忽略大小写，答案包含释义或释义包含答案 → 正确，quality 5
//! - 否则 → 答错但作答了，quality 2
//!
//! 这不是语义判分：短答案很容易「包含」在长释义里，这类误判在此层可接受。

use crate::srs::Quality;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    DontKnow,
}

impl Verdict {
    pub fn quality(self) -> Quality {
        match self {
            Verdict::Correct => Quality::PERFECT,
            Verdict::Incorrect => Quality::INCORRECT,
            Verdict::DontKnow => Quality::BLACKOUT,
        }
    }
}

pub fn grade_answer(answer: &str, meaning: &str) -> Verdict {
    let answer = answer.trim();
    if answer.is_empty() {
        return Verdict::DontKnow;
    }

    let answer = answer.to_lowercase();
    let meaning = meaning.trim().to_lowercase();
    if answer.contains(&meaning) || meaning.contains(&answer) {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_answer_is_dont_know() {
        assert_eq!(grade_answer("", "苹果"), Verdict::DontKnow);
        assert_eq!(grade_answer("   \t", "苹果"), Verdict::DontKnow);
        assert_eq!(Verdict::DontKnow.quality().value(), 0);
    }

    #[test]
    fn test_containment_either_direction() {
        assert_eq!(grade_answer("Apple", "apple"), Verdict::Correct);
        assert_eq!(grade_answer("a red apple fruit", "Apple"), Verdict::Correct);
        assert_eq!(grade_answer("FRUIT", "a round fruit"), Verdict::Correct);
        assert_eq!(grade_answer("苹果", "苹果；苹果树"), Verdict::Correct);
        assert_eq!(Verdict::Correct.quality().value(), 5);
    }

    #[test]
    fn test_mismatch_is_incorrect() {
        assert_eq!(grade_answer("banana", "apple"), Verdict::Incorrect);
        assert_eq!(Verdict::Incorrect.quality().value(), 2);
        assert!(Verdict::Incorrect.quality().is_lapse());
    }

    #[test]
    fn test_short_answer_false_positive_is_kept() {
        // 子串启发式的已知误判：单个字母也「包含」在释义里
        assert_eq!(grade_answer("a", "to abandon"), Verdict::Correct);
    }
}
