//! 复习层：答案评分、交互协作方、会话控制器

pub mod grading;
pub mod prompt;
pub mod session;

pub use grading::{grade_answer, Verdict};
pub use prompt::{Feedback, Prompter, ScriptedPrompter};
pub use session::{
    adjust_priority, plan_review, Phase, ReviewPlan, ReviewSession, SessionOptions, SessionReport,
    LAPSE_PRIORITY_BOOST, SUCCESS_PRIORITY_DECAY,
};
