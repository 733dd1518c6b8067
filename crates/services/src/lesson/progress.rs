/// Snapshot of where the learner is in a lesson, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonProgress {
    /// 1-based position of the current sentence.
    pub position: usize,
    pub total: usize,
    /// Share of the lesson covered, `0.0..=1.0`.
    pub fraction: f64,
    pub is_last: bool,
    pub can_go_back: bool,
    pub is_finished: bool,
}
