#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Roadmap step not found: {0}")]
    UnknownStep(u32),

    #[error("Task not found: {task_id} in step {step_id}")]
    UnknownTask { step_id: u32, task_id: String },

    #[error("Goal not found at position {0}")]
    UnknownGoal(usize),

    #[error("Skill not found: {0}")]
    UnknownSkill(String),

    #[error("Skill name must not be blank")]
    BlankSkillName,
}
