//! Generated plans: wire types, prompt construction, output parsing.

pub mod parser;
pub mod prompt;
pub mod types;

pub use parser::{PlanParseError, parse_generated_plan, plan_from_value};
pub use prompt::{build_system_prompt, build_user_prompt};
pub use types::{ExerciseDraft, GeneratedPlan, TrainingDay};
