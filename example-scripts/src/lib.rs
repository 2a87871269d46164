pub mod founder_intake;
pub mod interview;

// Re-export founder_intake types
pub use founder_intake::{FounderIntake, PRICING_MODELS, founder_intake, split_list};

// Re-export interview types
pub use interview::{action_label, interview_script};
