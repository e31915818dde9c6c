pub mod normalize;
pub mod record;

pub use normalize::{normalize_record, normalize_step, parse_tags};
pub use record::{Difficulty, MediaType, TutorialId, TutorialRecord, TutorialStep};
