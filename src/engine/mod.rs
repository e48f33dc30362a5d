pub mod bucket;
pub mod classifier;
pub mod skill;
pub mod target;

pub use bucket::{BucketKey, MENU_ORDER};
pub use classifier::{Classification, ClassifyOptions, classify};
pub use skill::{IndexedSkill, LanguagePair, SkillId, SkillRecord, StateSnapshot};
pub use target::{JumpTarget, resolve_target};
