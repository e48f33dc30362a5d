use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::engine::bucket::BucketKey;
use crate::engine::skill::{IndexedSkill, SkillId, SkillRecord};

pub const DEFAULT_ID_PREFIX: &str = "LevelJumper";

pub type SkillIndex = BTreeMap<BucketKey, Vec<IndexedSkill>>;
pub type RowTable = BTreeMap<i64, SkillId>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Treat "one level short of complete" as its own tier, leaving the legendary pass out.
    pub ignore_legendary: bool,
    pub id_prefix: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            ignore_legendary: true,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

/// A skill that fell through every rule into a tier that does not exist,
/// or whose level counts could not be read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationAnomaly {
    pub id: SkillId,
    pub finished_levels: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub index: SkillIndex,
    pub rows: RowTable,
    /// Every input skill in input order, accessible or not.
    pub skills: Vec<IndexedSkill>,
    pub anomalies: Vec<ClassificationAnomaly>,
}

impl Classification {
    fn empty() -> Self {
        let mut index = SkillIndex::new();
        for key in BucketKey::primary() {
            index.insert(key, Vec::new());
        }
        index.insert(BucketKey::LastLevel, Vec::new());
        Self {
            index,
            rows: RowTable::new(),
            skills: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    pub fn bucket(&self, key: BucketKey) -> &[IndexedSkill] {
        self.index.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Buckets are consumed head-only.
    pub fn head(&self, key: BucketKey) -> Option<&IndexedSkill> {
        self.bucket(key).first()
    }

    pub fn last_level(&self) -> Option<&IndexedSkill> {
        self.head(BucketKey::LastLevel)
    }

    /// Replace (never append to) the `lastLevel` bucket.
    pub fn set_last_level(&mut self, skill: IndexedSkill) {
        self.index.insert(BucketKey::LastLevel, vec![skill]);
    }

    /// The primary bucket a skill landed in, if any.
    pub fn primary_bucket_of(&self, id: &SkillId) -> Option<BucketKey> {
        self.index
            .iter()
            .filter(|(key, _)| key.is_primary())
            .find(|(_, members)| members.iter().any(|s| &s.id == id))
            .map(|(key, _)| *key)
    }
}

fn primary_bucket(record: &SkillRecord, ignore_legendary: bool) -> Option<BucketKey> {
    if !record.has_known_levels() {
        None
    } else if record.is_complete() {
        Some(BucketKey::Crown)
    } else if record.decayed {
        Some(BucketKey::Decayed)
    } else if ignore_legendary && record.is_final_level() {
        Some(BucketKey::FinalLevel)
    } else {
        BucketKey::level(record.finished_levels)
    }
}

/// Partition `skills` into progress buckets and build the row lookup table.
///
/// Ids are assigned by input position. Every skill enters the row table;
/// only accessible skills are bucketed. The skill whose id equals
/// `last_opened` becomes the sole member of `lastLevel`, independently of
/// its primary bucket. Skills whose tier is out of range are reported as
/// anomalies and left out of every bucket.
pub fn classify(
    skills: &[SkillRecord],
    last_opened: &SkillId,
    options: &ClassifyOptions,
) -> Classification {
    let mut out = Classification::empty();

    for (position, record) in skills.iter().enumerate() {
        let skill = IndexedSkill {
            id: SkillId::new(&options.id_prefix, position),
            record: record.clone(),
        };
        out.rows.insert(record.row, skill.id.clone());

        if record.accessible {
            if &skill.id == last_opened {
                out.set_last_level(skill.clone());
            }
            match primary_bucket(record, options.ignore_legendary) {
                Some(key) => out.index.entry(key).or_default().push(skill.clone()),
                None => {
                    warn!(
                        id = %skill.id,
                        finished_levels = record.finished_levels,
                        "skill tier out of range, leaving it unclassified"
                    );
                    out.anomalies.push(ClassificationAnomaly {
                        id: skill.id.clone(),
                        finished_levels: record.finished_levels,
                    });
                }
            }
        }

        out.skills.push(skill);
    }

    debug!(
        skills = out.skills.len(),
        rows = out.rows.len(),
        anomalies = out.anomalies.len(),
        "built skill index"
    );
    out
}
