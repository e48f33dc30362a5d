use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{JumperError, Result};

// --- Skill Record ---

/// Stands in for a level count the host published as `null` or as a
/// non-integer. Never a valid tier, so such skills end up as anomalies.
pub const UNKNOWN_LEVELS: i64 = -1;

/// Integer counts pass through; anything else becomes [`UNKNOWN_LEVELS`].
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_i64().unwrap_or(UNKNOWN_LEVELS))
}

fn null_as_false<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// One node of the host's learning tree, as published in its state snapshot.
/// Only the fields the classifier reads are modeled; everything else is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    #[serde(default)]
    pub row: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub finished_levels: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub levels: i64,
    #[serde(default, deserialize_with = "null_as_false")]
    pub accessible: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub decayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SkillRecord {
    /// Decode one entry of the host's `skills` collection.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Both counts are non-negative, so the tier rules can be applied.
    pub fn has_known_levels(&self) -> bool {
        self.finished_levels >= 0 && self.levels >= 0
    }

    pub fn is_complete(&self) -> bool {
        self.finished_levels == self.levels
    }

    /// One level short of full completion, i.e. only the legendary pass remains.
    pub fn is_final_level(&self) -> bool {
        self.levels > 0 && self.levels - 1 == self.finished_levels
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Skill in row {}", self.row))
    }
}

// --- Synthetic Identifier ---

/// Process-local id `<prefix>_<position>`, stable only within one indexing pass.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(String);

impl SkillId {
    pub fn new(prefix: &str, position: usize) -> Self {
        Self(format!("{prefix}_{position}"))
    }

    /// Wrap a raw id read back from persistence. No validation: a stale or
    /// foreign value simply never matches a freshly assigned id.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric position portion of the id, if it has one.
    pub fn position(&self) -> Option<usize> {
        self.0
            .rsplit_once('_')
            .and_then(|(_, pos)| pos.parse().ok())
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A skill together with the id it was assigned during indexing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedSkill {
    pub id: SkillId,
    pub record: SkillRecord,
}

// --- Language Pair ---

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub learning: String,
    pub source: String,
}

impl LanguagePair {
    pub fn new(learning: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            learning: learning.into(),
            source: source.into(),
        }
    }

    /// `<learning>_<source>`, the suffix every persisted key is namespaced by.
    pub fn key_suffix(&self) -> String {
        format!("{}_{}", self.learning, self.source)
    }
}

// --- Host Snapshot ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    learning_language: Option<String>,
    from_language: Option<String>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    user: Option<RawUser>,
    skills: Option<Value>,
}

/// The parts of the host's progress state the core consumes.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    pub language: LanguagePair,
    pub skills: Vec<SkillRecord>,
}

impl StateSnapshot {
    /// Parse a host state document. Missing required fields fail fast with
    /// [`JumperError::MissingUpstream`]; `skills` may be an array or an
    /// object keyed by skill id, whose order is kept as published.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        let user = raw.user.ok_or(JumperError::MissingUpstream("user"))?;
        let learning = user
            .learning_language
            .ok_or(JumperError::MissingUpstream("user.learningLanguage"))?;
        let source = user
            .from_language
            .ok_or(JumperError::MissingUpstream("user.fromLanguage"))?;

        let skills = match raw.skills {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(SkillRecord::from_value)
                .collect::<Result<Vec<SkillRecord>>>()?,
            Some(Value::Object(map)) => map
                .into_values()
                .map(SkillRecord::from_value)
                .collect::<Result<Vec<SkillRecord>>>()?,
            Some(Value::Null) | None => return Err(JumperError::MissingUpstream("skills")),
            Some(other) => {
                return Err(JumperError::MalformedSnapshot(serde::de::Error::custom(
                    format!("skills must be an array or object, got {other}"),
                )));
            }
        };

        let unknown = skills.iter().filter(|s| !s.has_known_levels()).count();
        if unknown > 0 {
            warn!(unknown, "skills with unreadable level counts");
        }

        Ok(Self {
            language: LanguagePair::new(learning, source),
            skills,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_id_position_round_trip() {
        let id = SkillId::new("LevelJumper", 17);
        assert_eq!(id.as_str(), "LevelJumper_17");
        assert_eq!(id.position(), Some(17));
        assert_eq!(SkillId::from_raw("").position(), None);
        assert_eq!(SkillId::from_raw("garbage_x").position(), None);
    }

    #[test]
    fn test_zero_level_skill_is_complete_not_final() {
        let skill = SkillRecord {
            levels: 0,
            finished_levels: 0,
            ..Default::default()
        };
        assert!(!skill.is_final_level());
        assert!(skill.is_complete());
    }

    #[test]
    fn test_snapshot_from_array() {
        let json = r#"{
            "user": {"learningLanguage": "de", "fromLanguage": "en", "streak": 4},
            "skills": [
                {"row": 0, "finishedLevels": 2, "levels": 5, "accessible": true, "name": "Basics"},
                {"row": 1, "finishedLevels": 0, "levels": 5}
            ]
        }"#;
        let snap = StateSnapshot::from_json(json).unwrap();
        assert_eq!(snap.language.key_suffix(), "de_en");
        assert_eq!(snap.skills.len(), 2);
        assert_eq!(snap.skills[0].finished_levels, 2);
        assert!(snap.skills[0].accessible);
        assert!(!snap.skills[1].accessible);
        assert!(!snap.skills[1].decayed);
    }

    #[test]
    fn test_snapshot_from_object_keeps_published_order() {
        let json = r#"{
            "user": {"learningLanguage": "fr", "fromLanguage": "en"},
            "skills": {
                "zz": {"row": 0, "finishedLevels": 1, "levels": 5, "accessible": true},
                "aa": {"row": 1, "finishedLevels": 3, "levels": 5, "accessible": true}
            }
        }"#;
        let snap = StateSnapshot::from_json(json).unwrap();
        assert_eq!(snap.skills[0].row, 0);
        assert_eq!(snap.skills[1].row, 1);
    }

    #[test]
    fn test_snapshot_missing_fields_fail_fast() {
        let err = StateSnapshot::from_json(r#"{"skills": []}"#).unwrap_err();
        assert!(matches!(err, JumperError::MissingUpstream("user")));

        let err = StateSnapshot::from_json(r#"{"user": {"fromLanguage": "en"}, "skills": []}"#)
            .unwrap_err();
        assert!(matches!(err, JumperError::MissingUpstream("user.learningLanguage")));

        let err = StateSnapshot::from_json(
            r#"{"user": {"learningLanguage": "de", "fromLanguage": "en"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JumperError::MissingUpstream("skills")));
    }

    #[test]
    fn test_snapshot_keeps_skills_with_bad_counts() {
        let json = r#"{
            "user": {"learningLanguage": "de", "fromLanguage": "en"},
            "skills": [
                {"row": 0, "finishedLevels": 2, "levels": 5, "accessible": true},
                {"row": 1, "finishedLevels": -1, "levels": 5, "accessible": true},
                {"row": 2, "finishedLevels": null, "levels": 5, "accessible": false},
                {"row": 3, "finishedLevels": "3", "levels": null, "decayed": null}
            ]
        }"#;
        let snap = StateSnapshot::from_json(json).unwrap();
        assert_eq!(snap.skills.len(), 4);
        assert!(snap.skills[0].has_known_levels());
        assert_eq!(snap.skills[1].finished_levels, -1);
        assert_eq!(snap.skills[2].finished_levels, UNKNOWN_LEVELS);
        assert_eq!(snap.skills[3].finished_levels, UNKNOWN_LEVELS);
        assert_eq!(snap.skills[3].levels, UNKNOWN_LEVELS);
        assert!(!snap.skills[3].decayed);
        assert!(snap.skills[1..].iter().all(|s| !s.has_known_levels()));
    }

    #[test]
    fn test_unknown_counts_are_neither_complete_nor_final() {
        let skill = SkillRecord {
            levels: UNKNOWN_LEVELS,
            finished_levels: UNKNOWN_LEVELS,
            ..Default::default()
        };
        assert!(!skill.has_known_levels());
        assert!(!skill.is_final_level());
    }

    #[test]
    fn test_snapshot_rejects_scalar_skills() {
        let err = StateSnapshot::from_json(
            r#"{"user": {"learningLanguage": "de", "fromLanguage": "en"}, "skills": 3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JumperError::MalformedSnapshot(_)));
    }
}
