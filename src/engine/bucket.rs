use std::fmt;

/// Highest numeric tier a skill can sit in before the priority rules take over.
pub const MAX_LEVEL_TIER: u8 = 5;

// --- Bucket Key ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    /// Number of finished non-legendary levels, `0..=5`.
    Level(u8),
    FinalLevel,
    Crown,
    Decayed,
    LastLevel,
}

/// Order in which menu entries are emitted. `Crown` is classified but never offered.
pub const MENU_ORDER: &[BucketKey] = &[
    BucketKey::Decayed,
    BucketKey::FinalLevel,
    BucketKey::Level(5),
    BucketKey::Level(4),
    BucketKey::Level(3),
    BucketKey::Level(2),
    BucketKey::Level(1),
    BucketKey::Level(0),
    BucketKey::LastLevel,
];

impl BucketKey {
    /// Numeric tier for `finished_levels`, or `None` outside `0..=5`.
    pub fn level(finished_levels: i64) -> Option<Self> {
        u8::try_from(finished_levels)
            .ok()
            .filter(|&n| n <= MAX_LEVEL_TIER)
            .map(BucketKey::Level)
    }

    pub fn to_key(self) -> String {
        match self {
            BucketKey::Level(n) => n.to_string(),
            BucketKey::FinalLevel => "finalLevel".to_string(),
            BucketKey::Crown => "crown".to_string(),
            BucketKey::Decayed => "decayed".to_string(),
            BucketKey::LastLevel => "lastLevel".to_string(),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "finalLevel" => Some(BucketKey::FinalLevel),
            "crown" => Some(BucketKey::Crown),
            "decayed" => Some(BucketKey::Decayed),
            "lastLevel" => Some(BucketKey::LastLevel),
            other => other.parse::<i64>().ok().and_then(BucketKey::level),
        }
    }

    /// Every primary bucket, i.e. all keys except the orthogonal `LastLevel`.
    pub fn primary() -> Vec<BucketKey> {
        let mut keys: Vec<BucketKey> = (0..=MAX_LEVEL_TIER).map(BucketKey::Level).collect();
        keys.extend([BucketKey::FinalLevel, BucketKey::Crown, BucketKey::Decayed]);
        keys
    }

    pub fn is_primary(self) -> bool {
        self != BucketKey::LastLevel
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip_for_every_bucket() {
        for key in BucketKey::primary().into_iter().chain([BucketKey::LastLevel]) {
            assert_eq!(BucketKey::from_key(&key.to_key()), Some(key), "{key}");
        }
    }

    #[test]
    fn test_level_out_of_range_is_rejected() {
        assert_eq!(BucketKey::level(5), Some(BucketKey::Level(5)));
        assert_eq!(BucketKey::level(6), None);
        assert_eq!(BucketKey::level(-1), None);
        assert_eq!(BucketKey::level(i64::MAX), None);
        assert_eq!(BucketKey::from_key("6"), None);
        assert_eq!(BucketKey::from_key("off"), None);
    }

    #[test]
    fn test_menu_order_excludes_crown() {
        assert!(!MENU_ORDER.contains(&BucketKey::Crown));
        assert_eq!(MENU_ORDER.first(), Some(&BucketKey::Decayed));
        assert_eq!(MENU_ORDER.last(), Some(&BucketKey::LastLevel));
    }
}
