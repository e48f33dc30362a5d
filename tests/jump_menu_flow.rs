use std::fs;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use leveljumper::engine::bucket::{BucketKey, MENU_ORDER};
use leveljumper::engine::classifier::{ClassifyOptions, classify};
use leveljumper::engine::skill::{LanguagePair, SkillId, SkillRecord, StateSnapshot};
use leveljumper::engine::target::{JumpTarget, resolve_target};
use leveljumper::error::Result;
use leveljumper::session::lifecycle::{HostPage, LifecycleController, LifecycleState, Transition};
use leveljumper::store::context_store::{ContextField, PersistedContext, store_key};
use leveljumper::store::kv_store::{JsonKvStore, KeyValueStore};

const STATE: &str = r#"{
    "user": {"learningLanguage": "de", "fromLanguage": "en"},
    "skills": {
        "a": {"row": 0, "finishedLevels": 2, "levels": 5, "accessible": true},
        "b": {"row": 1, "finishedLevels": 5, "levels": 5, "accessible": true},
        "c": {"row": 2, "finishedLevels": 4, "levels": 5, "accessible": true, "decayed": false},
        "d": {"row": 3, "finishedLevels": 1, "levels": 5, "accessible": true, "decayed": true},
        "e": {"row": 4, "finishedLevels": 0, "levels": 5, "accessible": true},
        "f": {"row": 5, "finishedLevels": 0, "levels": 5, "accessible": false}
    }
}"#;

struct Page {
    path: &'static str,
    json: String,
}

impl HostPage for Page {
    fn location_path(&self) -> &str {
        self.path
    }

    fn has_skill_elements(&self) -> bool {
        true
    }

    fn read_snapshot(&self) -> Result<StateSnapshot> {
        StateSnapshot::from_json(&self.json)
    }
}

fn learn_page() -> Page {
    Page {
        path: "/learn",
        json: STATE.to_string(),
    }
}

fn open_store(dir: &TempDir) -> JsonKvStore {
    JsonKvStore::with_base_dir(dir.path().to_path_buf()).unwrap()
}

fn random_tree(rng: &mut SmallRng, len: usize) -> Vec<SkillRecord> {
    (0..len)
        .map(|i| {
            let levels = rng.gen_range(0..=6);
            SkillRecord {
                row: i as i64,
                finished_levels: rng.gen_range(0..=levels),
                levels,
                accessible: rng.gen_bool(0.8),
                decayed: rng.gen_bool(0.2),
                name: None,
            }
        })
        .collect()
}

#[test]
fn test_reference_example() {
    let snap = StateSnapshot::from_json(STATE).unwrap();
    let c = classify(&snap.skills, &SkillId::from_raw(""), &ClassifyOptions::default());

    let head = |k| c.head(k).map(|s| s.id.as_str().to_string());
    assert_eq!(head(BucketKey::Level(2)).as_deref(), Some("LevelJumper_0"));
    assert_eq!(head(BucketKey::Crown).as_deref(), Some("LevelJumper_1"));
    assert_eq!(head(BucketKey::FinalLevel).as_deref(), Some("LevelJumper_2"));

    assert_eq!(
        resolve_target(&snap.skills[2], &c.rows),
        JumpTarget::Anchor(SkillId::from_raw("LevelJumper_1"))
    );
    assert_eq!(resolve_target(&snap.skills[0], &c.rows), JumpTarget::ScrollToTop);
}

#[test]
fn test_menu_follows_fixed_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let mut lc = LifecycleController::new("/learn", ClassifyOptions::default());
    lc.on_page_changed(&learn_page(), &store).unwrap();

    let menu = lc.session().unwrap().menu.clone().unwrap();
    let order: Vec<BucketKey> = menu.entries.iter().map(|e| e.bucket).collect();
    assert_eq!(
        order,
        vec![
            BucketKey::Decayed,
            BucketKey::FinalLevel,
            BucketKey::Level(2),
            BucketKey::Level(0),
        ]
    );
    let positions: Vec<usize> = order
        .iter()
        .map(|b| MENU_ORDER.iter().position(|m| m == b).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_click_persists_and_survives_reload() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let mut lc = LifecycleController::new("/learn", ClassifyOptions::default());
    lc.on_page_changed(&learn_page(), &store).unwrap();

    // the locked skill is clickable too
    let clicked = SkillId::from_raw("LevelJumper_5");
    let outcome = lc.on_skill_activated(&clicked, &mut store).unwrap();
    assert!(outcome.persisted);
    assert!(!outcome.menu_updated, "no lastLevel entry existed to update");
    assert_eq!(
        lc.session().unwrap().classification.last_level().unwrap().id,
        clicked
    );

    let raw = fs::read_to_string(dir.path().join("store.json")).unwrap();
    assert!(raw.contains("LevelJumper-lastLevel-de_en"));

    // a fresh process sees the click
    let reopened = open_store(&dir);
    let key = store_key(ContextField::LastLevel, &LanguagePair::new("de", "en"));
    assert_eq!(reopened.get(&key).unwrap().as_deref(), Some("LevelJumper_5"));
    let ctx = PersistedContext::load(&reopened, &LanguagePair::new("de", "en"));
    assert_eq!(ctx.last_level, clicked);
}

#[test]
fn test_reload_offers_last_opened_entry() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let mut lc = LifecycleController::new("/learn", ClassifyOptions::default());
    lc.on_page_changed(&learn_page(), &store).unwrap();
    lc.on_skill_activated(&SkillId::from_raw("LevelJumper_3"), &mut store);

    let store = open_store(&dir);
    let mut lc = LifecycleController::new("/learn", ClassifyOptions::default());
    assert_eq!(lc.on_page_changed(&learn_page(), &store).unwrap(), Transition::Indexed);
    let menu = lc.session().unwrap().menu.clone().unwrap();
    let last = menu.entry(BucketKey::LastLevel).unwrap();
    assert_eq!(last.label, "3");
    assert_eq!(last.target, JumpTarget::Anchor(SkillId::from_raw("LevelJumper_2")));
}

#[test]
fn test_menu_entry_retargets_in_place_after_click() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let lang = LanguagePair::new("de", "en");
    store
        .set(&store_key(ContextField::LastLevel, &lang), "LevelJumper_4")
        .unwrap();

    let mut lc = LifecycleController::new("/learn", ClassifyOptions::default());
    lc.on_page_changed(&learn_page(), &store).unwrap();
    let before = lc.session().unwrap().menu.clone().unwrap();

    lc.on_skill_activated(&SkillId::from_raw("LevelJumper_0"), &mut store)
        .unwrap();
    let after = lc.session().unwrap().menu.clone().unwrap();

    assert_eq!(before.len(), after.len());
    let last = after.entry(BucketKey::LastLevel).unwrap();
    assert_eq!(last.label, "0");
    assert_eq!(last.target, JumpTarget::ScrollToTop);
    assert_eq!(
        before.entry(BucketKey::Decayed),
        after.entry(BucketKey::Decayed)
    );
}

#[test]
fn test_navigation_away_resets() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let mut lc = LifecycleController::new("/learn", ClassifyOptions::default());
    lc.on_page_changed(&learn_page(), &store).unwrap();

    let away = Page {
        path: "/shop",
        json: STATE.to_string(),
    };
    assert_eq!(lc.on_page_changed(&away, &store).unwrap(), Transition::Reset);
    assert_eq!(lc.state(), LifecycleState::Unindexed);
}

#[test]
fn test_random_trees_respect_bucket_invariants() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    for round in 0..50 {
        let skills = random_tree(&mut rng, 40);
        let last = SkillId::new("LevelJumper", rng.gen_range(0..40));
        let options = ClassifyOptions::default();
        let c = classify(&skills, &last, &options);

        assert!(c.bucket(BucketKey::LastLevel).len() <= 1, "round {round}");
        assert_eq!(c.rows.len(), skills.len());

        for s in c.skills.iter().filter(|s| s.record.accessible) {
            let count = BucketKey::primary()
                .into_iter()
                .filter(|&k| c.bucket(k).iter().any(|m| m.id == s.id))
                .count();
            assert_eq!(count, 1, "round {round}: {} in {count} buckets", s.id);
        }
        for s in c.skills.iter().filter(|s| !s.record.accessible) {
            assert_eq!(c.primary_bucket_of(&s.id), None);
        }

        for s in &c.skills {
            let expected = match s.record.row {
                0 => JumpTarget::ScrollToTop,
                row => JumpTarget::Anchor(SkillId::new("LevelJumper", (row - 1) as usize)),
            };
            assert_eq!(resolve_target(&s.record, &c.rows), expected);
        }

        assert_eq!(c, classify(&skills, &last, &options));
    }
}
