use std::fs;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};

use leveljumper::engine::skill::SkillRecord;

const LEVELS: i64 = 5;
const OUT_DIR: &str = "demo-states";

// ── Helpers ──────────────────────────────────────────────────────────────

/// Progress falls off along the tree: early rows are further along than late ones.
fn make_tree(rng: &mut SmallRng, rows: i64, unlocked_rows: i64, decay_chance: f64) -> Vec<SkillRecord> {
    let mut skills = Vec::new();
    for row in 0..rows {
        let per_row = if row % 3 == 1 { 2 } else { 1 };
        for _ in 0..per_row {
            let accessible = row < unlocked_rows;
            let finished_levels = if !accessible {
                0
            } else {
                let ceiling = LEVELS as f64 * (1.0 - row as f64 / unlocked_rows.max(1) as f64);
                rng.gen_range(0..=(ceiling.round() as i64).min(LEVELS))
            };
            let decayed = accessible && finished_levels > 0 && rng.gen_bool(decay_chance);
            skills.push(SkillRecord {
                row,
                finished_levels,
                levels: LEVELS,
                accessible,
                decayed,
                name: Some(format!("Skill {}", skills.len() + 1)),
            });
        }
    }
    skills
}

/// Host documents key skills by id, so emit the object form.
fn make_state(learning: &str, from: &str, skills: &[SkillRecord]) -> Value {
    let mut by_id = Map::new();
    for (i, skill) in skills.iter().enumerate() {
        let mut value = serde_json::to_value(skill).unwrap();
        let id = format!("{learning}-{i:03}");
        value["id"] = Value::String(id.clone());
        by_id.insert(id, value);
    }
    json!({
        "generatedAt": Utc::now().to_rfc3339(),
        "user": {
            "learningLanguage": learning,
            "fromLanguage": from,
        },
        "skills": by_id,
    })
}

// ── Profiles ─────────────────────────────────────────────────────────────

fn build_fresh() -> Value {
    let mut rng = SmallRng::seed_from_u64(1);
    make_state("de", "en", &make_tree(&mut rng, 12, 1, 0.0))
}

fn build_midway() -> Value {
    let mut rng = SmallRng::seed_from_u64(2);
    make_state("fr", "en", &make_tree(&mut rng, 30, 14, 0.1))
}

fn build_decayed() -> Value {
    let mut rng = SmallRng::seed_from_u64(3);
    make_state("es", "de", &make_tree(&mut rng, 24, 20, 0.5))
}

fn build_complete() -> Value {
    let skills: Vec<SkillRecord> = (0..20)
        .map(|row| SkillRecord {
            row,
            finished_levels: if row % 4 == 0 { LEVELS - 1 } else { LEVELS },
            levels: LEVELS,
            accessible: true,
            decayed: false,
            name: Some(format!("Skill {}", row + 1)),
        })
        .collect();
    make_state("it", "en", &skills)
}

fn main() {
    fs::create_dir_all(OUT_DIR).unwrap();

    let states: Vec<(&str, Value)> = vec![
        ("01-fresh", build_fresh()),
        ("02-midway", build_midway()),
        ("03-decayed", build_decayed()),
        ("04-legendary-pending", build_complete()),
    ];

    for (name, state) in &states {
        let json = serde_json::to_string_pretty(state).unwrap();
        let path = format!("{OUT_DIR}/{name}.json");
        fs::write(&path, &json).unwrap();
        println!("Wrote {path} ({} bytes)", json.len());
    }

    println!("\nGenerated {} demo states.", states.len());
}
