//! End-to-end engine lifecycle tests: persistence round-trips, tier
//! degradation, and output bounds under extreme inputs.

use salary_lib::engine::{MAX_SALARY, MIN_SALARY};
use salary_lib::heuristic::PERTURBATION;
use salary_lib::synthetic::generate_corpus;
use salary_lib::{EngineConfig, JobQuery, PredictionEngine, Tier};
use tempfile::TempDir;

fn query(experience: &str, education: &str, location: &str, industry: &str) -> JobQuery {
    JobQuery {
        experience: Some(experience.to_string()),
        education: Some(education.to_string()),
        location: Some(location.to_string()),
        industry: Some(industry.to_string()),
        ..JobQuery::default()
    }
}

fn probe_set() -> Vec<JobQuery> {
    vec![
        query("应届", "大专", "西安", "教育培训"),
        query("1-3年", "本科", "杭州", "电子商务"),
        query("3-5年", "本科", "北京", "互联网"),
        query("5-10年", "硕士", "上海", "金融"),
        query("10年以上", "博士", "深圳", "人工智能"),
    ]
}

#[test]
fn persisted_artifact_reproduces_predictions() {
    let dir = TempDir::new().unwrap();
    let corpus = generate_corpus(100, 1);

    let first = PredictionEngine::open(EngineConfig::in_dir(dir.path()), &corpus);
    let before: Vec<f64> = probe_set()
        .iter()
        .map(|q| first.route(&q.to_record()).0)
        .collect();
    drop(first);

    // Fresh process: load from disk, never retrain
    let second = PredictionEngine::with_config(EngineConfig::in_dir(dir.path()));
    assert!(second.has_trained_tier());
    let after: Vec<f64> = probe_set()
        .iter()
        .map(|q| second.route(&q.to_record()).0)
        .collect();

    assert_eq!(before, after);
}

#[test]
fn corrupt_artifact_degrades_to_heuristic_tier() {
    let dir = TempDir::new().unwrap();
    let corpus = generate_corpus(60, 2);

    let config = EngineConfig::in_dir(dir.path());
    let engine = PredictionEngine::open(config.clone(), &corpus);
    assert!(engine.has_trained_tier());
    drop(engine);

    // Corrupt the persisted blob in place
    std::fs::write(&config.artifact_path, b"\x00\x01corrupted").unwrap();

    let degraded = PredictionEngine::with_config(config);
    assert!(!degraded.has_trained_tier());

    let record = query("3-5年", "本科", "北京", "互联网").to_record();
    let (estimate, tier) = degraded.route(&record);
    assert_eq!(tier, Tier::Heuristic);

    // Deterministic up to the documented noise band
    let center = degraded
        .heuristic()
        .estimate("3-5年", "本科", "北京", "互联网");
    assert!((estimate - center).abs() <= PERTURBATION);

    let point = degraded.predict(&query("3-5年", "本科", "北京", "互联网"));
    assert!((MIN_SALARY..=MAX_SALARY).contains(&point));
}

#[test]
fn predictions_bounded_across_extreme_factor_combinations() {
    let dir = TempDir::new().unwrap();
    let engine = PredictionEngine::open(EngineConfig::in_dir(dir.path()), &generate_corpus(80, 3));

    let experiences = ["应届", "1-3年", "3-5年", "5-10年", "10年以上", "瞎写的"];
    let educations = ["大专", "本科", "硕士", "博士", ""];
    let locations = ["北京", "其他", "火星", ""];
    let industries = ["人工智能", "教育培训", "不存在的行业", ""];

    for exp in experiences {
        for edu in educations {
            for loc in locations {
                for ind in industries {
                    let p = engine.predict(&query(exp, edu, loc, ind));
                    assert!(
                        (MIN_SALARY..=MAX_SALARY).contains(&p),
                        "out of bounds: {p} for ({exp}, {edu}, {loc}, {ind})"
                    );
                }
            }
        }
    }
}

#[test]
fn beijing_outranks_default_location_bucket_in_heuristic_tier() {
    let dir = TempDir::new().unwrap();
    let engine = PredictionEngine::with_config(EngineConfig::in_dir(dir.path()));

    let beijing = engine
        .heuristic()
        .estimate("3-5年", "本科", "北京", "互联网");
    let other = engine.heuristic().estimate("3-5年", "本科", "其他", "互联网");
    assert!(beijing > other);
}

#[test]
fn retrain_replaces_the_artifact() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::in_dir(dir.path());

    let mut engine = PredictionEngine::open(config, &generate_corpus(60, 4));
    let report = engine.retrain(&generate_corpus(100, 5));
    assert_eq!(report.parsed_rows, 100);
    assert!(engine.has_trained_tier());

    let p = engine.predict(&query("3-5年", "本科", "北京", "互联网"));
    assert!((MIN_SALARY..=MAX_SALARY).contains(&p));
}
