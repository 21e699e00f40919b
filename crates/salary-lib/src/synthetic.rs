//! Synthetic corpus generation
//!
//! When too few real records survive salary parsing, the training pass
//! tops the corpus up with generated records so the pipeline never
//! starves. Salaries come from multiplicative factor tables per bucket
//! with a small jitter, rendered back into parseable range strings.

use crate::models::JobRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Base monthly salary all factors multiply into
const BASE_SALARY: f64 = 10_000.0;

const EXPERIENCE_FACTORS: [(&str, f64); 5] = [
    ("应届", 0.7),
    ("1-3年", 1.0),
    ("3-5年", 1.5),
    ("5-10年", 2.2),
    ("10年以上", 3.0),
];

const EDUCATION_FACTORS: [(&str, f64); 4] = [
    ("大专", 0.9),
    ("本科", 1.0),
    ("硕士", 1.4),
    ("博士", 1.8),
];

const LOCATION_FACTORS: [(&str, f64); 10] = [
    ("北京", 1.3),
    ("上海", 1.25),
    ("深圳", 1.2),
    ("广州", 1.1),
    ("杭州", 1.15),
    ("成都", 0.9),
    ("武汉", 0.85),
    ("西安", 0.8),
    ("南京", 0.95),
    ("其他", 0.8),
];

const INDUSTRY_FACTORS: [(&str, f64); 10] = [
    ("互联网", 1.2),
    ("金融", 1.15),
    ("人工智能", 1.3),
    ("医疗健康", 1.05),
    ("教育培训", 0.9),
    ("电子商务", 1.1),
    ("云计算", 1.25),
    ("软件服务", 1.1),
    ("游戏", 1.15),
    ("移动互联网", 1.18),
];

const COMPANY_SIZES: [&str; 7] = [
    "少于20人",
    "20-99人",
    "100-499人",
    "500-999人",
    "1000-4999人",
    "5000-9999人",
    "10000人以上",
];

/// Generate `count` synthetic job records with plausible salary strings
pub fn generate_corpus(count: usize, seed: u64) -> Vec<JobRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let records: Vec<JobRecord> = (0..count).map(|i| generate_record(i, &mut rng)).collect();
    debug!(count = records.len(), seed, "Generated synthetic corpus");
    records
}

fn generate_record(index: usize, rng: &mut StdRng) -> JobRecord {
    let (experience, exp_factor) = EXPERIENCE_FACTORS[rng.gen_range(0..EXPERIENCE_FACTORS.len())];
    let (education, edu_factor) = EDUCATION_FACTORS[rng.gen_range(0..EDUCATION_FACTORS.len())];
    let (location, loc_factor) = LOCATION_FACTORS[rng.gen_range(0..LOCATION_FACTORS.len())];
    let (industry, ind_factor) = INDUSTRY_FACTORS[rng.gen_range(0..INDUSTRY_FACTORS.len())];
    let (company_type, _) = INDUSTRY_FACTORS[rng.gen_range(0..INDUSTRY_FACTORS.len())];
    let company_size = COMPANY_SIZES[rng.gen_range(0..COMPANY_SIZES.len())];

    // ±5% jitter around the factor product
    let jitter = 0.95 + rng.gen::<f64>() * 0.1;
    let salary = BASE_SALARY * exp_factor * edu_factor * loc_factor * ind_factor * jitter;

    JobRecord {
        job_title: format!("样本职位{index}"),
        company_name: format!("样本公司{index}"),
        location: location.to_string(),
        experience: experience.to_string(),
        education: education.to_string(),
        salary: format_salary_text(salary),
        company_type: company_type.to_string(),
        company_size: company_size.to_string(),
        industry: industry.to_string(),
        skills: "Python,Java,SQL".to_string(),
    }
}

/// Render a point salary as the kind of range string found in real
/// postings: ±10% bounds in 万 above 10000 and in k below
fn format_salary_text(salary: f64) -> String {
    if salary >= 10_000.0 {
        let min = (salary * 0.9 / 10_000.0 * 10.0).floor() / 10.0;
        let max = (salary * 1.1 / 10_000.0 * 10.0).floor() / 10.0;
        format!("{min:.1}-{max:.1}万")
    } else {
        let min = (salary * 0.9 / 1_000.0).floor();
        let max = (salary * 1.1 / 1_000.0).floor();
        format!("{min:.0}-{max:.0}k")
    }
}
