//! Core data models for the salary engine

use serde::{Deserialize, Serialize};

/// A job posting row as supplied by the storage collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub company_type: String,
    #[serde(default)]
    pub company_size: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub skills: String,
}

/// Placeholder token for fields missing from a record or query
pub const MISSING_TOKEN: &str = "Unknown";

/// A partially specified job description submitted for inference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobQuery {
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub company_type: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
}

impl JobQuery {
    /// Fill missing fields with the placeholder token so encoding never
    /// has to reject a partial query
    pub fn to_record(&self) -> JobRecord {
        let fill = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(MISSING_TOKEN)
                .to_string()
        };
        JobRecord {
            job_title: fill(&self.job_title),
            location: fill(&self.location),
            experience: fill(&self.experience),
            education: fill(&self.education),
            company_type: fill(&self.company_type),
            company_size: fill(&self.company_size),
            industry: fill(&self.industry),
            ..JobRecord::default()
        }
    }
}

/// API-facing prediction result with a display-formatted range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryPrediction {
    pub success: bool,
    pub predicted_salary: f64,
    pub salary_range: String,
    pub min_salary: f64,
    pub max_salary: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_fills_missing_fields() {
        let query = JobQuery {
            location: Some("北京".to_string()),
            experience: Some("".to_string()),
            ..JobQuery::default()
        };
        let record = query.to_record();
        assert_eq!(record.location, "北京");
        assert_eq!(record.experience, MISSING_TOKEN);
        assert_eq!(record.education, MISSING_TOKEN);
        assert_eq!(record.industry, MISSING_TOKEN);
    }

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: JobRecord =
            serde_json::from_str(r#"{"job_title": "后端工程师", "salary": "15k-25k"}"#).unwrap();
        assert_eq!(record.salary, "15k-25k");
        assert!(record.location.is_empty());
    }
}
