use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Data source configuration
    pub data_file: Option<String>,
    pub sample_data_file: Option<String>,
    pub output_directory: Option<String>,
    pub narrative: NarrativeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            sample_data_file: Some("sample_data.csv".to_string()),
            output_directory: Some("output".to_string()),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// One department as read from the uploaded CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRow {
    pub department: String,
    pub students: f64,
    pub faculty: f64,
    pub budget: f64,
}

/// A department together with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Students")]
    pub students: f64,
    #[serde(rename = "Faculty")]
    pub faculty: f64,
    #[serde(rename = "Budget")]
    pub budget: f64,
    #[serde(rename = "Student-Faculty Ratio")]
    pub student_faculty_ratio: f64,
    #[serde(rename = "Budget per Student")]
    pub budget_per_student: f64,
}

/// Departments in upload order. Only built by `analyzer::derive_metrics`,
/// so every record carries both derived columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentTable {
    records: Vec<DepartmentRecord>,
}

impl DepartmentTable {
    pub(crate) fn from_records(records: Vec<DepartmentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DepartmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationKind {
    HighRatio,
    LowBudget,
}

/// A single advisory tied to one department.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub department: String,
    text: String,
}

impl Recommendation {
    pub fn high_ratio(department: &str, ratio: f64) -> Self {
        Self {
            kind: RecommendationKind::HighRatio,
            department: department.to_string(),
            text: format!(
                "🚨 High student-faculty ratio in {} ({:.1}:1). Consider hiring more faculty.",
                department, ratio
            ),
        }
    }

    pub fn low_budget(department: &str, budget_per_student: f64) -> Self {
        Self {
            kind: RecommendationKind::LowBudget,
            department: department.to_string(),
            text: format!(
                "💰 Low budget per student in {} (${:.2}). Consider budget increase.",
                department, budget_per_student
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_students: f64,
    pub total_faculty: f64,
    pub total_budget: f64,
    /// `None` when the table has no rows.
    pub mean_ratio: Option<f64>,
}

/// Aggregate figures handed to the narrative prompt, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeSummary {
    pub total_students: String,
    pub mean_ratio: String,
    pub total_budget: String,
}

impl NarrativeSummary {
    pub fn from_stats(stats: &SummaryStats) -> Self {
        Self {
            total_students: format_number(stats.total_students),
            mean_ratio: stats
                .mean_ratio
                .map(|ratio| format!("{:.1}", ratio))
                .unwrap_or_else(|| "n/a".to_string()),
            total_budget: format_currency(stats.total_budget),
        }
    }
}

/// Whole numbers print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Format as dollars with thousands separators, e.g. `$1,234.56`.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
