use crate::error::DataError;
use crate::models::{
    DepartmentRecord, DepartmentRow, DepartmentTable, Recommendation, SummaryStats,
};

/// Ratios above this call for more faculty.
pub const HIGH_RATIO_THRESHOLD: f64 = 30.0;
/// Budget per student below this share of the table mean is flagged.
pub const LOW_BUDGET_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetShare {
    pub department: String,
    pub budget: f64,
    /// Fraction of the total budget, 0.0..=1.0
    pub share: f64,
}

/// Everything the dashboard shows for one table.
#[derive(Debug, Clone)]
pub struct DepartmentAnalysis {
    pub summary: SummaryStats,
    pub recommendations: Vec<Recommendation>,
    pub ratio_series: Vec<(String, f64)>,
    pub budget_distribution: Vec<BudgetShare>,
}

/// Compute Student-Faculty Ratio and Budget per Student for every row.
///
/// Fails on the first row whose Faculty or Students is zero; no partial
/// table is returned.
pub fn derive_metrics(rows: Vec<DepartmentRow>) -> Result<DepartmentTable, DataError> {
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        let division_by_zero = |column: &str| DataError::DivisionByZero {
            row: i + 1,
            column: column.to_string(),
            department: row.department.clone(),
        };

        if row.faculty == 0.0 {
            return Err(division_by_zero("Faculty"));
        }
        if row.students == 0.0 {
            return Err(division_by_zero("Students"));
        }

        records.push(DepartmentRecord {
            student_faculty_ratio: row.students / row.faculty,
            budget_per_student: row.budget / row.students,
            department: row.department,
            students: row.students,
            faculty: row.faculty,
            budget: row.budget,
        });
    }

    Ok(DepartmentTable::from_records(records))
}

/// Rule-based advisories in table order; ratio check before budget check
/// within a row.
pub fn generate_recommendations(table: &DepartmentTable) -> Vec<Recommendation> {
    let records = table.records();
    if records.is_empty() {
        return Vec::new();
    }

    // The threshold is global, so every row is read once before any is judged.
    let mean_budget_per_student =
        records.iter().map(|r| r.budget_per_student).sum::<f64>() / records.len() as f64;
    let budget_threshold = mean_budget_per_student * LOW_BUDGET_FACTOR;

    let mut recommendations = Vec::new();
    for record in records {
        if record.student_faculty_ratio > HIGH_RATIO_THRESHOLD {
            recommendations.push(Recommendation::high_ratio(
                &record.department,
                record.student_faculty_ratio,
            ));
        }
        if record.budget_per_student < budget_threshold {
            recommendations.push(Recommendation::low_budget(
                &record.department,
                record.budget_per_student,
            ));
        }
    }

    recommendations
}

pub fn summarize(table: &DepartmentTable) -> SummaryStats {
    let records = table.records();

    let mean_ratio = if records.is_empty() {
        None
    } else {
        Some(records.iter().map(|r| r.student_faculty_ratio).sum::<f64>() / records.len() as f64)
    };

    SummaryStats {
        total_students: records.iter().map(|r| r.students).sum(),
        total_faculty: records.iter().map(|r| r.faculty).sum(),
        total_budget: records.iter().map(|r| r.budget).sum(),
        mean_ratio,
    }
}

/// Bar chart series: ratio per department.
pub fn ratio_series(table: &DepartmentTable) -> Vec<(String, f64)> {
    table
        .records()
        .iter()
        .map(|r| (r.department.clone(), r.student_faculty_ratio))
        .collect()
}

/// Pie chart series: each department's share of the total budget.
pub fn budget_distribution(table: &DepartmentTable) -> Vec<BudgetShare> {
    let total: f64 = table.records().iter().map(|r| r.budget).sum();

    table
        .records()
        .iter()
        .map(|r| BudgetShare {
            department: r.department.clone(),
            budget: r.budget,
            share: if total > 0.0 { r.budget / total } else { 0.0 },
        })
        .collect()
}

pub fn analyze(table: &DepartmentTable) -> DepartmentAnalysis {
    DepartmentAnalysis {
        summary: summarize(table),
        recommendations: generate_recommendations(table),
        ratio_series: ratio_series(table),
        budget_distribution: budget_distribution(table),
    }
}
