use crate::analyzer::DepartmentAnalysis;
use crate::models::{format_currency, format_number, DepartmentTable, RecommendationKind};
use crate::session::DashboardView;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const DEPARTMENT_CSV: &str = "department_analysis.csv";
pub const RECOMMENDATIONS_TXT: &str = "recommendations.txt";
pub const CHART_DATA_TXT: &str = "chart_data.txt";
pub const AI_INSIGHTS_TXT: &str = "ai_insights.txt";

pub fn render_key_metrics(analysis: &DepartmentAnalysis) -> String {
    let summary = &analysis.summary;
    format!(
        "Total Students: {}\nTotal Faculty: {}\nTotal Budget: {}\n",
        format_number(summary.total_students),
        format_number(summary.total_faculty),
        format_currency(summary.total_budget)
    )
}

pub fn render_table(table: &DepartmentTable) -> String {
    let width = table
        .records()
        .iter()
        .map(|r| r.department.chars().count())
        .max()
        .unwrap_or(0)
        .max("Department".len());

    let mut content = format!(
        "{:<width$}  {:>10}  {:>8}  {:>16}  {:>21}  {:>18}\n",
        "Department",
        "Students",
        "Faculty",
        "Budget",
        "Student-Faculty Ratio",
        "Budget per Student",
        width = width
    );
    for record in table.records() {
        content.push_str(&format!(
            "{:<width$}  {:>10}  {:>8}  {:>16}  {:>21.2}  {:>18.2}\n",
            record.department,
            format_number(record.students),
            format_number(record.faculty),
            format_currency(record.budget),
            record.student_faculty_ratio,
            record.budget_per_student,
            width = width
        ));
    }
    content
}

pub fn render_recommendations(analysis: &DepartmentAnalysis) -> String {
    if analysis.recommendations.is_empty() {
        return "✅ No issues found. All departments are within thresholds.\n".to_string();
    }

    let mut content = String::new();
    for recommendation in &analysis.recommendations {
        content.push_str(recommendation.as_str());
        content.push('\n');
    }
    content
}

pub fn render_chart_data(analysis: &DepartmentAnalysis) -> String {
    let mut content = String::new();
    content.push_str("Student-Faculty Ratio by Department\n");
    content.push_str("===================================\n");
    for (department, ratio) in &analysis.ratio_series {
        content.push_str(&format!("{}: {:.1}\n", department, ratio));
    }

    content.push_str("\nBudget Distribution Across Departments\n");
    content.push_str("======================================\n");
    for share in &analysis.budget_distribution {
        content.push_str(&format!(
            "{}: {} ({:.1}%)\n",
            share.department,
            format_currency(share.budget),
            share.share * 100.0
        ));
    }
    content
}

pub fn print_dashboard(view: &DashboardView) {
    println!("\n🎓 University Decision Support System");
    println!("=====================================");
    println!("📂 Source: {}\n", view.source);
    print!("{}", render_key_metrics(&view.analysis));

    println!("\n📊 Department Analysis");
    print!("{}", render_table(&view.table));
    println!();
    print!("{}", render_chart_data(&view.analysis));

    println!("\n📝 Recommendations");
    print!("{}", render_recommendations(&view.analysis));
}

pub fn write_reports(view: &DashboardView, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    clean_output_directory(output_dir)?;

    write_department_csv(&view.table, output_dir)?;

    let mut recommendations = String::new();
    recommendations.push_str("Recommendations\n");
    recommendations.push_str("===============\n\n");
    recommendations.push_str(&render_key_metrics(&view.analysis));
    let staffing = view
        .analysis
        .recommendations
        .iter()
        .filter(|r| r.kind == RecommendationKind::HighRatio)
        .count();
    recommendations.push_str(&format!(
        "Staffing advisories: {}\nBudget advisories: {}\n\n",
        staffing,
        view.analysis.recommendations.len() - staffing
    ));
    recommendations.push_str(&render_recommendations(&view.analysis));
    fs::write(output_dir.join(RECOMMENDATIONS_TXT), recommendations)?;

    fs::write(output_dir.join(CHART_DATA_TXT), render_chart_data(&view.analysis))?;

    info!("reports written to {}", output_dir.display());
    Ok(())
}

pub fn write_insights(text: &str, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join(AI_INSIGHTS_TXT), format!("{}\n", text))
        .context("Failed to write AI insights")?;
    Ok(())
}

fn write_department_csv(table: &DepartmentTable, output_dir: &Path) -> Result<()> {
    let csv_path = output_dir.join(DEPARTMENT_CSV);
    let mut writer = Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;

    for record in table.records() {
        writer.serialize(record)?;
    }

    // serialize() only emits headers alongside the first row
    if table.is_empty() {
        writer.write_record([
            "Department",
            "Students",
            "Faculty",
            "Budget",
            "Student-Faculty Ratio",
            "Budget per Student",
        ])?;
    }

    writer.flush()?;
    Ok(())
}

// Remove report files from a previous run
fn clean_output_directory(output_dir: &Path) -> Result<()> {
    let items_to_clean = [DEPARTMENT_CSV, RECOMMENDATIONS_TXT, CHART_DATA_TXT, AI_INSIGHTS_TXT];

    for item in &items_to_clean {
        let item_path = output_dir.join(item);
        if item_path.is_file() {
            fs::remove_file(&item_path)?;
            debug!("removed previous {}", item);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze, derive_metrics};
    use crate::models::DepartmentRow;

    fn view() -> DashboardView {
        let table = derive_metrics(vec![
            DepartmentRow {
                department: "CS".to_string(),
                students: 1000.0,
                faculty: 20.0,
                budget: 500000.0,
            },
            DepartmentRow {
                department: "Math".to_string(),
                students: 300.0,
                faculty: 25.0,
                budget: 100000.0,
            },
        ])
        .unwrap();
        let analysis = analyze(&table);
        DashboardView {
            source: "test".to_string(),
            table,
            analysis,
        }
    }

    #[test]
    fn key_metrics_match_dashboard_tiles() {
        assert_eq!(
            render_key_metrics(&view().analysis),
            "Total Students: 1300\nTotal Faculty: 45\nTotal Budget: $600,000.00\n"
        );
    }

    #[test]
    fn chart_data_lists_both_series() {
        let text = render_chart_data(&view().analysis);
        assert!(text.contains("CS: 50.0\n"));
        assert!(text.contains("Math: 12.0\n"));
        assert!(text.contains("CS: $500,000.00 (83.3%)\n"));
        assert!(text.contains("Math: $100,000.00 (16.7%)\n"));
    }

    #[test]
    fn writes_derived_table_with_column_names() {
        let dir = tempfile::tempdir().unwrap();
        write_reports(&view(), dir.path()).unwrap();

        let csv = fs::read_to_string(dir.path().join(DEPARTMENT_CSV)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Department,Students,Faculty,Budget,Student-Faculty Ratio,Budget per Student")
        );
        assert!(lines.next().unwrap().starts_with("CS,1000.0,20.0,500000.0,50.0,500.0"));
        assert_eq!(lines.count(), 1);

        let recs = fs::read_to_string(dir.path().join(RECOMMENDATIONS_TXT)).unwrap();
        assert!(recs.contains("High student-faculty ratio in CS (50.0:1)"));
        assert!(recs.contains("Staffing advisories: 1\nBudget advisories: 0\n"));
        assert!(dir.path().join(CHART_DATA_TXT).is_file());
    }

    #[test]
    fn rewriting_reports_drops_stale_insights() {
        let dir = tempfile::tempdir().unwrap();
        write_insights("old narrative", dir.path()).unwrap();
        write_reports(&view(), dir.path()).unwrap();
        assert!(!dir.path().join(AI_INSIGHTS_TXT).exists());
    }

    #[test]
    fn empty_table_still_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        write_department_csv(&DepartmentTable::default(), dir.path()).unwrap();
        let csv = fs::read_to_string(dir.path().join(DEPARTMENT_CSV)).unwrap();
        assert!(csv.starts_with("Department,Students,"));
    }
}
