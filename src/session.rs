use crate::analyzer::{self, DepartmentAnalysis};
use crate::error::DataError;
use crate::loader::TableLoader;
use crate::models::{DepartmentRow, DepartmentTable, NarrativeSummary};
use crate::narrative::{CompletionClient, NarrativeRequester};
use std::path::PathBuf;
use tracing::{error, info};

pub const UPLOAD_HINT: &str = "👆 Upload a CSV file to get started! The file should contain columns for Department, Students, Faculty, and Budget.";

/// One user interaction with the dashboard.
#[derive(Debug, Clone)]
pub enum UserAction {
    Upload { name: String, bytes: Vec<u8> },
    UseSampleData,
    RequestInsights,
}

#[derive(Debug, Clone)]
pub enum Response {
    Dashboard(DashboardView),
    Insights(String),
    Info(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub source: String,
    pub table: DepartmentTable,
    pub analysis: DepartmentAnalysis,
}

/// Owns the current table for one user. Each upload replaces it wholesale.
pub struct Session<C: CompletionClient> {
    loader: TableLoader,
    narrator: NarrativeRequester<C>,
    sample_path: Option<PathBuf>,
    table: Option<DepartmentTable>,
}

impl<C: CompletionClient> Session<C> {
    pub fn new(narrator: NarrativeRequester<C>, sample_path: Option<PathBuf>) -> Self {
        Self {
            loader: TableLoader::new(),
            narrator,
            sample_path,
            table: None,
        }
    }

    pub fn table(&self) -> Option<&DepartmentTable> {
        self.table.as_ref()
    }

    pub async fn handle(&mut self, action: UserAction) -> Response {
        match action {
            UserAction::Upload { name, bytes } => {
                let loaded = self.loader.load_bytes(&bytes);
                self.replace_table(name, loaded)
            }
            UserAction::UseSampleData => {
                let loaded = self.loader.load_sample(self.sample_path.as_deref());
                self.replace_table("sample data".to_string(), loaded)
            }
            UserAction::RequestInsights => match &self.table {
                Some(table) => {
                    let summary = NarrativeSummary::from_stats(&analyzer::summarize(table));
                    Response::Insights(self.narrator.request_narrative(&summary).await)
                }
                None => Response::Info(UPLOAD_HINT.to_string()),
            },
        }
    }

    fn replace_table(
        &mut self,
        source: String,
        loaded: Result<Vec<DepartmentRow>, DataError>,
    ) -> Response {
        // a failed upload leaves nothing on screen
        self.table = None;

        match loaded.and_then(analyzer::derive_metrics) {
            Ok(table) => {
                info!("loaded {} departments from {}", table.len(), source);
                let analysis = analyzer::analyze(&table);
                self.table = Some(table.clone());
                Response::Dashboard(DashboardView {
                    source,
                    table,
                    analysis,
                })
            }
            Err(e) => {
                error!("failed to process {}: {}", source, e);
                Response::Error(format!("Error processing file: {}", e))
            }
        }
    }
}
