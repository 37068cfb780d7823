//! Plain-text export of accumulated analysis results.

pub mod writer;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::session::{AnalysisMode, AnalysisResult, Session};

pub use writer::ExportWriter;

const DIVIDER_WIDTH: usize = 60;

/// Line separating two result sections.
pub fn divider() -> String {
    "=".repeat(DIVIDER_WIDTH)
}

/// A rendered export, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub contents: String,
}

pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.txt", prefix, date.format("%Y-%m-%d"))
}

pub fn prefix_for(mode: AnalysisMode, config: &ExportConfig) -> &str {
    match mode {
        AnalysisMode::Documents => &config.document_prefix,
        AnalysisMode::Checklist => &config.checklist_prefix,
    }
}

fn format_section(result: &AnalysisResult) -> String {
    let mut section = format!(
        "{}\nAnalyzed: {}\n",
        result.source,
        result.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(confirmed) = result.confirmed {
        section.push_str(&format!(
            "Confirmed: {}\n",
            if confirmed { "YES" } else { "NO" }
        ));
    }
    section.push_str("Analysis:\n");
    section.push_str(result.analysis.trim_end());
    section
}

/// Renders one section per result, in order, separated by divider lines.
pub fn format_results(results: &[AnalysisResult]) -> Result<String, ExportError> {
    if results.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let separator = format!("\n\n{}\n\n", divider());
    let sections: Vec<String> = results.iter().map(format_section).collect();

    let mut contents = sections.join(&separator);
    contents.push('\n');
    Ok(contents)
}

/// Renders the session's results and writes them into `directory`.
pub fn write_report(
    session: &Session,
    config: &ExportConfig,
    directory: &Path,
    date: NaiveDate,
) -> crate::Result<PathBuf> {
    let artifact = export(session.results(), prefix_for(session.mode(), config), date)?;
    let path = ExportWriter::new(directory).write(&artifact)?;
    Ok(path)
}

pub fn export(
    results: &[AnalysisResult],
    prefix: &str,
    date: NaiveDate,
) -> Result<ExportArtifact, ExportError> {
    let contents = format_results(results)?;
    Ok(ExportArtifact {
        filename: export_filename(prefix, date),
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ResultSource;

    fn document_result(name: &str, analysis: &str) -> AnalysisResult {
        AnalysisResult::new(
            ResultSource::Document {
                item_id: format!("id-{}", name),
                name: name.to_string(),
            },
            analysis.to_string(),
            None,
        )
    }

    #[test]
    fn test_empty_results_fail() {
        assert!(matches!(
            format_results(&[]),
            Err(ExportError::NothingToExport)
        ));
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(export(&[], "document-analysis", date).is_err());
    }

    #[test]
    fn test_sections_in_order() {
        let results = vec![
            document_result("first.pdf", "Summary one"),
            document_result("second.docx", "Summary two"),
            document_result("third.pdf", "Summary three"),
        ];

        let contents = format_results(&results).unwrap();
        let sections: Vec<&str> = contents.split(&divider()).collect();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].contains("Document: first.pdf"));
        assert!(sections[1].contains("Document: second.docx"));
        assert!(sections[2].contains("Summary three"));
        assert!(!contents.contains("Confirmed:"));
    }

    #[test]
    fn test_question_section_includes_confirmation() {
        let result = AnalysisResult::new(
            ResultSource::Question {
                id: 4,
                text: "Do you produce risk assessments?".to_string(),
            },
            "CONFIRMATION: NO\nANALYSIS: none found".to_string(),
            Some(false),
        );

        let contents = format_results(&[result]).unwrap();
        assert!(contents.starts_with("Question 4: Do you produce risk assessments?\n"));
        assert!(contents.contains("Confirmed: NO\n"));
        assert!(contents.contains("Analysis:\nCONFIRMATION: NO\nANALYSIS: none found"));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_filename("health-safety-analysis", date),
            "health-safety-analysis-2024-03-09.txt"
        );

        let artifact = export(&[document_result("a.pdf", "x")], "document-analysis", date).unwrap();
        assert_eq!(artifact.filename, "document-analysis-2024-03-09.txt");
    }

    #[test]
    fn test_prefix_for_mode() {
        let config = ExportConfig::default();
        assert_eq!(
            prefix_for(AnalysisMode::Documents, &config),
            "document-analysis"
        );
        assert_eq!(
            prefix_for(AnalysisMode::Checklist, &config),
            "health-safety-analysis"
        );
    }
}
