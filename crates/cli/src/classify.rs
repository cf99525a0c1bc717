//! `glx classify` - category detection for upload batches.

use std::path::Path;

use grandlivre_fusion::{check_batch, Classifier, FileCategory};

use crate::exit_codes::EXIT_BATCH_CHECK_FAILED;
use crate::{config, to_json, CliError};

pub fn cmd_classify(
    config_path: Option<&Path>,
    files: Vec<String>,
    json: bool,
    check: bool,
) -> Result<(), CliError> {
    let config = config::load(config_path)?;
    let classifier = Classifier::new(&config.classifier.keywords);

    // Paths are accepted; only the final component is scored.
    let names: Vec<String> = files.iter().map(|f| file_name(f)).collect();
    let report = check_batch(&classifier, &names);

    if json {
        if check {
            println!("{}", to_json(&report)?);
        } else {
            println!("{}", to_json(&report.files)?);
        }
    } else {
        for c in &report.files {
            println!("{}\t{}", c.category.key(), c.file);
        }
    }

    if !check {
        return Ok(());
    }
    if report.ok {
        eprintln!("batch ok: {} categories assigned", report.assignments.len());
        return Ok(());
    }

    let mut problems = Vec::new();
    if !report.missing.is_empty() {
        problems.push(format!("missing {}", join_categories(&report.missing)));
    }
    for (category, list) in &report.duplicates {
        problems.push(format!("{} claimed by {} files", category, list.len()));
    }
    Err(CliError::new(
        EXIT_BATCH_CHECK_FAILED,
        format!("batch check failed: {}", problems.join("; ")),
    )
    .with_hint("rename the files so each category appears exactly once"))
}

fn file_name(arg: &str) -> String {
    Path::new(arg)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(arg)
        .to_string()
}

fn join_categories(categories: &[FileCategory]) -> String {
    categories
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_file_name_is_scored() {
        assert_eq!(file_name("exports/2024/GL tiers.xlsx"), "GL tiers.xlsx");
        assert_eq!(file_name("plan_tiers.csv"), "plan_tiers.csv");
    }

    #[test]
    fn categories_are_listed_by_name() {
        assert_eq!(
            join_categories(&[FileCategory::PlanTiers, FileCategory::CodeJournal]),
            "Plan Tiers, Code Journal"
        );
    }
}
