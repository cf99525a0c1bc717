//! File-name classifier for upload batches.
//!
//! A name is normalized, then scored against one keyword set per category:
//! the score is the summed length of every keyword found as a substring.
//! The strictly highest nonzero score wins; ties go to the category listed
//! first in [`FileCategory::ALL`].

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

use crate::config::KeywordSets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    GrandLivreComptes,
    GrandLivreTiers,
    PlanComptes,
    PlanTiers,
    CodeJournal,
    Undetected,
}

impl FileCategory {
    /// Scoring order; also the tie-break order.
    pub const ALL: [FileCategory; 5] = [
        FileCategory::GrandLivreComptes,
        FileCategory::GrandLivreTiers,
        FileCategory::PlanComptes,
        FileCategory::PlanTiers,
        FileCategory::CodeJournal,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::GrandLivreComptes => "grand_livre_comptes",
            Self::GrandLivreTiers => "grand_livre_tiers",
            Self::PlanComptes => "plan_comptes",
            Self::PlanTiers => "plan_tiers",
            Self::CodeJournal => "code_journal",
            Self::Undetected => "undetected",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GrandLivreComptes => write!(f, "Grand Livre Comptes"),
            Self::GrandLivreTiers => write!(f, "Grand Livre Tiers"),
            Self::PlanComptes => write!(f, "Plan Comptes"),
            Self::PlanTiers => write!(f, "Plan Tiers"),
            Self::CodeJournal => write!(f, "Code Journal"),
            Self::Undetected => write!(f, "undetected"),
        }
    }
}

/// Classification of one file name, with every category's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub file: String,
    pub normalized: String,
    pub category: FileCategory,
    pub scores: BTreeMap<FileCategory, usize>,
}

pub struct Classifier {
    keywords: Vec<(FileCategory, Vec<String>)>,
    separators: Regex,
}

impl Classifier {
    pub fn new(sets: &KeywordSets) -> Self {
        let keywords = FileCategory::ALL
            .iter()
            .map(|&c| {
                let list = sets
                    .for_category(c)
                    .iter()
                    .map(|k| k.to_lowercase())
                    .collect();
                (c, list)
            })
            .collect();
        Self {
            keywords,
            // Digit, underscore, hyphen and dot runs, plus any spacing around them.
            separators: Regex::new(r"[\s0-9_.\-]+").expect("static separator pattern"),
        }
    }

    pub fn normalize(&self, name: &str) -> String {
        let lower = name.to_lowercase();
        self.separators.replace_all(&lower, " ").trim().to_string()
    }

    /// Score of one category for an already-normalized name.
    pub fn score(&self, normalized: &str, category: FileCategory) -> usize {
        self.keywords
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, list)| {
                list.iter()
                    .filter(|k| normalized.contains(k.as_str()))
                    .map(|k| k.chars().count())
                    .sum()
            })
            .unwrap_or(0)
    }

    pub fn classify(&self, file_name: &str) -> Classification {
        let normalized = self.normalize(file_name);
        let mut scores = BTreeMap::new();
        let mut best = (FileCategory::Undetected, 0usize);

        for (category, _) in &self.keywords {
            let score = self.score(&normalized, *category);
            scores.insert(*category, score);
            if score > best.1 {
                best = (*category, score);
            }
        }

        Classification {
            file: file_name.to_string(),
            normalized,
            category: best.0,
            scores,
        }
    }

    pub fn category(&self, file_name: &str) -> FileCategory {
        self.classify(file_name).category
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&KeywordSets::default())
    }
}

// ---------------------------------------------------------------------------
// Batch check
// ---------------------------------------------------------------------------

/// Outcome of the one-file-per-category upload rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub ok: bool,
    pub files: Vec<Classification>,
    /// Category → the single file assigned to it.
    pub assignments: BTreeMap<FileCategory, String>,
    pub missing: Vec<FileCategory>,
    /// Categories claimed by more than one file.
    pub duplicates: BTreeMap<FileCategory, Vec<String>>,
    pub undetected: Vec<String>,
}

/// Classify every file of an upload batch and check that each of the five
/// categories is covered by exactly one file.
pub fn check_batch<S: AsRef<str>>(classifier: &Classifier, file_names: &[S]) -> BatchReport {
    let files: Vec<Classification> = file_names
        .iter()
        .map(|f| classifier.classify(f.as_ref()))
        .collect();

    let mut by_category: BTreeMap<FileCategory, Vec<String>> = BTreeMap::new();
    let mut undetected = Vec::new();
    for c in &files {
        if c.category == FileCategory::Undetected {
            undetected.push(c.file.clone());
        } else {
            by_category.entry(c.category).or_default().push(c.file.clone());
        }
    }

    let mut assignments = BTreeMap::new();
    let mut duplicates = BTreeMap::new();
    let mut missing = Vec::new();
    for category in FileCategory::ALL {
        match by_category.remove(&category) {
            None => missing.push(category),
            Some(mut list) if list.len() == 1 => {
                assignments.insert(category, list.remove(0));
            }
            Some(list) => {
                duplicates.insert(category, list);
            }
        }
    }

    BatchReport {
        ok: missing.is_empty() && duplicates.is_empty(),
        files,
        assignments,
        missing,
        duplicates,
        undetected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_separator_runs() {
        let c = Classifier::default();
        assert_eq!(c.normalize("GL_Tiers_2024.xlsx"), "gl tiers xlsx");
        assert_eq!(c.normalize("  Plan-Comptes -- 2024 .CSV "), "plan comptes csv");
    }

    #[test]
    fn gl_tiers_scenario() {
        let c = Classifier::default();
        let r = c.classify("GL_Tiers_2024.xlsx");
        assert_eq!(r.category, FileCategory::GrandLivreTiers);
        // "tiers" only feeds the tiers ledger category
        assert_eq!(r.scores[&FileCategory::PlanTiers], 0);
        assert_eq!(r.scores[&FileCategory::GrandLivreComptes], 2);
        assert_eq!(r.scores[&FileCategory::GrandLivreTiers], "gl tiers".len() + 5 + 2);
    }

    #[test]
    fn five_categories() {
        let c = Classifier::default();
        assert_eq!(c.category("Grand livre des comptes 2024.xlsx"), FileCategory::GrandLivreComptes);
        assert_eq!(c.category("grand_livre_tiers.xls"), FileCategory::GrandLivreTiers);
        assert_eq!(c.category("plan_comptable.xlsx"), FileCategory::PlanComptes);
        assert_eq!(c.category("Plan des comptes.xlsx"), FileCategory::PlanComptes);
        assert_eq!(c.category("plan-tiers.xlsx"), FileCategory::PlanTiers);
        assert_eq!(c.category("Codes journaux.xlsx"), FileCategory::CodeJournal);
    }

    #[test]
    fn nothing_matches_is_undetected() {
        let c = Classifier::default();
        let r = c.classify("balance_2024.pdf");
        assert_eq!(r.category, FileCategory::Undetected);
        assert!(r.scores.values().all(|&s| s == 0));
    }

    #[test]
    fn tie_goes_to_first_category() {
        let sets = KeywordSets {
            grand_livre_comptes: vec!["export".into()],
            grand_livre_tiers: vec!["export".into()],
            plan_comptes: vec!["pc".into()],
            plan_tiers: vec!["pt".into()],
            code_journal: vec!["cj".into()],
        };
        let c = Classifier::new(&sets);
        assert_eq!(c.category("export.xlsx"), FileCategory::GrandLivreComptes);
    }

    #[test]
    fn batch_complete() {
        let c = Classifier::default();
        let report = check_batch(
            &c,
            &[
                "GL_Comptes_2024.xlsx",
                "GL_Tiers_2024.xlsx",
                "plan_comptable.xlsx",
                "plan_tiers.xlsx",
                "codes_journaux.xlsx",
            ],
        );
        assert!(report.ok, "{report:?}");
        assert_eq!(report.assignments.len(), 5);
        assert_eq!(
            report.assignments[&FileCategory::GrandLivreTiers],
            "GL_Tiers_2024.xlsx"
        );
        assert!(report.missing.is_empty());
    }

    #[test]
    fn batch_missing_duplicate_and_undetected() {
        let c = Classifier::default();
        let report = check_batch(
            &c,
            &["GL_Tiers_a.xlsx", "GL_Tiers_b.xlsx", "plan_comptable.xlsx", "photo.png"],
        );
        assert!(!report.ok);
        assert_eq!(
            report.duplicates[&FileCategory::GrandLivreTiers],
            vec!["GL_Tiers_a.xlsx", "GL_Tiers_b.xlsx"]
        );
        assert_eq!(
            report.missing,
            vec![
                FileCategory::GrandLivreComptes,
                FileCategory::PlanTiers,
                FileCategory::CodeJournal
            ]
        );
        assert_eq!(report.undetected, vec!["photo.png"]);
    }
}
