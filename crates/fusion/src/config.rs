use serde::{Deserialize, Serialize};

use crate::classify::FileCategory;
use crate::error::FusionError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine configuration. Every section has defaults, so an empty TOML
/// document yields the stock export layouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FusionConfig {
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub layouts: LayoutsConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// Header rows scanned for the entity name and the period.
    pub header_rows: usize,
    pub default_entite: String,
    /// `YYYYMM`
    pub default_periode: String,
    /// `DD/MM/YYYY`
    pub default_date_gl: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            header_rows: 10,
            default_entite: "ENVOL".into(),
            default_periode: "202412".into(),
            default_date_gl: "31/12/2024".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutsConfig {
    pub comptes: LayoutConfig,
    pub tiers: LayoutConfig,
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            comptes: LayoutConfig::comptes(),
            tiers: LayoutConfig::tiers(),
        }
    }
}

/// Column positions of one export layout. Indices are zero-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Regex a block header's first cell must match.
    pub code_pattern: String,
    /// Column that must be blank on a block header row.
    pub sentinel_column: usize,
    /// Column holding the block label on the header row.
    pub label_column: usize,
    /// Column checked for "Total" to close a block.
    pub terminator_column: usize,
    pub date_column: usize,
    pub journal_column: usize,
    pub piece_column: usize,
    pub libelle_column: usize,
    pub debit_column: usize,
    pub credit_column: usize,
    pub solde_column: usize,
    /// General account written on each transaction row (tiers exports).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compte_column: Option<usize>,
    /// Centralising account written on the block header row (tiers exports).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centralisateur_column: Option<usize>,
}

impl LayoutConfig {
    /// Grand livre des comptes.
    pub fn comptes() -> Self {
        Self {
            code_pattern: r"^\d{6}$".into(),
            sentinel_column: 1,
            label_column: 2,
            terminator_column: 2,
            date_column: 0,
            journal_column: 1,
            piece_column: 2,
            libelle_column: 3,
            debit_column: 5,
            credit_column: 6,
            solde_column: 7,
            compte_column: None,
            centralisateur_column: None,
        }
    }

    /// Grand livre des tiers.
    pub fn tiers() -> Self {
        Self {
            code_pattern: r"^[0-9A-Z]+$".into(),
            sentinel_column: 1,
            label_column: 2,
            terminator_column: 2,
            date_column: 0,
            journal_column: 1,
            piece_column: 3,
            libelle_column: 4,
            debit_column: 6,
            credit_column: 7,
            solde_column: 8,
            compte_column: Some(2),
            centralisateur_column: Some(5),
        }
    }

    fn validate(&self, name: &str) -> Result<(), FusionError> {
        regex::Regex::new(&self.code_pattern).map_err(|e| {
            FusionError::ConfigValidation(format!("layouts.{name}: invalid code_pattern: {e}"))
        })?;

        // A header row is told apart from a transaction row by its blank
        // sentinel; a sentinel on the date column could never be blank.
        if self.sentinel_column == self.date_column {
            return Err(FusionError::ConfigValidation(format!(
                "layouts.{name}: sentinel_column must differ from date_column"
            )));
        }
        if self.label_column == self.sentinel_column {
            return Err(FusionError::ConfigValidation(format!(
                "layouts.{name}: label_column must differ from sentinel_column"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    pub keywords: KeywordSets,
}

/// Keyword sets per category. Any subset may be overridden in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordSets {
    pub grand_livre_comptes: Vec<String>,
    pub grand_livre_tiers: Vec<String>,
    pub plan_comptes: Vec<String>,
    pub plan_tiers: Vec<String>,
    pub code_journal: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            grand_livre_comptes: words(&[
                "grand livre comptes",
                "grand livre des comptes",
                "grand livre general",
                "grand livre",
                "gl comptes",
                "glc",
                "comptes",
                "gl",
            ]),
            grand_livre_tiers: words(&[
                "grand livre tiers",
                "grand livre des tiers",
                "gl tiers",
                "glt",
                "tiers",
                "auxiliaire",
                "gl",
            ]),
            plan_comptes: words(&[
                "plan comptable",
                "plan comptes",
                "plan des comptes",
                "plan de comptes",
                "pcg",
            ]),
            plan_tiers: words(&[
                "plan tiers",
                "plan des tiers",
                "plan de tiers",
                "fichier tiers",
                "liste tiers",
            ]),
            code_journal: words(&["code journal", "codes journaux", "journaux", "journal"]),
        }
    }
}

impl KeywordSets {
    pub fn for_category(&self, category: FileCategory) -> &[String] {
        match category {
            FileCategory::GrandLivreComptes => &self.grand_livre_comptes,
            FileCategory::GrandLivreTiers => &self.grand_livre_tiers,
            FileCategory::PlanComptes => &self.plan_comptes,
            FileCategory::PlanTiers => &self.plan_tiers,
            FileCategory::CodeJournal => &self.code_journal,
            FileCategory::Undetected => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl FusionConfig {
    pub fn from_toml(input: &str) -> Result<Self, FusionError> {
        let config: FusionConfig =
            toml::from_str(input).map_err(|e| FusionError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, FusionError> {
        toml::to_string_pretty(self).map_err(|e| FusionError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), FusionError> {
        let m = &self.metadata;
        if m.header_rows == 0 {
            return Err(FusionError::ConfigValidation(
                "metadata.header_rows must be at least 1".into(),
            ));
        }
        if m.default_periode.len() != 6 || !m.default_periode.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(FusionError::ConfigValidation(format!(
                "metadata.default_periode must be YYYYMM, got '{}'",
                m.default_periode
            )));
        }

        self.layouts.comptes.validate("comptes")?;
        self.layouts.tiers.validate("tiers")?;

        for category in FileCategory::ALL {
            let list = self.classifier.keywords.for_category(category);
            if list.is_empty() || list.iter().any(|k| k.trim().is_empty()) {
                return Err(FusionError::ConfigValidation(format!(
                    "classifier.keywords: category '{}' needs non-empty keywords",
                    category.key()
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = FusionConfig::from_toml("").unwrap();
        assert_eq!(config, FusionConfig::default());
        assert_eq!(config.metadata.header_rows, 10);
        assert_eq!(config.metadata.default_entite, "ENVOL");
        assert_eq!(config.layouts.comptes.debit_column, 5);
        assert_eq!(config.layouts.tiers.debit_column, 6);
        assert_eq!(config.layouts.tiers.compte_column, Some(2));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let input = r#"
[metadata]
default_entite = "ACME"

[classifier.keywords]
code_journal = ["journaux", "cj"]
"#;
        let config = FusionConfig::from_toml(input).unwrap();
        assert_eq!(config.metadata.default_entite, "ACME");
        assert_eq!(config.metadata.default_periode, "202412");
        assert_eq!(config.classifier.keywords.code_journal, vec!["journaux", "cj"]);
        assert_eq!(
            config.classifier.keywords.plan_tiers,
            KeywordSets::default().plan_tiers
        );
    }

    #[test]
    fn layout_override_requires_all_columns() {
        let input = r#"
[layouts.comptes]
code_pattern = '^\d{8}$'
sentinel_column = 1
"#;
        let err = FusionConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, FusionError::ConfigParse(_)));
    }

    #[test]
    fn reject_invalid_pattern() {
        let mut config = FusionConfig::default();
        config.layouts.tiers.code_pattern = "([A-Z".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("layouts.tiers"));
    }

    #[test]
    fn reject_sentinel_on_date_column() {
        let mut config = FusionConfig::default();
        config.layouts.comptes.sentinel_column = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sentinel_column"));
    }

    #[test]
    fn reject_bad_default_periode() {
        let input = r#"
[metadata]
default_periode = "2024-12"
"#;
        let err = FusionConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("YYYYMM"));
    }

    #[test]
    fn reject_empty_keyword_set() {
        let input = r#"
[classifier.keywords]
plan_tiers = []
"#;
        let err = FusionConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("plan_tiers"));
    }

    #[test]
    fn reject_unknown_section() {
        let err = FusionConfig::from_toml("[outputs]\njson = true\n").unwrap_err();
        assert!(matches!(err, FusionError::ConfigParse(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = FusionConfig::default();
        let text = config.to_toml().unwrap();
        let back = FusionConfig::from_toml(&text).unwrap();
        assert_eq!(back, config);
    }
}
