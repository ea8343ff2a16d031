//! System prompts and user-message builders for the collaborator agents.
//!
//! System prompts define each agent's role. User messages are compact JSON
//! documents carrying the claim and whatever upstream payload the agent
//! must choose from.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::core::dataset::{ClaimType, Dataset};
use crate::core::filters::FilterSet;
use crate::core::series::NormalizedResult;

/// System prompt for the claim classifier.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You classify economic claims for a fact-checking service backed by India's official statistics (MoSPI).
Decide whether the claim can be checked against one of the datasets below and, if so, which. Do not answer the claim.

Datasets (use these exact codes):
- PLFS: jobs, unemployment, wages, labour force participation
- CPI: retail inflation, cost of living, consumer prices
- WPI: wholesale inflation, producer prices
- IIP: industrial production, manufacturing output
- ASI: factory performance, industrial employment
- NAS: GDP, growth, national income, sectoral output
- ENERGY: energy production, consumption, fuel mix

Rules:
- If no dataset directly measures what the claim asserts, set is_answerable=false and return no datasets.
- Claims that set two quantities against each other (wages vs prices) may need two datasets; list the most relevant first.
- indicator_hint is a short phrase describing the series to look up.
- When unsure, set is_answerable=false.
- A dataset overview may be supplied; use it only to refine your choice.

Return ONLY JSON:
{
  "is_answerable": true|false,
  "reasoning": "short rationale",
  "datasets": [{"dataset": "PLFS|CPI|WPI|IIP|ASI|NAS|ENERGY", "indicator_hint": "short hint"}]
}"#;

/// System prompt for Selector-A (indicator parameters).
pub const SELECTOR_A_SYSTEM_PROMPT: &str = r#"You choose indicator parameters for a MoSPI data lookup.
The lookup runs in four tool steps: discover datasets, list indicators, read filter metadata, fetch data. You receive the claim, the dataset code and the indicator listing (step 2) and must return the parameters the metadata step (step 3) needs.

Rules:
- Use only values present in the indicator listing. Return raw codes, never labels (use "1", not "frequency_code_1_Annual").
- Return every parameter step 3 requires for the dataset. When several values fit, prefer the most general one unless the claim is specific.
- If the listing exposes an aggregation or granularity dimension (level, category_level), include it and pick the highest aggregation that still matches the claim.
- CPI: base_year, series and level. PLFS: frequency_code and indicator_code. NAS: series, frequency_code and indicator_code. ASI: classification_year and indicator_code. ENERGY: indicator_code and use_of_energy_balance_code. IIP and WPI: no indicators, return an empty params object.
- Classify the claim as one of: trend, level, comparison, distribution, compound, intra_comparison, other. Default to trend when unclear.
- compound: two different quantities (wages vs inflation). intra_comparison: two series available inside this dataset (two options of one dimension). comparison: a group set against other groups ("only", "compared to other sectors").

Return ONLY JSON:
{"params": {"key": "value"}, "claim_type": "trend|level|comparison|distribution|compound|intra_comparison|other", "reasoning": "short reason"}"#;

/// System prompt for Selector-B (data filters).
pub const SELECTOR_B_SYSTEM_PROMPT: &str = r#"You choose data filters for a MoSPI data fetch.
You receive the claim, dataset, claim_type, the filter metadata (step 3) and the indicator parameters already chosen. Return the exact filters for the data step (step 4).

Rules:
- Use only values listed in the metadata; search nested structures. All values are strings.
- Include every required api_param. Keep the indicator parameters unchanged.
- Prefer the broadest single value (All, Total, Combined, All-India) unless the claim names a subgroup.
- Time: pick the latest three years when several are available unless the claim names one year. Comma-separated values are allowed ONLY for time fields (year, month_code).
- If the metadata exposes an aggregation field (level), include it and choose the highest aggregation that still matches the claim. Avoid subcategory filters (group, item, nic) unless the claim names them.
- Benchmarks by claim_type: trend and compound get no benchmark_filters; comparison and level get benchmark_filters for a clear comparison group; intra_comparison gets benchmark_filters for the complementary series in this dataset.
- optional_drop_filters lists up to three keys that may be removed if the fetch returns nothing without losing relevance.
- A pagination_hint, when present, explains why the previous filters returned too many pages. Follow it.

Return ONLY JSON:
{"filters": {"key": "value"}, "benchmark_filters": {"key": "value"}, "optional_drop_filters": ["key"], "reasoning": "short reason"}"#;

/// System prompt for the interpreter.
pub const INTERPRETER_SYSTEM_PROMPT: &str = r#"You judge an economic claim against official MoSPI data and explain the verdict to a general reader.

Guardrails:
- Use ONLY the provided data_rows. Never invent values, extrapolate, make causal claims or recommend policy.
- Do not compare against any benchmark that is not in data_rows. When data_rows pairs a primary and a benchmark series, you may compare them using their labels.
- If the data is ambiguous or incomplete, the verdict is "complicated".
- Cite the dataset and the year(s) used. Separate what the data shows from your reading of it.
- chartData holds ONLY the primary series, one point per period present, each with a numeric value and the same descriptive label (e.g. "unemployment rate (%)").
- Monthly periods (YYYY-MM) support statements about that year only.

Return ONLY JSON:
{"verdict": "busted|confirmed|complicated", "headlineStat": "short numeric summary", "explanation": "2-4 sentences", "chartData": [{"year": "YYYY", "value": 0.0, "label": "metric"}], "source": "dataset and years"}"#;

/// Default prompt directory relative to the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/claimcheck/prompts";

/// Filename for the classifier prompt.
const CLASSIFIER_FILENAME: &str = "classifier.md";
/// Filename for the Selector-A prompt.
const SELECTOR_A_FILENAME: &str = "selector_a.md";
/// Filename for the Selector-B prompt.
const SELECTOR_B_FILENAME: &str = "selector_b.md";
/// Filename for the interpreter prompt.
const INTERPRETER_FILENAME: &str = "interpreter.md";

/// Set of system prompts for all collaborator agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Classifier prompt.
    pub classifier: String,
    /// Selector-A prompt.
    pub selector_a: String,
    /// Selector-B prompt.
    pub selector_b: String,
    /// Interpreter prompt.
    pub interpreter: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for the directory:
    /// 1. Explicit `prompt_dir` argument
    /// 2. `CLAIMCHECK_PROMPT_DIR` environment variable
    /// 3. `~/.config/claimcheck/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var("CLAIMCHECK_PROMPT_DIR").ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(path).ok())
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            classifier: load_file(CLASSIFIER_FILENAME, CLASSIFIER_SYSTEM_PROMPT),
            selector_a: load_file(SELECTOR_A_FILENAME, SELECTOR_A_SYSTEM_PROMPT),
            selector_b: load_file(SELECTOR_B_FILENAME, SELECTOR_B_SYSTEM_PROMPT),
            interpreter: load_file(INTERPRETER_FILENAME, INTERPRETER_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            classifier: CLASSIFIER_SYSTEM_PROMPT.to_string(),
            selector_a: SELECTOR_A_SYSTEM_PROMPT.to_string(),
            selector_b: SELECTOR_B_SYSTEM_PROMPT.to_string(),
            interpreter: INTERPRETER_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (CLASSIFIER_FILENAME, CLASSIFIER_SYSTEM_PROMPT),
            (SELECTOR_A_FILENAME, SELECTOR_A_SYSTEM_PROMPT),
            (SELECTOR_B_FILENAME, SELECTOR_B_SYSTEM_PROMPT),
            (INTERPRETER_FILENAME, INTERPRETER_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Builds the classifier's user message.
#[must_use]
pub fn build_classifier_prompt(claim: &str, overview: Option<&Value>) -> String {
    json!({ "claim": claim, "dataset_overview": overview }).to_string()
}

/// Builds Selector-A's user message.
#[must_use]
pub fn build_selector_a_prompt(claim: &str, dataset: Dataset, indicators: &Value) -> String {
    json!({ "claim": claim, "dataset": dataset, "indicators": indicators }).to_string()
}

/// Builds Selector-B's user message.
#[must_use]
pub fn build_selector_b_prompt(
    claim: &str,
    dataset: Dataset,
    claim_type: ClaimType,
    metadata: &Value,
    indicator_params: &FilterSet,
    pagination_hint: Option<&str>,
) -> String {
    json!({
        "claim": claim,
        "dataset": dataset,
        "claim_type": claim_type,
        "metadata": metadata,
        "indicator_params": indicator_params,
        "pagination_hint": pagination_hint,
    })
    .to_string()
}

/// Builds the interpreter's user message.
#[must_use]
pub fn build_interpreter_prompt(
    claim: &str,
    dataset: Dataset,
    indicator: &str,
    filters: &FilterSet,
    data: &NormalizedResult,
    source_hint: &str,
) -> String {
    json!({
        "claim": claim,
        "dataset": dataset,
        "indicator": indicator,
        "filters": filters,
        "data_rows": data,
        "source_hint": source_hint,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::SeriesPoint;

    #[test]
    fn test_prompts_not_empty() {
        let defaults = PromptSet::defaults();
        assert!(defaults.classifier.contains("is_answerable"));
        assert!(defaults.selector_a.contains("claim_type"));
        assert!(defaults.selector_b.contains("optional_drop_filters"));
        assert!(defaults.interpreter.contains("chartData"));
    }

    #[test]
    fn test_load_overrides_single_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join("interpreter.md"), "custom interpreter")
            .unwrap_or_else(|_| unreachable!());
        let prompts = PromptSet::load(Some(dir.path()));
        assert_eq!(prompts.interpreter, "custom interpreter");
        assert_eq!(prompts.classifier, CLASSIFIER_SYSTEM_PROMPT);
    }

    #[test]
    fn test_write_defaults_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join("classifier.md"), "mine").unwrap_or_else(|_| unreachable!());
        let written = PromptSet::write_defaults(dir.path()).unwrap_or_default();
        assert_eq!(written.len(), 3);
        let kept = std::fs::read_to_string(dir.path().join("classifier.md")).unwrap_or_default();
        assert_eq!(kept, "mine");
    }

    #[test]
    fn test_build_prompts_are_json() {
        let claim = build_classifier_prompt("prices doubled", None);
        let parsed: Value = serde_json::from_str(&claim).unwrap_or_default();
        assert_eq!(parsed["claim"], "prices doubled");
        assert!(parsed["dataset_overview"].is_null());

        let filters: FilterSet = [("year".to_string(), "2023".to_string())].into();
        let data = NormalizedResult::Series(vec![SeriesPoint {
            period: "2023".to_string(),
            value: 3.2,
        }]);
        let interp = build_interpreter_prompt(
            "unemployment fell",
            Dataset::Plfs,
            "unemployment rate",
            &filters,
            &data,
            "PLFS (MoSPI)",
        );
        let parsed: Value = serde_json::from_str(&interp).unwrap_or_default();
        assert_eq!(parsed["dataset"], "PLFS");
        assert_eq!(parsed["data_rows"][0]["period"], "2023");

        let sel_b = build_selector_b_prompt(
            "c",
            Dataset::Cpi,
            ClaimType::Comparison,
            &json!({}),
            &FilterSet::new(),
            Some("narrow it"),
        );
        let parsed: Value = serde_json::from_str(&sel_b).unwrap_or_default();
        assert_eq!(parsed["claim_type"], "comparison");
        assert_eq!(parsed["pagination_hint"], "narrow it");
    }
}
