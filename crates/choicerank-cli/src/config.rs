//! Column names, codes and relabelings of the two experiments.
//!
//! Every field has a default matching the published datasets, so a config
//! file only lists what differs.

use std::{collections::BTreeMap, path::Path};

use choicerank_analysis::{dataset::Relabeling, trial_record::TrialFormat};
use serde::{Deserialize, Serialize};

use crate::util;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rank_choices: RankChoicesConfig,
    pub compare_groups: CompareGroupsConfig,
}

impl Config {
    /// Defaults, overridden by `path` when given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => util::read_json_file("config", path),
            None => Ok(Self::default()),
        }
    }
}

/// The ranking experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankChoicesConfig {
    pub design_map_column: String,
    pub choices_column: String,
    pub subgroup_column: String,
    pub gender_column: String,
    pub age_column: String,
    pub format: TrialFormat,
}

impl Default for RankChoicesConfig {
    fn default() -> Self {
        Self {
            design_map_column: "back_config".to_owned(),
            choices_column: "choices".to_owned(),
            subgroup_column: "party".to_owned(),
            gender_column: "gender".to_owned(),
            age_column: "age".to_owned(),
            format: TrialFormat::default(),
        }
    }
}

/// The independent-group experiment.
///
/// Column names and codes refer to the raw input; the analysis runs on the
/// relabeled data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareGroupsConfig {
    /// Direction of the opinion the selected candidate revealed.
    pub vote_column: String,
    pub affiliation_column: String,
    pub topic_column: String,
    /// Agreement slider, higher meaning more agreement with the candidate.
    pub slider_column: String,
    /// Un-normalized slider position.
    pub slider_raw_column: String,
    pub gender_column: String,
    pub age_column: String,
    pub left_code: String,
    pub right_code: String,
    pub democrat_code: String,
    pub republican_code: String,
    /// Centre of the raw slider scale.
    pub midpoint: f64,
    pub relabeling: Relabeling,
}

impl Default for CompareGroupsConfig {
    fn default() -> Self {
        let names = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(from, to)| ((*from).to_owned(), (*to).to_owned()))
                .collect::<BTreeMap<_, _>>()
        };
        let relabeling = Relabeling {
            columns: names(&[
                ("VOTE_CONTRO_DIR", "Selected Candidate's Opinion"),
                ("AFFILIATION", "Participant Affiliation"),
                ("CONTRO_ID", "Topic"),
                ("SLIDER_P_DIR", "Agreement slider"),
            ]),
            values: BTreeMap::from([
                (
                    "VOTE_CONTRO_DIR".to_owned(),
                    names(&[("left", "Left-wing"), ("right", "Right-wing")]),
                ),
                (
                    "AFFILIATION".to_owned(),
                    names(&[("d", "Democrat"), ("r", "Republican")]),
                ),
                (
                    "CONTRO_ID".to_owned(),
                    names(&[
                        ("abortion", "Abortion"),
                        ("immigration", "Immigration"),
                        ("trade", "Trade"),
                    ]),
                ),
            ]),
        };
        Self {
            vote_column: "VOTE_CONTRO_DIR".to_owned(),
            affiliation_column: "AFFILIATION".to_owned(),
            topic_column: "CONTRO_ID".to_owned(),
            slider_column: "SLIDER_P_DIR".to_owned(),
            slider_raw_column: "SLIDER_RAW".to_owned(),
            gender_column: "GENDER".to_owned(),
            age_column: "AGE".to_owned(),
            left_code: "left".to_owned(),
            right_code: "right".to_owned(),
            democrat_code: "d".to_owned(),
            republican_code: "r".to_owned(),
            midpoint: 50.0,
            relabeling,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{
            "rank_choices": {
                "subgroup_column": "affiliation",
                "format": { "trials_per_participant": 8 }
            }
        }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.rank_choices.subgroup_column, "affiliation");
        assert_eq!(config.rank_choices.choices_column, "choices");
        assert_eq!(config.rank_choices.format.trials_per_participant, 8);
        assert_eq!(config.rank_choices.format.shared_key, "both");
        assert_eq!(config.compare_groups, CompareGroupsConfig::default());
    }

    #[test]
    fn test_default_relabeling() {
        let config = CompareGroupsConfig::default();
        let relabeling = &config.relabeling;
        assert_eq!(relabeling.column(&config.topic_column), "Topic");
        assert_eq!(relabeling.value(&config.affiliation_column, "d"), "Democrat");
        assert_eq!(relabeling.value(&config.vote_column, "centre"), "centre");
        assert_eq!(relabeling.column(&config.slider_raw_column), "SLIDER_RAW");
    }
}
