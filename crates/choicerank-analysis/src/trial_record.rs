//! Reconstruction of per-trial records from raw participant rows.
//!
//! Each participant row carries two literal fields covering every trial:
//!
//! - the **design map**, one map per trial naming the option shared between
//!   the two presented alternatives and the option unique to each alternative:
//!   `[{'both': [3], 'robot1_back': [7], 'robot2_back': [1]}, ...]`
//! - the **choices**, one entry per trial holding the alternative picked
//!   first, an unused marker, and the final best-to-worst ranking of options:
//!   `[[1, 0, [7, 3, 1]], ...]`
//!
//! The export that produced these fields sometimes embeds stray `null`
//! elements in the choices lists. Those are dropped and counted; every other
//! deviation from the expected shape fails the whole participant with a
//! [`ParseError`].
//!
//! # Examples
//!
//! ```
//! use choicerank_analysis::trial_record::{
//!     ParticipantId, RawTrialRecord, TrialFormat, parse_record,
//! };
//!
//! let format = TrialFormat {
//!     trials_per_participant: 1,
//!     ..TrialFormat::default()
//! };
//! let raw = RawTrialRecord {
//!     participant: ParticipantId(0),
//!     design_map: "[{'both': [3], 'robot1_back': [7], 'robot2_back': [1]}]".to_owned(),
//!     choices: "[[1, 0, [7, 3, null, 1]]]".to_owned(),
//! };
//! let record = parse_record(&raw, &format).unwrap();
//! assert_eq!(record.trials[0].choices.ranking, vec![7, 3, 1]);
//! assert_eq!(record.stray_nulls, 1);
//! ```

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    classify::{PreferenceRow, classify},
    literal::{self, DecodeError, Literal},
};

/// Stable participant identifier: the participant's row index in the input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{_0}")]
pub struct ParticipantId(pub usize);

/// Identifier of a presented option (an image, a design, ...).
pub type OptionId = u32;

/// Layout of the literal fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialFormat {
    /// Number of trials every participant completed.
    pub trials_per_participant: usize,
    /// Design-map key of the option shared by both alternatives.
    pub shared_key: String,
    /// Alternative `n` is stored under `{prefix}{n}{suffix}`.
    pub alternative_key_prefix: String,
    pub alternative_key_suffix: String,
}

impl Default for TrialFormat {
    fn default() -> Self {
        Self {
            trials_per_participant: 10,
            shared_key: "both".to_owned(),
            alternative_key_prefix: "robot".to_owned(),
            alternative_key_suffix: "_back".to_owned(),
        }
    }
}

impl TrialFormat {
    fn alternative_number(&self, key: &str) -> Option<u32> {
        key.strip_prefix(&self.alternative_key_prefix)?
            .strip_suffix(&self.alternative_key_suffix)?
            .parse()
            .ok()
    }
}

/// One participant row as loaded from the input, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTrialRecord {
    pub participant: ParticipantId,
    pub design_map: String,
    pub choices: String,
}

/// Design of one trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialDesign {
    /// Option shown in both alternatives, if any.
    pub shared: Option<OptionId>,
    /// Option unique to each alternative, keyed by alternative number.
    pub alternatives: BTreeMap<u32, OptionId>,
}

/// What the participant did in one trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialChoices {
    /// Alternative the participant picked first.
    pub first_pick: u32,
    /// Options, most preferred first.
    pub ranking: Vec<OptionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    /// 0-based trial index.
    pub index: usize,
    pub design: TrialDesign,
    pub choices: TrialChoices,
}

/// All trials of one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialRecord {
    pub participant: ParticipantId,
    pub trials: Vec<Trial>,
    /// Number of stray `null` elements dropped from the choices field.
    pub stray_nulls: usize,
}

impl TrialRecord {
    /// Classifies every ranked option of every trial, trial by trial.
    #[must_use]
    pub fn preference_rows(&self) -> Vec<PreferenceRow> {
        self.trials
            .iter()
            .flat_map(|trial| {
                classify(self.participant, trial.index, &trial.choices, &trial.design)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RecordField {
    #[display("design map")]
    DesignMap,
    #[display("choices")]
    Choices,
}

/// A participant row that could not be decoded.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("participant {participant}: invalid {field} field ({kind}): {raw}")]
pub struct ParseError {
    pub participant: ParticipantId,
    pub field: RecordField,
    /// The offending raw field value.
    pub raw: String,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum ParseErrorKind {
    #[display("{_0}")]
    Decode(DecodeError),
    #[display("{problem} at {path}")]
    Shape { path: ElementPath, problem: ShapeProblem },
}

/// Location of an element inside a decoded field, rendered as `[3][2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPath(Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Index(usize),
    Key(String),
}

impl ElementPath {
    fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_owned()));
        Self(segments)
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "top level");
        }
        for segment in &self.0 {
            match segment {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ShapeProblem {
    #[display("expected a list, found {found}")]
    ExpectedList { found: &'static str },
    #[display("expected a map, found {found}")]
    ExpectedMap { found: &'static str },
    #[display("expected a non-negative integer id, found {found}")]
    ExpectedId { found: String },
    #[display("expected {expected} elements, found {found}")]
    ElementCount { expected: usize, found: usize },
    #[display("missing key {key:?}")]
    MissingKey { key: String },
    #[display("unexpected key {key:?}")]
    UnexpectedKey { key: String },
    #[display("ranking is empty")]
    EmptyRanking,
    #[display("option {option} ranked twice")]
    DuplicateOption { option: OptionId },
    #[display("first pick {alternative} is not a presented alternative")]
    UnknownAlternative { alternative: u32 },
}

type ShapeResult<T> = Result<T, (ElementPath, ShapeProblem)>;

/// Decodes and validates one participant row.
///
/// The design map is decoded before the choices; the first failure is
/// reported.
pub fn parse_record(raw: &RawTrialRecord, format: &TrialFormat) -> Result<TrialRecord, ParseError> {
    let error = |field: RecordField, kind: ParseErrorKind| ParseError {
        participant: raw.participant,
        field,
        raw: raw.field(field).to_owned(),
        kind,
    };
    let shape_error = |field: RecordField| {
        move |(path, problem): (ElementPath, ShapeProblem)| {
            error(field, ParseErrorKind::Shape { path, problem })
        }
    };

    let designs = literal::decode(&raw.design_map)
        .map_err(|e| error(RecordField::DesignMap, ParseErrorKind::Decode(e)))?;
    let designs = decode_designs(&designs, format).map_err(shape_error(RecordField::DesignMap))?;

    let choices = literal::decode(&raw.choices)
        .map_err(|e| error(RecordField::Choices, ParseErrorKind::Decode(e)))?;
    let (choices, stray_nulls) = strip_nulls(choices);
    let choices = decode_choices(&choices, format).map_err(shape_error(RecordField::Choices))?;

    let trials = designs
        .into_iter()
        .zip(choices)
        .enumerate()
        .map(|(index, (design, choices))| {
            if !design.alternatives.contains_key(&choices.first_pick) {
                let path = ElementPath::default().index(index).index(0);
                let problem = ShapeProblem::UnknownAlternative {
                    alternative: choices.first_pick,
                };
                return Err((path, problem));
            }
            Ok(Trial {
                index,
                design,
                choices,
            })
        })
        .collect::<ShapeResult<Vec<_>>>()
        .map_err(shape_error(RecordField::Choices))?;

    Ok(TrialRecord {
        participant: raw.participant,
        trials,
        stray_nulls,
    })
}

/// Decodes one participant row straight into classified preference rows.
pub fn parse_trials(
    raw: &RawTrialRecord,
    format: &TrialFormat,
) -> Result<Vec<PreferenceRow>, ParseError> {
    parse_record(raw, format).map(|record| record.preference_rows())
}

/// Outcome of decoding a batch of participant rows.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    /// Successfully decoded participants, in input order.
    pub records: Vec<TrialRecord>,
    /// Preference rows of every decoded participant, participant by participant.
    pub rows: Vec<PreferenceRow>,
    /// Participants that were skipped, with the reason.
    pub skipped: Vec<ParseError>,
}

/// Decodes every participant row, skipping (and logging) the malformed ones.
pub fn parse_batch<'a, I>(raws: I, format: &TrialFormat) -> ParsedBatch
where
    I: IntoIterator<Item = &'a RawTrialRecord>,
{
    let mut batch = ParsedBatch::default();
    for raw in raws {
        match parse_record(raw, format) {
            Ok(record) => {
                if record.stray_nulls > 0 {
                    tracing::debug!(
                        participant = %record.participant,
                        count = record.stray_nulls,
                        "dropped stray null elements from choices"
                    );
                }
                batch.rows.extend(record.preference_rows());
                batch.records.push(record);
            }
            Err(err) => {
                tracing::warn!("Skipping {err}");
                batch.skipped.push(err);
            }
        }
    }
    tracing::info!(
        "Decoded {} participants, skipped {}",
        batch.records.len(),
        batch.skipped.len()
    );
    batch
}

impl RawTrialRecord {
    fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::DesignMap => &self.design_map,
            RecordField::Choices => &self.choices,
        }
    }
}

/// Drops `null` elements from every list, returning the number dropped.
fn strip_nulls(value: Literal) -> (Literal, usize) {
    match value {
        Literal::List(items) => {
            let mut dropped = 0;
            let items = items
                .into_iter()
                .filter_map(|item| {
                    if item.is_null() {
                        dropped += 1;
                        return None;
                    }
                    let (item, nested) = strip_nulls(item);
                    dropped += nested;
                    Some(item)
                })
                .collect();
            (Literal::List(items), dropped)
        }
        Literal::Map(map) => {
            let mut dropped = 0;
            let map = map
                .into_iter()
                .map(|(key, value)| {
                    let (value, nested) = strip_nulls(value);
                    dropped += nested;
                    (key, value)
                })
                .collect();
            (Literal::Map(map), dropped)
        }
        other => (other, 0),
    }
}

fn expect_list<'a>(value: &'a Literal, path: &ElementPath) -> ShapeResult<&'a [Literal]> {
    value.as_list().ok_or_else(|| {
        let problem = ShapeProblem::ExpectedList {
            found: value.kind_name(),
        };
        (path.clone(), problem)
    })
}

fn expect_len<'a>(
    value: &'a Literal,
    expected: usize,
    path: &ElementPath,
) -> ShapeResult<&'a [Literal]> {
    let items = expect_list(value, path)?;
    if items.len() != expected {
        let problem = ShapeProblem::ElementCount {
            expected,
            found: items.len(),
        };
        return Err((path.clone(), problem));
    }
    Ok(items)
}

fn expect_array<'a, const N: usize>(
    value: &'a Literal,
    path: &ElementPath,
) -> ShapeResult<&'a [Literal; N]> {
    let items = expect_list(value, path)?;
    items.try_into().map_err(|_| {
        let problem = ShapeProblem::ElementCount {
            expected: N,
            found: items.len(),
        };
        (path.clone(), problem)
    })
}

fn expect_id(value: &Literal, path: &ElementPath) -> ShapeResult<u32> {
    value
        .as_integer()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            let problem = ShapeProblem::ExpectedId {
                found: value.to_string(),
            };
            (path.clone(), problem)
        })
}

fn decode_designs(value: &Literal, format: &TrialFormat) -> ShapeResult<Vec<TrialDesign>> {
    let root = ElementPath::default();
    let trials = expect_len(value, format.trials_per_participant, &root)?;
    trials
        .iter()
        .enumerate()
        .map(|(i, trial)| decode_design(trial, format, &root.index(i)))
        .collect()
}

fn decode_design(
    value: &Literal,
    format: &TrialFormat,
    path: &ElementPath,
) -> ShapeResult<TrialDesign> {
    let map = value.as_map().ok_or_else(|| {
        let problem = ShapeProblem::ExpectedMap {
            found: value.kind_name(),
        };
        (path.clone(), problem)
    })?;

    let Some(shared) = map.get(&format.shared_key) else {
        let problem = ShapeProblem::MissingKey {
            key: format.shared_key.clone(),
        };
        return Err((path.clone(), problem));
    };
    let shared_path = path.key(&format.shared_key);
    let shared = match expect_list(shared, &shared_path)? {
        [] => None,
        [id] => Some(expect_id(id, &shared_path.index(0))?),
        more => {
            let problem = ShapeProblem::ElementCount {
                expected: 1,
                found: more.len(),
            };
            return Err((shared_path, problem));
        }
    };

    let mut alternatives = BTreeMap::new();
    for (key, entry) in map {
        if *key == format.shared_key {
            continue;
        }
        let key_path = path.key(key);
        let Some(number) = format.alternative_number(key) else {
            let problem = ShapeProblem::UnexpectedKey { key: key.clone() };
            return Err((key_path, problem));
        };
        let [id] = expect_array::<1>(entry, &key_path)?;
        let id = expect_id(id, &key_path.index(0))?;
        // `robot01_back` and `robot1_back` name the same alternative
        if alternatives.insert(number, id).is_some() {
            let problem = ShapeProblem::UnexpectedKey { key: key.clone() };
            return Err((key_path, problem));
        }
    }

    Ok(TrialDesign {
        shared,
        alternatives,
    })
}

fn decode_choices(value: &Literal, format: &TrialFormat) -> ShapeResult<Vec<TrialChoices>> {
    let root = ElementPath::default();
    let trials = expect_len(value, format.trials_per_participant, &root)?;
    trials
        .iter()
        .enumerate()
        .map(|(i, trial)| {
            let path = root.index(i);
            let [first_pick, _, ranking] = expect_array::<3>(trial, &path)?;
            let first_pick = expect_id(first_pick, &path.index(0))?;

            let ranking_path = path.index(2);
            let items = expect_list(ranking, &ranking_path)?;
            if items.is_empty() {
                return Err((ranking_path, ShapeProblem::EmptyRanking));
            }
            let mut ranking = Vec::with_capacity(items.len());
            for (rank, item) in items.iter().enumerate() {
                let option = expect_id(item, &ranking_path.index(rank))?;
                if ranking.contains(&option) {
                    return Err((ranking_path, ShapeProblem::DuplicateOption { option }));
                }
                ranking.push(option);
            }

            Ok(TrialChoices {
                first_pick,
                ranking,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classify::ChoiceType,
        literal::{DecodeErrorKind, MAX_DEPTH},
    };

    const DESIGN: &str = "[{'both': [3], 'robot1_back': [7], 'robot2_back': [1]}, \
                           {'both': [5], 'robot1_back': [2], 'robot2_back': [8]}]";
    const CHOICES: &str = "[[1, 0, [7, 3, 1]], [2, 1, [5, 8, 2]]]";

    fn format() -> TrialFormat {
        TrialFormat {
            trials_per_participant: 2,
            ..TrialFormat::default()
        }
    }

    fn raw(participant: usize, design_map: &str, choices: &str) -> RawTrialRecord {
        RawTrialRecord {
            participant: participant.into(),
            design_map: design_map.to_owned(),
            choices: choices.to_owned(),
        }
    }

    fn shape_problem(err: &ParseError) -> (String, ShapeProblem) {
        match &err.kind {
            ParseErrorKind::Shape { path, problem } => (path.to_string(), problem.clone()),
            ParseErrorKind::Decode(e) => panic!("expected a shape error, got {e}"),
        }
    }

    #[test]
    fn test_parse_record() {
        let record = parse_record(&raw(4, DESIGN, CHOICES), &format()).unwrap();
        assert_eq!(record.participant, ParticipantId(4));
        assert_eq!(record.trials.len(), 2);
        assert_eq!(record.stray_nulls, 0);

        let second = &record.trials[1];
        assert_eq!(second.index, 1);
        assert_eq!(second.design.shared, Some(5));
        assert_eq!(second.design.alternatives[&1], 2);
        assert_eq!(second.design.alternatives[&2], 8);
        assert_eq!(second.choices.first_pick, 2);
        assert_eq!(second.choices.ranking, vec![5, 8, 2]);
    }

    #[test]
    fn test_parse_trials_classifies_in_rank_order() {
        let rows = parse_trials(&raw(0, DESIGN, CHOICES), &format()).unwrap();
        let labels = rows.iter().map(|r| r.choice_type).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                ChoiceType::Chosen,
                ChoiceType::Shared,
                ChoiceType::NotChosen,
                ChoiceType::Shared,
                ChoiceType::Chosen,
                ChoiceType::NotChosen,
            ]
        );
        let positions = rows.iter().map(|r| r.preference).collect::<Vec<_>>();
        assert_eq!(positions, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_stray_nulls_are_dropped() {
        let choices = "[[1, 0, [7, null, 3, 1], null], [2, null, 1, [5, 8, 2]]]";
        let record = parse_record(&raw(0, DESIGN, choices), &format()).unwrap();
        assert_eq!(record.stray_nulls, 3);
        assert_eq!(record.trials[0].choices.ranking, vec![7, 3, 1]);
    }

    #[test]
    fn test_truncated_design_map() {
        let truncated = &DESIGN[..40];
        let err = parse_record(&raw(2, truncated, CHOICES), &format()).unwrap_err();
        assert_eq!(err.participant, ParticipantId(2));
        assert_eq!(err.field, RecordField::DesignMap);
        assert_eq!(err.raw, truncated);
        assert!(matches!(err.kind, ParseErrorKind::Decode(_)));
    }

    #[test]
    fn test_null_in_design_map_is_rejected() {
        let design = "[{'both': [3], 'robot1_back': [7], 'robot2_back': [null]}, \
                      {'both': [5], 'robot1_back': [2], 'robot2_back': [8]}]";
        let err = parse_record(&raw(0, design, CHOICES), &format()).unwrap_err();
        let (path, problem) = shape_problem(&err);
        assert_eq!(path, r#"[0]["robot2_back"][0]"#);
        assert_eq!(
            problem,
            ShapeProblem::ExpectedId {
                found: "null".to_owned()
            }
        );
    }

    #[test]
    fn test_wrong_trial_count() {
        let err = parse_record(&raw(0, DESIGN, "[[1, 0, [7, 3, 1]]]"), &format()).unwrap_err();
        assert_eq!(err.field, RecordField::Choices);
        let (path, problem) = shape_problem(&err);
        assert_eq!(path, "top level");
        assert_eq!(
            problem,
            ShapeProblem::ElementCount {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_wrong_entry_shape() {
        let err = parse_record(&raw(0, DESIGN, "[[1, [7, 3, 1]], [2, 1, [5, 8, 2]]]"), &format())
            .unwrap_err();
        let (path, problem) = shape_problem(&err);
        assert_eq!(path, "[0]");
        assert_eq!(
            problem,
            ShapeProblem::ElementCount {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_non_numeric_option() {
        let err = parse_record(
            &raw(0, DESIGN, "[[1, 0, [7, 'x', 1]], [2, 1, [5, 8, 2]]]"),
            &format(),
        )
        .unwrap_err();
        let (path, problem) = shape_problem(&err);
        assert_eq!(path, "[0][2][1]");
        assert!(matches!(problem, ShapeProblem::ExpectedId { .. }));
    }

    #[test]
    fn test_duplicate_and_empty_rankings() {
        let err = parse_record(&raw(0, DESIGN, "[[1, 0, [7, 7]], [2, 1, [5]]]"), &format())
            .unwrap_err();
        assert_eq!(
            shape_problem(&err).1,
            ShapeProblem::DuplicateOption { option: 7 }
        );

        let err =
            parse_record(&raw(0, DESIGN, "[[1, 0, []], [2, 1, [5]]]"), &format()).unwrap_err();
        assert_eq!(shape_problem(&err).1, ShapeProblem::EmptyRanking);
    }

    #[test]
    fn test_unknown_first_pick() {
        let err = parse_record(&raw(0, DESIGN, "[[3, 0, [7]], [2, 1, [5]]]"), &format())
            .unwrap_err();
        let (path, problem) = shape_problem(&err);
        assert_eq!(path, "[0][0]");
        assert_eq!(problem, ShapeProblem::UnknownAlternative { alternative: 3 });
    }

    #[test]
    fn test_unexpected_design_key() {
        let design = "[{'both': [3], 'robot1_back': [7], 'left': [1]}, \
                      {'both': [5], 'robot1_back': [2], 'robot2_back': [8]}]";
        let err = parse_record(&raw(0, design, CHOICES), &format()).unwrap_err();
        assert_eq!(
            shape_problem(&err).1,
            ShapeProblem::UnexpectedKey {
                key: "left".to_owned()
            }
        );
    }

    #[test]
    fn test_alternative_named_twice() {
        let design = "[{'both': [3], 'robot01_back': [7], 'robot1_back': [1]}, \
                      {'both': [5], 'robot1_back': [2], 'robot2_back': [8]}]";
        let err = parse_record(&raw(0, design, CHOICES), &format()).unwrap_err();
        let (path, problem) = shape_problem(&err);
        assert_eq!(path, r#"[0]["robot1_back"]"#);
        assert_eq!(
            problem,
            ShapeProblem::UnexpectedKey {
                key: "robot1_back".to_owned()
            }
        );
    }

    #[test]
    fn test_missing_shared_option() {
        let design = "[{'both': [], 'robot1_back': [7], 'robot2_back': [1]}, \
                      {'both': [5], 'robot1_back': [2], 'robot2_back': [8]}]";
        let record = parse_record(&raw(0, design, CHOICES), &format()).unwrap();
        assert_eq!(record.trials[0].design.shared, None);
    }

    #[test]
    fn test_parse_batch_isolates_failures() {
        let raws = [
            raw(0, DESIGN, CHOICES),
            raw(1, &DESIGN[..25], CHOICES),
            raw(2, DESIGN, CHOICES),
        ];
        let batch = parse_batch(&raws, &format());
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].participant, ParticipantId(1));
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.rows.len(), 12);
        assert!(batch.rows.iter().all(|r| r.participant != ParticipantId(1)));
    }

    #[test]
    fn test_deeply_nested_choices_skip_only_that_participant() {
        let raws = [
            raw(0, DESIGN, CHOICES),
            raw(1, DESIGN, &"[".repeat(200_000)),
            raw(2, DESIGN, CHOICES),
        ];
        let batch = parse_batch(&raws, &format());
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped.len(), 1);
        let err = &batch.skipped[0];
        assert_eq!(err.participant, ParticipantId(1));
        assert_eq!(err.field, RecordField::Choices);
        assert!(matches!(
            &err.kind,
            ParseErrorKind::Decode(e) if e.kind == DecodeErrorKind::TooDeep { limit: MAX_DEPTH }
        ));
    }
}
