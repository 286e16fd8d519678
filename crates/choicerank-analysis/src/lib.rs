//! Trial-record reconstruction and hierarchical comparison of choice experiments.
//!
//! Participants repeatedly rank options drawn from two presented
//! alternatives. This crate turns the raw per-participant encodings into tidy
//! preference rows, labels every ranked option against the trial's design,
//! aggregates rank sums and runs a battery of significance tests overall and
//! across topic and subgroup partitions.
//!
//! # Pipeline
//!
//! 1. **Decode** ([`literal::decode`]): strict parser for the serialized
//!    literal fields, reporting byte offsets on failure
//! 2. **Parse Trials** ([`trial_record::parse_batch`]): per-participant
//!    design maps and rankings; malformed participants are skipped and
//!    reported
//! 3. **Classify** ([`classify::classify`]): `NotChosen`, `Shared` or `Chosen`
//!    per ranked option
//! 4. **Aggregate** ([`rank_sum::RankSumTable`]): participant x label rank sums
//! 5. **Compare** ([`hierarchy::run_hierarchy`]): the test battery
//!    ([`battery`]) at every node of the topic/subgroup hierarchy
//!
//! Supplementary analyses: [`profile`], [`trial_variability`],
//! [`proportions`] and [`posthoc`].
//!
//! # Example
//!
//! ```
//! use choicerank_analysis::{
//!     dataset::Dataset,
//!     hierarchy::{ComparisonPlan, GroupingSpec, run_hierarchy},
//!     trial_record::{ParticipantId, RawTrialRecord, TrialFormat, parse_batch},
//! };
//!
//! let format = TrialFormat {
//!     trials_per_participant: 2,
//!     ..TrialFormat::default()
//! };
//! let design = "[{'both': [3], 'robot1_back': [7], 'robot2_back': [1]}, \
//!                {'both': [5], 'robot1_back': [2], 'robot2_back': [8]}]";
//! let raws = [
//!     RawTrialRecord {
//!         participant: ParticipantId(0),
//!         design_map: design.to_owned(),
//!         choices: "[[1, 0, [7, 3, 1]], [2, 1, [8, 5, 2]]]".to_owned(),
//!     },
//!     RawTrialRecord {
//!         participant: ParticipantId(1),
//!         design_map: design.to_owned(),
//!         choices: "[[1, 0, [7, 3, 1]], [2, 1".to_owned(),
//!     },
//! ];
//! let batch = parse_batch(&raws, &format);
//! assert_eq!(batch.records.len(), 1);
//! assert_eq!(batch.skipped.len(), 1);
//!
//! let data = Dataset::new(vec![], batch.rows);
//! let report = run_hierarchy(&data, &GroupingSpec::default(), &ComparisonPlan::RankedChoices);
//! // Friedman, then three pairwise signed-rank tests
//! assert_eq!(report.results.len(), 4);
//! assert!(report.failures.is_empty());
//! ```

pub mod battery;
pub mod classify;
pub mod dataset;
pub mod hierarchy;
pub mod literal;
pub mod posthoc;
pub mod profile;
pub mod proportions;
pub mod rank_sum;
pub mod trial_record;
pub mod trial_variability;
