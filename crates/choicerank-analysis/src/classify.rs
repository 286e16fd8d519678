//! Classification of ranked options against a trial's design.

use serde::Serialize;

use crate::trial_record::{OptionId, ParticipantId, TrialChoices, TrialDesign};

/// How a ranked option relates to the alternative the participant picked first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum ChoiceType {
    /// Unique to the alternative that was not picked.
    #[display("NotChosen")]
    NotChosen,
    /// Shown in both alternatives.
    #[display("Shared")]
    Shared,
    /// Unique to the alternative that was picked first.
    #[display("Chosen")]
    Chosen,
}

impl ChoiceType {
    pub const ALL: [ChoiceType; 3] = [Self::NotChosen, Self::Shared, Self::Chosen];

    /// Label used in figures and reports.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            ChoiceType::NotChosen => "Non-chosen",
            ChoiceType::Shared => "Shared",
            ChoiceType::Chosen => "Chosen unique",
        }
    }

    /// Position of this label in [`ChoiceType::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ChoiceType::NotChosen => 0,
            ChoiceType::Shared => 1,
            ChoiceType::Chosen => 2,
        }
    }

    /// One-hot `(not_chosen, shared, chosen)` flags for this label.
    #[must_use]
    pub fn indicator(self) -> [u8; 3] {
        match self {
            ChoiceType::NotChosen => [1, 0, 0],
            ChoiceType::Shared => [0, 1, 0],
            ChoiceType::Chosen => [0, 0, 1],
        }
    }
}

/// One ranked option of one trial: a tidy observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceRow {
    pub participant: ParticipantId,
    pub trial: usize,
    /// Rank position, 0 = most preferred.
    pub preference: usize,
    pub option: OptionId,
    pub choice_type: ChoiceType,
}

/// Labels every option of one trial's ranking, in rank order.
///
/// An option is [`Shared`](ChoiceType::Shared) if the design marks it as
/// shared, otherwise [`Chosen`](ChoiceType::Chosen) if it is the option unique
/// to the alternative the participant picked first, otherwise
/// [`NotChosen`](ChoiceType::NotChosen). The chosen option is resolved through
/// the first pick, never through the option being labelled.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use choicerank_analysis::{
///     classify::{ChoiceType, classify},
///     trial_record::{ParticipantId, TrialChoices, TrialDesign},
/// };
///
/// let design = TrialDesign {
///     shared: Some(3),
///     alternatives: BTreeMap::from([(1, 7), (2, 1)]),
/// };
/// let choices = TrialChoices {
///     first_pick: 2,
///     ranking: vec![3, 1, 7],
/// };
/// let rows = classify(ParticipantId(0), 0, &choices, &design);
/// let labels = rows.iter().map(|r| r.choice_type).collect::<Vec<_>>();
/// assert_eq!(
///     labels,
///     [ChoiceType::Shared, ChoiceType::Chosen, ChoiceType::NotChosen]
/// );
/// ```
#[must_use]
pub fn classify(
    participant: ParticipantId,
    trial: usize,
    choices: &TrialChoices,
    design: &TrialDesign,
) -> Vec<PreferenceRow> {
    let chosen_unique = design.alternatives.get(&choices.first_pick).copied();
    choices
        .ranking
        .iter()
        .enumerate()
        .map(|(preference, &option)| {
            let choice_type = if design.shared == Some(option) {
                ChoiceType::Shared
            } else if chosen_unique == Some(option) {
                ChoiceType::Chosen
            } else {
                ChoiceType::NotChosen
            };
            PreferenceRow {
                participant,
                trial,
                preference,
                option,
                choice_type,
            }
        })
        .collect()
}
