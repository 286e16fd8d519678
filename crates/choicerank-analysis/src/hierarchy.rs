//! Recursive comparison over topic and subgroup partitions.
//!
//! The hierarchy is materialized from the observed categorical values before
//! any test runs:
//!
//! ```text
//! Overall
//! ├── Topic = A
//! ├── Topic = B
//! ├── Affiliation = Democrat
//! │   ├── Affiliation = Democrat / Topic = A
//! │   └── Affiliation = Democrat / Topic = B
//! └── Affiliation = Republican
//!     └── ...
//! ```
//!
//! Levels are sorted, so the traversal order does not depend on the order of
//! the input rows. A failing node is recorded and its siblings and children
//! still run.

use std::fmt;

use choicerank_stats::{DegenerateInputError, StatisticalPreconditionError, StatsError};
use serde::{Serialize, Serializer};

use crate::{
    battery::{self, ComparisonError, NamedSample, TestKind, TestResult},
    classify::ChoiceType,
    dataset::{Condition, Dataset, Relabeling},
    rank_sum::RankSumTable,
};

/// Which categorical columns partition the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingSpec {
    /// Column whose levels form the per-topic branches.
    pub topic: Option<String>,
    /// Column whose levels form the per-subgroup branches.
    pub subgroup: Option<String>,
    /// Whether the subgroup branches run at all.
    pub include_subgroups: bool,
}

impl GroupingSpec {
    /// The same grouping with column names passed through `relabeling`.
    #[must_use]
    pub fn relabeled(&self, relabeling: &Relabeling) -> Self {
        let rename = |column: &Option<String>| {
            column
                .as_deref()
                .map(|column| relabeling.column(column).to_owned())
        };
        Self {
            topic: rename(&self.topic),
            subgroup: rename(&self.subgroup),
            include_subgroups: self.include_subgroups,
        }
    }
}

/// The tests run at every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonPlan {
    /// Mann-Whitney U of `measure` between the two levels of `by`.
    ///
    /// `order` fixes which level is the lesser group of the effect size;
    /// without it the node must have exactly two levels, taken in sorted order.
    IndependentGroups {
        measure: String,
        by: String,
        order: Option<(String, String)>,
    },
    /// Friedman over the three rank-sum columns, then pairwise Wilcoxon tests.
    RankedChoices,
}

/// Label pairs compared after the Friedman test, in report order.
const RANKED_PAIRS: [(ChoiceType, ChoiceType); 3] = [
    (ChoiceType::Chosen, ChoiceType::Shared),
    (ChoiceType::Chosen, ChoiceType::NotChosen),
    (ChoiceType::NotChosen, ChoiceType::Shared),
];

impl ComparisonPlan {
    /// The same plan with column names and level values passed through
    /// `relabeling`.
    #[must_use]
    pub fn relabeled(&self, relabeling: &Relabeling) -> Self {
        match self {
            Self::IndependentGroups { measure, by, order } => Self::IndependentGroups {
                measure: relabeling.column(measure).to_owned(),
                by: relabeling.column(by).to_owned(),
                order: order.as_ref().map(|(lesser, greater)| {
                    (
                        relabeling.value(by, lesser).to_owned(),
                        relabeling.value(by, greater).to_owned(),
                    )
                }),
            },
            Self::RankedChoices => Self::RankedChoices,
        }
    }
}

/// One partition of the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonNode {
    pub label: String,
    pub conditions: Vec<Condition>,
    pub children: Vec<ComparisonNode>,
}

impl ComparisonNode {
    /// Builds the tree rooted at `Overall` from the levels observed in `data`.
    #[must_use]
    pub fn build(data: &Dataset, spec: &GroupingSpec) -> Self {
        let mut children = topic_nodes(data, spec, None, &[]);
        if spec.include_subgroups
            && let Some(column) = &spec.subgroup
        {
            for level in data.levels(column) {
                let label = format!("{column} = {level}");
                let conditions = vec![Condition::new(column, level)];
                let subset = data.filter(&conditions);
                let topics = topic_nodes(&subset, spec, Some(label.as_str()), &conditions);
                children.push(Self {
                    label,
                    conditions,
                    children: topics,
                });
            }
        }
        Self {
            label: "Overall".to_owned(),
            conditions: vec![],
            children,
        }
    }

    /// Pre-order traversal: the node, then each child subtree in order.
    pub fn iter(&self) -> impl Iterator<Item = &ComparisonNode> {
        PreOrder { stack: vec![self] }
    }
}

fn topic_nodes(
    data: &Dataset,
    spec: &GroupingSpec,
    parent: Option<&str>,
    parent_conditions: &[Condition],
) -> Vec<ComparisonNode> {
    let Some(column) = &spec.topic else {
        return vec![];
    };
    data.levels(column)
        .into_iter()
        .map(|level| {
            let own = format!("{column} = {level}");
            let label = match parent {
                Some(parent) => format!("{parent} / {own}"),
                None => own,
            };
            let mut conditions = parent_conditions.to_vec();
            conditions.push(Condition::new(column, level));
            ComparisonNode {
                label,
                conditions,
                children: vec![],
            }
        })
        .collect()
}

struct PreOrder<'a> {
    stack: Vec<&'a ComparisonNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a ComparisonNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A test that could not be computed at a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFailure {
    pub node: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ComparisonError,
}

impl fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.node, self.error)
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Everything a hierarchy run produced, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HierarchyReport {
    pub results: Vec<TestResult>,
    pub failures: Vec<NodeFailure>,
}

impl HierarchyReport {
    /// Appends the outcome of one test at `node`, logging it.
    pub fn record(&mut self, node: &str, outcome: Result<TestResult, ComparisonError>) {
        match outcome {
            Ok(result) => {
                let result = result.at_node(node);
                tracing::info!("{result}");
                self.results.push(result);
            }
            Err(error) => {
                let failure = NodeFailure {
                    node: node.to_owned(),
                    error,
                };
                tracing::warn!("{failure}");
                self.failures.push(failure);
            }
        }
    }
}

/// Runs `plan` at every node of the hierarchy described by `spec`.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use choicerank_analysis::{
///     dataset::{Dataset, Observation},
///     hierarchy::{ComparisonPlan, GroupingSpec, run_hierarchy},
///     trial_record::ParticipantId,
/// };
///
/// let observations = (0..12)
///     .map(|i| Observation {
///         participant: ParticipantId(i),
///         attributes: BTreeMap::from([
///             ("Vote".to_owned(), if i % 2 == 0 { "left" } else { "right" }.to_owned()),
///             ("Topic".to_owned(), if i < 6 { "Trade" } else { "Guns" }.to_owned()),
///         ]),
///         measures: BTreeMap::from([("Slider".to_owned(), i as f64)]),
///     })
///     .collect();
/// let data = Dataset::new(observations, vec![]);
/// let spec = GroupingSpec {
///     topic: Some("Topic".to_owned()),
///     subgroup: None,
///     include_subgroups: false,
/// };
/// let plan = ComparisonPlan::IndependentGroups {
///     measure: "Slider".to_owned(),
///     by: "Vote".to_owned(),
///     order: None,
/// };
/// let report = run_hierarchy(&data, &spec, &plan);
/// let nodes = report.results.iter().map(|r| r.node.as_str()).collect::<Vec<_>>();
/// assert_eq!(nodes, ["Overall", "Topic = Guns", "Topic = Trade"]);
/// assert!(report.failures.is_empty());
/// ```
#[must_use]
pub fn run_hierarchy(
    data: &Dataset,
    spec: &GroupingSpec,
    plan: &ComparisonPlan,
) -> HierarchyReport {
    let tree = ComparisonNode::build(data, spec);
    let mut report = HierarchyReport::default();
    for node in tree.iter() {
        let subset = data.filter(&node.conditions);
        tracing::debug!(
            node = %node.label,
            observations = subset.len(),
            "running comparison node"
        );
        match plan {
            ComparisonPlan::IndependentGroups { measure, by, order } => {
                let outcome = compare_independent(&subset, measure, by, order.as_ref());
                report.record(&node.label, outcome);
            }
            ComparisonPlan::RankedChoices => compare_ranked(&subset, &node.label, &mut report),
        }
    }
    tracing::info!(
        results = report.results.len(),
        failures = report.failures.len(),
        "comparison hierarchy finished"
    );
    report
}

fn compare_independent(
    data: &Dataset,
    measure: &str,
    by: &str,
    order: Option<&(String, String)>,
) -> Result<TestResult, ComparisonError> {
    let (lesser, greater) = match order {
        Some((lesser, greater)) => (lesser.clone(), greater.clone()),
        None => {
            let levels = data.levels(by);
            let [lesser, greater] = <[String; 2]>::try_from(levels).map_err(|levels| {
                StatsError::from(StatisticalPreconditionError::new(format!(
                    "expected 2 levels of {by}, found {}",
                    levels.len()
                )))
            })?;
            (lesser, greater)
        }
    };
    let a = data.measure_by_level(measure, by, &lesser);
    let b = data.measure_by_level(measure, by, &greater);
    battery::compare(
        NamedSample::new(&lesser, &a),
        NamedSample::new(&greater, &b),
        TestKind::RankSum,
    )
}

fn compare_ranked(data: &Dataset, node: &str, report: &mut HierarchyReport) {
    let (table, errors) = RankSumTable::aggregate_partial(data.rows());
    for error in errors {
        report.record(node, Err(error.into()));
    }
    if table.is_empty() {
        let error = StatsError::from(DegenerateInputError::new(
            "no participant has a complete rank-sum row",
        ));
        report.record(node, Err(error.into()));
        return;
    }

    // indexed by `ChoiceType::index`
    let names = ChoiceType::ALL.map(|label| label.to_string());
    let columns = ChoiceType::ALL.map(|label| table.column(label));
    let samples = [0, 1, 2].map(|i| NamedSample::new(&names[i], &columns[i]));
    report.record(node, battery::compare_related(&samples));

    for (a, b) in RANKED_PAIRS {
        let outcome = battery::compare(
            samples[a.index()],
            samples[b.index()],
            TestKind::SignedRank,
        );
        report.record(node, outcome);
    }
}
