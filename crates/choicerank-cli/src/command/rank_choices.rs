use std::path::PathBuf;

use choicerank_analysis::{
    classify::ChoiceType,
    dataset::{Condition, Dataset},
    hierarchy::{ComparisonPlan, GroupingSpec, HierarchyReport, run_hierarchy},
    profile::{ParticipantProfile, ProfileColumns},
    proportions::choice_proportions,
    rank_sum::RankSumTable,
    trial_record::parse_batch,
    trial_variability::FirstPreferenceTable,
};
use serde::Serialize;

use crate::{
    config::{Config, RankChoicesConfig},
    input::CsvTable,
    render::{CsvTableRenderer, TableRenderer},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RankChoicesArg {
    /// Participant CSV holding the design-map and choices columns
    input: PathBuf,
    /// Directory for `results.json` and the figure tables
    output_dir: PathBuf,
    /// Repeat the analysis within each level of the subgroup column
    #[arg(long)]
    subgroups: bool,
    /// Column splitting participants into subgroups
    #[arg(long)]
    subgroup_column: Option<String>,
    /// Number of trials every participant completed
    #[arg(long)]
    trials: Option<usize>,
    /// JSON file overriding the default column names and layout
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RankChoicesResults {
    profile: ParticipantProfile,
    /// Participants left out, with the reason.
    skipped: Vec<String>,
    stray_nulls: usize,
    groups: Vec<GroupResults>,
    /// Friedman and pairwise signed-rank tests per node.
    comparisons: HierarchyReport,
    /// First-preference trend per group and choice type.
    drift: HierarchyReport,
}

/// Rank sums and exported tables of one participant group.
#[derive(Debug, Serialize)]
struct GroupResults {
    node: String,
    participants: usize,
    rank_sums: Vec<RankSumSummary>,
    tables: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RankSumSummary {
    choice_type: ChoiceType,
    median: f64,
    iqr: f64,
}

pub(crate) fn run(arg: &RankChoicesArg) -> anyhow::Result<()> {
    let mut config = Config::load(arg.config.as_deref())?.rank_choices;
    if let Some(column) = &arg.subgroup_column {
        config.subgroup_column.clone_from(column);
    }
    if let Some(trials) = arg.trials {
        config.format.trials_per_participant = trials;
    }

    let table = CsvTable::read(&arg.input)?;
    let mut required = vec![
        config.design_map_column.as_str(),
        config.choices_column.as_str(),
    ];
    if arg.subgroups {
        required.push(config.subgroup_column.as_str());
    }
    table.require(&required)?;

    util::create_output_dir(&arg.output_dir)?;
    let renderer = CsvTableRenderer::new(&arg.output_dir);
    let results = analyze(&table, &config, arg.subgroups, &renderer)?;

    let path = arg.output_dir.join("results.json");
    util::save_json(&results, &path)?;
    tracing::info!("Results saved to {}", path.display());
    Ok(())
}

fn analyze<R>(
    table: &CsvTable,
    config: &RankChoicesConfig,
    include_subgroups: bool,
    renderer: &R,
) -> anyhow::Result<RankChoicesResults>
where
    R: TableRenderer,
{
    let raws = table.raw_trial_records(&config.design_map_column, &config.choices_column);
    let batch = parse_batch(&raws, &config.format);
    let stray_nulls = batch.records.iter().map(|r| r.stray_nulls).sum::<usize>();
    if stray_nulls > 0 {
        tracing::info!("Dropped {stray_nulls} stray null elements from the choices");
    }
    let data = Dataset::new(table.observations(&[config.age_column.as_str()]), batch.rows);

    tracing::info!("** Profiling **");
    let profile = ParticipantProfile::new(
        &data,
        ProfileColumns {
            gender: &config.gender_column,
            affiliation: &config.subgroup_column,
            age: &config.age_column,
        },
    );
    tracing::info!(?profile, "participant profile");

    tracing::info!("** Significance tests **");
    let spec = GroupingSpec {
        topic: None,
        subgroup: Some(config.subgroup_column.clone()),
        include_subgroups,
    };
    let comparisons = run_hierarchy(&data, &spec, &ComparisonPlan::RankedChoices);

    tracing::info!("** Trial drift and proportions **");
    let mut groups = vec![("Overall".to_owned(), "overall".to_owned(), vec![])];
    if include_subgroups {
        let column = &config.subgroup_column;
        for level in data.levels(column) {
            groups.push((
                format!("{column} = {level}"),
                format!("{column}_{level}"),
                vec![Condition::new(column, level)],
            ));
        }
    }
    let mut drift = HierarchyReport::default();
    let groups = groups
        .into_iter()
        .map(|(node, stem, conditions)| {
            let subset = data.filter(&conditions);
            group_tables(&subset, &node, &stem, renderer, &mut drift)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(RankChoicesResults {
        profile,
        skipped: batch.skipped.iter().map(ToString::to_string).collect(),
        stray_nulls,
        groups,
        comparisons,
        drift,
    })
}

fn group_tables<R>(
    data: &Dataset,
    node: &str,
    stem: &str,
    renderer: &R,
    drift: &mut HierarchyReport,
) -> anyhow::Result<GroupResults>
where
    R: TableRenderer,
{
    let (rank_sums, _) = RankSumTable::aggregate_partial(data.rows());
    tracing::info!("[{node}] {} participants with complete rank sums", rank_sums.len());
    let summaries = ChoiceType::ALL
        .into_iter()
        .filter_map(|label| {
            let stats = rank_sums.summary(label)?;
            tracing::info!(
                "[{node}] {label}: median = {:.3}, IQR = {:.3}",
                stats.median,
                stats.iqr()
            );
            Some(RankSumSummary {
                choice_type: label,
                median: stats.median,
                iqr: stats.iqr(),
            })
        })
        .collect();

    let first_preferences = FirstPreferenceTable::from_rows(data.rows());
    for label in ChoiceType::ALL {
        drift.record(node, first_preferences.trend(label));
    }

    let tables = vec![
        renderer.render(&format!("{stem}_rank_sums"), &rank_sums.to_rows())?,
        renderer.render(
            &format!("{stem}_proportions"),
            &choice_proportions(data.rows()),
        )?,
        renderer.render(
            &format!("{stem}_first_preferences"),
            &first_preferences.to_rows(),
        )?,
    ];
    Ok(GroupResults {
        node: node.to_owned(),
        participants: rank_sums.len(),
        rank_sums: summaries,
        tables,
    })
}
