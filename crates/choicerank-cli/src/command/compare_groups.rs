use std::path::PathBuf;

use choicerank_analysis::{
    battery::{self, NamedSample, TestKind},
    dataset::Dataset,
    hierarchy::{ComparisonPlan, GroupingSpec, HierarchyReport, run_hierarchy},
    posthoc,
    profile::{ParticipantProfile, ProfileColumns},
    trial_record::ParticipantId,
};
use serde::Serialize;

use crate::{
    config::{CompareGroupsConfig, Config},
    input::CsvTable,
    render::{CsvTableRenderer, TableRenderer},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CompareGroupsArg {
    /// Participant CSV with one slider response per row
    input: PathBuf,
    /// Directory for `results.json` and the figure tables
    output_dir: PathBuf,
    /// Repeat the per-topic comparisons within each affiliation (default)
    #[arg(long, overrides_with = "no_subgroups")]
    subgroups: bool,
    /// Skip the per-affiliation comparisons
    #[arg(long, overrides_with = "subgroups")]
    no_subgroups: bool,
    /// JSON file overriding the default column names, codes and labels
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CompareGroupsArg {
    fn include_subgroups(&self) -> bool {
        self.subgroups || !self.no_subgroups
    }
}

#[derive(Debug, Serialize)]
struct CompareGroupsResults {
    profile: ParticipantProfile,
    /// Slider responses of Democrats against Republicans.
    main_effect: HierarchyReport,
    /// Responses by the selected candidate's opinion, overall and per topic
    /// and affiliation.
    comparisons: HierarchyReport,
    post_hoc: HierarchyReport,
    tables: Vec<PathBuf>,
}

/// One slider response, as plotted.
#[derive(Debug, Clone, Copy, Serialize)]
struct SliderResponse<'a> {
    participant: ParticipantId,
    affiliation: &'a str,
    topic: &'a str,
    opinion: &'a str,
    slider: f64,
}

/// Column names after relabeling.
struct Columns<'a> {
    vote: &'a str,
    affiliation: &'a str,
    topic: &'a str,
    slider: &'a str,
    slider_raw: &'a str,
}

impl<'a> Columns<'a> {
    fn new(config: &'a CompareGroupsConfig) -> Self {
        let relabeling = &config.relabeling;
        Self {
            vote: relabeling.column(&config.vote_column),
            affiliation: relabeling.column(&config.affiliation_column),
            topic: relabeling.column(&config.topic_column),
            slider: relabeling.column(&config.slider_column),
            slider_raw: relabeling.column(&config.slider_raw_column),
        }
    }
}

pub(crate) fn run(arg: &CompareGroupsArg) -> anyhow::Result<()> {
    let config = Config::load(arg.config.as_deref())?.compare_groups;

    let table = CsvTable::read(&arg.input)?;
    table.require(&[
        config.vote_column.as_str(),
        config.affiliation_column.as_str(),
        config.topic_column.as_str(),
        config.slider_column.as_str(),
        config.slider_raw_column.as_str(),
    ])?;

    util::create_output_dir(&arg.output_dir)?;
    let renderer = CsvTableRenderer::new(&arg.output_dir);
    let results = analyze(&table, &config, arg.include_subgroups(), &renderer)?;

    let path = arg.output_dir.join("results.json");
    util::save_json(&results, &path)?;
    tracing::info!("Results saved to {}", path.display());
    Ok(())
}

fn analyze<R>(
    table: &CsvTable,
    config: &CompareGroupsConfig,
    include_subgroups: bool,
    renderer: &R,
) -> anyhow::Result<CompareGroupsResults>
where
    R: TableRenderer,
{
    let raw = Dataset::new(
        table.observations(&[
            config.slider_column.as_str(),
            config.slider_raw_column.as_str(),
            config.age_column.as_str(),
        ]),
        vec![],
    );

    tracing::info!("** Pre-processing **");
    let data = raw.relabel(&config.relabeling);
    let relabeling = &config.relabeling;
    let columns = Columns::new(config);

    tracing::info!("** Profiling **");
    let profile = ParticipantProfile::new(
        &data,
        ProfileColumns {
            gender: relabeling.column(&config.gender_column),
            affiliation: columns.affiliation,
            age: relabeling.column(&config.age_column),
        },
    );
    tracing::info!(?profile, "participant profile");

    tracing::info!("** Main analyses **");
    let democrat = relabeling.value(&config.affiliation_column, &config.democrat_code);
    let republican = relabeling.value(&config.affiliation_column, &config.republican_code);
    let democrat_values = data.measure_by_level(columns.slider, columns.affiliation, democrat);
    let republican_values =
        data.measure_by_level(columns.slider, columns.affiliation, republican);
    let mut main_effect = HierarchyReport::default();
    main_effect.record(
        "Overall Political Party",
        battery::compare(
            NamedSample::new(democrat, &democrat_values),
            NamedSample::new(republican, &republican_values),
            TestKind::RankSum,
        ),
    );

    let plan = ComparisonPlan::IndependentGroups {
        measure: config.slider_column.clone(),
        by: config.vote_column.clone(),
        order: Some((config.left_code.clone(), config.right_code.clone())),
    }
    .relabeled(relabeling);
    let spec = GroupingSpec {
        topic: Some(config.topic_column.clone()),
        subgroup: Some(config.affiliation_column.clone()),
        include_subgroups,
    }
    .relabeled(relabeling);
    let comparisons = run_hierarchy(&data, &spec, &plan);

    tracing::info!("** Post-hoc analyses **");
    let mut post_hoc = HierarchyReport::default();
    post_hoc.record(
        "Post-hoc",
        posthoc::association(&data, columns.affiliation, columns.vote),
    );
    post_hoc.record(
        "Post-hoc",
        posthoc::response_bias(&data, columns.slider_raw, config.midpoint),
    );

    let responses = slider_responses(&data, &columns);
    let tables = vec![renderer.render("slider_responses", &responses)?];

    Ok(CompareGroupsResults {
        profile,
        main_effect,
        comparisons,
        post_hoc,
        tables,
    })
}

/// Every response once under its topic and once more under `All`.
fn slider_responses<'a>(data: &'a Dataset, columns: &Columns<'_>) -> Vec<SliderResponse<'a>> {
    let rows = data
        .observations()
        .iter()
        .filter_map(|o| {
            Some(SliderResponse {
                participant: o.participant,
                affiliation: o.attribute(columns.affiliation)?,
                topic: o.attribute(columns.topic)?,
                opinion: o.attribute(columns.vote)?,
                slider: o.measure(columns.slider)?,
            })
        })
        .collect::<Vec<_>>();
    rows.iter()
        .map(|r| SliderResponse { topic: "All", ..*r })
        .chain(rows.iter().copied())
        .collect()
}
