use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use comfy_table::{Cell, Table};
use gqlcheck::{Change, ChangeSummary, DiffRule, Severity, compare_schemas, load_schema};
use serde::Serialize;
use std::path::PathBuf;

use crate::context::{ConfigContext, DiffOverrides, FailOn};
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputFormat, OutputManager, TableDisplay, add_table_header, create_table};
use crate::theme::{ICONS, THEME, table_color};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Compare Schemas",
        commands: &[
            "gqlcheck diff old.graphql new.graphql                 # Fail on breaking changes",
            "gqlcheck diff old.graphql new.graphql --fail-on dangerous",
            "gqlcheck diff 'type Query { a: Int }' schema.graphql  # Inline SDL works too",
        ],
    },
    ExampleGroup {
        title: "Tuning",
        commands: &[
            "gqlcheck diff old.graphql new.graphql --ignore-descriptions --ignore-directives",
            "gqlcheck diff old.graphql new.graphql --rule safe-unreachable",
            "gqlcheck diff old.graphql new.graphql --rule suppress-removal-of-deprecated-field",
        ],
    },
    ExampleGroup {
        title: "Scripting",
        commands: &[
            "gqlcheck --output json diff old.graphql new.graphql > report.json",
            "gqlcheck --output compact diff old.graphql new.graphql --fail-on none",
        ],
    },
];

#[derive(Args)]
pub struct DiffArgs {
    /// Old schema: SDL file path or inline SDL
    pub old: String,

    /// New schema: SDL file path or inline SDL
    pub new: String,

    /// Do not report description changes
    #[arg(long)]
    pub ignore_descriptions: bool,

    /// Do not compare directive definitions
    #[arg(long)]
    pub ignore_directives: bool,

    /// Extra classification rule (repeatable); replaces rules from the config file
    #[arg(long = "rule", value_name = "RULE")]
    pub rules: Vec<DiffRule>,

    /// Exit with status 1 when a change of this severity or worse is found
    #[arg(long, value_enum)]
    pub fail_on: Option<FailOn>,
}

impl DiffArgs {
    fn overrides(&self) -> DiffOverrides {
        DiffOverrides {
            ignore_descriptions: self.ignore_descriptions,
            ignore_directives: self.ignore_directives,
            rules: self.rules.clone(),
            fail_on: self.fail_on,
        }
    }
}

/// Everything a `diff` run reports.
#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub changes: Vec<Change>,
    pub summary: ChangeSummary,
    pub generated_at: DateTime<Utc>,
}

impl DiffReport {
    pub fn new(changes: Vec<Change>) -> Self {
        Self {
            summary: ChangeSummary::from_changes(&changes),
            changes,
            generated_at: Utc::now(),
        }
    }

    fn group(&self, severity: Severity) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(move |c| c.severity() == severity)
    }
}

impl TableDisplay for DiffReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(options, &mut table, &["", "Severity", "Kind", "Path", "Message"]);

        for severity in [Severity::Breaking, Severity::Dangerous, Severity::Safe] {
            for change in self.group(severity) {
                let mut severity_cell = Cell::new(format!("{} {severity}", ICONS.severity(severity)));
                if !options.no_color {
                    severity_cell = severity_cell.fg(table_color(THEME.severity(severity)));
                }
                table.add_row(vec![
                    Cell::new(change.kind().marker()),
                    severity_cell,
                    Cell::new(change.kind()),
                    Cell::new(change.path()),
                    Cell::new(change.message()),
                ]);
            }
        }

        table
    }

    fn to_compact(&self) -> String {
        self.changes
            .iter()
            .map(|c| format!("{} {} {} {}", c.severity(), c.kind(), c.path(), c.message()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run the comparison and report it. Returns whether the severity gate
/// passed.
pub async fn handle_diff(args: DiffArgs, config: Option<PathBuf>, output: &OutputManager) -> Result<bool> {
    let ctx = ConfigContext::resolve(config.as_deref())?;
    if let Some(path) = &ctx.config_path {
        output.verbose(&format!("Using config {}", path.display()));
    }
    let (options, fail_on) = ctx.config.diff.merged(&args.overrides());

    output.heading("Schema Diff");

    output.progress("Loading schemas");
    let (old, new) = tokio::try_join!(load_schema(&args.old), load_schema(&args.new))
        .context("Failed to load schemas")?;
    output.clear_line();
    output.verbose(&format!("Loaded {} types from {}", old.graph.type_count(), old.source));
    output.verbose(&format!("Loaded {} types from {}", new.graph.type_count(), new.source));
    output.key_value("Old", &old.source);
    output.key_value("New", &new.source);

    let changes = compare_schemas(&old.graph, &new.graph, &options).context("Failed to compare schemas")?;
    let report = DiffReport::new(changes);

    if report.changes.is_empty() {
        output.success("No changes detected");
        if output.options.output_format == OutputFormat::Json {
            output.display(&report)?;
        }
        return Ok(true);
    }

    output.display(&report)?;

    output.heading("Summary");
    output.bullet(&format!("{} breaking", report.summary.breaking));
    output.bullet(&format!("{} dangerous", report.summary.dangerous));
    output.bullet(&format!("{} safe", report.summary.safe));

    let passed = gate_passes(&report.summary, fail_on);
    if passed {
        output.success("Compatibility check passed");
    } else if let Some(threshold) = fail_on.threshold() {
        output.error(&format!(
            "Found changes at or above {threshold} ({} total)",
            report.summary.total()
        ));
    }
    Ok(passed)
}

fn gate_passes(summary: &ChangeSummary, fail_on: FailOn) -> bool {
    fail_on
        .threshold()
        .is_none_or(|threshold| !summary.has_at_least(threshold))
}
