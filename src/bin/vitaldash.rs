use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use vitaldash::models::sex_label;
use vitaldash::stats;
use vitaldash::{
    Action, Dashboard, DashboardConfig, Dataset, LegendPlacement, NumericField, PieMode, PlotKind,
    filter, storage, viz,
};

#[derive(Parser, Debug)]
#[command(
    name = "vitaldash",
    version,
    about = "Filter, aggregate & chart a clinical patient dataset"
)]
struct Cli {
    /// Settings file (JSON). Defaults to <config dir>/vitaldash/config.json when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw one chart for the given filters and print its legend and summary.
    Render(RenderArgs),
    /// List categories with row counts and numeric column statistics.
    Domain(InputArgs),
    /// Write the filtered rows to CSV or JSON.
    Export(ExportArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Distribution,
    Scatter,
    Pie,
    DeathRate,
}

impl From<KindArg> for PlotKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Distribution => PlotKind::Distribution,
            KindArg::Scatter => PlotKind::Scatter,
            KindArg::Pie => PlotKind::Pie,
            KindArg::DeathRate => PlotKind::DeathRate,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendArg {
    Right,
    Bottom,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PieArg {
    SelectedVsOthers,
    SexSplit,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Patient CSV with a header row.
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Sex codes separated by comma or semicolon (e.g., F,M). "none" selects nothing.
    #[arg(long)]
    sex: Option<String>,
    /// Departments separated by comma or semicolon. "none" selects nothing.
    #[arg(long)]
    department: Option<String>,
    /// Restrict to one disease (dx).
    #[arg(long)]
    disease: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    filters: FilterArgs,
    /// Chart kind.
    #[arg(long, value_enum, default_value = "distribution")]
    kind: KindArg,
    /// X axis field (age, height, weight, bmi) or "none".
    #[arg(long)]
    x: Option<String>,
    /// Y axis field (age, height, weight, bmi) or "none". Used by the scatter plot.
    #[arg(long)]
    y: Option<String>,
    /// Probe x value (death-rate reference line, scatter star).
    #[arg(long, allow_negative_numbers = true)]
    probe_x: Option<f64>,
    /// Probe y value (scatter star).
    #[arg(long, allow_negative_numbers = true)]
    probe_y: Option<f64>,
    /// Write the chart as SVG to this path.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Write the view model as JSON to this path.
    #[arg(long)]
    view_json: Option<PathBuf>,
    /// Also print every tooltip.
    #[arg(long, default_value_t = false)]
    tooltips: bool,
    /// Width of the chart (overrides settings).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the chart (overrides settings).
    #[arg(long)]
    height: Option<u32>,
    /// Legend placement (overrides settings).
    #[arg(long, value_enum)]
    legend: Option<LegendArg>,
    /// Pie layout (overrides settings).
    #[arg(long, value_enum)]
    pie_mode: Option<PieArg>,
    /// Locale for count labels: en, de, fr, es, it, pt, nl (overrides settings).
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    filters: FilterArgs,
    /// Output file.
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// `None` for the literal "none", otherwise a parsed field.
fn parse_axis(s: &str) -> Result<Option<NumericField>> {
    if s.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    s.parse::<NumericField>()
        .map(Some)
        .map_err(|e| anyhow::anyhow!(e))
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.2}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

/// Replace a category selection with exactly `values`. Repeated values count once.
fn selection_actions(
    values: &str,
    clear: Action,
    toggle: impl Fn(String) -> Action,
) -> Vec<Action> {
    let mut out = vec![clear];
    if !values.trim().eq_ignore_ascii_case("none") {
        let unique: BTreeSet<String> = parse_list(values).into_iter().collect();
        out.extend(unique.into_iter().map(toggle));
    }
    out
}

fn filter_actions(f: &FilterArgs) -> Vec<Action> {
    let mut actions = Vec::new();
    if let Some(s) = &f.sex {
        actions.extend(selection_actions(s, Action::SetAllSexes(false), Action::ToggleSex));
    }
    if let Some(d) = &f.department {
        actions.extend(selection_actions(
            d,
            Action::SetAllDepartments(false),
            Action::ToggleDepartment,
        ));
    }
    if let Some(dx) = &f.disease {
        actions.push(Action::SelectDisease(Some(dx.trim().to_string())));
    }
    actions
}

fn load(config: &DashboardConfig, input: &Path) -> Result<Dataset> {
    storage::load_csv(input, &config.outcome_column)
        .with_context(|| format!("loading {}", input.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = DashboardConfig::discover(cli.config.as_deref()).context("reading settings")?;
    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Domain(args) => cmd_domain(config, args),
        Command::Export(args) => cmd_export(config, args),
    }
}

fn cmd_render(mut config: DashboardConfig, args: RenderArgs) -> Result<()> {
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(l) = args.legend {
        config.legend = match l {
            LegendArg::Right => LegendPlacement::Right,
            LegendArg::Bottom => LegendPlacement::Bottom,
        };
    }
    if let Some(p) = args.pie_mode {
        config.pie_mode = match p {
            PieArg::SelectedVsOthers => PieMode::SelectedVsOthers,
            PieArg::SexSplit => PieMode::SexSplit,
        };
    }
    if let Some(l) = &args.locale {
        config.locale = l.clone();
    }
    config.validate()?;

    let data = load(&config, &args.input.input)?;
    let mut actions = filter_actions(&args.filters);
    actions.push(Action::SetPlotKind(args.kind.into()));
    if let Some(x) = &args.x {
        actions.push(Action::SetXField(parse_axis(x)?));
    }
    if let Some(y) = &args.y {
        actions.push(Action::SetYField(parse_axis(y)?));
    }
    if args.probe_x.is_some() || args.probe_y.is_some() {
        actions.push(Action::SetProbe {
            x: args.probe_x,
            y: args.probe_y,
        });
    }

    let mut dash = Dashboard::new(data, config);
    dash.dispatch_all(actions)?;
    let view = dash.view();

    println!("{}", view.title);
    if let Some(title) = &view.legend.title {
        println!("{title}");
    }
    for (i, e) in view.legend.entries.iter().enumerate() {
        let marker = if e.action.is_some() { "*" } else { " " };
        println!("  [{i}]{marker} {}  {}", e.color.hex(), e.label);
    }
    for line in &view.summary {
        println!("{line}");
    }
    if args.tooltips {
        for m in &view.marks {
            println!("{}: {}", m.id, m.tooltip.replace('\n', " | "));
        }
    }

    if let Some(path) = args.view_json.as_ref() {
        storage::save_view_json(view, path)?;
        eprintln!("Saved view to {}", path.display());
    }
    if let Some(path) = args.out.as_ref() {
        viz::render_svg(view, dash.config(), path)?;
        eprintln!("Wrote chart to {}", path.display());
    }
    Ok(())
}

fn cmd_domain(config: DashboardConfig, args: InputArgs) -> Result<()> {
    let data = load(&config, &args.input)?;
    let rows: Vec<_> = data.rows().iter().collect();
    println!("{} rows", rows.len());

    println!("sex:");
    for (k, n) in stats::category_counts(&rows, |r| r.sex.as_str()) {
        println!("  {k} ({})  {n}", sex_label(k));
    }
    println!("department:");
    for (k, n) in stats::category_counts(&rows, |r| r.department.as_str()) {
        println!("  {k}  {n}");
    }
    println!("dx:");
    for (k, n) in stats::category_counts(&rows, |r| r.dx.as_str()) {
        println!("  {k}  {n}");
    }
    for field in NumericField::AXES
        .iter()
        .copied()
        .chain(std::iter::once(NumericField::DeathInhosp))
    {
        let s = stats::field_summary(&rows, field);
        println!(
            "{}  count={} missing={}  min={} max={} mean={} median={}",
            field,
            s.count,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

fn cmd_export(config: DashboardConfig, args: ExportArgs) -> Result<()> {
    let data = load(&config, &args.input.input)?;
    let mut dash = Dashboard::new(data, config);
    dash.dispatch_all(filter_actions(&args.filters))?;
    let filtered = filter::apply(dash.dataset(), dash.state());

    let path = &args.out;
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_rows_csv(&filtered.matching_all, path)?,
        "json" => storage::save_rows_json(&filtered.matching_all, path)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!(
        "Saved {} rows to {}",
        filtered.matching_all.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_clears_selection() {
        let a = selection_actions("none", Action::SetAllSexes(false), Action::ToggleSex);
        assert_eq!(a, vec![Action::SetAllSexes(false)]);
        let a = selection_actions("F; M", Action::SetAllSexes(false), Action::ToggleSex);
        assert_eq!(a.len(), 3);
        assert_eq!(a[2], Action::ToggleSex("M".into()));
    }

    #[test]
    fn repeated_values_toggle_once() {
        let a = selection_actions("F,F; F", Action::SetAllSexes(false), Action::ToggleSex);
        assert_eq!(a, vec![Action::SetAllSexes(false), Action::ToggleSex("F".into())]);
    }

    #[test]
    fn axis_parsing() {
        assert_eq!(parse_axis("none").unwrap(), None);
        assert_eq!(parse_axis("bmi").unwrap(), Some(NumericField::Bmi));
        assert!(parse_axis("shoe").is_err());
    }
}
