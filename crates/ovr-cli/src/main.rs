//! `ovr-explain`: show how plans would be accelerated
//!
//! `explain` reads a plan arena from JSON, applies the overrides under the
//! given configuration and prints the decisions and the rewritten tree.
//! `matrix` prints the support matrix of the built-in rules.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ovr_core::{OverrideConfig, PlanOverrides};
use ovr_plan::PlanArena;
use ovr_registry::RegistryBuilder;
use ovr_tagger::ExplainMode;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("ovr-explain")
        .version(ovr_core::VERSION)
        .about("Explain which plan nodes can run on the accelerator")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("explain")
                .about("Tag and rewrite a plan")
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Plan arena as JSON"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("conf")
                        .long("conf")
                        .action(ArgAction::Append)
                        .value_name("KEY=VALUE")
                        .help("Setting applied after the configuration file"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .default_value("ALL")
                        .value_parser(value_parser!(ExplainMode))
                        .help("Decisions to show: NONE, NOT_ON_ACCELERATOR or ALL"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("matrix")
                .about("Print the support matrix of the built-in rules")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn load_config(args: &ArgMatches) -> Result<OverrideConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => OverrideConfig::from_file(path)?,
        None => OverrideConfig::default(),
    };
    for setting in args.get_many::<String>("conf").into_iter().flatten() {
        config.apply_setting(setting)?;
    }
    Ok(config)
}

fn read_arena(path: &Path) -> Result<PlanArena> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid plan arena in {}", path.display()))
}

fn run_explain(args: &ArgMatches) -> Result<String> {
    let config = load_config(args)?;
    let mode = args
        .get_one::<ExplainMode>("mode")
        .copied()
        .unwrap_or(ExplainMode::All);
    let path = args
        .get_one::<PathBuf>("plan")
        .context("--plan is required")?;
    let arena = read_arena(path)?;
    tracing::debug!("Read plan arena with {} nodes from {}", arena.nodes.len(), path.display());

    let registry = RegistryBuilder::with_defaults()?.build();
    let engine = PlanOverrides::new(&registry, config);
    let plan = arena.to_tree(engine.config().max_plan_depth)?;
    let mut outcome = engine.apply_with_explain(&plan, mode)?;

    if args.get_flag("json") {
        return Ok(serde_json::to_string_pretty(&outcome)?);
    }
    let mut out = std::mem::take(&mut outcome.explain);
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&outcome.plan.to_string());
    out.push_str(&format!(
        "\n{} accelerated, {} on host, {} host-to-device, {} device-to-host\n",
        outcome.stats.accelerated,
        outcome.stats.host,
        outcome.stats.host_to_device,
        outcome.stats.device_to_host
    ));
    Ok(out)
}

fn run_matrix(args: &ArgMatches) -> Result<String> {
    let matrix = RegistryBuilder::with_defaults()?.build().support_matrix();
    if args.get_flag("json") {
        Ok(serde_json::to_string_pretty(&matrix)?)
    } else {
        Ok(matrix.to_markdown())
    }
}

fn run(matches: &ArgMatches) -> Result<String> {
    match matches.subcommand() {
        Some(("explain", args)) => run_explain(args),
        Some(("matrix", args)) => run_matrix(args),
        _ => anyhow::bail!("unknown command"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match run(&matches) {
        Ok(out) => print!("{out}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLAN: &str = r#"{
        "root": 0,
        "nodes": [
            {"id": 0, "kind": "Filter", "class": "Exec", "output_type": "LONG", "children": [1]},
            {"id": 1, "kind": "Window", "class": "Exec", "output_type": "LONG"}
        ]
    }"#;

    fn plan_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();
        file
    }

    #[test]
    fn command_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn explain_prints_decisions_and_tree() {
        let file = plan_file();
        let path = file.path().to_str().unwrap();
        let matches = cli()
            .try_get_matches_from(["ovr-explain", "explain", "--plan", path])
            .unwrap();

        let out = run(&matches).unwrap();
        assert!(out.starts_with("*Exec <Filter> will run on the accelerator\n"));
        assert!(out.contains("!Exec <Window> cannot run on the accelerator because"));
        assert!(out.contains("1 accelerated, 1 on host, 1 host-to-device, 1 device-to-host"));
    }

    #[test]
    fn settings_override_defaults() {
        let file = plan_file();
        let path = file.path().to_str().unwrap();
        let matches = cli()
            .try_get_matches_from([
                "ovr-explain",
                "explain",
                "--plan",
                path,
                "--conf",
                "sql.exec.Filter=false",
                "--json",
            ])
            .unwrap();

        let out = run(&matches).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["stats"]["accelerated"], 0);
    }

    #[test]
    fn json_carries_the_requested_explain_mode() {
        let file = plan_file();
        let path = file.path().to_str().unwrap();
        let matches = cli()
            .try_get_matches_from([
                "ovr-explain",
                "explain",
                "--plan",
                path,
                "--mode",
                "NOT_ON_ACCELERATOR",
                "--json",
            ])
            .unwrap();

        let out = run(&matches).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let explain = json["explain"].as_str().unwrap();
        assert!(explain.starts_with("  !Exec <Window> cannot run on the accelerator"));
        assert!(!explain.contains("<Filter>"));
        assert_eq!(json["decisions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn bad_setting_is_reported() {
        let file = plan_file();
        let path = file.path().to_str().unwrap();
        let matches = cli()
            .try_get_matches_from(["ovr-explain", "explain", "--plan", path, "--conf", "nope"])
            .unwrap();
        let err = run(&matches).unwrap_err();
        assert!(err.to_string().contains("key=value"));
    }

    #[test]
    fn matrix_lists_built_in_rules() {
        let matches = cli()
            .try_get_matches_from(["ovr-explain", "matrix"])
            .unwrap();
        let out = run(&matches).unwrap();
        assert!(out.contains("HashJoin"));
    }
}
