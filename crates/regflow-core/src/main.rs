use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use regflow_core::{
    init_tracing, SuggestionRequest, SuggestionTask, TemplateProvider,
    WorkflowConfig,
};
use regflow_records::{DqDimension, DqRuleSet, RecordSet};
use regflow_status::{
    AnnotationStatus, ComplianceStatus, DocumentStatus, ElementStatus, Lifecycle,
    RuleReviewStatus,
};
use regflow_summary::{bcbs239_matrix, summarize, summarize_sections, CoverageMatrix, SummaryCriteria};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Input of `coverage` and `suggest`
#[derive(Debug, Deserialize)]
struct CoverageInput {
    cdes: Vec<String>,
    rules: DqRuleSet,
}

fn cli() -> Command {
    Command::new("regflow")
        .version(regflow_core::VERSION)
        .about("Status summaries for regulatory reporting workflows")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .env("REGFLOW_CONFIG")
                .value_parser(value_parser!(PathBuf))
                .help("Workflow config (TOML)"),
        )
        .subcommand(
            Command::new("summarize")
                .about("Summarize a record collection (JSON)")
                .arg(
                    Arg::new("domain")
                        .long("domain")
                        .short('d')
                        .required(true)
                        .value_parser([
                            RuleReviewStatus::DOMAIN,
                            ElementStatus::DOMAIN,
                            AnnotationStatus::DOMAIN,
                            ComplianceStatus::DOMAIN,
                            DocumentStatus::DOMAIN,
                        ])
                        .help("Status domain of the records"),
                )
                .arg(
                    Arg::new("sections")
                        .long("sections")
                        .action(ArgAction::SetTrue)
                        .help("One summary per top-level section"),
                )
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("coverage")
                .about("CDE x dimension coverage from {\"cdes\": [...], \"rules\": [...]}")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("suggest")
                .about("Suggest DQ rules for the uncovered dimensions of one CDE")
                .arg(
                    Arg::new("cde")
                        .long("cde")
                        .required(true)
                        .help("CDE name"),
                )
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("check-config")
                .about("Validate a config file and print the effective settings")
                .arg(file_arg()),
        )
        .subcommand(Command::new("bcbs239").about("Print the BCBS 239 principle matrix"))
}

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Input file")
}

fn file(args: &ArgMatches) -> Result<&PathBuf> {
    args.get_one::<PathBuf>("file").context("missing input file")
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn summarize_records<S: Lifecycle>(input: &str, sections: bool) -> Result<String> {
    let records: RecordSet<S, serde_json::Value> =
        serde_json::from_str(input).with_context(|| format!("parsing {} records", S::DOMAIN))?;
    let json = if sections {
        serde_json::to_string_pretty(&summarize_sections(&records, &SummaryCriteria::default()))?
    } else {
        serde_json::to_string_pretty(&summarize(&records))?
    };
    Ok(json)
}

fn summarize_domain(domain: &str, input: &str, sections: bool) -> Result<String> {
    match domain {
        RuleReviewStatus::DOMAIN => summarize_records::<RuleReviewStatus>(input, sections),
        ElementStatus::DOMAIN => summarize_records::<ElementStatus>(input, sections),
        AnnotationStatus::DOMAIN => summarize_records::<AnnotationStatus>(input, sections),
        ComplianceStatus::DOMAIN => summarize_records::<ComplianceStatus>(input, sections),
        DocumentStatus::DOMAIN => summarize_records::<DocumentStatus>(input, sections),
        other => bail!("unknown domain: {other}"),
    }
}

fn coverage_matrix(input: &str) -> Result<CoverageMatrix> {
    let input: CoverageInput = serde_json::from_str(input).context("parsing coverage input")?;
    Ok(CoverageMatrix::from_rules(input.cdes, &input.rules)?)
}

fn suggestion_task(config: &WorkflowConfig, cde: &str, input: &str) -> Result<SuggestionTask> {
    let matrix = coverage_matrix(input)?;
    if !matrix.cdes().any(|c| c == cde) {
        bail!("unknown CDE: {cde}");
    }
    let request = SuggestionRequest {
        cde: cde.to_string(),
        dimensions: DqDimension::ALL
            .into_iter()
            .filter(|d| !matrix.is_covered(cde, *d))
            .collect(),
    };
    let provider = Arc::new(TemplateProvider::new(config.suggestion.simulated_delay()));
    Ok(SuggestionTask::spawn(provider, request, config.suggestion.timeout()))
}

fn load_config(matches: &ArgMatches) -> Result<WorkflowConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => WorkflowConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(WorkflowConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_tracing(&config.logging)?;

    let output = match matches.subcommand() {
        Some(("summarize", args)) => {
            let domain = args
                .get_one::<String>("domain")
                .context("missing domain")?;
            let input = read(file(args)?)?;
            summarize_domain(domain, &input, args.get_flag("sections"))?
        }
        Some(("coverage", args)) => {
            let input = read(file(args)?)?;
            serde_json::to_string_pretty(&coverage_matrix(&input)?.summary())?
        }
        Some(("suggest", args)) => {
            let cde = args.get_one::<String>("cde").context("missing CDE")?;
            let input = read(file(args)?)?;
            let task = suggestion_task(&config, cde, &input)?;
            let token = task.token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            });
            let suggestions = task.outcome().await.into_result()?;
            serde_json::to_string_pretty(&suggestions)?
        }
        Some(("check-config", args)) => {
            let path = file(args)?;
            let checked = WorkflowConfig::load(path)
                .with_context(|| format!("checking {}", path.display()))?;
            toml::to_string_pretty(&checked)?
        }
        Some(("bcbs239", _)) => serde_json::to_string_pretty(&bcbs239_matrix())?,
        _ => bail!("no subcommand given"),
    };

    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn summarize_rules_from_json() {
        let input = r#"[
            {"type": "record", "id": "r1", "status": "pending", "fields": {"title": "a"}},
            {"type": "record", "id": "r2", "status": "accepted", "fields": {"title": "b"}},
            {"type": "record", "id": "r3", "status": "rejected", "fields": null}
        ]"#;
        let json = summarize_domain("rule_review", input, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_count"], 3);
        assert_eq!(value["completion_percentage"], 33);
        assert_eq!(value["counts_by_status"]["accepted"], 1);
    }

    #[test]
    fn summarize_sections_from_json() {
        let input = r#"[
            {"type": "section", "id": "s1", "title": "Counterparty", "children": [
                {"type": "record", "id": "e1", "status": "gap", "fields": {}}
            ]},
            {"type": "section", "id": "s2", "title": "Exposure", "children": []}
        ]"#;
        let json = summarize_domain("data_element", input, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["summary"]["gap_list"][0], "e1");
        assert_eq!(value[1]["summary"]["total_count"], 0);
    }

    #[test]
    fn summarize_rejects_unknown_status() {
        let input = r#"[{"type": "record", "id": "x", "status": "done", "fields": null}]"#;
        assert!(summarize_domain("annotation", input, false).is_err());
        assert!(summarize_domain("nope", "[]", false).is_err());
    }

    #[test]
    fn coverage_from_json() {
        let input = r#"{
            "cdes": ["lei", "exposure"],
            "rules": [
                {"type": "record", "id": "q1", "status": "accepted",
                 "fields": {"cde": "lei", "dimension": "completeness", "logic": "lei IS NOT NULL", "threshold": 99.0}},
                {"type": "record", "id": "q2", "status": "pending",
                 "fields": {"cde": "lei", "dimension": "validity", "logic": "x", "threshold": 99.0}}
            ]
        }"#;
        let summary = coverage_matrix(input).unwrap().summary();
        assert_eq!(summary.covered_cells, 1);
        assert_eq!(summary.total_cells, 14);
        assert_eq!(summary.coverage_percentage, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn suggest_lists_uncovered_dimensions() {
        let input = r#"{"cdes": ["lei"], "rules": []}"#;
        let config = WorkflowConfig::default();
        let task = suggestion_task(&config, "lei", input).unwrap();
        let suggestions = task.outcome().await.into_result().unwrap();
        assert_eq!(suggestions.len(), 7);

        assert!(suggestion_task(&config, "isin", input).is_err());
    }
}
