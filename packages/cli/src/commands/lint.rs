use crate::commands::load_document;
use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use workbench_linter::{lint_forest, DiagnosticLevel, Finding, LintOptions};
use workbench_model::{Forest, NodeId};

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Schema file or directory to lint (defaults to the configured schema dir)
    pub input: Option<PathBuf>,

    /// Show all findings including info level
    #[arg(short, long)]
    pub all: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Totals {
    findings: usize,
    errors: usize,
    warnings: usize,
}

impl Totals {
    fn from_reports(reports: &[FileReport]) -> Self {
        let mut totals = Totals::default();
        for report in reports {
            if report.error.is_some() {
                totals.errors += 1;
            }
            totals.findings += report.findings.len();
            totals.errors += count(&report.findings, DiagnosticLevel::Error);
            totals.warnings += count(&report.findings, DiagnosticLevel::Warning);
        }
        totals
    }
}

/// Lint outcome for one schema file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    file: PathBuf,

    /// Why the file could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    findings: Vec<Finding>,

    #[serde(skip)]
    forest: Forest,
}

pub fn lint(args: LintArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.get_schema_dir(cwd));

    let text = args.format != "json";
    if text {
        println!("🔍 {} Placement Linter", "Starting".green().bold());
        println!("   Input: {}", input.display());
        println!();
    }

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        let files = find_schema_files(&input);
        if text {
            println!("   Found {} schema files", files.len());
            println!();
        }
        files
    } else {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            input.display()
        ));
    };

    let options = config.lint_options(cwd)?;
    let reports: Vec<FileReport> = files.iter().map(|file| lint_file(file, &options)).collect();
    let totals = Totals::from_reports(&reports);

    if text {
        for report in &reports {
            print_report(report, args.all);
        }

        println!();
        println!(
            "✨ {} Linting complete!",
            if totals.errors > 0 {
                "Done".red().bold()
            } else {
                "Done".green().bold()
            }
        );
        println!("   Files checked: {}", files.len());
        println!("   Total findings: {}", totals.findings);

        if totals.errors > 0 {
            println!("   {} {}", "Errors:".red(), totals.errors);
        }
        if totals.warnings > 0 {
            println!("   {} {}", "Warnings:".yellow(), totals.warnings);
        }
        if totals.errors == 0 && totals.warnings == 0 {
            println!("   {} No misplaced blocks found!", "✓".green());
        }
    } else {
        println!("{}", render_json(&reports)?);
    }

    // Exit with error code if there are errors
    if totals.errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn lint_file(path: &Path, options: &LintOptions) -> FileReport {
    match load_document(path) {
        Ok(document) => {
            let forest = document.forest().clone();
            FileReport {
                file: path.to_path_buf(),
                error: None,
                findings: lint_forest(&forest, options),
                forest,
            }
        }
        Err(err) => FileReport {
            file: path.to_path_buf(),
            error: Some(format!("{:#}", err)),
            findings: Vec::new(),
            forest: Forest::new(),
        },
    }
}

/// Every report as one JSON array, in scan order
fn render_json(reports: &[FileReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

fn print_report(report: &FileReport, all: bool) {
    if let Some(err) = &report.error {
        eprintln!("{} {}", "✗".red(), err);
        return;
    }

    if report.findings.is_empty() {
        if all {
            println!("{} {}", "✓".green(), report.file.display());
        }
        return;
    }

    println!("{}", report.file.display());
    for finding in &report.findings {
        if !all && finding.level == DiagnosticLevel::Info {
            continue;
        }
        let level = match finding.level {
            DiagnosticLevel::Error => "error".red().bold(),
            DiagnosticLevel::Warning => "warning".yellow().bold(),
            DiagnosticLevel::Info => "info".blue().bold(),
        };
        println!("  {} [{}] {}", level, finding.rule, finding.reason);
        println!(
            "    {} {}",
            "at".dimmed(),
            location(&report.forest, finding).as_str().dimmed()
        );
    }
    println!();
}

fn count(findings: &[Finding], level: DiagnosticLevel) -> usize {
    findings.iter().filter(|f| f.level == level).count()
}

/// "Parent › Child" path for a finding
fn location(forest: &Forest, finding: &Finding) -> String {
    let name = |id: &NodeId| {
        forest
            .get(id)
            .map(|node| node.display_name().to_string())
            .unwrap_or_else(|| id.to_string())
    };
    format!("{} › {}", name(&finding.parent_id), name(&finding.node_id))
}

fn find_schema_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path.extension().map(|e| e == "json").unwrap_or(false)
                && path.file_name().map(|n| n != DEFAULT_CONFIG_NAME).unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LintConfig;
    use serde_json::Value;

    const MISPLACED: &str = r#"[
        {
            "id": "s1",
            "variableId": "section",
            "variableName": "Section Container",
            "category": "Structural",
            "dataType": "Section",
            "role": "Structure",
            "customName": "Demographics",
            "isExpanded": true,
            "children": [
                {
                    "id": "f1",
                    "variableId": "stroke",
                    "variableName": "Recurrent Stroke",
                    "category": "Endpoints",
                    "dataType": "Boolean",
                    "role": "Outcome",
                    "endpointTier": "primary",
                    "parentId": "s1"
                }
            ]
        }
    ]"#;

    fn schema_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_misplaced.json"), MISPLACED).unwrap();
        std::fs::write(dir.path().join("b_clean.json"), "[]").unwrap();
        std::fs::write(dir.path().join("c_broken.json"), "not json").unwrap();
        dir
    }

    fn lint_dir(dir: &Path, options: &LintOptions) -> Vec<FileReport> {
        let mut files = find_schema_files(dir);
        files.sort();
        files.iter().map(|file| lint_file(file, options)).collect()
    }

    #[test]
    fn test_directory_renders_as_one_json_document() {
        let dir = schema_dir();
        let options = Config::default().lint_options(dir.path()).unwrap();
        let reports = lint_dir(dir.path(), &options);

        let document: Value = serde_json::from_str(&render_json(&reports).unwrap()).unwrap();
        let entries = document.as_array().unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0]["file"], dir.path().join("a_misplaced.json").display().to_string());
        assert_eq!(entries[0]["findings"][0]["nodeId"], "f1");
        assert_eq!(entries[0]["findings"][0]["rule"], "outcome-under-demographics");
        assert!(entries[0].get("error").is_none());

        assert_eq!(entries[1]["findings"], serde_json::json!([]));
        assert!(entries[2]["error"].as_str().unwrap().contains("c_broken.json"));

        assert_eq!(
            Totals::from_reports(&reports),
            Totals {
                findings: 1,
                errors: 1,
                warnings: 1
            }
        );
    }

    #[test]
    fn test_one_set_of_options_serves_every_file() {
        let dir = schema_dir();
        std::fs::write(dir.path().join("d_misplaced.json"), MISPLACED).unwrap();
        let config = Config {
            lint: LintConfig {
                disabled_rules: vec!["outcome-under-demographics".to_string()],
                ..LintConfig::default()
            },
            ..Config::default()
        };
        let options = config.lint_options(dir.path()).unwrap();

        let reports = lint_dir(dir.path(), &options);
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|report| report.findings.is_empty()));
    }

    #[test]
    fn test_find_schema_files_skips_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.json"), "[]").unwrap();
        std::fs::write(dir.path().join("nested/b.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();

        let mut files = find_schema_files(dir.path());
        files.sort();
        assert_eq!(
            files,
            vec![dir.path().join("a.json"), dir.path().join("nested/b.json")]
        );
    }
}
