//! Analyze command: submit an artifact, wait for the full report, render.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use kensa_engine::{
    AnalysisSession, ArtifactKind, GatewayConfig, InferenceGateway, KillChainStage, OpenAiGateway,
    Perspective, ProviderConfig, Report, SessionStatus, Severity, Vulnerability,
};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Artifact file to analyze; reads stdin when omitted
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Artifact kind: code, api, sql, config
    #[arg(short, long, default_value = "code")]
    pub kind: ArtifactKind,

    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Narrative to render: defender or attacker
    #[arg(short, long, default_value = "defender")]
    pub perspective: Perspective,

    /// Gateway config file (YAML); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub openai_api_key: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub async fn execute(args: AnalyzeArgs) -> Result<()> {
    let start = Instant::now();

    let (content, label) = read_artifact(&args)?;

    if args.verbose {
        eprintln!(
            "{}",
            format!("🔍 Submitting {} ({} bytes) for analysis...", label, content.len()).cyan()
        );
    }

    let gateway = build_gateway(&args)?;
    let mut session = AnalysisSession::new();

    let status = session.analyze(&gateway, &content, &label).await;

    match status {
        SessionStatus::Completed => {}
        SessionStatus::Failed => {
            let error = session.error().expect("failed session carries an error");
            eprintln!("{} {}", "❌ Analysis failed:".red().bold(), error);
            eprintln!(
                "{}",
                "   The submitted content is retained; re-run to retry.".bright_black()
            );
            anyhow::bail!("analysis failed: {}", error);
        }
        SessionStatus::Idle => {
            anyhow::bail!("nothing to analyze: input is empty");
        }
        SessionStatus::Analyzing => unreachable!("analyze() always settles"),
    }

    session.set_perspective(args.perspective);
    let report = session.report().expect("completed session has a report");

    let rendered = match args.format {
        OutputFormat::Text => render_text(report, &session, &label),
        OutputFormat::Json => report.to_export_json()?,
        OutputFormat::Markdown => render_markdown(report, args.perspective, &label),
    };

    if let Some(output_path) = &args.output {
        std::fs::write(output_path, rendered)
            .with_context(|| format!("Failed to write report to {:?}", output_path))?;
    } else {
        println!("{}", rendered);
    }

    if args.verbose {
        eprintln!(
            "{} {:.2}s, model {}",
            "✅ Done in".green(),
            start.elapsed().as_secs_f64(),
            gateway.model_name()
        );
    }

    Ok(())
}

fn read_artifact(args: &AnalyzeArgs) -> Result<(String, String)> {
    match &args.input {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {:?}", path))?;
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            Ok((content, label))
        }
        None => {
            let content = std::io::read_to_string(std::io::stdin())
                .context("Failed to read artifact from stdin")?;
            Ok((content, "stdin".to_string()))
        }
    }
}

fn build_gateway(args: &AnalyzeArgs) -> Result<OpenAiGateway> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load gateway config: {:?}", path))?,
        None => GatewayConfig::from_env(),
    };

    if let ProviderConfig::OpenAi {
        model,
        api_key,
        base_url,
    } = &mut config.provider
    {
        if let Some(flag_model) = &args.model {
            *model = flag_model.clone();
        }
        if args.openai_api_key.is_some() {
            *api_key = args.openai_api_key.clone();
        }
        if args.base_url.is_some() {
            *base_url = args.base_url.clone();
        }
    }

    Ok(OpenAiGateway::from_gateway_config(&config)?.with_template(args.kind.template_name()))
}

fn severity_badge(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::High => "HIGH".bright_red(),
        Severity::Medium => "MEDIUM".yellow(),
        Severity::Low => "LOW".green(),
    }
}

fn render_text(report: &Report, session: &AnalysisSession, label: &str) -> String {
    use std::fmt::Write;
    let mut output = String::new();

    let _ = writeln!(&mut output, "\n{}", "════════════════════════════════════════".bright_blue());
    let _ = writeln!(&mut output, "{}", "     SECURITY ANALYSIS REPORT".bright_blue().bold());
    let _ = writeln!(&mut output, "{}", "════════════════════════════════════════".bright_blue());
    let _ = writeln!(&mut output, "  Artifact: {}", label.bright_white());
    let _ = writeln!(
        &mut output,
        "  Overall risk: {}",
        format!("{:.0}/100", report.overall_risk_score).bright_white().bold()
    );
    if let Some(maturity) = report.maturity_score {
        let _ = writeln!(&mut output, "  Maturity: {:.0}", maturity);
    }

    if report.vulnerabilities.is_empty() {
        let _ = writeln!(&mut output, "\n{}", "✨ No vulnerabilities found!".green());
        return output;
    }

    let _ = write!(&mut output, "\n  ");
    for severity in [Severity::Critical, Severity::High, Severity::Medium, Severity::Low] {
        let count = report.count_at(severity);
        if count > 0 {
            let _ = write!(&mut output, "{} {}  ", count, severity_badge(severity));
        }
    }
    let _ = writeln!(&mut output);

    let perspective = session.perspective().unwrap_or_default();
    let selected_id = session.selected_vulnerability_id();

    for vulnerability in report.by_severity() {
        let marker = if selected_id == Some(vulnerability.id.as_str()) {
            "▶".bright_white()
        } else {
            "•".bright_black()
        };

        let _ = writeln!(&mut output, "\n{}", "─".repeat(40).bright_black());
        let _ = writeln!(
            &mut output,
            "{} {} {} {}",
            marker,
            severity_badge(vulnerability.severity),
            vulnerability.title.bright_white().bold(),
            format!("[{}]", vulnerability.id).bright_black()
        );
        if let Some(category) = &vulnerability.category {
            let _ = writeln!(&mut output, "  Category: {}", category);
        }

        match perspective {
            Perspective::Defender => render_defender_view(&mut output, vulnerability),
            Perspective::Attacker => render_attacker_view(&mut output, vulnerability),
        }
    }

    output
}

fn render_defender_view(output: &mut String, vulnerability: &Vulnerability) {
    use std::fmt::Write;

    let _ = writeln!(output, "  {}", vulnerability.description.bright_black());
    if let Some(defender_logic) = &vulnerability.defender_logic {
        let _ = writeln!(output, "  {} {}", "Fix:".green().bold(), defender_logic.green());
    }
    let _ = writeln!(
        output,
        "  Confidence: {}",
        format!("{:.0}%", vulnerability.display_confidence() * 100.0).cyan()
    );
    let _ = writeln!(output, "\n  {}", "Secure implementation:".bright_white());
    for line in vulnerability.secure_code_fix.lines() {
        let _ = writeln!(output, "    {}", line.bright_green());
    }
}

fn render_attacker_view(output: &mut String, vulnerability: &Vulnerability) {
    use std::fmt::Write;

    if let Some(attacker_logic) = &vulnerability.attacker_logic {
        let _ = writeln!(
            output,
            "  {} {}",
            "⚠ Exploitation:".red().bold(),
            attacker_logic.bright_red()
        );
    }
    if let Some(impact) = &vulnerability.impact {
        let _ = writeln!(output, "  Impact: {}", impact);
    }
    if let Some(payload) = &vulnerability.simulated_payload {
        let _ = writeln!(output, "  Simulated payload: {}", payload.red());
    }
    if let Some(snippet) = &vulnerability.vulnerable_code_snippet {
        let _ = writeln!(output, "  Vulnerable code: {}", snippet.bright_black());
    }

    let _ = writeln!(output, "  Kill chain:");
    for stage in KillChainStage::ALL {
        if stage.matches(vulnerability.kill_chain_stage.as_deref()) {
            let _ = writeln!(output, "    {} {}", "▶".red(), stage.name().red().bold());
        } else {
            let _ = writeln!(output, "      {}", stage.name().bright_black());
        }
    }
}

fn render_markdown(report: &Report, perspective: Perspective, label: &str) -> String {
    use std::fmt::Write;
    let mut output = String::new();

    let _ = writeln!(&mut output, "# Security Analysis Report");
    let _ = writeln!(&mut output, "\n**Artifact:** `{}`", label);
    let _ = writeln!(
        &mut output,
        "**Date:** {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        &mut output,
        "**Overall risk:** {:.0}/100",
        report.overall_risk_score
    );
    if let Some(maturity) = report.maturity_score {
        let _ = writeln!(&mut output, "**Maturity:** {:.0}", maturity);
    }

    let _ = writeln!(&mut output, "\n## Summary");
    let _ = writeln!(&mut output, "\n| Severity | Count |");
    let _ = writeln!(&mut output, "|----------|-------|");
    for severity in [Severity::Critical, Severity::High, Severity::Medium, Severity::Low] {
        let count = report.count_at(severity);
        if count > 0 {
            let _ = writeln!(&mut output, "| {} | {} |", severity.badge(), count);
        }
    }

    let _ = writeln!(&mut output, "\n## Findings");

    for (i, vulnerability) in report.by_severity().into_iter().enumerate() {
        let _ = writeln!(
            &mut output,
            "\n### {}. **{}** {} (`{}`)",
            i + 1,
            vulnerability.severity.badge(),
            vulnerability.title,
            vulnerability.id
        );

        let _ = writeln!(&mut output, "\n{}", vulnerability.description);

        match perspective {
            Perspective::Defender => {
                if let Some(defender_logic) = &vulnerability.defender_logic {
                    let _ = writeln!(&mut output, "\n**Recommended fix:** {}", defender_logic);
                }
                let _ = writeln!(
                    &mut output,
                    "\n**Confidence:** {:.0}%",
                    vulnerability.display_confidence() * 100.0
                );
                let _ = writeln!(&mut output, "\n```\n{}\n```", vulnerability.secure_code_fix);
            }
            Perspective::Attacker => {
                if let Some(attacker_logic) = &vulnerability.attacker_logic {
                    let _ = writeln!(&mut output, "\n**Exploitation:** {}", attacker_logic);
                }
                if let Some(impact) = &vulnerability.impact {
                    let _ = writeln!(&mut output, "\n**Impact:** {}", impact);
                }
                if let Some(payload) = &vulnerability.simulated_payload {
                    let _ = writeln!(&mut output, "\n**Simulated payload:** `{}`", payload);
                }
                if let Some(stage) = &vulnerability.kill_chain_stage {
                    let _ = writeln!(&mut output, "\n**Kill-chain stage:** {}", stage);
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kensa_engine::MockGateway;

    fn completed_session() -> AnalysisSession {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut session = AnalysisSession::new();
        runtime.block_on(session.analyze(
            &MockGateway::new(),
            "\"SELECT * FROM users WHERE id=\" + userInput",
            "lookup.sql",
        ));
        assert_eq!(session.status(), SessionStatus::Completed);
        session
    }

    #[test]
    fn test_text_rendering_defender_default() {
        let session = completed_session();
        let report = session.report().unwrap();

        let text = render_text(report, &session, "lookup.sql");
        assert!(text.contains("SECURITY ANALYSIS REPORT"));
        assert!(text.contains("SQL Injection"));
        assert!(text.contains("Secure implementation"));
    }

    #[test]
    fn test_text_rendering_attacker_view() {
        let mut session = completed_session();
        session.set_perspective(Perspective::Attacker);
        let report = session.report().unwrap();

        let text = render_text(report, &session, "lookup.sql");
        assert!(text.contains("Kill chain"));
        assert!(text.contains("Exploit"));
    }

    #[test]
    fn test_markdown_rendering() {
        let session = completed_session();
        let report = session.report().unwrap();

        let md = render_markdown(report, Perspective::Defender, "lookup.sql");
        assert!(md.starts_with("# Security Analysis Report"));
        assert!(md.contains("| CRITICAL | 1 |"));
        assert!(md.contains("```"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown)));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
