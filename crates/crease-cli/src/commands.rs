use anyhow::Context;
use colored::Colorize;

use crease_engine::{BattingLine, EngineConfig, InningsAggregate};
use crease_server::{CreaseServer, ServerConfig};
use crease_types::WicketType;

use crate::cli::*;
use crate::script::{MatchReport, MatchScript};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Score(args) => cmd_score(args),
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!("crease server on {}", config.bind_addr.to_string().bold());
    if config.scorer_tokens.is_empty() {
        println!(
            "  {} no scorer tokens configured; the API is read-only",
            "!".yellow().bold()
        );
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(CreaseServer::new(config).serve())?;
    Ok(())
}

fn cmd_check_config(args: CheckConfigArgs) -> anyhow::Result<()> {
    let config = load_config(Some(args.config.as_path()))?;
    println!("{} {} is valid", "✓".green().bold(), args.config.display());
    println!("  Bind: {}", config.bind_addr);
    println!("  Scorer tokens: {}", config.scorer_tokens.len());
    println!("  Anonymous reads: {}", config.allow_anonymous_read);
    println!("  Default team size: {}", config.engine.default_team_size);
    println!("  Max runs per delivery: {}", config.engine.max_runs_per_delivery);
    Ok(())
}

fn cmd_score(args: ScoreArgs) -> anyhow::Result<()> {
    let engine: EngineConfig = load_config(args.config.as_deref())?.engine;
    let input = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let report = MatchScript::from_json(&input)?.run(engine)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &MatchReport) {
    for (innings, summary) in report.innings.iter().zip(&report.summaries) {
        println!(
            "\n{} {} ({} ov, RR {:.2})",
            summary.batting_team.bold(),
            summary.score.yellow().bold(),
            summary.overs,
            innings.run_rate()
        );
        print_batting(report, innings);
        print_bowling(report, innings);
        if let Some(chase) = &summary.chase {
            println!(
                "  Target {}: needed {} off {} balls",
                chase.target, chase.runs_needed, chase.balls_remaining
            );
        }
    }

    println!();
    match &report.state.result_text {
        Some(text) => println!("{}", text.green().bold()),
        None => println!("{} ({})", "Match in progress".yellow(), status_label(report)),
    }

    for (check, innings) in report.replay.iter().zip(&report.innings) {
        if check.converged && check.chain_valid {
            continue;
        }
        println!(
            "{} innings {} does not replay from its ledger",
            "✗".red().bold(),
            innings.number
        );
        for difference in &check.differences {
            println!("  {}", difference.dimmed());
        }
    }
}

fn status_label(report: &MatchReport) -> String {
    format!("innings {}", report.state.current_inning)
}

fn print_batting(report: &MatchReport, innings: &InningsAggregate) {
    println!(
        "  {:<16} {:<28} {:>4} {:>4} {:>3} {:>3} {:>7}",
        "Batter".dimmed(),
        "",
        "R".dimmed(),
        "B".dimmed(),
        "4s".dimmed(),
        "6s".dimmed(),
        "SR".dimmed()
    );
    for line in innings.batting.iter() {
        println!(
            "  {:<16} {:<28} {:>4} {:>4} {:>3} {:>3} {:>7.2}",
            report.player(&line.player_id),
            dismissal_text(report, line),
            line.runs,
            line.balls,
            line.fours,
            line.sixes,
            line.strike_rate
        );
    }
    let extras = &innings.extras;
    println!(
        "  {:<16} {:<28} {:>4}",
        "Extras",
        format!(
            "(w {}, nb {}, b {}, lb {})",
            extras.wide_runs, extras.no_balls, extras.byes, extras.leg_byes
        ),
        extras.total()
    );
}

fn print_bowling(report: &MatchReport, innings: &InningsAggregate) {
    println!(
        "  {:<16} {:>5} {:>3} {:>4} {:>3} {:>7}",
        "Bowler".dimmed(),
        "O".dimmed(),
        "M".dimmed(),
        "R".dimmed(),
        "W".dimmed(),
        "Econ".dimmed()
    );
    for line in innings.bowling.iter() {
        println!(
            "  {:<16} {:>5} {:>3} {:>4} {:>3} {:>7.2}",
            report.player(&line.player_id),
            line.overs.to_string(),
            line.maidens,
            line.runs_conceded,
            line.wickets,
            line.economy
        );
    }
}

/// Scorecard dismissal column, e.g. `c Dev b Fay`.
fn dismissal_text(report: &MatchReport, line: &BattingLine) -> String {
    let Some(kind) = line.dismissal_type.filter(|_| line.is_out) else {
        return "not out".into();
    };
    let bowler = line.dismissed_by.map(|id| report.player(&id).to_string());
    let fielder = line.fielder.map(|id| report.player(&id).to_string());
    match (kind, fielder, bowler) {
        (WicketType::RunOut, _, _) => kind.short_label().to_string(),
        (_, Some(fielder), Some(bowler)) => {
            format!("{} {fielder} b {bowler}", kind.short_label())
        }
        (WicketType::Bowled, _, Some(bowler)) => format!("b {bowler}"),
        (_, _, Some(bowler)) => format!("{} b {bowler}", kind.short_label()),
        _ => kind.short_label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SCRIPT: &str = r#"{
        "overs": 2,
        "teams": [
            { "name": "Lions", "players": ["Asha", "Ben", "Cal"] },
            { "name": "Tigers", "players": ["Dev", "Eli", "Fay"] }
        ],
        "toss": { "winner": "Lions", "decision": "bat" },
        "innings": [
            {
                "striker": "Asha", "nonStriker": "Ben", "bowler": "Fay",
                "events": [
                    { "ball": { "ballType": "wicket", "wicketType": "caught", "fielder": "Dev", "newBatsman": "Cal" } },
                    { "ball": { "runs": 1, "ballType": "wicket", "wicketType": "runOut", "dismissed": "Ben" } }
                ]
            }
        ]
    }"#;

    fn report() -> MatchReport {
        MatchScript::from_json(SCRIPT)
            .unwrap()
            .run(EngineConfig::default())
            .unwrap()
    }

    #[test]
    fn dismissal_column() {
        let report = report();
        let innings = &report.innings[0];
        let text: Vec<String> = innings
            .batting
            .iter()
            .map(|line| dismissal_text(&report, line))
            .collect();
        assert_eq!(text, vec!["c Dev b Fay", "run out", "not out"]);
    }

    #[test]
    fn score_command_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SCRIPT}").unwrap();
        cmd_score(ScoreArgs {
            file: file.path().to_path_buf(),
            config: None,
            format: OutputFormat::Json,
        })
        .unwrap();
    }

    #[test]
    fn check_config_rejects_bad_engine() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\ndefault_team_size = 1").unwrap();
        let err = cmd_check_config(CheckConfigArgs {
            config: file.path().to_path_buf(),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("default_team_size"));
    }
}
