use anyhow::{Context, Result, bail, ensure};
use clap::{Args, Parser, Subcommand};
use console::style;
use hkmj::agent::{AgentKind, tiles_required};
use hkmj::algo::decompose::SearchStrategy;
use hkmj::algo::fan::{self, FanCalculator, Score, WinContext};
use hkmj::arena::{GameResult, RoundOutcome, Summary, Table};
use hkmj::config::{RuleConfig, TableConfig};
use hkmj::hand::{Hand, parse_meld, parse_tiles};
use hkmj::tile::{Tile, Wind};
use indicatif::{ParallelProgressIterator, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about = "Hong Kong mahjong scoring and self-play")]
struct Cli {
    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a complete hand, or list the waits of a 13-tile hand
    Eval(EvalArgs),
    /// Play one table and print every hand
    Play(TableArgs),
    /// Play many tables in parallel and print aggregate statistics
    Simulate {
        #[command(flatten)]
        table: TableArgs,
        /// Number of tables, seeded consecutively from --seed
        #[arg(short = 'n', long, default_value_t = 100)]
        tables: u32,
    },
}

#[derive(Args)]
struct EvalArgs {
    /// Concealed tiles in compact notation, e.g. "123p 456s EEE 11m 789m 1f"
    hand: String,
    /// Exposed melds, e.g. --melds EEE,5555p
    #[arg(short, long, value_delimiter = ',')]
    melds: Vec<String>,
    /// Bonus tiles, e.g. --bonus 1f5f
    #[arg(short, long)]
    bonus: Option<String>,
    /// Seat of the evaluated player, 0 is the dealer
    #[arg(long, default_value_t = 0)]
    seat: u8,
    /// Prevailing wind
    #[arg(long, default_value = "E")]
    wind: Wind,
    #[arg(long, default_value_t = 3)]
    min_fan: u8,
    /// Enumerate every decomposition instead of the greedy one per pair
    #[arg(long)]
    backtracking: bool,
}

#[derive(Args)]
struct TableArgs {
    /// JSON table config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    max_hands: Option<u32>,
    /// Four comma-separated agents out of basic, random, yes and passive
    #[arg(short, long, value_delimiter = ',')]
    agents: Option<Vec<AgentKind>>,
    /// Write every event as a JSON line to this file
    #[arg(long)]
    events: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

impl TableArgs {
    fn table_config(&self) -> Result<TableConfig> {
        let mut config = match &self.config {
            Some(path) => TableConfig::load(path)?,
            None => TableConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_hands) = self.max_hands {
            config.max_hands = max_hands;
        }
        if let Some(agents) = &self.agents {
            config.agents = agents
                .as_slice()
                .try_into()
                .with_context(|| format!("expected 4 agents, got {}", agents.len()))?;
        }
        Ok(config)
    }
}

fn print_score(score: &Score) {
    for p in &score.patterns {
        println!("  {p}");
    }
    if let Some(d) = &score.decomposition {
        let groups: Vec<_> = d.groups.iter().map(|g| format!("{g:?}")).collect();
        println!("  {}", style(groups.join(" ")).dim());
    }
}

fn eval(args: &EvalArgs) -> Result<()> {
    let (mut bonus, concealed): (Vec<_>, Vec<_>) =
        parse_tiles(&args.hand)?.into_iter().partition(|t| t.is_bonus());
    if let Some(extra) = &args.bonus {
        bonus.extend(parse_tiles(extra)?);
    }
    let melds = args
        .melds
        .iter()
        .map(|m| parse_meld(m))
        .collect::<Result<Vec<_>>>()?;
    let hand = Hand::from_parts(concealed, &melds, &bonus)?;
    let rules = RuleConfig {
        min_fan: args.min_fan,
        search: if args.backtracking {
            SearchStrategy::Backtracking
        } else {
            SearchStrategy::Greedy
        },
        ..Default::default()
    };
    let ctx = WinContext {
        prevailing_wind: args.wind,
        seat: args.seat,
    };

    println!("{}", style(&hand).bold());
    match hand.slot_count() {
        14 => {
            let calc = FanCalculator {
                concealed: hand.concealed(),
                melds: hand.melds(),
                bonus: hand.bonus_tiles(),
                prevailing_wind: ctx.prevailing_wind,
                seat: ctx.seat,
                rules: &rules,
            };
            if !calc.is_complete() {
                let required = tiles_required(hand.concealed(), hand.melds().len());
                println!("not complete, {} tiles required", required + 1);
                return Ok(());
            }
            let scores = calc.scores();
            for (i, score) in scores.iter().enumerate() {
                println!("{} {} fan", style(format!("#{i}")).dim(), score.fan);
                print_score(score);
            }
            if let Some(best) = calc.search_fan() {
                let verdict = if best.is_accepted(rules.min_fan) {
                    style("accepted").green()
                } else {
                    style("below the minimum").red()
                };
                println!("best {} fan, {verdict}", best.fan);
            }
        }
        13 => {
            let waits: Vec<_> = Tile::all()
                .filter(|t| !t.is_bonus() && hand.count(*t) < 4)
                .filter_map(|t| Some((t, fan::evaluate_with(&hand, t, ctx, &rules)?)))
                .collect();
            if waits.is_empty() {
                let required = tiles_required(hand.concealed(), hand.melds().len());
                println!("not ready, {} tiles required", required + 1);
            }
            for (tile, score) in waits {
                let fan = if score.is_accepted(rules.min_fan) {
                    style(score.fan).green()
                } else {
                    style(score.fan).red()
                };
                println!("{} {fan} fan", style(tile).cyan());
                print_score(&score);
            }
        }
        n => bail!("a hand holds 13 or 14 tiles, got {n}"),
    }
    Ok(())
}

fn write_events(path: &Path, results: &[GameResult]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for event in results.iter().flat_map(|r| &r.hands).flat_map(|h| &h.events) {
        serde_json::to_writer(&mut w, event)?;
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}

fn play(args: &TableArgs) -> Result<()> {
    let config = args.table_config()?;
    let result = Table::new(config).run()?;
    if let Some(path) = &args.events {
        write_events(path, std::slice::from_ref(&result))?;
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for record in &result.hands {
        let header = format!(
            "hand {} {} dealer {}",
            record.hand_no, record.prevailing_wind, record.dealer,
        );
        match &record.outcome {
            RoundOutcome::Draw => println!("{} {}", style(header).dim(), style("draw").yellow()),
            RoundOutcome::Win {
                winner,
                discarder,
                winning_tile,
                score,
                deltas,
            } => {
                let from = discarder.map_or_else(|| "self-draw".to_owned(), |d| format!("from {d}"));
                println!(
                    "{} {} wins on {winning_tile} {from}, {} fan {deltas:?}",
                    style(header).dim(),
                    style(format!("player {winner}")).green(),
                    score.fan,
                );
            }
        }
    }
    println!();
    for (p, name) in result.names.iter().enumerate() {
        println!("{p} {name:<8} {:>6}", result.totals[p]);
    }
    if !result.finished {
        println!("{}", style("stopped at the hand cap").dim());
    }
    Ok(())
}

fn simulate(args: &TableArgs, tables: u32) -> Result<()> {
    ensure!(tables > 0, "nothing to simulate");
    let base = args.table_config()?;
    let bar = ProgressStyle::with_template("{bar:40} {pos}/{len} tables [{elapsed_precise}<{eta_precise}]")?;
    log::info!("simulating {tables} tables from seed {}", base.seed);

    let results = (0..tables)
        .into_par_iter()
        .progress_with_style(bar)
        .map(|i| {
            let config = TableConfig {
                seed: base.seed.wrapping_add(u64::from(i)),
                ..base.clone()
            };
            let seed = config.seed;
            Table::new(config)
                .run()
                .with_context(|| format!("table {seed} failed"))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(path) = &args.events {
        write_events(path, &results)?;
    }
    let mut summary = Summary::default();
    for result in &results {
        summary.add(result);
    }
    print_summary(&summary, &base, args.json)
}

fn print_summary(summary: &Summary, config: &TableConfig, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "tables": summary.tables,
            "hands": summary.hands,
            "draws": summary.draws,
            "self_draws": summary.self_draws,
            "agents": config.agents,
            "win_rates": summary.win_rates(),
            "avg_points": summary.avg_points(),
            "avg_fan": summary.avg_fan(),
            "patterns": summary.pattern_counts(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} tables, {} hands, {} draws, {} self-draws, {:.2} average fan",
        summary.tables,
        summary.hands,
        summary.draws,
        summary.self_draws,
        summary.avg_fan(),
    );
    let rates = summary.win_rates();
    let points = summary.avg_points();
    for p in 0..4 {
        println!(
            "{p} {:<8} win {:>5.1}%  avg {:>8.1}",
            style(config.agents[p]).bold(),
            rates[p] * 100.,
            points[p],
        );
    }
    println!();
    for (pattern, n) in summary.pattern_counts() {
        println!("{n:>7} {pattern}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match &cli.command {
        Command::Eval(args) => eval(args),
        Command::Play(args) => play(args),
        Command::Simulate { table, tables } => simulate(table, *tables),
    }
}
