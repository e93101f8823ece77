use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::display::{
    board_display, equity_bar, potential_table, print_error, print_section, print_success,
    snapshot_table,
};
use holdem_core::cards::{parse_cards, Card};
use holdem_core::config::{EquityConfig, TableConfig};
use holdem_core::equity::EquityEstimator;
use holdem_core::error::HoldemResult;
use holdem_core::hand_evaluator::evaluate;
use holdem_core::hand_tables::{load_tables, HandTables};
use holdem_core::table::{Action, PlayerId, Table};

#[derive(Parser)]
#[command(name = "holdem", version, about = "Texas Hold'em hand ranking, equity and table simulation.")]
struct Cli {
    /// Load hand tables from a JSON file instead of generating them
    #[arg(long, global = true)]
    tables: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the best five-card hand out of 5 to 7 cards
    Rank {
        /// Cards (e.g., "As Ks Qs Js Ts")
        cards: String,
    },
    /// Strength of a hole-card pair against every opposing hand
    Strength {
        /// Hole cards (e.g., AsKs)
        hole: String,
        /// Board cards, 3 to 5
        #[arg(short, long)]
        board: String,
        /// Include the cards still to come
        #[arg(short, long)]
        potential: bool,
        /// Worker threads
        #[arg(short, long)]
        workers: Option<usize>,
        /// Share of opponent hands to sample, in (0, 1]
        #[arg(short, long)]
        sample: Option<f64>,
        /// Sampling seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Exact equity of one hand against another
    Versus {
        hero: String,
        villain: String,
        /// Board cards, 0, 3, 4 or 5
        #[arg(short, long, default_value = "")]
        board: String,
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Generate the hand tables and write them as JSON
    Tables {
        /// Output file
        out: PathBuf,
    },
    /// Play a scripted four-player hand
    Demo {
        /// Shuffle seed
        #[arg(long, default_value = "7")]
        seed: u64,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run() {
    let cli = Cli::parse();
    dispatch(cli);
}

fn dispatch(cli: Cli) {
    if let Some(path) = &cli.tables {
        if let Err(e) = load_tables(path) {
            print_error(&format!("{}: {}", path.display(), e));
            return;
        }
    }
    let result = match cli.command {
        Commands::Rank { cards } => cmd_rank(&cards),
        Commands::Strength {
            hole,
            board,
            potential,
            workers,
            sample,
            seed,
        } => {
            let config = EquityConfig {
                workers,
                sample_fraction: sample,
                seed,
            };
            cmd_strength(&hole, &board, potential, config)
        }
        Commands::Versus {
            hero,
            villain,
            board,
            workers,
        } => cmd_versus(&hero, &villain, &board, workers),
        Commands::Tables { out } => cmd_tables(&out),
        Commands::Demo { seed, json } => cmd_demo(seed, json),
    };
    if let Err(e) = result {
        print_error(&e.to_string());
    }
}

fn cmd_rank(notation: &str) -> HoldemResult<()> {
    let cards = parse_cards(notation)?;
    let result = evaluate(&cards)?;
    print_section("Cards", &board_display(&cards));
    print_section(
        &result.category.to_string(),
        &board_display(&result.cards),
    );
    Ok(())
}

fn cmd_strength(hole: &str, board: &str, potential: bool, config: EquityConfig) -> HoldemResult<()> {
    let hole = parse_cards(hole)?;
    let board = parse_cards(board)?;
    let estimator = EquityEstimator::new(config)?;

    print_section(
        "Hand",
        &format!("{}  |  {}", board_display(&hole), board_display(&board)),
    );
    let strength = estimator.hand_strength(&hole, &board)?;
    print_section("Hand strength", &equity_bar(strength, 30));

    if potential && board.len() < 5 {
        let matrix = estimator.potential(&hole, &board)?;
        print_section("Potential hand strength", &equity_bar(matrix.equity(), 30));
        println!(
            "  PPot {:.1}%  NPot {:.1}%  ({} scenarios, {} workers)",
            matrix.positive_potential() * 100.0,
            matrix.negative_potential() * 100.0,
            matrix.total(),
            estimator.workers()
        );
        println!("{}", potential_table(&matrix));
    }
    Ok(())
}

fn cmd_versus(hero: &str, villain: &str, board: &str, workers: Option<usize>) -> HoldemResult<()> {
    let hero = parse_cards(hero)?;
    let villain = parse_cards(villain)?;
    let board = parse_cards(board)?;
    let estimator = EquityEstimator::new(EquityConfig {
        workers,
        ..EquityConfig::default()
    })?;
    let result = estimator.equity_vs_hand(&hero, &villain, &board)?;

    print_section(
        "Matchup",
        &format!(
            "{}  vs  {}  on  {}",
            board_display(&hero),
            board_display(&villain),
            if board.is_empty() {
                "-".dimmed().to_string()
            } else {
                board_display(&board)
            }
        ),
    );
    print_section("Hero", &equity_bar(result.equity(), 30));
    print_section("Villain", &equity_bar(1.0 - result.equity(), 30));
    println!("\n  {}  over {} boards", result, result.scenarios);
    Ok(())
}

fn cmd_tables(out: &Path) -> HoldemResult<()> {
    let tables = HandTables::generate();
    std::fs::write(out, tables.to_json()?)?;
    print_success(&format!(
        "Wrote {} / {} / {} entries to {}",
        tables.len(5),
        tables.len(6),
        tables.len(7),
        out.display()
    ));
    Ok(())
}

fn cmd_demo(seed: u64, json: bool) -> HoldemResult<()> {
    let mut table = Table::new(TableConfig {
        seed: Some(seed),
        ..TableConfig::default()
    })?;
    let alex = table.add_player("alex")?;
    let bob = table.add_player("bob")?;
    let charlie = table.add_player("charlie")?;
    let david = table.add_player("david")?;
    table.start_hand()?;
    println!("{}", snapshot_table(&table.snapshot_all()));

    let script: [(PlayerId, Action); 20] = [
        // preflop
        (david, Action::Call),
        (alex, Action::Bet(30)),
        (bob, Action::Call),
        (charlie, Action::Call),
        (david, Action::Call),
        // flop
        (bob, Action::Check),
        (charlie, Action::Bet(50)),
        (david, Action::Call),
        (alex, Action::Bet(150)),
        (bob, Action::Fold),
        (charlie, Action::Call),
        (david, Action::Call),
        // turn
        (charlie, Action::Check),
        (david, Action::Bet(200)),
        (alex, Action::Call),
        (charlie, Action::Fold),
        // river
        (david, Action::Bet(300)),
        (alex, Action::Call),
        // showdown
        (david, Action::ShowHand),
        (alex, Action::Fold),
    ];

    let mut round = table.round();
    for (id, action) in script {
        if !table.in_hand() {
            break;
        }
        table.apply(id, action)?;
        if table.round() != round {
            round = table.round();
            if table.in_hand() {
                println!("{}", snapshot_table(&table.snapshot_all()));
            }
        }
    }

    if let Some(summary) = table.last_result() {
        let hand = summary
            .winning_hand
            .as_ref()
            .map(|h| {
                let cards: Vec<Card> = h
                    .cards
                    .iter()
                    .filter_map(|n| Card::from_short_name(n).ok())
                    .collect();
                format!("{} {}", h.category, board_display(&cards))
            })
            .unwrap_or_else(|| "uncontested".to_string());
        print_section(
            "Winner",
            &format!("{} takes ${} with {}", summary.winner_name.bold(), summary.pot, hand),
        );
    }
    println!("{}", snapshot_table(&table.snapshot_all()));
    if json {
        println!("{}", table.snapshot_all().to_json()?);
    }
    Ok(())
}
