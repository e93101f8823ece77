use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use holdem_core::cards::{Card, Suit};
use holdem_core::equity::{HandPotential, Standing};
use holdem_core::snapshot::TableSnapshot;

pub fn equity_bar(equity: f64, width: usize) -> String {
    let filled = ((equity.clamp(0.0, 1.0)) * width as f64) as usize;
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.1}%", equity * 100.0);

    if equity >= 0.6 {
        format!("{} {}", bar.green(), pct)
    } else if equity >= 0.4 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

fn colored_card(card: &Card) -> String {
    let text = card.pretty();
    match card.suit {
        Suit::Spades => text.white().to_string(),
        Suit::Hearts => text.red().to_string(),
        Suit::Diamonds => text.blue().to_string(),
        Suit::Clubs => text.green().to_string(),
    }
}

pub fn board_display(cards: &[Card]) -> String {
    cards.iter().map(colored_card).collect::<Vec<_>>().join(" ")
}

/// Short names with hidden cards drawn as `??`.
fn hidden_display(names: &[Option<String>]) -> String {
    names
        .iter()
        .map(|n| match n.as_deref().map(Card::from_short_name) {
            Some(Ok(card)) => colored_card(&card),
            Some(Err(_)) => "??".red().to_string(),
            None => "??".dimmed().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn potential_table(potential: &HandPotential) -> String {
    use Standing::*;
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Now \\ Final"),
        Cell::new("Ahead").set_alignment(CellAlignment::Right),
        Cell::new("Tied").set_alignment(CellAlignment::Right),
        Cell::new("Behind").set_alignment(CellAlignment::Right),
        Cell::new("Total").set_alignment(CellAlignment::Right),
    ]);
    for (label, now) in [("Ahead", Ahead), ("Tied", Tied), ("Behind", Behind)] {
        let mut row = vec![Cell::new(label.bold().to_string())];
        for last in [Ahead, Tied, Behind] {
            row.push(Cell::new(potential.get(now, last)).set_alignment(CellAlignment::Right));
        }
        row.push(Cell::new(potential.row_total(now)).set_alignment(CellAlignment::Right));
        table.add_row(row);
    }
    table.to_string()
}

pub fn snapshot_table(snapshot: &TableSnapshot) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Seat"),
        Cell::new("Player"),
        Cell::new("Hand"),
        Cell::new("Balance").set_alignment(CellAlignment::Right),
        Cell::new("Bet").set_alignment(CellAlignment::Right),
        Cell::new("In pot").set_alignment(CellAlignment::Right),
        Cell::new("Status"),
    ]);

    let next = snapshot.queue.first();
    for (seat, p) in snapshot.players.iter().enumerate() {
        let mut name = p.name.clone();
        if seat == snapshot.dealer {
            name.push_str(" (D)");
        }
        let name = if next == Some(&p.id) {
            name.yellow().bold().to_string()
        } else {
            name
        };
        let status = if !p.active {
            "folded".dimmed().to_string()
        } else if p.all_in {
            "all-in".red().bold().to_string()
        } else {
            "in".green().to_string()
        };
        table.add_row(vec![
            Cell::new(seat),
            Cell::new(name),
            Cell::new(hidden_display(&p.hand)),
            Cell::new(format!("${}", p.balance)).set_alignment(CellAlignment::Right),
            Cell::new(format!("${}", p.current_bet)).set_alignment(CellAlignment::Right),
            Cell::new(format!("${}", p.committed)).set_alignment(CellAlignment::Right),
            Cell::new(status),
        ]);
    }

    format!(
        "  {}  {}  pot ${}  to call ${}\n{}",
        snapshot.round.to_string().bold(),
        hidden_display(&snapshot.board),
        snapshot.pot,
        snapshot.required_bet,
        table
    )
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("  {}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
