use holdem_core::config::TableConfig;
use holdem_core::error::HoldemError;
use holdem_core::table::*;

fn seeded() -> TableConfig {
    TableConfig {
        seed: Some(3),
        ..TableConfig::default()
    }
}

/// Four players at seats 0..3 with the button on seat 0, blinds posted.
fn four_handed() -> (Table, Vec<PlayerId>) {
    let mut table = Table::new(seeded()).unwrap();
    let ids: Vec<PlayerId> = ["alex", "bob", "charlie", "david"]
        .iter()
        .map(|name| table.add_player(name).unwrap())
        .collect();
    table.start_hand().unwrap();
    (table, ids)
}

fn total_chips(table: &Table) -> u32 {
    table.players().iter().map(|p| p.balance()).sum::<u32>() + table.pot()
}

#[test]
fn test_blinds_and_first_to_act() {
    let (table, ids) = four_handed();
    assert_eq!(table.dealer(), 0);
    assert_eq!(table.round(), Round::PreFlop);
    assert_eq!(table.pot(), 15);
    assert_eq!(table.required_bet(), 10);
    assert_eq!(table.required_raise(), 10);
    assert_eq!(table.to_act(), Some(ids[3]));
    assert_eq!(table.queue(), vec![ids[3], ids[0], ids[1], ids[2]]);
    assert_eq!(table.player(ids[1]).unwrap().current_bet(), 5);
    assert_eq!(table.player(ids[2]).unwrap().current_bet(), 10);
}

#[test]
fn test_dealing() {
    let (table, _) = four_handed();
    for p in table.players() {
        assert_eq!(p.hand().len(), 2);
    }
    assert_eq!(table.board().len(), 3);
    assert!(!table.board().is_revealed());
    // 8 hole cards, one burn, three board cards
    assert_eq!(table.deck_remaining(), 40);
}

#[test]
fn test_bet_sets_required_and_blocks_check() {
    let (mut table, ids) = four_handed();
    table.bet(ids[3], 30).unwrap();
    assert_eq!(table.required_bet(), 30);
    assert_eq!(table.required_raise(), 20);
    assert_eq!(table.player(ids[3]).unwrap().current_bet(), 30);
    assert_eq!(table.pot(), 45);

    assert!(matches!(
        table.check(ids[0]),
        Err(HoldemError::CallRequired { owed: 30 })
    ));
    assert_eq!(table.to_act(), Some(ids[0]));
}

#[test]
fn test_out_of_turn_leaves_table_unchanged() {
    let (mut table, ids) = four_handed();
    let err = table.bet(ids[1], 40).unwrap_err();
    assert!(matches!(
        err,
        HoldemError::OutOfTurn { expected, actual } if expected == ids[3] && actual == ids[1]
    ));
    assert_eq!(table.pot(), 15);
    assert_eq!(table.required_bet(), 10);
    assert_eq!(table.to_act(), Some(ids[3]));
    assert!(table.history().is_empty());
}

#[test]
fn test_raise_too_small() {
    let (mut table, ids) = four_handed();
    table.bet(ids[3], 30).unwrap();
    assert!(matches!(
        table.bet(ids[0], 40),
        Err(HoldemError::RaiseTooSmall { amount: 40, minimum: 50 })
    ));
    table.bet(ids[0], 50).unwrap();
    assert_eq!(table.required_bet(), 50);
}

#[test]
fn test_bet_beyond_balance_rejected() {
    let (mut table, ids) = four_handed();
    assert!(matches!(
        table.bet(ids[3], 5000),
        Err(HoldemError::InsufficientBalance { needed: 5000, balance: 1000, .. })
    ));
    assert_eq!(table.pot(), 15);
    assert_eq!(table.player(ids[3]).unwrap().balance(), 1000);
}

#[test]
fn test_raise_reopens_action() {
    let (mut table, ids) = four_handed();
    table.call(ids[3]).unwrap();
    table.call(ids[0]).unwrap();
    table.bet(ids[1], 40).unwrap();
    assert_eq!(table.queue(), vec![ids[2], ids[3], ids[0]]);
}

#[test]
fn test_call_and_nothing_to_call() {
    let (mut table, ids) = four_handed();
    table.call(ids[3]).unwrap();
    assert_eq!(table.player(ids[3]).unwrap().balance(), 990);
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();
    // big blind already matches
    assert!(matches!(table.call(ids[2]), Err(HoldemError::NothingToCall)));
    table.check(ids[2]).unwrap();
    assert_eq!(table.round(), Round::Flop);
    assert_eq!(table.pot(), 40);
    assert_eq!(table.required_bet(), 0);
    assert!(table.board().is_revealed());
    assert_eq!(table.to_act(), Some(ids[1]));
}

#[test]
fn test_all_in() {
    let (mut table, ids) = four_handed();
    table.all_in(ids[3]).unwrap();
    let player = table.player(ids[3]).unwrap();
    assert_eq!(player.balance(), 0);
    assert!(player.is_all_in());
    assert_eq!(table.required_bet(), 1000);
    assert_eq!(table.required_raise(), 990);
    assert_eq!(table.pot(), 1015);
    assert!(!table.queue().contains(&ids[3]));
}

#[test]
fn test_fold_to_one_awards_pot() {
    let (mut table, ids) = four_handed();
    table.fold(ids[3]).unwrap();
    table.fold(ids[0]).unwrap();
    table.fold(ids[1]).unwrap();

    assert!(!table.in_hand());
    let summary = table.last_result().unwrap();
    assert_eq!(summary.winner, ids[2]);
    assert_eq!(summary.pot, 15);
    assert!(summary.winning_hand.is_none());
    assert_eq!(summary.actions.len(), 3);
    assert_eq!(table.player(ids[2]).unwrap().balance(), 1005);
    assert_eq!(table.player(ids[1]).unwrap().balance(), 995);
    assert_eq!(table.dealer(), 1);
    assert_eq!(table.pot(), 0);
}

#[test]
fn test_second_hand_moves_blinds() {
    let (mut table, ids) = four_handed();
    table.fold(ids[3]).unwrap();
    table.fold(ids[0]).unwrap();
    table.fold(ids[1]).unwrap();
    assert_eq!(table.dealer(), 1);

    table.start_hand().unwrap();
    assert!(table.in_hand());
    assert_eq!(table.round(), Round::PreFlop);
    assert_eq!(table.dealer(), 1);
    let bets: Vec<u32> = table.players().iter().map(|p| p.current_bet()).collect();
    assert_eq!(bets, vec![0, 0, 5, 10]);
    assert_eq!(table.pot(), 15);
    assert_eq!(table.required_bet(), 10);
    // first to act sits three seats after the new button
    assert_eq!(table.to_act(), Some(ids[0]));
    assert_eq!(table.queue(), vec![ids[0], ids[1], ids[2], ids[3]]);

    // a fresh deck: 8 hole cards, one burn, a face-down flop
    assert_eq!(table.deck_remaining(), 40);
    assert_eq!(table.board().len(), 3);
    assert!(!table.board().is_revealed());
    for p in table.players() {
        assert_eq!(p.hand().len(), 2);
        assert!(p.is_active());
    }
    assert_eq!(table.player(ids[2]).unwrap().balance(), 1000);
    assert_eq!(table.player(ids[3]).unwrap().balance(), 985);
    assert!(table.history().is_empty());
}

fn check_around(table: &mut Table) {
    while let Some(id) = table.to_act() {
        if table.round() == Round::Showdown {
            break;
        }
        table.check(id).unwrap();
    }
}

#[test]
fn test_full_hand_to_showdown() {
    let (mut table, ids) = four_handed();
    table.call(ids[3]).unwrap();
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();
    table.check(ids[2]).unwrap();

    assert_eq!(table.round(), Round::Flop);
    check_around(&mut table);
    assert_eq!(table.round(), Round::Showdown);
    assert_eq!(table.board().len(), 5);
    // three burns in total
    assert_eq!(table.deck_remaining(), 36);
    assert!(matches!(table.check(ids[1]), Err(HoldemError::BettingClosed)));

    for id in table.queue() {
        table.show_hand(id).unwrap();
    }
    assert!(!table.in_hand());
    let summary = table.last_result().unwrap();
    assert_eq!(summary.pot, 40);
    assert!(summary.winning_hand.is_some());
    assert_eq!(total_chips(&table), 4000);
    assert_eq!(table.dealer(), 1);
    assert_eq!(table.round(), Round::PreFlop);
    assert!(table.board().is_empty());
    assert!(table.players().iter().all(|p| p.hand().is_empty()));
}

#[test]
fn test_show_hand_only_at_showdown() {
    let (mut table, ids) = four_handed();
    assert!(matches!(table.show_hand(ids[3]), Err(HoldemError::NotShowdown)));
}

#[test]
fn test_all_in_runs_out_the_board() {
    let mut table = Table::new(seeded()).unwrap();
    let a = table.add_player_with_balance("a", 100).unwrap();
    let b = table.add_player_with_balance("b", 100).unwrap();
    table.start_hand().unwrap();
    // heads up: seat 1 posts the small blind and acts first
    assert_eq!(table.to_act(), Some(b));

    table.all_in(b).unwrap();
    table.call(a).unwrap();
    assert_eq!(table.round(), Round::Showdown);
    assert_eq!(table.board().len(), 5);
    assert_eq!(table.queue(), vec![b, a]);

    table.show_hand(b).unwrap();
    table.show_hand(a).unwrap();
    // the winner takes everything, the busted player leaves
    let balances: Vec<u32> = table.players().iter().map(|p| p.balance()).collect();
    assert_eq!(balances, vec![200]);
    assert!(matches!(table.start_hand(), Err(HoldemError::NotEnoughPlayers(1))));
}

#[test]
fn test_short_blind_goes_all_in() {
    let mut table = Table::new(seeded()).unwrap();
    let ids: Vec<PlayerId> = [1000, 1000, 7]
        .iter()
        .enumerate()
        .map(|(i, &chips)| table.add_player_with_balance(&format!("p{}", i), chips).unwrap())
        .collect();
    table.start_hand().unwrap();
    let short = table.player(ids[2]).unwrap();
    assert!(short.is_all_in());
    assert_eq!(short.current_bet(), 7);
    assert_eq!(table.pot(), 12);
    assert_eq!(table.required_bet(), 10);
    assert_eq!(table.queue(), vec![ids[0], ids[1]]);
}

#[test]
fn test_seating_rules() {
    let mut table = Table::new(seeded()).unwrap();
    let only = table.add_player("solo").unwrap();
    assert!(matches!(table.start_hand(), Err(HoldemError::NotEnoughPlayers(1))));

    table.add_player("other").unwrap();
    table.start_hand().unwrap();
    assert!(matches!(table.start_hand(), Err(HoldemError::HandInProgress)));
    assert!(matches!(table.add_player("late"), Err(HoldemError::HandInProgress)));
    assert!(matches!(table.remove_player(only), Err(HoldemError::HandInProgress)));
    assert!(matches!(
        table.player(PlayerId(99)),
        Err(HoldemError::UnknownPlayer(PlayerId(99)))
    ));
}

#[test]
fn test_table_full() {
    let mut table = Table::new(seeded()).unwrap();
    for i in 0..MAX_SEATS {
        table.add_player(&format!("p{}", i)).unwrap();
    }
    assert!(matches!(table.add_player("extra"), Err(HoldemError::TableFull(22))));
}

#[test]
fn test_history_records_actions() {
    let (mut table, ids) = four_handed();
    table.bet(ids[3], 30).unwrap();
    table.fold(ids[0]).unwrap();
    let history = table.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, Action::Bet(30));
    assert_eq!(history[0].amount, 30);
    assert_eq!(history[0].round, Round::PreFlop);
    assert_eq!(history[1].player, ids[0]);
    assert_eq!(history[1].action.letter(), 'F');
}

#[test]
fn test_seeded_tables_deal_alike() {
    let (a, _) = four_handed();
    let (b, _) = four_handed();
    let hands = |t: &Table| -> Vec<String> {
        t.players()
            .iter()
            .flat_map(|p| p.hand().iter().map(|c| c.short_name()))
            .collect()
    };
    assert_eq!(hands(&a), hands(&b));
}

#[test]
fn test_snapshot_withholds_cards() {
    let (mut table, ids) = four_handed();
    let view = table.snapshot(ids[0]);
    assert_eq!(view.pot, 15);
    assert_eq!(view.board, vec![None, None, None]);
    assert!(view.players[0].hand.iter().all(|c| c.is_some()));
    assert!(view.players[1].hand.iter().all(|c| c.is_none()));

    let all = table.snapshot_all();
    assert!(all.board.iter().all(|c| c.is_some()));
    assert!(all.players.iter().all(|p| p.hand.iter().all(|c| c.is_some())));

    let json = view.to_json().unwrap();
    assert!(json.contains("\"hand\""));
    assert!(json.contains("null"));

    table.call(ids[3]).unwrap();
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();
    table.check(ids[2]).unwrap();
    let flop = table.snapshot(ids[0]);
    assert!(flop.board.iter().all(|c| c.is_some()));
    assert_eq!(flop.round, Round::Flop);
}

#[test]
fn test_shown_hands_become_public() {
    let (mut table, ids) = four_handed();
    table.call(ids[3]).unwrap();
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();
    table.check(ids[2]).unwrap();
    check_around(&mut table);
    let first = table.to_act().unwrap();
    table.show_hand(first).unwrap();

    let seat = table.seat_of(first).unwrap();
    let viewer = ids.iter().copied().find(|&id| id != first).unwrap();
    let view = table.snapshot(viewer);
    assert!(view.players[seat].hand.iter().all(|c| c.is_some()));
    assert_eq!(view.winner, Some(first));
    assert!(view.winning_hand.is_some());
}

#[test]
fn test_committed_spans_rounds() {
    let (mut table, ids) = four_handed();
    table.call(ids[3]).unwrap();
    table.call(ids[0]).unwrap();
    table.call(ids[1]).unwrap();
    table.check(ids[2]).unwrap();
    assert_eq!(table.round(), Round::Flop);
    assert_eq!(table.to_act(), Some(ids[1]));

    table.bet(ids[1], 20).unwrap();
    let bettor = table.player(ids[1]).unwrap();
    assert_eq!(bettor.current_bet(), 20);
    assert_eq!(bettor.committed(), 30);

    let view = table.snapshot_all();
    assert_eq!(view.players[1].current_bet, 20);
    assert_eq!(view.players[1].committed, 30);
    assert_eq!(view.players[2].current_bet, 0);
    assert_eq!(view.players[2].committed, 10);
    let in_pot: u32 = view.players.iter().map(|p| p.committed).sum();
    assert_eq!(in_pot, view.pot);
}
