use std::cmp::Ordering;

use itertools::Itertools;

use holdem_core::cards::*;
use holdem_core::error::HoldemError;
use holdem_core::hand_evaluator::*;

fn cards(notation: &str) -> Vec<Card> {
    parse_cards(notation).unwrap()
}

fn category_of(notation: &str) -> HandCategory {
    evaluate(&cards(notation)).unwrap().category
}

#[test]
fn test_every_category() {
    assert_eq!(category_of("As Ks Qs Js Ts"), HandCategory::RoyalFlush);
    assert_eq!(category_of("9h 8h 7h 6h 5h"), HandCategory::StraightFlush);
    assert_eq!(category_of("Ac Ad Ah As 2c"), HandCategory::FourOfAKind);
    assert_eq!(category_of("Kc Kd Kh 2s 2c"), HandCategory::FullHouse);
    assert_eq!(category_of("Ad 9d 7d 4d 2d"), HandCategory::Flush);
    assert_eq!(category_of("9c 8d 7h 6s 5c"), HandCategory::Straight);
    assert_eq!(category_of("7c 7d 7h Ks 2c"), HandCategory::ThreeOfAKind);
    assert_eq!(category_of("Jc Jd 4h 4s 9c"), HandCategory::TwoPair);
    assert_eq!(category_of("Qc Qd 8h 5s 2c"), HandCategory::OnePair);
    assert_eq!(category_of("Ac Jd 8h 5s 2c"), HandCategory::HighCard);
}

#[test]
fn test_category_values() {
    assert_eq!(HandCategory::HighCard.value(), 1);
    assert_eq!(HandCategory::RoyalFlush.value(), 10);
    assert!(HandCategory::StraightFlush > HandCategory::FourOfAKind);
    assert!(HandCategory::Flush > HandCategory::Straight);
}

#[test]
fn test_seven_card_hands() {
    assert_eq!(category_of("Ah Kh Qh Jh Th 2c 3d"), HandCategory::RoyalFlush);
    assert_eq!(category_of("2s 3s 4s 5s As Kd Kc"), HandCategory::StraightFlush);
    assert_eq!(category_of("Kc Kd Kh Qs Qc Qd 2s"), HandCategory::FullHouse);
    assert_eq!(category_of("Ts 9s 8s 7d 6s 2s Jc"), HandCategory::Flush);
    assert_eq!(category_of("Ac Ad Kh Ks Qc Qd 2s"), HandCategory::TwoPair);
}

#[test]
fn test_two_pair_picks_best_kicker() {
    let result = evaluate(&cards("Ac Ad Kh Ks Qc Qd 2s")).unwrap();
    assert_eq!(result.kickers, vec![14, 14, 13, 13, 12]);
}

#[test]
fn test_flush_with_straight_on_board() {
    // straight across suits, flush in hearts
    let result = evaluate(&cards("9h 8c 7h 6d 5h 2h Kh")).unwrap();
    assert_eq!(result.category, HandCategory::Flush);
    assert_eq!(result.kickers, vec![13, 9, 7, 5, 2]);
}

#[test]
fn test_wheel_is_lowest_straight() {
    let wheel = evaluate(&cards("Ac 2d 3h 4s 5c")).unwrap();
    let six_high = evaluate(&cards("2d 3h 4s 5c 6d")).unwrap();
    assert_eq!(wheel.category, HandCategory::Straight);
    assert_eq!(wheel.kickers, vec![5, 4, 3, 2, 1]);
    assert!(six_high > wheel);

    let steel_wheel = evaluate(&cards("Ad 2d 3d 4d 5d")).unwrap();
    assert_eq!(steel_wheel.category, HandCategory::StraightFlush);
    assert_eq!(steel_wheel.kickers, vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_straight_flush_beats_straight() {
    let board = cards("9h 8h 7h 2c 3d");
    let ord = compare_hands(&cards("6h 5h"), &cards("Tc 6c"), &board).unwrap();
    assert_eq!(ord, Ordering::Greater);
}

#[test]
fn test_kicker_decides() {
    let board = cards("Ah 9c 7d 4s 2h");
    let ord = compare_hands(&cards("Ad Kc"), &cards("As Qc"), &board).unwrap();
    assert_eq!(ord, Ordering::Greater);
}

#[test]
fn test_split_pot() {
    let board = cards("As Ks Qd Jh Tc");
    let ord = compare_hands(&cards("2c 3c"), &cards("4d 5d"), &board).unwrap();
    assert_eq!(ord, Ordering::Equal);
}

#[test]
fn test_permutation_invariance() {
    let hand = cards("Kc Kd 9h 9s 4c Kh 2d");
    let base = evaluate(&hand).unwrap();
    for perm in hand.iter().copied().permutations(7).step_by(97) {
        let result = evaluate(&perm).unwrap();
        assert_eq!(result.category, base.category);
        assert_eq!(result.kickers, base.kickers);
    }
}

#[test]
fn test_royal_flush_outranks_everything() {
    let royal = evaluate(&cards("As Ks Qs Js Ts")).unwrap();
    let others = [
        "9h 8h 7h 6h 5h",
        "Ac Ad Ah As Kc",
        "Ac Ad Ah Kc Kd",
        "Ad Kd Qd Jd 9d",
        "Ac Kd Qh Js Tc",
    ];
    for other in others {
        assert!(royal > evaluate(&cards(other)).unwrap(), "{}", other);
    }
}

#[test]
fn test_best_five_are_distinct_input_cards() {
    let deck = reference_deck();
    for hand in deck.iter().copied().step_by(3).combinations(5).step_by(211).take(200) {
        let result = evaluate(&hand).unwrap();
        assert_eq!(result.cards.len(), 5);
        assert_eq!(card_mask(&result.cards).count_ones(), 5);
        assert!(result.cards.iter().all(|c| hand.contains(c)));
    }
    for hand in deck.iter().copied().step_by(2).combinations(7).step_by(4099).take(200) {
        let result = evaluate(&hand).unwrap();
        assert_eq!(card_mask(&result.cards).count_ones(), 5);
        assert!(result.cards.iter().all(|c| hand.contains(c)));
    }
}

#[test]
fn test_ordering_is_transitive() {
    let hands: Vec<HandResult> = [
        "Ac Jd 8h 5s 2c",
        "Qc Qd 8h 5s 2c",
        "Jc Jd 4h 4s 9c",
        "7c 7d 7h Ks 2c",
        "9c 8d 7h 6s 5c",
        "Ad 9d 7d 4d 2d",
        "Kc Kd Kh 2s 2c",
        "Ac Ad Ah As 2c",
        "9h 8h 7h 6h 5h",
        "As Ks Qs Js Ts",
    ]
    .iter()
    .map(|h| evaluate(&cards(h)).unwrap())
    .collect();
    for (i, a) in hands.iter().enumerate() {
        for (j, b) in hands.iter().enumerate() {
            assert_eq!(a.cmp(b), i.cmp(&j));
        }
    }
}

#[test]
fn test_invalid_hand_size() {
    assert!(matches!(
        evaluate(&cards("As Ks Qs Js")),
        Err(HoldemError::InvalidHandSize { got: 4, .. })
    ));
    assert!(matches!(
        evaluate(&cards("As Ks Qs Js Ts 9s 8s 7s")),
        Err(HoldemError::InvalidHandSize { got: 8, .. })
    ));
}

#[test]
fn test_duplicate_cards_rejected() {
    assert!(matches!(
        evaluate(&cards("As Ks Qs Js As")),
        Err(HoldemError::DuplicateCard(_))
    ));
}

#[test]
fn test_display() {
    let result = evaluate(&cards("Kc Kd Kh 2s 2c")).unwrap();
    assert_eq!(result.to_string(), "Full House");
    assert_eq!(result.rank(), 7);
}
