//! Full-game flow tests driving the engine through its public command
//! surface, seed-agnostically: moves are picked from the engine's own
//! legal-move enumeration, and the assertions are the invariants every
//! reachable state must satisfy.

use gammon::{
    GameEngine, MoveFrom, MoveTarget, Phase, Side, CHECKERS_PER_SIDE,
};

/// Apply the first legal move (as enumerated) and return its outcome.
fn apply_first_legal(game: &mut GameEngine) {
    let moves = game.legal_moves();
    assert!(
        !moves.is_empty(),
        "the move phase always has a legal move (auto-skip otherwise)"
    );
    let (from, target) = moves[0];
    let outcome = match target {
        MoveTarget::Point(to) => game.attempt_move(from, to),
        MoveTarget::Off => match from {
            MoveFrom::Point(p) => game.attempt_bear_off(p),
            MoveFrom::Bar => unreachable!("bear-off never originates on the bar"),
        },
    };
    assert!(outcome.applied, "enumerated moves are accepted");
}

fn assert_invariants(game: &GameEngine) {
    let board = game.board();
    for side in Side::BOTH {
        assert_eq!(
            board.checkers_on_board(side) + board.bar(side) + board.borne_off(side),
            CHECKERS_PER_SIDE,
            "{} violates checker conservation",
            side
        );
    }
    // Only the active side may hold pips, and only mid-move.
    for side in Side::BOTH {
        if game.phase() != Phase::AwaitingMove || game.active_side() != Some(side) {
            assert!(game.pips(side).is_empty());
        }
    }
    // While the bar is occupied, every legal move is a re-entry.
    if game.phase() == Phase::AwaitingMove {
        let side = game.active_side().unwrap();
        if board.bar(side) > 0 {
            assert!(game
                .legal_moves()
                .iter()
                .all(|&(from, _)| from == MoveFrom::Bar));
        }
    }
}

#[test]
fn test_game_flow_preserves_invariants() {
    for seed in [1, 7, 42, 1337, 90210] {
        let mut game = GameEngine::new(seed);
        game.initialize();
        game.roll_opening();

        let mut previous_borne = [0u8; 2];
        for _ in 0..20_000 {
            if game.is_over() {
                break;
            }
            match game.phase() {
                Phase::AwaitingRoll => {
                    game.roll_turn();
                }
                Phase::AwaitingMove => apply_first_legal(&mut game),
                phase => panic!("unexpected resting phase {:?}", phase),
            }
            assert_invariants(&game);
            for side in Side::BOTH {
                let borne = game.board().borne_off(side);
                assert!(borne >= previous_borne[side.index()], "borne-off decreased");
                previous_borne[side.index()] = borne;
            }
        }

        if game.is_over() {
            let winner = game.winner().expect("terminal games expose a winner");
            assert_eq!(game.board().borne_off(winner), CHECKERS_PER_SIDE);
            assert!(game.legal_moves().is_empty());
        }
    }
}

#[test]
fn test_turns_alternate_between_sides() {
    let mut game = GameEngine::new(42);
    game.initialize();
    let starter = game.roll_opening().starter;

    let mut expected = starter;
    for _ in 0..50 {
        if game.is_over() {
            break;
        }
        assert_eq!(game.active_side(), Some(expected));
        let outcome = game.roll_turn();
        if !outcome.auto_skipped {
            while game.phase() == Phase::AwaitingMove {
                apply_first_legal(&mut game);
            }
        }
        if game.is_over() {
            break;
        }
        expected = expected.opponent();
    }
}

#[test]
fn test_roll_outcome_matches_queries() {
    let mut game = GameEngine::new(9);
    game.initialize();
    let starter = game.roll_opening().starter;

    let outcome = game.roll_turn();
    assert_eq!(game.last_roll(), Some(outcome.roll));
    let expected_pips = if outcome.roll.is_doubles() { 4 } else { 2 };
    assert_eq!(outcome.pips.len(), expected_pips);
    if !outcome.auto_skipped {
        assert_eq!(game.pips(starter), outcome.pips.as_slice());
    }
}

#[test]
fn test_rejected_commands_are_idempotent() {
    let mut game = GameEngine::new(11);
    game.initialize();
    let starter = game.roll_opening().starter;
    game.roll_turn();

    // Wrong-direction travel is rejected without mutation, every time.
    let (from, to) = match starter {
        Side::White => (11, 5),
        Side::Black => (12, 18),
    };
    let before = game.snapshot();
    let first = game.attempt_move(MoveFrom::Point(from), to);
    let second = game.attempt_move(MoveFrom::Point(from), to);
    assert!(!first.applied);
    assert_eq!(first, second);
    assert_eq!(game.snapshot(), before);
}
