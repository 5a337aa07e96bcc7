//! Persistence round-trips: a restored game answers every query the
//! same way, enumerates the same legal moves, and rolls the same future
//! dice as the game that was saved.

use gammon::{
    GameEngine, MoveFrom, MoveTarget, Phase, PointState, Side, SideMap, GameSnapshot,
    POINT_COUNT,
};

fn apply_first_legal(game: &mut GameEngine) {
    let moves = game.legal_moves();
    let (from, target) = moves[0];
    let outcome = match target {
        MoveTarget::Point(to) => game.attempt_move(from, to),
        MoveTarget::Off => match from {
            MoveFrom::Point(p) => game.attempt_bear_off(p),
            MoveFrom::Bar => unreachable!(),
        },
    };
    assert!(outcome.applied);
}

/// Drive a fresh game a fixed number of commands in.
fn game_after(seed: u64, commands: usize) -> GameEngine {
    let mut game = GameEngine::new(seed);
    game.initialize();
    game.roll_opening();
    for _ in 0..commands {
        if game.is_over() {
            break;
        }
        match game.phase() {
            Phase::AwaitingRoll => {
                game.roll_turn();
            }
            Phase::AwaitingMove => apply_first_legal(&mut game),
            _ => break,
        }
    }
    game
}

fn assert_equivalent(a: &GameEngine, b: &GameEngine) {
    assert_eq!(a.phase(), b.phase());
    assert_eq!(a.active_side(), b.active_side());
    assert_eq!(a.last_roll(), b.last_roll());
    assert_eq!(a.opening_rolls(), b.opening_rolls());
    assert_eq!(a.winner(), b.winner());
    for side in Side::BOTH {
        assert_eq!(a.pips(side), b.pips(side));
        assert_eq!(a.board().bar(side), b.board().bar(side));
        assert_eq!(a.board().borne_off(side), b.board().borne_off(side));
    }
    for idx in 0..POINT_COUNT {
        assert_eq!(a.board().point(idx), b.board().point(idx));
    }
    assert_eq!(a.legal_moves(), b.legal_moves());
    for idx in 0..POINT_COUNT {
        assert_eq!(
            a.valid_targets(MoveFrom::Point(idx)),
            b.valid_targets(MoveFrom::Point(idx))
        );
    }
    assert_eq!(
        a.valid_targets(MoveFrom::Bar),
        b.valid_targets(MoveFrom::Bar)
    );
}

#[test]
fn test_bincode_round_trip_mid_game() {
    for commands in [0, 1, 5, 20, 80] {
        let game = game_after(42, commands);
        let snapshot = game.snapshot();

        let bytes = bincode::serialize(&snapshot).unwrap();
        let decoded: GameSnapshot = bincode::deserialize(&bytes).unwrap();
        assert_eq!(snapshot, decoded);

        let restored = GameEngine::restore(&decoded);
        assert_equivalent(&game, &restored);
    }
}

#[test]
fn test_json_round_trip_mid_game() {
    let game = game_after(7, 13);
    let snapshot = game.snapshot();

    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: GameSnapshot = serde_json::from_str(&json).unwrap();

    let restored = GameEngine::restore(&decoded);
    assert_equivalent(&game, &restored);
}

#[test]
fn test_restored_game_plays_identically() {
    let mut original = game_after(1337, 9);
    let mut restored = GameEngine::restore(&original.snapshot());

    // Drive both engines through the same commands; every intermediate
    // state must match, including freshly rolled dice.
    for _ in 0..60 {
        if original.is_over() {
            break;
        }
        match original.phase() {
            Phase::AwaitingRoll => {
                let a = original.roll_turn();
                let b = restored.roll_turn();
                assert_eq!(a, b);
            }
            Phase::AwaitingMove => {
                apply_first_legal(&mut original);
                apply_first_legal(&mut restored);
            }
            _ => break,
        }
        assert_eq!(original.snapshot(), restored.snapshot());
    }
}

#[test]
fn test_rejected_command_leaves_bytes_identical() {
    let mut game = game_after(11, 3);
    while game.phase() != Phase::AwaitingMove {
        game.roll_turn();
    }

    let before = bincode::serialize(&game.snapshot()).unwrap();
    // An origin the active side cannot own: its opponent's anchor.
    let side = game.active_side().unwrap();
    let foreign = game
        .board()
        .owned_points(side.opponent())
        .next()
        .map(|(idx, _)| idx)
        .unwrap();
    let outcome = game.attempt_move(MoveFrom::Point(foreign), foreign);
    assert!(!outcome.applied);

    let after = bincode::serialize(&game.snapshot()).unwrap();
    assert_eq!(before, after);
}

#[test]
#[should_panic(expected = "checker conservation")]
fn test_restore_rejects_corrupt_totals() {
    let game = game_after(3, 4);
    let mut snapshot = game.snapshot();
    // Lose a checker.
    let idx = (0..POINT_COUNT)
        .find(|&i| snapshot.points[i].count > 1)
        .unwrap();
    snapshot.points[idx].count -= 1;
    let _ = GameEngine::restore(&snapshot);
}

#[test]
#[should_panic(expected = "holds pips outside its move phase")]
fn test_restore_rejects_stray_ledger() {
    let game = game_after(3, 4);
    let mut snapshot = game.snapshot();
    let idle = snapshot.active.unwrap().opponent();
    snapshot.ledgers[idle] = vec![3];
    let _ = GameEngine::restore(&snapshot);
}

#[test]
#[should_panic(expected = "winner inconsistent with phase")]
fn test_restore_rejects_phase_winner_mismatch() {
    let game = game_after(3, 0);
    let mut snapshot = game.snapshot();
    snapshot.phase = Phase::GameOver;
    let _ = GameEngine::restore(&snapshot);
}

#[test]
fn test_snapshot_of_fresh_board() {
    let mut game = GameEngine::new(21);
    game.initialize();
    let snapshot = game.snapshot();

    assert_eq!(snapshot.phase, Phase::AwaitingOpeningRoll);
    assert_eq!(snapshot.active, None);
    assert_eq!(snapshot.points[0], PointState::owned(Side::White, 2));
    assert_eq!(snapshot.bar, SideMap::with_value(0));

    let restored = GameEngine::restore(&snapshot);
    assert_eq!(restored.phase(), Phase::AwaitingOpeningRoll);
    assert_eq!(restored.active_side(), None);
}
