//! End-to-end exercises: complete games driven through SAN resolution,
//! execution, and the undo/redo history.

use gambit_engine::san::parse_move;
use gambit_engine::{Game, Outcome};
use gambit_core::{Color, Move};

/// Morphy's opera game, mainline only.
const OPERA_GAME: [&str; 33] = [
    "e4", "e5", "Nf3", "d6", "d4", "Bg4", "dxe5", "Bxf3", "Qxf3", "dxe5", "Bc4", "Nf6", "Qb3",
    "Qe7", "Nc3", "c6", "Bg5", "b5", "Nxb5", "cxb5", "Bxb5+", "Nbd7", "O-O-O", "Rd8", "Rxd7",
    "Rxd7", "Rd1", "Qe6", "Bxd7+", "Nxd7", "Qb8+", "Nxb8", "Rd8#",
];

const OPERA_FINAL: &str = "1n1Rkb1r/p4ppp/4q3/4p1B1/4P3/8/PPP2PPP/2K5 b k - 1 17";

fn play(game: &mut Game, san: &str) -> Move {
    let (m, promotion) = parse_move(game.position(), san)
        .unwrap_or_else(|e| panic!("{} in {}: {}", san, game.position().to_fen(), e));
    match promotion {
        Some(kind) => game.execute_with_promotion(m, kind).unwrap(),
        None => game.execute(m).unwrap(),
    }
    m
}

#[test]
fn opera_game_to_checkmate() {
    let mut game = Game::new();
    for san in OPERA_GAME {
        play(&mut game, san);
    }

    assert_eq!(game.position().to_fen(), OPERA_FINAL);
    assert!(game.is_finished());
    assert_eq!(
        game.outcome(),
        Some(Outcome::Checkmate {
            winner: Color::White
        })
    );
    assert!(game.available_moves().is_empty());
}

#[test]
fn opera_game_unwinds_and_replays() {
    let mut game = Game::new();
    let mut moves = Vec::new();
    let mut fens = vec![game.position().to_fen()];
    for san in OPERA_GAME {
        moves.push(play(&mut game, san));
        fens.push(game.position().to_fen());
    }

    // Walk all the way back, checking every intermediate position.
    for i in (0..moves.len()).rev() {
        assert_eq!(game.undo().unwrap(), moves[i]);
        assert_eq!(game.position().to_fen(), fens[i]);
    }
    assert_eq!(game.position(), game.initial_position());
    assert!(!game.is_finished());

    // And forward again.
    for (i, &expected) in moves.iter().enumerate() {
        assert_eq!(game.redo().unwrap(), expected);
        assert_eq!(game.position().to_fen(), fens[i + 1]);
    }
    assert_eq!(game.position().to_fen(), OPERA_FINAL);
    assert!(game.is_finished());
}
