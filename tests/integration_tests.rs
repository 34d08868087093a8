//! Integration tests for michi-gomoku
//!
//! Positions are built either from explicit stone lists or from seeded
//! random play, so every run sees the same boards. The exact searches are
//! checked against a plain minimax on 5x5 boards, where the open-four
//! templates cannot fit and every remaining restriction is sound.

use michi_gomoku::board::{Board, Cell, Color, Point};
use michi_gomoku::constants::{DRAW_SCORE, LOSS_SCORE, WIN_SCORE};
use michi_gomoku::patterns::{
    Tactic, block_immediate_win, fast_candidates, forced_loss, immediate_win, open_four,
    policy_moves,
};
use michi_gomoku::rollout::{Policy, RolloutConfig, RolloutPlayer, simulate};
use michi_gomoku::search::{SearchConfig, SearchMode, Searcher, solve};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Place stones of one color by `(row, col)`, ignoring turn order.
fn place(board: &mut Board, stones: &[(usize, usize)], color: Color) {
    for &(row, col) in stones {
        let pt = board.pt(row, col);
        board.play_move(pt, color).unwrap();
    }
}

/// Alternate random moves until `moves` stones are down or the game ends.
fn random_position(size: usize, moves: usize, rng: &mut fastrand::Rng) -> Board {
    let mut board = Board::new(size).unwrap();
    while board.move_number() < moves && !board.end_of_game() {
        let empty = board.empty_points();
        board.play(empty[rng.usize(..empty.len())]).unwrap();
    }
    board
}

/// Full-width minimax with no pruning, no table and no move restriction.
/// Returns the score for the side to move and the first move reaching it.
fn minimax(board: &mut Board) -> (i32, Option<Point>) {
    if board.end_of_game() {
        return (board.evaluate_terminal_for_side_to_move(), None);
    }
    let mut best = (i32::MIN, None);
    for pt in board.empty_points() {
        board.play(pt).unwrap();
        let value = -minimax(board).0;
        board.undo_move().unwrap();
        if value > best.0 {
            best = (value, Some(pt));
        }
    }
    best
}

fn config(depth: u32, mode: SearchMode, use_table: bool) -> SearchConfig {
    SearchConfig {
        depth,
        mode,
        use_table,
    }
}

// =============================================================================
// Board: make / unmake
// =============================================================================

#[test]
fn test_undo_restores_every_intermediate_state() {
    let mut rng = fastrand::Rng::with_seed(5);
    let mut board = Board::new(9).unwrap();
    let mut history = vec![(board.hash(), board.current_player())];

    while !board.end_of_game() {
        let empty = board.empty_points();
        board.play(empty[rng.usize(..empty.len())]).unwrap();
        history.push((board.hash(), board.current_player()));
    }

    while let Some((hash, player)) = history.pop() {
        assert_eq!(board.hash(), hash);
        assert_eq!(board.current_player(), player);
        if board.undo_move().is_err() {
            assert!(history.is_empty());
        }
    }
    assert!(board.is_empty());
    assert_eq!(board.empty_points().len(), 81);
}

#[test]
fn test_same_stones_same_hash() {
    let mut rng = fastrand::Rng::with_seed(8);
    let board = random_position(9, 20, &mut rng);
    let moves = board.moves().to_vec();

    // Replay Black's and White's stones in a different order.
    let (mut black, mut white): (Vec<Point>, Vec<Point>) = (Vec::new(), Vec::new());
    for (i, &pt) in moves.iter().enumerate() {
        if i % 2 == 0 { black.push(pt) } else { white.push(pt) }
    }
    black.reverse();
    white.reverse();
    let mut replay = Board::new(9).unwrap();
    for i in 0..moves.len() {
        let pt = if i % 2 == 0 { black[i / 2] } else { white[i / 2] };
        replay.play(pt).unwrap();
    }
    assert_eq!(replay.hash(), board.hash());
}

// =============================================================================
// Win detection
// =============================================================================

#[test]
fn test_win_in_every_direction() {
    let lines: [[(usize, usize); 5]; 4] = [
        [(3, 2), (3, 3), (3, 4), (3, 5), (3, 6)],
        [(2, 7), (3, 7), (4, 7), (5, 7), (6, 7)],
        [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)],
        [(5, 1), (4, 2), (3, 3), (2, 4), (1, 5)],
    ];
    for line in lines {
        let mut board = Board::new(7).unwrap();
        place(&mut board, &line[..4], Color::Black);
        assert!(!board.end_of_game());
        place(&mut board, &line[4..], Color::Black);
        assert_eq!(board.winner(), Some(Color::Black));
        assert!(board.end_of_game());
    }
}

#[test]
fn test_overline_wins() {
    let mut board = Board::new(9).unwrap();
    place(&mut board, &[(1, 1), (1, 2), (1, 3), (1, 5), (1, 6)], Color::White);
    assert_eq!(board.winner(), None);
    place(&mut board, &[(1, 4)], Color::White);
    assert_eq!(board.winner(), Some(Color::White));
}

#[test]
fn test_full_board_without_five_is_draw() {
    let mut board = Board::new(4).unwrap();
    for pt in board.empty_points() {
        board.play(pt).unwrap();
    }
    assert!(board.is_full());
    assert!(board.end_of_game());
    assert_eq!(board.winner(), None);
    assert_eq!(board.evaluate_terminal_for_side_to_move(), DRAW_SCORE);
}

// =============================================================================
// Pattern detectors
// =============================================================================

#[test]
fn test_immediate_win_is_exact() {
    let mut rng = fastrand::Rng::with_seed(21);
    for _ in 0..20 {
        let mut board = random_position(9, 40, &mut rng);
        if board.end_of_game() {
            continue;
        }
        for color in [Color::Black, Color::White] {
            let wins = immediate_win(&board, color);
            for pt in board.empty_points() {
                board.play_move(pt, color).unwrap();
                let five = board.winner() == Some(color);
                board.undo_move().unwrap();
                assert_eq!(five, wins.contains(&pt));
            }
            assert_eq!(block_immediate_win(&board, color.opponent()), wins);
        }
    }
}

#[test]
fn test_open_four_points_make_two_threats() {
    let mut board = Board::new(9).unwrap();
    place(&mut board, &[(5, 3), (5, 4), (5, 5)], Color::Black);
    assert_eq!(open_four(&board, Color::Black), vec![board.pt(5, 2), board.pt(5, 6)]);

    let mut rng = fastrand::Rng::with_seed(34);
    let mut boards = vec![board];
    boards.extend((0..60).map(|_| random_position(9, 30, &mut rng)));
    for mut board in boards {
        if board.end_of_game() {
            continue;
        }
        for color in [Color::Black, Color::White] {
            for pt in open_four(&board, color) {
                board.play_move(pt, color).unwrap();
                assert!(immediate_win(&board, color).len() >= 2, "\n{board}");
                board.undo_move().unwrap();
            }
        }
    }
}

#[test]
fn test_three_on_edge_makes_no_open_four() {
    // Black three at the right edge of row 2; row 3 starts with empties.
    let mut board = Board::new(9).unwrap();
    place(&mut board, &[(2, 7), (2, 8), (2, 9)], Color::Black);
    assert!(open_four(&board, Color::Black).is_empty());
}

#[test]
fn test_detectors_leave_board_untouched() {
    let mut rng = fastrand::Rng::with_seed(2);
    let board = random_position(9, 25, &mut rng);
    let before = board.clone();
    let color = board.current_player();
    let _ = policy_moves(&board, color);
    let _ = forced_loss(&board, color);
    let _ = fast_candidates(&board);
    assert_eq!(board.hash(), before.hash());
    assert_eq!(board.moves(), before.moves());
    for pt in 0..board.cell_count() {
        assert_eq!(board.get(pt), before.get(pt));
    }
}

#[test]
fn test_fast_candidates_touch_stones() {
    let mut rng = fastrand::Rng::with_seed(17);
    let board = random_position(11, 12, &mut rng);
    for pt in fast_candidates(&board) {
        assert_eq!(board.get(pt), Cell::Empty);
        assert!(board.neighbors(pt).iter().any(|&n| board.get(n).color().is_some()));
    }
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_forced_moves_dominate() {
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..30 {
        let mut board = random_position(7, 20, &mut rng);
        if board.end_of_game() {
            continue;
        }
        let color = board.current_player();
        let (tactic, moves) = policy_moves(&board, color);
        for mode in [
            SearchMode::Exhaustive,
            SearchMode::HeuristicRestricted,
            SearchMode::FastCandidates,
        ] {
            let result = solve(&mut board, config(2, mode, true));
            match tactic {
                Tactic::Win => {
                    assert_eq!(result.score, WIN_SCORE);
                    assert_eq!(result.tactic, Some(Tactic::Win));
                    assert_eq!(result.best_move, moves.first().copied());
                }
                Tactic::BlockWin if mode != SearchMode::Exhaustive => {
                    assert_eq!(result.tactic, Some(Tactic::BlockWin));
                    assert_eq!(result.best_move, moves.first().copied());
                }
                _ => assert!(result.best_move.is_some()),
            }
        }
    }
}

#[test]
fn test_exhaustive_matches_minimax() {
    let mut rng = fastrand::Rng::with_seed(4);
    let mut checked = 0;
    while checked < 6 {
        let mut board = random_position(5, 17, &mut rng);
        if board.end_of_game() {
            continue;
        }
        let (score, best) = minimax(&mut board);
        // An immediate win is played even when an earlier point also wins.
        let expected = immediate_win(&board, board.current_player())
            .first()
            .copied()
            .or(best);
        for use_table in [false, true] {
            let result = solve(&mut board, config(10, SearchMode::Exhaustive, use_table));
            assert_eq!(result.score, score, "\n{board}");
            assert_eq!(result.best_move, expected, "\n{board}");
        }
        checked += 1;
    }
}

#[test]
fn test_heuristic_matches_minimax_score() {
    let mut rng = fastrand::Rng::with_seed(12);
    let mut checked = 0;
    while checked < 6 {
        let mut board = random_position(5, 17, &mut rng);
        if board.end_of_game() {
            continue;
        }
        let (score, _) = minimax(&mut board);
        let result = solve(&mut board, config(10, SearchMode::HeuristicRestricted, true));
        assert_eq!(result.score, score, "\n{board}");
        checked += 1;
    }
}

#[test]
fn test_table_reused_across_searches() {
    let mut board = Board::new(5).unwrap();
    let mut rng = fastrand::Rng::with_seed(30);
    while board.move_number() < 15 {
        let empty = board.empty_points();
        board.play(empty[rng.usize(..empty.len())]).unwrap();
        if board.end_of_game() {
            board.undo_move().unwrap();
        }
    }
    let mut searcher = Searcher::new(config(10, SearchMode::Exhaustive, true));
    let first = searcher.search(&mut board);
    let second = searcher.search(&mut board);
    assert_eq!(first.score, second.score);
    assert_eq!(first.best_move, second.best_move);
    assert!(second.nodes < first.nodes);
}

#[test]
fn test_double_threat_is_lost() {
    let mut board = Board::new(9).unwrap();
    place(&mut board, &[(4, 3), (4, 4), (4, 5), (4, 6)], Color::White);
    place(&mut board, &[(9, 9)], Color::Black);
    board.set_current_player(Color::Black);
    assert!(forced_loss(&board, Color::Black));

    let result = solve(&mut board, config(4, SearchMode::FastCandidates, true));
    assert_eq!(result.score, LOSS_SCORE);
    assert!(result.best_move.is_some());
}

// =============================================================================
// Rollouts
// =============================================================================

#[test]
fn test_simulate_ends_game_for_both_policies() {
    let mut rng = fastrand::Rng::with_seed(6);
    for policy in [Policy::Random, Policy::RuleBased] {
        for _ in 0..5 {
            let mut board = Board::new(9).unwrap();
            let winner = simulate(&mut board, policy, &mut rng);
            assert!(board.end_of_game());
            if let Some(color) = winner {
                assert_eq!(board.get(board.last_move().unwrap()), Cell::from(color));
            } else {
                assert!(board.is_full());
            }
        }
    }
}

#[test]
fn test_rollout_conserves_and_restores() {
    let mut rng = fastrand::Rng::with_seed(41);
    let mut board = random_position(6, 8, &mut rng);
    let hash = board.hash();
    let moves = board.moves().to_vec();
    let player = board.current_player();

    let mut rollout = RolloutPlayer::new(RolloutConfig {
        simulations: 7,
        policy: Policy::Random,
        seed: Some(41),
    });
    let evals = rollout.evaluate_all(&mut board);
    assert_eq!(evals.len(), board.empty_points().len());
    for eval in &evals {
        assert_eq!(eval.stats.total(), 7);
        assert!((0.0..=1.0).contains(&eval.score));
    }
    assert_eq!(board.hash(), hash);
    assert_eq!(board.moves(), moves.as_slice());
    assert_eq!(board.current_player(), player);
}

#[test]
fn test_rollouts_are_reproducible_with_seed() {
    let mut rng = fastrand::Rng::with_seed(13);
    let mut board = random_position(7, 6, &mut rng);
    let cfg = RolloutConfig {
        simulations: 3,
        policy: Policy::RuleBased,
        seed: Some(2024),
    };
    let a = RolloutPlayer::new(cfg).evaluate_all(&mut board);
    let b = RolloutPlayer::new(cfg).evaluate_all(&mut board);
    assert_eq!(a, b);
}

// =============================================================================
// End to end
// =============================================================================

#[test]
fn test_row_four_scenario() {
    // Black four on row 4 of a 9x9 board, Black to move.
    let mut board = Board::new(9).unwrap();
    place(&mut board, &[(4, 3), (4, 4), (4, 5), (4, 6)], Color::Black);
    place(&mut board, &[(7, 2), (7, 8), (2, 5)], Color::White);
    board.set_current_player(Color::Black);

    let (tactic, moves) = policy_moves(&board, Color::Black);
    assert_eq!(tactic, Tactic::Win);
    assert_eq!(moves, vec![board.pt(4, 2), board.pt(4, 7)]);

    for mode in [
        SearchMode::Exhaustive,
        SearchMode::HeuristicRestricted,
        SearchMode::FastCandidates,
    ] {
        let result = solve(&mut board, config(3, mode, true));
        assert_eq!(result.score, WIN_SCORE);
        assert_eq!(result.best_move, Some(board.pt(4, 2)));
    }

    let mut rollout = RolloutPlayer::new(RolloutConfig {
        simulations: 2,
        policy: Policy::RuleBased,
        seed: Some(9),
    });
    for pt in moves {
        let eval = rollout.evaluate_move(&mut board, pt);
        assert_eq!(eval.stats.black_wins, 2);
        assert_eq!(eval.score, 1.0);
    }
    assert!(rollout.genmove(&mut board).is_some());
    assert_eq!(board.move_number(), 7);
}
