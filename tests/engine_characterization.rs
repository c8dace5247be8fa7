// tests/engine_characterization.rs
#![forbid(unsafe_code)]

/**
 * Characterization tests for the single-simulator contract.
 *
 * These pin concrete transitions (movement, wall blocks, line clears,
 * holder swaps, spawn-blocked game over) plus the queue ring and the
 * observation wire layout.
 */
use rand::prelude::*;

use tetris_rollout::engine::{cells, PIECE_SIZE, SPAWN_X, SPAWN_Y, W_BOARD};
use tetris_rollout::{Action, ActivePiece, Game, Kind, H_BOARD, W_PLAY};

/// Reproduce the simulator's draw protocol: one seeded stream, uniform over
/// the seven kinds. Locks the order construction and reset consume draws in.
fn draw_seq(seed: u64, n: usize) -> Vec<Kind> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let all = Kind::all();
            all[rng.gen_range(0..all.len())]
        })
        .collect()
}

fn count_nonzero(board: &[[u8; W_BOARD]; H_BOARD]) -> usize {
    board
        .iter()
        .map(|row| row.iter().filter(|&&c| c != 0).count())
        .sum()
}

fn active_mask_cells(g: &Game) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (r, row) in g.observation().active.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            if v != 0 {
                out.push((r, c));
            }
        }
    }
    out
}

// -------------------------------------------------------------------------
// Movement
// -------------------------------------------------------------------------

#[test]
fn left_move_on_empty_board_shifts_then_sinks_one_row() {
    let mut g = Game::new(3, 1);
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: 5,
        y: 15,
    };

    let r = g.step(Action::Left);

    assert_eq!(g.active.x, 4);
    // Gravity runs after the action, so the piece also sank one row.
    assert_eq!(g.active.y, 14);
    assert_eq!(r.reward, 0.0);
    assert!(!r.terminated);

    let mut mask = active_mask_cells(&g);
    mask.sort_unstable();
    assert_eq!(mask, vec![(14, 4), (14, 5), (15, 4), (15, 5)]);
}

#[test]
fn left_move_at_wall_reverts() {
    let mut g = Game::new(3, 1);
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: 0,
        y: 15,
    };

    let r = g.step(Action::Left);

    assert_eq!(g.active.x, 0);
    assert_eq!(g.active.y, 14);
    assert_eq!(r.reward, 0.0);
    assert!(!r.terminated);
    assert_eq!(count_nonzero(&g.board), 0);
}

#[test]
fn right_move_at_playable_edge_reverts() {
    let mut g = Game::new(3, 1);
    // O occupies columns x and x+1; x = 8 touches the playable edge.
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: 8,
        y: 15,
    };

    g.step(Action::Right);
    assert_eq!(g.active.x, 8);
}

#[test]
fn down_action_stacks_with_gravity() {
    let mut g = Game::new(3, 1);
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: 4,
        y: 10,
    };

    g.step(Action::Down);
    // One row from the action, one from gravity.
    assert_eq!(g.active.y, 8);
}

#[test]
fn rotations_wrap_mod_four_without_kicks() {
    let mut g = Game::new(3, 1);
    g.active = ActivePiece {
        kind: Kind::T,
        rot: 0,
        x: 4,
        y: 14,
    };

    for expected in [1usize, 2, 3, 0] {
        g.step(Action::RotateCw);
        assert_eq!(g.active.rot, expected);
    }

    g.step(Action::RotateCcw);
    assert_eq!(g.active.rot, 3);
}

// -------------------------------------------------------------------------
// Lock / line clear
// -------------------------------------------------------------------------

#[test]
fn single_line_clear_scores_one_and_shifts_rows_down() {
    let mut g = Game::new(3, 1);
    for c in 0..W_PLAY - 2 {
        g.board[0][c] = 1;
    }
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: 8,
        y: 0,
    };

    let r = g.step(Action::Drop);

    assert_eq!(r.cleared_lines, 1);
    assert_eq!(r.reward, 1.0);
    assert!(!r.terminated);

    // The O's top half shifted down into row 0; the pre-filled cells are gone.
    for c in 0..W_PLAY - 2 {
        assert_eq!(g.board[0][c], 0);
    }
    assert_eq!(g.board[0][8], Kind::O.idx());
    assert_eq!(g.board[0][9], Kind::O.idx());
    assert_eq!(count_nonzero(&g.board), 2);
}

#[test]
fn vertical_i_completes_a_tetris() {
    let mut g = Game::new(3, 1);
    for r in 0..4 {
        for c in 0..W_PLAY - 1 {
            g.board[r][c] = 1;
        }
    }
    // Vertical I (rotation 1 puts the column at dx = 1) aligned to column 9.
    g.active = ActivePiece {
        kind: Kind::I,
        rot: 1,
        x: 8,
        y: 10,
    };

    let r = g.step(Action::Drop);

    assert_eq!(r.cleared_lines, 4);
    assert_eq!(r.reward, 4.0);
    assert!(!r.terminated);
    assert_eq!(count_nonzero(&g.board), 0);
}

#[test]
fn double_line_clear_counts_both_rows() {
    let mut g = Game::new(3, 1);
    for r in 0..2 {
        for c in 0..W_PLAY - 2 {
            g.board[r][c] = 1;
        }
    }
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: 8,
        y: 5,
    };

    let r = g.step(Action::Drop);

    assert_eq!(r.cleared_lines, 2);
    assert_eq!(r.reward, 2.0);
    assert_eq!(count_nonzero(&g.board), 0);
    assert_eq!(g.score, 2);
}

#[test]
fn clear_shifts_rows_above_only() {
    let mut g = Game::new(3, 1);
    // Pedestal below the row that will clear; it must survive untouched.
    g.board[0][9] = 1;
    for c in 0..W_PLAY - 1 {
        g.board[1][c] = 1;
    }
    g.active = ActivePiece {
        kind: Kind::I,
        rot: 1,
        x: 8,
        y: 10,
    };

    let r = g.step(Action::Drop);

    assert_eq!(r.cleared_lines, 1);
    // Row 0 is below the cleared row: unmodified.
    assert_eq!(g.board[0][9], 1);
    for c in 0..W_PLAY - 1 {
        assert_eq!(g.board[0][c], 0);
    }
    // The I's remaining three cells shifted down by one.
    for row in 1..4 {
        assert_eq!(g.board[row][9], Kind::I.idx());
    }
    assert_eq!(g.board[4][9], 0);
}

// -------------------------------------------------------------------------
// Game over
// -------------------------------------------------------------------------

#[test]
fn blocked_spawn_terminates_and_latches() {
    let mut g = Game::new(3, 9);
    // Fill the whole spawn box so any next piece collides at the spawn pose.
    for r in SPAWN_Y as usize..SPAWN_Y as usize + PIECE_SIZE {
        for c in SPAWN_X as usize..SPAWN_X as usize + PIECE_SIZE {
            g.board[r][c] = 1;
        }
    }
    // Pin the active piece so the first gravity unit locks it right there.
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: SPAWN_X,
        y: SPAWN_Y,
    };

    let r1 = g.step(Action::Noop);
    assert!(r1.terminated);
    assert!(g.game_over);

    // Latched: further steps mutate nothing and pay nothing.
    let board_before = g.board;
    let steps_before = g.steps;
    let r2 = g.step(Action::Drop);
    assert!(r2.terminated);
    assert_eq!(r2.reward, 0.0);
    assert_eq!(r2.cleared_lines, 0);
    assert_eq!(g.board, board_before);
    assert_eq!(g.steps, steps_before);
}

// -------------------------------------------------------------------------
// Queue ring / holder
// -------------------------------------------------------------------------

#[test]
fn construction_and_drop_follow_the_draw_protocol() {
    let seed = 1234u64;
    let d = draw_seq(seed, 6);

    let mut g = Game::new(3, seed);
    assert_eq!(g.active.kind, d[0]);
    assert_eq!(g.queue_preview(), vec![d[1], d[2], d[3]]);
    assert_eq!(g.active.x, SPAWN_X);
    assert_eq!(g.active.y, SPAWN_Y);
    assert_eq!(g.active.rot, 0);

    // A hard drop on the empty board locks, then spawns the queue head.
    let r = g.step(Action::Drop);
    assert!(!r.terminated);
    assert_eq!(g.active.kind, d[1]);
    assert_eq!(g.queue_preview(), vec![d[2], d[3], d[4]]);
}

#[test]
fn swap_moves_current_piece_through_the_holder() {
    let mut g = Game::new(3, 42);
    let first = g.active.kind;
    let head = g.queue_preview()[0];

    assert_eq!(g.holder, None);
    g.step(Action::Swap);
    assert_eq!(g.holder, Some(first));
    assert_eq!(g.active.kind, head);
    // Spawn pose re-applied, then one gravity unit.
    assert_eq!(g.active.x, SPAWN_X);
    assert_eq!(g.active.y, SPAWN_Y - 1);
    assert_eq!(g.active.rot, 0);

    // Second swap exchanges with the held piece instead of drawing.
    let preview = g.queue_preview();
    g.step(Action::Swap);
    assert_eq!(g.holder, Some(head));
    assert_eq!(g.active.kind, first);
    assert_eq!(g.queue_preview(), preview);
}

#[test]
fn holder_mask_appears_in_the_observation() {
    let mut g = Game::new(3, 42);
    let first = g.active.kind;

    assert_eq!(
        g.observation().holder,
        [[0u8; PIECE_SIZE]; PIECE_SIZE],
        "empty holder must render as zeros"
    );

    g.step(Action::Swap);
    let expected: Vec<(usize, usize)> = cells(first, 0)
        .iter()
        .map(|&(dx, dy)| (dy as usize, dx as usize))
        .collect();
    for (r, row) in g.observation().holder.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            let want = expected.contains(&(r, c));
            assert_eq!(v != 0, want, "holder mask mismatch at ({r}, {c})");
        }
    }
}

// -------------------------------------------------------------------------
// Reset
// -------------------------------------------------------------------------

#[test]
fn reset_clears_residue_and_continues_the_stream() {
    let seed = 777u64;
    let d = draw_seq(seed, 8);

    let mut g = Game::new(3, seed);
    g.step(Action::Swap);
    g.step(Action::Drop);
    g.step(Action::Left);
    assert!(g.steps > 0);

    g.reset();

    assert_eq!(count_nonzero(&g.board), 0);
    assert_eq!(g.score, 0);
    assert_eq!(g.steps, 0);
    assert_eq!(g.holder, None);
    assert!(!g.game_over);
    assert_eq!(g.active.x, SPAWN_X);
    assert_eq!(g.active.y, SPAWN_Y);

    // Construction consumed d[0..4]; Swap drew d[4], Drop's spawn drew d[5].
    // Reset therefore refills from d[6] onward: same stream, no reseed.
    assert_eq!(g.active.kind, d[6]);
    assert_eq!(g.queue_preview()[0], d[7]);
}

#[test]
fn same_seed_and_actions_reproduce_after_reset() {
    let mut g1 = Game::new(3, 555);
    let mut g2 = Game::new(3, 555);
    let script = [Action::Drop, Action::Swap, Action::Left, Action::Drop];

    for &a in &script {
        g1.step(a);
        g2.step(a);
    }
    g1.reset();
    g2.reset();

    assert_eq!(g1.active, g2.active);
    assert_eq!(g1.queue_preview(), g2.queue_preview());
    assert_eq!(g1.observation().flatten(), g2.observation().flatten());
}

// -------------------------------------------------------------------------
// Observation wire layout
// -------------------------------------------------------------------------

#[test]
fn flatten_layout_is_active_board_holder_queue() {
    let mut g = Game::new(3, 99);
    g.board[2][3] = 5;
    g.active = ActivePiece {
        kind: Kind::O,
        rot: 0,
        x: 5,
        y: 15,
    };
    g.step(Action::Noop); // refreshes the observation; gravity sinks to y=14

    let flat = g.observation().flatten();
    assert_eq!(flat.len(), 928);

    let board_off = H_BOARD * W_BOARD;
    let holder_off = 2 * H_BOARD * W_BOARD;
    let queue_off = holder_off + PIECE_SIZE * PIECE_SIZE;

    // Active mask section comes first.
    assert_eq!(flat[14 * W_BOARD + 5], 1.0);
    assert_eq!(flat[14 * W_BOARD + 6], 1.0);
    assert_eq!(flat[15 * W_BOARD + 5], 1.0);
    assert_eq!(flat[15 * W_BOARD + 6], 1.0);
    let active_sum: f32 = flat[..board_off].iter().sum();
    assert_eq!(active_sum, 4.0);

    // Board cells keep their type codes.
    assert_eq!(flat[board_off + 2 * W_BOARD + 3], 5.0);

    // Holder empty: all zeros.
    assert!(flat[holder_off..queue_off].iter().all(|&v| v == 0.0));

    // Queue: three pieces, four cells each.
    let queue_sum: f32 = flat[queue_off..].iter().sum();
    assert_eq!(queue_sum, 12.0);
}

#[test]
fn action_indices_round_trip() {
    for idx in 0..8 {
        let a = Action::from_index(idx).unwrap();
        assert_eq!(a.index(), idx);
    }
    assert_eq!(Action::from_index(8), None);
    assert_eq!(Action::Noop.index(), 7);
}

#[test]
fn ascii_render_shows_piece_and_locked_cells() {
    let mut g = Game::new(3, 3);
    assert!(g.render_ascii().contains('*'));
    g.step(Action::Drop);
    assert!(g.render_ascii().contains('#'));
}
