//! Attack, ray, between, and line tables.
//!
//! Leaper attacks (pawn, knight, king) are computed at compile time. The
//! ray-dependent tables are built once on first use and published through a
//! [`OnceLock`], so initialization is idempotent and concurrent readers only
//! ever observe the finished tables.

use crate::Bitboard;
use gambit_core::{Color, Direction, Square};
use std::sync::OnceLock;

/// Precomputed knight attacks per square.
const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_attacks(&KNIGHT_OFFSETS);

/// Precomputed king attacks per square.
const KING_ATTACKS: [Bitboard; 64] = leaper_attacks(&KING_OFFSETS);

/// Precomputed pawn attacks, indexed by color then square.
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_attacks(&[(-1, 1), (1, 1)]),
    leaper_attacks(&[(-1, -1), (1, -1)]),
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Computes a leaper attack table at compile time from step offsets.
const fn leaper_attacks(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let f = file + offsets[i].0;
            let r = rank + offsets[i].1;
            if 0 <= f && f < 8 && 0 <= r && r < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        attacks[sq] = Bitboard(bits);
        sq += 1;
    }
    attacks
}

/// Ray-derived lookup tables, built once per process.
struct RayTables {
    /// Open-board rays per direction and square, excluding the origin.
    rays: [[Bitboard; 64]; 8],
    /// Squares strictly between two squares sharing a ray, flattened 64x64.
    between: Vec<Bitboard>,
    /// The full line through two squares sharing a ray, flattened 64x64.
    line: Vec<Bitboard>,
}

static RAY_TABLES: OnceLock<RayTables> = OnceLock::new();

#[inline]
fn pair_index(a: Square, b: Square) -> usize {
    a.index() as usize * 64 + b.index() as usize
}

impl RayTables {
    fn build() -> Self {
        let mut rays = [[Bitboard::EMPTY; 64]; 8];
        for dir in Direction::ALL {
            for from in Bitboard::FULL {
                let mut ray = Bitboard::EMPTY;
                let mut cursor = from;
                while let Some(next) = cursor.offset(dir.file_delta(), dir.rank_delta()) {
                    ray.set(next);
                    cursor = next;
                }
                rays[dir.index()][from.index() as usize] = ray;
            }
        }

        let mut between = vec![Bitboard::EMPTY; 64 * 64];
        let mut line = vec![Bitboard::EMPTY; 64 * 64];
        for from in Bitboard::FULL {
            for dir in Direction::ALL {
                let full_line = rays[dir.index()][from.index() as usize]
                    | rays[dir.opposite().index()][from.index() as usize]
                    | Bitboard::from_square(from);
                let mut path = Bitboard::EMPTY;
                let mut cursor = from;
                while let Some(next) = cursor.offset(dir.file_delta(), dir.rank_delta()) {
                    between[pair_index(from, next)] = path;
                    line[pair_index(from, next)] = full_line;
                    path.set(next);
                    cursor = next;
                }
            }
        }

        RayTables {
            rays,
            between,
            line,
        }
    }
}

fn ray_tables() -> &'static RayTables {
    RAY_TABLES.get_or_init(RayTables::build)
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares a pawn of the given color attacks from the square.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns the squares strictly between two squares sharing a rank, file,
/// or diagonal; empty otherwise.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    ray_tables().between[pair_index(a, b)]
}

/// Returns the entire rank, file, or diagonal through two squares; empty
/// when they share none.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    ray_tables().line[pair_index(a, b)]
}

fn slider_attacks(sq: Square, occupied: Bitboard, directions: [Direction; 4]) -> Bitboard {
    let tables = ray_tables();
    let mut attacks = Bitboard::EMPTY;
    for dir in directions {
        let ray = tables.rays[dir.index()][sq.index() as usize];
        attacks |= ray;
        let blockers = ray & occupied;
        let closest = if dir.is_positive() {
            blockers.first()
        } else {
            blockers.last()
        };
        if let Some(blocker) = closest {
            attacks &= !tables.rays[dir.index()][blocker.index() as usize];
        }
    }
    attacks
}

/// Returns rook attacks from a square, stopping at blockers in `occupied`.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider_attacks(sq, occupied, Direction::ORTHOGONAL)
}

/// Returns bishop attacks from a square, stopping at blockers in `occupied`.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider_attacks(sq, occupied, Direction::DIAGONAL)
}

/// Returns queen attacks (rook | bishop).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

/// Rook attacks that see through the first blocker in `blockers`.
///
/// Used only for pin detection: the revealed squares are where a pinning
/// rook or queen would stand.
pub fn xray_rook_attacks(sq: Square, occupied: Bitboard, blockers: Bitboard) -> Bitboard {
    let attacks = rook_attacks(sq, occupied);
    let shadowing = blockers & attacks;
    attacks ^ rook_attacks(sq, occupied ^ shadowing)
}

/// Bishop attacks that see through the first blocker in `blockers`.
pub fn xray_bishop_attacks(sq: Square, occupied: Bitboard, blockers: Bitboard) -> Bitboard {
    let attacks = bishop_attacks(sq, occupied);
    let shadowing = blockers & attacks;
    attacks ^ bishop_attacks(sq, occupied ^ shadowing)
}
