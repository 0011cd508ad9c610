//! Star positions on the sky canvas.
//!
//! Coordinates are percentages of the canvas. Stored entries carry their own
//! position; [`place`] is the fallback for documents that don't.

use rand::Rng;

const X_MIN: f64 = 10.0;
const X_SPAN: f64 = 80.0;
const Y_MIN: f64 = 20.0;
const Y_SPAN: f64 = 60.0;

const X_SHIFT: u32 = 2;
const Y_SHIFT: u32 = 5;

/// A point on the canvas, each axis in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Horizontal offset in percent.
    pub x: f64,
    /// Vertical offset in percent.
    pub y: f64,
}

impl Position {
    /// Fresh random position for a new entry, rounded to two decimals.
    ///
    /// `x` lands in `[10, 90]` and `y` in `[20, 80]`.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            x: round_hundredths(rng.gen_range(X_MIN..=X_MIN + X_SPAN)),
            y: round_hundredths(rng.gen_range(Y_MIN..=Y_MIN + Y_SPAN)),
        }
    }
}

/// Stable position derived from an opaque seed (usually an entry id).
///
/// Folds the seed's UTF-16 code units with `acc * 31 + unit` in wrapping
/// 32-bit arithmetic, then reads two byte-wide slices of the magnitude.
/// Identical seeds always land on the same point; distinct seeds may collide.
pub fn place(seed: &str) -> Position {
    let hash = seed
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(i32::from(unit)));

    // i32::MIN has no positive counterpart and keeps its bit pattern.
    let magnitude = hash.wrapping_abs();
    let slice = |shift: u32| f64::from((magnitude >> shift) & 0xff) / 255.0;

    Position {
        x: X_MIN + slice(X_SHIFT) * X_SPAN,
        y: Y_MIN + slice(Y_SHIFT) * Y_SPAN,
    }
}

/// Phase offset in `[0, 1)` for a star's twinkle animation.
pub fn twinkle_offset(seed: &str) -> f64 {
    let sum: u64 = seed.encode_utf16().map(u64::from).sum();
    (sum % 8) as f64 / 8.0
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
