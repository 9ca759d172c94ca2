//! Hilbert curve vertices
//!
//! Order `n` visits every cell of a `2^n x 2^n` grid once. Vertices are cell
//! centres mapped into `[-1, 1]^2`. Order 1 runs top-left, bottom-left,
//! bottom-right, top-right.

use super::GeometryError;
use crate::simulation::states::NVec2;

/// Highest accepted order. The curve holds 4^order vertices, so order 12
/// is already about 16.7 million points (roughly 270 MB).
pub const MAX_ORDER: u32 = 12;

/// Rotate/flip a quadrant so the sub-curve connects to its neighbours
fn rotate(s: u32, x: &mut u32, y: &mut u32, rx: u32, ry: u32) {
    if ry == 0 {
        if rx == 1 {
            *x = s - 1 - *x;
            *y = s - 1 - *y;
        }
        std::mem::swap(x, y);
    }
}

/// Grid cell of the `d`-th vertex on a curve spanning `side x side` cells
fn cell(side: u32, d: u32) -> (u32, u32) {
    let (mut x, mut y) = (0, 0);
    let mut t = d;
    let mut s = 1;
    while s < side {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);
        rotate(s, &mut x, &mut y, rx, ry);
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }
    (x, y)
}

pub fn hilbert_curve(order: u32) -> Result<Vec<NVec2>, GeometryError> {
    if order == 0 || order > MAX_ORDER {
        return Err(GeometryError::InvalidOrder { order, max: MAX_ORDER });
    }

    let side = 1u32 << order;
    let scale = 2.0 / side as f64;

    Ok((0..side * side)
        .map(|d| {
            let (x, y) = cell(side, d);
            // flip vertically so the curve opens downward
            let y = side - 1 - y;
            NVec2::new((x as f64 + 0.5) * scale - 1.0, (y as f64 + 0.5) * scale - 1.0)
        })
        .collect())
}
