//! Recamán sequence and its semicircle layout
//!
//! a(0) = 0; a(n) = a(n-1) - n when that is positive and unseen, otherwise
//! a(n-1) + n. Each jump is drawn as a half circle on the number line,
//! alternating between the upper and lower half-plane.

use std::collections::HashSet;

use crate::simulation::states::NVec2;

/// First `n + 1` terms, `a(0)..=a(n)`
pub fn recaman_sequence(n: usize) -> Vec<u64> {
    let mut seen = HashSet::with_capacity(n + 1);
    let mut terms = Vec::with_capacity(n + 1);
    let mut current = 0u64;
    seen.insert(current);
    terms.push(current);

    for step in 1..=n as u64 {
        current = match current.checked_sub(step) {
            Some(back) if back > 0 && !seen.contains(&back) => back,
            _ => current + step,
        };
        seen.insert(current);
        terms.push(current);
    }
    terms
}

/// Half circle joining two consecutive terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecamanArc {
    pub start: f64,
    pub end: f64,
    pub upper: bool, // bulges into y > 0
}

impl RecamanArc {
    pub fn center(&self) -> NVec2 {
        NVec2::new(0.5 * (self.start + self.end), 0.0)
    }

    pub fn radius(&self) -> f64 {
        0.5 * (self.end - self.start).abs()
    }

    /// `segments + 1` points from `start` to `end`
    pub fn points(&self, segments: usize) -> Vec<NVec2> {
        let segments = segments.max(1);
        let c = self.center();
        let r = self.radius();
        // angle pi is the left end of the circle, 0 the right end
        let (from, to) = if self.start <= self.end {
            (std::f64::consts::PI, 0.0)
        } else {
            (0.0, std::f64::consts::PI)
        };
        let sign = if self.upper { 1.0 } else { -1.0 };

        (0..=segments)
            .map(|i| {
                let a = from + (to - from) * i as f64 / segments as f64;
                NVec2::new(c.x + r * a.cos(), sign * r * a.sin())
            })
            .collect()
    }
}

/// Arcs for the first `n` jumps; even jumps go over the line, odd ones under
pub fn recaman_arcs(n: usize) -> Vec<RecamanArc> {
    recaman_sequence(n)
        .windows(2)
        .enumerate()
        .map(|(i, w)| RecamanArc {
            start: w[0] as f64,
            end: w[1] as f64,
            upper: (i + 1) % 2 == 0,
        })
        .collect()
}
