//! Pairwise overlap resolution between free bodies.
//!
//! Overlap is measured on the candidate rectangles `(nx, ny)`, but the
//! direction each body is pushed is taken from the confirmed positions
//! `(x, y)` at the start of the tick. Two bodies that tunnel past each other's
//! midpoint within one tick are still separated the way they approached.
//! When the confirmed coordinates are equal, `a` is pushed towards the
//! positive axis (right / down).

use super::Body;
use crate::constants::RESTITUTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separation {
    Horizontal,
    Vertical { a_on_top: bool },
}

/// A vertical resolution between two bodies, as indices into the body slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub top: usize,
    pub bottom: usize,
}

/// Overlap of the candidate rectangles along x and y, if they intersect.
pub fn overlap<H>(a: &Body<H>, b: &Body<H>) -> Option<(f64, f64)> {
    let ox = (a.nx + a.width).min(b.nx + b.width) - a.nx.max(b.nx);
    let oy = (a.ny + a.height).min(b.ny + b.height) - a.ny.max(b.ny);
    if ox <= 0.0 || oy <= 0.0 {
        return None;
    }
    Some((ox, oy))
}

/// One-dimensional elastic exchange between two masses, scaled by
/// [`RESTITUTION`].
pub fn elastic_exchange(va: f64, vb: f64, ma: f64, mb: f64) -> (f64, f64) {
    let total = ma + mb;
    let a = (va * (ma - mb) + 2.0 * mb * vb) / total;
    let b = (vb * (mb - ma) + 2.0 * ma * va) / total;
    (a * RESTITUTION, b * RESTITUTION)
}

/// Separate two overlapping bodies along the axis of smaller overlap.
pub fn resolve_pair<H>(a: &mut Body<H>, b: &mut Body<H>) -> Option<Separation> {
    let (ox, oy) = overlap(a, b)?;
    let (ma, mb) = (a.mass(), b.mass());
    if ox < oy {
        let dir = if a.x < b.x { 1.0 } else { -1.0 };
        a.nx -= ox * 0.5 * dir;
        b.nx += ox * 0.5 * dir;
        (a.vx, b.vx) = elastic_exchange(a.vx, b.vx, ma, mb);
        Some(Separation::Horizontal)
    } else {
        let a_on_top = a.y < b.y;
        let dir = if a_on_top { 1.0 } else { -1.0 };
        a.ny -= oy * 0.5 * dir;
        b.ny += oy * 0.5 * dir;
        (a.vy, b.vy) = elastic_exchange(a.vy, b.vy, ma, mb);
        Some(Separation::Vertical { a_on_top })
    }
}

/// One relaxation pass over every unordered pair of free bodies.
///
/// Later pairs see the corrections made by earlier ones. Vertical
/// resolutions are appended to `contacts` unless already present.
pub fn resolve_pass<H>(bodies: &mut [Body<H>], contacts: &mut Vec<Contact>) {
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.is_free() {
            continue;
        }
        for (offset, b) in tail.iter_mut().enumerate() {
            if !b.is_free() {
                continue;
            }
            let j = i + 1 + offset;
            if let Some(Separation::Vertical { a_on_top }) = resolve_pair(a, b) {
                let contact = if a_on_top {
                    Contact { top: i, bottom: j }
                } else {
                    Contact { top: j, bottom: i }
                };
                if !contacts.contains(&contact) {
                    contacts.push(contact);
                }
            }
        }
    }
}

/// Run `passes` relaxation passes and return the contacts found.
pub fn resolve_collisions<H>(bodies: &mut [Body<H>], passes: usize) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for _ in 0..passes {
        resolve_pass(bodies, &mut contacts);
    }
    contacts
}
