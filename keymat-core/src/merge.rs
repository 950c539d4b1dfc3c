//! Two-pointer merge-join over ordered sparse sequences
//!
//! Both inputs must yield strictly ascending keys. The join visits exactly
//! the keys present in both sequences, each once, in ascending order, and
//! runs in O(m + n). Trailing entries of the longer sequence are never
//! touched; an empty operand makes the whole join a no-op.

use core::cmp::Ordering;

/// Walk the intersection of two ordered sequences
///
/// Calls `visit(key, left_value, right_value)` for every key present in both.
pub fn intersect<L, R, F>(left: L, right: R, mut visit: F)
where
    L: IntoIterator<Item = (u32, f32)>,
    R: IntoIterator<Item = (u32, f32)>,
    F: FnMut(u32, f32, f32),
{
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let (Some(mut l), Some(mut r)) = (left.next(), right.next()) else {
        return;
    };
    loop {
        match l.0.cmp(&r.0) {
            Ordering::Equal => {
                visit(l.0, l.1, r.1);
                l = match left.next() {
                    Some(next) => next,
                    None => return,
                };
                r = match right.next() {
                    Some(next) => next,
                    None => return,
                };
            }
            Ordering::Less => {
                l = match left.next() {
                    Some(next) => next,
                    None => return,
                };
            }
            Ordering::Greater => {
                r = match right.next() {
                    Some(next) => next,
                    None => return,
                };
            }
        }
    }
}

/// Inner product of two ordered sparse sequences
pub fn dot<L, R>(left: L, right: R) -> f32
where
    L: IntoIterator<Item = (u32, f32)>,
    R: IntoIterator<Item = (u32, f32)>,
{
    let mut sum = 0.0;
    intersect(left, right, |_, lv, rv| sum += lv * rv);
    sum
}

/// Intersection walk that mutates the left sequence in place
///
/// The left sequence yields `(key, &mut value)`; `apply(left_value,
/// right_value)` runs once per coinciding key.
pub fn intersect_update<'a, L, R, F>(left: L, right: R, mut apply: F)
where
    L: IntoIterator<Item = (u32, &'a mut f32)>,
    R: IntoIterator<Item = (u32, f32)>,
    F: FnMut(&mut f32, f32),
{
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let (Some(mut l), Some(mut r)) = (left.next(), right.next()) else {
        return;
    };
    loop {
        match l.0.cmp(&r.0) {
            Ordering::Equal => {
                apply(l.1, r.1);
                l = match left.next() {
                    Some(next) => next,
                    None => return,
                };
                r = match right.next() {
                    Some(next) => next,
                    None => return,
                };
            }
            Ordering::Less => {
                l = match left.next() {
                    Some(next) => next,
                    None => return,
                };
            }
            Ordering::Greater => {
                r = match right.next() {
                    Some(next) => next,
                    None => return,
                };
            }
        }
    }
}
