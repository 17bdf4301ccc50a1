//! Which marker (if any) the pointer is over

/// At most one marker is hovered at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hover {
    #[default]
    None,
    Marker(usize),
}

impl Hover {
    /// Pointer entered marker `index`; replaces any previous hover
    pub fn enter(&mut self, index: usize) {
        *self = Hover::Marker(index);
    }

    /// Pointer left marker `index`. Ignored unless `index` is still hovered,
    /// so a late leave from a previous marker cannot clear the new one.
    pub fn leave(&mut self, index: usize) {
        if *self == Hover::Marker(index) {
            *self = Hover::None;
        }
    }

    pub fn clear(&mut self) {
        *self = Hover::None;
    }

    pub fn index(&self) -> Option<usize> {
        match *self {
            Hover::Marker(i) => Some(i),
            Hover::None => None,
        }
    }
}

/// Turns per-frame hit tests into enter/leave events
#[derive(Debug, Default)]
pub struct PointerTracker {
    under: Option<usize>,
}

impl PointerTracker {
    /// Feed the marker currently under the pointer (`None` if nothing)
    pub fn update(&mut self, hit: Option<usize>, hover: &mut Hover) {
        if hit == self.under {
            return;
        }
        if let Some(old) = self.under {
            hover.leave(old);
        }
        if let Some(new) = hit {
            hover.enter(new);
        }
        self.under = hit;
    }

    pub fn reset(&mut self) {
        self.under = None;
    }
}

/// Index of the nearest target within `radius` of `(px, py)`
pub fn hit_test<I>(targets: I, px: f64, py: f64, radius: f64) -> Option<usize>
where
    I: IntoIterator<Item = (usize, f64, f64)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, x, y) in targets {
        let d2 = (x - px).powi(2) + (y - py).powi(2);
        if d2 <= radius * radius && best.map_or(true, |(_, bd)| d2 < bd) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_then_leave() {
        let mut h = Hover::default();
        h.enter(2);
        assert_eq!(h.index(), Some(2));
        h.leave(2);
        assert_eq!(h, Hover::None);
    }

    #[test]
    fn stale_leave_is_ignored() {
        let mut h = Hover::None;
        h.enter(0);
        h.enter(1);
        h.leave(0);
        assert_eq!(h, Hover::Marker(1));
    }

    #[test]
    fn tracker_moves_from_a_to_b() {
        let mut h = Hover::None;
        let mut t = PointerTracker::default();
        t.update(Some(0), &mut h);
        assert_eq!(h.index(), Some(0));
        t.update(Some(1), &mut h);
        assert_eq!(h.index(), Some(1));
        t.update(None, &mut h);
        assert_eq!(h, Hover::None);
    }

    #[test]
    fn tracker_leave_does_not_clear_keyboard_hover() {
        let mut h = Hover::None;
        let mut t = PointerTracker::default();
        t.update(Some(0), &mut h);
        h.enter(3);
        t.update(None, &mut h);
        assert_eq!(h.index(), Some(3));
    }

    #[test]
    fn hit_test_picks_nearest_in_radius() {
        let targets = vec![(0, 0.0, 0.0), (1, 3.0, 0.0), (2, 10.0, 10.0)];
        assert_eq!(hit_test(targets.clone(), 2.0, 0.0, 2.5), Some(1));
        assert_eq!(hit_test(targets.clone(), 0.5, 0.0, 2.5), Some(0));
        assert_eq!(hit_test(targets, 6.0, 6.0, 2.5), None);
    }
}
