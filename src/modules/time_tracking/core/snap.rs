// Boundary snap engine.
//
// Purpose
// - Pull a dragged or resized time block onto a neighbour's edge so blocks touch
//   instead of overlapping, when the edge lands within a threshold of that neighbour.
//
// Rules
// - Every sibling contributes two boundaries, its start and its end.
// - Only boundaries within the threshold of the edge being evaluated are candidates.
// - A candidate whose simulated interval does not overlap the boundary's own block wins
//   over any overlapping one. Among those, the distance counts half when the boundary kind
//   is the one the edge prefers (start edges prefer sibling ends, end edges prefer sibling starts).
// - With no clear candidate the closest one is used even if it overlaps.
// - Without candidates the interval comes back unchanged.
//
// Boundaries
// - Pure. Never fails; siblings with `end <= start` are skipped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

impl SnapMode {
    /// Picks the resize mode from which edge moved. Both edges moving is treated as a move.
    pub fn from_resize_deltas(start_delta: Duration, end_delta: Duration) -> Self {
        match (start_delta.is_zero(), end_delta.is_zero()) {
            (false, true) => SnapMode::ResizeStart,
            (true, false) => SnapMode::ResizeEnd,
            _ => SnapMode::Move,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub time: DateTime<Utc>,
    pub kind: BoundaryKind,
    pub parent: Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapResult {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub snapped: bool,
}

impl SnapResult {
    fn unchanged(candidate: Interval) -> Self {
        Self {
            start: candidate.start,
            end: candidate.end,
            snapped: false,
        }
    }

    fn snapped(interval: Interval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            snapped: true,
        }
    }
}

pub fn collect_boundaries(siblings: &[Interval]) -> Vec<Boundary> {
    siblings
        .iter()
        .filter(|sibling| sibling.end > sibling.start)
        .flat_map(|sibling| {
            [
                Boundary {
                    time: sibling.start,
                    kind: BoundaryKind::Start,
                    parent: *sibling,
                },
                Boundary {
                    time: sibling.end,
                    kind: BoundaryKind::End,
                    parent: *sibling,
                },
            ]
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct EdgeSnap {
    interval: Interval,
    distance: Duration,
    overlaps: bool,
}

fn best_edge_snap(
    edge: DateTime<Utc>,
    preferred: BoundaryKind,
    boundaries: &[Boundary],
    threshold: Duration,
    simulate: impl Fn(DateTime<Utc>) -> Option<Interval>,
) -> Option<EdgeSnap> {
    let mut best_clear: Option<(i64, EdgeSnap)> = None;
    let mut closest: Option<EdgeSnap> = None;

    for boundary in boundaries {
        let distance = (boundary.time - edge).abs();
        if distance > threshold {
            continue;
        }
        let Some(interval) = simulate(boundary.time) else {
            continue;
        };
        let overlaps = interval.overlaps(&boundary.parent);
        let snap = EdgeSnap {
            interval,
            distance,
            overlaps,
        };

        if closest.is_none_or(|current| distance < current.distance) {
            closest = Some(snap);
        }
        if !overlaps {
            // Scores are doubled distances so the preferred kind can count half without rounding.
            let ms = distance.num_milliseconds();
            let score = if boundary.kind == preferred { ms } else { ms * 2 };
            if best_clear.is_none_or(|(current, _)| score < current) {
                best_clear = Some((score, snap));
            }
        }
    }

    best_clear.map(|(_, snap)| snap).or(closest)
}

pub fn snap_interval(
    candidate: Interval,
    siblings: &[Interval],
    mode: SnapMode,
    threshold: Duration,
) -> SnapResult {
    let boundaries = collect_boundaries(siblings);
    if boundaries.is_empty() {
        return SnapResult::unchanged(candidate);
    }

    let chosen = match mode {
        SnapMode::ResizeStart => best_edge_snap(
            candidate.start,
            BoundaryKind::End,
            &boundaries,
            threshold,
            |time| Interval::new(time, candidate.end),
        ),
        SnapMode::ResizeEnd => best_edge_snap(
            candidate.end,
            BoundaryKind::Start,
            &boundaries,
            threshold,
            |time| Interval::new(candidate.start, time),
        ),
        SnapMode::Move => {
            let duration = candidate.duration();
            let by_start = best_edge_snap(
                candidate.start,
                BoundaryKind::End,
                &boundaries,
                threshold,
                |time| Interval::new(time, time.checked_add_signed(duration)?),
            );
            let by_end = best_edge_snap(
                candidate.end,
                BoundaryKind::Start,
                &boundaries,
                threshold,
                |time| Interval::new(time.checked_sub_signed(duration)?, time),
            );
            match (by_start, by_end) {
                (Some(start), Some(end)) => {
                    if (end.overlaps, end.distance) < (start.overlaps, start.distance) {
                        Some(end)
                    } else {
                        Some(start)
                    }
                }
                (start, end) => start.or(end),
            }
        }
    };

    match chosen {
        Some(snap) => SnapResult::snapped(snap.interval),
        None => SnapResult::unchanged(candidate),
    }
}
