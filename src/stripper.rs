//! Joins line segments into the longest possible polylines.

use cgmath::Point3;

use crate::profile::Profile;

/// An ordered run of points; `closed` joins the last point back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point3<f32>>,
    pub closed: bool,
}

impl Polyline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        match (self.closed, self.points.len()) {
            (_, 0) | (_, 1) => 0,
            (true, n) => n,
            (false, n) => n - 1,
        }
    }
}

/// Strip the profile's line cells. Polygon profiles carry no line cells and
/// produce nothing.
pub fn strip_lines(profile: &Profile) -> Vec<Polyline> {
    let positions: Vec<Point3<f32>> = profile.positions().collect();
    strip_segments(&positions, &profile.line_segments())
}

/// Join `segments` (pairs of indices into `positions`) into polylines.
///
/// Walks start at vertices whose degree is not two, so open chains come out
/// whole; whatever is left afterwards are cycles, emitted as closed
/// polylines.
pub fn strip_segments(positions: &[Point3<f32>], segments: &[[usize; 2]]) -> Vec<Polyline> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); positions.len()];
    for (s, &[a, b]) in segments.iter().enumerate() {
        adjacency[a].push(s);
        adjacency[b].push(s);
    }

    let mut used = vec![false; segments.len()];
    let mut strips = Vec::new();

    let endpoints = (0..positions.len()).filter(|&v| adjacency[v].len() != 2);
    let cycle_starts = 0..positions.len();
    for (start, closed) in endpoints.map(|v| (v, false)).chain(cycle_starts.map(|v| (v, true))) {
        while let Some(chain) = walk(start, segments, &adjacency, &mut used) {
            let closed = closed && chain.first() == chain.last();
            let mut points: Vec<Point3<f32>> = chain.iter().map(|&v| positions[v]).collect();
            if closed {
                points.pop();
            }
            strips.push(Polyline { points, closed });
        }
    }

    log::debug!("stripper: {} segments -> {} polylines", segments.len(), strips.len());
    strips
}

fn walk(
    start: usize,
    segments: &[[usize; 2]],
    adjacency: &[Vec<usize>],
    used: &mut [bool],
) -> Option<Vec<usize>> {
    let mut chain = vec![start];
    let mut current = start;

    while let Some(&s) = adjacency[current].iter().find(|&&s| !used[s]) {
        used[s] = true;
        let [a, b] = segments[s];
        current = if a == current { b } else { a };
        chain.push(current);
        if current == start {
            break;
        }
    }

    if chain.len() > 1 {
        Some(chain)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Connectivity;

    fn points(n: usize) -> Vec<Point3<f32>> {
        (0..n).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn shuffled_segments_join_into_one_strip() {
        let strips = strip_segments(&points(5), &[[2, 3], [0, 1], [3, 4], [1, 2]]);
        assert_eq!(strips.len(), 1);
        assert!(!strips[0].closed);
        assert_eq!(strips[0].len(), 5);
        assert_eq!(strips[0].segment_count(), 4);
    }

    #[test]
    fn cycle_becomes_closed_polyline() {
        let strips = strip_segments(&points(3), &[[0, 1], [1, 2], [2, 0]]);
        assert_eq!(strips.len(), 1);
        assert!(strips[0].closed);
        assert_eq!(strips[0].len(), 3);
        assert_eq!(strips[0].segment_count(), 3);
    }

    #[test]
    fn branch_splits_strips() {
        // A "T": 0-1-2 with 1-3 hanging off the middle.
        let strips = strip_segments(&points(4), &[[0, 1], [1, 2], [1, 3]]);
        let total: usize = strips.iter().map(Polyline::segment_count).sum();
        assert_eq!(total, 3);
        assert_eq!(strips.len(), 2);
    }

    #[test]
    fn polygon_profile_has_no_lines() {
        let data = [(0, [1.0, 0.0, 0.0]), (1, [2.0, 0.0, 0.0]), (2, [2.0, 0.0, 1.0])];
        let profile = Profile::from_points(&data, Connectivity::Polygon).unwrap();
        assert!(strip_lines(&profile).is_empty());
    }
}
