//! Geometry helpers in pixel space: clipping to the axes box and dashing.

/// Axis-aligned clip rectangle `x0 <= x <= x1`, `y0 <= y <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl ClipRect {
    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Liang–Barsky: the part of segment `a`-`b` inside `r`, if any.
pub fn clip_segment(
    r: &ClipRect,
    a: (f64, f64),
    b: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, a.0 - r.x0),
        (dx, r.x1 - a.0),
        (-dy, a.1 - r.y0),
        (dy, r.y1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

/// Clip a polyline; returns the visible runs. Non-finite points split the line.
pub fn clip_polyline(r: &ClipRect, points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut cur: Vec<(f64, f64)> = Vec::new();
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let finite = a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite();
        match finite.then(|| clip_segment(r, a, b)).flatten() {
            Some((p, q)) => {
                if cur.last() != Some(&p) {
                    if !cur.is_empty() {
                        runs.push(std::mem::take(&mut cur));
                    }
                    cur.push(p);
                }
                cur.push(q);
                if q != b {
                    runs.push(std::mem::take(&mut cur));
                }
            }
            None => {
                if !cur.is_empty() {
                    runs.push(std::mem::take(&mut cur));
                }
            }
        }
    }
    if cur.len() > 1 {
        runs.push(cur);
    }
    runs.retain(|r| r.len() > 1);
    runs
}

#[derive(Clone, Copy)]
enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

impl Edge {
    fn inside(self, r: &ClipRect, p: (f64, f64)) -> bool {
        match self {
            Edge::Left => p.0 >= r.x0,
            Edge::Right => p.0 <= r.x1,
            Edge::Bottom => p.1 >= r.y0,
            Edge::Top => p.1 <= r.y1,
        }
    }

    fn cut(self, r: &ClipRect, a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
        match self {
            Edge::Left => at_x(a, b, r.x0),
            Edge::Right => at_x(a, b, r.x1),
            Edge::Bottom => at_y(a, b, r.y0),
            Edge::Top => at_y(a, b, r.y1),
        }
    }
}

/// Sutherland–Hodgman polygon clipping against `r`.
pub fn clip_polygon(r: &ClipRect, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    for edge in [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top] {
        if out.is_empty() {
            break;
        }
        let input = std::mem::take(&mut out);
        let mut prev = input[input.len() - 1];
        for &p in &input {
            match (edge.inside(r, p), edge.inside(r, prev)) {
                (true, true) => out.push(p),
                (true, false) => {
                    out.push(edge.cut(r, prev, p));
                    out.push(p);
                }
                (false, true) => out.push(edge.cut(r, prev, p)),
                (false, false) => {}
            }
            prev = p;
        }
    }
    out
}

fn at_x(a: (f64, f64), b: (f64, f64), x: f64) -> (f64, f64) {
    let t = (x - a.0) / (b.0 - a.0);
    (x, a.1 + t * (b.1 - a.1))
}

fn at_y(a: (f64, f64), b: (f64, f64), y: f64) -> (f64, f64) {
    let t = (y - a.1) / (b.1 - a.1);
    (a.0 + t * (b.0 - a.0), y)
}

/// Split a polyline into dash segments of `on` pixels separated by `off` pixels.
pub fn dash_polyline(points: &[(f64, f64)], on: f64, off: f64) -> Vec<Vec<(f64, f64)>> {
    if on <= 0.0 || off <= 0.0 {
        return vec![points.to_vec()];
    }
    let mut dashes = Vec::new();
    let mut cur: Vec<(f64, f64)> = Vec::new();
    let mut drawing = true;
    let mut left = on;
    for w in points.windows(2) {
        let (mut a, b) = (w[0], w[1]);
        let mut seg = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        if drawing && cur.is_empty() {
            cur.push(a);
        }
        while seg > left {
            let t = left / seg;
            let p = (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
            if drawing {
                cur.push(p);
                dashes.push(std::mem::take(&mut cur));
            } else {
                cur.push(p);
            }
            seg -= left;
            a = p;
            drawing = !drawing;
            left = if drawing { on } else { off };
        }
        left -= seg;
        if drawing {
            cur.push(b);
        }
    }
    if drawing && cur.len() > 1 {
        dashes.push(cur);
    }
    dashes
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: ClipRect = ClipRect {
        x0: 0.0,
        y0: 0.0,
        x1: 10.0,
        y1: 10.0,
    };

    #[test]
    fn segment_crossing_the_box_is_cut() {
        let (a, b) = clip_segment(&R, (-5.0, 5.0), (15.0, 5.0)).unwrap();
        assert_eq!(a, (0.0, 5.0));
        assert_eq!(b, (10.0, 5.0));
        assert!(clip_segment(&R, (-5.0, -5.0), (-1.0, 20.0)).is_none());
    }

    #[test]
    fn polyline_leaving_and_reentering_gives_two_runs() {
        let runs = clip_polyline(&R, &[(1.0, 1.0), (1.0, 20.0), (5.0, 20.0), (5.0, 1.0)]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(1.0, 1.0), (1.0, 10.0)]);
        assert_eq!(runs[1], vec![(5.0, 10.0), (5.0, 1.0)]);
    }

    #[test]
    fn polygon_is_cut_to_the_box() {
        let out = clip_polygon(&R, &[(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (-5.0, 5.0)]);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|p| R.contains(*p)));
    }

    #[test]
    fn dashes_alternate() {
        let d = dash_polyline(&[(0.0, 0.0), (10.0, 0.0)], 4.0, 2.0);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0], vec![(0.0, 0.0), (4.0, 0.0)]);
        assert_eq!(d[1], vec![(6.0, 0.0), (10.0, 0.0)]);
    }
}
