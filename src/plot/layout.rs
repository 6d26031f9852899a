//! Iterative force-based label placement.
//!
//! Visible labels are pushed away from data points, from each other (and
//! from silent obstacles), and off reference lines until the largest
//! per-iteration displacement falls below the precision tolerance. The
//! update is a plain fixed-order sweep with no randomness, so a given input
//! always produces the same placement.

use crate::plot::LabelCandidate;

/// A reference line labels must not sit on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefObject {
    /// Horizontal line at a given y.
    HLine(f64),
    /// Vertical line at a given x.
    VLine(f64),
}

/// Geometry and force settings for one layout run.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Repulsion multiplier for data points.
    pub force_points: f64,
    /// Repulsion multiplier for other labels.
    pub force_text: f64,
    /// Repulsion multiplier for reference objects.
    pub force_objects: f64,
    /// Stop once the largest displacement in a sweep is below this.
    pub precision: f64,
    /// Hard iteration cap.
    pub max_iter: usize,
    /// Estimated width of one label character, in data units.
    pub char_width: f64,
    /// Estimated label height, in data units.
    pub label_height: f64,
}

/// Each displacement is scaled down so overlaps resolve gradually instead of
/// overshooting past other labels.
const DAMPING: f64 = 0.5;

const DEFAULT_MAX_ITER: usize = 500;

impl LayoutConfig {
    /// Derive label box dimensions from the axis ranges: roughly 2% of the
    /// x range per character and 3% of the y range per line.
    pub fn for_ranges(x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let x_span = (x_range.1 - x_range.0).abs().max(f64::EPSILON);
        let y_span = (y_range.1 - y_range.0).abs().max(f64::EPSILON);
        Self {
            force_points: 0.5,
            force_text: 0.5,
            force_objects: 0.25,
            precision: 0.01,
            max_iter: DEFAULT_MAX_ITER,
            char_width: 0.02 * x_span,
            label_height: 0.03 * y_span,
        }
    }

    /// Set the `(points, text, objects)` force multipliers.
    pub fn with_forces(mut self, force: (f64, f64, f64)) -> Self {
        self.force_points = force.0;
        self.force_text = force.1;
        self.force_objects = force.2;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }
}

/// Axis-aligned label box, center plus half extents.
#[derive(Debug, Clone, Copy)]
struct Rect {
    cx: f64,
    cy: f64,
    half_w: f64,
    half_h: f64,
}

impl Rect {
    /// Overlap extents with another box, when they intersect.
    fn overlap(&self, other: &Rect) -> Option<(f64, f64)> {
        let ox = self.half_w + other.half_w - (self.cx - other.cx).abs();
        let oy = self.half_h + other.half_h - (self.cy - other.cy).abs();
        if ox > 0.0 && oy > 0.0 {
            Some((ox, oy))
        } else {
            None
        }
    }
}

fn signum_or_up(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Place all candidates, returning final positions aligned with the input.
///
/// Silent obstacles never move; their returned position equals their data
/// position. Visible labels start at their data point and are displaced
/// until convergence or the iteration cap.
pub fn layout_labels(
    candidates: &[LabelCandidate],
    points: &[(f64, f64)],
    objects: &[RefObject],
    config: &LayoutConfig,
) -> Vec<(f64, f64)> {
    let mut positions: Vec<(f64, f64)> = candidates.iter().map(|c| (c.x, c.y)).collect();
    if candidates.is_empty() {
        return positions;
    }

    let rects: Vec<Rect> = candidates
        .iter()
        .map(|c| Rect {
            cx: c.x,
            cy: c.y,
            half_w: config.char_width * c.text.chars().count().max(1) as f64 / 2.0,
            half_h: config.label_height / 2.0,
        })
        .collect();

    for _ in 0..config.max_iter {
        let mut max_move = 0.0f64;

        for i in 0..candidates.len() {
            if candidates[i].is_silent() {
                continue;
            }
            let me = Rect {
                cx: positions[i].0,
                cy: positions[i].1,
                ..rects[i]
            };
            let (mut fx, mut fy) = (0.0, 0.0);

            for j in 0..candidates.len() {
                if i == j {
                    continue;
                }
                let other = Rect {
                    cx: positions[j].0,
                    cy: positions[j].1,
                    ..rects[j]
                };
                if let Some((ox, oy)) = me.overlap(&other) {
                    // Push along the axis with the shallower penetration.
                    // Coincident centers break the tie by candidate order so
                    // stacked labels fan out instead of moving in lockstep.
                    if ox < oy {
                        let dir = if me.cx != other.cx {
                            signum_or_up(me.cx - other.cx)
                        } else if i > j {
                            1.0
                        } else {
                            -1.0
                        };
                        fx += dir * ox * config.force_text;
                    } else {
                        let dir = if me.cy != other.cy {
                            signum_or_up(me.cy - other.cy)
                        } else if i > j {
                            1.0
                        } else {
                            -1.0
                        };
                        fy += dir * oy * config.force_text;
                    }
                }
            }

            for &(px, py) in points {
                let dx = me.cx - px;
                let dy = me.cy - py;
                if dx.abs() < me.half_w && dy.abs() < me.half_h {
                    let ox = me.half_w - dx.abs();
                    let oy = me.half_h - dy.abs();
                    if ox < oy {
                        fx += signum_or_up(dx) * ox * config.force_points;
                    } else {
                        fy += signum_or_up(dy) * oy * config.force_points;
                    }
                }
            }

            for object in objects {
                match object {
                    RefObject::HLine(y0) => {
                        let pen = me.half_h - (me.cy - y0).abs();
                        if pen > 0.0 {
                            fy += signum_or_up(me.cy - y0) * pen * config.force_objects;
                        }
                    }
                    RefObject::VLine(x0) => {
                        let pen = me.half_w - (me.cx - x0).abs();
                        if pen > 0.0 {
                            fx += signum_or_up(me.cx - x0) * pen * config.force_objects;
                        }
                    }
                }
            }

            let dx = fx * DAMPING;
            let dy = fy * DAMPING;
            positions[i].0 += dx;
            positions[i].1 += dy;
            max_move = max_move.max(dx.hypot(dy));
        }

        if max_move < config.precision {
            break;
        }
    }

    positions
}
