use serde::{Deserialize, Serialize};

use crate::geometry::distance_to_segment;
use crate::Point;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Ink {
    Color(String),
    /// Paints by removing what lies underneath.
    EraseMarker,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Stroke {
    pub path: Vec<Point>,
    pub ink: Ink,
    pub width: f32,
}

impl Stroke {
    pub fn is_degenerate(&self) -> bool {
        self.path.len() <= 1
    }

    fn with_path(&self, path: Vec<Point>) -> Stroke {
        Stroke {
            path,
            ink: self.ink.clone(),
            width: self.width,
        }
    }
}

/// Runs one erase pass of an eraser circle of diameter `eraser_size` centred
/// at `center`. Every segment within reach of the circle is dropped and the
/// surviving runs become separate strokes. Returns whether anything changed.
pub fn erase_pass(strokes: &mut Vec<Stroke>, center: Point, eraser_size: f32) -> bool {
    let radius = eraser_size as f64 / 2.0;
    let mut changed = false;
    let mut kept = Vec::with_capacity(strokes.len());
    for stroke in strokes.drain(..) {
        match split_stroke(&stroke, center, radius) {
            Some(pieces) => {
                changed = true;
                kept.extend(pieces);
            }
            None => kept.push(stroke),
        }
    }
    *strokes = kept;
    changed
}

fn split_stroke(stroke: &Stroke, center: Point, radius: f64) -> Option<Vec<Stroke>> {
    let reach = radius + stroke.width as f64 / 2.0;
    let mut pieces = Vec::new();
    let mut run = Vec::new();
    let mut hit = false;
    for (index, point) in stroke.path.iter().enumerate() {
        if index == 0 {
            run.push(*point);
            continue;
        }
        let previous = stroke.path[index - 1];
        if distance_to_segment(center, previous, *point) <= reach {
            hit = true;
            flush_run(stroke, &mut run, &mut pieces);
        } else {
            run.push(*point);
        }
    }
    if !hit {
        return None;
    }
    flush_run(stroke, &mut run, &mut pieces);
    Some(pieces)
}

fn flush_run(stroke: &Stroke, run: &mut Vec<Point>, pieces: &mut Vec<Stroke>) {
    let path = std::mem::take(run);
    if path.len() > 1 {
        pieces.push(stroke.with_path(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(from: f32, to: f32, step: f32) -> Stroke {
        let mut path = Vec::new();
        let mut x = from;
        while x <= to {
            path.push(Point::new(x, 0.0));
            x += step;
        }
        Stroke {
            path,
            ink: Ink::Color("#ff0000".to_string()),
            width: 2.0,
        }
    }

    #[test]
    fn short_segment_under_eraser_is_consumed() {
        let mut strokes = vec![Stroke {
            path: vec![Point::new(47.0, 0.0), Point::new(53.0, 0.0)],
            ink: Ink::Color("#000".to_string()),
            width: 2.0,
        }];
        assert!(erase_pass(&mut strokes, Point::new(50.0, 0.0), 10.0));
        assert!(strokes.is_empty());
    }

    #[test]
    fn long_stroke_splits_into_two_sides() {
        let mut strokes = vec![line(0.0, 100.0, 1.0)];
        assert!(erase_pass(&mut strokes, Point::new(50.0, 0.0), 10.0));
        assert_eq!(strokes.len(), 2);
        let left = &strokes[0];
        let right = &strokes[1];
        assert!(left.path.len() > 1 && right.path.len() > 1);
        assert_eq!(left.path.first(), Some(&Point::new(0.0, 0.0)));
        assert!(left.path.iter().all(|p| p.x < 50.0));
        assert!(right.path.iter().all(|p| p.x > 50.0));
        assert_eq!(right.path.last(), Some(&Point::new(100.0, 0.0)));
        assert_eq!(left.ink, Ink::Color("#ff0000".to_string()));
        assert_eq!(right.width, 2.0);
    }

    #[test]
    fn stroke_width_extends_reach() {
        let mut thin = vec![Stroke {
            path: vec![Point::new(0.0, 8.0), Point::new(100.0, 8.0)],
            ink: Ink::Color("#000".to_string()),
            width: 2.0,
        }];
        assert!(!erase_pass(&mut thin, Point::new(50.0, 0.0), 10.0));
        assert_eq!(thin.len(), 1);

        let mut thick = vec![Stroke {
            path: vec![Point::new(0.0, 8.0), Point::new(100.0, 8.0)],
            ink: Ink::Color("#000".to_string()),
            width: 6.0,
        }];
        assert!(erase_pass(&mut thick, Point::new(50.0, 0.0), 10.0));
        assert!(thick.is_empty());
    }

    #[test]
    fn untouched_strokes_keep_their_order() {
        let far = Stroke {
            path: vec![Point::new(0.0, 200.0), Point::new(10.0, 200.0)],
            ink: Ink::Color("#111".to_string()),
            width: 1.0,
        };
        let mut strokes = vec![far.clone(), line(0.0, 100.0, 1.0), far.clone()];
        erase_pass(&mut strokes, Point::new(50.0, 0.0), 10.0);
        assert_eq!(strokes.len(), 4);
        assert_eq!(strokes[0], far);
        assert_eq!(strokes[3], far);
    }

    #[test]
    fn passes_compound() {
        let mut strokes = vec![line(0.0, 100.0, 1.0)];
        erase_pass(&mut strokes, Point::new(30.0, 0.0), 6.0);
        erase_pass(&mut strokes, Point::new(70.0, 0.0), 6.0);
        assert_eq!(strokes.len(), 3);
        assert!(strokes.iter().all(|stroke| !stroke.is_degenerate()));
    }

    #[test]
    fn miss_changes_nothing() {
        let before = vec![line(0.0, 10.0, 1.0)];
        let mut strokes = before.clone();
        assert!(!erase_pass(&mut strokes, Point::new(50.0, 50.0), 10.0));
        assert_eq!(strokes, before);
    }
}
