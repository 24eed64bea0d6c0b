// this_file: crates/textrig-core/src/path.rs

//! Glyph outline paths and the operations exposed on them.
//!
//! Coordinates are `f32` in whatever space the producer chose (the outline
//! extractor emits font units with y growing downward). Commands exist in
//! absolute and relative flavors; a path is normally all-absolute until
//! [`OutlinePath::as_rel`] converts it.

use std::ops::{Add, Mul, Sub};

use crate::{Result, TextrigError};

/// 2-D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// One path segment, absolute or relative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    MoveToRel(Point),
    LineTo(Point),
    LineToRel(Point),
    QuadTo { ctrl: Point, to: Point },
    QuadToRel { ctrl: Point, to: Point },
    CurveTo { ctrl1: Point, ctrl2: Point, to: Point },
    CurveToRel { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

impl PathCommand {
    /// Target point, if the command carries one.
    pub fn target(&self) -> Option<Point> {
        match *self {
            PathCommand::MoveTo(to)
            | PathCommand::MoveToRel(to)
            | PathCommand::LineTo(to)
            | PathCommand::LineToRel(to)
            | PathCommand::QuadTo { to, .. }
            | PathCommand::QuadToRel { to, .. }
            | PathCommand::CurveTo { to, .. }
            | PathCommand::CurveToRel { to, .. } => Some(to),
            PathCommand::Close => None,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(
            self,
            PathCommand::MoveToRel(_)
                | PathCommand::LineToRel(_)
                | PathCommand::QuadToRel { .. }
                | PathCommand::CurveToRel { .. }
        )
    }

    fn set_target(&mut self, new_to: Point) {
        match self {
            PathCommand::MoveTo(to)
            | PathCommand::MoveToRel(to)
            | PathCommand::LineTo(to)
            | PathCommand::LineToRel(to)
            | PathCommand::QuadTo { to, .. }
            | PathCommand::QuadToRel { to, .. }
            | PathCommand::CurveTo { to, .. }
            | PathCommand::CurveToRel { to, .. } => *to = new_to,
            PathCommand::Close => {}
        }
    }
}

/// `a` sorts before `b` when it is higher, or equally high and further left.
fn is_top_left_of(a: Point, b: Point) -> bool {
    a.y < b.y || (a.y == b.y && a.x < b.x)
}

/// Sequence of path commands with the whole-path operations on it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutlinePath {
    commands: Vec<PathCommand>,
}

impl OutlinePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    pub fn move_to(&mut self, to: Point) {
        self.commands.push(PathCommand::MoveTo(to));
    }

    pub fn line_to(&mut self, to: Point) {
        self.commands.push(PathCommand::LineTo(to));
    }

    pub fn quad_to(&mut self, ctrl: Point, to: Point) {
        self.commands.push(PathCommand::QuadTo { ctrl, to });
    }

    pub fn curve_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.commands.push(PathCommand::CurveTo { ctrl1, ctrl2, to });
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    /// x of the first command's target.
    pub fn first_x(&self) -> Option<f32> {
        self.commands.first().and_then(|c| c.target()).map(|p| p.x)
    }

    /// SVG path-data string. Absolute commands use upper-case letters,
    /// relative ones lower-case. Empty path gives an empty string.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(to) => {
                    out.push_str(&format!("M {} {} ", to.x, to.y));
                }
                PathCommand::MoveToRel(to) => {
                    out.push_str(&format!("m {} {} ", to.x, to.y));
                }
                PathCommand::LineTo(to) => {
                    out.push_str(&format!("L {} {} ", to.x, to.y));
                }
                PathCommand::LineToRel(to) => {
                    out.push_str(&format!("l {} {} ", to.x, to.y));
                }
                PathCommand::QuadTo { ctrl, to } => {
                    out.push_str(&format!("Q {} {} {} {} ", ctrl.x, ctrl.y, to.x, to.y));
                }
                PathCommand::QuadToRel { ctrl, to } => {
                    out.push_str(&format!("q {} {} {} {} ", ctrl.x, ctrl.y, to.x, to.y));
                }
                PathCommand::CurveTo { ctrl1, ctrl2, to } => {
                    out.push_str(&format!(
                        "C {} {} {} {} {} {} ",
                        ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                    ));
                }
                PathCommand::CurveToRel { ctrl1, ctrl2, to } => {
                    out.push_str(&format!(
                        "c {} {} {} {} {} {} ",
                        ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                    ));
                }
                PathCommand::Close => out.push_str("Z "),
            }
        }
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }

    /// Convert an absolute path into a relative one.
    ///
    /// Each command's points become offsets from the running position; the
    /// running position then advances to the command's target. Close resets
    /// it to the current subpath start.
    pub fn as_rel(&self) -> Result<OutlinePath> {
        if self.commands.iter().any(PathCommand::is_relative) {
            return Err(TextrigError::PathOp(
                "as_rel called on relative path".into(),
            ));
        }

        let mut out = OutlinePath::new();
        let mut current = Point::ZERO;
        let mut subpath_start = Point::ZERO;
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(to) => {
                    let rel = to - current;
                    out.push(PathCommand::MoveToRel(rel));
                    current = to;
                    subpath_start = to;
                }
                PathCommand::LineTo(to) => {
                    out.push(PathCommand::LineToRel(to - current));
                    current = to;
                }
                PathCommand::QuadTo { ctrl, to } => {
                    out.push(PathCommand::QuadToRel {
                        ctrl: ctrl - current,
                        to: to - current,
                    });
                    current = to;
                }
                PathCommand::CurveTo { ctrl1, ctrl2, to } => {
                    out.push(PathCommand::CurveToRel {
                        ctrl1: ctrl1 - current,
                        ctrl2: ctrl2 - current,
                        to: to - current,
                    });
                    current = to;
                }
                PathCommand::Close => {
                    out.push(PathCommand::Close);
                    current = subpath_start;
                }
                PathCommand::MoveToRel(_)
                | PathCommand::LineToRel(_)
                | PathCommand::QuadToRel { .. }
                | PathCommand::CurveToRel { .. } => unreachable!(),
            }
        }
        Ok(out)
    }

    /// Raise every quadratic segment to a cubic one, in place.
    ///
    /// Uses the standard two-thirds control lift. Relative quadratics are
    /// lifted in displacement space, where the segment origin is the zero
    /// point.
    pub fn to_cubic(&mut self) {
        let mut current = Point::ZERO;
        let mut subpath_start = Point::ZERO;
        for cmd in &mut self.commands {
            match *cmd {
                PathCommand::QuadTo { ctrl, to } => {
                    let ctrl1 = current + (ctrl - current) * (2.0 / 3.0);
                    let ctrl2 = to + (ctrl - to) * (2.0 / 3.0);
                    *cmd = PathCommand::CurveTo { ctrl1, ctrl2, to };
                }
                PathCommand::QuadToRel { ctrl, to } => {
                    let ctrl1 = ctrl * (2.0 / 3.0);
                    let ctrl2 = to + (ctrl - to) * (2.0 / 3.0);
                    *cmd = PathCommand::CurveToRel { ctrl1, ctrl2, to };
                }
                _ => {}
            }
            match *cmd {
                PathCommand::MoveTo(to) => {
                    current = to;
                    subpath_start = to;
                }
                PathCommand::MoveToRel(to) => {
                    current = current + to;
                    subpath_start = current;
                }
                PathCommand::LineTo(to)
                | PathCommand::QuadTo { to, .. }
                | PathCommand::CurveTo { to, .. } => current = to,
                PathCommand::LineToRel(to)
                | PathCommand::QuadToRel { to, .. }
                | PathCommand::CurveToRel { to, .. } => current = current + to,
                PathCommand::Close => current = subpath_start,
            }
        }
    }

    /// Apply a point function to every point of every command.
    pub fn transform(&mut self, f: impl Fn(Point) -> Point) {
        for cmd in &mut self.commands {
            match cmd {
                PathCommand::MoveTo(to)
                | PathCommand::MoveToRel(to)
                | PathCommand::LineTo(to)
                | PathCommand::LineToRel(to) => *to = f(*to),
                PathCommand::QuadTo { ctrl, to } | PathCommand::QuadToRel { ctrl, to } => {
                    *ctrl = f(*ctrl);
                    *to = f(*to);
                }
                PathCommand::CurveTo { ctrl1, ctrl2, to }
                | PathCommand::CurveToRel { ctrl1, ctrl2, to } => {
                    *ctrl1 = f(*ctrl1);
                    *ctrl2 = f(*ctrl2);
                    *to = f(*to);
                }
                PathCommand::Close => {}
            }
        }
    }

    /// Component-wise minimum over every point, controls included.
    pub fn lowest(&self) -> Option<Point> {
        let mut min: Option<Point> = None;
        let mut fold = |p: Point| {
            min = Some(match min {
                Some(m) => Point::new(m.x.min(p.x), m.y.min(p.y)),
                None => p,
            });
        };
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(to)
                | PathCommand::MoveToRel(to)
                | PathCommand::LineTo(to)
                | PathCommand::LineToRel(to) => fold(to),
                PathCommand::QuadTo { ctrl, to } | PathCommand::QuadToRel { ctrl, to } => {
                    fold(ctrl);
                    fold(to);
                }
                PathCommand::CurveTo { ctrl1, ctrl2, to }
                | PathCommand::CurveToRel { ctrl1, ctrl2, to } => {
                    fold(ctrl1);
                    fold(ctrl2);
                    fold(to);
                }
                PathCommand::Close => {}
            }
        }
        min
    }

    /// Normalize subpath order and direction, in place.
    ///
    /// Each subpath is rotated to start at its top-left-most target point,
    /// subpaths are sorted by that point (y, then x), and if the first
    /// subpath winds counter-clockwise every subpath is reversed. Subpaths
    /// must be closed in geometry (end where they start), which is what the
    /// outline extractor produces; quadratic and close segments are
    /// rejected.
    pub fn reorder(&mut self) -> Result<()> {
        if self.commands.is_empty() {
            return Ok(());
        }
        for cmd in &self.commands {
            match cmd {
                PathCommand::QuadTo { .. } | PathCommand::QuadToRel { .. } => {
                    return Err(TextrigError::PathOp(
                        "reorder called on path with quadratic segments".into(),
                    ));
                }
                PathCommand::Close => {
                    return Err(TextrigError::PathOp(
                        "reorder called on path with close segments".into(),
                    ));
                }
                _ if cmd.is_relative() => {
                    return Err(TextrigError::PathOp(
                        "reorder called on relative path".into(),
                    ));
                }
                _ => {}
            }
        }

        // Split at MoveTo commands.
        let mut subpaths: Vec<Vec<PathCommand>> = Vec::new();
        for cmd in self.commands.drain(..) {
            if matches!(cmd, PathCommand::MoveTo(_)) || subpaths.is_empty() {
                subpaths.push(vec![cmd]);
            } else if let Some(last) = subpaths.last_mut() {
                last.push(cmd);
            }
        }

        // Rotate each subpath to start at its top-left-most target.
        let mut keyed: Vec<(Point, Vec<PathCommand>)> = Vec::with_capacity(subpaths.len());
        for sub in subpaths {
            let mut best = Point::new(f32::MAX, f32::MAX);
            let mut best_idx = 0;
            for (i, cmd) in sub.iter().enumerate() {
                if let Some(to) = cmd.target() {
                    if is_top_left_of(to, best) {
                        best = to;
                        best_idx = i;
                    }
                }
            }
            let mut rotated = Vec::with_capacity(sub.len());
            rotated.push(PathCommand::MoveTo(best));
            rotated.extend_from_slice(&sub[best_idx + 1..]);
            rotated.extend_from_slice(&sub[1..=best_idx]);
            keyed.push((best, rotated));
        }

        keyed.sort_by(|(a, _), (b, _)| {
            a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
        });

        if let Some((_, first)) = keyed.first() {
            if !is_clockwise(first) {
                for (_, sub) in &mut keyed {
                    reverse_subpath(sub);
                }
            }
        }

        self.commands = keyed.into_iter().flat_map(|(_, sub)| sub).collect();
        Ok(())
    }
}

/// Shoelace sign over consecutive target points; positive means clockwise
/// in a y-down frame.
fn is_clockwise(sub: &[PathCommand]) -> bool {
    let targets: Vec<Point> = sub.iter().filter_map(PathCommand::target).collect();
    let mut det = 0.0f32;
    for pair in targets.windows(2) {
        det += pair[0].x * pair[1].y - pair[1].x * pair[0].y;
    }
    det > 0.0
}

/// Reverse the direction of a closed subpath headed by a MoveTo.
fn reverse_subpath(sub: &mut [PathCommand]) {
    if sub.len() < 2 {
        return;
    }
    let anchor = match sub[0].target() {
        Some(p) => p,
        None => return,
    };
    sub[1..].reverse();
    for cmd in &mut sub[1..] {
        if let PathCommand::CurveTo { ctrl1, ctrl2, .. } = cmd {
            std::mem::swap(ctrl1, ctrl2);
        }
    }
    // Walking backwards, each segment now ends where its successor began.
    for i in 1..sub.len() {
        let new_to = if i + 1 < sub.len() {
            match sub[i + 1].target() {
                Some(p) => p,
                None => continue,
            }
        } else {
            anchor
        };
        sub[i].set_target(new_to);
    }
}

/// Per-cluster outline paths plus the advance of every cluster except the
/// last, both in font units.
#[derive(Debug, Clone, Default)]
pub struct ClusterPaths {
    pub paths: Vec<OutlinePath>,
    pub advances: Vec<f32>,
}
