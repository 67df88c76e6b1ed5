use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::{Position, Size};

/// Integer rectangle. A rectangle with a non positive width or height is empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub start: Position,
    pub size: Size,
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(x:{}, y:{}, width: {}, height: {})",
            self.start.x, self.start.y, self.size.width, self.size.height
        )
    }
}

impl Rectangle {
    pub const fn new(start: Position, size: Size) -> Self {
        Self { start, size }
    }

    pub const fn from(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            start: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// An empty rectangle anchored at the origin.
    pub const fn empty() -> Self {
        Self::from(0, 0, 0, 0)
    }

    /// Builds the rectangle spanned by two corner pixels. Both corners are inside
    /// the result, so `from_corners((1, 1), (1, 1))` is a single pixel.
    pub fn from_corners(p1: Position, p2: Position) -> Self {
        let start = p1.min(p2);
        let end = p1.max(p2);
        Rectangle {
            start,
            size: Size::new(end.x - start.x + 1, end.y - start.y + 1),
        }
    }

    pub fn from_min_size(pos: impl Into<Position>, size: impl Into<Size>) -> Rectangle {
        Rectangle {
            start: pos.into(),
            size: size.into(),
        }
    }

    pub fn top_left(&self) -> Position {
        self.start
    }

    /// Exclusive bottom right corner.
    pub fn bottom_right(&self) -> Position {
        Position {
            x: self.start.x + self.size.width,
            y: self.start.y + self.size.height,
        }
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn left(&self) -> i32 {
        self.start.x
    }

    pub fn right(&self) -> i32 {
        self.start.x + self.size.width
    }

    pub fn top(&self) -> i32 {
        self.start.y
    }

    pub fn bottom(&self) -> i32 {
        self.start.y + self.size.height
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.size.width as i64 * self.size.height as i64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn contains_pt(&self, pos: impl Into<Position>) -> bool {
        let pos = pos.into();
        self.start.x <= pos.x && self.start.y <= pos.y && pos.x < self.right() && pos.y < self.bottom()
    }

    /// True if every pixel of `other` lies inside `self`. Empty rectangles are
    /// contained by anything.
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        if other.is_empty() {
            return true;
        }
        self.left() <= other.left() && self.top() <= other.top() && other.right() <= self.right() && other.bottom() <= self.bottom()
    }

    /// Intersection of both rectangles; empty if they are disjoint.
    pub fn clip(&self, other: &Rectangle) -> Rectangle {
        let min = self.start.max(other.start);
        let max = self.bottom_right().min(other.bottom_right());
        if max.x <= min.x || max.y <= min.y {
            return Rectangle::new(min, Size::new(0, 0));
        }
        Rectangle {
            start: min,
            size: (max - min).into(),
        }
    }

    /// Bounding box of both rectangles. Empty operands are ignored.
    pub fn merge(&self, other: &Rectangle) -> Rectangle {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let min = self.start.min(other.start);
        let max = self.bottom_right().max(other.bottom_right());
        Rectangle {
            start: min,
            size: (max - min).into(),
        }
    }

    /// Grows the rectangle by `margin` pixels on every side.
    pub fn expand(&self, margin: i32) -> Rectangle {
        Rectangle::from(
            self.start.x - margin,
            self.start.y - margin,
            self.size.width + 2 * margin,
            self.size.height + 2 * margin,
        )
    }

    pub fn y_range(&self) -> std::ops::Range<i32> {
        self.start.y..self.bottom()
    }

    pub fn x_range(&self) -> std::ops::Range<i32> {
        self.start.x..self.right()
    }
}

impl Add<Position> for Rectangle {
    type Output = Rectangle;

    fn add(self, rhs: Position) -> Rectangle {
        Rectangle {
            start: self.start + rhs,
            size: self.size,
        }
    }
}

impl AddAssign<Position> for Rectangle {
    fn add_assign(&mut self, rhs: Position) {
        self.start += rhs;
    }
}

impl Sub<Position> for Rectangle {
    type Output = Rectangle;

    fn sub(self, rhs: Position) -> Rectangle {
        Rectangle {
            start: self.start - rhs,
            size: self.size,
        }
    }
}

impl SubAssign<Position> for Rectangle {
    fn sub_assign(&mut self, rhs: Position) {
        self.start -= rhs;
    }
}
