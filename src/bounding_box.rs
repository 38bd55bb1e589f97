//! Axis aligned bounding boxes around points, segments and fitted curves.

use nalgebra::Vector2;

/// Axis aligned rectangle given by its smallest and largest corner.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    /// Corner with the smallest coordinates
    pub min: Vector2<f64>,
    /// Corner with the largest coordinates
    pub max: Vector2<f64>,
}

impl BoundingBox {
    /// Constructs a box containing only a single point
    pub fn from_point(point: Vector2<f64>) -> BoundingBox {
        BoundingBox {
            min: point,
            max: point,
        }
    }

    /// Constructs the smallest box containing all points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_iter<Iter: IntoIterator<Item = Vector2<f64>>>(points: Iter) -> Option<BoundingBox> {
        let mut points = points.into_iter();
        let mut bb = BoundingBox::from_point(points.next()?);
        for p in points {
            bb.include(&p);
        }
        Some(bb)
    }

    /// Grows the box so it contains `point`
    pub fn include(&mut self, point: &Vector2<f64>) {
        self.min = Vector2::new(self.min.x.min(point.x), self.min.y.min(point.y));
        self.max = Vector2::new(self.max.x.max(point.x), self.max.y.max(point.y));
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &Self) -> BoundingBox {
        let mut bb = self.clone();
        bb.include(&other.min);
        bb.include(&other.max);
        bb
    }

    /// Checks whether `point` lies inside or on the border of the box
    pub fn contains(&self, point: &Vector2<f64>) -> bool {
        self.min.x <= point.x
            && self.min.y <= point.y
            && point.x <= self.max.x
            && point.y <= self.max.y
    }

    /// Extent along the x axis
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along the y axis
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}
