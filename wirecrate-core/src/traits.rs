//! Core traits for wirecrate

use crate::{point::Point3d, point_cloud::PointCloud};

/// Trait for objects with an axis-aligned extent
pub trait Bounded {
    /// Get the bounding box of the object as `(min, max)`
    ///
    /// Empty objects return the origin for both corners.
    fn bounding_box(&self) -> (Point3d, Point3d);

    /// Get the center of the bounding box
    fn center(&self) -> Point3d {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }
}

fn bounds_of<'a, I>(points: I) -> (Point3d, Point3d)
where
    I: IntoIterator<Item = &'a Point3d>,
{
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return (Point3d::origin(), Point3d::origin());
    };

    let mut min = *first;
    let mut max = *first;
    for p in iter {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (min, max)
}

impl Bounded for PointCloud<Point3d> {
    fn bounding_box(&self) -> (Point3d, Point3d) {
        bounds_of(self.iter())
    }
}
