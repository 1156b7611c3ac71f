//! Shapes with documented examples.
//!
//! ```test
//! let c = Circle::new(1.0);
//! assert!(c.area() > 3.0);
//! ```

/// A circle.
///
/// ```test
/// let c = Circle::new(2.0);
/// assert_eq!(c.radius, 2.0);
/// ```
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    /// Make a circle.
    ///
    /// ```test ignore
    /// let c = Circle::new(-1.0);
    /// ```
    pub fn new(radius: f64) -> Self {
        Circle { radius }
    }

    /// The area, which this example gets wrong on purpose.
    ///
    /// ```test
    /// assert_eq!(Circle::new(1.0).area(), 1.0, "pi is not one");
    /// ```
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}
