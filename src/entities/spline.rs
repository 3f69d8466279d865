//! Spline entity

use bitflags::bitflags;

use super::EntityCommon;
use crate::error::ArgumentError;
use crate::types::Vector3;

bitflags! {
    /// Spline flags (group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SplineFlags: i16 {
        const CLOSED = 1;
        const PERIODIC = 2;
        const RATIONAL = 4;
        const PLANAR = 8;
        const LINEAR = 16;
    }
}

/// NURBS curve given by control points and knots, or by fit points
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    pub common: EntityCommon,
    pub flags: SplineFlags,
    /// Knot values (40)
    pub knots: Vec<f64>,
    /// Control point weights (41), empty unless rational
    pub weights: Vec<f64>,
    /// Control points (10)
    pub control_points: Vec<Vector3>,
    /// Fit points (11)
    pub fit_points: Vec<Vector3>,
    /// Start tangent (12)
    pub start_tangent: Option<Vector3>,
    /// End tangent (13)
    pub end_tangent: Option<Vector3>,
    /// Knot tolerance (42)
    pub knot_tolerance: f64,
    /// Control point tolerance (43)
    pub control_point_tolerance: f64,
    /// Fit tolerance (44)
    pub fit_tolerance: f64,
    degree: i16,
}

impl Spline {
    pub fn new() -> Self {
        Spline {
            common: EntityCommon::new(),
            flags: SplineFlags::PLANAR,
            knots: Vec::new(),
            weights: Vec::new(),
            control_points: Vec::new(),
            fit_points: Vec::new(),
            start_tangent: None,
            end_tangent: None,
            knot_tolerance: 1e-10,
            control_point_tolerance: 1e-10,
            fit_tolerance: 1e-10,
            degree: 3,
        }
    }

    /// Clamped uniform spline through the given control points
    pub fn from_control_points(
        degree: i16,
        control_points: Vec<Vector3>,
    ) -> Result<Self, ArgumentError> {
        let mut spline = Self::new();
        spline.set_degree(degree)?;
        let n = control_points.len();
        let order = degree as usize + 1;
        if n < order {
            return Err(ArgumentError::new(
                "control_points",
                format!("a degree {} spline needs at least {} control points", degree, order),
            ));
        }
        let spans = (n - degree as usize) as f64;
        spline.knots = (0..n + order)
            .map(|i| {
                if i < order {
                    0.0
                } else if i >= n {
                    1.0
                } else {
                    (i - degree as usize) as f64 / spans
                }
            })
            .collect();
        spline.control_points = control_points;
        Ok(spline)
    }

    /// Degree (71), 1 to 10
    pub fn degree(&self) -> i16 {
        self.degree
    }

    pub fn set_degree(&mut self, degree: i16) -> Result<(), ArgumentError> {
        if !(1..=10).contains(&degree) {
            return Err(ArgumentError::new(
                "degree",
                format!("must be between 1 and 10, got {}", degree),
            ));
        }
        self.degree = degree;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(SplineFlags::CLOSED)
    }
}

impl Default for Spline {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_entity!(Spline, "SPLINE");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_knots() {
        let points = vec![
            Vector3::ZERO,
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(3.0, 1.0, 0.0),
        ];
        let spline = Spline::from_control_points(3, points).unwrap();
        assert_eq!(spline.knots, vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_degree_range() {
        let mut spline = Spline::new();
        assert!(spline.set_degree(0).is_err());
        assert!(spline.set_degree(11).is_err());
        assert!(Spline::from_control_points(3, vec![Vector3::ZERO]).is_err());
    }
}
