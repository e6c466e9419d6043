//! Physical parameters
//!
//! The drone body is treated as a thin rectangle of half-length `lb`
//! and the pendulum link as a rod whose mass `m1` sits at distance `l1`
//! from the pivot.

use super::DynamicsError;

/// Validated physical description of the drone and its pendulum link
///
/// Immutable once constructed. Accessors return exactly the values that
/// were supplied to [`PhysicalParameters::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalParameters {
    mb: f64,
    lb: f64,
    m1: f64,
    l1: f64,
    g: f64,
    input_max: f64,
    body_inertia: f64,
    link_inertia: f64,
}

impl PhysicalParameters {
    /// Create parameters, rejecting nonpositive masses and lengths
    ///
    /// # Arguments
    /// * `mb` - Body mass [kg]
    /// * `lb` - Body half-length (rotor arm) [m]
    /// * `m1` - Pendulum mass [kg]
    /// * `l1` - Pendulum length [m]
    /// * `g` - Gravity magnitude [m/s²]
    /// * `input_max` - Per-rotor thrust saturation [N]
    pub fn new(
        mb: f64,
        lb: f64,
        m1: f64,
        l1: f64,
        g: f64,
        input_max: f64,
    ) -> Result<Self, DynamicsError> {
        require_positive("mb", mb)?;
        require_positive("lb", lb)?;
        require_positive("m1", m1)?;
        require_positive("l1", l1)?;

        if !g.is_finite() {
            return Err(DynamicsError::InvalidParameter {
                name: "g",
                value: g,
                requirement: "must be finite",
            });
        }
        if input_max.is_nan() || input_max < 0.0 {
            return Err(DynamicsError::InvalidParameter {
                name: "input_max",
                value: input_max,
                requirement: "must be non-negative",
            });
        }

        Ok(Self {
            mb,
            lb,
            m1,
            l1,
            g,
            input_max,
            body_inertia: mb * lb * lb / 3.0,
            link_inertia: m1 * l1 * l1 / 3.0,
        })
    }

    /// Body mass [kg]
    pub fn mb(&self) -> f64 {
        self.mb
    }

    /// Body half-length [m]
    pub fn lb(&self) -> f64 {
        self.lb
    }

    /// Pendulum mass [kg]
    pub fn m1(&self) -> f64 {
        self.m1
    }

    /// Pendulum length [m]
    pub fn l1(&self) -> f64 {
        self.l1
    }

    /// Gravity magnitude [m/s²]
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Per-rotor thrust saturation [N]
    pub fn input_max(&self) -> f64 {
        self.input_max
    }

    /// Body rotational inertia `Ib = mb·lb²/3`
    pub fn body_inertia(&self) -> f64 {
        self.body_inertia
    }

    /// Link rotational inertia `I1 = m1·l1²/3`
    pub fn link_inertia(&self) -> f64 {
        self.link_inertia
    }

    /// Total mass `mb + m1`
    pub fn total_mass(&self) -> f64 {
        self.mb + self.m1
    }

    /// Offset of the combined center of mass from the pivot,
    /// `α = m1·l1/(m1+mb)`
    pub fn alpha(&self) -> f64 {
        self.m1 * self.l1 / self.total_mass()
    }

    /// Reduced link inertia `I = I1 + m1·mb·l1²/(m1+mb)`
    pub fn reduced_inertia(&self) -> f64 {
        self.link_inertia + self.m1 * self.mb * self.l1 * self.l1 / self.total_mass()
    }

    /// Link inertia about the pivot `I1 + m1·l1²`
    pub fn pivot_inertia(&self) -> f64 {
        self.link_inertia + self.m1 * self.l1 * self.l1
    }

    /// Per-rotor thrust that holds the whole system in hover
    pub fn hover_thrust(&self) -> f64 {
        self.total_mass() * self.g / 2.0
    }
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        let (mb, lb, m1, l1) = (1.0, 0.2, 2.0, 0.2);
        Self {
            mb,
            lb,
            m1,
            l1,
            g: 10.0,
            input_max: 10.0,
            body_inertia: mb * lb * lb / 3.0,
            link_inertia: m1 * l1 * l1 / 3.0,
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), DynamicsError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DynamicsError::InvalidParameter {
            name,
            value,
            requirement: "must be positive and finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accessors_return_supplied_values() {
        let params = PhysicalParameters::new(1.3, 0.17, 0.45, 0.61, 9.81, 7.5).unwrap();

        assert_eq!(params.mb(), 1.3);
        assert_eq!(params.lb(), 0.17);
        assert_eq!(params.m1(), 0.45);
        assert_eq!(params.l1(), 0.61);
        assert_eq!(params.g(), 9.81);
        assert_eq!(params.input_max(), 7.5);
    }

    #[test]
    fn test_derived_inertias() {
        let params = PhysicalParameters::default();

        assert_relative_eq!(params.body_inertia(), 1.0 * 0.04 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(params.link_inertia(), 2.0 * 0.04 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(params.alpha(), 0.4 / 3.0, epsilon = 1e-15);
        // I1 + m1·mb·l1²/(m1+mb) = 0.08/3 + 0.08/3
        assert_relative_eq!(params.reduced_inertia(), 0.16 / 3.0, epsilon = 1e-15);
    }

    #[test]
    fn test_default_matches_new() {
        let built = PhysicalParameters::new(1.0, 0.2, 2.0, 0.2, 10.0, 10.0).unwrap();
        assert_eq!(built, PhysicalParameters::default());
    }

    #[test]
    fn test_rejects_nonpositive_mass_and_length() {
        let cases = [
            ("mb", PhysicalParameters::new(0.0, 0.2, 2.0, 0.2, 10.0, 10.0)),
            ("lb", PhysicalParameters::new(1.0, -0.2, 2.0, 0.2, 10.0, 10.0)),
            ("m1", PhysicalParameters::new(1.0, 0.2, f64::NAN, 0.2, 10.0, 10.0)),
            ("l1", PhysicalParameters::new(1.0, 0.2, 2.0, 0.0, 10.0, 10.0)),
        ];

        for (expected, result) in cases {
            match result {
                Err(DynamicsError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidParameter for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_bad_saturation_and_gravity() {
        assert!(matches!(
            PhysicalParameters::new(1.0, 0.2, 2.0, 0.2, 10.0, -1.0),
            Err(DynamicsError::InvalidParameter { name: "input_max", .. })
        ));
        assert!(matches!(
            PhysicalParameters::new(1.0, 0.2, 2.0, 0.2, f64::INFINITY, 10.0),
            Err(DynamicsError::InvalidParameter { name: "g", .. })
        ));
    }

    #[test]
    fn test_hover_thrust() {
        let params = PhysicalParameters::default();
        assert_relative_eq!(params.hover_thrust(), 15.0, epsilon = 1e-12);
    }
}
