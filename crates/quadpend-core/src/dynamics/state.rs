//! State layout
//!
//! `x = [x_body, y_body, θ_body, θ_link, ẋ_body, ẏ_body, θ̇_body, θ̇_link]`
//!
//! The link angle is measured from the downward vertical, so the link's
//! center of mass sits at `(x + l1·sinθ1, y − l1·cosθ1)`.

use nalgebra::{Vector2, Vector4};

use crate::{Coordinates, StateVector, NUM_COORDINATES};

use super::PhysicalParameters;

/// Index of the body horizontal position
pub const X_BODY: usize = 0;
/// Index of the body vertical position
pub const Y_BODY: usize = 1;
/// Index of the body pitch angle
pub const THETA_BODY: usize = 2;
/// Index of the link angle
pub const THETA_LINK: usize = 3;
/// Offset from a coordinate index to its rate index
pub const VELOCITY_OFFSET: usize = NUM_COORDINATES;

/// Split a state into generalized coordinates and their rates
pub fn split_state(x: &StateVector) -> (Coordinates, Coordinates) {
    let q = x.fixed_rows::<4>(0).into_owned();
    let qd = x.fixed_rows::<4>(VELOCITY_OFFSET).into_owned();
    (q, qd)
}

/// Stack generalized coordinates and rates into a state
pub fn join_state(q: &Coordinates, qd: &Coordinates) -> StateVector {
    let mut x = StateVector::zeros();
    x.fixed_rows_mut::<4>(0).copy_from(q);
    x.fixed_rows_mut::<4>(VELOCITY_OFFSET).copy_from(qd);
    x
}

/// State at rest with the given configuration
pub fn state_at_rest(q: Coordinates) -> StateVector {
    join_state(&q, &Vector4::zeros())
}

/// Position of the link's center of mass in the plane
pub fn link_center(params: &PhysicalParameters, q: &Coordinates) -> Vector2<f64> {
    let theta = q[THETA_LINK];
    Vector2::new(
        q[X_BODY] + params.l1() * theta.sin(),
        q[Y_BODY] - params.l1() * theta.cos(),
    )
}

/// Combined center of mass of body and link
pub fn center_of_mass(params: &PhysicalParameters, q: &Coordinates) -> Vector2<f64> {
    let body = Vector2::new(q[X_BODY], q[Y_BODY]);
    let link = link_center(params, q);
    (body * params.mb() + link * params.m1()) / params.total_mass()
}
