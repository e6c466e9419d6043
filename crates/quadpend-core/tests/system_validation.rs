//! End-to-end validation
//!
//! These tests validate:
//! 1. Parameters are stored exactly as supplied
//! 2. Zero-thrust runs reproduce free fall in closed form
//! 3. Zero-order hold between control ticks
//! 4. Strict-mode and singular-dynamics aborts keep partial, incomplete logs
//! 5. Linearization agrees with finite differences
//! 6. Runs are reproducible

use approx::assert_relative_eq;
use nalgebra::Vector4;

use quadpend_core::control::{ConstantPolicy, Controller, LinearFeedbackPolicy, FeedbackGain, ZeroPolicy};
use quadpend_core::dynamics::{state_at_rest, DynamicsError, PhysicalParameters, QuadrotorPendulum};
use quadpend_core::math::IntegrationScheme;
use quadpend_core::simulation::{run_simulation, SimConfig, SimulationError, Simulator, TimingConfig};
use quadpend_core::{Command, StateVector};

fn reference_params() -> PhysicalParameters {
    PhysicalParameters::new(1.0, 0.2, 2.0, 0.2, 10.0, 10.0).unwrap()
}

fn tilted_link() -> StateVector {
    state_at_rest(Vector4::new(0.0, 0.0, 0.0, 0.1))
}

mod parameter_tests {
    use super::*;

    #[test]
    fn test_accessors_return_supplied_values() {
        let params = PhysicalParameters::new(1.3, 0.25, 0.7, 0.45, 9.81, 12.5).unwrap();
        let model = QuadrotorPendulum::new(params);
        let p = model.params();

        assert_eq!(p.mb(), 1.3);
        assert_eq!(p.lb(), 0.25);
        assert_eq!(p.m1(), 0.7);
        assert_eq!(p.l1(), 0.45);
        assert_eq!(p.g(), 9.81);
        assert_eq!(p.input_max(), 12.5);
    }

    #[test]
    fn test_derived_inertias() {
        let p = reference_params();
        assert_relative_eq!(p.body_inertia(), 1.0 * 0.04 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(p.link_inertia(), 2.0 * 0.04 / 3.0, epsilon = 1e-15);
    }

    #[test]
    fn test_nonpositive_mass_rejected() {
        let result = PhysicalParameters::new(0.0, 0.2, 2.0, 0.2, 10.0, 10.0);
        assert!(matches!(result, Err(DynamicsError::InvalidParameter { name: "mb", .. })));

        let result = PhysicalParameters::new(1.0, 0.2, 2.0, -0.2, 10.0, 10.0);
        assert!(matches!(result, Err(DynamicsError::InvalidParameter { name: "l1", .. })));
    }
}

/// Zero thrust: the whole system falls with `ÿ = −g` and the link keeps
/// its angle, so `y(t) = −g·t²/2` and every other coordinate stays put.
mod free_fall_tests {
    use super::*;

    #[test]
    fn test_reference_run_matches_closed_form() {
        let params = reference_params();
        let x0 = tilted_link();

        let (commands, states) = run_simulation(&params, ZeroPolicy, &x0, 1.0, 0.0333, Some(1.0), None).unwrap();

        // 30 full intervals of 0.0333 s and a final 0.001 s interval
        assert_eq!(commands.len(), 31);
        assert_eq!(states.len(), 32);
        assert_eq!(states.times()[0], 0.0);
        assert_relative_eq!(states.times()[30], 0.999, epsilon = 1e-12);
        assert_eq!(*states.times().last().unwrap(), 1.0);
        assert!(states.times().windows(2).all(|w| w[1] > w[0]));
        assert!(commands.values().iter().all(|u| *u == Command::zeros()));

        for (t, x) in states.iter() {
            assert_relative_eq!(x[0], 0.0, epsilon = 1e-9);
            assert_relative_eq!(x[1], -0.5 * params.g() * t * t, epsilon = 1e-9);
            assert_relative_eq!(x[2], 0.0, epsilon = 1e-9);
            assert_relative_eq!(x[3], 0.1, epsilon = 1e-9);
            assert_relative_eq!(x[4], 0.0, epsilon = 1e-9);
            assert_relative_eq!(x[5], -params.g() * t, epsilon = 1e-9);
            assert_relative_eq!(x[6], 0.0, epsilon = 1e-9);
            assert_relative_eq!(x[7], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_duration_not_multiple_of_period() {
        let params = reference_params();
        let (commands, states) = run_simulation(&params, ZeroPolicy, &tilted_link(), 1.0, 0.3, None, None).unwrap();

        assert_eq!(commands.times().len(), 4);
        assert_relative_eq!(commands.times()[3], 0.9, epsilon = 1e-12);
        assert_eq!(states.times().last().copied(), Some(1.0));

        let (t, x) = states.last().unwrap();
        assert_relative_eq!(x[1], -0.5 * params.g() * t * t, epsilon = 1e-9);

        let (_, short) = run_simulation(&params, ZeroPolicy, &tilted_link(), 0.06, 0.0333, None, None).unwrap();
        assert_eq!(short.len(), 3);
        assert_eq!(short.times().last().copied(), Some(0.06));
        assert_relative_eq!(short.values()[2][1], -5.0 * 0.06 * 0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_euler_substeps_follow_discrete_solution() {
        // Forward Euler on ÿ = −g gives y_n = −g·h²·n(n−1)/2
        let h = 0.025;
        let config = SimConfig {
            timing: TimingConfig {
                duration: 0.5,
                control_period: 0.1,
                print_period: None,
                integration_step: Some(h),
            },
            integrator: IntegrationScheme::Euler,
            ..SimConfig::default()
        }
        .with_initial_state(&tilted_link());

        let mut sim = Simulator::new(config, ZeroPolicy).unwrap();
        let logs = sim.run().unwrap();

        for (k, (_t, x)) in logs.states.iter().enumerate() {
            let n = (4 * k) as f64;
            assert_relative_eq!(x[1], -10.0 * h * h * n * (n - 1.0) / 2.0, epsilon = 1e-9);
        }
    }
}

mod hold_tests {
    use super::*;

    #[test]
    fn test_output_constant_between_ticks() {
        let mut controller = Controller::new(|_x: &StateVector, t: f64| Command::new(t, 2.0 * t), 0.05, None).unwrap();
        controller.tick(&StateVector::zeros(), 0.0).unwrap();
        controller.tick(&StateVector::zeros(), 0.05).unwrap();

        let first = controller.output();
        let second = controller.output();
        assert_eq!(first, second);
        assert_eq!(first, Command::new(0.05, 0.1));
    }

    #[test]
    fn test_command_log_holds_policy_values() {
        let (commands, _) = run_simulation(
            &reference_params(),
            |_x: &StateVector, t: f64| Command::new(t, 0.0),
            &StateVector::zeros(),
            0.4,
            0.1,
            None,
            Some(0.05),
        )
        .unwrap();

        // One sample per tick even though each interval has two sub-steps
        assert_eq!(commands.len(), 4);
        for (t, u) in commands.iter() {
            assert_eq!(u[0], t);
        }
    }
}

mod abort_tests {
    use super::*;

    #[test]
    fn test_strict_violation_returns_partial_logs() {
        let config = SimConfig {
            strict_inputs: true,
            timing: TimingConfig {
                duration: 1.0,
                control_period: 0.1,
                print_period: None,
                integration_step: None,
            },
            ..SimConfig::default()
        };
        // Exceeds the limit once the body has fallen past y = −0.1
        let policy = |x: &StateVector, _t: f64| if x[1] < -0.1 { Command::new(20.0, 0.0) } else { Command::zeros() };

        let mut sim = Simulator::new(config, policy).unwrap();
        let err = sim.run().unwrap_err();

        let SimulationError::Aborted(run) = err else {
            panic!("expected an aborted run");
        };
        assert!(!run.logs.complete);
        assert_eq!(run.source, DynamicsError::InputRange { index: 0, value: 20.0, limit: 10.0 });
        // y(0.1) = −0.05, y(0.2) = −0.2: the third tick is the first violation
        assert_relative_eq!(run.time, 0.2, epsilon = 1e-12);
        assert_eq!(run.logs.states.len(), 3);
        assert_relative_eq!(run.state[1], -0.2, epsilon = 1e-9);
        assert!(run.to_string().contains("aborted"));
    }

    #[test]
    fn test_singular_dynamics_abort_the_run() {
        // A non-finite link rate makes the acceleration solve fail
        let mut x0 = tilted_link();
        x0[7] = f64::NAN;
        let config = SimConfig {
            timing: TimingConfig {
                duration: 1.0,
                control_period: 0.1,
                print_period: None,
                integration_step: None,
            },
            ..SimConfig::default()
        }
        .with_initial_state(&x0);

        let mut sim = Simulator::new(config, ZeroPolicy).unwrap();
        let err = sim.run().unwrap_err();
        assert!(err.to_string().contains("Mass matrix solve failed"));

        let SimulationError::Aborted(run) = err else {
            panic!("expected an aborted run");
        };
        assert!(matches!(run.source, DynamicsError::SingularMassMatrix { .. }));
        assert!(!run.logs.complete);
        assert_eq!(run.time, 0.0);
        assert_eq!(run.logs.commands.len(), 1);
        assert_eq!(run.logs.states.len(), 1);

        // The snapshot is the last committed state, which is still x0
        assert!(run.state[7].is_nan());
        assert_eq!(run.state.fixed_rows::<7>(0), x0.fixed_rows::<7>(0));
        assert_eq!(run.logs.states.values()[0].fixed_rows::<7>(0), x0.fixed_rows::<7>(0));

        assert!(matches!(sim.step(), Err(SimulationError::Halted { .. })));
    }

    #[test]
    fn test_clamped_run_completes() {
        let (commands, states) = run_simulation(
            &reference_params(),
            ConstantPolicy(Command::new(20.0, 20.0)),
            &StateVector::zeros(),
            0.3,
            0.1,
            None,
            None,
        )
        .unwrap();

        // The log records the policy output; the model sees the clamped value
        assert_eq!(commands.values()[0], Command::new(20.0, 20.0));

        let (_, clamped) = run_simulation(
            &reference_params(),
            ConstantPolicy(Command::new(10.0, 10.0)),
            &StateVector::zeros(),
            0.3,
            0.1,
            None,
            None,
        )
        .unwrap();
        assert_eq!(states.values(), clamped.values());
    }
}

mod linearization_tests {
    use super::*;

    #[test]
    fn test_jacobians_at_several_operating_points() {
        let model = QuadrotorPendulum::new(reference_params());
        let points = [
            (Command::zeros(), StateVector::zeros()),
            (Command::new(15.0, 15.0), StateVector::zeros()),
            (Command::new(3.0, 6.0), tilted_link()),
            (
                Command::new(8.0, 2.0),
                StateVector::from_column_slice(&[1.0, -2.0, 0.7, -1.1, 0.3, 0.2, -0.5, 2.0]),
            ),
        ];

        for (u, x) in points {
            let lin = model.linearize(&u, &x).unwrap();
            let err = lin.max_jacobian_error(&model, 1e-5).unwrap();
            assert!(err < 1e-6, "jacobian mismatch {err} at u = {u:?}");
        }
    }

    #[test]
    fn test_linear_feedback_on_linearized_hover() {
        let params = PhysicalParameters::new(1.0, 0.2, 2.0, 0.2, 10.0, 20.0).unwrap();
        let model = QuadrotorPendulum::new(params);
        let hover = Command::new(params.hover_thrust(), params.hover_thrust());
        let lin = model.linearize(&hover, &StateVector::zeros()).unwrap();
        assert!(lin.is_equilibrium(1e-12));

        // Zero gain keeps the hover command, which holds the equilibrium
        let policy = LinearFeedbackPolicy::new(StateVector::zeros(), hover, FeedbackGain::zeros());
        let (_, states) = run_simulation(&params, policy, &StateVector::zeros(), 0.5, 0.05, None, None).unwrap();

        for x in states.values() {
            assert!(x.abs().max() < 1e-9);
        }
    }
}

mod determinism_tests {
    use super::*;

    #[test]
    fn test_identical_runs_match_bit_for_bit() {
        let policy = || |x: &StateVector, t: f64| Command::new(6.0 - 3.0 * x[3], 5.0 + (t * 3.0).sin());
        let x0 = tilted_link();

        let first = run_simulation(&reference_params(), policy(), &x0, 2.0, 0.02, Some(0.5), None).unwrap();
        let second = run_simulation(&reference_params(), policy(), &x0, 2.0, 0.02, Some(0.5), None).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_config_file_run() {
        let config = SimConfig::from_toml_str(
            r#"
            initial_state = [0.0, 0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 0.0]

            [timing]
            duration = 1.0
            control_period = 0.0333
            "#,
        )
        .unwrap();

        let mut sim = Simulator::new(config, ZeroPolicy).unwrap();
        let logs = sim.run().unwrap();
        assert!(logs.complete);
        assert_eq!(logs.states.len(), 32);
        assert_eq!(logs.states.last().map(|(t, _)| t), Some(1.0));
    }
}
