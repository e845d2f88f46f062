//! Device state tracking.
//!
//! [`DeviceState`] is the cumulative effect of every step seen so far.
//! Each transform owns its own value and advances it with [`DeviceState::apply`].

use crate::options::TransformOptions;
use crate::step::Step;
use fabpath_core::Position;
use serde::{Deserialize, Serialize};

/// Position and modal settings of the device at one point of a design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Absolute position after the last waypoint
    pub position: Position,
    /// Whether moves currently deposit material
    pub deposition_active: bool,
    /// Feed rate while depositing (mm/min)
    pub print_speed: f64,
    /// Feed rate while travelling (mm/min)
    pub travel_speed: f64,
    /// Bead width (mm)
    pub extrusion_width: f64,
    /// Bead height (mm)
    pub extrusion_height: f64,
    /// Selected tool index
    pub tool: u32,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::from_options(&TransformOptions::default())
    }
}

impl DeviceState {
    /// Starting state for a transform: origin, deposition off, machine
    /// parameters from `options`, then any `initial_state` overrides.
    pub fn from_options(options: &TransformOptions) -> Self {
        let initial = &options.initial_state;
        let origin = Position::default();
        Self {
            position: Position::new(
                initial.x.unwrap_or(origin.x),
                initial.y.unwrap_or(origin.y),
                initial.z.unwrap_or(origin.z),
            ),
            deposition_active: initial.deposition.unwrap_or(false),
            print_speed: options.print_speed,
            travel_speed: options.travel_speed,
            extrusion_width: options.extrusion_width,
            extrusion_height: options.extrusion_height,
            tool: 0,
        }
    }

    /// Returns the state after `step`.
    ///
    /// Pure: the same `(self, step)` always yields the same result. Fields the
    /// step does not name are copied from `self`. Steps are expected to have
    /// passed [`Step::validate`].
    pub fn apply(&self, step: &Step) -> DeviceState {
        let mut next = *self;
        match step {
            Step::Waypoint(target) => {
                next.position = target.apply_to(&self.position);
            }
            Step::Deposition { on } => {
                next.deposition_active = *on;
            }
            Step::Speed(change) => {
                next.print_speed = change.print.unwrap_or(self.print_speed);
                next.travel_speed = change.travel.unwrap_or(self.travel_speed);
            }
            Step::ExtrusionGeometry(change) => {
                next.extrusion_width = change.width.unwrap_or(self.extrusion_width);
                next.extrusion_height = change.height.unwrap_or(self.extrusion_height);
            }
            Step::Tool { index } => {
                next.tool = *index;
            }
            Step::Comment { .. } | Step::ManualCode { .. } => {}
        }
        next
    }

    /// Feed rate that applies to a move made from this state.
    pub fn active_feed(&self) -> f64 {
        if self.deposition_active {
            self.print_speed
        } else {
            self.travel_speed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::InitialState;
    use crate::step::{GeometryChange, SpeedChange};
    use fabpath_core::PartialPosition;

    #[test]
    fn test_default_state() {
        let state = DeviceState::default();
        assert_eq!(state.position, Position::new(0.0, 0.0, 0.0));
        assert!(!state.deposition_active);
        assert_eq!(state.tool, 0);
    }

    #[test]
    fn test_first_waypoint_carries_over_from_origin() {
        let state = DeviceState::default().apply(&Step::waypoint(PartialPosition::x_only(12.0)));
        assert_eq!(state.position, Position::new(12.0, 0.0, 0.0));
    }

    #[test]
    fn test_waypoint_keeps_modal_values() {
        let start = DeviceState {
            deposition_active: true,
            ..DeviceState::default()
        };
        let next = start.apply(&Step::point(1.0, 2.0, 3.0));
        assert!(next.deposition_active);
        assert_eq!(next.print_speed, start.print_speed);
    }

    #[test]
    fn test_deposition_toggle_leaves_position() {
        let start = DeviceState::default().apply(&Step::point(4.0, 5.0, 6.0));
        let next = start.apply(&Step::deposition(true));
        assert!(next.deposition_active);
        assert_eq!(next.position, start.position);
    }

    #[test]
    fn test_sparse_speed_change() {
        let next = DeviceState::default().apply(&Step::speed(SpeedChange::print(1500.0)));
        assert_eq!(next.print_speed, 1500.0);
        assert_eq!(next.travel_speed, DeviceState::default().travel_speed);
    }

    #[test]
    fn test_sparse_geometry_change() {
        let next = DeviceState::default().apply(&Step::ExtrusionGeometry(GeometryChange {
            width: None,
            height: Some(0.3),
        }));
        assert_eq!(next.extrusion_height, 0.3);
        assert_eq!(next.extrusion_width, DeviceState::default().extrusion_width);
    }

    #[test]
    fn test_annotations_do_not_change_state() {
        let start = DeviceState::default().apply(&Step::point(1.0, 1.0, 1.0));
        assert_eq!(start.apply(&Step::comment("layer 2")), start);
        assert_eq!(start.apply(&Step::manual_code("M106 S255")), start);
    }

    #[test]
    fn test_initial_state_overrides() {
        let options = TransformOptions::default().with_initial_state(InitialState {
            z: Some(0.3),
            deposition: Some(true),
            ..Default::default()
        });
        let state = DeviceState::from_options(&options);
        assert_eq!(state.position, Position::new(0.0, 0.0, 0.3));
        assert!(state.deposition_active);
    }

    #[test]
    fn test_active_feed_follows_deposition() {
        let travel = DeviceState::default();
        assert_eq!(travel.active_feed(), travel.travel_speed);
        let print = travel.apply(&Step::deposition(true));
        assert_eq!(print.active_feed(), print.print_speed);
    }
}
