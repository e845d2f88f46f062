//! Single-pass transform of a design into one output target.

use crate::emitter::{EmissionUnit, EmitterRegistry};
use crate::options::TransformOptions;
use crate::state::DeviceState;
use crate::step::Step;
use fabpath_core::TransformError;
use tracing::{debug, trace};

/// Runs designs through emitters from a registry.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    registry: EmitterRegistry,
}

impl TransformEngine {
    pub fn new(registry: EmitterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EmitterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EmitterRegistry {
        &mut self.registry
    }

    /// Transform `steps` into the representation registered as `target`.
    ///
    /// Each step is validated, applied to the device state, and handed to the
    /// emitter together with the states before and after it. The first error
    /// aborts the transform and no output is returned.
    pub fn transform(
        &self,
        steps: &[Step],
        target: impl AsRef<str>,
        options: &TransformOptions,
    ) -> Result<EmissionUnit, TransformError> {
        let target = target.as_ref();
        options.validate()?;
        let mut emitter = self.registry.create(target, options)?;

        debug!(
            "Starting transform: {} steps, target '{}'",
            steps.len(),
            emitter.name()
        );

        let mut state = DeviceState::from_options(options);
        for (index, step) in steps.iter().enumerate() {
            step.validate(index)?;
            let next = state.apply(step);
            trace!("step {} ({}): {}", index, step.kind(), next.position);
            emitter.consume(step, &state, &next)?;
            state = next;
        }

        let unit = emitter.finalize();
        debug!("Transform finished: {} units emitted", unit.len());
        Ok(unit)
    }

    /// Transform `steps` once per registered target, in registration order.
    /// Every target gets its own state and emitter.
    pub fn transform_all(
        &self,
        steps: &[Step],
        options: &TransformOptions,
    ) -> Result<Vec<(String, EmissionUnit)>, TransformError> {
        let mut results = Vec::new();
        for name in self.registry.list_registered() {
            let unit = self.transform(steps, name, options)?;
            results.push((name.to_string(), unit));
        }
        Ok(results)
    }
}

/// Transform `steps` with the built-in `gcode` and `plot` emitters.
pub fn transform(
    steps: &[Step],
    target: impl AsRef<str>,
    options: &TransformOptions,
) -> Result<EmissionUnit, TransformError> {
    TransformEngine::default().transform(steps, target, options)
}
