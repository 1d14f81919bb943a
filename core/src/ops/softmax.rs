//! Softmax over [batch, channels] f32 tensors.

use tracing::debug;

use super::{nonzero, Shape};
use crate::error::{OpError, OpResult};
use crate::kernels;
use crate::runtime;

const OP: &str = "softmax";

/// Static configuration of a [`Softmax`] operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftmaxConfig {
    pub channels: usize,
}

/// Softmax operator.
///
/// Each batch row is normalized independently into a probability
/// distribution over the channel axis. There is no fused clamp; the output
/// is in [0, 1] by construction.
#[derive(Debug)]
pub struct Softmax {
    config: SoftmaxConfig,
    batch: Option<usize>,
}

impl Softmax {
    /// Validate the configuration.
    pub fn create(config: &SoftmaxConfig) -> OpResult<Self> {
        runtime::ensure_initialized(OP)?;
        nonzero(OP, "channels", config.channels)?;
        Ok(Self {
            config: *config,
            batch: None,
        })
    }

    /// Bind the batch size.
    ///
    /// Calling setup again rebinds; the previous binding is replaced.
    pub fn setup(&mut self, batch: usize) -> OpResult<()> {
        nonzero(OP, "batch", batch)?;
        debug!(batch, "softmax bound");
        self.batch = Some(batch);
        Ok(())
    }

    /// Execute against the bound batch size.
    ///
    /// `input` is `[batch, channels]` logits; `output` is
    /// `[batch, channels]` probabilities.
    pub fn run(&mut self, input: &[f32], output: &mut [f32]) -> OpResult<()> {
        let batch = self.batch.ok_or(OpError::NotSetup { op: OP })?;
        let expected = batch * self.config.channels;
        if input.len() != expected {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "input",
                expected,
                actual: input.len(),
            });
        }
        if output.len() != expected {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "output",
                expected,
                actual: output.len(),
            });
        }

        kernels::softmax(input, output, batch, self.config.channels);
        Ok(())
    }

    /// Output geometry of the current binding, if any.
    pub fn output_shape(&self) -> Option<Shape> {
        self.batch.map(|batch| Shape::nc(batch, self.config.channels))
    }
}

impl Drop for Softmax {
    fn drop(&mut self) {
        debug!("softmax released");
    }
}
