//! Fully-connected layer over [batch, channels] f32 tensors.

use tracing::debug;

use super::{nonzero, Clamp, Shape};
use crate::error::{OpError, OpResult};
use crate::kernels;
use crate::runtime;

const OP: &str = "fully_connected";

/// Static configuration of a [`FullyConnected`] operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullyConnectedConfig {
    pub input_channels: usize,
    pub output_channels: usize,
    pub clamp: Clamp,
}

/// Fully-connected operator.
///
/// Weights are packed `[output_channels, input_channels]` row-major at
/// creation. Each batch row is transformed independently:
/// `output = input @ weights^T + bias`, then the output clamp.
#[derive(Debug)]
pub struct FullyConnected {
    config: FullyConnectedConfig,
    weights: Vec<f32>,
    bias: Vec<f32>,
    batch: Option<usize>,
}

impl FullyConnected {
    /// Validate the configuration and pack the parameters.
    ///
    /// `weights` is `[output_channels, input_channels]` row-major; `bias`
    /// is `[output_channels]`.
    pub fn create(config: &FullyConnectedConfig, weights: &[f32], bias: &[f32]) -> OpResult<Self> {
        runtime::ensure_initialized(OP)?;
        nonzero(OP, "input_channels", config.input_channels)?;
        nonzero(OP, "output_channels", config.output_channels)?;
        config.clamp.validate(OP)?;

        let expected_weights = config.output_channels * config.input_channels;
        if weights.len() != expected_weights {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "weights",
                expected: expected_weights,
                actual: weights.len(),
            });
        }
        if bias.len() != config.output_channels {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "bias",
                expected: config.output_channels,
                actual: bias.len(),
            });
        }

        Ok(Self {
            config: *config,
            weights: weights.to_vec(),
            bias: bias.to_vec(),
            batch: None,
        })
    }

    /// Bind the batch size.
    ///
    /// Calling setup again rebinds; the previous binding is replaced.
    pub fn setup(&mut self, batch: usize) -> OpResult<()> {
        nonzero(OP, "batch", batch)?;
        debug!(batch, "fully_connected bound");
        self.batch = Some(batch);
        Ok(())
    }

    /// Execute against the bound batch size.
    ///
    /// `input` is `[batch, input_channels]`; `output` is
    /// `[batch, output_channels]`.
    pub fn run(&mut self, input: &[f32], output: &mut [f32]) -> OpResult<()> {
        let batch = self.batch.ok_or(OpError::NotSetup { op: OP })?;
        let c = &self.config;

        let expected_input = batch * c.input_channels;
        if input.len() != expected_input {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "input",
                expected: expected_input,
                actual: input.len(),
            });
        }
        let expected_output = batch * c.output_channels;
        if output.len() != expected_output {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "output",
                expected: expected_output,
                actual: output.len(),
            });
        }

        kernels::matmul_bt(
            input,
            &self.weights,
            output,
            batch,
            c.input_channels,
            c.output_channels,
        );
        kernels::bias_add(output, &self.bias, batch, c.output_channels);
        c.clamp.apply(output);
        Ok(())
    }

    /// Output geometry of the current binding, if any.
    pub fn output_shape(&self) -> Option<Shape> {
        self.batch
            .map(|batch| Shape::nc(batch, self.config.output_channels))
    }
}

impl Drop for FullyConnected {
    fn drop(&mut self) {
        debug!("fully_connected released");
    }
}
