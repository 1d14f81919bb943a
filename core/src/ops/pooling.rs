//! Average pooling over NHWC f32 tensors.
//!
//! No learnable parameters and no padding: each output element is the mean
//! of one kernel window in one channel.

use tracing::debug;

use super::{nonzero, Clamp, Shape};
use crate::error::{OpError, OpResult};
use crate::kernels;
use crate::runtime;

const OP: &str = "average_pooling2d";

/// Static configuration of an [`AveragePool2d`] operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragePool2dConfig {
    pub kernel_h: usize,
    pub kernel_w: usize,
    pub stride_h: usize,
    pub stride_w: usize,
    pub channels: usize,
    pub clamp: Clamp,
}

#[derive(Debug)]
struct Binding {
    batch: usize,
    input_h: usize,
    input_w: usize,
    output_h: usize,
    output_w: usize,
}

/// 2D average pooling operator.
///
/// A kernel equal to the input extent with matching stride reduces each
/// channel to its global mean.
#[derive(Debug)]
pub struct AveragePool2d {
    config: AveragePool2dConfig,
    binding: Option<Binding>,
}

impl AveragePool2d {
    /// Validate the configuration.
    pub fn create(config: &AveragePool2dConfig) -> OpResult<Self> {
        runtime::ensure_initialized(OP)?;
        nonzero(OP, "kernel_h", config.kernel_h)?;
        nonzero(OP, "kernel_w", config.kernel_w)?;
        nonzero(OP, "stride_h", config.stride_h)?;
        nonzero(OP, "stride_w", config.stride_w)?;
        nonzero(OP, "channels", config.channels)?;
        config.clamp.validate(OP)?;
        Ok(Self {
            config: *config,
            binding: None,
        })
    }

    /// Bind batch and input spatial geometry.
    ///
    /// Calling setup again rebinds; the previous binding is replaced.
    pub fn setup(&mut self, batch: usize, input_h: usize, input_w: usize) -> OpResult<()> {
        nonzero(OP, "batch", batch)?;
        nonzero(OP, "input_h", input_h)?;
        nonzero(OP, "input_w", input_w)?;

        let c = &self.config;
        if c.kernel_h > input_h || c.kernel_w > input_w {
            return Err(OpError::KernelTooLarge {
                op: OP,
                kernel_h: c.kernel_h,
                kernel_w: c.kernel_w,
                bound_h: input_h,
                bound_w: input_w,
            });
        }

        let [output_h, output_w] = kernels::pool_output_size(
            [input_h, input_w],
            [c.kernel_h, c.kernel_w],
            [c.stride_h, c.stride_w],
        );
        debug!(batch, input_h, input_w, output_h, output_w, "average_pooling2d bound");

        self.binding = Some(Binding {
            batch,
            input_h,
            input_w,
            output_h,
            output_w,
        });
        Ok(())
    }

    /// Execute against the bound geometry.
    ///
    /// `input` is `[batch, input_h, input_w, channels]`; `output` is
    /// `[batch, output_h, output_w, channels]`.
    pub fn run(&mut self, input: &[f32], output: &mut [f32]) -> OpResult<()> {
        let b = self.binding.as_ref().ok_or(OpError::NotSetup { op: OP })?;
        let c = &self.config;

        let expected_input = b.batch * b.input_h * b.input_w * c.channels;
        if input.len() != expected_input {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "input",
                expected: expected_input,
                actual: input.len(),
            });
        }
        let expected_output = b.batch * b.output_h * b.output_w * c.channels;
        if output.len() != expected_output {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "output",
                expected: expected_output,
                actual: output.len(),
            });
        }

        kernels::average_pool2d(
            input,
            [b.batch, b.input_h, b.input_w, c.channels],
            [c.kernel_h, c.kernel_w],
            [c.stride_h, c.stride_w],
            output,
            [b.batch, b.output_h, b.output_w, c.channels],
        );
        c.clamp.apply(output);
        Ok(())
    }

    /// Output geometry of the current binding, if any.
    pub fn output_shape(&self) -> Option<Shape> {
        self.binding
            .as_ref()
            .map(|b| Shape::nhwc(b.batch, b.output_h, b.output_w, self.config.channels))
    }
}

impl Drop for AveragePool2d {
    fn drop(&mut self) {
        debug!("average_pooling2d released");
    }
}
