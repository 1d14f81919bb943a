//! 2D convolution over NHWC f32 tensors, with fused output clamp.

use tracing::debug;

use super::{nonzero, Clamp, Shape};
use crate::error::{OpError, OpResult};
use crate::kernels;
use crate::runtime;

const OP: &str = "convolution2d";

/// Static configuration of a [`Convolution2d`] operator.
///
/// Padding is symmetric per axis; kernel, stride, and dilation are given
/// per axis as well. The clamp bounds the output element-wise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conv2dConfig {
    pub padding_h: usize,
    pub padding_w: usize,
    pub kernel_h: usize,
    pub kernel_w: usize,
    pub stride_h: usize,
    pub stride_w: usize,
    pub dilation_h: usize,
    pub dilation_w: usize,
    pub input_channels: usize,
    pub output_channels: usize,
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

/// 2D convolution operator.
///
/// Weights are packed `[output_channels, kernel_h, kernel_w, input_channels]`
/// row-major at creation; the caller's slices are not retained. `setup`
/// binds batch and spatial geometry and sizes the im2col scratch; `run`
/// executes im2col, a B-transposed matmul, bias add, and the output clamp.
#[derive(Debug)]
pub struct Convolution2d {
    config: Conv2dConfig,
    weights: Vec<f32>,
    bias: Vec<f32>,
    binding: Option<Binding>,
    scratch: Vec<f32>,
}

impl Convolution2d {
    /// Validate the configuration and pack the parameters.
    ///
    /// `weights` is `[output_channels, kernel_h, kernel_w, input_channels]`
    /// row-major; `bias` is `[output_channels]`.
    pub fn create(config: &Conv2dConfig, weights: &[f32], bias: &[f32]) -> OpResult<Self> {
        runtime::ensure_initialized(OP)?;
        nonzero(OP, "kernel_h", config.kernel_h)?;
        nonzero(OP, "kernel_w", config.kernel_w)?;
        nonzero(OP, "stride_h", config.stride_h)?;
        nonzero(OP, "stride_w", config.stride_w)?;
        nonzero(OP, "dilation_h", config.dilation_h)?;
        nonzero(OP, "dilation_w", config.dilation_w)?;
        nonzero(OP, "input_channels", config.input_channels)?;
        nonzero(OP, "output_channels", config.output_channels)?;
        config.clamp.validate(OP)?;

        let expected_weights =
            config.output_channels * config.kernel_h * config.kernel_w * config.input_channels;
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
            binding: None,
            scratch: Vec::new(),
        })
    }

    /// Bind batch and input spatial geometry and size the im2col scratch.
    ///
    /// Calling setup again rebinds; the previous binding is replaced.
    pub fn setup(&mut self, batch: usize, input_h: usize, input_w: usize) -> OpResult<()> {
        nonzero(OP, "batch", batch)?;
        nonzero(OP, "input_h", input_h)?;
        nonzero(OP, "input_w", input_w)?;

        let c = &self.config;
        let eff_h = c.dilation_h * (c.kernel_h - 1) + 1;
        let eff_w = c.dilation_w * (c.kernel_w - 1) + 1;
        let bound_h = input_h + 2 * c.padding_h;
        let bound_w = input_w + 2 * c.padding_w;
        if eff_h > bound_h || eff_w > bound_w {
            return Err(OpError::KernelTooLarge {
                op: OP,
                kernel_h: eff_h,
                kernel_w: eff_w,
                bound_h,
                bound_w,
            });
        }

        let [output_h, output_w] = kernels::conv2d_output_size(
            [input_h, input_w],
            [c.kernel_h, c.kernel_w],
            [c.stride_h, c.stride_w],
            [c.dilation_h, c.dilation_w],
            [c.padding_h, c.padding_w],
        );
        let patch = c.kernel_h * c.kernel_w * c.input_channels;
        self.scratch.resize(batch * output_h * output_w * patch, 0.0);
        debug!(batch, input_h, input_w, output_h, output_w, "convolution2d bound");

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
    /// `input` is `[batch, input_h, input_w, input_channels]`; `output` is
    /// `[batch, output_h, output_w, output_channels]`.
    pub fn run(&mut self, input: &[f32], output: &mut [f32]) -> OpResult<()> {
        let b = self.binding.as_ref().ok_or(OpError::NotSetup { op: OP })?;
        let c = &self.config;

        let expected_input = b.batch * b.input_h * b.input_w * c.input_channels;
        if input.len() != expected_input {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "input",
                expected: expected_input,
                actual: input.len(),
            });
        }
        let rows = b.batch * b.output_h * b.output_w;
        let expected_output = rows * c.output_channels;
        if output.len() != expected_output {
            return Err(OpError::LengthMismatch {
                op: OP,
                buffer: "output",
                expected: expected_output,
                actual: output.len(),
            });
        }

        kernels::im2col(
            input,
            [b.batch, b.input_h, b.input_w, c.input_channels],
            [c.kernel_h, c.kernel_w],
            [c.stride_h, c.stride_w],
            [c.dilation_h, c.dilation_w],
            [c.padding_h, c.padding_w],
            [b.output_h, b.output_w],
            &mut self.scratch,
        );
        let patch = c.kernel_h * c.kernel_w * c.input_channels;
        kernels::matmul_bt(&self.scratch, &self.weights, output, rows, patch, c.output_channels);
        kernels::bias_add(output, &self.bias, rows, c.output_channels);
        c.clamp.apply(output);
        Ok(())
    }

    /// Output geometry of the current binding, if any.
    pub fn output_shape(&self) -> Option<Shape> {
        self.binding
            .as_ref()
            .map(|b| Shape::nhwc(b.batch, b.output_h, b.output_w, self.config.output_channels))
    }
}

impl Drop for Convolution2d {
    fn drop(&mut self) {
        debug!("convolution2d released");
    }
}
