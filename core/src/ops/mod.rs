//! NHWC f32 operators with an explicit create -> setup -> run lifecycle.
//!
//! `create` validates the static configuration and packs any parameters,
//! `setup` binds batch and spatial geometry, `run` validates buffer lengths
//! against the binding and executes synchronously. Dropping an operator
//! releases it; there is no explicit delete.

pub mod conv;
pub mod fully_connected;
pub mod pooling;
pub mod softmax;

use crate::error::{OpError, OpResult};

/// Logical NHWC geometry of a bound tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub n: usize,
    pub h: usize,
    pub w: usize,
    pub c: usize,
}

impl Shape {
    pub const fn nhwc(n: usize, h: usize, w: usize, c: usize) -> Self {
        Self { n, h, w, c }
    }

    /// Rank-2 [batch, channels] geometry, spatial dims collapsed to 1x1.
    pub const fn nc(n: usize, c: usize) -> Self {
        Self { n, h: 1, w: 1, c }
    }

    pub const fn total(&self) -> usize {
        self.n * self.h * self.w * self.c
    }
}

/// Output clamp fused into an operator.
///
/// Applied element-wise after the operator's arithmetic; `[0, +inf)` is a
/// fused rectification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamp {
    pub min: f32,
    pub max: f32,
}

impl Clamp {
    /// Unbounded output.
    pub const NONE: Clamp = Clamp {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    /// Rectification: `[0, +inf)`.
    pub const RELU: Clamp = Clamp {
        min: 0.0,
        max: f32::INFINITY,
    };

    pub(crate) fn validate(&self, op: &'static str) -> OpResult<()> {
        if self.min.is_nan() || self.max.is_nan() || self.min >= self.max {
            return Err(OpError::InvalidClamp {
                op,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub(crate) fn apply(&self, data: &mut [f32]) {
        for v in data.iter_mut() {
            *v = v.clamp(self.min, self.max);
        }
    }
}

pub(crate) fn nonzero(op: &'static str, field: &'static str, value: usize) -> OpResult<()> {
    if value == 0 {
        return Err(OpError::ZeroDimension { op, field });
    }
    Ok(())
}

pub use conv::{Conv2dConfig, Convolution2d};
pub use fully_connected::{FullyConnected, FullyConnectedConfig};
pub use pooling::{AveragePool2d, AveragePool2dConfig};
pub use softmax::{Softmax, SoftmaxConfig};
