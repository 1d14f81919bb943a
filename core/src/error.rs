//! Error types for the femtonet-core library.
//!
//! Every fallible operation returns `OpResult<T>`. Each variant carries the
//! name of the operator family that raised it, so a rendered diagnostic
//! always identifies the failing component.

use thiserror::Error;

/// All contract violations reportable by the operator library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpError {
    /// Operator creation was attempted before [`crate::runtime::init`].
    #[error("{op}: runtime is not initialized")]
    Uninitialized { op: &'static str },

    /// A dimension that must be nonzero (kernel, stride, dilation, channel
    /// count, batch) was zero.
    #[error("{op}: {field} must be nonzero")]
    ZeroDimension {
        op: &'static str,
        field: &'static str,
    },

    /// A weight, bias, input, or output slice does not match the geometry
    /// the operator was created or set up with.
    #[error("{op}: {buffer} holds {actual} elements, expected {expected}")]
    LengthMismatch {
        op: &'static str,
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Output clamp bounds are NaN or do not satisfy min < max.
    #[error("{op}: output clamp [{min}, {max}] is not a valid interval")]
    InvalidClamp {
        op: &'static str,
        min: f32,
        max: f32,
    },

    /// The (dilated) kernel does not fit inside the (padded) input extent.
    #[error("{op}: {kernel_h}x{kernel_w} kernel exceeds the {bound_h}x{bound_w} input extent")]
    KernelTooLarge {
        op: &'static str,
        kernel_h: usize,
        kernel_w: usize,
        bound_h: usize,
        bound_w: usize,
    },

    /// `run` was called before `setup` bound the operator to input geometry.
    #[error("{op}: run called before setup")]
    NotSetup { op: &'static str },
}

pub type OpResult<T> = Result<T, OpError>;
