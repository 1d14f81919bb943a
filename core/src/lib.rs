//! # femtonet-core: f32 NHWC inference operators
//!
//! Operator families for fixed-function forward passes: 2D convolution,
//! average pooling, fully-connected, and softmax over 32-bit floats in
//! NHWC layout.
//!
//! ## Architecture
//!
//! - **Lifecycle**: `create` (validate config, pack parameters) → `setup`
//!   (bind batch and spatial geometry) → `run` (synchronous execute);
//!   dropping an operator releases it
//! - **Runtime gate**: [`runtime::init`] must run before any `create`
//! - **Kernels**: pure slice functions under [`kernels`]
//! - **Errors**: every contract violation surfaces as an [`OpError`]
//!   naming the operator that raised it
//!
//! ## Usage
//!
//! ```ignore
//! use femtonet_core::{runtime, Clamp, Conv2dConfig, Convolution2d};
//!
//! runtime::init()?;
//! let config = Conv2dConfig {
//!     padding_h: 1, padding_w: 1,
//!     kernel_h: 3, kernel_w: 3,
//!     stride_h: 1, stride_w: 1,
//!     dilation_h: 1, dilation_w: 1,
//!     input_channels: 1, output_channels: 2,
//!     clamp: Clamp::RELU,
//! };
//! let mut conv = Convolution2d::create(&config, &weights, &bias)?;
//! conv.setup(1, 28, 28)?;
//! conv.run(&input, &mut output)?;
//! ```

pub mod error;
pub mod kernels;
pub mod ops;
pub mod runtime;

// Re-export primary types
pub use error::{OpError, OpResult};
pub use ops::{
    AveragePool2d, AveragePool2dConfig, Clamp, Conv2dConfig, Convolution2d, FullyConnected,
    FullyConnectedConfig, Shape, Softmax, SoftmaxConfig,
};
