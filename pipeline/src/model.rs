//! Compiled-in model description: geometry, seed, and parameter tables.
//!
//! A three-class toy classifier over one 28x28 grayscale map: 3x3
//! convolution (1 -> 2 channels, same padding, rectified), global average
//! pool, 2 -> 3 fully-connected, softmax.

pub const BATCH: usize = 1;
pub const IN_H: usize = 28;
pub const IN_W: usize = 28;
pub const IN_C: usize = 1;

pub const CONV_K: usize = 3;
pub const CONV_STRIDE: usize = 1;
pub const CONV_PAD: usize = 1;
pub const CONV_OUT_C: usize = 2;

/// Number of classes.
pub const FC_OUT: usize = 3;

/// Seed for the synthesized input map.
pub const SEED: u64 = 42;

pub const INPUT_LEN: usize = BATCH * IN_H * IN_W * IN_C;
pub const CONV_OUT_LEN: usize = BATCH * IN_H * IN_W * CONV_OUT_C;
pub const POOL_OUT_LEN: usize = BATCH * CONV_OUT_C;

/// Convolution weights, `[CONV_OUT_C, CONV_K, CONV_K, IN_C]` row-major.
pub static CONV_WEIGHTS: [f32; CONV_OUT_C * CONV_K * CONV_K * IN_C] = [
    // filter 0
    0.2, 0.0, -0.1, //
    0.0, 0.3, 0.0, //
    -0.1, 0.0, 0.2, //
    // filter 1
    -0.2, 0.1, 0.0, //
    0.1, -0.3, 0.1, //
    0.0, 0.2, -0.2,
];

pub static CONV_BIAS: [f32; CONV_OUT_C] = [0.05, -0.05];

/// Fully-connected weights, `[FC_OUT, CONV_OUT_C]` row-major.
pub static FC_WEIGHTS: [f32; FC_OUT * CONV_OUT_C] = [
    0.5, -0.4, //
    0.3, 0.2, //
    -0.1, 0.6,
];

pub static FC_BIAS: [f32; FC_OUT] = [0.1, 0.0, -0.1];
