//! Create-before-init contract check.
//!
//! Lives in its own integration test binary so no other test's
//! `runtime::init()` call can mark this process initialized first.

use femtonet_core::ops::{Clamp, Conv2dConfig, Convolution2d};
use femtonet_core::OpError;

#[test]
fn test_create_before_init_fails() {
    let config = Conv2dConfig {
        padding_h: 0,
        padding_w: 0,
        kernel_h: 1,
        kernel_w: 1,
        stride_h: 1,
        stride_w: 1,
        dilation_h: 1,
        dilation_w: 1,
        input_channels: 1,
        output_channels: 1,
        clamp: Clamp::NONE,
    };
    assert_eq!(
        Convolution2d::create(&config, &[1.0], &[0.0]).unwrap_err(),
        OpError::Uninitialized { op: "convolution2d" }
    );
}
