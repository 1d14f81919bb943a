//! Fixed forward pass over the compiled-in classifier.
//!
//! Wiring: synthesize a seeded 28x28x1 input, then convolution -> global
//! average pool -> fully-connected -> softmax, yielding three class
//! probabilities. Operators are created and bound once at build time;
//! dropping the [`Classifier`] releases them on every path, including
//! early error returns.

pub mod model;

use std::fmt;

use femtonet_core::ops::{
    AveragePool2d, AveragePool2dConfig, Clamp, Conv2dConfig, Convolution2d, FullyConnected,
    FullyConnectedConfig, Softmax, SoftmaxConfig,
};
use femtonet_core::{kernels, runtime, OpError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

/// Pipeline stage, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Convolution,
    AveragePool,
    FullyConnected,
    Softmax,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Convolution => "convolution",
            Stage::AveragePool => "average pooling",
            Stage::FullyConnected => "fully connected",
            Stage::Softmax => "softmax",
        };
        f.write_str(name)
    }
}

/// A pipeline failure. The rendered message always names the failing stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("runtime initialization failed: {source}")]
    Init { source: OpError },
    #[error("{stage} create failed: {source}")]
    Create { stage: Stage, source: OpError },
    #[error("{stage} setup failed: {source}")]
    Setup { stage: Stage, source: OpError },
    #[error("{stage} run failed: {source}")]
    Run { stage: Stage, source: OpError },
}

/// Fill the input buffer with uniform [0, 1) values from a seeded generator.
///
/// The same seed always yields the same buffer, element for element.
pub fn synthesize_input(seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..model::INPUT_LEN).map(|_| rng.gen::<f32>()).collect()
}

/// The four created-and-bound operators plus the intermediate buffers.
///
/// `build` performs the create and setup phases for every stage against the
/// model geometry; [`Classifier::infer`] performs the four runs. All
/// resources are owned, so they are released when the classifier drops.
pub struct Classifier {
    conv: Convolution2d,
    pool: AveragePool2d,
    fc: FullyConnected,
    softmax: Softmax,
    conv_out: Vec<f32>,
    pool_out: Vec<f32>,
    logits: Vec<f32>,
    probs: Vec<f32>,
}

impl Classifier {
    /// Create and bind every operator against the compiled-in model.
    pub fn build() -> Result<Self, PipelineError> {
        Self::build_with(
            &model::CONV_WEIGHTS,
            &model::CONV_BIAS,
            &model::FC_WEIGHTS,
            &model::FC_BIAS,
        )
    }

    /// As [`Classifier::build`], with caller-supplied parameter tables.
    pub fn build_with(
        conv_weights: &[f32],
        conv_bias: &[f32],
        fc_weights: &[f32],
        fc_bias: &[f32],
    ) -> Result<Self, PipelineError> {
        runtime::init().map_err(|source| PipelineError::Init { source })?;

        let conv_config = Conv2dConfig {
            padding_h: model::CONV_PAD,
            padding_w: model::CONV_PAD,
            kernel_h: model::CONV_K,
            kernel_w: model::CONV_K,
            stride_h: model::CONV_STRIDE,
            stride_w: model::CONV_STRIDE,
            dilation_h: 1,
            dilation_w: 1,
            input_channels: model::IN_C,
            output_channels: model::CONV_OUT_C,
            clamp: Clamp::RELU,
        };
        let mut conv = Convolution2d::create(&conv_config, conv_weights, conv_bias)
            .map_err(|source| PipelineError::Create { stage: Stage::Convolution, source })?;
        conv.setup(model::BATCH, model::IN_H, model::IN_W)
            .map_err(|source| PipelineError::Setup { stage: Stage::Convolution, source })?;

        let pool_config = AveragePool2dConfig {
            kernel_h: model::IN_H,
            kernel_w: model::IN_W,
            stride_h: model::IN_H,
            stride_w: model::IN_W,
            channels: model::CONV_OUT_C,
            clamp: Clamp::NONE,
        };
        let mut pool = AveragePool2d::create(&pool_config)
            .map_err(|source| PipelineError::Create { stage: Stage::AveragePool, source })?;
        pool.setup(model::BATCH, model::IN_H, model::IN_W)
            .map_err(|source| PipelineError::Setup { stage: Stage::AveragePool, source })?;

        let fc_config = FullyConnectedConfig {
            input_channels: model::CONV_OUT_C,
            output_channels: model::FC_OUT,
            clamp: Clamp::NONE,
        };
        let mut fc = FullyConnected::create(&fc_config, fc_weights, fc_bias)
            .map_err(|source| PipelineError::Create { stage: Stage::FullyConnected, source })?;
        fc.setup(model::BATCH)
            .map_err(|source| PipelineError::Setup { stage: Stage::FullyConnected, source })?;

        let softmax_config = SoftmaxConfig { channels: model::FC_OUT };
        let mut softmax = Softmax::create(&softmax_config)
            .map_err(|source| PipelineError::Create { stage: Stage::Softmax, source })?;
        softmax.setup(model::BATCH)
            .map_err(|source| PipelineError::Setup { stage: Stage::Softmax, source })?;

        Ok(Self {
            conv,
            pool,
            fc,
            softmax,
            conv_out: vec![0.0; model::CONV_OUT_LEN],
            pool_out: vec![0.0; model::POOL_OUT_LEN],
            logits: vec![0.0; model::BATCH * model::FC_OUT],
            probs: vec![0.0; model::BATCH * model::FC_OUT],
        })
    }

    /// Run the four stages over `input` and return the class probabilities.
    pub fn infer(&mut self, input: &[f32]) -> Result<[f32; model::FC_OUT], PipelineError> {
        self.conv
            .run(input, &mut self.conv_out)
            .map_err(|source| PipelineError::Run { stage: Stage::Convolution, source })?;
        self.pool
            .run(&self.conv_out, &mut self.pool_out)
            .map_err(|source| PipelineError::Run { stage: Stage::AveragePool, source })?;
        self.fc
            .run(&self.pool_out, &mut self.logits)
            .map_err(|source| PipelineError::Run { stage: Stage::FullyConnected, source })?;
        self.softmax
            .run(&self.logits, &mut self.probs)
            .map_err(|source| PipelineError::Run { stage: Stage::Softmax, source })?;

        let mut probs = [0.0f32; model::FC_OUT];
        probs.copy_from_slice(&self.probs);
        if let Some(class) = kernels::argmax(&probs) {
            debug!(class, "inference complete");
        }
        Ok(probs)
    }
}
