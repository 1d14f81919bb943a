//! End-to-end checks of the fixed forward pass.

use femtonet_core::ops::{AveragePool2d, AveragePool2dConfig, Clamp, Conv2dConfig, Convolution2d};
use femtonet_core::{runtime, Shape};
use femtonet_pipeline::{model, synthesize_input, Classifier, PipelineError, Stage};

const EPS: f32 = 1e-5;

/// Straight-loop rendition of the four stages, computed independently of
/// the operator library. Assumes the model's single input channel.
fn reference_forward(input: &[f32]) -> [f32; model::FC_OUT] {
    let mut conv_out = vec![0.0f32; model::CONV_OUT_LEN];
    for oy in 0..model::IN_H {
        for ox in 0..model::IN_W {
            for oc in 0..model::CONV_OUT_C {
                let mut sum = model::CONV_BIAS[oc];
                for ky in 0..model::CONV_K {
                    for kx in 0..model::CONV_K {
                        let iy = (oy * model::CONV_STRIDE + ky) as isize - model::CONV_PAD as isize;
                        let ix = (ox * model::CONV_STRIDE + kx) as isize - model::CONV_PAD as isize;
                        if iy < 0
                            || iy >= model::IN_H as isize
                            || ix < 0
                            || ix >= model::IN_W as isize
                        {
                            continue;
                        }
                        let in_idx = iy as usize * model::IN_W + ix as usize;
                        let w_idx = (oc * model::CONV_K + ky) * model::CONV_K + kx;
                        sum += input[in_idx] * model::CONV_WEIGHTS[w_idx];
                    }
                }
                conv_out[(oy * model::IN_W + ox) * model::CONV_OUT_C + oc] = sum.max(0.0);
            }
        }
    }

    let mut pooled = [0.0f32; model::CONV_OUT_C];
    for (i, &v) in conv_out.iter().enumerate() {
        pooled[i % model::CONV_OUT_C] += v;
    }
    for p in pooled.iter_mut() {
        *p /= (model::IN_H * model::IN_W) as f32;
    }

    let mut logits = [0.0f32; model::FC_OUT];
    for (o, logit) in logits.iter_mut().enumerate() {
        let mut sum = model::FC_BIAS[o];
        for (i, &p) in pooled.iter().enumerate() {
            sum += p * model::FC_WEIGHTS[o * model::CONV_OUT_C + i];
        }
        *logit = sum;
    }

    let max = logits.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let mut probs = [0.0f32; model::FC_OUT];
    let mut sum = 0.0f32;
    for (p, &l) in probs.iter_mut().zip(&logits) {
        *p = (l - max).exp();
        sum += *p;
    }
    for p in probs.iter_mut() {
        *p /= sum;
    }
    probs
}

// =============================================================================
// Input synthesis
// =============================================================================

#[test]
fn test_seeded_input_is_reproducible() {
    let a = synthesize_input(model::SEED);
    let b = synthesize_input(model::SEED);
    assert_eq!(a.len(), model::INPUT_LEN);
    assert_eq!(a, b);
}

#[test]
fn test_seeded_input_stays_in_unit_interval() {
    for &v in &synthesize_input(model::SEED) {
        assert!((0.0..1.0).contains(&v), "input value {}", v);
    }
}

#[test]
fn test_different_seeds_give_different_inputs() {
    assert_ne!(synthesize_input(42), synthesize_input(43));
}

// =============================================================================
// Forward pass
// =============================================================================

#[test]
fn test_probabilities_form_a_distribution() {
    let input = synthesize_input(model::SEED);
    let mut classifier = Classifier::build().unwrap();
    let probs = classifier.infer(&input).unwrap();

    let sum: f32 = probs.iter().sum();
    assert!((sum - 1.0).abs() < EPS, "probability sum {}", sum);
    for &p in &probs {
        assert!((0.0..=1.0).contains(&p), "probability {}", p);
    }
}

#[test]
fn test_same_seed_gives_identical_probabilities() {
    let input = synthesize_input(model::SEED);
    let p1 = Classifier::build().unwrap().infer(&input).unwrap();
    let p2 = Classifier::build().unwrap().infer(&input).unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn test_repeated_inference_is_stable() {
    let input = synthesize_input(model::SEED);
    let mut classifier = Classifier::build().unwrap();
    let p1 = classifier.infer(&input).unwrap();
    let p2 = classifier.infer(&input).unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn test_matches_reference_forward_pass() {
    let input = synthesize_input(model::SEED);
    let mut classifier = Classifier::build().unwrap();
    let probs = classifier.infer(&input).unwrap();
    let expected = reference_forward(&input);
    for (i, (p, e)) in probs.iter().zip(&expected).enumerate() {
        assert!((p - e).abs() < 1e-4, "class {}: {} vs {}", i, p, e);
    }
}

#[test]
fn test_all_zero_input_hand_case() {
    // zero input leaves only the biases: conv channels rectify to
    // (0.05, 0.0), the pool passes them through, and the logits become
    // (0.125, 0.015, -0.105)
    let input = vec![0.0f32; model::INPUT_LEN];
    let mut classifier = Classifier::build().unwrap();
    let probs = classifier.infer(&input).unwrap();
    let expected = [0.371696f32, 0.332978, 0.295325];
    for (i, (p, e)) in probs.iter().zip(&expected).enumerate() {
        assert!((p - e).abs() < 1e-4, "class {}: {} vs {}", i, p, e);
    }
}

// =============================================================================
// Stage geometry
// =============================================================================

#[test]
fn test_stage_geometry_chains() {
    runtime::init().unwrap();

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
    let mut conv =
        Convolution2d::create(&conv_config, &model::CONV_WEIGHTS, &model::CONV_BIAS).unwrap();
    conv.setup(model::BATCH, model::IN_H, model::IN_W).unwrap();
    // same padding keeps the spatial dims
    assert_eq!(
        conv.output_shape(),
        Some(Shape::nhwc(model::BATCH, model::IN_H, model::IN_W, model::CONV_OUT_C))
    );
    assert_eq!(conv.output_shape().unwrap().total(), model::CONV_OUT_LEN);

    let pool_config = AveragePool2dConfig {
        kernel_h: model::IN_H,
        kernel_w: model::IN_W,
        stride_h: model::IN_H,
        stride_w: model::IN_W,
        channels: model::CONV_OUT_C,
        clamp: Clamp::NONE,
    };
    let mut pool = AveragePool2d::create(&pool_config).unwrap();
    pool.setup(model::BATCH, model::IN_H, model::IN_W).unwrap();
    // global pool collapses the map to one pixel per channel
    assert_eq!(
        pool.output_shape(),
        Some(Shape::nhwc(model::BATCH, 1, 1, model::CONV_OUT_C))
    );
    assert_eq!(pool.output_shape().unwrap().total(), model::POOL_OUT_LEN);
}

// =============================================================================
// Failure attribution
// =============================================================================

#[test]
fn test_truncated_conv_bias_names_convolution_stage() {
    let short_bias = [0.05f32];
    let err = Classifier::build_with(
        &model::CONV_WEIGHTS,
        &short_bias,
        &model::FC_WEIGHTS,
        &model::FC_BIAS,
    )
    .map(|_| ())
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Create { stage: Stage::Convolution, .. }
    ));
    let message = err.to_string();
    assert!(message.contains("convolution"), "message: {}", message);
}

#[test]
fn test_oversized_fc_weights_name_fully_connected_stage() {
    let bad_weights = [0.0f32; 7];
    let err = Classifier::build_with(
        &model::CONV_WEIGHTS,
        &model::CONV_BIAS,
        &bad_weights,
        &model::FC_BIAS,
    )
    .map(|_| ())
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Create { stage: Stage::FullyConnected, .. }
    ));
    let message = err.to_string();
    assert!(message.contains("fully connected"), "message: {}", message);
}
