//! f32 NHWC compute kernels.
//!
//! Pure functions over flat row-major slices. The operator structs in
//! [`crate::ops`] validate geometry and buffer lengths before calling in
//! here; the kernels themselves assume consistent arguments.

// =============================================================================
// Geometry helpers
// =============================================================================

/// Output spatial dims of a convolution with symmetric per-axis zero padding.
///
/// Per axis: `(in + 2*pad - (dilation*(kernel - 1) + 1)) / stride + 1`.
/// The dilated kernel must fit inside the padded input.
pub fn conv2d_output_size(
    input_hw: [usize; 2],
    kernel: [usize; 2],
    stride: [usize; 2],
    dilation: [usize; 2],
    padding: [usize; 2],
) -> [usize; 2] {
    let [h, w] = input_hw;
    let [kh, kw] = kernel;
    let [sh, sw] = stride;
    let [dh, dw] = dilation;
    let [ph, pw] = padding;
    let eff_h = dh * (kh - 1) + 1;
    let eff_w = dw * (kw - 1) + 1;
    [
        (h + 2 * ph - eff_h) / sh + 1,
        (w + 2 * pw - eff_w) / sw + 1,
    ]
}

/// Output spatial dims of an unpadded pooling window.
///
/// Per axis: `(in - kernel) / stride + 1`. The kernel must fit inside the
/// input.
pub fn pool_output_size(input_hw: [usize; 2], kernel: [usize; 2], stride: [usize; 2]) -> [usize; 2] {
    let [h, w] = input_hw;
    let [kh, kw] = kernel;
    let [sh, sw] = stride;
    [(h - kh) / sh + 1, (w - kw) / sw + 1]
}

// =============================================================================
// Matrix kernels
// =============================================================================

/// Matrix multiply with B transposed: C[M,N] = A[M,K] @ B[N,K]^T
///
/// `b` is stored row-major as [N, K], so both operands stream along K.
pub fn matmul_bt(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0f32;
            for p in 0..k {
                acc += a[i * k + p] * b[j * k + p];
            }
            c[i * n + j] = acc;
        }
    }
}

/// Add bias to each row: data[row, col] += bias[col]
///
/// - `data`: [rows, cols] mutable
/// - `bias`: [cols]
pub fn bias_add(data: &mut [f32], bias: &[f32], rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            data[r * cols + c] += bias[c];
        }
    }
}

/// im2col: rearrange NHWC input patches into a 2D column matrix.
///
/// - `input`:     [N, H, W, Ci]
/// - `kernel`:    [Kh, Kw]
/// - `stride`:    [Sh, Sw]
/// - `dilation`:  [Dh, Dw]
/// - `padding`:   [Ph, Pw], symmetric zero padding on each side
/// - `output_hw`: [Ho, Wo]
/// - `col`:       output matrix [N*Ho*Wo, Kh*Kw*Ci]
///
/// Out-of-bounds taps read as zero. One output row per output pixel, so the
/// column matrix multiplied against [Co, Kh*Kw*Ci] weights yields NHWC
/// output directly.
pub fn im2col(
    input: &[f32],
    input_shape: [usize; 4],
    kernel: [usize; 2],
    stride: [usize; 2],
    dilation: [usize; 2],
    padding: [usize; 2],
    output_hw: [usize; 2],
    col: &mut [f32],
) {
    let [n, h, w, ci] = input_shape;
    let [kh, kw] = kernel;
    let [sh, sw] = stride;
    let [dh, dw] = dilation;
    let [pad_h, pad_w] = padding;
    let [ho, wo] = output_hw;
    let k = kh * kw * ci;

    for batch in 0..n {
        for oy in 0..ho {
            for ox in 0..wo {
                let row = batch * (ho * wo) + oy * wo + ox;
                for ky in 0..kh {
                    for kx in 0..kw {
                        let iy = (oy * sh + ky * dh) as isize - pad_h as isize;
                        let ix = (ox * sw + kx * dw) as isize - pad_w as isize;
                        for ic in 0..ci {
                            let col_idx = ky * (kw * ci) + kx * ci + ic;
                            if iy >= 0 && iy < h as isize && ix >= 0 && ix < w as isize {
                                let in_idx = batch * (h * w * ci)
                                    + (iy as usize) * (w * ci)
                                    + (ix as usize) * ci
                                    + ic;
                                col[row * k + col_idx] = input[in_idx];
                            } else {
                                col[row * k + col_idx] = 0.0;
                            }
                        }
                    }
                }
            }
        }
    }
}

// =============================================================================
// Pooling
// =============================================================================

/// 2D average pooling over an NHWC tensor, no padding.
///
/// - `input`:  [N, H, W, C]
/// - `output`: [N, Ho, Wo, C]
///
/// Each output element is the mean of one kernel window in one channel.
pub fn average_pool2d(
    input: &[f32],
    input_shape: [usize; 4],
    kernel: [usize; 2],
    stride: [usize; 2],
    output: &mut [f32],
    output_shape: [usize; 4],
) {
    let [n, h, w, c] = input_shape;
    let [kh, kw] = kernel;
    let [sh, sw] = stride;
    let [_, ho, wo, _] = output_shape;
    let window = (kh * kw) as f32;

    for batch in 0..n {
        for oy in 0..ho {
            for ox in 0..wo {
                for ch in 0..c {
                    let mut sum = 0.0f32;
                    for ky in 0..kh {
                        for kx in 0..kw {
                            let iy = oy * sh + ky;
                            let ix = ox * sw + kx;
                            sum += input[batch * (h * w * c) + iy * (w * c) + ix * c + ch];
                        }
                    }
                    output[batch * (ho * wo * c) + oy * (wo * c) + ox * c + ch] = sum / window;
                }
            }
        }
    }
}

// =============================================================================
// Softmax and argmax
// =============================================================================

/// Row-wise softmax: `output[r] = exp(input[r] - max(input[r])) / sum`.
///
/// - `input`:  [rows, channels]
/// - `output`: [rows, channels]
///
/// Subtracting the row maximum keeps the exponentials in range, so large
/// logits normalize instead of overflowing.
pub fn softmax(input: &[f32], output: &mut [f32], rows: usize, channels: usize) {
    for r in 0..rows {
        let row = &input[r * channels..(r + 1) * channels];
        let out = &mut output[r * channels..(r + 1) * channels];

        let mut max = f32::NEG_INFINITY;
        for &v in row {
            if v > max {
                max = v;
            }
        }

        let mut sum = 0.0f32;
        for (o, &v) in out.iter_mut().zip(row) {
            let e = (v - max).exp();
            *o = e;
            sum += e;
        }

        for o in out.iter_mut() {
            *o /= sum;
        }
    }
}

/// Index of the largest value. `None` for an empty slice.
pub fn argmax(data: &[f32]) -> Option<usize> {
    if data.is_empty() {
        return None;
    }
    let mut max_idx = 0;
    let mut max_val = data[0];
    for (i, &val) in data.iter().enumerate().skip(1) {
        if val > max_val {
            max_val = val;
            max_idx = i;
        }
    }
    Some(max_idx)
}
