//! Process-boundary checks for the femtonet-pipeline binary.

use std::process::Command;

fn run_binary() -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_femtonet-pipeline"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch binary")
}

#[test]
fn test_binary_prints_one_probability_line_and_exits_zero() {
    let output = run_binary();
    assert!(output.status.success(), "status: {:?}", output.status);

    let stdout = String::from_utf8(output.stdout).expect("stdout is not UTF-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout: {:?}", stdout);

    let rest = lines[0]
        .strip_prefix("Probabilities: ")
        .expect("missing line prefix");
    let probs: Vec<f32> = rest
        .split(' ')
        .map(|token| token.parse().expect("token is not a float"))
        .collect();
    assert_eq!(probs.len(), 3);

    let sum: f32 = probs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5, "probability sum {}", sum);
    for &p in &probs {
        assert!((0.0..=1.0).contains(&p), "probability {}", p);
    }
}

#[test]
fn test_binary_output_is_reproducible_across_runs() {
    let first = run_binary();
    let second = run_binary();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}
