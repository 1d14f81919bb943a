//! Binary entry point: one forward pass, one line of output.

use femtonet_pipeline::{model, synthesize_input, Classifier};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let input = synthesize_input(model::SEED);

    let result = Classifier::build().and_then(|mut classifier| classifier.infer(&input));
    let probs = match result {
        Ok(probs) => probs,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let rendered: Vec<String> = probs.iter().map(|p| p.to_string()).collect();
    println!("Probabilities: {}", rendered.join(" "));
}
