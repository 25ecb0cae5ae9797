use student_seed::{seed, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    // One-shot: every failure is logged once and the process exits normally.
    seed::run_from_env().await;
}
