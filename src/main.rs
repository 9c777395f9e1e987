// src/main.rs

use quietshell::{logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = logging::init_logging() {
        eprintln!("quietshell: diagnostics disabled: {err:?}");
    }

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    std::process::exit(run(args).await);
}
