//! dispatch-planner CLI binary
//!
//! This is the minimal entrypoint for the dispatch planner CLI.
//! All logic is in the library; main.rs only invokes `dispatch_cli::run()`.

#[tokio::main]
async fn main() {
    // dispatch_cli::run() handles ALL output including errors.
    let code = dispatch_cli::run().await;
    std::process::exit(code.as_i32());
}
