use std::env;
use std::process;

use bee_tsp::Invocation;

fn main() {
    let invocation = Invocation::build(env::args()).unwrap_or_else(|err| err.exit());

    tracing_subscriber::fmt()
        .with_max_level(invocation.log_level)
        .with_target(false)
        .init();

    if let Err(e) = bee_tsp::run(&invocation.command) {
        eprintln!("Application error: {e}");
        process::exit(1);
    };
}
