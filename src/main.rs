//! Protoguard - structural prototype-pollution scanner for JavaScript
//!
//! Parses JavaScript (or pre-parsed ESTree JSON) and reports assignments that
//! target `__proto__`, `constructor` or `prototype`.

mod cli;

use cli::{CliApp, exit_codes};

#[tokio::main]
async fn main() {
    let app = match CliApp::new() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let code = match app.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::INTERNAL_ERROR
        }
    };

    std::process::exit(code);
}
