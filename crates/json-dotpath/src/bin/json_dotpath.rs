//! `json-dotpath` — read or write a dotted path in a JSON document.
//!
//! Usage:
//!   json-dotpath get '<path>' ['<default>']
//!   json-dotpath set '<path>' '<value>'
//!
//! The document is read from stdin. Set `RUST_LOG=debug` to trace traversal.

use json_dotpath::cli::{init_logging, run};
use std::io::{self, Read, Write};

fn main() {
    init_logging("warn");

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run(&args, buf.trim()) {
        Ok(result) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
