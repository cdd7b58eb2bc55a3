//! Trellis binary entry point.

use trellis::ui::output;

fn main() {
    if let Err(err) = trellis::cli::run() {
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
