//! nrl - issue and validate registration reference codes

use refcode::cli;
use refcode::ui::output;

fn main() {
    if let Err(err) = cli::run() {
        output::error(format!("{:#}", err));
        std::process::exit(cli::exit_code(&err));
    }
}
