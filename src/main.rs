//! `oasgo` binary.

fn main() {
    std::process::exit(oasgo_cli::main_entry());
}
