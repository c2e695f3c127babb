fn main() {
    if let Err(err) = minimind_chat::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
