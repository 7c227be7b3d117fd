fn main() {
    if let Err(err) = roster_import::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
