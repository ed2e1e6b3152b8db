fn main() {
    if let Err(error) = runelog_lib::run() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
