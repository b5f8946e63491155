fn main() {
    match turnlog::run() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(turnlog::EXIT_FATAL);
        }
    }
}
