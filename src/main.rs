fn main() {
    if let Err(err) = movie_curate::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
