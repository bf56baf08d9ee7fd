fn main() {
    std::process::exit(cloudops::run_build());
}
