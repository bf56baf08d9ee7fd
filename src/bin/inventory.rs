fn main() {
    std::process::exit(cloudops::run_inventory());
}
