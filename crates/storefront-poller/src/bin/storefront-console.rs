fn main() {
    let code = storefront_poller::cli::run_from_env();
    std::process::exit(code);
}
