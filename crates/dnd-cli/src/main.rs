fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    std::process::exit(dnd_cli::run_cli_from_args(std::env::args_os()));
}
