use std::env;
use std::process;

use minishell::ShellConfig;

fn main() {
    init_logging();
    let config = match ShellConfig::from_args(env::args_os().skip(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };
    match minishell::run(&config) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or("MINISHELL_LOG", "info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
