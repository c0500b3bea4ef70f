use env_logger::Env;
use repl::Repl;
use std::env::args;

mod repl;

fn init_logger() {
    let env = Env::default().default_filter_or("info");

    env_logger::Builder::from_env(env)
        .format_target(false)
        .init();
}

fn main() {
    init_logger();

    log::info!("smoldb");

    let args: Vec<String> = args().collect();
    let mut repl = Repl::new();

    if args.len() <= 1 {
        repl.run();
    }

    const FILE_EXT: &str = ".sql";
    let looks_like_file = args[1].to_lowercase().ends_with(FILE_EXT);

    let result = match looks_like_file {
        true => repl.eval_file(&args[1]),
        false => repl.eval_command(&args[1]),
    };

    repl::print_command_result(&result);
}
