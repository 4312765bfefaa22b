mod cli;
mod config;

use clap::App;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

fn init_logging() {
    let filter = EnvFilter::try_from_env("LF_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = App::new("listfunc")
        .version("0.1.0")
        .author("Kiva <imkiva@icloud.com>")
        .about("ListFunc combinator language interpreter")
        .args_from_usage(
            "--no-repl        'Exit after running INPUT instead of starting a shell'
            -q, --quiet       'Do not echo the lines of INPUT'
            --dump-tokens     'Print the tokens of every line to stderr'
            --dump-ast        'Print the syntax tree of every line to stderr'
            --no-history      'Do not load or save the shell history'
            [INPUT]           'Run file line by line'",
        )
        .get_matches();

    init_logging();

    let mut cfg = Config::new();
    cfg.dump_tokens = args.is_present("dump-tokens");
    cfg.dump_ast = args.is_present("dump-ast");
    cfg.echo = !args.is_present("quiet");
    if args.is_present("no-history") {
        cfg.history_file = None;
    }

    let code = cli::cli_main::cli_main(
        cfg,
        args.value_of("INPUT").map(|e| e.to_owned()),
        !args.is_present("no-repl"),
    );
    std::process::exit(code);
}
