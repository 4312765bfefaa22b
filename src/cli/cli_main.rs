use std::rc::Rc;

use rustyline::{
    completion::{Candidate, Completer},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    Context as RContext, Editor, Helper, Result as RResult,
};
use tracing::debug;

use lang::{
    codegen::{lf::LfCodeGenerator, PartialCodeGenerator},
    runtime::Context,
    syntax::{
        lex::tokenize,
        parse::{CompileError, LfParser},
        tree::Expr,
    },
};

use crate::config::Config;

const COMMANDS: &[(&str, &str)] = &[
    (":q", "Quit REPL"),
    (":defs", "Show user-defined functions"),
    (":builtins", "Show built-in functions and their arities"),
    (":help", "Show this help"),
];

struct REPL {
    rl: Editor<REPLHelper>,
    cfg: Config,
    context: Rc<Context>,
    repl_run: bool,
    prompt: String,
}

enum CompleteCandidate {
    Command(String, String),
    Func(String),
}

impl Candidate for CompleteCandidate {
    fn display(&self) -> &str {
        match self {
            CompleteCandidate::Command(cmd, _) => cmd,
            CompleteCandidate::Func(name) => name,
        }
    }

    fn replacement(&self) -> &str {
        match self {
            CompleteCandidate::Command(cmd, _) => cmd,
            CompleteCandidate::Func(name) => name,
        }
    }
}

struct REPLHelper {
    context: Rc<Context>,
}

impl Helper for REPLHelper {}

impl Completer for REPLHelper {
    type Candidate = CompleteCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &RContext<'_>,
    ) -> RResult<(usize, Vec<Self::Candidate>)> {
        let line = &line[..pos];
        if line.starts_with(':') {
            return Ok((
                0,
                COMMANDS
                    .iter()
                    .filter(|it| it.0.starts_with(line))
                    .map(|it| CompleteCandidate::Command(it.0.to_owned(), it.1.to_owned()))
                    .collect(),
            ));
        }

        let start = line
            .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .map_or(0, |idx| idx + 1);
        let word = &line[start..];

        let mut names: Vec<_> = self
            .context
            .definitions()
            .into_iter()
            .map(|(name, _, _)| name)
            .filter(|name| name.starts_with(word))
            .collect();
        names.dedup();

        Ok((start, names.into_iter().map(CompleteCandidate::Func).collect()))
    }
}

impl Validator for REPLHelper {}

impl Hinter for REPLHelper {}

impl Highlighter for REPLHelper {}

impl REPL {
    fn new(cfg: Config, context: Rc<Context>) -> REPL {
        let mut repl = REPL {
            rl: Editor::<REPLHelper>::new(),
            cfg,
            context: context.clone(),
            repl_run: true,
            prompt: "lf> ".to_owned(),
        };

        if let Some(ref path) = repl.cfg.history_file {
            let _ = repl.rl.load_history(path);
        }

        repl.rl.set_helper(Some(REPLHelper { context }));
        repl
    }

    fn start(&mut self) {
        debug!("starting REPL");
        while self.repl_run {
            let readline = self.rl.readline(self.prompt.as_str());
            match readline {
                Ok(line) => {
                    if line.starts_with(':') {
                        self.process_command(line);
                        continue;
                    }

                    match line.trim() {
                        "exit" => break,
                        "" => continue,
                        _ => self.run_code(line),
                    }
                }

                Err(ReadlineError::Interrupted) => (),
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    println!("ReadlineError: {:?}", err);
                    break;
                }
            }
        }
    }

    fn process_command(&mut self, line: String) {
        match line.trim() {
            ":q" => {
                self.repl_run = false;
            }

            ":defs" => {
                let gen = LfCodeGenerator::new();
                self.context
                    .definitions()
                    .into_iter()
                    .filter(|(_, _, body)| !matches!(**body, Expr::NativeExpr(_)))
                    .for_each(|(name, argc, body)| {
                        println!("{}", gen.partial_codegen_definition(&name, argc, &body))
                    });
            }

            ":builtins" => {
                self.context
                    .definitions()
                    .into_iter()
                    .filter(|(_, _, body)| matches!(**body, Expr::NativeExpr(_)))
                    .for_each(|(name, argc, _)| println!("- {}/{}", name, argc));
            }

            ":help" => {
                COMMANDS
                    .iter()
                    .for_each(|(cmd, help)| println!("{:<12}{}", cmd, help));
            }

            _ => println!("REPL: Unknown command {}", line.as_str()),
        }
    }

    fn run_code(&mut self, line: String) {
        self.rl.add_history_entry(line.as_str());
        compile_and_run(&self.cfg, &self.context, line.as_str());
    }
}

impl Drop for REPL {
    fn drop(&mut self) {
        if let Some(ref path) = self.cfg.history_file {
            let _ = self.rl.save_history(path);
        }
    }
}

fn compile(cfg: &Config, input: &str) -> Result<Expr, CompileError> {
    let tokens = tokenize(input)?;
    if cfg.dump_tokens {
        eprintln!("{:#?}", tokens);
    }

    let tree = LfParser::parse(tokens)?;
    if cfg.dump_ast {
        eprintln!("{:#?}", tree);
    }
    Ok(tree)
}

fn compile_and_run(cfg: &Config, ctx: &Context, input: &str) {
    match compile(cfg, input) {
        Ok(tree) => match ctx.source(&tree) {
            Ok(v) => println!("> {}", v),
            Err(err) => eprintln!("{}", err),
        },
        Err(err) => eprintln!("{}", err),
    }
}

// A line reading `exit` stops the file; the session itself goes on.
fn run_file(cfg: &Config, ctx: &Context, path: &str) -> std::io::Result<()> {
    let src = std::fs::read_to_string(path)?;
    for line in src.lines() {
        if cfg.echo {
            println!("{}", line);
        }

        match line.trim() {
            "exit" => break,
            "" => continue,
            _ => compile_and_run(cfg, ctx, line),
        }
    }
    Ok(())
}

pub(crate) fn cli_main(cfg: Config, input: Option<String>, repl: bool) -> i32 {
    let ctx = Rc::new(Context::new());
    ctx.load_builtins();

    if let Some(input) = input {
        if let Err(e) = run_file(&cfg, &ctx, input.as_str()) {
            eprintln!("lf: unable to open '{}': {}", input, e);
            return 1;
        }
        if !repl {
            return 0;
        }
    }

    let mut repl = REPL::new(cfg, ctx);
    repl.start();
    0
}
