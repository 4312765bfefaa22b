use std::path::PathBuf;

pub struct Config {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    /// Echo each line of an input file before its result.
    pub echo: bool,
    pub history_file: Option<PathBuf>,
}

impl Config {
    pub(crate) fn new() -> Self {
        Config {
            dump_tokens: false,
            dump_ast: false,
            echo: true,
            history_file: dirs::home_dir().map(|mut path| {
                path.push(".lf-history");
                path
            }),
        }
    }
}
