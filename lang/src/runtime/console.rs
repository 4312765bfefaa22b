use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, BufRead, Write},
    rc::Rc,
};

/// The only channel `read()` and `write()` talk to.
pub trait Console {
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    fn write_line(&mut self, text: &str) -> io::Result<()>;
}

/// Console bound to the process' stdin and stdout.
pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(|c| c == '\n' || c == '\r').to_owned())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", text)?;
        stdout.flush()
    }
}

/// In-memory console. Clones share the same buffers, so a handle kept
/// outside the `Context` observes everything written through it.
#[derive(Clone, Default)]
pub struct BufferConsole {
    input: Rc<RefCell<VecDeque<String>>>,
    output: Rc<RefCell<Vec<String>>>,
}

impl BufferConsole {
    pub fn new() -> BufferConsole {
        Default::default()
    }

    pub fn with_input<I, S>(lines: I) -> BufferConsole
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = BufferConsole::new();
        console
            .input
            .borrow_mut()
            .extend(lines.into_iter().map(Into::into));
        console
    }

    pub fn output(&self) -> Vec<String> {
        self.output.borrow().clone()
    }

    pub fn clear_output(&self) {
        self.output.borrow_mut().clear();
    }
}

impl Console for BufferConsole {
    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.input
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.output.borrow_mut().push(text.to_owned());
        Ok(())
    }
}
