//! Where request progress, confirmations and credential prompts go.

use std::cell::RefCell;
use std::env;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use anyhow::anyhow;
use console::Term;
use reqwest::{Method, StatusCode, Url};

#[derive(Debug)]
enum Channel {
    Term(Term),
    /// Scripted input and captured output, for tests.
    Buf { input: String, output: Vec<u8> },
    Sink,
}

impl Channel {
    fn read_line(&mut self, is_secret: bool) -> io::Result<String> {
        match self {
            Self::Term(term) if is_secret => term.read_secure_line(),
            Self::Term(term) => term.read_line(),
            Self::Buf { input, .. } => {
                let line: String = match input.find('\n') {
                    Some(end) => input.drain(..=end).collect(),
                    None => mem::take(input),
                };
                Ok(line.trim_end_matches(&['\r', '\n'][..]).to_owned())
            }
            Self::Sink => Ok(String::new()),
        }
    }
}

impl Write for Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Term(term) => term.write(buf),
            Self::Buf { output, .. } => output.write(buf),
            Self::Sink => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Term(term) => term.flush(),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ConsoleConfig {
    /// Answers every confirmation with yes.
    pub assume_yes: bool,
}

/// Handle to the user's terminal, or to a stand-in for it.
///
/// Clones share the channel: a client handed a clone reports its requests
/// to the same place as the command that created it.
#[derive(Debug, Clone)]
pub struct Console {
    channel: Rc<RefCell<Channel>>,
    conf: ConsoleConfig,
}

impl Console {
    fn new(channel: Channel, conf: ConsoleConfig) -> Self {
        Self {
            channel: Rc::new(RefCell::new(channel)),
            conf,
        }
    }

    /// Writes to stderr, keeping stdout for outcomes.
    pub fn term(conf: ConsoleConfig) -> Self {
        Self::new(Channel::Term(Term::stderr()), conf)
    }

    pub fn buf(conf: ConsoleConfig) -> Self {
        Self::new(
            Channel::Buf {
                input: String::new(),
                output: Vec::new(),
            },
            conf,
        )
    }

    pub fn sink(conf: ConsoleConfig) -> Self {
        Self::new(Channel::Sink, conf)
    }

    /// Queues lines the user will "type" into a buffered console.
    pub fn write_input(&mut self, s: &str) {
        if let Channel::Buf { input, .. } = &mut *self.channel.borrow_mut() {
            input.push_str(s);
        }
    }

    /// Drains what a buffered console has recorded so far.
    pub fn take_output(&self) -> crate::Result<String> {
        match &mut *self.channel.borrow_mut() {
            Channel::Buf { output, .. } => Ok(String::from_utf8(mem::take(output))?),
            _ => Err(anyhow!("Could not take output of an unbuffered console")),
        }
    }

    /// Starts the progress line of a request; `finish_request` completes it.
    pub fn start_request(&mut self, method: &Method, url: &Url) {
        write!(self, "{:7} {} ... ", method.as_str(), url).unwrap_or(());
        self.flush().unwrap_or(());
    }

    /// `None` means that no response arrived.
    pub fn finish_request(&mut self, status: Option<StatusCode>) {
        let written = match status {
            Some(status) => writeln!(self, "{}", status),
            None => writeln!(self, "failed"),
        };
        written.unwrap_or(());
    }

    pub fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        if self.conf.assume_yes {
            return Ok(true);
        }
        let choices = if default { "Y/n" } else { "y/N" };
        write!(self, "{} ({}) ", message, choices)?;
        self.flush()?;
        let answer = self.channel.borrow_mut().read_line(false)?;
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Ok(default),
        }
    }

    /// Takes a credential from `env_name` if set, otherwise asks for it.
    ///
    /// A secret is neither echoed while typed nor shown when read from env.
    pub fn read_credential(
        &mut self,
        env_name: &str,
        prompt: &str,
        is_secret: bool,
    ) -> io::Result<String> {
        if let Ok(value) = env::var(env_name) {
            let shown = if is_secret { "********" } else { value.as_str() };
            writeln!(self, "{}{} (from ${})", prompt, shown, env_name)?;
            return Ok(value);
        }
        write!(self, "{}", prompt)?;
        self.flush()?;
        let value = self.channel.borrow_mut().read_line(is_secret)?;
        if !matches!(&*self.channel.borrow(), Channel::Term(_)) {
            writeln!(self)?;
        }
        Ok(value)
    }
}

impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.channel.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.channel.borrow_mut().flush()
    }
}
