//! Filesystem and process capabilities consumed by the dispatcher.

use std::fs::File;
use std::io::{self, BufRead, BufReader, PipeReader, Read, Write};
use std::process::{Child, Command, Stdio};

/// Opens named resources for reading.
pub trait FileReader: Send + Sync {
    /// Opens `path` for reading.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Creates or truncates named resources for writing.
pub trait FileWriter: Send + Sync {
    /// Creates `path`, truncating any existing content.
    fn create(&self, path: &str) -> io::Result<Box<dyn Write + Send>>;
}

/// Lines produced by a running process, each with its terminator when one
/// was present. The sequence is finite and cannot be restarted.
pub type ProcessOutput = Box<dyn Iterator<Item = String> + Send>;

/// Runs external command lines.
pub trait ProcessRunner: Send + Sync {
    /// Starts `command_line` and returns its combined stdout and stderr.
    fn run(&self, command_line: &str) -> io::Result<ProcessOutput>;
}

/// Capabilities backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFiles;

impl FileReader for SystemFiles {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }
}

impl FileWriter for SystemFiles {
    fn create(&self, path: &str) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(File::create(path)?))
    }
}

/// Runs command lines through the platform shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command_line: &str) -> io::Result<ProcessOutput> {
        let (reader, writer) = io::pipe()?;
        // The command owns the write ends; it must be dropped once the child
        // has spawned or the reader never sees end-of-file.
        let child = {
            let mut command = shell_command(command_line);
            command
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn()?
        };
        Ok(Box::new(ProcessLines {
            child,
            reader: BufReader::new(reader),
            finished: false,
        }))
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

struct ProcessLines {
    child: Child,
    reader: BufReader<PipeReader>,
    finished: bool,
}

impl Iterator for ProcessLines {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(read) if read > 0 => Some(String::from_utf8_lossy(&line).into_owned()),
            _ => {
                self.finished = true;
                None
            }
        }
    }
}

impl Drop for ProcessLines {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}
