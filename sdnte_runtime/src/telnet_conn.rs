// SDN-TE: Delay-Aware Traffic Engineering for Software-Defined Networks
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Shell access to nodes through their telnet console
//!
//! This backend is used for networks emulated inside GNS3, where every node exposes a root shell
//! on a console port. A telnet connection cannot be shared between threads, so every node gets a
//! worker thread that owns the connection and executes the commands one after the other.

use sdnte::probe::Emulation;
use sdnte::ProcessError;

use log::*;
use regex::Regex;
use telnet::{Telnet, TelnetEvent};

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::str;
use std::sync::mpsc::{channel, Sender};
use std::sync::Mutex;
use std::thread::{self, sleep};
use std::time::{Duration, SystemTime};

/// Default shell prompt, e.g., `root@s1:~# `
pub const DEFAULT_PROMPT: &str = r"[a-zA-Z0-9_\-.@]+:[a-zA-Z0-9_\-./~()]*[#$] $";

type Job = (String, Sender<Result<String, String>>);

/// Nodes reachable through telnet consoles.
#[derive(Debug)]
pub struct TelnetEmulation {
    host: String,
    ports: HashMap<String, u16>,
    prompt: Regex,
    timeout: Duration,
    workers: Mutex<HashMap<String, Sender<Job>>>,
}

impl TelnetEmulation {
    /// Create the handle for the consoles on `host`. `ports` maps the node names (`s1`, `h1`,
    /// ...) to the console ports. No connection is opened yet.
    pub fn new(host: impl Into<String>, ports: HashMap<String, u16>) -> Self {
        Self {
            host: host.into(),
            ports,
            prompt: Regex::new(DEFAULT_PROMPT).expect("default prompt is a valid regex"),
            timeout: Duration::from_secs(120),
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Read the console ports from a JSON object, e.g., `{"s1": 5000, "h1": 5001}`.
    pub fn from_port_map(
        host: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn Error>> {
        let ports: HashMap<String, u16> = serde_json::from_reader(File::open(path)?)?;
        info!("Loaded {} console ports", ports.len());
        Ok(Self::new(host, ports))
    }

    /// Use a different shell prompt.
    pub fn with_prompt(mut self, prompt: &str) -> Result<Self, regex::Error> {
        self.prompt = Regex::new(prompt)?;
        Ok(self)
    }

    /// Maximum time to wait for a command to return to the prompt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn worker(&self, node: &str) -> Result<Sender<Job>, ProcessError> {
        let mut workers = self.workers.lock().map_err(|_| {
            ProcessError::Task(node.to_string(), String::from("worker table is poisoned"))
        })?;
        if let Some(tx) = workers.get(node) {
            return Ok(tx.clone());
        }

        let port =
            *self.ports.get(node).ok_or_else(|| ProcessError::UnknownNode(node.to_string()))?;
        let (tx, rx) = channel::<Job>();
        let (ready_tx, ready_rx) = channel();
        let host = self.host.clone();
        let prompt = self.prompt.clone();
        let timeout = self.timeout;
        let name = node.to_string();
        thread::spawn(move || {
            let mut shell = match ConsoleShell::connect(&host, port, prompt, timeout) {
                Ok(shell) => {
                    let _ = ready_tx.send(Ok(()));
                    shell
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            for (cmd, reply) in rx {
                let result = shell.exec(&cmd).map_err(|e| e.to_string());
                let _ = reply.send(result);
            }
            debug!("Closing the console of {}", name);
        });

        let connected = ready_rx.recv().unwrap_or_else(|_| Err(String::from("worker died")));
        if let Err(reason) = connected {
            error!("Cannot connect to the console of {} at port {}: {}", node, port, reason);
            return Err(ProcessError::Exec {
                node: node.to_string(),
                cmd: String::from("connect"),
                reason,
            });
        }
        workers.insert(node.to_string(), tx.clone());
        Ok(tx)
    }
}

impl Emulation for TelnetEmulation {
    fn exec(&self, node: &str, cmd: &str) -> Result<String, ProcessError> {
        let worker = self.worker(node)?;
        let exec_error = |reason: String| ProcessError::Exec {
            node: node.to_string(),
            cmd: cmd.to_string(),
            reason,
        };
        let (reply_tx, reply_rx) = channel();
        worker
            .send((cmd.to_string(), reply_tx))
            .map_err(|_| exec_error(String::from("worker is gone")))?;
        reply_rx.recv().map_err(|_| exec_error(String::from("worker is gone")))?.map_err(exec_error)
    }
}

/// A single telnet connection to a root shell.
struct ConsoleShell {
    c: Telnet,
    prompt: Regex,
    timeout: Duration,
}

impl ConsoleShell {
    fn connect(
        host: &str,
        port: u16,
        prompt: Regex,
        timeout: Duration,
    ) -> Result<Self, Box<dyn Error>> {
        let mut c = Telnet::connect((host, port), 2048)?;
        // receive all initial events
        while let Ok(event) = c.read_timeout(Duration::from_millis(1)) {
            if matches!(event, TelnetEvent::TimedOut) {
                break;
            }
        }
        let mut shell = Self { c, prompt, timeout: Duration::from_secs(20) };
        shell.send_wait("\n")?;
        shell.timeout = timeout;
        Ok(shell)
    }

    fn exec(&mut self, cmd: &str) -> Result<String, Box<dyn Error>> {
        let raw = self.send_wait(format!("{}\n", cmd))?;
        Ok(strip_echo_and_prompt(&raw, cmd, &self.prompt))
    }

    fn send_wait(&mut self, data: impl AsRef<str>) -> Result<String, Box<dyn Error>> {
        self.c.write(data.as_ref().as_bytes())?;
        self.receive_until_prompt()
    }

    fn receive_until_prompt(&mut self) -> Result<String, Box<dyn Error>> {
        let mut result = String::new();
        let now = SystemTime::now();
        loop {
            match self.c.read_nonblocking()? {
                TelnetEvent::NoData => {
                    if now.elapsed()? > self.timeout {
                        return Err(format!(
                            "Took longer than {}s to receive an answer",
                            self.timeout.as_secs()
                        )
                        .into());
                    }
                    sleep(Duration::from_millis(10));
                }
                TelnetEvent::Data(d) => {
                    result.push_str(str::from_utf8(&d)?);
                    if self.prompt.is_match(&result) {
                        return Ok(result.replace("\r\n", "\n"));
                    }
                }
                _ => {}
            }
        }
    }
}

/// Remove the echoed command and the trailing prompt from the raw console output.
fn strip_echo_and_prompt(raw: &str, cmd: &str, prompt: &Regex) -> String {
    let body = match prompt.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };
    let body = match body.find('\n') {
        Some(pos) if body[..pos].trim_end().ends_with(cmd.trim()) => &body[pos + 1..],
        _ => body,
    };
    body.to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    fn prompt() -> Regex {
        Regex::new(DEFAULT_PROMPT).unwrap()
    }

    #[test]
    fn prompt_matches() {
        assert!(prompt().is_match("root@s1:~# "));
        assert!(prompt().is_match("output\nuser@gns3-vm:/tmp$ "));
        assert!(!prompt().is_match("root@s1:~# ls"));
    }

    #[test]
    fn strip_output() {
        let raw = "ITGDec receiver.log\nAverage delay = 0.1 s\nroot@s1:~# ";
        assert_eq!(
            strip_echo_and_prompt(raw, "ITGDec receiver.log", &prompt()),
            "Average delay = 0.1 s\n"
        );
    }

    #[test]
    fn strip_output_without_echo() {
        let raw = "Average delay = 0.1 s\nroot@s1:~# ";
        assert_eq!(strip_echo_and_prompt(raw, "ITGDec", &prompt()), "Average delay = 0.1 s\n");
    }

    #[test]
    fn unknown_node() {
        let emu = TelnetEmulation::new("localhost", HashMap::new());
        assert_eq!(emu.exec("s1", "true"), Err(ProcessError::UnknownNode(String::from("s1"))));
    }
}
