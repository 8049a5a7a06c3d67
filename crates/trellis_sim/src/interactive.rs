//! Interactive REPL for poking at a running circuit.
//!
//! [`InteractiveSim`] wraps a [`Simulation`] with a line-oriented command
//! interface: step the clock, inspect terminals, flip switches and set
//! inputs.
//!
//! ```ignore
//! let mut isim = InteractiveSim::new(sim, DisplayFormat::Hex);
//! isim.run_repl(&mut std::io::stdin().lock(), &mut std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use trellis_common::{format_value, parse_value, ComponentId, DisplayFormat, Value};
use trellis_netlist::terminal::terminals_of;

use crate::error::SimError;
use crate::session::Simulation;

/// A command parsed from user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimCommand {
    /// Apply clock edges.
    Step {
        /// Number of edges.
        count: u64,
    },
    /// Show terminal values of a component, or of one terminal.
    Inspect {
        /// The component.
        id: ComponentId,
        /// A single terminal, or all when absent.
        terminal: Option<String>,
    },
    /// Set an input component's value.
    Set {
        /// The input component.
        id: ComponentId,
        /// The value as typed (`0x..`, `0b..` or decimal).
        value: String,
    },
    /// Flip a switch.
    Toggle {
        /// The switch.
        id: ComponentId,
    },
    /// Change the display radix.
    Format {
        /// The new radix.
        format: DisplayFormat,
    },
    /// List all components.
    Components,
    /// Show session status.
    Status,
    /// Display help text.
    Help,
    /// Quit the interactive session.
    Quit,
}

/// Result of executing a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Command produced text output.
    Output(String),
    /// The session should end.
    Quit,
}

/// REPL wrapper around a [`Simulation`].
#[derive(Debug)]
pub struct InteractiveSim {
    sim: Simulation,
    format: DisplayFormat,
    history: Vec<String>,
}

impl InteractiveSim {
    /// Wraps a simulation. It is started on first use if it is not running.
    pub fn new(sim: Simulation, format: DisplayFormat) -> Self {
        Self {
            sim,
            format,
            history: Vec::new(),
        }
    }

    /// The wrapped simulation.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Consumes the REPL and returns the simulation.
    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    /// Commands entered so far.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Executes one command.
    pub fn execute(&mut self, cmd: &SimCommand) -> Result<CommandResult, SimError> {
        match cmd {
            SimCommand::Step { count } => self.cmd_step(*count),
            SimCommand::Inspect { id, terminal } => self.cmd_inspect(id, terminal.as_deref()),
            SimCommand::Set { id, value } => self.cmd_set(id, value),
            SimCommand::Toggle { id } => self.cmd_toggle(id),
            SimCommand::Format { format } => {
                self.format = *format;
                Ok(CommandResult::Output(format!("Display format: {format}")))
            }
            SimCommand::Components => Ok(self.cmd_components()),
            SimCommand::Status => Ok(self.cmd_status()),
            SimCommand::Help => Ok(CommandResult::Output(help_text())),
            SimCommand::Quit => Ok(CommandResult::Quit),
        }
    }

    /// Runs the REPL loop, reading commands from `input` and writing to `output`.
    ///
    /// Command errors are printed and the loop continues. I/O errors end it.
    pub fn run_repl<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), SimError> {
        writeln!(output, "Trellis Interactive Simulator")?;
        writeln!(output, "Type 'help' for available commands.")?;
        if !self.sim.is_running() {
            if let Err(e) = self.sim.start() {
                writeln!(output, "Warning: {e}")?;
            }
        }
        writeln!(
            output,
            "{} component(s), cycle {}",
            self.sim.components().len(),
            self.sim.cycle()
        )?;
        writeln!(output)?;

        let mut line = String::new();
        loop {
            write!(output, "trellis> ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.history.push(trimmed.to_string());

            let cmd = match parse_command(trimmed) {
                Ok(cmd) => cmd,
                Err(err) => {
                    writeln!(output, "Error: {err}")?;
                    continue;
                }
            };
            match self.execute(&cmd) {
                Ok(CommandResult::Output(text)) => writeln!(output, "{text}")?,
                Ok(CommandResult::Quit) => {
                    writeln!(output, "Goodbye.")?;
                    break;
                }
                Err(SimError::Io(e)) => return Err(SimError::Io(e)),
                Err(e) => writeln!(output, "Error: {e}")?,
            }
        }
        Ok(())
    }

    fn cmd_step(&mut self, count: u64) -> Result<CommandResult, SimError> {
        self.sim.run(count)?;
        Ok(CommandResult::Output(format!(
            "Cycle {} (settled in {} pass(es))",
            self.sim.cycle(),
            self.sim.last_passes()
        )))
    }

    fn cmd_inspect(
        &self,
        id: &ComponentId,
        terminal: Option<&str>,
    ) -> Result<CommandResult, SimError> {
        let component = self
            .sim
            .component(id)
            .ok_or_else(|| SimError::UnknownComponent(id.clone()))?;
        let result = self.sim.result().ok_or(SimError::NotRunning)?;

        let mut lines = Vec::new();
        for t in terminals_of(&component.kind) {
            if terminal.is_some_and(|name| name != t.name) {
                continue;
            }
            let value = result.get(id, &t.name).unwrap_or(0);
            lines.push(format!(
                "{id}.{} ({}, {} bit) = {}",
                t.name,
                t.direction,
                t.width,
                format_value(value, t.width, self.format)
            ));
        }
        if lines.is_empty() {
            return Ok(CommandResult::Output(match terminal {
                Some(name) => format!("Terminal not found: {id}.{name}"),
                None => format!("{id} has no terminals"),
            }));
        }
        Ok(CommandResult::Output(lines.join("\n")))
    }

    fn cmd_set(&mut self, id: &ComponentId, text: &str) -> Result<CommandResult, SimError> {
        let width = terminals_of(
            &self
                .sim
                .component(id)
                .ok_or_else(|| SimError::UnknownComponent(id.clone()))?
                .kind,
        )
        .first()
        .map_or(1, |t| t.width);
        let Some(value) = parse_literal(text, width) else {
            return Ok(CommandResult::Output(format!(
                "Invalid value '{text}' for a {width}-bit input"
            )));
        };
        self.sim.set_input_value(id, value)?;
        Ok(CommandResult::Output(format!(
            "{id} = {}",
            format_value(value, width, self.format)
        )))
    }

    fn cmd_toggle(&mut self, id: &ComponentId) -> Result<CommandResult, SimError> {
        let on = self.sim.toggle_switch(id)?;
        Ok(CommandResult::Output(format!(
            "{id} is {}",
            if on { "on" } else { "off" }
        )))
    }

    fn cmd_components(&self) -> CommandResult {
        let components = self.sim.components();
        if components.is_empty() {
            return CommandResult::Output("No components".to_string());
        }
        let mut lines = vec![format!("{} component(s):", components.len())];
        for c in components {
            lines.push(format!("  {} [{}]", c.id, c.kind.name()));
        }
        CommandResult::Output(lines.join("\n"))
    }

    fn cmd_status(&self) -> CommandResult {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        let state = self.sim.state();
        let lines = [
            format!("Running: {}", yes_no(self.sim.is_running())),
            format!("Settled: {}", yes_no(self.sim.is_settled())),
            format!("Cycle: {}", self.sim.cycle()),
            format!("Last settle: {} pass(es)", self.sim.last_passes()),
            format!("Components: {}", self.sim.components().len()),
            format!("Wires: {}", self.sim.wires().len()),
            format!("Registers: {}", state.map_or(0, |s| s.register_count())),
            format!("Memories: {}", state.map_or(0, |s| s.memory_count())),
            format!("Format: {}", self.format),
        ];
        CommandResult::Output(lines.join("\n"))
    }
}

/// Parses a command string into a [`SimCommand`].
///
/// Supports full names and shortcuts: `s`=step, `i`=inspect, `t`=toggle,
/// `c`=components, `f`=format, `h`=help, `q`=quit.
pub fn parse_command(input: &str) -> Result<SimCommand, String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some((first, args)) = parts.split_first() else {
        return Err("empty command".to_string());
    };

    match first.to_lowercase().as_str() {
        "step" | "s" => {
            let count = match args.first() {
                Some(n) => n
                    .parse::<u64>()
                    .map_err(|_| format!("invalid step count '{n}'"))?,
                None => 1,
            };
            Ok(SimCommand::Step { count })
        }
        "inspect" | "i" => {
            let target = args
                .first()
                .ok_or("inspect requires a component (e.g., 'inspect 3' or 'inspect 3.out')")?;
            let (id, terminal) = match target.split_once('.') {
                Some((id, terminal)) => (id, Some(terminal.to_string())),
                None => (*target, None),
            };
            Ok(SimCommand::Inspect {
                id: ComponentId::from(id),
                terminal,
            })
        }
        "set" => match args {
            [id, value] => Ok(SimCommand::Set {
                id: ComponentId::from(*id),
                value: value.to_string(),
            }),
            _ => Err("set requires a component and a value (e.g., 'set 2 0x1F')".to_string()),
        },
        "toggle" | "t" => {
            let id = args.first().ok_or("toggle requires a switch component")?;
            Ok(SimCommand::Toggle {
                id: ComponentId::from(*id),
            })
        }
        "format" | "f" => {
            let name = args.first().ok_or("format requires bin, dec or hex")?;
            let format = name
                .parse::<DisplayFormat>()
                .map_err(|e| e.to_string())?;
            Ok(SimCommand::Format { format })
        }
        "components" | "c" => Ok(SimCommand::Components),
        "status" => Ok(SimCommand::Status),
        "help" | "h" => Ok(SimCommand::Help),
        "quit" | "q" | "exit" => Ok(SimCommand::Quit),
        _ => Err(format!("unknown command: '{first}'")),
    }
}

/// Parses `0x..` as hex, `0b..` as binary, anything else as decimal.
fn parse_literal(text: &str, width: u32) -> Option<Value> {
    if let Some(bits) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        parse_value(bits, DisplayFormat::Bin, width)
    } else if text.starts_with("0x") || text.starts_with("0X") {
        parse_value(text, DisplayFormat::Hex, width)
    } else {
        parse_value(text, DisplayFormat::Dec, width)
    }
}

fn help_text() -> String {
    "\
Commands:
  step [n]                (s)  Apply n clock edges (default 1)
  inspect <id>[.<term>]   (i)  Show terminal values
  set <id> <value>             Set an input (0x.., 0b.. or decimal)
  toggle <id>             (t)  Flip a switch
  format <bin|dec|hex>    (f)  Change the display format
  components              (c)  List all components
  status                       Show simulation status
  help                    (h)  Show this help
  quit                    (q)  Exit interactive mode"
        .to_string()
}
