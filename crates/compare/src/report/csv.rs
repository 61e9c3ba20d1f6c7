use serde_json::Value;
use std::fmt::Display;

const SEPARATOR: char = ',';

/// Line-oriented CSV builder
#[derive(Debug, Default)]
pub struct Csv {
    out: String,
    line: Vec<String>,
}

impl Csv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one cell to the current line
    pub fn add(&mut self, value: impl Display) -> &mut Self {
        self.line.push(escape(&value.to_string()));
        self
    }

    /// Append a JSON cell; strings are written raw, null as empty
    pub fn add_value(&mut self, value: Option<&Value>) -> &mut Self {
        match value {
            None | Some(Value::Null) => self.add(""),
            Some(Value::String(s)) => self.add(s),
            Some(other) => self.add(other),
        }
    }

    /// Finish the current line (an empty line when no cells were added)
    pub fn add_line(&mut self) -> &mut Self {
        let sep = SEPARATOR.to_string();
        self.out.push_str(&self.line.join(&sep));
        self.out.push('\n');
        self.line.clear();
        self
    }

    pub fn result(mut self) -> String {
        if !self.line.is_empty() {
            self.add_line();
        }
        self.out
    }
}

fn escape(cell: &str) -> String {
    if cell.contains([SEPARATOR, '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
