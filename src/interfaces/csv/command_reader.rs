use crate::error::{LifecycleError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    CreateOrder,
    EditOrder,
    Pay,
    Confirm,
    Webhook,
    Transition,
    Submit,
    Complete,
    Refund,
}

/// One line of a lifecycle script.
///
/// `ref` names the order or payment a line creates; `target` names the one it
/// acts on. Names are local to the script and mapped to generated ids by the
/// runner. Unused columns may be left empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub command: CommandType,
    #[serde(rename = "ref", default)]
    pub label: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub delivery_url: Option<String>,
}

/// Reads lifecycle commands from a CSV source.
///
/// Whitespace is trimmed and short records are accepted, so trailing empty
/// columns can be omitted.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes commands, one `Result` per record.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LifecycleError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "command,ref,target,title,topic,pages,urgency,requirements,provider,status,delivery_url";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\ncreate_order, o1, , Essay, History, 10, urgent, , , , \npay, p1, o1, , , , , , stripe, , "
        );
        let reader = CommandReader::new(data.as_bytes());
        let commands: Vec<Command> = reader.commands().collect::<Result<_>>().unwrap();

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].command, CommandType::CreateOrder);
        assert_eq!(commands[0].label.as_deref(), Some("o1"));
        assert_eq!(commands[0].pages.as_deref(), Some("10"));
        assert_eq!(commands[0].requirements, None);
        assert_eq!(commands[1].command, CommandType::Pay);
        assert_eq!(commands[1].target.as_deref(), Some("o1"));
        assert_eq!(commands[1].provider.as_deref(), Some("stripe"));
    }

    #[test]
    fn test_reader_short_records() {
        let data = format!("{HEADER}\ncomplete, , o1");
        let reader = CommandReader::new(data.as_bytes());
        let commands: Vec<Result<Command>> = reader.commands().collect();

        let command = commands[0].as_ref().unwrap();
        assert_eq!(command.command, CommandType::Complete);
        assert_eq!(command.target.as_deref(), Some("o1"));
        assert_eq!(command.delivery_url, None);
    }

    #[test]
    fn test_reader_unknown_command() {
        let data = format!("{HEADER}\nship, , o1");
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        assert!(matches!(results[0], Err(LifecycleError::Csv(_))));
    }
}
