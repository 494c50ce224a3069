//! Task ID collection from arguments and piped stdin

use std::io::{BufRead, IsTerminal};

/// Read whitespace separated values from a reader, skipping blanks
pub fn read_values<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line?;
        values.extend(line.split_whitespace().map(str::to_string));
    }
    Ok(values)
}

/// Values piped into stdin; empty when stdin is a terminal
pub fn read_values_from_pipe() -> std::io::Result<Vec<String>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    read_values(stdin.lock())
}

/// Positional IDs first, then piped ones, in order
pub fn collect_task_ids(args: Vec<String>, piped: Vec<String>) -> Vec<String> {
    args.into_iter()
        .chain(piped)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_values() {
        let input = Cursor::new("ServerTasks-1\n\n  ServerTasks-2 ServerTasks-3\r\n");
        let values = read_values(input).unwrap();
        assert_eq!(values, vec!["ServerTasks-1", "ServerTasks-2", "ServerTasks-3"]);
    }

    #[test]
    fn test_collect_keeps_argument_order() {
        let ids = collect_task_ids(
            vec!["ServerTasks-9".to_string(), " ".to_string()],
            vec!["ServerTasks-1".to_string()],
        );
        assert_eq!(ids, vec!["ServerTasks-9", "ServerTasks-1"]);
    }
}
