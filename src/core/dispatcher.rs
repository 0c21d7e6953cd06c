use crate::utils::error::Result;
use std::collections::BTreeMap;

/// A command handler. It gets the session and the already arity-checked
/// arguments; `Ok` text becomes a success response, `Err` a failure.
pub type Handler<S> = fn(&mut S, &[&str]) -> Result<String>;

pub struct CommandSpec<S> {
    pub arity: usize,
    pub usage: &'static str,
    pub handler: Handler<S>,
}

// 手動實作：fn 指標可複製，不需要 S: Clone
impl<S> Clone for CommandSpec<S> {
    fn clone(&self) -> Self {
        Self {
            arity: self.arity,
            usage: self.usage,
            handler: self.handler,
        }
    }
}

pub enum Lookup<S> {
    Found(CommandSpec<S>),
    Unknown,
    WrongArity(&'static str),
}

/// Maps GTP command names to handlers. Names iterate in sorted order.
pub struct CommandTable<S> {
    commands: BTreeMap<String, CommandSpec<S>>,
}

impl<S> CommandTable<S> {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Adds or replaces a command.
    pub fn register(&mut self, name: &str, arity: usize, usage: &'static str, handler: Handler<S>) {
        self.commands.insert(
            name.to_string(),
            CommandSpec {
                arity,
                usage,
                handler,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn lookup(&self, name: &str, arg_count: usize) -> Lookup<S> {
        match self.commands.get(name) {
            None => Lookup::Unknown,
            Some(spec) if spec.arity != arg_count => Lookup::WrongArity(spec.usage),
            Some(spec) => Lookup::Found(spec.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<S> Default for CommandTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    fn bump(counter: &mut Counter, args: &[&str]) -> Result<String> {
        counter.0 += args.len() as u32;
        Ok(counter.0.to_string())
    }

    #[test]
    fn test_lookup_checks_arity() {
        let mut table: CommandTable<Counter> = CommandTable::new();
        table.register("bump", 2, "Usage: bump x y", bump);

        assert!(matches!(table.lookup("nope", 0), Lookup::Unknown));
        assert!(matches!(table.lookup("bump", 1), Lookup::WrongArity("Usage: bump x y")));

        let mut counter = Counter(0);
        match table.lookup("bump", 2) {
            Lookup::Found(spec) => {
                assert_eq!((spec.handler)(&mut counter, &["a", "b"]).unwrap(), "2");
            }
            _ => panic!("bump should be found"),
        }
    }

    #[test]
    fn test_names_are_sorted() {
        let mut table: CommandTable<Counter> = CommandTable::new();
        table.register("version", 0, "", bump);
        table.register("boardsize", 1, "", bump);
        table.register("name", 0, "", bump);
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["boardsize", "name", "version"]);
        assert_eq!(table.len(), 3);
    }
}
