use crate::commands::CommandError;

/// Parsed arguments of EVAL and EVALSHA: `script numkeys key... arg...`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalArguments {
    /// Script source for EVAL, SHA1 digest for EVALSHA.
    pub script: String,
    pub keys: Vec<String>,
    pub args: Vec<String>,
}

impl EvalArguments {
    pub fn parse(command: &str, arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongArity(command.to_lowercase()));
        }

        let numkeys = arguments[1]
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;

        if numkeys < 0 {
            return Err(CommandError::NegativeNumKeys);
        }

        let rest = &arguments[2..];
        let numkeys = numkeys as usize;

        if numkeys > rest.len() {
            return Err(CommandError::InvalidNumKeys);
        }

        Ok(Self {
            script: arguments[0].clone(),
            keys: rest[..numkeys].to_vec(),
            args: rest[numkeys..].to_vec(),
        })
    }

    pub fn to_arguments(&self) -> Vec<String> {
        let mut arguments = Vec::with_capacity(2 + self.keys.len() + self.args.len());
        arguments.push(self.script.clone());
        arguments.push(self.keys.len().to_string());
        arguments.extend(self.keys.iter().cloned());
        arguments.extend(self.args.iter().cloned());
        arguments
    }
}
