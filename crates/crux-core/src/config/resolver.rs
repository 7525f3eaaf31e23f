//! Variable and command substitution for configuration values
//!
//! Provider API keys, endpoints and headers may reference the environment
//! (`$VAR`, `${VAR}`) or the output of a command (`$(command)`). Values are
//! kept unresolved in the configuration and resolved only when needed, so
//! secrets never land on disk in resolved form.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::env::Environment;
use super::shell::{CommandExecutor, SystemShell};
use crate::error::CruxResult;

/// Upper bound for a single `$(...)` substitution
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Grammar and lookup failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("'$' alone is not a valid reference")]
    LoneDollar,

    #[error("unmatched '$(' at position {position}")]
    UnterminatedCommand { position: usize },

    #[error("unmatched '${{' at position {position}")]
    UnterminatedBrace { position: usize },

    #[error("invalid variable name starting with '{found}' at position {position}")]
    InvalidVariableStart { position: usize, found: String },

    #[error("environment variable \"{name}\" not set")]
    UnsetVariable { name: String },

    #[error("command substitution $({command}) failed: {reason}")]
    CommandFailed { command: String, reason: String },
}

/// Resolves configuration values that may contain references
#[async_trait]
pub trait VariableResolver: Send + Sync {
    async fn resolve_value(&self, input: &str) -> CruxResult<String>;
}

/// Full resolver supporting `$(command)`, `$VAR` and `${VAR}`
pub struct ShellVariableResolver {
    env: Environment,
    executor: Arc<dyn CommandExecutor>,
    command_timeout: Duration,
}

impl ShellVariableResolver {
    pub fn new(env: Environment, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            env,
            executor,
            command_timeout: COMMAND_TIMEOUT,
        }
    }

    /// Resolver backed by the platform shell
    pub fn with_system_shell(env: Environment) -> Self {
        Self::new(env, Arc::new(SystemShell::new()))
    }

    pub fn with_command_timeout(mut self, limit: Duration) -> Self {
        self.command_timeout = limit;
        self
    }

    async fn substitute_commands(&self, input: &str) -> Result<String, ResolveError> {
        let mut result = input.to_string();
        let mut cursor = 0;

        while let Some(offset) = result[cursor..].find("$(") {
            let start = cursor + offset;
            let end = matching_paren(&result, start + 2)
                .ok_or(ResolveError::UnterminatedCommand { position: start })?;
            let command = result[start + 2..end].to_string();

            let output = self
                .executor
                .exec(&command, self.command_timeout)
                .await
                .map_err(|e| ResolveError::CommandFailed {
                    command: command.clone(),
                    reason: e.to_string(),
                })?;
            let replacement = output.stdout.trim();

            result.replace_range(start..=end, replacement);
            cursor = start + replacement.len();
        }

        Ok(result)
    }

    fn substitute_variables(&self, input: &str) -> Result<String, ResolveError> {
        let mut result = input.to_string();
        let mut cursor = 0;

        while let Some(offset) = result[cursor..].find('$') {
            let start = cursor + offset;
            let (name, span_end) = parse_reference(&result, start)?;
            let value = self
                .env
                .get(name)
                .ok_or_else(|| ResolveError::UnsetVariable {
                    name: name.to_string(),
                })?
                .to_string();

            result.replace_range(start..span_end, &value);
            cursor = start + value.len();
        }

        Ok(result)
    }
}

#[async_trait]
impl VariableResolver for ShellVariableResolver {
    async fn resolve_value(&self, input: &str) -> CruxResult<String> {
        if !input.contains('$') {
            return Ok(input.to_string());
        }
        if input == "$" {
            return Err(ResolveError::LoneDollar.into());
        }

        let commands_done = self.substitute_commands(input).await?;
        let resolved = self.substitute_variables(&commands_done)?;
        debug!("Resolved configuration value with substitutions");
        Ok(resolved)
    }
}

/// Resolver that only understands a value made entirely of `$NAME`.
///
/// Used where spawning subprocesses is not acceptable.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariableResolver {
    env: Environment,
}

impl EnvironmentVariableResolver {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }
}

#[async_trait]
impl VariableResolver for EnvironmentVariableResolver {
    async fn resolve_value(&self, input: &str) -> CruxResult<String> {
        let Some(name) = input.strip_prefix('$') else {
            return Ok(input.to_string());
        };
        if !is_identifier(name) {
            return Ok(input.to_string());
        }
        self.env
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| {
                ResolveError::UnsetVariable {
                    name: name.to_string(),
                }
                .into()
            })
    }
}

/// Index of the `)` closing a `$(` whose body starts at `body_start`
fn matching_paren(s: &str, body_start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, b) in s.as_bytes()[body_start..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(body_start + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `$NAME` or `${NAME}` at `start`, returning the name and the end of the span
fn parse_reference(s: &str, start: usize) -> Result<(&str, usize), ResolveError> {
    let rest = &s[start + 1..];

    if let Some(braced) = rest.strip_prefix('{') {
        let close = braced
            .find('}')
            .ok_or(ResolveError::UnterminatedBrace { position: start })?;
        let name = &braced[..close];
        if !is_identifier(name) {
            return Err(ResolveError::InvalidVariableStart {
                position: start + 2,
                found: name.chars().next().map(String::from).unwrap_or_default(),
            });
        }
        // '$' + '{' + name + '}'
        return Ok((name, start + 2 + close + 1));
    }

    match rest.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            let len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            Ok((&rest[..len], start + 1 + len))
        }
        Some(c) => Err(ResolveError::InvalidVariableStart {
            position: start + 1,
            found: c.to_string(),
        }),
        None => Err(ResolveError::InvalidVariableStart {
            position: start + 1,
            found: "end of input".to_string(),
        }),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
