//! Parser for the line-oriented trigger configuration language.
//!
//! ```text
//! # comment
//! t1 TITLE network
//! t2 SUBJECT computing
//! t3 PHRASE deep learning
//! t4 OR t2 t3
//! ADD t1 t4
//! ```
//!
//! Every definition line names exactly one new trigger and may only refer to
//! names defined on earlier lines. `ADD` lines select the active triggers.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::{ActiveTrigger, Field, Trigger};

/// Trigger configuration errors. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("line {line}: unknown trigger type '{kind}'")]
    UnknownType { line: usize, kind: String },

    #[error("line {line}: trigger '{name}' is not defined")]
    UndefinedReference { line: usize, name: String },

    #[error("line {line}: trigger '{name}' is already defined")]
    DuplicateName { line: usize, name: String },
}

impl TriggerError {
    pub fn line(&self) -> usize {
        match self {
            TriggerError::Syntax { line, .. }
            | TriggerError::UnknownType { line, .. }
            | TriggerError::UndefinedReference { line, .. }
            | TriggerError::DuplicateName { line, .. } => *line,
        }
    }
}

type Result<T> = std::result::Result<T, TriggerError>;

const ACTIVATE: &str = "ADD";

/// Owns every named trigger while a configuration is being parsed.
#[derive(Default)]
struct Registry {
    triggers: HashMap<String, Arc<Trigger>>,
}

impl Registry {
    fn resolve(&self, name: &str, line: usize) -> Result<Arc<Trigger>> {
        self.triggers
            .get(name)
            .cloned()
            .ok_or_else(|| TriggerError::UndefinedReference {
                line,
                name: name.to_string(),
            })
    }

    fn define(&mut self, name: &str, trigger: Trigger, line: usize) -> Result<()> {
        if self.triggers.contains_key(name) {
            return Err(TriggerError::DuplicateName {
                line,
                name: name.to_string(),
            });
        }
        self.triggers.insert(name.to_string(), Arc::new(trigger));
        Ok(())
    }

    fn len(&self) -> usize {
        self.triggers.len()
    }
}

/// Parse a trigger configuration and return the active triggers in `ADD`
/// order.
///
/// Parsing stops at the first error; no partial list is returned.
pub fn load_triggers(config: &str) -> Result<Vec<ActiveTrigger>> {
    let mut registry = Registry::default();
    let mut active = Vec::new();

    for (index, raw) in config.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim_end();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = text.split(' ').filter(|t| !t.is_empty()).collect();
        match tokens.as_slice() {
            [] => continue,
            [ACTIVATE, names @ ..] => {
                if names.is_empty() {
                    return Err(TriggerError::Syntax {
                        line,
                        reason: format!("{} expects at least one trigger name", ACTIVATE),
                    });
                }
                for name in names {
                    active.push(ActiveTrigger::new(*name, registry.resolve(name, line)?));
                }
            }
            [name] => {
                return Err(TriggerError::Syntax {
                    line,
                    reason: format!("missing trigger type after '{}'", name),
                });
            }
            [name, kind, params @ ..] => {
                let trigger = build(&registry, kind, params, line)?;
                tracing::debug!("line {}: defined {} = {}", line, name, trigger);
                registry.define(name, trigger, line)?;
            }
        }
    }

    tracing::info!(
        "Loaded {} trigger definitions, {} active",
        registry.len(),
        active.len()
    );
    Ok(active)
}

fn build(registry: &Registry, kind: &str, params: &[&str], line: usize) -> Result<Trigger> {
    match kind {
        "TITLE" => {
            let [word] = arity::<1>(kind, params, line)?;
            Ok(Trigger::word(Field::Title, word))
        }
        "SUBJECT" => {
            let [word] = arity::<1>(kind, params, line)?;
            Ok(Trigger::word(Field::Subject, word))
        }
        "SUMMARY" => {
            let [word] = arity::<1>(kind, params, line)?;
            Ok(Trigger::word(Field::Summary, word))
        }
        "PHRASE" => {
            if params.is_empty() {
                return Err(TriggerError::Syntax {
                    line,
                    reason: "PHRASE expects at least one word".to_string(),
                });
            }
            Ok(Trigger::phrase(params.join(" ")))
        }
        "NOT" => {
            let [inner] = arity::<1>(kind, params, line)?;
            Ok(Trigger::not(registry.resolve(inner, line)?))
        }
        "AND" => {
            let [left, right] = arity::<2>(kind, params, line)?;
            Ok(Trigger::and(
                registry.resolve(left, line)?,
                registry.resolve(right, line)?,
            ))
        }
        "OR" => {
            let [left, right] = arity::<2>(kind, params, line)?;
            Ok(Trigger::or(
                registry.resolve(left, line)?,
                registry.resolve(right, line)?,
            ))
        }
        other => Err(TriggerError::UnknownType {
            line,
            kind: other.to_string(),
        }),
    }
}

fn arity<'a, const N: usize>(kind: &str, params: &[&'a str], line: usize) -> Result<[&'a str; N]> {
    <[&'a str; N]>::try_from(params).map_err(|_| TriggerError::Syntax {
        line,
        reason: format!(
            "{} expects {} parameter{}, found {}",
            kind,
            N,
            if N == 1 { "" } else { "s" },
            params.len()
        ),
    })
}
