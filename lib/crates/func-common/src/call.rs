//! Arguments as they cross the dispatch boundary.
//!
//! A call carries positional values and keyword values. Handlers never index
//! into them directly: they declare their parameters through [`ArgReader`],
//! which binds positionals first, falls back to keywords, applies defaults,
//! and rejects anything left over.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::OperationFailure;

/// One inbound call: an operation name plus its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub operation: String,
    #[serde(flatten)]
    pub args: CallArgs,
}

impl Call {
    pub fn new(operation: impl Into<String>, args: CallArgs) -> Self {
        Self {
            operation: operation.into(),
            args,
        }
    }
}

/// Positional and keyword arguments of a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl CallArgs {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            args: values.into_iter().map(Into::into).collect(),
            kwargs: Map::new(),
        }
    }

    #[must_use]
    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn reader(&self) -> ArgReader<'_> {
        ArgReader {
            call: self,
            next_positional: 0,
            bound: Vec::new(),
        }
    }
}

/// Binds declared parameters to a [`CallArgs`] in declaration order.
pub struct ArgReader<'a> {
    call: &'a CallArgs,
    next_positional: usize,
    bound: Vec<&'static str>,
}

impl<'a> ArgReader<'a> {
    fn take(&mut self, name: &'static str) -> Result<Option<&'a Value>, OperationFailure> {
        let positional = self.call.args.get(self.next_positional);
        let keyword = self.call.kwargs.get(name);
        self.bound.push(name);
        match (positional, keyword) {
            (Some(_), Some(_)) => Err(OperationFailure::invalid_arguments(format!(
                "got multiple values for argument '{name}'"
            ))),
            (Some(value), None) => {
                self.next_positional += 1;
                Ok(Some(value))
            }
            (None, keyword) => Ok(keyword),
        }
    }

    /// Required string parameter.
    pub fn string(&mut self, name: &'static str) -> Result<String, OperationFailure> {
        match self.take(name)? {
            Some(value) => as_string(name, value),
            None => Err(OperationFailure::invalid_arguments(format!(
                "missing required argument '{name}'"
            ))),
        }
    }

    /// Optional string parameter with a default.
    pub fn string_or(
        &mut self,
        name: &'static str,
        default: &str,
    ) -> Result<String, OperationFailure> {
        match self.take(name)? {
            Some(value) => as_string(name, value),
            None => Ok(default.to_string()),
        }
    }

    /// Reject surplus positionals and keywords that matched no parameter.
    pub fn finish(self) -> Result<(), OperationFailure> {
        let given = self.call.args.len();
        if given > self.next_positional {
            return Err(OperationFailure::invalid_arguments(format!(
                "takes {} positional argument(s) but {given} were given",
                self.bound.len()
            )));
        }
        if let Some(extra) = self
            .call
            .kwargs
            .keys()
            .find(|key| !self.bound.contains(&key.as_str()))
        {
            return Err(OperationFailure::invalid_arguments(format!(
                "unexpected keyword argument '{extra}'"
            )));
        }
        Ok(())
    }
}

fn as_string(name: &str, value: &Value) -> Result<String, OperationFailure> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        OperationFailure::invalid_arguments(format!("argument '{name}' must be a string"))
    })
}
