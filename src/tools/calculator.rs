//! Calculator tool backed by `meval` expression evaluation.

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{BotError, Result};

use super::utils::require_text;
use super::{ToolHandler, ToolKind};

/// Results with a magnitude below this print without a fractional part when whole.
const MAX_EXACT_INTEGER: f64 = 1e15;

#[derive(Debug, Deserialize)]
struct CalculatorArgs {
    expression: String,
}

/// Evaluates arithmetic expressions locally.
#[derive(Debug, Default)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }
}

/// Evaluate an expression such as `2^10 + sqrt(16)`.
pub fn evaluate(expression: &str) -> Result<String> {
    let value = meval::eval_str(expression)
        .map_err(|e| BotError::ToolExecution(format!("Could not evaluate '{expression}': {e}")))?;

    if !value.is_finite() {
        return Err(BotError::ToolExecution(format!(
            "'{expression}' does not evaluate to a finite number"
        )));
    }

    Ok(format_number(value))
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[async_trait]
impl ToolHandler for Calculator {
    fn kind(&self) -> ToolKind {
        ToolKind::Calculator
    }

    fn description(&self) -> &'static str {
        "Evaluate a math expression. Supports + - * / ^ %, parentheses, \
        and functions such as sqrt, abs, sin, cos, ln, exp, plus the constants pi and e."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The math expression to calculate, e.g. '(3 + 4) * 2^3'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let args: CalculatorArgs = serde_json::from_str(arguments)?;
        let expression = require_text(&args.expression, "expression")?;

        debug!("Evaluating expression: {expression}");
        let result = evaluate(expression)?;

        Ok(format!("{expression} = {result}"))
    }
}
