use std::path::Path;

use minijinja::{Environment, path_loader};
use minijinja::value::Value;
use serde::Serialize;

use crate::error::Result;
use crate::templating::{Engine, EngineInit};
use crate::value::Dict;

#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl EngineInit for MiniJinjaEngine {
    type Engine = Self;

    fn init<G: Serialize>(root: Option<&Path>, globals: G) -> Self::Engine {
        let mut env = Environment::new();
        if let Some(root) = root {
            env.set_loader(path_loader(root));
        }

        env.add_global("G", Value::from_serializable(&globals));
        env.add_function("now", ext::now);
        env.add_function("raise", ext::raise);
        env.add_filter("date", ext::date);
        env.add_filter("split", ext::split);
        env.add_filter("json", ext::json);
        MiniJinjaEngine { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        MiniJinjaEngine::init(None, ())
    }
}

impl Engine for MiniJinjaEngine {
    fn render_str(
        &self,
        name: Option<&str>,
        template_str: &str,
        context: &Dict,
    ) -> Result<String> {
        let context = Value::from_serializable(context);
        let string = match name {
            Some(name) => self.env.render_named_str(name, template_str, context)?,
            None => self.env.render_str(template_str, context)?,
        };

        Ok(string)
    }
}

mod ext {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    use minijinja::{value::Value, Error, ErrorKind};

    /// Aborts rendering with `message`.
    pub fn raise(message: String) -> Result<Value, Error> {
        Err(Error::new(ErrorKind::InvalidOperation, message))
    }

    pub fn json(value: Value) -> Result<Value, Error> {
        serde_json::to_string(&value)
            .map(Value::from_safe_string)
            .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
    }

    pub fn date(value: Value, fmt: &str) -> Result<Value, Error> {
        if let Ok(ts) = i64::try_from(value.clone()) {
            let datetime = DateTime::<Utc>::from_timestamp(ts, 0)
                .ok_or_else(|| Error::new(
                    ErrorKind::InvalidOperation,
                    "invalid timestamp provided to `date`"
                ))?;

            return Ok(datetime.format(fmt).to_string().into());
        }

        let kind = value.kind();
        let attr = value.get_attr("$__toml_private_datetime");
        let string = attr.as_ref()
            .ok()
            .and_then(|v| v.as_str())
            .or_else(|| value.as_str())
            .ok_or_else(|| Error::new(
                ErrorKind::InvalidOperation,
                format!("`date` must be applied to a string or integer, found {kind}")
            ))?;

        let datetime = string.parse::<NaiveDate>().map(|d| d.format(fmt).to_string())
            .or_else(|_| string.parse::<NaiveTime>().map(|t| t.format(fmt).to_string()))
            .or_else(|_| string.parse::<NaiveDateTime>().map(|dt| dt.format(fmt).to_string()))
            .or_else(|_| string.parse::<DateTime<Utc>>().map(|dt| dt.format(fmt).to_string()))
            .map_err(|e| Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to parse {string}: {e}")
            ))?;

        Ok(datetime.into())
    }

    pub fn split(value: &str, pat: &str, n: Option<usize>) -> Result<Value, Error> {
        match n {
            Some(n) => Ok(value.split(pat).nth(n).map(Value::from).unwrap_or(Value::UNDEFINED)),
            None => Ok(value.split(pat).map(Value::from).collect()),
        }
    }

    pub fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}
