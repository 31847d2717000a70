use std::io;
use std::fmt::Debug;

use crate::error::Result;
use crate::value::Value;

/// Somewhere a rendered [`Value`] can be written to.
pub trait Sink: Debug {
    fn write<V: Into<Value> + 'static>(&self, value: V) -> Result<()> {
        self.write_value(value.into())
    }

    fn write_value(&self, value: Value) -> Result<()>;
}

/// Writes scalars as text. Arrays are written element by element; a
/// dictionary is written as JSON.
fn write_value(to: &mut dyn io::Write, value: &Value) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Bool(b) => Ok(write!(to, "{b}")?),
        Value::Num(n) => match n.to_i128() {
            Some(v) => Ok(write!(to, "{v}")?),
            None => Ok(write!(to, "{}", n.to_f64())?),
        },
        Value::String(s) => Ok(to.write_all(s.as_bytes())?),
        Value::Array(array) => array.iter().try_for_each(|v| write_value(to, v)),
        Value::Dict(_) => Ok(serde_json::to_writer_pretty(to, value)?),
    }
}

impl Sink for io::Stdout {
    fn write_value(&self, value: Value) -> Result<()> {
        let mut out = self.lock();
        write_value(&mut out, &value)?;
        Ok(io::Write::flush(&mut out)?)
    }
}
