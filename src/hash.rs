use serde_json::{Map, Value};

use crate::value::Arg;

/// Canonicalize one argument into a stable comparison key.
///
/// Structurally-equal composites map to identical string keys:
/// - sequences hash each element and serialize as a JSON array;
/// - records hash each field value, re-emit fields sorted by name, and
///   serialize as a JSON object, so declaration order never affects the key;
/// - primitives pass through unchanged.
///
/// The input is never mutated; hashing builds a fresh canonical form.
pub fn hash_arg(arg: &Arg) -> Arg {
	match arg {
		Arg::Seq(_) | Arg::Record(_) => Arg::Str(canonical(arg).to_string()),
		primitive => primitive.clone(),
	}
}

/// JSON form of an argument with composite children collapsed to their
/// canonical string, mirroring the recursive hash-then-serialize rule.
fn canonical(arg: &Arg) -> Value {
	match arg {
		Arg::Absent => Value::Null,
		Arg::Bool(b) => Value::Bool(*b),
		Arg::Int(i) => Value::from(*i),
		// Non-finite floats have no JSON form; they collapse to null.
		Arg::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
		Arg::Str(s) => Value::String(s.clone()),
		Arg::Seq(items) => Value::Array(items.iter().map(child).collect()),
		Arg::Record(fields) => {
			let mut sorted: Vec<&(String, Arg)> = fields.iter().collect();
			sorted.sort_by(|a, b| a.0.cmp(&b.0));

			let mut map = Map::new();
			for (name, value) in sorted {
				map.insert(name.clone(), child(value));
			}
			Value::Object(map)
		}
	}
}

fn child(arg: &Arg) -> Value {
	match arg {
		Arg::Seq(_) | Arg::Record(_) => Value::String(canonical(arg).to_string()),
		primitive => canonical(primitive),
	}
}
