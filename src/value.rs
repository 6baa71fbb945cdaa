use std::hash::{Hash, Hasher};

/// A dynamically-typed argument value.
///
/// Loaders are keyed by tuples of `Arg`s, one per wrapped-function parameter.
/// `Absent` is the canonical padding marker: a call supplying fewer arguments
/// than the loader's arity is padded with `Absent`, so a short call and an
/// explicitly-padded call address the same cache entry.
///
/// Records keep their field pairs in insertion order, so two records built
/// with the same fields in different order are *not* equal. Enabling
/// structural hashing on the loader canonicalizes them into equal keys.
#[derive(Debug, Clone)]
pub enum Arg {
	/// Padding marker for missing trailing arguments.
	Absent,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	Seq(Vec<Arg>),
	/// Field pairs in insertion order.
	Record(Vec<(String, Arg)>),
}

// Floats compare by bit pattern so Arg can key a HashMap. NaN equals itself
// here, which is what a cache key needs.
impl PartialEq for Arg {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Arg::Absent, Arg::Absent) => true,
			(Arg::Bool(a), Arg::Bool(b)) => a == b,
			(Arg::Int(a), Arg::Int(b)) => a == b,
			(Arg::Float(a), Arg::Float(b)) => a.to_bits() == b.to_bits(),
			(Arg::Str(a), Arg::Str(b)) => a == b,
			(Arg::Seq(a), Arg::Seq(b)) => a == b,
			(Arg::Record(a), Arg::Record(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for Arg {}

impl Hash for Arg {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			Arg::Absent => {}
			Arg::Bool(b) => b.hash(state),
			Arg::Int(i) => i.hash(state),
			Arg::Float(f) => f.to_bits().hash(state),
			Arg::Str(s) => s.hash(state),
			Arg::Seq(items) => items.hash(state),
			Arg::Record(fields) => fields.hash(state),
		}
	}
}

impl Arg {
	/// Build a record from field pairs, preserving the given order.
	pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Arg)>) -> Self {
		Arg::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

impl From<bool> for Arg {
	fn from(v: bool) -> Self {
		Arg::Bool(v)
	}
}

impl From<i64> for Arg {
	fn from(v: i64) -> Self {
		Arg::Int(v)
	}
}

impl From<i32> for Arg {
	fn from(v: i32) -> Self {
		Arg::Int(v as i64)
	}
}

impl From<f64> for Arg {
	fn from(v: f64) -> Self {
		Arg::Float(v)
	}
}

impl From<&str> for Arg {
	fn from(v: &str) -> Self {
		Arg::Str(v.to_string())
	}
}

impl From<String> for Arg {
	fn from(v: String) -> Self {
		Arg::Str(v)
	}
}

impl From<Vec<Arg>> for Arg {
	fn from(v: Vec<Arg>) -> Self {
		Arg::Seq(v)
	}
}
