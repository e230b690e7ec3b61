use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Lit(String),
	Var(String),
}

/// A line template with `<var>` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
	tokens: Vec<Token>,
}

impl Template {
	pub fn new(template: &str) -> Self {
		let mut tokens = Vec::with_capacity(8);
		let mut rest = template;

		while !rest.is_empty() {
			let Some((lit, after)) = rest.split_once('<') else {
				tokens.push(Token::Lit(rest.to_string()));
				break;
			};
			// An unclosed `<` is literal text
			let Some((var, after)) = after.split_once('>') else {
				tokens.push(Token::Lit(rest.to_string()));
				break;
			};

			if !lit.is_empty() {
				tokens.push(Token::Lit(lit.to_string()));
			}
			tokens.push(Token::Var(var.to_string()));
			rest = after;
		}

		Self { tokens }
	}

	pub fn vars(&self) -> impl Iterator<Item = &'_ str> {
		self.tokens.iter().filter_map(|t| match t {
			Token::Var(s) => Some(s.as_str()),
			Token::Lit(_) => None,
		})
	}

	pub fn expand<F>(&self, mut f: F) -> String
	where
		F: FnMut(&mut String, &str),
	{
		let mut buf = String::new();
		for t in &self.tokens {
			match t {
				Token::Lit(s) => buf.push_str(s),
				Token::Var(var) => f(&mut buf, var),
			}
		}

		buf
	}
}

/// Formats whole seconds as `m:ss`.
pub fn minutes(seconds: u32) -> String {
	let mut buf = String::with_capacity(5);
	let _ = write!(buf, "{}:{:02}", seconds / 60, seconds % 60);
	buf
}
