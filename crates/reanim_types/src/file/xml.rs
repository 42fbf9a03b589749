//! Minimal tag reader shared by both timeline formats.
//!
//! Supports exactly what the two formats need: elements, quoted attributes,
//! character data, CDATA sections, the five predefined entities and numeric
//! character references. Comments, processing instructions and `<!DOCTYPE>` are
//! skipped. Flat timeline documents have several top-level elements and no single
//! root, so [`parse`] always returns a synthetic root element with an empty name
//! that holds every top-level element.

use std::borrow::Cow;

use crate::error::{AnimError, Format};

/// A parsed element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
	name: String,
	attributes: Vec<(String, String)>,
	children: Vec<Element>,
	text: String,
	line: usize,
}

impl Element {
	fn new(name: &str, line: usize) -> Self {
		Self {
			name: name.to_string(),
			line,
			..Self::default()
		}
	}

	/// Tag name (empty for the synthetic document root).
	pub fn name(&self) -> &str {
		&self.name
	}

	/// 1-based line of the start tag.
	pub fn line(&self) -> usize {
		self.line
	}

	/// Value of attribute `name`.
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// All attributes in document order.
	pub fn attributes(&self) -> &[(String, String)] {
		&self.attributes
	}

	/// Child elements in document order.
	pub fn children(&self) -> &[Element] {
		&self.children
	}

	/// First child named `name`.
	pub fn child(&self, name: &str) -> Option<&Element> {
		self.children.iter().find(|child| child.name == name)
	}

	/// Every child named `name`.
	pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
		self.children.iter().filter(move |child| child.name == name)
	}

	/// Follows a path of child names, taking the first match at each step.
	pub fn descend(&self, path: &[&str]) -> Option<&Element> {
		path.iter().try_fold(self, |node, name| node.child(name))
	}

	/// Character data of the element with surrounding whitespace removed.
	pub fn text(&self) -> &str {
		self.text.trim()
	}

	/// Trimmed text of the first child named `name`.
	pub fn child_text(&self, name: &str) -> Option<&str> {
		self.child(name).map(Element::text)
	}
}

/// Parses `source` into a synthetic root element.
///
/// # Errors
///
/// Returns [`AnimError::Syntax`] for malformed markup (unterminated tags,
/// mismatched closing tags, unclosed elements) and [`AnimError::TooLarge`] once
/// more than `max_elements` elements have been read. Errors are tagged with
/// [`Format::Xml`]; callers re-tag them with [`AnimError::in_format`].
pub fn parse(source: &str, max_elements: usize) -> Result<Element, AnimError> {
	let mut reader = Reader {
		src: source,
		pos: 0,
		line: 1,
	};
	let mut stack = vec![Element::new("", 1)];
	let mut count = 0usize;

	while !reader.at_end() {
		if !reader.rest().starts_with('<') {
			let raw = reader.take_until_char('<');
			top(&mut stack).text.push_str(&decode_entities(raw));
			continue;
		}

		if reader.rest().starts_with("<!--") {
			reader.skip_past("-->", "unterminated comment")?;
		} else if reader.rest().starts_with("<![CDATA[") {
			reader.advance("<![CDATA[".len());
			let content = reader.take_past("]]>", "unterminated CDATA section")?;
			top(&mut stack).text.push_str(content);
		} else if reader.rest().starts_with("<?") {
			reader.skip_past("?>", "unterminated processing instruction")?;
		} else if reader.rest().starts_with("<!") {
			reader.skip_past(">", "unterminated declaration")?;
		} else if reader.rest().starts_with("</") {
			let line = reader.line;
			reader.advance(2);
			let name = reader.take_name();
			reader.skip_whitespace();
			if !reader.rest().starts_with('>') {
				return Err(AnimError::syntax(Format::Xml, line, format!("malformed closing tag </{name}")));
			}
			reader.advance(1);

			if stack.len() == 1 {
				return Err(AnimError::syntax(Format::Xml, line, format!("unexpected closing tag </{name}>")));
			}
			let element = stack.pop().unwrap_or_default();
			if element.name != name {
				return Err(AnimError::syntax(
					Format::Xml,
					line,
					format!("closing tag </{name}> does not match <{}> opened at line {}", element.name, element.line),
				));
			}
			top(&mut stack).children.push(element);
		} else {
			let (element, self_closing) = reader.read_start_tag()?;
			count += 1;
			if count > max_elements {
				return Err(AnimError::TooLarge {
					format: Format::Xml,
					limit: max_elements,
				});
			}
			if self_closing {
				top(&mut stack).children.push(element);
			} else {
				stack.push(element);
			}
		}
	}

	if stack.len() > 1 {
		let open = top(&mut stack);
		return Err(AnimError::syntax(
			Format::Xml,
			open.line,
			format!("element <{}> is never closed", open.name),
		));
	}
	Ok(stack.pop().unwrap_or_default())
}

fn top(stack: &mut [Element]) -> &mut Element {
	let last = stack.len() - 1;
	&mut stack[last]
}

struct Reader<'a> {
	src: &'a str,
	pos: usize,
	line: usize,
}

impl<'a> Reader<'a> {
	fn at_end(&self) -> bool {
		self.pos >= self.src.len()
	}

	fn rest(&self) -> &'a str {
		&self.src[self.pos..]
	}

	fn advance(&mut self, len: usize) {
		let end = (self.pos + len).min(self.src.len());
		self.line += self.src[self.pos..end].matches('\n').count();
		self.pos = end;
	}

	fn take_until_char(&mut self, stop: char) -> &'a str {
		let rest = self.rest();
		let len = rest.find(stop).unwrap_or(rest.len());
		self.advance(len);
		&rest[..len]
	}

	/// Returns the text before `terminator` and moves past the terminator.
	fn take_past(&mut self, terminator: &str, message: &str) -> Result<&'a str, AnimError> {
		let rest = self.rest();
		match rest.find(terminator) {
			Some(len) => {
				self.advance(len + terminator.len());
				Ok(&rest[..len])
			}
			None => Err(AnimError::syntax(Format::Xml, self.line, message)),
		}
	}

	fn skip_past(&mut self, terminator: &str, message: &str) -> Result<(), AnimError> {
		self.take_past(terminator, message).map(|_| ())
	}

	fn skip_whitespace(&mut self) {
		let rest = self.rest();
		let len = rest.len() - rest.trim_start().len();
		self.advance(len);
	}

	fn take_name(&mut self) -> &'a str {
		let rest = self.rest();
		let len = rest
			.find(|c: char| c.is_whitespace() || matches!(c, '>' | '/' | '=' | '<'))
			.unwrap_or(rest.len());
		self.advance(len);
		&rest[..len]
	}

	fn read_start_tag(&mut self) -> Result<(Element, bool), AnimError> {
		let line = self.line;
		self.advance(1);
		let name = self.take_name();
		if name.is_empty() {
			return Err(AnimError::syntax(Format::Xml, line, "missing tag name"));
		}
		let mut element = Element::new(name, line);

		loop {
			self.skip_whitespace();
			let rest = self.rest();
			if rest.is_empty() {
				return Err(AnimError::syntax(Format::Xml, line, format!("unterminated tag <{name}")));
			}
			if rest.starts_with("/>") {
				self.advance(2);
				return Ok((element, true));
			}
			if rest.starts_with('>') {
				self.advance(1);
				return Ok((element, false));
			}

			let key = self.take_name();
			if key.is_empty() {
				return Err(AnimError::syntax(
					Format::Xml,
					self.line,
					format!("unexpected character in tag <{name}>"),
				));
			}
			self.skip_whitespace();
			if !self.rest().starts_with('=') {
				return Err(AnimError::syntax(
					Format::Xml,
					self.line,
					format!("attribute '{key}' in <{name}> has no value"),
				));
			}
			self.advance(1);
			self.skip_whitespace();

			let quote = match self.rest().chars().next() {
				Some(q @ ('"' | '\'')) => q,
				_ => {
					return Err(AnimError::syntax(
						Format::Xml,
						self.line,
						format!("attribute '{key}' in <{name}> is not quoted"),
					));
				}
			};
			self.advance(1);
			let raw = self.take_until_char(quote);
			if self.at_end() {
				return Err(AnimError::syntax(Format::Xml, line, format!("unterminated attribute '{key}'")));
			}
			self.advance(1);
			element.attributes.push((key.to_string(), decode_entities(raw).into_owned()));
		}
	}
}

/// Replaces entity and character references in `raw`.
///
/// Unknown or malformed references are kept verbatim.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
	if !raw.contains('&') {
		return Cow::Borrowed(raw);
	}

	let mut out = String::with_capacity(raw.len());
	let mut rest = raw;
	while let Some(idx) = rest.find('&') {
		out.push_str(&rest[..idx]);
		rest = &rest[idx..];
		let decoded = rest
			.find(';')
			.filter(|&end| end <= 10)
			.and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
		match decoded {
			Some((c, end)) => {
				out.push(c);
				rest = &rest[end + 1..];
			}
			None => {
				out.push('&');
				rest = &rest[1..];
			}
		}
	}
	out.push_str(rest);
	Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
	match entity {
		"lt" => Some('<'),
		"gt" => Some('>'),
		"amp" => Some('&'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		_ => {
			let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
				u32::from_str_radix(hex, 16).ok()?
			} else {
				entity.strip_prefix('#')?.parse().ok()?
			};
			char::from_u32(code)
		}
	}
}

/// Escapes text for use as character data or a quoted attribute value.
pub fn escape(text: &str) -> Cow<'_, str> {
	if !text.contains(['<', '>', '&', '"', '\'']) {
		return Cow::Borrowed(text);
	}
	let mut out = String::with_capacity(text.len() + 8);
	for c in text.chars() {
		match c {
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'&' => out.push_str("&amp;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			other => out.push(other),
		}
	}
	Cow::Owned(out)
}
