use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrOp {
    /// `[a=v]`
    Equals,
    /// `[a~=v]`: whitespace-separated word
    Includes,
    /// `[a^=v]`
    Prefix,
    /// `[a$=v]`
    Suffix,
    /// `[a*=v]`
    Substring,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),  // element/tag selector
    Id(String),    // #id selector
    Class(String), // .class selector
    Attribute {
        name: String,
        test: Option<(AttrOp, String)>,
    },
}

/// A run of simple selectors with no combinator between them, e.g. `div.hero[data-x]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    pub parts: Vec<SimpleSelector>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// `compounds[i]` and `compounds[i + 1]` are joined by `combinators[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected '{ch}' at offset {offset} in selector")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
    #[error("expected a name at offset {offset} in selector")]
    ExpectedName { offset: usize },
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<&'a str, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if start == self.pos {
            return Err(SelectorError::ExpectedName { offset: start });
        }
        Ok(&self.input[start..self.pos])
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(ch) => SelectorError::UnexpectedChar {
                ch,
                offset: self.pos,
            },
            None => SelectorError::Empty,
        }
    }
}

// input: "div.card, [data-background-image-url], #main > a"
// output: SelectorList with three complex selectors
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let mut selectors = Vec::new();
    for part in split_top_level_commas(input) {
        selectors.push(parse_complex(part)?);
    }
    Ok(SelectorList { selectors })
}

// Commas inside quoted attribute values do not split.
fn split_top_level_commas(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ',') => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(input: &str) -> Result<ComplexSelector, SelectorError> {
    let mut cur = Cursor {
        input: input.trim(),
        pos: 0,
    };
    if cur.peek().is_none() {
        return Err(SelectorError::Empty);
    }

    let mut compounds = vec![parse_compound(&mut cur)?];
    let mut combinators = Vec::new();
    loop {
        let had_space = cur.skip_whitespace();
        if cur.peek().is_none() {
            break;
        }
        let combinator = if cur.eat('>') {
            cur.skip_whitespace();
            Combinator::Child
        } else if had_space {
            Combinator::Descendant
        } else {
            return Err(cur.unexpected());
        };
        combinators.push(combinator);
        compounds.push(parse_compound(&mut cur)?);
    }

    Ok(ComplexSelector {
        compounds,
        combinators,
    })
}

fn parse_compound(cur: &mut Cursor<'_>) -> Result<Compound, SelectorError> {
    let mut parts = Vec::new();
    if cur.eat('*') {
        parts.push(SimpleSelector::Universal);
    } else if cur.peek().is_some_and(is_ident_char) {
        parts.push(SimpleSelector::Type(cur.ident()?.to_ascii_lowercase()));
    }

    loop {
        match cur.peek() {
            Some('#') => {
                cur.bump();
                parts.push(SimpleSelector::Id(cur.ident()?.to_string()));
            }
            Some('.') => {
                cur.bump();
                parts.push(SimpleSelector::Class(cur.ident()?.to_string()));
            }
            Some('[') => {
                cur.bump();
                parts.push(parse_attribute(cur)?);
            }
            _ => break,
        }
    }

    if parts.is_empty() {
        return Err(cur.unexpected());
    }
    Ok(Compound { parts })
}

fn parse_attribute(cur: &mut Cursor<'_>) -> Result<SimpleSelector, SelectorError> {
    cur.skip_whitespace();
    let name = cur.ident()?.to_ascii_lowercase();
    cur.skip_whitespace();

    if cur.eat(']') {
        return Ok(SimpleSelector::Attribute { name, test: None });
    }

    let op = match cur.bump() {
        Some('=') => AttrOp::Equals,
        Some(c @ ('~' | '^' | '$' | '*')) if cur.eat('=') => match c {
            '~' => AttrOp::Includes,
            '^' => AttrOp::Prefix,
            '$' => AttrOp::Suffix,
            _ => AttrOp::Substring,
        },
        Some(ch) => {
            return Err(SelectorError::UnexpectedChar {
                ch,
                offset: cur.pos - ch.len_utf8(),
            });
        }
        None => return Err(SelectorError::UnterminatedAttribute),
    };
    cur.skip_whitespace();

    let value = match cur.peek() {
        Some(q @ ('"' | '\'')) => {
            cur.bump();
            let start = cur.pos;
            let rel = cur.input[start..]
                .find(q)
                .ok_or(SelectorError::UnterminatedAttribute)?;
            cur.pos = start + rel + 1;
            cur.input[start..start + rel].to_string()
        }
        Some(_) => cur.ident()?.to_string(),
        None => return Err(SelectorError::UnterminatedAttribute),
    };

    cur.skip_whitespace();
    if !cur.eat(']') {
        return Err(match cur.peek() {
            None => SelectorError::UnterminatedAttribute,
            Some(_) => cur.unexpected(),
        });
    }
    Ok(SimpleSelector::Attribute {
        name,
        test: Some((op, value)),
    })
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Universal => f.write_str("*"),
            SimpleSelector::Type(t) => f.write_str(t),
            SimpleSelector::Id(id) => write!(f, "#{id}"),
            SimpleSelector::Class(c) => write!(f, ".{c}"),
            SimpleSelector::Attribute { name, test: None } => write!(f, "[{name}]"),
            SimpleSelector::Attribute {
                name,
                test: Some((op, value)),
            } => {
                let op = match op {
                    AttrOp::Equals => "=",
                    AttrOp::Includes => "~=",
                    AttrOp::Prefix => "^=",
                    AttrOp::Suffix => "$=",
                    AttrOp::Substring => "*=",
                };
                write!(f, "[{name}{op}\"{value}\"]")
            }
        }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for (j, compound) in complex.compounds.iter().enumerate() {
                if j > 0 {
                    match complex.combinators[j - 1] {
                        Combinator::Descendant => f.write_str(" ")?,
                        Combinator::Child => f.write_str(" > ")?,
                    }
                }
                for part in &compound.parts {
                    write!(f, "{part}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_lazy_selector() {
        let list = parse_selector_list("[data-background-image-url]").unwrap();
        assert_eq!(list.selectors.len(), 1);
        assert_eq!(
            list.selectors[0].compounds[0].parts,
            vec![SimpleSelector::Attribute {
                name: "data-background-image-url".to_string(),
                test: None,
            }]
        );
    }

    #[test]
    fn parses_compound_with_combinators() {
        let list = parse_selector_list("DIV.card#main > a[href^='http'] span").unwrap();
        let complex = &list.selectors[0];
        assert_eq!(
            complex.combinators,
            vec![Combinator::Child, Combinator::Descendant]
        );
        assert_eq!(
            complex.compounds[0].parts,
            vec![
                SimpleSelector::Type("div".to_string()),
                SimpleSelector::Class("card".to_string()),
                SimpleSelector::Id("main".to_string()),
            ]
        );
        assert_eq!(list.to_string(), "div.card#main > a[href^=\"http\"] span");
    }

    #[test]
    fn quoted_commas_do_not_split_the_list() {
        let list = parse_selector_list(r#"[data-ga-target="true"], [title="a,b"]"#).unwrap();
        assert_eq!(list.selectors.len(), 2);
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert_eq!(parse_selector_list(""), Err(SelectorError::Empty));
        assert_eq!(parse_selector_list("div,"), Err(SelectorError::Empty));
        assert_eq!(
            parse_selector_list("[data-x"),
            Err(SelectorError::UnterminatedAttribute)
        );
        assert!(matches!(
            parse_selector_list("div!"),
            Err(SelectorError::UnexpectedChar { ch: '!', .. })
        ));
        assert!(matches!(
            parse_selector_list("."),
            Err(SelectorError::ExpectedName { .. })
        ));
    }
}
