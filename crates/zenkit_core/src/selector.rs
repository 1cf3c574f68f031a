//! CSS selector subset used for node resolution
//!
//! Widgets locate their roots, items and triggers through fixed class and
//! attribute conventions (`.accordion-item`, `[data-toggle="modal"]`,
//! `.dropdown-item:not(.disabled)`), so the engine supports exactly the
//! grammar those conventions need:
//!
//! - type (`div`), universal (`*`), `#id`, `.class`
//! - attributes: `[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`
//! - pseudo classes: `:not(<compound>, ...)`, `:disabled`
//! - combinators: descendant (` `), child (`>`), adjacent (`+`), general sibling (`~`)
//! - comma separated groups
//!
//! Matching runs right to left from the candidate element.
//!
//! # Example
//!
//! ```ignore
//! use zenkit_core::selector::SelectorList;
//!
//! let list = SelectorList::parse(".dropdown-item:not(.disabled):not(:disabled)")?;
//! let enabled: Vec<_> = doc
//!     .descendants(menu)
//!     .filter(|&n| list.matches(&doc, n))
//!     .collect();
//! ```

use smallvec::SmallVec;

use crate::dom::{Document, NodeId};
use crate::error::SelectorError;

type Result<T> = std::result::Result<T, SelectorError>;

/// Attribute comparison operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOperator {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals(String),
    /// `[attr~=value]` whitespace separated word match
    Includes(String),
    /// `[attr^=value]`
    Prefix(String),
    /// `[attr$=value]`
    Suffix(String),
    /// `[attr*=value]`
    Substring(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub operator: AttrOperator,
}

impl AttrSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.operator {
            AttrOperator::Exists => true,
            AttrOperator::Equals(expected) => value == expected,
            AttrOperator::Includes(word) => value.split_ascii_whitespace().any(|w| w == word),
            AttrOperator::Prefix(prefix) => !prefix.is_empty() && value.starts_with(prefix.as_str()),
            AttrOperator::Suffix(suffix) => !suffix.is_empty() && value.ends_with(suffix.as_str()),
            AttrOperator::Substring(needle) => {
                !needle.is_empty() && value.contains(needle.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:not(a, b)` matches when none of the compounds match
    Not(Vec<CompoundSelector>),
    /// `:disabled` matches elements carrying a `disabled` attribute
    Disabled,
}

/// A sequence of simple selectors applying to one element (`a.nav-link[href]`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub universal: bool,
    pub id: Option<String>,
    pub classes: SmallVec<[String; 2]>,
    pub attrs: SmallVec<[AttrSelector; 1]>,
    pub pseudo_classes: SmallVec<[PseudoClass; 1]>,
}

impl CompoundSelector {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
    }

    /// Match this compound against a single element
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }
        if !self
            .attrs
            .iter()
            .all(|a| a.matches(doc.attr(node, &a.name)))
        {
            return false;
        }
        self.pseudo_classes.iter().all(|pseudo| match pseudo {
            PseudoClass::Disabled => doc.has_attr(node, "disabled"),
            PseudoClass::Not(inner) => !inner.iter().any(|c| c.matches(doc, node)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPart {
    pub compound: CompoundSelector,
    /// Relation to the part on the left; `None` for the leftmost part
    pub combinator: Option<Combinator>,
}

/// One comma group: a chain of compounds joined by combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    parts: Vec<SelectorPart>,
}

impl ComplexSelector {
    pub fn parts(&self) -> &[SelectorPart] {
        &self.parts
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match self.parts.len() {
            0 => false,
            len => self.matches_at(doc, node, len - 1),
        }
    }

    fn matches_at(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        let part = &self.parts[idx];
        if !part.compound.matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match part.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_at(doc, parent, idx - 1)),
            Combinator::Descendant => {
                let mut cursor = doc.parent(node);
                while let Some(ancestor) = cursor {
                    if self.matches_at(doc, ancestor, idx - 1) {
                        return true;
                    }
                    cursor = doc.parent(ancestor);
                }
                false
            }
            Combinator::AdjacentSibling => doc
                .previous_element_sibling(node)
                .is_some_and(|sibling| self.matches_at(doc, sibling, idx - 1)),
            Combinator::GeneralSibling => {
                let mut cursor = doc.previous_element_sibling(node);
                while let Some(sibling) = cursor {
                    if self.matches_at(doc, sibling, idx - 1) {
                        return true;
                    }
                    cursor = doc.previous_element_sibling(sibling);
                }
                false
            }
        }
    }
}

/// A parsed, comma separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: SmallVec<[ComplexSelector; 1]>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self> {
        let groups = split_groups(selector)?
            .into_iter()
            .map(|group| parse_complex(selector, &group))
            .collect::<Result<SmallVec<_>>>()?;
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[ComplexSelector] {
        &self.groups
    }

    /// True if any group matches `node`
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups.iter().any(|g| g.matches(doc, node))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Split on top-level commas, honoring brackets, parentheses and quotes
fn split_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut scanner = Nesting::default();

    for (offset, ch) in selector.char_indices() {
        scanner.feed(selector, ch, offset)?;
        if ch == ',' && scanner.is_top_level() {
            let trimmed = current.trim();
            if trimmed.is_empty() {
                return Err(SelectorError::Empty);
            }
            groups.push(trimmed.to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    scanner.finish(selector)?;

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(SelectorError::Empty);
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

/// Tracks `[...]`, `(...)` and quoted strings while scanning
#[derive(Default)]
struct Nesting {
    brackets: usize,
    parens: usize,
    quote: Option<char>,
}

impl Nesting {
    fn feed(&mut self, selector: &str, ch: char, offset: usize) -> Result<()> {
        if let Some(q) = self.quote {
            if ch == q {
                self.quote = None;
            }
            return Ok(());
        }
        match ch {
            '"' | '\'' if self.brackets > 0 => self.quote = Some(ch),
            '[' => self.brackets += 1,
            ']' => {
                self.brackets = self.brackets.checked_sub(1).ok_or_else(|| {
                    SelectorError::Unexpected {
                        selector: selector.to_string(),
                        found: ch,
                        offset,
                    }
                })?
            }
            '(' => self.parens += 1,
            ')' => {
                self.parens = self.parens.checked_sub(1).ok_or_else(|| {
                    SelectorError::Unexpected {
                        selector: selector.to_string(),
                        found: ch,
                        offset,
                    }
                })?
            }
            _ => {}
        }
        Ok(())
    }

    fn is_top_level(&self) -> bool {
        self.brackets == 0 && self.parens == 0 && self.quote.is_none()
    }

    fn finish(&self, selector: &str) -> Result<()> {
        let what = if self.quote.is_some() {
            "string"
        } else if self.brackets > 0 {
            "attribute selector"
        } else if self.parens > 0 {
            "pseudo-class argument"
        } else {
            return Ok(());
        };
        Err(SelectorError::Unterminated {
            selector: selector.to_string(),
            what,
        })
    }
}

fn parse_complex(selector: &str, group: &str) -> Result<ComplexSelector> {
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(selector, group)? {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::AdjacentSibling),
            "~" => Some(Combinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || parts.is_empty() {
                return Err(SelectorError::Unsupported(group.to_string()));
            }
            pending = Some(combinator);
            continue;
        }

        let compound = parse_compound(selector, &token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart {
            compound,
            combinator,
        });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(SelectorError::Unsupported(group.to_string()));
    }
    Ok(ComplexSelector { parts })
}

fn tokenize(selector: &str, group: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut scanner = Nesting::default();

    for (offset, ch) in group.char_indices() {
        let top = scanner.is_top_level();
        scanner.feed(selector, ch, offset)?;
        match ch {
            '>' | '+' | '~' if top => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
                tokens.push(ch.to_string());
            }
            c if c.is_ascii_whitespace() && top => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    scanner.finish(selector)?;

    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }
    Ok(tokens)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Read an identifier starting at byte `start`; returns it and the next offset
fn read_ident(part: &str, start: usize) -> Option<(String, usize)> {
    let tail = part.get(start..)?;
    let len: usize = tail
        .chars()
        .take_while(|&c| is_ident_char(c))
        .map(char::len_utf8)
        .sum();
    (len > 0).then(|| (tail[..len].to_string(), start + len))
}

fn parse_compound(selector: &str, part: &str) -> Result<CompoundSelector> {
    let unexpected = |offset: usize| SelectorError::Unexpected {
        selector: selector.to_string(),
        found: part[offset..].chars().next().unwrap_or(' '),
        offset,
    };

    let mut compound = CompoundSelector::default();
    let mut i = 0usize;

    while i < part.len() {
        let ch = part[i..].chars().next().ok_or_else(|| unexpected(i))?;
        match ch {
            '*' => {
                if i != 0 {
                    return Err(unexpected(i));
                }
                compound.universal = true;
                i += 1;
            }
            '#' => {
                let (id, next) = read_ident(part, i + 1).ok_or_else(|| unexpected(i))?;
                if compound.id.replace(id).is_some() {
                    return Err(SelectorError::Unsupported(part.to_string()));
                }
                i = next;
            }
            '.' => {
                let (class, next) = read_ident(part, i + 1).ok_or_else(|| unexpected(i))?;
                compound.classes.push(class);
                i = next;
            }
            '[' => {
                let (attr, next) = parse_attr(selector, part, i)?;
                compound.attrs.push(attr);
                i = next;
            }
            ':' => {
                let (pseudo, next) = parse_pseudo(selector, part, i)?;
                compound.pseudo_classes.push(pseudo);
                i = next;
            }
            c if is_ident_char(c) && i == 0 => {
                let (tag, next) = read_ident(part, i).ok_or_else(|| unexpected(i))?;
                compound.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
            _ => return Err(unexpected(i)),
        }
    }

    if compound.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(compound)
}

fn parse_attr(selector: &str, part: &str, start: usize) -> Result<(AttrSelector, usize)> {
    let unterminated = || SelectorError::Unterminated {
        selector: selector.to_string(),
        what: "attribute selector",
    };
    let close = find_attr_close(part, start).ok_or_else(unterminated)?;
    let body = part[start + 1..close].trim();

    let (name, operator) = match body.find('=') {
        None => (body, AttrOperator::Exists),
        Some(eq) => {
            let (raw_name, op) = match body[..eq].chars().last() {
                Some(c @ ('~' | '^' | '$' | '*')) => (&body[..eq - 1], Some(c)),
                _ => (&body[..eq], None),
            };
            let value = unquote(body[eq + 1..].trim())
                .ok_or_else(|| SelectorError::Unsupported(body.to_string()))?;
            let operator = match op {
                None => AttrOperator::Equals(value),
                Some('~') => AttrOperator::Includes(value),
                Some('^') => AttrOperator::Prefix(value),
                Some('$') => AttrOperator::Suffix(value),
                _ => AttrOperator::Substring(value),
            };
            (raw_name.trim(), operator)
        }
    };

    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::Unsupported(body.to_string()));
    }
    Ok((
        AttrSelector {
            name: name.to_ascii_lowercase(),
            operator,
        },
        close + 1,
    ))
}

fn find_attr_close(part: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (offset, ch) in part[start..].char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, ']') => return Some(start + offset),
            _ => {}
        }
    }
    None
}

fn unquote(value: &str) -> Option<String> {
    let mut chars = value.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let inner = value.strip_prefix(q)?.strip_suffix(q)?;
            Some(inner.to_string())
        }
        Some(_) if value.chars().all(|c| is_ident_char(c) || c == '#') => {
            Some(value.to_string())
        }
        _ => None,
    }
}

fn parse_pseudo(selector: &str, part: &str, start: usize) -> Result<(PseudoClass, usize)> {
    let (name, next) = read_ident(part, start + 1)
        .ok_or_else(|| SelectorError::Unsupported(part[start..].to_string()))?;

    match name.as_str() {
        "disabled" => Ok((PseudoClass::Disabled, next)),
        "not" => {
            if !part[next..].starts_with('(') {
                return Err(SelectorError::Unsupported(part[start..].to_string()));
            }
            let close = find_paren_close(part, next).ok_or_else(|| {
                SelectorError::Unterminated {
                    selector: selector.to_string(),
                    what: "pseudo-class argument",
                }
            })?;
            let inner = SelectorList::parse(&part[next + 1..close])?;
            let compounds = inner
                .groups
                .into_iter()
                .map(|group| match <[SelectorPart; 1]>::try_from(group.parts) {
                    Ok([only]) => Ok(only.compound),
                    Err(_) => Err(SelectorError::Unsupported(part[start..=close].to_string())),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((PseudoClass::Not(compounds), close + 1))
        }
        _ => Err(SelectorError::Unsupported(format!(":{name}"))),
    }
}

fn find_paren_close(part: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in part[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{element, Document};

    #[test]
    fn test_parse_compound_parts() {
        let list = SelectorList::parse("a.nav-link.active[href^=\"#\"]").unwrap();
        let part = &list.groups()[0].parts()[0];
        assert_eq!(part.compound.tag.as_deref(), Some("a"));
        assert_eq!(part.compound.classes.len(), 2);
        assert_eq!(
            part.compound.attrs[0].operator,
            AttrOperator::Prefix("#".into())
        );
    }

    #[test]
    fn test_parse_groups_and_combinators() {
        let list =
            SelectorList::parse(".nav > .nav-item .dropdown-toggle, [data-toggle=\"tab\"]").unwrap();
        assert_eq!(list.groups().len(), 2);
        let parts = list.groups()[0].parts();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].combinator, Some(Combinator::Child));
        assert_eq!(parts[2].combinator, Some(Combinator::Descendant));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SelectorList::parse("  "), Err(SelectorError::Empty));
        assert!(SelectorList::parse(".a,,.b").is_err());
        assert!(matches!(
            SelectorList::parse("[data-x"),
            Err(SelectorError::Unterminated { .. })
        ));
        assert!(matches!(
            SelectorList::parse("a:hover"),
            Err(SelectorError::Unsupported(_))
        ));
        assert!(SelectorList::parse("> .a").is_err());
    }

    #[test]
    fn test_matching() {
        let mut doc = Document::new();
        let body = doc.body();
        let menu = doc.append(
            body,
            element("ul").class("dropdown-menu").children([
                element("li").child(element("a").class("dropdown-item").id("one")),
                element("li").child(element("a").class("dropdown-item disabled").id("two")),
                element("li").child(element("button").class("dropdown-item").attr("disabled", "").id("three")),
            ]),
        );

        let enabled = doc
            .query_selector_all_from(menu, ".dropdown-item:not(.disabled):not(:disabled)")
            .unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(doc.attr(enabled[0], "id"), Some("one"));

        let nested = doc.query_selector_all("ul.dropdown-menu > li > a").unwrap();
        assert_eq!(nested.len(), 2);

        let sibling = doc.query_selector("li + li > #two").unwrap();
        assert!(sibling.is_some());
    }

    #[test]
    fn test_attr_operators() {
        let mut doc = Document::new();
        let body = doc.body();
        let link = doc.append(
            body,
            element("a")
                .attr("href", "#section-two")
                .attr("data-toggle", "tab pill"),
        );
        assert!(doc.matches(link, "[href$=two]").unwrap());
        assert!(doc.matches(link, "[href*='section']").unwrap());
        assert!(doc.matches(link, "[data-toggle~=pill]").unwrap());
        assert!(!doc.matches(link, "[data-toggle=pill]").unwrap());
        assert!(!doc.matches(link, "[title]").unwrap());
    }
}
