//! Computed paint resolution.
//!
//! Resolves the rendered `fill`, `stroke` and `filter` of every element the
//! way a rendering engine would: presentation attributes, then embedded
//! `<style>` rules ordered by specificity, then the inline `style`
//! attribute, with inheritance for `fill`, `stroke` and `color`.

use std::collections::HashMap;

use palette::Srgba;

use super::{Document, NodeId, NodeKind};

fn opaque_black() -> Srgba<u8> {
    Srgba::new(0, 0, 0, 255)
}

// ============================================================================
// Paint
// ============================================================================

/// A resolved paint value.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,
    Color(Srgba<u8>),
    /// Reference to a paint server, e.g. a gradient.
    Url(String),
}

impl Paint {
    /// Returns true if the paint draws something: not `none` and not
    /// fully transparent.
    pub fn is_visible(&self) -> bool {
        match self {
            Paint::None => false,
            Paint::Color(color) => color.alpha > 0,
            Paint::Url(_) => true,
        }
    }

    /// Renders the paint in the textual form a browser reports for
    /// computed styles: `rgb(r, g, b)`, `rgba(r, g, b, a)`, `none` or
    /// `url("#id")`.
    pub fn to_css(&self) -> String {
        match self {
            Paint::None => "none".to_string(),
            Paint::Color(c) if c.alpha == 255 => format!("rgb({}, {}, {})", c.red, c.green, c.blue),
            Paint::Color(c) => {
                let alpha = (c.alpha as f32 / 255.0 * 1000.0).round() / 1000.0;
                format!("rgba({}, {}, {}, {})", c.red, c.green, c.blue, alpha)
            }
            Paint::Url(url) => format!("url(\"{}\")", url),
        }
    }
}

/// Computed presentation of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub fill: Paint,
    pub stroke: Paint,
    /// The `color` property, used by `currentColor`.
    pub color: Srgba<u8>,
    /// The `filter` property, if not `none`.
    pub filter: Option<String>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            fill: Paint::Color(opaque_black()),
            stroke: Paint::None,
            color: opaque_black(),
            filter: None,
        }
    }
}

// ============================================================================
// StyleMap
// ============================================================================

/// Computed styles for every element of a document.
///
/// A snapshot: it must be recomputed after the document changes.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    styles: HashMap<NodeId, ComputedStyle>,
}

impl StyleMap {
    pub fn compute(doc: &Document) -> Self {
        let sheet = Stylesheet::collect(doc);
        let mut styles = HashMap::new();
        let mut stack = vec![(doc.root(), ComputedStyle::default())];

        while let Some((id, parent)) = stack.pop() {
            if doc.element(id).is_none() {
                continue;
            }
            let style = compute_element(doc, &sheet, id, &parent);
            for child in doc.children(id).iter().rev() {
                stack.push((*child, style.clone()));
            }
            styles.insert(id, style);
        }

        Self { styles }
    }

    pub fn get(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.styles.get(&id)
    }

    /// Returns the rendered fill of `id`, in computed-style text form.
    pub fn rendered_fill(&self, id: NodeId) -> Option<String> {
        self.get(id).map(|s| s.fill.to_css())
    }
}

fn compute_element(
    doc: &Document,
    sheet: &Stylesheet,
    id: NodeId,
    parent: &ComputedStyle,
) -> ComputedStyle {
    let declared = cascade(doc, sheet, id);

    let color = declared
        .iter()
        .rev()
        .filter(|d| d.property == "color")
        .find_map(|d| match parse_paint(&d.value)? {
            PaintValue::Inherit | PaintValue::CurrentColor => Some(parent.color),
            PaintValue::Paint(Paint::Color(c)) => Some(c),
            PaintValue::Paint(_) => None,
        })
        .unwrap_or(parent.color);

    let paint = |property: &str, inherited: &Paint| -> Paint {
        declared
            .iter()
            .rev()
            .filter(|d| d.property == property)
            .find_map(|d| parse_paint(&d.value))
            .map(|value| match value {
                PaintValue::Paint(paint) => paint,
                PaintValue::Inherit => inherited.clone(),
                PaintValue::CurrentColor => Paint::Color(color),
            })
            .unwrap_or_else(|| inherited.clone())
    };

    let fill = paint("fill", &parent.fill);
    let stroke = paint("stroke", &parent.stroke);

    let filter = declared
        .iter()
        .rev()
        .find(|d| d.property == "filter")
        .and_then(|d| match d.value.as_str() {
            "none" => None,
            "inherit" => parent.filter.clone(),
            value => Some(value.to_string()),
        });

    ComputedStyle {
        fill,
        stroke,
        color,
        filter,
    }
}

/// Collects the declarations that apply to `id`, lowest priority first.
fn cascade(doc: &Document, sheet: &Stylesheet, id: NodeId) -> Vec<Declaration> {
    const PRESENTATION: &[&str] = &["fill", "stroke", "color", "filter"];

    let mut out: Vec<Declaration> = PRESENTATION
        .iter()
        .filter_map(|p| doc.attribute(id, p).map(|v| Declaration::new(p, v.trim())))
        .collect();

    let mut matched: Vec<&Rule> = sheet
        .rules
        .iter()
        .filter(|rule| rule.selector.matches(doc, id))
        .collect();
    matched.sort_by(|a, b| {
        a.selector
            .specificity
            .cmp(&b.selector.specificity)
            .then(a.order.cmp(&b.order))
    });

    let inline = doc
        .attribute(id, "style")
        .map(parse_declarations)
        .unwrap_or_default();

    let normal = |d: &&Declaration| !d.important;
    let important = |d: &&Declaration| d.important;

    out.extend(matched.iter().flat_map(|r| r.declarations.iter()).filter(normal).cloned());
    out.extend(inline.iter().filter(normal).cloned());
    out.extend(matched.iter().flat_map(|r| r.declarations.iter()).filter(important).cloned());
    out.extend(inline.iter().filter(important).cloned());
    out
}

// ============================================================================
// Values
// ============================================================================

enum PaintValue {
    Paint(Paint),
    Inherit,
    CurrentColor,
}

fn parse_paint(value: &str) -> Option<PaintValue> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();

    match lower.as_str() {
        "none" => return Some(PaintValue::Paint(Paint::None)),
        "inherit" => return Some(PaintValue::Inherit),
        "currentcolor" => return Some(PaintValue::CurrentColor),
        _ => {}
    }

    if lower.starts_with("url(") {
        let close = value.find(')')?;
        let target = value[4..close].trim().trim_matches(|c| c == '"' || c == '\'');
        return Some(PaintValue::Paint(Paint::Url(target.to_string())));
    }

    parse_color(value).map(|c| PaintValue::Paint(Paint::Color(c)))
}

/// Parses a CSS color: hex forms, `rgb()`/`rgba()`, `transparent` or a
/// named color.
pub fn parse_color(value: &str) -> Option<Srgba<u8>> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex_rgba(hex);
    }
    if lower.starts_with("rgb") {
        return parse_rgb_components(&lower);
    }
    if lower == "transparent" {
        return Some(Srgba::new(0, 0, 0, 0));
    }

    palette::named::from_str(&lower).map(|c| Srgba::new(c.red, c.green, c.blue, 255))
}

fn parse_hex_rgba(hex: &str) -> Option<Srgba<u8>> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let digits: Vec<u8> = match hex.len() {
        3 | 4 => hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8 * 0x11))
            .collect::<Option<_>>()?,
        6 | 8 => (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
            .collect::<Option<_>>()?,
        _ => return None,
    };

    let alpha = digits.get(3).copied().unwrap_or(255);
    Some(Srgba::new(digits[0], digits[1], digits[2], alpha))
}

fn parse_rgb_components(value: &str) -> Option<Srgba<u8>> {
    let open = value.find('(')?;
    let close = value.rfind(')')?;
    let inner = value.get(open + 1..close)?;

    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        match s.strip_suffix('%') {
            Some(pct) => Some((pct.parse::<f32>().ok()?.clamp(0.0, 100.0) * 2.55).round() as u8),
            None => Some(s.parse::<f32>().ok()?.clamp(0.0, 255.0).round() as u8),
        }
    };
    let alpha = |s: &str| -> Option<u8> {
        let fraction = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => s.parse::<f32>().ok()?,
        };
        Some((fraction.clamp(0.0, 1.0) * 255.0).round() as u8)
    };

    let a = match parts.get(3) {
        Some(s) => alpha(s)?,
        None => 255,
    };
    Some(Srgba::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a))
}

// ============================================================================
// Declarations
// ============================================================================

/// One `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: &str) -> Self {
        Self {
            property: property.to_string(),
            value: value.to_string(),
            important: false,
        }
    }
}

/// Parses a declaration block such as the content of a `style` attribute.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    input
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let mut value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }

            let mut important = false;
            if let Some(bang) = value.rfind('!') {
                if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
                    important = true;
                    value = value[..bang].trim_end();
                }
            }

            Some(Declaration {
                property,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

/// Writes declarations back as `a: b; c: d`.
pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|d| {
            if d.important {
                format!("{}: {} !important", d.property, d.value)
            } else {
                format!("{}: {}", d.property, d.value)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Stylesheet
// ============================================================================

#[derive(Debug, Default)]
struct Stylesheet {
    rules: Vec<Rule>,
}

#[derive(Debug)]
struct Rule {
    selector: Selector,
    declarations: Vec<Declaration>,
    order: usize,
}

impl Stylesheet {
    /// Gathers the rules of every `<style>` element in the document.
    fn collect(doc: &Document) -> Self {
        let mut sheet = Stylesheet::default();
        let mut order = 0usize;

        for id in doc.elements().filter(|id| doc.tag_name(*id) == Some("style")) {
            let css: String = doc
                .children(id)
                .iter()
                .filter_map(|child| match doc.kind(*child) {
                    NodeKind::Text(text) | NodeKind::CData(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            sheet.parse_into(&strip_comments(&css), &mut order);
        }

        sheet
    }

    fn parse_into(&mut self, css: &str, order: &mut usize) {
        let mut rest = css;

        while let Some(open) = rest.find('{') {
            let prelude = rest[..open].rsplit(';').next().unwrap_or("").trim();
            let Some(close) = matching_brace(rest, open) else {
                break;
            };
            let block = &rest[open + 1..close];
            rest = &rest[close + 1..];

            // At-rules are not evaluated.
            if prelude.starts_with('@') {
                continue;
            }

            let declarations = parse_declarations(block);
            if !declarations.is_empty() {
                for selector in prelude.split(',').filter_map(Selector::parse) {
                    self.rules.push(Rule {
                        selector,
                        declarations: declarations.clone(),
                        order: *order,
                    });
                }
            }
            *order += 1;
        }
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in css.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// Selectors
// ============================================================================

/// A descendant-combinator chain of compound selectors.
#[derive(Debug)]
struct Selector {
    parts: Vec<Compound>,
    /// (ids, classes, types)
    specificity: (u16, u16, u16),
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<Compound> = raw
            .split_whitespace()
            .map(Compound::parse)
            .collect::<Option<_>>()?;
        if parts.is_empty() {
            return None;
        }

        let specificity = parts.iter().fold((0, 0, 0), |(i, c, t), p| {
            (
                i + p.id.is_some() as u16,
                c + p.classes.len() as u16,
                t + p.tag.is_some() as u16,
            )
        });

        Some(Self { parts, specificity })
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some((last, ancestors)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(doc, id) {
            return false;
        }

        let mut cursor = doc.parent(id);
        for part in ancestors.iter().rev() {
            loop {
                let Some(candidate) = cursor else {
                    return false;
                };
                cursor = doc.parent(candidate);
                if part.matches(doc, candidate) {
                    break;
                }
            }
        }
        true
    }
}

impl Compound {
    fn parse(token: &str) -> Option<Self> {
        if token.contains([':', '[', ']', '>', '+', '~']) {
            return None;
        }

        let mut compound = Compound::default();
        let ident_end = |s: &str| s.find(['.', '#']).unwrap_or(s.len());

        let mut rest = token;
        if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        } else {
            let end = ident_end(rest);
            if end > 0 {
                compound.tag = Some(rest[..end].to_string());
            }
            rest = &rest[end..];
        }

        while let Some(marker) = rest.chars().next() {
            if marker != '.' && marker != '#' {
                return None;
            }
            let body = &rest[marker.len_utf8()..];
            let end = ident_end(body);
            if end == 0 {
                return None;
            }
            let name = body[..end].to_string();
            match marker {
                '.' => compound.classes.push(name),
                '#' if compound.id.is_none() => compound.id = Some(name),
                _ => return None,
            }
            rest = &body[end..];
        }

        Some(compound)
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = doc.element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if element.local_name() != tag {
                return false;
            }
        }
        if let Some(wanted) = &self.id {
            if element.attribute("id") != Some(wanted.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let classes: Vec<&str> = element
                .attribute("class")
                .map(|c| c.split_whitespace().collect())
                .unwrap_or_default();
            if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_of(svg: &str, id: &str) -> String {
        let doc = Document::parse(svg).unwrap();
        let styles = StyleMap::compute(&doc);
        styles.rendered_fill(doc.find_by_id(id).unwrap()).unwrap()
    }

    #[test]
    fn default_fill_is_black() {
        assert_eq!(fill_of(r#"<svg><rect id="r"/></svg>"#, "r"), "rgb(0, 0, 0)");
    }

    #[test]
    fn presentation_attribute_and_inheritance() {
        let svg = r##"<svg><g fill="#abc"><rect id="r"/><rect id="s" fill="none"/></g></svg>"##;
        assert_eq!(fill_of(svg, "r"), "rgb(170, 187, 204)");
        assert_eq!(fill_of(svg, "s"), "none");
    }

    #[test]
    fn stylesheet_beats_attribute_and_inline_beats_stylesheet() {
        let svg = r##"<svg>
            <style>.a { fill: blue } #b { fill: rgb(1, 2, 3) } /* rect { fill: red } */</style>
            <rect id="a1" class="a" fill="red"/>
            <rect id="b" class="a"/>
            <rect id="c" class="a" style="fill: #00ff00"/>
        </svg>"##;
        assert_eq!(fill_of(svg, "a1"), "rgb(0, 0, 255)");
        assert_eq!(fill_of(svg, "b"), "rgb(1, 2, 3)");
        assert_eq!(fill_of(svg, "c"), "rgb(0, 255, 0)");
    }

    #[test]
    fn important_stylesheet_rule_beats_inline() {
        let svg = r##"<svg><style>rect { fill: red !important }</style><rect id="r" style="fill: blue"/></svg>"##;
        assert_eq!(fill_of(svg, "r"), "rgb(255, 0, 0)");
    }

    #[test]
    fn descendant_selectors_and_cdata() {
        let svg = r##"<svg><style><![CDATA[ g.body path { fill: #102030 } ]]></style>
            <g class="body"><g><path id="p"/></g></g><path id="q"/></svg>"##;
        assert_eq!(fill_of(svg, "p"), "rgb(16, 32, 48)");
        assert_eq!(fill_of(svg, "q"), "rgb(0, 0, 0)");
    }

    #[test]
    fn at_rules_are_skipped() {
        let svg = r##"<svg><style>@media print { rect { fill: red } } rect { fill: lime }</style><rect id="r"/></svg>"##;
        assert_eq!(fill_of(svg, "r"), "rgb(0, 255, 0)");
    }

    #[test]
    fn non_ascii_selectors_are_ignored() {
        let svg = r##"<svg><style>*é { fill: red } .ß { fill: blue } rect { fill: lime }</style><rect id="r" class="ß"/></svg>"##;
        assert_eq!(fill_of(svg, "r"), "rgb(0, 0, 255)");

        let svg = r##"<svg><style>*é { fill: red }</style><rect id="r"/></svg>"##;
        assert_eq!(fill_of(svg, "r"), "rgb(0, 0, 0)");
    }

    #[test]
    fn current_color_and_transparent() {
        let svg = r##"<svg color="teal"><rect id="r" fill="currentColor"/><rect id="t" fill="transparent"/></svg>"##;
        assert_eq!(fill_of(svg, "r"), "rgb(0, 128, 128)");
        assert_eq!(fill_of(svg, "t"), "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn url_paints_and_invalid_values() {
        let svg = r##"<svg fill="#111"><rect id="u" fill="url(#grad)"/><rect id="x" fill="notacolor"/></svg>"##;
        assert_eq!(fill_of(svg, "u"), r##"url("#grad")"##);
        assert_eq!(fill_of(svg, "x"), "rgb(17, 17, 17)");
    }

    #[test]
    fn filter_is_not_inherited() {
        let doc = Document::parse(
            r#"<svg><g id="g" style="filter: url(#f)"><rect id="r"/></g></svg>"#,
        )
        .unwrap();
        let styles = StyleMap::compute(&doc);
        let group = doc.find_by_id("g").unwrap();
        let rect = doc.find_by_id("r").unwrap();
        assert_eq!(styles.get(group).unwrap().filter.as_deref(), Some("url(#f)"));
        assert_eq!(styles.get(rect).unwrap().filter, None);
    }

    #[test]
    fn color_parsing_forms() {
        assert_eq!(parse_color("#f008"), Some(Srgba::new(255, 0, 0, 136)));
        assert_eq!(parse_color("rgba(10, 20, 30, 50%)"), Some(Srgba::new(10, 20, 30, 128)));
        assert_eq!(parse_color("rgb(100% 0% 0%)"), Some(Srgba::new(255, 0, 0, 255)));
        assert_eq!(parse_color("Orange"), Some(Srgba::new(255, 165, 0, 255)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn declarations_roundtrip_with_important() {
        let decls = parse_declarations("fill: red ; STROKE:blue!important;;bogus");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].property, "stroke");
        assert!(decls[1].important);
        assert_eq!(serialize_declarations(&decls), "fill: red; stroke: blue !important");
    }

    #[test]
    fn rgba_rendering() {
        let paint = Paint::Color(Srgba::new(1, 2, 3, 128));
        assert_eq!(paint.to_css(), "rgba(1, 2, 3, 0.502)");
        assert!(paint.is_visible());
        assert!(!Paint::Color(Srgba::new(1, 2, 3, 0)).is_visible());
    }
}
