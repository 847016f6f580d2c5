//! Vector markup validation and sanitization.
//!
//! Generated SVG is untrusted: it is checked for well-formedness and the
//! SVG namespace, then stripped of anything executable before it is
//! rasterized.

use regex::{Captures, Regex};
use std::sync::LazyLock;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

static PROLOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<\?.*?\?>|<!--.*?-->|<!\[CDATA\[.*?\]\]>|<!DOCTYPE[^>]*>")
        .expect("Valid prolog regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z_][\w:.-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#)
        .expect("Valid tag regex")
});

static XMLNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sxmlns\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Valid xmlns regex")
});

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*?/>|<script\b.*?</script\s*>").expect("Valid script regex")
});

static FOREIGN_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<foreignObject\b[^>]*?/>|<foreignObject\b.*?</foreignObject\s*>")
        .expect("Valid foreignObject regex")
});

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("Valid event handler regex")
});

static URI_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+[\w:.-]+\s*=\s*(?:"\s*([a-z]+):([^"]*)"|'\s*([a-z]+):([^']*)')"#)
        .expect("Valid URI attribute regex")
});

/// Why a piece of markup was rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum InvalidMarkup {
    /// No element at all
    #[display("no root element")]
    Empty,
    /// The first element is not `<svg>`
    #[display("root element is <{}>, expected <svg>", _0)]
    NotSvg(String),
    /// The root lacks `xmlns="http://www.w3.org/2000/svg"`
    #[display("root <svg> is missing the SVG namespace")]
    MissingNamespace,
    /// A closing tag does not match the open element
    #[display("unexpected </{}>", _0)]
    Mismatched(String),
    /// Elements left open at the end
    #[display("unclosed <{}>", _0)]
    Unclosed(String),
    /// Content after the root element closed
    #[display("content after the root element")]
    TrailingContent,
}

/// Check that `markup` is a single well-formed `<svg>` element in the SVG
/// namespace.
///
/// # Examples
///
/// ```
/// use vermeer_generation::svg;
///
/// let ok = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="10"/></svg>"#;
/// assert!(svg::validate(ok).is_ok());
/// assert!(svg::validate("<svg><g></svg>").is_err());
/// ```
pub fn validate(markup: &str) -> Result<(), InvalidMarkup> {
    let body = PROLOG.replace_all(markup, "");
    let mut open: Vec<String> = Vec::new();
    let mut root_seen = false;
    let mut root_closed = false;

    for caps in TAG.captures_iter(&body) {
        let closing = !caps[1].is_empty();
        let name = caps[2].to_string();
        let self_closing = !caps[4].is_empty();

        if root_closed {
            return Err(InvalidMarkup::TrailingContent);
        }

        if !root_seen {
            if closing {
                return Err(InvalidMarkup::Mismatched(name));
            }
            if name != "svg" {
                return Err(InvalidMarkup::NotSvg(name));
            }
            let namespace = XMLNS
                .captures(&caps[3])
                .and_then(|ns| ns.get(1).or_else(|| ns.get(2)))
                .map(|ns| ns.as_str());
            if namespace != Some(SVG_NAMESPACE) {
                return Err(InvalidMarkup::MissingNamespace);
            }
            root_seen = true;
        }

        if closing {
            match open.pop() {
                Some(element) if element == name => {}
                _ => return Err(InvalidMarkup::Mismatched(name)),
            }
            root_closed = open.is_empty();
        } else if self_closing {
            root_closed = open.is_empty();
        } else {
            open.push(name);
        }
    }

    if !root_seen {
        return Err(InvalidMarkup::Empty);
    }
    match open.pop() {
        Some(element) => Err(InvalidMarkup::Unclosed(element)),
        None => Ok(()),
    }
}

/// Strip executable content from SVG markup.
///
/// Removes `<script>` and `<foreignObject>` elements, `on*` event handler
/// attributes, `javascript:`/`vbscript:` URIs and `data:` URIs that are not
/// raster images.
pub fn sanitize(markup: &str) -> String {
    let markup = SCRIPT.replace_all(markup, "");
    let markup = FOREIGN_OBJECT.replace_all(&markup, "");
    let markup = EVENT_HANDLER.replace_all(&markup, "");
    URI_ATTRIBUTE
        .replace_all(&markup, |caps: &Captures| {
            let scheme = caps
                .get(1)
                .or_else(|| caps.get(3))
                .map_or(String::new(), |m| m.as_str().to_ascii_lowercase());
            let rest = caps
                .get(2)
                .or_else(|| caps.get(4))
                .map_or(String::new(), |m| m.as_str().trim_start().to_ascii_lowercase());

            let dangerous = match scheme.as_str() {
                "javascript" | "vbscript" => true,
                "data" => !rest.starts_with("image/") || rest.starts_with("image/svg"),
                _ => false,
            };
            if dangerous {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns="http://www.w3.org/2000/svg""#;

    #[test]
    fn accepts_prolog_and_nested_elements() {
        let markup = format!(
            r#"<?xml version="1.0"?><!-- made by a model --><svg {NS} viewBox="0 0 10 10"><g><circle r="4"/><text>a > b</text></g></svg>"#
        );
        assert_eq!(validate(&markup), Ok(()));
    }

    #[test]
    fn rejects_missing_namespace() {
        assert_eq!(
            validate(r#"<svg viewBox="0 0 1 1"></svg>"#),
            Err(InvalidMarkup::MissingNamespace)
        );
        assert_eq!(
            validate(r#"<svg xmlns="http://example.com"></svg>"#),
            Err(InvalidMarkup::MissingNamespace)
        );
    }

    #[test]
    fn rejects_unbalanced_tags() {
        assert_eq!(
            validate(&format!("<svg {NS}><g></svg>")),
            Err(InvalidMarkup::Mismatched("svg".into()))
        );
        assert_eq!(
            validate(&format!("<svg {NS}><g>")),
            Err(InvalidMarkup::Unclosed("g".into()))
        );
        assert_eq!(
            validate(&format!("<svg {NS}></svg><svg {NS}></svg>")),
            Err(InvalidMarkup::TrailingContent)
        );
    }

    #[test]
    fn rejects_non_svg_root() {
        assert_eq!(
            validate("<html><body/></html>"),
            Err(InvalidMarkup::NotSvg("html".into()))
        );
        assert_eq!(validate("just words"), Err(InvalidMarkup::Empty));
    }

    #[test]
    fn strips_scripts_and_foreign_objects() {
        let markup = format!(
            r#"<svg {NS}><script type="text/javascript">alert(1)</script><SCRIPT src="x.js"/><foreignObject><div>hi</div></foreignObject><rect/></svg>"#
        );
        let clean = sanitize(&markup);
        assert_eq!(clean, format!("<svg {NS}><rect/></svg>"));
        assert_eq!(validate(&clean), Ok(()));
    }

    #[test]
    fn strips_event_handlers() {
        let markup = format!(r#"<svg {NS} onload="evil()"><rect onClick='x()' width="3"/></svg>"#);
        assert_eq!(
            sanitize(&markup),
            format!(r#"<svg {NS}><rect width="3"/></svg>"#)
        );
    }

    #[test]
    fn strips_dangerous_uris_but_keeps_images() {
        let markup = format!(
            r#"<svg {NS}><a href="javascript:alert(1)"><image href="data:image/png;base64,AAAA"/><image xlink:href='data:text/html;base64,AAAA'/><image href="data:image/svg+xml;base64,AAAA"/></a></svg>"#
        );
        let clean = sanitize(&markup);
        assert!(!clean.contains("javascript:"));
        assert!(!clean.contains("text/html"));
        assert!(!clean.contains("image/svg+xml"));
        assert!(clean.contains("data:image/png"));
        assert!(clean.contains(NS));
    }
}
