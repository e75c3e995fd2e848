//! ref() extraction and substitution
//!
//! Model sources reference each other with `{{ ref('name') }}` or the
//! package-qualified `{{ ref('package', 'name') }}`, quoted either way.
//! This module finds those calls and rewrites them to rendered relation
//! names; resolution itself is supplied by the caller so the compiler
//! controls lookup and dependency recording.

use crate::compile::error::CompileError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Pattern: `{{ ref('model') }}` or `{{ ref('package', 'model') }}`,
/// whitespace-tolerant. Arguments take single or double quotes, one
/// alternation group per quote style.
static REF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\{\{\s*ref\s*\(\s*(?:'([^']+)'|"([^"]+)")\s*(?:,\s*(?:'([^']+)'|"([^"]+)")\s*)?\)\s*\}\}"#,
    )
    .expect("valid ref pattern")
});

/// Anything that still looks like the start of a ref() call
static REF_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*ref\s*\(").expect("valid ref opening pattern"));

/// A single ref() call found in model source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefCall {
    pub package: Option<String>,
    pub name: String,
}

/// Text of one argument, captured by exactly one of its two quote groups.
fn quoted_arg(caps: &Captures<'_>, single: usize, double: usize) -> Option<String> {
    caps.get(single)
        .or_else(|| caps.get(double))
        .map(|m| m.as_str().to_string())
}

fn call_from_captures(caps: &Captures<'_>) -> RefCall {
    // The pattern admits no match without a quoted first argument.
    let first = quoted_arg(caps, 1, 2).unwrap_or_default();
    // With two arguments the first is the package; with one it is the name.
    match quoted_arg(caps, 3, 4) {
        Some(name) => RefCall {
            package: Some(first),
            name,
        },
        None => RefCall {
            package: None,
            name: first,
        },
    }
}

/// All ref() calls in `sql`, in source order. Duplicates are preserved.
pub fn extract_refs(sql: &str) -> Vec<RefCall> {
    REF_PATTERN
        .captures_iter(sql)
        .map(|caps| call_from_captures(&caps))
        .collect()
}

/// Rewrite every ref() call in `sql` using `resolve`.
///
/// The first resolution failure aborts the render and is returned as-is;
/// text outside ref() calls passes through untouched. A ref() call the
/// pattern does not recognize would otherwise survive into the artifact
/// verbatim, so any leftover `{{ ref(` after substitution is an error.
pub fn render_refs<F>(sql: &str, mut resolve: F) -> Result<String, CompileError>
where
    F: FnMut(&RefCall) -> Result<String, CompileError>,
{
    let mut failure: Option<CompileError> = None;

    let rendered = REF_PATTERN.replace_all(sql, |caps: &Captures<'_>| {
        let call = call_from_captures(caps);
        match resolve(&call) {
            Ok(text) => text,
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                }
                String::new()
            }
        }
    });

    if let Some(e) = failure {
        return Err(e);
    }

    let rendered = rendered.into_owned();
    if let Some(open) = REF_OPEN.find(&rendered) {
        let snippet: String = rendered[open.start()..].chars().take(60).collect();
        return Err(CompileError::MalformedRef(snippet));
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(package: Option<&str>, name: &str) -> RefCall {
        RefCall {
            package: package.map(|p| p.to_string()),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_extract_single_argument() {
        let refs = extract_refs("SELECT * FROM {{ ref('stg_orders') }}");
        assert_eq!(refs, vec![call(None, "stg_orders")]);
    }

    #[test]
    fn test_extract_package_qualified() {
        let refs = extract_refs("SELECT * FROM {{ ref('shared', 'calendar') }}");
        assert_eq!(refs, vec![call(Some("shared"), "calendar")]);
    }

    #[test]
    fn test_extract_tolerates_whitespace() {
        let refs = extract_refs("SELECT * FROM {{ref( 'a' )}} JOIN {{  ref('p' , 'b')  }}");
        assert_eq!(refs, vec![call(None, "a"), call(Some("p"), "b")]);
    }

    #[test]
    fn test_extract_double_quoted() {
        let refs = extract_refs(r#"SELECT * FROM {{ ref("stg_orders") }}"#);
        assert_eq!(refs, vec![call(None, "stg_orders")]);
    }

    #[test]
    fn test_extract_mixed_quote_styles() {
        let refs = extract_refs(r#"SELECT * FROM {{ ref("shared", 'calendar') }}"#);
        assert_eq!(refs, vec![call(Some("shared"), "calendar")]);
    }

    #[test]
    fn test_extract_none_in_plain_sql() {
        assert!(extract_refs("SELECT * FROM raw.orders").is_empty());
    }

    #[test]
    fn test_render_substitutes_relation() {
        let rendered = render_refs("SELECT * FROM {{ ref('stg_orders') }} o", |call| {
            assert_eq!(call.name, "stg_orders");
            Ok("analytics.stg_orders".to_string())
        })
        .unwrap();
        assert_eq!(rendered, "SELECT * FROM analytics.stg_orders o");
    }

    #[test]
    fn test_render_multiple_refs() {
        let sql = "SELECT * FROM {{ ref('a') }} JOIN {{ ref('b') }} USING (id)";
        let rendered = render_refs(sql, |call| Ok(format!("public.{}", call.name))).unwrap();
        assert_eq!(rendered, "SELECT * FROM public.a JOIN public.b USING (id)");
    }

    #[test]
    fn test_render_propagates_first_failure() {
        let sql = "SELECT * FROM {{ ref('missing') }} JOIN {{ ref('also_missing') }}";
        let err = render_refs(sql, |call| {
            Err(CompileError::ModelNotFound {
                name: call.name.clone(),
                package: None,
            })
        })
        .unwrap_err();
        match err {
            CompileError::ModelNotFound { name, .. } => assert_eq!(name, "missing"),
            other => panic!("Expected ModelNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_render_double_quoted_ref() {
        let rendered = render_refs(r#"SELECT * FROM {{ ref("stg_orders") }}"#, |call| {
            assert_eq!(call.name, "stg_orders");
            Ok("analytics.stg_orders".to_string())
        })
        .unwrap();
        assert_eq!(rendered, "SELECT * FROM analytics.stg_orders");
    }

    #[test]
    fn test_render_rejects_unquoted_argument() {
        let err =
            render_refs("SELECT * FROM {{ ref(stg_orders) }}", |_| Ok(String::new())).unwrap_err();
        match err {
            CompileError::MalformedRef(snippet) => assert!(snippet.starts_with("{{ ref(")),
            other => panic!("Expected MalformedRef, got: {:?}", other),
        }
    }

    #[test]
    fn test_render_rejects_extra_arguments() {
        let sql = "SELECT * FROM {{ ref('a', 'b', 'c') }}";
        let err = render_refs(sql, |_| Ok(String::new())).unwrap_err();
        assert!(matches!(err, CompileError::MalformedRef(_)));
    }

    #[test]
    fn test_render_leaves_plain_sql_untouched() {
        let sql = "SELECT 'literal {{ not_a_ref }}' FROM raw.orders";
        let rendered = render_refs(sql, |_| Ok(String::new())).unwrap();
        assert_eq!(rendered, sql);
    }
}
