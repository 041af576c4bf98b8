//! Path matching.
//!
//! Resolves a normalized request path and method to the most specific
//! route of the model. Literal segments compare case-sensitively; a
//! parameter segment accepts any non-empty request segment and binds it.
//! When several routes match, the one with the most literal segments wins
//! and declaration order breaks ties.

use crate::model::{Route, Segment, split_segments};
use std::collections::HashMap;

/// Path parameter bindings extracted while matching
pub type Bindings = HashMap<String, String>;

/// Outcome of matching one request against the route model
#[derive(Debug)]
pub enum MatchResult<'a> {
    Matched { route: &'a Route, bindings: Bindings },
    Unmatched,
}

impl MatchResult<'_> {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// Strip the URL fragment and one trailing slash.
///
/// Runs once per request, before matching.
pub fn normalize_path(path: &str) -> &str {
    let path = path.split('#').next().unwrap_or_default();
    path.strip_suffix('/').unwrap_or(path)
}

/// Find the most specific route for `path` and `method`.
pub fn find_route<'a>(routes: &'a [Route], path: &str, method: &str) -> MatchResult<'a> {
    let request: Vec<&str> = split_segments(path).collect();
    let mut best: Option<(&Route, Bindings, usize)> = None;

    for route in routes.iter().filter(|r| r.method == method) {
        let Some(bindings) = match_segments(route.template.segments(), &request) else {
            continue;
        };

        let literals = route.template.literal_count();
        // strictly greater keeps the earliest declaration on ties
        if best.as_ref().is_none_or(|(_, _, top)| literals > *top) {
            best = Some((route, bindings, literals));
        }
    }

    match best {
        Some((route, bindings, _)) => {
            tracing::debug!(
                path,
                method,
                template = %route.template,
                "Matched route"
            );
            MatchResult::Matched { route, bindings }
        }
        None => MatchResult::Unmatched,
    }
}

fn match_segments(template: &[Segment], request: &[&str]) -> Option<Bindings> {
    if template.len() != request.len() {
        return None;
    }

    let mut bindings = Bindings::new();
    for (segment, value) in template.iter().zip(request) {
        match segment {
            Segment::Literal(lit) if lit == value => {}
            Segment::Param(name) if !value.is_empty() => {
                bindings.insert(name.clone(), (*value).to_string());
            }
            _ => return None,
        }
    }

    Some(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Api, Response};

    fn pets_api() -> Api {
        Api::new(vec![
            Route::new("/pets/{id}", "GET", vec![Response::new(200)]),
            Route::new("/pets/active", "GET", vec![Response::new(200)]),
            Route::new("/pets", "POST", vec![Response::new(201)]),
            Route::new("/owners/{owner}/pets/{pet}", "GET", vec![Response::new(200)]),
            Route::new("/", "GET", vec![Response::new(200)]),
        ])
        .unwrap()
    }

    fn matched_template(result: &MatchResult<'_>) -> String {
        match result {
            MatchResult::Matched { route, .. } => route.template.to_string(),
            MatchResult::Unmatched => panic!("expected a match"),
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a/b/#frag"), "/a/b");
        assert_eq!(normalize_path("/a/b/"), "/a/b");
        assert_eq!(normalize_path("/a/b"), "/a/b");
        assert_eq!(normalize_path("/pets/active#x/"), "/pets/active");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_normalize_path_is_idempotent() {
        for path in ["/a/b/#frag", "/a/b/", "/a/b", "/", "/pets/1#x"] {
            let once = normalize_path(path);
            assert_eq!(normalize_path(once), once);
        }
    }

    #[test]
    fn test_literal_route_beats_parameter_route() {
        let api = pets_api();
        let result = find_route(api.routes(), "/pets/active", "GET");
        assert_eq!(matched_template(&result), "/pets/active");
    }

    #[test]
    fn test_parameter_route_binds_value() {
        let api = pets_api();
        match find_route(api.routes(), "/pets/42", "GET") {
            MatchResult::Matched { route, bindings } => {
                assert_eq!(route.template.to_string(), "/pets/{id}");
                assert_eq!(bindings.get("id").map(String::as_str), Some("42"));
            }
            MatchResult::Unmatched => panic!("expected a match"),
        }
    }

    #[test]
    fn test_multiple_bindings() {
        let api = pets_api();
        match find_route(api.routes(), "/owners/ann/pets/7", "GET") {
            MatchResult::Matched { bindings, .. } => {
                assert_eq!(bindings.len(), 2);
                assert_eq!(bindings["owner"], "ann");
                assert_eq!(bindings["pet"], "7");
            }
            MatchResult::Unmatched => panic!("expected a match"),
        }
    }

    #[test]
    fn test_method_must_match() {
        let api = pets_api();
        assert!(!find_route(api.routes(), "/pets/1", "DELETE").is_found());
        assert!(find_route(api.routes(), "/pets", "POST").is_found());
        assert!(!find_route(api.routes(), "/pets", "GET").is_found());
    }

    #[test]
    fn test_method_comparison_is_case_sensitive() {
        let api = pets_api();
        assert!(!find_route(api.routes(), "/pets/1", "get").is_found());
        assert!(find_route(api.routes(), "/pets/1", "GET").is_found());
    }

    #[test]
    fn test_segment_count_must_match() {
        let api = pets_api();
        assert!(!find_route(api.routes(), "/pets/1/toys", "GET").is_found());
    }

    #[test]
    fn test_parameter_rejects_empty_segment() {
        let api = pets_api();
        assert!(!find_route(api.routes(), "/owners//pets/7", "GET").is_found());
    }

    #[test]
    fn test_literal_comparison_is_case_sensitive() {
        let api = pets_api();
        // falls through to the parameterized route
        let result = find_route(api.routes(), "/pets/Active", "GET");
        assert_eq!(matched_template(&result), "/pets/{id}");
    }

    #[test]
    fn test_root_path() {
        let api = pets_api();
        let result = find_route(api.routes(), normalize_path("/"), "GET");
        assert_eq!(matched_template(&result), "/");
    }

    #[test]
    fn test_ties_go_to_first_declared() {
        let api = Api::new(vec![
            Route::new("/{kind}/list", "GET", vec![Response::new(200)]),
            Route::new("/items/{page}", "GET", vec![Response::new(202)]),
        ])
        .unwrap();

        let result = find_route(api.routes(), "/items/list", "GET");
        assert_eq!(matched_template(&result), "/{kind}/list");
    }
}
