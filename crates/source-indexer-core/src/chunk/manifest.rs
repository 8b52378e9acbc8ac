//! Summary chunker for `package.json` manifests.
//!
//! Instead of slicing raw JSON, the manifest is parsed and rendered into
//! up to three human-readable summaries:
//!
//! 1. **Overview** (always): name, version, description, module type,
//!    entry point, every dependency with its version specifier, and the
//!    "key technologies" among them.
//! 2. **Production dependencies** (only when `dependencies` is
//!    non-empty): bucketed into frontend / backend / database / AI-ML.
//! 3. **Development dependencies** (only when `devDependencies` is
//!    non-empty): bucketed into build tools / testing / linting /
//!    TypeScript.
//!
//! Bucketing is substring matching of each dependency name against the
//! keyword tables below; a dependency can land in several buckets.
//! Manifests that fail to parse (or are not JSON objects) come back as a
//! single raw chunk. No length filtering is applied here.

use serde_json::{Map, Value};

/// Keyword table: display name → substrings matched against dependency names.
pub type KeywordBuckets = &'static [(&'static str, &'static [&'static str])];

/// Dependency names containing any of these are listed as key technologies.
pub const KEY_TECHNOLOGIES: &[&str] = &[
    "react",
    "next",
    "vue",
    "angular",
    "express",
    "fastify",
    "qdrant",
    "transformers",
    "openai",
    "tailwind",
];

pub const PRODUCTION_BUCKETS: KeywordBuckets = &[
    ("Frontend", &["react", "next", "vue", "angular"]),
    ("Backend", &["express", "fastify", "koa"]),
    ("Database", &["qdrant", "mongo", "postgres", "redis"]),
    ("AI/ML", &["transformers", "openai", "anthropic", "ollama"]),
];

pub const DEVELOPMENT_BUCKETS: KeywordBuckets = &[
    ("Build Tools", &["nx", "webpack", "vite", "rollup"]),
    ("Testing", &["jest", "playwright", "cypress", "vitest"]),
    ("Linting", &["eslint", "prettier", "tslint"]),
    ("TypeScript", &["typescript", "@types"]),
];

/// Render a manifest into summary chunks, or return it raw if it is not
/// a JSON object. A blank manifest yields no chunks.
pub fn chunk_manifest(content: &str) -> Vec<String> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(pkg)) => summarize(&pkg),
        _ => vec![content.to_string()],
    }
}

fn summarize(pkg: &Map<String, Value>) -> Vec<String> {
    let deps = dependency_list(pkg, "dependencies");
    let dev_deps = dependency_list(pkg, "devDependencies");
    let all_deps = merge_dependencies(&deps, &dev_deps);

    let mut chunks = vec![overview(pkg, &all_deps)];

    if !deps.is_empty() {
        chunks.push(bucketed_summary(
            "Production Dependencies",
            "These are the main libraries used in production for:",
            &deps,
            PRODUCTION_BUCKETS,
        ));
    }

    if !dev_deps.is_empty() {
        chunks.push(bucketed_summary(
            "Development Dependencies",
            "Development tools include:",
            &dev_deps,
            DEVELOPMENT_BUCKETS,
        ));
    }

    chunks
}

fn overview(pkg: &Map<String, Value>, all_deps: &[(String, String)]) -> String {
    let listing = all_deps
        .iter()
        .map(|(name, version)| format!("- {name}: {version}"))
        .collect::<Vec<_>>()
        .join("\n");

    let key_tech = all_deps
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| matches_any(name, KEY_TECHNOLOGIES))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Package: {}\nVersion: {}\nDescription: {}\nType: {}\nMain: {}\n\n\
         This project uses the following libraries and dependencies:\n{}\n\n\
         Key technologies: {}",
        text_field(pkg, "name", "unknown"),
        text_field(pkg, "version", "unknown"),
        text_field(pkg, "description", "No description"),
        text_field(pkg, "type", "commonjs"),
        text_field(pkg, "main", "index.js"),
        listing,
        key_tech,
    )
}

fn bucketed_summary(
    title: &str,
    lead_in: &str,
    deps: &[(String, String)],
    buckets: KeywordBuckets,
) -> String {
    let listing = deps
        .iter()
        .map(|(name, version)| format!("{name}: {version}"))
        .collect::<Vec<_>>()
        .join("\n");

    let categories = buckets
        .iter()
        .map(|(label, keywords)| {
            let members = deps
                .iter()
                .map(|(name, _)| name.as_str())
                .filter(|name| matches_any(name, keywords))
                .collect::<Vec<_>>();
            let members = if members.is_empty() {
                "None".to_string()
            } else {
                members.join(", ")
            };
            format!("- {label}: {members}")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{title}:\n{listing}\n\n{lead_in}\n{categories}")
}

fn matches_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| name.contains(kw))
}

/// Ordered `(name, version)` pairs from a dependency table.
fn dependency_list(pkg: &Map<String, Value>, key: &str) -> Vec<(String, String)> {
    pkg.get(key)
        .and_then(Value::as_object)
        .map(|table| {
            table
                .iter()
                .map(|(name, version)| (name.clone(), value_text(version)))
                .collect()
        })
        .unwrap_or_default()
}

/// Production entries first, then dev-only entries. A name present in
/// both keeps its production position with the dev version specifier.
fn merge_dependencies(
    deps: &[(String, String)],
    dev_deps: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = deps.to_vec();
    for (name, version) in dev_deps {
        match merged.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = version.clone(),
            None => merged.push((name.clone(), version.clone())),
        }
    }
    merged
}

/// Field as display text; missing, null, empty or `false` fall back.
fn text_field(pkg: &Map<String, Value>, key: &str, fallback: &str) -> String {
    match pkg.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => fallback.to_string(),
        Some(Value::String(s)) if s.is_empty() => fallback.to_string(),
        Some(v) => value_text(v),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
