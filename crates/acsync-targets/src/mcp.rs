//! MCP server translation into each target's config format
//!
//! JSON targets (claude-code, gemini, opencode) merge a server section into the
//! existing settings document: every other key survives, the server section is
//! replaced wholesale. Codex keeps its servers in TOML and is edited with
//! `toml_edit` so comments and unrelated tables are preserved.

use crate::error::{Error, Result};
use crate::types::{McpServer, McpTransport, Target};
use regex::Regex;
use serde_json::{Map, Value, json};
use std::sync::LazyLock;
use toml_edit::{Array, DocumentMut, Item, Table, value};

/// Server section key used by claude-code and gemini
pub const MCP_SERVERS_KEY: &str = "mcpServers";
/// Server section key used by opencode
pub const OPENCODE_KEY: &str = "mcp";
/// Server table used by codex
pub const CODEX_KEY: &str = "mcp_servers";

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid env placeholder regex")
});

static BEARER_ENV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Bearer\s+\$\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("Invalid bearer header regex")
});

/// Replace the `key` section of a JSON settings document with `servers`.
pub fn merge_json(
    target: Target,
    existing: Option<&str>,
    key: &str,
    servers: Map<String, Value>,
) -> Result<String> {
    let mut root = match existing.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => map,
            _ => return Err(Error::InvalidMcpConfig { target }),
        },
        None => Map::new(),
    };
    root.insert(key.to_string(), Value::Object(servers));

    let mut out = serde_json::to_string_pretty(&Value::Object(root))?;
    out.push('\n');
    Ok(out)
}

/// Keys of the `key` object in a JSON document. Malformed input yields none.
pub fn json_server_names(content: &str, key: &str) -> Vec<String> {
    let doc = match serde_json::from_str::<Value>(content) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(key, error = %e, "Unparseable MCP config, assuming no servers");
            return Vec::new();
        }
    };
    doc.get(key)
        .and_then(Value::as_object)
        .map(|servers| servers.keys().cloned().collect())
        .unwrap_or_default()
}

/// Entry shape shared by claude-code and gemini. Env placeholders stay `${VAR}`.
pub fn standard_entry(server: &McpServer) -> Value {
    let mut entry = Map::new();
    match server.transport {
        McpTransport::Stdio => {
            if let Some(command) = &server.command {
                entry.insert("command".into(), json!(command));
            }
            if !server.args.is_empty() {
                entry.insert("args".into(), json!(server.args));
            }
            if !server.env.is_empty() {
                entry.insert("env".into(), json!(server.env));
            }
        }
        McpTransport::Http => {
            if let Some(url) = &server.url {
                entry.insert("url".into(), json!(url));
            }
            if !server.headers.is_empty() {
                entry.insert("headers".into(), json!(server.headers));
            }
        }
    }
    Value::Object(entry)
}

/// OpenCode entry: `local`/`remote` types, command as one array, `{env:VAR}` placeholders.
pub fn opencode_entry(server: &McpServer) -> Value {
    let mut entry = Map::new();
    match server.transport {
        McpTransport::Stdio => {
            entry.insert("type".into(), json!("local"));
            let command: Vec<&str> = server
                .command
                .iter()
                .map(String::as_str)
                .chain(server.args.iter().map(String::as_str))
                .collect();
            entry.insert("command".into(), json!(command));
        }
        McpTransport::Http => {
            entry.insert("type".into(), json!("remote"));
            if let Some(url) = &server.url {
                entry.insert("url".into(), json!(url));
            }
            if !server.headers.is_empty() {
                let headers: Map<String, Value> = server
                    .headers
                    .iter()
                    .map(|(k, v)| (k.clone(), json!(to_opencode_env(v))))
                    .collect();
                entry.insert("headers".into(), Value::Object(headers));
            }
        }
    }
    if !server.env.is_empty() {
        let env: Map<String, Value> = server
            .env
            .iter()
            .map(|(k, v)| (k.clone(), json!(to_opencode_env(v))))
            .collect();
        entry.insert("environment".into(), Value::Object(env));
    }
    if !server.is_enabled() {
        entry.insert("enabled".into(), json!(false));
    }
    Value::Object(entry)
}

/// Rewrite `${VAR}` placeholders to OpenCode's `{env:VAR}` spelling
pub fn to_opencode_env(input: &str) -> String {
    ENV_PLACEHOLDER.replace_all(input, "{env:$1}").into_owned()
}

/// Render codex's `[mcp_servers.*]` tables into `existing`.
///
/// Only HTTP servers are expressible. With nothing to render and no existing
/// document the result is empty.
pub fn render_codex(servers: &[&McpServer], existing: Option<&str>) -> Result<String> {
    let mut doc = match existing {
        Some(text) if !text.trim().is_empty() => text.parse::<DocumentMut>()?,
        _ => DocumentMut::new(),
    };
    doc.remove(CODEX_KEY);

    if !servers.is_empty() {
        let mut section = Table::new();
        section.set_implicit(true);
        for server in servers {
            section.insert(&server.name, Item::Table(codex_table(server)));
        }
        doc.insert(CODEX_KEY, Item::Table(section));
    }

    Ok(doc.to_string())
}

fn codex_table(server: &McpServer) -> Table {
    let mut table = Table::new();
    if let Some(url) = &server.url {
        table.insert("url", value(url.as_str()));
    }
    if !server.env_vars.is_empty() {
        let vars: Array = server.env_vars.iter().map(String::as_str).collect();
        table.insert("env_vars", value(vars));
    }
    if let Some(var) = bearer_token_env_var(server) {
        table.insert("bearer_token_env_var", value(var));
    }
    table
}

/// `TAVILY_API_KEY` from `Authorization: Bearer ${TAVILY_API_KEY}`
pub fn bearer_token_env_var(server: &McpServer) -> Option<String> {
    server
        .headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("authorization"))
        .and_then(|(_, v)| BEARER_ENV.captures(v.trim()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Keys of the `[mcp_servers]` table in a codex config. Malformed input yields none.
pub fn codex_server_names(content: &str) -> Vec<String> {
    let doc = match content.parse::<DocumentMut>() {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable codex config, assuming no servers");
            return Vec::new();
        }
    };
    doc.get(CODEX_KEY)
        .and_then(Item::as_table_like)
        .map(|t| t.iter().map(|(k, _)| k.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn env_placeholders_convert_for_opencode() {
        assert_eq!(to_opencode_env("Bearer ${TOKEN}"), "Bearer {env:TOKEN}");
        assert_eq!(to_opencode_env("plain"), "plain");
    }

    #[test]
    fn merge_rejects_non_object_document() {
        let err = merge_json(Target::ClaudeCode, Some("[1, 2]"), MCP_SERVERS_KEY, Map::new());
        assert!(matches!(err, Err(Error::InvalidMcpConfig { .. })));
    }

    #[test]
    fn merge_preserves_key_order_of_existing_document() {
        let existing = r#"{"zeta": 1, "alpha": 2}"#;
        let out = merge_json(Target::Gemini, Some(existing), MCP_SERVERS_KEY, Map::new()).unwrap();
        let zeta = out.find("zeta").unwrap();
        let alpha = out.find("alpha").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn codex_render_keeps_unrelated_settings() {
        let mut server = McpServer::http("docs", "https://example.com/mcp");
        server.env_vars = vec!["DOCS_KEY".into()];
        let existing = "model = \"gpt-5\"\n\n[mcp_servers.old]\nurl = \"https://old\"\n";

        let out = render_codex(&[&server], Some(existing)).unwrap();

        assert!(out.contains("model = \"gpt-5\""));
        assert!(out.contains("[mcp_servers.docs]"));
        assert!(!out.contains("mcp_servers.old"));
        assert_eq!(codex_server_names(&out), vec!["docs".to_string()]);
    }

    #[test]
    fn malformed_configs_list_no_servers() {
        assert!(json_server_names("{\"mcpServers\": ", MCP_SERVERS_KEY).is_empty());
        assert!(json_server_names("{\"mcpServers\": [1]}", MCP_SERVERS_KEY).is_empty());
        assert!(codex_server_names("[mcp_servers.docs\nurl = ").is_empty());
        assert_eq!(
            codex_server_names("[mcp_servers.docs]\nurl = \"https://d\"\n"),
            vec!["docs".to_string()]
        );
    }

    #[test]
    fn codex_render_is_stable_when_reapplied() {
        let server = McpServer::http("docs", "https://example.com/mcp");
        let first = render_codex(&[&server], Some("model = \"gpt-5\"\n")).unwrap();
        let second = render_codex(&[&server], Some(&first)).unwrap();
        assert_eq!(first, second);
    }
}
