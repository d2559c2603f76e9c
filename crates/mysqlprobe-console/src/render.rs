//! Rendering of the probe report.

use mysqlprobe_mysql::ProbeReport;
use mysqlprobe_mysql::protocol::charset;

use crate::mode::OutputMode;

/// Render `report` for stdout, without a trailing newline.
pub fn render(report: &ProbeReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => render_json(report),
        OutputMode::Plain => render_plain(report),
    }
}

fn render_json(report: &ProbeReport) -> String {
    report.to_json().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize report");
        serde_json::json!({
            "ok": false,
            "mysql": false,
            "error": format!("failed to serialize report: {e}"),
        })
        .to_string()
    })
}

fn render_plain(report: &ProbeReport) -> String {
    let mut out = String::new();
    push_line(&mut out, "ok", yes_no(report.ok));
    push_line(&mut out, "mysql", yes_no(report.mysql));

    if let Some(error) = &report.error {
        push_line(&mut out, "error", error);
    }
    if let Some(reason) = &report.reason {
        push_line(&mut out, "reason", reason);
    }
    if let Some(hex) = &report.first_bytes_hex {
        push_line(&mut out, "first_bytes_hex", hex);
    }
    if let Some(version) = &report.server_version {
        push_line(&mut out, "server_version", version);
    }
    if let Some(protocol) = report.protocol {
        push_line(&mut out, "protocol", &protocol.to_string());
    }
    if let Some(id) = report.connection_id {
        push_line(&mut out, "connection_id", &id.to_string());
    }
    if let Some(flags) = report.capability_flags {
        push_line(&mut out, "capability_flags", &format!("0x{flags:08x}"));
    }
    if !report.capability_names.is_empty() {
        push_line(&mut out, "capabilities", &report.capability_names.join(", "));
    }
    if let Some(code) = report.character_set {
        let value = match charset::name(code) {
            Some(name) => format!("{code} ({name})"),
            None => code.to_string(),
        };
        push_line(&mut out, "character_set", &value);
    }
    if let Some(status) = report.status_flags {
        let value = if report.status_names.is_empty() {
            format!("0x{status:04x}")
        } else {
            format!("0x{status:04x} ({})", report.status_names.join(", "))
        };
        push_line(&mut out, "status_flags", &value);
    }
    if let Some(plugin) = &report.auth_plugin {
        push_line(&mut out, "auth_plugin", plugin);
    }
    if let Some(missing) = report.truncated_at {
        push_line(&mut out, "truncated_at", missing.as_str());
    }
    if let Some(hex) = &report.preview_hex {
        push_line(&mut out, "preview_hex", hex);
    }
    out
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn push_line(out: &mut String, label: &str, value: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(label);
    out.push_str(": ");
    out.push_str(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysqlprobe_mysql::TailField;

    fn detected_report() -> ProbeReport {
        ProbeReport {
            ok: true,
            mysql: true,
            protocol: Some(10),
            server_version: Some("8.4.6".to_string()),
            connection_id: Some(10),
            capability_flags: Some(0xDFFF_FFFF),
            character_set: Some(255),
            status_flags: Some(2),
            auth_plugin: Some("caching_sha2_password".to_string()),
            capability_names: vec!["CLIENT_PROTOCOL_41", "CLIENT_PLUGIN_AUTH"],
            ..ProbeReport::default()
        }
    }

    #[test]
    fn json_is_single_line() {
        let out = render(&detected_report(), OutputMode::Json);
        assert!(!out.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["capability_flags"], 3_758_096_383_u32);
        assert_eq!(value["auth_plugin"], "caching_sha2_password");
        assert!(value.get("capability_names").is_none());
    }

    #[test]
    fn plain_lists_fields() {
        let out = render(&detected_report(), OutputMode::Plain);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ok: yes");
        assert_eq!(lines[1], "mysql: yes");
        assert!(lines.contains(&"server_version: 8.4.6"));
        assert!(lines.contains(&"capability_flags: 0xdfffffff"));
        assert!(lines.contains(&"capabilities: CLIENT_PROTOCOL_41, CLIENT_PLUGIN_AUTH"));
        assert!(lines.contains(&"character_set: 255 (utf8mb4_0900_ai_ci)"));
        assert!(lines.contains(&"status_flags: 0x0002"));
    }

    #[test]
    fn plain_names_status_flags() {
        let report = ProbeReport {
            status_names: vec!["SERVER_STATUS_AUTOCOMMIT"],
            ..detected_report()
        };
        let out = render(&report, OutputMode::Plain);
        assert!(out.contains("\nstatus_flags: 0x0002 (SERVER_STATUS_AUTOCOMMIT)\n"));

        let json = render(&report, OutputMode::Json);
        assert!(!json.contains("SERVER_STATUS_AUTOCOMMIT"));
    }

    #[test]
    fn plain_failure() {
        let report = ProbeReport {
            error: Some("dial failed: 10.0.0.1:3306: connection refused".to_string()),
            ..ProbeReport::default()
        };
        assert_eq!(
            render(&report, OutputMode::Plain),
            "ok: no\nmysql: no\nerror: dial failed: 10.0.0.1:3306: connection refused"
        );
    }

    #[test]
    fn plain_marks_truncation() {
        let report = ProbeReport {
            ok: true,
            mysql: true,
            character_set: Some(7),
            truncated_at: Some(TailField::AuthPluginName),
            ..ProbeReport::default()
        };
        let out = render(&report, OutputMode::Plain);
        assert!(out.contains("character_set: 7\n"));
        assert!(out.ends_with("truncated_at: auth plugin name"));
    }
}
