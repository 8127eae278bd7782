use crate::discovery::ScanTarget;
use crate::rules::types::{truncate_evidence, Finding, Rule, Severity};
use regex::Regex;
use std::sync::LazyLock;

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"http://[^\s"',)]+"#).expect("http url: invalid regex")
});

static LOCAL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"localhost|127\.0\.0\.1|0\.0\.0\.0|\[::1\]").expect("local address: invalid regex")
});

static ALL_INTERFACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0\.0\.0\.0").expect("all interfaces: invalid regex"));

static BIND_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)bind|host|listen|address").expect("bind context: invalid regex"));

static NETWORK_TRANSPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sse|websocket|ws://").expect("network transport: invalid regex"));

static AUTH_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)auth|token|key").expect("auth hint: invalid regex"));

static WS_URL_OR_SSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)ws://[^\s"']+|"transport"\s*:\s*"sse""#).expect("ws url or sse: invalid regex")
});

/// Flags insecure MCP transport configuration: plaintext HTTP to remote
/// hosts, servers bound to every interface, and network transports with no
/// visible authentication.
pub struct TransportSecurity;

impl Rule for TransportSecurity {
    fn id(&self) -> &str {
        "transport-security"
    }

    fn name(&self) -> &str {
        "Insecure Transport"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn description(&self) -> &str {
        "Detects MCP servers configured with insecure transport (HTTP instead of HTTPS, exposed ports)"
    }

    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for target in targets {
            let Some(content) = &target.content else {
                continue;
            };

            for (idx, line) in content.lines().enumerate() {
                if let Some(m) = HTTP_URL.find(line) {
                    // localhost HTTP is fine
                    let url = m.as_str();
                    if !LOCAL_ADDRESS.is_match(url) {
                        findings.push(
                            self.finding(
                                "Non-localhost HTTP endpoint in config",
                                "An HTTP (not HTTPS) URL pointing to a non-localhost address was found. Data sent over HTTP can be intercepted by network attackers.",
                                &target.path,
                                "Use HTTPS for all non-localhost MCP server connections.",
                            )
                            .with_line(idx + 1)
                            .with_evidence(url),
                        );
                    }
                }

                if ALL_INTERFACES.is_match(line) && BIND_CONTEXT.is_match(line) {
                    findings.push(
                        self.finding(
                            "MCP server bound to all interfaces (0.0.0.0)",
                            "Server is configured to listen on 0.0.0.0, which exposes it to all network interfaces. MCP servers should typically only be accessible locally.",
                            &target.path,
                            "Bind to 127.0.0.1 or localhost instead of 0.0.0.0 to restrict access to local connections only.",
                        )
                        .with_line(idx + 1)
                        .with_evidence(line.trim())
                        .with_severity(Severity::Medium),
                    );
                }

                if NETWORK_TRANSPORT.is_match(line) && !AUTH_HINT.is_match(line) {
                    let trimmed = line.trim();
                    // hits inside comments are not transport config
                    if trimmed.starts_with('#') || trimmed.starts_with("//") {
                        continue;
                    }
                    if WS_URL_OR_SSE.is_match(line) {
                        findings.push(
                            self.finding(
                                "SSE/WebSocket transport without visible auth",
                                "A network transport (SSE or WebSocket) is configured without apparent authentication. Network-based MCP transports should include authentication to prevent unauthorized access.",
                                &target.path,
                                "Add authentication (API key, token, or mTLS) to network-based MCP transports.",
                            )
                            .with_line(idx + 1)
                            .with_evidence(truncate_evidence(trimmed))
                            .with_severity(Severity::Medium),
                        );
                    }
                }
            }
        }

        findings
    }
}
