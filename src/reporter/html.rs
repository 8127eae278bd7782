use crate::reporter::Reporter;
use crate::rules::{Finding, ScanResult, Summary};

/// Self-contained HTML report, suitable for CI artifacts. All styling is
/// inlined so the file can be opened without network access.
pub struct HtmlReporter;

impl HtmlReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn render_finding(f: &Finding) -> String {
    let severity_class = f.severity.as_str();

    let location = match f.line {
        Some(line) => format!("{}:{line}", f.file_path),
        None => f.file_path.clone(),
    };

    let evidence_html = match &f.evidence {
        Some(evidence) => format!(
            r#"
                <div class="finding-evidence">
                    <pre><code>{}</code></pre>
                </div>"#,
            html_escape(evidence)
        ),
        None => String::new(),
    };

    format!(
        r#"
            <div class="finding severity-{}">
                <div class="finding-header">
                    <span class="finding-id">{}</span>
                    <span class="severity-badge {}">{}</span>
                </div>
                <div class="finding-title">{}</div>
                <div class="finding-message">{}</div>
                <div class="finding-location">
                    <code>{}</code>
                </div>{}
                <div class="finding-recommendation">
                    <strong>Fix:</strong> {}
                </div>
            </div>"#,
        severity_class,
        html_escape(&f.rule_id),
        severity_class,
        f.severity,
        html_escape(&f.title),
        html_escape(&f.description),
        html_escape(&location),
        evidence_html,
        html_escape(&f.recommendation)
    )
}

impl Reporter for HtmlReporter {
    fn report(&self, result: &ScanResult) -> String {
        let summary = Summary::from_findings(&result.findings);
        let status_class = if summary.passed { "passed" } else { "failed" };
        let status_text = if summary.passed { "PASSED" } else { "FAILED" };

        let findings_html: String = result.findings.iter().map(render_finding).collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>MCP Fortify Security Report</title>
    <style>
        :root {{
            --critical: #dc2626;
            --high: #ea580c;
            --medium: #ca8a04;
            --low: #2563eb;
            --info: #6b7280;
            --passed: #16a34a;
            --failed: #dc2626;
        }}

        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}

        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #1f2937;
            background: #f3f4f6;
            padding: 2rem;
        }}

        .container {{
            max-width: 1200px;
            margin: 0 auto;
        }}

        .header {{
            background: white;
            border-radius: 12px;
            padding: 2rem;
            margin-bottom: 2rem;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }}

        .header h1 {{
            font-size: 1.75rem;
            margin-bottom: 0.5rem;
        }}

        .header-meta {{
            color: #6b7280;
            font-size: 0.9rem;
        }}

        .status {{
            display: inline-flex;
            align-items: center;
            padding: 0.5rem 1rem;
            border-radius: 9999px;
            font-weight: 600;
            margin-top: 1rem;
        }}

        .status.passed {{
            background: #dcfce7;
            color: var(--passed);
        }}

        .status.failed {{
            background: #fee2e2;
            color: var(--failed);
        }}

        .summary {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }}

        .summary-card {{
            background: white;
            border-radius: 12px;
            padding: 1.5rem;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }}

        .summary-card h3 {{
            font-size: 0.875rem;
            color: #6b7280;
            text-transform: uppercase;
            margin-bottom: 0.5rem;
        }}

        .summary-value {{
            font-size: 2rem;
            font-weight: 700;
        }}

        .summary-value.critical {{ color: var(--critical); }}
        .summary-value.high {{ color: var(--high); }}
        .summary-value.medium {{ color: var(--medium); }}
        .summary-value.low {{ color: var(--low); }}
        .summary-value.info {{ color: var(--info); }}

        .findings {{
            background: white;
            border-radius: 12px;
            padding: 1.5rem;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }}

        .findings h2 {{
            margin-bottom: 1rem;
        }}

        .finding {{
            border: 1px solid #e5e7eb;
            border-radius: 8px;
            padding: 1rem;
            margin-bottom: 1rem;
        }}

        .finding.severity-critical {{ border-left: 4px solid var(--critical); }}
        .finding.severity-high {{ border-left: 4px solid var(--high); }}
        .finding.severity-medium {{ border-left: 4px solid var(--medium); }}
        .finding.severity-low {{ border-left: 4px solid var(--low); }}
        .finding.severity-info {{ border-left: 4px solid var(--info); }}

        .finding-header {{
            display: flex;
            align-items: center;
            gap: 0.5rem;
            margin-bottom: 0.5rem;
        }}

        .finding-id {{
            font-weight: 600;
            font-family: monospace;
        }}

        .severity-badge {{
            padding: 0.25rem 0.5rem;
            border-radius: 4px;
            font-size: 0.75rem;
            font-weight: 600;
            text-transform: uppercase;
        }}

        .severity-badge.critical {{ background: #fee2e2; color: var(--critical); }}
        .severity-badge.high {{ background: #ffedd5; color: var(--high); }}
        .severity-badge.medium {{ background: #fef3c7; color: var(--medium); }}
        .severity-badge.low {{ background: #dbeafe; color: var(--low); }}
        .severity-badge.info {{ background: #f3f4f6; color: var(--info); }}

        .finding-title {{
            font-weight: 600;
            margin-bottom: 0.25rem;
        }}

        .finding-message {{
            font-size: 0.95rem;
            margin-bottom: 0.5rem;
        }}

        .finding-location {{
            font-size: 0.875rem;
            color: #6b7280;
            margin-bottom: 0.5rem;
        }}

        .finding-evidence {{
            background: #1f2937;
            border-radius: 6px;
            padding: 0.75rem;
            margin-bottom: 0.5rem;
            overflow-x: auto;
        }}

        .finding-evidence pre {{
            margin: 0;
        }}

        .finding-evidence code {{
            color: #e5e7eb;
            font-family: 'SF Mono', Monaco, monospace;
            font-size: 0.875rem;
        }}

        .finding-recommendation {{
            font-size: 0.875rem;
            color: #4b5563;
        }}

        .no-findings {{
            text-align: center;
            padding: 3rem;
            color: #6b7280;
        }}

        .footer {{
            text-align: center;
            margin-top: 2rem;
            color: #9ca3af;
            font-size: 0.875rem;
        }}

        .footer a {{
            color: #6b7280;
            text-decoration: none;
        }}

        .footer a:hover {{
            text-decoration: underline;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>MCP Fortify Security Report</h1>
            <div class="header-meta">
                <div>Scanned: {} files in {}ms</div>
                <div>Version: {}</div>
                <div>Generated: {}</div>
            </div>
            <div class="status {}">
                {}
            </div>
        </div>

        <div class="summary">
            <div class="summary-card">
                <h3>Critical</h3>
                <div class="summary-value critical">{}</div>
            </div>
            <div class="summary-card">
                <h3>High</h3>
                <div class="summary-value high">{}</div>
            </div>
            <div class="summary-card">
                <h3>Medium</h3>
                <div class="summary-value medium">{}</div>
            </div>
            <div class="summary-card">
                <h3>Low</h3>
                <div class="summary-value low">{}</div>
            </div>
            <div class="summary-card">
                <h3>Info</h3>
                <div class="summary-value info">{}</div>
            </div>
            <div class="summary-card">
                <h3>Total Findings</h3>
                <div class="summary-value">{}</div>
            </div>
        </div>

        <div class="findings">
            <h2>Findings</h2>
            {}
        </div>

        <div class="footer">
            Generated by <a href="https://github.com/SSMMSS884/mcp-fortify">mcp-fortify</a> v{}
        </div>
    </div>
</body>
</html>"#,
            result.scanned_files.len(),
            result.duration_ms,
            env!("CARGO_PKG_VERSION"),
            html_escape(&result.timestamp),
            status_class,
            status_text,
            summary.critical,
            summary.high,
            summary.medium,
            summary.low,
            summary.info,
            result.findings.len(),
            if result.findings.is_empty() {
                "<div class=\"no-findings\">No security issues found.</div>".to_string()
            } else {
                findings_html
            },
            env!("CARGO_PKG_VERSION")
        )
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
