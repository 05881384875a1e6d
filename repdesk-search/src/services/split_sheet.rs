//! Split sheet validation, rendering and dispatch
//!
//! A split sheet is the song metadata plus every contributor and their
//! ownership percentage. Sending renders one HTML document per recipient
//! (greeting personalised, body identical) and mails them all concurrently.

use futures::future::try_join_all;
use repdesk_common::{total_share, Error, Result, SongInfo, Writer, SHARE_TOLERANCE};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::mail_client::{MailTransport, OutboundEmail};

/// A rule a split sheet breaks
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SplitSheetIssue {
    #[error("Song title is required")]
    MissingTitle,

    #[error("At least one writer with a name is required")]
    NoNamedWriter,

    #[error("{party} has a share outside 0-100% ({share:.2}%)")]
    ShareOutOfRange { party: String, share: f64 },

    #[error("Shares must total 100% (currently {total:.2}%)")]
    UnbalancedShares { total: f64 },

    #[error("At least one writer or publisher needs an email address")]
    NoRecipients,
}

/// Check every pre-send rule; an empty list means the sheet can be sent
pub fn validate_split_sheet(song: &SongInfo, writers: &[Writer]) -> Vec<SplitSheetIssue> {
    let mut issues = Vec::new();

    if song.title.trim().is_empty() {
        issues.push(SplitSheetIssue::MissingTitle);
    }

    if !writers.iter().any(|w| !w.full_name.trim().is_empty()) {
        issues.push(SplitSheetIssue::NoNamedWriter);
    }

    for (party, share) in party_shares(writers) {
        if !(0.0..=100.0).contains(&share) {
            issues.push(SplitSheetIssue::ShareOutOfRange { party, share });
        }
    }

    let total = total_share(writers);
    if !is_share_balanced(total) {
        issues.push(SplitSheetIssue::UnbalancedShares {
            total: (total * 100.0).round() / 100.0,
        });
    }

    if collect_recipients(writers).is_empty() {
        issues.push(SplitSheetIssue::NoRecipients);
    }

    issues
}

/// Every writer share and nested publisher share, labelled for messages
fn party_shares(writers: &[Writer]) -> Vec<(String, f64)> {
    fn label(name: &str, fallback: &str) -> String {
        let name = name.trim();
        if name.is_empty() {
            fallback.to_string()
        } else {
            name.to_string()
        }
    }

    writers
        .iter()
        .flat_map(|w| {
            std::iter::once((label(&w.full_name, "Unnamed writer"), w.share)).chain(
                w.publisher
                    .as_ref()
                    .map(|p| (label(&p.name, "Unnamed publisher"), p.share)),
            )
        })
        .collect()
}

/// Total equals 100 within the allowed tolerance
pub fn is_share_balanced(total: f64) -> bool {
    (total - 100.0).abs() <= SHARE_TOLERANCE
}

/// Someone who receives a copy of the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// Union of writer and nested-publisher emails, first occurrence kept
pub fn collect_recipients(writers: &[Writer]) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    let mut recipients = Vec::new();

    let participants = writers.iter().flat_map(|w| {
        std::iter::once((w.full_name.as_str(), w.email.as_str())).chain(
            w.publisher
                .as_ref()
                .map(|p| (p.name.as_str(), p.email.as_str())),
        )
    });

    for (name, email) in participants {
        let email = email.trim();
        if email.is_empty() || !seen.insert(email.to_lowercase()) {
            continue;
        }
        recipients.push(Recipient {
            name: name.trim().to_string(),
            email: email.to_string(),
        });
    }

    recipients
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_dash(s: &str) -> String {
    if s.trim().is_empty() {
        "&mdash;".to_string()
    } else {
        escape_html(s.trim())
    }
}

/// Render the sheet for one recipient
pub fn render_split_sheet_html(
    song: &SongInfo,
    writers: &[Writer],
    recipient_name: &str,
) -> String {
    let greeting = if recipient_name.trim().is_empty() {
        "Hello,".to_string()
    } else {
        format!("Hello {},", escape_html(recipient_name.trim()))
    };

    let mut rows = String::new();
    for writer in writers {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}%</td></tr>\n",
            or_dash(&writer.full_name),
            or_dash(&writer.role),
            or_dash(&writer.pro),
            or_dash(&writer.ipi_number),
            writer.share
        ));
        if let Some(publisher) = &writer.publisher {
            rows.push_str(&format!(
                concat!(
                    "<tr class=\"publisher\"><td>{}</td><td>Publisher</td>",
                    "<td>{}</td><td>{}</td><td>{:.2}%</td></tr>\n",
                ),
                or_dash(&publisher.name),
                or_dash(&publisher.pro),
                or_dash(&publisher.ipi_number),
                publisher.share
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Split Sheet: {title}</title></head>
<body style="font-family: Arial, sans-serif; color: #222;">
<p>{greeting}</p>
<p>You are listed as a participant on the split sheet below. Please review the ownership shares and reply to confirm your signature.</p>
<h2>Split Sheet: {title}</h2>
<table cellpadding="4">
<tr><th align="left">Artist</th><td>{artist}</td></tr>
<tr><th align="left">Album</th><td>{album}</td></tr>
<tr><th align="left">Release Date</th><td>{release}</td></tr>
<tr><th align="left">ISRC</th><td>{isrc}</td></tr>
</table>
<h3>Ownership</h3>
<table border="1" cellpadding="6" style="border-collapse: collapse;">
<tr><th>Name</th><th>Role</th><th>PRO</th><th>IPI</th><th>Share</th></tr>
{rows}<tr><th colspan="4" align="right">Total</th><th>{total:.2}%</th></tr>
</table>
<p>Signature: ______________________________ &nbsp; Date: ______________</p>
</body>
</html>
"#,
        title = or_dash(&song.title),
        greeting = greeting,
        artist = or_dash(&song.artist_name),
        album = or_dash(&song.album_title),
        release = or_dash(&song.release_date),
        isrc = or_dash(&song.isrc_code),
        rows = rows,
        total = total_share(writers),
    )
}

/// Mails split sheets to every participant with an address
pub struct SplitSheetNotifier {
    transport: Option<Arc<dyn MailTransport>>,
    from: String,
}

impl SplitSheetNotifier {
    /// `transport` is `None` when no mail credential is configured
    pub fn new(transport: Option<Arc<dyn MailTransport>>, from: impl Into<String>) -> Self {
        Self {
            transport,
            from: from.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Build one message per recipient
    pub fn compose(&self, song: &SongInfo, writers: &[Writer]) -> Vec<OutboundEmail> {
        let subject = format!("Split Sheet: {}", song.title.trim());
        collect_recipients(writers)
            .into_iter()
            .map(|r| OutboundEmail {
                from: self.from.clone(),
                html: render_split_sheet_html(song, writers, &r.name),
                to: vec![r.email],
                subject: subject.clone(),
            })
            .collect()
    }

    /// Send every message concurrently; any rejection fails the whole call
    ///
    /// Returns the number of messages sent. Validation is the caller's job.
    pub async fn send(&self, song: &SongInfo, writers: &[Writer]) -> Result<usize> {
        let transport = self.transport.as_ref().ok_or_else(|| {
            Error::Config(
                "Mail provider API key not configured (set REPDESK_MAIL_API_KEY or [mail] api_key)"
                    .to_string(),
            )
        })?;

        let emails = self.compose(song, writers);
        try_join_all(emails.iter().map(|email| transport.send(email))).await?;

        info!(title = %song.title, sent = emails.len(), "Split sheet sent");
        Ok(emails.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repdesk_common::Publisher;

    fn song() -> SongInfo {
        SongInfo {
            title: "Gin & Juice".to_string(),
            artist_name: "Snoop Dogg".to_string(),
            ..Default::default()
        }
    }

    fn writer(name: &str, email: &str, share: f64, publisher: Option<(&str, &str, f64)>) -> Writer {
        Writer {
            full_name: name.to_string(),
            email: email.to_string(),
            share,
            publisher: publisher.map(|(name, email, share)| Publisher {
                name: name.to_string(),
                email: email.to_string(),
                share,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_balanced_sheet_is_valid() {
        let writers = vec![writer(
            "Jane Doe",
            "jane@example.com",
            60.0,
            Some(("Doe Pub", "", 40.0)),
        )];
        assert!(validate_split_sheet(&song(), &writers).is_empty());
    }

    #[test]
    fn test_unbalanced_shares_reported() {
        let writers = vec![writer("Jane Doe", "jane@example.com", 60.0, None)];
        assert_eq!(
            validate_split_sheet(&song(), &writers),
            vec![SplitSheetIssue::UnbalancedShares { total: 60.0 }]
        );
    }

    #[test]
    fn test_out_of_range_shares_reported_even_when_balanced() {
        let writers = vec![
            writer("Jane Doe", "jane@example.com", 150.0, None),
            writer("John Roe", "", 0.0, Some(("Roe Pub", "", -50.0))),
        ];
        assert_eq!(
            validate_split_sheet(&song(), &writers),
            vec![
                SplitSheetIssue::ShareOutOfRange {
                    party: "Jane Doe".to_string(),
                    share: 150.0
                },
                SplitSheetIssue::ShareOutOfRange {
                    party: "Roe Pub".to_string(),
                    share: -50.0
                },
            ]
        );
    }

    #[test]
    fn test_tolerance() {
        assert!(is_share_balanced(33.33 + 33.33 + 33.34));
        assert!(is_share_balanced(100.005));
        assert!(!is_share_balanced(99.98));
    }

    #[test]
    fn test_all_rules_reported_together() {
        let writers = vec![writer("  ", "", 10.0, None)];
        let issues = validate_split_sheet(&SongInfo::default(), &writers);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0], SplitSheetIssue::MissingTitle);
        assert_eq!(issues[3], SplitSheetIssue::NoRecipients);
    }

    #[test]
    fn test_recipients_union_and_dedup() {
        let writers = vec![
            writer("Jane Doe", "jane@example.com", 50.0, Some(("Doe Pub", "pub@example.com", 0.0))),
            writer("John Roe", "", 25.0, Some(("Roe Pub", "JANE@example.com", 25.0))),
        ];
        let recipients = collect_recipients(&writers);
        assert_eq!(
            recipients,
            vec![
                Recipient { name: "Jane Doe".to_string(), email: "jane@example.com".to_string() },
                Recipient { name: "Doe Pub".to_string(), email: "pub@example.com".to_string() },
            ]
        );
    }

    #[test]
    fn test_html_personalised_and_escaped() {
        let writers = vec![writer("Jane <Doe>", "jane@example.com", 100.0, None)];
        let html = render_split_sheet_html(&song(), &writers, "Jane <Doe>");
        assert!(html.contains("Hello Jane &lt;Doe&gt;,"));
        assert!(html.contains("Split Sheet: Gin &amp; Juice"));
        assert!(html.contains("100.00%"));
    }

    #[test]
    fn test_bodies_differ_only_in_greeting() {
        let writers = vec![
            writer("Jane Doe", "jane@example.com", 50.0, None),
            writer("John Roe", "john@example.com", 50.0, None),
        ];
        let notifier = SplitSheetNotifier::new(None, "from@example.com");
        let emails = notifier.compose(&song(), &writers);
        assert_eq!(emails.len(), 2);
        assert_eq!(
            emails[0].html.replace("Hello Jane Doe,", ""),
            emails[1].html.replace("Hello John Roe,", "")
        );
        assert_eq!(emails[1].to, vec!["john@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_send_without_transport_is_config_error() {
        let notifier = SplitSheetNotifier::new(None, "from@example.com");
        let writers = vec![writer("Jane Doe", "jane@example.com", 100.0, None)];
        let err = notifier.send(&song(), &writers).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
