use crate::config::PROG_NAME;
use crate::rules::MatchResult;
use crate::types::Post;
use chrono::{DateTime, Utc};

const CRLF: &str = "\r\n";

/// A plain-text mail message summarizing one batch of posts.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: DateTime<Utc>,
    pub body: String,
}

impl Report {
    /// Report on a gathered batch and its rule matches.
    pub fn compose(from: &str, to: &str, subreddit: &str, posts: &[Post], matches: &MatchResult) -> Self {
        let mut lines = vec!["Posts:".to_string()];
        lines.extend(
            posts
                .iter()
                .enumerate()
                .map(|(i, post)| format!("{}. {}", i + 1, post_link(post))),
        );

        lines.push(String::new());
        lines.push("Matches:".to_string());
        lines.extend(matches.entries().into_iter().enumerate().map(|(i, (rule, post))| {
            match rule {
                Some(rule) => format!("{}({}). {}", i + 1, rule, post_link(post)),
                None => format!("{}. {}", i + 1, post_link(post)),
            }
        }));

        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("{PROG_NAME} Report: \"{subreddit}\""),
            date: Utc::now(),
            body: lines.join(CRLF),
        }
    }

    /// Sent once at start-up to prove that mail delivery works.
    pub fn initializing(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("Initializing {PROG_NAME}"),
            date: Utc::now(),
            body: format!("{PROG_NAME} is watching for posts."),
        }
    }

    /// Full message with headers, ready for a mail transfer agent.
    pub fn to_message(&self) -> String {
        let mut headers = Vec::new();
        if !self.from.is_empty() {
            headers.push(format!("From: {}", self.from));
        }
        headers.push(format!("To: {}", self.to));
        headers.push(format!("Subject: {}", self.subject));
        headers.push(format!("Date: {}", self.date.to_rfc2822()));
        headers.push("Content-Type: text/plain; charset=utf-8".to_string());

        format!("{}{CRLF}{CRLF}{}{CRLF}", headers.join(CRLF), self.body)
    }
}

// Link posts point at their target; self posts only have the permalink.
fn post_link(post: &Post) -> String {
    if !post.url.is_empty() {
        post.url.clone()
    } else if !post.permalink.is_empty() {
        format!("https://www.reddit.com{}", post.permalink)
    } else {
        post.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn posts() -> Vec<Post> {
        vec![
            Post::new("a", "RAM $50").with_url("https://example.com/a"),
            Post::new("b", "SSD $40").with_url("https://example.com/b"),
        ]
    }

    #[test]
    fn per_rule_report_lists_posts_and_rule_ids() {
        let batch = posts();
        let mut matches = BTreeMap::new();
        matches.insert("ramunderprice".to_string(), batch[0].clone());

        let report = Report::compose(
            "foo@bar.com",
            "baz@bar.com",
            "buildapcsales",
            &batch,
            &MatchResult::PerRule(matches),
        );

        assert_eq!(report.subject, "rsb Report: \"buildapcsales\"");
        assert_eq!(
            report.body,
            "Posts:\r\n1. https://example.com/a\r\n2. https://example.com/b\r\n\r\nMatches:\r\n1(ramunderprice). https://example.com/a"
        );
    }

    #[test]
    fn all_rules_report_has_plain_numbering() {
        let batch = posts();
        let report = Report::compose(
            "",
            "baz@bar.com",
            "buildapcsales",
            &batch,
            &MatchResult::AllRules(vec![batch[1].clone()]),
        );
        assert!(report.body.ends_with("Matches:\r\n1. https://example.com/b"));
    }

    #[test]
    fn message_has_headers_then_body() {
        let report = Report::initializing("foo@bar.com", "baz@bar.com");
        let message = report.to_message();

        assert!(message.starts_with("From: foo@bar.com\r\nTo: baz@bar.com\r\nSubject: Initializing rsb\r\n"));
        let (headers, body) = message.split_once("\r\n\r\n").unwrap();
        assert!(headers.contains("Date: "));
        assert_eq!(body, "rsb is watching for posts.\r\n");
    }

    #[test]
    fn self_posts_link_to_permalink() {
        let mut post = Post::new("c", "question");
        post.permalink = "/r/buildapcsales/comments/c/question/".to_string();
        assert_eq!(
            post_link(&post),
            "https://www.reddit.com/r/buildapcsales/comments/c/question/"
        );
    }
}
