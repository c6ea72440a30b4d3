//! End-to-end tests for the bot pipeline: config → bound rules → gathered
//! batch → matches → report.
//!
//! No network or mail transfer agent is needed: posts come from a
//! `StaticSource` and reports land in a recording mailer.

use anyhow::Result;
use rsb_core::rules::read_rule;
use rsb_core::{
    bind, BindError, BotConfig, MatchMode, MatchResult, Mailer, PollOutcome, Post, Report,
    RuleRegistry, SearchBot, StaticSource,
};
use std::sync::Arc;

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct RecordingMailer {
    sent: Vec<Report>,
    failures_left: usize,
}

impl RecordingMailer {
    fn failing(times: usize) -> Self {
        Self {
            sent: Vec::new(),
            failures_left: times,
        }
    }
}

impl Mailer for RecordingMailer {
    fn send(&mut self, report: &Report) -> Result<()> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            anyhow::bail!("mail transfer agent unavailable");
        }
        self.sent.push(report.clone());
        Ok(())
    }
}

fn config(json: &str) -> BotConfig {
    let config = BotConfig::parse_str(json).expect("test config should parse");
    config.validate().expect("test config should validate");
    config
}

fn post(id: &str, title: &str) -> Post {
    Post::new(id, title).with_url(&format!("https://example.com/{id}"))
}

// ============================================================================
// Binding from a config document
// ============================================================================

mod binding {
    use super::*;

    #[test]
    fn config_document_binds_builtin_rules() {
        let registry = RuleRegistry::with_builtin_rules();
        let config = config(
            r#"{ "rules": [ { "id": "ramunderprice", "configs": { "price": 100 } } ] }"#,
        );

        let rules = bind(&registry, &config.rules).unwrap();
        assert_eq!(rules.len(), 1);

        let rule = read_rule(&rules[0]);
        assert!(rule.matches(&post("a", "32GB RAM $99.99")));
        assert!(!rule.matches(&post("b", "32GB RAM $150")));
        assert!(!rule.matches(&post("c", "32GB SSD $50")));
        assert!(!rule.matches(&post("d", "RAM $50 or $70")));
        assert!(!rule.matches(&post("e", "RAM")));
    }

    #[test]
    fn unknown_rule_aborts_binding() {
        let registry = RuleRegistry::with_builtin_rules();
        let config = config(
            r#"{ "rules": [ { "id": "ramunderprice" }, { "id": "unknown-rule", "configs": {} } ] }"#,
        );

        let err = bind(&registry, &config.rules).err().unwrap();
        assert!(matches!(err, BindError::NotFound(ref e) if e.name == "unknown-rule"));
    }

    #[test]
    fn separate_registries_do_not_share_configuration() {
        let first = RuleRegistry::with_builtin_rules();
        let second = RuleRegistry::with_builtin_rules();
        let config = config(r#"{ "rules": [ { "id": "ramunderprice", "configs": { "price": 500 } } ] }"#);
        bind(&first, &config.rules).unwrap();

        let a = first.lookup("ramunderprice").unwrap();
        let b = second.lookup("ramunderprice").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(read_rule(&a).matches(&post("a", "RAM $400")));
        assert!(!read_rule(&b).matches(&post("a", "RAM $400")));
    }
}

// ============================================================================
// Gather → match → report
// ============================================================================

mod pipeline {
    use super::*;

    fn bot(
        config: &BotConfig,
        batches: Vec<Vec<Post>>,
    ) -> SearchBot<StaticSource, RecordingMailer> {
        bot_with_mailer(config, batches, RecordingMailer::default())
    }

    fn bot_with_mailer(
        config: &BotConfig,
        batches: Vec<Vec<Post>>,
        mailer: RecordingMailer,
    ) -> SearchBot<StaticSource, RecordingMailer> {
        let registry = RuleRegistry::with_builtin_rules();
        let rules = bind(&registry, &config.rules).unwrap();
        SearchBot::new(
            config,
            "buildapcsales",
            rules,
            StaticSource::new(batches),
            mailer,
        )
    }

    #[test]
    fn reports_once_threshold_is_met() {
        let config = config(
            r#"{
                "sendmail_from": "foo@bar.com",
                "sendmail_to": "baz@bar.com",
                "post_threshold": 3,
                "rules": [ { "id": "ramunderprice", "configs": { "price": 100 } } ]
            }"#,
        );
        let mut bot = bot(
            &config,
            vec![
                vec![post("a", "16GB RAM $60"), post("b", "GPU $300")],
                vec![post("c", "32GB RAM $90")],
            ],
        );

        assert_eq!(bot.poll().unwrap(), PollOutcome::Gathering { queued: 2 });
        assert!(bot.mailer().sent.is_empty());

        let PollOutcome::Reported { posts, matches } = bot.poll().unwrap() else {
            panic!("expected a report after the threshold");
        };
        assert_eq!(posts, 3);
        // last match wins per rule
        let MatchResult::PerRule(matches) = matches else {
            panic!("expected per-rule matches");
        };
        assert_eq!(matches["ramunderprice"].id, "c");

        let sent = &bot.mailer().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "baz@bar.com");
        assert!(sent[0].body.contains("3. https://example.com/c"));
        assert!(sent[0].body.contains("1(ramunderprice). https://example.com/c"));
    }

    #[test]
    fn all_rules_mode_requires_every_rule() {
        let config = config(
            r#"{
                "sendmail_to": "baz@bar.com",
                "post_threshold": 2,
                "match_mode": "all_rules",
                "rules": [
                    { "id": "ramunderprice", "configs": { "price": 200 } },
                    { "id": "ramunder100" }
                ]
            }"#,
        );
        assert_eq!(config.match_mode, MatchMode::AllRules);

        let mut bot = bot(
            &config,
            vec![vec![post("a", "RAM $150"), post("b", "RAM $80")]],
        );
        let PollOutcome::Reported { matches, .. } = bot.run_once().unwrap() else {
            panic!("expected a report");
        };
        assert_eq!(matches, MatchResult::AllRules(vec![post("b", "RAM $80")]));
    }

    #[test]
    fn repeated_stickies_do_not_fill_the_batch() {
        let config = config(r#"{ "post_threshold": 2, "rules": [] }"#);
        let sticky = post("s", "Daily discussion").stickied();
        let mut bot = bot(
            &config,
            vec![
                vec![sticky.clone()],
                vec![sticky.clone()],
                vec![sticky, post("a", "RAM $10")],
            ],
        );

        assert_eq!(bot.poll().unwrap(), PollOutcome::Gathering { queued: 1 });
        assert_eq!(bot.poll().unwrap(), PollOutcome::Gathering { queued: 1 });
        assert!(matches!(bot.poll().unwrap(), PollOutcome::Reported { posts: 2, .. }));
    }

    #[test]
    fn failed_send_keeps_the_batch_for_the_next_poll() {
        let config = config(
            r#"{
                "sendmail_to": "baz@bar.com",
                "post_threshold": 2,
                "rules": [ { "id": "ramunder100" } ]
            }"#,
        );
        let mut bot = bot_with_mailer(
            &config,
            vec![
                vec![post("a", "RAM $40"), post("b", "GPU $300")],
                vec![post("c", "SSD $70")],
            ],
            RecordingMailer::failing(1),
        );

        let err = bot.poll().unwrap_err();
        assert!(format!("{err:#}").contains("mail transfer agent unavailable"));
        assert!(bot.mailer().sent.is_empty());

        let PollOutcome::Reported { posts, .. } = bot.poll().unwrap() else {
            panic!("expected the retained batch to be reported");
        };
        assert_eq!(posts, 3);
        let body = &bot.mailer().sent[0].body;
        assert!(body.contains("1. https://example.com/a"));
        assert!(body.contains("3. https://example.com/c"));
        assert!(body.contains("1(ramunder100). https://example.com/a"));
    }

    #[test]
    fn announce_sends_the_initialization_message() {
        let config = config(r#"{ "sendmail_from": "foo@bar.com", "sendmail_to": "baz@bar.com" }"#);
        let mut bot = bot(&config, vec![]);
        bot.announce().unwrap();

        assert_eq!(bot.mailer().sent.len(), 1);
        assert_eq!(bot.mailer().sent[0].subject, "Initializing rsb");
    }
}
