use crate::domain::Item;

use super::{ActiveTrigger, Evaluate};

/// Select the items for which at least one trigger fires, keeping input
/// order. Each item appears at most once.
pub fn filter<'a, T: Evaluate>(items: &'a [Item], triggers: &[T]) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|item| triggers.iter().any(|trigger| trigger.evaluate(item)))
        .collect()
}

/// The first active trigger, in `ADD` order, that fires for `item`.
pub fn first_match<'t>(item: &Item, triggers: &'t [ActiveTrigger]) -> Option<&'t ActiveTrigger> {
    triggers.iter().find(|trigger| trigger.evaluate(item))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::trigger::Trigger;

    fn items() -> Vec<Item> {
        let base = Item::new("https://example.com/feed.xml", "e");
        vec![
            Item {
                id: "1".into(),
                ..base.clone().with_title("Rust network stack")
            },
            Item {
                id: "2".into(),
                ..base.clone().with_title("Gardening tips")
            },
            Item {
                id: "3".into(),
                ..base.clone().with_subject("networking").with_title("Network news")
            },
            Item {
                id: "4".into(),
                ..base.with_summary("a rust compiler")
            },
        ]
    }

    fn active(config: &[(&str, Trigger)]) -> Vec<ActiveTrigger> {
        config
            .iter()
            .map(|(name, trigger)| ActiveTrigger::new(*name, Arc::new(trigger.clone())))
            .collect()
    }

    #[test]
    fn test_empty_items() {
        let triggers = active(&[("t1", Trigger::title("rust"))]);
        assert!(filter(&[], &triggers).is_empty());
    }

    #[test]
    fn test_no_triggers() {
        let triggers: Vec<ActiveTrigger> = Vec::new();
        assert!(filter(&items(), &triggers).is_empty());
    }

    #[test]
    fn test_preserves_order_and_deduplicates() {
        let triggers = active(&[
            ("net", Trigger::title("network")),
            ("rust", Trigger::title("rust")),
            ("rust-summary", Trigger::summary("rust")),
        ]);
        let items = items();
        let ids: Vec<&str> = filter(&items, &triggers)
            .iter()
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_plain_triggers() {
        let triggers = vec![Trigger::phrase("Gardening")];
        let items = items();
        let matched = filter(&items, &triggers);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "2");
    }

    #[test]
    fn test_first_match_follows_add_order() {
        let triggers = active(&[
            ("rust", Trigger::title("rust")),
            ("net", Trigger::title("network")),
        ]);
        let items = items();
        assert_eq!(first_match(&items[0], &triggers).map(|t| t.name()), Some("rust"));
        assert_eq!(first_match(&items[2], &triggers).map(|t| t.name()), Some("net"));
        assert!(first_match(&items[1], &triggers).is_none());
    }
}
