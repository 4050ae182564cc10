/// Property-based tests using proptest
/// Tests invariants of the reconciliation merge that should hold for all
/// input batches, regardless of ordering or duplication
use linkedin_leads_api::extractor::merge_interactions;
use linkedin_leads_api::models::{RawAuthor, RawComment, RawReaction};
use proptest::prelude::*;

fn profile_url(index: usize) -> String {
    format!("https://linkedin.com/in/profile{}", index)
}

/// `None` models a record whose author has no resolvable profile URL.
fn reaction(profile: Option<usize>) -> RawReaction {
    RawReaction {
        id: None,
        author: Some(RawAuthor {
            name: profile.map(|i| format!("Person {}", i)),
            profile_url: profile.map(profile_url),
            ..Default::default()
        }),
        reaction_type: Some("LIKE".to_string()),
        created_at: None,
    }
}

fn comment(profile: Option<usize>, id: usize) -> RawComment {
    RawComment {
        id: Some(format!("comment_{}", id)),
        author: Some(RawAuthor {
            name: profile.map(|i| format!("Person {}", i)),
            profile_url: profile.map(profile_url),
            ..Default::default()
        }),
        content: Some("text".to_string()),
        likes_count: 0,
        replies_count: 0,
        created_at: None,
    }
}

proptest! {
    /// Flags and counts always match what the batch actually contains.
    #[test]
    fn merged_flags_match_batch_membership(
        reaction_profiles in prop::collection::vec(prop::option::of(0usize..6), 0..40),
        comment_profiles in prop::collection::vec(prop::option::of(0usize..6), 0..40),
    ) {
        let reactions: Vec<RawReaction> =
            reaction_profiles.iter().map(|p| reaction(*p)).collect();
        let comments: Vec<RawComment> = comment_profiles
            .iter()
            .enumerate()
            .map(|(i, p)| comment(*p, i))
            .collect();

        let drafts = merge_interactions(&reactions, &comments);

        for index in 0..6usize {
            let url = profile_url(index);
            let reacted = reaction_profiles.iter().flatten().any(|p| *p == index);
            let commented = comment_profiles.iter().flatten().any(|p| *p == index);
            let comment_total = comment_profiles.iter().flatten().filter(|p| **p == index).count();

            match drafts.get(&url) {
                Some(draft) => {
                    prop_assert!(reacted || commented);
                    prop_assert_eq!(draft.liked, reacted);
                    prop_assert_eq!(draft.commented, commented);
                    prop_assert_eq!(draft.comment_count as usize, comment_total);
                }
                None => prop_assert!(!reacted && !commented),
            }
        }
    }

    /// interaction_type reflects the union of the flags, always.
    #[test]
    fn interaction_type_reflects_flags(
        reaction_profiles in prop::collection::vec(prop::option::of(0usize..6), 0..40),
        comment_profiles in prop::collection::vec(prop::option::of(0usize..6), 0..40),
    ) {
        let reactions: Vec<RawReaction> =
            reaction_profiles.iter().map(|p| reaction(*p)).collect();
        let comments: Vec<RawComment> = comment_profiles
            .iter()
            .enumerate()
            .map(|(i, p)| comment(*p, i))
            .collect();

        for draft in merge_interactions(&reactions, &comments).values() {
            let expected = match (draft.liked, draft.commented) {
                (true, true) => "both",
                (true, false) => "like",
                (false, true) => "comment",
                (false, false) => unreachable!("drafts always carry at least one interaction"),
            };
            prop_assert_eq!(draft.interaction_type(), expected);
        }
    }

    /// Reaction order never changes the outcome; comment order only affects
    /// which author snapshot wins, not flags or counts.
    #[test]
    fn reaction_order_is_irrelevant(
        reaction_profiles in prop::collection::vec(prop::option::of(0usize..6), 0..20),
        comment_profiles in prop::collection::vec(prop::option::of(0usize..6), 0..20),
    ) {
        let reactions: Vec<RawReaction> =
            reaction_profiles.iter().map(|p| reaction(*p)).collect();
        let mut reversed = reactions.clone();
        reversed.reverse();
        let comments: Vec<RawComment> = comment_profiles
            .iter()
            .enumerate()
            .map(|(i, p)| comment(*p, i))
            .collect();

        let forward = merge_interactions(&reactions, &comments);
        let backward = merge_interactions(&reversed, &comments);
        prop_assert_eq!(forward, backward);
    }

    /// Merging never panics on arbitrary profile URL strings.
    #[test]
    fn merge_never_panics_on_arbitrary_urls(urls in prop::collection::vec("\\PC*", 0..10)) {
        let reactions: Vec<RawReaction> = urls
            .iter()
            .map(|url| RawReaction {
                author: Some(RawAuthor {
                    profile_url: Some(url.clone()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();

        let _ = merge_interactions(&reactions, &[]);
    }
}
