//! Offer ranking: pick at most one winning offer per print finish.
//!
//! Ranking is a pure function over the raw offers a store returned. Criteria,
//! in order: exact printing match beats loose, in-stock beats everything
//! else, then ascending price with unpriced offers last. The sort is stable,
//! so equally-ranked offers keep the store's own ordering and the same input
//! always yields the same picks.

use scryhub_protocol::{Availability, FinishTreatment, FoundCardInformation, MatchQualification};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

fn match_rank(quality: MatchQualification) -> u8 {
    match quality {
        MatchQualification::Exact => 0,
        MatchQualification::Loose => 1,
    }
}

fn availability_rank(availability: Availability) -> u8 {
    match availability {
        Availability::InStock => 0,
        // Unknown ranks with out-of-stock; only a positive signal promotes
        Availability::OutOfStock | Availability::Unknown => 1,
    }
}

fn compare_offers(a: &FoundCardInformation, b: &FoundCardInformation) -> Ordering {
    match_rank(a.match_quality)
        .cmp(&match_rank(b.match_quality))
        .then_with(|| availability_rank(a.availability).cmp(&availability_rank(b.availability)))
        .then_with(|| match (&a.price, &b.price) {
            (Some(a), Some(b)) => a.amount.partial_cmp(&b.amount).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Reduce raw offers to the best offer for each finish of interest.
///
/// When `requested` is empty, every finish observed in the offers is a
/// target. Finishes in `requested` that no offer covers simply produce
/// nothing; the output never invents an offer. Results come back ordered by
/// finish, nonfoil before foil.
pub fn pick_top_per_finish(
    offers: &[FoundCardInformation],
    requested: &[FinishTreatment],
) -> Vec<FoundCardInformation> {
    if offers.is_empty() {
        return Vec::new();
    }

    let targets: BTreeSet<FinishTreatment> = if requested.is_empty() {
        offers.iter().map(|o| o.finish_treatment).collect()
    } else {
        requested.iter().copied().collect()
    };

    let mut ranked: Vec<&FoundCardInformation> = offers.iter().collect();
    ranked.sort_by(|a, b| compare_offers(a, b));

    // First offer seen per finish is the winner; stop once every target has one
    let mut picks: BTreeMap<FinishTreatment, FoundCardInformation> = BTreeMap::new();
    for offer in ranked {
        if !targets.contains(&offer.finish_treatment) {
            continue;
        }
        picks
            .entry(offer.finish_treatment)
            .or_insert_with(|| offer.clone());
        if picks.len() == targets.len() {
            break;
        }
    }

    picks.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scryhub_protocol::Money;

    fn offer(
        title: &str,
        finish: FinishTreatment,
        quality: MatchQualification,
        availability: Availability,
        price: Option<f64>,
    ) -> FoundCardInformation {
        FoundCardInformation {
            title: title.into(),
            url: format!("https://store.example/{title}"),
            price: price.map(|amount| Money {
                amount,
                currency: "USD".into(),
            }),
            availability,
            finish_treatment: finish,
            match_quality: quality,
        }
    }

    // ==================== Criteria ordering ====================

    #[test]
    fn test_exact_match_beats_stock_and_price() {
        let offers = vec![
            offer(
                "loose-in-stock-cheap",
                FinishTreatment::Foil,
                MatchQualification::Loose,
                Availability::InStock,
                Some(5.0),
            ),
            offer(
                "exact-out-of-stock-dear",
                FinishTreatment::Foil,
                MatchQualification::Exact,
                Availability::OutOfStock,
                Some(9.0),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[FinishTreatment::Foil]);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].title, "exact-out-of-stock-dear");
    }

    #[test]
    fn test_in_stock_beats_price_within_same_match() {
        let offers = vec![
            offer(
                "cheap-but-gone",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::OutOfStock,
                Some(1.0),
            ),
            offer(
                "dear-but-here",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(20.0),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[]);
        assert_eq!(picks[0].title, "dear-but-here");
    }

    #[test]
    fn test_cheapest_wins_when_match_and_stock_tie() {
        let offers = vec![
            offer(
                "pricier",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(7.5),
            ),
            offer(
                "cheaper",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(3.25),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[]);
        assert_eq!(picks[0].title, "cheaper");
    }

    #[test]
    fn test_unpriced_offer_ranks_last() {
        let offers = vec![
            offer(
                "no-price",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                None,
            ),
            offer(
                "priced",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(99.0),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[]);
        assert_eq!(picks[0].title, "priced");
    }

    #[test]
    fn test_unknown_availability_ranks_with_out_of_stock() {
        let offers = vec![
            offer(
                "unknown-stock",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::Unknown,
                Some(1.0),
            ),
            offer(
                "in-stock",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(2.0),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[]);
        assert_eq!(picks[0].title, "in-stock");
    }

    // ==================== Per-finish behavior ====================

    #[test]
    fn test_each_finish_ranked_independently() {
        let offers = vec![
            offer(
                "foil-offer",
                FinishTreatment::Foil,
                MatchQualification::Loose,
                Availability::Unknown,
                Some(12.0),
            ),
            offer(
                "nonfoil-offer",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(2.0),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[]);
        assert_eq!(picks.len(), 2);

        let titles: Vec<_> = picks.iter().map(|p| p.title.as_str()).collect();
        assert!(titles.contains(&"foil-offer"));
        assert!(titles.contains(&"nonfoil-offer"));
    }

    #[test]
    fn test_requested_finishes_filter_the_output() {
        let offers = vec![
            offer(
                "foil-offer",
                FinishTreatment::Foil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(12.0),
            ),
            offer(
                "nonfoil-offer",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(2.0),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[FinishTreatment::Foil]);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].title, "foil-offer");
    }

    #[test]
    fn test_requested_finish_with_no_offers_yields_nothing() {
        let offers = vec![offer(
            "nonfoil-only",
            FinishTreatment::Nonfoil,
            MatchQualification::Exact,
            Availability::InStock,
            Some(2.0),
        )];

        let picks = pick_top_per_finish(&offers, &[FinishTreatment::Foil]);
        assert!(picks.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(pick_top_per_finish(&[], &[]).is_empty());
        assert!(pick_top_per_finish(&[], &[FinishTreatment::Foil]).is_empty());
    }

    // ==================== Determinism ====================

    #[test]
    fn test_full_tie_keeps_store_order() {
        let offers = vec![
            offer(
                "first-listed",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(5.0),
            ),
            offer(
                "second-listed",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                Some(5.0),
            ),
        ];

        let picks = pick_top_per_finish(&offers, &[]);
        assert_eq!(picks[0].title, "first-listed");
    }

    #[test]
    fn test_same_input_same_output() {
        let offers = vec![
            offer(
                "a",
                FinishTreatment::Foil,
                MatchQualification::Loose,
                Availability::InStock,
                Some(5.0),
            ),
            offer(
                "b",
                FinishTreatment::Foil,
                MatchQualification::Exact,
                Availability::OutOfStock,
                Some(9.0),
            ),
            offer(
                "c",
                FinishTreatment::Nonfoil,
                MatchQualification::Exact,
                Availability::InStock,
                None,
            ),
        ];

        let first = pick_top_per_finish(&offers, &[]);
        let second = pick_top_per_finish(&offers, &[]);
        assert_eq!(first, second);
    }
}
