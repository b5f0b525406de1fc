//! Picks which of this tool's remote playlists to keep and which to remove.
//!
//! Playlists are grouped by exact name. Within a group the one with the greatest
//! recency token is kept. That token is an opaque version string (Spotify's
//! `snapshot_id`), not a timestamp, so the choice is best effort: groups whose order
//! rests on missing or tied tokens are flagged so the operator can check them.

use crate::api_client::RemotePlaylist;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Decides whether a remote playlist was created by this tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MembershipRule {
    pub name_prefix: String,
    pub provenance_markers: Vec<String>,
}

impl Default for MembershipRule {
    fn default() -> Self {
        Self {
            name_prefix: "KALX -".to_string(),
            provenance_markers: vec![
                "Generated from Spinitron".to_string(),
                "Spinítron ID:".to_string(),
            ],
        }
    }
}

impl MembershipRule {
    pub fn matches(&self, playlist: &RemotePlaylist) -> bool {
        (!self.name_prefix.is_empty() && playlist.name.starts_with(&self.name_prefix))
            || self
                .provenance_markers
                .iter()
                .filter(|marker| !marker.is_empty())
                .any(|marker| playlist.description.contains(marker.as_str()))
    }
}

/// Playlists in listing order that satisfy `rule`.
pub fn select_members(listing: &[RemotePlaylist], rule: &MembershipRule) -> Vec<RemotePlaylist> {
    listing
        .iter()
        .filter(|playlist| rule.matches(playlist))
        .cloned()
        .collect()
}

/// Playlists sharing one display name, best keep candidate first.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub name: String,
    pub playlists: Vec<RemotePlaylist>,
}

impl DuplicateGroup {
    pub fn keep(&self) -> &RemotePlaylist {
        &self.playlists[0]
    }

    pub fn delete_candidates(&self) -> &[RemotePlaylist] {
        &self.playlists[1..]
    }

    pub fn has_duplicates(&self) -> bool {
        self.playlists.len() > 1
    }

    /// True when the keep choice fell back to listing order because a token was
    /// missing or tied with its neighbour.
    pub fn ordering_is_uncertain(&self) -> bool {
        self.has_duplicates()
            && (self.playlists.iter().any(|p| p.recency_proxy.is_none())
                || self
                    .playlists
                    .windows(2)
                    .any(|pair| pair[0].recency_proxy == pair[1].recency_proxy))
    }
}

/// Outcome of duplicate resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Every matching name, in order of first appearance in the listing.
    pub groups: Vec<DuplicateGroup>,
    /// The kept playlist of every group.
    pub keep: Vec<RemotePlaylist>,
    /// Everything that should be removed.
    pub delete: Vec<RemotePlaylist>,
    /// Extra copies per name, only for names that have any.
    pub duplicate_counts: BTreeMap<String, usize>,
}

/// Groups this tool's playlists by name and splits each group into keep and delete.
pub fn resolve_duplicates(listing: &[RemotePlaylist], rule: &MembershipRule) -> Resolution {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for playlist in select_members(listing, rule) {
        match index_by_name.get(&playlist.name) {
            Some(&index) => groups[index].playlists.push(playlist),
            None => {
                index_by_name.insert(playlist.name.clone(), groups.len());
                groups.push(DuplicateGroup {
                    name: playlist.name.clone(),
                    playlists: vec![playlist],
                });
            }
        }
    }

    let mut resolution = Resolution::default();

    for mut group in groups {
        // Stable: equal or missing tokens keep listing order.
        group
            .playlists
            .sort_by(|a, b| b.recency_proxy.cmp(&a.recency_proxy));

        if group.has_duplicates() {
            if group.ordering_is_uncertain() {
                log::warn!(
                    "Keep choice for '{}' falls back to listing order (missing or tied recency tokens)",
                    group.name
                );
            }
            resolution
                .duplicate_counts
                .insert(group.name.clone(), group.playlists.len() - 1);
            resolution
                .delete
                .extend(group.delete_candidates().iter().cloned());
        }
        resolution.keep.push(group.keep().clone());
        resolution.groups.push(group);
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: &str, name: &str, recency: Option<&str>) -> RemotePlaylist {
        RemotePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            track_count: 10,
            recency_proxy: recency.map(str::to_string),
        }
    }

    fn summary(playlists: &[RemotePlaylist]) -> Vec<(&str, Option<&str>)> {
        playlists
            .iter()
            .map(|p| (p.name.as_str(), p.recency_proxy.as_deref()))
            .collect()
    }

    #[test]
    fn test_keep_most_recent_and_delete_the_rest() {
        let rule = MembershipRule {
            name_prefix: String::new(),
            provenance_markers: vec!["tool".to_string()],
        };
        let mut listing = vec![
            playlist("x3", "X", Some("3")),
            playlist("x1", "X", Some("1")),
            playlist("y5", "Y", Some("5")),
        ];
        for p in &mut listing {
            p.description = "made by tool".to_string();
        }

        let resolution = resolve_duplicates(&listing, &rule);

        assert_eq!(summary(&resolution.keep), vec![("X", Some("3")), ("Y", Some("5"))]);
        assert_eq!(summary(&resolution.delete), vec![("X", Some("1"))]);
        assert_eq!(resolution.duplicate_counts, BTreeMap::from([("X".to_string(), 1)]));
    }

    #[test]
    fn test_keep_is_highest_token_regardless_of_listing_position() {
        let listing = vec![
            playlist("a", "KALX - Show", Some("AAA")),
            playlist("c", "KALX - Show", Some("CCC")),
            playlist("b", "KALX - Show", Some("BBB")),
        ];

        let resolution = resolve_duplicates(&listing, &MembershipRule::default());

        assert_eq!(resolution.keep[0].id, "c");
        let deleted: Vec<_> = resolution.delete.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(deleted, vec!["b", "a"]);
        assert!(!resolution.groups[0].ordering_is_uncertain());
    }

    #[test]
    fn test_ties_and_missing_tokens_keep_listing_order() {
        let listing = vec![
            playlist("first", "KALX - Show", None),
            playlist("second", "KALX - Show", Some("T")),
            playlist("third", "KALX - Show", Some("T")),
            playlist("fourth", "KALX - Show", None),
        ];

        let resolution = resolve_duplicates(&listing, &MembershipRule::default());
        let group = &resolution.groups[0];

        let order: Vec<_> = group.playlists.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["second", "third", "first", "fourth"]);
        assert!(group.ordering_is_uncertain());
    }

    #[test]
    fn test_membership_by_prefix_or_marker() {
        let rule = MembershipRule::default();
        let mut by_marker = playlist("m", "Morning Show", None);
        by_marker.description = "Generated from Spinitron playlists. Station: KALX".to_string();
        let mut by_old_marker = playlist("o", "Old Show - 2024-01-01", None);
        by_old_marker.description = "Station: KALX\nSpinítron ID: 123".to_string();
        let listing = vec![
            playlist("p", "KALX - Night Owls", None),
            by_marker,
            by_old_marker,
            playlist("n", "My Road Trip Mix", None),
            playlist("q", "kalx - lowercase", None),
        ];

        let members: Vec<_> = select_members(&listing, &rule)
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(members, vec!["p", "m", "o"]);
    }

    #[test]
    fn test_empty_markers_match_nothing() {
        let listing = vec![playlist("a", "Anything", None)];
        let rule = MembershipRule {
            name_prefix: String::new(),
            provenance_markers: vec![String::new()],
        };

        assert!(select_members(&listing, &rule).is_empty());
    }

    #[test]
    fn test_singletons_are_kept_without_duplicates() {
        let listing = vec![
            playlist("a", "KALX - A", None),
            playlist("b", "KALX - B", None),
        ];

        let resolution = resolve_duplicates(&listing, &MembershipRule::default());

        assert_eq!(resolution.keep.len(), 2);
        assert!(resolution.delete.is_empty());
        assert!(resolution.duplicate_counts.is_empty());
        assert!(!resolution.groups[0].ordering_is_uncertain());
    }
}
