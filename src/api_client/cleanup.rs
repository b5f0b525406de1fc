//! Confirmation-gated removal of remote playlists.
//!
//! A run walks `Idle → Listing → Classifying → AwaitingConfirmation` and then either
//! stops in `Cancelled` or goes through `Deleting` to `Done`. Deletes are issued one at
//! a time and a failed delete never stops the batch. Nothing is retried; running the
//! cleanup again lists the current state, so already removed playlists drop out.

use crate::api_client::{
    list_all, resolve_duplicates, select_members, CleanupError, MembershipRule, PlaylistService,
    RemoteDeleteError, RemotePlaylist, Resolution,
};
use crate::foundation::utils::truncate_graphemes;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};

/// The exact line an operator must type before anything is deleted.
pub const CONFIRMATION_TOKEN: &str = "DELETE";

/// Longest playlist name shown in listings, in grapheme clusters.
const DISPLAY_NAME_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    /// Delete every copy but the most recent of each duplicated name.
    Duplicates,
    /// Delete every playlist the membership rule matches.
    AllMatching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupState {
    Idle,
    Listing,
    Classifying,
    AwaitingConfirmation,
    Cancelled,
    Deleting,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedDeletion {
    pub playlist: RemotePlaylist,
    pub error: RemoteDeleteError,
}

/// Per-item results of a delete batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupSummary {
    pub deleted: Vec<RemotePlaylist>,
    pub failed: Vec<FailedDeletion>,
}

impl CleanupSummary {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CleanupOutcome {
    /// Nothing matched; no confirmation was asked for.
    NothingToDelete,
    /// The operator did not type the confirmation token. No side effects.
    Cancelled { candidates: usize },
    Completed(CleanupSummary),
}

/// One cleanup invocation against a playlist service.
pub struct Cleanup<'a> {
    service: &'a dyn PlaylistService,
    rule: &'a MembershipRule,
    mode: CleanupMode,
    state: CleanupState,
}

impl<'a> Cleanup<'a> {
    pub fn new(service: &'a dyn PlaylistService, rule: &'a MembershipRule, mode: CleanupMode) -> Self {
        Self {
            service,
            rule,
            mode,
            state: CleanupState::Idle,
        }
    }

    pub fn state(&self) -> CleanupState {
        self.state
    }

    /// Runs the whole workflow, reading the operator's answer from `confirmation`.
    ///
    /// Fails before any deletion if the listing cannot be completed.
    pub async fn run<R: BufRead>(&mut self, mut confirmation: R) -> Result<CleanupOutcome, CleanupError> {
        self.state = CleanupState::Listing;
        println!("\x1b[1m\x1b[34mFetching playlists...\x1b[0m");
        let listing = list_all(self.service)
            .await
            .map_err(CleanupError::RemoteList)?;
        println!("Found {} playlists in total", listing.len());

        self.state = CleanupState::Classifying;
        let candidates = match self.mode {
            CleanupMode::Duplicates => {
                let resolution = resolve_duplicates(&listing, self.rule);
                print_duplicate_report(&resolution);
                resolution.delete
            }
            CleanupMode::AllMatching => {
                let members = select_members(&listing, self.rule);
                print_member_list(&members);
                members
            }
        };

        if candidates.is_empty() {
            println!("\x1b[32mNothing to delete.\x1b[0m");
            self.state = CleanupState::Done;
            return Ok(CleanupOutcome::NothingToDelete);
        }

        self.state = CleanupState::AwaitingConfirmation;
        println!(
            "\n\x1b[1m\x1b[31mThis will DELETE {} playlists!\x1b[0m",
            candidates.len()
        );
        print!("Type '{CONFIRMATION_TOKEN}' to confirm: ");
        io::stdout().flush()?;

        let mut answer = String::new();
        confirmation.read_line(&mut answer)?;

        if !is_confirmed(&answer) {
            println!("\x1b[33mCancelled - no playlists deleted.\x1b[0m");
            self.state = CleanupState::Cancelled;
            return Ok(CleanupOutcome::Cancelled {
                candidates: candidates.len(),
            });
        }

        self.state = CleanupState::Deleting;
        let summary = delete_sequentially(self.service, candidates).await;
        self.state = CleanupState::Done;

        print_summary(&summary);
        Ok(CleanupOutcome::Completed(summary))
    }
}

/// Compares the operator's line verbatim, ignoring only its line terminator.
pub fn is_confirmed(answer: &str) -> bool {
    let line = answer.strip_suffix('\n').unwrap_or(answer);
    let line = line.strip_suffix('\r').unwrap_or(line);
    line == CONFIRMATION_TOKEN
}

/// Deletes `playlists` one at a time, recording every outcome.
///
/// Only an HTTP 200 counts as success.
pub async fn delete_sequentially(
    service: &dyn PlaylistService,
    playlists: Vec<RemotePlaylist>,
) -> CleanupSummary {
    let progress = ProgressBar::new(playlists.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} playlists {msg}")
    {
        progress.set_style(style.progress_chars("##-"));
    }

    let mut summary = CleanupSummary::default();

    for playlist in playlists {
        progress.set_message(truncate_graphemes(&playlist.name, DISPLAY_NAME_LIMIT));

        let result = match service.delete_playlist(&playlist.id).await {
            Ok(200) => Ok(()),
            Ok(status) => Err(RemoteDeleteError::Status(status)),
            Err(e) => Err(RemoteDeleteError::Transport(e.to_string())),
        };

        match result {
            Ok(()) => {
                log::info!("Deleted {} ({})", playlist.name, playlist.id);
                summary.deleted.push(playlist);
            }
            Err(error) => {
                log::warn!("Failed to delete {} ({}): {}", playlist.name, playlist.id, error);
                summary.failed.push(FailedDeletion { playlist, error });
            }
        }
        progress.inc(1);
    }

    progress.finish_with_message("done");
    summary
}

fn print_duplicate_report(resolution: &Resolution) {
    println!("Found {} matching playlist names", resolution.groups.len());

    for group in resolution.groups.iter().filter(|g| g.has_duplicates()) {
        println!(
            "\n\x1b[1m'{}'\x1b[0m has {} copies:",
            truncate_graphemes(&group.name, DISPLAY_NAME_LIMIT),
            group.playlists.len()
        );
        println!(
            "   \x1b[32mKEEP\x1b[0m   - {} tracks - ID: {}",
            group.keep().track_count,
            group.keep().id
        );
        for playlist in group.delete_candidates() {
            println!(
                "   \x1b[31mDELETE\x1b[0m - {} tracks - ID: {}",
                playlist.track_count, playlist.id
            );
        }
        if group.ordering_is_uncertain() {
            println!(
                "   \x1b[33mnote: version tokens are missing or tied, kept the first listed copy\x1b[0m"
            );
        }
    }

    let total: usize = resolution.duplicate_counts.values().sum();
    if total > 0 {
        println!(
            "\n{} duplicates across {} names (most recent copy chosen by version token, which is not a verified timestamp)",
            total,
            resolution.duplicate_counts.len()
        );
    }
}

fn print_member_list(members: &[RemotePlaylist]) {
    println!("Found {} matching playlists:", members.len());
    for (i, playlist) in members.iter().enumerate() {
        println!(
            "   {:2}. {}",
            i + 1,
            truncate_graphemes(&playlist.name, DISPLAY_NAME_LIMIT)
        );
    }
}

fn print_summary(summary: &CleanupSummary) {
    println!("\n\x1b[1mResults:\x1b[0m");
    println!("   \x1b[32mDeleted: {}\x1b[0m", summary.deleted_count());
    println!("   \x1b[31mFailed:  {}\x1b[0m", summary.failed_count());
    for failure in &summary.failed {
        println!(
            "     {} ({}): {}",
            truncate_graphemes(&failure.playlist.name, DISPLAY_NAME_LIMIT),
            failure.playlist.id,
            failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{MockPlaylistService, PlaylistPage, RemoteError};

    fn playlist(id: &str, name: &str, recency: Option<&str>) -> RemotePlaylist {
        RemotePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            track_count: 3,
            recency_proxy: recency.map(str::to_string),
        }
    }

    fn serving(listing: Vec<RemotePlaylist>) -> MockPlaylistService {
        let mut service = MockPlaylistService::new();
        service.expect_list_page().returning(move |_| {
            Ok(PlaylistPage {
                items: listing.clone(),
                next: None,
            })
        });
        service
    }

    fn five_shows() -> Vec<RemotePlaylist> {
        (1..=5)
            .map(|i| playlist(&format!("p{i}"), &format!("KALX - Show {i}"), None))
            .collect()
    }

    #[test]
    fn test_confirmation_is_verbatim() {
        assert!(is_confirmed("DELETE\n"));
        assert!(is_confirmed("DELETE\r\n"));
        assert!(is_confirmed("DELETE"));
        assert!(!is_confirmed("delete\n"));
        assert!(!is_confirmed(" DELETE\n"));
        assert!(!is_confirmed("DELETE \n"));
        assert!(!is_confirmed("yes\n"));
        assert!(!is_confirmed(""));
    }

    #[tokio::test]
    async fn test_declined_confirmation_deletes_nothing() {
        let rule = MembershipRule::default();
        for answer in ["delete\n", "y\n", "", "DELETE please\n"] {
            let mut service = serving(five_shows());
            service.expect_delete_playlist().times(0);

            let mut cleanup = Cleanup::new(&service, &rule, CleanupMode::AllMatching);
            let outcome = cleanup.run(answer.as_bytes()).await.unwrap();

            assert_eq!(outcome, CleanupOutcome::Cancelled { candidates: 5 });
            assert_eq!(cleanup.state(), CleanupState::Cancelled);
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let rule = MembershipRule::default();
        let mut service = serving(five_shows());
        service
            .expect_delete_playlist()
            .times(5)
            .returning(|id| if id == "p3" { Ok(500) } else { Ok(200) });

        let mut cleanup = Cleanup::new(&service, &rule, CleanupMode::AllMatching);
        let outcome = cleanup.run("DELETE\n".as_bytes()).await.unwrap();

        let summary = match outcome {
            CleanupOutcome::Completed(summary) => summary,
            other => panic!("expected a completed batch, got {other:?}"),
        };
        assert_eq!(summary.deleted_count(), 4);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failed[0].playlist.id, "p3");
        assert_eq!(summary.failed[0].error, RemoteDeleteError::Status(500));
        let deleted: Vec<_> = summary.deleted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(deleted, vec!["p1", "p2", "p4", "p5"]);
        assert_eq!(cleanup.state(), CleanupState::Done);
    }

    #[tokio::test]
    async fn test_transport_errors_are_recorded() {
        let mut service = MockPlaylistService::new();
        service.expect_delete_playlist().returning(|id| {
            if id == "p1" {
                Err(RemoteError::Decode("connection reset".to_string()))
            } else {
                Ok(201)
            }
        });

        let summary =
            delete_sequentially(&service, vec![playlist("p1", "a", None), playlist("p2", "b", None)])
                .await;

        assert_eq!(summary.deleted_count(), 0);
        assert!(matches!(summary.failed[0].error, RemoteDeleteError::Transport(_)));
        assert_eq!(summary.failed[1].error, RemoteDeleteError::Status(201));
    }

    #[tokio::test]
    async fn test_duplicate_mode_deletes_only_older_copies() {
        let rule = MembershipRule::default();
        let mut service = serving(vec![
            playlist("old", "KALX - Night Owls", Some("AAAA")),
            playlist("new", "KALX - Night Owls", Some("BBBB")),
            playlist("solo", "KALX - Morning", Some("CCCC")),
            playlist("mine", "Road Trip", Some("ZZZZ")),
        ]);
        service
            .expect_delete_playlist()
            .withf(|id| id.to_string() == "old")
            .times(1)
            .returning(|_| Ok(200));

        let mut cleanup = Cleanup::new(&service, &rule, CleanupMode::Duplicates);
        let outcome = cleanup.run("DELETE\n".as_bytes()).await.unwrap();

        let summary = match outcome {
            CleanupOutcome::Completed(summary) => summary,
            other => panic!("expected a completed batch, got {other:?}"),
        };
        assert_eq!(summary.deleted_count(), 1);
        assert_eq!(summary.deleted[0].id, "old");
    }

    #[tokio::test]
    async fn test_nothing_to_delete_skips_confirmation() {
        let rule = MembershipRule::default();
        let mut service = serving(vec![
            playlist("a", "KALX - A", None),
            playlist("b", "KALX - B", None),
        ]);
        service.expect_delete_playlist().times(0);

        let mut cleanup = Cleanup::new(&service, &rule, CleanupMode::Duplicates);
        let outcome = cleanup.run("DELETE\n".as_bytes()).await.unwrap();

        assert_eq!(outcome, CleanupOutcome::NothingToDelete);
        assert_eq!(cleanup.state(), CleanupState::Done);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_before_deleting() {
        let rule = MembershipRule::default();
        let mut service = MockPlaylistService::new();
        service.expect_list_page().returning(|_| {
            Err(RemoteError::Status {
                status: 401,
                body: "token expired".to_string(),
            })
        });
        service.expect_delete_playlist().times(0);

        let mut cleanup = Cleanup::new(&service, &rule, CleanupMode::AllMatching);
        let result = cleanup.run("DELETE\n".as_bytes()).await;

        assert!(matches!(result, Err(CleanupError::RemoteList(_))));
        assert_eq!(cleanup.state(), CleanupState::Listing);
    }
}
