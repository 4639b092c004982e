//! Report triage.
//!
//! Pending reports are walked oldest first. For each one the operator picks
//! an action; the report row is deleted only in the same transaction that
//! commits the action it asked for, so a failed or declined action always
//! leaves the report pending for a later run.

use std::fmt;

use crate::error::{Error, Result};
use crate::link::UnlinkOutcome;
use crate::model::{AnimeRecord, AnnSongId, GroupId, Report, ReportId};
use crate::operator::{ask_parsed, Operator};
use crate::schema::Database;

/// How many times a malformed AniList id is re-asked before giving up.
const INPUT_ATTEMPTS: usize = 3;

const ACTION_PROMPT: &str =
    "What would you like to do?\n(s)kip, (w)ipe song link, (r)emove report, (a)nilist relabel\n";

/// What the operator chose to do with a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageAction {
    /// Leave the report for later.
    Skip,
    /// Remove the reported track link (and its anime rows), then close.
    Unlink,
    /// Dismiss the report without touching anything else.
    Delete,
    /// Point the reported song at another AniList entry, then close.
    Relabel,
}

impl TriageAction {
    /// Parse operator input. Unknown input yields `None`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "s" | "skip" => Some(Self::Skip),
            "w" | "wipe" | "unlink" => Some(Self::Unlink),
            "r" | "remove" | "delete" => Some(Self::Delete),
            "a" | "anilist" | "relabel" => Some(Self::Relabel),
            _ => None,
        }
    }
}

/// Where a report ended up after one triage step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    Skipped,
    UnlinkedAndClosed {
        group_ids: Vec<GroupId>,
        anime_deleted: usize,
    },
    ClosedNoAction,
    RelabeledAndClosed {
        anilist_id: i64,
        rows_updated: usize,
    },
    /// Nothing was committed; the report is still pending.
    LeftOpen(String),
    /// The store rejected the action; it was rolled back and the report is
    /// still pending.
    Failed(String),
}

impl TriageOutcome {
    /// Whether the report row was deleted.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Self::UnlinkedAndClosed { .. } | Self::ClosedNoAction | Self::RelabeledAndClosed { .. }
        )
    }
}

impl fmt::Display for TriageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::UnlinkedAndClosed {
                group_ids,
                anime_deleted,
            } => write!(
                f,
                "removed link to groups {:?} ({} anime rows) and deleted report",
                group_ids, anime_deleted
            ),
            Self::ClosedNoAction => write!(f, "deleted report"),
            Self::RelabeledAndClosed {
                anilist_id,
                rows_updated,
            } => write!(
                f,
                "set AniList id {} on {} rows and deleted report",
                anilist_id, rows_updated
            ),
            Self::LeftOpen(reason) => write!(f, "left open: {}", reason),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Outcomes of one triage run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageSummary {
    pub outcomes: Vec<(ReportId, TriageOutcome)>,
}

impl TriageSummary {
    pub fn closed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_closed()).count()
    }

    pub fn still_pending(&self) -> usize {
        self.outcomes.len() - self.closed()
    }
}

/// Walk every pending report and apply the operator's choice to each.
///
/// A store failure on one report is rolled back, recorded as
/// [`TriageOutcome::Failed`], and the loop moves on. Only losing the
/// operator (an I/O error while prompting) ends the run early.
pub fn run_triage(db: &Database, operator: &mut dyn Operator) -> Result<TriageSummary> {
    let reports = db.list_pending_reports()?;
    let mut summary = TriageSummary::default();

    if reports.is_empty() {
        operator.say("No reports! It is a happy day :)");
        return Ok(summary);
    }

    log::info!("Triaging {} pending reports", reports.len());

    for report in reports {
        let outcome = match triage_report(db, &report, operator) {
            Ok(outcome) => outcome,
            Err(e @ Error::Io(_)) => return Err(e),
            Err(e) => {
                log::error!("Report {} failed: {}", report.report_id, e);
                TriageOutcome::Failed(e.to_string())
            }
        };

        log::info!("Report {}: {}", report.report_id, outcome);
        operator.say(&format!("Report {}: {}", report.report_id, outcome));
        summary.outcomes.push((report.report_id, outcome));
    }

    Ok(summary)
}

fn triage_report(db: &Database, report: &Report, operator: &mut dyn Operator) -> Result<TriageOutcome> {
    present_report(db, report, operator)?;

    let answer = operator.ask(ACTION_PROMPT)?;
    match TriageAction::parse(&answer) {
        None => Ok(TriageOutcome::LeftOpen(format!(
            "unrecognized action {:?}",
            answer.trim()
        ))),
        Some(action) => apply_action(db, report, action, operator),
    }
}

/// Carry out one action for one report.
pub fn apply_action(
    db: &Database,
    report: &Report,
    action: TriageAction,
    operator: &mut dyn Operator,
) -> Result<TriageOutcome> {
    match action {
        TriageAction::Skip => Ok(TriageOutcome::Skipped),
        TriageAction::Delete => {
            if db.delete_report(report.report_id)? {
                Ok(TriageOutcome::ClosedNoAction)
            } else {
                Ok(TriageOutcome::LeftOpen("report already gone".to_string()))
            }
        }
        TriageAction::Unlink => unlink_and_close(db, report, operator),
        TriageAction::Relabel => relabel_and_close(db, report, operator),
    }
}

fn unlink_and_close(
    db: &Database,
    report: &Report,
    operator: &mut dyn Operator,
) -> Result<TriageOutcome> {
    let prompt = format!("Correct link? : {}\n", report.spotify_id.url());
    if !operator.confirm(&prompt)? {
        return Ok(TriageOutcome::LeftOpen("unlink declined".to_string()));
    }

    db.atomically(|db| match db.unlink_track(&report.spotify_id)? {
        UnlinkOutcome::NotFound => Ok(TriageOutcome::LeftOpen(format!(
            "no link found for track {}",
            report.spotify_id
        ))),
        UnlinkOutcome::Removed {
            group_ids,
            anime_deleted,
        } => {
            db.delete_report(report.report_id)?;
            Ok(TriageOutcome::UnlinkedAndClosed {
                group_ids,
                anime_deleted,
            })
        }
    })
}

fn relabel_and_close(
    db: &Database,
    report: &Report,
    operator: &mut dyn Operator,
) -> Result<TriageOutcome> {
    let rows = db.animes_for_song(report.ann_song_id)?;
    let Some(anilist_id) = choose_anilist_id(&rows, operator)? else {
        return Ok(TriageOutcome::LeftOpen("no AniList id chosen".to_string()));
    };

    db.atomically(|db| {
        let rows_updated = db.set_anilist_id(report.ann_song_id, anilist_id)?;
        db.delete_report(report.report_id)?;
        Ok(TriageOutcome::RelabeledAndClosed {
            anilist_id,
            rows_updated,
        })
    })
}

/// Walk the operator through picking an AniList id for a song's rows.
///
/// The operator may keep the current id or type a new one, and must then
/// confirm the resulting AniList page. `Ok(None)` means nothing should be
/// written: no rows, no usable id, or the operator declined.
pub fn choose_anilist_id(rows: &[AnimeRecord], operator: &mut dyn Operator) -> Result<Option<i64>> {
    let Some(first) = rows.first() else {
        operator.say("No anime found for this song");
        return Ok(None);
    };

    let mut anilist_id = first.anilist_id;
    match anilist_id {
        Some(id) => operator.say(&format!("Current AniList id: {}", id)),
        None => operator.say("No AniList id set"),
    }

    if operator.confirm("Do you want to provide a new AniList id for this anime?\n")? {
        match ask_parsed(operator, "Write the new AniList id\n", INPUT_ATTEMPTS)? {
            Some(id) => anilist_id = Some(id),
            None => return Ok(None),
        }
    }

    let Some(anilist_id) = anilist_id else {
        operator.say("No AniList id to apply, try providing one next time");
        return Ok(None);
    };

    let prompt = format!(
        "If this is the correct AniList entry please type (y)es\n\thttps://anilist.co/anime/{}\n",
        anilist_id
    );
    if operator.confirm(&prompt)? {
        Ok(Some(anilist_id))
    } else {
        operator.say("Did nothing");
        Ok(None)
    }
}

/// Interactively point every row of one catalog song at another AniList
/// entry, outside of any report.
///
/// The operator first confirms the anime, then picks the id as in
/// [`choose_anilist_id`]. Returns the applied id and the number of rows
/// updated, or `None` when nothing was written.
pub fn relabel_song(
    db: &Database,
    ann_song_id: AnnSongId,
    operator: &mut dyn Operator,
) -> Result<Option<(i64, usize)>> {
    let rows = db.animes_for_song(ann_song_id)?;
    let Some(first) = rows.first() else {
        operator.say(&format!("No anime found with song id {}", ann_song_id));
        return Ok(None);
    };

    for row in &rows {
        operator.say(&format!("{} | {}", row.display_title(), row.song_name));
    }
    let prompt = format!(
        "Is this the anime you want to update the AniList id for?\n\t{}\n",
        first.title_eng
    );
    if !operator.confirm(&prompt)? {
        operator.say("Did nothing");
        return Ok(None);
    }

    let Some(anilist_id) = choose_anilist_id(&rows, operator)? else {
        return Ok(None);
    };
    let updated = db.set_anilist_id(ann_song_id, anilist_id)?;
    log::info!(
        "Set AniList id {} on {} rows of song {}",
        anilist_id,
        updated,
        ann_song_id
    );
    Ok(Some((anilist_id, updated)))
}

fn present_report(db: &Database, report: &Report, operator: &mut dyn Operator) -> Result<()> {
    let rows = db.animes_for_song(report.ann_song_id)?;
    if rows.is_empty() {
        operator.say(&format!("No anime rows for song id {}", report.ann_song_id));
    }
    for row in &rows {
        operator.say(&format!(
            "{} | {} by {}",
            row.display_title(),
            row.song_name,
            row.artist_names.join(", ")
        ));
    }

    operator.say(&format!(
        "Report {} from {} <{}> at {}\n{}\nspotify link: {}",
        report.report_id,
        report.user_name,
        report.user_mail,
        report.date_added,
        report.reason,
        report.spotify_id.url()
    ));
    Ok(())
}
