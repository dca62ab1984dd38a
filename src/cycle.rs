//! One fetch, compare, notify, archive cycle.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::TableFetcher;
use crate::notify::{notify_all, DeliveryReport, Message, Notifier};
use crate::report::{self, ReportOptions};
use crate::store::diff::compare_tables;
use crate::store::SnapshotStore;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The current table matches the latest snapshot.
    NoChange,
    /// Differences were found; carries the rendered report body.
    Reported(String),
    /// Nothing was archived yet; the current table became the first snapshot.
    BootstrappedEmpty,
}

/// Compare `current` against the latest archived snapshot.
///
/// Only the bootstrap case writes to the store. For `Reported` the caller
/// archives `current` once the report has gone out.
pub fn run_cycle(current: &Table, store: &SnapshotStore, options: &ReportOptions) -> Result<Outcome> {
    let Some(prior) = store.latest()? else {
        let path = store.save(current)?;
        info!(
            file = %path.display(),
            "no archived table to compare against, created the first one"
        );
        return Ok(Outcome::BootstrappedEmpty);
    };

    info!(file = %prior.path.display(), "found a previous table to compare against");

    let diff = compare_tables(current, &prior.table);
    if diff.is_empty() {
        info!("no change found in the table");
        return Ok(Outcome::NoChange);
    }

    info!(
        modified = diff.modified.len(),
        added = diff.added.len(),
        removed = diff.removed.len(),
        "change found in the table"
    );
    Ok(Outcome::Reported(report::render(&diff, options)))
}

/// Fetch, compare, mail the report, then archive the fetched table.
///
/// With `archive` off (dry runs) nothing is written to the store, not even
/// a first snapshot. An empty recipient list is rejected before fetching.
pub fn execute(
    config: &Config,
    fetcher: &dyn TableFetcher,
    notifier: &dyn Notifier,
    archive: bool,
) -> Result<Outcome> {
    config.mail.require_recipients()?;

    let current = fetcher.fetch_table(&config.columns)?;
    let store = SnapshotStore::from_config(&config.snapshots);

    if !archive && store.list()?.is_empty() {
        info!("dry run on an empty snapshot directory, nothing to compare against");
        return Ok(Outcome::BootstrappedEmpty);
    }

    let outcome = run_cycle(&current, &store, &config.report)?;

    if let Outcome::Reported(body) = &outcome {
        info!(recipients = config.mail.recipients.len(), "sending the differences found");
        let message = Message::report(&config.mail.subject, body.clone(), config.report.format);
        let delivery = notify_all(notifier, &config.mail.recipients, &message);

        if delivery.nothing_delivered() {
            // keep the prior snapshot so the next run reports the same changes
            return Err(Error::Mail(format!(
                "report could not be delivered to any of {} recipient(s)",
                delivery.failed.len()
            )));
        }
        if !delivery.failed.is_empty() {
            warn!(failed = delivery.failed.len(), "report not delivered to every recipient");
        }

        if archive {
            let path = store.save(&current)?;
            info!(file = %path.display(), "saved the table for the next check");
        }
    }

    Ok(outcome)
}

/// Tell the operator a cycle failed, using the error message as body.
pub fn report_failure(config: &Config, notifier: &dyn Notifier, error: &Error) -> DeliveryReport {
    let message = Message::failure(&config.mail.subject, error);
    notify_all(notifier, &config.mail.recipients, &message)
}
